//! Memories: things the user records about their partner.
//!
//! The remote store keeps a coarser shape than the application: a free-text
//! `body`, a `tags` list, and a three-level [`Importance`]. The 1–5 rating
//! collapses onto that scale on write and re-expands to {1, 3, 5} on read,
//! so ratings 2 and 4 never round-trip through the remote store.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::DataError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Category used when none is given (and when a remote row has no tags).
pub const DEFAULT_CATEGORY: &str = "general";

/// Rating given to memories created without one.
pub const DEFAULT_RATING: u8 = 3;

/// Ratings at or above this count as "high value".
pub const HIGH_VALUE_RATING: u8 = 4;

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_rating() -> u8 {
    DEFAULT_RATING
}

// ---------------------------------------------------------------------------
// Importance
// ---------------------------------------------------------------------------

/// Three-level importance scale used by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
}

impl Importance {
    /// Collapse a 1–5 rating: 4–5 → high, 3 → medium, anything else → low.
    pub fn from_rating(rating: u8) -> Self {
        match rating {
            r if r >= 4 => Self::High,
            3 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Re-expand to a rating. Lossy: only 1, 3 and 5 come back.
    pub fn to_rating(self) -> u8 {
        match self {
            Self::High => 5,
            Self::Medium => 3,
            Self::Low => 1,
        }
    }

    /// Database value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse the database value. Unknown values read as `Low`, the column default.
    pub fn from_str_value(value: &str) -> Self {
        match value {
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Low,
        }
    }
}

// ---------------------------------------------------------------------------
// Entity + DTOs
// ---------------------------------------------------------------------------

/// A recorded memory in application shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_rating")]
    pub rating: u8,
    /// When the memory happened.
    pub date: NaiveDate,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a memory.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMemory {
    #[validate(custom(function = "memory_title_present"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_rating")]
    #[validate(range(min = 1, max = 5, message = "Please pick a rating between 1 and 5."))]
    pub rating: u8,
    pub date: NaiveDate,
}

impl NewMemory {
    /// A memory with only a title and date; everything else defaulted.
    pub fn titled(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: default_category(),
            rating: DEFAULT_RATING,
            date,
        }
    }

    /// Reject the input before any storage access.
    pub fn check(&self) -> Result<(), DataError> {
        self.validate().map_err(DataError::from)
    }

    /// Materialize into a full memory with the given identity and timestamps.
    pub fn into_memory(self, id: String, now: Timestamp) -> Memory {
        Memory {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            category: non_blank_or_default(self.category),
            rating: self.rating,
            date: self.date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// DTO for partially updating a memory. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMemory {
    #[validate(custom(function = "memory_title_present"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Please pick a rating between 1 and 5."))]
    pub rating: Option<u8>,
    pub date: Option<NaiveDate>,
}

impl UpdateMemory {
    /// Reject the input before any storage access.
    pub fn check(&self) -> Result<(), DataError> {
        self.validate().map_err(DataError::from)
    }

    /// Apply the present fields to `memory` and bump `updated_at`.
    pub fn apply_to(&self, memory: &mut Memory, now: Timestamp) {
        if let Some(title) = &self.title {
            memory.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            memory.description = description.clone();
        }
        if let Some(category) = &self.category {
            memory.category = non_blank_or_default(category.clone());
        }
        if let Some(rating) = self.rating {
            memory.rating = rating;
        }
        if let Some(date) = self.date {
            memory.date = date;
        }
        memory.updated_at = now;
    }
}

fn memory_title_present(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed("Please enter a title for your memory."));
        return Err(err);
    }
    Ok(())
}

fn non_blank_or_default(category: String) -> String {
    if category.trim().is_empty() {
        default_category()
    } else {
        category
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Aggregate view over a user's memories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorySummary {
    pub total: usize,
    /// Mean rating, `0.0` when there are no memories.
    pub average_rating: f64,
    /// Memories rated [`HIGH_VALUE_RATING`] or above.
    pub high_value: usize,
    pub by_category: BTreeMap<String, usize>,
}

/// Summarize a list of memories.
pub fn summarize(memories: &[Memory]) -> MemorySummary {
    let total = memories.len();
    let rating_sum: u32 = memories.iter().map(|m| u32::from(m.rating)).sum();
    let average_rating = if total == 0 {
        0.0
    } else {
        f64::from(rating_sum) / total as f64
    };

    let mut by_category = BTreeMap::new();
    for memory in memories {
        *by_category.entry(memory.category.clone()).or_insert(0) += 1;
    }

    MemorySummary {
        total,
        average_rating,
        high_value: memories
            .iter()
            .filter(|m| m.rating >= HIGH_VALUE_RATING)
            .count(),
        by_category,
    }
}
