//! Plans: date ideas the user keeps, written by hand or accepted from a
//! suggestion.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::DataError;
use crate::memory::DEFAULT_CATEGORY;
use crate::types::Timestamp;

/// Category given to accepted suggestions that carry no tags.
pub const SUGGESTION_CATEGORY: &str = "ai-suggested";

/// Plan priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Database value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse the database value. Unknown values read as `Medium`.
    pub fn from_str_value(value: &str) -> Self {
        match value {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }
}

/// A saved plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// When the plan is scheduled for; defaults to creation time.
    pub date: Timestamp,
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a plan.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPlan {
    #[validate(custom(function = "plan_title_present"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `None` means "now".
    #[serde(default)]
    pub date: Option<Timestamp>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

impl NewPlan {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            date: None,
            category: None,
            priority: Priority::default(),
            completed: false,
        }
    }

    /// Build the plan created when a suggestion is accepted.
    pub fn from_suggestion(suggestion: &PlanSuggestion, now: Timestamp) -> Self {
        Self {
            title: suggestion.title.clone(),
            description: suggestion.description.clone(),
            date: Some(now),
            category: Some(
                suggestion
                    .tags
                    .first()
                    .filter(|t| !t.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| SUGGESTION_CATEGORY.to_string()),
            ),
            priority: suggestion.difficulty.priority(),
            completed: false,
        }
    }

    /// Reject the input before any storage access.
    pub fn check(&self) -> Result<(), DataError> {
        self.validate().map_err(DataError::from)
    }

    /// Category with the default applied.
    pub fn category_or_default(&self) -> String {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string()
    }

    /// Materialize into a full plan with the given identity and timestamps.
    pub fn into_plan(self, id: String, now: Timestamp) -> Plan {
        let category = self.category_or_default();
        Plan {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            date: self.date.unwrap_or(now),
            category,
            priority: self.priority,
            completed: self.completed,
            created_at: now,
            updated_at: now,
        }
    }
}

/// DTO for partially updating a plan. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePlan {
    #[validate(custom(function = "plan_title_present"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<Timestamp>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

impl UpdatePlan {
    /// An update that only moves the plan to a new date.
    pub fn schedule(date: Timestamp) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    /// Reject the input before any storage access.
    pub fn check(&self) -> Result<(), DataError> {
        self.validate().map_err(DataError::from)
    }

    /// Apply the present fields to `plan` and bump `updated_at`.
    pub fn apply_to(&self, plan: &mut Plan, now: Timestamp) {
        if let Some(title) = &self.title {
            plan.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            plan.description = description.clone();
        }
        if let Some(date) = self.date {
            plan.date = date;
        }
        if let Some(category) = &self.category {
            plan.category = category.clone();
        }
        if let Some(priority) = self.priority {
            plan.priority = priority;
        }
        if let Some(completed) = self.completed {
            plan.completed = completed;
        }
        plan.updated_at = now;
    }
}

fn plan_title_present(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed("Please enter a title for your plan."));
        return Err(err);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

/// How demanding a suggested activity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Easy → low, Hard → high, anything else → medium.
    pub fn priority(self) -> Priority {
        match self {
            Self::Easy => Priority::Low,
            Self::Medium => Priority::Medium,
            Self::Hard => Priority::High,
        }
    }
}

/// A generated date idea, before the user accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSuggestion {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub budget_min: u32,
    #[serde(default)]
    pub budget_max: u32,
    #[serde(default)]
    pub duration_minutes: u32,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
    /// 1–100.
    #[serde(default)]
    pub confidence: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn suggestion(difficulty: Difficulty, tags: &[&str]) -> PlanSuggestion {
        PlanSuggestion {
            title: "Sunset picnic".into(),
            description: "Pack their favorite snacks".into(),
            budget_min: 10,
            budget_max: 40,
            duration_minutes: 120,
            difficulty,
            steps: vec![],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            reasoning: String::new(),
            confidence: 80,
        }
    }

    #[test]
    fn difficulty_maps_to_priority() {
        assert_eq!(Difficulty::Easy.priority(), Priority::Low);
        assert_eq!(Difficulty::Medium.priority(), Priority::Medium);
        assert_eq!(Difficulty::Hard.priority(), Priority::High);
    }

    #[test]
    fn accepted_suggestion_uses_first_tag_as_category() {
        let now = Utc::now();
        let plan = NewPlan::from_suggestion(&suggestion(Difficulty::Hard, &["outdoors", "food"]), now);
        assert_eq!(plan.category.as_deref(), Some("outdoors"));
        assert_eq!(plan.priority, Priority::High);
        assert_eq!(plan.date, Some(now));
        assert!(!plan.completed);
    }

    #[test]
    fn untagged_suggestion_gets_suggestion_category() {
        let plan = NewPlan::from_suggestion(&suggestion(Difficulty::Easy, &[]), Utc::now());
        assert_eq!(plan.category.as_deref(), Some(SUGGESTION_CATEGORY));
    }

    #[test]
    fn plan_date_defaults_to_creation_time() {
        let now = Utc::now();
        let plan = NewPlan::titled("Museum").into_plan("p1".into(), now);
        assert_eq!(plan.date, now);
        assert_eq!(plan.category, DEFAULT_CATEGORY);
        assert_eq!(plan.priority, Priority::Medium);
    }

    #[test]
    fn blank_plan_title_is_rejected() {
        assert_matches!(NewPlan::titled("").check(), Err(DataError::Validation { .. }));
    }

    #[test]
    fn schedule_only_moves_the_date() {
        let now = Utc::now();
        let mut plan = NewPlan::titled("Museum").into_plan("p1".into(), now);
        let later = now + chrono::Duration::days(3);
        UpdatePlan::schedule(later).apply_to(&mut plan, now);
        assert_eq!(plan.date, later);
        assert_eq!(plan.title, "Museum");
    }

    #[test]
    fn suggestion_deserializes_from_camel_case() {
        let json = r#"{"title":"Bake","description":"Bread","budgetMin":5,"difficulty":"Easy","tags":["home"]}"#;
        let s: PlanSuggestion = serde_json::from_str(json).unwrap();
        assert_eq!(s.budget_min, 5);
        assert_eq!(s.difficulty, Difficulty::Easy);
    }
}
