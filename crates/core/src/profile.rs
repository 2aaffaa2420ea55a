//! The partner profile: at most one per user.
//!
//! Two physical copies can exist per user (local and remote). They are not
//! kept in sync automatically; see [`crate::reconcile`].

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Value the remote store reports for favorites it does not know.
pub const PLACEHOLDER: &str = "Unknown";

/// Labels used when important dates are derived from the dedicated fields.
pub const BIRTHDAY_LABEL: &str = "Birthday";
pub const ANNIVERSARY_LABEL: &str = "Anniversary";

/// How many upcoming dates the dashboard shows.
pub const DEFAULT_UPCOMING_LIMIT: usize = 3;

fn placeholder() -> String {
    PLACEHOLDER.to_string()
}

/// True for the placeholder value and for blank strings.
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == PLACEHOLDER
}

/// A labelled date the user wants to remember.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantDate {
    pub date: NaiveDate,
    pub description: String,
}

/// Clothing sizes, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingSizes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shirt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pants: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ring: Option<String>,
}

impl ClothingSizes {
    pub fn is_empty(&self) -> bool {
        self.shirt.is_none() && self.pants.is_none() && self.shoe.is_none() && self.ring.is_none()
    }
}

/// Everything the user knows about their partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default = "placeholder")]
    pub favorite_color: String,
    #[serde(default = "placeholder")]
    pub favorite_food: String,
    #[serde(default)]
    pub favorite_hobbies: Vec<String>,
    /// Independent of `birthday`/`anniversary`; the two are not deduplicated.
    #[serde(default)]
    pub important_dates: Vec<ImportantDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub anniversary: Option<NaiveDate>,
    #[serde(default)]
    pub love_languages: Vec<String>,
    #[serde(default)]
    pub favorite_things: Option<String>,
    #[serde(default)]
    pub dislikes: Option<String>,
    #[serde(default)]
    pub sizes: Option<ClothingSizes>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl PartnerProfile {
    /// A profile with only a name; favorites hold the placeholder.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            favorite_color: placeholder(),
            favorite_food: placeholder(),
            favorite_hobbies: Vec::new(),
            important_dates: Vec::new(),
            notes: String::new(),
            birthday: None,
            anniversary: None,
            love_languages: Vec::new(),
            favorite_things: None,
            dislikes: None,
            sizes: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Whether this copy carries anything beyond placeholders and empties.
    pub fn has_real_data(&self) -> bool {
        !is_placeholder(&self.favorite_color)
            || !is_placeholder(&self.favorite_food)
            || !self.favorite_hobbies.is_empty()
            || !self.important_dates.is_empty()
            || !self.notes.trim().is_empty()
    }

    /// Important dates derived from the dedicated birthday/anniversary fields.
    pub fn dates_from_milestones(
        birthday: Option<NaiveDate>,
        anniversary: Option<NaiveDate>,
    ) -> Vec<ImportantDate> {
        birthday
            .map(|date| ImportantDate {
                date,
                description: BIRTHDAY_LABEL.to_string(),
            })
            .into_iter()
            .chain(anniversary.map(|date| ImportantDate {
                date,
                description: ANNIVERSARY_LABEL.to_string(),
            }))
            .collect()
    }

    /// The next occurrence of each important date on or after `today`,
    /// nearest first, truncated to `limit`.
    pub fn upcoming_dates(&self, today: NaiveDate, limit: usize) -> Vec<UpcomingDate> {
        let mut upcoming: Vec<UpcomingDate> = self
            .important_dates
            .iter()
            .map(|important| {
                let this_year = anniversary_in(important.date, today.year());
                let next = if this_year >= today {
                    this_year
                } else {
                    anniversary_in(important.date, today.year() + 1)
                };
                UpcomingDate {
                    date: important.clone(),
                    next_occurrence: next,
                    days_until: (next - today).num_days(),
                }
            })
            .collect();
        upcoming.sort_by_key(|u| u.days_until);
        upcoming.truncate(limit);
        upcoming
    }
}

/// An important date annotated with its next occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingDate {
    pub date: ImportantDate,
    pub next_occurrence: NaiveDate,
    pub days_until: i64,
}

/// Same month/day in `year`; Feb 29 rolls to Mar 1 in non-leap years.
fn anniversary_in(date: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn named_profile_has_no_real_data() {
        assert!(!PartnerProfile::named("Sam").has_real_data());
    }

    #[test]
    fn any_single_field_counts_as_real_data() {
        let mut p = PartnerProfile::named("Sam");
        p.favorite_color = "green".into();
        assert!(p.has_real_data());

        let mut p = PartnerProfile::named("Sam");
        p.favorite_food = "ramen".into();
        assert!(p.has_real_data());

        let mut p = PartnerProfile::named("Sam");
        p.favorite_hobbies.push("climbing".into());
        assert!(p.has_real_data());

        let mut p = PartnerProfile::named("Sam");
        p.important_dates.push(ImportantDate {
            date: ymd(2020, 6, 1),
            description: "First date".into(),
        });
        assert!(p.has_real_data());

        let mut p = PartnerProfile::named("Sam");
        p.notes = "likes surprises".into();
        assert!(p.has_real_data());
    }

    #[test]
    fn blank_values_are_not_real_data() {
        let mut p = PartnerProfile::named("Sam");
        p.favorite_color = "  ".into();
        p.notes = "\n\t".into();
        assert!(!p.has_real_data());
    }

    #[test]
    fn milestones_become_labelled_dates() {
        let dates = PartnerProfile::dates_from_milestones(Some(ymd(1990, 4, 2)), None);
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].description, BIRTHDAY_LABEL);

        let dates =
            PartnerProfile::dates_from_milestones(Some(ymd(1990, 4, 2)), Some(ymd(2015, 9, 9)));
        assert_eq!(dates[1].description, ANNIVERSARY_LABEL);
    }

    #[test]
    fn upcoming_dates_wrap_to_next_year_and_sort() {
        let mut p = PartnerProfile::named("Sam");
        p.important_dates = vec![
            ImportantDate {
                date: ymd(1990, 1, 10),
                description: "Birthday".into(),
            },
            ImportantDate {
                date: ymd(2015, 6, 20),
                description: "Anniversary".into(),
            },
            ImportantDate {
                date: ymd(2019, 6, 1),
                description: "Today".into(),
            },
        ];
        let today = ymd(2025, 6, 1);
        let upcoming = p.upcoming_dates(today, DEFAULT_UPCOMING_LIMIT);

        assert_eq!(upcoming.len(), 3);
        assert_eq!(upcoming[0].date.description, "Today");
        assert_eq!(upcoming[0].days_until, 0);
        assert_eq!(upcoming[1].next_occurrence, ymd(2025, 6, 20));
        assert_eq!(upcoming[2].next_occurrence, ymd(2026, 1, 10));
    }

    #[test]
    fn upcoming_dates_respect_limit() {
        let mut p = PartnerProfile::named("Sam");
        for day in 1..=5 {
            p.important_dates.push(ImportantDate {
                date: ymd(2000, 12, day),
                description: format!("d{day}"),
            });
        }
        assert_eq!(p.upcoming_dates(ymd(2025, 1, 1), 2).len(), 2);
    }

    #[test]
    fn leap_day_rolls_forward_in_common_years() {
        assert_eq!(anniversary_in(ymd(2020, 2, 29), 2025), ymd(2025, 3, 1));
        assert_eq!(anniversary_in(ymd(2020, 2, 29), 2028), ymd(2028, 2, 29));
    }

    #[test]
    fn missing_fields_deserialize_with_placeholders() {
        let p: PartnerProfile = serde_json::from_str(r#"{"name":"Sam"}"#).unwrap();
        assert_eq!(p.favorite_color, PLACEHOLDER);
        assert_eq!(p.favorite_food, PLACEHOLDER);
        assert!(p.favorite_hobbies.is_empty());
    }
}
