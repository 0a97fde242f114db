use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One body-weight measurement. `date` is a plain calendar day, so day
/// equality is date equality and an entry can never straddle two days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: Uuid,
    pub weight: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl WeightEntry {
    pub fn new(weight: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            weight,
            date,
            note: None,
        }
    }

    pub fn with_note(weight: f64, date: NaiveDate, note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::new(weight, date)
        }
    }

    /// Day-equality predicate the store keys its collision checks on.
    pub fn falls_on(&self, date: NaiveDate) -> bool {
        self.date == date
    }

    pub fn formatted_weight(&self) -> String {
        format!("{:.1} kg", self.weight)
    }

    /// Compact date for list rows, e.g. "9/27".
    pub fn short_date(&self) -> String {
        self.date.format("%-m/%-d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_assigns_unique_ids() {
        let a = WeightEntry::new(70.0, date(2024, 1, 15));
        let b = WeightEntry::new(70.0, date(2024, 1, 15));
        assert_ne!(a.id, b.id);
        assert!(a.note.is_none());
    }

    #[test]
    fn falls_on_matches_calendar_day() {
        let entry = WeightEntry::new(70.0, date(2024, 1, 15));
        assert!(entry.falls_on(date(2024, 1, 15)));
        assert!(!entry.falls_on(date(2024, 1, 16)));
    }

    #[test]
    fn formatted_weight_keeps_one_decimal() {
        assert_eq!(
            WeightEntry::new(70.5, date(2024, 1, 15)).formatted_weight(),
            "70.5 kg"
        );
        assert_eq!(
            WeightEntry::new(70.0, date(2024, 1, 15)).formatted_weight(),
            "70.0 kg"
        );
    }

    #[test]
    fn short_date_drops_zero_padding() {
        let entry = WeightEntry::new(70.0, date(2025, 9, 27));
        assert_eq!(entry.short_date(), "9/27");
    }

    #[test]
    fn note_survives_serialization_and_absent_note_is_omitted() {
        let with_note = WeightEntry::with_note(75.5, date(2024, 3, 1), "before breakfast");
        let json = serde_json::to_string(&with_note).unwrap();
        let back: WeightEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, with_note);

        let without = WeightEntry::new(75.5, date(2024, 3, 1));
        let json = serde_json::to_string(&without).unwrap();
        assert!(!json.contains("note"));
    }
}
