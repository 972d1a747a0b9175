//! Trip request types for Tripweave.
//!
//! A `TripRequest` is the immutable input of one planning submission. A new
//! submission supersedes the old request; it is never edited in place.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Preferred kind of lodging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccommodationType {
    #[default]
    Any,
    Hotel,
    Hostel,
    Apartment,
    Resort,
    Guesthouse,
}

impl fmt::Display for AccommodationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccommodationType::Any => write!(f, "any"),
            AccommodationType::Hotel => write!(f, "hotel"),
            AccommodationType::Hostel => write!(f, "hostel"),
            AccommodationType::Apartment => write!(f, "apartment"),
            AccommodationType::Resort => write!(f, "resort"),
            AccommodationType::Guesthouse => write!(f, "guesthouse"),
        }
    }
}

impl FromStr for AccommodationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" => Ok(AccommodationType::Any),
            "hotel" => Ok(AccommodationType::Hotel),
            "hostel" => Ok(AccommodationType::Hostel),
            "apartment" => Ok(AccommodationType::Apartment),
            "resort" => Ok(AccommodationType::Resort),
            "guesthouse" => Ok(AccommodationType::Guesthouse),
            other => Err(format!("invalid accommodation type: '{other}'")),
        }
    }
}

/// Inputs of one planning session.
///
/// Sets are `BTreeSet` so the textual rendering is stable regardless of the
/// order the user picked tags in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: String,
    pub destinations: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    #[serde(default)]
    pub preferences: BTreeSet<String>,
    #[serde(default)]
    pub accommodation: AccommodationType,
    #[serde(default)]
    pub transportation: BTreeSet<String>,
    #[serde(default)]
    pub dietary_restrictions: BTreeSet<String>,
}

impl TripRequest {
    /// Minimal request: origin, destinations, dates and budget. Tag sets start empty.
    pub fn new(
        origin: impl Into<String>,
        destinations: Vec<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        budget: f64,
    ) -> Self {
        Self {
            origin: origin.into(),
            destinations,
            start_date,
            end_date,
            budget,
            preferences: BTreeSet::new(),
            accommodation: AccommodationType::Any,
            transportation: BTreeSet::new(),
            dietary_restrictions: BTreeSet::new(),
        }
    }

    pub fn with_preferences<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferences = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_accommodation(mut self, accommodation: AccommodationType) -> Self {
        self.accommodation = accommodation;
        self
    }

    pub fn with_transportation<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transportation = modes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dietary_restrictions<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dietary_restrictions = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Check the request before any phase runs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.origin.trim().is_empty() {
            return Err(ValidationError::BlankOrigin);
        }
        if self.destinations.is_empty() {
            return Err(ValidationError::NoDestination);
        }
        if let Some(index) = self.destinations.iter().position(|d| d.trim().is_empty()) {
            return Err(ValidationError::BlankDestination(index));
        }
        if self.start_date > self.end_date {
            return Err(ValidationError::InvertedDates {
                start: self.start_date.to_string(),
                end: self.end_date.to_string(),
            });
        }
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(ValidationError::InvalidBudget(self.budget.to_string()));
        }
        Ok(())
    }

    /// Inclusive number of travel days.
    pub fn trip_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Destinations joined for headings and prompts ("A, B, C").
    pub fn destination_list(&self) -> String {
        self.destinations.join(", ")
    }

    /// Stable textual form fed to every phase.
    pub fn to_prompt_block(&self) -> String {
        format!(
            "Trip request:\n\
             - Origin: {origin}\n\
             - Destinations: {destinations}\n\
             - Dates: {start} to {end} ({days} days)\n\
             - Budget: ${budget} USD\n\
             - Preferences: {preferences}\n\
             - Accommodation: {accommodation}\n\
             - Transportation: {transportation}\n\
             - Dietary restrictions: {dietary}",
            origin = self.origin.trim(),
            destinations = self.destination_list(),
            start = self.start_date,
            end = self.end_date,
            days = self.trip_days(),
            budget = self.budget,
            preferences = join_or_none(&self.preferences),
            accommodation = self.accommodation,
            transportation = join_or_none(&self.transportation),
            dietary = join_or_none(&self.dietary_restrictions),
        )
    }
}

fn join_or_none(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        "none specified".to_string()
    } else {
        set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> TripRequest {
        TripRequest::new(
            "Taipei",
            vec!["Kaohsiung".to_string()],
            date(2025, 3, 1),
            date(2025, 3, 3),
            500.0,
        )
        .with_preferences(["food"])
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_single_day_trip_is_valid() {
        let mut req = sample();
        req.end_date = req.start_date;
        assert!(req.validate().is_ok());
        assert_eq!(req.trip_days(), 1);
    }

    #[test]
    fn test_inverted_dates_rejected() {
        let mut req = sample();
        req.start_date = date(2025, 3, 5);
        assert_eq!(
            req.validate(),
            Err(ValidationError::InvertedDates {
                start: "2025-03-05".to_string(),
                end: "2025-03-03".to_string(),
            })
        );
    }

    #[test]
    fn test_empty_destinations_rejected() {
        let mut req = sample();
        req.destinations.clear();
        assert_eq!(req.validate(), Err(ValidationError::NoDestination));
    }

    #[test]
    fn test_blank_destination_reports_index() {
        let mut req = sample();
        req.destinations.push("   ".to_string());
        assert_eq!(req.validate(), Err(ValidationError::BlankDestination(1)));
    }

    #[test]
    fn test_blank_origin_rejected() {
        let mut req = sample();
        req.origin = " ".to_string();
        assert_eq!(req.validate(), Err(ValidationError::BlankOrigin));
    }

    #[test]
    fn test_negative_and_nan_budget_rejected() {
        let mut req = sample();
        req.budget = -1.0;
        assert!(matches!(req.validate(), Err(ValidationError::InvalidBudget(_))));
        req.budget = f64::NAN;
        assert!(matches!(req.validate(), Err(ValidationError::InvalidBudget(_))));
        req.budget = 0.0;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_prompt_block_is_order_stable() {
        let a = sample().with_preferences(["museums", "food", "beaches"]);
        let b = sample().with_preferences(["beaches", "museums", "food"]);
        assert_eq!(a.to_prompt_block(), b.to_prompt_block());
        assert!(a.to_prompt_block().contains("Preferences: beaches, food, museums"));
    }

    #[test]
    fn test_prompt_block_contents() {
        let block = sample().to_prompt_block();
        assert!(block.contains("Origin: Taipei"));
        assert!(block.contains("Destinations: Kaohsiung"));
        assert!(block.contains("2025-03-01 to 2025-03-03 (3 days)"));
        assert!(block.contains("Budget: $500 USD"));
        assert!(block.contains("Accommodation: any"));
        assert!(block.contains("Dietary restrictions: none specified"));
    }

    #[test]
    fn test_accommodation_roundtrip() {
        for kind in [
            AccommodationType::Any,
            AccommodationType::Hotel,
            AccommodationType::Hostel,
            AccommodationType::Apartment,
            AccommodationType::Resort,
            AccommodationType::Guesthouse,
        ] {
            let parsed: AccommodationType = kind.to_string().parse().unwrap();
            assert_eq!(kind, parsed);
        }
        assert!("castle".parse::<AccommodationType>().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "origin": "Taipei",
            "destinations": ["Kaohsiung", "Tainan"],
            "start_date": "2025-03-01",
            "end_date": "2025-03-03",
            "budget": 500
        }"#;
        let req: TripRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.destinations.len(), 2);
        assert_eq!(req.accommodation, AccommodationType::Any);
        assert!(req.preferences.is_empty());
        assert_eq!(req.destination_list(), "Kaohsiung, Tainan");
    }
}
