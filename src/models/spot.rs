// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spot model for the shared collection.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A hidden spot as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Free-form category ("beach", "viewpoint", ...)
    pub category: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Application user ID of the contributor
    pub created_by: Option<String>,
    /// Creation time (ISO 8601)
    pub created_at: Option<String>,
}

impl Spot {
    /// Case-insensitive match against name, description, city, country and tags.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let fields = [
            Some(self.name.as_str()),
            self.description.as_deref(),
            self.city.as_deref(),
            self.country.as_deref(),
        ];

        fields
            .into_iter()
            .flatten()
            .chain(self.tags.iter().map(String::as_str))
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Request body for `POST /spots`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSpot {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request body for `PUT /spots/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpotUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_spot() -> NewSpot {
        NewSpot {
            name: "Secret Cove".to_string(),
            description: None,
            category: Some("beach".to_string()),
            latitude: 37.4,
            longitude: -122.4,
            city: None,
            country: None,
            image_url: None,
            tags: vec![],
        }
    }

    #[test]
    fn valid_spot_passes() {
        assert!(new_spot().validate().is_ok());
    }

    #[test]
    fn out_of_range_latitude_rejected() {
        let mut spot = new_spot();
        spot.latitude = 91.0;
        assert!(spot.validate().is_err());
    }

    #[test]
    fn empty_name_rejected() {
        let mut spot = new_spot();
        spot.name = String::new();
        assert!(spot.validate().is_err());
    }

    #[test]
    fn matches_tags_and_city() {
        let spot: Spot = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "name": "Quiet Ridge",
            "latitude": 1.0,
            "longitude": 2.0,
            "city": "Lisbon",
            "tags": ["Sunset"]
        }))
        .unwrap();

        assert!(spot.matches("lisbon"));
        assert!(spot.matches("sunset"));
        assert!(!spot.matches("porto"));
    }
}
