//! Write-side request payloads.
//!
//! These are validated with `validator` at the handler boundary before the
//! service layer sees them. Field names follow the JSON API (camelCase).

use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPlaceRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,

    #[validate(length(max = 4000))]
    #[serde(default)]
    pub description: String,

    #[validate(length(min = 1, max = 60))]
    pub category: String,

    #[validate(length(min = 1, max = 60))]
    pub place_type: String,

    #[validate(nested)]
    pub location: LocationPayload,

    #[validate(nested)]
    #[serde(default)]
    pub contact: Option<ContactPayload>,

    #[serde(default)]
    pub parking: Option<ParkingPayload>,

    /// Ordered; the first entry becomes the thumbnail.
    #[validate(length(max = 10))]
    #[serde(default)]
    pub image_urls: Vec<String>,

    #[validate(length(max = 20))]
    #[serde(default)]
    pub keyword_ids: Vec<i64>,
}

/// Same shape as registration; updates replace the mutable sections
/// (core fields, location, images, keyword set) wholesale.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaceRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,

    #[validate(length(max = 4000))]
    #[serde(default)]
    pub description: String,

    #[validate(length(min = 1, max = 60))]
    pub category: String,

    #[validate(length(min = 1, max = 60))]
    pub place_type: String,

    #[validate(nested)]
    pub location: LocationPayload,

    #[validate(nested)]
    #[serde(default)]
    pub contact: Option<ContactPayload>,

    #[serde(default)]
    pub parking: Option<ParkingPayload>,

    #[validate(length(max = 10))]
    #[serde(default)]
    pub image_urls: Vec<String>,

    #[validate(length(max = 20))]
    #[serde(default)]
    pub keyword_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    #[validate(length(min = 1, max = 60))]
    pub province: String,

    #[validate(length(min = 1, max = 60))]
    pub city: String,

    #[validate(length(min = 1, max = 60))]
    pub district: String,

    #[validate(length(min = 1, max = 200))]
    pub full_address: String,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub detail_address: Option<String>,

    #[validate(length(max = 10))]
    #[serde(default)]
    pub postal_code: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    #[validate(length(max = 30))]
    #[serde(default)]
    pub phone: Option<String>,

    #[validate(email)]
    #[serde(default)]
    pub email: Option<String>,

    #[validate(url)]
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingPayload {
    pub available: bool,
    #[serde(default)]
    pub parking_type: Option<String>,
}

/// Admin moderation decision. `status` must be APPROVED or REJECTED;
/// moving a place back to PENDING is not a moderation action.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationUpdateRequest {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> LocationPayload {
        LocationPayload {
            province: "Seoul".into(),
            city: "Gangnam-gu".into(),
            district: "Yeoksam-dong".into(),
            full_address: "123 Teheran-ro".into(),
            detail_address: None,
            postal_code: Some("06236".into()),
            latitude: 37.4979,
            longitude: 127.0276,
        }
    }

    #[test]
    fn register_request_validates() {
        let req = RegisterPlaceRequest {
            name: "Daily Studio".into(),
            description: String::new(),
            category: "Studio".into(),
            place_type: "RENTAL".into(),
            location: location(),
            contact: None,
            parking: None,
            image_urls: vec![],
            keyword_ids: vec![],
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn register_request_rejects_bad_coordinates() {
        let mut req = RegisterPlaceRequest {
            name: "Daily Studio".into(),
            description: String::new(),
            category: "Studio".into(),
            place_type: "RENTAL".into(),
            location: location(),
            contact: None,
            parking: None,
            image_urls: vec![],
            keyword_ids: vec![],
        };
        req.location.latitude = 123.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn register_request_rejects_empty_name() {
        let req = RegisterPlaceRequest {
            name: String::new(),
            description: String::new(),
            category: "Studio".into(),
            place_type: "RENTAL".into(),
            location: location(),
            contact: None,
            parking: None,
            image_urls: vec![],
            keyword_ids: vec![],
        };
        assert!(req.validate().is_err());
    }
}
