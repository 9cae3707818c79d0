//! Place domain types and the joined row projection used by reads.
//!
//! Status/enum columns are carried as plain text on row structs and echoed
//! as-is in responses; the typed enums below exist for request parsing and
//! filter binding. Parsing is case-insensitive and returns `None` for
//! unknown values so callers can attach their own error kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

/// Moderation state of a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

/// Whether the venue completed the paid registration flow. Absence of the
/// filter means "both".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Registered,
    Unregistered,
}

impl RegistrationStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "REGISTERED" => Some(Self::Registered),
            "UNREGISTERED" => Some(Self::Unregistered),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "REGISTERED",
            Self::Unregistered => "UNREGISTERED",
        }
    }
}

/// Closed set of sort fields for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortBy {
    Distance,
    Rating,
    ReviewCount,
    CreatedAt,
    PlaceName,
}

impl SortBy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "DISTANCE" => Some(Self::Distance),
            "RATING" => Some(Self::Rating),
            "REVIEW_COUNT" => Some(Self::ReviewCount),
            "CREATED_AT" => Some(Self::CreatedAt),
            "PLACE_NAME" => Some(Self::PlaceName),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Distance => "DISTANCE",
            Self::Rating => "RATING",
            Self::ReviewCount => "REVIEW_COUNT",
            Self::CreatedAt => "CREATED_AT",
            Self::PlaceName => "PLACE_NAME",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn as_sql(self) -> &'static str {
        self.as_str()
    }
}

/// Keyword master data entry.
#[derive(Debug, Clone, Serialize)]
pub struct Keyword {
    pub id: i64,
    pub name: String,
}

/// Denormalized projection of a place joined with its location, parking and
/// contact rows. This is the shape every read query selects; see
/// `db::search::engine::PLACE_COLUMNS`.
#[derive(Debug, Clone)]
pub struct PlaceRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub place_type: String,
    pub is_active: bool,
    pub approval_status: String,
    pub registration_status: String,
    pub rating_avg: Option<f64>,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,

    pub province: String,
    pub city: String,
    pub district: String,
    pub full_address: String,
    pub detail_address: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,

    pub parking_available: Option<bool>,
    pub parking_type: Option<String>,

    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

impl PlaceRow {
    /// Explicit row mapping; columns must match `PLACE_COLUMNS`.
    pub fn from_row(row: &PgRow) -> crate::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            place_type: row.try_get("place_type")?,
            is_active: row.try_get("is_active")?,
            approval_status: row.try_get("approval_status")?,
            registration_status: row.try_get("registration_status")?,
            rating_avg: row.try_get("rating_avg")?,
            review_count: row.try_get("review_count")?,
            created_at: row.try_get("created_at")?,
            province: row.try_get("province")?,
            city: row.try_get("city")?,
            district: row.try_get("district")?,
            full_address: row.try_get("full_address")?,
            detail_address: row.try_get("detail_address")?,
            postal_code: row.try_get("postal_code")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            parking_available: row.try_get("parking_available")?,
            parking_type: row.try_get("parking_type")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            website: row.try_get("website")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_parse_is_case_insensitive() {
        assert_eq!(SortBy::parse("review_count"), Some(SortBy::ReviewCount));
        assert_eq!(SortBy::parse("Place_Name"), Some(SortBy::PlaceName));
        assert_eq!(SortDirection::parse("desc"), Some(SortDirection::Desc));
        assert_eq!(ApprovalStatus::parse("approved"), Some(ApprovalStatus::Approved));
        assert_eq!(RegistrationStatus::parse("registered"), Some(RegistrationStatus::Registered));
    }

    #[test]
    fn enum_parse_rejects_unknown_values() {
        assert_eq!(SortBy::parse("POPULARITY"), None);
        assert_eq!(SortDirection::parse("ascending"), None);
        assert_eq!(ApprovalStatus::parse(""), None);
    }

    #[test]
    fn as_str_round_trips() {
        for sort in [
            SortBy::Distance,
            SortBy::Rating,
            SortBy::ReviewCount,
            SortBy::CreatedAt,
            SortBy::PlaceName,
        ] {
            assert_eq!(SortBy::parse(sort.as_str()), Some(sort));
        }
    }
}
