//! Search request parsing and normalization
//!
//! The wire shape (`SearchRequest`) accepts query parameters and JSON
//! bodies interchangeably; `normalize` turns it into the validated
//! `SearchQuery` the engine consumes. Out-of-range sizes and radii are
//! clamped rather than rejected; malformed enum values are rejected.

use crate::models::{ApprovalStatus, RegistrationStatus, SortBy, SortDirection};
use crate::Result;
use placehub_geo::GeoPoint;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

pub const DEFAULT_RADIUS_M: i64 = 5_000;
pub const MIN_RADIUS_M: i64 = 100;
pub const MAX_RADIUS_M: i64 = 50_000;

pub const MAX_KEYWORD_IDS: usize = 20;

/// Raw search request as received from the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub keyword: Option<String>,
    pub place_name: Option<String>,
    pub category: Option<String>,
    pub place_type: Option<String>,

    /// JSON array in bodies, comma-separated in query strings.
    #[serde(deserialize_with = "deserialize_id_list")]
    pub keyword_ids: Option<Vec<i64>>,

    pub parking_available: Option<bool>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<i64>,

    pub province: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,

    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,

    pub cursor: Option<String>,
    pub size: Option<i64>,

    pub registration_status: Option<String>,

    /// Baseline filter overrides; defaults are active + approved.
    pub is_active: Option<bool>,
    pub approval_status: Option<String>,
}

/// Validated and clamped search query.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub place_name: Option<String>,
    pub category: Option<String>,
    pub place_type: Option<String>,
    pub keyword_ids: Vec<i64>,
    pub parking_available: Option<bool>,
    pub region: RegionFilter,
    pub geo: Option<GeoQuery>,
    pub registration_status: Option<RegistrationStatus>,
    pub is_active: bool,
    pub approval_status: ApprovalStatus,
    pub sort_by: SortBy,
    pub direction: SortDirection,
    pub cursor: Option<String>,
    pub size: usize,
}

/// Region clauses are independently combinable: province alone, or
/// province + city, etc.
#[derive(Debug, Clone, Default)]
pub struct RegionFilter {
    pub province: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct GeoQuery {
    pub center: GeoPoint,
    pub radius_m: i64,
}

impl SearchRequest {
    pub fn normalize(self) -> Result<SearchQuery> {
        let sort_by = match non_blank(self.sort_by) {
            None => SortBy::Distance,
            Some(raw) => SortBy::parse(&raw).ok_or_else(|| {
                crate::Error::Validation(format!("Invalid sortBy value: {raw}"))
            })?,
        };

        let direction = match non_blank(self.sort_direction) {
            None => SortDirection::Asc,
            Some(raw) => SortDirection::parse(&raw).ok_or_else(|| {
                crate::Error::Validation(format!("Invalid sortDirection value: {raw}"))
            })?,
        };

        let registration_status = match non_blank(self.registration_status) {
            None => None,
            Some(raw) => Some(RegistrationStatus::parse(&raw).ok_or_else(|| {
                crate::Error::Validation(format!("Invalid registrationStatus value: {raw}"))
            })?),
        };

        let approval_status = match non_blank(self.approval_status) {
            None => ApprovalStatus::Approved,
            Some(raw) => ApprovalStatus::parse(&raw).ok_or_else(|| {
                crate::Error::Validation(format!("Invalid approvalStatus value: {raw}"))
            })?,
        };

        let geo = match (self.latitude, self.longitude) {
            (None, None) => None,
            (Some(lat), Some(lng)) => {
                let center = GeoPoint::new(lat, lng)
                    .map_err(|e| crate::Error::Validation(e.to_string()))?;
                let radius_m = self
                    .radius
                    .unwrap_or(DEFAULT_RADIUS_M)
                    .clamp(MIN_RADIUS_M, MAX_RADIUS_M);
                Some(GeoQuery { center, radius_m })
            }
            _ => {
                return Err(crate::Error::Validation(
                    "latitude and longitude must be provided together".to_string(),
                ));
            }
        };

        let keyword_ids = self.keyword_ids.unwrap_or_default();
        if keyword_ids.len() > MAX_KEYWORD_IDS {
            return Err(crate::Error::Validation(format!(
                "keywordIds accepts at most {MAX_KEYWORD_IDS} values"
            )));
        }

        let size = match self.size {
            Some(n) if n >= 1 => (n as usize).min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };

        Ok(SearchQuery {
            keyword: non_blank(self.keyword),
            place_name: non_blank(self.place_name),
            category: non_blank(self.category),
            place_type: non_blank(self.place_type),
            keyword_ids,
            parking_available: self.parking_available,
            region: RegionFilter {
                province: non_blank(self.province),
                city: non_blank(self.city),
                district: non_blank(self.district),
            },
            geo,
            registration_status,
            is_active: self.is_active.unwrap_or(true),
            approval_status,
            sort_by,
            direction,
            cursor: non_blank(self.cursor),
            size,
        })
    }
}

impl SearchQuery {
    /// Metrics/log label for the execution path this query takes.
    pub fn mode(&self) -> &'static str {
        if self.geo.is_some() {
            "radius"
        } else if !self.keyword_ids.is_empty() {
            "keyword"
        } else {
            "general"
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Accepts `[1,2,3]` (JSON bodies) or `"1,2,3"` (query strings).
fn deserialize_id_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<i64>),
        Csv(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::List(ids)) => Ok(Some(ids)),
        Some(Raw::Csv(csv)) => {
            let mut ids = Vec::new();
            for part in csv.split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                let id: i64 = part.parse().map_err(|_| {
                    serde::de::Error::custom(format!("invalid keyword id: {part}"))
                })?;
                ids.push(id);
            }
            Ok(Some(ids))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_request_is_empty() {
        let query = SearchRequest::default().normalize().unwrap();
        assert_eq!(query.size, DEFAULT_PAGE_SIZE);
        assert_eq!(query.sort_by, SortBy::Distance);
        assert_eq!(query.direction, SortDirection::Asc);
        assert!(query.is_active);
        assert_eq!(query.approval_status, ApprovalStatus::Approved);
        assert!(query.geo.is_none());
        assert!(query.registration_status.is_none());
    }

    #[test]
    fn size_is_clamped_to_bounds() {
        let query = SearchRequest {
            size: Some(500),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        assert_eq!(query.size, MAX_PAGE_SIZE);

        let query = SearchRequest {
            size: Some(0),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        assert_eq!(query.size, DEFAULT_PAGE_SIZE);

        let query = SearchRequest {
            size: Some(-3),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        assert_eq!(query.size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn radius_is_clamped_to_bounds() {
        let base = SearchRequest {
            latitude: Some(37.4979),
            longitude: Some(127.0276),
            ..Default::default()
        };

        let query = SearchRequest {
            radius: Some(50),
            ..base.clone()
        }
        .normalize()
        .unwrap();
        assert_eq!(query.geo.unwrap().radius_m, MIN_RADIUS_M);

        let query = SearchRequest {
            radius: Some(100_000),
            ..base.clone()
        }
        .normalize()
        .unwrap();
        assert_eq!(query.geo.unwrap().radius_m, MAX_RADIUS_M);

        let query = base.normalize().unwrap();
        assert_eq!(query.geo.unwrap().radius_m, DEFAULT_RADIUS_M);
    }

    #[test]
    fn half_a_coordinate_pair_is_rejected() {
        let err = SearchRequest {
            latitude: Some(37.4979),
            ..Default::default()
        }
        .normalize()
        .unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
    }

    #[test]
    fn malformed_enums_are_rejected() {
        for request in [
            SearchRequest {
                sort_by: Some("POPULARITY".into()),
                ..Default::default()
            },
            SearchRequest {
                sort_direction: Some("UPWARD".into()),
                ..Default::default()
            },
            SearchRequest {
                registration_status: Some("MAYBE".into()),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                request.normalize().unwrap_err(),
                crate::Error::Validation(_)
            ));
        }
    }

    #[test]
    fn blank_strings_mean_absent() {
        let query = SearchRequest {
            keyword: Some("  ".into()),
            category: Some(String::new()),
            registration_status: Some(" ".into()),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        assert!(query.keyword.is_none());
        assert!(query.category.is_none());
        assert!(query.registration_status.is_none());
    }

    #[test]
    fn keyword_id_cap_is_enforced() {
        let err = SearchRequest {
            keyword_ids: Some((0..21).collect()),
            ..Default::default()
        }
        .normalize()
        .unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
    }

    #[test]
    fn id_list_accepts_csv_form() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"keywordIds": "3, 5,8"}"#).unwrap();
        assert_eq!(request.keyword_ids, Some(vec![3, 5, 8]));

        let request: SearchRequest = serde_json::from_str(r#"{"keywordIds": [3,5,8]}"#).unwrap();
        assert_eq!(request.keyword_ids, Some(vec![3, 5, 8]));
    }

    #[test]
    fn mode_reflects_dispatch_path() {
        let general = SearchRequest::default().normalize().unwrap();
        assert_eq!(general.mode(), "general");

        let keyword = SearchRequest {
            keyword_ids: Some(vec![1]),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        assert_eq!(keyword.mode(), "keyword");

        let radius = SearchRequest {
            latitude: Some(37.0),
            longitude: Some(127.0),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        assert_eq!(radius.mode(), "radius");
    }
}
