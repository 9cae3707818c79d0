//! Search service - orchestrates the engine and assembles responses.

use crate::db::search::enrich::Enrichment;
use crate::db::search::{SearchQuery, SearchRequest};
use crate::db::SearchEngine;
use crate::models::{PlaceRow, SortBy, SortDirection};
use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Denormalized search result item: place + location + parking + contact
/// + thumbnail + keyword names + room rollup, plus the distance from the
/// search center for geospatial searches.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSearchItem {
    pub id: i64,
    pub place_name: String,
    pub description: String,
    pub category: String,
    pub place_type: String,
    pub rating_average: Option<f64>,
    pub review_count: i64,
    pub is_active: bool,
    pub approval_status: String,
    pub registration_status: String,
    pub full_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub parking_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub keywords: Vec<String>,
    pub room_count: i64,
    pub room_ids: Vec<i64>,
    /// Meters from the search center; present only for geospatial searches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl PlaceSearchItem {
    pub fn from_row(row: PlaceRow, enrichment: &Enrichment, distance: Option<f64>) -> Self {
        let rooms = enrichment.rooms(row.id);
        Self {
            id: row.id,
            place_name: row.name,
            description: row.description,
            category: row.category,
            place_type: row.place_type,
            rating_average: row.rating_avg,
            review_count: row.review_count,
            is_active: row.is_active,
            approval_status: row.approval_status,
            registration_status: row.registration_status,
            full_address: row.full_address,
            latitude: row.latitude,
            longitude: row.longitude,
            parking_available: row.parking_available.unwrap_or(false),
            parking_type: row.parking_type,
            contact: row.phone,
            thumbnail_url: enrichment.thumbnail(row.id),
            keywords: enrichment.keyword_names(row.id),
            room_count: rooms.count,
            room_ids: rooms.ids,
            distance,
        }
    }
}

/// Page produced by the engine, before the response envelope.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub items: Vec<PlaceSearchItem>,
    pub has_next: bool,
    pub next_cursor: Option<String>,
}

impl SearchPage {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    pub search_time_millis: u64,
    pub sort_by: SortBy,
    pub sort_direction: SortDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_in_meters: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<PlaceSearchItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub has_next: bool,
    /// Items in this page, not the filter total; see the count endpoint.
    pub count: usize,
    pub metadata: SearchMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

/// Search service coordinates discovery operations.
pub struct SearchService {
    engine: Arc<SearchEngine>,
}

impl SearchService {
    pub fn new(engine: Arc<SearchEngine>) -> Self {
        Self { engine }
    }

    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let started = Instant::now();
        let query = request.normalize()?;
        let page = self.engine.search(&query).await?;
        crate::metrics::SEARCH_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());
        Ok(build_response(page, &query, started))
    }

    /// Popularity shortcut: review volume, most-reviewed first.
    pub async fn search_popular(&self, mut request: SearchRequest) -> Result<SearchResponse> {
        request.sort_by = Some(SortBy::ReviewCount.as_str().to_string());
        request.sort_direction = Some(SortDirection::Desc.as_str().to_string());
        request.latitude = None;
        request.longitude = None;
        request.radius = None;
        self.search(request).await
    }

    /// Recency shortcut: newest places first.
    pub async fn search_recent(&self, mut request: SearchRequest) -> Result<SearchResponse> {
        request.sort_by = Some(SortBy::CreatedAt.as_str().to_string());
        request.sort_direction = Some(SortDirection::Desc.as_str().to_string());
        request.latitude = None;
        request.longitude = None;
        request.radius = None;
        self.search(request).await
    }

    pub async fn count(&self, request: SearchRequest) -> Result<CountResponse> {
        let query = request.normalize()?;
        let count = self.engine.count(&query).await?;
        Ok(CountResponse { count })
    }
}

fn build_response(page: SearchPage, query: &SearchQuery, started: Instant) -> SearchResponse {
    SearchResponse {
        count: page.items.len(),
        metadata: SearchMetadata {
            search_time_millis: started.elapsed().as_millis() as u64,
            sort_by: query.sort_by,
            sort_direction: query.direction,
            center_lat: query.geo.map(|g| g.center.latitude),
            center_lng: query.geo.map(|g| g.center.longitude),
            radius_in_meters: query.geo.map(|g| g.radius_m),
        },
        items: page.items,
        next_cursor: page.next_cursor,
        has_next: page.has_next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::search::enrich::RoomSummary;
    use crate::db::search::params::SearchRequest;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn sample_row() -> PlaceRow {
        PlaceRow {
            id: 7,
            name: "Han River Gallery".into(),
            description: "Riverside exhibition space".into(),
            category: "Gallery".into(),
            place_type: "EXHIBITION".into(),
            is_active: true,
            approval_status: "APPROVED".into(),
            registration_status: "REGISTERED".into(),
            rating_avg: Some(4.8),
            review_count: 56,
            created_at: Utc.with_ymd_and_hms(2024, 3, 2, 9, 30, 0).unwrap(),
            province: "Seoul".into(),
            city: "Mapo-gu".into(),
            district: "Hapjeong-dong".into(),
            full_address: "45 Tojeong-ro".into(),
            detail_address: None,
            postal_code: Some("04081".into()),
            latitude: 37.5478,
            longitude: 126.9125,
            parking_available: None,
            parking_type: None,
            phone: Some("02-555-0101".into()),
            email: None,
            website: None,
        }
    }

    #[test]
    fn item_assembly_defaults_missing_enrichment() {
        let item = PlaceSearchItem::from_row(sample_row(), &Enrichment::default(), None);
        assert_eq!(item.place_name, "Han River Gallery");
        assert!(!item.parking_available);
        assert!(item.thumbnail_url.is_none());
        assert!(item.keywords.is_empty());
        assert_eq!(item.room_count, 0);
        assert!(item.room_ids.is_empty());
        assert!(item.distance.is_none());
    }

    #[test]
    fn item_assembly_attaches_enrichment_and_distance() {
        let mut rooms = HashMap::new();
        rooms.insert(
            7,
            RoomSummary {
                count: 3,
                ids: vec![70, 71, 72],
            },
        );
        let mut keywords = HashMap::new();
        keywords.insert(7, vec!["exhibition".to_string(), "river".to_string()]);
        let mut thumbnails = HashMap::new();
        thumbnails.insert(7, "https://cdn.placehub.io/7/main.jpg".to_string());

        let enrichment = Enrichment::from_parts(thumbnails, keywords, rooms);
        let item = PlaceSearchItem::from_row(sample_row(), &enrichment, Some(81.4));
        assert_eq!(item.room_count, 3);
        assert_eq!(item.room_ids, vec![70, 71, 72]);
        assert_eq!(item.keywords, vec!["exhibition", "river"]);
        assert_eq!(item.distance, Some(81.4));
    }

    #[test]
    fn response_metadata_echoes_the_query() {
        let query = SearchRequest {
            latitude: Some(37.4979),
            longitude: Some(127.0276),
            radius: Some(1_000),
            sort_by: Some("DISTANCE".into()),
            ..Default::default()
        }
        .normalize()
        .unwrap();

        let response = build_response(SearchPage::empty(), &query, Instant::now());
        assert_eq!(response.count, 0);
        assert!(!response.has_next);
        assert!(response.next_cursor.is_none());
        assert_eq!(response.metadata.sort_by, SortBy::Distance);
        assert_eq!(response.metadata.center_lat, Some(37.4979));
        assert_eq!(response.metadata.radius_in_meters, Some(1_000));
    }

    #[test]
    fn distance_field_is_omitted_when_absent() {
        let item = PlaceSearchItem::from_row(sample_row(), &Enrichment::default(), None);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("distance").is_none());
        assert_eq!(json["placeName"], "Han River Gallery");
        assert_eq!(json["roomCount"], 0);
    }
}
