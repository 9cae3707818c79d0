//! Place service - write-side use cases and single-entity reads.

use crate::db::search::enrich::Enrichment;
use crate::db::PlaceRepository;
use crate::models::{
    ApprovalRequest, ApprovalStatus, Keyword, PlaceRow, RegisterPlaceRequest,
    RegistrationStatus, UpdatePlaceRequest,
};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredPlace {
    pub id: i64,
    pub approval_status: String,
}

/// Full single-entity projection returned by the read endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetail {
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
    pub province: String,
    pub city: String,
    pub district: String,
    pub full_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub parking_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub image_urls: Vec<String>,
    pub keywords: Vec<String>,
    pub room_count: i64,
    pub room_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl PlaceDetail {
    fn from_parts(row: PlaceRow, image_urls: Vec<String>, enrichment: &Enrichment) -> Self {
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
            province: row.province,
            city: row.city,
            district: row.district,
            full_address: row.full_address,
            detail_address: row.detail_address,
            postal_code: row.postal_code,
            latitude: row.latitude,
            longitude: row.longitude,
            parking_available: row.parking_available.unwrap_or(false),
            parking_type: row.parking_type,
            phone: row.phone,
            email: row.email,
            website: row.website,
            image_urls,
            keywords: enrichment.keyword_names(row.id),
            room_count: rooms.count,
            room_ids: rooms.ids,
            created_at: row.created_at,
        }
    }
}

/// Place service owns registration, moderation, and entity reads.
/// Authentication and ownership checks live at the gateway in front of
/// this service; the admin routes assume a trusted caller.
pub struct PlaceService {
    repo: Arc<PlaceRepository>,
    pool: PgPool,
}

impl PlaceService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: Arc::new(PlaceRepository::new(pool.clone())),
            pool,
        }
    }

    pub async fn register(&self, request: RegisterPlaceRequest) -> Result<RegisteredPlace> {
        request
            .validate()
            .map_err(|e| crate::Error::Validation(e.to_string()))?;

        let id = self.repo.insert(&request).await?;
        tracing::info!(place_id = id, name = %request.name, "place registered");

        Ok(RegisteredPlace {
            id,
            approval_status: ApprovalStatus::Pending.as_str().to_string(),
        })
    }

    pub async fn get(&self, place_id: i64) -> Result<PlaceDetail> {
        let row = self
            .repo
            .fetch_detail_row(place_id)
            .await?
            .ok_or_else(|| crate::Error::NotFound(format!("place {place_id}")))?;

        let image_urls = self.repo.fetch_image_urls(place_id).await?;
        let enrichment = Enrichment::load(&self.pool, &[place_id]).await?;
        Ok(PlaceDetail::from_parts(row, image_urls, &enrichment))
    }

    pub async fn update(&self, place_id: i64, request: UpdatePlaceRequest) -> Result<()> {
        request
            .validate()
            .map_err(|e| crate::Error::Validation(e.to_string()))?;
        self.repo.update(place_id, &request).await?;
        tracing::info!(place_id, "place updated");
        Ok(())
    }

    pub async fn delete(&self, place_id: i64) -> Result<()> {
        self.repo.soft_delete(place_id).await?;
        tracing::info!(place_id, "place soft-deleted");
        Ok(())
    }

    pub async fn set_active(&self, place_id: i64, active: bool) -> Result<()> {
        self.repo.set_active(place_id, active).await?;
        tracing::info!(place_id, active, "place activation changed");
        Ok(())
    }

    pub async fn set_approval(&self, place_id: i64, request: ApprovalRequest) -> Result<()> {
        let status = ApprovalStatus::parse(&request.status).ok_or_else(|| {
            crate::Error::Validation(format!("Invalid approval status: {}", request.status))
        })?;
        if status == ApprovalStatus::Pending {
            return Err(crate::Error::Validation(
                "approval decision must be APPROVED or REJECTED".to_string(),
            ));
        }

        self.repo
            .set_approval(place_id, status, request.reason.as_deref())
            .await?;
        tracing::info!(place_id, status = status.as_str(), "moderation decision applied");
        Ok(())
    }

    pub async fn set_registration(&self, place_id: i64, status_raw: &str) -> Result<()> {
        let status = RegistrationStatus::parse(status_raw).ok_or_else(|| {
            crate::Error::Validation(format!("Invalid registration status: {status_raw}"))
        })?;
        self.repo.set_registration(place_id, status).await?;
        tracing::info!(place_id, status = status.as_str(), "registration status changed");
        Ok(())
    }

    pub async fn keywords(&self) -> Result<Vec<Keyword>> {
        self.repo.list_keywords().await
    }
}
