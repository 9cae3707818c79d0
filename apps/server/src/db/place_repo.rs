//! Place repository - write side and single-entity reads.
//!
//! All persistence mapping is explicit: hand-written SQL, hand-written
//! row mapping, and ordered statements instead of cascade-on-save. The
//! denormalized latitude/longitude scalars and the geometry point are
//! written together so they can never drift apart.

use crate::db::search::engine::{PLACE_COLUMNS, PLACE_FROM};
use crate::models::{
    ApprovalStatus, Keyword, PlaceRow, RegisterPlaceRequest, RegistrationStatus,
    UpdatePlaceRequest,
};
use crate::Result;
use sqlx::{PgPool, Postgres, Row, Transaction};

pub struct PlaceRepository {
    pool: PgPool,
}

impl PlaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a place with its owned rows. New places start inactive and
    /// PENDING; they become discoverable after approval + activation.
    pub async fn insert(&self, request: &RegisterPlaceRequest) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "INSERT INTO places \
                 (name, description, category, place_type, is_active, \
                  approval_status, registration_status, review_count) \
             VALUES ($1, $2, $3, $4, FALSE, 'PENDING', 'UNREGISTERED', 0) \
             RETURNING id",
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.category)
        .bind(&request.place_type)
        .fetch_one(&mut *tx)
        .await?;
        let place_id: i64 = row.get("id");

        let loc = &request.location;
        sqlx::query(
            "INSERT INTO locations \
                 (place_id, province, city, district, full_address, detail_address, \
                  postal_code, latitude, longitude, geom) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, \
                     ST_SetSRID(ST_MakePoint($9, $8), 4326))",
        )
        .bind(place_id)
        .bind(&loc.province)
        .bind(&loc.city)
        .bind(&loc.district)
        .bind(&loc.full_address)
        .bind(&loc.detail_address)
        .bind(&loc.postal_code)
        .bind(loc.latitude)
        .bind(loc.longitude)
        .execute(&mut *tx)
        .await?;

        if let Some(contact) = &request.contact {
            sqlx::query(
                "INSERT INTO contacts (place_id, phone, email, website) VALUES ($1, $2, $3, $4)",
            )
            .bind(place_id)
            .bind(&contact.phone)
            .bind(&contact.email)
            .bind(&contact.website)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(parking) = &request.parking {
            sqlx::query(
                "INSERT INTO parkings (place_id, available, parking_type) VALUES ($1, $2, $3)",
            )
            .bind(place_id)
            .bind(parking.available)
            .bind(&parking.parking_type)
            .execute(&mut *tx)
            .await?;
        }

        insert_images(&mut tx, place_id, &request.image_urls).await?;
        insert_keywords(&mut tx, place_id, &request.keyword_ids).await?;

        tx.commit().await?;
        Ok(place_id)
    }

    /// Replace the mutable sections of a place. Contact and parking are
    /// upserted when present and left untouched when absent; images and
    /// the keyword set are replaced wholesale.
    pub async fn update(&self, place_id: i64, request: &UpdatePlaceRequest) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE places SET name = $2, description = $3, category = $4, place_type = $5 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(place_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.category)
        .bind(&request.place_type)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(crate::Error::NotFound(format!("place {place_id}")));
        }

        let loc = &request.location;
        sqlx::query(
            "UPDATE locations SET province = $2, city = $3, district = $4, \
                 full_address = $5, detail_address = $6, postal_code = $7, \
                 latitude = $8, longitude = $9, \
                 geom = ST_SetSRID(ST_MakePoint($9, $8), 4326) \
             WHERE place_id = $1",
        )
        .bind(place_id)
        .bind(&loc.province)
        .bind(&loc.city)
        .bind(&loc.district)
        .bind(&loc.full_address)
        .bind(&loc.detail_address)
        .bind(&loc.postal_code)
        .bind(loc.latitude)
        .bind(loc.longitude)
        .execute(&mut *tx)
        .await?;

        if let Some(contact) = &request.contact {
            sqlx::query(
                "INSERT INTO contacts (place_id, phone, email, website) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (place_id) DO UPDATE SET \
                     phone = EXCLUDED.phone, email = EXCLUDED.email, website = EXCLUDED.website",
            )
            .bind(place_id)
            .bind(&contact.phone)
            .bind(&contact.email)
            .bind(&contact.website)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(parking) = &request.parking {
            sqlx::query(
                "INSERT INTO parkings (place_id, available, parking_type) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (place_id) DO UPDATE SET \
                     available = EXCLUDED.available, parking_type = EXCLUDED.parking_type",
            )
            .bind(place_id)
            .bind(parking.available)
            .bind(&parking.parking_type)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM place_images WHERE place_id = $1")
            .bind(place_id)
            .execute(&mut *tx)
            .await?;
        insert_images(&mut tx, place_id, &request.image_urls).await?;

        sqlx::query("DELETE FROM place_keyword_map WHERE place_id = $1")
            .bind(place_id)
            .execute(&mut *tx)
            .await?;
        insert_keywords(&mut tx, place_id, &request.keyword_ids).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn soft_delete(&self, place_id: i64) -> Result<()> {
        let result =
            sqlx::query("UPDATE places SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(place_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(crate::Error::NotFound(format!("place {place_id}")));
        }
        Ok(())
    }

    pub async fn set_active(&self, place_id: i64, active: bool) -> Result<()> {
        let result =
            sqlx::query("UPDATE places SET is_active = $2 WHERE id = $1 AND deleted_at IS NULL")
                .bind(place_id)
                .bind(active)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(crate::Error::NotFound(format!("place {place_id}")));
        }
        Ok(())
    }

    pub async fn set_approval(
        &self,
        place_id: i64,
        status: ApprovalStatus,
        reason: Option<&str>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE places SET approval_status = $2, approval_reason = $3 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(place_id)
        .bind(status.as_str())
        .bind(reason)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(crate::Error::NotFound(format!("place {place_id}")));
        }
        Ok(())
    }

    pub async fn set_registration(
        &self,
        place_id: i64,
        status: RegistrationStatus,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE places SET registration_status = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(place_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(crate::Error::NotFound(format!("place {place_id}")));
        }
        Ok(())
    }

    pub async fn fetch_detail_row(&self, place_id: i64) -> Result<Option<PlaceRow>> {
        let sql = format!(
            "SELECT {PLACE_COLUMNS} {PLACE_FROM} WHERE p.id = $1 AND p.deleted_at IS NULL"
        );
        let row = sqlx::query(&sql)
            .bind(place_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(PlaceRow::from_row).transpose()
    }

    pub async fn fetch_image_urls(&self, place_id: i64) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT url FROM place_images WHERE place_id = $1 ORDER BY position ASC",
        )
        .bind(place_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| Ok(row.try_get::<String, _>("url")?))
            .collect()
    }

    pub async fn list_keywords(&self) -> Result<Vec<Keyword>> {
        let rows = sqlx::query("SELECT id, name FROM keywords ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| {
                Ok(Keyword {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }
}

async fn insert_images(
    tx: &mut Transaction<'_, Postgres>,
    place_id: i64,
    urls: &[String],
) -> Result<()> {
    if urls.is_empty() {
        return Ok(());
    }
    // Single ordered statement; position follows the request order.
    sqlx::query(
        "INSERT INTO place_images (place_id, url, position) \
         SELECT $1, u.url, u.ord - 1 \
         FROM UNNEST($2::text[]) WITH ORDINALITY AS u(url, ord)",
    )
    .bind(place_id)
    .bind(urls.to_vec())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_keywords(
    tx: &mut Transaction<'_, Postgres>,
    place_id: i64,
    keyword_ids: &[i64],
) -> Result<()> {
    if keyword_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO place_keyword_map (place_id, keyword_id) \
         SELECT $1, kid FROM UNNEST($2::bigint[]) AS kid \
         ON CONFLICT DO NOTHING",
    )
    .bind(place_id)
    .bind(keyword_ids.to_vec())
    .execute(&mut **tx)
    .await?;
    Ok(())
}
