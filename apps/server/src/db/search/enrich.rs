//! Batch enrichment of a result page.
//!
//! Loads thumbnails, keyword names, and room summaries for a page of
//! place ids in one statement per concern, keyed on the full id set.
//! The per-row N+1 fan-out this replaces is the exact failure mode the
//! invariant here guards: `load` must never issue one query per result.

use crate::Result;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

/// Bookable-room rollup for one place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomSummary {
    pub count: i64,
    pub ids: Vec<i64>,
}

/// Per-id lookups for everything a search item carries beyond its own row.
#[derive(Debug, Default)]
pub struct Enrichment {
    thumbnails: HashMap<i64, String>,
    keywords: HashMap<i64, Vec<String>>,
    rooms: HashMap<i64, RoomSummary>,
}

impl Enrichment {
    pub async fn load(pool: &PgPool, place_ids: &[i64]) -> Result<Self> {
        if place_ids.is_empty() {
            return Ok(Self::default());
        }
        let ids = place_ids.to_vec();

        let mut thumbnails = HashMap::new();
        let rows = sqlx::query(
            "SELECT DISTINCT ON (place_id) place_id, url \
             FROM place_images WHERE place_id = ANY($1) \
             ORDER BY place_id, position ASC",
        )
        .bind(ids.clone())
        .fetch_all(pool)
        .await?;
        for row in &rows {
            thumbnails.insert(row.try_get("place_id")?, row.try_get("url")?);
        }

        let mut keywords = HashMap::new();
        let rows = sqlx::query(
            "SELECT m.place_id, array_agg(k.name ORDER BY k.name) AS names \
             FROM place_keyword_map m JOIN keywords k ON k.id = m.keyword_id \
             WHERE m.place_id = ANY($1) GROUP BY m.place_id",
        )
        .bind(ids.clone())
        .fetch_all(pool)
        .await?;
        for row in &rows {
            keywords.insert(
                row.try_get("place_id")?,
                row.try_get::<Vec<String>, _>("names")?,
            );
        }

        let mut rooms = HashMap::new();
        let rows = sqlx::query(
            "SELECT place_id, COUNT(*) AS room_count, array_agg(id ORDER BY id) AS room_ids \
             FROM rooms WHERE place_id = ANY($1) GROUP BY place_id",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;
        for row in &rows {
            rooms.insert(
                row.try_get("place_id")?,
                RoomSummary {
                    count: row.try_get("room_count")?,
                    ids: row.try_get("room_ids")?,
                },
            );
        }

        Ok(Self {
            thumbnails,
            keywords,
            rooms,
        })
    }

    pub fn thumbnail(&self, place_id: i64) -> Option<String> {
        self.thumbnails.get(&place_id).cloned()
    }

    /// Missing entries degrade to empty, never an error: a place deleted
    /// between the page query and enrichment simply has no related data.
    pub fn keyword_names(&self, place_id: i64) -> Vec<String> {
        self.keywords.get(&place_id).cloned().unwrap_or_default()
    }

    pub fn rooms(&self, place_id: i64) -> RoomSummary {
        self.rooms.get(&place_id).cloned().unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        thumbnails: HashMap<i64, String>,
        keywords: HashMap<i64, Vec<String>>,
        rooms: HashMap<i64, RoomSummary>,
    ) -> Self {
        Self {
            thumbnails,
            keywords,
            rooms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entries_default_to_empty() {
        let enrichment = Enrichment::default();
        assert_eq!(enrichment.thumbnail(1), None);
        assert_eq!(enrichment.keyword_names(1), Vec::<String>::new());
        assert_eq!(enrichment.rooms(1), RoomSummary::default());
    }

    #[test]
    fn lookups_return_loaded_entries() {
        let mut rooms = HashMap::new();
        rooms.insert(
            7,
            RoomSummary {
                count: 2,
                ids: vec![10, 11],
            },
        );
        let mut thumbnails = HashMap::new();
        thumbnails.insert(7, "https://cdn.placehub.io/7/0.jpg".to_string());

        let enrichment = Enrichment::from_parts(thumbnails, HashMap::new(), rooms);
        assert_eq!(
            enrichment.thumbnail(7).as_deref(),
            Some("https://cdn.placehub.io/7/0.jpg")
        );
        assert_eq!(enrichment.rooms(7).count, 2);
        assert_eq!(enrichment.rooms(8).count, 0);
    }
}
