//! Radius search against the store's geospatial operators.
//!
//! The candidate query runs baseline filters plus a bounding-box
//! prefilter over the denormalized latitude/longitude scalars, then the
//! exact `ST_DWithin` containment test, ordered by `ST_Distance`
//! ascending. Candidates are re-fetched as full rows by id, which does
//! not preserve order, so the rows are re-sorted back into the candidate
//! sequence before enrichment.

use super::params::{GeoQuery, SearchQuery};
use super::predicate::{self, SqlBuilder};
use super::BindValue;
use crate::models::PlaceRow;
use crate::Result;
use placehub_geo::BoundingBox;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GeoCandidate {
    pub id: i64,
    pub distance_m: f64,
}

pub(crate) fn build_candidate_sql(
    query: &SearchQuery,
    geo: &GeoQuery,
    limit: usize,
) -> (String, Vec<BindValue>) {
    let mut builder = SqlBuilder::new();
    predicate::apply_baseline_filters(query, &mut builder);

    let bbox = BoundingBox::around(geo.center, geo.radius_m as f64);
    let min_lat = builder.push_bind(BindValue::Float(bbox.min_lat));
    let max_lat = builder.push_bind(BindValue::Float(bbox.max_lat));
    let min_lng = builder.push_bind(BindValue::Float(bbox.min_lng));
    let max_lng = builder.push_bind(BindValue::Float(bbox.max_lng));
    builder.push_clause(format!("l.latitude BETWEEN ${min_lat} AND ${max_lat}"));
    builder.push_clause(format!("l.longitude BETWEEN ${min_lng} AND ${max_lng}"));

    let lng = builder.push_bind(BindValue::Float(geo.center.longitude));
    let lat = builder.push_bind(BindValue::Float(geo.center.latitude));
    let radius = builder.push_bind(BindValue::Float(geo.radius_m as f64));
    let center = format!("ST_SetSRID(ST_MakePoint(${lng}, ${lat}), 4326)::geography");
    builder.push_clause(format!(
        "ST_DWithin(l.geom::geography, {center}, ${radius})"
    ));

    let sql = format!(
        "SELECT p.id, ST_Distance(l.geom::geography, {center}) AS distance_m \
         FROM places p JOIN locations l ON l.place_id = p.id \
         WHERE {} ORDER BY distance_m ASC, p.id ASC LIMIT {limit}",
        builder.where_sql()
    );
    (sql, builder.binds)
}

pub(crate) async fn radius_candidates(
    pool: &PgPool,
    query: &SearchQuery,
    geo: &GeoQuery,
    limit: usize,
) -> Result<Vec<GeoCandidate>> {
    let (sql, binds) = build_candidate_sql(query, geo, limit);

    let mut candidate_query = sqlx::query(&sql);
    for value in &binds {
        candidate_query = match value {
            BindValue::Text(v) => candidate_query.bind(v.clone()),
            BindValue::Int(v) => candidate_query.bind(*v),
            BindValue::Float(v) => candidate_query.bind(*v),
            BindValue::Bool(v) => candidate_query.bind(*v),
            BindValue::IntArray(v) => candidate_query.bind(v.clone()),
        };
    }

    let rows = candidate_query.fetch_all(pool).await?;
    rows.iter()
        .map(|row| {
            Ok(GeoCandidate {
                id: row.try_get("id")?,
                distance_m: row.try_get("distance_m")?,
            })
        })
        .collect()
}

/// Fetch full rows for the candidates and restore the distance order.
pub(crate) async fn fetch_rows_in_order(
    pool: &PgPool,
    candidates: &[GeoCandidate],
) -> Result<Vec<PlaceRow>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = candidates.iter().map(|c| c.id).collect();
    let sql = format!(
        "SELECT {} {} WHERE p.id = ANY($1)",
        super::engine::PLACE_COLUMNS,
        super::engine::PLACE_FROM
    );
    let rows = sqlx::query(&sql).bind(ids).fetch_all(pool).await?;

    let fetched = rows
        .iter()
        .map(PlaceRow::from_row)
        .collect::<Result<Vec<_>>>()?;
    Ok(restore_candidate_order(candidates, fetched))
}

fn restore_candidate_order(candidates: &[GeoCandidate], rows: Vec<PlaceRow>) -> Vec<PlaceRow> {
    let mut by_id: HashMap<i64, PlaceRow> = rows.into_iter().map(|r| (r.id, r)).collect();
    candidates
        .iter()
        .filter_map(|c| by_id.remove(&c.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::search::params::SearchRequest;
    use chrono::{TimeZone, Utc};

    fn geo_query() -> (SearchQuery, GeoQuery) {
        let query = SearchRequest {
            latitude: Some(37.4979),
            longitude: Some(127.0276),
            radius: Some(5_000),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        let geo = query.geo.unwrap();
        (query, geo)
    }

    fn row(id: i64) -> PlaceRow {
        PlaceRow {
            id,
            name: format!("Place {id}"),
            description: String::new(),
            category: "Studio".into(),
            place_type: "RENTAL".into(),
            is_active: true,
            approval_status: "APPROVED".into(),
            registration_status: "UNREGISTERED".into(),
            rating_avg: None,
            review_count: 0,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            province: "Seoul".into(),
            city: "Gangnam-gu".into(),
            district: "Yeoksam-dong".into(),
            full_address: "123 Teheran-ro".into(),
            detail_address: None,
            postal_code: None,
            latitude: 37.4979,
            longitude: 127.0276,
            parking_available: None,
            parking_type: None,
            phone: None,
            email: None,
            website: None,
        }
    }

    #[test]
    fn candidate_sql_orders_by_distance_with_containment() {
        let (query, geo) = geo_query();
        let (sql, binds) = build_candidate_sql(&query, &geo, 21);

        assert!(sql.contains("ST_DWithin(l.geom::geography"));
        assert!(sql.contains("ST_Distance(l.geom::geography"));
        assert!(sql.contains("ORDER BY distance_m ASC, p.id ASC"));
        assert!(sql.ends_with("LIMIT 21"));
        // Baseline filters still apply to location discovery.
        assert!(sql.contains("p.deleted_at IS NULL"));
        assert!(sql.contains("p.is_active = $1"));
        assert!(sql.contains("p.approval_status = $2"));
        assert!(binds.contains(&BindValue::Float(5_000.0)));
    }

    #[test]
    fn candidate_sql_prefilters_with_bounding_box() {
        let (query, geo) = geo_query();
        let (sql, binds) = build_candidate_sql(&query, &geo, 21);

        assert!(sql.contains("l.latitude BETWEEN $3 AND $4"));
        assert!(sql.contains("l.longitude BETWEEN $5 AND $6"));

        // The box must contain the center itself.
        let (BindValue::Float(min_lat), BindValue::Float(max_lat)) = (&binds[2], &binds[3]) else {
            panic!("expected latitude bounds");
        };
        assert!(*min_lat < 37.4979 && 37.4979 < *max_lat);
    }

    #[test]
    fn candidate_sql_keeps_optional_filters_out() {
        let query = SearchRequest {
            latitude: Some(37.4979),
            longitude: Some(127.0276),
            keyword: Some("studio".into()),
            category: Some("Studio".into()),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        let geo = query.geo.unwrap();
        let (sql, _) = build_candidate_sql(&query, &geo, 21);
        assert!(!sql.contains("ILIKE"));
        assert!(!sql.contains("p.category"));
    }

    #[test]
    fn candidate_sql_carries_registration_filter() {
        let query = SearchRequest {
            latitude: Some(37.4979),
            longitude: Some(127.0276),
            registration_status: Some("REGISTERED".into()),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        let geo = query.geo.unwrap();
        let (sql, binds) = build_candidate_sql(&query, &geo, 21);
        assert!(sql.contains("p.registration_status = $3"));
        assert!(binds.contains(&BindValue::Text("REGISTERED".to_string())));
    }

    #[test]
    fn rows_are_restored_to_candidate_order() {
        let candidates = vec![
            GeoCandidate {
                id: 3,
                distance_m: 10.0,
            },
            GeoCandidate {
                id: 1,
                distance_m: 20.0,
            },
            GeoCandidate {
                id: 2,
                distance_m: 30.0,
            },
        ];
        // Simulates an id-keyed re-fetch coming back in a different order.
        let rows = vec![row(1), row(2), row(3)];
        let ordered = restore_candidate_order(&candidates, rows);
        let ids: Vec<i64> = ordered.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn missing_rows_are_skipped_without_breaking_order() {
        let candidates = vec![
            GeoCandidate {
                id: 3,
                distance_m: 10.0,
            },
            GeoCandidate {
                id: 9,
                distance_m: 15.0,
            },
            GeoCandidate {
                id: 1,
                distance_m: 20.0,
            },
        ];
        let rows = vec![row(1), row(3)];
        let ordered = restore_candidate_order(&candidates, rows);
        let ids: Vec<i64> = ordered.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
