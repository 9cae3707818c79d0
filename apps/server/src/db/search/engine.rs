//! Search orchestrator.
//!
//! Dispatch order: geospatial radius search when a center is present,
//! the dedicated keyword (tag) path when keyword ids are present,
//! otherwise the general seek-paginated path. All paths fetch
//! `size + 1` rows to detect whether another page exists, then enrich
//! the retained rows in batch.
//!
//! Store failures on this read path optionally degrade to an empty
//! result (`search.degrade_on_failure`): a broken search backend then
//! costs results, not availability. The trade-off is that callers
//! cannot tell "no matches" from "backend down"; the failure is logged
//! and counted either way.

use sqlx::PgPool;
use std::collections::HashMap;

use super::cursor::{self, Cursor};
use super::enrich::Enrichment;
use super::geo;
use super::params::{GeoQuery, SearchQuery};
use super::predicate::{self, SqlBuilder};
use super::sort;
use super::BindValue;
use crate::config::SearchConfig;
use crate::models::PlaceRow;
use crate::services::search::{PlaceSearchItem, SearchPage};
use crate::Result;

/// Joined projection selected by every page query; must line up with
/// `PlaceRow::from_row`.
pub(crate) const PLACE_COLUMNS: &str = "p.id, p.name, p.description, p.category, p.place_type, \
     p.is_active, p.approval_status, p.registration_status, \
     p.rating_avg, p.review_count, p.created_at, \
     l.province, l.city, l.district, l.full_address, l.detail_address, l.postal_code, \
     l.latitude, l.longitude, \
     pk.available AS parking_available, pk.parking_type, \
     c.phone, c.email, c.website";

pub(crate) const PLACE_FROM: &str = "FROM places p \
     JOIN locations l ON l.place_id = p.id \
     LEFT JOIN parkings pk ON pk.place_id = p.id \
     LEFT JOIN contacts c ON c.place_id = p.id";

/// Search engine executes place searches against the database.
pub struct SearchEngine {
    pool: PgPool,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(pool: PgPool, config: SearchConfig) -> Self {
        Self { pool, config }
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        crate::metrics::SEARCH_REQUESTS_TOTAL
            .with_label_values(&[query.mode()])
            .inc();

        let result = if let Some(geo_query) = query.geo {
            self.search_radius(query, &geo_query).await
        } else if !query.keyword_ids.is_empty() {
            self.search_keywords(query).await
        } else {
            self.search_general(query).await
        };

        match result {
            Err(crate::Error::Database(err)) if self.config.degrade_on_failure => {
                tracing::error!(
                    error = %err,
                    mode = query.mode(),
                    "search query failed; returning empty page"
                );
                crate::metrics::SEARCH_DEGRADED_TOTAL.inc();
                Ok(SearchPage::empty())
            }
            other => other,
        }
    }

    /// Count of rows the current filter matches, with no ordering,
    /// pagination, or enrichment.
    pub async fn count(&self, query: &SearchQuery) -> Result<i64> {
        crate::metrics::SEARCH_REQUESTS_TOTAL
            .with_label_values(&["count"])
            .inc();

        match self.count_inner(query).await {
            Err(crate::Error::Database(err)) if self.config.degrade_on_failure => {
                tracing::error!(error = %err, "count query failed; returning zero");
                crate::metrics::SEARCH_DEGRADED_TOTAL.inc();
                Ok(0)
            }
            other => other,
        }
    }

    async fn search_general(&self, query: &SearchQuery) -> Result<SearchPage> {
        self.run_seek_query(query, false).await
    }

    /// Dedicated tag path: the same seek machinery plus the keyword
    /// membership clause.
    async fn search_keywords(&self, query: &SearchQuery) -> Result<SearchPage> {
        self.run_seek_query(query, true).await
    }

    async fn run_seek_query(
        &self,
        query: &SearchQuery,
        with_keyword_filter: bool,
    ) -> Result<SearchPage> {
        let decoded = match &query.cursor {
            Some(raw) => Some(cursor::decode(raw, query.sort_by, query.direction)?),
            None => None,
        };

        let (sql, binds) = build_page_sql(query, decoded.as_ref(), with_keyword_filter);
        let mut rows = self.fetch_rows(&sql, &binds).await?;

        let has_next = rows.len() > query.size;
        rows.truncate(query.size); // drop the probe row

        // The next cursor pivots on the last retained row, not the probe.
        let next_cursor = if has_next {
            rows.last().map(|last| {
                let strategy = sort::strategy_for(query.sort_by);
                cursor::encode(&Cursor {
                    sort_by: query.sort_by,
                    direction: query.direction,
                    key: strategy.extract_key(last),
                    last_id: last.id,
                })
            })
        } else {
            None
        };

        let items = self.assemble(rows, None).await?;
        Ok(SearchPage {
            items,
            has_next,
            next_cursor,
        })
    }

    /// Radius search is first-page-only: `has_next` still reports whether
    /// more candidates exist within the radius, but continuation is a
    /// fresh request, not a cursor.
    async fn search_radius(&self, query: &SearchQuery, geo_query: &GeoQuery) -> Result<SearchPage> {
        if query.cursor.is_some() {
            tracing::debug!("ignoring cursor on radius search");
        }

        let mut candidates =
            geo::radius_candidates(&self.pool, query, geo_query, query.size + 1).await?;
        let has_next = candidates.len() > query.size;
        candidates.truncate(query.size);

        let rows = geo::fetch_rows_in_order(&self.pool, &candidates).await?;
        let distances: HashMap<i64, f64> = candidates
            .iter()
            .map(|c| (c.id, c.distance_m))
            .collect();

        let items = self.assemble(rows, Some(&distances)).await?;
        Ok(SearchPage {
            items,
            has_next,
            next_cursor: None,
        })
    }

    async fn count_inner(&self, query: &SearchQuery) -> Result<i64> {
        let (sql, binds) = build_count_sql(query);

        let mut scalar_query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &binds {
            scalar_query = match value {
                BindValue::Text(v) => scalar_query.bind(v.clone()),
                BindValue::Int(v) => scalar_query.bind(*v),
                BindValue::Float(v) => scalar_query.bind(*v),
                BindValue::Bool(v) => scalar_query.bind(*v),
                BindValue::IntArray(v) => scalar_query.bind(v.clone()),
            };
        }

        Ok(scalar_query.fetch_one(&self.pool).await?)
    }

    async fn fetch_rows(&self, sql: &str, binds: &[BindValue]) -> Result<Vec<PlaceRow>> {
        let mut row_query = sqlx::query(sql);
        for value in binds {
            row_query = match value {
                BindValue::Text(v) => row_query.bind(v.clone()),
                BindValue::Int(v) => row_query.bind(*v),
                BindValue::Float(v) => row_query.bind(*v),
                BindValue::Bool(v) => row_query.bind(*v),
                BindValue::IntArray(v) => row_query.bind(v.clone()),
            };
        }

        let rows = row_query.fetch_all(&self.pool).await?;
        rows.iter().map(PlaceRow::from_row).collect()
    }

    async fn assemble(
        &self,
        rows: Vec<PlaceRow>,
        distances: Option<&HashMap<i64, f64>>,
    ) -> Result<Vec<PlaceSearchItem>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let enrichment = Enrichment::load(&self.pool, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let distance = distances.and_then(|m| m.get(&row.id).copied());
                PlaceSearchItem::from_row(row, &enrichment, distance)
            })
            .collect())
    }
}

fn build_page_sql(
    query: &SearchQuery,
    cursor: Option<&Cursor>,
    with_keyword_filter: bool,
) -> (String, Vec<BindValue>) {
    let mut builder = SqlBuilder::new();
    predicate::apply_filters(query, &mut builder);
    if with_keyword_filter {
        predicate::push_keyword_membership(&query.keyword_ids, &mut builder);
    }

    let strategy = sort::strategy_for(query.sort_by);
    if let Some(cursor) = cursor {
        strategy.push_seek(cursor, query.direction, &mut builder);
    }

    let sql = format!(
        "SELECT {PLACE_COLUMNS} {PLACE_FROM} WHERE {} ORDER BY {} LIMIT {}",
        builder.where_sql(),
        strategy.order_by(query.direction),
        query.size + 1
    );
    (sql, builder.binds)
}

fn build_count_sql(query: &SearchQuery) -> (String, Vec<BindValue>) {
    let mut builder = SqlBuilder::new();
    predicate::apply_filters(query, &mut builder);
    if !query.keyword_ids.is_empty() {
        predicate::push_keyword_membership(&query.keyword_ids, &mut builder);
    }

    let mut sql = String::from("SELECT COUNT(*) FROM places p");
    if builder.needs_location {
        sql.push_str(" JOIN locations l ON l.place_id = p.id");
    }
    if builder.needs_parking {
        sql.push_str(" JOIN parkings pk ON pk.place_id = p.id");
    }
    sql.push_str(" WHERE ");
    sql.push_str(&builder.where_sql());

    (sql, builder.binds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::search::cursor::CursorKey;
    use crate::db::search::params::SearchRequest;
    use crate::models::{SortBy, SortDirection};

    fn query(request: SearchRequest) -> SearchQuery {
        request.normalize().unwrap()
    }

    #[test]
    fn page_sql_probes_one_extra_row() {
        let q = query(SearchRequest {
            size: Some(10),
            ..Default::default()
        });
        let (sql, _) = build_page_sql(&q, None, false);
        assert!(sql.ends_with("LIMIT 11"));
        assert!(sql.contains("p.deleted_at IS NULL"));
        assert!(sql.contains("ORDER BY p.id ASC"));
    }

    #[test]
    fn page_sql_appends_seek_predicate_for_cursor() {
        let q = query(SearchRequest {
            sort_by: Some("RATING".into()),
            sort_direction: Some("DESC".into()),
            ..Default::default()
        });
        let cursor = Cursor {
            sort_by: SortBy::Rating,
            direction: SortDirection::Desc,
            key: Some(CursorKey::Float(4.2)),
            last_id: 17,
        };
        let (sql, binds) = build_page_sql(&q, Some(&cursor), false);
        assert!(sql.contains("(p.rating_avg < $3 OR (p.rating_avg = $3 AND p.id > $4))"));
        assert!(sql.contains("ORDER BY p.rating_avg DESC, p.id ASC"));
        assert_eq!(binds[2], BindValue::Float(4.2));
        assert_eq!(binds[3], BindValue::Int(17));
    }

    #[test]
    fn page_sql_includes_keyword_membership_on_tag_path() {
        let q = query(SearchRequest {
            keyword_ids: Some(vec![4, 9]),
            ..Default::default()
        });
        let (sql, binds) = build_page_sql(&q, None, true);
        assert!(sql.contains("EXISTS (SELECT 1 FROM place_keyword_map m"));
        assert!(binds.contains(&BindValue::IntArray(vec![4, 9])));
    }

    #[test]
    fn count_sql_has_no_ordering_or_limit() {
        let q = query(SearchRequest {
            category: Some("Studio".into()),
            ..Default::default()
        });
        let (sql, binds) = build_count_sql(&q);
        assert!(sql.starts_with("SELECT COUNT(*) FROM places p WHERE "));
        assert!(!sql.contains("ORDER BY"));
        assert!(!sql.contains("LIMIT"));
        assert!(sql.contains("p.category = $3"));
        assert!(binds.contains(&BindValue::Text("Studio".to_string())));
    }

    #[test]
    fn count_sql_joins_only_what_filters_need() {
        let q = query(SearchRequest::default());
        let (sql, _) = build_count_sql(&q);
        assert!(!sql.contains("JOIN locations"));
        assert!(!sql.contains("JOIN parkings"));

        let q = query(SearchRequest {
            province: Some("Seoul".into()),
            parking_available: Some(true),
            ..Default::default()
        });
        let (sql, _) = build_count_sql(&q);
        assert!(sql.contains("JOIN locations l ON l.place_id = p.id"));
        assert!(sql.contains("JOIN parkings pk ON pk.place_id = p.id"));
    }

    #[test]
    fn count_sql_carries_keyword_membership() {
        let q = query(SearchRequest {
            keyword_ids: Some(vec![1]),
            ..Default::default()
        });
        let (sql, _) = build_count_sql(&q);
        assert!(sql.contains("EXISTS (SELECT 1 FROM place_keyword_map m"));
    }

    #[test]
    fn page_sql_shares_predicate_with_count_sql() {
        let request = SearchRequest {
            keyword: Some("rooftop".into()),
            province: Some("Seoul".into()),
            registration_status: Some("REGISTERED".into()),
            ..Default::default()
        };
        let q = query(request);
        let (page_sql, page_binds) = build_page_sql(&q, None, false);
        let (count_sql, count_binds) = build_count_sql(&q);

        for clause in [
            "p.deleted_at IS NULL",
            "p.registration_status = $3",
            "ILIKE $4",
            "l.province = $5",
        ] {
            assert!(page_sql.contains(clause), "page missing {clause}");
            assert!(count_sql.contains(clause), "count missing {clause}");
        }
        assert_eq!(page_binds, count_binds);
    }
}
