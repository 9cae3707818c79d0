//! Table-driven predicate builder.
//!
//! Translates a `SearchQuery` into a conjunction of parameterized SQL
//! clauses plus the joins needed to evaluate them. One table entry per
//! logical filter; the table order only fixes bind numbering. Pure: no
//! side effects beyond the builder passed in.

use super::params::SearchQuery;
use super::BindValue;

/// Accumulates WHERE clauses and their bind values. Placeholder indexes
/// are `$n` with n continuing across everything appended to one builder,
/// so the seek predicate and geo clauses share the same numbering.
#[derive(Debug, Default)]
pub struct SqlBuilder {
    pub clauses: Vec<String>,
    pub binds: Vec<BindValue>,
    /// Filters referenced the locations table (region clauses).
    pub needs_location: bool,
    /// Filters referenced the parkings table.
    pub needs_parking: bool,
}

impl SqlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a bind value and return its 1-based placeholder index.
    pub fn push_bind(&mut self, value: BindValue) -> usize {
        self.binds.push(value);
        self.binds.len()
    }

    pub fn push_clause(&mut self, clause: String) {
        self.clauses.push(clause);
    }

    pub fn where_sql(&self) -> String {
        self.clauses.join(" AND ")
    }
}

type FilterFn = fn(&SearchQuery, &mut SqlBuilder);

/// Filters applied to every search path, the radius path included:
/// soft-delete, activation, approval, and the optional registration state.
const BASELINE_FILTERS: &[FilterFn] = &[
    filter_not_deleted,
    filter_active,
    filter_approval,
    filter_registration,
];

/// One entry per caller-controlled filter.
const OPTIONAL_FILTERS: &[FilterFn] = &[
    filter_keyword,
    filter_place_name,
    filter_category,
    filter_place_type,
    filter_parking,
    filter_region,
];

pub fn apply_filters(query: &SearchQuery, builder: &mut SqlBuilder) {
    for filter in BASELINE_FILTERS {
        filter(query, builder);
    }
    for filter in OPTIONAL_FILTERS {
        filter(query, builder);
    }
}

/// The radius search is restricted to the baseline filters; the general
/// filters do not apply to location discovery.
pub fn apply_baseline_filters(query: &SearchQuery, builder: &mut SqlBuilder) {
    for filter in BASELINE_FILTERS {
        filter(query, builder);
    }
}

fn filter_not_deleted(_query: &SearchQuery, builder: &mut SqlBuilder) {
    builder.push_clause("p.deleted_at IS NULL".to_string());
}

fn filter_active(query: &SearchQuery, builder: &mut SqlBuilder) {
    let idx = builder.push_bind(BindValue::Bool(query.is_active));
    builder.push_clause(format!("p.is_active = ${idx}"));
}

fn filter_approval(query: &SearchQuery, builder: &mut SqlBuilder) {
    let idx = builder.push_bind(BindValue::Text(query.approval_status.as_str().to_string()));
    builder.push_clause(format!("p.approval_status = ${idx}"));
}

/// Free-text match against name OR description OR category.
fn filter_keyword(query: &SearchQuery, builder: &mut SqlBuilder) {
    let Some(keyword) = &query.keyword else {
        return;
    };
    let pattern = format!("%{}%", escape_like_pattern(keyword));
    let idx = builder.push_bind(BindValue::Text(pattern));
    builder.push_clause(format!(
        "(p.name ILIKE ${idx} OR p.description ILIKE ${idx} OR p.category ILIKE ${idx})"
    ));
}

fn filter_place_name(query: &SearchQuery, builder: &mut SqlBuilder) {
    let Some(name) = &query.place_name else {
        return;
    };
    let pattern = format!("%{}%", escape_like_pattern(name));
    let idx = builder.push_bind(BindValue::Text(pattern));
    builder.push_clause(format!("p.name ILIKE ${idx}"));
}

fn filter_category(query: &SearchQuery, builder: &mut SqlBuilder) {
    let Some(category) = &query.category else {
        return;
    };
    let idx = builder.push_bind(BindValue::Text(category.clone()));
    builder.push_clause(format!("p.category = ${idx}"));
}

fn filter_place_type(query: &SearchQuery, builder: &mut SqlBuilder) {
    let Some(place_type) = &query.place_type else {
        return;
    };
    let idx = builder.push_bind(BindValue::Text(place_type.clone()));
    builder.push_clause(format!("p.place_type = ${idx}"));
}

fn filter_parking(query: &SearchQuery, builder: &mut SqlBuilder) {
    let Some(available) = query.parking_available else {
        return;
    };
    builder.needs_parking = true;
    let idx = builder.push_bind(BindValue::Bool(available));
    builder.push_clause(format!("pk.available = ${idx}"));
}

/// Up to three independent exact-match clauses; a partial region
/// filter (province only, province + city, ...) is valid.
fn filter_region(query: &SearchQuery, builder: &mut SqlBuilder) {
    if let Some(province) = &query.region.province {
        builder.needs_location = true;
        let idx = builder.push_bind(BindValue::Text(province.clone()));
        builder.push_clause(format!("l.province = ${idx}"));
    }
    if let Some(city) = &query.region.city {
        builder.needs_location = true;
        let idx = builder.push_bind(BindValue::Text(city.clone()));
        builder.push_clause(format!("l.city = ${idx}"));
    }
    if let Some(district) = &query.region.district {
        builder.needs_location = true;
        let idx = builder.push_bind(BindValue::Text(district.clone()));
        builder.push_clause(format!("l.district = ${idx}"));
    }
}

fn filter_registration(query: &SearchQuery, builder: &mut SqlBuilder) {
    let Some(status) = query.registration_status else {
        return;
    };
    let idx = builder.push_bind(BindValue::Text(status.as_str().to_string()));
    builder.push_clause(format!("p.registration_status = ${idx}"));
}

/// Tag membership as an EXISTS test so the join cannot multiply result
/// rows; this keeps the keyword path compatible with the seek cursor.
pub fn push_keyword_membership(keyword_ids: &[i64], builder: &mut SqlBuilder) {
    let idx = builder.push_bind(BindValue::IntArray(keyword_ids.to_vec()));
    builder.push_clause(format!(
        "EXISTS (SELECT 1 FROM place_keyword_map m WHERE m.place_id = p.id AND m.keyword_id = ANY(${idx}))"
    ));
}

/// Escape SQL LIKE meta-characters so user input is treated literally.
pub(crate) fn escape_like_pattern(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::search::params::SearchRequest;

    fn build(request: SearchRequest) -> SqlBuilder {
        let query = request.normalize().unwrap();
        let mut builder = SqlBuilder::new();
        apply_filters(&query, &mut builder);
        builder
    }

    #[test]
    fn baseline_filters_are_always_present() {
        let builder = build(SearchRequest::default());
        let sql = builder.where_sql();
        assert!(sql.contains("p.deleted_at IS NULL"));
        assert!(sql.contains("p.is_active = $1"));
        assert!(sql.contains("p.approval_status = $2"));
        assert_eq!(
            builder.binds,
            vec![
                BindValue::Bool(true),
                BindValue::Text("APPROVED".to_string())
            ]
        );
    }

    #[test]
    fn keyword_matches_name_or_description_or_category() {
        let builder = build(SearchRequest {
            keyword: Some("studio".into()),
            ..Default::default()
        });
        let sql = builder.where_sql();
        assert!(sql.contains(
            "(p.name ILIKE $3 OR p.description ILIKE $3 OR p.category ILIKE $3)"
        ));
        assert!(builder
            .binds
            .contains(&BindValue::Text("%studio%".to_string())));
    }

    #[test]
    fn keyword_pattern_escapes_like_metacharacters() {
        let builder = build(SearchRequest {
            keyword: Some("50%_off".into()),
            ..Default::default()
        });
        assert!(builder
            .binds
            .contains(&BindValue::Text("%50\\%\\_off%".to_string())));
    }

    #[test]
    fn region_clauses_are_independent() {
        let builder = build(SearchRequest {
            province: Some("Seoul".into()),
            ..Default::default()
        });
        let sql = builder.where_sql();
        assert!(sql.contains("l.province = $3"));
        assert!(!sql.contains("l.city"));
        assert!(!sql.contains("l.district"));
        assert!(builder.needs_location);

        let builder = build(SearchRequest {
            province: Some("Seoul".into()),
            city: Some("Gangnam-gu".into()),
            ..Default::default()
        });
        let sql = builder.where_sql();
        assert!(sql.contains("l.province = $3"));
        assert!(sql.contains("l.city = $4"));
        assert!(!sql.contains("l.district"));
    }

    #[test]
    fn parking_filter_requires_the_parking_join() {
        let builder = build(SearchRequest {
            parking_available: Some(true),
            ..Default::default()
        });
        assert!(builder.needs_parking);
        assert!(builder.where_sql().contains("pk.available = $3"));

        let builder = build(SearchRequest::default());
        assert!(!builder.needs_parking);
    }

    #[test]
    fn absent_registration_filter_means_no_clause() {
        let builder = build(SearchRequest::default());
        assert!(!builder.where_sql().contains("registration_status"));

        let builder = build(SearchRequest {
            registration_status: Some("UNREGISTERED".into()),
            ..Default::default()
        });
        assert!(builder
            .where_sql()
            .contains("p.registration_status = $3"));
        assert!(builder
            .binds
            .contains(&BindValue::Text("UNREGISTERED".to_string())));
    }

    #[test]
    fn exact_filters_bind_raw_values() {
        let builder = build(SearchRequest {
            category: Some("Studio".into()),
            place_type: Some("RENTAL".into()),
            ..Default::default()
        });
        let sql = builder.where_sql();
        assert!(sql.contains("p.category = $3"));
        assert!(sql.contains("p.place_type = $4"));
    }

    #[test]
    fn keyword_membership_uses_exists_over_map_table() {
        let mut builder = SqlBuilder::new();
        push_keyword_membership(&[1, 2, 3], &mut builder);
        let sql = builder.where_sql();
        assert!(sql.contains("EXISTS (SELECT 1 FROM place_keyword_map m"));
        assert!(sql.contains("m.keyword_id = ANY($1)"));
        assert_eq!(builder.binds, vec![BindValue::IntArray(vec![1, 2, 3])]);
    }
}
