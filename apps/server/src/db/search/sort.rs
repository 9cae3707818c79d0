//! Sort strategy lookup table.
//!
//! Each sort field bundles the three capabilities the engine needs:
//! the ORDER BY clause (with null handling), the seek-predicate builder
//! used with a decoded cursor, and the cursor-key extractor for the next
//! page token. DISTANCE is special: the distance is computed by the
//! radius search, not stored, so without geospatial parameters it
//! degrades to plain id ordering.

use super::cursor::{Cursor, CursorKey};
use super::predicate::SqlBuilder;
use super::BindValue;
use crate::models::{PlaceRow, SortBy, SortDirection};

pub struct SortStrategy {
    pub sort_by: SortBy,
    column: Option<&'static str>,
    /// RATING is the only nullable sort column; ascending sorts push the
    /// unrated places to the end.
    nulls_last_on_asc: bool,
    /// CREATED_AT pivots travel as epoch seconds and are rebound through
    /// to_timestamp().
    epoch_key: bool,
}

const STRATEGIES: &[SortStrategy] = &[
    SortStrategy {
        sort_by: SortBy::Distance,
        column: None,
        nulls_last_on_asc: false,
        epoch_key: false,
    },
    SortStrategy {
        sort_by: SortBy::Rating,
        column: Some("p.rating_avg"),
        nulls_last_on_asc: true,
        epoch_key: false,
    },
    SortStrategy {
        sort_by: SortBy::ReviewCount,
        column: Some("p.review_count"),
        nulls_last_on_asc: false,
        epoch_key: false,
    },
    SortStrategy {
        sort_by: SortBy::CreatedAt,
        column: Some("p.created_at"),
        nulls_last_on_asc: false,
        epoch_key: true,
    },
    SortStrategy {
        sort_by: SortBy::PlaceName,
        column: Some("p.name"),
        nulls_last_on_asc: false,
        epoch_key: false,
    },
];

pub fn strategy_for(sort_by: SortBy) -> &'static SortStrategy {
    STRATEGIES
        .iter()
        .find(|s| s.sort_by == sort_by)
        .expect("every sort field has a strategy entry")
}

impl SortStrategy {
    /// Final ORDER BY always ends with `p.id ASC` so the total order is
    /// unique and pagination is deterministic.
    pub fn order_by(&self, direction: SortDirection) -> String {
        match self.column {
            None => "p.id ASC".to_string(),
            Some(column) => {
                let nulls = if self.nulls_last_on_asc && direction == SortDirection::Asc {
                    " NULLS LAST"
                } else {
                    ""
                };
                format!("{column} {}{nulls}, p.id ASC", direction.as_sql())
            }
        }
    }

    /// Append the seek predicate for a decoded cursor.
    ///
    /// Ascending: `(F > pivot OR (F = pivot AND id > last_id))`; descending
    /// flips the primary comparison only. The id tie-break is always
    /// ascending regardless of direction, matching the ORDER BY suffix.
    /// Without a usable pivot the seek falls back to `id > last_id`.
    pub fn push_seek(&self, cursor: &Cursor, direction: SortDirection, builder: &mut SqlBuilder) {
        let (Some(column), Some(key)) = (self.column, cursor.key.as_ref()) else {
            let id_idx = builder.push_bind(BindValue::Int(cursor.last_id));
            builder.push_clause(format!("p.id > ${id_idx}"));
            return;
        };

        let key_idx = builder.push_bind(key.to_bind());
        let id_idx = builder.push_bind(BindValue::Int(cursor.last_id));
        let pivot = if self.epoch_key {
            format!("to_timestamp(${key_idx})")
        } else {
            format!("${key_idx}")
        };
        let cmp = match direction {
            SortDirection::Asc => ">",
            SortDirection::Desc => "<",
        };
        builder.push_clause(format!(
            "({column} {cmp} {pivot} OR ({column} = {pivot} AND p.id > ${id_idx}))"
        ));
    }

    /// Cursor key for the next-page token, taken from the last retained
    /// row of the current page.
    pub fn extract_key(&self, row: &PlaceRow) -> Option<CursorKey> {
        match self.sort_by {
            SortBy::Distance => None,
            SortBy::Rating => row.rating_avg.map(CursorKey::Float),
            SortBy::ReviewCount => Some(CursorKey::Int(row.review_count)),
            SortBy::CreatedAt => Some(CursorKey::Int(row.created_at.timestamp())),
            SortBy::PlaceName => Some(CursorKey::Text(row.name.clone())),
        }
    }
}
