//! Opaque keyset-pagination cursor codec.
//!
//! A cursor pins an absolute position in the sort order: the last row's
//! id plus the last value of the primary sort field. Tokens are versioned
//! and self-describing (they carry the sort field and direction they were
//! issued for) so a cursor replayed under a different sort order fails
//! decoding instead of silently misapplying the seek predicate.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use super::BindValue;
use crate::models::{SortBy, SortDirection};
use crate::Result;

const CURSOR_VERSION: u8 = 1;

/// Typed pivot value of the primary sort field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CursorKey {
    Int(i64),
    Float(f64),
    Text(String),
}

impl CursorKey {
    pub fn to_bind(&self) -> BindValue {
        match self {
            CursorKey::Int(v) => BindValue::Int(*v),
            CursorKey::Float(v) => BindValue::Float(*v),
            CursorKey::Text(v) => BindValue::Text(v.clone()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            CursorKey::Int(_) => "integer",
            CursorKey::Float(_) => "number",
            CursorKey::Text(_) => "text",
        }
    }
}

/// Decoded pagination pivot.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub sort_by: SortBy,
    pub direction: SortDirection,
    /// Absent for id-only ordering (DISTANCE fallback) and for rows whose
    /// sort value is NULL (nullable RATING).
    pub key: Option<CursorKey>,
    pub last_id: i64,
}

#[derive(Serialize, Deserialize)]
struct Token {
    v: u8,
    sort: String,
    dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<CursorKey>,
    id: i64,
}

pub fn encode(cursor: &Cursor) -> String {
    let token = Token {
        v: CURSOR_VERSION,
        sort: cursor.sort_by.as_str().to_string(),
        dir: cursor.direction.as_str().to_string(),
        key: cursor.key.clone(),
        id: cursor.last_id,
    };
    let raw = serde_json::to_vec(&token).expect("cursor token serialization cannot fail");
    URL_SAFE_NO_PAD.encode(raw)
}

/// Decode and validate a cursor against the sort order of the current
/// request. Every failure is a `CursorDecode` error so callers can
/// distinguish "restart from page one" from other client errors.
pub fn decode(raw: &str, expected_sort: SortBy, expected_dir: SortDirection) -> Result<Cursor> {
    let bytes = URL_SAFE_NO_PAD
        .decode(raw)
        .map_err(|_| crate::Error::CursorDecode("cursor is not valid base64url".to_string()))?;

    let token: Token = serde_json::from_slice(&bytes)
        .map_err(|_| crate::Error::CursorDecode("cursor payload is malformed".to_string()))?;

    if token.v != CURSOR_VERSION {
        return Err(crate::Error::CursorDecode(format!(
            "unsupported cursor version: {}",
            token.v
        )));
    }

    let sort_by = SortBy::parse(&token.sort).ok_or_else(|| {
        crate::Error::CursorDecode(format!("cursor names an unknown sort field: {}", token.sort))
    })?;
    let direction = SortDirection::parse(&token.dir).ok_or_else(|| {
        crate::Error::CursorDecode(format!("cursor names an unknown direction: {}", token.dir))
    })?;

    if sort_by != expected_sort || direction != expected_dir {
        return Err(crate::Error::CursorDecode(
            "cursor was issued for a different sort order".to_string(),
        ));
    }

    validate_key(sort_by, token.key.as_ref())?;

    Ok(Cursor {
        sort_by,
        direction,
        key: token.key,
        last_id: token.id,
    })
}

fn validate_key(sort_by: SortBy, key: Option<&CursorKey>) -> Result<()> {
    let ok = match (sort_by, key) {
        // Id-only ordering carries no key; a NULL rating pivot degrades to
        // id-only as well.
        (SortBy::Distance, None) | (SortBy::Rating, None) => true,
        (SortBy::Rating, Some(CursorKey::Float(_) | CursorKey::Int(_))) => true,
        (SortBy::ReviewCount, Some(CursorKey::Int(_))) => true,
        (SortBy::CreatedAt, Some(CursorKey::Int(_))) => true,
        (SortBy::PlaceName, Some(CursorKey::Text(_))) => true,
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(crate::Error::CursorDecode(format!(
            "cursor key {} does not match sort field {}",
            key.map(CursorKey::kind).unwrap_or("absent"),
            sort_by.as_str()
        )))
    }
}
