// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Payload normalization for the blog API.
//!
//! The server is inconsistent about shapes: bodies may or may not be wrapped in
//! `{code, data, message}`, lists arrive as bare arrays or as `{records, total, ...}` pages,
//! membership is `isLiked` on one route and `liked` on another, and older documents store
//! `likes` as a string. Everything is decoded here so the core only sees `bool`, `u64` and id
//! lists.
//!
//! Nothing inside the crate calls these decoders: [`MemoryLikeServer`](super::MemoryLikeServer)
//! speaks in typed values. They are the boundary for embedders that implement
//! [`LikeApi`](super::LikeApi) over HTTP, one decoder per route.

use std::collections::{BTreeMap, HashSet};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::{ApiError, ApiErrorKind, LikeOutcome};
use crate::model::TargetId;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    Shape(&'static str),
}

impl From<WireError> for ApiError {
    fn from(err: WireError) -> Self {
        ApiError::new(ApiErrorKind::Unknown, err.to_string())
    }
}

/// A decoded list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing<T> {
    List(Vec<T>),
    Page(Page<T>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub current: Option<u64>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::List(items) => items,
            Self::Page(page) => page.records,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawListing<T> {
    List(Vec<T>),
    Page(Page<T>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Float(f64),
    Text(String),
}

impl Count {
    fn into_u64(self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Float(f) if f.is_finite() && f >= 0.0 => Some(f as u64),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
struct RawLikeResponse {
    #[serde(default, alias = "isLiked")]
    liked: Option<bool>,
    #[serde(default)]
    likes: Option<Count>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLikeStatus {
    Bare(bool),
    Object {
        #[serde(alias = "isLiked")]
        liked: bool,
    },
}

#[derive(Deserialize)]
struct RawErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

/// Peel `{code, data, message}` envelopes (possibly nested) down to the payload.
fn unwrap_envelope(mut value: Value) -> Value {
    loop {
        match value {
            Value::Object(mut map) if map.get("data").is_some_and(|data| !data.is_null()) => {
                value = map.remove("data").unwrap_or(Value::Null);
            }
            other => return other,
        }
    }
}

fn parse(body: &str) -> Result<Value, WireError> {
    Ok(unwrap_envelope(serde_json::from_str(body)?))
}

pub fn decode_listing<T: DeserializeOwned>(body: &str) -> Result<Listing<T>, WireError> {
    let raw: RawListing<T> = serde_json::from_value(parse(body)?)?;
    Ok(match raw {
        RawListing::List(items) => Listing::List(items),
        RawListing::Page(page) => Listing::Page(page),
    })
}

/// `like`/`unlike` responses. An empty body is a success with nothing authoritative.
pub fn decode_like_outcome(body: &str) -> Result<LikeOutcome, WireError> {
    if body.trim().is_empty() {
        return Ok(LikeOutcome::default());
    }
    let value = parse(body)?;
    if value.is_null() {
        return Ok(LikeOutcome::default());
    }
    if !value.is_object() {
        return Err(WireError::Shape("like response is not an object"));
    }
    let raw: RawLikeResponse = serde_json::from_value(value)?;
    Ok(LikeOutcome {
        liked: raw.liked,
        likes: raw.likes.and_then(Count::into_u64),
    })
}

pub fn decode_like_status(body: &str) -> Result<bool, WireError> {
    let raw: RawLikeStatus = serde_json::from_value(parse(body)?)?;
    Ok(match raw {
        RawLikeStatus::Bare(liked) | RawLikeStatus::Object { liked } => liked,
    })
}

/// Batch status map, restricted to the ids that were asked about.
///
/// Entries for unknown or invalid ids and non-boolean values are dropped rather than failing
/// the whole batch.
pub fn decode_batch_status(
    body: &str,
    requested: &[TargetId],
) -> Result<BTreeMap<TargetId, bool>, WireError> {
    let Value::Object(map) = parse(body)? else {
        return Err(WireError::Shape("batch status is not an object"));
    };
    let wanted = requested.iter().map(TargetId::as_str).collect::<HashSet<_>>();

    let mut statuses = BTreeMap::new();
    for (id, value) in map {
        if !wanted.contains(id.as_str()) {
            continue;
        }
        let (Ok(id), Some(liked)) = (TargetId::new(id), value.as_bool()) else {
            continue;
        };
        statuses.insert(id, liked);
    }
    Ok(statuses)
}

/// Turn a failed HTTP exchange into an [`ApiError`], preferring the transport status over the
/// `code` in the body.
pub fn decode_error(status: u16, body: &str) -> ApiError {
    let raw = serde_json::from_str::<RawErrorBody>(body).ok();
    let code = raw.as_ref().and_then(|raw| raw.code);
    let message = raw
        .and_then(|raw| raw.message)
        .unwrap_or_else(|| format!("request failed with status {status}"));
    let status = if status == 0 { code.unwrap_or(0) } else { status };
    ApiError::from_status(status, message)
}
