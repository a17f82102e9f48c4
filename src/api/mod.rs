// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The four server operations the like core consumes.
//!
//! Transport is somebody else's problem: an embedder implements [`LikeApi`] over whatever HTTP
//! client it has, normalizes payloads with [`wire`], and classifies failures into
//! [`ApiErrorKind`] exactly once via [`ApiError::from_status`].

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;

use crate::model::{Target, TargetId, TargetKind};

pub mod memory;
pub mod wire;

pub use memory::{ApiOp, MemoryLikeServer};

/// Server answer to a like/unlike call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LikeOutcome {
    /// Authoritative membership after the call, if the server reported it.
    pub liked: Option<bool>,
    /// Authoritative like count after the call, if the server reported it.
    pub likes: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// The server's recorded state disagrees with the requested transition.
    Conflict,
    Unauthorized,
    /// Network failure or timeout; no usable response.
    Transport,
    /// 5xx.
    Server,
    Unknown,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Conflict => "conflict",
            Self::Unauthorized => "unauthorized",
            Self::Transport => "transport",
            Self::Server => "server",
            Self::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    /// Classify an HTTP status. `0` means no response at all.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            0 | 408 => ApiErrorKind::Transport,
            400 | 409 => ApiErrorKind::Conflict,
            401 | 403 => ApiErrorKind::Unauthorized,
            500..=599 => ApiErrorKind::Server,
            _ => ApiErrorKind::Unknown,
        };
        Self {
            kind,
            status: (status != 0).then_some(status),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Conflict, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == ApiErrorKind::Conflict
    }
}

/// Server-side like operations, already scoped to the authenticated caller.
#[async_trait]
pub trait LikeApi: Send + Sync {
    async fn like(&self, target: &Target) -> Result<LikeOutcome, ApiError>;

    async fn unlike(&self, target: &Target) -> Result<LikeOutcome, ApiError>;

    /// Ids missing from the returned map are "server did not say".
    async fn batch_like_status(
        &self,
        kind: TargetKind,
        ids: &[TargetId],
    ) -> Result<BTreeMap<TargetId, bool>, ApiError>;

    async fn like_status(&self, target: &Target) -> Result<bool, ApiError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ApiError, ApiErrorKind};

    #[rstest]
    #[case(0, ApiErrorKind::Transport)]
    #[case(408, ApiErrorKind::Transport)]
    #[case(400, ApiErrorKind::Conflict)]
    #[case(409, ApiErrorKind::Conflict)]
    #[case(401, ApiErrorKind::Unauthorized)]
    #[case(403, ApiErrorKind::Unauthorized)]
    #[case(500, ApiErrorKind::Server)]
    #[case(503, ApiErrorKind::Server)]
    #[case(404, ApiErrorKind::Unknown)]
    #[case(302, ApiErrorKind::Unknown)]
    fn from_status_classifies(#[case] status: u16, #[case] expected: ApiErrorKind) {
        assert_eq!(ApiError::from_status(status, "x").kind, expected);
    }

    #[test]
    fn display_includes_status_when_present() {
        let err = ApiError::from_status(400, "already liked");
        assert_eq!(err.to_string(), "conflict error (status 400): already liked");
        assert_eq!(ApiError::transport("timeout").to_string(), "transport error: timeout");
    }
}
