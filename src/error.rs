// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::api::{ApiError, ApiErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeErrorKind {
    NotAuthenticated,
    Conflict,
    Transport,
}

/// Failures surfaced to UI callers.
///
/// Busy targets and conflicts that self-healed never show up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LikeError {
    #[error("login required to like content")]
    NotAuthenticated,
    #[error("like state conflict could not be resolved: {0}")]
    Conflict(ApiError),
    #[error("like request failed: {0}")]
    Transport(ApiError),
}

impl LikeError {
    pub fn kind(&self) -> LikeErrorKind {
        match self {
            Self::NotAuthenticated => LikeErrorKind::NotAuthenticated,
            Self::Conflict(_) => LikeErrorKind::Conflict,
            Self::Transport(_) => LikeErrorKind::Transport,
        }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::NotAuthenticated => None,
            Self::Conflict(err) | Self::Transport(err) => Some(err),
        }
    }
}

/// Unauthorized, server and unclassified failures are all handled like transport failures.
impl From<ApiError> for LikeError {
    fn from(err: ApiError) -> Self {
        match err.kind {
            ApiErrorKind::Conflict => Self::Conflict(err),
            ApiErrorKind::Unauthorized
            | ApiErrorKind::Transport
            | ApiErrorKind::Server
            | ApiErrorKind::Unknown => Self::Transport(err),
        }
    }
}
