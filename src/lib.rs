// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Likeledger: optimistic like/unlike state for articles, talks and replies.
//!
//! A [`LikeFacade`] owns one user's like state: an in-memory ledger with per-target pending
//! flags and cooldowns, a persisted copy partitioned by identity, and the protocol that keeps
//! both in line with the server (optimistic writes, rollback, conflict self-heal).

pub mod api;
pub mod config;
pub mod error;
pub mod facade;
pub mod ledger;
pub mod model;
pub mod store;
pub mod sync;

pub use config::LikeConfig;
pub use error::{LikeError, LikeErrorKind};
pub use facade::LikeFacade;
pub use model::{Target, TargetId, TargetKind, UserIdentity, UserProfile};
pub use sync::ToggleOutcome;
