// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core identifiers.
//!
//! A like is a membership fact about `(user, target)`; these types name both halves.

pub mod identity;
pub mod ids;
pub mod target;

pub use identity::{UserIdentity, UserProfile};
pub use ids::{IdError, TargetId};
pub use target::{ParseTargetError, Target, TargetKind};
