// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Everything that moves like state between the ledger, the persistent cache and the server.

pub mod executor;
pub mod reconcile;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use executor::{OptimisticMutationExecutor, ToggleOutcome, ToggleState};
pub use reconcile::{merge_like_state, ReconciliationEngine};
pub use state::{LikeSession, SharedSession};
