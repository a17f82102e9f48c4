// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The surface UI code talks to.
//!
//! Reads are synchronous and never touch the network. Commands delegate to the reconciliation
//! engine and the mutation executor; `initialize` and `reset` are serialized so a reset has fully
//! erased the old partition before the next identity is installed.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::api::LikeApi;
use crate::config::LikeConfig;
use crate::error::LikeError;
use crate::model::{Target, TargetId, TargetKind, UserIdentity, UserProfile};
use crate::store::{KeyValueStore, PersistentLikeCache};
use crate::sync::{
    OptimisticMutationExecutor, ReconciliationEngine, SharedSession, ToggleOutcome,
};

pub struct LikeFacade {
    session: SharedSession,
    engine: ReconciliationEngine,
    executor: OptimisticMutationExecutor,
    lifecycle: AsyncMutex<()>,
}

impl LikeFacade {
    pub fn new(api: Arc<dyn LikeApi>, store: Arc<dyn KeyValueStore>, config: &LikeConfig) -> Self {
        let session = SharedSession::new(PersistentLikeCache::new(store), config.cooldown());
        let engine = ReconciliationEngine::new(api.clone(), session.clone());
        let executor = OptimisticMutationExecutor::new(api, session.clone(), engine.clone());
        Self {
            session,
            engine,
            executor,
            lifecycle: AsyncMutex::new(()),
        }
    }

    pub fn is_liked(&self, target: &Target) -> bool {
        self.session.read(|session| session.ledger().has(target))
    }

    pub fn is_pending(&self, target: &Target) -> bool {
        self.session.read(|session| session.ledger().is_pending(target))
    }

    pub fn like_count(&self, target: &Target) -> Option<u64> {
        self.session.read(|session| session.ledger().like_count(target))
    }

    /// Seed the display count, e.g. from a list payload.
    pub fn set_like_count(&self, target: &Target, likes: u64) {
        self.session
            .write(|txn| txn.ledger_mut().set_like_count(target, Some(likes)));
    }

    pub fn liked_ids(&self, kind: TargetKind) -> BTreeSet<TargetId> {
        self.session.read(|session| session.ledger().liked_ids(kind))
    }

    pub fn is_initialized(&self) -> bool {
        self.session.read(|session| session.is_initialized())
    }

    pub fn identity(&self) -> Option<UserIdentity> {
        self.session.read(|session| session.identity().cloned())
    }

    pub async fn toggle(&self, target: &Target) -> Result<ToggleOutcome, LikeError> {
        self.executor.toggle(target).await
    }

    pub async fn initialize(&self, identity: UserIdentity, targets: &[Target]) {
        let _lifecycle = self.lifecycle.lock().await;
        info!(%identity, targets = targets.len(), "initializing like state");
        self.engine.initialize(identity, targets).await;
    }

    /// Like [`initialize`](Self::initialize) for a raw profile; anonymous profiles are refused.
    pub async fn initialize_profile(
        &self,
        profile: &UserProfile,
        targets: &[Target],
    ) -> Result<(), LikeError> {
        let identity = UserIdentity::from_profile(profile).ok_or(LikeError::NotAuthenticated)?;
        self.initialize(identity, targets).await;
        Ok(())
    }

    /// Erase the persisted partition of `identity` and drop all in-memory like state.
    ///
    /// In-flight toggles finish on the network but their answers are discarded.
    pub async fn reset(&self, identity: &UserIdentity) {
        let _lifecycle = self.lifecycle.lock().await;
        info!(%identity, "resetting like state");
        self.session.write(|txn| {
            if let Err(err) = self.session.cache().erase(Some(identity)) {
                warn!(%identity, error = %err, "cannot erase persisted likes");
            }
            txn.clear();
        });
    }
}
