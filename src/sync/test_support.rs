// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::{OptimisticMutationExecutor, ReconciliationEngine, SharedSession};
use crate::api::{LikeApi, MemoryLikeServer};
use crate::ledger::DEFAULT_COOLDOWN;
use crate::model::{TargetId, TargetKind, UserIdentity};
use crate::store::{MemoryStore, PersistentLikeCache};

pub(crate) struct Harness {
    pub server: Arc<MemoryLikeServer>,
    pub store: Arc<MemoryStore>,
    pub cache: PersistentLikeCache,
    pub session: SharedSession,
}

impl Harness {
    pub fn new() -> Self {
        let server = Arc::new(MemoryLikeServer::new());
        let store = Arc::new(MemoryStore::new());
        let cache = PersistentLikeCache::new(store.clone());
        let session = SharedSession::new(cache.clone(), DEFAULT_COOLDOWN);
        Self {
            server,
            store,
            cache,
            session,
        }
    }

    pub fn api(&self) -> Arc<dyn LikeApi> {
        self.server.clone()
    }

    pub fn engine(&self) -> ReconciliationEngine {
        ReconciliationEngine::new(self.api(), self.session.clone())
    }

    pub fn executor(&self) -> OptimisticMutationExecutor {
        OptimisticMutationExecutor::new(self.api(), self.session.clone(), self.engine())
    }

    /// Sign `identity` in on the server and adopt it locally without a reconciliation pass.
    pub fn sign_in(&self, identity: &UserIdentity) {
        self.server.sign_in(identity);
        self.session
            .write(|txn| txn.adopt_identity(identity.clone()));
    }

    pub fn cached(&self, identity: &UserIdentity, kind: TargetKind) -> BTreeSet<TargetId> {
        self.cache.load(Some(identity), kind)
    }
}

pub(crate) fn alice() -> UserIdentity {
    UserIdentity::new("alice").expect("identity")
}

pub(crate) fn bob() -> UserIdentity {
    UserIdentity::new("bob").expect("identity")
}

pub(crate) fn ids(raw: &[&str]) -> BTreeSet<TargetId> {
    raw.iter().map(|id| TargetId::new(*id).expect("id")).collect()
}
