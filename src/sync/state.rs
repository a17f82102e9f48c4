// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::ledger::LikeLedger;
use crate::model::{Target, TargetId, TargetKind, UserIdentity};
use crate::store::PersistentLikeCache;

/// Like state for whoever is currently signed in.
#[derive(Debug)]
pub struct LikeSession {
    identity: Option<UserIdentity>,
    /// Bumped whenever the partition is swapped or wiped; in-flight work from an older
    /// generation must not write.
    generation: u64,
    initialized: bool,
    ledger: LikeLedger,
}

impl LikeSession {
    fn new(cooldown: Duration) -> Self {
        Self {
            identity: None,
            generation: 0,
            initialized: false,
            ledger: LikeLedger::new(cooldown),
        }
    }

    pub fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn ledger(&self) -> &LikeLedger {
        &self.ledger
    }
}

/// Mutable view handed to [`SharedSession::write`] closures.
///
/// Every method that changes a liked boolean also writes the persistent cache before the lock
/// is released, so the two never disagree at a point another task can observe.
pub(crate) struct SessionTxn<'a> {
    session: &'a mut LikeSession,
    cache: &'a PersistentLikeCache,
}

impl SessionTxn<'_> {
    pub fn session(&self) -> &LikeSession {
        &*self.session
    }

    pub fn ledger_mut(&mut self) -> &mut LikeLedger {
        &mut self.session.ledger
    }

    pub fn set_liked(&mut self, target: &Target, liked: bool) {
        self.session.ledger.commit(target, liked);
        self.persist_one(target, liked);
    }

    pub fn restore_liked(&mut self, target: &Target, prior_liked: bool) {
        self.session.ledger.rollback(target, prior_liked);
        self.persist_one(target, prior_liked);
    }

    /// Replace the liked set for `kind` and rewrite its persisted list from the ledger.
    ///
    /// The legacy partition for `kind` is removed once the list is saved under the primary key.
    pub fn install_kind(
        &mut self,
        kind: TargetKind,
        liked: &BTreeSet<TargetId>,
        touched_since: Option<Instant>,
    ) -> Vec<Target> {
        let preserved = self.session.ledger.replace_kind(kind, liked, touched_since);
        let identity = self.session.identity.as_ref();
        let ids = self.session.ledger.liked_ids(kind);
        match self.cache.save(identity, kind, &ids) {
            Ok(()) => {
                if let Err(err) = self.cache.drop_legacy(identity, kind) {
                    warn!(%kind, error = %err, "cannot drop legacy liked ids");
                }
            }
            Err(err) => warn!(%kind, error = %err, "cannot persist liked ids"),
        }
        preserved
    }

    /// Switch to `identity`. A different identity starts from an empty ledger.
    pub fn adopt_identity(&mut self, identity: UserIdentity) {
        if self.session.identity.as_ref() == Some(&identity) {
            return;
        }
        self.session.identity = Some(identity);
        self.session.ledger.clear();
        self.session.initialized = false;
        self.session.generation += 1;
    }

    pub fn mark_initialized(&mut self) {
        self.session.initialized = true;
    }

    /// Forget the active identity and everything in memory.
    pub fn clear(&mut self) {
        self.session.identity = None;
        self.session.ledger.clear();
        self.session.initialized = false;
        self.session.generation += 1;
    }

    /// Once initialized, the ledger holds the full liked set for every kind and is written out
    /// as is. Before that, only `target` is patched into whatever is persisted.
    fn persist_one(&self, target: &Target, liked: bool) {
        let identity = self.session.identity.as_ref();
        let ids = if self.session.initialized {
            self.session.ledger.liked_ids(target.kind())
        } else {
            let mut ids = self.cache.load(identity, target.kind());
            let changed = if liked {
                ids.insert(target.id().clone())
            } else {
                ids.remove(target.id())
            };
            if !changed {
                return;
            }
            ids
        };
        if let Err(err) = self.cache.save(identity, target.kind(), &ids) {
            warn!(%target, error = %err, "cannot persist liked ids");
        }
    }
}

/// The ledger, the active identity and the persistent cache behind one lock.
///
/// The lock is a plain mutex and is only ever taken inside synchronous closures, never across
/// an `.await`.
#[derive(Debug, Clone)]
pub struct SharedSession {
    state: Arc<Mutex<LikeSession>>,
    cache: PersistentLikeCache,
}

impl SharedSession {
    pub fn new(cache: PersistentLikeCache, cooldown: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(LikeSession::new(cooldown))),
            cache,
        }
    }

    pub fn cache(&self) -> &PersistentLikeCache {
        &self.cache
    }

    pub fn read<R>(&self, f: impl FnOnce(&LikeSession) -> R) -> R {
        f(&self.state.lock())
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut SessionTxn<'_>) -> R) -> R {
        let mut state = self.state.lock();
        let mut txn = SessionTxn {
            session: &mut *state,
            cache: &self.cache,
        };
        f(&mut txn)
    }

    /// Like [`write`](Self::write), but only if no identity swap happened since `generation`.
    pub(crate) fn write_if_current<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut SessionTxn<'_>) -> R,
    ) -> Option<R> {
        self.write(|txn| (txn.session().generation() == generation).then(|| f(txn)))
    }
}
