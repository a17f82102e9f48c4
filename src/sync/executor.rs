// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::reconcile::ReconciliationEngine;
use super::state::SharedSession;
use crate::api::{ApiError, LikeApi, LikeOutcome};
use crate::error::LikeError;
use crate::model::Target;

/// What a toggle did, for callers that want more than "it didn't fail".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the mutation; `liked` is the committed state.
    Applied {
        liked: bool,
        likes: Option<u64>,
        /// A conflict was detected and resolved with one forced retry.
        self_healed: bool,
    },
    /// Pending or inside the cooldown window. Nothing was touched.
    Busy,
    /// The active identity changed before the server answered; the answer was dropped.
    Discarded,
}

/// Protocol phases of one toggle, reported in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    Idle,
    Applying,
    Committed,
    RollingBack,
}

/// Snapshot taken when a toggle claims its target.
#[derive(Debug, Clone, Copy)]
struct Claim {
    generation: u64,
    was_liked: bool,
    prior_likes: Option<u64>,
}

/// Releases the pending flag however the toggle ends, including when its future is dropped.
struct OperationGuard<'a> {
    session: &'a SharedSession,
    target: &'a Target,
    generation: u64,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.session.write_if_current(self.generation, |txn| {
            txn.ledger_mut().end_operation(self.target)
        });
        debug!(target = %self.target, state = ?ToggleState::Idle, "toggle released");
    }
}

/// Runs the optimistic toggle protocol against the shared session.
#[derive(Clone)]
pub struct OptimisticMutationExecutor {
    api: Arc<dyn LikeApi>,
    session: SharedSession,
    engine: ReconciliationEngine,
}

impl OptimisticMutationExecutor {
    pub fn new(api: Arc<dyn LikeApi>, session: SharedSession, engine: ReconciliationEngine) -> Self {
        Self {
            api,
            session,
            engine,
        }
    }

    /// Flip the liked state of `target`.
    ///
    /// The new state is visible in the ledger and the persistent cache before the network call
    /// is issued. A conflicting server answer triggers one status query. A conflicting like is
    /// retried once as the inverse of what the server reported; a conflicting unlike is retried
    /// only if the server still reports the target as liked. Other failures restore the
    /// previous state.
    pub async fn toggle(&self, target: &Target) -> Result<ToggleOutcome, LikeError> {
        let Some(claim) = self.claim(target)? else {
            debug!(%target, "toggle ignored; target busy");
            return Ok(ToggleOutcome::Busy);
        };
        let _guard = OperationGuard {
            session: &self.session,
            target,
            generation: claim.generation,
        };

        let intended = !claim.was_liked;
        debug!(%target, state = ?ToggleState::Applying, liked = intended, "toggle applied locally");

        match self.send(target, intended).await {
            Ok(outcome) => Ok(self.commit(target, &claim, intended, outcome, false)),
            Err(err) if err.is_conflict() => self.self_heal(target, &claim, err).await,
            Err(err) => {
                if !self.roll_back(target, &claim, claim.was_liked) {
                    debug!(%target, error = %err, "identity changed; failure dropped");
                    return Ok(ToggleOutcome::Discarded);
                }
                warn!(%target, error = %err, "like request failed; rolled back");
                Err(err.into())
            }
        }
    }

    /// Check identity and guards, then apply the optimistic state. `None` means busy.
    fn claim(&self, target: &Target) -> Result<Option<Claim>, LikeError> {
        self.session.write(|txn| {
            let session = txn.session();
            if session.identity().is_none() {
                return Err(LikeError::NotAuthenticated);
            }
            let claim = Claim {
                generation: session.generation(),
                was_liked: session.ledger().has(target),
                prior_likes: session.ledger().like_count(target),
            };
            if !txn.ledger_mut().begin_operation(target, Instant::now()) {
                return Ok(None);
            }
            txn.set_liked(target, !claim.was_liked);
            txn.ledger_mut()
                .shift_like_count(target, !claim.was_liked);
            Ok(Some(claim))
        })
    }

    async fn send(&self, target: &Target, liked: bool) -> Result<LikeOutcome, ApiError> {
        if liked {
            self.api.like(target).await
        } else {
            self.api.unlike(target).await
        }
    }

    async fn self_heal(
        &self,
        target: &Target,
        claim: &Claim,
        conflict: ApiError,
    ) -> Result<ToggleOutcome, LikeError> {
        debug!(%target, error = %conflict, "like state conflict; asking server");
        let server_liked = match self.engine.resolve_at(target, claim.generation).await {
            Ok(liked) => liked,
            Err(err) => {
                if !self.roll_back(target, claim, claim.was_liked) {
                    return Ok(ToggleOutcome::Discarded);
                }
                warn!(%target, error = %err, "cannot resolve like state conflict");
                return Err(LikeError::Conflict(conflict));
            }
        };

        if claim.was_liked && !server_liked {
            // An unlike that the server already agrees with: nothing left to retry.
            return Ok(self.settle(target, claim));
        }

        // The retry bypasses pending and cooldown: this toggle still owns the target.
        let retry = !server_liked;
        let applied = self.session.write_if_current(claim.generation, |txn| {
            txn.set_liked(target, retry);
            txn.ledger_mut().set_like_count(target, claim.prior_likes);
            if retry != claim.was_liked {
                txn.ledger_mut().shift_like_count(target, retry);
            }
        });
        if applied.is_none() {
            return Ok(ToggleOutcome::Discarded);
        }
        debug!(%target, server_liked, retry, "retrying toggle after conflict");

        match self.send(target, retry).await {
            Ok(outcome) => Ok(self.commit(target, claim, retry, outcome, true)),
            Err(err) => {
                if !self.roll_back(target, claim, server_liked) {
                    return Ok(ToggleOutcome::Discarded);
                }
                warn!(%target, error = %err, "retry after conflict failed; rolled back");
                Err(err.into())
            }
        }
    }

    fn commit(
        &self,
        target: &Target,
        claim: &Claim,
        intended: bool,
        outcome: LikeOutcome,
        self_healed: bool,
    ) -> ToggleOutcome {
        let liked = outcome.liked.unwrap_or(intended);
        let committed = self.session.write_if_current(claim.generation, |txn| {
            txn.set_liked(target, liked);
            if let Some(likes) = outcome.likes {
                txn.ledger_mut().set_like_count(target, Some(likes));
            }
            txn.session().ledger().like_count(target)
        });
        match committed {
            Some(likes) => {
                debug!(%target, state = ?ToggleState::Committed, liked, ?likes, self_healed, "toggle committed");
                ToggleOutcome::Applied {
                    liked,
                    likes,
                    self_healed,
                }
            }
            None => {
                debug!(%target, liked, "identity changed; server answer dropped");
                ToggleOutcome::Discarded
            }
        }
    }

    /// Accept the unliked state `resolve_at` already wrote.
    fn settle(&self, target: &Target, claim: &Claim) -> ToggleOutcome {
        let settled = self.session.write_if_current(claim.generation, |txn| {
            let ledger = txn.ledger_mut();
            ledger.set_like_count(target, claim.prior_likes);
            ledger.shift_like_count(target, false);
            ledger.like_count(target)
        });
        match settled {
            Some(likes) => {
                debug!(%target, state = ?ToggleState::Committed, ?likes, "server already unliked; no retry");
                ToggleOutcome::Applied {
                    liked: false,
                    likes,
                    self_healed: true,
                }
            }
            None => ToggleOutcome::Discarded,
        }
    }

    /// Put back `liked` and the count seen at claim time. False if the session moved on.
    fn roll_back(&self, target: &Target, claim: &Claim, liked: bool) -> bool {
        debug!(%target, state = ?ToggleState::RollingBack, liked, "rolling back toggle");
        self.session
            .write_if_current(claim.generation, |txn| {
                txn.restore_liked(target, liked);
                txn.ledger_mut().set_like_count(target, claim.prior_likes);
            })
            .is_some()
    }
}
