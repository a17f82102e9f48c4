// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::state::SharedSession;
use crate::api::LikeApi;
use crate::error::LikeError;
use crate::model::{Target, TargetId, TargetKind, UserIdentity};

/// Union the local set with server-confirmed likes, then drop anything the server explicitly
/// reports as not liked. Ids the server is silent about keep their local value.
pub fn merge_like_state(
    local: &BTreeSet<TargetId>,
    server: Option<&BTreeMap<TargetId, bool>>,
) -> BTreeSet<TargetId> {
    let mut merged = local.clone();
    for (id, &liked) in server.into_iter().flatten() {
        if liked {
            merged.insert(id.clone());
        } else {
            merged.remove(id);
        }
    }
    merged
}

/// Brings the ledger and persistent cache in line with the server.
#[derive(Clone)]
pub struct ReconciliationEngine {
    api: Arc<dyn LikeApi>,
    session: SharedSession,
}

impl ReconciliationEngine {
    pub fn new(api: Arc<dyn LikeApi>, session: SharedSession) -> Self {
        Self { api, session }
    }

    /// Seed the session for `identity` from its persisted lists merged with one batch status
    /// query per target kind present in `known`.
    ///
    /// Likes persisted under the identity's legacy username partition are folded into the
    /// primary partition, which then replaces the legacy one.
    ///
    /// Kinds without known targets are installed from the local list alone. A failed batch
    /// query falls back to the local list for that kind. Targets toggled while this runs keep
    /// their toggled value.
    pub async fn initialize(&self, identity: UserIdentity, known: &[Target]) {
        let started = Instant::now();
        let generation = self.session.write(|txn| {
            txn.adopt_identity(identity.clone());
            txn.session().generation()
        });

        let mut by_kind: BTreeMap<TargetKind, BTreeSet<TargetId>> = BTreeMap::new();
        for target in known {
            by_kind
                .entry(target.kind())
                .or_default()
                .insert(target.id().clone());
        }

        for kind in TargetKind::ALL {
            let ids = by_kind
                .remove(&kind)
                .map(|ids| ids.into_iter().collect::<Vec<_>>())
                .unwrap_or_default();

            let server = if ids.is_empty() {
                None
            } else {
                match self.api.batch_like_status(kind, &ids).await {
                    Ok(statuses) => Some(statuses),
                    Err(err) => {
                        warn!(%identity, %kind, error = %err, "batch like status failed; using local likes");
                        None
                    }
                }
            };

            let installed = self.session.write_if_current(generation, |txn| {
                let local = self
                    .session
                    .cache()
                    .load_with_legacy(txn.session().identity(), kind);
                let merged = merge_like_state(&local, server.as_ref());
                let preserved = txn.install_kind(kind, &merged, Some(started));
                (merged.len(), preserved.len())
            });

            let Some((liked, preserved)) = installed else {
                debug!(%identity, "identity changed during initialize; abandoning");
                return;
            };
            debug!(%identity, %kind, liked, preserved, "like state installed");
        }

        self.session.write_if_current(generation, |txn| txn.mark_initialized());
    }

    /// Ask the server whether `target` is liked and make ledger and cache agree.
    ///
    /// Only used to heal conflicts; routine reads never hit the network.
    pub async fn resolve_single(&self, target: &Target) -> Result<bool, LikeError> {
        let generation = self.session.read(|session| {
            session
                .identity()
                .map(|_| session.generation())
                .ok_or(LikeError::NotAuthenticated)
        })?;
        self.resolve_at(target, generation).await
    }

    pub(crate) async fn resolve_at(
        &self,
        target: &Target,
        generation: u64,
    ) -> Result<bool, LikeError> {
        let liked = self.api.like_status(target).await?;
        let applied = self
            .session
            .write_if_current(generation, |txn| txn.set_liked(target, liked));
        if applied.is_none() {
            debug!(%target, "identity changed while resolving; result not applied");
        }
        Ok(liked)
    }
}

#[cfg(test)]
mod tests;
