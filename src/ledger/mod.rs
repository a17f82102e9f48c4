// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory like state for the active identity.
//!
//! The ledger is the session's view of "did I like this": one entry per touched target with the
//! optimistic boolean, an in-flight marker and the time of the last accepted action. It knows
//! nothing about the network or persistence; callers pass `now` in so the cooldown rule stays a
//! pure function of its inputs.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use tokio::time::Instant;

use crate::model::{Target, TargetId, TargetKind};

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(700);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerEntry {
    pub liked: bool,
    pub pending: bool,
    pub last_action_at: Option<Instant>,
    /// Best-effort display count; `None` until a caller or the server provides one.
    pub likes: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct LikeLedger {
    entries: HashMap<Target, LedgerEntry>,
    cooldown: Duration,
}

impl Default for LikeLedger {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl LikeLedger {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            cooldown,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn entry(&self, target: &Target) -> Option<&LedgerEntry> {
        self.entries.get(target)
    }

    /// Unknown targets read as not liked.
    pub fn has(&self, target: &Target) -> bool {
        self.entries.get(target).is_some_and(|entry| entry.liked)
    }

    pub fn is_pending(&self, target: &Target) -> bool {
        self.entries.get(target).is_some_and(|entry| entry.pending)
    }

    /// Claim `target` for one mutation.
    ///
    /// Rejected while another operation is pending, and for `cooldown` after the previous
    /// accepted call even if that operation already finished.
    pub fn begin_operation(&mut self, target: &Target, now: Instant) -> bool {
        let entry = self.entries.entry(target.clone()).or_default();
        if entry.pending {
            return false;
        }
        if let Some(last) = entry.last_action_at {
            if now.saturating_duration_since(last) < self.cooldown {
                return false;
            }
        }
        entry.pending = true;
        entry.last_action_at = Some(now);
        true
    }

    pub fn commit(&mut self, target: &Target, liked: bool) {
        self.entries.entry(target.clone()).or_default().liked = liked;
    }

    pub fn rollback(&mut self, target: &Target, prior_liked: bool) {
        self.entries.entry(target.clone()).or_default().liked = prior_liked;
    }

    pub fn end_operation(&mut self, target: &Target) {
        if let Some(entry) = self.entries.get_mut(target) {
            entry.pending = false;
        }
    }

    pub fn like_count(&self, target: &Target) -> Option<u64> {
        self.entries.get(target).and_then(|entry| entry.likes)
    }

    pub fn set_like_count(&mut self, target: &Target, likes: Option<u64>) {
        self.entries.entry(target.clone()).or_default().likes = likes;
    }

    /// Move a known count by one in the direction of `liked`. Unknown counts stay unknown.
    pub fn shift_like_count(&mut self, target: &Target, liked: bool) {
        let Some(entry) = self.entries.get_mut(target) else {
            return;
        };
        entry.likes = entry.likes.map(|likes| {
            if liked {
                likes.saturating_add(1)
            } else {
                likes.saturating_sub(1)
            }
        });
    }

    pub fn liked_ids(&self, kind: TargetKind) -> BTreeSet<TargetId> {
        self.entries
            .iter()
            .filter(|(target, entry)| target.kind() == kind && entry.liked)
            .map(|(target, _)| target.id().clone())
            .collect()
    }

    pub fn liked_count(&self, kind: TargetKind) -> usize {
        self.entries
            .iter()
            .filter(|(target, entry)| target.kind() == kind && entry.liked)
            .count()
    }

    pub fn pending_targets(&self) -> Vec<Target> {
        let mut targets = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.pending)
            .map(|(target, _)| target.clone())
            .collect::<Vec<_>>();
        targets.sort();
        targets
    }

    /// Install `liked` as the full liked set for `kind`.
    ///
    /// Entries that are pending, or whose last action is at or after `touched_since`, keep their
    /// current boolean: an in-flight or just-finished toggle is newer than the data being
    /// installed. Returns the targets that were preserved.
    pub fn replace_kind(
        &mut self,
        kind: TargetKind,
        liked: &BTreeSet<TargetId>,
        touched_since: Option<Instant>,
    ) -> Vec<Target> {
        let is_preserved = |entry: &LedgerEntry| {
            entry.pending
                || touched_since
                    .zip(entry.last_action_at)
                    .is_some_and(|(since, last)| last >= since)
        };

        let mut preserved = Vec::new();
        for (target, entry) in self.entries.iter_mut() {
            if target.kind() != kind {
                continue;
            }
            if is_preserved(entry) {
                preserved.push(target.clone());
                continue;
            }
            entry.liked = liked.contains(target.id());
        }

        for id in liked {
            let target = Target::new(kind, id.clone());
            if !self.entries.contains_key(&target) {
                self.entries.insert(
                    target,
                    LedgerEntry {
                        liked: true,
                        ..LedgerEntry::default()
                    },
                );
            }
        }
        preserved.sort();
        preserved
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
