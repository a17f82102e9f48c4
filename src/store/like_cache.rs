// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::kv::{KeyValueStore, StoreError};
use crate::model::{TargetId, TargetKind, UserIdentity};

const USER_PREFIX: &str = "user_";
const LIKED_INFIX: &str = "_liked_";

/// Per-identity persisted liked-id lists.
///
/// This is the only code that knows the `user_<identity>_liked_<kind>` key layout. Every
/// operation takes `Option<&UserIdentity>`; `None` (anonymous) reads as empty and writes
/// nothing, so there is no shared fallback partition.
#[derive(Clone)]
pub struct PersistentLikeCache {
    backend: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for PersistentLikeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentLikeCache").finish_non_exhaustive()
    }
}

impl PersistentLikeCache {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn storage_key(identity: &UserIdentity, kind: TargetKind) -> String {
        partition_key(identity.as_str(), kind)
    }

    /// Never fails: missing, unreadable or corrupt values load as an empty set.
    pub fn load(&self, identity: Option<&UserIdentity>, kind: TargetKind) -> BTreeSet<TargetId> {
        match identity {
            Some(identity) => self.load_key(&Self::storage_key(identity, kind)),
            None => BTreeSet::new(),
        }
    }

    /// [`load`](Self::load) plus whatever is still stored under the legacy username partition.
    pub fn load_with_legacy(
        &self,
        identity: Option<&UserIdentity>,
        kind: TargetKind,
    ) -> BTreeSet<TargetId> {
        let mut ids = self.load(identity, kind);
        if let Some(legacy) = identity.and_then(UserIdentity::legacy_key) {
            ids.extend(self.load_key(&partition_key(legacy, kind)));
        }
        ids
    }

    /// Remove the legacy partition for `kind` once its ids live under the primary key.
    pub fn drop_legacy(
        &self,
        identity: Option<&UserIdentity>,
        kind: TargetKind,
    ) -> Result<(), StoreError> {
        match identity.and_then(UserIdentity::legacy_key) {
            Some(legacy) => self.backend.remove(&partition_key(legacy, kind)),
            None => Ok(()),
        }
    }

    fn load_key(&self, key: &str) -> BTreeSet<TargetId> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeSet::new(),
            Err(err) => {
                warn!(%key, error = %err, "cannot read liked ids; treating as empty");
                return BTreeSet::new();
            }
        };

        let values = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(values) => values,
            Err(err) => {
                warn!(%key, error = %err, "corrupt liked ids; treating as empty");
                return BTreeSet::new();
            }
        };

        let mut ids = BTreeSet::new();
        for value in values {
            match value.as_str().map(TargetId::new) {
                Some(Ok(id)) => {
                    ids.insert(id);
                }
                _ => warn!(%key, %value, "skipping invalid liked id"),
            }
        }
        ids
    }

    pub fn save(
        &self,
        identity: Option<&UserIdentity>,
        kind: TargetKind,
        ids: &BTreeSet<TargetId>,
    ) -> Result<(), StoreError> {
        let Some(identity) = identity else {
            return Ok(());
        };
        let key = Self::storage_key(identity, kind);
        let list = ids.iter().map(TargetId::as_str).collect::<Vec<_>>();
        let encoded = serde_json::to_string(&list).map_err(|source| StoreError::Json {
            key: key.clone(),
            source,
        })?;
        self.backend.set(&key, &encoded)
    }

    /// Drop every kind's list for `identity`, legacy partition included.
    ///
    /// Attempts every key even if one removal fails and reports the first failure.
    pub fn erase(&self, identity: Option<&UserIdentity>) -> Result<(), StoreError> {
        let Some(identity) = identity else {
            return Ok(());
        };
        let mut first_err = None;
        for partition in identity.partition_keys() {
            for kind in TargetKind::ALL {
                if let Err(err) = self.backend.remove(&partition_key(partition, kind)) {
                    first_err.get_or_insert(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn partition_key(partition: &str, kind: TargetKind) -> String {
    format!(
        "{USER_PREFIX}{partition}{LIKED_INFIX}{}",
        kind.storage_segment()
    )
}
