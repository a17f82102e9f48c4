// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The subset of the authenticated user record needed to partition like state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Partition key for all persisted and in-memory like state.
///
/// Prefers the stable user id and falls back to the username. There is no
/// anonymous identity: callers without one get `None` and must not touch any
/// partition.
///
/// When keyed by id, the username is kept as a legacy key: older sessions
/// persisted likes under the username before an id was available.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserIdentity {
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    legacy_key: Option<String>,
}

impl UserIdentity {
    pub fn new(key: impl AsRef<str>) -> Option<Self> {
        let key = key.as_ref().trim();
        if key.is_empty() {
            return None;
        }
        Some(Self {
            key: key.to_owned(),
            legacy_key: None,
        })
    }

    /// Attach a secondary partition. Blank keys and keys equal to the primary are ignored.
    pub fn with_legacy_key(mut self, legacy_key: impl AsRef<str>) -> Self {
        let legacy_key = legacy_key.as_ref().trim();
        self.legacy_key =
            (!legacy_key.is_empty() && legacy_key != self.key).then(|| legacy_key.to_owned());
        self
    }

    pub fn from_profile(profile: &UserProfile) -> Option<Self> {
        let username = profile.username.as_deref();
        match profile.id.as_deref().and_then(Self::new) {
            Some(identity) => Some(match username {
                Some(username) => identity.with_legacy_key(username),
                None => identity,
            }),
            None => username.and_then(Self::new),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn legacy_key(&self) -> Option<&str> {
        self.legacy_key.as_deref()
    }

    /// Primary key first, then the legacy key if any.
    pub fn partition_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str()).chain(self.legacy_key())
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}
