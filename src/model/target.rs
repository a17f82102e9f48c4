// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::{IdError, TargetId};

/// The kinds of content a user can like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Article,
    Talk,
    Reply,
}

impl TargetKind {
    pub const ALL: [TargetKind; 3] = [TargetKind::Article, TargetKind::Talk, TargetKind::Reply];

    /// Plural segment used in persisted keys (`user_<key>_liked_<segment>`).
    pub fn storage_segment(self) -> &'static str {
        match self {
            Self::Article => "articles",
            Self::Talk => "talks",
            Self::Reply => "replies",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Talk => "talk",
            Self::Reply => "reply",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseTargetError {
    #[error("unknown target kind '{0}' (expected article, talk or reply)")]
    UnknownKind(String),
    #[error("target must look like '<kind>:<id>'")]
    MissingSeparator,
    #[error("invalid target id: {0}")]
    InvalidId(#[from] IdError),
}

impl FromStr for TargetKind {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(Self::Article),
            "talk" => Ok(Self::Talk),
            "reply" => Ok(Self::Reply),
            other => Err(ParseTargetError::UnknownKind(other.to_owned())),
        }
    }
}

/// A likeable thing: `(kind, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Target {
    kind: TargetKind,
    id: TargetId,
}

impl Target {
    pub fn new(kind: TargetKind, id: TargetId) -> Self {
        Self { kind, id }
    }

    pub fn article(id: impl Into<String>) -> Result<Self, IdError> {
        Ok(Self::new(TargetKind::Article, TargetId::new(id)?))
    }

    pub fn talk(id: impl Into<String>) -> Result<Self, IdError> {
        Ok(Self::new(TargetKind::Talk, TargetId::new(id)?))
    }

    pub fn reply(id: impl Into<String>) -> Result<Self, IdError> {
        Ok(Self::new(TargetKind::Reply, TargetId::new(id)?))
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn id(&self) -> &TargetId {
        &self.id
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for Target {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.split_once(':').ok_or(ParseTargetError::MissingSeparator)?;
        Ok(Self::new(kind.parse()?, TargetId::new(id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::{ParseTargetError, Target, TargetKind};

    #[test]
    fn target_display_round_trips_through_from_str() {
        let target = Target::talk("t-9").unwrap();
        assert_eq!(target.to_string(), "talk:t-9");
        assert_eq!("talk:t-9".parse::<Target>().unwrap(), target);
    }

    #[test]
    fn target_parse_reports_bad_kind_and_separator() {
        assert_eq!(
            "photo:1".parse::<Target>(),
            Err(ParseTargetError::UnknownKind("photo".to_owned()))
        );
        assert_eq!("article".parse::<Target>(), Err(ParseTargetError::MissingSeparator));
    }

    #[test]
    fn storage_segments_are_plural() {
        let segments = TargetKind::ALL.map(TargetKind::storage_segment);
        assert_eq!(segments, ["articles", "talks", "replies"]);
    }
}
