// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ApiError, LikeApi, LikeOutcome};
use crate::model::{Target, TargetId, TargetKind, UserIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOp {
    Like,
    Unlike,
    BatchStatus,
    Status,
}

#[derive(Debug, Default)]
struct ServerState {
    caller: Option<UserIdentity>,
    likers: HashMap<Target, BTreeSet<UserIdentity>>,
    /// Likes from users this server does not model individually.
    base_likes: HashMap<Target, u64>,
    calls: HashMap<ApiOp, usize>,
    injected: HashMap<ApiOp, VecDeque<ApiError>>,
    latency: Duration,
    report_state: bool,
}

/// In-process stand-in for the blog's like endpoints.
///
/// Mirrors the real server's rules: liking twice or unliking something not liked is a
/// 400-class conflict, calls without a signed-in caller are 401. Failures can be queued per
/// operation and every call is counted.
#[derive(Debug)]
pub struct MemoryLikeServer {
    state: Mutex<ServerState>,
}

impl Default for MemoryLikeServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLikeServer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ServerState {
                report_state: true,
                ..ServerState::default()
            }),
        }
    }

    pub fn sign_in(&self, identity: &UserIdentity) {
        self.state.lock().caller = Some(identity.clone());
    }

    pub fn sign_out(&self) {
        self.state.lock().caller = None;
    }

    /// Record a like directly, bypassing the API (e.g. made from another device).
    pub fn seed_like(&self, identity: &UserIdentity, target: &Target) {
        self.state
            .lock()
            .likers
            .entry(target.clone())
            .or_default()
            .insert(identity.clone());
    }

    pub fn seed_base_likes(&self, target: &Target, likes: u64) {
        self.state.lock().base_likes.insert(target.clone(), likes);
    }

    pub fn is_liked_by(&self, identity: &UserIdentity, target: &Target) -> bool {
        self.state
            .lock()
            .likers
            .get(target)
            .is_some_and(|likers| likers.contains(identity))
    }

    pub fn likes(&self, target: &Target) -> u64 {
        let state = self.state.lock();
        likes_of(&state, target)
    }

    /// Fail the next call of `op` with `error`. Queued errors are consumed in order.
    pub fn fail_next(&self, op: ApiOp, error: ApiError) {
        self.state
            .lock()
            .injected
            .entry(op)
            .or_default()
            .push_back(error);
    }

    pub fn calls(&self, op: ApiOp) -> usize {
        self.state.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = latency;
    }

    /// When off, like/unlike succeed with an empty body (no `liked`, no `likes`).
    pub fn set_report_state(&self, report_state: bool) {
        self.state.lock().report_state = report_state;
    }

    async fn enter(&self, op: ApiOp) -> Result<UserIdentity, ApiError> {
        let latency = {
            let mut state = self.state.lock();
            *state.calls.entry(op).or_default() += 1;
            state.latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock();
        if let Some(error) = state.injected.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(error);
        }
        state
            .caller
            .clone()
            .ok_or_else(|| ApiError::from_status(401, "login required"))
    }

    fn outcome(&self, target: &Target, liked: bool) -> LikeOutcome {
        let state = self.state.lock();
        if !state.report_state {
            return LikeOutcome::default();
        }
        LikeOutcome {
            liked: Some(liked),
            likes: Some(likes_of(&state, target)),
        }
    }
}

fn likes_of(state: &ServerState, target: &Target) -> u64 {
    let base = state.base_likes.get(target).copied().unwrap_or(0);
    let members = state.likers.get(target).map_or(0, BTreeSet::len) as u64;
    base.saturating_add(members)
}

#[async_trait]
impl LikeApi for MemoryLikeServer {
    async fn like(&self, target: &Target) -> Result<LikeOutcome, ApiError> {
        let caller = self.enter(ApiOp::Like).await?;
        {
            let mut state = self.state.lock();
            let likers = state.likers.entry(target.clone()).or_default();
            if !likers.insert(caller) {
                return Err(ApiError::from_status(400, "already liked"));
            }
        }
        Ok(self.outcome(target, true))
    }

    async fn unlike(&self, target: &Target) -> Result<LikeOutcome, ApiError> {
        let caller = self.enter(ApiOp::Unlike).await?;
        {
            let mut state = self.state.lock();
            let removed = state
                .likers
                .get_mut(target)
                .is_some_and(|likers| likers.remove(&caller));
            if !removed {
                return Err(ApiError::from_status(400, "not liked yet"));
            }
        }
        Ok(self.outcome(target, false))
    }

    async fn batch_like_status(
        &self,
        kind: TargetKind,
        ids: &[TargetId],
    ) -> Result<BTreeMap<TargetId, bool>, ApiError> {
        let caller = self.enter(ApiOp::BatchStatus).await?;
        let state = self.state.lock();
        Ok(ids
            .iter()
            .map(|id| {
                let target = Target::new(kind, id.clone());
                let liked = state
                    .likers
                    .get(&target)
                    .is_some_and(|likers| likers.contains(&caller));
                (id.clone(), liked)
            })
            .collect())
    }

    async fn like_status(&self, target: &Target) -> Result<bool, ApiError> {
        let caller = self.enter(ApiOp::Status).await?;
        let state = self.state.lock();
        Ok(state
            .likers
            .get(target)
            .is_some_and(|likers| likers.contains(&caller)))
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiOp, MemoryLikeServer};
    use crate::api::{ApiError, ApiErrorKind, LikeApi};
    use crate::model::{Target, TargetId, TargetKind, UserIdentity};

    fn alice() -> UserIdentity {
        UserIdentity::new("alice").unwrap()
    }

    #[tokio::test]
    async fn like_then_duplicate_like_is_conflict() {
        let server = MemoryLikeServer::new();
        server.sign_in(&alice());
        server.seed_base_likes(&Target::article("a1").unwrap(), 41);
        let target = Target::article("a1").unwrap();

        let outcome = server.like(&target).await.unwrap();
        assert_eq!(outcome.liked, Some(true));
        assert_eq!(outcome.likes, Some(42));

        let err = server.like(&target).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Conflict);
        assert_eq!(server.calls(ApiOp::Like), 2);
    }

    #[tokio::test]
    async fn unlike_without_like_is_conflict() {
        let server = MemoryLikeServer::new();
        server.sign_in(&alice());
        let err = server.unlike(&Target::talk("t1").unwrap()).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn anonymous_calls_are_unauthorized() {
        let server = MemoryLikeServer::new();
        let err = server.like_status(&Target::reply("r1").unwrap()).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_in_order() {
        let server = MemoryLikeServer::new();
        server.sign_in(&alice());
        let target = Target::article("a1").unwrap();
        server.fail_next(ApiOp::Like, ApiError::transport("offline"));

        assert_eq!(server.like(&target).await.unwrap_err().kind, ApiErrorKind::Transport);
        assert!(server.like(&target).await.is_ok());
        assert!(server.is_liked_by(&alice(), &target));
    }

    #[tokio::test]
    async fn batch_status_is_per_caller() {
        let server = MemoryLikeServer::new();
        let bob = UserIdentity::new("bob").unwrap();
        server.seed_like(&bob, &Target::article("a1").unwrap());
        server.sign_in(&alice());

        let ids = vec![TargetId::new("a1").unwrap()];
        let statuses = server.batch_like_status(TargetKind::Article, &ids).await.unwrap();
        assert_eq!(statuses.get("a1"), Some(&false));
    }
}
