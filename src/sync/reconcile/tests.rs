// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::time::Duration;

use rstest::{fixture, rstest};

use super::merge_like_state;
use crate::api::{ApiError, ApiOp};
use crate::error::LikeError;
use crate::model::{Target, TargetId, TargetKind, UserIdentity};
use crate::store::KeyValueStore;
use crate::sync::test_support::{alice, bob, ids, Harness};

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

fn statuses(raw: &[(&str, bool)]) -> BTreeMap<TargetId, bool> {
    raw.iter()
        .map(|(id, liked)| (TargetId::new(*id).expect("id"), *liked))
        .collect()
}

fn articles(raw: &[&str]) -> Vec<Target> {
    raw.iter()
        .map(|id| Target::article(*id).expect("target"))
        .collect()
}

#[test]
fn merge_keeps_local_unless_server_says_no() {
    let local = ids(&["a1", "a2", "a3"]);
    let server = statuses(&[("a2", false), ("a4", true), ("a5", false)]);

    assert_eq!(
        merge_like_state(&local, Some(&server)),
        ids(&["a1", "a3", "a4"])
    );
    assert_eq!(merge_like_state(&local, None), local);
}

#[rstest]
#[tokio::test]
async fn initialize_merges_cache_with_batch_status(harness: Harness) {
    let alice = alice();
    harness
        .cache
        .save(Some(&alice), TargetKind::Article, &ids(&["a1", "a2"]))
        .expect("seed cache");
    harness
        .cache
        .save(Some(&alice), TargetKind::Talk, &ids(&["t1"]))
        .expect("seed cache");
    harness.server.sign_in(&alice);
    harness
        .server
        .seed_like(&alice, &Target::article("a3").expect("target"));

    harness
        .engine()
        .initialize(alice.clone(), &articles(&["a1", "a2", "a3"]))
        .await;

    // a1/a2 are known but not liked on the server; a3 is.
    let expected = ids(&["a3"]);
    harness.session.read(|session| {
        assert!(session.is_initialized());
        assert_eq!(session.ledger().liked_ids(TargetKind::Article), expected);
        assert_eq!(session.ledger().liked_ids(TargetKind::Talk), ids(&["t1"]));
    });
    assert_eq!(harness.cached(&alice, TargetKind::Article), expected);
    assert_eq!(harness.server.calls(ApiOp::BatchStatus), 1);
}

#[rstest]
#[tokio::test]
async fn initialize_is_idempotent(harness: Harness) {
    let alice = alice();
    harness.server.sign_in(&alice);
    harness
        .server
        .seed_like(&alice, &Target::article("a2").expect("target"));
    harness
        .cache
        .save(Some(&alice), TargetKind::Article, &ids(&["a1"]))
        .expect("seed cache");
    let known = articles(&["a2", "a3"]);
    let engine = harness.engine();

    engine.initialize(alice.clone(), &known).await;
    let first = harness
        .session
        .read(|session| (session.ledger().liked_ids(TargetKind::Article), session.ledger().len()));
    engine.initialize(alice.clone(), &known).await;
    let second = harness
        .session
        .read(|session| (session.ledger().liked_ids(TargetKind::Article), session.ledger().len()));

    assert_eq!(first, second);
    assert_eq!(first.0, ids(&["a1", "a2"]));
}

#[rstest]
#[tokio::test]
async fn failed_batch_query_falls_back_to_local(harness: Harness) {
    let alice = alice();
    harness.server.sign_in(&alice);
    harness
        .cache
        .save(Some(&alice), TargetKind::Reply, &ids(&["r1"]))
        .expect("seed cache");
    harness
        .server
        .fail_next(ApiOp::BatchStatus, ApiError::transport("offline"));

    let known = vec![Target::reply("r1").expect("target")];
    harness.engine().initialize(alice.clone(), &known).await;

    harness.session.read(|session| {
        assert!(session.is_initialized());
        assert!(session.ledger().has(&known[0]));
    });
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn identity_swap_abandons_initialize(harness: Harness) {
    let alice = alice();
    harness.server.sign_in(&alice);
    harness
        .server
        .seed_like(&alice, &Target::article("a1").expect("target"));
    harness.server.set_latency(Duration::from_millis(100));
    let engine = harness.engine();
    let known = articles(&["a1"]);

    tokio::join!(engine.initialize(alice.clone(), &known), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        harness.session.write(|txn| txn.adopt_identity(bob()));
    });

    harness.session.read(|session| {
        assert_eq!(session.identity(), Some(&bob()));
        assert!(!session.is_initialized());
        assert!(session.ledger().is_empty());
    });
    assert!(harness.cached(&bob(), TargetKind::Article).is_empty());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn toggle_during_initialize_survives(harness: Harness) {
    let alice = alice();
    let target = Target::article("a1").expect("target");
    harness.sign_in(&alice);
    harness.server.set_latency(Duration::from_millis(100));
    let engine = harness.engine();
    let executor = harness.executor();
    let known = vec![target.clone()];

    let (_, toggled) = tokio::join!(engine.initialize(alice.clone(), &known), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        executor.toggle(&target).await
    });

    assert!(toggled.is_ok());
    // The batch answer (not liked) predates the toggle and must not undo it.
    assert!(harness.session.read(|session| session.ledger().has(&target)));
    assert!(harness.cached(&alice, TargetKind::Article).contains("a1"));
}

#[rstest]
#[tokio::test]
async fn resolve_single_adopts_server_truth(harness: Harness) {
    let alice = alice();
    let target = Target::talk("t1").expect("target");
    harness.sign_in(&alice);
    harness.server.seed_like(&alice, &target);

    let liked = harness.engine().resolve_single(&target).await.expect("resolve");

    assert!(liked);
    assert!(harness.session.read(|session| session.ledger().has(&target)));
    assert!(harness.cached(&alice, TargetKind::Talk).contains("t1"));
    assert_eq!(harness.server.calls(ApiOp::Status), 1);
}

#[rstest]
#[tokio::test]
async fn resolve_single_requires_identity(harness: Harness) {
    let target = Target::talk("t1").expect("target");
    let err = harness.engine().resolve_single(&target).await.unwrap_err();
    assert_eq!(err, LikeError::NotAuthenticated);
    assert_eq!(harness.server.calls(ApiOp::Status), 0);
}

#[rstest]
#[tokio::test]
async fn initialize_folds_legacy_username_likes_into_id_partition(harness: Harness) {
    let ada = UserIdentity::new("u-17")
        .expect("identity")
        .with_legacy_key("ada");
    harness
        .store
        .set("user_ada_liked_articles", r#"["a1","a2"]"#)
        .expect("seed legacy");
    harness
        .cache
        .save(Some(&ada), TargetKind::Article, &ids(&["a3"]))
        .expect("seed cache");
    harness.server.sign_in(&ada);
    harness
        .server
        .seed_like(&ada, &Target::article("a1").expect("target"));

    harness
        .engine()
        .initialize(ada.clone(), &articles(&["a1", "a2"]))
        .await;

    // a2 was only remembered locally and the server says it is not liked.
    let expected = ids(&["a1", "a3"]);
    assert_eq!(
        harness
            .session
            .read(|session| session.ledger().liked_ids(TargetKind::Article)),
        expected
    );
    assert_eq!(harness.cached(&ada, TargetKind::Article), expected);
    assert_eq!(
        harness.store.get("user_ada_liked_articles").expect("read"),
        None
    );
}
