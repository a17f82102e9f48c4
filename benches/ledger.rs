// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use likeledger::ledger::LikeLedger;
use likeledger::model::{Target, TargetId, TargetKind};
use likeledger::sync::merge_like_state;
use tokio::time::Instant;

mod profiler;

fn targets(count: usize) -> Vec<Target> {
    (0..count)
        .map(|i| Target::article(format!("art-{i:05}")).expect("target"))
        .collect()
}

fn id_set(count: usize, step: usize) -> BTreeSet<TargetId> {
    (0..count)
        .step_by(step)
        .map(|i| TargetId::new(format!("art-{i:05}")).expect("id"))
        .collect()
}

fn statuses(count: usize) -> BTreeMap<TargetId, bool> {
    (0..count)
        .map(|i| (TargetId::new(format!("art-{i:05}")).expect("id"), i % 3 == 0))
        .collect()
}

// Group and case IDs stay stable so results remain comparable across refactors.
fn benches_ledger(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger.toggle_cycle");
    for count in [100usize, 10_000] {
        let targets = targets(count);
        group.bench_function(format!("begin_commit_end_{count}"), |b| {
            b.iter_batched_ref(
                || LikeLedger::new(Duration::ZERO),
                |ledger| {
                    let now = Instant::now();
                    for target in &targets {
                        if ledger.begin_operation(target, now) {
                            ledger.commit(target, true);
                            ledger.end_operation(target);
                        }
                    }
                    black_box(ledger.liked_count(TargetKind::Article))
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();

    let mut group = c.benchmark_group("ledger.reconcile");
    for count in [100usize, 10_000] {
        let local = id_set(count, 2);
        let server = statuses(count);
        group.bench_function(format!("merge_{count}"), |b| {
            b.iter(|| black_box(merge_like_state(black_box(&local), Some(black_box(&server)))))
        });

        let merged = merge_like_state(&local, Some(&server));
        group.bench_function(format!("replace_kind_{count}"), |b| {
            b.iter_batched_ref(
                || LikeLedger::new(Duration::ZERO),
                |ledger| {
                    ledger.replace_kind(TargetKind::Article, black_box(&merged), None);
                    black_box(ledger.len())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_ledger
}
criterion_main!(benches);
