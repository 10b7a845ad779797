//! # Appraisal Benchmarks
//!
//! Performance benchmarks for merit-core appraisal operations.
//!
//! Run with: `cargo bench -p merit-core`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use merit_core::{
    compute_field_access, ActorRole, Appraisal, AppraisalId, AppraisalKind, AssessmentInput,
    EmployeeId, EmployeeRef, EntityStore, Goal, GoalId, SharedStore, Status, Timestamp, Weightage,
};
use std::hint::black_box;

const APPRAISEE: EmployeeId = EmployeeId(1);
const APPRAISER: EmployeeId = EmployeeId(2);
const REVIEWER: EmployeeId = EmployeeId(3);

fn now() -> Timestamp {
    Timestamp::new(1_700_000_000)
}

fn goal(id: u64, weightage: u8) -> Goal {
    Goal::new(
        GoalId(id),
        format!("Goal {id}"),
        "",
        "delivery",
        "high",
        Weightage::new(weightage),
    )
}

/// Create a draft holding `size` goals weighted to an exact 100% total.
/// `size` must divide 100 evenly.
fn create_full_draft(size: usize) -> Appraisal {
    let weightage = (100 / size) as u8;
    let mut appraisal = Appraisal::create(
        AppraisalId(1),
        AppraisalKind::Annual,
        EmployeeRef::new(APPRAISEE, false),
        EmployeeRef::new(APPRAISER, true),
        EmployeeRef::new(REVIEWER, true),
        None,
        now(),
        now().plus(1_000_000),
        now(),
    )
    .expect("create");

    for i in 0..size {
        appraisal
            .attach_goal(APPRAISER, goal(i as u64 + 1, weightage), now())
            .expect("attach");
    }
    appraisal
}

/// One batch item per attached goal.
fn assess_all(appraisal: &Appraisal, rating: u8) -> Vec<AssessmentInput> {
    appraisal
        .goals()
        .map(|g| AssessmentInput {
            entry: g.entry,
            rating,
            comment: "Done.".to_string(),
        })
        .collect()
}

/// Drive a full draft through every phase to Complete.
fn run_full_chain(size: usize) -> Appraisal {
    let mut appraisal = create_full_draft(size);
    appraisal
        .advance(APPRAISER, Status::Submitted, now())
        .expect("submit");
    appraisal
        .advance(APPRAISEE, Status::AppraiseeSelfAssessment, now())
        .expect("open self-assessment");

    let items = assess_all(&appraisal, 4);
    appraisal
        .record_self_assessment(APPRAISEE, &items, now())
        .expect("record self");
    appraisal
        .advance(APPRAISEE, Status::AppraiserEvaluation, now())
        .expect("hand to appraiser");

    let items = assess_all(&appraisal, 3);
    appraisal
        .record_appraiser_evaluation(APPRAISER, &items, 4, "Solid.", now())
        .expect("record evaluation");
    appraisal
        .advance(APPRAISER, Status::ReviewerEvaluation, now())
        .expect("hand to reviewer");

    appraisal
        .record_reviewer_evaluation(REVIEWER, 4, "Agreed.", now())
        .expect("record verdict");
    appraisal
        .advance(REVIEWER, Status::Complete, now())
        .expect("complete");
    appraisal
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_goal_attachment(c: &mut Criterion) {
    let mut group = c.benchmark_group("goal_attachment");

    for size in [10, 50, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| black_box(create_full_draft(size)));
        });
    }

    group.finish();
}

fn bench_gate_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_resolution");

    group.bench_function("full_table", |b| {
        b.iter(|| {
            for status in Status::ALL {
                for role in ActorRole::ALL {
                    black_box(compute_field_access(status, role));
                }
            }
        });
    });

    group.finish();
}

fn bench_batch_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_recording");

    for size in [10, 50, 100].iter() {
        let mut base = create_full_draft(*size);
        base.advance(APPRAISER, Status::Submitted, now())
            .expect("submit");
        base.advance(APPRAISEE, Status::AppraiseeSelfAssessment, now())
            .expect("open self-assessment");
        let items = assess_all(&base, 4);

        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| {
                let mut appraisal = base.clone();
                appraisal
                    .record_self_assessment(APPRAISEE, items, now())
                    .expect("record");
                black_box(appraisal)
            });
        });
    }

    group.finish();
}

fn bench_full_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_chain");

    for size in [10, 50, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| black_box(run_full_chain(size)));
        });
    }

    group.finish();
}

fn bench_store_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_load");

    for size in [10, 50, 100].iter() {
        let mut store = SharedStore::new();
        let mut appraisal = create_full_draft(*size);
        let id = store.insert(&mut appraisal).expect("insert");

        group.bench_with_input(BenchmarkId::from_parameter(size), &id, |b, &id| {
            b.iter(|| black_box(store.load(id).expect("load")));
        });
    }

    group.finish();
}

fn bench_store_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_save");

    for size in [10, 50, 100].iter() {
        let mut store = SharedStore::new();
        let mut appraisal = create_full_draft(*size);
        store.insert(&mut appraisal).expect("insert");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                store.save(&mut appraisal).expect("save");
                black_box(appraisal.version())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_goal_attachment,
    bench_gate_resolution,
    bench_batch_recording,
    bench_full_chain,
    bench_store_load,
    bench_store_save,
);

criterion_main!(benches);
