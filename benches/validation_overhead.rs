//! Validation Overhead Benchmarks
//!
//! Measures what the student write pipeline costs before any datastore is
//! touched: request parsing, normalization and the rule table, plus a full
//! in-memory create for comparison.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use school_portal::model::{StudentFields, Teacher};
use school_portal::providers::{RecordRepository, StudentRepository};
use school_portal::storage::InMemoryStorage;
use school_portal::validation::{ValidationMode, normalize_student, validate_student};
use serde_json::{Value, json};

fn create_student_data(index: usize) -> Value {
    json!({
        "name": format!("  Student Number {} ", index),
        "email": format!("Student{}@School.Com", index),
        "rollNo": format!("r{:05}", index),
        "class": "10A",
        "section": "B",
        "phone": "(555) 123-4567",
        "address": format!("{} Long Road, Springfield", index),
        "status": "Active"
    })
}

fn create_invalid_student_data(index: usize) -> Value {
    json!({
        "name": "J",
        "email": format!("student{}-at-school", index),
        "phone": "12345",
        "status": "enrolled"
    })
}

fn parse(data: &[Value]) -> Vec<StudentFields> {
    data.iter()
        .map(|d| serde_json::from_value(d.clone()).unwrap())
        .collect()
}

/// Benchmark the pure pipeline stages on valid and invalid input
fn bench_student_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("student_pipeline");

    for size in [1, 10, 100].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        let valid = parse(&(0..*size).map(create_student_data).collect::<Vec<_>>());
        let invalid = parse(&(0..*size).map(create_invalid_student_data).collect::<Vec<_>>());

        group.bench_with_input(BenchmarkId::new("normalize", size), &valid, |b, fields| {
            b.iter(|| {
                for f in fields {
                    black_box(normalize_student(black_box(f.clone())));
                }
            });
        });

        group.bench_with_input(
            BenchmarkId::new("normalize_and_validate", size),
            &valid,
            |b, fields| {
                b.iter(|| {
                    for f in fields {
                        let normalized = normalize_student(f.clone());
                        black_box(validate_student(&normalized, ValidationMode::Create));
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("validate_rejections", size),
            &invalid,
            |b, fields| {
                b.iter(|| {
                    for f in fields {
                        black_box(validate_student(black_box(f), ValidationMode::Create));
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark request body parsing into the raw field shape
fn bench_request_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_parsing");
    let body = create_student_data(1).to_string();

    group.bench_function("student_fields_from_str", |b| {
        b.iter(|| {
            let fields: StudentFields = serde_json::from_str(black_box(&body)).unwrap();
            black_box(fields);
        });
    });

    group.finish();
}

/// Benchmark full creates through the repositories over in-memory storage
fn bench_repository_create(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("repository_create");

    group.bench_function("student_create_100", |b| {
        let fields = parse(&(0..100).map(create_student_data).collect::<Vec<_>>());
        b.iter(|| {
            runtime.block_on(async {
                let repo = StudentRepository::new(InMemoryStorage::new()).await.unwrap();
                for f in &fields {
                    black_box(repo.create(f.clone()).await.unwrap());
                }
            });
        });
    });

    group.bench_function("teacher_create_100", |b| {
        let inputs: Vec<Value> = (0..100)
            .map(|i| {
                json!({
                    "name": format!("Teacher {}", i),
                    "email": format!("teacher{}@school.com", i),
                    "subject": "Mathematics",
                    "experience": i
                })
            })
            .collect();
        b.iter(|| {
            runtime.block_on(async {
                let repo: RecordRepository<_, Teacher> = RecordRepository::new(InMemoryStorage::new());
                for input in &inputs {
                    black_box(repo.create(input).await.unwrap());
                }
            });
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_student_pipeline,
    bench_request_parsing,
    bench_repository_create
);
criterion_main!(benches);
