// SPDX-License-Identifier: PMPL-1.0-or-later
//! Performance benchmarks for cardinality rule evaluation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

use ngsi_semantic::{ClassRegistry, Evaluator, RuleSet, TagResolver, TagSet, VocabularySchema};

const VOCABULARY: &str = r#"{
    "classes": [
        { "name": "Device" },
        { "name": "Sensor", "parents": ["Device"] },
        { "name": "Actuator", "parents": ["Device"] },
        { "name": "Thermometer", "parents": ["Sensor"] },
        { "name": "Valve", "parents": ["Actuator"] },
        { "name": "SmartValve", "parents": ["Valve", "Sensor"] },
        {
            "name": "Room",
            "relationships": {
                "hasDevice": [
                    ["some", [["Thermometer"]]],
                    ["max|50", [["Actuator"]]],
                    ["only", [["Sensor"], ["Actuator"]]],
                    ["range|1,200", [["Sensor", "Actuator"]]]
                ]
            }
        }
    ]
}"#;

fn room_rules() -> RuleSet {
    let raw = vec![
        ("some".to_string(), vec![vec!["Thermometer".to_string()]]),
        ("max|50".to_string(), vec![vec!["Actuator".to_string()]]),
        (
            "only".to_string(),
            vec![vec!["Sensor".to_string()], vec!["Actuator".to_string()]],
        ),
        (
            "range|1,200".to_string(),
            vec![vec!["Sensor".to_string(), "Actuator".to_string()]],
        ),
    ];
    RuleSet::from_raw(&raw).unwrap()
}

fn device_tags(i: usize) -> TagSet {
    match i % 3 {
        0 => ["Device", "Sensor", "Thermometer"].into_iter().collect(),
        1 => ["Device", "Actuator", "Valve"].into_iter().collect(),
        _ => ["Device", "Actuator", "Valve", "Sensor", "SmartValve"].into_iter().collect(),
    }
}

// ============================================================================
// Evaluator Benchmarks
// ============================================================================

fn bench_evaluate_tags(c: &mut Criterion) {
    let rules = room_rules();
    let mut group = c.benchmark_group("evaluate");

    for size in [10usize, 100, 1000].iter() {
        let values: Vec<TagSet> = (0..*size).map(device_tags).collect();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("tag_resolver", size), &values, |b, values| {
            let evaluator = Evaluator::new(&TagResolver);
            b.iter(|| black_box(evaluator.evaluate(values, &rules)));
        });
    }

    group.finish();
}

fn bench_evaluate_registry(c: &mut Criterion) {
    let registry = VocabularySchema::from_json(VOCABULARY)
        .unwrap()
        .build_registry()
        .unwrap();
    let rules = room_rules();
    let mut group = c.benchmark_group("evaluate");

    for size in [10usize, 100, 1000].iter() {
        // Declared class only; the registry expands ancestors on every check
        let values: Vec<TagSet> = (0..*size)
            .map(|i| match i % 3 {
                0 => ["Thermometer"].into_iter().collect(),
                1 => ["Valve"].into_iter().collect(),
                _ => ["SmartValve"].into_iter().collect(),
            })
            .collect();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("class_registry", size), &values, |b, values| {
            let evaluator = Evaluator::new(&registry);
            b.iter(|| black_box(evaluator.evaluate(values, &rules)));
        });
    }

    group.finish();
}

// ============================================================================
// Relationship Benchmarks
// ============================================================================

fn bench_relationship_mutation(c: &mut Criterion) {
    let registry: Arc<ClassRegistry> = Arc::new(
        VocabularySchema::from_json(VOCABULARY)
            .unwrap()
            .build_registry()
            .unwrap(),
    );
    let mut group = c.benchmark_group("relationship");

    group.bench_function("append_validate_remove", |b| {
        let mut room = registry.instantiate("Room").unwrap();
        for _ in 0..100 {
            let value = registry.instance("Thermometer").unwrap();
            room.relationship_mut("hasDevice").unwrap().append(value);
        }
        let valve = registry.instance("SmartValve").unwrap();

        b.iter(|| {
            let rel = room.relationship_mut("hasDevice").unwrap();
            rel.append(Arc::clone(&valve));
            let valid = rel.validate();
            let last = rel.len() - 1;
            rel.remove_at(last).unwrap();
            black_box(valid)
        });
    });

    group.bench_function("parse_rule_set", |b| {
        b.iter(|| black_box(room_rules()));
    });

    group.finish();
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group!(
    evaluator_benches,
    bench_evaluate_tags,
    bench_evaluate_registry
);

criterion_group!(
    relationship_benches,
    bench_relationship_mutation
);

criterion_main!(evaluator_benches, relationship_benches);
