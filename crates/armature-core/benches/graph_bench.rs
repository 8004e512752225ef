//! # Graph Benchmarks
//!
//! Performance benchmarks for armature-core engine operations.
//!
//! Run with: `cargo bench -p armature-core`

use armature_core::{
    CrossSection, CurveMember, DependencyAnalyzer, InferenceEngine, Material, Model, Node,
    NodeCore, SectionShape, Storey, wire,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Build a model with one storey, N cross-sections, and N members, each
/// member referencing its section and the storey.
fn create_member_model(size: usize) -> Model {
    let mut model = Model::new();
    model.add_node(Node::Material(Material::new(NodeCore::new("steel"))));
    model.add_node(Node::Storey(Storey::new(NodeCore::new("st"), 0.0)));

    for i in 0..size {
        let section = CrossSection::new(NodeCore::new(format!("cs-{i}")), SectionShape::IProfile)
            .with_material("steel");
        model.add_node(Node::CrossSection(section));

        let mut member = CurveMember::new(NodeCore::new(format!("beam-{i}")));
        member.cross_section = Some(format!("cs-{i}"));
        member.storey = Some("st".to_string());
        model.add_node(Node::CurveMember(member));
    }
    model
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("inference_pass");

    for size in [100, 1000, 10000].iter() {
        let model = create_member_model(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut scratch = model.clone();
                InferenceEngine::run(&mut scratch);
                black_box(scratch)
            });
        });
    }
    group.finish();
}

fn bench_topological_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("topological_order");

    for size in [100, 1000, 10000].iter() {
        let mut model = create_member_model(*size);
        InferenceEngine::run(&mut model);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(DependencyAnalyzer::topological_order(&model)));
        });
    }
    group.finish();
}

fn bench_wire_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("wire_export");

    for size in [100, 1000].iter() {
        let mut model = create_member_model(*size);
        InferenceEngine::run(&mut model);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(wire::to_json(&model)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_inference,
    bench_topological_order,
    bench_wire_export
);
criterion_main!(benches);
