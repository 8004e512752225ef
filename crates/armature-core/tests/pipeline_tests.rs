//! # Pipeline Tests (T1-T4)
//!
//! End-to-end verification of the engine's observable contract.
//!
//! ## Tiers
//! - T1: Transactional Creation
//! - T2: Relationship Inference
//! - T3: Dependency Analysis
//! - T4: Wire Format

use armature_core::{
    ArmatureError, CrossSection, CurveMember, CurveMemberParts, DependencyAnalyzer, Edge,
    EdgeKind, InferenceEngine, Material, Model, MutationEngine, Node, NodeCore, Point,
    PointConnection, SectionShape, Segment, ShapeParameters, Storey, wire,
};

// =============================================================================
// TIER T1: TRANSACTIONAL CREATION
// =============================================================================

mod t1_transactions {
    use super::*;

    /// T1.1: Coordinate dedup through the factory returns the same
    /// instance both times and stores exactly one record.
    #[test]
    fn coordinate_dedup_returns_same_instance() {
        let mut model = Model::new();

        let first =
            MutationEngine::create_point(&mut model, Point::new(NodeCore::new("p1"), 4.0, 2.0, 0.0))
                .expect("first");
        let second =
            MutationEngine::create_point(&mut model, Point::new(NodeCore::new("p2"), 4.0, 2.0, 0.0))
                .expect("second");

        assert_eq!(first, second);
        assert_eq!(model.node_count(), 1);
    }

    /// T1.2: A forced build failure leaves node and edge counts exactly as
    /// they were and appends exactly one entry to the error log.
    #[test]
    fn rollback_restores_counts_and_logs_once() {
        let mut model = Model::new();
        MutationEngine::create_material(
            &mut model,
            Material::new(NodeCore::new("steel").with_source_id("S355")),
        )
        .expect("material");
        let nodes_before = model.node_count();
        let edges_before = model.edge_count();

        let bad_section = CrossSection::new(NodeCore::new("cs"), SectionShape::TProfile)
            .with_parameters(ShapeParameters::new(SectionShape::Rectangle, vec![0.1]));
        let result = MutationEngine::create_cross_section(&mut model, bad_section, None);

        assert!(matches!(result, Err(ArmatureError::CreateFailed { .. })));
        assert_eq!(model.node_count(), nodes_before);
        assert_eq!(model.edge_count(), edges_before);
        assert_eq!(model.error_log().len(), 1);
    }

    /// T1.3: Validation failures are rejected before the transaction and
    /// never reach the error log.
    #[test]
    fn blank_id_never_reaches_error_log() {
        let mut model = Model::new();
        let result =
            MutationEngine::create_storey(&mut model, Storey::new(NodeCore::new(""), 0.0));

        assert!(matches!(result, Err(ArmatureError::InvalidRecord(_))));
        assert!(model.error_log().is_empty());
    }

    /// T1.4: Metrics agree with the list lengths after mixed activity.
    #[test]
    fn metrics_agree_with_lists() {
        let mut model = Model::new();
        MutationEngine::create_storey(
            &mut model,
            Storey::new(NodeCore::new("st").with_source_id("L1"), 3.0),
        )
        .expect("storey");
        MutationEngine::create_point(&mut model, Point::new(NodeCore::new("p"), 0.0, 0.0, 0.0))
            .expect("point");
        let _ = MutationEngine::create_storey(
            &mut model,
            Storey::new(NodeCore::new("st"), 99.0), // duplicate id, rolls back
        );

        let metrics = model.metrics();
        assert_eq!(metrics.node_count, model.node_count());
        assert_eq!(metrics.edge_count, model.edge_count());
        assert_eq!(metrics.functional, 1);
        assert_eq!(metrics.geometry, 1);
        assert_eq!(metrics.error_count, 1);
    }
}

// =============================================================================
// TIER T2: RELATIONSHIP INFERENCE
// =============================================================================

mod t2_inference {
    use super::*;

    /// T2.1: A cross-section referencing a material yields exactly one
    /// has-material edge from the section to the material.
    #[test]
    fn material_reference_yields_one_edge() {
        let mut model = Model::new();
        model.add_node(Node::Material(Material::new(NodeCore::new("steel"))));
        model.add_node(Node::CrossSection(
            CrossSection::new(NodeCore::new("cs"), SectionShape::IProfile).with_material("steel"),
        ));

        let added = InferenceEngine::run(&mut model);

        assert_eq!(added, 1);
        let edge = &model.edges()[0];
        assert_eq!(edge.kind, EdgeKind::HasMaterial);
        assert_eq!(edge.source, "cs");
        assert_eq!(edge.target, "steel");
    }

    /// T2.2: A null material reference yields zero edges and no error.
    #[test]
    fn null_reference_yields_zero_edges() {
        let mut model = Model::new();
        model.add_node(Node::CrossSection(CrossSection::new(
            NodeCore::new("cs"),
            SectionShape::Circle,
        )));

        assert_eq!(InferenceEngine::run(&mut model), 0);
        assert_eq!(model.edge_count(), 0);
    }

    /// T2.3: Re-running the pass over an unchanged model adds nothing.
    #[test]
    fn rerun_is_a_noop() {
        let mut model = Model::new();
        model.add_node(Node::CrossSection(
            CrossSection::new(NodeCore::new("cs"), SectionShape::IProfile).with_material("steel"),
        ));

        let first = InferenceEngine::run(&mut model);
        let second = InferenceEngine::run(&mut model);

        assert_eq!(first, 1);
        assert_eq!(second, 0);
        assert_eq!(model.edge_count(), 1);
    }

    /// T2.4: The pass never removes or mutates pre-existing edges.
    #[test]
    fn existing_edges_survive_the_pass() {
        let mut model = Model::new();
        model.add_node(Node::CrossSection(
            CrossSection::new(NodeCore::new("cs"), SectionShape::IProfile).with_material("steel"),
        ));
        model.add_edge(Edge::with_id("manual", "a", "b", EdgeKind::OnStorey));

        InferenceEngine::run(&mut model);

        assert_eq!(model.edge_count(), 2);
        assert_eq!(model.edges()[0].id, "manual");
    }
}

// =============================================================================
// TIER T3: DEPENDENCY ANALYSIS
// =============================================================================

mod t3_analysis {
    use super::*;

    fn chain_model() -> Model {
        let mut model = Model::new();
        for id in ["A", "B", "C"] {
            model.add_node(Node::Material(Material::new(NodeCore::new(id))));
        }
        model.add_edge(Edge::new("A", "B", EdgeKind::OnStorey));
        model.add_edge(Edge::new("B", "C", EdgeKind::OnStorey));
        model
    }

    /// T3.1: A depends on B depends on C orders C before B before A.
    #[test]
    fn chain_orders_target_first() {
        let order = DependencyAnalyzer::topological_order(&chain_model()).expect("order");
        assert_eq!(order, vec!["C", "B", "A"]);
    }

    /// T3.2: Closing the chain with C -> A produces a single cycle
    /// containing all three nodes, and the ordering refuses.
    #[test]
    fn closed_chain_reports_single_cycle() {
        let mut model = chain_model();
        model.add_edge(Edge::new("C", "A", EdgeKind::OnStorey));

        let cycles = DependencyAnalyzer::find_cycles(&model);
        assert_eq!(cycles.len(), 1);
        let mut members = cycles[0].clone();
        members.sort();
        assert_eq!(members, vec!["A", "B", "C"]);

        let err = DependencyAnalyzer::topological_order(&model).expect_err("cyclic");
        match err {
            ArmatureError::CyclicDependency { cycles } => assert_eq!(cycles.len(), 1),
            other => unreachable!("expected CyclicDependency, got {other:?}"),
        }
    }

    /// T3.3: Inferred edges drive the ordering: a member graph orders its
    /// dependencies (material, section, storey) before the member.
    #[test]
    fn inferred_graph_orders_dependencies_first() {
        let mut model = Model::new();
        let section = CrossSection::new(
            NodeCore::new("cs").with_source_id("W200"),
            SectionShape::IProfile,
        );
        let parts = CurveMemberParts {
            cross_section: Some(section),
            storey: Some(Storey::new(NodeCore::new("st").with_source_id("L1"), 3.0)),
            ..CurveMemberParts::default()
        };
        MutationEngine::create_curve_member(
            &mut model,
            CurveMember::new(NodeCore::new("beam")),
            parts,
        )
        .expect("member");
        InferenceEngine::run(&mut model);

        let order = DependencyAnalyzer::topological_order(&model).expect("order");
        let position = |id: &str| {
            order
                .iter()
                .position(|entry| entry == id)
                .expect("id present")
        };
        assert!(position("cs") < position("beam"));
        assert!(position("st") < position("beam"));
    }
}

// =============================================================================
// TIER T4: WIRE FORMAT
// =============================================================================

mod t4_wire {
    use super::*;

    /// T4.1: A 3-node/2-edge graph round-trips field-for-field.
    #[test]
    fn three_node_two_edge_roundtrip() {
        let mut model = Model::new();
        model.add_node(Node::Material(
            Material::new(NodeCore::new("steel").with_source_id("S355")).with_grade("S355"),
        ));
        model.add_node(Node::CrossSection(
            CrossSection::new(NodeCore::new("cs"), SectionShape::IProfile).with_material("steel"),
        ));
        model.add_node(Node::Storey(
            Storey::new(NodeCore::new("st").with_name("Level 1"), 3.0),
        ));
        model.add_edge(Edge::with_id("e-1", "cs", "steel", EdgeKind::HasMaterial));
        model.add_edge(Edge::with_id("e-2", "cs", "st", EdgeKind::OnStorey));

        let document = wire::to_json(&model).expect("export");
        let restored = wire::from_json(&document).expect("import");

        assert_eq!(restored.node_count(), 3);
        assert_eq!(restored.edge_count(), 2);
        let ids: Vec<_> = restored.nodes().iter().map(Node::id).collect();
        assert_eq!(ids, vec!["steel", "cs", "st"]);
        assert_eq!(restored.edges()[0].source, "cs");
        assert_eq!(restored.edges()[0].target, "steel");
        assert_eq!(restored.edges()[1].kind, EdgeKind::OnStorey);

        if let Some(Node::Storey(storey)) = restored.node("st") {
            assert_eq!(storey.core.name, "Level 1");
            assert_eq!(storey.elevation, 3.0);
        } else {
            unreachable!("expected storey");
        }
    }

    /// T4.2: The full pipeline (create -> infer -> export -> import ->
    /// re-export) is byte-stable.
    #[test]
    fn full_pipeline_is_byte_stable() {
        let mut model = Model::new();
        let parts = CurveMemberParts {
            cross_section: Some(
                CrossSection::new(
                    NodeCore::new("cs").with_source_id("W200"),
                    SectionShape::IProfile,
                )
                .with_parameters(ShapeParameters::new(SectionShape::IProfile, vec![0.2, 0.4])),
            ),
            storey: Some(Storey::new(NodeCore::new("st").with_source_id("L1"), 3.0)),
            segments: vec![Segment::new(NodeCore::new("seg").with_source_id("SEG-1"))],
            begin_connection: Some(PointConnection::new(
                NodeCore::new("conn-a").with_source_id("N-A"),
            )),
            end_connection: Some(PointConnection::new(
                NodeCore::new("conn-b").with_source_id("N-B"),
            )),
        };
        MutationEngine::create_curve_member(
            &mut model,
            CurveMember::new(NodeCore::new("beam").with_name("B-1")),
            parts,
        )
        .expect("member");
        InferenceEngine::run(&mut model);

        let first = wire::to_json(&model).expect("export");
        let restored = wire::from_json(&first).expect("import");
        let second = wire::to_json(&restored).expect("re-export");

        assert_eq!(first, second);
        assert_eq!(restored.node_count(), model.node_count());
        assert_eq!(restored.edge_count(), model.edge_count());
    }

    /// T4.3: A document exceeding the node cap is refused before any
    /// record is decoded.
    #[test]
    fn oversized_document_refused_before_decoding() {
        use armature_core::primitives::MAX_IMPORT_NODE_COUNT;

        // Null entries would each fail element decoding; the cap check
        // fires first, so the error must name the count.
        let entries = vec!["null"; MAX_IMPORT_NODE_COUNT + 1].join(",");
        let document = format!("{{\"nodes\":[{entries}],\"edges\":[]}}");

        let err = wire::from_json(&document).expect_err("oversized");
        match err {
            ArmatureError::Deserialization(message) => {
                assert!(message.contains("exceeds maximum allowed"));
            }
            other => unreachable!("expected Deserialization, got {other:?}"),
        }
    }

    /// T4.4: Importing an exported model keeps working after another
    /// create -> infer cycle (the codec does not corrupt the graph).
    #[test]
    fn imported_model_remains_mutable() {
        let mut model = Model::new();
        MutationEngine::create_material(
            &mut model,
            Material::new(NodeCore::new("steel").with_source_id("S355")),
        )
        .expect("material");

        let document = wire::to_json(&model).expect("export");
        let mut restored = wire::from_json(&document).expect("import");

        // The canonical material must still dedup after the round trip.
        let id = MutationEngine::create_material(
            &mut restored,
            Material::new(NodeCore::new("steel-2").with_source_id("s355")),
        )
        .expect("dedup create");
        assert_eq!(id, "steel");
        assert_eq!(restored.node_count(), 1);
    }
}
