//! Integration tests for the AnalysisStore mutation surface.

use firstp::model::{
    Assumption, AssumptionCategory, DecompositionNode, NodeType, ValidationResult,
};
use firstp::store::AnalysisStore;

/// Build a five-level chain under a root and return every node id,
/// root first.
fn build_deep_tree(store: &mut AnalysisStore) -> Vec<String> {
    let mut ids = Vec::new();
    let root = DecompositionNode::new("root").with_type(NodeType::Root);
    let mut parent_id = root.id.clone();
    let mut parent_depth = root.depth;
    ids.push(root.id.clone());
    store.add_node(root);

    for level in 1..=5 {
        let node = DecompositionNode::new(format!("level {}", level))
            .with_parent(parent_id.clone(), parent_depth + 1);
        parent_id = node.id.clone();
        parent_depth = node.depth;
        ids.push(node.id.clone());
        store.add_node(node);
    }
    ids
}

#[test]
fn test_removing_root_clears_descendants_at_depth_5() {
    let mut store = AnalysisStore::new();
    let ids = build_deep_tree(&mut store);
    assert_eq!(store.analysis().tree.node_count(), 6);
    assert_eq!(store.analysis().tree.edges.len(), 5);

    let removed = store.remove_node(&ids[0]);

    assert_eq!(removed, 6);
    assert_eq!(store.analysis().tree.node_count(), 0);
    assert!(store.analysis().tree.edges.is_empty());
}

#[test]
fn test_removing_mid_chain_keeps_ancestors() {
    let mut store = AnalysisStore::new();
    let ids = build_deep_tree(&mut store);

    // Remove level 3; levels 4 and 5 go with it.
    let removed = store.remove_node(&ids[3]);

    assert_eq!(removed, 3);
    assert_eq!(store.analysis().tree.node_count(), 3);
    assert!(store.analysis().tree.get(&ids[2]).is_some());
    assert!(store.analysis().tree.get(&ids[4]).is_none());
    // No surviving edge references a removed node.
    for edge in &store.analysis().tree.edges {
        assert!(store.analysis().tree.get(&edge.source).is_some());
        assert!(store.analysis().tree.get(&edge.target).is_some());
    }
}

#[test]
fn test_branching_subtree_removal() {
    let mut store = AnalysisStore::new();
    let root = DecompositionNode::new("root").with_type(NodeType::Root);
    let root_id = root.id.clone();
    store.add_node(root);

    // Two children, each with two grandchildren.
    let mut first_child_id = None;
    for c in 0..2 {
        let child = DecompositionNode::new(format!("child {}", c)).with_parent(root_id.clone(), 1);
        let child_id = child.id.clone();
        store.add_node(child);
        if c == 0 {
            first_child_id = Some(child_id.clone());
        }
        for g in 0..2 {
            let grandchild = DecompositionNode::new(format!("grandchild {}.{}", c, g))
                .with_parent(child_id.clone(), 2);
            store.add_node(grandchild);
        }
    }
    assert_eq!(store.analysis().tree.node_count(), 7);

    let removed = store.remove_node(&first_child_id.unwrap());

    assert_eq!(removed, 3);
    assert_eq!(store.analysis().tree.node_count(), 4);
    assert_eq!(store.analysis().tree.non_root_count(), 3);
}

#[test]
fn test_validation_upsert_is_one_to_one_per_node() {
    let mut store = AnalysisStore::new();
    let node = DecompositionNode::new("claim");
    let node_id = node.id.clone();
    store.add_node(node);

    let mut first = ValidationResult::new(node_id.clone());
    first.summary = "first".to_string();
    let mut second = ValidationResult::new(node_id.clone());
    second.summary = "second".to_string();

    store.upsert_validation(first);
    store.upsert_validation(second.clone());

    assert_eq!(store.analysis().validations.len(), 1);
    assert_eq!(store.analysis().validations[0], second);
}

#[test]
fn test_validations_for_different_nodes_coexist() {
    let mut store = AnalysisStore::new();
    store.upsert_validation(ValidationResult::new("node-a"));
    store.upsert_validation(ValidationResult::new("node-b"));
    store.upsert_validation(ValidationResult::new("node-a"));

    assert_eq!(store.analysis().validations.len(), 2);
}

#[test]
fn test_case_insensitive_assumption_dedup_does_not_grow_count() {
    let mut store = AnalysisStore::new();
    store.add_assumption(Assumption::new(
        "The market wants this",
        AssumptionCategory::Economic,
    ));
    let count_before = store.analysis().assumptions.len();

    let added = store.add_assumption_if_new(Assumption::new(
        "THE MARKET WANTS THIS",
        AssumptionCategory::Economic,
    ));

    assert!(!added);
    assert_eq!(store.analysis().assumptions.len(), count_before);
}

#[test]
fn test_every_data_mutation_bumps_updated_at() {
    let mut store = AnalysisStore::new();
    let mut last = store.analysis().updated_at;

    let mut assert_bumped = |store: &AnalysisStore| {
        let now = store.analysis().updated_at;
        assert!(now > last, "updatedAt must strictly increase");
        last = now;
    };

    store.set_original_input("input");
    assert_bumped(&store);
    store.add_assumption(Assumption::new("a", AssumptionCategory::Domain));
    assert_bumped(&store);
    let node = DecompositionNode::new("n");
    let node_id = node.id.clone();
    store.add_node(node);
    assert_bumped(&store);
    store.upsert_validation(ValidationResult::new(node_id));
    assert_bumped(&store);
    store.increment_ai_interactions();
    assert_bumped(&store);
}
