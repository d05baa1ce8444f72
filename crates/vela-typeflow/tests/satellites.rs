use pretty_assertions::assert_eq;
use vela_typeflow::{
    ClassStub, TableHierarchy, TypeFlowConfig, TypeFlowGraph, ValueType, MAX_DEGREE,
};

fn c_hierarchy() -> TableHierarchy {
    let mut hierarchy = TableHierarchy::new();
    hierarchy.add(ClassStub::new("C"));
    hierarchy.add(ClassStub::new("T0").extending("C"));
    hierarchy.add(ClassStub::new("T1"));
    hierarchy
}

#[test]
fn array_item_projects_the_element_bound() {
    let mut graph = TypeFlowGraph::new(Box::new(c_hierarchy()));
    let a = graph.create_node(Some(ValueType::array_of(ValueType::object("C"))));
    let item = graph.array_item(a);

    let t0 = graph.intern_type("T0");
    let t1 = graph.intern_type("T1");
    graph.propagate(item, t0);
    graph.propagate(item, t1);
    graph.run().unwrap();

    assert_eq!(graph.types_of(item), vec!["T0"]);
    assert!(graph.has_array_type(a));
    assert_eq!(graph.array_item(a), item);
}

#[test]
fn array_item_of_unbounded_node_is_unfiltered() {
    let mut graph = TypeFlowGraph::new(Box::new(c_hierarchy()));
    let a = graph.create_node(None);
    let item = graph.array_item(a);

    let t1 = graph.intern_type("T1");
    graph.propagate(item, t1);
    graph.run().unwrap();

    assert_eq!(graph.types_of(item), vec!["T1"]);
}

#[test]
fn has_array_type_requires_a_materialised_nonempty_satellite() {
    let mut graph = TypeFlowGraph::new(Box::new(c_hierarchy()));
    let a = graph.create_node(None);
    assert!(!graph.has_array_type(a));

    let item = graph.array_item(a);
    assert!(!graph.has_array_type(a));

    let t0 = graph.intern_type("T0");
    graph.propagate(item, t0);
    graph.run().unwrap();
    assert!(graph.has_array_type(a));
}

#[test]
fn satellites_are_identity_stable() {
    let mut graph = TypeFlowGraph::new(Box::new(c_hierarchy()));
    let a = graph.create_node(None);

    assert_eq!(graph.array_item(a), graph.array_item(a));
    assert_eq!(graph.class_value(a), graph.class_value(a));
    assert_ne!(graph.array_item(a), graph.class_value(a));
}

#[test]
fn array_item_increments_degree_and_class_value_preserves_it() {
    let mut graph = TypeFlowGraph::new(Box::new(c_hierarchy()));
    let a = graph.create_node(None);
    assert_eq!(graph.degree(a), 0);

    let item = graph.array_item(a);
    assert_eq!(graph.degree(item), 1);

    let class_value = graph.class_value(item);
    assert_eq!(graph.degree(class_value), 1);
}

#[test]
fn class_value_of_a_class_value_is_itself() {
    let mut graph = TypeFlowGraph::new(Box::new(c_hierarchy()));
    let a = graph.create_node(None);
    let class_value = graph.class_value(a);
    assert_eq!(graph.class_value(class_value), class_value);
}

#[test]
fn nodes_past_the_degree_bound_never_gain_types() {
    let mut graph = TypeFlowGraph::new(Box::new(c_hierarchy()));
    let a = graph.create_node(None);

    let mut node = a;
    for _ in 0..MAX_DEGREE + 1 {
        node = graph.array_item(node);
    }
    assert_eq!(graph.degree(node), MAX_DEGREE + 1);

    let t0 = graph.intern_type("T0");
    graph.propagate(node, t0);
    graph.propagate_all(node, &[t0]);
    graph.run().unwrap();

    assert!(graph.types_of(node).is_empty());
}

#[test]
fn deep_array_nesting_stops_flowing_past_the_bound() {
    let mut graph = TypeFlowGraph::new(Box::new(c_hierarchy()));
    let a = graph.create_node(None);
    let d1 = graph.array_item(a);
    let d2 = graph.array_item(d1);
    let d3 = graph.array_item(d2);

    let t0 = graph.intern_type("T0");
    graph.propagate(d2, t0);
    graph.connect(d2, d3);
    graph.run().unwrap();

    assert_eq!(graph.types_of(d2), vec!["T0"]);
    assert!(graph.types_of(d3).is_empty());
}

#[test]
fn satellite_tags_follow_the_parent_when_enabled() {
    let config = TypeFlowConfig {
        tag_satellites: true,
        ..TypeFlowConfig::default()
    };
    let mut graph = TypeFlowGraph::with_config(Box::new(c_hierarchy()), config);
    let a = graph.create_node(None);
    graph.set_tag(a, "Main.run:arg0");

    let item = graph.array_item(a);
    let class_value = graph.class_value(a);
    assert_eq!(graph.tag(item), Some("Main.run:arg0["));
    assert_eq!(graph.tag(class_value), Some("Main.run:arg0@"));
}

#[test]
fn satellite_tags_are_absent_by_default() {
    let mut graph = TypeFlowGraph::new(Box::new(c_hierarchy()));
    let a = graph.create_node(None);
    graph.set_tag(a, "Main.run:arg0");

    let item = graph.array_item(a);
    assert_eq!(graph.tag(item), None);
}

#[test]
fn array_item_inherits_the_originating_method() {
    let mut graph = TypeFlowGraph::new(Box::new(c_hierarchy()));
    let a = graph.create_node(None);
    let method = vela_typeflow::MethodRef::new("com.example.Main", "run", "()V");
    graph.set_method(a, method.clone());

    let item = graph.array_item(a);
    assert_eq!(graph.method(item), Some(&method));
}
