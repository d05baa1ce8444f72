use vela_typeflow::{FlowError, MethodRef, TableHierarchy, TypeFlowGraph};

fn graph() -> TypeFlowGraph {
    TypeFlowGraph::new(Box::new(TableHierarchy::with_minimal_rt()))
}

#[test]
fn propagation_into_a_locked_node_fails_with_context() {
    let mut g = graph();
    let a = g.create_node(None);
    let b = g.create_node(None);
    g.connect(a, b);
    g.set_tag(a, "A");
    g.set_method(a, MethodRef::new("com.example.Main", "run", "()V"));

    let t0 = g.intern_type("T0");
    let t1 = g.intern_type("T1");
    g.propagate_all(a, &[t0, t1]);
    g.run().unwrap();
    g.lock();

    let t2 = g.intern_type("T2");
    g.propagate(a, t2);
    let err = g.run().unwrap_err();
    match err {
        FlowError::LockViolation {
            type_name,
            method,
            tag,
        } => {
            assert_eq!(type_name, "T2");
            assert_eq!(tag.as_deref(), Some("A"));
            assert_eq!(method, Some(MethodRef::new("com.example.Main", "run", "()V")));
        }
        other => panic!("expected a lock violation, got: {other}"),
    }
}

#[test]
fn lock_violation_message_names_the_offender() {
    let mut g = graph();
    let a = g.create_node(None);
    g.set_tag(a, "field:values");
    g.run().unwrap();
    g.lock();

    let t0 = g.intern_type("T0");
    g.propagate(a, t0);
    let message = g.run().unwrap_err().to_string();
    assert!(message.contains("T0"), "message was: {message}");
    assert!(message.contains("field:values"), "message was: {message}");
}

#[test]
fn reads_succeed_after_lock() {
    let mut g = graph();
    let a = g.create_node(None);
    let t0 = g.intern_type("T0");
    g.propagate(a, t0);
    g.run().unwrap();
    g.lock();

    assert!(g.is_locked());
    assert!(g.has_type(a, t0));
    assert!(g.has_type_named(a, "T0"));
    assert_eq!(g.types_of(a), vec!["T0"]);
    assert!(!g.has_array_type(a));
}

#[test]
fn re_propagating_an_accepted_type_after_lock_is_harmless() {
    let mut g = graph();
    let a = g.create_node(None);
    let t0 = g.intern_type("T0");
    g.propagate(a, t0);
    g.run().unwrap();
    g.lock();

    // Already accepted, so the short-circuit drops it before the lock check.
    g.propagate(a, t0);
    g.run().unwrap();
    assert_eq!(g.types_of(a), vec!["T0"]);
}

#[test]
fn nodes_created_after_lock_are_born_locked() {
    let mut g = graph();
    g.run().unwrap();
    g.lock();

    let late = g.create_node(None);
    let t0 = g.intern_type("T0");
    g.propagate(late, t0);
    assert!(matches!(
        g.run(),
        Err(FlowError::LockViolation { .. })
    ));
}
