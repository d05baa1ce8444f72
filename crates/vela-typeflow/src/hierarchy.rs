//! Class hierarchy oracle consumed by subtype filters.
//!
//! The engine never inspects class bodies; it only needs supertype edges.
//! Implementations can be backed by classpath metadata, the runtime library
//! index, or test fixtures.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

/// Class metadata fed to the engine by the embedder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStub {
    /// Binary name, e.g. `java.lang.String`.
    pub name: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
}

impl ClassStub {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_class: None,
            interfaces: Vec::new(),
        }
    }

    pub fn extending(mut self, super_class: impl Into<String>) -> Self {
        self.super_class = Some(super_class.into());
        self
    }

    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }
}

/// A source of class hierarchy facts.
///
/// Answers must be stable for the duration of an analysis run: the engine
/// memoises them and never revisits a cached result.
pub trait ClassHierarchy {
    fn resolve(&self, name: &str) -> Option<&ClassStub>;

    /// Whether `sub` names `ancestor`, extends it transitively, or implements
    /// it. Unresolvable names are never subtypes of anything but themselves.
    fn is_subtype(&self, sub: &str, ancestor: &str) -> bool {
        if sub == ancestor {
            return true;
        }

        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(sub.to_string());
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            let Some(stub) = self.resolve(&current) else {
                continue;
            };
            if let Some(super_class) = &stub.super_class {
                if super_class == ancestor {
                    return true;
                }
                queue.push_back(super_class.clone());
            }
            for interface in &stub.interfaces {
                if interface == ancestor {
                    return true;
                }
                queue.push_back(interface.clone());
            }
        }
        false
    }
}

/// An in-memory [`ClassHierarchy`] built from [`ClassStub`]s.
#[derive(Debug, Default)]
pub struct TableHierarchy {
    classes: HashMap<String, ClassStub>,
}

impl TableHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// A minimal runtime-library hierarchy for tests and embedder bootstrap.
    pub fn with_minimal_rt() -> Self {
        let mut table = Self::new();
        table.add(ClassStub::new("java.lang.Object"));
        table.add(ClassStub::new("java.lang.Cloneable"));
        table.add(ClassStub::new("java.io.Serializable"));
        table.add(
            ClassStub::new("java.lang.String")
                .extending("java.lang.Object")
                .implementing("java.io.Serializable"),
        );
        table.add(ClassStub::new("java.lang.Number").extending("java.lang.Object"));
        table.add(
            ClassStub::new("java.lang.Integer")
                .extending("java.lang.Number")
                .implementing("java.io.Serializable"),
        );
        table.add(ClassStub::new("java.lang.Class").extending("java.lang.Object"));
        table
    }

    /// Registers `stub`, replacing any previous entry with the same name.
    pub fn add(&mut self, stub: ClassStub) {
        self.classes.insert(stub.name.clone(), stub);
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassHierarchy for TableHierarchy {
    fn resolve(&self, name: &str) -> Option<&ClassStub> {
        self.classes.get(name)
    }
}

/// A [`ClassHierarchy`] that resolves nothing. Every declared bound demotes
/// to the universal filter against it.
#[derive(Debug, Default)]
pub struct EmptyHierarchy;

impl ClassHierarchy for EmptyHierarchy {
    fn resolve(&self, _name: &str) -> Option<&ClassStub> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> TableHierarchy {
        // Object <- A <- B, B implements I, I is an interface on its own.
        let mut table = TableHierarchy::new();
        table.add(ClassStub::new("Object"));
        table.add(ClassStub::new("I"));
        table.add(ClassStub::new("A").extending("Object"));
        table.add(ClassStub::new("B").extending("A").implementing("I"));
        table
    }

    #[test]
    fn walks_superclass_chain() {
        let table = diamond();
        assert!(table.is_subtype("B", "A"));
        assert!(table.is_subtype("B", "Object"));
        assert!(!table.is_subtype("A", "B"));
    }

    #[test]
    fn walks_interfaces() {
        let table = diamond();
        assert!(table.is_subtype("B", "I"));
        assert!(!table.is_subtype("A", "I"));
    }

    #[test]
    fn every_name_is_a_subtype_of_itself() {
        let table = diamond();
        assert!(table.is_subtype("B", "B"));
        assert!(table.is_subtype("unresolved.Class", "unresolved.Class"));
    }

    #[test]
    fn unresolved_names_have_no_supertypes() {
        let table = diamond();
        assert!(!table.is_subtype("unresolved.Class", "Object"));
    }

    #[test]
    fn tolerates_cyclic_hierarchies() {
        let mut table = TableHierarchy::new();
        table.add(ClassStub::new("A").extending("B"));
        table.add(ClassStub::new("B").extending("A"));
        assert!(table.is_subtype("A", "B"));
        assert!(!table.is_subtype("A", "C"));
    }

    #[test]
    fn stubs_round_trip_through_serde() {
        let stub = ClassStub::new("java.lang.String")
            .extending("java.lang.Object")
            .implementing("java.io.Serializable");
        let json = serde_json::to_string(&stub).unwrap();
        let back: ClassStub = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stub);
    }
}
