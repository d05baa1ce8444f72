//! Memoised subtype predicates shared across nodes with the same bound.

use std::collections::HashMap;

use tracing::warn;
use vela_core::TypeId;

use crate::diagnostics::Diagnostic;
use crate::hierarchy::ClassHierarchy;
use crate::registry::TypeRegistry;

/// Index of a cached filter in the graph's filter table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FilterId(pub(crate) usize);

/// "T is the bound class, one of its subclasses, or an implementor", with
/// per-type memoisation of the hierarchy oracle's answers.
#[derive(Debug)]
struct SupertypeFilter {
    ancestor: String,
    /// Set when the bound class cannot be resolved; the filter then accepts
    /// everything instead of failing the analysis.
    universal: bool,
    cache: HashMap<TypeId, bool>,
}

impl SupertypeFilter {
    fn admits(&mut self, ty: TypeId, registry: &TypeRegistry, hierarchy: &dyn ClassHierarchy) -> bool {
        if self.universal {
            return true;
        }
        if let Some(&cached) = self.cache.get(&ty) {
            return cached;
        }
        let admitted = hierarchy.is_subtype(registry.get(ty), &self.ancestor);
        self.cache.insert(ty, admitted);
        admitted
    }
}

/// Owns one [`SupertypeFilter`] per distinct bound class, so nodes and edges
/// declaring the same bound share a single memoisation table.
#[derive(Debug, Default)]
pub(crate) struct FilterTable {
    filters: Vec<SupertypeFilter>,
    by_class: HashMap<String, FilterId>,
}

impl FilterTable {
    /// Returns the filter for `class_name`, building it on first use.
    ///
    /// A bound class the hierarchy cannot resolve demotes to the universal
    /// filter and is reported through `diagnostics`.
    pub(crate) fn filter_for(
        &mut self,
        class_name: &str,
        hierarchy: &dyn ClassHierarchy,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> FilterId {
        if let Some(&id) = self.by_class.get(class_name) {
            return id;
        }

        let universal = hierarchy.resolve(class_name).is_none();
        if universal {
            warn!(class = class_name, "unresolved bound class, demoting to universal filter");
            diagnostics.push(Diagnostic::warning(
                "TYPEFLOW_UNRESOLVED_BOUND",
                format!("bound class `{class_name}` cannot be resolved; treating as unbounded"),
            ));
        }

        let id = FilterId(self.filters.len());
        self.filters.push(SupertypeFilter {
            ancestor: class_name.to_string(),
            universal,
            cache: HashMap::new(),
        });
        self.by_class.insert(class_name.to_string(), id);
        id
    }

    pub(crate) fn admits(
        &mut self,
        id: FilterId,
        ty: TypeId,
        registry: &TypeRegistry,
        hierarchy: &dyn ClassHierarchy,
    ) -> bool {
        self.filters[id.0].admits(ty, registry, hierarchy)
    }
}
