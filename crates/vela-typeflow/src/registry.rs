//! Interning of type names into dense indices.

use lasso::{Key, Rodeo, Spur};
use vela_core::TypeId;

/// Interns type names into dense, stable [`TypeId`]s.
///
/// Indices are contiguous from zero, assigned in interning order, and only
/// grow during an analysis run. `intern` is idempotent: the same name always
/// resolves to the same index.
#[derive(Default)]
pub struct TypeRegistry {
    rodeo: Rodeo,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> TypeId {
        spur_to_id(self.rodeo.get_or_intern(name))
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.rodeo.get(name).map(spur_to_id)
    }

    pub fn get(&self, id: TypeId) -> &str {
        self.rodeo.resolve(&id_to_spur(id))
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &str)> {
        self.rodeo.iter().map(|(spur, name)| (spur_to_id(spur), name))
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

fn spur_to_id(spur: Spur) -> TypeId {
    TypeId::from_raw(spur.into_usize() as u32)
}

fn id_to_spur(id: TypeId) -> Spur {
    Spur::try_from_usize(id.index()).expect("TypeId out of interner range")
}
