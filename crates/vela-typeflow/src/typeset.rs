//! Compact-then-dense sets of interned type indices.

use fixedbitset::FixedBitSet;
use smallvec::SmallVec;
use vela_core::TypeId;

/// Capacity of the small representation. Insertion past this point switches
/// the set to a bitset, one-way.
pub(crate) const SMALL_LIMIT: usize = 6;

/// A set of [`TypeId`]s.
///
/// Most nodes only ever see a handful of types, so the set starts as an
/// unsorted inline vector. Once it outgrows [`SMALL_LIMIT`] it becomes a
/// bitset over the type universe and never goes back.
#[derive(Debug, Clone)]
pub(crate) enum TypeSet {
    Small(SmallVec<[TypeId; SMALL_LIMIT]>),
    Dense(FixedBitSet),
}

impl Default for TypeSet {
    fn default() -> Self {
        TypeSet::Small(SmallVec::new())
    }
}

impl TypeSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains(&self, ty: TypeId) -> bool {
        match self {
            TypeSet::Small(items) => items.contains(&ty),
            TypeSet::Dense(bits) => bits.contains(ty.index()),
        }
    }

    /// Inserts `ty`, returning whether the set changed.
    ///
    /// `universe` is the current size of the type registry; the dense form is
    /// sized to twice that so later insertions rarely regrow it.
    pub(crate) fn insert(&mut self, ty: TypeId, universe: usize) -> bool {
        match self {
            TypeSet::Small(items) => {
                if items.contains(&ty) {
                    return false;
                }
                if items.len() < SMALL_LIMIT {
                    items.push(ty);
                    return true;
                }
                let mut bits = FixedBitSet::with_capacity((universe * 2).max(ty.index() + 1));
                for existing in items.iter() {
                    grow_and_set(&mut bits, existing.index());
                }
                grow_and_set(&mut bits, ty.index());
                *self = TypeSet::Dense(bits);
                true
            }
            TypeSet::Dense(bits) => {
                if bits.contains(ty.index()) {
                    return false;
                }
                grow_and_set(bits, ty.index());
                true
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            TypeSet::Small(items) => items.len(),
            TypeSet::Dense(bits) => bits.count_ones(..),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            TypeSet::Small(items) => items.is_empty(),
            TypeSet::Dense(bits) => bits.count_ones(..) == 0,
        }
    }

    /// Enumerates the set: insertion order for the small form, ascending
    /// index for the dense form. Callers may only rely on each element
    /// appearing exactly once.
    pub(crate) fn iter(&self) -> TypeSetIter<'_> {
        match self {
            TypeSet::Small(items) => TypeSetIter::Small(items.iter()),
            TypeSet::Dense(bits) => TypeSetIter::Dense(bits.ones()),
        }
    }
}

fn grow_and_set(bits: &mut FixedBitSet, index: usize) {
    if index >= bits.len() {
        bits.grow(index + 1);
    }
    bits.insert(index);
}

pub(crate) enum TypeSetIter<'a> {
    Small(std::slice::Iter<'a, TypeId>),
    Dense(fixedbitset::Ones<'a>),
}

impl Iterator for TypeSetIter<'_> {
    type Item = TypeId;

    fn next(&mut self) -> Option<TypeId> {
        match self {
            TypeSetIter::Small(items) => items.next().copied(),
            TypeSetIter::Dense(ones) => ones.next().map(|index| TypeId::from_raw(index as u32)),
        }
    }
}
