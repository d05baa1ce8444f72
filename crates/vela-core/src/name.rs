//! Shared name types.

use smol_str::SmolStr;

/// A lightweight owned name.
///
/// This is backed by [`smol_str::SmolStr`], which stores short strings inline
/// and avoids heap allocation in many common cases.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Name(SmolStr);

impl Name {
    #[inline]
    pub fn new(text: impl Into<SmolStr>) -> Self {
        Self(text.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Name").field(&self.0.as_str()).finish()
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A reference to a method: owning class, method name, and raw descriptor.
///
/// Used as bookkeeping on analysis artifacts so diagnostics can say which
/// method a value slot belongs to. Comparison is purely structural.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub owner: Name,
    pub name: Name,
    /// Method descriptor, e.g. `(II)Ljava/lang/String;`.
    pub descriptor: Name,
}

impl MethodRef {
    pub fn new(
        owner: impl Into<Name>,
        name: impl Into<Name>,
        descriptor: impl Into<Name>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

impl std::fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MethodRef({self})")
    }
}

impl std::fmt::Display for MethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}{}", self.owner, self.name, self.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_ref_display_uses_java_conventions() {
        let m = MethodRef::new("java.lang.String", "substring", "(II)Ljava/lang/String;");
        assert_eq!(m.to_string(), "java.lang.String.substring(II)Ljava/lang/String;");
    }
}
