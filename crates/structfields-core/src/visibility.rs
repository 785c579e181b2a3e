//! Which identifiers count as externally visible.

/// Decides whether a field name is part of a struct's public surface.
pub trait Visibility: Send + Sync {
    fn is_exported(&self, name: &str) -> bool;
}

/// Go's rule: exported iff the first character is an upper-case letter.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoExported;

impl Visibility for GoExported {
    fn is_exported(&self, name: &str) -> bool {
        name.chars().next().is_some_and(char::is_uppercase)
    }
}

/// Every identifier is visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllVisible;

impl Visibility for AllVisible {
    fn is_exported(&self, _name: &str) -> bool {
        true
    }
}

impl<F> Visibility for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_exported(&self, name: &str) -> bool {
        self(name)
    }
}
