//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// An entity owned by exactly one seller.
///
/// Ownership is fixed at creation; the authorization guard compares the owner
/// against the caller before any read or mutation.
pub trait Owned: Entity {
    fn owner(&self) -> crate::SellerId;
}
