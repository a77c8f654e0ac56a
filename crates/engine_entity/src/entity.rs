//! Entity handles, status flags and relations.
//!
//! An [`EntityRef`] is a lightweight handle into a [`World`](crate::World).
//! It goes stale when the entity is disposed: every query through it then
//! reports "not alive" and an id of `0`.

use bitflags::bitflags;
use engine_pool::SlotHandle;
use serde::{Deserialize, Serialize};

/// Handle to an entity in a [`World`](crate::World).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef(pub(crate) SlotHandle);

impl EntityRef {
    /// The underlying slot handle.
    #[must_use]
    pub const fn handle(self) -> SlotHandle {
        self.0
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

bitflags! {
    /// Independent state flags of an entity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        /// The instance is drawn from and returned to the instance pool.
        const FROM_POOL = 1 << 0;
        /// The entity is linked into the graph.
        const REGISTERED = 1 << 1;
        /// The entity is attached as a component rather than a child.
        const COMPONENT = 1 << 2;
        /// Set at creation, cleared once the start hook has run.
        const NEW = 1 << 3;
    }
}

/// How an entity hangs off its owner.
///
/// A single enum makes "child and component at once" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Listed in the owner's children, keyed by id.
    Child(EntityRef),
    /// Listed in the owner's components, keyed by concrete type.
    Component(EntityRef),
}

impl Relation {
    /// The entity on the other end of the relation.
    #[must_use]
    pub const fn owner(self) -> EntityRef {
        match self {
            Self::Child(owner) | Self::Component(owner) => owner,
        }
    }

    /// Returns `true` for [`Relation::Component`].
    #[must_use]
    pub const fn is_component(self) -> bool {
        matches!(self, Self::Component(_))
    }
}
