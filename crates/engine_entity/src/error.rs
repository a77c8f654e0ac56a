//! Entity graph error types.

use engine_id::IdError;

use crate::entity::EntityRef;

/// Errors returned by graph operations. All of them indicate a caller bug;
/// none are retried internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The entity was already disposed.
    #[error("{0} is disposed")]
    Disposed(EntityRef),

    /// An entity was asked to own itself.
    #[error("{0} cannot be its own parent")]
    SelfParent(EntityRef),

    /// The owner already holds a component of this concrete type.
    #[error("{owner} already has a `{component}` component")]
    DuplicateComponent {
        /// The would-be owner.
        owner: EntityRef,
        /// Name of the component type.
        component: &'static str,
    },

    /// The owner already holds a child with this id.
    #[error("{owner} already has a child with id {id}")]
    DuplicateChild {
        /// The would-be parent.
        owner: EntityRef,
        /// The clashing id.
        id: u64,
    },

    /// Id `0` marks disposed entities and cannot be assigned.
    #[error("id 0 is reserved for disposed entities")]
    ReservedId,

    /// Components stay with the owner they were created on.
    #[error("{0} is a component and cannot change owner")]
    ComponentCannotMove(EntityRef),

    /// The new parent lies inside the child's own subtree.
    #[error("moving {child} under {parent} would create a cycle")]
    WouldCycle {
        /// The entity being moved.
        child: EntityRef,
        /// The requested parent.
        parent: EntityRef,
    },

    /// Minting an id failed.
    #[error(transparent)]
    Id(#[from] IdError),
}
