//! The contracts concrete entity types implement.
//!
//! Every domain object in the graph (a combat unit, an ability, a UI view
//! model) is a Rust type implementing [`EntityType`]. Lifecycle hooks are
//! separate traits; a type opts into a hook by implementing the trait *and*
//! declaring it in [`EntityType::describe`], so the graph knows which hooks
//! exist without inspecting the type at runtime.
//!
//! While a hook runs, the entity's own object is checked out of the world:
//! [`World::get`] on `me` returns `None` until the hook returns.
//!
//! # Examples
//!
//! ```rust
//! use engine_entity::{Awake, EntityRef, EntityType, TypeBuilder, World};
//!
//! trait Weapon {
//!     fn damage(&self) -> u32;
//! }
//!
//! #[derive(Default)]
//! struct Sword {
//!     sharpness: u32,
//! }
//!
//! impl Weapon for Sword {
//!     fn damage(&self) -> u32 {
//!         self.sharpness * 2
//!     }
//! }
//!
//! impl EntityType for Sword {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.capability::<dyn Weapon>(|s| s, |s| s);
//!     }
//! }
//!
//! impl Awake<(u32,)> for Sword {
//!     fn awake(&mut self, _world: &mut World, _me: EntityRef, (sharpness,): (u32,)) {
//!         self.sharpness = sharpness;
//!     }
//! }
//!
//! let mut world = World::new();
//! let root = world.root();
//! world.add_component_with::<Sword, _>(root, (4_u32,)).unwrap();
//! assert_eq!(world.component::<dyn Weapon>(root).map(|w| w.damage()), Some(8));
//! ```

use std::any::Any;

use crate::entity::EntityRef;
use crate::registry::TypeBuilder;
use crate::world::World;

/// A concrete entity type.
pub trait EntityType: Any + Default {
    /// Draw instances from the instance pool and return them on disposal.
    /// Suits short-lived types created at a high rate.
    const POOLED: bool = false;

    /// Declare capabilities and lifecycle hooks.
    fn describe(ty: &mut TypeBuilder<Self>) {
        let _ = ty;
    }

    /// Restore a disposed instance before it is pooled.
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Type-erased view of an entity's object.
pub trait Object: Any {
    /// Borrow as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as [`Any`] for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Run [`EntityType::reset`].
    fn reset_object(&mut self);
    /// Name of the concrete type.
    fn type_name(&self) -> &'static str;
}

impl<T: EntityType> Object for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn reset_object(&mut self) {
        self.reset();
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Argument packs accepted by [`Awake`]: tuples of zero to four values.
pub trait AwakeArgs: sealed::Sealed {}

macro_rules! awake_args {
    ($($name:ident),*) => {
        impl<$($name),*> sealed::Sealed for ($($name,)*) {}
        impl<$($name),*> AwakeArgs for ($($name,)*) {}
    };
}

awake_args!();
awake_args!(A);
awake_args!(A, B);
awake_args!(A, B, C);
awake_args!(A, B, C, D);

/// Setup run once when the entity joins the graph. The argument arity picks
/// which `Awake` implementation a factory call uses.
pub trait Awake<Args: AwakeArgs = ()>: EntityType {
    /// Initialise from `args`.
    fn awake(&mut self, world: &mut World, me: EntityRef, args: Args) {
        let _ = (world, me, args);
    }
}

/// Runs once, right after [`Awake`].
pub trait Start: EntityType {
    /// Called after awake.
    fn start(&mut self, world: &mut World, me: EntityRef);
}

/// Runs on every [`World::update`] while the entity is alive and enabled.
pub trait Update: EntityType {
    /// Called once per tick.
    fn update(&mut self, world: &mut World, me: EntityRef);
}

/// Runs during disposal, after the entity's components and children are
/// gone and before it is unlinked from its parent.
pub trait Destroy: EntityType {
    /// Called once on disposal.
    fn destroy(&mut self, world: &mut World, me: EntityRef);
}

/// Runs when the enabled flag flips.
pub trait Enable: EntityType {
    /// Called on a disabled-to-enabled transition.
    fn on_enable(&mut self, world: &mut World, me: EntityRef) {
        let _ = (world, me);
    }

    /// Called on an enabled-to-disabled transition.
    fn on_disable(&mut self, world: &mut World, me: EntityRef) {
        let _ = (world, me);
    }
}
