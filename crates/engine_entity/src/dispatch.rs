//! The lifecycle dispatcher seam.
//!
//! The graph announces every lifecycle transition to a [`Dispatcher`]: awake
//! and start after an entity is linked, destroy during disposal, enable on
//! flag flips, and update-registration changes. The dispatcher decides what
//! runs. The default methods run the per-type hooks directly; override them
//! to observe, defer or filter.
//!
//! Dispatcher methods take `&self` because hooks may re-enter the world
//! (an awake that adds components triggers nested awakes). Implementations
//! keep their own state behind cells and never hold a borrow across a call
//! back into the world.

use std::cell::RefCell;

use crate::entity::EntityRef;
use crate::object::{Awake, AwakeArgs};
use crate::world::World;

/// A pending awake call carrying the factory arguments.
pub struct AwakeCall<'a> {
    entity: EntityRef,
    run: Box<dyn FnOnce(&mut World) + 'a>,
}

impl<'a> AwakeCall<'a> {
    pub(crate) fn new<T, A>(entity: EntityRef, args: A) -> Self
    where
        T: Awake<A>,
        A: AwakeArgs + 'a,
    {
        Self {
            entity,
            run: Box::new(move |world: &mut World| {
                world.with_object(entity, move |object, world| {
                    if let Some(this) = object.as_any_mut().downcast_mut::<T>() {
                        <T as Awake<A>>::awake(this, world, entity, args);
                    }
                });
            }),
        }
    }

    /// The entity being awoken.
    #[must_use]
    pub fn entity(&self) -> EntityRef {
        self.entity
    }

    /// Run the type's awake hook.
    pub fn invoke(self, world: &mut World) {
        (self.run)(world);
    }
}

impl std::fmt::Debug for AwakeCall<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwakeCall")
            .field("entity", &self.entity)
            .finish_non_exhaustive()
    }
}

/// Receives lifecycle notifications from a [`World`].
pub trait Dispatcher {
    /// The entity was just linked into the graph.
    fn awake(&self, world: &mut World, call: AwakeCall<'_>) {
        call.invoke(world);
    }

    /// Awake finished; only sent for types declaring a start hook.
    fn start(&self, world: &mut World, entity: EntityRef) {
        world.run_start(entity);
    }

    /// The entity is being disposed; only sent for types declaring a destroy
    /// hook. Its components and children are already gone.
    fn destroy(&self, world: &mut World, entity: EntityRef) {
        world.run_destroy(entity);
    }

    /// The enabled flag flipped; only sent for types declaring an enable hook.
    fn enable(&self, world: &mut World, entity: EntityRef, enabled: bool) {
        world.run_enable(entity, enabled);
    }

    /// An entity of a type declaring an update hook entered (`true`) or left
    /// (`false`) the graph.
    fn register(&self, entity: EntityRef, registered: bool) {
        let _ = (entity, registered);
    }

    /// One tick of [`World::update`].
    fn update(&self, world: &mut World) {
        let _ = world;
    }
}

/// The default dispatcher: runs hooks immediately and keeps the list of
/// entities to update, in registration order.
#[derive(Debug, Default)]
pub struct HookDispatcher {
    updates: RefCell<Vec<EntityRef>>,
}

impl HookDispatcher {
    /// Create a dispatcher with an empty update list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities registered for updates.
    #[must_use]
    pub fn update_count(&self) -> usize {
        self.updates.borrow().len()
    }
}

impl Dispatcher for HookDispatcher {
    fn register(&self, entity: EntityRef, registered: bool) {
        let mut updates = self.updates.borrow_mut();
        if registered {
            updates.push(entity);
        } else {
            updates.retain(|&e| e != entity);
        }
    }

    fn update(&self, world: &mut World) {
        let mut batch = world.acquire_list();
        batch.extend(self.updates.borrow().iter().copied());
        for &entity in &batch {
            if world.is_alive(entity) && world.is_enabled(entity) {
                world.run_update(entity);
            }
        }
        world.release_list(batch);
    }
}
