//! Per-type metadata: declared hooks and capability casts.
//!
//! The registry records, for every concrete [`EntityType`] that has been
//! instantiated in a world, which lifecycle hooks it declared and which
//! capabilities (traits or types) it can be viewed as. Capability lookup is a
//! table of cast functions filled in by [`EntityType::describe`]; there is no
//! runtime reflection.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;

use bitflags::bitflags;

use crate::entity::EntityRef;
use crate::object::{Destroy, Enable, EntityType, Object, Start, Update};
use crate::world::World;

bitflags! {
    /// Lifecycle hooks a type declares.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Hooks: u8 {
        /// [`Start`] runs after awake.
        const START = 1 << 0;
        /// [`Update`] runs every tick; the dispatcher is told about registration.
        const UPDATE = 1 << 1;
        /// [`Destroy`] runs on disposal.
        const DESTROY = 1 << 2;
        /// [`Enable`] runs when the enabled flag flips.
        const ENABLE = 1 << 3;
    }
}

pub(crate) type HookFn = fn(&mut dyn Object, &mut World, EntityRef);
pub(crate) type EnableFn = fn(&mut dyn Object, &mut World, EntityRef, bool);

/// Views an object of some concrete type as `C`.
struct Caster<C: ?Sized + 'static> {
    get: Box<dyn Fn(&dyn Any) -> Option<&C>>,
    get_mut: Box<dyn Fn(&mut dyn Any) -> Option<&mut C>>,
}

impl<C: ?Sized + 'static> Caster<C> {
    fn new<F, G>(get: F, get_mut: G) -> Self
    where
        F: Fn(&dyn Any) -> Option<&C> + 'static,
        G: Fn(&mut dyn Any) -> Option<&mut C> + 'static,
    {
        Self {
            get: Box::new(get),
            get_mut: Box::new(get_mut),
        }
    }
}

/// Everything the graph knows about one concrete type.
pub struct TypeInfo {
    name: &'static str,
    pooled: bool,
    hooks: Hooks,
    start: Option<HookFn>,
    update: Option<HookFn>,
    destroy: Option<HookFn>,
    enable: Option<EnableFn>,
    /// Keyed by capability type; values are `Caster<C>`.
    casts: HashMap<TypeId, Box<dyn Any>>,
}

impl TypeInfo {
    fn of<T: EntityType>() -> Self {
        let mut builder = TypeBuilder::<T> {
            info: TypeInfo {
                name: std::any::type_name::<T>(),
                pooled: T::POOLED,
                hooks: Hooks::empty(),
                start: None,
                update: None,
                destroy: None,
                enable: None,
                casts: HashMap::new(),
            },
            _marker: PhantomData,
        };
        builder.capability::<T>(identity, identity_mut);
        T::describe(&mut builder);
        builder.info
    }

    /// Name of the concrete type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether instances are pooled.
    #[must_use]
    pub fn pooled(&self) -> bool {
        self.pooled
    }

    /// The declared hooks.
    #[must_use]
    pub fn hooks(&self) -> Hooks {
        self.hooks
    }

    /// Returns `true` if objects of this type can be viewed as `C`.
    #[must_use]
    pub fn has_capability<C: ?Sized + 'static>(&self) -> bool {
        self.casts.contains_key(&TypeId::of::<C>())
    }

    pub(crate) fn cast<'a, C: ?Sized + 'static>(&self, object: &'a dyn Any) -> Option<&'a C> {
        let caster = self.casts.get(&TypeId::of::<C>())?.downcast_ref::<Caster<C>>()?;
        (caster.get)(object)
    }

    pub(crate) fn cast_mut<'a, C: ?Sized + 'static>(
        &self,
        object: &'a mut dyn Any,
    ) -> Option<&'a mut C> {
        let caster = self.casts.get(&TypeId::of::<C>())?.downcast_ref::<Caster<C>>()?;
        (caster.get_mut)(object)
    }

    pub(crate) fn start_hook(&self) -> Option<HookFn> {
        self.start
    }

    pub(crate) fn update_hook(&self) -> Option<HookFn> {
        self.update
    }

    pub(crate) fn destroy_hook(&self) -> Option<HookFn> {
        self.destroy
    }

    pub(crate) fn enable_hook(&self) -> Option<EnableFn> {
        self.enable
    }
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("pooled", &self.pooled)
            .field("hooks", &self.hooks)
            .field("capabilities", &self.casts.len())
            .finish()
    }
}

/// Collects the hooks and capabilities of `T` inside
/// [`EntityType::describe`].
pub struct TypeBuilder<T> {
    info: TypeInfo,
    _marker: PhantomData<fn() -> T>,
}

impl<T: EntityType> TypeBuilder<T> {
    /// Make `T` discoverable as `C` through the covariant component lookups.
    ///
    /// For a trait object the casts are usually just `|t| t`.
    pub fn capability<C: ?Sized + 'static>(
        &mut self,
        cast: fn(&T) -> &C,
        cast_mut: fn(&mut T) -> &mut C,
    ) -> &mut Self {
        let caster = Caster::<C>::new(
            move |any| any.downcast_ref::<T>().map(cast),
            move |any| any.downcast_mut::<T>().map(cast_mut),
        );
        self.info.casts.insert(TypeId::of::<C>(), Box::new(caster));
        self
    }

    /// Declare a [`Start`] hook.
    pub fn start(&mut self) -> &mut Self
    where
        T: Start,
    {
        self.info.hooks |= Hooks::START;
        self.info.start = Some(start_hook::<T>);
        self
    }

    /// Declare an [`Update`] hook.
    pub fn update(&mut self) -> &mut Self
    where
        T: Update,
    {
        self.info.hooks |= Hooks::UPDATE;
        self.info.update = Some(update_hook::<T>);
        self
    }

    /// Declare a [`Destroy`] hook.
    pub fn destroy(&mut self) -> &mut Self
    where
        T: Destroy,
    {
        self.info.hooks |= Hooks::DESTROY;
        self.info.destroy = Some(destroy_hook::<T>);
        self
    }

    /// Declare an [`Enable`] hook.
    pub fn enable(&mut self) -> &mut Self
    where
        T: Enable,
    {
        self.info.hooks |= Hooks::ENABLE;
        self.info.enable = Some(enable_hook::<T>);
        self
    }
}

fn identity<T>(value: &T) -> &T {
    value
}

fn identity_mut<T>(value: &mut T) -> &mut T {
    value
}

fn start_hook<T: Start>(object: &mut dyn Object, world: &mut World, me: EntityRef) {
    if let Some(this) = object.as_any_mut().downcast_mut::<T>() {
        this.start(world, me);
    }
}

fn update_hook<T: Update>(object: &mut dyn Object, world: &mut World, me: EntityRef) {
    if let Some(this) = object.as_any_mut().downcast_mut::<T>() {
        this.update(world, me);
    }
}

fn destroy_hook<T: Destroy>(object: &mut dyn Object, world: &mut World, me: EntityRef) {
    if let Some(this) = object.as_any_mut().downcast_mut::<T>() {
        this.destroy(world, me);
    }
}

fn enable_hook<T: Enable>(object: &mut dyn Object, world: &mut World, me: EntityRef, on: bool) {
    if let Some(this) = object.as_any_mut().downcast_mut::<T>() {
        if on {
            this.on_enable(world, me);
        } else {
            this.on_disable(world, me);
        }
    }
}

/// Metadata for every concrete type seen by a world.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeId, TypeInfo>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Record `T`, running its [`EntityType::describe`] the first time.
    pub fn register<T: EntityType>(&mut self) -> &TypeInfo {
        self.types
            .entry(TypeId::of::<T>())
            .or_insert_with(TypeInfo::of::<T>)
    }

    /// Metadata for the concrete type `kind`.
    #[must_use]
    pub fn get(&self, kind: TypeId) -> Option<&TypeInfo> {
        self.types.get(&kind)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
