//! The entity graph.
//!
//! A [`World`] owns every entity, the identifier allocators that name them,
//! and the pools their storage is recycled through. Entities form a forest
//! under the world's [`Scene`] root: each non-root entity is either a child
//! of its owner (keyed by id) or a component of it (keyed by concrete type,
//! at most one per type).
//!
//! The world is single-threaded; hooks run synchronously inside the call
//! that triggered them.

use std::any::TypeId;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use engine_id::{Clock, IdGenerators, SystemClock};
use engine_pool::{KeyedPool, Pools, SlotPool};
use tracing::trace;

use crate::config::WorldConfig;
use crate::dispatch::{AwakeCall, Dispatcher, HookDispatcher};
use crate::entity::{EntityRef, Relation, Status};
use crate::error::GraphError;
use crate::object::{Awake, AwakeArgs, EntityType, Object};
use crate::registry::{Hooks, TypeInfo, TypeRegistry};

/// Clock shared by a world's identifier allocators.
pub type WorldClock = Rc<dyn Clock>;

type ChildMap = HashMap<u64, EntityRef>;
type ComponentMap = HashMap<TypeId, EntityRef>;

/// Storage for one entity.
pub(crate) struct Node {
    /// General id; `0` once disposal has begun.
    pub(crate) id: u64,
    pub(crate) instance_id: u64,
    pub(crate) kind: TypeId,
    pub(crate) status: Status,
    pub(crate) relation: Option<Relation>,
    pub(crate) enabled: bool,
    /// Lazily taken from the pools; handed back when emptied.
    pub(crate) children: Option<ChildMap>,
    pub(crate) components: Option<ComponentMap>,
    /// `None` while one of the entity's hooks is running.
    pub(crate) object: Option<Box<dyn Object>>,
}

/// The root entity every world starts with.
#[derive(Debug, Default)]
pub struct Scene;

impl EntityType for Scene {}

#[derive(Clone, Copy)]
enum Link {
    Child(Option<u64>),
    Component,
}

/// The entity ownership graph.
pub struct World {
    pub(crate) nodes: SlotPool<Node>,
    pub(crate) registry: TypeRegistry,
    pub(crate) pools: Pools,
    pub(crate) instances: KeyedPool<TypeId, Box<dyn Object>>,
    pub(crate) dispatcher: Rc<dyn Dispatcher>,
    /// Destroy hooks requested while the entity's own hook held its object.
    pending_destroy: Vec<EntityRef>,
    ids: IdGenerators<WorldClock>,
    config: WorldConfig,
    root: EntityRef,
}

impl World {
    /// Create a world with default configuration on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world on the system clock.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self::with_clock(config, Rc::new(SystemClock))
    }

    /// Create a world whose identifiers read `clock`.
    #[must_use]
    pub fn with_clock(config: WorldConfig, clock: WorldClock) -> Self {
        let mut ids = IdGenerators::with_clock(clock);
        let mut registry = TypeRegistry::new();
        registry.register::<Scene>();

        let mut nodes = SlotPool::new();
        let root = EntityRef(nodes.insert(Node {
            id: ids.general.generate(),
            instance_id: ids.instance.generate(),
            kind: TypeId::of::<Scene>(),
            status: Status::REGISTERED,
            relation: None,
            enabled: true,
            children: None,
            components: None,
            object: Some(Box::new(Scene)),
        }));

        Self {
            nodes,
            registry,
            pools: Pools::new(config.pool),
            instances: KeyedPool::new(config.pool),
            dispatcher: Rc::new(HookDispatcher::new()),
            pending_destroy: Vec::new(),
            ids,
            config,
            root,
        }
    }

    /// Replace the lifecycle dispatcher. Update registrations made through
    /// the previous dispatcher are not carried over.
    pub fn set_dispatcher(&mut self, dispatcher: Rc<dyn Dispatcher>) {
        self.dispatcher = dispatcher;
    }

    /// The current lifecycle dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> Rc<dyn Dispatcher> {
        Rc::clone(&self.dispatcher)
    }

    /// The scene root.
    #[must_use]
    pub fn root(&self) -> EntityRef {
        self.root
    }

    /// The configuration this world was built with.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The identifier allocators. Ids passed to
    /// [`World::add_child_with_id`] must be minted here.
    pub fn ids_mut(&mut self) -> &mut IdGenerators<WorldClock> {
        &mut self.ids
    }

    /// Metadata of every type instantiated so far.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The collection pools.
    #[must_use]
    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    /// How many disposed `T` instances are waiting for reuse.
    #[must_use]
    pub fn pooled_instances<T: EntityType>(&self) -> usize {
        self.instances.retained(&TypeId::of::<T>())
    }

    // ------------------------------------------------------------------
    // Factories
    // ------------------------------------------------------------------

    /// Create a `T` as a child of `owner` with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Disposed`] if `owner` is not alive.
    pub fn add_child<T: Awake>(&mut self, owner: EntityRef) -> Result<EntityRef, GraphError> {
        self.create::<T, ()>(owner, Link::Child(None), ())
    }

    /// Create a `T` as a child of `owner`, awoken with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Disposed`] if `owner` is not alive.
    pub fn add_child_with<T, A>(
        &mut self,
        owner: EntityRef,
        args: A,
    ) -> Result<EntityRef, GraphError>
    where
        T: Awake<A>,
        A: AwakeArgs,
    {
        self.create::<T, A>(owner, Link::Child(None), args)
    }

    /// Create a `T` as a child of `owner` under a caller-minted `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Disposed`] if `owner` is not alive,
    /// [`GraphError::ReservedId`] for id `0`, and
    /// [`GraphError::DuplicateChild`] if `owner` already has a child `id`.
    pub fn add_child_with_id<T, A>(
        &mut self,
        owner: EntityRef,
        id: u64,
        args: A,
    ) -> Result<EntityRef, GraphError>
    where
        T: Awake<A>,
        A: AwakeArgs,
    {
        self.create::<T, A>(owner, Link::Child(Some(id)), args)
    }

    /// Create a `T` as a child of `owner`, named by a unit id in this world's
    /// zone.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Id`] if the configured zone is out of range,
    /// otherwise as [`World::add_child_with_id`].
    pub fn add_unit<T, A>(&mut self, owner: EntityRef, args: A) -> Result<EntityRef, GraphError>
    where
        T: Awake<A>,
        A: AwakeArgs,
    {
        let id = self.ids.unit.generate(self.config.zone)?;
        self.add_child_with_id::<T, A>(owner, id, args)
    }

    /// Attach a `T` component to `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Disposed`] if `owner` is not alive and
    /// [`GraphError::DuplicateComponent`] if it already has a `T`.
    pub fn add_component<T: Awake>(&mut self, owner: EntityRef) -> Result<EntityRef, GraphError> {
        self.create::<T, ()>(owner, Link::Component, ())
    }

    /// Attach a `T` component to `owner`, awoken with `args`.
    ///
    /// # Errors
    ///
    /// As [`World::add_component`].
    pub fn add_component_with<T, A>(
        &mut self,
        owner: EntityRef,
        args: A,
    ) -> Result<EntityRef, GraphError>
    where
        T: Awake<A>,
        A: AwakeArgs,
    {
        self.create::<T, A>(owner, Link::Component, args)
    }

    fn create<T, A>(
        &mut self,
        owner: EntityRef,
        link: Link,
        args: A,
    ) -> Result<EntityRef, GraphError>
    where
        T: Awake<A>,
        A: AwakeArgs,
    {
        let kind = TypeId::of::<T>();
        let owner_node = self.live_node(owner).ok_or(GraphError::Disposed(owner))?;
        match link {
            Link::Component if has_key(&owner_node.components, &kind) => {
                return Err(GraphError::DuplicateComponent {
                    owner,
                    component: std::any::type_name::<T>(),
                });
            }
            Link::Child(Some(0)) => return Err(GraphError::ReservedId),
            Link::Child(Some(id)) if has_key(&owner_node.children, &id) => {
                return Err(GraphError::DuplicateChild { owner, id });
            }
            _ => {}
        }

        let hooks = self.registry.register::<T>().hooks();
        let (object, mut status) = self.instantiate::<T>();
        let (id, relation) = match link {
            Link::Child(Some(id)) => (id, Relation::Child(owner)),
            Link::Child(None) => (self.ids.general.generate(), Relation::Child(owner)),
            Link::Component => {
                status |= Status::COMPONENT;
                (self.ids.general.generate(), Relation::Component(owner))
            }
        };

        let entity = EntityRef(self.nodes.insert(Node {
            id,
            instance_id: self.ids.instance.generate(),
            kind,
            status: status | Status::NEW | Status::REGISTERED,
            relation: Some(relation),
            enabled: true,
            children: None,
            components: None,
            object: Some(object),
        }));
        self.link(relation, entity, id, kind);
        trace!(%entity, id, kind = std::any::type_name::<T>(), "entity created");

        let dispatcher = Rc::clone(&self.dispatcher);
        if hooks.contains(Hooks::UPDATE) {
            dispatcher.register(entity, true);
        }
        dispatcher.awake(self, AwakeCall::new::<T, A>(entity, args));
        if hooks.contains(Hooks::START) && self.is_alive(entity) {
            dispatcher.start(self, entity);
        }
        if let Some(node) = self.live_node_mut(entity) {
            node.status.remove(Status::NEW);
        }
        Ok(entity)
    }

    fn instantiate<T: EntityType>(&mut self) -> (Box<dyn Object>, Status) {
        if !T::POOLED {
            return (Box::new(T::default()) as Box<dyn Object>, Status::empty());
        }
        let object = self
            .instances
            .acquire(&TypeId::of::<T>())
            .unwrap_or_else(|| Box::new(T::default()) as Box<dyn Object>);
        (object, Status::FROM_POOL)
    }

    /// Reset a disposed object and keep it for the next factory call.
    pub(crate) fn recycle(&mut self, kind: TypeId, mut object: Box<dyn Object>) {
        object.reset_object();
        if !self.instances.release(kind, object) {
            trace!(kind = ?kind, "instance pool full, dropping object");
        }
    }

    /// Record `entity` in its owner's children or components.
    pub(crate) fn link(&mut self, relation: Relation, entity: EntityRef, id: u64, kind: TypeId) {
        let pools = &mut self.pools;
        let Some(owner) = self.nodes.get_mut(relation.owner().0) else {
            return;
        };
        match relation {
            Relation::Child(_) => {
                owner
                    .children
                    .get_or_insert_with(|| pools.acquire())
                    .insert(id, entity);
            }
            Relation::Component(_) => {
                owner
                    .components
                    .get_or_insert_with(|| pools.acquire())
                    .insert(kind, entity);
            }
        }
    }

    /// Drop `entity` from its owner's children or components.
    pub(crate) fn unlink(&mut self, relation: Relation, entity: EntityRef, id: u64, kind: TypeId) {
        let pools = &mut self.pools;
        let Some(owner) = self.nodes.get_mut(relation.owner().0) else {
            return;
        };
        match relation {
            Relation::Child(_) => remove_entry(&mut owner.children, &id, entity, pools),
            Relation::Component(_) => remove_entry(&mut owner.components, &kind, entity, pools),
        }
    }

    // ------------------------------------------------------------------
    // Hooks
    // ------------------------------------------------------------------

    /// Check the entity's object out of the world, run `f` on it, and put it
    /// back. Returns `None` if the entity is gone or its object is already
    /// checked out by a running hook.
    pub fn with_object<R>(
        &mut self,
        entity: EntityRef,
        f: impl FnOnce(&mut dyn Object, &mut World) -> R,
    ) -> Option<R> {
        let node = self.nodes.get_mut(entity.0)?;
        let kind = node.kind;
        let mut object = node.object.take()?;
        let result = f(object.as_mut(), self);
        match self.nodes.get_mut(entity.0) {
            Some(node) => node.object = Some(object),
            // Disposed by its own hook.
            None => {
                if let Some(at) = self.pending_destroy.iter().position(|&e| e == entity) {
                    self.pending_destroy.swap_remove(at);
                    if let Some(hook) = self.registry.get(kind).and_then(TypeInfo::destroy_hook) {
                        hook(object.as_mut(), self, entity);
                    }
                }
                if self.registry.get(kind).is_some_and(TypeInfo::pooled) {
                    self.recycle(kind, object);
                }
            }
        }
        Some(result)
    }

    fn info_of(&self, entity: EntityRef) -> Option<&TypeInfo> {
        self.registry.get(self.nodes.get(entity.0)?.kind)
    }

    /// Run the entity's [`Start`](crate::Start) hook, if declared.
    pub fn run_start(&mut self, entity: EntityRef) {
        if let Some(hook) = self.info_of(entity).and_then(TypeInfo::start_hook) {
            self.with_object(entity, |object, world| hook(object, world, entity));
        }
    }

    /// Run the entity's [`Update`](crate::Update) hook, if declared.
    pub fn run_update(&mut self, entity: EntityRef) {
        if let Some(hook) = self.info_of(entity).and_then(TypeInfo::update_hook) {
            self.with_object(entity, |object, world| hook(object, world, entity));
        }
    }

    /// Run the entity's [`Destroy`](crate::Destroy) hook, if declared.
    ///
    /// If one of the entity's own hooks is running, the destroy hook runs
    /// as soon as that hook returns.
    pub fn run_destroy(&mut self, entity: EntityRef) {
        let Some(hook) = self.info_of(entity).and_then(TypeInfo::destroy_hook) else {
            return;
        };
        let ran = self.with_object(entity, |object, world| hook(object, world, entity));
        let checked_out = self
            .nodes
            .get(entity.0)
            .is_some_and(|node| node.object.is_none());
        if ran.is_none() && checked_out && !self.pending_destroy.contains(&entity) {
            self.pending_destroy.push(entity);
        }
    }

    /// Run the entity's [`Enable`](crate::Enable) hook, if declared.
    pub fn run_enable(&mut self, entity: EntityRef, enabled: bool) {
        if let Some(hook) = self.info_of(entity).and_then(TypeInfo::enable_hook) {
            self.with_object(entity, |object, world| hook(object, world, entity, enabled));
        }
    }

    /// Run one tick through the dispatcher.
    pub fn update(&mut self) {
        let dispatcher = Rc::clone(&self.dispatcher);
        dispatcher.update(self);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub(crate) fn live_node(&self, entity: EntityRef) -> Option<&Node> {
        self.nodes.get(entity.0).filter(|node| node.id != 0)
    }

    pub(crate) fn live_node_mut(&mut self, entity: EntityRef) -> Option<&mut Node> {
        self.nodes.get_mut(entity.0).filter(|node| node.id != 0)
    }

    /// Returns `true` if the entity exists and has not started disposal.
    #[must_use]
    pub fn is_alive(&self, entity: EntityRef) -> bool {
        self.live_node(entity).is_some()
    }

    /// The entity's id, or `0` if it is disposed.
    #[must_use]
    pub fn id(&self, entity: EntityRef) -> u64 {
        self.nodes.get(entity.0).map_or(0, |node| node.id)
    }

    /// The entity's instance id, or `0` if it is disposed.
    #[must_use]
    pub fn instance_id(&self, entity: EntityRef) -> u64 {
        self.live_node(entity).map_or(0, |node| node.instance_id)
    }

    /// The entity's status flags; empty once disposed.
    #[must_use]
    pub fn status(&self, entity: EntityRef) -> Status {
        self.nodes
            .get(entity.0)
            .map_or(Status::empty(), |node| node.status)
    }

    /// Whether the entity is enabled. Disposed entities report `false`.
    #[must_use]
    pub fn is_enabled(&self, entity: EntityRef) -> bool {
        self.live_node(entity).is_some_and(|node| node.enabled)
    }

    /// How the entity hangs off its owner; `None` for the root or once
    /// disposed.
    #[must_use]
    pub fn relation(&self, entity: EntityRef) -> Option<Relation> {
        self.nodes.get(entity.0)?.relation
    }

    /// The entity's owner, whether it is a child or a component.
    #[must_use]
    pub fn parent(&self, entity: EntityRef) -> Option<EntityRef> {
        self.relation(entity).map(Relation::owner)
    }

    /// Name of the entity's concrete type.
    #[must_use]
    pub fn type_name(&self, entity: EntityRef) -> Option<&'static str> {
        self.info_of(entity).map(TypeInfo::name)
    }

    /// Number of entities in the world, the root included.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.nodes.len()
    }

    /// The child of `owner` with id `id`.
    #[must_use]
    pub fn child(&self, owner: EntityRef, id: u64) -> Option<EntityRef> {
        self.live_node(owner)?.children.as_ref()?.get(&id).copied()
    }

    /// Iterate over the children of `owner`, in no particular order.
    pub fn children(&self, owner: EntityRef) -> impl Iterator<Item = EntityRef> + '_ {
        self.live_node(owner)
            .and_then(|node| node.children.as_ref())
            .into_iter()
            .flat_map(|children| children.values().copied())
    }

    /// Iterate over the components of `owner`, in no particular order.
    pub fn components(&self, owner: EntityRef) -> impl Iterator<Item = EntityRef> + '_ {
        self.live_node(owner)
            .and_then(|node| node.components.as_ref())
            .into_iter()
            .flat_map(|components| components.values().copied())
    }

    /// Number of children of `owner`.
    #[must_use]
    pub fn child_count(&self, owner: EntityRef) -> usize {
        self.live_node(owner)
            .and_then(|node| node.children.as_ref())
            .map_or(0, |map| map.len())
    }

    /// Number of components of `owner`.
    #[must_use]
    pub fn component_count(&self, owner: EntityRef) -> usize {
        self.live_node(owner)
            .and_then(|node| node.components.as_ref())
            .map_or(0, |map| map.len())
    }

    /// The entity's object viewed as `C`: its own concrete type or any
    /// capability the type declared.
    #[must_use]
    pub fn get<C: ?Sized + 'static>(&self, entity: EntityRef) -> Option<&C> {
        let node = self.nodes.get(entity.0)?;
        let info = self.registry.get(node.kind)?;
        info.cast::<C>(node.object.as_deref()?.as_any())
    }

    /// Mutable counterpart of [`World::get`].
    #[must_use]
    pub fn get_mut<C: ?Sized + 'static>(&mut self, entity: EntityRef) -> Option<&mut C> {
        let node = self.nodes.get_mut(entity.0)?;
        let info = self.registry.get(node.kind)?;
        info.cast_mut::<C>(node.object.as_deref_mut()?.as_any_mut())
    }

    fn has_capability<C: ?Sized + 'static>(&self, entity: EntityRef) -> bool {
        self.info_of(entity)
            .is_some_and(|info| info.has_capability::<C>())
    }

    /// The first component of `owner` that can be viewed as `C`.
    #[must_use]
    pub fn get_component<C: ?Sized + 'static>(&self, owner: EntityRef) -> Option<EntityRef> {
        self.components(owner)
            .find(|&component| self.has_capability::<C>(component))
    }

    /// Every component of `owner` that can be viewed as `C`, in a pooled
    /// list. Hand the list back with [`World::release_list`].
    pub fn get_components<C: ?Sized + 'static>(&mut self, owner: EntityRef) -> Vec<EntityRef> {
        let mut found = self.acquire_list();
        found.extend(
            self.components(owner)
                .filter(|&component| self.has_capability::<C>(component)),
        );
        found
    }

    /// Shorthand for [`World::get_component`] followed by [`World::get`].
    #[must_use]
    pub fn component<C: ?Sized + 'static>(&self, owner: EntityRef) -> Option<&C> {
        self.get(self.get_component::<C>(owner)?)
    }

    /// Shorthand for [`World::get_component`] followed by [`World::get_mut`].
    #[must_use]
    pub fn component_mut<C: ?Sized + 'static>(&mut self, owner: EntityRef) -> Option<&mut C> {
        let component = self.get_component::<C>(owner)?;
        self.get_mut(component)
    }

    /// Take an empty entity list from the pools.
    pub fn acquire_list(&mut self) -> Vec<EntityRef> {
        self.pools.acquire()
    }

    /// Return a list obtained from [`World::acquire_list`] or
    /// [`World::get_components`].
    pub fn release_list(&mut self, list: Vec<EntityRef>) {
        self.pools.release(list);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("root", &self.root)
            .field("entities", &self.nodes.len())
            .field("types", &self.registry.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn has_key<K: Eq + Hash>(map: &Option<HashMap<K, EntityRef>>, key: &K) -> bool {
    map.as_ref().is_some_and(|map| map.contains_key(key))
}

fn remove_entry<K: Eq + Hash + 'static>(
    slot: &mut Option<HashMap<K, EntityRef>>,
    key: &K,
    entity: EntityRef,
    pools: &mut Pools,
) {
    let Some(map) = slot.as_mut() else {
        return;
    };
    if map.get(key) == Some(&entity) {
        map.remove(key);
    }
    if map.is_empty()
        && let Some(map) = slot.take()
    {
        pools.release(map);
    }
}
