//! Shared fixtures for the graph tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use engine_id::ManualClock;

pub(crate) use crate::config::WorldConfig;
use crate::dispatch::{AwakeCall, Dispatcher};
pub(crate) use crate::entity::{EntityRef, Status};
use crate::object::{Awake, Destroy, Enable, EntityType, Start, Update};
use crate::registry::TypeBuilder;
pub(crate) use crate::world::World;

/// 2023-11-14T22:13:20Z.
pub(crate) const T0: i64 = 1_700_000_000;

/// Zone every test world mints unit ids in.
pub(crate) const ZONE: u32 = 7;

/// A world on a frozen clock, reporting every notification to the returned
/// recorder.
pub(crate) fn recording_world() -> (World, Rc<Recorder>) {
    let (world, recorder, _) = recording_world_with_clock();
    (world, recorder)
}

pub(crate) fn recording_world_with_clock() -> (World, Rc<Recorder>, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::at(T0));
    let mut world = World::with_clock(WorldConfig::new(ZONE), clock.clone());
    let recorder = Rc::new(Recorder::default());
    world.set_dispatcher(recorder.clone());
    (world, recorder, clock)
}

/// Dispatcher that logs each notification as `"<event> <TypeName>"` and then
/// does what the default dispatcher does.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    events: RefCell<Vec<String>>,
    updates: RefCell<Vec<EntityRef>>,
}

impl Recorder {
    fn push(&self, event: &str, world: &World, entity: EntityRef) {
        let name = world
            .type_name(entity)
            .and_then(|name| name.rsplit("::").next())
            .unwrap_or("?");
        self.events.borrow_mut().push(format!("{event} {name}"));
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }

    pub(crate) fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl Dispatcher for Recorder {
    fn awake(&self, world: &mut World, call: AwakeCall<'_>) {
        self.push("awake", world, call.entity());
        call.invoke(world);
    }

    fn start(&self, world: &mut World, entity: EntityRef) {
        self.push("start", world, entity);
        world.run_start(entity);
    }

    fn destroy(&self, world: &mut World, entity: EntityRef) {
        self.push("destroy", world, entity);
        world.run_destroy(entity);
    }

    fn enable(&self, world: &mut World, entity: EntityRef, enabled: bool) {
        self.push(if enabled { "enable" } else { "disable" }, world, entity);
        world.run_enable(entity, enabled);
    }

    fn register(&self, entity: EntityRef, registered: bool) {
        let event = if registered { "register" } else { "unregister" };
        self.events.borrow_mut().push(event.to_string());
        let mut updates = self.updates.borrow_mut();
        if registered {
            updates.push(entity);
        } else {
            updates.retain(|&e| e != entity);
        }
    }

    fn update(&self, world: &mut World) {
        let batch = self.updates.borrow().clone();
        for entity in batch {
            if world.is_alive(entity) && world.is_enabled(entity) {
                self.push("update", world, entity);
                world.run_update(entity);
            }
        }
    }
}

/// Plain entity with no hooks.
#[derive(Debug, Default)]
pub(crate) struct Unit;

impl EntityType for Unit {}
impl Awake for Unit {}

pub(crate) trait Weapon {
    fn damage(&self) -> u32;
}

#[derive(Debug, Default)]
pub(crate) struct Sword {
    pub(crate) sharpness: u32,
}

impl Weapon for Sword {
    fn damage(&self) -> u32 {
        self.sharpness * 2
    }
}

impl EntityType for Sword {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.capability::<dyn Weapon>(|s| s, |s| s);
    }
}

impl Awake for Sword {}

impl Awake<(u32,)> for Sword {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (sharpness,): (u32,)) {
        self.sharpness = sharpness;
    }
}

#[derive(Debug, Default)]
pub(crate) struct Bow {
    pub(crate) draw: u32,
}

impl Weapon for Bow {
    fn damage(&self) -> u32 {
        self.draw + 1
    }
}

impl EntityType for Bow {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.capability::<dyn Weapon>(|b| b, |b| b);
    }
}

impl Awake<(u32,)> for Bow {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (draw,): (u32,)) {
        self.draw = draw;
    }
}

/// Declares every hook and records what it saw.
#[derive(Debug, Default)]
pub(crate) struct Health {
    pub(crate) hp: i32,
    pub(crate) hp_at_start: Option<i32>,
    pub(crate) new_at_start: bool,
    pub(crate) ticks: u32,
}

impl EntityType for Health {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.start().update().destroy().enable();
    }
}

impl Awake for Health {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (): ()) {
        self.hp = 100;
    }
}

impl Awake<(i32,)> for Health {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (hp,): (i32,)) {
        self.hp = hp;
    }
}

impl Start for Health {
    fn start(&mut self, world: &mut World, me: EntityRef) {
        self.hp_at_start = Some(self.hp);
        self.new_at_start = world.status(me).contains(Status::NEW);
    }
}

impl Update for Health {
    fn update(&mut self, _world: &mut World, _me: EntityRef) {
        self.ticks += 1;
    }
}

impl Destroy for Health {
    fn destroy(&mut self, _world: &mut World, _me: EntityRef) {}
}

impl Enable for Health {}

/// Destroy hook only.
#[derive(Debug, Default)]
pub(crate) struct Shield;

impl EntityType for Shield {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.destroy();
    }
}

impl Awake for Shield {}

impl Destroy for Shield {
    fn destroy(&mut self, _world: &mut World, _me: EntityRef) {}
}

/// Collects its awake arguments, for every supported arity.
#[derive(Debug, Default)]
pub(crate) struct Stats {
    pub(crate) values: Vec<i32>,
}

impl EntityType for Stats {}

impl Awake for Stats {}

impl Awake<(i32,)> for Stats {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (a,): (i32,)) {
        self.values = vec![a];
    }
}

impl Awake<(i32, i32)> for Stats {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (a, b): (i32, i32)) {
        self.values = vec![a, b];
    }
}

impl Awake<(i32, i32, i32)> for Stats {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (a, b, c): (i32, i32, i32)) {
        self.values = vec![a, b, c];
    }
}

impl Awake<(i32, i32, i32, &'static str)> for Stats {
    fn awake(
        &mut self,
        _world: &mut World,
        _me: EntityRef,
        (a, b, c, label): (i32, i32, i32, &'static str),
    ) {
        self.values = vec![a, b, c, label.len() as i32];
    }
}

/// Pooled, short-lived.
#[derive(Debug, Default)]
pub(crate) struct Spark {
    pub(crate) power: i32,
}

impl EntityType for Spark {
    const POOLED: bool = true;
}

impl Awake for Spark {}

impl Awake<(i32,)> for Spark {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (power,): (i32,)) {
        self.power = power;
    }
}

/// Pooled; disposes itself during awake.
#[derive(Debug, Default)]
pub(crate) struct Flash;

impl EntityType for Flash {
    const POOLED: bool = true;
}

impl Awake for Flash {
    fn awake(&mut self, world: &mut World, me: EntityRef, (): ()) {
        world.dispose(me);
    }
}

/// Builds part of its own subtree during awake.
#[derive(Debug, Default)]
pub(crate) struct Spawner {
    pub(crate) spawned: Option<(EntityRef, EntityRef)>,
}

impl EntityType for Spawner {}

impl Awake for Spawner {
    fn awake(&mut self, world: &mut World, me: EntityRef, (): ()) {
        if let (Ok(child), Ok(component)) = (
            world.add_child::<Unit>(me),
            world.add_component_with::<Health, _>(me, (5,)),
        ) {
            self.spawned = Some((child, component));
        }
    }
}

thread_local! {
    /// `(child alive, component alive, self alive)` seen by the last
    /// [`Watcher`] destroy hook.
    pub(crate) static WATCHED: Cell<Option<(bool, bool, bool)>> = const { Cell::new(None) };
}

/// Records what is left of its subtree when destroyed.
#[derive(Debug, Default)]
pub(crate) struct Watcher {
    owned: Option<(EntityRef, EntityRef)>,
}

impl EntityType for Watcher {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.destroy();
    }
}

impl Awake for Watcher {
    fn awake(&mut self, world: &mut World, me: EntityRef, (): ()) {
        if let (Ok(child), Ok(component)) =
            (world.add_child::<Unit>(me), world.add_component::<Shield>(me))
        {
            self.owned = Some((child, component));
        }
    }
}

impl Destroy for Watcher {
    fn destroy(&mut self, world: &mut World, me: EntityRef) {
        if let Some((child, component)) = self.owned {
            WATCHED.with(|seen| {
                seen.set(Some((
                    world.is_alive(child),
                    world.is_alive(component),
                    world.is_alive(me),
                )));
            });
        }
    }
}

/// Tries to dispose itself again from its destroy hook.
#[derive(Debug, Default)]
pub(crate) struct SelfDisposer;

impl EntityType for SelfDisposer {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.destroy();
    }
}

impl Awake for SelfDisposer {}

impl Destroy for SelfDisposer {
    fn destroy(&mut self, world: &mut World, me: EntityRef) {
        world.dispose(me);
    }
}

/// Disposes itself on its third update.
#[derive(Debug, Default)]
pub(crate) struct Fuse {
    ticks: u32,
}

impl EntityType for Fuse {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.update();
    }
}

impl Awake for Fuse {}

impl Update for Fuse {
    fn update(&mut self, world: &mut World, me: EntityRef) {
        self.ticks += 1;
        if self.ticks == 3 {
            world.dispose(me);
        }
    }
}

thread_local! {
    /// `(type, self alive)` for every [`Bolt`] or [`Dud`] destroy hook run.
    pub(crate) static DESTROYED: Cell<Vec<(&'static str, bool)>> = const { Cell::new(Vec::new()) };
}

/// Pooled projectile: disposes itself on its first update.
#[derive(Debug, Default)]
pub(crate) struct Bolt;

impl EntityType for Bolt {
    const POOLED: bool = true;

    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.update().destroy();
    }
}

impl Awake for Bolt {}

impl Update for Bolt {
    fn update(&mut self, world: &mut World, me: EntityRef) {
        world.dispose(me);
    }
}

impl Destroy for Bolt {
    fn destroy(&mut self, world: &mut World, me: EntityRef) {
        let alive = world.is_alive(me);
        DESTROYED.with(|seen| {
            let mut events = seen.take();
            events.push(("Bolt", alive));
            seen.set(events);
        });
    }
}

/// Disposes itself during awake.
#[derive(Debug, Default)]
pub(crate) struct Dud;

impl EntityType for Dud {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.destroy();
    }
}

impl Awake for Dud {
    fn awake(&mut self, world: &mut World, me: EntityRef, (): ()) {
        world.dispose(me);
    }
}

impl Destroy for Dud {
    fn destroy(&mut self, world: &mut World, me: EntityRef) {
        let alive = world.is_alive(me);
        DESTROYED.with(|seen| {
            let mut events = seen.take();
            events.push(("Dud", alive));
            seen.set(events);
        });
    }
}
