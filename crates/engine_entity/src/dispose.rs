//! Disposal and removal.
//!
//! Disposal walks the subtree depth-first: all components of an entity are
//! fully disposed before any of its children, and the entity's own destroy
//! hook runs last. The id is zeroed before anything else happens, so a hook
//! that tries to dispose an entity already on the way out is a no-op.

use std::any::TypeId;

use tracing::debug;

use crate::entity::{EntityRef, Relation, Status};
use crate::object::EntityType;
use crate::registry::{Hooks, TypeInfo};
use crate::world::World;

impl World {
    /// Dispose `entity` and everything it owns. Disposing an entity that is
    /// already disposed does nothing.
    pub fn dispose(&mut self, entity: EntityRef) {
        let Some(node) = self.live_node_mut(entity) else {
            return;
        };
        let id = node.id;
        let kind = node.kind;
        node.id = 0;
        node.status.remove(Status::REGISTERED);

        let hooks = self.registry.get(kind).map_or(Hooks::empty(), TypeInfo::hooks);
        let dispatcher = std::rc::Rc::clone(&self.dispatcher);
        if hooks.contains(Hooks::UPDATE) {
            dispatcher.register(entity, false);
        }

        let mut batch = self.acquire_list();
        self.collect_owned(entity, &mut batch, true);
        for owned in batch.drain(..) {
            self.dispose(owned);
        }
        self.collect_owned(entity, &mut batch, false);
        for owned in batch.drain(..) {
            self.dispose(owned);
        }
        self.release_list(batch);

        if hooks.contains(Hooks::DESTROY) {
            dispatcher.destroy(self, entity);
        }

        let Ok(mut node) = self.nodes.remove(entity.0) else {
            return;
        };
        if let Some(relation) = node.relation.take() {
            self.unlink(relation, entity, id, kind);
        }
        if let Some(children) = node.children.take() {
            self.pools.release(children);
        }
        if let Some(components) = node.components.take() {
            self.pools.release(components);
        }
        // A hook of this entity may still hold the object; its destroy hook
        // and recycling then run when that hook returns.
        if node.status.contains(Status::FROM_POOL)
            && let Some(object) = node.object.take()
        {
            self.recycle(kind, object);
        }
        debug!(%entity, id, "entity disposed");
    }

    /// Copy the components (or children) of a disposing entity into `out`.
    fn collect_owned(&self, entity: EntityRef, out: &mut Vec<EntityRef>, components: bool) {
        let Some(node) = self.nodes.get(entity.0) else {
            return;
        };
        if components {
            if let Some(map) = &node.components {
                out.extend(map.values().copied());
            }
        } else if let Some(map) = &node.children {
            out.extend(map.values().copied());
        }
    }

    /// Dispose the child of `owner` with id `id`. Returns `false` if there is
    /// no such child or `owner` is disposed.
    pub fn remove_child(&mut self, owner: EntityRef, id: u64) -> bool {
        let Some(child) = self.child(owner, id) else {
            return false;
        };
        self.dispose(child);
        true
    }

    /// Dispose the `T` component of `owner`. Returns `false` if `owner` has
    /// none or is disposed.
    pub fn remove_component<T: EntityType>(&mut self, owner: EntityRef) -> bool {
        let component = self.live_node(owner).and_then(|node| {
            node.components
                .as_ref()?
                .get(&TypeId::of::<T>())
                .copied()
        });
        let Some(component) = component else {
            return false;
        };
        self.dispose(component);
        true
    }

    /// Dispose `component` if it is a component of `owner`.
    pub fn remove_component_entity(&mut self, owner: EntityRef, component: EntityRef) -> bool {
        if !self.is_alive(owner) || self.relation(component) != Some(Relation::Component(owner)) {
            return false;
        }
        self.dispose(component);
        true
    }

    /// Dispose everything under the scene root. The root stays alive.
    pub fn clear(&mut self) {
        let root = self.root();
        let mut batch = self.acquire_list();
        self.collect_owned(root, &mut batch, true);
        self.collect_owned(root, &mut batch, false);
        for entity in batch.drain(..) {
            self.dispose(entity);
        }
        self.release_list(batch);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::entity::{EntityRef, Status};
    use crate::testing::*;

    #[test]
    fn test_dispose_zeroes_subtree() {
        let (mut world, _) = recording_world();
        let root = world.root();
        let a = world.add_child::<Unit>(root).unwrap();
        let a_id = world.id(a);
        let x = world.add_component::<Health>(a).unwrap();
        let b = world.add_child::<Unit>(a).unwrap();

        world.dispose(a);

        assert_eq!(world.id(a), 0);
        assert_eq!(world.id(x), 0);
        assert_eq!(world.id(b), 0);
        assert!(world.child(root, a_id).is_none());
        assert!(world.is_alive(root));
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let (mut world, recorder) = recording_world();
        let a = world.add_child::<Health>(world.root()).unwrap();

        world.dispose(a);
        world.dispose(a);

        assert_eq!(recorder.count("destroy Health"), 1);
        assert_eq!(recorder.count("unregister"), 1);
    }

    #[test]
    fn test_components_destroyed_before_children() {
        let (mut world, recorder) = recording_world();
        let a = world.add_child::<Unit>(world.root()).unwrap();
        world.add_child::<Health>(a).unwrap();
        world.add_component::<Shield>(a).unwrap();
        recorder.clear();

        world.dispose(a);

        assert_eq!(recorder.events(), vec![
            "destroy Shield".to_string(),
            "unregister".to_string(),
            "destroy Health".to_string(),
        ]);
    }

    #[test]
    fn test_destroy_runs_after_subtree_is_gone() {
        let (mut world, _) = recording_world();
        let watcher = world.add_child::<Watcher>(world.root()).unwrap();
        assert_eq!(world.child_count(watcher), 1);
        assert_eq!(world.component_count(watcher), 1);

        world.dispose(watcher);

        let seen = WATCHED.with(|seen| seen.take());
        assert_eq!(seen, Some((false, false, false)));
    }

    #[test]
    fn test_dispose_from_destroy_hook_is_noop() {
        let (mut world, recorder) = recording_world();
        let a = world.add_child::<SelfDisposer>(world.root()).unwrap();

        world.dispose(a);

        assert_eq!(recorder.count("destroy SelfDisposer"), 1);
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_dispose_during_update() {
        let (mut world, recorder) = recording_world();
        let root = world.root();
        let fuse = world.add_child::<Fuse>(root).unwrap();

        world.update();
        world.update();
        assert!(world.is_alive(fuse));
        world.update();

        assert!(!world.is_alive(fuse));
        assert_eq!(world.child_count(root), 0);
        assert_eq!(recorder.count("update Fuse"), 3);
        world.update();
        assert_eq!(recorder.count("update Fuse"), 3);
    }

    #[test]
    fn test_self_disposal_in_update_runs_destroy() {
        let (mut world, recorder) = recording_world();
        let root = world.root();
        let bolt = world.add_child::<Bolt>(root).unwrap();

        world.update();

        assert!(!world.is_alive(bolt));
        assert_eq!(recorder.count("destroy Bolt"), 1);
        assert_eq!(DESTROYED.with(|seen| seen.take()), vec![("Bolt", false)]);
        assert_eq!(world.pooled_instances::<Bolt>(), 1);
        assert_eq!(world.child_count(root), 0);
    }

    #[test]
    fn test_self_disposal_in_update_with_hook_dispatcher() {
        let (mut world, _) = recording_world();
        world.set_dispatcher(std::rc::Rc::new(crate::dispatch::HookDispatcher::new()));
        world.add_child::<Bolt>(world.root()).unwrap();

        world.update();
        world.update();

        assert_eq!(DESTROYED.with(|seen| seen.take()), vec![("Bolt", false)]);
    }

    #[test]
    fn test_self_disposal_in_awake_runs_destroy() {
        let (mut world, recorder) = recording_world();
        let dud = world.add_child::<Dud>(world.root()).unwrap();

        assert!(!world.is_alive(dud));
        assert_eq!(recorder.count("destroy Dud"), 1);
        assert_eq!(DESTROYED.with(|seen| seen.take()), vec![("Dud", false)]);
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_remove_child() {
        let (mut world, _) = recording_world();
        let root = world.root();
        let a = world.add_child::<Unit>(root).unwrap();
        let id = world.id(a);

        assert!(!world.remove_child(root, id + 1));
        assert!(world.remove_child(root, id));
        assert!(!world.is_alive(a));
        assert!(!world.remove_child(root, id));
    }

    #[test]
    fn test_remove_component_by_type_and_entity() {
        let (mut world, _) = recording_world();
        let a = world.add_child::<Unit>(world.root()).unwrap();
        let health = world.add_component::<Health>(a).unwrap();
        let shield = world.add_component::<Shield>(a).unwrap();

        assert!(world.remove_component::<Health>(a));
        assert!(!world.is_alive(health));
        assert!(!world.remove_component::<Health>(a));

        assert!(!world.remove_component_entity(world.root(), shield));
        assert!(world.remove_component_entity(a, shield));
        assert_eq!(world.component_count(a), 0);
    }

    #[test]
    fn test_remove_on_disposed_owner_is_noop() {
        let (mut world, _) = recording_world();
        let a = world.add_child::<Unit>(world.root()).unwrap();
        world.dispose(a);

        assert!(!world.remove_child(a, 1));
        assert!(!world.remove_component::<Health>(a));
    }

    #[test]
    fn test_pooled_instances_are_reused() {
        let (mut world, _) = recording_world();
        let root = world.root();
        let first = world.add_child_with::<Spark, _>(root, (9,)).unwrap();
        let first_instance = world.instance_id(first);
        assert!(world.status(first).contains(Status::FROM_POOL));

        world.dispose(first);
        assert_eq!(world.pooled_instances::<Spark>(), 1);

        let second = world.add_child::<Spark>(root).unwrap();
        assert_eq!(world.pooled_instances::<Spark>(), 0);
        assert_ne!(world.instance_id(second), first_instance);
        assert_eq!(world.get::<Spark>(second).unwrap().power, 0);
    }

    #[test]
    fn test_pooled_self_disposal_is_recycled() {
        let (mut world, _) = recording_world();
        let root = world.root();
        world.add_child::<Flash>(root).unwrap();

        assert_eq!(world.child_count(root), 0);
        assert_eq!(world.pooled_instances::<Flash>(), 1);
    }

    #[test]
    fn test_relation_maps_return_to_pools() {
        let (mut world, _) = recording_world();
        let root = world.root();
        let a = world.add_child::<Unit>(root).unwrap();
        world.add_child::<Unit>(a).unwrap();

        world.dispose(a);

        // Root's emptied child map plus the disposed entity's own.
        assert_eq!(world.pools().retained::<HashMap<u64, EntityRef>>(), 2);
    }

    #[test]
    fn test_clear_keeps_root() {
        let (mut world, recorder) = recording_world();
        let root = world.root();
        for _ in 0..3 {
            world.add_child::<Health>(root).unwrap();
        }
        world.add_component::<Shield>(root).unwrap();

        world.clear();

        assert!(world.is_alive(root));
        assert_eq!(world.entity_count(), 1);
        assert_eq!(recorder.count("destroy Health"), 3);
        assert_eq!(recorder.count("destroy Shield"), 1);
    }
}
