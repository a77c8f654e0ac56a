//! Re-parenting and the enabled flag.

use std::rc::Rc;

use tracing::{error, trace};

use crate::entity::{EntityRef, Relation};
use crate::error::GraphError;
use crate::registry::{Hooks, TypeInfo};
use crate::world::World;

impl World {
    /// Move `child` under `parent`, keeping its id and subtree.
    ///
    /// Moving a child onto its current parent is a logged no-op.
    ///
    /// # Errors
    ///
    /// - [`GraphError::SelfParent`] if `child == parent`.
    /// - [`GraphError::Disposed`] if either entity is disposed.
    /// - [`GraphError::ComponentCannotMove`] if `child` is a component or the
    ///   scene root.
    /// - [`GraphError::DuplicateChild`] if `parent` already has a child with
    ///   the same id.
    /// - [`GraphError::WouldCycle`] if `parent` lies inside `child`'s subtree.
    pub fn set_parent(&mut self, child: EntityRef, parent: EntityRef) -> Result<(), GraphError> {
        if child == parent {
            return Err(GraphError::SelfParent(child));
        }
        let node = self.live_node(child).ok_or(GraphError::Disposed(child))?;
        let (id, kind) = (node.id, node.kind);
        let Some(Relation::Child(current)) = node.relation else {
            return Err(GraphError::ComponentCannotMove(child));
        };
        let parent_node = self.live_node(parent).ok_or(GraphError::Disposed(parent))?;
        if current == parent {
            error!(%child, %parent, "entity is already a child of this parent");
            return Ok(());
        }
        if parent_node
            .children
            .as_ref()
            .is_some_and(|children| children.contains_key(&id))
        {
            return Err(GraphError::DuplicateChild { owner: parent, id });
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(GraphError::WouldCycle { child, parent });
        }

        self.unlink(Relation::Child(current), child, id, kind);
        let relation = Relation::Child(parent);
        self.link(relation, child, id, kind);
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.relation = Some(relation);
        }
        trace!(%child, from = %current, to = %parent, "entity re-parented");
        Ok(())
    }

    /// Iterate from `entity` up to its root, `entity` included.
    pub fn ancestors(&self, entity: EntityRef) -> impl Iterator<Item = EntityRef> + '_ {
        std::iter::successors(Some(entity), move |&current| self.parent(current))
    }

    /// The topmost owner of `entity`: the scene root for anything still
    /// attached to it.
    #[must_use]
    pub fn root_of(&self, entity: EntityRef) -> EntityRef {
        self.ancestors(entity).last().unwrap_or(entity)
    }

    /// Set the enabled flag. The dispatcher hears about actual transitions
    /// only.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Disposed`] if `entity` is disposed.
    pub fn set_enabled(&mut self, entity: EntityRef, enabled: bool) -> Result<(), GraphError> {
        let node = self
            .live_node_mut(entity)
            .ok_or(GraphError::Disposed(entity))?;
        if node.enabled == enabled {
            return Ok(());
        }
        node.enabled = enabled;
        let kind = node.kind;

        let hooks = self.registry.get(kind).map_or(Hooks::empty(), TypeInfo::hooks);
        if hooks.contains(Hooks::ENABLE) {
            let dispatcher = Rc::clone(&self.dispatcher);
            dispatcher.enable(self, entity, enabled);
        }
        Ok(())
    }
}
