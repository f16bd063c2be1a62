//! Handle assignment for a write session.
//!
//! Every object reachable from the table controls gets a handle before a
//! single record is emitted, so forward and sibling references can be
//! written in one pass.

use ahash::AHashSet;
use tracing::debug;

use crate::error::{DwgError, Result};
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::objects::{ObjectArena, ObjectId};
use crate::types::Handle;

/// Object to handle mapping, in pre-order from the roots.
#[derive(Debug, Clone, Default)]
pub struct ObjectMap {
    /// Indexed by object id; null for objects that are not written
    handles: Vec<Handle>,
    order: Vec<ObjectId>,
    next: Handle,
}

impl ObjectMap {
    /// Walk the graph from `roots` and give every reachable object a handle.
    ///
    /// Objects already carrying a handle keep it unless another reachable
    /// object claimed it first. New handles start at the larger of `seed`
    /// and the highest kept handle plus one.
    pub fn build(arena: &ObjectArena, roots: &[ObjectId], seed: Handle) -> Result<Self> {
        let order = Self::pre_order(arena, roots)?;

        let mut handles = vec![Handle::NULL; arena.len()];
        let mut used = AHashSet::new();
        let mut highest = 0u64;
        for &id in &order {
            let handle = arena.get(id).map(|o| o.handle()).unwrap_or(Handle::NULL);
            if !handle.is_null() && used.insert(handle) {
                handles[id.0] = handle;
                highest = highest.max(handle.value());
            }
        }

        let first_free = after(Handle::new(highest))?;
        let mut next = Handle::new(seed.value().max(first_free.value()).max(1));
        let mut assigned = 0usize;
        for &id in &order {
            if handles[id.0].is_null() {
                handles[id.0] = next;
                next = after(next)?;
                assigned += 1;
            }
        }

        debug!(objects = order.len(), assigned, next = %next, "object map built");
        Ok(Self {
            handles,
            order,
            next,
        })
    }

    fn pre_order(arena: &ObjectArena, roots: &[ObjectId]) -> Result<Vec<ObjectId>> {
        let mut seen = vec![false; arena.len()];
        let mut order = Vec::new();
        let mut stack: Vec<(ObjectId, Handle)> = roots.iter().rev().map(|&r| (r, Handle::NULL)).collect();

        while let Some((id, parent)) = stack.pop() {
            let object = arena.get(id).ok_or_else(|| {
                DwgError::malformed(parent, format!("child object {} does not exist", id))
            })?;
            if std::mem::replace(&mut seen[id.0], true) {
                continue;
            }
            order.push(id);
            let handle = object.handle();
            stack.extend(object.child_ids().into_iter().rev().map(|c| (c, handle)));
        }
        Ok(order)
    }

    /// Handle assigned to `id`, if it is written.
    pub fn handle_of(&self, id: ObjectId) -> Option<Handle> {
        self.handles.get(id.0).copied().filter(|h| !h.is_null())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.handle_of(id).is_some()
    }

    /// A `code` reference to `target`; the null form of `code` for `None`.
    pub fn reference(&self, code: DwgReferenceType, target: Option<ObjectId>) -> Result<HandleReference> {
        match target {
            None => Ok(HandleReference::null_of(code)),
            Some(id) => self
                .handle_of(id)
                .map(|h| HandleReference::new(code, h.value()))
                .ok_or_else(|| {
                    DwgError::malformed(
                        Handle::NULL,
                        format!("object {} is referenced but not reachable from the tables", id),
                    )
                }),
        }
    }

    /// Objects to write, in traversal order.
    pub fn order(&self) -> &[ObjectId] {
        &self.order
    }

    /// First handle not assigned to any object, the next `HANDSEED`.
    pub fn handle_seed(&self) -> Handle {
        self.next
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// The handle following `handle`; the handle space ends at `u64::MAX`.
fn after(handle: Handle) -> Result<Handle> {
    handle
        .value()
        .checked_add(1)
        .map(Handle::new)
        .ok_or_else(|| DwgError::malformed(handle, "no handle left to assign after this one"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Line;
    use crate::tables::{Layer, LayerControl};

    fn layers() -> (ObjectArena, ObjectId, Vec<ObjectId>) {
        let mut arena = ObjectArena::new();
        let control = arena.push(LayerControl::new());
        let a = arena.push(Layer::new("0"));
        let b = arena.push(Layer::new("WALLS"));
        let control_handle = Handle::NULL;
        if let Some(c) = arena.get_as_mut::<LayerControl>(control) {
            c.entries.add("0", a, control_handle).unwrap();
            c.entries.add("WALLS", b, control_handle).unwrap();
        }
        (arena, control, vec![a, b])
    }

    #[test]
    fn test_pre_order_assignment() {
        let (arena, control, entries) = layers();
        let map = ObjectMap::build(&arena, &[control], Handle::NULL).unwrap();
        assert_eq!(map.order(), &[control, entries[0], entries[1]]);
        assert_eq!(map.handle_of(control), Some(Handle::new(1)));
        assert_eq!(map.handle_of(entries[1]), Some(Handle::new(3)));
        assert_eq!(map.handle_seed(), Handle::new(4));
    }

    #[test]
    fn test_existing_handles_kept() {
        let (mut arena, control, entries) = layers();
        arena.get_mut(entries[0]).unwrap().common_mut().handle = Handle::new(0x40);
        let map = ObjectMap::build(&arena, &[control], Handle::new(0x20)).unwrap();
        assert_eq!(map.handle_of(entries[0]), Some(Handle::new(0x40)));
        assert_eq!(map.handle_of(control), Some(Handle::new(0x41)));
        assert_eq!(map.handle_of(entries[1]), Some(Handle::new(0x42)));
    }

    #[test]
    fn test_duplicate_handle_reassigned() {
        let (mut arena, control, entries) = layers();
        for &id in &entries {
            arena.get_mut(id).unwrap().common_mut().handle = Handle::new(0x10);
        }
        let map = ObjectMap::build(&arena, &[control], Handle::NULL).unwrap();
        assert_eq!(map.handle_of(entries[0]), Some(Handle::new(0x10)));
        assert_ne!(map.handle_of(entries[1]), Some(Handle::new(0x10)));
    }

    #[test]
    fn test_highest_possible_handle_is_malformed() {
        let (mut arena, control, entries) = layers();
        arena.get_mut(entries[1]).unwrap().common_mut().handle = Handle::new(u64::MAX);
        let err = ObjectMap::build(&arena, &[control], Handle::NULL).unwrap_err();
        assert!(
            matches!(err, DwgError::MalformedDocument { handle, .. } if handle == Handle::new(u64::MAX)),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_seed_at_end_of_handle_space_is_malformed() {
        let (arena, control, _) = layers();
        let err = ObjectMap::build(&arena, &[control], Handle::new(u64::MAX)).unwrap_err();
        assert!(matches!(err, DwgError::MalformedDocument { .. }), "{:?}", err);
    }

    #[test]
    fn test_unreachable_reference() {
        let (mut arena, control, _) = layers();
        let stray = arena.push(Line::default());
        let map = ObjectMap::build(&arena, &[control], Handle::NULL).unwrap();
        assert!(!map.contains(stray));
        assert!(map.reference(DwgReferenceType::SoftPointer, Some(stray)).is_err());
        assert_eq!(
            map.reference(DwgReferenceType::HardPointer, None).unwrap(),
            HandleReference::null_of(DwgReferenceType::HardPointer)
        );
    }
}
