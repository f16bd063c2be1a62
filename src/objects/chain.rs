//! Entity chains threaded through previous/next handles.
//!
//! An owner stores the handles of its first and last child; every child
//! stores its neighbors. Polylines chain their vertices this way and block
//! headers chain their entities.

use ahash::AHashSet;

use tracing::trace;

use crate::error::{DwgError, Result};
use crate::io::dwg::object_type::DwgObjectType;
use crate::io::dwg::reader::ObjectCache;
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::io::dwg::writer::ObjectMap;
use crate::objects::{ObjectArena, ObjectId};
use crate::types::Handle;

/// Ordered children of a chain owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityChain {
    items: Vec<ObjectId>,
}

impl EntityChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: ObjectId) {
        self.items.push(id);
    }

    pub fn insert(&mut self, index: usize, id: ObjectId) {
        self.items.insert(index, id);
    }

    /// Remove `id` from the chain. Returns false when it was not a member.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn position(&self, id: ObjectId) -> Option<usize> {
        self.items.iter().position(|&i| i == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.items.contains(&id)
    }

    pub fn first(&self) -> Option<ObjectId> {
        self.items.first().copied()
    }

    pub fn last(&self) -> Option<ObjectId> {
        self.items.last().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.items.iter().copied()
    }

    pub fn as_slice(&self) -> &[ObjectId] {
        &self.items
    }
}

impl From<Vec<ObjectId>> for EntityChain {
    fn from(items: Vec<ObjectId>) -> Self {
        Self { items }
    }
}

impl FromIterator<ObjectId> for EntityChain {
    fn from_iter<I: IntoIterator<Item = ObjectId>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Resolve the chain running from `first` to `last` through the cache.
///
/// `accept` is asked about every member's type; a rejected member, a loop,
/// a member still being parsed or a tail that is not `last` are malformed.
pub(crate) fn walk_chain<P>(
    cache: &mut ObjectCache<'_>,
    owner: Handle,
    first: &HandleReference,
    last: &HandleReference,
    accept: P,
) -> Result<EntityChain>
where
    P: Fn(DwgObjectType) -> bool,
{
    let mut chain = EntityChain::new();
    let first_handle = first.resolve_next(owner);
    let last_handle = last.resolve_next(owner);

    if first_handle.is_null() {
        if !last_handle.is_null() {
            return Err(DwgError::malformed(owner, "chain has a last child but no first"));
        }
        return Ok(chain);
    }

    let mut visited = AHashSet::new();
    let mut current = first_handle;
    loop {
        if !visited.insert(current) {
            return Err(DwgError::malformed(
                owner,
                format!("chain loops back to {}", current),
            ));
        }

        let id = cache.get_any(current)?;
        let object = cache.peek(id).ok_or_else(|| {
            DwgError::malformed(owner, format!("chain member {} refers back into its owner", current))
        })?;
        let object_type = object.object_type();
        if !accept(object_type) {
            return Err(DwgError::malformed(
                owner,
                format!("unexpected {} in chain at {}", object_type, current),
            ));
        }
        let next = object
            .entity()
            .map(|e| e.next_entity)
            .ok_or_else(|| DwgError::malformed(owner, format!("chain member {} is not an entity", current)))?;

        trace!(owner = %owner, member = %current, "chain member");
        chain.push(id);

        if current == last_handle {
            return Ok(chain);
        }
        if next.points_to_null(current) {
            return Err(DwgError::malformed(
                owner,
                format!("chain ends at {} instead of {}", current, last_handle),
            ));
        }
        current = next.resolve_next(current);
    }
}

/// First and last child references of a chain; both null when empty.
pub(crate) fn chain_ends(
    map: &ObjectMap,
    chain: &EntityChain,
    code: DwgReferenceType,
) -> Result<(HandleReference, HandleReference)> {
    Ok((
        map.reference(code, chain.first())?,
        map.reference(code, chain.last())?,
    ))
}

/// Whether `prev` and `next` are the handles right before and after `handle`,
/// which lets the record omit both links.
fn neighbors_adjacent(handle: Handle, prev: HandleReference, next: HandleReference) -> bool {
    let h = handle.value();
    prev.value != 0 && h.checked_sub(1) == Some(prev.value) && h.checked_add(1) == Some(next.value)
}

/// Rewrite the neighbor links, owner and entity mode of every chain member.
pub(crate) fn stitch_chain(
    arena: &mut ObjectArena,
    map: &ObjectMap,
    chain: &EntityChain,
    owner: ObjectId,
    entity_mode: u8,
) -> Result<()> {
    let members = chain.as_slice();
    for (index, &id) in members.iter().enumerate() {
        let prev = index.checked_sub(1).map(|i| members[i]);
        let next = members.get(index + 1).copied();
        let prev = map.reference(DwgReferenceType::HardPointer, prev)?;
        let next = map.reference(DwgReferenceType::HardPointer, next)?;
        let implied = map
            .handle_of(id)
            .is_some_and(|h| neighbors_adjacent(h, prev, next));

        let object = arena
            .get_mut(id)
            .ok_or_else(|| DwgError::malformed(Handle::NULL, format!("chain member {} does not exist", id)))?;
        let handle = object.handle();
        let entity = object
            .entity_mut()
            .ok_or_else(|| DwgError::malformed(handle, "chain member is not an entity"))?;

        entity.prev_entity = prev;
        entity.next_entity = next;
        entity.no_links = implied;
        entity.entity_mode = entity_mode;
        entity.common.owner = Some(owner);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_edits() {
        let mut chain: EntityChain = vec![ObjectId(1), ObjectId(2), ObjectId(3)].into();
        assert!(chain.remove(ObjectId(2)));
        assert!(!chain.remove(ObjectId(2)));
        assert_eq!(chain.as_slice(), &[ObjectId(1), ObjectId(3)]);

        chain.insert(1, ObjectId(7));
        assert_eq!(chain.position(ObjectId(7)), Some(1));
        assert_eq!(chain.first(), Some(ObjectId(1)));
        assert_eq!(chain.last(), Some(ObjectId(3)));
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_adjacent_neighbors_imply_links() {
        let link = |h| HandleReference::new(DwgReferenceType::HardPointer, h);
        assert!(neighbors_adjacent(Handle::new(0x21), link(0x20), link(0x22)));
        assert!(!neighbors_adjacent(Handle::new(0x21), link(0x20), link(0x23)));
        assert!(!neighbors_adjacent(Handle::new(0x21), link(0x1F), link(0x22)));
        assert!(!neighbors_adjacent(Handle::new(1), link(0), link(2)));
        assert!(!neighbors_adjacent(Handle::new(u64::MAX), link(u64::MAX - 1), link(0)));
    }

    #[test]
    fn test_empty_chain() {
        let chain = EntityChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.first(), None);
        assert_eq!(chain.iter().count(), 0);
    }
}
