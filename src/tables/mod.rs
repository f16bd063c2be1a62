//! Symbol tables: control objects and their named entries
//!
//! A control object lists the handles of its entries; every entry points
//! back at its control. On load the entries are collected per control and
//! keyed by name once the whole graph is resolved, see [`link_controls`].

/// Accessors every table entry shares, expanded inside its `ObjectKind` impl.
macro_rules! table_entry_accessors {
    () => {
        fn common(&self) -> &$crate::objects::ObjectCommon {
            &self.common
        }

        fn common_mut(&mut self) -> &mut $crate::objects::ObjectCommon {
            &mut self.common
        }

        fn table_entry(&self) -> Option<&$crate::objects::TableEntryData> {
            Some(&self.entry)
        }

        fn table_entry_mut(&mut self) -> Option<&mut $crate::objects::TableEntryData> {
            Some(&mut self.entry)
        }
    };
}

pub mod block_record;
pub mod dimstyle;
pub mod layer;
pub mod linetype;
pub mod textstyle;

pub use block_record::{BlockControl, BlockHeader};
pub use dimstyle::{DimStyle, DimensionVariables};
pub use layer::Layer;
pub use linetype::{LineType, LineTypeDash};
pub use textstyle::Style;

use std::marker::PhantomData;

use crate::error::{DwgError, Result};
use crate::io::dwg::field_io::{read_count, wire_count, FieldIo};
use crate::io::dwg::object_type::DwgObjectType;
use crate::io::dwg::reader::ObjectCache;
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::io::dwg::writer::ObjectMap;
use crate::objects::{DwgObject, ObjectArena, ObjectCommon, ObjectId, ObjectKind, ObjectVariant, TableEntries};
use crate::types::Handle;

/// A record kept in a control object's table.
pub trait TableEntry: ObjectKind {
    const CONTROL_TYPE: DwgObjectType;
}

impl TableEntry for Layer {
    const CONTROL_TYPE: DwgObjectType = DwgObjectType::LayerControl;
}

impl TableEntry for Style {
    const CONTROL_TYPE: DwgObjectType = DwgObjectType::StyleControl;
}

impl TableEntry for LineType {
    const CONTROL_TYPE: DwgObjectType = DwgObjectType::LineTypeControl;
}

impl TableEntry for DimStyle {
    const CONTROL_TYPE: DwgObjectType = DwgObjectType::DimStyleControl;
}

impl TableEntry for BlockHeader {
    const CONTROL_TYPE: DwgObjectType = DwgObjectType::BlockControl;
}

/// Control object of a symbol table holding entries of type `E`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableControl<E> {
    pub common: ObjectCommon,
    pub entries: TableEntries,
    /// Entry references as stored
    pub entry_handles: Vec<HandleReference>,
    pub entry_count: i16,
    /// Entries resolved on load, keyed by name in [`link_controls`]
    pub(crate) pending: Vec<ObjectId>,
    marker: PhantomData<fn() -> E>,
}

pub type LayerControl = TableControl<Layer>;
pub type StyleControl = TableControl<Style>;
pub type LineTypeControl = TableControl<LineType>;
pub type DimStyleControl = TableControl<DimStyle>;

impl<E> TableControl<E> {
    pub fn new() -> Self {
        Self {
            common: ObjectCommon::default(),
            entries: TableEntries::new(),
            entry_handles: Vec::new(),
            entry_count: 0,
            pending: Vec::new(),
            marker: PhantomData,
        }
    }
}

/// BS entry count.
pub(crate) fn visit_entry_count<F: FieldIo>(io: &mut F, count: &mut i16) -> Result<()> {
    io.bit_short(count)
}

/// The entry handles following the common handle block.
pub(crate) fn visit_entry_handles<F: FieldIo>(
    io: &mut F,
    handles: &mut Vec<HandleReference>,
    count: i16,
    owner: Handle,
) -> Result<()> {
    let count = read_count(count as i64, owner, "table entry")?;
    io.repeated(handles, count, |io, h| io.handle(h))
}

/// Control checks shared by every table, resolving each listed entry.
pub(crate) fn resolve_entries<E: TableEntry>(
    common: &ObjectCommon,
    entry_count: i16,
    entry_handles: &[HandleReference],
    cache: &mut ObjectCache<'_>,
) -> Result<Vec<ObjectId>> {
    let handle = common.handle;
    if entry_count as i64 != entry_handles.len() as i64 {
        return Err(DwgError::malformed(
            handle,
            format!(
                "entry count {} does not match {} entry handles",
                entry_count,
                entry_handles.len()
            ),
        ));
    }
    if common.xdictionary.code != DwgReferenceType::SoftPointer {
        return Err(DwgError::malformed(handle, "incorrect extension dictionary handle code"));
    }

    let mut ids = Vec::with_capacity(entry_handles.len());
    for reference in entry_handles {
        if !matches!(reference.code, DwgReferenceType::None | DwgReferenceType::SoftOwner) {
            return Err(DwgError::malformed(handle, "incorrect table entry handle code"));
        }
        let target = reference.resolve_next(handle);
        if target.is_null() {
            return Err(DwgError::malformed(handle, "null table entry handle"));
        }
        ids.push(cache.get_object::<E>(target, handle)?);
    }
    Ok(ids)
}

/// Entry references and count from the keyed entries, skipping `except`.
pub(crate) fn entry_references(
    entries: &TableEntries,
    except: &[Option<ObjectId>],
    map: &ObjectMap,
) -> Result<Vec<HandleReference>> {
    entries
        .ids()
        .filter(|id| !except.contains(&Some(*id)))
        .map(|id| map.reference(DwgReferenceType::None, Some(id)))
        .collect()
}

impl<E: TableEntry> ObjectKind for TableControl<E>
where
    TableControl<E>: ObjectVariant,
{
    const OBJECT_TYPE: DwgObjectType = E::CONTROL_TYPE;

    fn common(&self) -> &ObjectCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut ObjectCommon {
        &mut self.common
    }

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        visit_entry_count(io, &mut self.entry_count)
    }

    fn post_data<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        visit_entry_handles(io, &mut self.entry_handles, self.entry_count, self.common.handle)
    }

    fn pose_parse(&mut self, _id: ObjectId, cache: &mut ObjectCache<'_>) -> Result<()> {
        self.pending =
            resolve_entries::<E>(&self.common, self.entry_count, &self.entry_handles, cache)?;
        Ok(())
    }

    fn pre_write(&mut self, map: &ObjectMap) -> Result<()> {
        self.entry_handles = entry_references(&self.entries, &[], map)?;
        self.entry_count = wire_count(self.entry_handles.len(), self.common.handle, "table entries")?;
        Ok(())
    }

    fn child_ids(&self) -> Vec<ObjectId> {
        self.entries.ids().collect()
    }
}

fn control_parts(object: &mut DwgObject) -> Option<(&mut Vec<ObjectId>, &mut TableEntries)> {
    match object {
        DwgObject::BlockControl(c) => Some((&mut c.pending, &mut c.entries)),
        DwgObject::LayerControl(c) => Some((&mut c.pending, &mut c.entries)),
        DwgObject::StyleControl(c) => Some((&mut c.pending, &mut c.entries)),
        DwgObject::LineTypeControl(c) => Some((&mut c.pending, &mut c.entries)),
        DwgObject::DimStyleControl(c) => Some((&mut c.pending, &mut c.entries)),
        _ => None,
    }
}

impl DwgObject {
    /// Named entries of a table control.
    pub fn table_entries(&self) -> Option<&TableEntries> {
        match self {
            DwgObject::BlockControl(c) => Some(&c.entries),
            DwgObject::LayerControl(c) => Some(&c.entries),
            DwgObject::StyleControl(c) => Some(&c.entries),
            DwgObject::LineTypeControl(c) => Some(&c.entries),
            DwgObject::DimStyleControl(c) => Some(&c.entries),
            _ => None,
        }
    }

    pub fn table_entries_mut(&mut self) -> Option<&mut TableEntries> {
        control_parts(self).map(|(_, entries)| entries)
    }
}

/// Key the entries every control resolved by name, checking that each entry
/// points back at the control listing it.
pub(crate) fn link_controls(arena: &mut ObjectArena) -> Result<()> {
    for index in 0..arena.len() {
        let control = ObjectId(index);
        let Some(object) = arena.get_mut(control) else {
            continue;
        };
        let control_handle = object.handle();
        let Some((pending, _)) = control_parts(object) else {
            continue;
        };
        let pending = std::mem::take(pending);

        let mut entries = TableEntries::new();
        for id in pending {
            let entry = arena.get_mut(id).ok_or_else(|| {
                DwgError::malformed(control_handle, format!("table entry {} does not exist", id))
            })?;
            let common = entry.common_mut();
            match common.owner {
                Some(owner) if owner != control => {
                    return Err(DwgError::malformed(
                        common.handle,
                        format!("backlink does not point to control {}", control_handle),
                    ));
                }
                _ => common.owner = Some(control),
            }
            let name = entry.entry_name().unwrap_or_default().to_string();
            entries.add(&name, id, control_handle)?;
        }

        if let Some((_, slot)) = arena.get_mut(control).and_then(control_parts) {
            *slot = entries;
        }
    }
    Ok(())
}
