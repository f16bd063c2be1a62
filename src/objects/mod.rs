//! The object graph
//!
//! Objects live in an [`ObjectArena`] and refer to each other through
//! [`ObjectId`]s. Wire handle references are kept next to the in-memory links:
//! the read path fills the links from the references, the write path rebuilds
//! the references from the links.
//!
//! Every supported record type is a variant of the closed [`DwgObject`] enum.
//! Per-type behavior sits behind [`ObjectKind`]; the shared record layout is
//! driven by [`DwgObject::visit`].

mod chain;
mod common;
mod table_entries;

pub use chain::EntityChain;
pub use common::{EntityCommon, ObjectCommon};
pub use table_entries::{TableEntries, TableEntryData};

pub(crate) use chain::{chain_ends, stitch_chain, walk_chain};

use std::fmt;

use crate::entities::{Arc, Block, Circle, EndBlock, Line, Polyline2D, SeqEnd, Vertex2D};
use crate::error::Result;
use crate::io::dwg::field_io::FieldIo;
use crate::io::dwg::object_type::DwgObjectType;
use crate::io::dwg::reader::ObjectCache;
use crate::io::dwg::writer::ObjectMap;
use crate::tables::{
    BlockControl, BlockHeader, DimStyle, DimStyleControl, Layer, LayerControl, LineType,
    LineTypeControl, Style, StyleControl,
};
use crate::types::Handle;

/// Index of an object in its [`ObjectArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-type behavior of a record.
///
/// The read path runs `fields`, `post_data`, `pose_parse` and `after_read`
/// in that order. The write path runs `pre_write`, then `fields` and
/// `post_data`. Stages a type has nothing to do in keep the default no-op.
pub trait ObjectKind: ObjectVariant + Clone + Default + fmt::Debug {
    const OBJECT_TYPE: DwgObjectType;

    fn common(&self) -> &ObjectCommon;
    fn common_mut(&mut self) -> &mut ObjectCommon;

    fn entity(&self) -> Option<&EntityCommon> {
        None
    }

    fn entity_mut(&mut self) -> Option<&mut EntityCommon> {
        None
    }

    fn table_entry(&self) -> Option<&TableEntryData> {
        None
    }

    fn table_entry_mut(&mut self) -> Option<&mut TableEntryData> {
        None
    }

    /// Type-specific data fields.
    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()>;

    /// Type-specific handles, after the common handle block.
    fn post_data<F: FieldIo>(&mut self, _io: &mut F) -> Result<()> {
        Ok(())
    }

    /// Check the references just read and resolve direct children.
    fn pose_parse(&mut self, _id: ObjectId, _cache: &mut ObjectCache<'_>) -> Result<()> {
        Ok(())
    }

    /// Resolve children only reachable through a chain walk.
    fn after_read(&mut self, _id: ObjectId, _cache: &mut ObjectCache<'_>) -> Result<()> {
        Ok(())
    }

    /// Rebuild wire references and counts from the in-memory links.
    fn pre_write(&mut self, _map: &ObjectMap) -> Result<()> {
        Ok(())
    }

    /// Objects this one owns, in traversal order.
    fn child_ids(&self) -> Vec<ObjectId> {
        Vec::new()
    }
}

/// Conversion between a concrete record type and [`DwgObject`].
pub trait ObjectVariant: Sized {
    fn from_object(object: &DwgObject) -> Option<&Self>;
    fn from_object_mut(object: &mut DwgObject) -> Option<&mut Self>;
    fn into_object(self) -> DwgObject;
}

macro_rules! dwg_objects {
    ($($variant:ident($ty:ty) = $tag:ident),* $(,)?) => {
        /// Any supported record.
        #[derive(Debug, Clone, PartialEq)]
        pub enum DwgObject {
            $($variant($ty),)*
        }

        impl DwgObject {
            /// A default instance for a type tag.
            pub fn new_of(object_type: DwgObjectType) -> DwgObject {
                match object_type {
                    $(DwgObjectType::$tag => DwgObject::$variant(<$ty>::default()),)*
                }
            }

            pub fn object_type(&self) -> DwgObjectType {
                match self {
                    $(DwgObject::$variant(_) => <$ty as ObjectKind>::OBJECT_TYPE,)*
                }
            }

            pub fn common(&self) -> &ObjectCommon {
                match self {
                    $(DwgObject::$variant(o) => o.common(),)*
                }
            }

            pub fn common_mut(&mut self) -> &mut ObjectCommon {
                match self {
                    $(DwgObject::$variant(o) => o.common_mut(),)*
                }
            }

            pub fn entity(&self) -> Option<&EntityCommon> {
                match self {
                    $(DwgObject::$variant(o) => o.entity(),)*
                }
            }

            pub fn entity_mut(&mut self) -> Option<&mut EntityCommon> {
                match self {
                    $(DwgObject::$variant(o) => o.entity_mut(),)*
                }
            }

            pub fn table_entry(&self) -> Option<&TableEntryData> {
                match self {
                    $(DwgObject::$variant(o) => o.table_entry(),)*
                }
            }

            pub fn table_entry_mut(&mut self) -> Option<&mut TableEntryData> {
                match self {
                    $(DwgObject::$variant(o) => o.table_entry_mut(),)*
                }
            }

            /// Read or write everything after the type tag.
            pub(crate) fn visit<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
                match self {
                    $(DwgObject::$variant(o) => common::visit_object(o, io),)*
                }
            }

            pub(crate) fn pose_parse(&mut self, id: ObjectId, cache: &mut ObjectCache<'_>) -> Result<()> {
                match self {
                    $(DwgObject::$variant(o) => common::pose_parse(o, id, cache),)*
                }
            }

            pub(crate) fn after_read(&mut self, id: ObjectId, cache: &mut ObjectCache<'_>) -> Result<()> {
                match self {
                    $(DwgObject::$variant(o) => o.after_read(id, cache),)*
                }
            }

            pub(crate) fn pre_write(&mut self, map: &ObjectMap) -> Result<()> {
                match self {
                    $(DwgObject::$variant(o) => common::pre_write(o, map),)*
                }
            }

            pub fn child_ids(&self) -> Vec<ObjectId> {
                match self {
                    $(DwgObject::$variant(o) => o.child_ids(),)*
                }
            }
        }

        $(
            impl ObjectVariant for $ty {
                fn from_object(object: &DwgObject) -> Option<&Self> {
                    match object {
                        DwgObject::$variant(o) => Some(o),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }

                fn from_object_mut(object: &mut DwgObject) -> Option<&mut Self> {
                    match object {
                        DwgObject::$variant(o) => Some(o),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }

                fn into_object(self) -> DwgObject {
                    DwgObject::$variant(self)
                }
            }

            impl From<$ty> for DwgObject {
                fn from(value: $ty) -> Self {
                    DwgObject::$variant(value)
                }
            }
        )*
    };
}

dwg_objects! {
    Block(Block) = Block,
    EndBlock(EndBlock) = EndBlock,
    SeqEnd(SeqEnd) = SeqEnd,
    Vertex2D(Vertex2D) = Vertex2D,
    Polyline2D(Polyline2D) = Polyline2D,
    Arc(Arc) = Arc,
    Circle(Circle) = Circle,
    Line(Line) = Line,
    BlockControl(BlockControl) = BlockControl,
    BlockHeader(BlockHeader) = BlockHeader,
    LayerControl(LayerControl) = LayerControl,
    Layer(Layer) = Layer,
    StyleControl(StyleControl) = StyleControl,
    Style(Style) = Style,
    LineTypeControl(LineTypeControl) = LineTypeControl,
    LineType(LineType) = LineType,
    DimStyleControl(DimStyleControl) = DimStyleControl,
    DimStyle(DimStyle) = DimStyle,
}

impl DwgObject {
    pub fn handle(&self) -> Handle {
        self.common().handle
    }

    /// Typed view of this object.
    pub fn as_kind<T: ObjectKind>(&self) -> Option<&T> {
        T::from_object(self)
    }

    pub fn as_kind_mut<T: ObjectKind>(&mut self) -> Option<&mut T> {
        T::from_object_mut(self)
    }

    /// Name of a table entry.
    pub fn entry_name(&self) -> Option<&str> {
        self.table_entry().map(|e| e.name.as_str())
    }
}

/// Owner of every object of a drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectArena {
    items: Vec<DwgObject>,
}

impl ObjectArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_items(items: Vec<DwgObject>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, object: impl Into<DwgObject>) -> ObjectId {
        let id = ObjectId(self.items.len());
        self.items.push(object.into());
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&DwgObject> {
        self.items.get(id.0)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut DwgObject> {
        self.items.get_mut(id.0)
    }

    pub fn get_as<T: ObjectKind>(&self, id: ObjectId) -> Option<&T> {
        self.get(id).and_then(T::from_object)
    }

    pub fn get_as_mut<T: ObjectKind>(&mut self, id: ObjectId) -> Option<&mut T> {
        self.get_mut(id).and_then(T::from_object_mut)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &DwgObject)> {
        self.items.iter().enumerate().map(|(i, o)| (ObjectId(i), o))
    }

    /// Id of the object carrying `handle`, if any.
    pub fn find_handle(&self, handle: Handle) -> Option<ObjectId> {
        if handle.is_null() {
            return None;
        }
        self.iter().find(|(_, o)| o.handle() == handle).map(|(id, _)| id)
    }
}
