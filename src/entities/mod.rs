//! Drawable entity types
//!
//! Each entity embeds an [`EntityCommon`](crate::objects::EntityCommon) block and stores its geometry as
//! plain values. No geometric computation happens here.

/// Accessors every entity shares, expanded inside its `ObjectKind` impl.
macro_rules! entity_accessors {
    () => {
        fn common(&self) -> &$crate::objects::ObjectCommon {
            &self.entity.common
        }

        fn common_mut(&mut self) -> &mut $crate::objects::ObjectCommon {
            &mut self.entity.common
        }

        fn entity(&self) -> Option<&$crate::objects::EntityCommon> {
            Some(&self.entity)
        }

        fn entity_mut(&mut self) -> Option<&mut $crate::objects::EntityCommon> {
            Some(&mut self.entity)
        }
    };
}

pub mod arc;
pub mod block;
pub mod circle;
pub mod line;
pub mod polyline;
pub mod seqend;

pub use arc::Arc;
pub use block::{Block, EndBlock};
pub use circle::Circle;
pub use line::Line;
pub use polyline::{Polyline2D, PolylineFlags, SmoothSurfaceType, Vertex2D, VertexFlags};
pub use seqend::SeqEnd;
