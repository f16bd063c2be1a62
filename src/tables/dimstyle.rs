//! Dimension variables and the dimension style table entry

use crate::error::{DwgError, Result};
use crate::io::dwg::field_io::FieldIo;
use crate::io::dwg::object_type::DwgObjectType;
use crate::io::dwg::reader::ObjectCache;
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::io::dwg::writer::ObjectMap;
use crate::objects::{ObjectCommon, ObjectId, ObjectKind, TableEntryData};
use crate::tables::Style;
use crate::types::Color;

/// The DIM* variables, stored by the header and by every dimension style
/// in the same order.
///
/// The wire layout is split in three segments; the header places its
/// dimension handles between them.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionVariables {
    /// DIMPOST
    pub post: String,
    /// DIMAPOST
    pub alt_post: String,
    /// DIMTOL
    pub tolerance: bool,
    /// DIMLIM
    pub limits: bool,
    /// DIMTIH
    pub text_inside_horizontal: bool,
    /// DIMTOH
    pub text_outside_horizontal: bool,
    /// DIMSE1
    pub suppress_ext1: bool,
    /// DIMSE2
    pub suppress_ext2: bool,
    /// DIMALT
    pub alternate_units: bool,
    /// DIMTOFL
    pub force_line_inside: bool,
    /// DIMSAH
    pub separate_arrows: bool,
    /// DIMTIX
    pub force_text_inside: bool,
    /// DIMSOXD
    pub suppress_outside_ext: bool,
    /// DIMALTD
    pub alt_decimal_places: i16,
    /// DIMZIN
    pub zero_suppression: i16,
    /// DIMSD1
    pub suppress_line1: bool,
    /// DIMSD2
    pub suppress_line2: bool,
    /// DIMTOLJ
    pub tolerance_justification: i16,
    /// DIMJUST
    pub horizontal_justification: i16,
    /// DIMFIT (R13-R14), DIMATFIT (R2000)
    pub fit: i16,
    /// DIMUPT
    pub user_positioned_text: bool,
    /// DIMTZIN
    pub tolerance_zero_suppression: i16,
    /// DIMALTZ
    pub alt_zero_suppression: i16,
    /// DIMALTTZ
    pub alt_tolerance_zero_suppression: i16,
    /// DIMTAD
    pub text_above: i16,
    /// DIMUNIT (R13-R14)
    pub unit: i16,
    /// DIMAUNIT
    pub angular_units: i16,
    /// DIMADEC (R2000)
    pub angular_decimal_places: i16,
    /// DIMDEC
    pub decimal_places: i16,
    /// DIMTDEC
    pub tolerance_decimal_places: i16,
    /// DIMALTU
    pub alt_units_format: i16,
    /// DIMALTTD
    pub alt_tolerance_decimal_places: i16,
    /// DIMSCALE
    pub scale: f64,
    /// DIMASZ
    pub arrow_size: f64,
    /// DIMEXO
    pub ext_line_offset: f64,
    /// DIMDLI
    pub line_increment: f64,
    /// DIMEXE
    pub ext_line_extension: f64,
    /// DIMRND
    pub rounding: f64,
    /// DIMDLE
    pub line_extension: f64,
    /// DIMTP
    pub tolerance_plus: f64,
    /// DIMTM
    pub tolerance_minus: f64,
    /// DIMAZIN (R2000)
    pub angular_zero_suppression: i16,
    /// DIMTXT
    pub text_height: f64,
    /// DIMCEN
    pub center_mark: f64,
    /// DIMTSZ
    pub tick_size: f64,
    /// DIMALTF
    pub alt_scale: f64,
    /// DIMLFAC
    pub linear_scale: f64,
    /// DIMTVP
    pub text_vertical_pos: f64,
    /// DIMTFAC
    pub tolerance_scale: f64,
    /// DIMGAP
    pub line_gap: f64,
    /// DIMBLK (R13-R14 name)
    pub arrow_block: String,
    /// DIMBLK1 (R13-R14 name)
    pub arrow_block1: String,
    /// DIMBLK2 (R13-R14 name)
    pub arrow_block2: String,
    /// DIMALTRND (R2000)
    pub alt_rounding: f64,
    /// DIMCLRD
    pub line_color: Color,
    /// DIMCLRE
    pub ext_line_color: Color,
    /// DIMCLRT
    pub text_color: Color,
    /// DIMFRAC (R2000)
    pub fraction_format: i16,
    /// DIMLUNIT (R2000)
    pub linear_unit_format: i16,
    /// DIMDSEP (R2000)
    pub decimal_separator: i16,
    /// DIMTMOVE (R2000)
    pub text_movement: i16,
    /// DIMLWD (R2000)
    pub line_weight: i16,
    /// DIMLWE (R2000)
    pub ext_line_weight: i16,
}

impl Default for DimensionVariables {
    fn default() -> Self {
        Self {
            post: String::new(),
            alt_post: String::new(),
            tolerance: false,
            limits: false,
            text_inside_horizontal: true,
            text_outside_horizontal: true,
            suppress_ext1: false,
            suppress_ext2: false,
            alternate_units: false,
            force_line_inside: false,
            separate_arrows: false,
            force_text_inside: false,
            suppress_outside_ext: false,
            alt_decimal_places: 2,
            zero_suppression: 0,
            suppress_line1: false,
            suppress_line2: false,
            tolerance_justification: 1,
            horizontal_justification: 0,
            fit: 3,
            user_positioned_text: false,
            tolerance_zero_suppression: 0,
            alt_zero_suppression: 0,
            alt_tolerance_zero_suppression: 0,
            text_above: 0,
            unit: 2,
            angular_units: 0,
            angular_decimal_places: 0,
            decimal_places: 4,
            tolerance_decimal_places: 4,
            alt_units_format: 2,
            alt_tolerance_decimal_places: 2,
            scale: 1.0,
            arrow_size: 0.18,
            ext_line_offset: 0.0625,
            line_increment: 0.38,
            ext_line_extension: 0.18,
            rounding: 0.0,
            line_extension: 0.0,
            tolerance_plus: 0.0,
            tolerance_minus: 0.0,
            angular_zero_suppression: 0,
            text_height: 0.18,
            center_mark: 0.09,
            tick_size: 0.0,
            alt_scale: 25.4,
            linear_scale: 1.0,
            text_vertical_pos: 0.0,
            tolerance_scale: 1.0,
            line_gap: 0.09,
            arrow_block: String::new(),
            arrow_block1: String::new(),
            arrow_block2: String::new(),
            alt_rounding: 0.0,
            line_color: Color::BY_BLOCK,
            ext_line_color: Color::BY_BLOCK,
            text_color: Color::BY_BLOCK,
            fraction_format: 0,
            linear_unit_format: 2,
            decimal_separator: b'.' as i16,
            text_movement: 0,
            line_weight: -2,
            ext_line_weight: -2,
        }
    }
}

impl DimensionVariables {
    /// R2000 postfixes, then the R13-R14 flag block.
    pub(crate) fn visit_leading<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        let sio = io.sio();

        if sio.r2000_plus {
            io.text(&mut self.post)?;
            io.text(&mut self.alt_post)?;
        }

        if sio.r13_14_only {
            io.bit(&mut self.tolerance)?;
            io.bit(&mut self.limits)?;
            io.bit(&mut self.text_inside_horizontal)?;
            io.bit(&mut self.text_outside_horizontal)?;
            io.bit(&mut self.suppress_ext1)?;
            io.bit(&mut self.suppress_ext2)?;
            io.bit(&mut self.alternate_units)?;
            io.bit(&mut self.force_line_inside)?;
            io.bit(&mut self.separate_arrows)?;
            io.bit(&mut self.force_text_inside)?;
            io.bit(&mut self.suppress_outside_ext)?;
            io.raw_char_short(&mut self.alt_decimal_places)?;
            io.raw_char_short(&mut self.zero_suppression)?;
            io.bit(&mut self.suppress_line1)?;
            io.bit(&mut self.suppress_line2)?;
            io.raw_char_short(&mut self.tolerance_justification)?;
            io.raw_char_short(&mut self.horizontal_justification)?;
            io.raw_char_short(&mut self.fit)?;
            io.bit(&mut self.user_positioned_text)?;
            io.raw_char_short(&mut self.tolerance_zero_suppression)?;
            io.raw_char_short(&mut self.alt_zero_suppression)?;
            io.raw_char_short(&mut self.alt_tolerance_zero_suppression)?;
            io.raw_char_short(&mut self.text_above)?;
            io.bit_short(&mut self.unit)?;
            io.bit_short(&mut self.angular_units)?;
            io.bit_short(&mut self.decimal_places)?;
            io.bit_short(&mut self.tolerance_decimal_places)?;
            io.bit_short(&mut self.alt_units_format)?;
            io.bit_short(&mut self.alt_tolerance_decimal_places)?;
        }
        Ok(())
    }

    /// Sizes, scales, block names and colors, up to DIMFIT on R2000.
    pub(crate) fn visit_body<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        let sio = io.sio();

        io.bit_double(&mut self.scale)?;
        io.bit_double(&mut self.arrow_size)?;
        io.bit_double(&mut self.ext_line_offset)?;
        io.bit_double(&mut self.line_increment)?;
        io.bit_double(&mut self.ext_line_extension)?;
        io.bit_double(&mut self.rounding)?;
        io.bit_double(&mut self.line_extension)?;
        io.bit_double(&mut self.tolerance_plus)?;
        io.bit_double(&mut self.tolerance_minus)?;

        if sio.r2000_plus {
            io.bit(&mut self.tolerance)?;
            io.bit(&mut self.limits)?;
            io.bit(&mut self.text_inside_horizontal)?;
            io.bit(&mut self.text_outside_horizontal)?;
            io.bit(&mut self.suppress_ext1)?;
            io.bit(&mut self.suppress_ext2)?;
            io.bit_short(&mut self.text_above)?;
            io.bit_short(&mut self.zero_suppression)?;
            io.bit_short(&mut self.angular_zero_suppression)?;
        }

        io.bit_double(&mut self.text_height)?;
        io.bit_double(&mut self.center_mark)?;
        io.bit_double(&mut self.tick_size)?;
        io.bit_double(&mut self.alt_scale)?;
        io.bit_double(&mut self.linear_scale)?;
        io.bit_double(&mut self.text_vertical_pos)?;
        io.bit_double(&mut self.tolerance_scale)?;
        io.bit_double(&mut self.line_gap)?;

        if sio.r13_14_only {
            io.text(&mut self.post)?;
            io.text(&mut self.alt_post)?;
            io.text(&mut self.arrow_block)?;
            io.text(&mut self.arrow_block1)?;
            io.text(&mut self.arrow_block2)?;
        }

        if sio.r2000_plus {
            io.bit_double(&mut self.alt_rounding)?;
            io.bit(&mut self.alternate_units)?;
            io.bit_short(&mut self.alt_decimal_places)?;
            io.bit(&mut self.force_line_inside)?;
            io.bit(&mut self.separate_arrows)?;
            io.bit(&mut self.force_text_inside)?;
            io.bit(&mut self.suppress_outside_ext)?;
        }

        io.color(&mut self.line_color)?;
        io.color(&mut self.ext_line_color)?;
        io.color(&mut self.text_color)?;

        if sio.r2000_plus {
            io.bit_short(&mut self.angular_decimal_places)?;
            io.bit_short(&mut self.decimal_places)?;
            io.bit_short(&mut self.tolerance_decimal_places)?;
            io.bit_short(&mut self.alt_units_format)?;
            io.bit_short(&mut self.alt_tolerance_decimal_places)?;
            io.bit_short(&mut self.angular_units)?;
            io.bit_short(&mut self.fraction_format)?;
            io.bit_short(&mut self.linear_unit_format)?;
            io.bit_short(&mut self.decimal_separator)?;
            io.bit_short(&mut self.text_movement)?;
            io.bit_short(&mut self.horizontal_justification)?;
            io.bit(&mut self.suppress_line1)?;
            io.bit(&mut self.suppress_line2)?;
            io.bit_short(&mut self.tolerance_justification)?;
            io.bit_short(&mut self.tolerance_zero_suppression)?;
            io.bit_short(&mut self.alt_zero_suppression)?;
            io.bit_short(&mut self.alt_tolerance_zero_suppression)?;
            io.bit(&mut self.user_positioned_text)?;
            io.bit_short(&mut self.fit)?;
        }

        Ok(())
    }

    pub(crate) fn visit_line_weights<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        if io.sio().r2000_plus {
            io.bit_short(&mut self.line_weight)?;
            io.bit_short(&mut self.ext_line_weight)?;
        }
        Ok(())
    }

    pub(crate) fn visit<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        self.visit_leading(io)?;
        self.visit_body(io)?;
        self.visit_line_weights(io)
    }
}

/// A dimension style table entry
#[derive(Debug, Clone, PartialEq)]
pub struct DimStyle {
    pub common: ObjectCommon,
    pub entry: TableEntryData,
    pub dimension: DimensionVariables,

    /// DIMTXSTY as stored
    pub text_style_handle: HandleReference,
    /// DIMLDRBLK, R2000
    pub leader_block: HandleReference,
    /// DIMBLK, R2000
    pub arrow_block: HandleReference,
    /// DIMBLK1, R2000
    pub arrow_block1: HandleReference,
    /// DIMBLK2, R2000
    pub arrow_block2: HandleReference,

    pub text_style: Option<ObjectId>,
}

impl DimStyle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            entry: TableEntryData::new(name),
            ..Default::default()
        }
    }

    /// The "STANDARD" style using `text_style`.
    pub fn standard(text_style: ObjectId) -> Self {
        Self {
            text_style: Some(text_style),
            ..Self::new("STANDARD")
        }
    }
}

impl Default for DimStyle {
    fn default() -> Self {
        Self {
            common: ObjectCommon::default(),
            entry: TableEntryData::default(),
            dimension: DimensionVariables::default(),
            text_style_handle: HandleReference::null_of(DwgReferenceType::SoftOwner),
            leader_block: HandleReference::null_of(DwgReferenceType::HardPointer),
            arrow_block: HandleReference::null_of(DwgReferenceType::HardPointer),
            arrow_block1: HandleReference::null_of(DwgReferenceType::HardPointer),
            arrow_block2: HandleReference::null_of(DwgReferenceType::HardPointer),
            text_style: None,
        }
    }
}

impl ObjectKind for DimStyle {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::DimStyle;

    table_entry_accessors!();

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        self.entry.visit_prefix(io)?;
        self.dimension.visit(io)
    }

    fn post_data<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        self.entry.visit_xref_block(io)?;
        io.handle(&mut self.text_style_handle)?;
        if io.sio().r2000_plus {
            io.handle(&mut self.leader_block)?;
            io.handle(&mut self.arrow_block)?;
            io.handle(&mut self.arrow_block1)?;
            io.handle(&mut self.arrow_block2)?;
        }
        Ok(())
    }

    fn pose_parse(&mut self, _id: ObjectId, _cache: &mut ObjectCache<'_>) -> Result<()> {
        if self.text_style_handle.code != DwgReferenceType::SoftOwner {
            return Err(DwgError::malformed(
                self.common.handle,
                "incorrect text style handle code",
            ));
        }
        Ok(())
    }

    fn after_read(&mut self, _id: ObjectId, cache: &mut ObjectCache<'_>) -> Result<()> {
        let handle = self.common.handle;
        let style = self.text_style_handle.resolve_next(handle);
        self.text_style = if style.is_null() {
            None
        } else {
            Some(cache.get_object::<Style>(style, handle)?)
        };
        Ok(())
    }

    fn pre_write(&mut self, map: &ObjectMap) -> Result<()> {
        self.text_style_handle = map.reference(DwgReferenceType::SoftOwner, self.text_style)?;
        Ok(())
    }

    fn child_ids(&self) -> Vec<ObjectId> {
        self.text_style.into_iter().collect()
    }
}
