//! Shared test utilities for dwgcodec integration tests.
//!
//! Builds populated drawings, saves and reopens them, and patches saved
//! file images in place (object records and the object map) so corrupted
//! inputs can be produced from valid ones.

#![allow(dead_code)]

use std::collections::BTreeMap;

use byteorder::{ByteOrder, LittleEndian};
use dwgcodec::entities::{Arc, Circle, Line, Polyline2D, Vertex2D};
use dwgcodec::io::dwg::constants::section_names;
use dwgcodec::io::dwg::crc;
use dwgcodec::io::dwg::reader::{DwgHandleReader, DwgStreamReader};
use dwgcodec::io::dwg::writer::DwgHandleWriter;
use dwgcodec::io::dwg::DwgFileHeader;
use dwgcodec::tables::{DimStyle, Layer, LineType, LineTypeDash, Style};
use dwgcodec::types::{Color, DwgVersion, Handle, Vector3};
use dwgcodec::{Drawing, ObjectId, ObjectKind};

/// Every version the codec handles, oldest first.
pub const ALL_VERSIONS: [DwgVersion; 3] = DwgVersion::ALL;

// ===========================================================================
// Drawing builders
// ===========================================================================

/// A drawing holding at least one object of every supported type.
pub fn populated_drawing(version: DwgVersion) -> Drawing {
    let mut drawing = Drawing::new(version);

    let mut dashed = LineType::new("DASHED");
    dashed.description = "Dashed __ __ __".to_string();
    dashed.pattern_length = 0.75;
    dashed.dashes = vec![LineTypeDash::new(0.5), LineTypeDash::new(-0.25)];
    let dashed = drawing.add_table_entry(dashed).unwrap();

    let mut walls = Layer::new("WALLS");
    walls.color = Color::RED;
    walls.line_type = Some(dashed);
    walls.set_locked(true);
    let walls = drawing.add_table_entry(walls).unwrap();

    let mut notes = Style::new("NOTES");
    notes.height = 2.5;
    notes.width_factor = 0.8;
    notes.font_file = "romans.shx".to_string();
    let notes = drawing.add_table_entry(notes).unwrap();

    let mut dims = DimStyle::new("DIMS");
    dims.text_style = Some(notes);
    dims.dimension.arrow_size = 0.25;
    dims.dimension.text_height = 0.2;
    dims.dimension.post = "mm".to_string();
    drawing.add_table_entry(dims).unwrap();

    let mut line = Line::from_coords(0.0, 0.0, 0.0, 10.0, 5.0, 0.0);
    line.entity.layer = Some(walls);
    drawing.add_entity_to_model_space(line).unwrap();

    let mut circle = Circle::from_center_radius(Vector3::new(3.0, 4.0, 0.0), 1.5);
    circle.entity.color = Color::BLUE;
    drawing.add_entity_to_model_space(circle).unwrap();

    drawing
        .add_entity_to_model_space(Arc::from_center_radius_angles(
            Vector3::new(-2.0, 1.0, 0.0),
            4.0,
            0.25,
            2.5,
        ))
        .unwrap();

    let mut polyline = Polyline2D::new();
    polyline.set_closed(true);
    polyline.start_width = 0.1;
    polyline.end_width = 0.1;
    drawing
        .add_polyline_2d(polyline, square_vertices())
        .unwrap();

    let door = drawing.add_block("DOOR").unwrap();
    drawing
        .add_entity_to_block(door, Line::from_coords(0.0, 0.0, 0.0, 0.0, 2.1, 0.0))
        .unwrap();
    drawing
        .add_entity_to_block(
            door,
            Arc::from_center_radius_angles(Vector3::ZERO, 0.9, 0.0, std::f64::consts::FRAC_PI_2),
        )
        .unwrap();

    drawing
}

pub fn square_vertices() -> Vec<Vertex2D> {
    vec![
        Vertex2D::new(Vector3::new(0.0, 0.0, 0.0)),
        Vertex2D::with_bulge(Vector3::new(4.0, 0.0, 0.0), 0.5),
        Vertex2D::new(Vector3::new(4.0, 4.0, 0.0)),
        Vertex2D::new(Vector3::new(0.0, 4.0, 0.0)),
    ]
}

/// Vertices at x = 0, 1, 2, ... on the X axis.
pub fn vertices_along_x(count: usize) -> Vec<Vertex2D> {
    (0..count)
        .map(|i| Vertex2D::new(Vector3::new(i as f64, 0.0, 0.0)))
        .collect()
}

// ===========================================================================
// Save and reopen
// ===========================================================================

pub fn round_trip(drawing: &Drawing) -> Drawing {
    let bytes = drawing.to_bytes().expect("save failed");
    Drawing::open(&bytes).expect("reopen failed")
}

/// Entities of the model space block, in chain order.
pub fn model_space_entities(drawing: &Drawing) -> Vec<ObjectId> {
    drawing.block_entities(drawing.model_space().expect("no model space"))
}

/// The only model space entity of type `T`.
pub fn single<T: ObjectKind>(drawing: &Drawing) -> (ObjectId, &T) {
    let mut found = model_space_entities(drawing)
        .into_iter()
        .filter_map(|id| drawing.get::<T>(id).map(|object| (id, object)));
    let first = found.next().expect("no entity of the requested type");
    assert!(found.next().is_none(), "more than one entity of the requested type");
    first
}

pub fn handle_of(drawing: &Drawing, id: ObjectId) -> Handle {
    drawing.objects.get(id).expect("unknown object").handle()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "expected {}, got {}",
        expected,
        actual
    );
}

pub fn point_x(points: &[Vector3]) -> Vec<f64> {
    points.iter().map(|p| p.x).collect()
}

// ===========================================================================
// File image surgery
// ===========================================================================

/// The parsed file header and the object map of a saved file.
pub fn object_map(bytes: &[u8]) -> (DwgFileHeader, BTreeMap<Handle, u64>) {
    let (header, _) = DwgFileHeader::read(bytes, false).unwrap();
    let locator = header.require_locator(section_names::HANDLES).unwrap();
    let offsets = DwgHandleReader::new(header.version, &bytes[locator.range()])
        .read()
        .unwrap();
    (header, offsets)
}

/// Let `edit` change the data of the record at `offset`, then repair the
/// record CRC so only the edit itself is visible to a reader.
pub fn patch_record<F>(bytes: &mut [u8], version: DwgVersion, offset: u64, edit: F)
where
    F: FnOnce(&mut [u8]),
{
    let start = offset as usize;
    let mut prefix = DwgStreamReader::new_at(bytes, version, start);
    let size = prefix.read_modular_short().unwrap() as usize;
    let data_start = prefix.position();
    let data_end = data_start + size;

    edit(&mut bytes[data_start..data_end]);

    let crc = crc::checksum(&bytes[start..data_end]);
    LittleEndian::write_u16(&mut bytes[data_end..data_end + 2], crc);
}

/// Replace a one-byte type tag (`01` + RC) at the start of a record's data.
pub fn set_type_tag(data: &mut [u8], object_type: u8) {
    assert_eq!(data[0] >> 6, 0b01, "record does not start with a one-byte tag");
    data[0] = 0x40 | (object_type >> 2);
    data[1] = (data[1] & 0x3F) | ((object_type & 0x03) << 6);
}

/// Overwrite `count` bits of `data` starting at bit `position`, most
/// significant bit first.
pub fn set_bits(data: &mut [u8], position: u64, value: u8, count: u8) {
    for i in 0..count as u64 {
        let bit = (value >> (count as u64 - 1 - i)) & 1;
        let at = position + i;
        let mask = 0x80u8 >> (at % 8);
        if bit == 1 {
            data[(at / 8) as usize] |= mask;
        } else {
            data[(at / 8) as usize] &= !mask;
        }
    }
}

/// Bit position of the layer reference in an R2000 model space entity
/// record: past the extension dictionary at the start of the handle section.
pub fn r2000_layer_reference_at(data: &[u8]) -> u64 {
    let mut reader = DwgStreamReader::new(data, DwgVersion::AC1015);
    reader.read_bit_short().unwrap();
    let handles_at = reader.read_raw_long().unwrap() as u64;
    while reader.position_in_bits() < handles_at {
        reader.read_bit().unwrap();
    }
    reader.read_handle_reference().unwrap();
    reader.position_in_bits()
}

/// Rebuild a saved file with its object map changed by `edit`.
pub fn rewrite_object_map<F>(bytes: &[u8], edit: F) -> Vec<u8>
where
    F: FnOnce(&mut BTreeMap<Handle, u64>),
{
    let (mut header, mut offsets) = object_map(bytes);
    edit(&mut offsets);

    let locator = header.require_locator(section_names::HANDLES).unwrap();
    let table = DwgHandleWriter::new(header.version).write(&offsets).unwrap();
    header.set_locator(section_names::HANDLES, locator.seeker, table.len() as u32);

    let mut output = bytes[..locator.seeker as usize].to_vec();
    output.extend_from_slice(&table);
    let file_header = header.write().unwrap();
    output[..file_header.len()].copy_from_slice(&file_header);
    output
}
