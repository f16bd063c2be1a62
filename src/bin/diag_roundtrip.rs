//! Round-trip diagnostic: build a small drawing (or load the DWG given on
//! the command line), save it, reopen it and print what came back.
//!
//! Usage: diag_roundtrip [AC1012|AC1014|AC1015] [input.dwg]

use std::env;

use anyhow::{bail, Context, Result};
use dwgcodec::entities::{Arc, Circle, Line, Polyline2D, Vertex2D};
use dwgcodec::types::{DwgVersion, Vector3};
use dwgcodec::{BlockHeader, Drawing};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let version: DwgVersion = match args.next() {
        Some(tag) => tag.parse().with_context(|| format!("bad version {}", tag))?,
        None => DwgVersion::AC1015,
    };

    let drawing = match args.next() {
        Some(path) => Drawing::open_file(&path).with_context(|| format!("reading {}", path))?,
        None => sample(version)?,
    };
    println!("═══ source: {} ═══", drawing.version);
    dump(&drawing);

    let bytes = drawing.to_bytes().context("saving")?;
    println!("\nsaved {} bytes", bytes.len());

    let reopened = Drawing::open(&bytes).context("reopening")?;
    println!("\n═══ reopened: {} ═══", reopened.version);
    dump(&reopened);

    for notification in &reopened.notifications {
        println!("  ! {}", notification);
    }
    if reopened.objects.len() != drawing.objects.len() {
        bail!(
            "object count changed: {} written, {} read",
            drawing.objects.len(),
            reopened.objects.len()
        );
    }
    Ok(())
}

fn sample(version: DwgVersion) -> Result<Drawing> {
    let mut drawing = Drawing::new(version);
    drawing.add_entity_to_model_space(Line::from_coords(0.0, 0.0, 0.0, 10.0, 5.0, 0.0))?;
    drawing.add_entity_to_model_space(Circle::from_center_radius(Vector3::new(5.0, 5.0, 0.0), 2.5))?;
    drawing.add_entity_to_model_space(Arc::from_center_radius_angles(
        Vector3::ZERO,
        3.0,
        0.0,
        std::f64::consts::PI,
    ))?;
    drawing.add_polyline_2d(
        Polyline2D::new(),
        vec![
            Vertex2D::new(Vector3::new(0.0, 0.0, 0.0)),
            Vertex2D::new(Vector3::new(1.0, 2.0, 0.0)),
            Vertex2D::new(Vector3::new(3.0, 1.0, 0.0)),
        ],
    )?;
    Ok(drawing)
}

fn dump(drawing: &Drawing) {
    println!(
        "{} objects, handle seed {}",
        drawing.objects.len(),
        drawing.header.handle_seed
    );
    for (id, object) in drawing.objects.iter() {
        let owner = object
            .common()
            .owner
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>4} {:>6} {:<16} owner={:<4} {}",
            id,
            object.handle().to_string(),
            object.object_type().to_string(),
            owner,
            object.entry_name().unwrap_or("")
        );
    }

    let blocks = drawing
        .objects
        .get(drawing.block_control)
        .and_then(|control| control.table_entries());
    for (name, id) in blocks.into_iter().flat_map(|entries| entries.iter()) {
        if let Some(header) = drawing.get::<BlockHeader>(id) {
            println!("  block {:<16} {} entities", name, header.entities.len());
        }
    }
}
