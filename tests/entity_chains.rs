//! Entity chains: block entity lists and polyline vertex lists.

mod common;

use common::*;
use dwgcodec::entities::{Circle, Line, Polyline2D, Vertex2D};
use dwgcodec::io::dwg::DwgReferenceType;
use dwgcodec::tables::BlockHeader;
use dwgcodec::types::{DwgVersion, Vector3};
use dwgcodec::{Drawing, ObjectId};

fn polyline_drawing(version: DwgVersion, count: usize) -> Drawing {
    let mut drawing = Drawing::new(version);
    drawing
        .add_polyline_2d(Polyline2D::new(), vertices_along_x(count))
        .unwrap();
    drawing
}

fn vertex_x(drawing: &Drawing, polyline: &Polyline2D) -> Vec<f64> {
    let points: Vec<Vector3> = polyline
        .vertices
        .iter()
        .map(|id| drawing.get::<Vertex2D>(id).unwrap().location)
        .collect();
    point_x(&points)
}

#[test]
fn test_empty_polyline() {
    for version in ALL_VERSIONS {
        let read = round_trip(&polyline_drawing(version, 0));
        let (_, polyline) = single::<Polyline2D>(&read);
        assert!(polyline.vertices.is_empty());
        assert!(polyline.seq_end.is_some());

        let handle = polyline.entity.common.handle;
        assert!(polyline.first_vertex_handle.points_to_null(handle));
        assert!(polyline.last_vertex_handle.points_to_null(handle));
        assert_eq!(polyline.first_vertex_handle.code, DwgReferenceType::HardPointer);
    }
}

#[test]
fn test_single_vertex() {
    for version in ALL_VERSIONS {
        let read = round_trip(&polyline_drawing(version, 1));
        let (_, polyline) = single::<Polyline2D>(&read);
        assert_eq!(vertex_x(&read, polyline), [0.0]);
        assert_eq!(polyline.first_vertex_handle, polyline.last_vertex_handle);
    }
}

#[test]
fn test_three_vertices_keep_order() {
    for version in ALL_VERSIONS {
        let read = round_trip(&polyline_drawing(version, 3));
        let (_, polyline) = single::<Polyline2D>(&read);
        assert_eq!(vertex_x(&read, polyline), [0.0, 1.0, 2.0]);

        let ids: Vec<ObjectId> = polyline.vertices.iter().collect();
        let first = read.get::<Vertex2D>(ids[0]).unwrap();
        let middle = read.get::<Vertex2D>(ids[1]).unwrap();
        let last = read.get::<Vertex2D>(ids[2]).unwrap();
        assert_eq!(
            first.entity.next_entity.resolve_next(first.entity.common.handle),
            handle_of(&read, ids[1])
        );
        assert_eq!(
            middle.entity.prev_entity.resolve_next(middle.entity.common.handle),
            handle_of(&read, ids[0])
        );
        assert!(last.entity.next_entity.points_to_null(last.entity.common.handle));

        // The middle vertex sits between its neighbors' handles, so its
        // links are implied rather than stored
        assert!(middle.entity.no_links);
        assert!(!first.entity.no_links);
        assert!(!last.entity.no_links);
    }
}

#[test]
fn test_removing_middle_vertex_restitches() {
    for version in ALL_VERSIONS {
        let mut drawing = round_trip(&polyline_drawing(version, 3));
        let (polyline_id, polyline) = single::<Polyline2D>(&drawing);
        let middle = polyline.vertices.iter().nth(1).unwrap();

        drawing
            .get_mut::<Polyline2D>(polyline_id)
            .unwrap()
            .vertices
            .remove(middle);
        let read = round_trip(&drawing);

        let (_, polyline) = single::<Polyline2D>(&read);
        assert_eq!(vertex_x(&read, polyline), [0.0, 2.0]);
        let ids: Vec<ObjectId> = polyline.vertices.iter().collect();
        let first = read.get::<Vertex2D>(ids[0]).unwrap();
        assert_eq!(
            first.entity.next_entity.resolve_next(first.entity.common.handle),
            handle_of(&read, ids[1])
        );

        // The removed vertex is not written at all
        let (_, map) = object_map(&read.to_bytes().unwrap());
        assert_eq!(map.len(), read.objects.len());
    }
}

#[test]
fn test_block_chain_restitches_after_removal() {
    for version in ALL_VERSIONS {
        let mut drawing = Drawing::new(version);
        let model_space = drawing.model_space().unwrap();
        let ids: Vec<ObjectId> = (0..3)
            .map(|i| {
                let x = i as f64;
                drawing
                    .add_entity_to_model_space(Line::from_coords(x, 0.0, 0.0, x, 1.0, 0.0))
                    .unwrap()
            })
            .collect();
        assert!(drawing.remove_entity(model_space, ids[1]));
        assert!(!drawing.remove_entity(model_space, ids[1]));

        let read = round_trip(&drawing);
        let entities = model_space_entities(&read);
        let starts: Vec<f64> = entities
            .iter()
            .map(|&id| read.get::<Line>(id).unwrap().start.x)
            .collect();
        assert_eq!(starts, [0.0, 2.0]);

        let header = read.get::<BlockHeader>(read.model_space().unwrap()).unwrap();
        let owner = header.common.handle;
        assert_eq!(header.first_entity_handle.resolve_next(owner), handle_of(&read, entities[0]));
        assert_eq!(header.last_entity_handle.resolve_next(owner), handle_of(&read, entities[1]));
    }
}

#[test]
fn test_model_space_entity_mode() {
    let mut drawing = Drawing::new(DwgVersion::AC1015);
    drawing
        .add_entity_to_model_space(Circle::from_center_radius(Vector3::ZERO, 1.0))
        .unwrap();
    let paper_space = drawing.paper_space().unwrap();
    drawing
        .add_entity_to_block(paper_space, Circle::from_center_radius(Vector3::ZERO, 2.0))
        .unwrap();
    let block = drawing.add_block("PART").unwrap();
    drawing
        .add_entity_to_block(block, Circle::from_center_radius(Vector3::ZERO, 3.0))
        .unwrap();

    let read = round_trip(&drawing);
    let mode_of = |block: ObjectId| -> Vec<u8> {
        read.block_entities(block)
            .into_iter()
            .map(|id| read.get::<Circle>(id).unwrap().entity.entity_mode)
            .collect()
    };
    assert_eq!(mode_of(read.model_space().unwrap()), [2]);
    assert_eq!(mode_of(read.paper_space().unwrap()), [1]);
    assert_eq!(mode_of(read.block_by_name("PART").unwrap()), [0]);
}
