//! Integration tests for component relations
//!
//! Tests a small boundary representation: two corners bound a line, the
//! line bounds two surfaces, and the surfaces are items of a model boundary.

use strata_foundation::{ErrorKind, Uuid, new_uuid};
use strata_model::{RelationKind, Relationships};

use crate::init_logging;

struct Brep {
    relationships: Relationships,
    corners: [Uuid; 2],
    line: Uuid,
    surfaces: [Uuid; 2],
    boundary: Uuid,
}

fn brep() -> Brep {
    let mut relationships = Relationships::new();
    let corners = [new_uuid(), new_uuid()];
    let line = new_uuid();
    let surfaces = [new_uuid(), new_uuid()];
    let boundary = new_uuid();
    for id in corners.iter().chain([&line]).chain(&surfaces).chain([&boundary]) {
        relationships.add_component(*id).unwrap();
    }
    for corner in &corners {
        relationships.add_boundary_relation(corner, &line).unwrap();
    }
    for surface in &surfaces {
        relationships.add_boundary_relation(&line, surface).unwrap();
        relationships.add_item_in_collection(surface, &boundary).unwrap();
    }
    Brep {
        relationships,
        corners,
        line,
        surfaces,
        boundary,
    }
}

#[test]
fn line_sees_both_sides() {
    let brep = brep();
    let boundaries: Vec<_> = brep.relationships.boundaries(&brep.line).unwrap().collect();
    let incidences: Vec<_> = brep.relationships.incidences(&brep.line).unwrap().collect();
    assert_eq!(boundaries, brep.corners.to_vec());
    assert_eq!(incidences, brep.surfaces.to_vec());
    assert_eq!(brep.relationships.nb_items(&brep.line).unwrap(), 0);
    assert_eq!(brep.relationships.nb_collections(&brep.line).unwrap(), 0);
}

#[test]
fn collection_lists_items() {
    let brep = brep();
    let items: Vec<_> = brep.relationships.items(&brep.boundary).unwrap().collect();
    assert_eq!(items, brep.surfaces.to_vec());
    for surface in &brep.surfaces {
        assert_eq!(
            brep.relationships.collections(surface).unwrap().collect::<Vec<_>>(),
            vec![brep.boundary]
        );
    }
}

#[test]
fn ranges_are_lazy_and_single_pass() {
    let brep = brep();
    let mut range = brep.relationships.incidences(&brep.line).unwrap();
    assert_eq!(range.next(), Some(brep.surfaces[0]));
    assert_eq!(range.next(), Some(brep.surfaces[1]));
    assert_eq!(range.next(), None);
    assert_eq!(range.next(), None);
}

#[test]
fn duplicate_relation_logs_and_continues() {
    init_logging();
    let mut brep = brep();
    let before = brep.relationships.nb_relations();
    brep.relationships
        .add_boundary_relation(&brep.corners[0], &brep.line)
        .unwrap();
    assert_eq!(brep.relationships.nb_relations(), before);
}

#[test]
fn removing_the_line_disconnects_corners_and_surfaces() {
    let mut brep = brep();
    brep.relationships.remove_component(&brep.line).unwrap();

    for corner in &brep.corners {
        assert_eq!(brep.relationships.nb_incidences(corner).unwrap(), 0);
    }
    for surface in &brep.surfaces {
        assert_eq!(brep.relationships.nb_boundaries(surface).unwrap(), 0);
        assert!(brep.relationships.is_item(surface, &brep.boundary).unwrap());
    }
    let err = brep.relationships.nb_boundaries(&brep.line).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ComponentNotFound(_)));
}

#[test]
fn relations_report_kinds() {
    let brep = brep();
    let relations = brep.relationships.relations(&brep.surfaces[0]).unwrap();
    assert_eq!(relations.len(), 2);
    assert_eq!(relations[0].kind, RelationKind::Boundary);
    assert_eq!(relations[0].from, brep.line);
    assert_eq!(relations[1].kind, RelationKind::Item);
    assert_eq!(relations[1].to, brep.boundary);
}

#[test]
fn corner_bounding_a_line_then_removed() {
    let mut relationships = Relationships::new();
    let corner = new_uuid();
    let line = new_uuid();
    relationships.add_component(corner).unwrap();
    relationships.add_component(line).unwrap();
    relationships.add_boundary_relation(&corner, &line).unwrap();

    assert_eq!(relationships.nb_boundaries(&line).unwrap(), 1);
    assert_eq!(relationships.boundaries(&line).unwrap().next(), Some(corner));

    relationships.remove_component(&corner).unwrap();
    assert_eq!(relationships.nb_boundaries(&line).unwrap(), 0);
    assert_eq!(relationships.nb_components(), 1);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn ranges(relationships: &Relationships, id: &Uuid) -> [Vec<Uuid>; 4] {
        [
            relationships.boundaries(id).unwrap().collect(),
            relationships.incidences(id).unwrap().collect(),
            relationships.items(id).unwrap().collect(),
            relationships.collections(id).unwrap().collect(),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn save_then_load_keeps_every_range(
            nb in 1usize..10,
            relations in prop::collection::vec((0usize..10, 0usize..10, any::<bool>()), 0..30),
            removals in prop::collection::vec(0usize..10, 0..4),
        ) {
            let mut relationships = Relationships::new();
            let ids: Vec<Uuid> = (0..nb).map(|_| new_uuid()).collect();
            for id in &ids {
                relationships.add_component(*id).unwrap();
            }
            for (from, to, boundary) in relations {
                let (from, to) = (&ids[from % nb], &ids[to % nb]);
                if boundary {
                    relationships.add_boundary_relation(from, to).unwrap();
                } else {
                    relationships.add_item_in_collection(from, to).unwrap();
                }
            }
            let mut removed = HashSet::new();
            for removal in removals {
                let id = ids[removal % nb];
                if removed.insert(id) {
                    relationships.remove_component(&id).unwrap();
                }
            }

            let dir = tempfile::tempdir().unwrap();
            relationships.save(dir.path()).unwrap();
            let mut loaded = Relationships::new();
            loaded.load(dir.path()).unwrap();

            prop_assert_eq!(loaded.nb_components(), relationships.nb_components());
            prop_assert_eq!(loaded.nb_relations(), relationships.nb_relations());
            for id in &ids {
                if removed.contains(id) {
                    prop_assert!(!loaded.has_component(id));
                } else {
                    prop_assert_eq!(ranges(&loaded, id), ranges(&relationships, id));
                }
            }
        }
    }
}
