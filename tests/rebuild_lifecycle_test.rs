use std::collections::HashSet;

use story_ngin::{
    Generation, Rebuild, Stage, Tick,
    camera::{CameraRig, RigSettings},
    compose,
    compose::SceneComposer,
    data_structures::{
        descriptor::{Color, NodeKind},
        instance::Instance,
        model::{MeshData, ModelVertex},
        scene_graph::{RealizedNode, RealizedSceneGraph, ResourceArena, realize},
    },
    dispose,
    render::RenderLoop,
    resources::{lifecycle::Released, primitives::mesh_for},
    surface::RenderSurface,
};

use crate::common::test_utils::{RecordingSurface, SurfaceEvent, analysis, knight_and_dragon};
mod common;

fn stage() -> Stage<RecordingSurface> {
    Stage::new(SceneComposer::default(), RigSettings::default())
}

fn assert_released_exactly_once(created: &[usize], released: &[usize]) {
    let unique: HashSet<_> = released.iter().collect();
    assert_eq!(unique.len(), released.len(), "a resource was released twice");
    let created: HashSet<_> = created.iter().collect();
    assert_eq!(created, unique);
}

#[test]
fn realize_clears_the_surface_before_allocating() {
    let mut surface = RecordingSurface::new(800, 600);
    let graph = realize(&compose(&knight_and_dragon()), &mut surface);

    assert_eq!(surface.events.first(), Some(&SurfaceEvent::Clear));
    assert_eq!(graph.nodes().len(), 5);
    assert_eq!(graph.arena().geometry_count(), 5);
    assert_eq!(graph.arena().material_count(), 5);
    assert_eq!(graph.lights().len(), 2);
    assert_eq!(surface.created_geometries().len(), 5);
}

#[test]
fn each_node_owns_its_own_geometry_and_material() {
    let mut surface = RecordingSurface::new(800, 600);
    let descriptor = compose(&knight_and_dragon());
    let graph = realize(&descriptor, &mut surface);

    let items = graph.draw_items();
    assert_eq!(items.len(), descriptor.nodes.len());
    for (item, spec) in items.iter().zip(&descriptor.nodes) {
        assert_eq!(item.geometry.label, spec.label);
        assert_eq!(item.materials.len(), 1);
        assert_eq!(item.materials[0].color, spec.color);
        assert_eq!(
            item.geometry.num_elements,
            mesh_for(&spec.geometry).num_elements()
        );
    }
    let knight = items[0].geometry.position;
    assert_eq!(knight, [-2.0, 0.0, 0.0]);
}

#[test]
fn dispose_releases_everything_a_graph_allocated() {
    let mut surface = RecordingSurface::new(800, 600);
    let graph = realize(&compose(&knight_and_dragon()), &mut surface);

    let released = dispose(graph, &mut surface);

    assert_eq!(
        released,
        Released {
            geometries: 5,
            materials: 5
        }
    );
    assert_released_exactly_once(&surface.created_geometries(), &surface.released_geometries());
    assert_released_exactly_once(&surface.created_materials(), &surface.released_materials());
}

#[test]
fn multi_material_nodes_release_every_material() {
    let mut surface = RecordingSurface::new(800, 600);
    let vertices = vec![
        ModelVertex {
            position: [0.0, 0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
        };
        6
    ];
    let mut mesh = MeshData::new(vertices, (0..6).collect());
    mesh.groups = vec![0..3, 3..6];
    assert_eq!(mesh.material_slots(), 2);

    let mut arena = ResourceArena::<RecordingSurface>::new();
    let geometry =
        arena.insert_geometry(surface.create_geometry("banner", &mesh, &Instance::new()));
    let materials = [0xff0000, 0x0000ff]
        .into_iter()
        .map(|hex| arena.insert_material(surface.create_material("banner", Color::from_hex(hex))))
        .collect();
    let node = RealizedNode::new(NodeKind::Object, "banner", Instance::new(), geometry, materials);
    let graph = RealizedSceneGraph::from_parts(vec![node], Vec::new(), arena);
    assert_eq!(graph.draw_items()[0].materials.len(), 2);

    let released = dispose(graph, &mut surface);

    assert_eq!(released.geometries, 1);
    assert_eq!(released.materials, 2);
    assert_released_exactly_once(&surface.created_materials(), &surface.released_materials());
}

#[test]
fn rebuild_releases_the_previous_scene_before_realizing_the_next() {
    let mut surface = RecordingSurface::new(800, 600);
    let mut stage = stage();

    let first = stage.rebuild("g1", &knight_and_dragon(), Some(&mut surface));
    assert_eq!(
        first,
        Rebuild::Realized {
            nodes: 5,
            released: Released::default()
        }
    );
    assert_eq!(stage.tick(&mut surface).ok(), Some(Tick::Rendered));
    let g1_geometries = surface.created_geometries();
    let g1_materials = surface.created_materials();
    surface.forget_events();

    let second = stage.rebuild(
        "g2",
        &analysis(&["wizard"], &[], "meadow", "calm"),
        Some(&mut surface),
    );
    assert_eq!(
        second,
        Rebuild::Realized {
            nodes: 2,
            released: Released {
                geometries: 5,
                materials: 5
            }
        }
    );
    assert_released_exactly_once(&g1_geometries, &surface.released_geometries());
    assert_released_exactly_once(&g1_materials, &surface.released_materials());

    // every release happens before the surface is cleared for the new graph
    let clear = surface
        .position_of(&SurfaceEvent::Clear)
        .expect("realize clears the surface");
    let last_release = surface
        .events
        .iter()
        .rposition(|event| {
            matches!(
                event,
                SurfaceEvent::ReleaseGeometry(_) | SurfaceEvent::ReleaseMaterial(_)
            )
        })
        .expect("g1 was released");
    assert!(last_release < clear);
    let first_create = surface
        .events
        .iter()
        .position(|event| matches!(event, SurfaceEvent::CreateGeometry { .. }))
        .expect("g2 was realized");
    assert!(clear < first_create);

    // the next tick draws only g2
    let g2_geometries: HashSet<_> = surface.created_geometries().into_iter().collect();
    assert_eq!(stage.tick(&mut surface).ok(), Some(Tick::Rendered));
    let draws = surface.draws();
    let (drawn, _) = draws.last().expect("one frame was drawn");
    assert_eq!(drawn.iter().copied().collect::<HashSet<_>>(), g2_geometries);
    assert!(drawn.iter().all(|id| !g1_geometries.contains(id)));
    assert_eq!(stage.scene_id(), Some("g2"));
}

#[test]
fn double_submission_leaves_a_single_live_loop() {
    let mut surface = RecordingSurface::new(800, 600);
    let mut stage = stage();

    stage.rebuild("g1", &knight_and_dragon(), Some(&mut surface));
    let first_handle = stage.handle().expect("g1 is live");
    let g1_geometries = surface.created_geometries();
    stage.rebuild("g2", &knight_and_dragon(), Some(&mut surface));
    let second_handle = stage.handle().expect("g2 is live");

    assert!(first_handle.is_cancelled());
    assert!(!second_handle.is_cancelled());
    // all of g1 and nothing of g2 has been released
    assert_released_exactly_once(&g1_geometries, &surface.released_geometries());

    // one frame per tick, never two loops drawing at once
    surface.forget_events();
    for _ in 0..3 {
        assert_eq!(stage.tick(&mut surface).ok(), Some(Tick::Rendered));
    }
    assert_eq!(surface.draws().len(), 3);
    assert_eq!(stage.frames(), 3);
    assert_eq!(stage.scene().map(|graph| graph.nodes().len()), Some(5));
}

#[test]
fn missing_surface_aborts_without_touching_the_live_scene() {
    let mut surface = RecordingSurface::new(800, 600);
    let mut stage = stage();
    stage.rebuild("g1", &knight_and_dragon(), Some(&mut surface));
    let handle = stage.handle().expect("g1 is live");
    surface.forget_events();

    assert_eq!(
        stage.rebuild("g2", &knight_and_dragon(), None),
        Rebuild::Aborted
    );
    let mut detached = RecordingSurface::detached();
    assert_eq!(
        stage.rebuild("g3", &knight_and_dragon(), Some(&mut detached)),
        Rebuild::Aborted
    );

    assert!(detached.events.is_empty());
    assert!(surface.events.is_empty());
    assert!(!handle.is_cancelled());
    assert_eq!(stage.scene_id(), Some("g1"));
    assert_eq!(stage.tick(&mut surface).ok(), Some(Tick::Rendered));
}

#[test]
fn missing_surface_on_first_rebuild_leaves_the_stage_empty() {
    let mut stage = stage();
    assert_eq!(
        stage.rebuild("g1", &knight_and_dragon(), None),
        Rebuild::Aborted
    );
    assert!(stage.scene().is_none());
    assert!(stage.handle().is_none());

    let mut surface = RecordingSurface::new(800, 600);
    assert_eq!(stage.tick(&mut surface).ok(), Some(Tick::Cancelled));
    assert!(surface.draws().is_empty());
}

#[test]
fn failed_generation_keeps_the_live_scene() {
    let mut surface = RecordingSurface::new(800, 600);
    let mut stage = stage();
    assert!(matches!(
        stage.apply(&Generation::new("g1", knight_and_dragon()), Some(&mut surface)),
        Rebuild::Realized { nodes: 5, .. }
    ));
    let handle = stage.handle().expect("g1 is live");
    surface.forget_events();

    let mut failed = Generation::new("g2", analysis(&["wizard"], &[], "", ""));
    failed.result.success = false;
    assert_eq!(stage.apply(&failed, Some(&mut surface)), Rebuild::Skipped);

    assert!(surface.events.is_empty());
    assert!(!handle.is_cancelled());
    assert_eq!(stage.scene_id(), Some("g1"));
    assert_eq!(stage.scene().map(|graph| graph.nodes().len()), Some(5));
    assert_eq!(stage.tick(&mut surface).ok(), Some(Tick::Rendered));
}

#[test]
fn teardown_releases_the_live_scene_once() {
    let mut surface = RecordingSurface::new(800, 600);
    let mut stage = stage();
    stage.rebuild("g1", &analysis(&[], &[], "", ""), Some(&mut surface));
    let handle = stage.handle().expect("g1 is live");

    let released = stage.teardown(&mut surface);
    assert_eq!(
        released,
        Released {
            geometries: 1,
            materials: 1
        }
    );
    assert!(handle.is_cancelled());
    assert_eq!(stage.teardown(&mut surface), Released::default());
    assert_eq!(surface.released_geometries().len(), 1);
    assert_eq!(stage.tick(&mut surface).ok(), Some(Tick::Cancelled));
}

#[test]
fn render_loop_must_be_stopped_before_its_graph_is_disposed() {
    let mut surface = RecordingSurface::new(800, 600);
    let graph = realize(&compose(&knight_and_dragon()), &mut surface);
    let rig = CameraRig::attach(&surface, &RigSettings::default()).expect("surface has a size");
    let (render_loop, handle) = RenderLoop::start(graph, rig);

    let (graph, _rig) = render_loop.stop();
    assert!(handle.is_cancelled());
    assert_eq!(dispose(graph, &mut surface).geometries, 5);
}
