use cgmath::{InnerSpace, Vector3};
use model_viewer::{
    data_structures::{
        instance::Instance,
        material::{Side, TextureSet},
        scene_graph::{SceneNode, count_meshes, traverse},
    },
    resources::{
        download::{Download, LoadEvent, progress_percent},
        load_model, parse_model,
    },
};

use crate::common::test_utils::{block_on, empty_scene_glb, mesh_materials, node_names, triangle_glb};

mod common;

#[test]
fn parses_node_hierarchy_under_a_named_root() {
    let model = block_on(parse_model(&triangle_glb(), "triangle.glb")).expect("valid glb");

    assert_eq!(model.name(), "triangle.glb");
    assert_eq!(
        node_names(model.as_ref()),
        vec!["triangle.glb", "root", "left", "nested", "right"]
    );
    assert_eq!(count_meshes(model.as_ref()), 3);
    assert!(!model.is_mesh());
}

#[test]
fn keeps_node_transforms() {
    let mut model = block_on(parse_model(&triangle_glb(), "triangle.glb")).expect("valid glb");
    model.update_world_transforms(&Instance::new());

    let mut worlds = Vec::new();
    traverse(model.as_ref(), &mut |n: &dyn SceneNode| {
        worlds.push((n.name().to_string(), n.get_world_transform().clone()))
    });
    let world = |name: &str| {
        worlds
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, w)| w.clone())
            .expect("node exists")
    };

    assert_eq!(world("left").position, Vector3::new(-1.0, 0.0, 0.0));
    assert_eq!(world("right").position, Vector3::new(1.0, 0.0, 0.0));
    // nested inherits the parent's translation and keeps its own scale
    assert_eq!(world("nested").position, Vector3::new(-1.0, 0.0, 0.0));
    assert_eq!(world("nested").scale, Vector3::new(2.0, 2.0, 2.0));
}

#[test]
fn reads_materials_from_the_file() {
    let model = block_on(parse_model(&triangle_glb(), "triangle.glb")).expect("valid glb");
    let materials = mesh_materials(model.as_ref());

    // depth-first: left, nested, right
    assert_eq!(materials.len(), 3);
    assert_eq!(materials[0].side, Side::Front);
    assert_eq!(materials[0].metalness, 0.0);
    assert_eq!(materials[0].roughness, 0.8);
    assert_eq!(materials[2].side, Side::Double);
    assert!(materials.iter().all(|m| m.textures == TextureSet::Primary));
}

#[test]
fn reads_vertices_and_computes_missing_tangents() {
    let model = block_on(parse_model(&triangle_glb(), "triangle.glb")).expect("valid glb");
    let left = &model.get_children()[0].get_children()[0];
    assert_eq!(left.name(), "left");

    let meshes = left.meshes();
    assert_eq!(meshes.len(), 1);
    let mesh = &meshes[0];
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
    assert_eq!(mesh.vertices[2].tex_coords, [0.0, 1.0]);
    assert!(mesh.gpu().is_none());

    for vertex in &mesh.vertices {
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        let tangent = Vector3::from(vertex.tangent);
        assert!((tangent.magnitude() - 1.0).abs() < 1e-5, "tangent {tangent:?}");
        assert!(tangent.dot(Vector3::from(vertex.normal)).abs() < 1e-5);
    }
}

#[test]
fn empty_scene_yields_an_empty_root() {
    let model = block_on(parse_model(&empty_scene_glb(), "empty.glb")).expect("valid glb");
    assert_eq!(model.get_children().len(), 0);
    assert_eq!(count_meshes(model.as_ref()), 0);
}

#[test]
fn rejects_garbage() {
    let result = block_on(parse_model(b"definitely not a model", "broken.glb"));
    let err = result.err().expect("garbage must not parse");
    assert!(format!("{err:#}").contains("broken.glb"));
}

#[test]
fn progress_is_rounded_and_capped() {
    assert_eq!(progress_percent(0, Some(200)), Some(0));
    assert_eq!(progress_percent(1, Some(200)), Some(1)); // 0.5 rounds up
    assert_eq!(progress_percent(2, Some(3)), Some(67));
    assert_eq!(progress_percent(200, Some(200)), Some(100));
    assert_eq!(progress_percent(300, Some(200)), Some(100));
    assert_eq!(progress_percent(10, None), None);
    assert_eq!(progress_percent(10, Some(0)), None);
}

#[test]
fn download_reports_accumulated_bytes() {
    let mut download = Download::new(Some(10));
    match download.push(&[0; 4]) {
        LoadEvent::Progress { loaded, total } => {
            assert_eq!(loaded, 4);
            assert_eq!(total, Some(10));
        }
        other => panic!("unexpected {other:?}"),
    }
    match download.push(&[1; 6]) {
        LoadEvent::Progress { loaded, .. } => assert_eq!(loaded, 10),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(download.loaded(), 10);
    assert_eq!(download.into_bytes().len(), 10);
}

#[test]
fn missing_file_fails_without_progress() {
    let mut events = Vec::new();
    block_on(load_model("this-file-does-not-exist.glb", |e| events.push(e)));

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], LoadEvent::Failed(_)));
}

#[test]
fn load_model_streams_progress_then_the_model() {
    let dir = std::path::Path::new("./assets");
    std::fs::create_dir_all(dir).expect("can create the asset dir");
    let file_name = "load_model_streams_progress_test.glb";
    let path = dir.join(file_name);
    let bytes = triangle_glb();
    std::fs::write(&path, &bytes).expect("can write the fixture");

    let mut events = Vec::new();
    block_on(load_model(file_name, |e| events.push(e)));
    let _ = std::fs::remove_file(&path);

    let (last, progress) = events.split_last().expect("at least one event");
    assert!(!progress.is_empty());
    let mut previous = 0;
    for event in progress {
        match event {
            LoadEvent::Progress { loaded, total } => {
                assert_eq!(*total, Some(bytes.len() as u64));
                assert!(*loaded >= previous);
                previous = *loaded;
            }
            other => panic!("expected progress, got {other:?}"),
        }
    }
    assert_eq!(previous, bytes.len() as u64);

    match last {
        LoadEvent::Loaded(model) => {
            assert_eq!(model.name(), file_name);
            assert_eq!(count_meshes(model.as_ref()), 3);
        }
        other => panic!("expected the model, got {other:?}"),
    }
}

#[test]
fn normals_stay_unit_length_after_world_transform() {
    let mut model = block_on(parse_model(&triangle_glb(), "triangle.glb")).expect("valid glb");
    let mut root = model.get_local_transform().clone();
    root.scale *= 10.0;
    model.set_local_transform(root);
    model.update_world_transforms(&Instance::new());

    traverse(model.as_ref(), &mut |n: &dyn SceneNode| {
        if n.is_mesh() {
            let raw = n.get_world_transform().to_raw();
            let bytes: &[u8] = bytemuck::bytes_of(&raw);
            // model (64 bytes) then the 3x3 normal matrix
            let normal: &[f32] = bytemuck::cast_slice(&bytes[64..100]);
            let column = Vector3::new(normal[0], normal[1], normal[2]);
            assert!((column.magnitude() - 1.0).abs() < 1e-5);
        }
    });
}
