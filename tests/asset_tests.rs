//! Asset import tests
//!
//! Tests for:
//! - JSON records → skinned nodes, keyframed bones and skinned meshes
//! - Static, hierarchy and textured imports
//! - Load and format failures yielding an empty result with rollback
//! - Texture lookup relative to the asset directory

use std::fs;
use std::path::{Path, PathBuf};

use dinoscene::assets::{AssetImporter, JsonSceneLoader, RawScene, SceneLoader};
use dinoscene::errors::{Result, SceneError};
use dinoscene::render::RecordingBackend;
use dinoscene::resources::MeshMaterial;
use dinoscene::scene::{Leaf, Node, Scene};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

const SKINNED: &str = r#"{
    "root": {
        "name": "armature",
        "children": [
            {
                "name": "hip",
                "transform": [[1, 0, 0, 0], [0, 1, 0, 2], [0, 0, 1, 0], [0, 0, 0, 1]],
                "meshes": [0]
            }
        ]
    },
    "meshes": [{
        "name": "body",
        "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
        "faces": [[0, 1, 2]],
        "bones": [
            { "name": "hip", "weights": [{ "vertex": 0, "weight": 1.0 }, { "vertex": 1, "weight": 0.5 }] },
            { "name": "armature", "weights": [{ "vertex": 1, "weight": 0.5 }, { "vertex": 2, "weight": 1.0 }] }
        ]
    }],
    "animations": [{
        "name": "sway",
        "ticks_per_second": 25.0,
        "channels": [{
            "node": "hip",
            "position_keys": [{ "time": 0.0, "value": [0, 2, 0] }, { "time": 50.0, "value": [4, 2, 0] }],
            "rotation_keys": [{ "time": 0.0, "value": [1, 0, 0, 0] }],
            "scaling_keys": [{ "time": 0.0, "value": 1.0 }]
        }]
    }]
}"#;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parse(source: &str) -> RawScene {
    JsonSceneLoader::parse(source).unwrap()
}

fn fixed(raw: RawScene) -> AssetImporter<impl Fn(&Path) -> Result<RawScene>> {
    AssetImporter::new(move |_: &Path| -> Result<RawScene> { Ok(raw.clone()) })
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dinoscene-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

// ============================================================================
// Skinned Import
// ============================================================================

#[test]
fn skinned_import_builds_bones_and_mesh() {
    let mut scene = Scene::new();
    let mut backend = RecordingBackend::new();

    let imported = fixed(parse(SKINNED)).import_skinned(Path::new("dino.json"), &mut scene, &mut backend, None);

    assert_eq!(imported.nodes.len(), 2);
    assert_eq!(imported.skins.len(), 1);
    assert_eq!(imported.faces, 1);
    assert_eq!(imported.animations, 1);

    let hip = scene.find_by_name("hip").unwrap();
    let hip_node = scene.get_node(hip).unwrap();
    assert!(hip_node.publishes_world());
    assert!(hip_node.motion.track().is_some());
    assert_eq!(hip_node.leaves, vec![Leaf::Skinned(imported.skins[0])]);

    let armature = scene.find_by_name("armature").unwrap();
    assert!(scene.get_node(armature).unwrap().motion.track().is_none());
    assert_eq!(scene.skins[imported.skins[0]].bones(), &[hip, armature]);
}

#[test]
fn skinned_import_converts_ticks_to_time() {
    let mut scene = Scene::new();
    let mut backend = RecordingBackend::new();
    let imported = fixed(parse(SKINNED)).import_skinned(Path::new("dino.json"), &mut scene, &mut backend, None);

    // 50 ticks at 25 per second: the hip reaches x = 4 at t = 2.
    scene.update(1.0).unwrap();
    let hip = scene.find_by_name("hip").unwrap();
    assert!(approx(scene.world_matrix(hip).unwrap().w_axis.x, 2.0));

    let skin = &scene.skins[imported.skins[0]];
    assert!(approx(skin.bone_matrices()[0].w_axis.x, 2.0));
    assert!(approx(skin.bone_matrices()[0].w_axis.y, 2.0));
}

#[test]
fn skinned_import_under_parent() {
    let mut scene = Scene::new();
    let mut backend = RecordingBackend::new();
    let anchor = scene.add_node(Node::new("anchor"));

    let imported = fixed(parse(SKINNED)).import_skinned(Path::new("dino.json"), &mut scene, &mut backend, Some(anchor));

    let root = imported.root().unwrap();
    assert_eq!(scene.get_node(anchor).unwrap().children(), &[root]);
    assert_eq!(scene.root_nodes, vec![anchor]);
}

#[test]
fn skinned_geometry_carries_influences() {
    let mut scene = Scene::new();
    let mut backend = RecordingBackend::new();
    fixed(parse(SKINNED)).import_skinned(Path::new("dino.json"), &mut scene, &mut backend, None);

    let uploads = backend
        .commands()
        .iter()
        .filter(|command| matches!(command, dinoscene::render::RenderCommand::UploadGeometry { vertices: 3, indices: 3, .. }))
        .count();
    assert_eq!(uploads, 1);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn loader_failure_yields_empty_result() {
    init_logger();
    let mut scene = Scene::new();
    let mut backend = RecordingBackend::new();
    let importer = AssetImporter::new(|path: &Path| -> Result<RawScene> {
        Err(SceneError::InvalidAsset {
            asset: path.display().to_string(),
            reason: "unreadable".to_string(),
        })
    });

    let imported = importer.import_skinned(Path::new("missing.json"), &mut scene, &mut backend, None);
    assert!(imported.is_empty());
    assert!(scene.nodes.is_empty());
}

#[test]
fn missing_file_yields_empty_result() {
    init_logger();
    let mut scene = Scene::new();
    let mut backend = RecordingBackend::new();
    let imported = AssetImporter::json().import_static(Path::new("/definitely/not/here.json"), &mut scene, &mut backend);
    assert!(imported.is_empty());
}

#[test]
fn unknown_bone_rolls_back_every_node() {
    init_logger();
    let source = SKINNED.replace(r#""name": "armature", "weights""#, r#""name": "tail", "weights""#);
    let mut scene = Scene::new();
    let mut backend = RecordingBackend::new();

    let imported = fixed(parse(&source)).import_skinned(Path::new("dino.json"), &mut scene, &mut backend, None);

    assert!(imported.is_empty());
    assert!(scene.nodes.is_empty());
    assert!(scene.root_nodes.is_empty());
    assert!(scene.skins.is_empty());
}

#[test]
fn bad_face_index_rolls_back_meshes() {
    init_logger();
    let source = r#"{
        "meshes": [
            { "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]], "faces": [[0, 1, 2]] },
            { "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]], "faces": [[0, 1, 7]] }
        ]
    }"#;
    let mut scene = Scene::new();
    let mut backend = RecordingBackend::new();

    let imported = fixed(parse(source)).import_static(Path::new("broken.json"), &mut scene, &mut backend);
    assert!(imported.is_empty());
    assert!(scene.meshes.is_empty());
}

// ============================================================================
// Static & Hierarchy Import
// ============================================================================

#[test]
fn static_import_uses_lambertian_meshes() {
    let mut scene = Scene::new();
    let mut backend = RecordingBackend::new();
    let imported = fixed(parse(SKINNED)).import_static(Path::new("dino.json"), &mut scene, &mut backend);

    assert_eq!(imported.meshes.len(), 1);
    assert!(imported.roots.is_empty());
    assert_eq!(scene.meshes[imported.meshes[0]].material, MeshMaterial::Lambertian);
    assert_eq!(scene.meshes[imported.meshes[0]].name, "body");
}

#[test]
fn hierarchy_import_keeps_tree_without_animation() {
    let mut scene = Scene::new();
    let mut backend = RecordingBackend::new();
    let imported = fixed(parse(SKINNED)).import_hierarchy(Path::new("dino.json"), &mut scene, &mut backend, None);

    let hip = scene.find_by_name("hip").unwrap();
    let node = scene.get_node(hip).unwrap();
    assert!(node.motion.track().is_none());
    assert_eq!(node.leaves, vec![Leaf::Mesh(imported.meshes[0])]);

    scene.update(3.0).unwrap();
    assert!(approx(scene.world_matrix(hip).unwrap().w_axis.y, 2.0));
    assert!(approx(scene.world_matrix(hip).unwrap().w_axis.x, 0.0));
}

// ============================================================================
// Textured Import
// ============================================================================

const TEXTURED: &str = r#"{
    "materials": [{ "name": "bark", "texture": "C:\\exports\\bark.png" }, { "name": "lost", "texture": "lost.png" }],
    "meshes": [
        { "name": "trunk", "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]], "uvs": [[0, 0], [1, 0], [0, 1]], "faces": [[0, 1, 2]], "material": 0 },
        { "name": "leaf", "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]], "faces": [[0, 1, 2]], "material": 1 }
    ]
}"#;

#[test]
fn textured_import_finds_nested_texture_and_falls_back() {
    init_logger();
    let dir = temp_dir("textured");
    fs::create_dir_all(dir.join("textures")).unwrap();
    fs::write(dir.join("textures").join("bark.png"), b"png").unwrap();
    let asset = dir.join("tree.json");
    fs::write(&asset, TEXTURED).unwrap();

    let mut scene = Scene::new();
    let mut backend = RecordingBackend::new();
    let imported = AssetImporter::json().import_textured(&asset, &mut scene, &mut backend);

    assert_eq!(imported.meshes.len(), 2);
    assert!(matches!(scene.meshes[imported.meshes[0]].material, MeshMaterial::Textured(_)));
    assert_eq!(scene.meshes[imported.meshes[1]].material, MeshMaterial::Lambertian);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn json_loader_reads_files() -> anyhow::Result<()> {
    let dir = temp_dir("loader");
    let asset = dir.join("dino.json");
    fs::write(&asset, SKINNED)?;

    let raw = JsonSceneLoader.load(&asset)?;
    assert_eq!(raw.node_count(), 2);
    assert_eq!(raw.face_count(), 1);

    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn json_loader_reports_malformed_input() {
    assert!(matches!(JsonSceneLoader::parse("{ nope"), Err(SceneError::JsonError(_))));
}
