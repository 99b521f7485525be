//! Raw records → scene content
//!
//! Four entry points mirror the kinds of assets a scene is built from:
//! - [`AssetImporter::import_skinned`]: bone hierarchy, skinned meshes, first animation
//! - [`AssetImporter::import_static`]: Lambertian meshes only
//! - [`AssetImporter::import_hierarchy`]: node tree with static meshes, no animation
//! - [`AssetImporter::import_textured`]: meshes bound to their textures
//!
//! A file that cannot be loaded or is inconsistent yields an empty
//! [`Imported`] plus a `log::error!`; anything already inserted for it is
//! rolled back. The caller decides whether an empty result is fatal.

use std::fs;
use std::path::{Path, PathBuf};
use glam::{Quat, Vec2, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::{AnimationClip, Interpolatable, KeyframeTrack, TransformTrack};
use crate::assets::loader::{JsonSceneLoader, SceneLoader};
use crate::assets::raw::{RawAnimation, RawMesh, RawNode, RawScene, matrix_from_rows};
use crate::errors::{Result, SceneError};
use crate::render::{RenderBackend, TextureHandle};
use crate::resources::{Geometry, Mesh, MeshMaterial, SkinInfluence};
use crate::scene::skeleton::{MAX_BONES, SkinnedMesh};
use crate::scene::{Leaf, MeshKey, Node, NodeHandle, Scene, SkinKey};

/// Everything one import call added to the scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Imported {
    /// Top-level nodes created, in asset order.
    pub roots: Vec<NodeHandle>,
    pub nodes: Vec<NodeHandle>,
    pub meshes: Vec<MeshKey>,
    pub skins: Vec<SkinKey>,
    pub faces: usize,
    pub animations: usize,
}

impl Imported {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.meshes.is_empty() && self.skins.is_empty()
    }

    /// The first root, if the asset produced a node tree.
    #[must_use]
    pub fn root(&self) -> Option<NodeHandle> {
        self.roots.first().copied()
    }

    fn rollback(&self, scene: &mut Scene) {
        for &root in &self.roots {
            scene.remove_node(root);
        }
        for &key in &self.meshes {
            scene.meshes.remove(key);
        }
        for &key in &self.skins {
            scene.skins.remove(key);
        }
    }
}

/// Loads assets through a [`SceneLoader`] and builds scene content.
#[derive(Debug, Clone, Default)]
pub struct AssetImporter<L = JsonSceneLoader> {
    loader: L,
}

impl AssetImporter<JsonSceneLoader> {
    #[must_use]
    pub fn json() -> Self {
        Self {
            loader: JsonSceneLoader,
        }
    }
}

impl<L: SceneLoader> AssetImporter<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    fn load(&self, path: &Path) -> Option<RawScene> {
        match self.loader.load(path) {
            Ok(raw) => Some(raw),
            Err(err) => {
                log::error!("Unable to load {}: {err}", path.display());
                None
            }
        }
    }

    fn finish(
        path: &Path,
        scene: &mut Scene,
        result: std::result::Result<(), SceneError>,
        imported: Imported,
    ) -> Imported {
        match result {
            Ok(()) => {
                log::info!(
                    "Loaded {}\t({} meshes, {} faces, {} nodes, {} animations)",
                    path.display(),
                    imported.meshes.len() + imported.skins.len(),
                    imported.faces,
                    imported.nodes.len(),
                    imported.animations
                );
                imported
            }
            Err(err) => {
                log::error!("Unable to import {}: {err}", path.display());
                imported.rollback(scene);
                Imported::default()
            }
        }
    }

    /// Every asset node becomes a bone-capable node, keyframed when the first
    /// animation has a channel for it. Every mesh becomes a [`SkinnedMesh`]
    /// attached to the nodes that reference it.
    pub fn import_skinned(
        &self,
        path: &Path,
        scene: &mut Scene,
        backend: &mut dyn RenderBackend,
        parent: Option<NodeHandle>,
    ) -> Imported {
        let Some(raw) = self.load(path) else {
            return Imported::default();
        };
        let mut imported = Imported::default();
        let result = build_skinned(&raw, scene, backend, parent, &mut imported);
        Self::finish(path, scene, result, imported)
    }

    /// Lambertian meshes, not attached to any node.
    pub fn import_static(
        &self,
        path: &Path,
        scene: &mut Scene,
        backend: &mut dyn RenderBackend,
    ) -> Imported {
        let Some(raw) = self.load(path) else {
            return Imported::default();
        };
        let mut imported = Imported::default();
        let result = raw.meshes.iter().enumerate().try_for_each(|(index, mesh)| {
            let key = add_static_mesh(mesh, index, MeshMaterial::Lambertian, scene, backend)?;
            imported.meshes.push(key);
            imported.faces += mesh.faces.len();
            Ok(())
        });
        Self::finish(path, scene, result, imported)
    }

    /// The node tree with static Lambertian meshes on the nodes that
    /// reference them. Animations are ignored.
    pub fn import_hierarchy(
        &self,
        path: &Path,
        scene: &mut Scene,
        backend: &mut dyn RenderBackend,
        parent: Option<NodeHandle>,
    ) -> Imported {
        let Some(raw) = self.load(path) else {
            return Imported::default();
        };
        let mut imported = Imported::default();
        let result = build_hierarchy(&raw, scene, backend, parent, &mut imported);
        Self::finish(path, scene, result, imported)
    }

    /// Meshes bound to their material's texture, looked up under the asset's
    /// directory. A mesh whose texture cannot be found falls back to the
    /// Lambertian material with a warning.
    pub fn import_textured(
        &self,
        path: &Path,
        scene: &mut Scene,
        backend: &mut dyn RenderBackend,
    ) -> Imported {
        let Some(raw) = self.load(path) else {
            return Imported::default();
        };
        let base_dir = path.parent().unwrap_or(Path::new("./")).to_path_buf();

        let textures: Vec<Option<TextureHandle>> = raw
            .materials
            .iter()
            .map(|material| {
                let name = material.texture.as_deref()?;
                let found = find_texture(&base_dir, name).and_then(|file| backend.load_texture(&file));
                if found.is_none() {
                    log::warn!("Failed to find texture: {name}");
                }
                found
            })
            .collect();

        let mut imported = Imported::default();
        let result = raw.meshes.iter().enumerate().try_for_each(|(index, mesh)| {
            let texture = mesh
                .material
                .and_then(|material| textures.get(material).copied().flatten());
            let material = texture.map_or(MeshMaterial::Lambertian, MeshMaterial::Textured);
            let key = add_static_mesh(mesh, index, material, scene, backend)?;
            imported.meshes.push(key);
            imported.faces += mesh.faces.len();
            Ok(())
        });
        Self::finish(path, scene, result, imported)
    }
}

/// Resolves `name` against `base_dir`, then searches its subdirectories for a
/// file with the same name, since exported paths are often wrong.
fn find_texture(base_dir: &Path, name: &str) -> Option<PathBuf> {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let direct = base_dir.join(file_name);
    if direct.is_file() {
        return Some(direct);
    }

    let mut pending = vec![base_dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.file_name().is_some_and(|f| f == file_name) {
                return Some(path);
            }
        }
    }
    None
}

fn invalid(asset: &str, reason: impl Into<String>) -> SceneError {
    SceneError::InvalidAsset {
        asset: asset.to_string(),
        reason: reason.into(),
    }
}

fn mesh_label(mesh: &RawMesh, index: usize) -> String {
    if mesh.name.is_empty() {
        format!("mesh#{index}")
    } else {
        mesh.name.clone()
    }
}

/// Positions, surface attributes and indices of a raw mesh.
fn geometry_from_raw(mesh: &RawMesh, label: &str) -> Result<Geometry> {
    let vertex_count = mesh.positions.len();
    if let Some(face) = mesh
        .faces
        .iter()
        .find(|face| face.iter().any(|&i| i as usize >= vertex_count))
    {
        return Err(invalid(
            label,
            format!("face {face:?} indexes past {vertex_count} vertices"),
        ));
    }

    let positions = mesh.positions.iter().copied().map(Vec3::from_array).collect();
    let indices = mesh.faces.iter().flatten().copied().collect();
    let mut geometry = Geometry::new(positions, indices);

    if mesh.normals.len() == vertex_count && vertex_count > 0 {
        geometry = geometry.with_normals(mesh.normals.iter().copied().map(Vec3::from_array).collect());
    }
    if mesh.colors.len() == vertex_count && vertex_count > 0 {
        geometry = geometry.with_colors(mesh.colors.iter().copied().map(Vec3::from_array).collect());
    }
    if mesh.uvs.len() == vertex_count && vertex_count > 0 {
        // Raster order to OpenGL order.
        geometry = geometry.with_uvs(mesh.uvs.iter().map(|&[u, v]| Vec2::new(u, 1.0 - v)).collect());
    }

    Ok(geometry)
}

fn add_static_mesh(
    mesh: &RawMesh,
    index: usize,
    material: MeshMaterial,
    scene: &mut Scene,
    backend: &mut dyn RenderBackend,
) -> Result<MeshKey> {
    let label = mesh_label(mesh, index);
    let geometry = geometry_from_raw(mesh, &label)?;
    let handle = backend.upload_geometry(&geometry);
    Ok(scene.add_mesh(Mesh::new(handle, material).with_name(label)))
}

/// A channel without keys holds the rest pose component.
fn channel_track<T: Interpolatable>(
    channel: &'static str,
    keys: impl ExactSizeIterator<Item = (f32, T)>,
    rest: T,
) -> Result<KeyframeTrack<T>> {
    if keys.len() == 0 {
        return Ok(KeyframeTrack::constant(rest));
    }
    KeyframeTrack::linear(keys).map_err(|e| SceneError::channel(channel, e))
}

/// First animation as per-node tracks, key times converted from ticks.
fn clip_from_raw(animation: &RawAnimation) -> Result<AnimationClip> {
    let ticks = if animation.ticks_per_second > 0.0 {
        animation.ticks_per_second
    } else {
        1.0
    };

    let mut channels = FxHashMap::default();
    for channel in &animation.channels {
        let translation = channel_track(
            "translation",
            channel.position_keys.iter().map(|key| (key.time / ticks, Vec3::from_array(key.value))),
            Vec3::ZERO,
        )?;
        let rotation = channel_track(
            "rotation",
            channel.rotation_keys.iter().map(|key| (key.time / ticks, key.value.to_quat())),
            Quat::IDENTITY,
        )?;
        let scale = channel_track(
            "scale",
            channel.scaling_keys.iter().map(|key| (key.time / ticks, key.value.to_vec3())),
            Vec3::ONE,
        )?;

        channels.insert(channel.node.clone(), TransformTrack::new(translation, rotation, scale));
    }

    Ok(AnimationClip::new(animation.name.clone(), channels))
}

/// Inserts the raw tree depth-first, recording every node by name.
fn insert_tree(
    raw_root: &RawNode,
    scene: &mut Scene,
    parent: Option<NodeHandle>,
    imported: &mut Imported,
    mut make_node: impl FnMut(&RawNode) -> Node,
) -> Result<Vec<(NodeHandle, Vec<usize>)>> {
    let mut created = Vec::new();
    let mut stack = vec![(raw_root, parent)];

    while let Some((raw, parent)) = stack.pop() {
        let node = make_node(raw).with_local(raw.local_matrix());
        let handle = match parent {
            Some(parent) => scene.add_to_parent(node, parent)?,
            None => scene.add_node(node),
        };
        if parent.is_none() || imported.roots.is_empty() {
            imported.roots.push(handle);
        }
        imported.nodes.push(handle);
        created.push((handle, raw.meshes.clone()));

        for child in raw.children.iter().rev() {
            stack.push((child, Some(handle)));
        }
    }

    Ok(created)
}

fn build_skinned(
    raw: &RawScene,
    scene: &mut Scene,
    backend: &mut dyn RenderBackend,
    parent: Option<NodeHandle>,
    imported: &mut Imported,
) -> Result<()> {
    let clip = raw.animations.first().map(clip_from_raw).transpose()?;
    imported.animations = raw.animations.len();

    // Nodes first: skinned meshes refer to them as bones.
    let created = insert_tree(&raw.root, scene, parent, imported, |node| {
        let track = clip.as_ref().and_then(|clip| clip.channel(&node.name));
        Node::skinning_control(node.name.clone(), track)
    })?;

    let mut by_name: FxHashMap<String, NodeHandle> = FxHashMap::default();
    for (handle, _) in &created {
        if let Some(node) = scene.get_node(*handle) {
            by_name.entry(node.name.clone()).or_insert(*handle);
        }
    }

    let mut skins = Vec::with_capacity(raw.meshes.len());
    for (index, mesh) in raw.meshes.iter().enumerate() {
        let label = mesh_label(mesh, index);
        let bones = &mesh.bones[..mesh.bones.len().min(MAX_BONES)];

        // Per-vertex (bone, weight) lists, trimmed to the strongest four.
        let mut influences: Vec<Vec<(u32, f32)>> = vec![Vec::new(); mesh.positions.len()];
        for (bone_id, bone) in bones.iter().enumerate() {
            for entry in &bone.weights {
                let Some(slot) = influences.get_mut(entry.vertex as usize) else {
                    return Err(invalid(
                        &label,
                        format!("bone '{}' weights missing vertex {}", bone.name, entry.vertex),
                    ));
                };
                slot.push((bone_id as u32, entry.weight));
            }
        }
        let skin: Vec<SkinInfluence> = influences.into_iter().map(SkinInfluence::from_weights).collect();

        let bone_nodes = bones
            .iter()
            .map(|bone| {
                by_name.get(&bone.name).copied().ok_or_else(|| SceneError::MissingBone {
                    mesh: label.clone(),
                    bone: bone.name.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let offsets = bones.iter().map(|bone| matrix_from_rows(&bone.offset)).collect();

        let geometry = geometry_from_raw(mesh, &label)?.with_skin(skin);
        let handle = backend.upload_geometry(&geometry);

        let key = scene.add_skinned_mesh(SkinnedMesh::new(label, handle, bone_nodes, offsets)?)?;
        imported.skins.push(key);
        imported.faces += mesh.faces.len();
        skins.push(key);
    }

    for (handle, mesh_indices) in created {
        for index in mesh_indices {
            let key = skins
                .get(index)
                .copied()
                .ok_or_else(|| invalid("node", format!("mesh index {index} out of range")))?;
            scene.add_leaf(handle, Leaf::Skinned(key))?;
        }
    }

    Ok(())
}

fn build_hierarchy(
    raw: &RawScene,
    scene: &mut Scene,
    backend: &mut dyn RenderBackend,
    parent: Option<NodeHandle>,
    imported: &mut Imported,
) -> Result<()> {
    let mut meshes = Vec::with_capacity(raw.meshes.len());
    for (index, mesh) in raw.meshes.iter().enumerate() {
        let key = add_static_mesh(mesh, index, MeshMaterial::Lambertian, scene, backend)?;
        imported.meshes.push(key);
        imported.faces += mesh.faces.len();
        meshes.push(key);
    }

    let created = insert_tree(&raw.root, scene, parent, imported, |node| Node::new(node.name.clone()))?;

    for (handle, mesh_indices) in created {
        for index in mesh_indices {
            let key = meshes
                .get(index)
                .copied()
                .ok_or_else(|| invalid("node", format!("mesh index {index} out of range")))?;
            scene.add_leaf(handle, Leaf::Mesh(key))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_faces_are_rejected() {
        let mesh = RawMesh {
            positions: vec![[0.0; 3]; 3],
            faces: vec![[0, 1, 3]],
            ..RawMesh::default()
        };
        assert!(matches!(
            geometry_from_raw(&mesh, "m"),
            Err(SceneError::InvalidAsset { .. })
        ));
    }

    #[test]
    fn uvs_are_flipped_to_gl_order() {
        let mesh = RawMesh {
            positions: vec![[0.0; 3]],
            uvs: vec![[0.25, 0.1]],
            faces: vec![],
            ..RawMesh::default()
        };
        let geometry = geometry_from_raw(&mesh, "m").unwrap();
        let uv = geometry.uvs.unwrap()[0];
        assert!((uv - Vec2::new(0.25, 0.9)).length() < 1e-6);
    }

    #[test]
    fn clip_times_are_converted_from_ticks() {
        let animation: RawAnimation = serde_json::from_str(
            r#"{
                "ticks_per_second": 10.0,
                "channels": [{
                    "node": "bone",
                    "position_keys": [{"time": 0.0, "value": [0, 0, 0]}, {"time": 20.0, "value": [2, 0, 0]}],
                    "rotation_keys": [{"time": 0.0, "value": [1, 0, 0, 0]}],
                    "scaling_keys": [{"time": 0.0, "value": 1.0}]
                }]
            }"#,
        )
        .unwrap();
        let clip = clip_from_raw(&animation).unwrap();
        assert!((clip.duration - 2.0).abs() < 1e-6);
        let track = clip.channel("bone").unwrap();
        assert!((track.translation.value(1.0).x - 1.0).abs() < 1e-6);
    }
}
