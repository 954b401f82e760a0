use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::camera::PerspectiveCamera;
use crate::color::Color;
use crate::light::{AmbientLight, DirectionalLight};
use crate::mesh::Mesh;

/// Handle to a top-level child of a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Anything that can be added to the scene root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneNode {
    Camera(PerspectiveCamera),
    AmbientLight(AmbientLight),
    DirectionalLight(DirectionalLight),
    Mesh(Mesh),
}

impl SceneNode {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Camera(_) => "camera",
            Self::AmbientLight(_) => "ambient_light",
            Self::DirectionalLight(_) => "directional_light",
            Self::Mesh(_) => "mesh",
        }
    }

    pub fn is_light(&self) -> bool {
        matches!(self, Self::AmbientLight(_) | Self::DirectionalLight(_))
    }
}

impl From<PerspectiveCamera> for SceneNode {
    fn from(camera: PerspectiveCamera) -> Self {
        Self::Camera(camera)
    }
}

impl From<AmbientLight> for SceneNode {
    fn from(light: AmbientLight) -> Self {
        Self::AmbientLight(light)
    }
}

impl From<DirectionalLight> for SceneNode {
    fn from(light: DirectionalLight) -> Self {
        Self::DirectionalLight(light)
    }
}

impl From<Mesh> for SceneNode {
    fn from(mesh: Mesh) -> Self {
        Self::Mesh(mesh)
    }
}

/// Root container holding everything drawn in a frame.
///
/// Children are only ever appended, so a [`NodeId`] stays valid for the
/// lifetime of the scene that issued it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scene {
    pub background: Color,
    children: Vec<SceneNode>,
}

impl Scene {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            children: Vec::new(),
        }
    }

    pub fn add(&mut self, node: impl Into<SceneNode>) -> NodeId {
        self.children.push(node.into());
        NodeId(self.children.len() - 1)
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.children.get(id.0)
    }

    pub fn camera(&self, id: NodeId) -> Option<&PerspectiveCamera> {
        match self.get(id)? {
            SceneNode::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self, id: NodeId) -> Option<&mut PerspectiveCamera> {
        match self.children.get_mut(id.0)? {
            SceneNode::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn mesh(&self, id: NodeId) -> Option<&Mesh> {
        match self.get(id)? {
            SceneNode::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut Mesh> {
        match self.children.get_mut(id.0)? {
            SceneNode::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn directional_light(&self, id: NodeId) -> Option<&DirectionalLight> {
        match self.get(id)? {
            SceneNode::DirectionalLight(light) => Some(light),
            _ => None,
        }
    }

    /// Meshes paired with their ids, in insertion order.
    pub fn meshes(&self) -> impl Iterator<Item = (NodeId, &Mesh)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(index, node)| match node {
                SceneNode::Mesh(mesh) => Some((NodeId(index), mesh)),
                _ => None,
            })
    }

    pub fn ambient_lights(&self) -> impl Iterator<Item = &AmbientLight> {
        self.children.iter().filter_map(|node| match node {
            SceneNode::AmbientLight(light) => Some(light),
            _ => None,
        })
    }

    pub fn directional_lights(&self) -> impl Iterator<Item = &DirectionalLight> {
        self.children.iter().filter_map(|node| match node {
            SceneNode::DirectionalLight(light) => Some(light),
            _ => None,
        })
    }

    pub fn light_count(&self) -> usize {
        self.children.iter().filter(|node| node.is_light()).count()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize scene")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::material::LambertMaterial;

    fn sample() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new(Color::WHITE);
        let camera = scene.add(PerspectiveCamera::new(60.0, 1.0, 0.1, 1000.0));
        scene.add(AmbientLight::new(Color::WHITE, 1.0));
        let mesh = scene.add(Mesh::new(
            "box",
            Geometry::cuboid(1.0, 1.0, 1.0),
            LambertMaterial::default(),
        ));
        (scene, camera, mesh)
    }

    #[test]
    fn typed_accessors_match_node_kind() {
        let (scene, camera, mesh) = sample();
        assert!(scene.camera(camera).is_some());
        assert!(scene.mesh(camera).is_none());
        assert_eq!(scene.mesh(mesh).map(|m| m.name.as_str()), Some("box"));
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.light_count(), 1);
        assert_eq!(scene.meshes().count(), 1);
    }

    #[test]
    fn camera_can_be_mutated_in_place() {
        let (mut scene, camera, _) = sample();
        scene.camera_mut(camera).unwrap().fov = 45.0;
        assert_eq!(scene.camera(camera).unwrap().fov, 45.0);
    }

    #[test]
    fn json_dump_tags_node_types() {
        let (scene, _, _) = sample();
        let json = scene.to_json().unwrap();
        assert!(json.contains("\"type\": \"camera\""));
        assert!(json.contains("\"type\": \"mesh\""));
        let parsed: Scene = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 3);
    }
}
