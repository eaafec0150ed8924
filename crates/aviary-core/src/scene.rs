//! Minimal scene graph standing in for the host engine's entity hierarchy.
//!
//! Entities form a forest of anchors. Every entity carries a local
//! [`Transform`]; world placement is the product of the transforms along the
//! parent chain. The graph answers the one spatial query the audio updater
//! needs: where one entity sits in another entity's local frame.

use fnv::FnvHashMap;
use glam::{Mat4, Quat, Vec3};
use smallvec::SmallVec;

use crate::updater::RelativePositionSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Local translation/rotation/scale relative to the parent entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// What an entity represents. The renderer decides how to draw each kind.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Anchor,
    Camera,
    Model { asset: String },
    Placard { texture: String, width: f32, depth: f32 },
    Label { text: String, font_size: f32 },
}

#[derive(Clone, Debug)]
struct Node {
    kind: EntityKind,
    transform: Transform,
    parent: Option<EntityId>,
    children: SmallVec<[EntityId; 4]>,
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: FnvHashMap<EntityId, Node>,
    roots: Vec<EntityId>,
    next_id: u32,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a root-level entity (world anchor or camera anchor).
    pub fn add_anchor(&mut self, kind: EntityKind, transform: Transform) -> EntityId {
        let id = self.alloc();
        self.nodes.insert(
            id,
            Node {
                kind,
                transform,
                parent: None,
                children: SmallVec::new(),
            },
        );
        self.roots.push(id);
        id
    }

    /// Attach a new entity under `parent`. Returns `None` if the parent is gone.
    pub fn add_child(
        &mut self,
        parent: EntityId,
        kind: EntityKind,
        transform: Transform,
    ) -> Option<EntityId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let id = self.alloc();
        self.nodes.insert(
            id,
            Node {
                kind,
                transform,
                parent: Some(parent),
                children: SmallVec::new(),
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        Some(id)
    }

    /// Remove every descendant of `entity`, keeping `entity` itself.
    pub fn remove_children(&mut self, entity: EntityId) -> usize {
        let Some(node) = self.nodes.get_mut(&entity) else {
            return 0;
        };
        let mut stack: Vec<EntityId> = node.children.drain(..).collect();
        let mut removed = 0;
        while let Some(id) = stack.pop() {
            if let Some(n) = self.nodes.remove(&id) {
                stack.extend(n.children);
                removed += 1;
            }
        }
        removed
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.nodes.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, entity: EntityId) -> Option<&EntityKind> {
        self.nodes.get(&entity).map(|n| &n.kind)
    }

    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.nodes.get(&entity).and_then(|n| n.parent)
    }

    pub fn children(&self, entity: EntityId) -> &[EntityId] {
        self.nodes
            .get(&entity)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn transform(&self, entity: EntityId) -> Option<&Transform> {
        self.nodes.get(&entity).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        self.nodes.get_mut(&entity).map(|n| &mut n.transform)
    }

    /// Iterate every entity in depth-first order starting from the roots.
    pub fn entities(&self) -> Vec<EntityId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<EntityId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(n) = self.nodes.get(&id) {
                out.push(id);
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    /// Local-to-world matrix. Unknown entities resolve to identity.
    pub fn world_matrix(&self, entity: EntityId) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        let mut cursor = Some(entity);
        while let Some(id) = cursor {
            let Some(n) = self.nodes.get(&id) else {
                break;
            };
            m = n.transform.matrix() * m;
            cursor = n.parent;
        }
        m
    }

    pub fn world_position(&self, entity: EntityId) -> Vec3 {
        self.world_matrix(entity).transform_point3(Vec3::ZERO)
    }

    /// Position of `of` expressed in `relative_to`'s local frame.
    pub fn position_relative_to(&self, of: EntityId, relative_to: EntityId) -> Vec3 {
        let world = self.world_position(of);
        self.world_matrix(relative_to)
            .inverse()
            .transform_point3(world)
    }
}

impl RelativePositionSource for SceneGraph {
    fn position_relative_to(&self, of: EntityId, relative_to: EntityId) -> Vec3 {
        SceneGraph::position_relative_to(self, of, relative_to)
    }
}
