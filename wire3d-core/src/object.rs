/// Scene-graph nodes and their local-to-world transform composition
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::geometry::Mesh;
use crate::material::Material;
use crate::matrix::Matrix4;
use crate::quaternion::Quaternion;
use crate::stats::RenderStats;
use crate::surface::Surface;
use crate::vector::{Vector3, Vector4};

/// Identity of a scene-graph node, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ObjectId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the scene graph.
///
/// Position, rotation and scale are relative to the parent. A node owns its
/// children outright, so the graph is always a tree; meshes and materials are
/// shared and only drawn when both are present.
#[derive(Debug)]
pub struct Object3d {
    id: ObjectId,
    pub name: String,
    pub position: Vector3,
    pub rotation: Quaternion,
    pub scale: Vector3,
    pub mesh: Option<Rc<Mesh>>,
    pub material: Option<Rc<Material>>,
    children: Vec<Object3d>,
}

impl Object3d {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::next(),
            name: name.into(),
            position: Vector3::ZERO,
            rotation: Quaternion::identity(),
            scale: Vector3::ONE,
            mesh: None,
            material: None,
            children: Vec::new(),
        }
    }

    /// Builder form attaching a mesh and the material to draw it with
    pub fn with_mesh(mut self, mesh: Rc<Mesh>, material: Rc<Material>) -> Self {
        self.mesh = Some(mesh);
        self.material = Some(material);
        self
    }

    pub fn with_position(mut self, position: Vector3) -> Self {
        self.position = position;
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Scale, then rotation, then translation, for row vectors
    pub fn get_prs_matrix(position: &Vector3, rotation: &Quaternion, scale: &Vector3) -> Matrix4 {
        Matrix4::scale(scale) * rotation.as_rotation_matrix() * Matrix4::translation(position)
    }

    /// Local transformation matrix, recomputed on every call
    pub fn get_matrix(&self) -> Matrix4 {
        Self::get_prs_matrix(&self.position, &self.rotation, &self.scale)
    }

    /// Draws this node and, pre-order, its whole subtree.
    ///
    /// `clip_matrix` is everything above this node: the parent transforms
    /// followed by view and projection.
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        clip_matrix: &Matrix4,
        mut stats: Option<&mut RenderStats>,
    ) {
        let mesh_matrix = self.get_matrix() * *clip_matrix;

        if let Some(stats) = stats.as_deref_mut() {
            stats.objects += 1;
        }

        if let (Some(mesh), Some(material)) = (&self.mesh, &self.material) {
            mesh.render(surface, &mesh_matrix, material, stats.as_deref_mut());
        } else if self.mesh.is_some() || self.material.is_some() {
            trace!(object = %self.name, "mesh or material missing, skipping draw");
        }

        for child in &self.children {
            child.render(surface, &mesh_matrix, stats.as_deref_mut());
        }
    }

    /// Appends `child` to this node's children
    pub fn add_child(&mut self, child: Object3d) -> ObjectId {
        let id = child.id;
        debug!(parent = %self.name, child = %child.name, "adding child");
        self.children.push(child);
        id
    }

    /// Detaches a direct child. Returns `None`, and does nothing, if `id` is
    /// not a direct child of this node.
    pub fn remove_child(&mut self, id: ObjectId) -> Option<Object3d> {
        let index = self.children.iter().position(|c| c.id == id)?;
        let child = self.children.remove(index);
        debug!(parent = %self.name, child = %child.name, "removed child");
        Some(child)
    }

    pub fn children(&self) -> &[Object3d] {
        &self.children
    }

    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Object3d> {
        self.children.iter_mut()
    }

    pub fn child(&self, id: ObjectId) -> Option<&Object3d> {
        self.children.iter().find(|c| c.id == id)
    }

    pub fn child_mut(&mut self, id: ObjectId) -> Option<&mut Object3d> {
        self.children.iter_mut().find(|c| c.id == id)
    }

    /// Depth-first search of this node and its descendants
    pub fn find(&self, id: ObjectId) -> Option<&Object3d> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: ObjectId) -> Option<&mut Object3d> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    fn transform_local(&self, v: Vector4) -> Vector3 {
        self.get_matrix().transform_row(&v).xyz()
    }

    /// Local origin pushed through the local matrix; matches `position`
    pub fn get_position(&self) -> Vector3 {
        self.transform_local(Vector4::new(0.0, 0.0, 0.0, 1.0))
    }

    /// Local +Z through the local matrix
    pub fn forward(&self) -> Vector3 {
        self.transform_local(Vector4::new(0.0, 0.0, 1.0, 0.0))
    }

    /// Local +Y through the local matrix
    pub fn up(&self) -> Vector3 {
        self.transform_local(Vector4::new(0.0, 1.0, 0.0, 0.0))
    }

    /// Local +X through the local matrix
    pub fn right(&self) -> Vector3 {
        self.transform_local(Vector4::new(1.0, 0.0, 0.0, 0.0))
    }
}

/// Deep copy of the subtree; the copy and each of its descendants get new ids
impl Clone for Object3d {
    fn clone(&self) -> Self {
        Self {
            id: ObjectId::next(),
            name: self.name.clone(),
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            mesh: self.mesh.clone(),
            material: self.material.clone(),
            children: self.children.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::surface::RecordingSurface;
    use std::f32::consts::FRAC_PI_2;

    fn cube_object(name: &str) -> Object3d {
        Object3d::new(name).with_mesh(
            Rc::new(Mesh::cube(Vector3::ONE)),
            Rc::new(Material::new(Color::RED, "Red")),
        )
    }

    #[test]
    fn test_prs_translates_origin() {
        let obj = Object3d::new("Moved").with_position(Vector3::new(2.0, 0.0, 0.0));
        let world = obj.get_matrix().transform_point(&Vector3::ZERO, 1.0);
        assert_eq!(world.xyz(), Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(obj.get_position(), obj.position);
    }

    #[test]
    fn test_prs_order_scales_before_rotating_and_translating() {
        let mut obj = Object3d::new("Node");
        obj.scale = Vector3::new(2.0, 1.0, 1.0);
        obj.rotation = Quaternion::from_axis_angle(&Vector3::Z, FRAC_PI_2);
        obj.position = Vector3::new(0.0, 0.0, 5.0);
        let p = obj.get_matrix().transform_point(&Vector3::X, 1.0).xyz();
        assert_eq!(p, Vector3::new(0.0, 2.0, 5.0));
    }

    #[test]
    fn test_basis_vectors_follow_rotation() {
        let mut obj = Object3d::new("Node");
        assert_eq!(obj.forward(), Vector3::Z);
        assert_eq!(obj.up(), Vector3::Y);
        assert_eq!(obj.right(), Vector3::X);

        obj.rotation = Quaternion::from_axis_angle(&Vector3::Y, FRAC_PI_2);
        assert_eq!(obj.forward(), Vector3::X);
        assert_eq!(obj.right(), Vector3::new(0.0, 0.0, -1.0));
        obj.position = Vector3::new(1.0, 1.0, 1.0);
        assert_eq!(obj.forward(), Vector3::X);
    }

    #[test]
    fn test_remove_child() {
        let mut parent = Object3d::new("Parent");
        let a = parent.add_child(Object3d::new("A"));
        let b = parent.add_child(Object3d::new("B"));
        let stranger = Object3d::new("Stranger");

        assert!(parent.remove_child(stranger.id()).is_none());
        assert_eq!(parent.children().len(), 2);

        let removed = parent.remove_child(a).expect("A is a child");
        assert_eq!(removed.name, "A");
        assert_eq!(parent.children().len(), 1);
        assert!(parent.child(b).is_some());
    }

    #[test]
    fn test_find_descendants() {
        let mut root = Object3d::new("Root");
        let mut middle = Object3d::new("Middle");
        let leaf = middle.add_child(Object3d::new("Leaf"));
        root.add_child(middle);

        assert_eq!(root.find(leaf).map(|o| o.name.as_str()), Some("Leaf"));
        root.find_mut(leaf).expect("leaf").position = Vector3::ONE;
        assert_eq!(root.find(leaf).expect("leaf").position, Vector3::ONE);
        assert!(root.child(leaf).is_none());
    }

    #[test]
    fn test_clone_mints_new_ids() {
        let mut root = Object3d::new("Root");
        let child = root.add_child(Object3d::new("Child"));
        let copy = root.clone();
        assert_ne!(copy.id(), root.id());
        assert!(copy.find(child).is_none());
        assert_eq!(copy.children()[0].name, "Child");
    }

    #[test]
    fn test_render_skips_incomplete_nodes_but_recurses() {
        let mut root = Object3d::new("MeshOnly");
        root.mesh = Some(Rc::new(Mesh::cube(Vector3::ONE)));
        root.add_child(cube_object("Child"));

        let mut surface = RecordingSurface::new(640, 480);
        let mut stats = RenderStats::new();
        root.render(&mut surface, &Matrix4::identity(), Some(&mut stats));

        assert_eq!(surface.polygon_count(), 6);
        assert_eq!(stats.objects, 2);
    }

    #[test]
    fn test_children_inherit_parent_transform() {
        let mut parent = Object3d::new("Parent").with_position(Vector3::new(1.0, 0.0, 0.0));
        let mut child = Object3d::new("Child").with_mesh(
            Rc::new(Mesh::triangle(Vector3::ZERO, Vector3::ZERO, Vector3::ZERO)),
            Rc::new(Material::default()),
        );
        child.position = Vector3::new(0.0, 2.0, 0.0);
        parent.add_child(child);

        let mut surface = RecordingSurface::new(100, 100);
        parent.render(&mut surface, &Matrix4::identity(), None);
        let points = surface.polygons().next().expect("child polygon");
        // (1, 2) in world space: x to the right of center, y above it
        assert_eq!(points[0].x, 51.0);
        assert_eq!(points[0].y, 48.0);
    }
}
