/// Scenes: a camera plus the root-level objects it looks at
use tracing::{debug, trace};

use crate::object::{Object3d, ObjectId};
use crate::projection::Camera;
use crate::stats::RenderStats;
use crate::surface::Surface;

pub struct Scene {
    pub name: String,
    pub camera: Camera,
    objects: Vec<Object3d>,
}

impl Scene {
    /// Empty scene with an orthographic 640x480 camera
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_camera(name, Camera::default())
    }

    pub fn with_camera(name: impl Into<String>, camera: Camera) -> Self {
        Self {
            name: name.into(),
            camera,
            objects: Vec::new(),
        }
    }

    /// Adds a root-level object. The scene takes ownership and clones get
    /// fresh ids, so the same object can never be at the root level twice.
    pub fn add_object(&mut self, object: Object3d) -> ObjectId {
        let id = object.id();
        debug!(scene = %self.name, object = %object.name, %id, "adding object");
        self.objects.push(object);
        id
    }

    /// Removes a root-level object. Descendants are not searched: detach them
    /// through their parent's [`Object3d::remove_child`]. Returns `None` if
    /// `id` is not at the root level.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<Object3d> {
        let index = self.objects.iter().position(|o| o.id() == id)?;
        let object = self.objects.remove(index);
        debug!(scene = %self.name, object = %object.name, %id, "removed object");
        Some(object)
    }

    pub fn objects(&self) -> &[Object3d] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut Object3d> {
        self.objects.iter_mut()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object3d> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object3d> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    /// Looks `id` up anywhere in the scene graph
    pub fn find(&self, id: ObjectId) -> Option<&Object3d> {
        self.objects.iter().find_map(|o| o.find(id))
    }

    pub fn find_mut(&mut self, id: ObjectId) -> Option<&mut Object3d> {
        self.objects.iter_mut().find_map(|o| o.find_mut(id))
    }

    /// Draws every root object, in insertion order
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.render_with_stats(surface, None);
    }

    /// Same as [`Scene::render`], accumulating counters into `stats`
    pub fn render_with_stats<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        mut stats: Option<&mut RenderStats>,
    ) {
        let clip_matrix = self.camera.get_camera_matrix() * self.camera.get_projection_matrix();
        trace!(scene = %self.name, objects = self.objects.len(), "rendering scene");

        for object in &self.objects {
            object.render(surface, &clip_matrix, stats.as_deref_mut());
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("UnknownScene")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector3;

    #[test]
    fn test_add_and_remove_roots() {
        let mut scene = Scene::new("Test");
        let a = scene.add_object(Object3d::new("Same"));
        let b = scene.add_object(Object3d::new("Same"));
        assert_ne!(a, b);
        assert_eq!(scene.object_count(), 2);

        let removed = scene.remove_object(a).expect("root object");
        assert_eq!(removed.id(), a);
        assert!(scene.remove_object(a).is_none());
        assert_eq!(scene.object_count(), 1);
        assert!(scene.object(b).is_some());
    }

    #[test]
    fn test_reinserted_object_keeps_identity() {
        let mut scene = Scene::new("Test");
        let id = scene.add_object(Object3d::new("Once"));
        let object = scene.remove_object(id).expect("present");
        assert_eq!(scene.add_object(object), id);
        assert_eq!(scene.object_count(), 1);
    }

    #[test]
    fn test_clones_are_separate_roots() {
        let mut scene = Scene::new("Test");
        let original = Object3d::new("Cube");
        let copy = original.clone();
        let a = scene.add_object(original);
        let b = scene.add_object(copy);
        assert_ne!(a, b);
        assert_eq!(scene.object_count(), 2);
        assert_eq!(scene.object(b).map(|o| o.name.as_str()), Some("Cube"));
    }

    #[test]
    fn test_remove_does_not_search_descendants() {
        let mut scene = Scene::new("Test");
        let mut parent = Object3d::new("Parent");
        let child = parent.add_child(Object3d::new("Child"));
        let parent = scene.add_object(parent);

        assert!(scene.remove_object(child).is_none());
        assert!(scene.find(child).is_some());

        scene
            .object_mut(parent)
            .and_then(|p| p.remove_child(child))
            .expect("child detached through its parent");
        assert!(scene.find(child).is_none());
    }

    #[test]
    fn test_find_mut_reaches_children() {
        let mut scene = Scene::default();
        let mut parent = Object3d::new("Parent");
        let child = parent.add_child(Object3d::new("Child"));
        scene.add_object(parent);
        scene.find_mut(child).expect("child").position = Vector3::X;
        assert_eq!(scene.find(child).expect("child").position, Vector3::X);
    }

    #[test]
    fn test_render_caches_projection() {
        let mut scene = Scene::new("Test");
        let mut surface = crate::surface::RecordingSurface::new(640, 480);
        scene.render(&mut surface);
        assert_eq!(*scene.camera.last_projection(), scene.camera.projection_matrix());
    }
}
