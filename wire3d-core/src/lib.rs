/// wire3d Core Library - 3D math and the wireframe rendering pipeline
///
/// Vector, quaternion and matrix algebra, a scene graph of transformable
/// objects, cameras with projection and screen-ray reconstruction, and the
/// traversal that turns 3D polygon lists into 2D polygons on a [`Surface`].

pub mod color;
pub mod error;
pub mod geometry;
pub mod interop;
pub mod material;
pub mod matrix;
pub mod object;
pub mod ops;
pub mod projection;
pub mod quaternion;
pub mod scene;
pub mod stats;
pub mod surface;
pub mod vector;

// Re-export commonly used types
pub use color::Color;
pub use error::MathError;
pub use geometry::{Mesh, Polygon};
pub use material::Material;
pub use matrix::Matrix4;
pub use object::{Object3d, ObjectId};
pub use projection::{Camera, Ray};
pub use quaternion::Quaternion;
pub use scene::Scene;
pub use stats::RenderStats;
pub use surface::{DrawCommand, RecordingSurface, ScreenPoint, Surface};
pub use vector::{cross_product, dot_product, Vector3, Vector4};
