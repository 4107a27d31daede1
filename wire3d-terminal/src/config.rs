/// Command line configuration for the terminal frontend
use clap::{Parser, ValueEnum};

/// Which demo scene to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoKind {
    /// Parent cube spinning with a child cube attached
    Hierarchy,
    /// A spinning UV sphere
    Sphere,
    /// Material-classified heightfield terrain
    Terrain,
    /// Shoot down missiles homing in on the camera
    Shooter,
    /// Tumbling cubes falling under gravity
    Cubefall,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "wire3d-terminal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Wireframe 3D renderer for the terminal", long_about = None)]
pub struct AppConfig {
    /// Demo scene
    #[arg(short, long, value_enum, default_value = "hierarchy")]
    pub demo: DemoKind,

    /// Start with an orthographic camera
    #[arg(long)]
    pub ortho: bool,

    /// Vertical field of view in degrees
    #[arg(long, default_value = "60")]
    pub fov: f32,

    /// Near clipping plane distance
    #[arg(long, default_value = "1")]
    pub near: f32,

    /// Far clipping plane distance
    #[arg(long, default_value = "100")]
    pub far: f32,

    /// Target frames per second
    #[arg(long, default_value = "30")]
    pub fps: u32,

    /// Line width for every demo material, 0 fills polygons
    #[arg(long)]
    pub line_width: Option<u32>,

    /// Seed for the terrain noise and spawn randomness
    #[arg(long, default_value = "7")]
    pub seed: u64,

    /// Log at debug level (logs go to stderr)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            demo: DemoKind::Hierarchy,
            ortho: false,
            fov: 60.0,
            near: 1.0,
            far: 100.0,
            fps: 30,
            line_width: None,
            seed: 7,
            verbose: false,
        }
    }
}
