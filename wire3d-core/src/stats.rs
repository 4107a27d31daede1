/// Per-frame render metrics
use std::time::Duration;

/// Counters filled in by a render pass when passed to
/// [`Scene::render_with_stats`](crate::scene::Scene::render_with_stats).
///
/// Counters accumulate; call [`RenderStats::reset`] between frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderStats {
    /// Scene-graph nodes visited
    pub objects: usize,
    pub polygons: usize,
    pub vertices: usize,
    /// Time spent projecting vertices
    pub transform_time: Duration,
    /// Time spent inside surface draw calls
    pub draw_time: Duration,
}

impl RenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn total_time(&self) -> Duration {
        self.transform_time + self.draw_time
    }
}
