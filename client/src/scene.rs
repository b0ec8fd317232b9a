//! Rendering surface seam.
//!
//! The annotator never draws anything itself. It places renderables through
//! [`Scene`] and reads the controller pose from it. [`MarkerSet`] is the
//! in-memory scene used by headless participants and tests.

use frames::Marker;

use crate::pose::Pose;

/// What the annotator needs from a rendering surface.
pub trait Scene {
    /// Whatever the surface hands back for a placed renderable.
    type Handle;

    /// Place one renderable. Must accept any values, including non-finite ones.
    fn add_renderable(&mut self, position: [f64; 3], orientation: [f64; 4]) -> Self::Handle;

    /// Current world-space pose of the input controller.
    fn current_pose(&self) -> Pose;
}

/// In-memory scene: every renderable in application order, plus a settable
/// controller pose.
#[derive(Clone, Debug, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
    pose: Pose,
}

impl MarkerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_pose(pose: Pose) -> Self {
        Self { markers: Vec::new(), pose }
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl Scene for MarkerSet {
    /// Index into [`MarkerSet::markers`].
    type Handle = usize;

    fn add_renderable(&mut self, position: [f64; 3], orientation: [f64; 4]) -> usize {
        self.markers.push(Marker::new(position, orientation));
        self.markers.len() - 1
    }

    fn current_pose(&self) -> Pose {
        self.pose
    }
}
