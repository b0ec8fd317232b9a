//! Per-participant annotation loop.
//!
//! Local markers are applied to the scene before they are sent, so a
//! participant always sees its own strokes even when the relay is gone. The
//! relay never echoes a marker back to its sender, so nothing is applied twice.

use frames::{Frame, Marker};
use tokio::sync::mpsc;
use tracing::debug;

use crate::pose::{Pose, TIP_OFFSET};
use crate::scene::Scene;
use crate::transport::Transport;
use crate::trigger::{PaintTrigger, TriggerState};

/// Marker at the controller tip for `pose`.
#[must_use]
pub fn create_local_marker(pose: &Pose) -> Marker {
    Marker::new(pose.transform_point(TIP_OFFSET), pose.orientation)
}

pub struct Annotator<S, T> {
    scene: S,
    transport: T,
    trigger: PaintTrigger,
}

impl<S: Scene, T: Transport> Annotator<S, T> {
    #[must_use]
    pub fn new(scene: S, transport: T) -> Self {
        Self { scene, transport, trigger: PaintTrigger::new() }
    }

    pub fn select_start(&mut self) {
        if self.trigger.select_start() {
            debug!("paint trigger engaged");
        }
    }

    pub fn select_end(&mut self) {
        if self.trigger.select_end() {
            debug!("paint trigger released");
        }
    }

    #[must_use]
    pub fn trigger_state(&self) -> TriggerState {
        self.trigger.state()
    }

    /// Run one frame of the render loop.
    ///
    /// While painting, places exactly one marker at the controller tip,
    /// renders it locally, then sends it. Returns the marker, if any.
    pub fn tick(&mut self) -> Option<Marker> {
        if !self.trigger.is_painting() {
            return None;
        }
        let marker = create_local_marker(&self.scene.current_pose());
        self.apply_marker(&marker);
        self.send_marker(&marker);
        Some(marker)
    }

    /// Add one renderable for `marker`. Applying the same marker twice yields two.
    pub fn apply_marker(&mut self, marker: &Marker) -> S::Handle {
        self.scene.add_renderable(marker.position, marker.orientation)
    }

    /// Publish `marker` as a `paint` frame. Fire-and-forget.
    pub fn send_marker(&self, marker: &Marker) {
        self.transport.send(&Frame::paint(marker));
    }

    /// Render a marker received from another participant.
    pub fn on_remote_marker(&mut self, marker: &Marker) -> S::Handle {
        self.apply_marker(marker)
    }

    /// Apply every remote marker already waiting on `rx`, in arrival order.
    pub fn drain_remote(&mut self, rx: &mut mpsc::UnboundedReceiver<Marker>) -> usize {
        let mut applied = 0;
        while let Ok(marker) = rx.try_recv() {
            self.on_remote_marker(&marker);
            applied += 1;
        }
        applied
    }

    #[must_use]
    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn into_parts(self) -> (S, T) {
        (self.scene, self.transport)
    }
}

#[cfg(test)]
#[path = "annotator_test.rs"]
mod tests;
