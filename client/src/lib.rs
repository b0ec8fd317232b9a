//! Annotation client core.
//!
//! ARCHITECTURE
//! ============
//! The client turns a held paint trigger into a stream of markers and keeps a
//! local view in sync with every other participant:
//!
//! - `trigger`: the `Idle`/`Painting` state machine driven by select events.
//! - `pose`: controller pose and the tip placement math.
//! - `scene`: the rendering surface seam plus an in-memory `MarkerSet`.
//! - `transport`: the fire-and-forget send seam plus the websocket transport.
//! - `annotator`: ties the four together; one instance per participant.
//!
//! The annotator runs on one logical thread. The websocket transport's reader
//! and writer tasks only talk to it through channels.

pub mod annotator;
pub mod pose;
pub mod scene;
pub mod transport;
pub mod trigger;

pub use annotator::{Annotator, create_local_marker};
pub use frames::Marker;
pub use pose::{Pose, TIP_OFFSET};
pub use scene::{MarkerSet, Scene};
pub use transport::{ClientError, Encoding, Transport, WsTransport};
pub use trigger::{PaintTrigger, TriggerState};
