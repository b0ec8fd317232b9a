//! Controller pose and marker placement math.
//!
//! Quaternions are `[x, y, z, w]`. Rotation assumes a unit quaternion, which
//! is what tracked controllers report; other inputs are passed through the
//! same arithmetic without checks.

/// Marker placement relative to the controller: 5 cm along its forward (-Z) axis.
pub const TIP_OFFSET: [f64; 3] = [0.0, 0.0, -0.05];

/// Identity rotation.
pub const IDENTITY_ORIENTATION: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

/// World-space pose of the input controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: [f64; 3],
    pub orientation: [f64; 4],
}

impl Pose {
    #[must_use]
    pub fn new(position: [f64; 3], orientation: [f64; 4]) -> Self {
        Self { position, orientation }
    }

    /// Controller at the origin with no rotation.
    #[must_use]
    pub fn identity() -> Self {
        Self::new([0.0; 3], IDENTITY_ORIENTATION)
    }

    /// Pose at `position` turned `yaw` radians about the vertical (+Y) axis.
    #[must_use]
    pub fn from_yaw(position: [f64; 3], yaw: f64) -> Self {
        let half = yaw / 2.0;
        Self::new(position, [0.0, half.sin(), 0.0, half.cos()])
    }

    /// Map a point from controller space into world space.
    #[must_use]
    pub fn transform_point(&self, local: [f64; 3]) -> [f64; 3] {
        let rotated = rotate(self.orientation, local);
        [
            self.position[0] + rotated[0],
            self.position[1] + rotated[1],
            self.position[2] + rotated[2],
        ]
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rotate `v` by the quaternion `q`.
#[must_use]
pub fn rotate(q: [f64; 4], v: [f64; 3]) -> [f64; 3] {
    let u = [q[0], q[1], q[2]];
    let w = q[3];

    // v' = v + w*t + u x t, with t = 2 (u x v)
    let t = cross(u, v).map(|c| 2.0 * c);
    let ut = cross(u, t);
    [
        v[0] + w * t[0] + ut[0],
        v[1] + w * t[1] + ut[1],
        v[2] + w * t[2] + ut[2],
    ]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[cfg(test)]
#[path = "pose_test.rs"]
mod tests;
