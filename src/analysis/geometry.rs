//! Joint angle calculation
//!
//! The angle at vertex `b` is the difference of the polar angles of the rays
//! `b→c` and `b→a`, folded into `[0, 180]` degrees.

use crate::config::constants::geometry::{DEGENERATE_RAY_LENGTH_PX, MAX_ANGLE_DEGREES};
use crate::pose::types::Point2;

/// Unsigned interior angle at `b` in degrees, `[0, 180]`.
///
/// Undefined when `a == b` or `c == b`; callers that cannot rule that out
/// should use [`try_joint_angle`].
pub fn joint_angle(a: Point2, b: Point2, c: Point2) -> f32 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let angle = radians.to_degrees().abs();

    if angle > MAX_ANGLE_DEGREES {
        360.0 - angle
    } else {
        angle
    }
}

/// [`joint_angle`] guarded against coincident points and non-finite input
pub fn try_joint_angle(a: Point2, b: Point2, c: Point2) -> Option<f32> {
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return None;
    }
    if a.distance_to(&b) < DEGENERATE_RAY_LENGTH_PX || c.distance_to(&b) < DEGENERATE_RAY_LENGTH_PX {
        return None;
    }
    Some(joint_angle(a, b, c))
}
