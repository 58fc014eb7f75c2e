//! Closed-form ballistic trajectories for mortar shells.

use thiserror::Error;
use tile_defense_core::Vec3;

/// Downward acceleration applied to shells, in tiles per second squared.
pub const GRAVITY: f32 = 9.81;

/// Extra horizontal reach added on top of the targeting range when deriving
/// the launch speed, so that targets on the edge of the range stay reachable.
const RANGE_SLACK: f32 = 0.25001;

/// Failure to find a trajectory with the available launch speed.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum BallisticsError {
    /// The target lies beyond what the launch speed can reach.
    #[error(
        "launch speed {speed} cannot reach a target {distance} away and {height} above the launch point"
    )]
    OutOfReach {
        /// Launch speed of the shell.
        speed: f32,
        /// Horizontal distance to the target.
        distance: f32,
        /// Height of the target relative to the launch point.
        height: f32,
    },
}

/// Smallest launch speed that reaches every target within `targeting_range`
/// on the ground when shells leave from `launch_height`.
#[must_use]
pub fn launch_speed(targeting_range: f32, launch_height: f32) -> f32 {
    let x = targeting_range + RANGE_SLACK;
    let y = -launch_height;
    (GRAVITY * (y + (x * x + y * y).sqrt())).sqrt()
}

/// Solves the launch velocity that lands a shell fired at `speed` on `target`.
///
/// The steeper of the two solutions is chosen.
pub fn solve_launch_velocity(
    launch: Vec3,
    target: Vec3,
    speed: f32,
) -> Result<Vec3, BallisticsError> {
    let mut dx = target.x - launch.x;
    let mut dz = target.z - launch.z;
    let x = (dx * dx + dz * dz).sqrt();
    let y = target.y - launch.y;

    let s2 = speed * speed;
    let r = s2 * s2 - GRAVITY * (GRAVITY * x * x + 2.0 * y * s2);
    if r < 0.0 {
        return Err(BallisticsError::OutOfReach {
            speed,
            distance: x,
            height: y,
        });
    }

    if x > 0.0 {
        dx /= x;
        dz /= x;
    }

    let theta = (s2 + r.sqrt()).atan2(GRAVITY * x);
    let (sin, cos) = theta.sin_cos();
    Ok(Vec3::new(speed * cos * dx, speed * sin, speed * cos * dz))
}

/// Position of a shell `age` seconds after leaving `launch` with `velocity`.
#[must_use]
pub fn position_at(launch: Vec3, velocity: Vec3, age: f32) -> Vec3 {
    let mut position = launch + velocity * age;
    position.y -= 0.5 * GRAVITY * age * age;
    position
}

/// Velocity of a shell `age` seconds after launch.
#[must_use]
pub fn velocity_at(velocity: Vec3, age: f32) -> Vec3 {
    Vec3::new(velocity.x, velocity.y - GRAVITY * age, velocity.z)
}
