//! Path following.
//!
//! A [`PathFollower`] walks a character along a list of world waypoints. Each
//! step moves toward the current waypoint by `speed * delta`; once the
//! character is within the arrival threshold the follower moves on to the next
//! waypoint. Consuming the last waypoint yields [`MoveStatus::Arrived`] once,
//! after which the follower is idle again.

use std::collections::VecDeque;

use snowglobe_types::WorldPos;
use tracing::trace;

/// Default distance at which a waypoint counts as reached.
pub const DEFAULT_ARRIVAL_THRESHOLD: f32 = 10.0;

/// Result of one movement step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveStatus {
    /// No path is being followed.
    Idle,
    /// Still travelling.
    Moving,
    /// The final waypoint was reached at this position.
    Arrived(WorldPos),
}

/// Follows a queue of waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFollower {
    waypoints: VecDeque<WorldPos>,
    arrival_threshold: f32,
}

impl Default for PathFollower {
    fn default() -> Self {
        Self::new(DEFAULT_ARRIVAL_THRESHOLD)
    }
}

impl PathFollower {
    /// An idle follower.
    pub const fn new(arrival_threshold: f32) -> Self {
        Self {
            waypoints: VecDeque::new(),
            arrival_threshold,
        }
    }

    /// Replace the current path.
    pub fn set_path(&mut self, path: Vec<WorldPos>) {
        self.waypoints = path.into();
    }

    /// Abandon the current path.
    pub fn clear(&mut self) {
        self.waypoints.clear();
    }

    /// Whether a path is being followed.
    pub fn is_moving(&self) -> bool {
        !self.waypoints.is_empty()
    }

    /// Waypoints not yet reached.
    pub fn remaining(&self) -> usize {
        self.waypoints.len()
    }

    /// The waypoint currently being approached.
    pub fn next_waypoint(&self) -> Option<WorldPos> {
        self.waypoints.front().copied()
    }

    /// Advance `position` along the path by up to `speed * delta`.
    pub fn step(&mut self, position: &mut WorldPos, speed: f32, delta: f32) -> MoveStatus {
        let Some(target) = self.waypoints.front().copied() else {
            return MoveStatus::Idle;
        };

        *position = position.step_toward(target, (speed * delta).max(0.0));

        if position.distance_to(target) <= self.arrival_threshold {
            self.waypoints.pop_front();
            trace!(remaining = self.waypoints.len(), waypoint = %target, "Waypoint reached");
            if self.waypoints.is_empty() {
                return MoveStatus::Arrived(*position);
            }
        }
        MoveStatus::Moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_without_path() {
        let mut follower = PathFollower::default();
        let mut pos = WorldPos::new(0.0, 0.0);
        assert_eq!(follower.step(&mut pos, 100.0, 1.0), MoveStatus::Idle);
        assert_eq!(pos, WorldPos::new(0.0, 0.0));
    }

    #[test]
    fn walks_each_waypoint_then_arrives_once() {
        let mut follower = PathFollower::default();
        follower.set_path(vec![WorldPos::new(100.0, 0.0), WorldPos::new(100.0, 100.0)]);
        let mut pos = WorldPos::new(0.0, 0.0);

        assert_eq!(follower.step(&mut pos, 60.0, 1.0), MoveStatus::Moving);
        assert_eq!(follower.remaining(), 2);
        assert_eq!(follower.step(&mut pos, 60.0, 1.0), MoveStatus::Moving);
        assert_eq!(follower.remaining(), 1);
        assert_eq!(follower.step(&mut pos, 60.0, 1.0), MoveStatus::Moving);

        let status = follower.step(&mut pos, 60.0, 1.0);
        assert_eq!(status, MoveStatus::Arrived(pos));
        assert!(pos.distance_to(WorldPos::new(100.0, 100.0)) <= DEFAULT_ARRIVAL_THRESHOLD);
        assert_eq!(follower.step(&mut pos, 60.0, 1.0), MoveStatus::Idle);
    }

    #[test]
    fn clear_stops_movement() {
        let mut follower = PathFollower::new(1.0);
        follower.set_path(vec![WorldPos::new(50.0, 0.0)]);
        assert!(follower.is_moving());
        follower.clear();
        assert!(!follower.is_moving());
        assert!(follower.next_waypoint().is_none());
    }
}
