/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

#![warn(missing_docs)]

//! Roomba simulation library.
//!
//! A vacuuming robot moves through a rectangular room with optional internal
//! walls. The robot senses whether its last move bumped into something and
//! whether the floor tile underneath it is dirty, and responds with exactly
//! one action per step. Robots are run for one or more trials via
//! [`run_simulation`], and candidate robot parameters are scored over several
//! rooms in parallel via [`concurrent_test`].

use serde::{Deserialize, Serialize};

pub mod concurrent;
pub mod room;
pub mod simulation;

pub use concurrent::concurrent_test;
pub use room::{Point, RoomLayout, TileLocation, Wall};
pub use simulation::{run_simulation, SimulationConfig, SimulationReport, TrialResult};

/// Integer type used for room dimensions, tile coordinates and turn angles.
pub type Int = i32;

/// Float type used for positions, headings and scores.
pub type Float = f64;

/// Deterministic random number generator used throughout the simulation.
/// Callers seed it explicitly; the library never pulls ambient entropy.
pub type Rng = rand_pcg::Pcg64;

/// Roomba simulation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A wall endpoint lies outside the room bounds.
    #[error("wall endpoint ({x}, {y}) is outside the {width}x{height} room")]
    MalformedRoomLayout {
        /// X coordinate of the offending endpoint.
        x: Int,
        /// Y coordinate of the offending endpoint.
        y: Int,
        /// Room width.
        width: Int,
        /// Room height.
        height: Int,
    },

    /// An evaluation was requested over an empty set of rooms.
    #[error("no rooms to evaluate")]
    NoRooms,
}

/// Whether the robot's last move collided with a wall or the room boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BumpState {
    /// The last forward move was blocked.
    Bump,
    /// The last action completed without a collision.
    NoBump,
}

/// Whether the floor tile underneath the robot is dirty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirtState {
    /// The tile has not been cleaned yet.
    Dirty,
    /// The tile has been cleaned.
    Clean,
}

/// What the robot senses at the start of each step: its bump sensor and its
/// dirt sensor. Robots never observe their own position or heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Percept {
    /// Bump sensor reading.
    pub bump: BumpState,
    /// Dirt sensor reading for the tile underneath the robot.
    pub dirt: DirtState,
}

/// The closed set of actions a robot can take, exactly one per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotAction {
    /// Rotate clockwise by the given number of degrees without moving.
    TurnRight(Int),
    /// Clean the tile underneath the robot.
    Suck,
    /// Advance one unit of distance along the current heading.
    Forward,
}

/// A robot maps each [`Percept`] to exactly one [`RobotAction`].
///
/// The robot is not aware of the room; its only interface is the percept
/// coming in and the action going out. Implementations hold their own
/// parameters (e.g. a tuned turn angle) but must not inspect the room.
pub trait Robot {
    /// Decide the next action for the given percept.
    fn act(&mut self, percept: &Percept) -> RobotAction;
}

/// The reflex vacuuming robot: turn right on a bump, suck on dirt, otherwise
/// drive forward. Its single parameter is the turn angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflexRobot {
    /// Turn angle in degrees, applied on every bump.
    pub degrees: Int,

    /// A single-number state slot. The reflex policy never reads or writes
    /// it; it exists so future stateful strategies share the same shape.
    pub state: Int,
}

impl ReflexRobot {
    /// Create a reflex robot with the given turn angle in degrees.
    pub fn new(degrees: Int) -> Self {
        Self { degrees, state: 0 }
    }
}

impl Robot for ReflexRobot {
    fn act(&mut self, percept: &Percept) -> RobotAction {
        if percept.bump == BumpState::Bump {
            RobotAction::TurnRight(self.degrees)
        } else if percept.dirt == DirtState::Dirty {
            RobotAction::Suck
        } else {
            RobotAction::Forward
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflex_robot_turns_on_bump() {
        let mut robot = ReflexRobot::new(95);
        let percept = Percept {
            bump: BumpState::Bump,
            dirt: DirtState::Dirty,
        };
        assert_eq!(robot.act(&percept), RobotAction::TurnRight(95));
    }

    #[test]
    fn test_reflex_robot_sucks_on_dirt() {
        let mut robot = ReflexRobot::new(95);
        let percept = Percept {
            bump: BumpState::NoBump,
            dirt: DirtState::Dirty,
        };
        assert_eq!(robot.act(&percept), RobotAction::Suck);
    }

    #[test]
    fn test_reflex_robot_drives_forward_on_clean_floor() {
        let mut robot = ReflexRobot::new(95);
        let percept = Percept {
            bump: BumpState::NoBump,
            dirt: DirtState::Clean,
        };
        assert_eq!(robot.act(&percept), RobotAction::Forward);
    }

    #[test]
    fn test_reflex_robot_bump_takes_priority_over_dirt() {
        let mut robot = ReflexRobot::new(180);
        let percept = Percept {
            bump: BumpState::Bump,
            dirt: DirtState::Clean,
        };
        assert_eq!(robot.act(&percept), RobotAction::TurnRight(180));
    }
}
