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

//! Running robots in a room.
//!
//! A trial places one or more robots in a fully dirty room and steps them
//! round-robin until either `min_clean` of the tiles are clean or the step
//! budget runs out. [`run_simulation`] repeats that for a number of trials
//! and reports the results.

use rand::{Rng as _, SeedableRng};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::room::{Point, RoomLayout, TileLocation};
use crate::{BumpState, DirtState, Float, Percept, Robot, RobotAction, Rng};

/// Configuration for [`run_simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of robots sharing the room. Each robot has its own position
    /// and heading; the dirt grid is shared.
    pub num_robots: usize,

    /// A trial ends once this fraction of tiles is clean.
    pub min_clean: Float,

    /// Number of independent trials to run.
    pub num_trials: usize,

    /// Step budget per trial. A step advances every robot once. Trials that
    /// exhaust the budget stop there; they never hang.
    pub max_steps: usize,

    /// Where robots start. `None` picks a uniformly random position per
    /// trial. Headings are always random.
    pub start_location: Option<Point>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_robots: 1,
            min_clean: 0.95,
            num_trials: 1,
            max_steps: 5000,
            start_location: None,
        }
    }
}

/// Outcome of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Steps taken before the trial ended.
    pub steps: usize,

    /// Fraction of tiles clean when the trial ended.
    pub clean_fraction: Float,

    /// Whether the trial reached `min_clean` before the step budget ran out.
    pub reached_min_clean: bool,
}

/// Outcome of all trials of one configuration. Consumed for printing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Per-trial outcomes, in trial order.
    pub trials: Vec<TrialResult>,
}

impl SimulationReport {
    /// Mean steps across trials.
    pub fn mean_steps(&self) -> Float {
        if self.trials.is_empty() {
            return 0.0;
        }
        let total: usize = self.trials.iter().map(|t| t.steps).sum();
        total as Float / self.trials.len() as Float
    }

    /// Mean clean fraction across trials.
    pub fn mean_clean_fraction(&self) -> Float {
        if self.trials.is_empty() {
            return 0.0;
        }
        let total: Float = self.trials.iter().map(|t| t.clean_fraction).sum();
        total / self.trials.len() as Float
    }
}

impl std::fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, trial) in self.trials.iter().enumerate() {
            let outcome = if trial.reached_min_clean {
                "target reached"
            } else {
                "step budget exhausted"
            };
            writeln!(
                f,
                "trial {}: {} steps, {:.1}% clean ({})",
                i,
                trial.steps,
                trial.clean_fraction * 100.0,
                outcome
            )?;
        }
        write!(
            f,
            "mean: {:.1} steps, {:.1}% clean",
            self.mean_steps(),
            self.mean_clean_fraction() * 100.0
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Pose {
    position: Point,
    heading: Float,
    bumped: bool,
}

/// The mutable world of a single trial: the shared dirt grid plus every
/// robot's position, heading and bump sensor. The room layout itself is
/// read-only configuration.
pub struct RoomEnvironment<'a> {
    room: &'a RoomLayout,
    dirt: FxHashMap<TileLocation, DirtState>,
    poses: Vec<Pose>,
}

impl<'a> RoomEnvironment<'a> {
    /// Place `num_robots` robots in a fully dirty room. Positions come from
    /// `start_location`, or are drawn from `rng` when it is `None`.
    pub fn new(
        room: &'a RoomLayout,
        num_robots: usize,
        start_location: Option<Point>,
        rng: &mut Rng,
    ) -> Self {
        let mut dirt = FxHashMap::default();
        for x in 0..room.width() {
            for y in 0..room.height() {
                dirt.insert(TileLocation { x, y }, DirtState::Dirty);
            }
        }
        let poses = (0..num_robots)
            .map(|_| {
                let position = start_location.unwrap_or_else(|| Point {
                    x: rng.gen_range(0.0..room.width() as Float),
                    y: rng.gen_range(0.0..room.height() as Float),
                });
                Pose {
                    position,
                    heading: rng.gen_range(0.0..360.0),
                    bumped: false,
                }
            })
            .collect();
        Self { room, dirt, poses }
    }

    /// The percept for robot `i`.
    pub fn percept(&self, i: usize) -> Percept {
        let pose = &self.poses[i];
        let tile = self.room.tile_of(pose.position);
        Percept {
            bump: if pose.bumped {
                BumpState::Bump
            } else {
                BumpState::NoBump
            },
            dirt: *self.dirt.get(&tile).unwrap_or(&DirtState::Clean),
        }
    }

    /// Apply robot `i`'s action. The bump sensor reports only the most
    /// recent forward attempt; any other action resets it.
    pub fn execute(&mut self, i: usize, action: &RobotAction) {
        let pose = &mut self.poses[i];
        match action {
            RobotAction::TurnRight(degrees) => {
                pose.heading = (pose.heading - *degrees as Float).rem_euclid(360.0);
                pose.bumped = false;
            }
            RobotAction::Suck => {
                let tile = self.room.tile_of(pose.position);
                self.dirt.insert(tile, DirtState::Clean);
                pose.bumped = false;
            }
            RobotAction::Forward => {
                let radians = pose.heading.to_radians();
                let to = Point {
                    x: pose.position.x + radians.cos(),
                    y: pose.position.y + radians.sin(),
                };
                if self.room.blocks(pose.position, to) {
                    pose.bumped = true;
                } else {
                    pose.position = to;
                    pose.bumped = false;
                }
            }
        }
    }

    /// Fraction of tiles that are clean.
    pub fn clean_fraction(&self) -> Float {
        if self.dirt.is_empty() {
            return 1.0;
        }
        let clean = self
            .dirt
            .values()
            .filter(|&s| *s == DirtState::Clean)
            .count();
        clean as Float / self.dirt.len() as Float
    }
}

/// Run one trial: step every robot once per step until `min_clean` is
/// reached or the budget runs out.
pub(crate) fn run_trial<R: Robot>(
    room: &RoomLayout,
    robots: &mut [R],
    min_clean: Float,
    max_steps: usize,
    start_location: Option<Point>,
    rng: &mut Rng,
) -> TrialResult {
    let mut environment = RoomEnvironment::new(room, robots.len(), start_location, rng);
    let mut steps = 0;
    while steps < max_steps && environment.clean_fraction() < min_clean {
        for (i, robot) in robots.iter_mut().enumerate() {
            let percept = environment.percept(i);
            let action = robot.act(&percept);
            environment.execute(i, &action);
        }
        steps += 1;
    }
    let clean_fraction = environment.clean_fraction();
    TrialResult {
        steps,
        clean_fraction,
        reached_min_clean: clean_fraction >= min_clean,
    }
}

/// Derive an independent, deterministic rng for one trial of a run.
pub(crate) fn trial_rng(seed: u64, index: u64) -> Rng {
    Rng::seed_from_u64(seed.wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
}

/// Run every trial of one configuration on one room and collect the results.
///
/// `make_robot` builds a fresh robot per slot per trial; callers capture the
/// robot's parameters (e.g. the turn angle) in the closure. `seed` makes the
/// whole run deterministic: the same seed gives the same report.
pub fn run_simulation<R, F>(
    config: &SimulationConfig,
    room: &RoomLayout,
    make_robot: F,
    seed: u64,
) -> SimulationReport
where
    R: Robot,
    F: Fn() -> R,
{
    let trials = (0..config.num_trials)
        .map(|trial| {
            let mut rng = trial_rng(seed, trial as u64);
            let mut robots: Vec<R> = (0..config.num_robots).map(|_| make_robot()).collect();
            run_trial(
                room,
                &mut robots,
                config.min_clean,
                config.max_steps,
                config.start_location,
                &mut rng,
            )
        })
        .collect();
    SimulationReport { trials }
}
