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

//! Tuning the reflex robot's turn angle against simulated rooms.
//!
//! This crate wires the genetic loop to the roomba simulation: candidate
//! turn angles are scored by how many steps a reflex robot needs to clean a
//! share of each tuning room, and the loop keeps the cheapest angles.

use genetic_tuner::{Fitness, Gene, TuneError, TuneOutcome, Tuner};
use roomba_sim::{concurrent_test, Float, Point, ReflexRobot, RoomLayout, SimError};

/// Tuning error: either the rooms are unusable or the genetic loop failed.
#[derive(Debug, thiserror::Error)]
pub enum TunedRobotError {
    /// The simulator rejected the configuration.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// The genetic loop failed.
    #[error(transparent)]
    Tune(#[from] TuneError),
}

/// The seven sample rooms: two empty 10x10 rooms and five 30x30 rooms with
/// increasingly awkward internal walls.
///
/// Explicit configuration for the caller to own and pass around; nothing in
/// this workspace holds a room set as global state.
pub fn sample_rooms() -> Result<Vec<RoomLayout>, SimError> {
    let small_empty = RoomLayout::new(10, 10);
    let large_empty = RoomLayout::new(10, 10);

    let mut medium_walls_1 = RoomLayout::new(30, 30);
    medium_walls_1.set_wall((5, 5), (25, 25))?;

    let mut medium_walls_2 = RoomLayout::new(30, 30);
    medium_walls_2.set_wall((5, 25), (25, 25))?;
    medium_walls_2.set_wall((5, 5), (25, 5))?;

    let mut medium_walls_3 = RoomLayout::new(30, 30);
    medium_walls_3.set_wall((5, 5), (25, 25))?;
    medium_walls_3.set_wall((5, 15), (15, 25))?;
    medium_walls_3.set_wall((15, 5), (25, 15))?;

    let mut medium_walls_4 = RoomLayout::new(30, 30);
    medium_walls_4.set_wall((7, 5), (26, 5))?;
    medium_walls_4.set_wall((26, 5), (26, 25))?;
    medium_walls_4.set_wall((26, 25), (7, 25))?;

    let mut medium_walls_5 = RoomLayout::new(30, 30);
    medium_walls_5.set_wall((7, 5), (26, 5))?;
    medium_walls_5.set_wall((26, 5), (26, 25))?;
    medium_walls_5.set_wall((26, 25), (7, 25))?;
    medium_walls_5.set_wall((7, 5), (7, 22))?;

    Ok(vec![
        small_empty,
        large_empty,
        medium_walls_1,
        medium_walls_2,
        medium_walls_3,
        medium_walls_4,
        medium_walls_5,
    ])
}

/// The initial candidate range: turn angles 50 to 340 in steps of 10
/// degrees, 30 candidates in all.
pub fn initial_population() -> Vec<Gene> {
    (50..350).step_by(10).collect()
}

/// Scores a turn angle by simulation: the mean number of steps a reflex
/// robot with that angle needs to clean `min_clean` of each room, one trial
/// per room, capped at `max_steps`. Lower is better.
pub struct SimulationFitness {
    /// Rooms every candidate is evaluated against.
    pub rooms: Vec<RoomLayout>,
    /// Start location for every trial, or `None` for random starts.
    pub start_location: Option<Point>,
    /// Clean fraction a trial must reach.
    pub min_clean: Float,
    /// Step budget per trial.
    pub max_steps: usize,
    /// Trials per room per candidate.
    pub num_trials: usize,
    /// Seed for the per-trial rngs.
    pub seed: u64,
}

impl Fitness for SimulationFitness {
    type Error = SimError;

    fn evaluate(&self, gene: Gene) -> Result<Float, SimError> {
        concurrent_test(
            || ReflexRobot::new(gene),
            &self.rooms,
            self.num_trials,
            self.start_location,
            self.min_clean,
            self.max_steps,
            self.seed,
        )
    }
}

/// Tune the reflex robot's turn angle against the first two of the given
/// rooms, one trial per room per candidate.
///
/// Evaluating on the cheap empty rooms keeps the tuning run short; the tuned
/// angle is then used wherever the caller likes. Same seed, same outcome.
pub fn tune_turn_angle(
    rooms: &[RoomLayout],
    start_location: Option<Point>,
    min_clean: Float,
    max_steps: usize,
    seed: u64,
) -> Result<TuneOutcome, TunedRobotError> {
    let tuning_rooms = rooms[..rooms.len().min(2)].to_vec();
    let fitness = SimulationFitness {
        rooms: tuning_rooms,
        start_location,
        min_clean,
        max_steps,
        num_trials: 1,
        seed,
    };
    let tuner = Tuner::new(fitness);
    Ok(tuner.tune(initial_population())?)
}

/// A reflex robot that tunes its own turn angle before use.
pub fn tuned_robot(
    rooms: &[RoomLayout],
    start_location: Option<Point>,
    min_clean: Float,
    max_steps: usize,
    seed: u64,
) -> Result<ReflexRobot, TunedRobotError> {
    let outcome = tune_turn_angle(rooms, start_location, min_clean, max_steps, seed)?;
    Ok(ReflexRobot::new(outcome.best))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rooms_match_the_expected_shapes() {
        let rooms = sample_rooms().unwrap();
        assert_eq!(rooms.len(), 7);
        assert_eq!(rooms[0].width(), 10);
        assert_eq!(rooms[1].walls().len(), 0);
        assert_eq!(rooms[2].walls().len(), 1);
        assert_eq!(rooms[4].walls().len(), 3);
        assert_eq!(rooms[6].walls().len(), 4);
    }

    #[test]
    fn test_initial_population_spans_the_angle_range() {
        let population = initial_population();
        assert_eq!(population.len(), 30);
        assert_eq!(population[0], 50);
        assert_eq!(*population.last().unwrap(), 340);
    }

    #[test]
    fn test_tuning_with_no_rooms_fails_instead_of_scoring_zero() {
        let result = tune_turn_angle(&[], None, 0.6, 100, 42);
        assert!(matches!(
            result,
            Err(TunedRobotError::Tune(TuneError::EvaluationFailed { .. }))
        ));
    }

    #[test]
    fn test_tuning_converges_to_a_single_angle() {
        // Two small empty rooms keep the run fast; the population shrinks
        // 30 -> 12 -> 5 -> 2 -> 1.
        let rooms = vec![RoomLayout::new(6, 6), RoomLayout::new(6, 6)];
        let outcome = tune_turn_angle(&rooms, None, 0.5, 2000, 42).unwrap();
        let sizes: Vec<usize> = outcome.generations.iter().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![30, 12, 5, 2, 1]);
        assert_eq!(outcome.generations.last().unwrap()[0], outcome.best);
    }

    #[test]
    fn test_tuning_is_deterministic_for_a_seed() {
        let rooms = sample_rooms().unwrap();
        let first = tune_turn_angle(&rooms, None, 0.6, 1000, 7).unwrap();
        let second = tune_turn_angle(&rooms, None, 0.6, 1000, 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tuned_robot_carries_the_tuned_angle() {
        let rooms = vec![RoomLayout::new(6, 6)];
        let outcome = tune_turn_angle(&rooms, None, 0.5, 2000, 42).unwrap();
        let robot = tuned_robot(&rooms, None, 0.5, 2000, 42).unwrap();
        assert_eq!(robot.degrees, outcome.best);
    }
}
