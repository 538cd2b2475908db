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

//! Concurrent fitness evaluation of one robot configuration.
//!
//! Trials are independent of each other, so `rooms x num_trials` trials run
//! on a rayon worker pool. Each trial gets its own rng derived from the run
//! seed and the trial's index, which makes the aggregate score independent
//! of scheduling order.

use rayon::prelude::*;

use crate::room::{Point, RoomLayout};
use crate::simulation::{run_trial, trial_rng};
use crate::{Float, Robot, SimError};

/// Score one robot configuration across several rooms.
///
/// Runs `num_trials` trials per room, each ending when `min_clean` of the
/// room is clean or after `max_steps` steps. The per-trial score is the
/// number of steps taken, so a trial that exhausts its budget contributes
/// the full `max_steps` rather than hanging or being dropped. The aggregate
/// score is the mean over all trials: lower is better.
///
/// `make_robot` builds one robot per trial; callers capture the candidate
/// parameters (the chromosome) in the closure.
pub fn concurrent_test<R, F>(
    make_robot: F,
    rooms: &[RoomLayout],
    num_trials: usize,
    start_location: Option<Point>,
    min_clean: Float,
    max_steps: usize,
    seed: u64,
) -> Result<Float, SimError>
where
    R: Robot,
    F: Fn() -> R + Sync,
{
    if rooms.is_empty() || num_trials == 0 {
        return Err(SimError::NoRooms);
    }
    let scores: Vec<Float> = (0..rooms.len() * num_trials)
        .into_par_iter()
        .map(|index| {
            let room = &rooms[index / num_trials];
            let mut rng = trial_rng(seed, index as u64);
            let mut robots = vec![make_robot()];
            let result = run_trial(
                room,
                &mut robots,
                min_clean,
                max_steps,
                start_location,
                &mut rng,
            );
            result.steps as Float
        })
        .collect();
    Ok(scores.iter().sum::<Float>() / scores.len() as Float)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::ReflexRobot;

    #[test]
    fn test_no_rooms_is_an_error() {
        let result = concurrent_test(|| ReflexRobot::new(95), &[], 1, None, 0.6, 100, 42);
        assert_eq!(result, Err(SimError::NoRooms));
    }

    #[test]
    fn test_zero_trials_is_an_error() {
        let rooms = vec![RoomLayout::new(5, 5)];
        let result = concurrent_test(|| ReflexRobot::new(95), &rooms, 0, None, 0.6, 100, 42);
        assert_eq!(result, Err(SimError::NoRooms));
    }

    #[test]
    fn test_score_is_deterministic_for_a_seed() {
        let rooms = vec![RoomLayout::new(6, 6), RoomLayout::new(8, 8)];
        let first =
            concurrent_test(|| ReflexRobot::new(95), &rooms, 3, None, 0.5, 5000, 42).unwrap();
        let second =
            concurrent_test(|| ReflexRobot::new(95), &rooms, 3, None, 0.5, 5000, 42).unwrap();
        assert_abs_diff_eq!(first, second);
    }

    #[test]
    fn test_exhausted_budget_scores_the_full_budget() {
        // A 30x30 room cannot be fully cleaned in 50 steps, so every trial
        // exhausts its budget and costs exactly max_steps.
        let rooms = vec![RoomLayout::new(30, 30)];
        let score =
            concurrent_test(|| ReflexRobot::new(95), &rooms, 2, None, 1.0, 50, 42).unwrap();
        assert_abs_diff_eq!(score, 50.0);
    }

    #[test]
    fn test_score_is_bounded_by_budget() {
        let rooms = vec![RoomLayout::new(6, 6)];
        let score =
            concurrent_test(|| ReflexRobot::new(95), &rooms, 2, None, 0.5, 5000, 42).unwrap();
        assert!(score > 0.0);
        assert!(score <= 5000.0);
    }
}
