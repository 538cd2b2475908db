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

//! Tune a reflex robot's turn angle, then compare it against the default
//! 135 degree robot on a randomly chosen sample room.

use rand::Rng as _;
use roomba_sim::{run_simulation, ReflexRobot, SimulationConfig};
use tuned_robot::{sample_rooms, tune_turn_angle, TunedRobotError};

/// Step budget per trial, for tuning and for the final comparison runs.
const MAX_STEPS: usize = 20_000;

/// Turn angle of the untuned comparison robot.
const DEFAULT_ANGLE: i32 = 135;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), TunedRobotError> {
    let mut rng = rand::thread_rng();
    let room_index: usize = rng.gen_range(0..6);
    let seed: u64 = rng.gen();

    let rooms = sample_rooms()?;

    println!("Fitness testing");
    let outcome = tune_turn_angle(&rooms, None, 0.6, MAX_STEPS, seed)?;
    for generation in &outcome.generations {
        println!("{:?}", generation);
    }
    println!("Using: {}", outcome.best);

    let config = SimulationConfig {
        min_clean: 0.95,
        max_steps: MAX_STEPS,
        ..SimulationConfig::default()
    };

    println!("Robot results:");
    let tuned = run_simulation(
        &config,
        &rooms[room_index],
        || ReflexRobot::new(outcome.best),
        seed,
    );
    println!("{}", tuned);

    println!("Default robot result:");
    let default = run_simulation(
        &config,
        &rooms[room_index],
        || ReflexRobot::new(DEFAULT_ANGLE),
        seed,
    );
    println!("{}", default);

    println!("Testing: {}", room_index);
    Ok(())
}
