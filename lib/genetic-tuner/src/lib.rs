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

//! A genetic loop that tunes a single integer gene.
//!
//! Each generation is scored by a caller-provided [`Fitness`] function,
//! culled, and bred until exactly one candidate remains. The loop knows
//! nothing about what the gene means or how fitness is computed; scores are
//! costs, so lower is better.
//!
//! Per generation, with `size` scored candidates ordered best (lowest score)
//! first:
//! - the worst `ceil(0.30 * size)` candidates are culled,
//! - the best `ceil(0.10 * size)` candidates pass through unchanged (the
//!   elites),
//! - the remaining candidates are bred pairwise: consecutive pairs are
//!   averaged with flooring division, an unpaired trailing candidate passes
//!   through, and every bred gene goes through the [`Mutation`] hook.
//!
//! When culling and elitism together cover the whole generation the breeding
//! pool is empty and the next generation is elites only, so the population
//! can shrink faster than the breeding arithmetic alone suggests.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use rayon::prelude::*;

/// The single tunable integer gene.
pub type Gene = i32;

/// Float type used for fitness scores.
pub type Float = f64;

/// Fraction of each generation that is culled outright.
pub const CULL_FRACTION: Float = 0.30;

/// Fraction of each generation that passes through unchanged.
pub const ELITE_FRACTION: Float = 0.10;

/// Genetic tuning error.
#[derive(Debug, thiserror::Error)]
pub enum TuneError {
    /// The fitness function could not score a candidate. The run stops here;
    /// a failed evaluation is never replaced with a default score.
    #[error("fitness evaluation failed for gene {gene}")]
    EvaluationFailed {
        /// The candidate that could not be scored.
        gene: Gene,
        /// The underlying evaluation error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The population is empty, either initially or after selection.
    #[error("population is empty")]
    EmptyPopulation,
}

/// Scores one candidate gene. Evaluations of different candidates run on a
/// worker pool, hence the `Sync` bound.
pub trait Fitness: Sync {
    /// Error produced when an evaluation cannot complete.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Score a candidate. Lower is better.
    fn evaluate(&self, gene: Gene) -> Result<Float, Self::Error>;
}

/// Hook applied to every bred gene. [`IdentityMutation`] is the default
/// no-op; plug in something else to add mutation pressure.
pub trait Mutation {
    /// Possibly alter a bred gene.
    fn mutate(&self, gene: Gene) -> Gene;
}

/// The no-op mutation.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityMutation;

impl Mutation for IdentityMutation {
    fn mutate(&self, gene: Gene) -> Gene {
        gene
    }
}

/// A candidate together with its fitness score. Ordered by score ascending,
/// ties broken by gene value, so the fitness queue pops best-first and is
/// fully deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Scored {
    score: OrderedFloat<Float>,
    gene: Gene,
}

/// Result of a tuning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuneOutcome {
    /// The single surviving gene.
    pub best: Gene,

    /// Every population the run went through, starting with the initial one
    /// and ending with the singleton holding `best`.
    pub generations: Vec<Vec<Gene>>,
}

/// Drives the evaluate-then-select loop over a population of genes.
pub struct Tuner<F: Fitness, M: Mutation = IdentityMutation> {
    fitness: F,
    mutation: M,
}

impl<F: Fitness> Tuner<F, IdentityMutation> {
    /// A tuner with the no-op mutation hook.
    pub fn new(fitness: F) -> Self {
        Self {
            fitness,
            mutation: IdentityMutation,
        }
    }
}

impl<F: Fitness, M: Mutation> Tuner<F, M> {
    /// A tuner with a custom mutation hook.
    pub fn with_mutation(fitness: F, mutation: M) -> Self {
        Self { fitness, mutation }
    }

    /// Run the loop until a single candidate remains.
    ///
    /// A population of one is already converged: no evaluation happens and
    /// that candidate is the result.
    pub fn tune(&self, initial: Vec<Gene>) -> Result<TuneOutcome, TuneError> {
        if initial.is_empty() {
            return Err(TuneError::EmptyPopulation);
        }
        let mut population = initial;
        let mut generations = vec![population.clone()];
        while population.len() > 1 {
            population = self.next_generation(&population)?;
            if population.is_empty() {
                return Err(TuneError::EmptyPopulation);
            }
            generations.push(population.clone());
        }
        Ok(TuneOutcome {
            best: population[0],
            generations,
        })
    }

    /// Score every candidate, then cull and breed.
    ///
    /// Evaluations run in parallel; the fitness queue is only touched from
    /// this thread once all of them have finished, so selection always sees
    /// the complete generation.
    fn next_generation(&self, population: &[Gene]) -> Result<Vec<Gene>, TuneError> {
        let fitness = &self.fitness;
        let results: Vec<(Gene, Result<Float, F::Error>)> = population
            .par_iter()
            .map(|&gene| (gene, fitness.evaluate(gene)))
            .collect();

        let mut queue: BinaryHeap<Reverse<Scored>> = BinaryHeap::with_capacity(results.len());
        for (gene, result) in results {
            let score = result.map_err(|source| TuneError::EvaluationFailed {
                gene,
                source: Box::new(source),
            })?;
            queue.push(Reverse(Scored {
                score: OrderedFloat(score),
                gene,
            }));
        }
        Ok(select(queue, &self.mutation))
    }
}

/// How many candidates a generation of `size` culls and how many pass
/// through as elites.
fn selection_counts(size: usize) -> (usize, usize) {
    let cull = (CULL_FRACTION * size as Float).ceil() as usize;
    let elite = (ELITE_FRACTION * size as Float).ceil() as usize;
    (cull, elite)
}

/// Pop the survivors best-first: elites pass through, the rest are bred.
/// Whatever is left in the queue afterwards is the culled share.
fn select<M: Mutation>(mut queue: BinaryHeap<Reverse<Scored>>, mutation: &M) -> Vec<Gene> {
    let size = queue.len();
    let (cull, elite) = selection_counts(size);
    let keep = size.saturating_sub(cull);

    let mut next = Vec::with_capacity(keep);
    let mut pool = Vec::new();
    let mut taken = 0;
    while taken < keep {
        let Some(Reverse(scored)) = queue.pop() else {
            break;
        };
        if taken < elite {
            next.push(scored.gene);
        } else {
            pool.push(scored.gene);
        }
        taken += 1;
    }
    next.extend(breed(&pool, mutation));
    next
}

/// Breed consecutive pairs into their floored average. An unpaired trailing
/// candidate passes through unchanged, without mutation.
fn breed<M: Mutation>(pool: &[Gene], mutation: &M) -> Vec<Gene> {
    let mut offspring = Vec::with_capacity(pool.len().div_ceil(2));
    let mut i = 0;
    while i < pool.len() {
        if i + 1 < pool.len() {
            let child = (pool[i] + pool[i + 1]).div_euclid(2);
            offspring.push(mutation.mutate(child));
        } else {
            offspring.push(pool[i]);
        }
        i += 2;
    }
    offspring
}
