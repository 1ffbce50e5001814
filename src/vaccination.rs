//! Gradual vaccination coverage.
//!
//! Coverage tracks the configured target fraction a few people at a time, so that moving the
//! control does not vaccinate the whole town in one step.

use log::trace;

use crate::params::Params;
use crate::person::{HealthState, Person};
use crate::random::SimRng;

/// People vaccinated or unvaccinated per step at `sim_speed` 1.
pub const BASE_BATCH: f64 = 5.0;

/// Number of people the controller aims to have vaccinated.
#[must_use]
pub fn target_count(population: usize, params: &Params) -> usize {
    ((population as f64 * params.vaccine_rate).max(0.0) as usize).min(population)
}

/// Most people changed in a single step.
#[must_use]
pub fn batch_size(params: &Params) -> usize {
    ((BASE_BATCH * params.sim_speed).max(0.0) as usize).max(1)
}

/// Moves coverage one batch toward the target. Only susceptible people are vaccinated; anyone
/// vaccinated may be unvaccinated. Returns the signed change in the vaccinated count.
pub fn adjust_coverage(people: &mut [Person], params: &Params, rng: &mut SimRng) -> isize {
    let current = people.iter().filter(|p| p.vaccinated).count();
    let target = target_count(people.len(), params);
    let batch = batch_size(params);

    if current < target {
        let candidates: Vec<usize> = people
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.vaccinated && p.state == HealthState::Susceptible)
            .map(|(i, _)| i)
            .collect();
        let chosen = rng.sample_multiple(&candidates, batch.min(target - current));
        for &index in &chosen {
            people[index].vaccinated = true;
        }
        trace!("vaccinated {} (target {target})", chosen.len());
        chosen.len() as isize
    } else if current > target {
        let vaccinated: Vec<usize> = people
            .iter()
            .enumerate()
            .filter(|(_, p)| p.vaccinated)
            .map(|(i, _)| i)
            .collect();
        let chosen = rng.sample_multiple(&vaccinated, batch.min(current - target));
        for &index in &chosen {
            people[index].vaccinated = false;
        }
        trace!("unvaccinated {} (target {target})", chosen.len());
        -(chosen.len() as isize)
    } else {
        0
    }
}
