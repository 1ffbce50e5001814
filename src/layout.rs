//! Force-directed graph layout.
//!
//! Each person is a particle in graph space. Springs pull it toward its home and its school or
//! workplace (structural springs) and toward its friends (social springs); a short-range inverse
//! square force pushes nearby people apart. Forces accumulate into the acceleration, then a damped
//! explicit Euler step moves the particle.

use crate::location::{Location, LocationType};
use crate::person::Person;
use crate::random::SimRng;
use crate::spatial::SpatialGrid;
use crate::vector::Vec2;

pub const REPULSION_STRENGTH: f64 = 2500.0;
/// Velocity retained per step.
pub const DAMPING: f64 = 0.85;
pub const MAX_SPEED: f64 = 8.0;

pub const K_SOCIAL: f64 = 0.01;
pub const K_HOME: f64 = 0.08;
pub const K_WORK: f64 = 0.02;
pub const L_SOCIAL: f64 = 30.0;
pub const L_STRUCT: f64 = 15.0;

pub const GRID_CELL_SIZE: f64 = 60.0;
/// Pairs further apart than this (squared) do not repel.
pub const REPULSION_CUTOFF_SQ: f64 = 2500.0;
/// Repulsion between members of the same household is scaled by this factor.
pub const HOUSEHOLD_REPULSION_FACTOR: f64 = 0.1;

const MIN_NORMALIZE_LENGTH_SQ: f64 = 0.0001;

/// Unit vector along `v`. Near-zero vectors get a small random direction instead, so that
/// coincident particles drift apart rather than locking together.
pub fn safe_normalize(v: Vec2, rng: &mut SimRng) -> Vec2 {
    if v.length_squared() < MIN_NORMALIZE_LENGTH_SQ {
        return Vec2::new(rng.sample_range(-0.1, 0.1), rng.sample_range(-0.1, 0.1));
    }
    v.try_normalize().unwrap_or(Vec2::ZERO)
}

/// Hooke spring from `from` toward `to` with the given rest length and constant.
fn spring_force(from: Vec2, to: Vec2, rest_length: f64, k: f64, rng: &mut SimRng) -> Vec2 {
    let diff = to - from;
    let dist = diff.length();
    if dist > 0.0 {
        safe_normalize(diff, rng) * ((dist - rest_length) * k)
    } else {
        Vec2::ZERO
    }
}

/// Accumulates spring and repulsion forces into every person's acceleration.
pub fn apply_forces(
    people: &mut [Person],
    locations: &[Location],
    grid: &mut SpatialGrid,
    rng: &mut SimRng,
) {
    grid.rebuild(people.iter().map(|p| p.graph_pos));

    let mut forces = Vec::with_capacity(people.len());
    for person in people.iter() {
        let mut force = Vec2::ZERO;

        // Structural springs
        for location_id in person.affiliations() {
            let location = &locations[location_id.0];
            let k = if location.location_type == LocationType::Household {
                K_HOME
            } else {
                K_WORK
            };
            force += spring_force(person.graph_pos, location.graph_pos, L_STRUCT, k, rng);
        }

        // Social springs
        for friend in &person.neighbors {
            let friend_pos = people[friend.0].graph_pos;
            force += spring_force(person.graph_pos, friend_pos, L_SOCIAL, K_SOCIAL, rng);
        }

        // Repulsion
        grid.for_each_candidate(person.graph_pos, |other_index| {
            if other_index == person.id.0 {
                return;
            }
            let other = &people[other_index];
            let diff = person.graph_pos - other.graph_pos;
            let dist_sq = diff.length_squared().max(1.0);
            if dist_sq > REPULSION_CUTOFF_SQ {
                return;
            }
            let mut strength = REPULSION_STRENGTH;
            if person.home == other.home {
                strength *= HOUSEHOLD_REPULSION_FACTOR;
            }
            force += safe_normalize(diff, rng) * (strength / dist_sq);
        });

        forces.push(force);
    }

    for (person, force) in people.iter_mut().zip(forces) {
        person.acc += force;
    }
}

/// Damped Euler step: the accumulated acceleration is consumed.
pub fn integrate(person: &mut Person) {
    person.vel += person.acc;
    person.vel *= DAMPING;
    person.vel = person.vel.clamp_length(MAX_SPEED);
    person.graph_pos += person.vel;
    person.acc = Vec2::ZERO;
}
