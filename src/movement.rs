//! Walking in simulated space and presence bookkeeping.
//!
//! People walk in a straight line toward their target at a fixed speed. On arrival they snap to
//! the target point and become present at the target location; while walking they are present
//! nowhere. Presence drives the fade of structural edge weights, which in turn weights
//! location-mediated transmission.

use crate::location::Location;
use crate::person::{HealthState, Person};
use crate::random::SimRng;
use crate::vector::Vec2;

pub const WALK_SPEED: f64 = 500.0;
/// The slow drift of the dead toward the cemetery.
pub const DEAD_SPEED: f64 = 100.0;
/// Converts speed times simulated days into simulated-space distance.
const DISTANCE_SCALE: f64 = 5.0;
/// Structural weights change by at most this much per simulated day.
pub const FADE_RATE: f64 = 5.0;

const JITTER_PROB: f64 = 0.05;
const JITTER: f64 = 0.5;

/// Advances one person by `dt` simulated days.
pub fn move_person(person: &mut Person, cemetery: &Location, dt: f64, rng: &mut SimRng) {
    let dead = person.state == HealthState::Dead;
    if dead && person.current_hub == Some(cemetery.id) {
        return;
    }

    let speed = if dead { DEAD_SPEED } else { WALK_SPEED };
    let step_dist = speed * dt * DISTANCE_SCALE;
    let diff = person.target_pos - person.sim_pos;
    let dist = diff.length();

    if dist <= step_dist {
        person.sim_pos = person.target_pos;
        person.current_hub = Some(person.target);
        if !dead && rng.sample_bool(JITTER_PROB) {
            person.sim_pos += Vec2::new(
                rng.sample_range(-JITTER, JITTER),
                rng.sample_range(-JITTER, JITTER),
            );
        }
    } else {
        person.current_hub = None;
        person.sim_pos += diff * (step_dist / dist);
    }

    person
        .structural_edges
        .fade_toward(person.current_hub, FADE_RATE * dt);
}

/// Moves everyone and records who is present where. Expects `present` lists to have been
/// cleared for this step.
pub fn move_all(
    people: &mut [Person],
    locations: &mut [Location],
    cemetery_index: usize,
    dt: f64,
    rng: &mut SimRng,
) {
    for person in people.iter_mut() {
        move_person(person, &locations[cemetery_index], dt, rng);
        if let Some(hub) = person.current_hub {
            locations[hub.0].present.push(person.id);
        }
    }
}
