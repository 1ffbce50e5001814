//! The two infection mechanisms and the infection trial they share.
//!
//! Location-mediated transmission goes through places: shedders deposit virus into the locations
//! they are tied to, and susceptible people tied to a loaded location are exposed in proportion
//! to its load density. Proximity transmission goes through the social graph: a shedder exposes
//! each susceptible friend, more strongly the closer they stand and five times as strongly when
//! both are at the same place.
//!
//! Both mechanisms run every step. A person already infected earlier in the step is skipped by
//! the later trials.

use crate::disease;
use crate::location::Location;
use crate::params::Params;
use crate::person::{HealthState, Person, StructuralRole};
use crate::random::SimRng;

/// Ties at or below this weight neither deposit nor receive virus.
pub const MIN_EDGE_WEIGHT: f64 = 0.1;
const LOCATION_HAZARD_SCALE: f64 = 0.5;
const SAME_HUB_MULTIPLIER: f64 = 5.0;
const CONSTITUTION_PROTECTION: f64 = 0.2;

/// Probability of at least one event in `dt` days at a constant `hazard` rate. Negative
/// hazards count as zero.
#[must_use]
pub fn hazard_probability(hazard: f64, dt: f64) -> f64 {
    1.0 - (-hazard.max(0.0) * dt).exp()
}

/// Infection hazard from a location for a person tied to it with `weight`.
#[must_use]
pub fn location_hazard(location: &Location, weight: f64, params: &Params) -> f64 {
    location.load_density()
        * location.risk_mult
        * params.beta
        * LOCATION_HAZARD_SCALE
        * params.distancing_factor()
        * weight
}

/// Distance attenuation of proximity transmission.
#[must_use]
pub fn proximity_decay(distance: f64, kappa: f64) -> f64 {
    let scaled = distance / kappa;
    1.0 / (1.0 + scaled * scaled)
}

/// Infection hazard from a shedding friend at `distance`.
#[must_use]
pub fn proximity_hazard(shedding: f64, distance: f64, same_hub: bool, params: &Params) -> f64 {
    let mut hazard = shedding * params.beta * params.distancing_factor();
    if same_hub {
        hazard *= SAME_HUB_MULTIPLIER;
    }
    hazard * proximity_decay(distance, params.kappa)
}

/// Multiplier on infection probability from the person's own protection, never negative.
#[must_use]
pub fn susceptibility(person: &Person, params: &Params) -> f64 {
    let mut factor = 1.0
        - (person.immunity * params.immunity_efficacy
            + person.constitution * CONSTITUTION_PROTECTION);
    if person.vaccinated {
        factor *= 1.0 - params.vaccine_efficacy;
    }
    if person.masked {
        factor *= 1.0 - params.mask_efficacy;
    }
    factor.max(0.0)
}

/// One infection trial. Infects the person and returns `true` on success.
pub fn try_infect(person: &mut Person, probability: f64, params: &Params, rng: &mut SimRng) -> bool {
    let chance = probability * susceptibility(person, params);
    if rng.sample_uniform() < chance {
        disease::infect(person, params, rng);
        true
    } else {
        false
    }
}

/// Adds every shedder's output to the viral load of the locations they are tied to.
pub fn deposit_viral_loads(people: &[Person], locations: &mut [Location], params: &Params) {
    for person in people {
        let shedding = person.shedding(params.mask_efficacy);
        if shedding <= 0.0 {
            continue;
        }
        for (_, location, weight) in person.structural_edges.iter() {
            if weight > MIN_EDGE_WEIGHT {
                locations[location.0].viral_load += shedding * weight;
            }
        }
    }
}

/// Runs both transmission mechanisms for one step of `dt` days. Returns the number of new
/// infections.
pub fn transmit(
    people: &mut [Person],
    locations: &mut [Location],
    params: &Params,
    dt: f64,
    rng: &mut SimRng,
) -> usize {
    deposit_viral_loads(people, locations, params);
    let mut infected = 0;

    // Location-mediated
    for person in people.iter_mut() {
        if person.state != HealthState::Susceptible {
            continue;
        }
        let mut probabilities = [0.0; StructuralRole::COUNT];
        let mut exposures = 0;
        for (_, location_id, weight) in person.structural_edges.iter() {
            let location = &locations[location_id.0];
            if weight > MIN_EDGE_WEIGHT && location.viral_load > 0.0 {
                probabilities[exposures] =
                    hazard_probability(location_hazard(location, weight, params), dt);
                exposures += 1;
            }
        }
        for &probability in &probabilities[..exposures] {
            if try_infect(person, probability, params, rng) {
                infected += 1;
                break;
            }
        }
    }

    // Proximity over the social graph
    let infectors: Vec<(usize, f64)> = people
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.shedding(params.mask_efficacy)))
        .filter(|(_, shedding)| *shedding > 0.0)
        .collect();
    for (index, shedding) in infectors {
        let position = people[index].sim_pos;
        let hub = people[index].current_hub;
        for k in 0..people[index].neighbors.len() {
            let friend_id = people[index].neighbors[k];
            let friend = &mut people[friend_id.0];
            if friend.state != HealthState::Susceptible {
                continue;
            }
            let same_hub = hub.is_some() && hub == friend.current_hub;
            let distance = position.distance_to(friend.sim_pos);
            let hazard = proximity_hazard(shedding, distance, same_hub, params);
            if try_infect(friend, hazard_probability(hazard, dt), params, rng) {
                infected += 1;
            }
        }
    }
    infected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::{AgeGroup, MobilityClass, PersonId};
    use crate::world::TownMap;
    use assert_approx_eq::assert_approx_eq;

    fn household_pair(params: &Params) -> (Vec<Person>, Vec<Location>, SimRng) {
        let (town, locations) = TownMap::build(50);
        let mut rng = SimRng::new(21);
        let home = &locations[town.households[0].0];
        let mut people: Vec<Person> = (0..2)
            .map(|i| {
                Person::new(
                    PersonId(i),
                    home,
                    AgeGroup::Adult,
                    MobilityClass::High,
                    &town,
                    params,
                    &mut rng,
                )
            })
            .collect();
        people[0].neighbors.push(PersonId(1));
        people[1].neighbors.push(PersonId(0));
        people[0].state = HealthState::Symptomatic;
        people[0].peak_shedding = 1.0;
        people[0].inf_dur = 10.0;
        people[0].days_in_state = 3.0;
        (people, locations, rng)
    }

    #[test]
    fn hazard_probability_bounds() {
        assert_eq!(hazard_probability(0.0, 1.0), 0.0);
        assert_eq!(hazard_probability(-5.0, 1.0), 0.0);
        assert!(hazard_probability(1e6, 1.0) <= 1.0);
        assert_approx_eq!(hazard_probability(1.0, 1.0), 1.0 - (-1.0f64).exp());
    }

    #[test]
    fn decay_halves_at_kappa() {
        assert_eq!(proximity_decay(0.0, 20.0), 1.0);
        assert_approx_eq!(proximity_decay(20.0, 20.0), 0.5);
    }

    #[test]
    fn same_hub_multiplies_proximity_hazard() {
        let params = Params::default();
        let apart = proximity_hazard(1.0, 10.0, false, &params);
        let together = proximity_hazard(1.0, 10.0, true, &params);
        assert_approx_eq!(together, apart * 5.0);
    }

    #[test]
    fn lockdown_reduces_hazard() {
        let open = Params::default();
        let locked = Params {
            social_engagement: 0.2,
            ..Params::default()
        };
        assert_approx_eq!(
            proximity_hazard(1.0, 0.0, false, &locked),
            proximity_hazard(1.0, 0.0, false, &open) * 0.2
        );
    }

    #[test]
    fn susceptibility_is_never_negative() {
        let params = Params::default();
        let (mut people, _, _) = household_pair(&params);
        let person = &mut people[1];
        person.immunity = 1.0;
        person.constitution = 1.0;
        assert_eq!(susceptibility(person, &params), 0.0);
        person.immunity = 0.0;
        person.constitution = 0.5;
        assert_approx_eq!(susceptibility(person, &params), 0.9);
        person.vaccinated = true;
        assert_approx_eq!(susceptibility(person, &params), 0.9 * 0.2);
    }

    #[test]
    fn deposit_weights_by_edge() {
        let params = Params::default();
        let (people, mut locations, _) = household_pair(&params);
        deposit_viral_loads(&people, &mut locations, &params);
        let home = &locations[people[0].home.0];
        assert_approx_eq!(home.viral_load, people[0].shedding(params.mask_efficacy));
        let total: f64 = locations.iter().map(|l| l.viral_load).sum();
        assert_approx_eq!(total, home.viral_load);
    }

    #[test]
    fn zero_beta_never_infects() {
        let params = Params {
            beta: 0.0,
            ..Params::default()
        };
        let (mut people, mut locations, mut rng) = household_pair(&params);
        for _ in 0..1000 {
            for location in &mut locations {
                location.clear_transient();
            }
            assert_eq!(transmit(&mut people, &mut locations, &params, 0.1, &mut rng), 0);
        }
        assert_eq!(people[1].state, HealthState::Susceptible);
    }

    #[test]
    fn housemate_is_eventually_infected() {
        let params = Params::default();
        let (mut people, mut locations, mut rng) = household_pair(&params);
        people[1].constitution = 0.1;
        let mut steps = 0;
        while people[1].state == HealthState::Susceptible && steps < 10_000 {
            for location in &mut locations {
                location.clear_transient();
            }
            transmit(&mut people, &mut locations, &params, 0.01, &mut rng);
            steps += 1;
        }
        assert_eq!(people[1].state, HealthState::Latent);
    }
}
