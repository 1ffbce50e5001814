//! Disease progression.
//!
//! ```text
//! Susceptible -> Latent -> Asymptomatic -> Recovered | Dead
//!                       -> Symptomatic  -> Recovered | Hospitalized | Dead
//!                                          Hospitalized -> Recovered | Dead
//! Recovered -> Susceptible (once immunity has waned)
//! ```
//!
//! Entry into `Latent` happens through [`infect`], called by the transmission trials and by
//! initial seeding. Every other transition happens in [`update_bio`], once per person per step.

use log::{debug, trace};

use crate::location::Location;
use crate::params::Params;
use crate::person::{AgeGroup, HealthState, Person};
use crate::random::SimRng;
use crate::transmission::hazard_probability;
use crate::world::TownMap;

/// Immunity below which a recovered person becomes susceptible again.
pub const WANED_IMMUNITY: f64 = 0.2;
/// Days of symptoms before a high-risk person seeks a hospital bed.
pub const HOSPITALIZATION_DELAY: f64 = 2.0;

const LATENT_SD: f64 = 1.0;
const MIN_LATENT_DUR: f64 = 0.5;
const INFECTIOUS_SD: f64 = 2.0;
const MIN_INFECTIOUS_DUR: f64 = 2.0;
const HOSPITAL_STAY_SD: f64 = 2.0;
const MIN_HOSPITAL_STAY: f64 = 2.0;
const SUPERSPREADER_MULT: f64 = 3.0;

/// Moves a susceptible person into `Latent` and samples the course of their infection.
pub fn infect(person: &mut Person, params: &Params, rng: &mut SimRng) {
    person.state = HealthState::Latent;
    person.days_in_state = 0.0;
    person.latent_dur = rng
        .sample_gaussian(params.latent_mean, LATENT_SD)
        .max(MIN_LATENT_DUR);
    person.inf_dur = rng
        .sample_gaussian(params.inf_mean, INFECTIOUS_SD)
        .max(MIN_INFECTIOUS_DUR);
    person.peak_shedding = params.shedding_asymp;
    if person.is_superspreader {
        person.peak_shedding *= SUPERSPREADER_MULT;
    }
    trace!("person {} infected", person.id);
}

/// Infects `min(count, people.len())` people chosen uniformly at random.
pub fn seed_infections(people: &mut [Person], count: usize, params: &Params, rng: &mut SimRng) {
    let indices: Vec<usize> = (0..people.len()).collect();
    for index in rng.sample_multiple(&indices, count) {
        infect(&mut people[index], params, rng);
    }
}

fn asymptomatic_probability(person: &Person, params: &Params) -> f64 {
    let mut probability = params.asymp_prob;
    if person.vaccinated {
        probability += 0.4;
    }
    match person.age {
        AgeGroup::Child => probability += 0.2,
        AgeGroup::Senior => probability -= 0.2,
        AgeGroup::Adult => {}
    }
    probability
}

/// Daily mortality hazard of an infectious person. `beds_full` reports whether the hospital has
/// no free bed.
#[must_use]
pub fn mortality_hazard(person: &Person, beds_full: bool, params: &Params) -> f64 {
    let mut hazard = params.base_mortality;
    if person.vaccinated {
        hazard *= 0.1;
    }
    if person.state == HealthState::Hospitalized {
        hazard *= params.hosp_mortality_mult;
    } else if person.state == HealthState::Symptomatic && person.is_high_risk() && beds_full {
        hazard *= params.no_bed_mult;
    }
    match person.age {
        AgeGroup::Senior => hazard *= 3.0,
        AgeGroup::Child => hazard *= 0.1,
        AgeGroup::Adult => {}
    }
    hazard
}

fn change_state(person: &mut Person, next: HealthState) {
    trace!("person {}: {} -> {}", person.id, person.state, next);
    person.state = next;
}

fn end_latency(person: &mut Person, quarantine: &Location, params: &Params, rng: &mut SimRng) {
    if rng.sample_bool(asymptomatic_probability(person, params)) {
        change_state(person, HealthState::Asymptomatic);
        person.peak_shedding = params.shedding_asymp;
    } else {
        change_state(person, HealthState::Symptomatic);
        person.peak_shedding = params.shedding_symp;
        if !person.in_quarantine && rng.sample_bool(params.quarantine_rate) {
            person.in_quarantine = true;
            person.set_target(quarantine, rng);
        }
    }
    if person.is_superspreader {
        person.peak_shedding *= SUPERSPREADER_MULT;
    }
    person.days_in_state = 0.0;
}

/// Advances one person's disease by `dt` days: immunity waning, then at most one progression of
/// the latent or infectious course. Admission claims a hospital bed immediately, so people later
/// in the same pass see it taken.
pub fn update_bio(
    person: &mut Person,
    locations: &mut [Location],
    town: &TownMap,
    params: &Params,
    dt: f64,
    rng: &mut SimRng,
) {
    if person.immunity > 0.0 {
        person.immunity *= (-params.immunity_waning * dt).exp();
        if person.immunity < WANED_IMMUNITY && person.state == HealthState::Recovered {
            change_state(person, HealthState::Susceptible);
            person.immunity = 0.0;
        }
    }

    if person.state == HealthState::Dead {
        return;
    }
    person.days_in_state += dt;

    match person.state {
        HealthState::Latent => {
            if person.days_in_state >= person.latent_dur {
                end_latency(person, &locations[town.quarantine.0], params, rng);
            }
        }
        HealthState::Asymptomatic | HealthState::Symptomatic | HealthState::Hospitalized => {
            progress_infection(person, locations, town, params, dt, rng);
        }
        HealthState::Susceptible | HealthState::Recovered | HealthState::Dead => {}
    }
}

fn release_bed(hospital: &mut Location) {
    hospital.occupied_beds = hospital.occupied_beds.saturating_sub(1);
}

fn progress_infection(
    person: &mut Person,
    locations: &mut [Location],
    town: &TownMap,
    params: &Params,
    dt: f64,
    rng: &mut SimRng,
) {
    let hospital_index = town.hospital.0;

    if person.state == HealthState::Symptomatic
        && person.days_in_state > HOSPITALIZATION_DELAY
        && person.is_high_risk()
        && locations[hospital_index].has_free_bed()
    {
        change_state(person, HealthState::Hospitalized);
        locations[hospital_index].occupied_beds += 1;
        person.in_quarantine = false;
        person.set_target(&locations[hospital_index], rng);
        person.hospital_stay_dur = rng
            .sample_gaussian(params.hosp_stay_mean, HOSPITAL_STAY_SD)
            .max(MIN_HOSPITAL_STAY);
        if !locations[hospital_index].has_free_bed() {
            debug!("hospital full ({} beds)", locations[hospital_index].capacity);
        }
    }

    let beds_full = !locations[hospital_index].has_free_bed();
    let hazard = mortality_hazard(person, beds_full, params);
    let was_hospitalized = person.state == HealthState::Hospitalized;
    if rng.sample_bool(hazard_probability(hazard, dt)) {
        if was_hospitalized {
            release_bed(&mut locations[hospital_index]);
        }
        change_state(person, HealthState::Dead);
        person.in_quarantine = false;
        person.set_target(&locations[town.cemetery.0], rng);
    } else if person.days_in_state >= person.inf_dur {
        if was_hospitalized {
            release_bed(&mut locations[hospital_index]);
        }
        let was_confined = was_hospitalized
            || person.in_quarantine
            || person.current_hub == Some(town.hospital)
            || person.current_hub == Some(town.quarantine);
        change_state(person, HealthState::Recovered);
        person.immunity = 1.0;
        person.in_quarantine = false;
        if was_confined {
            person.set_target(&locations[person.home.0], rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::{MobilityClass, PersonId};
    use assert_approx_eq::assert_approx_eq;

    fn setup(age: AgeGroup) -> (Person, TownMap, Vec<Location>, SimRng) {
        let (town, locations) = TownMap::build(50);
        let mut rng = SimRng::new(31);
        let person = Person::new(
            PersonId(0),
            &locations[town.households[0].0],
            age,
            MobilityClass::Moderate,
            &town,
            &Params::default(),
            &mut rng,
        );
        (person, town, locations, rng)
    }

    #[test]
    fn infect_samples_floored_durations() {
        let (mut person, _, _, mut rng) = setup(AgeGroup::Adult);
        let params = Params {
            latent_mean: -10.0,
            inf_mean: -10.0,
            ..Params::default()
        };
        infect(&mut person, &params, &mut rng);
        assert_eq!(person.state, HealthState::Latent);
        assert_eq!(person.latent_dur, MIN_LATENT_DUR);
        assert_eq!(person.inf_dur, MIN_INFECTIOUS_DUR);
        assert_eq!(person.days_in_state, 0.0);
    }

    #[test]
    fn superspreader_peak_is_tripled() {
        let (mut person, _, _, mut rng) = setup(AgeGroup::Adult);
        person.is_superspreader = true;
        let params = Params::default();
        infect(&mut person, &params, &mut rng);
        assert_approx_eq!(person.peak_shedding, params.shedding_asymp * 3.0);
    }

    #[test]
    fn latent_period_ends_in_infectious_state() {
        let (mut person, town, mut locations, mut rng) = setup(AgeGroup::Adult);
        let params = Params::default();
        infect(&mut person, &params, &mut rng);
        let latent_dur = person.latent_dur;
        update_bio(&mut person, &mut locations, &town, &params, latent_dur, &mut rng);
        assert!(matches!(
            person.state,
            HealthState::Asymptomatic | HealthState::Symptomatic
        ));
        assert_eq!(person.days_in_state, 0.0);
    }

    #[test]
    fn symptomatic_always_quarantined_when_rate_is_one() {
        let (mut person, town, mut locations, mut rng) = setup(AgeGroup::Senior);
        let params = Params {
            asymp_prob: 0.0,
            quarantine_rate: 1.0,
            ..Params::default()
        };
        infect(&mut person, &params, &mut rng);
        let latent_dur = person.latent_dur;
        update_bio(&mut person, &mut locations, &town, &params, latent_dur, &mut rng);
        assert_eq!(person.state, HealthState::Symptomatic);
        assert!(person.in_quarantine);
        assert_eq!(person.target, town.quarantine);
    }

    #[test]
    fn mortality_modifiers() {
        let (mut person, _, _, _) = setup(AgeGroup::Senior);
        let params = Params::default();
        person.state = HealthState::Symptomatic;
        let base = mortality_hazard(&person, false, &params);
        assert_approx_eq!(base, params.base_mortality * 3.0);
        assert_approx_eq!(
            mortality_hazard(&person, true, &params),
            base * params.no_bed_mult
        );
        person.state = HealthState::Hospitalized;
        assert_approx_eq!(
            mortality_hazard(&person, true, &params),
            base * params.hosp_mortality_mult
        );
        person.vaccinated = true;
        assert_approx_eq!(
            mortality_hazard(&person, false, &params),
            base * params.hosp_mortality_mult * 0.1
        );
    }

    #[test]
    fn admission_claims_bed_and_respects_capacity() {
        let (mut person, town, mut locations, mut rng) = setup(AgeGroup::Senior);
        let params = Params {
            base_mortality: 0.0,
            ..Params::default()
        };
        person.state = HealthState::Symptomatic;
        person.inf_dur = 100.0;
        person.days_in_state = 3.0;
        person.in_quarantine = true;
        let capacity = locations[town.hospital.0].capacity;
        locations[town.hospital.0].occupied_beds = capacity - 1;
        update_bio(&mut person, &mut locations, &town, &params, 0.01, &mut rng);
        assert_eq!(person.state, HealthState::Hospitalized);
        assert!(!person.in_quarantine);
        assert_eq!(person.target, town.hospital);
        assert!(person.hospital_stay_dur >= MIN_HOSPITAL_STAY);
        assert_eq!(locations[town.hospital.0].occupied_beds, capacity);

        let (mut other, _, _, _) = setup(AgeGroup::Senior);
        other.state = HealthState::Symptomatic;
        other.inf_dur = 100.0;
        other.days_in_state = 3.0;
        update_bio(&mut other, &mut locations, &town, &params, 0.01, &mut rng);
        assert_eq!(other.state, HealthState::Symptomatic);
        assert_eq!(locations[town.hospital.0].occupied_beds, capacity);
    }

    #[test]
    fn recovery_grants_immunity_and_sends_home() {
        let (mut person, town, mut locations, mut rng) = setup(AgeGroup::Adult);
        let params = Params {
            base_mortality: 0.0,
            ..Params::default()
        };
        person.state = HealthState::Hospitalized;
        person.inf_dur = 5.0;
        person.days_in_state = 5.0;
        person.target = town.hospital;
        update_bio(&mut person, &mut locations, &town, &params, 0.01, &mut rng);
        assert_eq!(person.state, HealthState::Recovered);
        assert_eq!(person.immunity, 1.0);
        assert_eq!(person.target, person.home);
    }

    #[test]
    fn leaving_hospital_frees_bed() {
        let (mut person, town, mut locations, mut rng) = setup(AgeGroup::Adult);
        let params = Params {
            base_mortality: 0.0,
            ..Params::default()
        };
        person.state = HealthState::Hospitalized;
        person.inf_dur = 5.0;
        person.days_in_state = 5.0;
        locations[town.hospital.0].occupied_beds = 3;
        update_bio(&mut person, &mut locations, &town, &params, 0.01, &mut rng);
        assert_eq!(person.state, HealthState::Recovered);
        assert_eq!(locations[town.hospital.0].occupied_beds, 2);

        let params = Params {
            base_mortality: 1.0e6,
            ..Params::default()
        };
        let (mut patient, _, _, _) = setup(AgeGroup::Adult);
        patient.state = HealthState::Hospitalized;
        patient.inf_dur = 100.0;
        update_bio(&mut patient, &mut locations, &town, &params, 1.0, &mut rng);
        assert_eq!(patient.state, HealthState::Dead);
        assert_eq!(locations[town.hospital.0].occupied_beds, 1);
    }

    #[test]
    fn waning_immunity_returns_to_susceptible() {
        let (mut person, town, mut locations, mut rng) = setup(AgeGroup::Adult);
        let params = Params {
            immunity_waning: 1.0,
            ..Params::default()
        };
        person.state = HealthState::Recovered;
        person.immunity = 1.0;
        update_bio(&mut person, &mut locations, &town, &params, 0.5, &mut rng);
        assert_eq!(person.state, HealthState::Recovered);
        update_bio(&mut person, &mut locations, &town, &params, 2.0, &mut rng);
        assert_eq!(person.state, HealthState::Susceptible);
        assert_eq!(person.immunity, 0.0);
    }

    #[test]
    fn dead_is_terminal() {
        let (mut person, town, mut locations, mut rng) = setup(AgeGroup::Adult);
        person.state = HealthState::Dead;
        update_bio(&mut person, &mut locations, &town, &Params::default(), 1.0, &mut rng);
        assert_eq!(person.state, HealthState::Dead);
        assert_eq!(person.days_in_state, 0.0);
    }

    #[test]
    fn seeding_caps_at_population() {
        let (person, _, _, mut rng) = setup(AgeGroup::Adult);
        let mut people = vec![person.clone(), person];
        seed_infections(&mut people, 10, &Params::default(), &mut rng);
        assert!(people.iter().all(|p| p.state == HealthState::Latent));
    }
}
