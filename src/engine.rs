//! The simulation engine.
//!
//! An [`Engine`] owns the town, the population and the single random source. [`Engine::step`]
//! advances everything by one update in a fixed order of passes:
//!
//! 1. vaccination coverage moves toward its target and mask wearing follows compliance
//! 2. the clock advances; at the start of each day phase the schedule assigns new targets
//! 3. per-location transient state is cleared
//! 4. people move in simulated space and register where they are
//! 5. layout forces are applied, then integrated
//! 6. both transmission mechanisms run
//! 7. hospital occupancy is recounted
//! 8. disease progresses for everyone
//! 9. aggregate counts are sampled into the history every few updates
//!
//! Later passes read what earlier passes wrote, and people and locations are always visited in
//! index order, so a run is fully determined by its seed and parameters.

use log::{debug, info};

use crate::disease;
use crate::layout;
use crate::location::Location;
use crate::movement;
use crate::network;
use crate::params::Params;
use crate::person::{AgeGroup, HealthState, MobilityClass, Person, PersonId};
use crate::random::SimRng;
use crate::report::{Demographics, HealthCensus, History, PopulationCounts};
use crate::schedule::{self, DayPhase, Weekday, TICKS_PER_DAY};
use crate::spatial::SpatialGrid;
use crate::transmission;
use crate::vaccination;
use crate::world::TownMap;

/// Updates per day phase at `sim_speed` 1.
pub const UPDATES_PER_TICK: f64 = 600.0;
/// Simulated days advanced by one update at `sim_speed` 1.
pub const DAYS_PER_UPDATE: f64 = 1.0 / (UPDATES_PER_TICK * TICKS_PER_DAY as f64);

const CHILD_SHARE: f64 = 0.2;
/// Cumulative share of children and adults.
const CHILD_AND_ADULT_SHARE: f64 = 0.75;
const ADULT_MOBILITY: [MobilityClass; 2] = [MobilityClass::High, MobilityClass::Moderate];

pub struct Engine {
    params: Params,
    rng: SimRng,
    town: TownMap,
    locations: Vec<Location>,
    people: Vec<Person>,
    grid: SpatialGrid,
    history: History,
    demographics: Demographics,
    /// Fractional updates into the current day phase.
    tick_count: f64,
    tick: u32,
    day: u32,
    updates: u64,
    paused: bool,
}

impl Engine {
    /// Builds a world for `params` with randomness seeded by `seed`.
    #[must_use]
    pub fn new(params: Params, seed: u64) -> Self {
        let (town, locations) = TownMap::build(0);
        let mut engine = Engine {
            params,
            rng: SimRng::new(seed),
            town,
            locations,
            people: Vec::new(),
            grid: SpatialGrid::new(layout::GRID_CELL_SIZE),
            history: History::new(params.history_capacity),
            demographics: Demographics::default(),
            tick_count: 0.0,
            tick: 0,
            day: 0,
            updates: 0,
            paused: false,
        };
        engine.init_world(params);
        engine
    }

    /// Discards everything and builds a fresh world: locations, population, social graph and
    /// seeded infections. The random source restarts from the engine's seed, so rebuilding with
    /// the same parameters reproduces the same world.
    pub fn init_world(&mut self, params: Params) {
        self.params = params;
        let seed = self.rng.base_seed();
        self.rng.reseed(seed);

        let (town, locations) = TownMap::build(params.pop_size);
        self.town = town;
        self.locations = locations;
        self.demographics = Demographics::default();
        self.people = self.generate_population(&params);

        let graph = network::generate_contact_graph(
            params.pop_size,
            params.k_neighbors,
            params.rewire_prob,
            &mut self.rng,
        );
        let edge_count = graph.edge_count();
        for (person, neighbors) in self.people.iter_mut().zip(graph.into_neighbor_lists()) {
            person.neighbors = neighbors;
        }

        disease::seed_infections(&mut self.people, params.init_infected, &params, &mut self.rng);

        self.grid.clear();
        self.history = History::new(params.history_capacity);
        self.tick_count = 0.0;
        self.tick = 0;
        self.day = 0;
        self.updates = 0;

        info!(
            "built world (seed={seed}): {} people, {} households, {} social ties, {} seeded",
            self.people.len(),
            self.town.households.len(),
            edge_count,
            params.init_infected.min(self.people.len())
        );
    }

    fn generate_population(&mut self, params: &Params) -> Vec<Person> {
        let households = &self.town.households;
        let mut people = Vec::with_capacity(params.pop_size);
        for i in 0..params.pop_size {
            let home = &self.locations[households[i % households.len()].0];
            let r = self.rng.sample_uniform();
            let (age, mobility) = if r < CHILD_SHARE {
                (AgeGroup::Child, MobilityClass::High)
            } else if r < CHILD_AND_ADULT_SHARE {
                let mobility = self
                    .rng
                    .choose(&ADULT_MOBILITY)
                    .copied()
                    .unwrap_or(MobilityClass::Moderate);
                (AgeGroup::Adult, mobility)
            } else {
                (AgeGroup::Senior, MobilityClass::Low)
            };
            self.demographics.record(age, mobility);

            let mut person = Person::new(
                PersonId(i),
                home,
                age,
                mobility,
                &self.town,
                params,
                &mut self.rng,
            );
            let hub = match (age, mobility) {
                (AgeGroup::Child, _) => self.rng.choose(&self.town.schools),
                (AgeGroup::Adult, MobilityClass::High | MobilityClass::Moderate) => {
                    self.rng.choose(&self.town.workplaces)
                }
                _ => None,
            };
            if let Some(&hub) = hub {
                person.assign_hub(hub, &self.town);
            }
            people.push(person);
        }
        people
    }

    /// Sets the seed used by the next [`init_world`](Self::init_world).
    pub fn reseed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.rng.base_seed()
    }

    /// Replaces the parameters from the next step on. Population size and initial infections
    /// only take effect on the next `init_world`.
    pub fn set_params(&mut self, params: Params) {
        self.history.set_capacity(params.history_capacity);
        self.params = params;
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advances the simulation by one update. Does nothing while paused.
    pub fn step(&mut self) {
        if self.paused {
            return;
        }
        let params = self.params;
        let dt = params.days_per_update();

        vaccination::adjust_coverage(&mut self.people, &params, &mut self.rng);
        for person in &mut self.people {
            person.update_mask(params.mask_compliance);
        }

        if self.advance_clock(&params) {
            let (phase, weekday) = (self.day_phase(), self.weekday());
            schedule::apply_schedule(
                &mut self.people,
                &self.locations,
                &self.town,
                phase,
                weekday,
                &params,
                &mut self.rng,
            );
        }

        for location in &mut self.locations {
            location.clear_transient();
        }
        movement::move_all(
            &mut self.people,
            &mut self.locations,
            self.town.cemetery.0,
            dt,
            &mut self.rng,
        );

        layout::apply_forces(&mut self.people, &self.locations, &mut self.grid, &mut self.rng);
        for person in &mut self.people {
            layout::integrate(person);
        }

        transmission::transmit(
            &mut self.people,
            &mut self.locations,
            &params,
            dt,
            &mut self.rng,
        );

        self.locations[self.town.hospital.0].occupied_beds = self
            .people
            .iter()
            .filter(|p| p.state == HealthState::Hospitalized)
            .count();
        for person in &mut self.people {
            disease::update_bio(
                person,
                &mut self.locations,
                &self.town,
                &params,
                dt,
                &mut self.rng,
            );
        }

        self.updates += 1;
        if (self.tick_count as u64) % params.history_interval.max(1) as u64 == 0 {
            self.history
                .push(PopulationCounts::from_people(&self.people, self.day));
        }
    }

    /// Moves the clock forward by `sim_speed` updates. Returns `true` when a new day phase
    /// starts.
    fn advance_clock(&mut self, params: &Params) -> bool {
        self.tick_count += params.sim_speed;
        if self.tick_count < UPDATES_PER_TICK {
            return false;
        }
        self.tick_count = 0.0;
        self.tick += 1;
        if self.tick >= TICKS_PER_DAY {
            self.tick = 0;
            self.day += 1;
            debug!("day {} ({})", self.day, self.weekday());
        }
        true
    }

    /// Steps until the start of day `day`. Returns immediately while paused.
    pub fn run_until_day(&mut self, day: u32) {
        while self.day < day && !self.paused {
            self.step();
        }
    }

    pub fn run_steps(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    #[must_use]
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    #[must_use]
    pub fn town(&self) -> &TownMap {
        &self.town
    }

    #[must_use]
    pub fn hospital(&self) -> &Location {
        &self.locations[self.town.hospital.0]
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn demographics(&self) -> &Demographics {
        &self.demographics
    }

    /// Current counts, whether or not a history sample was just taken.
    #[must_use]
    pub fn counts(&self) -> PopulationCounts {
        PopulationCounts::from_people(&self.people, self.day)
    }

    #[must_use]
    pub fn census(&self) -> HealthCensus {
        HealthCensus::from_people(&self.people)
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Day phase index in `0..TICKS_PER_DAY`.
    #[must_use]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    #[must_use]
    pub fn day_phase(&self) -> DayPhase {
        DayPhase::from_tick(self.tick)
    }

    #[must_use]
    pub fn weekday(&self) -> Weekday {
        Weekday::from_day(self.day)
    }

    /// Updates taken since the world was built.
    #[must_use]
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Simulated days elapsed, including the fraction of the current phase.
    #[must_use]
    pub fn elapsed_days(&self) -> f64 {
        f64::from(self.day)
            + (f64::from(self.tick) + self.tick_count / UPDATES_PER_TICK) / f64::from(TICKS_PER_DAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn small_params() -> Params {
        Params {
            pop_size: 60,
            init_infected: 2,
            ..Params::default()
        }
    }

    #[test]
    fn days_per_update_matches_clock() {
        assert_approx_eq!(DAYS_PER_UPDATE * UPDATES_PER_TICK * 3.0, 1.0);
    }

    #[test]
    fn new_world_shape() {
        let engine = Engine::new(small_params(), 7);
        assert_eq!(engine.people().len(), 60);
        assert_eq!(engine.census().latent, 2);
        let d = engine.demographics();
        assert_eq!(d.children + d.adults + d.seniors, 60);
        assert_eq!(d.high_mobility + d.moderate_mobility + d.low_mobility, 60);
        for person in engine.people() {
            match person.age {
                AgeGroup::Child => {
                    let hub = person.assigned_hub.unwrap();
                    assert!(engine.town().schools.contains(&hub));
                }
                AgeGroup::Senior => assert!(person.assigned_hub.is_none()),
                AgeGroup::Adult => assert_eq!(
                    person.assigned_hub.is_some(),
                    person.mobility != MobilityClass::Low
                ),
            }
        }
    }

    #[test]
    fn clock_rolls_over_phases_and_days() {
        let mut engine = Engine::new(
            Params {
                sim_speed: 20.0,
                ..small_params()
            },
            1,
        );
        engine.run_steps(30);
        assert_eq!(engine.tick(), 1);
        assert_eq!(engine.day_phase(), DayPhase::Evening);
        engine.run_steps(60);
        assert_eq!(engine.day(), 1);
        assert_eq!(engine.tick(), 0);
        assert_eq!(engine.weekday(), Weekday::Tue);
    }

    #[test]
    fn paused_engine_does_not_move() {
        let mut engine = Engine::new(small_params(), 3);
        engine.set_paused(true);
        engine.run_steps(10);
        engine.run_until_day(5);
        assert_eq!(engine.updates(), 0);
        engine.set_paused(false);
        engine.step();
        assert_eq!(engine.updates(), 1);
    }

    #[test]
    fn history_is_sampled_every_interval() {
        let mut engine = Engine::new(
            Params {
                history_interval: 10,
                ..small_params()
            },
            5,
        );
        engine.run_steps(100);
        assert_eq!(engine.history().len(), 10);
    }

    #[test]
    fn init_world_resets() {
        let mut engine = Engine::new(small_params(), 9);
        let first: Vec<_> = engine.people().iter().map(|p| p.sim_pos).collect();
        engine.run_steps(50);
        engine.init_world(small_params());
        assert_eq!(engine.updates(), 0);
        assert!(engine.history().is_empty());
        let again: Vec<_> = engine.people().iter().map(|p| p.sim_pos).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn elapsed_days_tracks_clock() {
        let mut engine = Engine::new(small_params(), 2);
        engine.run_steps(900);
        assert_approx_eq!(engine.elapsed_days(), 0.5, 1e-9);
    }
}
