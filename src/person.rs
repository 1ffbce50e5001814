//! People: health state, demographic traits, both positions, and their ties to places.

use serde::Serialize;
use strum::{Display, EnumIter};

use crate::location::{Location, LocationId};
use crate::params::Params;
use crate::random::SimRng;
use crate::vector::Vec2;
use crate::world::TownMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PersonId(pub usize);

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
pub enum HealthState {
    Susceptible,
    Latent,
    Asymptomatic,
    Symptomatic,
    Hospitalized,
    Recovered,
    Dead,
}

impl HealthState {
    /// States in which a person sheds virus.
    #[must_use]
    pub fn is_infectious(self) -> bool {
        matches!(
            self,
            HealthState::Asymptomatic | HealthState::Symptomatic | HealthState::Hospitalized
        )
    }

    /// Infected and not yet resolved.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, HealthState::Latent) || self.is_infectious()
    }

    /// Whether `self -> next` is an edge of the disease progression graph.
    #[must_use]
    pub fn can_transition_to(self, next: HealthState) -> bool {
        use HealthState::{
            Asymptomatic, Dead, Hospitalized, Latent, Recovered, Susceptible, Symptomatic,
        };
        match self {
            Susceptible => next == Latent,
            Latent => matches!(next, Asymptomatic | Symptomatic),
            Asymptomatic => matches!(next, Recovered | Dead),
            Symptomatic => matches!(next, Recovered | Hospitalized | Dead),
            Hospitalized => matches!(next, Recovered | Dead),
            Recovered => next == Susceptible,
            Dead => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
pub enum AgeGroup {
    Child,
    Adult,
    Senior,
}

impl AgeGroup {
    /// Mean constitution before per-person variation.
    #[must_use]
    pub fn base_constitution(self) -> f64 {
        match self {
            AgeGroup::Child => 0.8,
            AgeGroup::Adult => 0.6,
            AgeGroup::Senior => 0.3,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
pub enum MobilityClass {
    High,
    Moderate,
    Low,
}

/// The places a person has a persistent tie to. Each role maps to one slot of
/// [`StructuralEdges`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
pub enum StructuralRole {
    Home,
    AssignedHub,
    Market,
    Hospital,
    Quarantine,
    Park,
    Cafe,
    Cemetery,
}

impl StructuralRole {
    pub const COUNT: usize = 8;

    pub const ALL: [StructuralRole; StructuralRole::COUNT] = [
        StructuralRole::Home,
        StructuralRole::AssignedHub,
        StructuralRole::Market,
        StructuralRole::Hospital,
        StructuralRole::Quarantine,
        StructuralRole::Park,
        StructuralRole::Cafe,
        StructuralRole::Cemetery,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Presence weights in `[0, 1]` from a person to each of their structural locations. A weight
/// fades toward 1 while the person is at that location and toward 0 otherwise.
#[derive(Clone, Debug, Serialize)]
pub struct StructuralEdges {
    locations: [Option<LocationId>; StructuralRole::COUNT],
    weights: [f64; StructuralRole::COUNT],
}

impl StructuralEdges {
    /// Ties to `home` (weight 1, since everyone starts at home) plus zero-weight ties to the
    /// assigned hub, if any, and every shared landmark of `town`.
    #[must_use]
    pub fn new(home: LocationId, assigned_hub: Option<LocationId>, town: &TownMap) -> Self {
        let mut locations = [None; StructuralRole::COUNT];
        locations[StructuralRole::Home.index()] = Some(home);
        locations[StructuralRole::AssignedHub.index()] = assigned_hub;
        locations[StructuralRole::Market.index()] = Some(town.market);
        locations[StructuralRole::Hospital.index()] = Some(town.hospital);
        locations[StructuralRole::Quarantine.index()] = Some(town.quarantine);
        locations[StructuralRole::Park.index()] = Some(town.park);
        locations[StructuralRole::Cafe.index()] = Some(town.cafe);
        locations[StructuralRole::Cemetery.index()] = Some(town.cemetery);

        let mut weights = [0.0; StructuralRole::COUNT];
        weights[StructuralRole::Home.index()] = 1.0;
        StructuralEdges { locations, weights }
    }

    #[must_use]
    pub fn location(&self, role: StructuralRole) -> Option<LocationId> {
        self.locations[role.index()]
    }

    #[must_use]
    pub fn weight(&self, role: StructuralRole) -> f64 {
        self.weights[role.index()]
    }

    /// The weight of the tie to `location`, or `None` if it is not a structural location.
    #[must_use]
    pub fn weight_of(&self, location: LocationId) -> Option<f64> {
        self.iter()
            .find(|(_, loc, _)| *loc == location)
            .map(|(_, _, w)| w)
    }

    /// Existing ties in role order.
    pub fn iter(&self) -> impl Iterator<Item = (StructuralRole, LocationId, f64)> + '_ {
        StructuralRole::ALL.iter().filter_map(move |role| {
            self.locations[role.index()].map(|loc| (*role, loc, self.weights[role.index()]))
        })
    }

    /// Moves every weight by at most `amount` toward 1 for `present_at` and toward 0 for all
    /// other ties.
    pub fn fade_toward(&mut self, present_at: Option<LocationId>, amount: f64) {
        for (slot, weight) in self.locations.iter().zip(self.weights.iter_mut()) {
            let Some(location) = slot else { continue };
            let target = if present_at == Some(*location) { 1.0 } else { 0.0 };
            if *weight < target {
                *weight = (*weight + amount).min(target);
            } else if *weight > target {
                *weight = (*weight - amount).max(target);
            }
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Person {
    pub id: PersonId,
    pub home: LocationId,
    pub age: AgeGroup,
    pub mobility: MobilityClass,

    // Disease
    pub state: HealthState,
    /// Simulated days since the last state change.
    pub days_in_state: f64,
    pub latent_dur: f64,
    pub inf_dur: f64,
    pub hospital_stay_dur: f64,
    pub peak_shedding: f64,
    pub is_superspreader: bool,
    /// Intrinsic resistance in `[0.1, 1.0]`.
    pub constitution: f64,
    pub immunity: f64,
    pub vaccinated: bool,
    pub masked: bool,
    /// Fixed draw compared against mask compliance each step.
    pub mask_propensity: f64,
    pub in_quarantine: bool,

    // Movement in simulated space
    pub assigned_hub: Option<LocationId>,
    pub target: LocationId,
    pub target_pos: Vec2,
    pub sim_pos: Vec2,
    /// Where the person currently is; `None` while walking.
    pub current_hub: Option<LocationId>,

    // Graph layout
    pub graph_pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,

    pub neighbors: Vec<PersonId>,
    pub structural_edges: StructuralEdges,
}

impl Person {
    /// Creates a susceptible person standing at a random point inside `home`.
    pub fn new(
        id: PersonId,
        home: &Location,
        age: AgeGroup,
        mobility: MobilityClass,
        town: &TownMap,
        params: &Params,
        rng: &mut SimRng,
    ) -> Self {
        let constitution =
            (age.base_constitution() + rng.sample_range(-0.15, 0.15)).clamp(0.1, 1.0);
        let is_superspreader = rng.sample_bool(params.superspreader_prob);
        let mask_propensity = rng.sample_uniform();
        let sim_pos = random_point(home, rng);

        Person {
            id,
            home: home.id,
            age,
            mobility,
            state: HealthState::Susceptible,
            days_in_state: 0.0,
            latent_dur: 0.0,
            inf_dur: 0.0,
            hospital_stay_dur: 0.0,
            peak_shedding: 0.0,
            is_superspreader,
            constitution,
            immunity: 0.0,
            vaccinated: false,
            masked: mask_propensity < params.mask_compliance,
            mask_propensity,
            in_quarantine: false,
            assigned_hub: None,
            target: home.id,
            target_pos: sim_pos,
            sim_pos,
            current_hub: Some(home.id),
            graph_pos: home.graph_pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            neighbors: Vec::new(),
            structural_edges: StructuralEdges::new(home.id, None, town),
        }
    }

    /// Gives the person a school or workplace and the matching structural tie.
    pub fn assign_hub(&mut self, hub: LocationId, town: &TownMap) {
        self.assigned_hub = Some(hub);
        self.structural_edges = StructuralEdges::new(self.home, Some(hub), town);
    }

    /// Locations the person is permanently anchored to in the graph layout.
    pub fn affiliations(&self) -> impl Iterator<Item = LocationId> {
        std::iter::once(self.home).chain(self.assigned_hub)
    }

    /// Redirects the person toward `location`, picking a fresh spot inside it. Re-targeting the
    /// current target is a no-op.
    pub fn set_target(&mut self, location: &Location, rng: &mut SimRng) {
        if self.target == location.id {
            return;
        }
        self.target = location.id;
        self.target_pos = random_point(location, rng);
    }

    /// Whether the person is at elevated risk of severe disease.
    #[must_use]
    pub fn is_high_risk(&self) -> bool {
        self.constitution < 0.4 || self.age == AgeGroup::Senior
    }

    pub fn update_mask(&mut self, compliance: f64) {
        self.masked = self.mask_propensity < compliance;
    }

    /// Current virus output. Rises linearly over the first 30% of the infectious period, then
    /// falls linearly to zero at its end. Zero outside the infectious states.
    #[must_use]
    pub fn shedding(&self, mask_efficacy: f64) -> f64 {
        if !self.state.is_infectious() || self.inf_dur <= 0.0 {
            return 0.0;
        }
        let progress = self.days_in_state / self.inf_dur;
        let amount = shedding_curve(progress) * self.peak_shedding;
        if self.masked {
            amount * (1.0 - mask_efficacy)
        } else {
            amount
        }
    }
}

/// Relative shedding at `progress` through the infectious period.
#[must_use]
pub fn shedding_curve(progress: f64) -> f64 {
    if !(0.0..=1.0).contains(&progress) {
        return 0.0;
    }
    if progress < 0.3 {
        progress / 0.3
    } else {
        1.0 - (progress - 0.3) / 0.7
    }
}

/// A random point within `location`, away from its rim.
pub fn random_point(location: &Location, rng: &mut SimRng) -> Vec2 {
    let offset = Vec2::new(rng.sample_range(-1.0, 1.0), rng.sample_range(-1.0, 1.0));
    let direction = offset.try_normalize().unwrap_or(offset);
    location.sim_pos + direction * rng.sample_range(0.0, location.radius - 2.0)
}
