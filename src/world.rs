//! The fixed town layout.
//!
//! The market sits at the centre. Schools, workplaces, the cafe and the park form an inner ring;
//! the hospital, quarantine site and cemetery sit on a far ring; households fill up to three
//! concentric outer rings. Every location has a position in simulated space and a fixed anchor in
//! graph space, where the force-directed layout pulls people toward the places they belong to.

use std::f64::consts::TAU;

use crate::location::{Location, LocationId, LocationType};
use crate::vector::Vec2;

/// Width of the simulated area.
pub const SIM_WIDTH: f64 = 1150.0;
/// Height of the simulated area.
pub const SIM_HEIGHT: f64 = 900.0;
pub const CENTER: Vec2 = Vec2::new(SIM_WIDTH / 2.0, SIM_HEIGHT / 2.0);

/// Graph-space ring of schools, workplaces and venues.
pub const RING_RAD_MID: f64 = 160.0;
/// Graph-space ring of households.
pub const RING_RAD_OUTER: f64 = 400.0;
/// Graph-space ring of the hospital, quarantine and cemetery.
pub const RING_RAD_FAR: f64 = 460.0;

const VENUE_SIM_RADIUS: f64 = 180.0;
const HOUSEHOLD_SIM_RINGS: [f64; 3] = [290.0, 345.0, 400.0];
const HOUSEHOLD_RADIUS: f64 = 14.0;
const HOUSEHOLD_CAPACITY: usize = 20;
const HOUSEHOLD_RISK: f64 = 1.5;
/// Arc length reserved for one household on a ring.
const HOUSEHOLD_SPACING: f64 = HOUSEHOLD_RADIUS * 2.5;

/// The inner ring: (type, label, capacity, risk multiplier).
const VENUES: [(LocationType, &str, usize, f64); 6] = [
    (LocationType::School, "SCHOOL 1", 300, 2.0),
    (LocationType::School, "SCHOOL 2", 300, 2.0),
    (LocationType::Workplace, "OFFICE", 100, 1.2),
    (LocationType::Workplace, "FACTORY", 100, 1.2),
    (LocationType::Cafe, "CAFE", 500, 1.5),
    (LocationType::Park, "PARK", 800, 0.2),
];

/// Ids of the town's landmarks. Locations themselves live in the engine's location list,
/// indexed by `LocationId`.
#[derive(Clone, Debug)]
pub struct TownMap {
    pub market: LocationId,
    pub schools: Vec<LocationId>,
    pub workplaces: Vec<LocationId>,
    pub cafe: LocationId,
    pub park: LocationId,
    pub hospital: LocationId,
    pub quarantine: LocationId,
    pub cemetery: LocationId,
    pub households: Vec<LocationId>,
}

/// Households wanted for a population: one per five people, at least ten. The town may build
/// fewer when the household rings run out of room.
#[must_use]
pub fn households_needed(pop_size: usize) -> usize {
    (pop_size / 5).max(10)
}

fn household_ring_positions(needed: usize) -> Vec<Vec2> {
    let mut positions = Vec::with_capacity(needed);
    for radius in HOUSEHOLD_SIM_RINGS {
        if positions.len() >= needed {
            break;
        }
        let ring_capacity = (TAU * radius / HOUSEHOLD_SPACING) as usize;
        let to_place = ring_capacity.min(needed - positions.len());
        if to_place == 0 {
            continue;
        }
        let angle_step = TAU / to_place as f64;
        positions.extend((0..to_place).map(|i| Vec2::polar(CENTER, radius, i as f64 * angle_step)));
    }
    positions
}

impl TownMap {
    /// Lays out the town for `pop_size` people. Returns the landmark ids and the full location
    /// list, where each location's index equals its id.
    #[must_use]
    pub fn build(pop_size: usize) -> (TownMap, Vec<Location>) {
        let mut locations: Vec<Location> = Vec::new();
        let mut add = |label: &str,
                       location_type: LocationType,
                       sim_pos: Vec2,
                       graph_pos: Vec2,
                       radius: f64,
                       capacity: usize,
                       risk_mult: f64| {
            let id = LocationId(locations.len());
            locations.push(Location::new(
                id,
                label,
                location_type,
                sim_pos,
                graph_pos,
                radius,
                capacity,
                risk_mult,
            ));
            id
        };

        let market = add("MARKET", LocationType::Market, CENTER, CENTER, 70.0, 400, 1.5);

        let mut schools = Vec::new();
        let mut workplaces = Vec::new();
        let mut cafe = market;
        let mut park = market;
        let angle_step = TAU / VENUES.len() as f64;
        for (i, (location_type, label, capacity, risk)) in VENUES.into_iter().enumerate() {
            let angle = i as f64 * angle_step;
            let id = add(
                label,
                location_type,
                Vec2::polar(CENTER, VENUE_SIM_RADIUS, angle),
                Vec2::polar(CENTER, RING_RAD_MID, angle),
                50.0,
                capacity,
                risk,
            );
            match location_type {
                LocationType::School => schools.push(id),
                LocationType::Workplace => workplaces.push(id),
                LocationType::Cafe => cafe = id,
                LocationType::Park => park = id,
                _ => {}
            }
        }

        let hospital = add(
            "HOSPITAL",
            LocationType::Hospital,
            Vec2::new(SIM_WIDTH - 100.0, 150.0),
            Vec2::polar(CENTER, RING_RAD_FAR, (-135.0_f64).to_radians()),
            60.0,
            50,
            0.5,
        );
        let quarantine = add(
            "QUARANTINE",
            LocationType::Quarantine,
            Vec2::new(100.0, 150.0),
            Vec2::polar(CENTER, RING_RAD_FAR, (-45.0_f64).to_radians()),
            60.0,
            200,
            0.1,
        );
        let cemetery = add(
            "CEMETERY",
            LocationType::Cemetery,
            Vec2::new(SIM_WIDTH - 100.0, SIM_HEIGHT - 100.0),
            Vec2::polar(CENTER, RING_RAD_FAR, 45.0_f64.to_radians()),
            70.0,
            5000,
            0.0,
        );

        let sim_positions = household_ring_positions(households_needed(pop_size));
        let graph_angle_step = TAU / sim_positions.len().max(1) as f64;
        let households = sim_positions
            .iter()
            .enumerate()
            .map(|(i, sim_pos)| {
                add(
                    "",
                    LocationType::Household,
                    *sim_pos,
                    Vec2::polar(CENTER, RING_RAD_OUTER, i as f64 * graph_angle_step),
                    HOUSEHOLD_RADIUS,
                    HOUSEHOLD_CAPACITY,
                    HOUSEHOLD_RISK,
                )
            })
            .collect();

        let town = TownMap {
            market,
            schools,
            workplaces,
            cafe,
            park,
            hospital,
            quarantine,
            cemetery,
            households,
        };
        (town, locations)
    }
}
