//! Fixed places in the town ("hubs"): homes, schools, workplaces and shared venues.

use serde::Serialize;
use strum::{Display, EnumIter};

use crate::person::PersonId;
use crate::vector::Vec2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LocationId(pub usize);

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
pub enum LocationType {
    Household,
    School,
    Workplace,
    Market,
    Cafe,
    Park,
    Hospital,
    Cemetery,
    Quarantine,
}

#[derive(Clone, Debug, Serialize)]
pub struct Location {
    pub id: LocationId,
    pub label: String,
    pub location_type: LocationType,
    /// Position in simulated space, where people walk.
    pub sim_pos: Vec2,
    /// Fixed anchor in graph-layout space.
    pub graph_pos: Vec2,
    pub radius: f64,
    /// Slots, or beds for a hospital.
    pub capacity: usize,
    /// Scales the location-mediated transmission hazard.
    pub risk_mult: f64,
    /// Beds in use. Only meaningful for the hospital.
    pub occupied_beds: usize,
    // Transient state, rebuilt every step.
    pub viral_load: f64,
    pub present: Vec<PersonId>,
}

impl Location {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: LocationId,
        label: &str,
        location_type: LocationType,
        sim_pos: Vec2,
        graph_pos: Vec2,
        radius: f64,
        capacity: usize,
        risk_mult: f64,
    ) -> Self {
        Location {
            id,
            label: label.to_string(),
            location_type,
            sim_pos,
            graph_pos,
            radius,
            capacity,
            risk_mult,
            occupied_beds: 0,
            viral_load: 0.0,
            present: Vec::new(),
        }
    }

    /// Clears per-step state: viral load and the list of people present.
    pub fn clear_transient(&mut self) {
        self.viral_load = 0.0;
        self.present.clear();
    }

    #[must_use]
    pub fn has_free_bed(&self) -> bool {
        self.occupied_beds < self.capacity
    }

    /// Viral load per slot, the base of the location-mediated hazard.
    #[must_use]
    pub fn load_density(&self) -> f64 {
        self.viral_load / (self.capacity as f64 + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn hospital(beds: usize) -> Location {
        Location::new(
            LocationId(0),
            "HOSPITAL",
            LocationType::Hospital,
            Vec2::ZERO,
            Vec2::ZERO,
            60.0,
            beds,
            0.5,
        )
    }

    #[test]
    fn clear_transient_resets_load_and_presence() {
        let mut loc = hospital(2);
        loc.viral_load = 3.0;
        loc.present.push(PersonId(4));
        loc.occupied_beds = 1;
        loc.clear_transient();
        assert_eq!(loc.viral_load, 0.0);
        assert!(loc.present.is_empty());
        // Bed occupancy is not transient.
        assert_eq!(loc.occupied_beds, 1);
    }

    #[test]
    fn free_bed_tracks_capacity() {
        let mut loc = hospital(1);
        assert!(loc.has_free_bed());
        loc.occupied_beds = 1;
        assert!(!loc.has_free_bed());
    }

    #[test]
    fn load_density_uses_capacity_plus_one() {
        let mut loc = hospital(9);
        loc.viral_load = 5.0;
        assert_approx_eq!(loc.load_density(), 0.5);
    }
}
