//! The daily routine.
//!
//! A day has three phases. At the start of each phase every person is given a new target:
//! people who are dead, hospitalized, quarantined or symptomatic go where their condition sends
//! them, and everyone else follows a phase-specific routine shaped by the day of the week, the
//! lockdown state, social engagement and their own age and mobility.

use strum::{Display, EnumIter};

use crate::location::{Location, LocationId};
use crate::params::Params;
use crate::person::{AgeGroup, HealthState, MobilityClass, Person};
use crate::random::SimRng;
use crate::world::TownMap;

pub const TICKS_PER_DAY: u32 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum DayPhase {
    Morning,
    Evening,
    Night,
}

impl DayPhase {
    /// The phase of tick `tick` within a day.
    #[must_use]
    pub fn from_tick(tick: u32) -> DayPhase {
        match tick % TICKS_PER_DAY {
            0 => DayPhase::Morning,
            1 => DayPhase::Evening,
            _ => DayPhase::Night,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// Day 0 is a Monday.
    #[must_use]
    pub fn from_day(day: u32) -> Weekday {
        match day % 7 {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            4 => Weekday::Fri,
            5 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }

    #[must_use]
    pub fn is_weekend(self) -> bool {
        matches!(self, Weekday::Sat | Weekday::Sun)
    }
}

/// Where a person's condition sends them regardless of the routine, if anywhere.
fn override_target(person: &Person, town: &TownMap) -> Option<LocationId> {
    if person.state == HealthState::Dead {
        Some(town.cemetery)
    } else if person.state == HealthState::Hospitalized {
        Some(town.hospital)
    } else if person.in_quarantine {
        Some(town.quarantine)
    } else if person.state == HealthState::Symptomatic {
        Some(person.home)
    } else {
        None
    }
}

fn morning_target(
    person: &Person,
    town: &TownMap,
    weekday: Weekday,
    params: &Params,
    rng: &mut SimRng,
) -> LocationId {
    if weekday.is_weekend() {
        if !rng.sample_bool(0.5 * params.social_engagement) {
            return person.home;
        }
        let r = rng.sample_uniform();
        return if r < 0.4 {
            town.park
        } else if r < 0.7 {
            town.market
        } else {
            town.cafe
        };
    }

    if params.is_lockdown() {
        return if rng.sample_bool(0.02) {
            town.market
        } else {
            person.home
        };
    }

    if person.age == AgeGroup::Senior || person.mobility == MobilityClass::Low {
        if rng.sample_bool(0.15) {
            town.market
        } else {
            person.home
        }
    } else if let Some(hub) = person.assigned_hub {
        if rng.sample_bool(0.95) {
            hub
        } else {
            person.home
        }
    } else {
        person.home
    }
}

fn evening_target(
    person: &Person,
    town: &TownMap,
    params: &Params,
    rng: &mut SimRng,
) -> LocationId {
    if params.is_lockdown() {
        return person.home;
    }
    let social = params.social_engagement;
    if person.mobility == MobilityClass::High && rng.sample_bool(0.3 * social) {
        town.cafe
    } else if rng.sample_bool(0.2 * social) {
        rng.choose(&town.households).copied().unwrap_or(person.home)
    } else if rng.sample_bool(0.2 * social) {
        town.market
    } else {
        person.home
    }
}

/// Retargets everyone for the start of `phase` on `weekday`.
pub fn apply_schedule(
    people: &mut [Person],
    locations: &[Location],
    town: &TownMap,
    phase: DayPhase,
    weekday: Weekday,
    params: &Params,
    rng: &mut SimRng,
) {
    for person in people.iter_mut() {
        let target = match override_target(person, town) {
            Some(target) => target,
            None => match phase {
                DayPhase::Morning => morning_target(person, town, weekday, params, rng),
                DayPhase::Evening => evening_target(person, town, params, rng),
                DayPhase::Night => person.home,
            },
        };
        person.set_target(&locations[target.0], rng);
    }
}
