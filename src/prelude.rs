pub use crate::engine::Engine;
pub use crate::error::EpinetError;
pub use crate::location::{Location, LocationId, LocationType};
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::params::Params;
pub use crate::person::{AgeGroup, HealthState, MobilityClass, Person, PersonId, StructuralRole};
pub use crate::report::{Demographics, HealthCensus, History, PopulationCounts, Series};
pub use crate::schedule::{DayPhase, Weekday};
pub use crate::vector::Vec2;
