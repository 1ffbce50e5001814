//! An epidemic on a moving town.
//!
//! `epinet` simulates an infection spreading through a synthetic population that moves between
//! the places of a small town (homes, schools, workplaces, venues, a hospital) and keeps durable
//! friendships on a small-world social graph. Alongside the epidemic it maintains a
//! force-directed layout of the contact network, so that a viewer can watch households and
//! friend groups cluster and drift as people come and go.
//!
//! The central object is the [`Engine`](engine::Engine), which owns the world and advances it one
//! update at a time:
//! * people follow a three-phase daily routine and walk to their targets
//! * shedders load the places they are tied to and expose their friends directly
//! * infections progress through latency, symptoms, hospitalisation, recovery or death, with
//!   hospital beds as a contended resource
//! * springs and short-range repulsion move every person through graph space
//!
//! All randomness flows through one seeded source, and people and locations are always visited
//! in index order, so a run is reproducible from its seed and [`Params`](params::Params).
//!
//! ```rust
//! use epinet::engine::Engine;
//! use epinet::params::Params;
//!
//! let params = Params {
//!     pop_size: 100,
//!     ..Params::default()
//! };
//! let mut engine = Engine::new(params, 42);
//! engine.run_steps(100);
//! assert_eq!(engine.people().len(), 100);
//! ```
pub mod disease;
pub mod engine;
pub mod error;
pub mod layout;
pub mod location;
pub mod log;
pub mod movement;
pub mod network;
pub mod params;
pub mod person;
pub mod random;
pub mod report;
pub mod runner;
pub mod schedule;
pub mod spatial;
pub mod transmission;
pub mod vaccination;
pub mod vector;
pub mod world;

pub mod prelude;

pub use engine::Engine;
pub use error::EpinetError;
pub use params::Params;

// Deterministic hashing for all internal maps.
pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

// Re-exported for downstream crates implementing their own controllers.
pub use rand;
