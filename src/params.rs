//! Model parameters.
//!
//! [`Params`] is a plain value: the engine takes a snapshot of it at the start of every step, so a
//! controller may replace it between steps with [`crate::engine::Engine::set_params`]. Only
//! `pop_size` and `init_infected` require a rebuild (`init_world`) to take effect.
//!
//! The engine trusts the values it is given. Range checking belongs to whoever produces the
//! value; [`Params::clamped`] applies the ranges of the interactive control panel and
//! [`Params::load_from_json`] applies them to anything read from disk.

use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::EpinetError;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    // Population and contact graph
    pub pop_size: usize,
    pub init_infected: usize,
    /// Ring-lattice neighbors per node in the small-world graph.
    pub k_neighbors: usize,
    pub rewire_prob: f64,
    /// Willingness to go out. Below 0.4 the town is in lockdown.
    pub social_engagement: f64,

    // Transmission
    pub beta: f64,
    /// Distance scale of proximity decay, in simulated-space units.
    pub kappa: f64,
    pub latent_mean: f64,
    pub inf_mean: f64,
    pub asymp_prob: f64,
    pub shedding_symp: f64,
    pub shedding_asymp: f64,
    pub superspreader_prob: f64,

    // Severity
    pub hosp_stay_mean: f64,
    /// Daily mortality hazard before modifiers.
    pub base_mortality: f64,
    pub hosp_mortality_mult: f64,
    pub no_bed_mult: f64,

    // Immunity
    pub immunity_waning: f64,
    pub immunity_efficacy: f64,

    // Interventions
    pub mask_compliance: f64,
    pub mask_efficacy: f64,
    /// Target vaccinated fraction of the population.
    pub vaccine_rate: f64,
    pub vaccine_efficacy: f64,
    pub quarantine_rate: f64,

    /// Multiplier on simulated time advanced per step.
    pub sim_speed: f64,

    // History
    /// Maximum number of samples kept per series.
    pub history_capacity: usize,
    /// Updates between history samples.
    pub history_interval: usize,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            pop_size: 500,
            init_infected: 3,
            k_neighbors: 5,
            rewire_prob: 0.1,
            social_engagement: 1.0,
            beta: 40.0,
            kappa: 20.0,
            latent_mean: 2.0,
            inf_mean: 10.0,
            asymp_prob: 0.4,
            shedding_symp: 1.0,
            shedding_asymp: 0.5,
            superspreader_prob: 0.05,
            hosp_stay_mean: 10.0,
            base_mortality: 0.005,
            hosp_mortality_mult: 0.5,
            no_bed_mult: 5.0,
            immunity_waning: 0.005,
            immunity_efficacy: 0.9,
            mask_compliance: 0.0,
            mask_efficacy: 0.6,
            vaccine_rate: 0.0,
            vaccine_efficacy: 0.8,
            quarantine_rate: 0.5,
            sim_speed: 1.0,
            history_capacity: 410,
            history_interval: 40,
        }
    }
}

fn clamp_f64(name: &str, value: f64, low: f64, high: f64) -> f64 {
    // NaN falls back to the lower bound.
    let clamped = if value.is_nan() {
        low
    } else {
        value.clamp(low, high)
    };
    if clamped != value {
        warn!("parameter `{name}` = {value} out of range [{low}, {high}], using {clamped}");
    }
    clamped
}

fn clamp_usize(name: &str, value: usize, low: usize, high: usize) -> usize {
    let clamped = value.clamp(low, high);
    if clamped != value {
        warn!("parameter `{name}` = {value} out of range [{low}, {high}], using {clamped}");
    }
    clamped
}

impl Params {
    /// Reads parameters from a JSON object. Missing fields take their default value; unknown
    /// fields are an error. The result is [`clamped`](Self::clamped).
    ///
    /// # Errors
    ///
    /// Returns an `EpinetError` if the file cannot be read or is not a valid parameter object.
    pub fn load_from_json(path: &Path) -> Result<Params, EpinetError> {
        let contents = fs::read_to_string(path)?;
        Params::from_json_str(&contents)
    }

    /// # Errors
    ///
    /// Returns an `EpinetError::JsonError` if `json` is not a valid parameter object.
    pub fn from_json_str(json: &str) -> Result<Params, EpinetError> {
        let params: Params = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params.clamped())
    }

    /// Rejects values that no amount of clamping can make meaningful.
    ///
    /// # Errors
    ///
    /// Returns an `EpinetError::ParamsError` naming the offending field.
    pub fn validate(&self) -> Result<(), EpinetError> {
        if self.pop_size == 0 {
            return Err(EpinetError::ParamsError(
                "pop_size must be at least 1".to_string(),
            ));
        }
        if self.history_interval == 0 {
            return Err(EpinetError::ParamsError(
                "history_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Forces every field into the range offered by the interactive controls, logging a warning
    /// for each field that had to change.
    #[must_use]
    pub fn clamped(self) -> Params {
        Params {
            pop_size: clamp_usize("pop_size", self.pop_size, 1, 5000),
            init_infected: clamp_usize("init_infected", self.init_infected, 0, 5000),
            k_neighbors: clamp_usize("k_neighbors", self.k_neighbors, 0, 100),
            rewire_prob: clamp_f64("rewire_prob", self.rewire_prob, 0.0, 1.0),
            social_engagement: clamp_f64("social_engagement", self.social_engagement, 0.0, 2.0),
            beta: clamp_f64("beta", self.beta, 0.0, 100.0),
            kappa: clamp_f64("kappa", self.kappa, 1.0, 100.0),
            latent_mean: clamp_f64("latent_mean", self.latent_mean, 0.0, 30.0),
            inf_mean: clamp_f64("inf_mean", self.inf_mean, 2.0, 30.0),
            asymp_prob: clamp_f64("asymp_prob", self.asymp_prob, 0.0, 1.0),
            shedding_symp: clamp_f64("shedding_symp", self.shedding_symp, 0.0, 10.0),
            shedding_asymp: clamp_f64("shedding_asymp", self.shedding_asymp, 0.0, 10.0),
            superspreader_prob: clamp_f64("superspreader_prob", self.superspreader_prob, 0.0, 1.0),
            hosp_stay_mean: clamp_f64("hosp_stay_mean", self.hosp_stay_mean, 2.0, 21.0),
            base_mortality: clamp_f64("base_mortality", self.base_mortality, 0.0, 0.2),
            hosp_mortality_mult: clamp_f64(
                "hosp_mortality_mult",
                self.hosp_mortality_mult,
                0.0,
                10.0,
            ),
            no_bed_mult: clamp_f64("no_bed_mult", self.no_bed_mult, 0.0, 20.0),
            immunity_waning: clamp_f64("immunity_waning", self.immunity_waning, 0.0, 1.0),
            immunity_efficacy: clamp_f64("immunity_efficacy", self.immunity_efficacy, 0.0, 1.0),
            mask_compliance: clamp_f64("mask_compliance", self.mask_compliance, 0.0, 1.0),
            mask_efficacy: clamp_f64("mask_efficacy", self.mask_efficacy, 0.0, 1.0),
            vaccine_rate: clamp_f64("vaccine_rate", self.vaccine_rate, 0.0, 1.0),
            vaccine_efficacy: clamp_f64("vaccine_efficacy", self.vaccine_efficacy, 0.0, 1.0),
            quarantine_rate: clamp_f64("quarantine_rate", self.quarantine_rate, 0.0, 1.0),
            sim_speed: clamp_f64("sim_speed", self.sim_speed, 0.1, 20.0),
            history_capacity: clamp_usize("history_capacity", self.history_capacity, 1, 100_000),
            history_interval: clamp_usize("history_interval", self.history_interval, 1, 100_000),
        }
    }

    /// Simulated days advanced by one step.
    #[must_use]
    pub fn days_per_update(&self) -> f64 {
        crate::engine::DAYS_PER_UPDATE * self.sim_speed
    }

    /// True when social engagement is low enough to trigger lockdown behaviour.
    #[must_use]
    pub fn is_lockdown(&self) -> bool {
        self.social_engagement < LOCKDOWN_THRESHOLD
    }

    /// Binary transmission multiplier applied under lockdown.
    #[must_use]
    pub fn distancing_factor(&self) -> f64 {
        if self.is_lockdown() {
            LOCKDOWN_DISTANCING
        } else {
            1.0
        }
    }
}

pub const LOCKDOWN_THRESHOLD: f64 = 0.4;
const LOCKDOWN_DISTANCING: f64 = 0.2;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_json_keeps_defaults() {
        let params = Params::from_json_str(r#"{ "beta": 12.5, "pop_size": 200 }"#).unwrap();
        assert_eq!(params.pop_size, 200);
        assert_eq!(params.beta, 12.5);
        assert_eq!(params.kappa, Params::default().kappa);
    }

    #[test]
    fn unknown_field_is_error() {
        let result = Params::from_json_str(r#"{ "betta": 1.0 }"#);
        assert!(matches!(result, Err(EpinetError::JsonError(_))));
    }

    #[test]
    fn zero_population_is_rejected() {
        let result = Params::from_json_str(r#"{ "pop_size": 0 }"#);
        assert!(matches!(result, Err(EpinetError::ParamsError(_))));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let params = Params {
            beta: -3.0,
            sim_speed: 100.0,
            vaccine_rate: f64::NAN,
            ..Params::default()
        }
        .clamped();
        assert_eq!(params.beta, 0.0);
        assert_eq!(params.sim_speed, 20.0);
        assert_eq!(params.vaccine_rate, 0.0);
    }

    #[test]
    fn defaults_are_within_range() {
        assert_eq!(Params::default().clamped(), Params::default());
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "social_engagement": 0.3 }}"#).unwrap();
        let params = Params::load_from_json(file.path()).unwrap();
        assert!(params.is_lockdown());
        assert_eq!(params.distancing_factor(), 0.2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = Params::load_from_json(Path::new("/nonexistent/epinet/params.json"));
        assert!(matches!(result, Err(EpinetError::IoError(_))));
    }
}
