//! Aggregate counts over the population and their bounded history.
//!
//! [`History`] is what a chart reads: one [`PopulationCounts`] sample every few updates, oldest
//! dropped once the configured capacity is reached. [`HealthCensus`] and [`Demographics`] are
//! point-in-time summaries for a status panel. [`write_history_csv`] exports a history as one CSV
//! row per sample.

use std::collections::VecDeque;
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

use csv::Writer;
use serde::Serialize;
use strum::{Display, EnumIter};

use crate::error::EpinetError;
use crate::person::{AgeGroup, HealthState, MobilityClass, Person};

/// One history sample.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PopulationCounts {
    /// Simulated day the sample was taken on.
    pub day: u32,
    pub susceptible: usize,
    /// Latent, asymptomatic, symptomatic and hospitalized.
    pub active: usize,
    pub recovered: usize,
    pub dead: usize,
    /// Also counted in `active`.
    pub hospitalized: usize,
}

impl PopulationCounts {
    #[must_use]
    pub fn from_people(people: &[Person], day: u32) -> Self {
        let mut counts = PopulationCounts {
            day,
            ..PopulationCounts::default()
        };
        for person in people {
            match person.state {
                HealthState::Susceptible => counts.susceptible += 1,
                HealthState::Latent | HealthState::Asymptomatic | HealthState::Symptomatic => {
                    counts.active += 1;
                }
                HealthState::Hospitalized => {
                    counts.active += 1;
                    counts.hospitalized += 1;
                }
                HealthState::Recovered => counts.recovered += 1,
                HealthState::Dead => counts.dead += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn get(&self, series: Series) -> usize {
        match series {
            Series::Susceptible => self.susceptible,
            Series::Active => self.active,
            Series::Recovered => self.recovered,
            Series::Dead => self.dead,
            Series::Hospitalized => self.hospitalized,
        }
    }
}

/// The charted time series.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Series {
    Susceptible,
    Active,
    Recovered,
    Dead,
    Hospitalized,
}

/// Count of people in every health state, plus the vaccinated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HealthCensus {
    pub susceptible: usize,
    pub vaccinated: usize,
    pub latent: usize,
    pub asymptomatic: usize,
    pub symptomatic: usize,
    pub hospitalized: usize,
    pub recovered: usize,
    pub dead: usize,
}

impl HealthCensus {
    #[must_use]
    pub fn from_people(people: &[Person]) -> Self {
        let mut census = HealthCensus::default();
        for person in people {
            if person.vaccinated {
                census.vaccinated += 1;
            }
            let slot = match person.state {
                HealthState::Susceptible => &mut census.susceptible,
                HealthState::Latent => &mut census.latent,
                HealthState::Asymptomatic => &mut census.asymptomatic,
                HealthState::Symptomatic => &mut census.symptomatic,
                HealthState::Hospitalized => &mut census.hospitalized,
                HealthState::Recovered => &mut census.recovered,
                HealthState::Dead => &mut census.dead,
            };
            *slot += 1;
        }
        census
    }

    /// Everyone counted in a health state. Vaccination is orthogonal and not included.
    #[must_use]
    pub fn total(&self) -> usize {
        self.susceptible
            + self.latent
            + self.asymptomatic
            + self.symptomatic
            + self.hospitalized
            + self.recovered
            + self.dead
    }
}

/// Population make-up, fixed when the world is built.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Demographics {
    pub children: usize,
    pub adults: usize,
    pub seniors: usize,
    pub high_mobility: usize,
    pub moderate_mobility: usize,
    pub low_mobility: usize,
}

impl Demographics {
    pub fn record(&mut self, age: AgeGroup, mobility: MobilityClass) {
        match age {
            AgeGroup::Child => self.children += 1,
            AgeGroup::Adult => self.adults += 1,
            AgeGroup::Senior => self.seniors += 1,
        }
        match mobility {
            MobilityClass::High => self.high_mobility += 1,
            MobilityClass::Moderate => self.moderate_mobility += 1,
            MobilityClass::Low => self.low_mobility += 1,
        }
    }
}

/// A sliding window of the most recent samples.
#[derive(Clone, Debug)]
pub struct History {
    capacity: usize,
    samples: VecDeque<PopulationCounts>,
}

impl History {
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        History {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Appends a sample, dropping the oldest ones beyond capacity.
    pub fn push(&mut self, sample: PopulationCounts) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Changes the capacity, dropping the oldest samples if it shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Samples from oldest to newest.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = &PopulationCounts> + '_ {
        self.samples.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&PopulationCounts> {
        self.samples.back()
    }

    /// One series from oldest to newest.
    #[must_use]
    pub fn series(&self, series: Series) -> Vec<usize> {
        self.samples.iter().map(|s| s.get(series)).collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

// Checks that the path names a CSV file and creates its parent directories.
fn create_report_file(path: &Path) -> Result<File, EpinetError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            Ok(File::create(path)?)
        }
        _ => Err(EpinetError::ReportError(format!(
            "report output files must be CSVs, got {}",
            path.display()
        ))),
    }
}

/// Writes every sample of `history` as a CSV row, with a header.
///
/// # Errors
///
/// Returns an `EpinetError` if `path` does not end in `.csv` or the file cannot be written.
pub fn write_history_csv(history: &History, path: &Path) -> Result<(), EpinetError> {
    let file = create_report_file(path)?;
    let mut writer = Writer::from_writer(file);
    for sample in history.samples() {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    Ok(())
}
