// 🎲 Synthetic Series Generator
//
// Builds one audience-share value per (station, year):
//   baseline + slope * years_since_start
//   + N(0, volatility)
//   + fixed-year shock (2008 / 2020 / 2021)
//   → clamp to [1.0, 35.0] → round to 1 decimal
//
// The random source is always passed in. Seed it for reproducible output.

use anyhow::{bail, Result};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::{debug, info};

use crate::entities::{StationRegistry, TrendParameters, TrendRegistry, DEFAULT_START_YEAR};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// A one-off perturbation applied to every station in a given year.
///
/// The added amount is drawn uniformly from `[low, high)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearShock {
    pub year: i32,
    pub label: String,
    pub low: f64,
    pub high: f64,
}

impl YearShock {
    pub fn new(year: i32, label: &str, low: f64, high: f64) -> Self {
        YearShock {
            year,
            label: label.to_string(),
            low,
            high,
        }
    }

    /// Economic crisis, pandemic listening boost, post-pandemic correction
    pub fn defaults() -> Vec<YearShock> {
        vec![
            YearShock::new(2008, "economic crisis", -2.0, -1.0),
            YearShock::new(2020, "pandemic effect", 2.0, 4.0),
            YearShock::new(2021, "post-shock correction", -1.0, 1.0),
        ]
    }

    fn sample(&self, rng: &mut impl Rng) -> f64 {
        if self.low < self.high {
            rng.gen_range(self.low..self.high)
        } else {
            self.low
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// First year any series may cover
    pub first_year: i32,

    /// Last year of every series (inclusive)
    pub last_year: i32,

    /// Start year for stations whose trend does not set one
    pub default_start_year: i32,

    pub min_value: f64,
    pub max_value: f64,

    /// Add Gaussian noise with the station's volatility
    pub noise: bool,

    /// Fixed-year shocks; empty disables them
    pub shocks: Vec<YearShock>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            first_year: DEFAULT_START_YEAR,
            last_year: 2025,
            default_start_year: DEFAULT_START_YEAR,
            min_value: 1.0,
            max_value: 35.0,
            noise: true,
            shocks: YearShock::defaults(),
        }
    }
}

impl GeneratorConfig {
    /// Builder pattern: disable the Gaussian noise
    pub fn without_noise(mut self) -> Self {
        self.noise = false;
        self
    }

    /// Builder pattern: disable every fixed-year shock
    pub fn without_shocks(mut self) -> Self {
        self.shocks.clear();
        self
    }

    fn shock_for(&self, year: i32) -> Option<&YearShock> {
        self.shocks.iter().find(|s| s.year == year)
    }
}

/// Clamp to the bounds, then round to one decimal place
pub fn round_share(value: f64, min_value: f64, max_value: f64) -> f64 {
    let clamped = value.clamp(min_value, max_value);
    (clamped * 10.0).round() / 10.0
}

// ============================================================================
// OUTPUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudiencePoint {
    pub station: String,
    pub year: i32,
    pub value: f64,
}

/// All generated points, grouped by station and ordered by year.
///
/// Points live in one flat list; `index` maps each station to its slice.
#[derive(Debug, Clone, Default)]
pub struct AudienceSeries {
    points: Vec<AudiencePoint>,
    index: Vec<(String, Range<usize>)>,
}

impl AudienceSeries {
    fn push_station(&mut self, station: &str, points: Vec<AudiencePoint>) {
        let start = self.points.len();
        self.points.extend(points);
        self.index.push((station.to_string(), start..self.points.len()));
    }

    pub fn points(&self) -> &[AudiencePoint] {
        &self.points
    }

    /// Station names in generation order
    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.index.iter().map(|(name, _)| name.as_str())
    }

    pub fn station_points(&self, station: &str) -> &[AudiencePoint] {
        self.index
            .iter()
            .find(|(name, _)| name == station)
            .map(|(_, range)| &self.points[range.clone()])
            .unwrap_or(&[])
    }

    /// Year (as string) → value for one station
    pub fn year_map(&self, station: &str) -> Option<BTreeMap<String, f64>> {
        let points = self.station_points(station);
        if points.is_empty() {
            return None;
        }
        Some(
            points
                .iter()
                .map(|p| (p.year.to_string(), p.value))
                .collect(),
        )
    }

    /// station → (year string → value)
    pub fn to_nested(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        self.index
            .iter()
            .map(|(name, range)| {
                let years = self.points[range.clone()]
                    .iter()
                    .map(|p| (p.year.to_string(), p.value))
                    .collect();
                (name.clone(), years)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

pub struct SeriesGenerator<'a> {
    stations: &'a StationRegistry,
    trends: &'a TrendRegistry,
    config: GeneratorConfig,
}

impl<'a> SeriesGenerator<'a> {
    /// Create a generator, validating the registries against the config.
    ///
    /// Every station needs trend parameters, every trend needs a station,
    /// and every start year must fall inside the configured range.
    pub fn new(
        stations: &'a StationRegistry,
        trends: &'a TrendRegistry,
        config: GeneratorConfig,
    ) -> Result<Self> {
        if config.last_year < config.first_year {
            bail!(
                "Invalid year range: {} is before {}",
                config.last_year,
                config.first_year
            );
        }
        if config.min_value.partial_cmp(&config.max_value) != Some(Ordering::Less) {
            bail!(
                "Invalid bounds: [{}, {}]",
                config.min_value,
                config.max_value
            );
        }
        for shock in &config.shocks {
            if !shock.low.is_finite() || !shock.high.is_finite() || shock.low > shock.high {
                bail!(
                    "Invalid shock range for {} ({}): [{}, {})",
                    shock.year,
                    shock.label,
                    shock.low,
                    shock.high
                );
            }
        }

        for station in stations.iter() {
            let params = match trends.get(&station.name) {
                Some(params) => params,
                None => bail!("Station '{}' has no trend parameters", station.name),
            };
            validate_params(&station.name, params, &config)?;
        }

        for (i, (name, _)) in trends.iter().enumerate() {
            if stations.get(name).is_none() {
                bail!("Trend parameters given for unknown station '{}'", name);
            }
            if trends.iter().take(i).any(|(other, _)| other == name) {
                bail!("Station '{}' has more than one set of trend parameters", name);
            }
        }

        Ok(SeriesGenerator {
            stations,
            trends,
            config,
        })
    }

    /// Generate the full series for every registered station
    pub fn generate(&self, rng: &mut impl Rng) -> AudienceSeries {
        let mut series = AudienceSeries::default();

        for station in self.stations.iter() {
            // Checked in new()
            let Some(params) = self.trends.get(&station.name) else {
                continue;
            };
            let points = self.generate_station(&station.name, params, rng);
            debug!(
                station = %station.name,
                start_year = params.start_year_or(self.config.default_start_year),
                points = points.len(),
                "generated series"
            );
            series.push_station(&station.name, points);
        }

        info!(
            stations = self.stations.len(),
            points = series.len(),
            "synthetic audience series ready"
        );
        series
    }

    fn generate_station(
        &self,
        station: &str,
        params: &TrendParameters,
        rng: &mut impl Rng,
    ) -> Vec<AudiencePoint> {
        let start_year = params.start_year_or(self.config.default_start_year);
        let noise = if self.config.noise && params.volatility > 0.0 {
            Normal::new(0.0, params.volatility).ok()
        } else {
            None
        };

        (start_year..=self.config.last_year)
            .map(|year| {
                let mut value = params.expected_value(start_year, year);

                if let Some(dist) = &noise {
                    value += dist.sample(rng);
                }

                if let Some(shock) = self.config.shock_for(year) {
                    value += shock.sample(rng);
                }

                AudiencePoint {
                    station: station.to_string(),
                    year,
                    value: round_share(value, self.config.min_value, self.config.max_value),
                }
            })
            .collect()
    }
}

fn validate_params(station: &str, params: &TrendParameters, config: &GeneratorConfig) -> Result<()> {
    let start_year = params.start_year_or(config.default_start_year);
    if start_year < config.first_year || start_year > config.last_year {
        bail!(
            "Station '{}' starts in {}, outside {}-{}",
            station,
            start_year,
            config.first_year,
            config.last_year
        );
    }
    if !params.baseline.is_finite() || !params.slope.is_finite() {
        bail!("Station '{}' has a non-finite baseline or slope", station);
    }
    if !params.volatility.is_finite() || params.volatility < 0.0 {
        bail!(
            "Station '{}' has invalid volatility {}",
            station,
            params.volatility
        );
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
