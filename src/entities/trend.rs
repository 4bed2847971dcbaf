// 📈 Trend Parameters - Per-station shape of the synthetic series
//
// baseline + slope * (year - start_year), perturbed by N(0, volatility)

use serde::{Deserialize, Serialize};

/// Default first year of every series unless a station overrides it
pub const DEFAULT_START_YEAR: i32 = 2002;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendParameters {
    /// First year of the series (None = registry default)
    #[serde(default)]
    pub start_year: Option<i32>,

    /// Audience share at the start year (%)
    pub baseline: f64,

    /// Linear change per year (points)
    pub slope: f64,

    /// Standard deviation of the yearly noise
    pub volatility: f64,
}

impl TrendParameters {
    pub fn new(baseline: f64, slope: f64, volatility: f64) -> Self {
        TrendParameters {
            start_year: None,
            baseline,
            slope,
            volatility,
        }
    }

    /// Builder pattern: override the start year
    pub fn starting_in(mut self, year: i32) -> Self {
        self.start_year = Some(year);
        self
    }

    /// Start year, falling back to the given default
    pub fn start_year_or(&self, default: i32) -> i32 {
        self.start_year.unwrap_or(default)
    }

    /// Noise-free value for a given year
    pub fn expected_value(&self, start_year: i32, year: i32) -> f64 {
        self.baseline + self.slope * f64::from(year - start_year)
    }
}

// ============================================================================
// TREND REGISTRY
// ============================================================================

/// Station name → trend parameters, in insertion order.
#[derive(Debug, Clone)]
pub struct TrendRegistry {
    entries: Vec<(String, TrendParameters)>,
}

impl TrendRegistry {
    /// Create registry with the default trends
    pub fn new() -> Self {
        TrendRegistry::from_params(vec![
            ("Réunion 1ère".to_string(), TrendParameters::new(28.5, -0.25, 0.8)),
            ("NRJ Réunion".to_string(), TrendParameters::new(16.8, 0.15, 1.0)),
            ("Freedom".to_string(), TrendParameters::new(14.2, 0.10, 0.9)),
            ("RCI".to_string(), TrendParameters::new(12.5, -0.08, 0.7)),
            ("Radio Est".to_string(), TrendParameters::new(8.3, 0.05, 0.6)),
            ("Radio Kreol".to_string(), TrendParameters::new(6.7, 0.20, 0.8)),
            // Hit West only went on air in 2005
            ("Hit West".to_string(), TrendParameters::new(4.5, 0.35, 1.2).starting_in(2005)),
            ("Radio Sun".to_string(), TrendParameters::new(5.2, 0.12, 0.7)),
        ])
    }

    pub fn from_params(entries: Vec<(String, TrendParameters)>) -> Self {
        TrendRegistry { entries }
    }

    pub fn get(&self, station: &str) -> Option<&TrendParameters> {
        self.entries
            .iter()
            .find(|(name, _)| name == station)
            .map(|(_, params)| params)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrendParameters)> {
        self.entries.iter().map(|(name, params)| (name.as_str(), params))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TrendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_trends() {
        let trends = TrendRegistry::new();
        assert_eq!(trends.len(), 8);

        let public = trends.get("Réunion 1ère").unwrap();
        assert_eq!(public.baseline, 28.5);
        assert_eq!(public.slope, -0.25);
        assert_eq!(public.start_year_or(DEFAULT_START_YEAR), 2002);

        let hit_west = trends.get("Hit West").unwrap();
        assert_eq!(hit_west.start_year_or(DEFAULT_START_YEAR), 2005);
    }

    #[test]
    fn test_expected_value() {
        let params = TrendParameters::new(28.5, -0.25, 0.0);
        assert_eq!(params.expected_value(2002, 2002), 28.5);
        assert_eq!(params.expected_value(2002, 2010), 26.5);
    }
}
