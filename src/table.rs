// 📋 Tabulizer - Flat Station × Year table
//
// Joins every generated point with its station metadata. Everything
// downstream (report, chart, exports, dashboard) reads this table only.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::entities::{StationCategory, StationRegistry};
use crate::generator::AudienceSeries;

/// One row of the flat table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    #[serde(rename = "Station")]
    pub station: String,

    #[serde(rename = "Type")]
    pub category: StationCategory,

    #[serde(rename = "Year")]
    pub year: i32,

    #[serde(rename = "AudienceShare")]
    pub audience_share: f64,

    #[serde(rename = "LaunchYear")]
    pub launch_year: i32,

    #[serde(rename = "Color")]
    pub color: String,
}

#[derive(Debug, Clone, Default)]
pub struct AudienceTable {
    records: Vec<FlatRecord>,
}

impl AudienceTable {
    /// Flatten a generated series against the station registry.
    ///
    /// Order: station generation order, then year ascending.
    pub fn flatten(series: &AudienceSeries, stations: &StationRegistry) -> Result<Self> {
        let mut records = Vec::with_capacity(series.len());

        for point in series.points() {
            let station = stations
                .get(&point.station)
                .with_context(|| format!("Unknown station in series: '{}'", point.station))?;

            records.push(FlatRecord {
                station: station.name.clone(),
                category: station.category,
                year: point.year,
                audience_share: point.value,
                launch_year: station.launch_year,
                color: station.color.clone(),
            });
        }

        Ok(AudienceTable { records })
    }

    pub fn from_records(records: Vec<FlatRecord>) -> Self {
        AudienceTable { records }
    }

    pub fn records(&self) -> &[FlatRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> &[FlatRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.records.iter().map(|r| r.year).max()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.records.iter().map(|r| r.year).min()
    }

    /// Distinct years, ascending
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn for_year(&self, year: i32) -> Vec<&FlatRecord> {
        self.records.iter().filter(|r| r.year == year).collect()
    }

    /// Rows of one station, sorted by year
    pub fn for_station(&self, station: &str) -> Vec<&FlatRecord> {
        let mut rows: Vec<&FlatRecord> =
            self.records.iter().filter(|r| r.station == station).collect();
        rows.sort_by_key(|r| r.year);
        rows
    }

    /// Station names in first-seen order
    pub fn station_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for record in &self.records {
            if !names.contains(&record.station.as_str()) {
                names.push(&record.station);
            }
        }
        names
    }

    /// (station, year, value) triples in table order
    pub fn triples(&self) -> Vec<(String, i32, f64)> {
        self.records
            .iter()
            .map(|r| (r.station.clone(), r.year, r.audience_share))
            .collect()
    }

    /// SHA-256 over every (station, year, value) line.
    ///
    /// Two seeded runs with the same registry give the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for record in &self.records {
            hasher.update(format!(
                "{}|{}|{:.1}\n",
                record.station, record.year, record.audience_share
            ));
        }
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TrendRegistry;
    use crate::generator::{GeneratorConfig, SeriesGenerator};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn default_table(seed: u64) -> AudienceTable {
        let stations = StationRegistry::new();
        let trends = TrendRegistry::new();
        let generator =
            SeriesGenerator::new(&stations, &trends, GeneratorConfig::default()).unwrap();
        let series = generator.generate(&mut StdRng::seed_from_u64(seed));
        AudienceTable::flatten(&series, &stations).unwrap()
    }

    #[test]
    fn test_flatten_preserves_record_count() {
        let table = default_table(11);
        let trends = TrendRegistry::new();

        let expected: usize = trends
            .iter()
            .map(|(_, p)| (2025 - p.start_year_or(2002) + 1) as usize)
            .sum();
        assert_eq!(table.len(), expected);
        assert_eq!(table.len(), 189);
    }

    #[test]
    fn test_records_match_registry() {
        let table = default_table(12);
        let stations = StationRegistry::new();

        for record in table.records() {
            let station = stations.get(&record.station).unwrap();
            assert_eq!(record.category, station.category);
            assert_eq!(record.color, station.color);
            assert_eq!(record.launch_year, station.launch_year);
        }
    }

    #[test]
    fn test_flatten_unknown_station_fails() {
        let stations = StationRegistry::new();
        let trends = TrendRegistry::new();
        let generator =
            SeriesGenerator::new(&stations, &trends, GeneratorConfig::default()).unwrap();
        let series = generator.generate(&mut StdRng::seed_from_u64(1));

        let partial = StationRegistry::from_stations(
            stations.iter().filter(|s| s.name != "RCI").cloned().collect(),
        );
        let err = AudienceTable::flatten(&series, &partial).unwrap_err();
        assert!(err.to_string().contains("RCI"));
    }

    #[test]
    fn test_queries() {
        let table = default_table(13);

        assert_eq!(table.latest_year(), Some(2025));
        assert_eq!(table.first_year(), Some(2002));
        assert_eq!(table.years().len(), 24);
        assert_eq!(table.for_year(2025).len(), 8);
        assert_eq!(table.for_year(2003).len(), 7);
        assert_eq!(table.for_station("Hit West").len(), 21);
        assert_eq!(table.station_names().len(), 8);
        assert_eq!(table.head(5).len(), 5);
        assert_eq!(table.head(500).len(), 189);
    }

    #[test]
    fn test_fingerprint_follows_seed() {
        assert_eq!(default_table(99).fingerprint(), default_table(99).fingerprint());
        assert_ne!(default_table(99).fingerprint(), default_table(100).fingerprint());
        assert_eq!(default_table(99).fingerprint().len(), 64);
    }

    #[test]
    fn test_empty_table() {
        let table = AudienceTable::default();
        assert!(table.is_empty());
        assert_eq!(table.latest_year(), None);
        assert!(table.station_names().is_empty());
    }
}
