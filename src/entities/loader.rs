// 🗂️ Registry File - Stations + trends as data
//
// Lets a run swap the built-in registry for a JSON file without touching
// the generator.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::station::{Station, StationCategory, StationRegistry};
use super::trend::{TrendParameters, TrendRegistry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationEntry {
    pub name: String,
    pub category: StationCategory,
    pub launch_year: i32,
    pub color: String,
    pub trend: TrendParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryFile {
    pub stations: Vec<StationEntry>,
}

impl RegistryFile {
    /// Load a registry from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read registry file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: RegistryFile =
            serde_json::from_str(content).context("Failed to parse registry JSON")?;

        if file.stations.is_empty() {
            bail!("Registry file lists no stations");
        }
        for (i, entry) in file.stations.iter().enumerate() {
            if file.stations[..i].iter().any(|e| e.name == entry.name) {
                bail!("Duplicate station '{}' in registry file", entry.name);
            }
        }

        Ok(file)
    }

    /// Snapshot of the built-in registries, in file form
    pub fn from_registries(stations: &StationRegistry, trends: &TrendRegistry) -> Result<Self> {
        let mut entries = Vec::with_capacity(stations.len());
        for station in stations.iter() {
            let trend = trends
                .get(&station.name)
                .with_context(|| format!("Station '{}' has no trend parameters", station.name))?;
            entries.push(StationEntry {
                name: station.name.clone(),
                category: station.category,
                launch_year: station.launch_year,
                color: station.color.clone(),
                trend: trend.clone(),
            });
        }
        Ok(RegistryFile { stations: entries })
    }

    /// Split into the two lookup tables used by the generator
    pub fn into_registries(self) -> (StationRegistry, TrendRegistry) {
        let mut stations = Vec::with_capacity(self.stations.len());
        let mut trends = Vec::with_capacity(self.stations.len());

        for entry in self.stations {
            trends.push((entry.name.clone(), entry.trend));
            stations.push(Station {
                name: entry.name,
                category: entry.category,
                launch_year: entry.launch_year,
                color: entry.color,
            });
        }

        (
            StationRegistry::from_stations(stations),
            TrendRegistry::from_params(trends),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "stations": [
            {
                "name": "Radio Pikan",
                "category": "Associative",
                "launch_year": 1998,
                "color": "#123456",
                "trend": { "baseline": 3.2, "slope": 0.1, "volatility": 0.4 }
            },
            {
                "name": "Kanal Austral",
                "category": "Culturelle",
                "launch_year": 2010,
                "color": "#654321",
                "trend": { "start_year": 2010, "baseline": 2.0, "slope": 0.05, "volatility": 0.2 }
            }
        ]
    }"##;

    #[test]
    fn test_parse_registry_json() {
        let file = RegistryFile::from_json(SAMPLE).unwrap();
        let (stations, trends) = file.into_registries();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations.get("Radio Pikan").unwrap().category, StationCategory::Associative);
        assert_eq!(trends.get("Radio Pikan").unwrap().start_year, None);
        assert_eq!(trends.get("Kanal Austral").unwrap().start_year, Some(2010));
    }

    #[test]
    fn test_empty_registry_rejected() {
        let err = RegistryFile::from_json(r#"{ "stations": [] }"#).unwrap_err();
        assert!(err.to_string().contains("no stations"));
    }

    #[test]
    fn test_duplicate_station_rejected() {
        let json = r##"{ "stations": [
            { "name": "RCI", "category": "Commercial", "launch_year": 1982, "color": "#00FF00",
              "trend": { "baseline": 12.5, "slope": -0.08, "volatility": 0.7 } },
            { "name": "RCI", "category": "Public", "launch_year": 1990, "color": "#0000FF",
              "trend": { "baseline": 30.0, "slope": 0.0, "volatility": 0.1 } }
        ] }"##;

        let err = RegistryFile::from_json(json).unwrap_err();
        assert!(err.to_string().contains("Duplicate station 'RCI'"));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let json = r##"{ "stations": [ { "name": "X", "category": "Pirate", "launch_year": 1, "color": "#000000",
            "trend": { "baseline": 1.0, "slope": 0.0, "volatility": 0.0 } } ] }"##;
        assert!(RegistryFile::from_json(json).is_err());
    }

    #[test]
    fn test_defaults_round_trip_through_json() {
        let file =
            RegistryFile::from_registries(&StationRegistry::new(), &TrendRegistry::new()).unwrap();
        let json = serde_json::to_string_pretty(&file).unwrap();

        let (stations, trends) = RegistryFile::from_json(&json).unwrap().into_registries();
        assert_eq!(stations.names(), StationRegistry::new().names());
        assert_eq!(trends.get("Hit West").unwrap().start_year, Some(2005));
    }
}
