//! End-to-end pipeline tests: registry → generator → table → exports.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use reunion_radio::{
    export_csv, export_workbook, read_csv, station_trends, AudienceTable, GeneratorConfig,
    OutputPaths, RegistryFile, SeriesGenerator, StationRegistry, TrendRegistry,
};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("reunion-radio-e2e-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn seeded_table(seed: u64, config: GeneratorConfig) -> AudienceTable {
    let stations = StationRegistry::new();
    let trends = TrendRegistry::new();
    let generator = SeriesGenerator::new(&stations, &trends, config).unwrap();
    let series = generator.generate(&mut StdRng::seed_from_u64(seed));
    AudienceTable::flatten(&series, &stations).unwrap()
}

#[test]
fn test_full_run_writes_csv_and_workbook() {
    let table = seeded_table(2025, GeneratorConfig::default());
    let dir = scratch_dir("full");
    let paths = OutputPaths::in_dir(&dir);

    export_workbook(&table, &paths.workbook).unwrap();
    export_csv(&table, &paths.csv).unwrap();

    assert!(paths.workbook.exists());
    let records = read_csv(&paths.csv).unwrap();
    assert_eq!(records.len(), 189);

    let written: BTreeSet<(String, i32, i64)> = table
        .triples()
        .into_iter()
        .map(|(s, y, v)| (s, y, (v * 10.0).round() as i64))
        .collect();
    let read_back: BTreeSet<(String, i32, i64)> = records
        .into_iter()
        .map(|r| (r.station, r.year, (r.audience_share * 10.0).round() as i64))
        .collect();
    assert_eq!(written, read_back);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_every_station_covers_its_range() {
    let table = seeded_table(17, GeneratorConfig::default());

    let mut years_by_station: HashMap<&str, Vec<i32>> = HashMap::new();
    for record in table.records() {
        assert!((1.0..=35.0).contains(&record.audience_share));
        years_by_station
            .entry(record.station.as_str())
            .or_default()
            .push(record.year);
    }

    for (station, years) in years_by_station {
        let start = if station == "Hit West" { 2005 } else { 2002 };
        let expected: Vec<i32> = (start..=2025).collect();
        assert_eq!(years, expected, "{}", station);
    }
}

#[test]
fn test_noise_free_trends_follow_slopes() {
    let config = GeneratorConfig::default().without_noise().without_shocks();
    let table = seeded_table(0, config);

    let trends = station_trends(&table);
    let public = trends.iter().find(|t| t.station == "Réunion 1ère").unwrap();
    assert_eq!(public.first, 28.5);
    // 28.5 - 0.25 * 23 = 22.75, rounded half away from zero
    assert_eq!(public.last, 22.8);

    let hit_west = trends.iter().find(|t| t.station == "Hit West").unwrap();
    assert_eq!(hit_west.first_year, 2005);
    assert_eq!(hit_west.first, 4.5);
    // 4.5 + 0.35 * 20
    assert_eq!(hit_west.last, 11.5);
}

#[test]
fn test_registry_file_drives_generation() {
    let dir = scratch_dir("registry");
    let path = dir.join("stations.json");
    std::fs::write(
        &path,
        r##"{
            "stations": [
                {
                    "name": "Radio Festival",
                    "category": "Associative",
                    "launch_year": 1986,
                    "color": "#00AAFF",
                    "trend": { "start_year": 2010, "baseline": 3.0, "slope": 0.1, "volatility": 0.3 }
                }
            ]
        }"##,
    )
    .unwrap();

    let (stations, trends) = RegistryFile::from_file(&path).unwrap().into_registries();
    let generator = SeriesGenerator::new(&stations, &trends, GeneratorConfig::default()).unwrap();
    let series = generator.generate(&mut StdRng::seed_from_u64(4));
    let table = AudienceTable::flatten(&series, &stations).unwrap();

    assert_eq!(table.len(), 16);
    assert_eq!(table.first_year(), Some(2010));
    assert!(table.records().iter().all(|r| r.color == "#00AAFF"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_registry_file_reports_path() {
    let err = RegistryFile::from_file("/no/such/registry.json").unwrap_err();
    assert!(format!("{:#}", err).contains("registry.json"));
}
