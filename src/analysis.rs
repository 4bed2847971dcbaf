// 📊 Analysis - Read-only aggregations over the flat table
//
// Ranking, per-station trends, per-category summaries and the two pivots
// used by the workbook export.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::StationCategory;
use crate::table::{AudienceTable, FlatRecord};

// ============================================================================
// RANKING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStation {
    /// 1-based position
    pub rank: usize,
    pub station: String,
    pub category: StationCategory,
    pub value: f64,
    pub color: String,
}

/// The `n` largest shares for a year, descending.
///
/// Ties keep table order.
pub fn ranking(table: &AudienceTable, year: i32, n: usize) -> Vec<RankedStation> {
    let mut rows = table.for_year(year);
    rows.sort_by(|a, b| b.audience_share.total_cmp(&a.audience_share));

    rows.into_iter()
        .take(n)
        .enumerate()
        .map(|(i, r)| RankedStation {
            rank: i + 1,
            station: r.station.clone(),
            category: r.category,
            value: r.audience_share,
            color: r.color.clone(),
        })
        .collect()
}

// ============================================================================
// STATION TRENDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationTrend {
    pub station: String,
    pub category: StationCategory,
    pub color: String,
    pub first_year: i32,
    pub last_year: i32,
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// last - first
    pub delta: f64,
}

/// Start-to-end trend of every station with more than one data point
pub fn station_trends(table: &AudienceTable) -> Vec<StationTrend> {
    table
        .station_names()
        .into_iter()
        .filter_map(|name| {
            let rows = table.for_station(name);
            if rows.len() < 2 {
                return None;
            }

            let first = rows.first()?;
            let last = rows.last()?;
            let values: Vec<f64> = rows.iter().map(|r| r.audience_share).collect();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = values.iter().sum::<f64>() / values.len() as f64;

            Some(StationTrend {
                station: name.to_string(),
                category: first.category,
                color: first.color.clone(),
                first_year: first.year,
                last_year: last.year,
                first: first.audience_share,
                last: last.audience_share,
                min,
                max,
                mean,
                delta: last.audience_share - first.audience_share,
            })
        })
        .collect()
}

// ============================================================================
// CATEGORY SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: StationCategory,
    pub sum: f64,
    pub mean: f64,
    pub count: usize,
}

/// Sum / mean / count of shares per category for one year, sorted by label
pub fn category_summary(table: &AudienceTable, year: i32) -> Vec<CategorySummary> {
    let mut groups: BTreeMap<&'static str, (StationCategory, f64, usize)> = BTreeMap::new();

    for record in table.for_year(year) {
        let entry = groups
            .entry(record.category.as_str())
            .or_insert((record.category, 0.0, 0));
        entry.1 += record.audience_share;
        entry.2 += 1;
    }

    groups
        .into_values()
        .map(|(category, sum, count)| CategorySummary {
            category,
            sum,
            mean: sum / count as f64,
            count,
        })
        .collect()
}

// ============================================================================
// PIVOTS
// ============================================================================

/// Rectangular table of optional means, row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub row_header: String,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Pivot {
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.columns.iter().position(|x| x == column)?;
        self.cells[r][c]
    }
}

fn pivot_mean<R, C>(
    table: &AudienceTable,
    row_header: &str,
    rows: Vec<String>,
    columns: Vec<String>,
    row_key: R,
    column_key: C,
) -> Pivot
where
    R: Fn(&FlatRecord) -> String,
    C: Fn(&FlatRecord) -> String,
{
    let mut sums = vec![vec![(0.0_f64, 0_usize); columns.len()]; rows.len()];

    for record in table.records() {
        let r = rows.iter().position(|x| *x == row_key(record));
        let c = columns.iter().position(|x| *x == column_key(record));
        if let (Some(r), Some(c)) = (r, c) {
            sums[r][c].0 += record.audience_share;
            sums[r][c].1 += 1;
        }
    }

    let cells = sums
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
                .collect()
        })
        .collect();

    Pivot {
        row_header: row_header.to_string(),
        rows,
        columns,
        cells,
    }
}

/// Years (rows) × stations (columns, by name), mean share
pub fn year_station_pivot(table: &AudienceTable) -> Pivot {
    let rows = table.years().iter().map(|y| y.to_string()).collect();
    let mut columns: Vec<String> = table.station_names().iter().map(|s| s.to_string()).collect();
    columns.sort();

    pivot_mean(
        table,
        "Year",
        rows,
        columns,
        |r| r.year.to_string(),
        |r| r.station.clone(),
    )
}

/// Categories (rows, by label) × years (columns), mean share
pub fn category_year_pivot(table: &AudienceTable) -> Pivot {
    let mut labels: Vec<&'static str> = table.records().iter().map(|r| r.category.as_str()).collect();
    labels.sort_unstable();
    labels.dedup();

    let rows = labels.into_iter().map(str::to_string).collect();
    let columns = table.years().iter().map(|y| y.to_string()).collect();

    pivot_mean(
        table,
        "Type",
        rows,
        columns,
        |r| r.category.as_str().to_string(),
        |r| r.year.to_string(),
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(station: &str, category: StationCategory, year: i32, value: f64) -> FlatRecord {
        FlatRecord {
            station: station.to_string(),
            category,
            year,
            audience_share: value,
            launch_year: 1990,
            color: "#000000".to_string(),
        }
    }

    fn sample_table() -> AudienceTable {
        AudienceTable::from_records(vec![
            record("Alpha", StationCategory::Public, 2024, 20.0),
            record("Alpha", StationCategory::Public, 2025, 18.5),
            record("Beta", StationCategory::Commercial, 2024, 10.0),
            record("Beta", StationCategory::Commercial, 2025, 12.0),
            record("Gamma", StationCategory::Commercial, 2025, 12.0),
            record("Delta", StationCategory::Associative, 2024, 5.0),
            record("Delta", StationCategory::Associative, 2025, 4.0),
        ])
    }

    #[test]
    fn test_ranking_descending_with_stable_ties() {
        let table = sample_table();
        let ranked = ranking(&table, 2025, 3);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].station, "Alpha");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].station, "Beta");
        assert_eq!(ranked[2].station, "Gamma");
        assert_eq!(ranked[2].rank, 3);

        assert_eq!(ranking(&table, 2025, 10).len(), 4);
        assert!(ranking(&table, 1999, 5).is_empty());
    }

    #[test]
    fn test_station_trends() {
        let trends = station_trends(&sample_table());

        // Gamma has a single point
        assert_eq!(trends.len(), 3);
        assert!(trends.iter().all(|t| t.station != "Gamma"));

        let alpha = &trends[0];
        assert_eq!(alpha.station, "Alpha");
        assert!((alpha.delta - -1.5).abs() < 1e-9);
        assert_eq!(alpha.min, 18.5);
        assert_eq!(alpha.max, 20.0);
        assert!((alpha.mean - 19.25).abs() < 1e-9);
        assert_eq!(alpha.first_year, 2024);
        assert_eq!(alpha.last_year, 2025);

        let beta = trends.iter().find(|t| t.station == "Beta").unwrap();
        assert!((beta.delta - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_summary_sorted_by_label() {
        let summary = category_summary(&sample_table(), 2025);
        let labels: Vec<&str> = summary.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(labels, vec!["Associative", "Commercial", "Public"]);

        let commercial = &summary[1];
        assert_eq!(commercial.count, 2);
        assert!((commercial.sum - 24.0).abs() < 1e-9);
        assert!((commercial.mean - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_year_station_pivot_has_gaps() {
        let pivot = year_station_pivot(&sample_table());

        assert_eq!(pivot.rows, vec!["2024", "2025"]);
        assert_eq!(pivot.columns, vec!["Alpha", "Beta", "Delta", "Gamma"]);
        assert_eq!(pivot.get("2024", "Gamma"), None);
        assert_eq!(pivot.get("2025", "Gamma"), Some(12.0));
        assert_eq!(pivot.get("2024", "Alpha"), Some(20.0));
    }

    #[test]
    fn test_category_year_pivot_means() {
        let pivot = category_year_pivot(&sample_table());

        assert_eq!(pivot.rows, vec!["Associative", "Commercial", "Public"]);
        assert_eq!(pivot.columns, vec!["2024", "2025"]);
        assert_eq!(pivot.get("Commercial", "2025"), Some(12.0));
        assert_eq!(pivot.get("Commercial", "2024"), Some(10.0));
        assert_eq!(pivot.row_header, "Type");
    }
}
