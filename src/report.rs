// 🖨️ Console Reporter - Preview, ranking, trends and category summary
//
// Writes to any io::Write so the same text goes to stdout or to a buffer.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::io::Write;

use crate::analysis::{category_summary, ranking, station_trends};
use crate::table::AudienceTable;

const RULE_WIDE: usize = 60;
const RULE_NARROW: usize = 40;

/// Context printed in the report header
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub generated_at: DateTime<Utc>,
    pub seed: Option<u64>,
}

impl RunInfo {
    pub fn now(seed: Option<u64>) -> Self {
        RunInfo {
            generated_at: Utc::now(),
            seed,
        }
    }
}

pub fn write_header<W: Write>(out: &mut W, table: &AudienceTable, info: &RunInfo) -> Result<()> {
    let span = match (table.first_year(), table.latest_year()) {
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => "no data".to_string(),
    };

    writeln!(out, "🎯 Réunion radio audience analysis ({})", span)?;
    writeln!(
        out,
        "   Generated at {}",
        info.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    match info.seed {
        Some(seed) => writeln!(out, "   Seed: {}", seed)?,
        None => writeln!(out, "   Seed: none (non-reproducible run)")?,
    }
    writeln!(out, "   Fingerprint: {}", table.fingerprint())?;
    Ok(())
}

/// First `n` rows of the flat table
pub fn write_preview<W: Write>(out: &mut W, table: &AudienceTable, n: usize) -> Result<()> {
    writeln!(out, "\n📋 Data preview ({} rows):", table.len())?;
    writeln!(
        out,
        "{:<4}{:<16}{:<13}{:>6}{:>15}{:>12}  {}",
        "", "Station", "Type", "Year", "AudienceShare", "LaunchYear", "Color"
    )?;

    for (i, r) in table.head(n).iter().enumerate() {
        writeln!(
            out,
            "{:<4}{:<16}{:<13}{:>6}{:>15.1}{:>12}  {}",
            i, r.station, r.category, r.year, r.audience_share, r.launch_year, r.color
        )?;
    }
    Ok(())
}

/// Ranking, trends and per-category summary for the latest year
pub fn write_statistics<W: Write>(out: &mut W, table: &AudienceTable) -> Result<()> {
    writeln!(out, "\n{}", "=".repeat(RULE_WIDE))?;
    writeln!(out, "📊 DETAILED STATISTICS - RÉUNION RADIO AUDIENCE")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDE))?;

    let Some(latest_year) = table.latest_year() else {
        writeln!(out, "\n(no data)")?;
        return Ok(());
    };

    writeln!(out, "\n🏆 RANKING {}:", latest_year)?;
    writeln!(out, "{}", "-".repeat(RULE_NARROW))?;
    for entry in ranking(table, latest_year, 5) {
        writeln!(out, "{}. {}: {:.1}%", entry.rank, entry.station, entry.value)?;
    }

    let first_year = table.first_year().unwrap_or(latest_year);
    writeln!(out, "\n📈 TRENDS {}-{}:", first_year, latest_year)?;
    writeln!(out, "{}", "-".repeat(RULE_NARROW))?;
    for trend in station_trends(table) {
        writeln!(
            out,
            "• {}: {:+.1} pts (Mean: {:.1}%)",
            trend.station, trend.delta, trend.mean
        )?;
    }

    writeln!(out, "\n📋 BREAKDOWN BY TYPE ({}):", latest_year)?;
    writeln!(out, "{}", "-".repeat(RULE_NARROW))?;
    writeln!(out, "{:<13}{:>8}{:>8}{:>7}", "Type", "sum", "mean", "count")?;
    for group in category_summary(table, latest_year) {
        writeln!(
            out,
            "{:<13}{:>8.1}{:>8.1}{:>7}",
            group.category.as_str(),
            group.sum,
            group.mean,
            group.count
        )?;
    }
    Ok(())
}

/// Full console report
pub fn write_report<W: Write>(out: &mut W, table: &AudienceTable, info: &RunInfo) -> Result<()> {
    write_header(out, table, info)?;
    write_preview(out, table, 5)?;
    write_statistics(out, table)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StationCategory;
    use crate::table::FlatRecord;

    fn record(station: &str, category: StationCategory, year: i32, value: f64) -> FlatRecord {
        FlatRecord {
            station: station.to_string(),
            category,
            year,
            audience_share: value,
            launch_year: 1990,
            color: "#FF0000".to_string(),
        }
    }

    fn sample_table() -> AudienceTable {
        AudienceTable::from_records(vec![
            record("RCI", StationCategory::Commercial, 2024, 12.5),
            record("RCI", StationCategory::Commercial, 2025, 10.7),
            record("Réunion 1ère", StationCategory::Public, 2024, 23.0),
            record("Réunion 1ère", StationCategory::Public, 2025, 22.1),
            record("Radio Est", StationCategory::Associative, 2025, 9.0),
        ])
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_statistics_output() {
        let table = sample_table();
        let text = render(|out| write_statistics(out, &table));

        assert!(text.contains("🏆 RANKING 2025:"));
        assert!(text.contains("1. Réunion 1ère: 22.1%"));
        assert!(text.contains("2. RCI: 10.7%"));
        assert!(text.contains("3. Radio Est: 9.0%"));
        assert!(text.contains("• RCI: -1.8 pts (Mean: 11.6%)"));
        assert!(text.contains("• Réunion 1ère: -0.9 pts"));
        // Radio Est has a single point, no trend line
        assert!(!text.contains("• Radio Est"));
        assert!(text.contains("Commercial       10.7    10.7      1"));
    }

    #[test]
    fn test_preview_and_header() {
        let table = sample_table();
        let info = RunInfo {
            generated_at: Utc::now(),
            seed: Some(42),
        };
        let text = render(|out| write_report(out, &table, &info));

        assert!(text.contains("(2024-2025)"));
        assert!(text.contains("Seed: 42"));
        assert!(text.contains(&table.fingerprint()));
        assert!(text.contains("📋 Data preview (5 rows):"));
        assert!(text.contains("AudienceShare"));
    }

    #[test]
    fn test_empty_table_statistics() {
        let text = render(|out| write_statistics(out, &AudienceTable::default()));
        assert!(text.contains("(no data)"));
    }
}
