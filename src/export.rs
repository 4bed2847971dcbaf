// 💾 Exporter - Flat CSV + three-sheet workbook
//
// CSV columns: Station, Type, Year, AudienceShare, LaunchYear, Color
// Workbook sheets: Raw Data, Summary (year × station), By Type (type × year)

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analysis::{category_year_pivot, year_station_pivot, Pivot};
use crate::table::{AudienceTable, FlatRecord};

pub const CHART_FILE: &str = "analyse_complete_radios_reunion.png";
pub const WORKBOOK_FILE: &str = "audience_radios_reunion.xlsx";
pub const CSV_FILE: &str = "audience_radios_reunion.csv";

/// Where the three artefacts of a run are written
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub chart: PathBuf,
    pub workbook: PathBuf,
    pub csv: PathBuf,
}

impl OutputPaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        OutputPaths {
            chart: dir.join(CHART_FILE),
            workbook: dir.join(WORKBOOK_FILE),
            csv: dir.join(CSV_FILE),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

// ============================================================================
// CSV
// ============================================================================

pub fn write_csv<W: Write>(table: &AudienceTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in table.records() {
        wtr.serialize(record)
            .with_context(|| format!("Failed to write row {} {}", record.station, record.year))?;
    }
    wtr.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

pub fn export_csv<P: AsRef<Path>>(table: &AudienceTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create CSV file: {:?}", path))?;
    write_csv(table, file)?;

    info!(path = %path.display(), rows = table.len(), "CSV exported");
    Ok(())
}

pub fn read_csv_from<R: Read>(reader: R) -> Result<Vec<FlatRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in rdr.deserialize() {
        let record: FlatRecord = result.context("Failed to deserialize audience record")?;
        records.push(record);
    }

    Ok(records)
}

pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<FlatRecord>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    read_csv_from(file)
}

// ============================================================================
// WORKBOOK
// ============================================================================

fn write_raw_sheet(sheet: &mut Worksheet, table: &AudienceTable, header: &Format, share: &Format) -> Result<()> {
    sheet.set_name("Raw Data")?;

    let columns = ["Station", "Type", "Year", "AudienceShare", "LaunchYear", "Color"];
    for (col, title) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, header)?;
    }
    sheet.set_column_width(0, 16)?;

    for (i, r) in table.records().iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &r.station)?;
        sheet.write_string(row, 1, r.category.as_str())?;
        sheet.write_number(row, 2, r.year)?;
        sheet.write_number_with_format(row, 3, r.audience_share, share)?;
        sheet.write_number(row, 4, r.launch_year)?;
        sheet.write_string(row, 5, &r.color)?;
    }
    Ok(())
}

fn write_pivot_sheet(
    sheet: &mut Worksheet,
    name: &str,
    pivot: &Pivot,
    header: &Format,
    share: &Format,
) -> Result<()> {
    sheet.set_name(name)?;

    sheet.write_string_with_format(0, 0, &pivot.row_header, header)?;
    for (c, column) in pivot.columns.iter().enumerate() {
        sheet.write_string_with_format(0, c as u16 + 1, column, header)?;
    }
    sheet.set_column_width(0, 14)?;

    for (r, label) in pivot.rows.iter().enumerate() {
        let row = r as u32 + 1;
        sheet.write_string_with_format(row, 0, label, header)?;
        for (c, cell) in pivot.cells[r].iter().enumerate() {
            // Empty cell for years before a station started
            if let Some(value) = cell {
                sheet.write_number_with_format(row, c as u16 + 1, *value, share)?;
            }
        }
    }
    Ok(())
}

/// Write the three-sheet workbook
pub fn export_workbook<P: AsRef<Path>>(table: &AudienceTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let header = Format::new().set_bold();
    let share = Format::new().set_num_format("0.0");

    let mut workbook = Workbook::new();

    write_raw_sheet(workbook.add_worksheet(), table, &header, &share)
        .context("Failed to write raw data sheet")?;
    write_pivot_sheet(
        workbook.add_worksheet(),
        "Summary",
        &year_station_pivot(table),
        &header,
        &share,
    )
    .context("Failed to write summary sheet")?;
    write_pivot_sheet(
        workbook.add_worksheet(),
        "By Type",
        &category_year_pivot(table),
        &header,
        &share,
    )
    .context("Failed to write by-type sheet")?;

    workbook
        .save(path)
        .with_context(|| format!("Failed to save workbook: {:?}", path))?;

    info!(path = %path.display(), "workbook exported");
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
