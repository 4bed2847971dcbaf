// Réunion Radio Audience - Core Library
// Exposes all modules for use in the CLI, the dashboard and tests

pub mod analysis;
pub mod chart;
pub mod entities;
pub mod export;
pub mod generator;
pub mod report;
pub mod table;

// Re-export commonly used types
pub use entities::{
    parse_hex_color, RegistryFile, Station, StationCategory, StationEntry, StationRegistry,
    TrendParameters, TrendRegistry, DEFAULT_START_YEAR,
};
pub use generator::{
    round_share, AudiencePoint, AudienceSeries, GeneratorConfig, SeriesGenerator, YearShock,
};
pub use table::{AudienceTable, FlatRecord};
pub use analysis::{
    category_summary, category_year_pivot, ranking, station_trends, year_station_pivot,
    CategorySummary, Pivot, RankedStation, StationTrend,
};
pub use report::{write_report, RunInfo};
pub use chart::render_chart;
pub use export::{
    export_csv, export_workbook, read_csv, read_csv_from, write_csv, OutputPaths,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
