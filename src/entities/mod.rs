// Entity Models - the static lookup tables behind the generator
//
// - Station: identity (name) + category, launch year, display colour
// - TrendParameters: baseline, slope and volatility per station
// - RegistryFile: both tables loaded from JSON

pub mod loader;
pub mod station;
pub mod trend;

pub use loader::{RegistryFile, StationEntry};
pub use station::{parse_hex_color, Station, StationCategory, StationRegistry};
pub use trend::{TrendParameters, TrendRegistry, DEFAULT_START_YEAR};
