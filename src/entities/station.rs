// 📻 Station Entity - Static metadata for every broadcaster
//
// A station is identified by its name. Category, launch year and display
// colour never change once the registry is built.

use serde::{Deserialize, Serialize};

// ============================================================================
// STATION CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StationCategory {
    /// Public service broadcaster
    Public,

    /// Privately owned, advertising funded
    Commercial,

    /// Community / non-profit association
    Associative,

    /// Cultural and language programming
    Culturelle,
}

impl StationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StationCategory::Public => "Public",
            StationCategory::Commercial => "Commercial",
            StationCategory::Associative => "Associative",
            StationCategory::Culturelle => "Culturelle",
        }
    }

    /// Parse a category label (case-insensitive)
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "public" => Some(StationCategory::Public),
            "commercial" => Some(StationCategory::Commercial),
            "associative" => Some(StationCategory::Associative),
            "culturelle" => Some(StationCategory::Culturelle),
            _ => None,
        }
    }

    /// Slice colour used by the category share pie.
    ///
    /// Colours follow the alphabetical order of the labels.
    pub fn pie_color(&self) -> &'static str {
        match self {
            StationCategory::Associative => "#FF6B00",
            StationCategory::Commercial => "#FF0000",
            StationCategory::Culturelle => "#008000",
            StationCategory::Public => "#FFD700",
        }
    }

    pub fn all() -> [StationCategory; 4] {
        [
            StationCategory::Public,
            StationCategory::Commercial,
            StationCategory::Associative,
            StationCategory::Culturelle,
        ]
    }
}

impl std::fmt::Display for StationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// STATION ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Unique display name (identity)
    pub name: String,

    pub category: StationCategory,

    /// Year the station first went on air
    pub launch_year: i32,

    /// Display colour token, `#RRGGBB`
    pub color: String,
}

impl Station {
    pub fn new(name: &str, category: StationCategory, launch_year: i32, color: &str) -> Self {
        Station {
            name: name.to_string(),
            category,
            launch_year,
            color: color.to_string(),
        }
    }

    /// Parse the display colour into RGB components.
    ///
    /// Returns `None` for anything that is not a `#RRGGBB` token.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.color)
    }
}

/// Parse a `#RRGGBB` token
pub fn parse_hex_color(token: &str) -> Option<(u8, u8, u8)> {
    let hex = token.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

// ============================================================================
// STATION REGISTRY
// ============================================================================

/// Registry of all known stations, in display order.
///
/// Built once and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    stations: Vec<Station>,
}

impl StationRegistry {
    /// Create registry with the default Réunion stations
    pub fn new() -> Self {
        StationRegistry::from_stations(vec![
            Station::new("Réunion 1ère", StationCategory::Public, 1960, "#FF6B00"),
            Station::new("NRJ Réunion", StationCategory::Commercial, 1990, "#FF0000"),
            Station::new("Freedom", StationCategory::Commercial, 1982, "#0000FF"),
            Station::new("RCI", StationCategory::Commercial, 1981, "#800080"),
            Station::new("Radio Est", StationCategory::Associative, 1983, "#008000"),
            Station::new("Radio Kreol", StationCategory::Culturelle, 1995, "#FFD700"),
            Station::new("Hit West", StationCategory::Commercial, 2005, "#FF1493"),
            Station::new("Radio Sun", StationCategory::Commercial, 1987, "#FFA500"),
        ])
    }

    /// Build a registry from an explicit list.
    ///
    /// Later duplicates of a name are dropped so identity stays unique.
    pub fn from_stations(stations: Vec<Station>) -> Self {
        let mut unique: Vec<Station> = Vec::with_capacity(stations.len());
        for station in stations {
            if unique.iter().any(|s| s.name == station.name) {
                tracing::warn!(station = %station.name, "duplicate station ignored");
                continue;
            }
            unique.push(station);
        }
        StationRegistry { stations: unique }
    }

    pub fn get(&self, name: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.stations.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl Default for StationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
