//! Coordinate Reference System identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An EPSG coordinate reference system code.
///
/// The code is opaque to this crate; the projection crate resolves it to a
/// PROJ.4 definition. All rasters in a series are expected to share one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CrsCode(u16);

impl CrsCode {
    /// WGS84 geographic coordinates (lon/lat in degrees).
    pub const WGS84: CrsCode = CrsCode(4326);

    pub const fn new(epsg: u16) -> Self {
        Self(epsg)
    }

    /// The numeric EPSG code.
    pub fn epsg(&self) -> u16 {
        self.0
    }

    /// Parse a CRS string.
    ///
    /// Accepts formats like:
    /// - "EPSG:32633"
    /// - "epsg:32633"
    /// - "32633"
    /// - "CRS:84" (WGS84 with lon/lat axis order)
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        if normalized == "CRS:84" {
            return Ok(Self::WGS84);
        }

        let digits = normalized.strip_prefix("EPSG:").unwrap_or(&normalized);
        digits
            .parse::<u16>()
            .ok()
            .filter(|code| *code > 0)
            .map(CrsCode)
            .ok_or_else(|| CrsParseError::UnsupportedCrs(s.to_string()))
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl FromStr for CrsCode {
    type Err = CrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CrsCode {
    type Error = CrsParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CrsCode> for String {
    fn from(code: CrsCode) -> Self {
        code.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}

impl From<CrsParseError> for crate::GeoError {
    fn from(err: CrsParseError) -> Self {
        match err {
            CrsParseError::UnsupportedCrs(s) => crate::GeoError::UnsupportedCrs(s),
        }
    }
}
