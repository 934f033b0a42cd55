#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub id: u64,
    /// ISO 3166-1 alpha-2.
    pub code: String,
    pub name: String,
}

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub id: u64,
    pub name: String,
    pub country: Country,
}

/// What the GeoIP service knows about an address.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoRecord {
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
}
