use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

use crate::error::UnknownUnit;

/// Measurement unit for an ingredient quantity.
///
/// `Other` is a sentinel: an ingredient using it must carry a free-text
/// description of the actual unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
pub enum Unit {
    Teaspoon,
    Tablespoon,
    Cup,
    Pint,
    Quart,
    Gallon,
    FluidOunce,
    Ounce,
    Pound,
    Other,
}

/// Variant <-> wire name. Both directions go through this table.
const NAMES: [(Unit, &str); 10] = [
    (Unit::Teaspoon, "Teaspoon"),
    (Unit::Tablespoon, "Tablespoon"),
    (Unit::Cup, "Cup"),
    (Unit::Pint, "Pint"),
    (Unit::Quart, "Quart"),
    (Unit::Gallon, "Gallon"),
    (Unit::FluidOunce, "FluidOunce"),
    (Unit::Ounce, "Ounce"),
    (Unit::Pound, "Pound"),
    (Unit::Other, "Other"),
];

impl Unit {
    pub const ALL: [Unit; 10] = [
        Unit::Teaspoon,
        Unit::Tablespoon,
        Unit::Cup,
        Unit::Pint,
        Unit::Quart,
        Unit::Gallon,
        Unit::FluidOunce,
        Unit::Ounce,
        Unit::Pound,
        Unit::Other,
    ];

    pub fn as_str(self) -> &'static str {
        // NAMES is laid out in declaration order, so the discriminant indexes it.
        NAMES[self as usize].1
    }

    /// All wire names in alphabetical order.
    pub fn sorted_names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = NAMES.iter().map(|(_, name)| *name).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl FromStr for Unit {
    type Err = UnknownUnit;

    /// Exact, case-sensitive match against the wire names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(unit, _)| *unit)
            .ok_or_else(|| UnknownUnit(s.to_string()))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
