//! Reference data refreshed wholesale from the server

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::de;

/// Which reference collection a refresh replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Areas,
    Assets,
    Units,
    Categories,
    Equipment,
}

impl ReferenceKind {
    pub const ALL: [Self; 5] = [
        Self::Areas,
        Self::Assets,
        Self::Units,
        Self::Categories,
        Self::Equipment,
    ];

    /// Taxonomy vocabulary backing term-based kinds.
    pub const fn vocabulary(self) -> Option<&'static str> {
        match self {
            Self::Units => Some("farm_quantity_units"),
            Self::Categories => Some("farm_log_categories"),
            Self::Areas | Self::Assets | Self::Equipment => None,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Areas => "areas",
            Self::Assets => "assets",
            Self::Units => "units",
            Self::Categories => "categories",
            Self::Equipment => "equipment",
        };
        f.write_str(label)
    }
}

/// A land area with its geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    #[serde(deserialize_with = "de::id_string")]
    pub tid: String,
    pub name: String,
    #[serde(default)]
    pub geofield: Value,
}

/// A farm asset (plantings, animals, equipment, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(deserialize_with = "de::id_string")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
}

impl Asset {
    pub fn is_equipment(&self) -> bool {
        self.asset_type == "equipment"
    }
}

/// A taxonomy term (unit, category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    #[serde(deserialize_with = "de::id_string")]
    pub tid: String,
    pub name: String,
}

/// One item of a replaced reference collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReferenceItem {
    Area(Area),
    Asset(Asset),
    Term(Term),
}
