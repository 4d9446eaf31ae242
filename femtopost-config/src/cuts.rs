//! Cut configuration: inclusive ranges per species.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Selection a cut table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Species {
    Event,
    Proton,
    Deuteron,
    Lambda,
    PosDaughter,
    NegDaughter,
}

impl Species {
    pub const ALL: [Self; 6] = [
        Self::Event,
        Self::Proton,
        Self::Deuteron,
        Self::Lambda,
        Self::PosDaughter,
        Self::NegDaughter,
    ];

    /// Name of the species table in the cut document.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Event => "Event",
            Self::Proton => "Proton",
            Self::Deuteron => "Deuteron",
            Self::Lambda => "Lambda",
            Self::PosDaughter => "PosDaughter",
            Self::NegDaughter => "NegDaughter",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Closed interval `[min, max]`; both endpoints pass.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CutRange {
    #[serde(rename = "Min")]
    pub min: f64,
    #[serde(rename = "Max")]
    pub max: f64,
}

impl CutRange {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True iff `min <= value <= max`. NaN is never contained.
    #[inline]
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

// Intermediate struct matching the JSON document layout
#[derive(Deserialize)]
struct JsonCuts {
    #[serde(rename = "Event")]
    event: BTreeMap<String, CutRange>,
    #[serde(rename = "Proton")]
    proton: BTreeMap<String, CutRange>,
    #[serde(rename = "Proton_PTPC")]
    proton_p_tpc: f64,
    #[serde(rename = "Deuteron")]
    deuteron: BTreeMap<String, CutRange>,
    #[serde(rename = "Lambda")]
    lambda: BTreeMap<String, CutRange>,
    #[serde(rename = "PosDaughter")]
    pos_daughter: BTreeMap<String, CutRange>,
    #[serde(rename = "NegDaughter")]
    neg_daughter: BTreeMap<String, CutRange>,
}

/// All configured cuts, keyed by species then observable name.
#[derive(Debug, Clone, PartialEq)]
pub struct CutSet {
    tables: BTreeMap<Species, BTreeMap<String, CutRange>>,
    proton_p_tpc: f64,
}

impl CutSet {
    /// Creates a cut set from per-species tables.
    ///
    /// Species without a table are treated as having no cuts configured.
    #[must_use]
    pub fn new(tables: BTreeMap<Species, BTreeMap<String, CutRange>>, proton_p_tpc: f64) -> Self {
        Self {
            tables,
            proton_p_tpc,
        }
    }

    /// Loads the cut document from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or a species table or
    /// `Proton_PTPC` is missing or malformed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let json: JsonCuts = serde_json::from_reader(reader)?;
        Ok(Self::from_json_cuts(json))
    }

    /// Loads the cut document from a JSON string.
    ///
    /// # Errors
    /// Returns an error if a species table or `Proton_PTPC` is missing or
    /// malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let json: JsonCuts = serde_json::from_str(json)?;
        Ok(Self::from_json_cuts(json))
    }

    fn from_json_cuts(json: JsonCuts) -> Self {
        let tables = BTreeMap::from([
            (Species::Event, json.event),
            (Species::Proton, json.proton),
            (Species::Deuteron, json.deuteron),
            (Species::Lambda, json.lambda),
            (Species::PosDaughter, json.pos_daughter),
            (Species::NegDaughter, json.neg_daughter),
        ]);
        for (species, table) in &tables {
            for (name, range) in table {
                if range.min > range.max {
                    log::warn!(
                        "cut {species}/{name} has Min {} > Max {}; it rejects every value",
                        range.min,
                        range.max
                    );
                }
            }
        }
        Self::new(tables, json.proton_p_tpc)
    }

    /// Range of a named cut.
    ///
    /// # Errors
    /// Returns [`Error::MissingCut`] if the species has no cut of that name.
    pub fn get(&self, species: Species, name: &str) -> Result<CutRange> {
        self.tables
            .get(&species)
            .and_then(|table| table.get(name))
            .copied()
            .ok_or_else(|| Error::MissingCut {
                species,
                name: name.to_string(),
            })
    }

    /// Names configured for a species, in sorted order.
    pub fn names(&self, species: Species) -> impl Iterator<Item = &str> {
        self.tables
            .get(&species)
            .into_iter()
            .flat_map(|table| table.keys().map(String::as_str))
    }

    /// Total-momentum threshold separating TPC-only from TPC+TOF proton PID.
    #[must_use]
    pub fn proton_p_tpc(&self) -> f64 {
        self.proton_p_tpc
    }
}
