//! JSON datasets and histogram output.
//!
//! A JSON dataset is one object whose keys are partition names. Each
//! partition is an object holding the three tables under their O2 names,
//! each table an object of equally long column arrays.

use crate::reader::MappedFileReader;
use crate::sink::{stored_groups, HistogramSink, StoredGroups};
use crate::source::{
    is_partition_name, missing_table, DatasetSource, COLLISION_TABLE, DEBUG_TABLE, PARTICLE_TABLE,
};
use crate::{Error, Result};
use femtopost_core::{CollisionTable, HistogramSet, ParticleDebugTable, ParticleTable, Partition};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct JsonPartition {
    #[serde(rename = "O2femtodreamcols")]
    collisions: Option<CollisionTable>,
    #[serde(rename = "O2femtodreamparts")]
    particles: Option<ParticleTable>,
    #[serde(rename = "O2femtodebugparts")]
    debug: Option<ParticleDebugTable>,
}

#[derive(Serialize)]
struct JsonPartitionRef<'a> {
    #[serde(rename = "O2femtodreamcols")]
    collisions: &'a CollisionTable,
    #[serde(rename = "O2femtodreamparts")]
    particles: &'a ParticleTable,
    #[serde(rename = "O2femtodebugparts")]
    debug: &'a ParticleDebugTable,
}

/// A dataset stored as one JSON document.
///
/// The document is memory-mapped and split into per-partition fragments
/// on open; the tables of a partition are parsed when it is loaded.
#[derive(Debug)]
pub struct JsonDataset {
    path: PathBuf,
    partitions: BTreeMap<String, Box<RawValue>>,
}

impl JsonDataset {
    /// Opens a JSON dataset.
    ///
    /// Top-level keys without the partition prefix are ignored.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a JSON object.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = MappedFileReader::open(&path)?;
        let mut partitions: BTreeMap<String, Box<RawValue>> =
            serde_json::from_slice(reader.as_bytes())?;
        partitions.retain(|name, _| {
            let keep = is_partition_name(name);
            if !keep {
                log::debug!("ignoring top-level key {name}");
            }
            keep
        });
        log::info!(
            "opened {} with {} partitions",
            reader.path().display(),
            partitions.len()
        );
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            partitions,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for JsonDataset {
    fn partition_names(&self) -> Result<Vec<String>> {
        Ok(self.partitions.keys().cloned().collect())
    }

    fn load_partition(&self, name: &str) -> Result<Option<Partition>> {
        let raw = self
            .partitions
            .get(name)
            .ok_or_else(|| Error::UnknownPartition(name.to_string()))?;
        let tables: JsonPartition = serde_json::from_str(raw.get())?;
        let Some(collisions) = tables.collisions else {
            missing_table(name, COLLISION_TABLE);
            return Ok(None);
        };
        let Some(particles) = tables.particles else {
            missing_table(name, PARTICLE_TABLE);
            return Ok(None);
        };
        let Some(debug) = tables.debug else {
            missing_table(name, DEBUG_TABLE);
            return Ok(None);
        };
        Ok(Some(Partition::new(name, collisions, particles, debug)?))
    }
}

/// Writes partitions as a JSON dataset readable by [`JsonDataset`].
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_json_dataset<P: AsRef<Path>>(path: P, partitions: &[Partition]) -> Result<()> {
    let document: BTreeMap<&str, JsonPartitionRef<'_>> = partitions
        .iter()
        .map(|p| {
            (
                p.name(),
                JsonPartitionRef {
                    collisions: p.collisions(),
                    particles: p.particles(),
                    debug: p.debug(),
                },
            )
        })
        .collect();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &document)?;
    writer.flush()?;
    Ok(())
}

/// Writes histograms as one pretty-printed JSON document of
/// [`StoredGroups`].
pub struct JsonHistogramSink {
    writer: BufWriter<File>,
}

impl JsonHistogramSink {
    /// Creates (or truncates) the output file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }
}

impl HistogramSink for JsonHistogramSink {
    fn write(&mut self, set: &HistogramSet) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &stored_groups(set))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Reads histograms written by [`JsonHistogramSink`].
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_json_histograms<P: AsRef<Path>>(path: P) -> Result<StoredGroups> {
    let reader = MappedFileReader::open(path)?;
    Ok(serde_json::from_slice(reader.as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_table_skips_partition() {
        let mut file = NamedTempFile::new().unwrap();
        let doc = serde_json::json!({
            "DF_1": {
                "O2femtodreamcols": {"fPosZ": [1.0], "fMultV0M": [3.0]},
                "O2femtodreamparts": {
                    "fPt": [], "fEta": [], "fPhi": [], "fPartType": [],
                    "fTempFitVar": [], "fIndexFemtoDreamCollisions": [], "fMLambda": []
                }
            },
            "parentFiles": {}
        });
        write!(file, "{doc}").unwrap();

        let dataset = JsonDataset::open(file.path()).unwrap();
        assert_eq!(dataset.partition_names().unwrap(), vec!["DF_1"]);
        assert!(dataset.load_partition("DF_1").unwrap().is_none());
        assert!(matches!(
            dataset.load_partition("DF_2"),
            Err(Error::UnknownPartition(_))
        ));
    }

    #[test]
    fn test_not_an_object() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        assert!(matches!(
            JsonDataset::open(file.path()),
            Err(Error::Json(_))
        ));
    }
}
