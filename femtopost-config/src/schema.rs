//! Histogram-schema document loading.

use crate::{Error, Result};
use femtopost_core::{Axis, EventHist, HistogramSchema, TrackHist, TrackHist2D};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const EVENT: &str = "Event";
const PARTICLE_1D: &str = "Particle_1D";
const PARTICLE_2D: &str = "Particle_2D";

#[derive(Deserialize)]
struct JsonSchema {
    #[serde(rename = "Event")]
    event: BTreeMap<String, JsonAxis>,
    #[serde(rename = "Particle_1D")]
    particle_1d: BTreeMap<String, JsonAxis>,
    #[serde(rename = "Particle_2D")]
    particle_2d: BTreeMap<String, JsonAxis2D>,
}

#[derive(Deserialize, Clone, Copy)]
struct JsonAxis {
    #[serde(rename = "Bins")]
    bins: usize,
    #[serde(rename = "RangeMin")]
    min: f64,
    #[serde(rename = "RangeMax")]
    max: f64,
}

#[derive(Deserialize, Clone, Copy)]
struct JsonAxis2D {
    #[serde(rename = "XBins")]
    x_bins: usize,
    #[serde(rename = "XRangeMin")]
    x_min: f64,
    #[serde(rename = "XRangeMax")]
    x_max: f64,
    #[serde(rename = "YBins")]
    y_bins: usize,
    #[serde(rename = "YRangeMin")]
    y_min: f64,
    #[serde(rename = "YRangeMax")]
    y_max: f64,
}

/// Loads and validates the histogram-schema document from a file.
///
/// # Errors
/// Returns an error if the file cannot be read, is malformed, names an
/// unknown histogram, omits a required one, or has unusable binning.
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<HistogramSchema> {
    let file = File::open(path)?;
    let json: JsonSchema = serde_json::from_reader(BufReader::new(file))?;
    build(&json)
}

/// Parses and validates the histogram-schema document from a string.
///
/// # Errors
/// See [`load_schema`].
pub fn schema_from_json(json: &str) -> Result<HistogramSchema> {
    let json: JsonSchema = serde_json::from_str(json)?;
    build(&json)
}

fn build(json: &JsonSchema) -> Result<HistogramSchema> {
    reject_unknown(EVENT, json.event.keys(), |n| EventHist::from_name(n).is_some())?;
    reject_unknown(PARTICLE_1D, json.particle_1d.keys(), |n| {
        TrackHist::from_name(n).is_some()
    })?;
    reject_unknown(PARTICLE_2D, json.particle_2d.keys(), |n| {
        TrackHist2D::from_name(n).is_some()
    })?;

    let schema = HistogramSchema::try_from_lookup(
        |h| {
            let entry = lookup(&json.event, EVENT, h.name())?;
            axis(EVENT, h.name(), entry.bins, entry.min, entry.max)
        },
        |h| {
            let entry = lookup(&json.particle_1d, PARTICLE_1D, h.name())?;
            axis(PARTICLE_1D, h.name(), entry.bins, entry.min, entry.max)
        },
        |h| {
            let entry = lookup(&json.particle_2d, PARTICLE_2D, h.name())?;
            Ok((
                axis(PARTICLE_2D, h.name(), entry.x_bins, entry.x_min, entry.x_max)?,
                axis(PARTICLE_2D, h.name(), entry.y_bins, entry.y_min, entry.y_max)?,
            ))
        },
    )?;
    log::debug!(
        "histogram schema: {} event, {} particle 1D, {} particle 2D",
        EventHist::ALL.len(),
        TrackHist::ALL.len(),
        TrackHist2D::ALL.len()
    );
    Ok(schema)
}

fn reject_unknown<'a>(
    group: &'static str,
    names: impl Iterator<Item = &'a String>,
    known: impl Fn(&str) -> bool,
) -> Result<()> {
    for name in names {
        if !known(name) {
            return Err(Error::UnknownHistogram {
                group,
                name: name.clone(),
            });
        }
    }
    Ok(())
}

fn lookup<T: Copy>(
    entries: &BTreeMap<String, T>,
    group: &'static str,
    name: &'static str,
) -> Result<T> {
    entries
        .get(name)
        .copied()
        .ok_or(Error::MissingHistogram { group, name })
}

fn axis(group: &'static str, name: &'static str, bins: usize, min: f64, max: f64) -> Result<Axis> {
    Axis::new(bins, min, max).map_err(|source| Error::InvalidHistogram {
        group,
        name,
        source,
    })
}
