//! Histogram output model and the sink trait.
//!
//! Merged histograms are flattened into named groups before they are
//! written: one `Event` group plus one group per particle bucket. Inside a
//! group each histogram is keyed by its full `<Category>_<observable>`
//! name, e.g. `Event_VertexZ` or `Proton_Pt`.

use crate::Result;
use femtopost_core::{Axis, Hist1D, Hist2D, HistogramSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group name of the event histograms.
pub const EVENT_GROUP: &str = "Event";

/// Destination for the histograms of a run.
pub trait HistogramSink {
    /// Writes every histogram of `set`.
    ///
    /// # Errors
    /// Returns an error if the destination cannot be written.
    fn write(&mut self, set: &HistogramSet) -> Result<()>;
}

/// Binning of one stored axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredAxis {
    pub bins: usize,
    pub min: f64,
    pub max: f64,
}

impl From<&Axis> for StoredAxis {
    fn from(axis: &Axis) -> Self {
        Self {
            bins: axis.bins(),
            min: axis.min(),
            max: axis.max(),
        }
    }
}

/// One histogram as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StoredHistogram {
    TH1 {
        axis: StoredAxis,
        /// In-range bin contents.
        contents: Vec<f64>,
        underflow: f64,
        overflow: f64,
        entries: u64,
    },
    TH2 {
        x: StoredAxis,
        y: StoredAxis,
        /// In-range cell contents, `x` major.
        contents: Vec<f64>,
        entries: u64,
    },
}

impl StoredHistogram {
    #[must_use]
    pub fn entries(&self) -> u64 {
        match self {
            Self::TH1 { entries, .. } | Self::TH2 { entries, .. } => *entries,
        }
    }

    #[must_use]
    pub fn contents(&self) -> &[f64] {
        match self {
            Self::TH1 { contents, .. } | Self::TH2 { contents, .. } => contents,
        }
    }
}

impl From<&Hist1D> for StoredHistogram {
    fn from(hist: &Hist1D) -> Self {
        Self::TH1 {
            axis: hist.axis().into(),
            contents: hist.contents().to_vec(),
            underflow: hist.underflow(),
            overflow: hist.overflow(),
            entries: hist.entries(),
        }
    }
}

impl From<&Hist2D> for StoredHistogram {
    fn from(hist: &Hist2D) -> Self {
        Self::TH2 {
            x: hist.x_axis().into(),
            y: hist.y_axis().into(),
            contents: hist.contents(),
            entries: hist.entries(),
        }
    }
}

/// Histograms by group, then by observable name.
pub type StoredGroups = BTreeMap<String, BTreeMap<String, StoredHistogram>>;

/// Flattens a histogram set into its output groups.
#[must_use]
pub fn stored_groups(set: &HistogramSet) -> StoredGroups {
    let mut groups = StoredGroups::new();
    groups.insert(
        EVENT_GROUP.to_string(),
        set.event_hists()
            .iter()
            .map(|h| (h.name().to_string(), h.into()))
            .collect(),
    );
    for bucket in set.buckets() {
        let mut group: BTreeMap<String, StoredHistogram> = bucket
            .hists_1d()
            .iter()
            .map(|h| (h.name().to_string(), h.into()))
            .collect();
        group.extend(
            bucket
                .hists_2d()
                .iter()
                .map(|h| (h.name().to_string(), h.into())),
        );
        groups.insert(bucket.bucket().name().to_string(), group);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use femtopost_core::{Bucket, EventHist, HistogramSchema, TrackHist, TrackHist2D};

    fn schema() -> HistogramSchema {
        HistogramSchema::try_from_lookup(
            |_| Axis::new(4, 0.0, 4.0),
            |_| Axis::new(2, 0.0, 2.0),
            |_| Ok::<_, femtopost_core::Error>((Axis::new(2, 0.0, 2.0)?, Axis::new(3, 0.0, 3.0)?)),
        )
        .unwrap()
    }

    #[test]
    fn test_groups_cover_every_histogram() {
        let mut set = HistogramSet::new(&schema());
        set.event_mut(EventHist::VertexZ).fill(1.5);
        set.event_mut(EventHist::VertexZ).fill(-1.0);
        set.bucket_mut(Bucket::Lambda)
            .get_2d_mut(TrackHist2D::DcaZVsPt)
            .fill(1.5, 2.5);

        let groups = stored_groups(&set);
        assert_eq!(groups.len(), 1 + Bucket::ALL.len());
        assert_eq!(
            groups["Proton"].len(),
            TrackHist::ALL.len() + TrackHist2D::ALL.len()
        );
        assert_eq!(
            groups[EVENT_GROUP].keys().collect::<Vec<_>>(),
            vec!["Event_Multiplicity", "Event_VertexZ"]
        );
        assert!(groups["Proton"].contains_key("Proton_Pt"));
        assert!(groups["RawNegDaughter"].contains_key("RawNegDaughter_NSigmaTOFvsP"));
        assert!(groups
            .iter()
            .all(|(group, hists)| hists.keys().all(|name| name.starts_with(&format!("{group}_")))));

        let StoredHistogram::TH1 {
            contents,
            underflow,
            entries,
            ..
        } = &groups[EVENT_GROUP]["Event_VertexZ"]
        else {
            panic!("VertexZ should be one-dimensional");
        };
        assert_eq!(contents, &vec![0.0, 1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(*underflow, 1.0);
        assert_eq!(*entries, 2);

        let dca = &groups["Lambda"]["Lambda_DCAzVsPt"];
        assert_eq!(dca.contents(), &[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(dca.entries(), 1);
    }

    #[test]
    fn test_tagged_json_layout() {
        let hist = Hist1D::new("h", Axis::new(1, 0.0, 1.0).unwrap());
        let value = serde_json::to_value(StoredHistogram::from(&hist)).unwrap();
        assert_eq!(value["kind"], "TH1");
        assert_eq!(value["axis"]["bins"], 1);
    }
}
