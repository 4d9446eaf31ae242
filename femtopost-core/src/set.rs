//! The aggregation context: every histogram of one run or partition.

use crate::category::{Bucket, EventHist, TrackHist, TrackHist2D};
use crate::error::Result;
use crate::histogram::{Hist1D, Hist2D};
use crate::schema::HistogramSchema;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Histograms of one particle bucket.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BucketHistograms {
    bucket: Bucket,
    hist_1d: Vec<Hist1D>,
    hist_2d: Vec<Hist2D>,
}

impl BucketHistograms {
    fn new(bucket: Bucket, schema: &HistogramSchema) -> Self {
        let hist_1d = TrackHist::ALL
            .into_iter()
            .map(|h| {
                Hist1D::new(
                    format!("{}_{}", bucket.name(), h.name()),
                    schema.particle_1d(h),
                )
            })
            .collect();
        let hist_2d = TrackHist2D::ALL
            .into_iter()
            .map(|h| {
                let (x, y) = schema.particle_2d(h);
                Hist2D::new(format!("{}_{}", bucket.name(), h.name()), x, y)
            })
            .collect();
        Self {
            bucket,
            hist_1d,
            hist_2d,
        }
    }

    #[must_use]
    pub fn bucket(&self) -> Bucket {
        self.bucket
    }

    #[must_use]
    pub fn get(&self, hist: TrackHist) -> &Hist1D {
        &self.hist_1d[hist.index()]
    }

    pub fn get_mut(&mut self, hist: TrackHist) -> &mut Hist1D {
        &mut self.hist_1d[hist.index()]
    }

    #[must_use]
    pub fn get_2d(&self, hist: TrackHist2D) -> &Hist2D {
        &self.hist_2d[hist.index()]
    }

    pub fn get_2d_mut(&mut self, hist: TrackHist2D) -> &mut Hist2D {
        &mut self.hist_2d[hist.index()]
    }

    /// 1D histograms in storage order.
    #[must_use]
    pub fn hists_1d(&self) -> &[Hist1D] {
        &self.hist_1d
    }

    /// 2D histograms in storage order.
    #[must_use]
    pub fn hists_2d(&self) -> &[Hist2D] {
        &self.hist_2d
    }

    fn merge(&mut self, other: &Self) -> Result<()> {
        for (a, b) in self.hist_1d.iter_mut().zip(&other.hist_1d) {
            a.merge(b)?;
        }
        for (a, b) in self.hist_2d.iter_mut().zip(&other.hist_2d) {
            a.merge(b)?;
        }
        Ok(())
    }
}

/// Event histograms plus one [`BucketHistograms`] per bucket.
///
/// Histogram filling is commutative, so sets built from independent
/// partitions can be merged in any order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistogramSet {
    event: Vec<Hist1D>,
    buckets: Vec<BucketHistograms>,
}

impl HistogramSet {
    /// Creates empty histograms for every key of the schema.
    #[must_use]
    pub fn new(schema: &HistogramSchema) -> Self {
        let event = EventHist::ALL
            .into_iter()
            .map(|h| Hist1D::new(format!("Event_{}", h.name()), schema.event(h)))
            .collect();
        let buckets = Bucket::ALL
            .into_iter()
            .map(|b| BucketHistograms::new(b, schema))
            .collect();
        Self { event, buckets }
    }

    #[must_use]
    pub fn event(&self, hist: EventHist) -> &Hist1D {
        &self.event[hist.index()]
    }

    pub fn event_mut(&mut self, hist: EventHist) -> &mut Hist1D {
        &mut self.event[hist.index()]
    }

    /// Event histograms in storage order.
    #[must_use]
    pub fn event_hists(&self) -> &[Hist1D] {
        &self.event
    }

    #[must_use]
    pub fn bucket(&self, bucket: Bucket) -> &BucketHistograms {
        &self.buckets[bucket.index()]
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut BucketHistograms {
        &mut self.buckets[bucket.index()]
    }

    /// Bucket histograms in output order.
    pub fn buckets(&self) -> impl Iterator<Item = &BucketHistograms> {
        self.buckets.iter()
    }

    /// Adds every histogram of `other` into this set.
    ///
    /// # Errors
    /// Returns an error if the two sets were built from different schemas.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        for (a, b) in self.event.iter_mut().zip(&other.event) {
            a.merge(b)?;
        }
        for (a, b) in self.buckets.iter_mut().zip(&other.buckets) {
            a.merge(b)?;
        }
        Ok(())
    }
}
