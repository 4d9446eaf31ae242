//! Validated histogram binning for every category.

use crate::category::{EventHist, TrackHist, TrackHist2D};
use crate::histogram::Axis;

/// Binning of every histogram the engine fills.
///
/// The particle schema is shared by all buckets. A schema always covers the
/// full key space; there is no way to construct a partial one.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSchema {
    event: Vec<Axis>,
    particle_1d: Vec<Axis>,
    particle_2d: Vec<(Axis, Axis)>,
}

impl HistogramSchema {
    /// Builds a schema by asking for the binning of each key in turn.
    ///
    /// # Errors
    /// Propagates the first error returned by a lookup.
    pub fn try_from_lookup<E, FE, F1, F2>(
        mut event: FE,
        mut particle_1d: F1,
        mut particle_2d: F2,
    ) -> std::result::Result<Self, E>
    where
        FE: FnMut(EventHist) -> std::result::Result<Axis, E>,
        F1: FnMut(TrackHist) -> std::result::Result<Axis, E>,
        F2: FnMut(TrackHist2D) -> std::result::Result<(Axis, Axis), E>,
    {
        Ok(Self {
            event: EventHist::ALL
                .into_iter()
                .map(&mut event)
                .collect::<std::result::Result<_, E>>()?,
            particle_1d: TrackHist::ALL
                .into_iter()
                .map(&mut particle_1d)
                .collect::<std::result::Result<_, E>>()?,
            particle_2d: TrackHist2D::ALL
                .into_iter()
                .map(&mut particle_2d)
                .collect::<std::result::Result<_, E>>()?,
        })
    }

    /// Binning of an event histogram.
    #[must_use]
    pub fn event(&self, hist: EventHist) -> Axis {
        self.event[hist.index()]
    }

    /// Binning of a particle histogram.
    #[must_use]
    pub fn particle_1d(&self, hist: TrackHist) -> Axis {
        self.particle_1d[hist.index()]
    }

    /// `(x, y)` binning of a 2D particle histogram.
    #[must_use]
    pub fn particle_2d(&self, hist: TrackHist2D) -> (Axis, Axis) {
        self.particle_2d[hist.index()]
    }
}
