//! Quantities computed from a particle row rather than read from it.

use femtopost_core::{decode_nsigma, ParticleView, PidHypothesis, PrimaryVertex};

/// Crossed-rows/findable ratio filled when no clusters were findable.
///
/// Lies outside any realistic cut window.
pub const RATIO_FALLBACK: f64 = 3.0;

/// Total momentum `pt * cosh(eta)`.
#[inline]
#[must_use]
pub fn total_momentum(view: &ParticleView<'_>) -> f64 {
    view.pt() * view.eta().cosh()
}

/// Quadrature sum of the transverse and longitudinal DCA.
#[inline]
#[must_use]
pub fn dca_primary_vertex(view: &ParticleView<'_>) -> f64 {
    view.dca_xy().hypot(view.dca_z())
}

/// Distance from the decay vertex to the primary vertex.
#[inline]
#[must_use]
pub fn decay_vertex_distance(view: &ParticleView<'_>, vertex: &PrimaryVertex) -> f64 {
    let (x, y, z) = view.decay_vertex();
    vertex.distance_to(x, y, z)
}

/// Crossed rows over findable clusters, unguarded.
///
/// Zero findable clusters yields `inf` or NaN, which no closed range
/// contains.
#[inline]
#[must_use]
pub fn crossed_rows_over_findable(view: &ParticleView<'_>) -> f64 {
    f64::from(view.tpc_crossed_rows()) / f64::from(view.tpc_clusters_findable())
}

/// Crossed rows over findable clusters, [`RATIO_FALLBACK`] when nothing
/// was findable.
#[inline]
#[must_use]
pub fn crossed_rows_over_findable_or_fallback(view: &ParticleView<'_>) -> f64 {
    if view.tpc_clusters_findable() == 0 {
        RATIO_FALLBACK
    } else {
        crossed_rows_over_findable(view)
    }
}

/// Decoded TPC significance.
#[inline]
#[must_use]
pub fn nsigma_tpc(view: &ParticleView<'_>, hypothesis: PidHypothesis) -> f64 {
    decode_nsigma(view.tpc_nsigma_code(hypothesis))
}

/// Decoded TOF significance.
#[inline]
#[must_use]
pub fn nsigma_tof(view: &ParticleView<'_>, hypothesis: PidHypothesis) -> f64 {
    decode_nsigma(view.tof_nsigma_code(hypothesis))
}

/// Combined significance `sqrt(tpc^2 + tof^2)`.
#[inline]
#[must_use]
pub fn nsigma_tpc_tof(view: &ParticleView<'_>, hypothesis: PidHypothesis) -> f64 {
    nsigma_tpc(view, hypothesis).hypot(nsigma_tof(view, hypothesis))
}
