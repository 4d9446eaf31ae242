//! Derived observables of one row and their deposit into a bucket.

use crate::derived;
use femtopost_core::{BucketHistograms, ParticleView, PrimaryVertex, TrackHist, TrackHist2D};

/// Every value a particle histogram is filled with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackObservables {
    pub charge: f64,
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub momentum: f64,
    pub dca_xy: f64,
    pub dca_z: f64,
    pub dca_primary_vertex: f64,
    pub daughter_dca: f64,
    pub tpc_clusters_found: f64,
    pub tpc_clusters_findable: f64,
    pub tpc_crossed_rows: f64,
    /// Guarded ratio, see [`derived::RATIO_FALLBACK`].
    pub tpc_crossed_rows_over_findable: f64,
    pub tpc_clusters_shared: f64,
    pub its_clusters: f64,
    pub its_clusters_inner_barrel: f64,
    /// Decoded TPC significance, zero without a hypothesis.
    pub nsigma_tpc: f64,
    /// Decoded TOF significance, zero without a hypothesis.
    pub nsigma_tof: f64,
    pub cos_pa: f64,
    pub trans_radius: f64,
    pub decay_vertex_dist: f64,
    pub k0_inv_mass: f64,
    pub lambda_inv_mass: f64,
}

impl TrackObservables {
    /// Computes the observables of a row for the hypothesis of `bucket`.
    #[must_use]
    pub fn compute(view: &ParticleView<'_>, vertex: &PrimaryVertex, bucket: &BucketHistograms) -> Self {
        let (nsigma_tpc, nsigma_tof) = bucket.bucket().hypothesis().map_or((0.0, 0.0), |h| {
            (derived::nsigma_tpc(view, h), derived::nsigma_tof(view, h))
        });
        Self {
            charge: view.sign(),
            pt: view.pt(),
            eta: view.eta(),
            phi: view.phi(),
            momentum: derived::total_momentum(view),
            dca_xy: view.dca_xy(),
            dca_z: view.dca_z(),
            dca_primary_vertex: derived::dca_primary_vertex(view),
            daughter_dca: view.daughter_dca(),
            tpc_clusters_found: f64::from(view.tpc_clusters_found()),
            tpc_clusters_findable: f64::from(view.tpc_clusters_findable()),
            tpc_crossed_rows: f64::from(view.tpc_crossed_rows()),
            tpc_crossed_rows_over_findable: derived::crossed_rows_over_findable_or_fallback(view),
            tpc_clusters_shared: f64::from(view.tpc_clusters_shared()),
            its_clusters: f64::from(view.its_clusters()),
            its_clusters_inner_barrel: f64::from(view.its_clusters_inner_barrel()),
            nsigma_tpc,
            nsigma_tof,
            cos_pa: view.cos_pa(),
            trans_radius: view.trans_radius(),
            decay_vertex_dist: derived::decay_vertex_distance(view, vertex),
            k0_inv_mass: view.m_kaon(),
            lambda_inv_mass: view.m_lambda(),
        }
    }

    /// Value of a 1D histogram observable.
    #[must_use]
    pub fn value(&self, hist: TrackHist) -> f64 {
        match hist {
            TrackHist::Charge => self.charge,
            TrackHist::Pt => self.pt,
            TrackHist::Eta => self.eta,
            TrackHist::Phi => self.phi,
            TrackHist::DcaXy => self.dca_xy,
            TrackHist::DcaZ => self.dca_z,
            TrackHist::DcaPrimaryVertex => self.dca_primary_vertex,
            TrackHist::DaughterDca => self.daughter_dca,
            TrackHist::TpcClustersFound => self.tpc_clusters_found,
            TrackHist::TpcClustersFindable => self.tpc_clusters_findable,
            TrackHist::TpcCrossedRows => self.tpc_crossed_rows,
            TrackHist::TpcCrossedRowsOverFindable => self.tpc_crossed_rows_over_findable,
            TrackHist::TpcClustersShared => self.tpc_clusters_shared,
            TrackHist::ItsClusters => self.its_clusters,
            TrackHist::ItsClustersInnerBarrel => self.its_clusters_inner_barrel,
            TrackHist::NSigmaTpc => self.nsigma_tpc,
            TrackHist::NSigmaTof => self.nsigma_tof,
            TrackHist::CosPa => self.cos_pa,
            TrackHist::TransRadius => self.trans_radius,
            TrackHist::DecayVertexDist => self.decay_vertex_dist,
            TrackHist::K0InvMass => self.k0_inv_mass,
            TrackHist::LambdaInvMass => self.lambda_inv_mass,
        }
    }

    /// `(x, y)` of a 2D histogram observable.
    #[must_use]
    pub fn pair(&self, hist: TrackHist2D) -> (f64, f64) {
        match hist {
            TrackHist2D::DcaZVsPt => (self.pt, self.dca_z),
            TrackHist2D::DcaXyVsPt => (self.pt, self.dca_xy),
            TrackHist2D::NSigmaTpcVsP => (self.momentum, self.nsigma_tpc),
            TrackHist2D::NSigmaTofVsP => (self.momentum, self.nsigma_tof),
        }
    }

    /// Fills every histogram of the bucket with unit weight.
    pub fn fill(&self, bucket: &mut BucketHistograms) {
        for hist in TrackHist::ALL {
            bucket.get_mut(hist).fill(self.value(hist));
        }
        for hist in TrackHist2D::ALL {
            let (x, y) = self.pair(hist);
            bucket.get_2d_mut(hist).fill(x, y);
        }
    }
}

/// Computes the observables of a row and fills them into `bucket`.
pub(crate) fn fill_track(
    bucket: &mut BucketHistograms,
    view: &ParticleView<'_>,
    vertex: &PrimaryVertex,
) {
    TrackObservables::compute(view, vertex, bucket).fill(bucket);
}
