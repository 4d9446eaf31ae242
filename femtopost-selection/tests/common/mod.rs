//! Partition fixtures for the end-to-end pipeline tests.

use femtopost_config::CutSet;
use femtopost_core::{CollisionTable, ParticleDebugTable, ParticleTable, Partition};
use serde_json::{json, Value};

/// One particle row. Significance codes are `[El, Pi, Pr, De]`.
#[derive(Debug, Clone, Copy)]
pub struct RowSpec {
    pub collision: i32,
    pub part_type: u8,
    pub pt: f32,
    pub eta: f32,
    pub phi: f32,
    pub cos_pa: f32,
    pub m_lambda: f32,
    pub sign: i8,
    pub tpc_found: u8,
    pub tpc_findable: u8,
    pub tpc_crossed_rows: u8,
    pub tpc_shared: u8,
    pub its: u8,
    pub its_ib: u8,
    pub dca_xy: f32,
    pub dca_z: f32,
    pub daughter_dca: f32,
    pub trans_radius: f32,
    pub decay_vertex: [f32; 3],
    pub m_kaon: f32,
    pub tpc: [i8; 4],
    pub tof: [i8; 4],
}

impl RowSpec {
    /// Track passing the standard proton cuts and failing the deuteron ones.
    pub fn track() -> Self {
        Self {
            collision: 0,
            part_type: 0,
            pt: 0.6,
            eta: 0.0,
            phi: 1.0,
            cos_pa: 0.0,
            m_lambda: 0.0,
            sign: 1,
            tpc_found: 120,
            tpc_findable: 130,
            tpc_crossed_rows: 125,
            tpc_shared: 0,
            its: 6,
            its_ib: 2,
            dca_xy: 0.01,
            dca_z: 0.02,
            daughter_dca: 0.0,
            trans_radius: 0.0,
            decay_vertex: [0.0; 3],
            m_kaon: 0.0,
            tpc: [127, 127, 0, 127],
            tof: [127, 127, 0, 127],
        }
    }

    /// Track passing the standard deuteron cuts and failing the proton ones.
    pub fn deuteron() -> Self {
        Self {
            tpc: [127, 127, 127, 0],
            ..Self::track()
        }
    }

    /// V0 passing the standard lambda cuts.
    pub fn v0() -> Self {
        Self {
            part_type: 1,
            pt: 1.2,
            eta: 0.1,
            cos_pa: 0.995,
            m_lambda: 1.115,
            sign: 0,
            trans_radius: 3.0,
            decay_vertex: [3.0, 4.0, 0.0],
            daughter_dca: 0.5,
            m_kaon: 0.6,
            dca_xy: 0.0,
            dca_z: 0.0,
            tpc: [0; 4],
            tof: [0; 4],
            ..Self::track()
        }
    }

    /// Daughter passing the standard positive-daughter cuts.
    pub fn pos_daughter() -> Self {
        Self {
            part_type: 2,
            pt: 0.9,
            sign: 1,
            dca_xy: 0.3,
            dca_z: 0.3,
            tpc: [127, 127, 0, 127],
            ..Self::track()
        }
    }

    /// Daughter passing the standard negative-daughter cuts.
    pub fn neg_daughter() -> Self {
        Self {
            sign: -1,
            pt: 0.3,
            tpc: [127, 0, 127, 127],
            ..Self::pos_daughter()
        }
    }
}

/// Builder of a single partition.
#[derive(Debug, Default)]
pub struct Fixture {
    collisions: CollisionTable,
    particles: ParticleTable,
    debug: ParticleDebugTable,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collision(mut self, pos_z: f32, mult: f32) -> Self {
        self.collisions.push(pos_z, mult);
        self
    }

    pub fn row(mut self, row: RowSpec) -> Self {
        let p = &mut self.particles;
        p.pt.push(row.pt);
        p.eta.push(row.eta);
        p.phi.push(row.phi);
        p.part_type.push(row.part_type);
        p.temp_fit_var.push(row.cos_pa);
        p.collision_index.push(row.collision);
        p.m_lambda.push(row.m_lambda);

        let d = &mut self.debug;
        d.sign.push(row.sign);
        d.tpc_ncls_found.push(row.tpc_found);
        d.tpc_ncls_findable.push(row.tpc_findable);
        d.tpc_ncls_crossed_rows.push(row.tpc_crossed_rows);
        d.tpc_ncls_shared.push(row.tpc_shared);
        d.its_ncls.push(row.its);
        d.its_ncls_inner_barrel.push(row.its_ib);
        d.dca_xy.push(row.dca_xy);
        d.dca_z.push(row.dca_z);
        d.daugh_dca.push(row.daughter_dca);
        d.trans_radius.push(row.trans_radius);
        d.decay_vtx_x.push(row.decay_vertex[0]);
        d.decay_vtx_y.push(row.decay_vertex[1]);
        d.decay_vtx_z.push(row.decay_vertex[2]);
        d.m_kaon.push(row.m_kaon);
        d.tpc_nsigma_el.push(row.tpc[0]);
        d.tpc_nsigma_pi.push(row.tpc[1]);
        d.tpc_nsigma_pr.push(row.tpc[2]);
        d.tpc_nsigma_de.push(row.tpc[3]);
        d.tof_nsigma_el.push(row.tof[0]);
        d.tof_nsigma_pi.push(row.tof[1]);
        d.tof_nsigma_pr.push(row.tof[2]);
        d.tof_nsigma_de.push(row.tof[3]);
        self
    }

    pub fn rows(self, rows: impl IntoIterator<Item = RowSpec>) -> Self {
        rows.into_iter().fold(self, Self::row)
    }

    pub fn build(self) -> Partition {
        self.build_named("DF_1")
    }

    pub fn build_named(self, name: &str) -> Partition {
        Partition::new(name, self.collisions, self.particles, self.debug)
            .expect("fixture partition is consistent")
    }
}

fn range(min: f64, max: f64) -> Value {
    json!({"Min": min, "Max": max})
}

/// Cut document the fixtures are tuned against.
pub fn standard_cuts_json() -> Value {
    let quality = json!({
        "Charge": range(1.0, 1.0),
        "Pt": range(0.5, 4.05),
        "Eta": range(-0.8, 0.8),
        "DCAz": range(-0.1, 0.1),
        "DCAxy": range(-0.1, 0.1),
        "TPCClustersFound": range(70.0, 200.0),
        "TPCCrossedRows": range(70.0, 200.0),
        "TPCCrossedRowsOverFindable": range(0.83, 2.0),
        "TPCClustersShared": range(0.0, 5.0),
    });
    let mut proton = quality.clone();
    proton["NSigmaTPC"] = range(-3.0, 3.0);
    proton["NSigmaTPCTOF"] = range(0.0, 3.0);
    let mut deuteron = quality;
    deuteron["ITSClusters"] = range(5.0, 7.0);
    deuteron["ITSClustersIB"] = range(1.0, 3.0);
    deuteron["NSigmaTPC"] = range(-3.0, 3.0);
    deuteron["TPCRejection"] = range(-3.0, 3.0);
    json!({
        "Event": {"VertexZ": range(-10.0, 10.0)},
        "Proton_PTPC": 0.75,
        "Proton": proton,
        "Deuteron": deuteron,
        "Lambda": {
            "Pt": range(0.3, 10.0),
            "Eta": range(-0.8, 0.8),
            "CosPA": range(0.99, 1.0),
            "TransRadius": range(0.2, 100.0),
            "DecayVertexDist": range(0.0, 10.0),
            "DaughterDCA": range(0.0, 1.5),
            "LambdaInvMass": range(1.1, 1.13),
            "K0InvMass": range(0.48, 0.515),
        },
        "PosDaughter": {
            "Charge": range(1.0, 1.0),
            "Eta": range(-0.8, 0.8),
            "TPCClustersFound": range(70.0, 200.0),
            "NSigmaTPC": range(-5.0, 5.0),
            "DCAPrimaryVertex": range(0.0, 0.05),
        },
        "NegDaughter": {
            "Charge": range(-1.0, -1.0),
            "Eta": range(-0.8, 0.8),
            "TPCClustersFound": range(70.0, 200.0),
            "NSigmaTPC": range(-5.0, 5.0),
            "DCAPrimaryVertex": range(0.0, 0.05),
        }
    })
}

pub fn standard_cuts() -> CutSet {
    CutSet::from_json(&standard_cuts_json().to_string()).expect("standard cuts parse")
}

/// Schema with one wide bin per histogram, so every in-range fill lands in
/// bin 0.
pub fn coarse_schema_json() -> Value {
    use femtopost_core::{TrackHist, TrackHist2D};
    let wide = json!({"Bins": 1, "RangeMin": -1000.0, "RangeMax": 1000.0});
    let wide_2d = json!({"XBins": 1, "XRangeMin": -1000.0, "XRangeMax": 1000.0,
                         "YBins": 1, "YRangeMin": -1000.0, "YRangeMax": 1000.0});
    let particle_1d: serde_json::Map<String, Value> = TrackHist::ALL
        .into_iter()
        .map(|h| (h.name().to_string(), wide.clone()))
        .collect();
    let particle_2d: serde_json::Map<String, Value> = TrackHist2D::ALL
        .into_iter()
        .map(|h| (h.name().to_string(), wide_2d.clone()))
        .collect();
    json!({
        "Event": {"VertexZ": wide.clone(), "Multiplicity": wide},
        "Particle_1D": particle_1d,
        "Particle_2D": particle_2d,
    })
}

pub fn coarse_schema() -> femtopost_core::HistogramSchema {
    femtopost_config::schema_from_json(&coarse_schema_json().to_string())
        .expect("coarse schema parses")
}
