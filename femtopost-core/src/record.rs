//! Columnar record tables of one dataset partition.
//!
//! A partition holds three row-indexed tables in Structure of Arrays
//! layout: collisions, particles, and the particle debug table that is
//! addressed by the same row index as the particle table. Column names in
//! serialized form follow the O2 femtodream branch names.

use crate::error::{Error, Result};
use crate::pid::PidHypothesis;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Particle type discriminator stored in `fPartType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartType {
    /// Charged track candidate.
    Track,
    /// V0 candidate, followed by its positive and negative daughter rows.
    V0,
    /// Daughter track of a V0.
    V0Child,
    /// Any other stored type.
    Other(u8),
}

impl PartType {
    /// Decodes the stored discriminator.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Track,
            1 => Self::V0,
            2 => Self::V0Child,
            other => Self::Other(other),
        }
    }
}

/// Event table (`O2femtodreamcols`).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionTable {
    /// Primary vertex z position.
    #[cfg_attr(feature = "serde", serde(rename = "fPosZ"))]
    pub pos_z: Vec<f32>,
    /// V0M multiplicity estimator.
    #[cfg_attr(feature = "serde", serde(rename = "fMultV0M"))]
    pub mult_v0m: Vec<f32>,
}

impl CollisionTable {
    /// Returns the number of collisions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pos_z.len()
    }

    /// Returns true if the table holds no collisions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos_z.is_empty()
    }

    /// Pushes a single collision.
    pub fn push(&mut self, pos_z: f32, mult_v0m: f32) {
        self.pos_z.push(pos_z);
        self.mult_v0m.push(mult_v0m);
    }

    fn validate(&self) -> Result<()> {
        check_len("O2femtodreamcols", "fMultV0M", self.len(), self.mult_v0m.len())
    }
}

/// Particle table (`O2femtodreamparts`).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParticleTable {
    #[cfg_attr(feature = "serde", serde(rename = "fPt"))]
    pub pt: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(rename = "fEta"))]
    pub eta: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(rename = "fPhi"))]
    pub phi: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(rename = "fPartType"))]
    pub part_type: Vec<u8>,
    /// Species-overloaded fit variable; cos of the pointing angle for V0s.
    #[cfg_attr(feature = "serde", serde(rename = "fTempFitVar"))]
    pub temp_fit_var: Vec<f32>,
    /// Row of the owning collision in the event table.
    #[cfg_attr(feature = "serde", serde(rename = "fIndexFemtoDreamCollisions"))]
    pub collision_index: Vec<i32>,
    #[cfg_attr(feature = "serde", serde(rename = "fMLambda"))]
    pub m_lambda: Vec<f32>,
}

impl ParticleTable {
    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pt.len()
    }

    /// Returns true if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pt.is_empty()
    }

    fn validate(&self) -> Result<()> {
        const TABLE: &str = "O2femtodreamparts";
        let n = self.len();
        check_len(TABLE, "fEta", n, self.eta.len())?;
        check_len(TABLE, "fPhi", n, self.phi.len())?;
        check_len(TABLE, "fPartType", n, self.part_type.len())?;
        check_len(TABLE, "fTempFitVar", n, self.temp_fit_var.len())?;
        check_len(
            TABLE,
            "fIndexFemtoDreamCollisions",
            n,
            self.collision_index.len(),
        )?;
        check_len(TABLE, "fMLambda", n, self.m_lambda.len())
    }
}

/// Particle debug table (`O2femtodebugparts`).
///
/// PID significances are stored compressed and must be decoded with
/// [`crate::decode_nsigma`] before any comparison.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParticleDebugTable {
    #[cfg_attr(feature = "serde", serde(rename = "fSign"))]
    pub sign: Vec<i8>,
    #[cfg_attr(feature = "serde", serde(rename = "fTPCNClsFound"))]
    pub tpc_ncls_found: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(rename = "fTPCNClsFindable"))]
    pub tpc_ncls_findable: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(rename = "fTPCNClsCrossedRows"))]
    pub tpc_ncls_crossed_rows: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(rename = "fTPCNClsShared"))]
    pub tpc_ncls_shared: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(rename = "fITSNCls"))]
    pub its_ncls: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(rename = "fITSNClsInnerBarrel"))]
    pub its_ncls_inner_barrel: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(rename = "fDcaXY"))]
    pub dca_xy: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(rename = "fDcaZ"))]
    pub dca_z: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(rename = "fDaughDCA"))]
    pub daugh_dca: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(rename = "fTransRadius"))]
    pub trans_radius: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(rename = "fDecayVtxX"))]
    pub decay_vtx_x: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(rename = "fDecayVtxY"))]
    pub decay_vtx_y: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(rename = "fDecayVtxZ"))]
    pub decay_vtx_z: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(rename = "fMKaon"))]
    pub m_kaon: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(rename = "fTPCNSigmaStoreEl"))]
    pub tpc_nsigma_el: Vec<i8>,
    #[cfg_attr(feature = "serde", serde(rename = "fTPCNSigmaStorePi"))]
    pub tpc_nsigma_pi: Vec<i8>,
    #[cfg_attr(feature = "serde", serde(rename = "fTPCNSigmaStorePr"))]
    pub tpc_nsigma_pr: Vec<i8>,
    #[cfg_attr(feature = "serde", serde(rename = "fTPCNSigmaStoreDe"))]
    pub tpc_nsigma_de: Vec<i8>,
    #[cfg_attr(feature = "serde", serde(rename = "fTOFNSigmaStoreEl"))]
    pub tof_nsigma_el: Vec<i8>,
    #[cfg_attr(feature = "serde", serde(rename = "fTOFNSigmaStorePi"))]
    pub tof_nsigma_pi: Vec<i8>,
    #[cfg_attr(feature = "serde", serde(rename = "fTOFNSigmaStorePr"))]
    pub tof_nsigma_pr: Vec<i8>,
    #[cfg_attr(feature = "serde", serde(rename = "fTOFNSigmaStoreDe"))]
    pub tof_nsigma_de: Vec<i8>,
}

impl ParticleDebugTable {
    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sign.len()
    }

    /// Returns true if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sign.is_empty()
    }

    /// Stored TPC significance column for a hypothesis.
    #[must_use]
    pub fn tpc_nsigma(&self, hypothesis: PidHypothesis) -> &[i8] {
        match hypothesis {
            PidHypothesis::Electron => &self.tpc_nsigma_el,
            PidHypothesis::Pion => &self.tpc_nsigma_pi,
            PidHypothesis::Proton => &self.tpc_nsigma_pr,
            PidHypothesis::Deuteron => &self.tpc_nsigma_de,
        }
    }

    /// Stored TOF significance column for a hypothesis.
    #[must_use]
    pub fn tof_nsigma(&self, hypothesis: PidHypothesis) -> &[i8] {
        match hypothesis {
            PidHypothesis::Electron => &self.tof_nsigma_el,
            PidHypothesis::Pion => &self.tof_nsigma_pi,
            PidHypothesis::Proton => &self.tof_nsigma_pr,
            PidHypothesis::Deuteron => &self.tof_nsigma_de,
        }
    }

    fn validate(&self) -> Result<()> {
        const TABLE: &str = "O2femtodebugparts";
        let n = self.len();
        let u8_columns: [(&'static str, &Vec<u8>); 6] = [
            ("fTPCNClsFound", &self.tpc_ncls_found),
            ("fTPCNClsFindable", &self.tpc_ncls_findable),
            ("fTPCNClsCrossedRows", &self.tpc_ncls_crossed_rows),
            ("fTPCNClsShared", &self.tpc_ncls_shared),
            ("fITSNCls", &self.its_ncls),
            ("fITSNClsInnerBarrel", &self.its_ncls_inner_barrel),
        ];
        for (column, values) in u8_columns {
            check_len(TABLE, column, n, values.len())?;
        }
        let f32_columns: [(&'static str, &Vec<f32>); 8] = [
            ("fDcaXY", &self.dca_xy),
            ("fDcaZ", &self.dca_z),
            ("fDaughDCA", &self.daugh_dca),
            ("fTransRadius", &self.trans_radius),
            ("fDecayVtxX", &self.decay_vtx_x),
            ("fDecayVtxY", &self.decay_vtx_y),
            ("fDecayVtxZ", &self.decay_vtx_z),
            ("fMKaon", &self.m_kaon),
        ];
        for (column, values) in f32_columns {
            check_len(TABLE, column, n, values.len())?;
        }
        let i8_columns: [(&'static str, &Vec<i8>); 8] = [
            ("fTPCNSigmaStoreEl", &self.tpc_nsigma_el),
            ("fTPCNSigmaStorePi", &self.tpc_nsigma_pi),
            ("fTPCNSigmaStorePr", &self.tpc_nsigma_pr),
            ("fTPCNSigmaStoreDe", &self.tpc_nsigma_de),
            ("fTOFNSigmaStoreEl", &self.tof_nsigma_el),
            ("fTOFNSigmaStorePi", &self.tof_nsigma_pi),
            ("fTOFNSigmaStorePr", &self.tof_nsigma_pr),
            ("fTOFNSigmaStoreDe", &self.tof_nsigma_de),
        ];
        for (column, values) in i8_columns {
            check_len(TABLE, column, n, values.len())?;
        }
        Ok(())
    }
}

/// Primary vertex of a collision. Only z is measured; x and y are zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryVertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PrimaryVertex {
    /// Creates a vertex on the beam axis.
    #[must_use]
    pub fn on_axis(z: f64) -> Self {
        Self { x: 0.0, y: 0.0, z }
    }

    /// Euclidean distance to a point.
    #[must_use]
    pub fn distance_to(&self, x: f64, y: f64, z: f64) -> f64 {
        ((x - self.x).powi(2) + (y - self.y).powi(2) + (z - self.z).powi(2)).sqrt()
    }
}

/// One dataset partition with validated, aligned tables.
#[derive(Debug, Clone)]
pub struct Partition {
    name: String,
    collisions: CollisionTable,
    particles: ParticleTable,
    debug: ParticleDebugTable,
}

impl Partition {
    /// Creates a partition after checking table alignment and collision
    /// back-references.
    ///
    /// # Errors
    /// Returns an error if column lengths differ within or across the
    /// particle tables, or if a row references a collision outside the
    /// event table.
    pub fn new(
        name: impl Into<String>,
        collisions: CollisionTable,
        particles: ParticleTable,
        debug: ParticleDebugTable,
    ) -> Result<Self> {
        collisions.validate()?;
        particles.validate()?;
        debug.validate()?;
        if particles.len() != debug.len() {
            return Err(Error::TableMismatch {
                particles: particles.len(),
                debug: debug.len(),
            });
        }
        for (row, &index) in particles.collision_index.iter().enumerate() {
            let in_range = usize::try_from(index).is_ok_and(|i| i < collisions.len());
            if !in_range {
                return Err(Error::CollisionIndex {
                    row,
                    index,
                    collisions: collisions.len(),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            collisions,
            particles,
            debug,
        })
    }

    /// Partition name (e.g. `DF_2261906078621696`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of particle rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Returns true if the partition has no particle rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[must_use]
    pub fn collisions(&self) -> &CollisionTable {
        &self.collisions
    }

    #[must_use]
    pub fn particles(&self) -> &ParticleTable {
        &self.particles
    }

    #[must_use]
    pub fn debug(&self) -> &ParticleDebugTable {
        &self.debug
    }

    /// Type of the particle at `row`.
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn part_type(&self, row: usize) -> PartType {
        PartType::from_raw(self.particles.part_type[row])
    }

    /// Event-table row of the collision owning particle `row`.
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn collision_of(&self, row: usize) -> usize {
        // Non-negative and in range, checked in `new`
        self.particles.collision_index[row] as usize
    }

    /// Primary vertex of a collision.
    ///
    /// # Panics
    /// Panics if `collision` is out of bounds.
    #[must_use]
    pub fn primary_vertex(&self, collision: usize) -> PrimaryVertex {
        PrimaryVertex::on_axis(f64::from(self.collisions.pos_z[collision]))
    }

    /// Read-only view of one particle row.
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn view(&self, row: usize) -> ParticleView<'_> {
        assert!(row < self.len(), "row {row} out of bounds");
        ParticleView {
            particles: &self.particles,
            debug: &self.debug,
            row,
        }
    }
}

/// Row accessor over the particle and debug tables.
#[derive(Debug, Clone, Copy)]
pub struct ParticleView<'a> {
    particles: &'a ParticleTable,
    debug: &'a ParticleDebugTable,
    row: usize,
}

impl ParticleView<'_> {
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub fn pt(&self) -> f64 {
        f64::from(self.particles.pt[self.row])
    }

    #[must_use]
    pub fn eta(&self) -> f64 {
        f64::from(self.particles.eta[self.row])
    }

    #[must_use]
    pub fn phi(&self) -> f64 {
        f64::from(self.particles.phi[self.row])
    }

    /// Cosine of the pointing angle (V0 rows).
    #[must_use]
    pub fn cos_pa(&self) -> f64 {
        f64::from(self.particles.temp_fit_var[self.row])
    }

    #[must_use]
    pub fn m_lambda(&self) -> f64 {
        f64::from(self.particles.m_lambda[self.row])
    }

    #[must_use]
    pub fn sign(&self) -> f64 {
        f64::from(self.debug.sign[self.row])
    }

    #[must_use]
    pub fn tpc_clusters_found(&self) -> u8 {
        self.debug.tpc_ncls_found[self.row]
    }

    #[must_use]
    pub fn tpc_clusters_findable(&self) -> u8 {
        self.debug.tpc_ncls_findable[self.row]
    }

    #[must_use]
    pub fn tpc_crossed_rows(&self) -> u8 {
        self.debug.tpc_ncls_crossed_rows[self.row]
    }

    #[must_use]
    pub fn tpc_clusters_shared(&self) -> u8 {
        self.debug.tpc_ncls_shared[self.row]
    }

    #[must_use]
    pub fn its_clusters(&self) -> u8 {
        self.debug.its_ncls[self.row]
    }

    #[must_use]
    pub fn its_clusters_inner_barrel(&self) -> u8 {
        self.debug.its_ncls_inner_barrel[self.row]
    }

    #[must_use]
    pub fn dca_xy(&self) -> f64 {
        f64::from(self.debug.dca_xy[self.row])
    }

    #[must_use]
    pub fn dca_z(&self) -> f64 {
        f64::from(self.debug.dca_z[self.row])
    }

    #[must_use]
    pub fn daughter_dca(&self) -> f64 {
        f64::from(self.debug.daugh_dca[self.row])
    }

    #[must_use]
    pub fn trans_radius(&self) -> f64 {
        f64::from(self.debug.trans_radius[self.row])
    }

    /// Decay vertex `(x, y, z)`.
    #[must_use]
    pub fn decay_vertex(&self) -> (f64, f64, f64) {
        (
            f64::from(self.debug.decay_vtx_x[self.row]),
            f64::from(self.debug.decay_vtx_y[self.row]),
            f64::from(self.debug.decay_vtx_z[self.row]),
        )
    }

    #[must_use]
    pub fn m_kaon(&self) -> f64 {
        f64::from(self.debug.m_kaon[self.row])
    }

    /// Stored (compressed) TPC significance.
    #[must_use]
    pub fn tpc_nsigma_code(&self, hypothesis: PidHypothesis) -> i8 {
        self.debug.tpc_nsigma(hypothesis)[self.row]
    }

    /// Stored (compressed) TOF significance.
    #[must_use]
    pub fn tof_nsigma_code(&self, hypothesis: PidHypothesis) -> i8 {
        self.debug.tof_nsigma(hypothesis)[self.row]
    }
}

fn check_len(table: &'static str, column: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::ColumnLength {
            table,
            column,
            expected,
            found,
        })
    }
}
