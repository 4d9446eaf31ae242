//! Declarative species selections.
//!
//! Every species is described by an ordered list of [`CutRule`]s over
//! [`Observable`]s and evaluated by a single interpreter. Rules are
//! checked in order and evaluation stops at the first failure. All ranges
//! are closed; a value that is NaN or infinite never lies inside one.

use crate::derived;
use crate::error::Result;
use femtopost_config::{CutRange, CutSet, Species};
use femtopost_core::{CollisionTable, ParticleView, PidHypothesis, PrimaryVertex};
use std::collections::BTreeSet;

/// A per-row quantity a cut can be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observable {
    Charge,
    Pt,
    Eta,
    DcaXy,
    DcaZ,
    /// Quadrature of DCAxy and DCAz.
    DcaPrimaryVertex,
    DaughterDca,
    TpcClustersFound,
    TpcCrossedRows,
    /// Unguarded crossed/findable ratio.
    TpcCrossedRowsOverFindable,
    TpcClustersShared,
    ItsClusters,
    ItsClustersInnerBarrel,
    CosPa,
    TransRadius,
    DecayVertexDist,
    LambdaInvMass,
    K0InvMass,
    /// Total momentum `pt * cosh(eta)`.
    Momentum,
    /// Decoded TPC significance.
    NSigmaTpc(PidHypothesis),
    /// Quadrature of the decoded TPC and TOF significances.
    NSigmaTpcTof(PidHypothesis),
}

impl Observable {
    /// Value of the observable for one row.
    #[must_use]
    pub fn value(self, view: &ParticleView<'_>, vertex: &PrimaryVertex) -> f64 {
        match self {
            Self::Charge => view.sign(),
            Self::Pt => view.pt(),
            Self::Eta => view.eta(),
            Self::DcaXy => view.dca_xy(),
            Self::DcaZ => view.dca_z(),
            Self::DcaPrimaryVertex => derived::dca_primary_vertex(view),
            Self::DaughterDca => view.daughter_dca(),
            Self::TpcClustersFound => f64::from(view.tpc_clusters_found()),
            Self::TpcCrossedRows => f64::from(view.tpc_crossed_rows()),
            Self::TpcCrossedRowsOverFindable => derived::crossed_rows_over_findable(view),
            Self::TpcClustersShared => f64::from(view.tpc_clusters_shared()),
            Self::ItsClusters => f64::from(view.its_clusters()),
            Self::ItsClustersInnerBarrel => f64::from(view.its_clusters_inner_barrel()),
            Self::CosPa => view.cos_pa(),
            Self::TransRadius => view.trans_radius(),
            Self::DecayVertexDist => derived::decay_vertex_distance(view, vertex),
            Self::LambdaInvMass => view.m_lambda(),
            Self::K0InvMass => view.m_kaon(),
            Self::Momentum => derived::total_momentum(view),
            Self::NSigmaTpc(h) => derived::nsigma_tpc(view, h),
            Self::NSigmaTpcTof(h) => derived::nsigma_tpc_tof(view, h),
        }
    }
}

/// One step of a species selection.
#[derive(Debug, Clone, PartialEq)]
pub enum CutRule {
    /// Pass iff the observable lies inside the range.
    Require { observable: Observable, range: CutRange },
    /// Pass iff the observable lies outside the range.
    Reject { observable: Observable, range: CutRange },
    /// Pass iff none of the observables lies inside the range.
    RejectAny {
        observables: Vec<Observable>,
        range: CutRange,
    },
    /// Apply `below` if the observable is strictly below `threshold`,
    /// `above` otherwise.
    Branch {
        observable: Observable,
        threshold: f64,
        below: Box<CutRule>,
        above: Box<CutRule>,
    },
}

impl CutRule {
    /// Evaluates the rule for one row.
    #[must_use]
    pub fn passes(&self, view: &ParticleView<'_>, vertex: &PrimaryVertex) -> bool {
        match self {
            Self::Require { observable, range } => range.contains(observable.value(view, vertex)),
            Self::Reject { observable, range } => !range.contains(observable.value(view, vertex)),
            Self::RejectAny { observables, range } => observables
                .iter()
                .all(|o| !range.contains(o.value(view, vertex))),
            Self::Branch {
                observable,
                threshold,
                below,
                above,
            } => {
                if observable.value(view, vertex) < *threshold {
                    below.passes(view, vertex)
                } else {
                    above.passes(view, vertex)
                }
            }
        }
    }
}

/// Ordered rule list of one species.
#[derive(Debug, Clone, PartialEq)]
pub struct CutSpec {
    species: Species,
    rules: Vec<CutRule>,
}

impl CutSpec {
    #[must_use]
    pub fn new(species: Species, rules: Vec<CutRule>) -> Self {
        Self { species, rules }
    }

    #[must_use]
    pub fn species(&self) -> Species {
        self.species
    }

    #[must_use]
    pub fn rules(&self) -> &[CutRule] {
        &self.rules
    }

    /// True iff every rule passes.
    #[must_use]
    pub fn accepts(&self, view: &ParticleView<'_>, vertex: &PrimaryVertex) -> bool {
        self.rules.iter().all(|rule| rule.passes(view, vertex))
    }

    /// Proton selection: track quality, then a momentum branch between the
    /// TPC-only and the combined TPC+TOF significance window.
    ///
    /// # Errors
    /// Returns an error if a required cut is missing.
    pub fn proton(cuts: &CutSet) -> Result<Self> {
        let mut reader = CutReader::new(cuts, Species::Proton);
        let mut rules = track_quality(&mut reader)?;
        rules.push(CutRule::Branch {
            observable: Observable::Momentum,
            threshold: cuts.proton_p_tpc(),
            below: Box::new(reader.require(
                "NSigmaTPC",
                Observable::NSigmaTpc(PidHypothesis::Proton),
            )?),
            above: Box::new(reader.require(
                "NSigmaTPCTOF",
                Observable::NSigmaTpcTof(PidHypothesis::Proton),
            )?),
        });
        Ok(reader.finish(rules))
    }

    /// Deuteron selection: track quality plus ITS clusters, the deuteron
    /// TPC window, and a veto if the proton, pion or electron TPC
    /// significance falls in the rejection band.
    ///
    /// # Errors
    /// Returns an error if a required cut is missing.
    pub fn deuteron(cuts: &CutSet) -> Result<Self> {
        let mut reader = CutReader::new(cuts, Species::Deuteron);
        let mut rules = track_quality(&mut reader)?;
        rules.push(reader.require("ITSClusters", Observable::ItsClusters)?);
        rules.push(reader.require("ITSClustersIB", Observable::ItsClustersInnerBarrel)?);
        rules.push(reader.require(
            "NSigmaTPC",
            Observable::NSigmaTpc(PidHypothesis::Deuteron),
        )?);
        rules.push(CutRule::RejectAny {
            observables: vec![
                Observable::NSigmaTpc(PidHypothesis::Proton),
                Observable::NSigmaTpc(PidHypothesis::Pion),
                Observable::NSigmaTpc(PidHypothesis::Electron),
            ],
            range: reader.range("TPCRejection")?,
        });
        Ok(reader.finish(rules))
    }

    /// Lambda selection on the V0 row, with a K0 mass veto.
    ///
    /// # Errors
    /// Returns an error if a required cut is missing.
    pub fn lambda(cuts: &CutSet) -> Result<Self> {
        let mut reader = CutReader::new(cuts, Species::Lambda);
        let rules = vec![
            reader.require("Pt", Observable::Pt)?,
            reader.require("Eta", Observable::Eta)?,
            reader.require("CosPA", Observable::CosPa)?,
            reader.require("TransRadius", Observable::TransRadius)?,
            reader.require("DecayVertexDist", Observable::DecayVertexDist)?,
            reader.require("DaughterDCA", Observable::DaughterDca)?,
            reader.require("LambdaInvMass", Observable::LambdaInvMass)?,
            reader.reject("K0InvMass", Observable::K0InvMass)?,
        ];
        Ok(reader.finish(rules))
    }

    /// V0 daughter selection for `species` (`PosDaughter` or
    /// `NegDaughter`) under `hypothesis`. The DCA to the primary vertex
    /// must lie outside the configured band.
    ///
    /// # Errors
    /// Returns an error if a required cut is missing.
    pub fn daughter(cuts: &CutSet, species: Species, hypothesis: PidHypothesis) -> Result<Self> {
        let mut reader = CutReader::new(cuts, species);
        let rules = vec![
            reader.require("Charge", Observable::Charge)?,
            reader.require("Eta", Observable::Eta)?,
            reader.require("TPCClustersFound", Observable::TpcClustersFound)?,
            reader.require("NSigmaTPC", Observable::NSigmaTpc(hypothesis))?,
            reader.reject("DCAPrimaryVertex", Observable::DcaPrimaryVertex)?,
        ];
        Ok(reader.finish(rules))
    }
}

fn track_quality(reader: &mut CutReader<'_>) -> Result<Vec<CutRule>> {
    Ok(vec![
        reader.require("Charge", Observable::Charge)?,
        reader.require("Pt", Observable::Pt)?,
        reader.require("Eta", Observable::Eta)?,
        reader.require("DCAz", Observable::DcaZ)?,
        reader.require("DCAxy", Observable::DcaXy)?,
        reader.require("TPCClustersFound", Observable::TpcClustersFound)?,
        reader.require("TPCCrossedRows", Observable::TpcCrossedRows)?,
        reader.require(
            "TPCCrossedRowsOverFindable",
            Observable::TpcCrossedRowsOverFindable,
        )?,
        reader.require("TPCClustersShared", Observable::TpcClustersShared)?,
    ])
}

/// Reads the cuts of one species and remembers which were used.
struct CutReader<'a> {
    cuts: &'a CutSet,
    species: Species,
    used: BTreeSet<&'static str>,
}

impl<'a> CutReader<'a> {
    fn new(cuts: &'a CutSet, species: Species) -> Self {
        Self {
            cuts,
            species,
            used: BTreeSet::new(),
        }
    }

    fn range(&mut self, name: &'static str) -> Result<CutRange> {
        self.used.insert(name);
        Ok(self.cuts.get(self.species, name)?)
    }

    fn require(&mut self, name: &'static str, observable: Observable) -> Result<CutRule> {
        Ok(CutRule::Require {
            observable,
            range: self.range(name)?,
        })
    }

    fn reject(&mut self, name: &'static str, observable: Observable) -> Result<CutRule> {
        Ok(CutRule::Reject {
            observable,
            range: self.range(name)?,
        })
    }

    fn finish(self, rules: Vec<CutRule>) -> CutSpec {
        for name in self.cuts.names(self.species) {
            if !self.used.contains(name) {
                log::debug!("cut {}/{name} is configured but unused", self.species);
            }
        }
        CutSpec::new(self.species, rules)
    }
}

/// Event gate on the vertex z of the owning collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventCut {
    vertex_z: CutRange,
}

impl EventCut {
    #[must_use]
    pub fn new(vertex_z: CutRange) -> Self {
        Self { vertex_z }
    }

    /// # Errors
    /// Returns an error if `Event/VertexZ` is missing.
    pub fn from_cut_set(cuts: &CutSet) -> Result<Self> {
        Ok(Self::new(cuts.get(Species::Event, "VertexZ")?))
    }

    /// True iff the collision's vertex z lies inside the range.
    ///
    /// # Panics
    /// Panics if `collision` is out of bounds.
    #[must_use]
    pub fn accepts(&self, collisions: &CollisionTable, collision: usize) -> bool {
        self.vertex_z
            .contains(f64::from(collisions.pos_z[collision]))
    }
}

/// Every selection of a run, built once before the row loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionCuts {
    pub event: EventCut,
    pub proton: CutSpec,
    pub deuteron: CutSpec,
    pub lambda: CutSpec,
    pub pos_daughter: CutSpec,
    pub neg_daughter: CutSpec,
}

impl SelectionCuts {
    /// Builds every species selection from the cut document.
    ///
    /// The positive daughter is tested under the proton hypothesis, the
    /// negative daughter under the pion hypothesis.
    ///
    /// # Errors
    /// Returns the first missing cut.
    pub fn from_cut_set(cuts: &CutSet) -> Result<Self> {
        let selection = Self {
            event: EventCut::from_cut_set(cuts)?,
            proton: CutSpec::proton(cuts)?,
            deuteron: CutSpec::deuteron(cuts)?,
            lambda: CutSpec::lambda(cuts)?,
            pos_daughter: CutSpec::daughter(cuts, Species::PosDaughter, PidHypothesis::Proton)?,
            neg_daughter: CutSpec::daughter(cuts, Species::NegDaughter, PidHypothesis::Pion)?,
        };
        log::debug!(
            "selections: proton {} rules (P threshold {}), deuteron {}, lambda {}, daughters {}/{}",
            selection.proton.rules().len(),
            cuts.proton_p_tpc(),
            selection.deuteron.rules().len(),
            selection.lambda.rules().len(),
            selection.pos_daughter.rules().len(),
            selection.neg_daughter.rules().len()
        );
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{standard_cuts, Fixture, RowSpec};
    use femtopost_config::Error as ConfigError;

    fn vertex() -> PrimaryVertex {
        PrimaryVertex::on_axis(0.0)
    }

    fn accepts(spec: &CutSpec, row: RowSpec) -> bool {
        let partition = Fixture::new().collision(0.0, 10.0).row(row).build();
        spec.accepts(&partition.view(0), &vertex())
    }

    #[test]
    fn test_require_is_inclusive() {
        let rule = CutRule::Require {
            observable: Observable::Pt,
            range: CutRange::new(0.5, 1.0),
        };
        let partition = Fixture::new()
            .collision(0.0, 10.0)
            .row(RowSpec { pt: 0.5, ..RowSpec::track() })
            .row(RowSpec { pt: 1.0, ..RowSpec::track() })
            .row(RowSpec { pt: 1.01, ..RowSpec::track() })
            .build();
        assert!(rule.passes(&partition.view(0), &vertex()));
        assert!(rule.passes(&partition.view(1), &vertex()));
        assert!(!rule.passes(&partition.view(2), &vertex()));
    }

    #[test]
    fn test_proton_accepts_standard_track() {
        let proton = CutSpec::proton(&standard_cuts()).unwrap();
        assert!(accepts(&proton, RowSpec::track()));
        assert!(!accepts(&proton, RowSpec { sign: -1, ..RowSpec::track() }));
        assert!(!accepts(&proton, RowSpec { tpc_shared: 100, ..RowSpec::track() }));
    }

    #[test]
    fn test_proton_zero_findable_is_rejected() {
        let proton = CutSpec::proton(&standard_cuts()).unwrap();
        assert!(!accepts(&proton, RowSpec { tpc_findable: 0, ..RowSpec::track() }));
        assert!(!accepts(
            &proton,
            RowSpec {
                tpc_findable: 0,
                tpc_crossed_rows: 0,
                ..RowSpec::track()
            }
        ));
    }

    #[test]
    fn test_deuteron_zero_findable_is_rejected() {
        let deuteron = CutSpec::deuteron(&standard_cuts()).unwrap();
        assert!(accepts(&deuteron, RowSpec::deuteron()));
        assert!(!accepts(
            &deuteron,
            RowSpec {
                tpc_findable: 0,
                ..RowSpec::deuteron()
            }
        ));
    }

    #[test]
    fn test_proton_momentum_branch() {
        // Threshold 0.75; TPC window [-3, 3], TPC+TOF window [0, 3]
        let proton = CutSpec::proton(&standard_cuts()).unwrap();

        // P = 0.6: only TPC is checked, TOF may be anything
        let low = RowSpec {
            pt: 0.6,
            eta: 0.0,
            tpc: [0, 0, 40, 0],
            tof: [0, 0, 127, 0],
            ..RowSpec::track()
        };
        assert!(accepts(&proton, low));

        // P = 1.0: TPC 1.975 and TOF 2.475 combine to 3.17 > 3
        let high = RowSpec {
            pt: 1.0,
            eta: 0.0,
            tpc: [0, 0, 40, 0],
            tof: [0, 0, 50, 0],
            ..RowSpec::track()
        };
        assert!(!accepts(&proton, high));
        assert!(accepts(
            &proton,
            RowSpec {
                tof: [0, 0, 0, 0],
                ..high
            }
        ));
    }

    #[test]
    fn test_proton_threshold_uses_combined_window() {
        let mut cuts = standard_cuts_json();
        cuts["Proton_PTPC"] = serde_json::json!(1.0);
        let proton = CutSpec::proton(&CutSet::from_json(&cuts.to_string()).unwrap()).unwrap();
        // P exactly at the threshold: TPC alone would pass, combination fails
        let at = RowSpec {
            pt: 1.0,
            eta: 0.0,
            tpc: [0, 0, 40, 0],
            tof: [0, 0, 50, 0],
            ..RowSpec::track()
        };
        assert!(!accepts(&proton, at));
    }

    #[test]
    fn test_deuteron_rejection_band() {
        let deuteron = CutSpec::deuteron(&standard_cuts()).unwrap();
        // Deuteron-like: TPC(de) ~ 0, others far away
        let candidate = RowSpec::deuteron();
        assert!(accepts(&deuteron, candidate));
        // Any one of proton, pion or electron inside the band vetoes
        for slot in 0..3 {
            let mut tpc = candidate.tpc;
            tpc[slot] = 10;
            assert!(!accepts(&deuteron, RowSpec { tpc, ..candidate }), "slot {slot}");
        }
        assert!(!accepts(&deuteron, RowSpec { its: 1, ..candidate }));
    }

    #[test]
    fn test_lambda_k0_veto() {
        let lambda = CutSpec::lambda(&standard_cuts()).unwrap();
        assert!(accepts(&lambda, RowSpec::v0()));
        assert!(!accepts(&lambda, RowSpec { m_kaon: 0.497, ..RowSpec::v0() }));
        assert!(!accepts(&lambda, RowSpec { cos_pa: 0.9, ..RowSpec::v0() }));
    }

    #[test]
    fn test_lambda_decay_vertex_uses_collision_z() {
        let lambda = CutSpec::lambda(&standard_cuts()).unwrap();
        let partition = Fixture::new().collision(0.0, 10.0).row(RowSpec::v0()).build();
        let view = partition.view(0);
        assert!(lambda.accepts(&view, &PrimaryVertex::on_axis(0.0)));
        // Decay vertex at (3, 4, 0): distance 5 from origin, 13 from z = 12
        assert!(!lambda.accepts(&view, &PrimaryVertex::on_axis(12.0)));
    }

    #[test]
    fn test_daughter_dca_is_a_rejection_band() {
        let pos = CutSpec::daughter(&standard_cuts(), Species::PosDaughter, PidHypothesis::Proton)
            .unwrap();
        assert!(accepts(&pos, RowSpec::pos_daughter()));
        assert!(!accepts(
            &pos,
            RowSpec {
                dca_xy: 0.01,
                dca_z: 0.01,
                ..RowSpec::pos_daughter()
            }
        ));
    }

    #[test]
    fn test_missing_cut_is_fatal() {
        let mut cuts = standard_cuts_json();
        cuts["Lambda"].as_object_mut().unwrap().remove("K0InvMass");
        let cuts = CutSet::from_json(&cuts.to_string()).unwrap();
        let err = SelectionCuts::from_cut_set(&cuts).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Config(ConfigError::MissingCut {
                species: Species::Lambda,
                ..
            })
        ));
    }

    #[test]
    fn test_event_cut_bounds() {
        let cut = EventCut::from_cut_set(&standard_cuts()).unwrap();
        let mut collisions = CollisionTable::default();
        collisions.push(10.0, 0.0);
        collisions.push(10.5, 0.0);
        assert!(cut.accepts(&collisions, 0));
        assert!(!cut.accepts(&collisions, 1));
    }

    fn standard_cuts_json() -> serde_json::Value {
        crate::testing::standard_cuts_json()
    }
}
