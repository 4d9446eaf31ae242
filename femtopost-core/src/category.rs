//! Closed key space of histogram categories and observables.
//!
//! Every histogram the engine fills is addressed by one of these enums, so
//! a lookup during the row loop cannot miss once the schema is validated.

use crate::pid::PidHypothesis;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Event-level histograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventHist {
    VertexZ,
    Multiplicity,
}

impl EventHist {
    /// All event histograms in storage order.
    pub const ALL: [Self; 2] = [Self::VertexZ, Self::Multiplicity];

    /// Name used in configuration and output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::VertexZ => "VertexZ",
            Self::Multiplicity => "Multiplicity",
        }
    }

    /// Looks up a histogram by its configured name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One-dimensional particle histograms, shared by every bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrackHist {
    Charge,
    Pt,
    Eta,
    Phi,
    DcaXy,
    DcaZ,
    DcaPrimaryVertex,
    DaughterDca,
    TpcClustersFound,
    TpcClustersFindable,
    TpcCrossedRows,
    TpcCrossedRowsOverFindable,
    TpcClustersShared,
    ItsClusters,
    ItsClustersInnerBarrel,
    NSigmaTpc,
    NSigmaTof,
    CosPa,
    TransRadius,
    DecayVertexDist,
    K0InvMass,
    LambdaInvMass,
}

impl TrackHist {
    /// All particle histograms in storage order.
    pub const ALL: [Self; 22] = [
        Self::Charge,
        Self::Pt,
        Self::Eta,
        Self::Phi,
        Self::DcaXy,
        Self::DcaZ,
        Self::DcaPrimaryVertex,
        Self::DaughterDca,
        Self::TpcClustersFound,
        Self::TpcClustersFindable,
        Self::TpcCrossedRows,
        Self::TpcCrossedRowsOverFindable,
        Self::TpcClustersShared,
        Self::ItsClusters,
        Self::ItsClustersInnerBarrel,
        Self::NSigmaTpc,
        Self::NSigmaTof,
        Self::CosPa,
        Self::TransRadius,
        Self::DecayVertexDist,
        Self::K0InvMass,
        Self::LambdaInvMass,
    ];

    /// Name used in configuration and output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Charge => "Charge",
            Self::Pt => "Pt",
            Self::Eta => "Eta",
            Self::Phi => "Phi",
            Self::DcaXy => "DCAxy",
            Self::DcaZ => "DCAz",
            Self::DcaPrimaryVertex => "DCAPrimaryVertex",
            Self::DaughterDca => "DaughterDCA",
            Self::TpcClustersFound => "TPCClustersFound",
            Self::TpcClustersFindable => "TPCClustersFindable",
            Self::TpcCrossedRows => "TPCCrossedRows",
            Self::TpcCrossedRowsOverFindable => "TPCCrossedRowsOverFindable",
            Self::TpcClustersShared => "TPCClustersShared",
            Self::ItsClusters => "ITSClusters",
            Self::ItsClustersInnerBarrel => "ITSClustersIB",
            Self::NSigmaTpc => "NSigmaTPC",
            Self::NSigmaTof => "NSigmaTOF",
            Self::CosPa => "CosPA",
            Self::TransRadius => "TransRadius",
            Self::DecayVertexDist => "DecayVertexDist",
            Self::K0InvMass => "K0InvMass",
            Self::LambdaInvMass => "LambdaInvMass",
        }
    }

    /// Looks up a histogram by its configured name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Two-dimensional particle histograms, shared by every bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrackHist2D {
    /// x = pt, y = DCAz.
    DcaZVsPt,
    /// x = pt, y = DCAxy.
    DcaXyVsPt,
    /// x = total momentum, y = decoded TPC significance.
    NSigmaTpcVsP,
    /// x = total momentum, y = decoded TOF significance.
    NSigmaTofVsP,
}

impl TrackHist2D {
    pub const ALL: [Self; 4] = [
        Self::DcaZVsPt,
        Self::DcaXyVsPt,
        Self::NSigmaTpcVsP,
        Self::NSigmaTofVsP,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DcaZVsPt => "DCAzVsPt",
            Self::DcaXyVsPt => "DCAxyVsPt",
            Self::NSigmaTpcVsP => "NSigmaTPCvsP",
            Self::NSigmaTofVsP => "NSigmaTOFvsP",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Output bucket for particle histograms.
///
/// Selected buckets receive rows that pass their species cuts; raw buckets
/// receive every row that passes the event selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Bucket {
    Proton,
    Deuteron,
    Lambda,
    PosDaughter,
    NegDaughter,
    RawTrack,
    RawLambda,
    RawPosDaughter,
    RawNegDaughter,
}

impl Bucket {
    /// All buckets in output order.
    pub const ALL: [Self; 9] = [
        Self::Proton,
        Self::Deuteron,
        Self::Lambda,
        Self::PosDaughter,
        Self::NegDaughter,
        Self::RawTrack,
        Self::RawLambda,
        Self::RawPosDaughter,
        Self::RawNegDaughter,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Proton => "Proton",
            Self::Deuteron => "Deuteron",
            Self::Lambda => "Lambda",
            Self::PosDaughter => "PosDaughter",
            Self::NegDaughter => "NegDaughter",
            Self::RawTrack => "RawTrack",
            Self::RawLambda => "RawLambda",
            Self::RawPosDaughter => "RawPosDaughter",
            Self::RawNegDaughter => "RawNegDaughter",
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// PID hypothesis whose significances are filled into this bucket.
    ///
    /// Buckets without a hypothesis fill zero significances.
    #[must_use]
    pub fn hypothesis(self) -> Option<PidHypothesis> {
        match self {
            Self::Proton | Self::PosDaughter | Self::RawPosDaughter => Some(PidHypothesis::Proton),
            Self::Deuteron => Some(PidHypothesis::Deuteron),
            Self::NegDaughter | Self::RawNegDaughter => Some(PidHypothesis::Pion),
            Self::Lambda | Self::RawTrack | Self::RawLambda => None,
        }
    }
}
