//! Decoding of compressed particle-identification significances.
//!
//! PID significances (nσ) are stored as signed integers of `W` bytes. The
//! integer range is split into `2^(8W) - 2` bins across `[-6.35, 6.35]`;
//! the two extreme codes act as underflow and overflow.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lower edge of the stored significance range.
pub const BINNED_MIN: f64 = -6.35;
/// Upper edge of the stored significance range.
pub const BINNED_MAX: f64 = 6.35;

/// Decoder for a quantized significance of a given storage width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinDecoder {
    nbins: i64,
    overflow: i64,
    underflow: i64,
    min: f64,
    max: f64,
}

impl BinDecoder {
    /// Decoder for one-byte codes (`i8` storage).
    pub const INT8: Self = Self::for_width(1, BINNED_MIN, BINNED_MAX);

    /// Creates a decoder for codes of `byte_width` bytes spanning `[min, max]`.
    ///
    /// `byte_width` must be between 1 and 4.
    #[must_use]
    pub const fn for_width(byte_width: u32, min: f64, max: f64) -> Self {
        let nbins = (1_i64 << (8 * byte_width)) - 2;
        let overflow = nbins >> 1;
        Self {
            nbins,
            overflow,
            underflow: -overflow,
            min,
            max,
        }
    }

    /// Number of regular bins.
    #[must_use]
    pub fn nbins(&self) -> i64 {
        self.nbins
    }

    /// Width of one bin in units of significance.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.nbins as f64
    }

    /// Decodes a stored code into a significance.
    ///
    /// Codes beyond the underflow/overflow bins clamp to the range edges.
    /// Positive codes map to `(code - 0.5) * width`, all others to
    /// `(code + 0.5) * width`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn decode(&self, code: i64) -> f64 {
        if code < self.underflow {
            self.min
        } else if code > self.overflow {
            self.max
        } else if code > 0 {
            (code as f64 - 0.5) * self.bin_width()
        } else {
            (code as f64 + 0.5) * self.bin_width()
        }
    }
}

/// Decodes a one-byte stored significance.
#[inline]
#[must_use]
pub fn decode_nsigma(code: i8) -> f64 {
    BinDecoder::INT8.decode(i64::from(code))
}

/// Particle-type hypothesis of a stored PID significance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PidHypothesis {
    Electron,
    Pion,
    Proton,
    Deuteron,
}

impl PidHypothesis {
    /// Short suffix used in column names (`fTPCNSigmaStore<suffix>`).
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Electron => "El",
            Self::Pion => "Pi",
            Self::Proton => "Pr",
            Self::Deuteron => "De",
        }
    }
}
