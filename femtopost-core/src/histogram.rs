//! Fixed-binning histograms with under/overflow.
//!
//! Bin lookup follows the usual fixed-axis convention: `x < min` lands in
//! underflow, `x >= max` (and NaN) in overflow, everything else in one of
//! `bins` equal-width bins.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed-width binning of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Axis {
    bins: usize,
    min: f64,
    max: f64,
}

impl Axis {
    /// Creates an axis of `bins` equal bins spanning `[min, max)`.
    ///
    /// # Errors
    /// Returns an error if `bins` is zero or the range is empty or not finite.
    pub fn new(bins: usize, min: f64, max: f64) -> Result<Self> {
        if bins == 0 {
            return Err(Error::InvalidAxis("bin count must be positive".to_string()));
        }
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err(Error::InvalidAxis(format!(
                "range [{min}, {max}) is empty or not finite"
            )));
        }
        Ok(Self { bins, min, max })
    }

    #[must_use]
    pub fn bins(&self) -> usize {
        self.bins
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Width of one bin.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.bins as f64
    }

    /// Slot of `x` including flows: 0 is underflow, `bins + 1` is overflow.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn slot(&self, x: f64) -> usize {
        if x < self.min {
            return 0;
        }
        if x >= self.max || x.is_nan() {
            return self.bins + 1;
        }
        let bin = ((x - self.min) / (self.max - self.min) * self.bins as f64) as usize;
        // Rounding near max can push the index one bin too far
        1 + bin.min(self.bins - 1)
    }

    /// Lower edge of in-range bin `i` (0-based).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_low_edge(&self, i: usize) -> f64 {
        self.min + i as f64 * self.bin_width()
    }

    fn slots(&self) -> usize {
        self.bins + 2
    }
}

/// One-dimensional histogram.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hist1D {
    name: String,
    axis: Axis,
    /// Counts per slot, including underflow (first) and overflow (last).
    counts: Vec<f64>,
    entries: u64,
}

impl Hist1D {
    #[must_use]
    pub fn new(name: impl Into<String>, axis: Axis) -> Self {
        Self {
            name: name.into(),
            axis,
            counts: vec![0.0; axis.slots()],
            entries: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// Adds one unit-weight entry.
    pub fn fill(&mut self, x: f64) {
        self.counts[self.axis.slot(x)] += 1.0;
        self.entries += 1;
    }

    /// Content of in-range bin `i` (0-based).
    ///
    /// # Panics
    /// Panics if `i >= bins`.
    #[must_use]
    pub fn bin_content(&self, i: usize) -> f64 {
        assert!(i < self.axis.bins, "bin {i} out of range");
        self.counts[i + 1]
    }

    /// In-range bin contents.
    #[must_use]
    pub fn contents(&self) -> &[f64] {
        &self.counts[1..=self.axis.bins]
    }

    /// 0-based in-range bin of `x`, or `None` for under/overflow.
    #[must_use]
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        match self.axis.slot(x) {
            0 => None,
            s if s > self.axis.bins => None,
            s => Some(s - 1),
        }
    }

    #[must_use]
    pub fn underflow(&self) -> f64 {
        self.counts[0]
    }

    #[must_use]
    pub fn overflow(&self) -> f64 {
        self.counts[self.axis.bins + 1]
    }

    /// Number of fills, including under/overflow.
    #[must_use]
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Sum of in-range bin contents.
    #[must_use]
    pub fn integral(&self) -> f64 {
        self.contents().iter().sum()
    }

    /// Adds the contents of another histogram with identical binning.
    ///
    /// # Errors
    /// Returns an error if the binning differs.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.axis != other.axis {
            return Err(Error::BinningMismatch {
                name: self.name.clone(),
            });
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.entries += other.entries;
        Ok(())
    }
}

/// Two-dimensional histogram.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hist2D {
    name: String,
    x_axis: Axis,
    y_axis: Axis,
    /// Counts in row-major order over `[x slot][y slot]`, flows included.
    counts: Vec<f64>,
    entries: u64,
}

impl Hist2D {
    #[must_use]
    pub fn new(name: impl Into<String>, x_axis: Axis, y_axis: Axis) -> Self {
        Self {
            name: name.into(),
            x_axis,
            y_axis,
            counts: vec![0.0; x_axis.slots() * y_axis.slots()],
            entries: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn x_axis(&self) -> &Axis {
        &self.x_axis
    }

    #[must_use]
    pub fn y_axis(&self) -> &Axis {
        &self.y_axis
    }

    #[inline]
    fn index(&self, x_slot: usize, y_slot: usize) -> usize {
        x_slot * self.y_axis.slots() + y_slot
    }

    /// Adds one unit-weight entry at `(x, y)`.
    pub fn fill(&mut self, x: f64, y: f64) {
        let idx = self.index(self.x_axis.slot(x), self.y_axis.slot(y));
        self.counts[idx] += 1.0;
        self.entries += 1;
    }

    /// Content of in-range cell `(ix, iy)` (0-based).
    ///
    /// # Panics
    /// Panics if either index is out of range.
    #[must_use]
    pub fn bin_content(&self, ix: usize, iy: usize) -> f64 {
        assert!(
            ix < self.x_axis.bins && iy < self.y_axis.bins,
            "cell ({ix}, {iy}) out of range"
        );
        self.counts[self.index(ix + 1, iy + 1)]
    }

    /// In-range cell contents, `x` major.
    #[must_use]
    pub fn contents(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.x_axis.bins * self.y_axis.bins);
        for ix in 1..=self.x_axis.bins {
            let start = self.index(ix, 1);
            out.extend_from_slice(&self.counts[start..start + self.y_axis.bins]);
        }
        out
    }

    /// Number of fills, including flows.
    #[must_use]
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Sum of in-range cell contents.
    #[must_use]
    pub fn integral(&self) -> f64 {
        self.contents().iter().sum()
    }

    /// Adds the contents of another histogram with identical binning.
    ///
    /// # Errors
    /// Returns an error if either axis differs.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.x_axis != other.x_axis || self.y_axis != other.y_axis {
            return Err(Error::BinningMismatch {
                name: self.name.clone(),
            });
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.entries += other.entries;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_axis_validation() {
        assert!(Axis::new(0, 0.0, 1.0).is_err());
        assert!(Axis::new(10, 1.0, 1.0).is_err());
        assert!(Axis::new(10, 2.0, 1.0).is_err());
        assert!(Axis::new(10, f64::NEG_INFINITY, 1.0).is_err());
        assert!(Axis::new(10, -1.0, 1.0).is_ok());
    }

    #[test]
    fn test_axis_slots() {
        let axis = Axis::new(10, 0.0, 10.0).unwrap();
        assert_eq!(axis.slot(-0.1), 0);
        assert_eq!(axis.slot(0.0), 1);
        assert_eq!(axis.slot(9.999), 10);
        assert_eq!(axis.slot(10.0), 11);
        assert_eq!(axis.slot(f64::NAN), 11);
        assert_abs_diff_eq!(axis.bin_low_edge(3), 3.0);
    }

    #[test]
    fn test_hist1d_fill_and_flows() {
        let mut h = Hist1D::new("Proton_Pt", Axis::new(4, 0.0, 4.0).unwrap());
        h.fill(0.5);
        h.fill(0.7);
        h.fill(3.2);
        h.fill(-1.0);
        h.fill(4.0);
        assert_eq!(h.contents(), &[2.0, 0.0, 0.0, 1.0]);
        assert_abs_diff_eq!(h.underflow(), 1.0);
        assert_abs_diff_eq!(h.overflow(), 1.0);
        assert_eq!(h.entries(), 5);
        assert_abs_diff_eq!(h.integral(), 3.0);
        assert_eq!(h.find_bin(3.5), Some(3));
        assert_eq!(h.find_bin(4.5), None);
    }

    #[test]
    fn test_hist1d_merge() {
        let axis = Axis::new(2, 0.0, 2.0).unwrap();
        let mut a = Hist1D::new("a", axis);
        let mut b = Hist1D::new("a", axis);
        a.fill(0.5);
        b.fill(0.5);
        b.fill(1.5);
        a.merge(&b).unwrap();
        assert_eq!(a.contents(), &[2.0, 1.0]);
        assert_eq!(a.entries(), 3);

        let c = Hist1D::new("a", Axis::new(3, 0.0, 2.0).unwrap());
        assert!(matches!(a.merge(&c), Err(Error::BinningMismatch { .. })));
    }

    #[test]
    fn test_hist2d_fill() {
        let mut h = Hist2D::new(
            "Proton_DCAzVsPt",
            Axis::new(2, 0.0, 2.0).unwrap(),
            Axis::new(3, -1.5, 1.5).unwrap(),
        );
        h.fill(1.5, 0.0);
        h.fill(1.5, 0.2);
        h.fill(0.5, -1.0);
        h.fill(5.0, 0.0);
        assert_abs_diff_eq!(h.bin_content(1, 1), 2.0);
        assert_abs_diff_eq!(h.bin_content(0, 0), 1.0);
        assert_abs_diff_eq!(h.integral(), 3.0);
        assert_eq!(h.entries(), 4);
        assert_eq!(h.contents(), vec![1.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
    }
}
