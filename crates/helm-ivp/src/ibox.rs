//! `IvpBox` — an axis-aligned box in grid-index space carrying a value.

use std::fmt;

/// Per-axis index interval.
///
/// Edges may be open or closed.  The reflector only ever builds closed
/// intervals; open edges are accepted from external producers and every
/// query works on the effective closed range [`first`](Self::first)
/// ..= [`last`](Self::last).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub lo:        u32,
    pub hi:        u32,
    pub lo_closed: bool,
    pub hi_closed: bool,
}

impl Interval {
    #[inline]
    pub fn closed(lo: u32, hi: u32) -> Self {
        Self { lo, hi, lo_closed: true, hi_closed: true }
    }

    /// Lowest index inside the interval.
    #[inline]
    pub fn first(&self) -> u32 {
        if self.lo_closed { self.lo } else { self.lo + 1 }
    }

    /// Highest index inside the interval.
    #[inline]
    pub fn last(&self) -> u32 {
        if self.hi_closed { self.hi } else { self.hi.saturating_sub(1) }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.first() > self.last() || (!self.hi_closed && self.hi == 0)
    }

    /// Number of indices covered.
    #[inline]
    pub fn width(&self) -> u32 {
        if self.is_empty() { 0 } else { self.last() - self.first() + 1 }
    }
}

/// A box with degree-0 (constant) or degree-1 (affine) weights.
///
/// Degree 1 stores `dims` slopes followed by an intercept, all in native
/// units: `value(x) = wts[0]*x0 + … + wts[d-1]*x(d-1) + wts[d]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IvpBox {
    bounds: Vec<Interval>,
    wts:    Vec<f64>,
    degree: u8,
}

impl IvpBox {
    /// Closed box from `(lo, hi)` index pairs, weight 0.
    pub fn closed(bounds: Vec<(u32, u32)>) -> Self {
        Self {
            bounds: bounds.into_iter().map(|(lo, hi)| Interval::closed(lo, hi)).collect(),
            wts:    vec![0.0],
            degree: 0,
        }
    }

    /// Box from explicit intervals, weight 0.
    pub fn from_intervals(bounds: Vec<Interval>) -> Self {
        Self { bounds, wts: vec![0.0], degree: 0 }
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.bounds.len()
    }

    #[inline]
    pub fn interval(&self, d: usize) -> &Interval {
        &self.bounds[d]
    }

    #[inline]
    pub fn lo(&self, d: usize) -> u32 {
        self.bounds[d].first()
    }

    #[inline]
    pub fn hi(&self, d: usize) -> u32 {
        self.bounds[d].last()
    }

    #[inline]
    pub fn width(&self, d: usize) -> u32 {
        self.bounds[d].width()
    }

    pub fn degree(&self) -> u8 {
        self.degree
    }

    pub fn weights(&self) -> &[f64] {
        &self.wts
    }

    /// Number of grid points inside the box.
    pub fn volume(&self) -> u64 {
        self.bounds.iter().map(|b| b.width() as u64).product()
    }

    /// Grid point at the (floor) middle of every axis.
    pub fn center_index(&self) -> Vec<u32> {
        (0..self.dims()).map(|d| (self.lo(d) + self.hi(d)) / 2).collect()
    }

    pub fn contains(&self, idx: &[u32]) -> bool {
        idx.len() == self.dims()
            && (0..self.dims()).all(|d| idx[d] >= self.lo(d) && idx[d] <= self.hi(d))
    }

    pub fn intersects(&self, other: &IvpBox) -> bool {
        self.dims() == other.dims()
            && (0..self.dims()).all(|d| self.lo(d) <= other.hi(d) && other.lo(d) <= self.hi(d))
    }

    /// Overlap of the two boxes, weight 0.
    pub fn intersection(&self, other: &IvpBox) -> Option<IvpBox> {
        if !self.intersects(other) {
            return None;
        }
        Some(IvpBox::closed(
            (0..self.dims())
                .map(|d| (self.lo(d).max(other.lo(d)), self.hi(d).min(other.hi(d))))
                .collect(),
        ))
    }

    /// Split `self` into the part inside `region` and up to `2 * dims`
    /// disjoint pieces outside it.
    ///
    /// Returns `(outside, inside)`.  If the boxes do not intersect, `outside`
    /// holds a single copy of `self` and `inside` is `None`.
    pub fn subtract(&self, region: &IvpBox) -> (Vec<IvpBox>, Option<IvpBox>) {
        if !self.intersects(region) {
            return (vec![self.plain()], None);
        }
        let mut rest: Vec<(u32, u32)> = (0..self.dims()).map(|d| (self.lo(d), self.hi(d))).collect();
        let mut outside = Vec::new();
        for d in 0..self.dims() {
            let (lo, hi) = rest[d];
            if lo < region.lo(d) {
                let mut piece = rest.clone();
                piece[d] = (lo, region.lo(d) - 1);
                outside.push(IvpBox::closed(piece));
                rest[d].0 = region.lo(d);
            }
            if hi > region.hi(d) {
                let mut piece = rest.clone();
                piece[d] = (region.hi(d) + 1, hi);
                outside.push(IvpBox::closed(piece));
                rest[d].1 = region.hi(d);
            }
        }
        (outside, Some(IvpBox::closed(rest)))
    }

    /// Halve the box along axis `d`.  `None` if that axis is one point wide.
    pub fn split(&self, d: usize) -> Option<(IvpBox, IvpBox)> {
        if self.width(d) < 2 {
            return None;
        }
        let mid = self.lo(d) + self.width(d) / 2;
        let mut a: Vec<(u32, u32)> = (0..self.dims()).map(|k| (self.lo(k), self.hi(k))).collect();
        let mut b = a.clone();
        a[d].1 = mid - 1;
        b[d].0 = mid;
        Some((IvpBox::closed(a), IvpBox::closed(b)))
    }

    /// Axis with the most grid points (first on ties).
    pub fn widest_axis(&self) -> usize {
        (0..self.dims())
            .max_by(|&a, &b| self.width(a).cmp(&self.width(b)).then(b.cmp(&a)))
            .unwrap_or(0)
    }

    /// Set a constant weight.
    pub fn set_weight(&mut self, w: f64) {
        self.degree = 0;
        self.wts = vec![w];
    }

    /// Set affine coefficients: `dims` slopes followed by the intercept.
    pub fn set_linear(&mut self, coefs: Vec<f64>) {
        debug_assert_eq!(coefs.len(), self.dims() + 1);
        self.degree = 1;
        self.wts = coefs;
    }

    /// Value of the box at native coordinates `x`.
    pub fn eval(&self, x: &[f64]) -> f64 {
        match self.degree {
            0 => self.wts[0],
            _ => {
                let d = self.dims();
                self.wts[..d].iter().zip(x).map(|(m, v)| m * v).sum::<f64>() + self.wts[d]
            }
        }
    }

    fn plain(&self) -> IvpBox {
        IvpBox::closed((0..self.dims()).map(|d| (self.lo(d), self.hi(d))).collect())
    }
}

impl fmt::Display for IvpBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in 0..self.dims() {
            if d > 0 {
                f.write_str(",")?;
            }
            write!(f, "[{}..{}]", self.lo(d), self.hi(d))?;
        }
        write!(f, " wts={:?}", self.wts)
    }
}
