//! `PieceFunction` — the piecewise decision function handed to the optimizer.

use crate::{DecisionDomain, IvpBox, IvpError, IvpResult};

/// A disjoint union of weighted boxes over a [`DecisionDomain`], plus the
/// priority weight of the behavior that produced it.
///
/// Built fresh by the reflector every cycle and owned by the report that
/// carries it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PieceFunction {
    domain:      DecisionDomain,
    boxes:       Vec<IvpBox>,
    priority_wt: f64,
}

impl PieceFunction {
    pub fn new(domain: DecisionDomain, boxes: Vec<IvpBox>) -> Self {
        Self { domain, boxes, priority_wt: 1.0 }
    }

    pub fn domain(&self) -> &DecisionDomain {
        &self.domain
    }

    pub fn boxes(&self) -> &[IvpBox] {
        &self.boxes
    }

    /// Number of boxes.
    pub fn size(&self) -> usize {
        self.boxes.len()
    }

    pub fn priority_wt(&self) -> f64 {
        self.priority_wt
    }

    pub fn set_priority_wt(&mut self, w: f64) {
        self.priority_wt = w;
    }

    /// The box containing grid point `idx`.
    pub fn box_at(&self, idx: &[u32]) -> Option<&IvpBox> {
        self.boxes.iter().find(|b| b.contains(idx))
    }

    /// Unweighted value at grid point `idx`.
    pub fn eval_index(&self, idx: &[u32]) -> Option<f64> {
        self.box_at(idx).map(|b| b.eval(&self.domain.values(idx)))
    }

    /// Representative value of a box: its weight at the box center.
    pub fn box_value(&self, b: &IvpBox) -> f64 {
        b.eval(&self.domain.values(&b.center_index()))
    }

    /// The box with the highest representative value (first on ties).
    pub fn max_box(&self) -> Option<&IvpBox> {
        let mut best: Option<(&IvpBox, f64)> = None;
        for b in &self.boxes {
            let v = self.box_value(b);
            if best.is_none_or(|(_, bv)| v > bv) {
                best = Some((b, v));
            }
        }
        best.map(|(b, _)| b)
    }

    /// Range of representative box values, `(min, max)`.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.boxes.iter().map(|b| self.box_value(b)).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Check that boxes lie inside the domain, are pairwise disjoint, and
    /// together cover every grid point.
    pub fn validate(&self) -> IvpResult<()> {
        let dims = self.domain.dims();
        let mut volume: u64 = 0;
        for (i, b) in self.boxes.iter().enumerate() {
            if b.dims() != dims {
                return Err(IvpError::InvalidFunction(format!("box {i} has {} axes, domain has {dims}", b.dims())));
            }
            for d in 0..dims {
                if b.interval(d).is_empty() || b.hi(d) > self.domain.axis(d).max_index() {
                    return Err(IvpError::InvalidFunction(format!("box {i} out of bounds on axis {d}")));
                }
            }
            volume += b.volume();
        }
        for i in 0..self.boxes.len() {
            for j in (i + 1)..self.boxes.len() {
                if self.boxes[i].intersects(&self.boxes[j]) {
                    return Err(IvpError::InvalidFunction(format!("boxes {i} and {j} overlap")));
                }
            }
        }
        if volume != self.domain.point_count() {
            return Err(IvpError::InvalidFunction(format!(
                "boxes cover {volume} of {} grid points",
                self.domain.point_count()
            )));
        }
        Ok(())
    }
}
