//! The decision domain — the discretized action space every behavior shares.

use std::fmt;

use crate::{IvpBox, IvpError, IvpResult};

/// One named, uniformly discretized axis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Axis {
    pub name:   String,
    pub low:    f64,
    pub high:   f64,
    /// Number of grid points, always ≥ 1.
    pub points: u32,
}

impl Axis {
    /// Native distance between adjacent grid points (0 for a single point).
    #[inline]
    pub fn delta(&self) -> f64 {
        if self.points <= 1 {
            0.0
        } else {
            (self.high - self.low) / (self.points - 1) as f64
        }
    }

    /// Native value at grid index `idx`.
    #[inline]
    pub fn value_at(&self, idx: u32) -> f64 {
        self.low + idx as f64 * self.delta()
    }

    /// Nearest grid index to native value `v`, clamped to the axis.
    pub fn index_of(&self, v: f64) -> u32 {
        let delta = self.delta();
        if delta == 0.0 {
            return 0;
        }
        let raw = ((v - self.low) / delta).round();
        raw.clamp(0.0, (self.points - 1) as f64) as u32
    }

    /// Highest valid grid index.
    #[inline]
    pub fn max_index(&self) -> u32 {
        self.points - 1
    }
}

/// Ordered list of axes.  Axis order is fixed once built and all boxes and
/// points refer to axes positionally.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecisionDomain {
    axes: Vec<Axis>,
}

impl DecisionDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an axis.
    pub fn add_axis(&mut self, name: &str, low: f64, high: f64, points: u32) -> IvpResult<()> {
        let bad = |reason: &str| IvpError::BadAxis { name: name.to_string(), reason: reason.to_string() };
        if name.trim().is_empty() {
            return Err(bad("empty name"));
        }
        if self.index(name).is_some() {
            return Err(bad("duplicate name"));
        }
        if points == 0 {
            return Err(bad("point count must be at least 1"));
        }
        if !(low.is_finite() && high.is_finite()) || high < low {
            return Err(bad("bounds must be finite with low <= high"));
        }
        self.axes.push(Axis { name: name.to_string(), low, high, points });
        Ok(())
    }

    /// Fluent form of [`add_axis`](Self::add_axis).
    pub fn with_axis(mut self, name: &str, low: f64, high: f64, points: u32) -> IvpResult<Self> {
        self.add_axis(name, low, high, points)?;
        Ok(self)
    }

    /// Number of axes.
    #[inline]
    pub fn dims(&self) -> usize {
        self.axes.len()
    }

    pub fn axis(&self, d: usize) -> &Axis {
        &self.axes[d]
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Position of the axis called `name`.
    pub fn index(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|a| a.name == name)
    }

    /// Total number of grid points (product over axes).
    pub fn point_count(&self) -> u64 {
        self.axes.iter().map(|a| a.points as u64).product()
    }

    /// Native values of a grid point.
    pub fn values(&self, idx: &[u32]) -> Vec<f64> {
        self.axes.iter().zip(idx).map(|(a, &i)| a.value_at(i)).collect()
    }

    /// The box spanning the whole domain.
    pub fn full_box(&self) -> IvpBox {
        IvpBox::closed(self.axes.iter().map(|a| (0, a.max_index())).collect())
    }
}

impl fmt::Display for DecisionDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, a) in self.axes.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{},{},{},{}", a.name, a.low, a.high, a.points)?;
        }
        Ok(())
    }
}
