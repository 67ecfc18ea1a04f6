//! Analytic objective functions over a [`DecisionDomain`].
//!
//! Every variant is a pure function of a domain point given in native
//! values, one coordinate per axis in domain order.  Parameters are set by
//! name, then [`ObjectiveFunction::initialize`] checks that everything the
//! variant needs is present before the first evaluation.
//!
//! | Variant     | Axes used                  | Shape                                  |
//! |-------------|----------------------------|----------------------------------------|
//! | `linear`    | first two                  | `m*x + n*y + b`                        |
//! | `quadratic` | first two                  | `a*x² + b*x + c + d*y² + e*y`          |
//! | `ring`      | first two                  | ridge at distance `radius` from center |
//! | `shadow`    | `course`, `speed`          | match a heading and speed              |
//! | `avoid`     | `course`, `speed`          | keep the closest approach ≥ `buffer`   |

use crate::{DecisionDomain, IvpError, IvpResult};

/// Common capability of every objective variant.
pub trait Objective {
    /// Variant name used in errors and configuration.
    fn kind(&self) -> &'static str;

    /// Set a named parameter.  Returns `false` if the name is unknown.
    fn set_param(&mut self, name: &str, value: f64) -> bool;

    /// Resolve axes and check required parameters.
    fn initialize(&mut self, domain: &DecisionDomain) -> IvpResult<()>;

    /// Value at native coordinates `x`.  Only meaningful after `initialize`.
    fn evaluate(&self, x: &[f64]) -> f64;

    /// Axis ranges outside which the variant's inputs have no meaning, as
    /// `(axis, low, high)`.  Strict-range reflection clamps to them.
    fn native_ranges(&self) -> Vec<(&'static str, f64, f64)> {
        vec![]
    }
}

fn require(kind: &'static str, param: &'static str, v: Option<f64>) -> IvpResult<f64> {
    v.ok_or(IvpError::UnsetParam { objective: kind, param })
}

fn axis(domain: &DecisionDomain, name: &str) -> IvpResult<usize> {
    domain.index(name).ok_or_else(|| IvpError::UnknownAxis(name.to_string()))
}

/// Coordinate `d`, or 0 when `x` is too short.
#[inline]
fn coord(x: &[f64], d: usize) -> f64 {
    x.get(d).copied().unwrap_or(0.0)
}

#[inline]
fn y_of(x: &[f64]) -> f64 {
    coord(x, 1)
}

/// Compass course in degrees and non-negative speed.
fn course_speed_ranges() -> Vec<(&'static str, f64, f64)> {
    vec![("course", 0.0, 360.0), ("speed", 0.0, f64::INFINITY)]
}

/// Smallest absolute difference between two headings in degrees, `[0, 180]`.
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    if d > 180.0 { 360.0 - d } else { d }
}

// ── Linear ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearObjective {
    pub mcoeff:  Option<f64>,
    pub ncoeff:  Option<f64>,
    pub bscalar: Option<f64>,
    coefs:       [f64; 3],
}

impl Objective for LinearObjective {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "mcoeff"  => self.mcoeff = Some(value),
            "ncoeff"  => self.ncoeff = Some(value),
            "bscalar" => self.bscalar = Some(value),
            _ => return false,
        }
        true
    }

    fn initialize(&mut self, domain: &DecisionDomain) -> IvpResult<()> {
        if domain.dims() == 0 {
            return Err(IvpError::UnknownAxis("<first axis>".into()));
        }
        let m = require("linear", "mcoeff", self.mcoeff)?;
        let n = if domain.dims() > 1 {
            require("linear", "ncoeff", self.ncoeff)?
        } else {
            self.ncoeff.unwrap_or(0.0)
        };
        let b = require("linear", "bscalar", self.bscalar)?;
        self.coefs = [m, n, b];
        Ok(())
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        let [m, n, b] = self.coefs;
        m * coord(x, 0) + n * y_of(x) + b
    }
}

// ── Quadratic ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuadraticObjective {
    pub acoeff: Option<f64>,
    pub bcoeff: Option<f64>,
    pub ccoeff: Option<f64>,
    pub dcoeff: Option<f64>,
    pub ecoeff: Option<f64>,
    coefs:      [f64; 5],
}

impl Objective for QuadraticObjective {
    fn kind(&self) -> &'static str {
        "quadratic"
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "acoeff" => self.acoeff = Some(value),
            "bcoeff" => self.bcoeff = Some(value),
            "ccoeff" => self.ccoeff = Some(value),
            "dcoeff" => self.dcoeff = Some(value),
            "ecoeff" => self.ecoeff = Some(value),
            _ => return false,
        }
        true
    }

    fn initialize(&mut self, domain: &DecisionDomain) -> IvpResult<()> {
        if domain.dims() == 0 {
            return Err(IvpError::UnknownAxis("<first axis>".into()));
        }
        self.coefs = [
            require("quadratic", "acoeff", self.acoeff)?,
            require("quadratic", "bcoeff", self.bcoeff)?,
            require("quadratic", "ccoeff", self.ccoeff)?,
            self.dcoeff.unwrap_or(0.0),
            self.ecoeff.unwrap_or(0.0),
        ];
        Ok(())
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        let [a, b, c, d, e] = self.coefs;
        let (u, v) = (coord(x, 0), y_of(x));
        a * u * u + b * u + c + d * v * v + e * v
    }
}

// ── Ring ──────────────────────────────────────────────────────────────────────

/// A ridge (or trough, with `peak = 0`) along the circle of `radius` around
/// `(center_x, center_y)` in the plane of the first two axes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RingObjective {
    pub center_x: Option<f64>,
    pub center_y: Option<f64>,
    pub radius:   Option<f64>,
    pub exp:      Option<f64>,
    pub base:     Option<f64>,
    pub range:    Option<f64>,
    pub peak:     Option<f64>,
    resolved:     RingResolved,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct RingResolved {
    cx:       f64,
    cy:       f64,
    radius:   f64,
    exp:      f64,
    base:     f64,
    range:    f64,
    peak:     bool,
    max_dist: f64,
}

impl Objective for RingObjective {
    fn kind(&self) -> &'static str {
        "ring"
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "center_x" => self.center_x = Some(value),
            "center_y" => self.center_y = Some(value),
            "radius"   => self.radius = Some(value),
            "exp"      => self.exp = Some(value),
            "base"     => self.base = Some(value),
            "range"    => self.range = Some(value),
            "peak"     => self.peak = Some(value),
            _ => return false,
        }
        true
    }

    fn initialize(&mut self, domain: &DecisionDomain) -> IvpResult<()> {
        if domain.dims() < 2 {
            return Err(IvpError::UnknownAxis("<second axis>".into()));
        }
        let (ax, ay) = (domain.axis(0), domain.axis(1));
        let diag = ((ax.high - ax.low).powi(2) + (ay.high - ay.low).powi(2)).sqrt();
        self.resolved = RingResolved {
            cx:       require("ring", "center_x", self.center_x)?,
            cy:       require("ring", "center_y", self.center_y)?,
            radius:   require("ring", "radius", self.radius)?.max(0.0),
            exp:      self.exp.unwrap_or(1.0),
            base:     self.base.unwrap_or(0.0),
            range:    self.range.unwrap_or(100.0),
            peak:     self.peak.unwrap_or(1.0) != 0.0,
            max_dist: if diag > 0.0 { diag } else { 1.0 },
        };
        Ok(())
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        let r = &self.resolved;
        let dist = ((coord(x, 0) - r.cx).powi(2) + (y_of(x) - r.cy).powi(2)).sqrt();
        let off = ((dist - r.radius).abs() / r.max_dist).min(1.0);
        let shape = (1.0 - off).powf(r.exp);
        if r.peak {
            r.base + r.range * shape
        } else {
            r.base + r.range * (1.0 - shape)
        }
    }
}

// ── Shadow ────────────────────────────────────────────────────────────────────

/// Prefers the `(course, speed)` closest to a target heading and speed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShadowObjective {
    pub heading:    Option<f64>,
    pub speed:      Option<f64>,
    pub heading_wt: Option<f64>,
    pub speed_wt:   Option<f64>,
    pub max_util:   Option<f64>,
    resolved:       ShadowResolved,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct ShadowResolved {
    course_axis: Option<usize>,
    speed_axis:  Option<usize>,
    heading:     f64,
    speed:       f64,
    heading_wt:  f64,
    speed_wt:    f64,
    speed_range: f64,
    max_util:    f64,
}

impl Objective for ShadowObjective {
    fn kind(&self) -> &'static str {
        "shadow"
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "heading"    => self.heading = Some(value),
            "speed"      => self.speed = Some(value),
            "heading_wt" => self.heading_wt = Some(value.max(0.0)),
            "speed_wt"   => self.speed_wt = Some(value.max(0.0)),
            "max_util"   => self.max_util = Some(value),
            _ => return false,
        }
        true
    }

    fn initialize(&mut self, domain: &DecisionDomain) -> IvpResult<()> {
        let heading_wt = self.heading_wt.unwrap_or(1.0);
        let speed_wt = self.speed_wt.unwrap_or(1.0);
        let mut r = ShadowResolved {
            heading_wt,
            speed_wt,
            max_util: self.max_util.unwrap_or(100.0),
            ..Default::default()
        };
        if heading_wt > 0.0 {
            r.course_axis = Some(axis(domain, "course")?);
            r.heading = require("shadow", "heading", self.heading)?;
        }
        if speed_wt > 0.0 {
            let s = axis(domain, "speed")?;
            let a = domain.axis(s);
            r.speed_axis = Some(s);
            r.speed = require("shadow", "speed", self.speed)?;
            r.speed_range = a.high - a.low;
        }
        self.resolved = r;
        Ok(())
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        let r = &self.resolved;
        let total = r.heading_wt + r.speed_wt;
        if total <= 0.0 {
            return r.max_util;
        }
        let hpen = r.course_axis.map_or(0.0, |c| angle_diff(coord(x, c), r.heading) / 180.0);
        let spen = match r.speed_axis {
            Some(s) if r.speed_range > 0.0 => ((coord(x, s) - r.speed).abs() / r.speed_range).min(1.0),
            _ => 0.0,
        };
        r.max_util * (1.0 - (r.heading_wt * hpen + r.speed_wt * spen) / total)
    }

    fn native_ranges(&self) -> Vec<(&'static str, f64, f64)> {
        course_speed_ranges()
    }
}

// ── Avoid ─────────────────────────────────────────────────────────────────────

/// Penalizes `(course, speed)` choices whose closest point of approach to a
/// fixed obstacle, within `horizon` seconds, falls inside `buffer`.
///
/// Courses are compass headings: 0 is +y (north), 90 is +x (east).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AvoidObjective {
    pub osx:      Option<f64>,
    pub osy:      Option<f64>,
    pub obx:      Option<f64>,
    pub oby:      Option<f64>,
    pub buffer:   Option<f64>,
    pub horizon:  Option<f64>,
    pub max_util: Option<f64>,
    resolved:     AvoidResolved,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct AvoidResolved {
    course_axis: usize,
    speed_axis:  usize,
    rel_x:       f64,
    rel_y:       f64,
    buffer:      f64,
    horizon:     f64,
    max_util:    f64,
}

impl AvoidObjective {
    /// Closest approach distance for one `(course, speed)` choice.
    pub fn cpa_distance(&self, course: f64, speed: f64) -> f64 {
        let r = &self.resolved;
        let rad = course.to_radians();
        let (ux, uy) = (speed * rad.sin(), speed * rad.cos());
        let uu = ux * ux + uy * uy;
        let t = if uu > 0.0 {
            ((r.rel_x * ux + r.rel_y * uy) / uu).clamp(0.0, r.horizon)
        } else {
            0.0
        };
        ((r.rel_x - ux * t).powi(2) + (r.rel_y - uy * t).powi(2)).sqrt()
    }
}

impl Objective for AvoidObjective {
    fn kind(&self) -> &'static str {
        "avoid"
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "osx"      => self.osx = Some(value),
            "osy"      => self.osy = Some(value),
            "obx"      => self.obx = Some(value),
            "oby"      => self.oby = Some(value),
            "buffer"   => self.buffer = Some(value),
            "horizon"  => self.horizon = Some(value),
            "max_util" => self.max_util = Some(value),
            _ => return false,
        }
        true
    }

    fn initialize(&mut self, domain: &DecisionDomain) -> IvpResult<()> {
        let course_axis = axis(domain, "course")?;
        let speed_axis = axis(domain, "speed")?;
        let buffer = require("avoid", "buffer", self.buffer)?;
        self.resolved = AvoidResolved {
            course_axis,
            speed_axis,
            rel_x:    require("avoid", "obx", self.obx)? - require("avoid", "osx", self.osx)?,
            rel_y:    require("avoid", "oby", self.oby)? - require("avoid", "osy", self.osy)?,
            buffer:   buffer.max(f64::EPSILON),
            horizon:  self.horizon.unwrap_or(60.0).max(0.0),
            max_util: self.max_util.unwrap_or(100.0),
        };
        Ok(())
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        let r = &self.resolved;
        let dist = self.cpa_distance(coord(x, r.course_axis), coord(x, r.speed_axis));
        r.max_util * (dist / r.buffer).min(1.0)
    }

    fn native_ranges(&self) -> Vec<(&'static str, f64, f64)> {
        course_speed_ranges()
    }
}

// ── ObjectiveFunction ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
enum Variant {
    Linear(LinearObjective),
    Quadratic(QuadraticObjective),
    Ring(RingObjective),
    Shadow(ShadowObjective),
    Avoid(AvoidObjective),
}

impl Variant {
    fn inner(&self) -> &dyn Objective {
        match self {
            Variant::Linear(o)    => o,
            Variant::Quadratic(o) => o,
            Variant::Ring(o)      => o,
            Variant::Shadow(o)    => o,
            Variant::Avoid(o)     => o,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Objective {
        match self {
            Variant::Linear(o)    => o,
            Variant::Quadratic(o) => o,
            Variant::Ring(o)      => o,
            Variant::Shadow(o)    => o,
            Variant::Avoid(o)     => o,
        }
    }
}

/// An objective variant bound to a domain, with optional native bounds used
/// by strict-range reflection.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectiveFunction {
    domain:      DecisionDomain,
    variant:     Variant,
    native:      Vec<Option<(f64, f64)>>,
    initialized: bool,
}

impl ObjectiveFunction {
    /// Build by variant name: `linear`, `quadratic`, `ring`, `shadow`, `avoid`.
    pub fn new(kind: &str, domain: DecisionDomain) -> IvpResult<Self> {
        let variant = match kind.to_ascii_lowercase().as_str() {
            "linear"    => Variant::Linear(LinearObjective::default()),
            "quadratic" => Variant::Quadratic(QuadraticObjective::default()),
            "ring"      => Variant::Ring(RingObjective::default()),
            "shadow"    => Variant::Shadow(ShadowObjective::default()),
            "avoid"     => Variant::Avoid(AvoidObjective::default()),
            _ => return Err(IvpError::UnknownObjective(kind.to_string())),
        };
        let native = vec![None; domain.dims()];
        Ok(Self { domain, variant, native, initialized: false })
    }

    pub fn kind(&self) -> &'static str {
        self.variant.inner().kind()
    }

    pub fn domain(&self) -> &DecisionDomain {
        &self.domain
    }

    /// Set a named parameter.  Invalidates any prior `initialize`.
    pub fn set_param(&mut self, name: &str, value: f64) -> IvpResult<()> {
        self.initialized = false;
        let inner = self.variant.inner_mut();
        if inner.set_param(name, value) {
            Ok(())
        } else {
            Err(IvpError::UnknownParam { objective: inner.kind(), param: name.to_string() })
        }
    }

    /// Declare the native range of `axis`; strict-range reflection clamps
    /// evaluated coordinates to it.  Overrides the variant's own range.
    pub fn set_native_bounds(&mut self, axis: &str, lo: f64, hi: f64) -> IvpResult<()> {
        let d = self.domain.index(axis).ok_or_else(|| IvpError::UnknownAxis(axis.to_string()))?;
        if !lo.is_finite() || !hi.is_finite() {
            return Err(IvpError::BadAxis {
                name:   axis.to_string(),
                reason: format!("native bounds must be finite, got [{lo}, {hi}]"),
            });
        }
        self.native[d] = Some((lo.min(hi), lo.max(hi)));
        Ok(())
    }

    pub fn native_bounds(&self, d: usize) -> Option<(f64, f64)> {
        self.native.get(d).copied().flatten()
    }

    /// Check axes and required parameters.  Must succeed before evaluation.
    ///
    /// Axes with no declared native bounds take the variant's own range.
    pub fn initialize(&mut self) -> IvpResult<()> {
        self.initialized = false;
        self.variant.inner_mut().initialize(&self.domain)?;
        for (axis, lo, hi) in self.variant.inner().native_ranges() {
            if let Some(d) = self.domain.index(axis)
                && self.native[d].is_none()
            {
                self.native[d] = Some((lo, hi));
            }
        }
        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Value at native coordinates `x` (one per axis, domain order).
    /// Missing trailing coordinates take their axis's low value.
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        let axes = self.domain.axes();
        if x.len() >= axes.len() {
            return self.variant.inner().evaluate(x);
        }
        let mut full = x.to_vec();
        full.extend(axes[x.len()..].iter().map(|a| a.low));
        self.variant.inner().evaluate(&full)
    }

    /// Value at a grid point, optionally clamped to the native bounds.
    pub fn evaluate_index(&self, idx: &[u32], strict: bool) -> f64 {
        let mut x = self.domain.values(idx);
        if strict {
            for (d, v) in x.iter_mut().enumerate() {
                if let Some((lo, hi)) = self.native_bounds(d) {
                    *v = v.clamp(lo, hi);
                }
            }
        }
        self.evaluate(&x)
    }
}
