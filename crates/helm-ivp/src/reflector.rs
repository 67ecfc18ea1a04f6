//! `Reflector` — converts an [`ObjectiveFunction`] into a [`PieceFunction`].
//!
//! # Strategies
//!
//! Applied in this order within one [`Reflector::create`] call:
//!
//! 1. **Uniform**: tile the domain with a fixed per-axis piece size
//!    (`uniform_piece`) or a size derived from a total budget
//!    (`uniform_amount`).  With neither set the whole domain is one piece.
//! 2. **Directed**: for each `refine_region` / `refine_piece` pair, carve the
//!    region out of the uniform tiling and retile it at the finer size.
//! 3. **Smart**: repeatedly halve the box with the widest sampled value
//!    range while that range exceeds `smart_thresh`, up to `smart_amount`
//!    extra pieces (or `smart_percent` of the current count).
//! 4. **Auto-peak**: find the highest grid point and isolate it in its own
//!    one-point box, if that costs at most `auto_peak_max_pcs` extra pieces.
//!
//! # Parameter syntax
//!
//! ```text
//! uniform_piece  = discrete @ course:10,speed:1     (index units; prefix optional)
//! uniform_amount = 200
//! refine_region  = native @ course:0:90,speed:0:4   (native values; default)
//! refine_region  = discrete @ course:0:90           (index values)
//! refine_piece   = course:2,speed:1
//! smart_amount   = 50        smart_percent = 25     smart_thresh = 1.5
//! auto_peak      = true      auto_peak_max_pcs = 8
//! strict_range   = true      degree = 1
//! ```
//!
//! Problems (unknown axis, zero piece size, a `refine_piece` with no pending
//! region, overlapping regions, an uninitialized objective) are recorded as
//! warnings and mark the reflector not-OK.  `create` then returns 0 and no
//! function is available.  Nothing here panics or returns an error to the
//! caller.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::{debug, warn};

use crate::{DecisionDomain, IvpBox, ObjectiveFunction, PieceFunction};

/// Exhaustive peak search is used up to this many grid points; above it a
/// coordinate ascent from the best box center is used instead.
const EXHAUSTIVE_PEAK_LIMIT: u64 = 250_000;

#[derive(Clone, Debug)]
struct RefineSpec {
    region: IvpBox,
    piece:  Option<Vec<u32>>,
}

#[derive(Clone, Debug)]
struct Settings {
    uniform_piece:     Option<Vec<u32>>,
    uniform_amount:    Option<u64>,
    refines:           Vec<RefineSpec>,
    smart_amount:      u64,
    smart_percent:     f64,
    smart_thresh:      f64,
    auto_peak:         bool,
    auto_peak_max_pcs: usize,
    strict_range:      bool,
    degree:            u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            uniform_piece:     None,
            uniform_amount:    None,
            refines:           Vec::new(),
            smart_amount:      0,
            smart_percent:     0.0,
            smart_thresh:      0.0,
            auto_peak:         false,
            auto_peak_max_pcs: usize::MAX,
            strict_range:      false,
            degree:            0,
        }
    }
}

/// Builds a piecewise approximation of one objective function.
pub struct Reflector<'a> {
    objective: &'a ObjectiveFunction,
    settings:  Settings,
    warnings:  Vec<String>,
    ok:        bool,
    function:  Option<PieceFunction>,
}

impl<'a> Reflector<'a> {
    pub fn new(objective: &'a ObjectiveFunction) -> Self {
        Self {
            objective,
            settings: Settings::default(),
            warnings: Vec::new(),
            ok:       true,
            function: None,
        }
    }

    /// `false` once any inconsistency has been recorded.
    pub fn state_ok(&self) -> bool {
        self.ok
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn domain(&self) -> &DecisionDomain {
        self.objective.domain()
    }

    fn fail(&mut self, msg: String) -> bool {
        warn!(objective = self.objective.kind(), warning = %msg, "reflector warning");
        self.warnings.push(msg);
        self.ok = false;
        false
    }

    // ── Configuration ─────────────────────────────────────────────────────

    /// Apply one `name = value` setting.  Returns `false` (and records a
    /// warning) if it is rejected.
    pub fn set_param(&mut self, name: &str, value: &str) -> bool {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        match name.as_str() {
            "uniform_piece" => match self.parse_sizes(value) {
                Ok(sizes) => { self.settings.uniform_piece = Some(sizes); true }
                Err(e) => self.fail(format!("uniform_piece: {e}")),
            },
            "uniform_amount" => match value.parse::<u64>() {
                Ok(n) if n > 0 => { self.settings.uniform_amount = Some(n); true }
                _ => self.fail(format!("uniform_amount: bad value {value:?}")),
            },
            "refine_region" => match self.parse_region(value) {
                Ok(region) => {
                    if self.settings.refines.last().is_some_and(|r| r.piece.is_none()) {
                        return self.fail("refine_region given while previous region has no refine_piece".into());
                    }
                    self.settings.refines.push(RefineSpec { region, piece: None });
                    true
                }
                Err(e) => self.fail(format!("refine_region: {e}")),
            },
            "refine_piece" => match self.parse_sizes(value) {
                Ok(sizes) => match self.settings.refines.last_mut() {
                    Some(spec) if spec.piece.is_none() => { spec.piece = Some(sizes); true }
                    _ => self.fail("refine_piece given without a pending refine_region".into()),
                },
                Err(e) => self.fail(format!("refine_piece: {e}")),
            },
            "smart_amount" => match value.parse::<u64>() {
                Ok(n) => { self.settings.smart_amount = n; true }
                Err(_) => self.fail(format!("smart_amount: bad value {value:?}")),
            },
            "smart_percent" => match value.parse::<f64>() {
                Ok(p) if p >= 0.0 => { self.settings.smart_percent = p; true }
                _ => self.fail(format!("smart_percent: bad value {value:?}")),
            },
            "smart_thresh" => match value.parse::<f64>() {
                Ok(t) if t >= 0.0 => { self.settings.smart_thresh = t; true }
                _ => self.fail(format!("smart_thresh: bad value {value:?}")),
            },
            "auto_peak" => match parse_bool(value) {
                Some(b) => { self.settings.auto_peak = b; true }
                None => self.fail(format!("auto_peak: bad value {value:?}")),
            },
            "auto_peak_max_pcs" => match value.parse::<usize>() {
                Ok(n) => { self.settings.auto_peak_max_pcs = n; true }
                Err(_) => self.fail(format!("auto_peak_max_pcs: bad value {value:?}")),
            },
            "strict_range" => match parse_bool(value) {
                Some(b) => { self.settings.strict_range = b; true }
                None => self.fail(format!("strict_range: bad value {value:?}")),
            },
            "degree" => match value {
                "0" => { self.settings.degree = 0; true }
                "1" => { self.settings.degree = 1; true }
                _ => self.fail(format!("degree: unsupported {value:?}")),
            },
            _ => self.fail(format!("unknown reflector parameter {name:?}")),
        }
    }

    /// `axis:size,...` → per-axis piece sizes.  Unlisted axes get one piece.
    fn parse_sizes(&self, value: &str) -> Result<Vec<u32>, String> {
        let body = strip_prefix(value).1;
        let domain = self.domain();
        let mut sizes: Vec<u32> = domain.axes().iter().map(|a| a.points).collect();
        for field in body.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let (axis, size) = field
                .split_once(':')
                .ok_or_else(|| format!("expected axis:size, got {field:?}"))?;
            let d = domain
                .index(axis.trim())
                .ok_or_else(|| format!("unknown axis {:?}", axis.trim()))?;
            let n = size
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("bad piece size {:?}", size.trim()))?;
            if n == 0 {
                return Err(format!("zero piece size on axis {:?}", axis.trim()));
            }
            sizes[d] = n;
        }
        Ok(sizes)
    }

    /// `axis:lo:hi,...` → index-space box.  Unlisted axes span fully.
    fn parse_region(&self, value: &str) -> Result<IvpBox, String> {
        let (discrete, body) = strip_prefix(value);
        let domain = self.domain();
        let mut bounds: Vec<(u32, u32)> = domain.axes().iter().map(|a| (0, a.max_index())).collect();
        for field in body.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let parts: Vec<&str> = field.split(':').map(str::trim).collect();
            let &[axis, lo, hi] = parts.as_slice() else {
                return Err(format!("expected axis:lo:hi, got {field:?}"));
            };
            let d = domain.index(axis).ok_or_else(|| format!("unknown axis {axis:?}"))?;
            let (lo, hi) = match (lo.parse::<f64>(), hi.parse::<f64>()) {
                (Ok(l), Ok(h)) if l <= h => (l, h),
                _ => return Err(format!("bad bounds in {field:?}")),
            };
            let a = domain.axis(d);
            bounds[d] = if discrete {
                let max = a.max_index() as f64;
                if lo > max || hi < 0.0 {
                    return Err(format!("region {field:?} lies outside the axis"));
                }
                (lo.max(0.0) as u32, hi.min(max) as u32)
            } else {
                if lo > a.high || hi < a.low {
                    return Err(format!("region {field:?} lies outside the axis"));
                }
                (a.index_of(lo), a.index_of(hi))
            };
        }
        Ok(IvpBox::closed(bounds))
    }

    // ── Build ─────────────────────────────────────────────────────────────

    /// Build the piecewise function.  Returns the number of pieces, or 0 if
    /// the reflector is not OK.
    pub fn create(&mut self) -> usize {
        self.function = None;
        if !self.ok {
            return 0;
        }
        if !self.objective.is_initialized() {
            self.fail("objective function is not initialized".into());
            return 0;
        }
        if self.domain().dims() == 0 {
            self.fail("decision domain has no axes".into());
            return 0;
        }

        // ── Uniform ───────────────────────────────────────────────────────
        let sizes = self.uniform_sizes();
        let mut boxes = tile(&self.domain().full_box(), &sizes);

        // ── Directed ──────────────────────────────────────────────────────
        let refines = self.settings.refines.clone();
        for (i, a) in refines.iter().enumerate() {
            let Some(piece) = &a.piece else {
                self.fail(format!("refine_region #{i} has no refine_piece"));
                return 0;
            };
            if refines[..i].iter().any(|b| b.region.intersects(&a.region)) {
                self.fail(format!("refine_region #{i} overlaps an earlier region"));
                return 0;
            }
            let mut next = Vec::with_capacity(boxes.len());
            for b in &boxes {
                let (outside, _inside) = b.subtract(&a.region);
                next.extend(outside);
            }
            next.extend(tile(&a.region, piece));
            boxes = next;
        }

        for b in &mut boxes {
            self.set_weights(b);
        }

        // ── Smart ─────────────────────────────────────────────────────────
        let budget = self.settings.smart_amount
            + (self.settings.smart_percent / 100.0 * boxes.len() as f64).round() as u64;
        if budget > 0 {
            self.smart_refine(&mut boxes, budget);
        }

        // ── Auto-peak ─────────────────────────────────────────────────────
        if self.settings.auto_peak {
            self.isolate_peak(&mut boxes);
        }

        debug!(objective = self.objective.kind(), pieces = boxes.len(), "reflected objective");
        let count = boxes.len();
        self.function = Some(PieceFunction::new(self.domain().clone(), boxes));
        count
    }

    /// The function built by the last successful `create`.
    pub fn extract_function(self) -> Option<PieceFunction> {
        if self.ok { self.function } else { None }
    }

    fn uniform_sizes(&self) -> Vec<u32> {
        let domain = self.domain();
        if let Some(sizes) = &self.settings.uniform_piece {
            return sizes.clone();
        }
        match self.settings.uniform_amount {
            Some(n) => {
                let dims = domain.dims() as f64;
                let per_axis = ((n as f64).powf(1.0 / dims).floor() as u32).max(1);
                domain.axes().iter().map(|a| a.points.div_ceil(per_axis).max(1)).collect()
            }
            None => domain.axes().iter().map(|a| a.points).collect(),
        }
    }

    fn eval(&self, idx: &[u32]) -> f64 {
        self.objective.evaluate_index(idx, self.settings.strict_range)
    }

    fn set_weights(&self, b: &mut IvpBox) {
        let center = b.center_index();
        let fc = self.eval(&center);
        if self.settings.degree == 0 {
            b.set_weight(fc);
            return;
        }
        let domain = self.domain();
        let cx = domain.values(&center);
        let mut coefs = Vec::with_capacity(b.dims() + 1);
        for d in 0..b.dims() {
            let (lo, hi) = (b.lo(d), b.hi(d));
            if lo == hi {
                coefs.push(0.0);
                continue;
            }
            let mut p = center.clone();
            p[d] = lo;
            let f_lo = self.eval(&p);
            p[d] = hi;
            let f_hi = self.eval(&p);
            let a = domain.axis(d);
            let run = a.value_at(hi) - a.value_at(lo);
            coefs.push(if run != 0.0 { (f_hi - f_lo) / run } else { 0.0 });
        }
        let intercept = fc - coefs.iter().zip(&cx).map(|(m, x)| m * x).sum::<f64>();
        coefs.push(intercept);
        b.set_linear(coefs);
    }

    /// Spread of sampled values over a box: corners for up to four axes,
    /// axis end-points otherwise, always including the center.
    fn value_spread(&self, b: &IvpBox) -> f64 {
        let dims = b.dims();
        let center = b.center_index();
        let mut lo = self.eval(&center);
        let mut hi = lo;
        let mut note = |v: f64| {
            lo = lo.min(v);
            hi = hi.max(v);
        };
        if dims <= 4 {
            for mask in 0..(1u32 << dims) {
                let p: Vec<u32> = (0..dims)
                    .map(|d| if mask & (1 << d) == 0 { b.lo(d) } else { b.hi(d) })
                    .collect();
                note(self.eval(&p));
            }
        } else {
            for d in 0..dims {
                let mut p = center.clone();
                p[d] = b.lo(d);
                note(self.eval(&p));
                p[d] = b.hi(d);
                note(self.eval(&p));
            }
        }
        hi - lo
    }

    fn smart_refine(&self, boxes: &mut Vec<IvpBox>, mut budget: u64) {
        let mut heap: BinaryHeap<Spread> = boxes
            .iter()
            .enumerate()
            .map(|(i, b)| Spread { range: self.value_spread(b), index: i })
            .collect();

        while budget > 0 {
            let Some(top) = heap.pop() else { break };
            if top.range <= self.settings.smart_thresh {
                break;
            }
            let b = &boxes[top.index];
            let Some((mut a, mut c)) = b.split(b.widest_axis()) else {
                continue;
            };
            self.set_weights(&mut a);
            self.set_weights(&mut c);
            let (ra, rc) = (self.value_spread(&a), self.value_spread(&c));
            boxes[top.index] = a;
            boxes.push(c);
            heap.push(Spread { range: ra, index: top.index });
            heap.push(Spread { range: rc, index: boxes.len() - 1 });
            budget -= 1;
        }
    }

    fn find_peak(&self, boxes: &[IvpBox]) -> Vec<u32> {
        let domain = self.domain();
        if domain.point_count() <= EXHAUSTIVE_PEAK_LIMIT {
            let mut best = vec![0u32; domain.dims()];
            let mut best_v = f64::NEG_INFINITY;
            let mut idx = vec![0u32; domain.dims()];
            loop {
                let v = self.eval(&idx);
                if v > best_v {
                    best_v = v;
                    best.clone_from(&idx);
                }
                if !next_index(&mut idx, domain) {
                    break;
                }
            }
            return best;
        }

        // Coordinate ascent from the center of the best box.
        let start = boxes
            .iter()
            .map(|b| (b.center_index(), self.eval(&b.center_index())))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
            .unwrap_or_else(|| vec![0; domain.dims()]);
        let mut cur = start;
        let mut cur_v = self.eval(&cur);
        loop {
            let mut improved = false;
            for d in 0..domain.dims() {
                for step in [-1i64, 1] {
                    let n = cur[d] as i64 + step;
                    if n < 0 || n > domain.axis(d).max_index() as i64 {
                        continue;
                    }
                    let mut cand = cur.clone();
                    cand[d] = n as u32;
                    let v = self.eval(&cand);
                    if v > cur_v {
                        cur = cand;
                        cur_v = v;
                        improved = true;
                    }
                }
            }
            if !improved {
                return cur;
            }
        }
    }

    fn isolate_peak(&mut self, boxes: &mut Vec<IvpBox>) {
        let peak = self.find_peak(boxes);
        let Some(pos) = boxes.iter().position(|b| b.contains(&peak)) else {
            self.fail(format!("peak {peak:?} is not covered by any piece"));
            return;
        };
        if boxes[pos].volume() == 1 {
            return;
        }
        let point = IvpBox::closed(peak.iter().map(|&i| (i, i)).collect());
        let (mut outside, _) = boxes[pos].subtract(&point);
        if outside.len() > self.settings.auto_peak_max_pcs {
            let msg = format!(
                "auto_peak needs {} extra pieces, limit is {}",
                outside.len(),
                self.settings.auto_peak_max_pcs
            );
            warn!(objective = self.objective.kind(), warning = %msg, "auto-peak skipped");
            self.warnings.push(msg);
            return;
        }
        for b in &mut outside {
            self.set_weights(b);
        }
        let mut peak_box = point;
        self.set_weights(&mut peak_box);
        boxes[pos] = peak_box;
        boxes.extend(outside);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Heap entry for smart refinement; ordered by value range.
struct Spread {
    range: f64,
    index: usize,
}

impl PartialEq for Spread {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Spread {}

impl PartialOrd for Spread {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Spread {
    fn cmp(&self, other: &Self) -> Ordering {
        self.range
            .total_cmp(&other.range)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Tile `region` with pieces of `sizes` index points per axis, anchored at
/// the region's low corner.  The last piece on each axis may be short.
fn tile(region: &IvpBox, sizes: &[u32]) -> Vec<IvpBox> {
    let per_axis: Vec<Vec<(u32, u32)>> = (0..region.dims())
        .map(|d| {
            let step = sizes[d].max(1);
            let mut out = Vec::new();
            let mut lo = region.lo(d);
            while lo <= region.hi(d) {
                let hi = lo.saturating_add(step - 1).min(region.hi(d));
                out.push((lo, hi));
                if hi == region.hi(d) {
                    break;
                }
                lo = hi + 1;
            }
            out
        })
        .collect();

    let mut boxes = vec![Vec::<(u32, u32)>::new()];
    for chunks in &per_axis {
        boxes = boxes
            .into_iter()
            .flat_map(|prefix| {
                chunks.iter().map(move |&c| {
                    let mut b = prefix.clone();
                    b.push(c);
                    b
                })
            })
            .collect();
    }
    boxes.into_iter().map(IvpBox::closed).collect()
}

/// Odometer increment over all grid points.  `false` after the last one.
fn next_index(idx: &mut [u32], domain: &DecisionDomain) -> bool {
    for d in (0..idx.len()).rev() {
        if idx[d] < domain.axis(d).max_index() {
            idx[d] += 1;
            return true;
        }
        idx[d] = 0;
    }
    false
}

/// Split off an optional `discrete @` / `native @` prefix.
fn strip_prefix(value: &str) -> (bool, &str) {
    match value.split_once('@') {
        Some((kind, rest)) => (kind.trim().eq_ignore_ascii_case("discrete"), rest.trim()),
        None => (false, value.trim()),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}
