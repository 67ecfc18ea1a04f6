//! transit — a small survey-and-return mission for the helm arbitration core.
//!
//! A simulated vessel starts at the origin, transits east until its outbound
//! leg times out, then turns for home.  Partway out, a contact report spawns
//! an obstacle-avoidance behavior.  Each cycle the arbiter's reports are
//! combined by a brute-force grid search that stands in for the external
//! optimizer, and the chosen course and speed drive the vessel.
//!
//! Run with an optional path to a behavior file to replace the built-in
//! mission.  Log verbosity follows `RUST_LOG` (default `info`).

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use helm_arbiter::{load_file, load_str, ArbiterBuilder, ArbiterObserver, CycleSummary};
use helm_behavior::{BehaviorReport, Message};
use helm_core::Iteration;
use helm_ivp::DecisionDomain;
use helm_output::{ArbiterOutputObserver, CsvWriter, OutputWriter};

// ── Constants ─────────────────────────────────────────────────────────────────

const CYCLE_SECS:  f64 = 1.0;
const MISSION_END: f64 = 300.0;
const OUTPUT_DIR:  &str = "output/transit";

/// Contact report that spawns the avoidance behavior.
const OBSTACLE_AT:   f64 = 40.0;
const OBSTACLE_POST: &str = "name=buoy # obstacle=120,4 # buffer=15";

const MISSION: &str = "\
// Survey transit: out east, back west.
initialize DEPLOY = true, RETURN = false

set MODE = ACTIVE { DEPLOY = true } else INACTIVE
set MODE = TRANSIT { MODE = ACTIVE
                     RETURN != true }
set MODE = RETURNING { MODE = ACTIVE
                       RETURN = true }

behavior = BHV_ConstantHeading
{
  name      = outbound
  pwt       = 100
  condition = MODE == ACTIVE:TRANSIT
  heading   = 90
  duration  = 120
  endflag   = RETURN=true
}

behavior = BHV_ConstantHeading
{
  name      = homebound
  pwt       = 100
  condition = MODE == ACTIVE:RETURNING
  heading   = 270
}

behavior = BHV_ConstantSpeed
{
  name      = cruise
  pwt       = 50
  condition = DEPLOY = true
  speed     = 2
}

behavior = BHV_AvoidObstacle
{
  name       = avoid_proto
  templating = spawn
  updates    = OBSTACLE_ALERT
  pwt        = 300
  obstacle   = 0,0
  range_var  = OBSTACLE_RANGE
  duration   = 90
}
";

// ── Vessel ────────────────────────────────────────────────────────────────────

/// Point-mass vessel: course in degrees (0 = north), speed in m/s.
#[derive(Default)]
struct Vessel {
    x:       f64,
    y:       f64,
    heading: f64,
    speed:   f64,
}

impl Vessel {
    fn step(&mut self, dt: f64) {
        let rad = self.heading.to_radians();
        self.x += self.speed * rad.sin() * dt;
        self.y += self.speed * rad.cos() * dt;
    }
}

/// Weighted sum of every function at every grid point; returns the best
/// `(course, speed)`.  A stand-in for the external optimizer.
fn choose(domain: &DecisionDomain, reports: &[BehaviorReport]) -> Option<(f64, f64)> {
    let (course, speed) = (domain.axis(0), domain.axis(1));
    let mut best: Option<(f64, [u32; 2])> = None;
    for ci in 0..=course.max_index() {
        for si in 0..=speed.max_index() {
            let idx = [ci, si];
            let total: f64 = reports
                .iter()
                .flat_map(|r| r.functions())
                .map(|(_, f)| f.priority_wt() * f.eval_index(&idx).unwrap_or(0.0))
                .sum();
            if best.is_none_or(|(b, _)| total > b) {
                best = Some((total, idx));
            }
        }
    }
    best.map(|(_, [ci, si])| (course.value_at(ci), speed.value_at(si)))
}

// ── Observer wrapper to count rows ────────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:        ArbiterOutputObserver<W>,
    life_events:  usize,
    summary_rows: usize,
    mode_changes: usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: ArbiterOutputObserver<W>) -> Self {
        Self { inner, life_events: 0, summary_rows: 0, mode_changes: 0 }
    }
}

impl<W: OutputWriter> ArbiterObserver for CountingObserver<W> {
    fn on_life_event(&mut self, event: &helm_arbiter::LifeEvent) {
        self.life_events += 1;
        info!(%event, "life event");
        self.inner.on_life_event(event);
    }

    fn on_warning(&mut self, warning: &str) {
        warn!(warning, "arbiter warning");
    }

    fn on_status(&mut self, iteration: Iteration, statuses: &[helm_behavior::BehaviorStatus]) {
        self.inner.on_status(iteration, statuses);
    }

    fn on_cycle_end(&mut self, summary: &CycleSummary) {
        self.summary_rows += 1;
        if summary.modes_changed {
            self.mode_changes += 1;
            info!(iteration = summary.iteration.0, modes = %summary.modes, "mode change");
        }
        self.inner.on_cycle_end(summary);
    }

    fn on_finish(&mut self, last: Iteration) {
        self.inner.on_finish(last);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Mission.
    let loaded = match std::env::args().nth(1) {
        Some(path) => load_file(Path::new(&path)).with_context(|| format!("reading {path}"))?,
        None => load_str(MISSION),
    };
    info!(
        templates = loaded.templates.len(),
        modes = loaded.modes.len(),
        warnings = loaded.warnings.len(),
        "mission loaded",
    );

    // 2. Decision space: course 0..359 by 1°, speed 0..4 by 0.2 m/s.
    let domain = DecisionDomain::new()
        .with_axis("course", 0.0, 359.0, 360)?
        .with_axis("speed", 0.0, 4.0, 21)?;

    // 3. Arbiter.
    let mut arbiter = ArbiterBuilder::new(domain.clone()).loaded(loaded).build()?;

    // 4. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = CountingObserver::new(ArbiterOutputObserver::new(writer));

    // 5. Run.
    let mut vessel = Vessel::default();
    let mut outbox: Vec<Message> = Vec::new();
    let t0 = Instant::now();
    let mut now = 0.0;
    while now <= MISSION_END {
        for m in outbox.drain(..) {
            arbiter.post(&m.var, m.value, now);
        }
        arbiter.post("NAV_X", vessel.x, now);
        arbiter.post("NAV_Y", vessel.y, now);
        arbiter.post("NAV_HEADING", vessel.heading, now);
        arbiter.post("NAV_SPEED", vessel.speed, now);
        if now == OBSTACLE_AT {
            arbiter.post("OBSTACLE_ALERT", OBSTACLE_POST, now);
        }

        let out = arbiter.run_cycle(now, &mut obs);
        if let Some((heading, speed)) = choose(&domain, &out.reports) {
            vessel.heading = heading;
            vessel.speed = speed;
        } else {
            vessel.speed = 0.0;
        }
        vessel.step(CYCLE_SECS);
        outbox = out.messages;
        now += CYCLE_SECS;
    }
    arbiter.finish(&mut obs);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Summary.
    println!("Mission complete in {:.3} s", elapsed.as_secs_f64());
    println!("  cycles            : {}", arbiter.iteration().0);
    println!("  life_events.csv   : {} rows", obs.life_events);
    println!("  cycle_summaries   : {} rows", obs.summary_rows);
    println!("  mode changes      : {}", obs.mode_changes);
    println!("  warnings          : {}", arbiter.warnings().len());
    println!("  final position    : ({:.1}, {:.1})", vessel.x, vessel.y);
    println!();

    println!("{:<14} {:<20} {:<10} {:<12}", "Behavior", "Type", "State", "Reason");
    println!("{}", "-".repeat(58));
    for s in arbiter.statuses() {
        println!("{:<14} {:<20} {:<10} {:<12}", s.name, s.kind, s.state, s.reason.to_string());
    }

    Ok(())
}
