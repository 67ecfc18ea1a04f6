//! The `Arbiter` struct and its cycle.

use std::fmt;

use helm_behavior::fields::{name_field, parse_fields};
use helm_behavior::{
    Behavior, BehaviorContext, BehaviorRegistry, BehaviorReport, BehaviorStatus, BehaviorTemplate,
    Message, RunState, Templating,
};
use helm_core::{BehaviorId, CycleClock, Iteration, StateStore, TemplateId, Value};
use helm_ivp::DecisionDomain;
use helm_mode::{ModeEvaluator, ModeSummary};
use tracing::{debug, info, warn};

use crate::{ArbiterConfig, ArbiterError, ArbiterObserver, ArbiterResult, LifeEvent, LifeEventKind};

// ── Cycle results ─────────────────────────────────────────────────────────────

/// Counts and mode state for one cycle.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleSummary {
    pub iteration:     Iteration,
    pub time:          f64,
    pub idle:          usize,
    pub running:       usize,
    pub completed:     usize,
    /// Running behaviors that produced a report.
    pub active:        usize,
    pub spawned:       usize,
    pub retired:       usize,
    pub spawned_total: u64,
    pub retired_total: u64,
    pub warnings:      usize,
    pub modes:         String,
    pub modes_changed: bool,
}

impl fmt::Display for CycleSummary {
    /// `iter=12,idle=1,running=2,completed=0,active=2,spawned=0,retired=0`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iter={},idle={},running={},completed={},active={},spawned={},retired={}",
            self.iteration.0, self.idle, self.running, self.completed, self.active,
            self.spawned_total, self.retired_total,
        )
    }
}

/// Everything one cycle hands to the outside world.
#[derive(Clone, Debug, Default)]
pub struct CycleOutput {
    pub summary:  CycleSummary,
    /// Weighted functions for the optimizer, in behavior creation order.
    pub reports:  Vec<BehaviorReport>,
    /// Flags and status postings, to be published after the cycle.
    pub messages: Vec<Message>,
}

// ── Arbiter ───────────────────────────────────────────────────────────────────

/// Owns the live behaviors and drives them one cycle at a time.
///
/// Each [`run_cycle`][Self::run_cycle]:
///
/// 1. evaluates modes into the store,
/// 2. reads spawn postings for every spawn/clone template,
/// 3. instantiates new behaviors, rejecting name collisions,
/// 4. advances every live behavior,
/// 5. retires completed, non-perpetual behaviors,
/// 6. collects reports from running behaviors,
/// 7. aggregates statistics and queues status postings.
///
/// Nothing here returns an error once built: problems become warnings.
///
/// Create via [`ArbiterBuilder`][crate::ArbiterBuilder].
pub struct Arbiter {
    pub(crate) config:         ArbiterConfig,
    pub(crate) clock:          CycleClock,
    pub(crate) store:          StateStore,
    pub(crate) domain:         DecisionDomain,
    pub(crate) registry:       BehaviorRegistry,
    pub(crate) templates:      Vec<(TemplateId, BehaviorTemplate)>,
    pub(crate) behaviors:      Vec<Behavior>,
    pub(crate) modes:          ModeEvaluator,
    pub(crate) next_id:        BehaviorId,
    pub(crate) pending_init:   Vec<(String, Value)>,
    pub(crate) pending_events: Vec<LifeEvent>,
    pub(crate) pending_warns:  Vec<String>,
    pub(crate) warnings:       Vec<String>,
    pub(crate) spawned_total:  u64,
    pub(crate) retired_total:  u64,
    pub(crate) last_status:    Option<f64>,
}

impl Arbiter {
    // ── Public API ────────────────────────────────────────────────────────

    /// Hand a posting from outside (navigation, sensors, operator) to the
    /// store.  It is visible to the next cycle.
    pub fn post(&mut self, name: &str, value: impl Into<Value>, time: f64) {
        self.store.post(name, value, time);
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn domain(&self) -> &DecisionDomain {
        &self.domain
    }

    pub fn iteration(&self) -> Iteration {
        self.clock.iteration
    }

    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    pub fn behavior(&self, name: &str) -> Option<&Behavior> {
        self.behaviors.iter().find(|b| b.name() == name)
    }

    pub fn templates(&self) -> impl Iterator<Item = &BehaviorTemplate> {
        self.templates.iter().map(|(_, t)| t)
    }

    pub fn statuses(&self) -> Vec<BehaviorStatus> {
        self.behaviors.iter().map(Behavior::status).collect()
    }

    /// The most recent warnings, oldest first, at most
    /// [`ArbiterConfig::warning_history`] of them.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Run one cycle at mission time `now`.
    pub fn run_cycle<O: ArbiterObserver>(&mut self, now: f64, observer: &mut O) -> CycleOutput {
        let iteration = self.clock.advance(now);
        let now = self.clock.now_secs;
        observer.on_cycle_start(iteration, now);

        let mut out = CycleOutput::default();
        let mut events = std::mem::take(&mut self.pending_events);
        let mut warns = std::mem::take(&mut self.pending_warns);
        for e in &mut events {
            e.time = now;
            e.iteration = iteration;
        }
        for (name, value) in std::mem::take(&mut self.pending_init) {
            self.store.post(&name, value, now);
        }

        // ── ① Modes ───────────────────────────────────────────────────────
        let modes = self.modes.evaluate(&mut self.store, now);

        // ── ②③ Spawning ───────────────────────────────────────────────────
        let spawned = self.process_spawns(now, iteration, &mut events, &mut warns);

        // ── ④ Advance ─────────────────────────────────────────────────────
        let ctx = BehaviorContext::new(now, iteration, &self.store, &self.domain);
        let mut summary = CycleSummary { iteration, time: now, spawned, ..Default::default() };
        for b in &mut self.behaviors {
            match b.advance(&ctx) {
                RunState::Idle      => summary.idle += 1,
                RunState::Running   => summary.running += 1,
                RunState::Completed => summary.completed += 1,
            }
            out.messages.extend(b.take_messages());
            warns.extend(b.take_warnings());
        }

        // ── ⑤ Retire ──────────────────────────────────────────────────────
        let before = self.behaviors.len();
        self.behaviors.retain(|b| {
            let retire = b.state() == RunState::Completed && !b.is_perpetual();
            if retire {
                info!(behavior = b.name(), "behavior retired");
                events.push(LifeEvent {
                    time:          now,
                    iteration,
                    kind:          LifeEventKind::Retire,
                    behavior:      b.name().to_string(),
                    behavior_type: b.type_name().to_string(),
                    spawn_string:  String::new(),
                });
            }
            !retire
        });
        summary.retired = before - self.behaviors.len();
        self.retired_total += summary.retired as u64;

        // ── ⑥ Reports ─────────────────────────────────────────────────────
        out.reports = self.behaviors.iter_mut().filter_map(Behavior::take_report).collect();
        summary.active = out.reports.len();

        // ── ⑦ Statistics and status ───────────────────────────────────────
        summary.spawned_total = self.spawned_total;
        summary.retired_total = self.retired_total;
        summary.modes = modes.to_string();
        summary.modes_changed = modes.changed;
        summary.warnings = warns.len();

        self.publish(&mut out.messages, &modes, &summary, &events, &warns, observer);
        for e in &events {
            observer.on_life_event(e);
        }
        for w in &warns {
            observer.on_warning(w);
        }
        self.warnings.extend(warns);
        let cap = self.config.warning_history;
        if self.warnings.len() > cap {
            let excess = self.warnings.len() - cap;
            self.warnings.drain(..excess);
        }

        self.store.clear_deltas();
        observer.on_cycle_end(&summary);
        debug!(summary = %summary, "cycle complete");
        out.summary = summary;
        out
    }

    /// Signal the end of the run to `observer`.
    pub fn finish<O: ArbiterObserver>(&mut self, observer: &mut O) {
        observer.on_finish(self.clock.iteration);
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    /// Create behaviors requested by this cycle's trigger postings.
    /// Returns how many were created.
    fn process_spawns(
        &mut self,
        now:       f64,
        iteration: Iteration,
        events:    &mut Vec<LifeEvent>,
        warns:     &mut Vec<String>,
    ) -> usize {
        let mut requests: Vec<(usize, usize, String)> = Vec::new();
        for (i, (_, t)) in self.templates.iter().enumerate() {
            if let Some(trigger) = t.trigger() {
                let deltas = self.store.query_deltas(trigger).iter().enumerate();
                requests.extend(deltas.map(|(d, p)| (i, d, p.value.to_string())));
            }
        }

        let mut created = 0;
        for (i, delta, text) in requests {
            match self.spawn_one(i, delta, &text) {
                Ok(Some(b)) => {
                    info!(behavior = b.name(), spawn = %text, "behavior spawned");
                    events.push(LifeEvent {
                        time:          now,
                        iteration,
                        kind:          LifeEventKind::Spawn,
                        behavior:      b.name().to_string(),
                        behavior_type: b.type_name().to_string(),
                        spawn_string:  text,
                    });
                    self.behaviors.push(b);
                    self.spawned_total += 1;
                    created += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(spawn = %text, error = %e, "spawn rejected");
                    warns.push(format!("spawn {text:?}: {e}"));
                }
            }
        }
        created
    }

    /// Instantiate from one trigger posting, the `delta`-th posting of the
    /// trigger variable this cycle.  `Ok(None)` when the posting is an
    /// update for live instances of the same template: either it names one,
    /// or it names none and some exist.  Spawn and clone templates share
    /// their trigger with the instances' `updates` variable, so a posting
    /// naming a live instance of the same template is how that instance is
    /// re-tuned, not a collision.
    fn spawn_one(&mut self, idx: usize, delta: usize, text: &str) -> ArbiterResult<Option<Behavior>> {
        let (tid, template) = &self.templates[idx];
        let fields = parse_fields(text)?;
        let Some(name) = name_field(&fields) else {
            if self.behaviors.iter().any(|b| b.template() == *tid) {
                return Ok(None);
            }
            return Err(ArbiterError::Config("spawn posting has no name= field".into()));
        };

        if let Some(live) = self.behaviors.iter().find(|b| b.name() == name) {
            if live.template() == *tid {
                debug!(behavior = name, update = %text, "trigger names a live instance; treated as update");
                return Ok(None);
            }
            return Err(ArbiterError::NameCollision {
                name:   name.to_string(),
                origin: format!("{} spawn", template.kind),
            });
        }

        let live_source = match template.templating {
            Templating::Clone => self
                .behaviors
                .iter()
                .find(|b| b.template() == *tid && Some(b.name()) == template.name()),
            _ => None,
        };
        let mut behavior = match live_source {
            Some(src) => src.duplicate(name),
            None => {
                let mut b = self.registry.instantiate(template)?;
                b.set_param("name", name)?;
                b
            }
        };

        let params: Vec<(String, String)> = fields.iter().filter(|(k, _)| k != "name").cloned().collect();
        behavior.set_params(&params)?;
        behavior.finish_config()?;
        behavior.mark_applied(text, delta);
        behavior.assign_ids(self.next_id, *tid);
        self.next_id = self.next_id.next();
        Ok(Some(behavior))
    }

    // ── Status publishing ─────────────────────────────────────────────────

    fn publish<O: ArbiterObserver>(
        &mut self,
        messages: &mut Vec<Message>,
        modes:    &ModeSummary,
        summary:  &CycleSummary,
        events:   &[LifeEvent],
        warns:    &[String],
        observer: &mut O,
    ) {
        let cfg = &self.config;
        if cfg.publish_modes && modes.changed {
            messages.push(Message::new(&cfg.mode_var, modes.to_string()));
        }
        for e in events {
            messages.push(Message::new(&cfg.life_event_var, e.to_string()));
        }
        for w in warns {
            messages.push(Message::new(&cfg.warning_var, w.as_str()));
        }

        let due = self
            .last_status
            .is_none_or(|last| summary.time - last >= cfg.status_interval_secs);
        if !due {
            return;
        }
        self.last_status = Some(summary.time);
        messages.push(Message::new(&cfg.summary_var, summary.to_string()));
        let statuses = self.statuses();
        for s in &statuses {
            messages.push(Message::new(&self.config.status_var, s.to_string()));
        }
        observer.on_status(summary.iteration, &statuses);
    }
}
