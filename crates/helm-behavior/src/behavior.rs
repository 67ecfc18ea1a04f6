//! `Behavior` — one live behavior instance and its run-state machine.
//!
//! # Per-cycle order
//!
//! ```text
//! advance(ctx):
//!   ① updates     — apply new postings of the `updates` variable
//!   ② reset       — a matching `duration_reset` posting zeroes the clock
//!   ③ clock       — account for the interval since the previous cycle
//!   ④ state       — completed (sticky) → conditions → duration → no-starve
//!                   → running
//!   ⑤ output      — running behaviors build and reflect their objectives
//!   ⑥ flags       — queue run/idle/end and active/inactive flags
//! ```

use std::fmt;

use helm_core::{BehaviorId, LogicCondition, TemplateId, Value};
use helm_ivp::{ObjectiveFunction, Reflector};
use tracing::{debug, warn};

use crate::fields::{is_toggle, name_field, parse_bool, parse_fields};
use crate::kinds::{parse_f64, BehaviorKind};
use crate::{
    BehaviorContext, BehaviorError, BehaviorReport, BehaviorResult, BehaviorStatus, DurationClock,
    FlagKind, FlagSet, Message, RunState, StateReason,
};

/// Reflector settings accepted directly as behavior parameters.
const REFLECTOR_KEYS: &[&str] = &[
    "uniform_piece", "uniform_amount", "refine_region", "refine_piece", "smart_amount",
    "smart_percent", "smart_thresh", "auto_peak", "auto_peak_max_pcs", "strict_range", "degree",
];

// ── BaseConfig ────────────────────────────────────────────────────────────────

/// Parameters every behavior type shares.
#[derive(Clone, Debug, Default)]
struct BaseConfig {
    name:            String,
    priority_wt:     f64,
    duration:        Option<f64>,
    idle_decay:      bool,
    duration_reset:  Option<(String, Value)>,
    duration_status: Option<String>,
    perpetual:       bool,
    conditions:      Vec<LogicCondition>,
    flags:           FlagSet,
    /// `(variable, max age in seconds)`
    nostarve:        Vec<(String, f64)>,
    updates:         Option<String>,
    build_info:      Vec<(String, String)>,
}

impl BaseConfig {
    fn new() -> Self {
        Self { priority_wt: 100.0, ..Default::default() }
    }

    /// `Ok(false)` if `key` is not a shared parameter.
    fn set_param(&mut self, key: &str, value: &str) -> BehaviorResult<bool> {
        let bad = |reason: String| BehaviorError::Config(format!("{key}: {reason}"));
        // `toggle` flips the current setting.
        let flag = |current: bool, value: &str| {
            if value.trim().eq_ignore_ascii_case("toggle") {
                return Ok(!current);
            }
            parse_bool(value).ok_or_else(|| bad(format!("expected a boolean, got {value:?}")))
        };

        match key {
            "name" => {
                let v = value.trim();
                if v.is_empty() || v.contains(char::is_whitespace) {
                    return Err(bad(format!("bad behavior name {value:?}")));
                }
                self.name = v.to_string();
            }
            "pwt" | "priority" => {
                let w = parse_f64(key, value)?;
                if w < 0.0 {
                    return Err(bad(format!("priority must be >= 0, got {w}")));
                }
                self.priority_wt = w;
            }
            "duration" => {
                self.duration = match value.trim().to_ascii_lowercase().as_str() {
                    "no-time-limit" | "none" => None,
                    _ => match parse_f64(key, value)? {
                        d if d > 0.0 => Some(d),
                        d => return Err(bad(format!("duration must be > 0, got {d}"))),
                    },
                };
            }
            "duration_idle_decay" => self.idle_decay = flag(self.idle_decay, value)?,
            "duration_reset" => {
                let m = Message::parse(value)?;
                self.duration_reset = Some((m.var, m.value));
            }
            "duration_status" => self.duration_status = Some(var_name(key, value)?),
            "perpetual" => self.perpetual = flag(self.perpetual, value)?,
            "condition" => self.conditions.push(LogicCondition::parse(value)?),
            "nostarve" => self.nostarve.extend(parse_nostarve(value).map_err(bad)?),
            "updates" => self.updates = Some(var_name(key, value)?),
            "build_info" => {
                for (k, v) in parse_fields(value)? {
                    self.set_build_info(&k, &v)?;
                }
            }
            k if REFLECTOR_KEYS.contains(&k) => self.set_build_info(k, value)?,
            k => match FlagKind::from_param(k) {
                Some(kind) => self.flags.add(kind, Message::parse(value)?),
                None => return Ok(false),
            },
        }
        Ok(true)
    }

    /// Refinement regions accumulate; every other setting replaces any
    /// earlier value for the same key.
    fn set_build_info(&mut self, key: &str, value: &str) -> BehaviorResult<()> {
        if !REFLECTOR_KEYS.contains(&key) {
            return Err(BehaviorError::Config(format!("unknown build_info setting {key:?}")));
        }
        let accumulates = key.starts_with("refine_");
        if !accumulates {
            self.build_info.retain(|(k, _)| k != key);
        }
        self.build_info.push((key.to_string(), value.trim().to_string()));
        Ok(())
    }
}

fn var_name(key: &str, value: &str) -> BehaviorResult<String> {
    let v = value.trim();
    if v.is_empty() || v.contains(char::is_whitespace) {
        return Err(BehaviorError::Config(format!("{key}: bad variable name {value:?}")));
    }
    Ok(v.to_string())
}

/// `VAR[,VAR...],SECS`
fn parse_nostarve(value: &str) -> Result<Vec<(String, f64)>, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    let [vars @ .., secs] = parts.as_slice() else {
        return Err("expected VAR,...,SECONDS".into());
    };
    if vars.is_empty() {
        return Err("no variables given".into());
    }
    let secs = secs
        .parse::<f64>()
        .ok()
        .filter(|s| *s > 0.0)
        .ok_or_else(|| format!("bad starvation window {secs:?}"))?;
    Ok(vars.iter().map(|v| (v.to_string(), secs)).collect())
}

// ── Behavior ──────────────────────────────────────────────────────────────────

/// A configured behavior: shared configuration, run-state, and its kind.
///
/// The arbiter talks to it only through [`advance`][Self::advance],
/// [`take_report`][Self::take_report], [`take_messages`][Self::take_messages]
/// and [`status`][Self::status].
pub struct Behavior {
    id:           BehaviorId,
    template:     TemplateId,
    config:       BaseConfig,
    kind:         Box<dyn BehaviorKind>,
    clock:        DurationClock,
    state:        RunState,
    entered:      Option<RunState>,
    reason:       StateReason,
    active:       bool,
    reset_armed:  bool,
    last_update:  Option<String>,
    /// Index of the `updates` delta that created this behavior; it and
    /// anything before it are skipped on the first cycle.
    spawn_delta:  Option<usize>,
    good_updates: u32,
    bad_updates:  u32,
    report:       Option<BehaviorReport>,
    messages:     Vec<Message>,
    warnings:     Vec<String>,
    /// Warnings raised in the previous and current cycle, for suppressing
    /// repeats.
    prev_warned:  Vec<String>,
    cycle_warned: Vec<String>,
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("name", &self.config.name)
            .field("kind", &self.kind.type_name())
            .field("state", &self.state)
            .finish()
    }
}

impl Behavior {
    /// A behavior of `kind` with default shared parameters and no name.
    pub fn new(kind: Box<dyn BehaviorKind>) -> Self {
        Self {
            id:           BehaviorId::INVALID,
            template:     TemplateId::INVALID,
            config:       BaseConfig::new(),
            kind,
            clock:        DurationClock::default(),
            state:        RunState::Idle,
            entered:      None,
            reason:       StateReason::Pending,
            active:       false,
            reset_armed:  false,
            last_update:  None,
            spawn_delta:  None,
            good_updates: 0,
            bad_updates:  0,
            report:       None,
            messages:     Vec::new(),
            warnings:     Vec::new(),
            prev_warned:  Vec::new(),
            cycle_warned: Vec::new(),
        }
    }

    // ── Identity ──────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn id(&self) -> BehaviorId {
        self.id
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    /// Set by the arbiter when the behavior goes live.
    pub fn assign_ids(&mut self, id: BehaviorId, template: TemplateId) {
        self.id = id;
        self.template = template;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_perpetual(&self) -> bool {
        self.config.perpetual
    }

    pub fn priority_wt(&self) -> f64 {
        self.config.priority_wt
    }

    pub fn updates_var(&self) -> Option<&str> {
        self.config.updates.as_deref()
    }

    pub fn conditions(&self) -> &[LogicCondition] {
        &self.config.conditions
    }

    // ── Configuration ─────────────────────────────────────────────────────

    /// Apply one parameter: shared keys first, then the kind's own.
    pub fn set_param(&mut self, key: &str, value: &str) -> BehaviorResult<()> {
        let key = key.trim().to_ascii_lowercase();
        let wrap = |e: BehaviorError, name: &str| match e {
            BehaviorError::Parameter { .. } => e,
            other => BehaviorError::Parameter {
                behavior: name.to_string(),
                param:    key.clone(),
                reason:   other.to_string(),
            },
        };
        let handled = match self.config.set_param(&key, value) {
            Ok(true) => true,
            Ok(false) => self.kind.set_param(&key, value).map_err(|e| wrap(e, &self.config.name))?,
            Err(e) => return Err(wrap(e, &self.config.name)),
        };
        if !handled {
            return Err(BehaviorError::Parameter {
                behavior: self.config.name.clone(),
                param:    key.clone(),
                reason:   format!("not a parameter of {}", self.kind.type_name()),
            });
        }
        Ok(())
    }

    /// Apply several parameters as one unit: either all succeed or the
    /// behavior is left untouched.
    pub fn set_params(&mut self, params: &[(String, String)]) -> BehaviorResult<()> {
        let saved_config = self.config.clone();
        let saved_kind = self.kind.clone_box();
        for (k, v) in params {
            if let Err(e) = self.set_param(k, v) {
                self.config = saved_config;
                self.kind = saved_kind;
                return Err(e);
            }
        }
        Ok(())
    }

    /// A fresh instance with this behavior's current parameters under a new
    /// name.  Run-state, clock, and counters start over.
    pub fn duplicate(&self, name: &str) -> Behavior {
        let mut b = Behavior::new(self.kind.clone_box());
        b.config = self.config.clone();
        b.config.name = name.to_string();
        b.template = self.template;
        b
    }

    /// Record that `posting`, found at `delta_index` among this cycle's
    /// postings of the `updates` variable, created this behavior.  It is
    /// not applied again as an update, even if it contains `toggle`.
    pub fn mark_applied(&mut self, posting: &str, delta_index: usize) {
        self.last_update = Some(posting.to_string());
        self.spawn_delta = Some(delta_index);
    }

    /// Arm the clock once all parameters are in.
    pub fn finish_config(&mut self) -> BehaviorResult<()> {
        if self.config.name.is_empty() {
            return Err(BehaviorError::Config(format!("{} has no name", self.kind.type_name())));
        }
        self.clock.set_limit(self.config.duration);
        self.clock.set_idle_decay(self.config.idle_decay);
        Ok(())
    }

    // ── Per-cycle ─────────────────────────────────────────────────────────

    /// Run one cycle of the state machine and return the resulting state.
    pub fn advance(&mut self, ctx: &BehaviorContext<'_>) -> RunState {
        self.report = None;
        self.prev_warned = std::mem::take(&mut self.cycle_warned);
        self.apply_updates(ctx);
        self.check_duration_reset(ctx);
        self.clock.update(ctx.now);

        let (state, reason) = self.next_state(ctx);
        let entering = self.entered != Some(state);
        self.state = state;
        self.reason = reason;
        self.clock.set_counting(state == RunState::Running);

        if state == RunState::Running {
            self.report = self.build_report(ctx);
            if let (Some(var), Some(left)) = (&self.config.duration_status, self.clock.remaining()) {
                self.messages.push(Message::new(var, left));
            }
        }

        if entering {
            let kind = match state {
                RunState::Idle      => FlagKind::Idle,
                RunState::Running   => FlagKind::Run,
                RunState::Completed => FlagKind::End,
            };
            debug!(behavior = %self.config.name, state = %state, reason = %self.reason, "behavior state change");
            self.config.flags.fire(kind, &mut self.messages);
        }
        self.entered = Some(state);

        let now_active = self.report.is_some();
        if now_active != self.active {
            let kind = if now_active { FlagKind::Active } else { FlagKind::Inactive };
            self.config.flags.fire(kind, &mut self.messages);
            self.active = now_active;
        }
        state
    }

    fn next_state(&mut self, ctx: &BehaviorContext<'_>) -> (RunState, StateReason) {
        if self.state == RunState::Completed {
            if !self.config.perpetual || !self.reset_armed {
                return (RunState::Completed, StateReason::Duration);
            }
            self.reset_armed = false;
            self.clock.reset();
            self.clock.update(ctx.now);
            return (RunState::Idle, StateReason::Reset);
        }

        if !self.config.conditions.iter().all(|c| c.evaluate(ctx.store)) {
            return (RunState::Idle, StateReason::Conditions);
        }

        if self.clock.expired() {
            if self.config.perpetual {
                self.reset_armed = true;
            }
            return (RunState::Completed, StateReason::Duration);
        }

        for (var, window) in &self.config.nostarve {
            let stale = ctx.store.query_age(var, ctx.now).is_none_or(|age| age > *window);
            if stale {
                return (RunState::Idle, StateReason::Starved(var.clone()));
            }
        }

        (RunState::Running, StateReason::Ok)
    }

    fn apply_updates(&mut self, ctx: &BehaviorContext<'_>) {
        let Some(var) = self.config.updates.clone() else {
            return;
        };
        let skip = self.spawn_delta.take();
        for (i, posting) in ctx.store.query_deltas(&var).iter().enumerate() {
            if skip.is_some_and(|s| i <= s) {
                continue;
            }
            let text = posting.value.to_string();
            if self.last_update.as_deref() == Some(text.as_str()) && !is_toggle(&text) {
                continue;
            }
            let fields = match parse_fields(&text) {
                Ok(f) => f,
                Err(e) => {
                    self.reject_update(&text, e);
                    continue;
                }
            };
            if name_field(&fields).is_some_and(|n| n != self.config.name) {
                continue;
            }
            self.last_update = Some(text.clone());
            let params: Vec<(String, String)> =
                fields.into_iter().filter(|(k, _)| k != "name").collect();
            match self.set_params(&params) {
                Ok(()) => {
                    self.good_updates += 1;
                    self.clock.set_limit(self.config.duration);
                    self.clock.set_idle_decay(self.config.idle_decay);
                    debug!(behavior = %self.config.name, update = %text, "applied update");
                }
                Err(e) => self.reject_update(&text, e),
            }
        }
    }

    fn reject_update(&mut self, text: &str, e: BehaviorError) {
        self.bad_updates += 1;
        warn!(behavior = %self.config.name, update = %text, error = %e, "rejected update");
        self.warnings.push(format!("{}: rejected update {text:?}: {e}", self.config.name));
    }

    fn check_duration_reset(&mut self, ctx: &BehaviorContext<'_>) {
        let Some((var, want)) = &self.config.duration_reset else {
            return;
        };
        let hit = ctx.store.query_deltas(var).iter().any(|p| values_match(&p.value, want));
        if hit {
            debug!(behavior = %self.config.name, "duration reset");
            self.clock.reset();
            if self.state == RunState::Completed && self.config.perpetual {
                self.reset_armed = true;
            }
        }
    }

    fn build_report(&mut self, ctx: &BehaviorContext<'_>) -> Option<BehaviorReport> {
        let objectives = match self.kind.on_run(ctx, &mut self.messages) {
            Ok(o) => o,
            Err(e) => {
                self.warn(format!("objective construction failed: {e}"));
                return None;
            }
        };

        let mut report = BehaviorReport::new(&self.config.name, ctx.iteration, self.config.priority_wt);
        for (key, of) in objectives {
            match self.reflect(of) {
                Ok(function) => report.add_function(&key, function),
                Err(msg) => self.warn(format!("{key}: {msg}")),
            }
        }
        (!report.is_empty()).then_some(report)
    }

    fn reflect(&self, mut of: ObjectiveFunction) -> Result<helm_ivp::PieceFunction, String> {
        of.initialize().map_err(|e| e.to_string())?;
        let mut reflector = Reflector::new(&of);
        if self.config.build_info.is_empty() {
            for (k, v) in self.kind.default_build_info() {
                reflector.set_param(k, v);
            }
        } else {
            for (k, v) in &self.config.build_info {
                reflector.set_param(k, v);
            }
        }
        if reflector.create() == 0 {
            return Err(reflector.warnings().join("; "));
        }
        let mut function = reflector
            .extract_function()
            .ok_or_else(|| "reflector produced no function".to_string())?;
        function.set_priority_wt(self.config.priority_wt);
        Ok(function)
    }

    /// Raise `msg` unless the same warning was raised last cycle.
    fn warn(&mut self, msg: String) {
        let repeat = self.prev_warned.contains(&msg);
        self.cycle_warned.push(msg.clone());
        if repeat {
            return;
        }
        warn!(behavior = %self.config.name, warning = %msg, "behavior warning");
        self.warnings.push(format!("{}: {msg}", self.config.name));
    }

    // ── Outputs ───────────────────────────────────────────────────────────

    /// The report produced by the last `advance`, if it was running and had
    /// something to say.
    pub fn take_report(&mut self) -> Option<BehaviorReport> {
        self.report.take()
    }

    /// Flags and other postings queued since the last call.
    pub fn take_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    pub fn status(&self) -> BehaviorStatus {
        BehaviorStatus {
            id:           self.id,
            name:         self.config.name.clone(),
            kind:         self.kind.type_name().to_string(),
            priority_wt:  self.config.priority_wt,
            state:        self.state,
            reason:       self.reason.clone(),
            active:       self.active,
            good_updates: self.good_updates,
            bad_updates:  self.bad_updates,
            elapsed_secs: self.clock.elapsed(),
        }
    }
}

fn values_match(posted: &Value, want: &Value) -> bool {
    match (posted.as_f64(), want.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => posted.to_string().eq_ignore_ascii_case(&want.to_string()),
    }
}
