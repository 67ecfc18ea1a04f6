//! Unit tests for helm-arbiter.

use helm_behavior::{BehaviorStatus, BehaviorTemplate, Message};
use helm_core::Iteration;
use helm_ivp::DecisionDomain;
use helm_mode::ModeEntry;

use crate::{
    Arbiter, ArbiterBuilder, ArbiterConfig, ArbiterObserver, CycleOutput, CycleSummary, LifeEvent,
    LifeEventKind, NoopObserver,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn domain() -> DecisionDomain {
    DecisionDomain::new()
        .with_axis("course", 0.0, 359.0, 360)
        .unwrap()
        .with_axis("speed", 0.0, 4.0, 5)
        .unwrap()
}

fn template(kind: &str, params: &[(&str, &str)]) -> BehaviorTemplate {
    let mut t = BehaviorTemplate::new(kind);
    for (k, v) in params {
        t.push_param(k, v).unwrap();
    }
    t
}

fn heading(name: &str, extra: &[(&str, &str)]) -> BehaviorTemplate {
    let mut params = vec![("name", name), ("heading", "90")];
    params.extend_from_slice(extra);
    template("BHV_ConstantHeading", &params)
}

fn names(arbiter: &Arbiter) -> Vec<&str> {
    arbiter.behaviors().iter().map(|b| b.name()).collect()
}

fn posted<'a>(out: &'a CycleOutput, var: &str) -> Vec<&'a Message> {
    out.messages.iter().filter(|m| m.var == var).collect()
}

/// Observer that records everything it is told.
#[derive(Default)]
struct Recorder {
    starts:   usize,
    ends:     Vec<CycleSummary>,
    events:   Vec<LifeEvent>,
    warnings: Vec<String>,
    statuses: Vec<(Iteration, Vec<BehaviorStatus>)>,
    finished: Option<Iteration>,
}

impl ArbiterObserver for Recorder {
    fn on_cycle_start(&mut self, _iteration: Iteration, _now: f64) {
        self.starts += 1;
    }
    fn on_life_event(&mut self, event: &LifeEvent) {
        self.events.push(event.clone());
    }
    fn on_warning(&mut self, warning: &str) {
        self.warnings.push(warning.to_string());
    }
    fn on_status(&mut self, iteration: Iteration, statuses: &[BehaviorStatus]) {
        self.statuses.push((iteration, statuses.to_vec()));
    }
    fn on_cycle_end(&mut self, summary: &CycleSummary) {
        self.ends.push(summary.clone());
    }
    fn on_finish(&mut self, last: Iteration) {
        self.finished = Some(last);
    }
}

// ── ArbiterBuilder ────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn domain_without_axes_errors() {
        assert!(ArbiterBuilder::new(DecisionDomain::new()).build().is_err());
    }

    #[test]
    fn startup_behaviors_are_live_in_declared_order() {
        let arbiter = ArbiterBuilder::new(domain())
            .template(heading("a", &[]))
            .template(template("BHV_ConstantSpeed", &[("name", "b"), ("speed", "2")]))
            .build()
            .unwrap();
        assert_eq!(names(&arbiter), ["a", "b"]);
        assert!(arbiter.warnings().is_empty());
    }

    #[test]
    fn failing_template_is_excluded_with_warning() {
        let mut rec = Recorder::default();
        let mut arbiter = ArbiterBuilder::new(domain())
            .template(template("BHV_NoSuchThing", &[("name", "x")]))
            .template(heading("ok", &[]))
            .template(heading("bad", &[("pwt", "-3")]))
            .build()
            .unwrap();
        assert_eq!(names(&arbiter), ["ok"]);

        // Build-time warnings surface on the first cycle.
        let out = arbiter.run_cycle(0.0, &mut rec);
        assert_eq!(rec.warnings.len(), 2);
        assert_eq!(arbiter.warnings().len(), 2);
        assert_eq!(posted(&out, "HELM_WARNING").len(), 2);
        assert_eq!(out.summary.warnings, 2);
    }

    #[test]
    fn duplicate_startup_name_keeps_first() {
        let arbiter = ArbiterBuilder::new(domain())
            .template(heading("dup", &[]))
            .template(template("BHV_ConstantSpeed", &[("name", "dup"), ("speed", "1")]))
            .build()
            .unwrap();
        assert_eq!(arbiter.behaviors().len(), 1);
        assert_eq!(arbiter.behaviors()[0].type_name(), "BHV_ConstantHeading");
    }

    #[test]
    fn spawn_template_is_not_live_at_startup() {
        let arbiter = ArbiterBuilder::new(domain())
            .template(heading("proto", &[("templating", "spawn"), ("updates", "NEW_HDG")]))
            .build()
            .unwrap();
        assert!(arbiter.behaviors().is_empty());
        assert_eq!(arbiter.templates().count(), 1);
    }
}

// ── Cycle ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cycle_tests {
    use super::*;

    #[test]
    fn unset_condition_variable_keeps_behavior_idle() {
        let mut arbiter = ArbiterBuilder::new(domain())
            .template(heading("h", &[("condition", "NAV_SPEED > 2")]))
            .build()
            .unwrap();

        let out = arbiter.run_cycle(0.0, &mut NoopObserver);
        assert_eq!((out.summary.idle, out.summary.running), (1, 0));
        assert!(out.reports.is_empty());

        arbiter.post("NAV_SPEED", 3.0, 0.5);
        let out = arbiter.run_cycle(1.0, &mut NoopObserver);
        assert_eq!((out.summary.idle, out.summary.running), (0, 1));
        assert_eq!(out.reports.len(), 1);
        assert_eq!(out.reports[0].behavior, "h");
        assert_eq!(out.summary.active, 1);
    }

    #[test]
    fn iteration_counts_from_one() {
        let mut arbiter = ArbiterBuilder::new(domain()).template(heading("h", &[])).build().unwrap();
        assert_eq!(arbiter.run_cycle(0.0, &mut NoopObserver).summary.iteration, Iteration(1));
        assert_eq!(arbiter.run_cycle(1.0, &mut NoopObserver).summary.iteration, Iteration(2));
        assert_eq!(arbiter.iteration(), Iteration(2));
    }

    #[test]
    fn startup_life_events_on_first_cycle() {
        let mut rec = Recorder::default();
        let mut arbiter = ArbiterBuilder::new(domain())
            .template(heading("a", &[]))
            .template(heading("b", &[]))
            .build()
            .unwrap();

        let out = arbiter.run_cycle(5.0, &mut rec);
        assert_eq!(rec.events.len(), 2);
        assert!(rec.events.iter().all(|e| e.kind == LifeEventKind::Spawn));
        assert!(rec.events.iter().all(|e| e.iteration == Iteration(1) && e.time == 5.0));
        assert_eq!(posted(&out, "HELM_LIFE_EVENT").len(), 2);

        arbiter.run_cycle(6.0, &mut rec);
        assert_eq!(rec.events.len(), 2);
    }

    #[test]
    fn completed_behavior_is_retired() {
        let mut rec = Recorder::default();
        let mut arbiter = ArbiterBuilder::new(domain())
            .template(heading("short", &[("duration", "2")]))
            .template(heading("long", &[]))
            .build()
            .unwrap();

        for t in 0..2 {
            let out = arbiter.run_cycle(t as f64, &mut rec);
            assert_eq!(out.summary.retired, 0);
        }
        let out = arbiter.run_cycle(2.0, &mut rec);
        assert_eq!(out.summary.completed, 1);
        assert_eq!(out.summary.retired, 1);
        assert_eq!(out.summary.retired_total, 1);
        assert_eq!(out.reports.len(), 1);
        assert_eq!(names(&arbiter), ["long"]);

        let retire: Vec<_> = rec.events.iter().filter(|e| e.kind == LifeEventKind::Retire).collect();
        assert_eq!(retire.len(), 1);
        assert_eq!(retire[0].behavior, "short");
        assert_eq!(retire[0].iteration, Iteration(3));
    }

    #[test]
    fn perpetual_behavior_survives_completion() {
        let mut arbiter = ArbiterBuilder::new(domain())
            .template(heading("p", &[("duration", "1"), ("perpetual", "true")]))
            .build()
            .unwrap();
        for t in 0..4 {
            let out = arbiter.run_cycle(t as f64, &mut NoopObserver);
            assert_eq!(out.summary.retired, 0);
        }
        assert_eq!(names(&arbiter), ["p"]);
    }

    #[test]
    fn initial_postings_precede_modes() {
        let mut arbiter = ArbiterBuilder::new(domain())
            .initial(vec![("DEPLOY".into(), "true".into())])
            .mode(ModeEntry::new("MODE").unwrap().with_rule(&["DEPLOY = true"], "ACTIVE").unwrap())
            .build()
            .unwrap();
        let out = arbiter.run_cycle(0.0, &mut NoopObserver);
        assert_eq!(out.summary.modes, "MODE=ACTIVE");
        assert_eq!(arbiter.store().query_string("MODE"), Some("ACTIVE"));
    }

    #[test]
    fn transit_mode_stays_inactive_and_publishes_once() {
        let entry = ModeEntry::new("TRANSIT")
            .unwrap()
            .with_rule(&["WPT_COMPLETE = true"], "ACTIVE")
            .unwrap()
            .with_default("INACTIVE")
            .unwrap();
        let mut arbiter = ArbiterBuilder::new(domain()).mode(entry).build().unwrap();

        let mut published = 0;
        for t in 0..5 {
            let out = arbiter.run_cycle(t as f64, &mut NoopObserver);
            assert_eq!(out.summary.modes, "TRANSIT=INACTIVE");
            published += posted(&out, "HELM_MODE").len();
        }
        assert_eq!(published, 1);
    }

    #[test]
    fn flags_are_returned_as_messages() {
        let mut arbiter = ArbiterBuilder::new(domain())
            .template(heading("h", &[("runflag", "HDG_RUNNING=true")]))
            .build()
            .unwrap();
        let out = arbiter.run_cycle(0.0, &mut NoopObserver);
        assert_eq!(posted(&out, "HDG_RUNNING").len(), 1);
    }

    #[test]
    fn observer_sees_every_cycle_and_finish() {
        let mut rec = Recorder::default();
        let mut arbiter = ArbiterBuilder::new(domain()).template(heading("h", &[])).build().unwrap();
        for t in 0..3 {
            arbiter.run_cycle(t as f64, &mut rec);
        }
        arbiter.finish(&mut rec);
        assert_eq!(rec.starts, 3);
        assert_eq!(rec.ends.len(), 3);
        assert_eq!(rec.finished, Some(Iteration(3)));
    }

    #[test]
    fn settled_nested_mode_does_not_reset_duration() {
        let mut arbiter = ArbiterBuilder::new(domain())
            .mode(ModeEntry::new("MODE").unwrap().with_rule(&["DEPLOY = true"], "ACTIVE").unwrap())
            .mode(ModeEntry::new("MODE").unwrap().with_rule(&["MODE = ACTIVE"], "SURVEYING").unwrap())
            .initial(vec![("DEPLOY".to_string(), helm_core::Value::Str("true".into()))])
            .template(heading("leg", &[
                ("duration", "3"),
                ("duration_reset", "MODE=ACTIVE:SURVEYING"),
            ]))
            .build()
            .unwrap();

        for t in 0..10 {
            let out = arbiter.run_cycle(t as f64, &mut NoopObserver);
            assert_eq!(out.summary.modes, "MODE=ACTIVE:SURVEYING");
        }
        assert!(arbiter.behavior("leg").is_none());
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod spawn_tests {
    use super::*;

    fn spawner() -> Arbiter {
        ArbiterBuilder::new(domain())
            .template(heading("proto", &[("templating", "spawn"), ("updates", "NEW_HDG")]))
            .template(template("BHV_ConstantSpeed", &[("name", "cruise"), ("speed", "2")]))
            .build()
            .unwrap()
    }

    #[test]
    fn posting_spawns_named_instance() {
        let mut rec = Recorder::default();
        let mut arbiter = spawner();
        arbiter.run_cycle(0.0, &mut rec);

        arbiter.post("NEW_HDG", "name=east # heading=100 # pwt=300", 0.5);
        let out = arbiter.run_cycle(1.0, &mut rec);
        assert_eq!(out.summary.spawned, 1);
        assert_eq!(out.summary.spawned_total, 1);
        assert_eq!(names(&arbiter), ["cruise", "east"]);
        assert_eq!(arbiter.behavior("east").unwrap().priority_wt(), 300.0);
        assert_eq!(out.reports.len(), 2);

        let spawn = rec.events.last().unwrap();
        assert_eq!(spawn.kind, LifeEventKind::Spawn);
        assert_eq!(spawn.behavior, "east");
        assert_eq!(spawn.spawn_string, "name=east # heading=100 # pwt=300");
        assert_eq!(arbiter.behavior("east").unwrap().status().good_updates, 0);
    }

    #[test]
    fn spawned_instances_get_increasing_ids() {
        let mut arbiter = spawner();
        arbiter.post("NEW_HDG", "name=one", 0.0);
        arbiter.post("NEW_HDG", "name=two", 0.0);
        arbiter.run_cycle(0.0, &mut NoopObserver);
        let one = arbiter.behavior("one").unwrap().id();
        let two = arbiter.behavior("two").unwrap().id();
        assert!(one < two);
        assert!(arbiter.behavior("cruise").unwrap().id() < one);
    }

    #[test]
    fn spawn_naming_other_live_behavior_is_rejected() {
        let mut rec = Recorder::default();
        let mut arbiter = spawner();
        arbiter.run_cycle(0.0, &mut rec);

        arbiter.post("NEW_HDG", "name=cruise # heading=10", 0.5);
        let out = arbiter.run_cycle(1.0, &mut rec);
        assert_eq!(out.summary.spawned, 0);
        assert_eq!(names(&arbiter), ["cruise"]);
        assert_eq!(rec.warnings.len(), 1);
        assert!(rec.warnings[0].contains("cruise"));
    }

    #[test]
    fn repeated_name_updates_instead_of_spawning() {
        let mut arbiter = spawner();
        arbiter.post("NEW_HDG", "name=east # heading=100", 0.0);
        arbiter.run_cycle(0.0, &mut NoopObserver);

        arbiter.post("NEW_HDG", "name=east # pwt=42", 0.5);
        let out = arbiter.run_cycle(1.0, &mut NoopObserver);
        assert_eq!(out.summary.spawned, 0);
        assert_eq!(arbiter.behaviors().iter().filter(|b| b.name() == "east").count(), 1);
        let east = arbiter.behavior("east").unwrap();
        assert_eq!(east.priority_wt(), 42.0);
        assert_eq!(east.status().good_updates, 1);
        assert!(arbiter.warnings().is_empty());
    }

    #[test]
    fn spawn_without_name_is_a_warning() {
        let mut arbiter = spawner();
        arbiter.post("NEW_HDG", "heading=100", 0.0);
        let out = arbiter.run_cycle(0.0, &mut NoopObserver);
        assert_eq!(out.summary.spawned, 0);
        assert_eq!(arbiter.warnings().len(), 1);
    }

    #[test]
    fn bad_spawn_parameters_create_nothing() {
        let mut arbiter = spawner();
        arbiter.post("NEW_HDG", "name=east # pwt=-1", 0.0);
        arbiter.run_cycle(0.0, &mut NoopObserver);
        assert!(arbiter.behavior("east").is_none());
        assert_eq!(arbiter.warnings().len(), 1);
    }

    #[test]
    fn clone_inherits_live_parameters() {
        let mut arbiter = ArbiterBuilder::new(domain())
            .template(heading("lead", &[("templating", "clone"), ("updates", "HDG_UPD")]))
            .build()
            .unwrap();
        arbiter.run_cycle(0.0, &mut NoopObserver);

        arbiter.post("HDG_UPD", "name=lead # pwt=250", 0.5);
        arbiter.run_cycle(1.0, &mut NoopObserver);
        assert_eq!(arbiter.behavior("lead").unwrap().priority_wt(), 250.0);

        arbiter.post("HDG_UPD", "name=wing", 1.5);
        let out = arbiter.run_cycle(2.0, &mut NoopObserver);
        assert_eq!(out.summary.spawned, 1);
        assert_eq!(arbiter.behavior("wing").unwrap().priority_wt(), 250.0);
    }

    #[test]
    fn spawn_starts_from_static_configuration() {
        let mut arbiter = ArbiterBuilder::new(domain())
            .template(heading("lead", &[("templating", "spawn"), ("updates", "HDG_UPD")]))
            .build()
            .unwrap();
        arbiter.post("HDG_UPD", "name=first # pwt=250", 0.0);
        arbiter.run_cycle(0.0, &mut NoopObserver);

        arbiter.post("HDG_UPD", "name=second", 0.5);
        arbiter.run_cycle(1.0, &mut NoopObserver);
        assert_eq!(arbiter.behavior("first").unwrap().priority_wt(), 250.0);
        assert_eq!(arbiter.behavior("second").unwrap().priority_wt(), 100.0);
    }

    #[test]
    fn never_two_live_behaviors_with_one_name() {
        let mut arbiter = spawner();
        for (t, text) in ["name=x", "name=cruise", "name=x # heading=5", "name=y", "name=cruise"]
            .into_iter()
            .enumerate()
        {
            arbiter.post("NEW_HDG", text, t as f64);
            arbiter.run_cycle(t as f64, &mut NoopObserver);
            let mut seen = names(&arbiter);
            let live = seen.len();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), live);
        }
        assert_eq!(names(&arbiter), ["cruise", "x", "y"]);
    }

    #[test]
    fn spawn_fields_apply_exactly_once() {
        let mut arbiter = spawner();
        arbiter.post("NEW_HDG", "name=east # perpetual=toggle", 0.0);
        arbiter.run_cycle(0.0, &mut NoopObserver);
        let east = arbiter.behavior("east").unwrap();
        assert!(east.is_perpetual());
        assert_eq!(east.status().good_updates, 0);

        arbiter.run_cycle(1.0, &mut NoopObserver);
        assert!(arbiter.behavior("east").unwrap().is_perpetual());

        arbiter.post("NEW_HDG", "name=east # perpetual=toggle", 1.5);
        arbiter.run_cycle(2.0, &mut NoopObserver);
        let east = arbiter.behavior("east").unwrap();
        assert!(!east.is_perpetual());
        assert_eq!(east.status().good_updates, 1);
    }
}

// ── Status publishing ─────────────────────────────────────────────────────────

#[cfg(test)]
mod status_tests {
    use super::*;

    #[test]
    fn status_is_throttled_by_interval() {
        let mut rec = Recorder::default();
        let mut arbiter = ArbiterBuilder::new(domain())
            .template(heading("a", &[]))
            .template(heading("b", &[]))
            .build()
            .unwrap();

        let mut summaries = 0;
        let mut statuses = 0;
        for t in [0.0, 0.4, 0.8, 1.2, 1.6, 2.0] {
            let out = arbiter.run_cycle(t, &mut rec);
            summaries += posted(&out, "HELM_SUMMARY").len();
            statuses += posted(&out, "HELM_BHV_STATUS").len();
        }
        // Due at 0.0 and 1.2; 2.0 is only 0.8 after the last one.
        assert_eq!(summaries, 2);
        assert_eq!(statuses, 4);
        assert_eq!(rec.statuses.len(), 2);
        assert_eq!(rec.statuses[1].0, Iteration(4));
    }

    #[test]
    fn zero_interval_publishes_every_cycle() {
        let config = ArbiterConfig { status_interval_secs: 0.0, ..Default::default() };
        let mut arbiter = ArbiterBuilder::new(domain())
            .config(config)
            .template(heading("a", &[]))
            .build()
            .unwrap();
        for t in 0..3 {
            let out = arbiter.run_cycle(t as f64 * 0.1, &mut NoopObserver);
            assert_eq!(posted(&out, "HELM_SUMMARY").len(), 1);
        }
    }

    #[test]
    fn custom_variable_names_are_used() {
        let config = ArbiterConfig {
            summary_var: "SUMMARY".into(),
            publish_modes: false,
            ..Default::default()
        };
        let entry = ModeEntry::new("M").unwrap().with_default("ON").unwrap();
        let mut arbiter = ArbiterBuilder::new(domain()).config(config).mode(entry).build().unwrap();
        let out = arbiter.run_cycle(0.0, &mut NoopObserver);
        assert_eq!(posted(&out, "SUMMARY").len(), 1);
        assert!(posted(&out, "HELM_SUMMARY").is_empty());
        assert!(posted(&out, "HELM_MODE").is_empty());
    }

    #[test]
    fn summary_text_lists_counts() {
        let mut arbiter = ArbiterBuilder::new(domain())
            .template(heading("h", &[("condition", "GO = true")]))
            .build()
            .unwrap();
        let out = arbiter.run_cycle(0.0, &mut NoopObserver);
        assert_eq!(
            out.summary.to_string(),
            "iter=1,idle=1,running=0,completed=0,active=0,spawned=0,retired=0",
        );
    }

    #[test]
    fn persistent_behavior_failure_warns_once() {
        let mut rec = Recorder::default();
        let mut arbiter = ArbiterBuilder::new(domain())
            .template(template("BHV_ConstantHeading", &[("name", "nohdg")]))
            .build()
            .unwrap();
        let mut published = 0;
        for t in 0..100 {
            let out = arbiter.run_cycle(t as f64, &mut rec);
            published += posted(&out, "HELM_WARNING").len();
        }
        assert_eq!(arbiter.warnings().len(), 1);
        assert_eq!(rec.warnings.len(), 1);
        assert_eq!(published, 1);
    }

    #[test]
    fn warning_history_is_capped() {
        let config = ArbiterConfig { warning_history: 3, ..Default::default() };
        let mut arbiter = ArbiterBuilder::new(domain())
            .config(config)
            .template(heading("proto", &[("templating", "spawn"), ("updates", "NEW_HDG")]))
            .build()
            .unwrap();
        for t in 0..10 {
            arbiter.post("NEW_HDG", format!("heading={t}").as_str(), t as f64);
            arbiter.run_cycle(t as f64, &mut NoopObserver);
        }
        let kept = arbiter.warnings();
        assert_eq!(kept.len(), 3);
        assert!(kept[2].contains("heading=9"), "{kept:?}");
        assert!(kept[0].contains("heading=7"), "{kept:?}");
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader_tests {
    use helm_core::Value;

    use super::*;
    use crate::{load_reader, load_str};

    const MISSION: &str = "\
// survey mission
initialize DEPLOY = true, RETURN = false

set MODE = ACTIVE {
  DEPLOY = true
} else INACTIVE

set MODE = SURVEYING { MODE = ACTIVE
                       RETURN != true }

# headings
behavior = BHV_ConstantHeading
{
  name      = survey    // the main leg
  pwt       = 200
  condition = MODE == ACTIVE:SURVEYING
  heading   = 90
}

behavior = BHV_ConstantHeading {
  name       = proto
  templating = spawn
  updates    = NEW_HDG
  heading    = 0
}
";

    #[test]
    fn parses_every_statement_kind() {
        let loaded = load_str(MISSION);
        assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
        assert_eq!(loaded.initial, [
            ("DEPLOY".to_string(), Value::Str("true".into())),
            ("RETURN".to_string(), Value::Str("false".into())),
        ]);
        assert_eq!(loaded.modes.len(), 2);
        assert_eq!(loaded.modes[0].default_value(), Some("INACTIVE"));
        assert_eq!(loaded.modes[1].rules()[0].conditions.len(), 2);

        assert_eq!(loaded.templates.len(), 2);
        assert_eq!(loaded.templates[0].name(), Some("survey"));
        assert_eq!(loaded.templates[0].line, 12);
        assert_eq!(loaded.templates[0].param("condition"), Some("MODE == ACTIVE:SURVEYING"));
        assert_eq!(loaded.templates[1].trigger(), Some("NEW_HDG"));
    }

    #[test]
    fn loaded_mission_runs() {
        let mut arbiter = ArbiterBuilder::new(domain()).loaded(load_str(MISSION)).build().unwrap();
        let out = arbiter.run_cycle(0.0, &mut NoopObserver);
        assert_eq!(out.summary.modes, "MODE=ACTIVE:SURVEYING");
        assert_eq!(out.summary.running, 1);
        assert_eq!(out.reports[0].behavior, "survey");
        assert_eq!(out.reports[0].priority_wt, 200.0);

        arbiter.post("RETURN", "true", 0.5);
        let out = arbiter.run_cycle(1.0, &mut NoopObserver);
        assert_eq!(out.summary.modes, "MODE=ACTIVE");
        assert_eq!(out.summary.idle, 1);
    }

    #[test]
    fn default_without_else_on_closing_line() {
        let loaded = load_str("set M = A { X = 1 } B\nset N = C {\n}\nelse D\n");
        assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
        assert_eq!(loaded.modes[0].default_value(), Some("B"));
        assert_eq!(loaded.modes[1].default_value(), Some("D"));
        assert!(loaded.modes[1].rules()[0].conditions.is_empty());
    }

    #[test]
    fn default_is_not_taken_from_next_line_without_else() {
        let loaded = load_str("set M = A { X = 1 }\ninitialize Y = 2\n");
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.modes[0].default_value(), None);
        assert_eq!(loaded.initial, [("Y".to_string(), Value::Double(2.0))]);
    }

    #[test]
    fn malformed_lines_become_warnings_with_line_numbers() {
        let text = "\
frobnicate the widget
behavior = BHV_ConstantSpeed
{
  name = s
  no equals sign here
}
set M = A { X = = } else B
}
";
        let loaded = load_str(text);
        let lines: Vec<usize> = loaded.warnings.iter().map(|w| w.line).collect();
        assert_eq!(lines, [1, 5, 7, 8]);
        assert_eq!(loaded.templates.len(), 1);
        assert!(loaded.modes.is_empty());
    }

    #[test]
    fn unterminated_block_is_reported() {
        let loaded = load_str("behavior = BHV_ConstantSpeed\n{\n  name = s\n");
        assert!(loaded.templates.is_empty());
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].line, 1);
    }

    #[test]
    fn missing_brace_recovers_at_next_statement() {
        let loaded = load_str("behavior = BHV_ConstantSpeed\ninitialize A = 1\n");
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].line, 2);
        assert_eq!(loaded.initial.len(), 1);
    }

    #[test]
    fn bad_templating_value_is_a_warning() {
        let loaded = load_str("behavior = BHV_ConstantSpeed {\n name = s\n templating = sometimes\n}\n");
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].line, 3);
        assert_eq!(loaded.templates.len(), 1);
    }

    #[test]
    fn load_warnings_reach_the_arbiter() {
        let loaded = load_str("nonsense\nbehavior = BHV_ConstantSpeed { name = s\n speed = 1 }\n");
        let mut arbiter = ArbiterBuilder::new(domain()).loaded(loaded).build().unwrap();
        arbiter.run_cycle(0.0, &mut NoopObserver);
        assert_eq!(arbiter.warnings(), ["line 1: unrecognized statement \"nonsense\""]);
        assert_eq!(names(&arbiter), ["s"]);
    }

    #[test]
    fn reader_input() {
        let loaded = load_reader(std::io::Cursor::new("initialize A = x\n")).unwrap();
        assert_eq!(loaded.initial, [("A".to_string(), Value::Str("x".into()))]);
    }
}
