//! Unit tests for helm-core primitives.

#[cfg(test)]
mod ids {
    use crate::{BehaviorId, TemplateId};

    #[test]
    fn next_and_index() {
        let id = BehaviorId(4);
        assert_eq!(id.next(), BehaviorId(5));
        assert_eq!(id.index(), 4);
        assert_eq!(TemplateId::try_from(3usize).unwrap(), TemplateId(3));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(BehaviorId::INVALID.0, u32::MAX);
        assert_eq!(TemplateId::default(), TemplateId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(BehaviorId(7).to_string(), "BehaviorId(7)");
    }
}

#[cfg(test)]
mod clock {
    use crate::{CycleClock, Iteration};

    #[test]
    fn first_advance_sets_start() {
        let mut c = CycleClock::new();
        assert_eq!(c.advance(100.0), Iteration(1));
        assert_eq!(c.start_secs, Some(100.0));
        assert_eq!(c.elapsed_secs(), 0.0);
        c.advance(102.5);
        assert_eq!(c.iteration, Iteration(2));
        assert_eq!(c.elapsed_secs(), 2.5);
    }

    #[test]
    fn time_never_runs_backwards() {
        let mut c = CycleClock::new();
        c.advance(10.0);
        c.advance(5.0);
        assert_eq!(c.now_secs, 10.0);
    }

    #[test]
    fn iteration_since() {
        assert_eq!(Iteration(9).since(Iteration(4)), 5);
        assert_eq!(Iteration(1).since(Iteration(4)), 0);
    }
}

#[cfg(test)]
mod value {
    use crate::Value;

    #[test]
    fn parse_literal_numbers_and_text() {
        assert_eq!(Value::parse_literal(" 2.5 "), Value::Double(2.5));
        assert_eq!(Value::parse_literal("true"), Value::Str("true".into()));
    }

    #[test]
    fn numeric_strings_have_numeric_view() {
        assert_eq!(Value::from("3").as_f64(), Some(3.0));
        assert_eq!(Value::from("abc").as_f64(), None);
        assert_eq!(Value::from(1.0).as_str(), None);
    }
}

#[cfg(test)]
mod store {
    use crate::{StateStore, Value};

    #[test]
    fn typed_queries() {
        let mut s = StateStore::new();
        s.post("NAV_SPEED", 1.5, 0.0);
        s.post("MODE", "ACTIVE", 0.0);
        assert_eq!(s.query_double("NAV_SPEED"), Some(1.5));
        assert_eq!(s.query_string("NAV_SPEED"), None);
        assert_eq!(s.query_string("MODE"), Some("ACTIVE"));
        assert_eq!(s.query_double("MODE"), None);
        assert!(s.query_value("MISSING").is_none());
    }

    #[test]
    fn age_is_relative_to_last_post() {
        let mut s = StateStore::new();
        s.post("NAV_X", 0.0, 10.0);
        s.post("NAV_X", 1.0, 12.0);
        assert_eq!(s.query_age("NAV_X", 15.0), Some(3.0));
        assert_eq!(s.query_age("NAV_Y", 15.0), None);
    }

    #[test]
    fn deltas_accumulate_until_cleared() {
        let mut s = StateStore::new();
        s.post("UPD", "speed=1", 1.0);
        s.post("UPD", "speed=2", 1.5);
        let d = s.query_deltas("UPD");
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].value, Value::from("speed=1"));
        assert_eq!(d[1].time, 1.5);

        s.clear_deltas();
        assert!(s.query_deltas("UPD").is_empty());
        assert_eq!(s.query_string("UPD"), Some("speed=2"));
    }
}

#[cfg(test)]
mod condition {
    use crate::{LogicCondition, StateStore};

    fn store() -> StateStore {
        let mut s = StateStore::new();
        s.post("NAV_SPEED", 3.0, 0.0);
        s.post("MODE", "ACTIVE:SURVEYING", 0.0);
        s.post("DEPLOY", "true", 0.0);
        s.post("MIN_SPEED", 2.0, 0.0);
        s
    }

    fn holds(src: &str) -> bool {
        LogicCondition::parse(src).unwrap().evaluate(&store())
    }

    #[test]
    fn numeric_relations() {
        assert!(holds("NAV_SPEED > 2"));
        assert!(holds("NAV_SPEED>=3"));
        assert!(!holds("NAV_SPEED < 3"));
        assert!(holds("NAV_SPEED != 4"));
        assert!(holds("NAV_SPEED == 3.0"));
    }

    #[test]
    fn string_equality_is_case_insensitive() {
        assert!(holds("DEPLOY = TRUE"));
        assert!(holds("MODE = active:surveying"));
        assert!(holds("MODE = \"ACTIVE:SURVEYING\""));
    }

    #[test]
    fn unset_variable_is_false() {
        assert!(!holds("RETURN = true"));
        assert!(holds("!(RETURN = true)"));
        let c = LogicCondition::parse("NAV_SPEED > 2").unwrap();
        assert!(!c.evaluate(&StateStore::new()));
    }

    #[test]
    fn boolean_connectives() {
        assert!(holds("DEPLOY = true and NAV_SPEED > 2"));
        assert!(holds("DEPLOY = false or NAV_SPEED > 2"));
        assert!(!holds("DEPLOY = false && NAV_SPEED > 2"));
        assert!(holds("(DEPLOY = false || NAV_SPEED > 2) and MODE != PARK"));
    }

    #[test]
    fn variable_on_right_hand_side() {
        assert!(holds("NAV_SPEED > $(MIN_SPEED)"));
        assert!(!holds("NAV_SPEED < $(MIN_SPEED)"));
    }

    #[test]
    fn variables_are_collected_once() {
        let c = LogicCondition::parse("A = 1 or (B = 2 and A = 3) or C > $(D)").unwrap();
        assert_eq!(c.variables(), vec!["A", "B", "C", "D"]);
        assert!(c.references("D"));
        assert!(!c.references("E"));
    }

    #[test]
    fn malformed_conditions_are_rejected() {
        for bad in ["", "NAV_SPEED >", "(A = 1", "A = 1 B", "\"open = 1", "A 1"] {
            assert!(LogicCondition::parse(bad).is_err(), "accepted {bad:?}");
        }
    }
}
