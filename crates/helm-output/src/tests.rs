//! Integration tests for helm-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::{CsvWriter, BEHAVIOR_STATUS_FILE, CYCLE_SUMMARIES_FILE, LIFE_EVENTS_FILE};
    use crate::row::{BehaviorStatusRow, CycleSummaryRow, LifeEventRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(dir: &TempDir, file: &str) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    fn records(dir: &TempDir, file: &str) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join(LIFE_EVENTS_FILE).exists());
        assert!(dir.path().join(CYCLE_SUMMARIES_FILE).exists());
        assert!(dir.path().join(BEHAVIOR_STATUS_FILE).exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(headers(&dir, LIFE_EVENTS_FILE), [
            "iteration", "time", "event", "behavior", "behavior_type", "spawn",
        ]);
        assert_eq!(headers(&dir, CYCLE_SUMMARIES_FILE), [
            "iteration", "time", "idle", "running", "completed", "active",
            "spawned_total", "retired_total", "warnings", "modes",
        ]);
        assert_eq!(headers(&dir, BEHAVIOR_STATUS_FILE)[0], "iteration");
    }

    #[test]
    fn spawn_string_with_separators_survives_quoting() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_life_event(&LifeEventRow {
            iteration:     4,
            time:          2.5,
            event:         "spawn",
            behavior:      "east".into(),
            behavior_type: "BHV_ConstantHeading".into(),
            spawn:         "name=east # heading=100, fast".into(),
        })
        .unwrap();
        w.finish().unwrap();

        let rows = records(&dir, LIFE_EVENTS_FILE);
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "4");
        assert_eq!(&rows[0][1], "2.500");
        assert_eq!(&rows[0][5], "name=east # heading=100, fast");
    }

    #[test]
    fn cycle_summary_round_trip() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_cycle_summary(&CycleSummaryRow {
            iteration:     3,
            time:          1.0,
            idle:          1,
            running:       2,
            completed:     0,
            active:        2,
            spawned_total: 5,
            retired_total: 4,
            warnings:      0,
            modes:         "MODE=ACTIVE:SURVEYING, TRANSIT=INACTIVE".into(),
        })
        .unwrap();
        w.finish().unwrap();

        let rows = records(&dir, CYCLE_SUMMARIES_FILE);
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][3], "2"); // running
        assert_eq!(&rows[0][6], "5"); // spawned_total
        assert_eq!(&rows[0][9], "MODE=ACTIVE:SURVEYING, TRANSIT=INACTIVE");
    }

    #[test]
    fn statuses_one_row_each() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let row = |id: u32, name: &str| BehaviorStatusRow {
            iteration:     9,
            behavior_id:   id,
            behavior:      name.into(),
            behavior_type: "BHV_ConstantSpeed".into(),
            priority_wt:   100.0,
            state:         "idle",
            reason:        "conditions".into(),
            good_updates:  0,
            bad_updates:   1,
            elapsed_secs:  0.0,
        };
        w.write_statuses(&[row(0, "a"), row(1, "b")]).unwrap();
        w.write_statuses(&[]).unwrap();
        w.finish().unwrap();

        let rows = records(&dir, BEHAVIOR_STATUS_FILE);
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][2], "b");
        assert_eq!(&rows[1][6], "conditions");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap(); // second call should not panic
    }

    #[test]
    fn missing_directory_errors() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("nope")).is_err());
    }
}

#[cfg(test)]
mod observer_tests {
    use helm_arbiter::{ArbiterBuilder, ArbiterObserver, CycleSummary};
    use helm_behavior::BehaviorTemplate;
    use helm_ivp::DecisionDomain;
    use tempfile::TempDir;

    use crate::csv::{CsvWriter, BEHAVIOR_STATUS_FILE, CYCLE_SUMMARIES_FILE, LIFE_EVENTS_FILE};
    use crate::observer::ArbiterOutputObserver;
    use crate::row::{BehaviorStatusRow, CycleSummaryRow, LifeEventRow};
    use crate::writer::OutputWriter;
    use crate::{OutputError, OutputResult};

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

    fn rows(dir: &TempDir, file: &str) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn integration_csv() {
        let mut arbiter = ArbiterBuilder::new(domain())
            .template(template("BHV_ConstantHeading", &[
                ("name", "leg"),
                ("heading", "45"),
                ("duration", "2"),
            ]))
            .template(template("BHV_ConstantSpeed", &[
                ("name", "proto"),
                ("speed", "1"),
                ("templating", "spawn"),
                ("updates", "NEW_SPD"),
            ]))
            .build()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = ArbiterOutputObserver::new(writer);
        for t in 0..5 {
            if t == 1 {
                arbiter.post("NEW_SPD", "name=slow # speed=0.5", 0.5);
            }
            arbiter.run_cycle(t as f64, &mut obs);
        }
        arbiter.finish(&mut obs);
        assert!(obs.take_error().is_none(), "no write errors expected");

        // startup spawn of `leg`, runtime spawn of `slow`, retirement of `leg`
        let events = rows(&dir, LIFE_EVENTS_FILE);
        let kinds: Vec<(&str, &str)> = events.iter().map(|r| (&r[2], &r[3])).collect();
        assert_eq!(kinds, [("spawn", "leg"), ("spawn", "slow"), ("retire", "leg")]);
        assert_eq!(&events[1][5], "name=slow # speed=0.5");

        let summaries = rows(&dir, CYCLE_SUMMARIES_FILE);
        assert_eq!(summaries.len(), 5);
        assert_eq!(&summaries[4][7], "1"); // retired_total

        // One status publish per second, one row per live behavior.
        let statuses = rows(&dir, BEHAVIOR_STATUS_FILE);
        assert_eq!(statuses.len(), 1 + 2 + 1 + 1 + 1);
    }

    /// Writer whose summary writes always fail.
    #[derive(Default)]
    struct Broken {
        attempts: usize,
        finished: bool,
    }

    impl OutputWriter for Broken {
        fn write_life_event(&mut self, _row: &LifeEventRow) -> OutputResult<()> {
            Ok(())
        }
        fn write_cycle_summary(&mut self, _row: &CycleSummaryRow) -> OutputResult<()> {
            self.attempts += 1;
            let kind = if self.attempts == 1 {
                std::io::ErrorKind::PermissionDenied
            } else {
                std::io::ErrorKind::Other
            };
            Err(OutputError::Io(std::io::Error::new(kind, "boom")))
        }
        fn write_statuses(&mut self, _rows: &[BehaviorStatusRow]) -> OutputResult<()> {
            Ok(())
        }
        fn finish(&mut self) -> OutputResult<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn keeps_only_first_error() {
        let mut obs = ArbiterOutputObserver::new(Broken::default());
        obs.on_cycle_end(&CycleSummary::default());
        obs.on_cycle_end(&CycleSummary::default());
        obs.on_finish(Default::default());

        match obs.take_error() {
            Some(OutputError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied),
            other => panic!("expected first I/O error, got {other:?}"),
        }
        assert!(obs.take_error().is_none());

        let writer = obs.into_writer();
        assert_eq!(writer.attempts, 2);
        assert!(writer.finished);
    }
}
