//! Tests for sc-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::{InventoryRow, RewardRow, TOTAL};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn reward_row(tick: u64, resource: &str, timestep: f64) -> RewardRow {
        RewardRow {
            tick,
            date_time: "2019-01-01 00:00:00".to_owned(),
            resource: resource.to_owned(),
            timestep,
            episode_total: timestep,
        }
    }

    fn headers(path: std::path::PathBuf) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("rewards.csv").exists());
        assert!(dir.path().join("inventory.csv").exists());
    }

    #[test]
    fn csv_creates_missing_directory() {
        let dir = tmp();
        let nested = dir.path().join("runs").join("one");
        let _w = CsvWriter::new(&nested).unwrap();
        assert!(nested.join("rewards.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            headers(dir.path().join("rewards.csv")),
            ["tick", "date_time", "resource", "timestep_reward", "episode_total"]
        );
        assert_eq!(headers(dir.path().join("inventory.csv")), ["tick", "node", "resource", "on_hand"]);
    }

    #[test]
    fn csv_reward_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_rewards(&[reward_row(3, TOTAL, 12.5), reward_row(3, "book", 12.5)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("rewards.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][2], "total");
        assert_eq!(&rows[0][3], "12.5");
        assert_eq!(&rows[1][2], "book");
    }

    #[test]
    fn csv_inventory_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_inventory(&[InventoryRow {
            tick:     2,
            node:     "Substation".to_owned(),
            resource: "electricity".to_owned(),
            on_hand:  -15,
        }])
        .unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("inventory.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "Substation");
        assert_eq!(&rows[0][3], "-15");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

#[cfg(test)]
mod observer_tests {
    use tempfile::TempDir;

    use sc_core::RunParameters;
    use sc_modules::standard_registry;
    use sc_sim::{RunStatus, SupplyChainSim};

    use crate::csv::CsvWriter;
    use crate::observer::SimOutputObserver;
    use crate::row::{InventoryRow, RewardRow};
    use crate::writer::OutputWriter;
    use crate::{OutputError, OutputResult};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn newsvendor(horizon: u64) -> SupplyChainSim {
        let params = RunParameters { time_horizon: horizon, ..RunParameters::default() };
        SupplyChainSim::new(&standard_registry(), params).unwrap()
    }

    /// Collects rows in memory; optionally fails every reward write.
    #[derive(Default)]
    struct Memory {
        rewards:   Vec<RewardRow>,
        inventory: Vec<InventoryRow>,
        finished:  usize,
        fail:      bool,
    }

    impl OutputWriter for Memory {
        fn write_rewards(&mut self, rows: &[RewardRow]) -> OutputResult<()> {
            if self.fail {
                return Err(OutputError::Io(std::io::Error::other("disk full")));
            }
            self.rewards.extend_from_slice(rows);
            Ok(())
        }

        fn write_inventory(&mut self, rows: &[InventoryRow]) -> OutputResult<()> {
            self.inventory.extend_from_slice(rows);
            Ok(())
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finished += 1;
            Ok(())
        }
    }

    #[test]
    fn one_total_row_per_tick() {
        let mut sim = newsvendor(5);
        let mut obs = SimOutputObserver::new(Memory::default());
        assert_eq!(sim.run_with(&mut obs).unwrap(), RunStatus::Completed);
        assert!(obs.take_error().is_none());

        let mem = obs.into_writer();
        let totals: Vec<_> = mem.rewards.iter().filter(|r| r.resource == crate::TOTAL).collect();
        assert_eq!(totals.len(), 5);
        assert_eq!(totals.iter().map(|r| r.tick).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(totals[4].episode_total, sim.episode_reward());
        assert_eq!(mem.finished, 1);
    }

    #[test]
    fn inventory_interval() {
        let mut sim = newsvendor(6);
        let mut obs = SimOutputObserver::new(Memory::default()).inventory_every(3);
        sim.run_with(&mut obs).unwrap();

        let mem = obs.into_writer();
        let mut ticks: Vec<u64> = mem.inventory.iter().map(|r| r.tick).collect();
        ticks.dedup();
        assert_eq!(ticks, vec![0, 3]);
        assert!(mem.inventory.iter().all(|r| r.node == "Newsvendor"));
    }

    #[test]
    fn first_error_is_kept() {
        let mut sim = newsvendor(3);
        let mut obs = SimOutputObserver::new(Memory { fail: true, ..Memory::default() });
        sim.run_with(&mut obs).unwrap();

        assert!(matches!(obs.take_error(), Some(OutputError::Io(_))));
        assert!(obs.take_error().is_none());
    }

    #[test]
    fn integration_csv() {
        let dir = tmp();
        let mut sim = newsvendor(4);
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap());
        sim.run_with(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        // One total row and one book row per tick.
        let mut rdr = csv::Reader::from_path(dir.path().join("rewards.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 8);
        assert_eq!(&rows[0][1], "2019-01-02 00:00:00");

        let mut rdr = csv::Reader::from_path(dir.path().join("inventory.csv")).unwrap();
        assert_eq!(rdr.records().count(), 4);
    }
}
