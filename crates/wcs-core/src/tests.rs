//! Unit tests for wcs-core primitives.

#[cfg(test)]
mod ids {
    use crate::{BinId, TruckId};

    #[test]
    fn index_roundtrip() {
        let id = BinId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(BinId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(BinId(0).to_string(), "bin1");
        assert_eq!(TruckId(2).to_string(), "truck3");
    }
}

#[cfg(test)]
mod grid {
    use crate::Cell;

    #[test]
    fn manhattan_distance() {
        assert_eq!(Cell::new(0, 0).manhattan(Cell::new(3, 4)), 7);
        assert_eq!(Cell::new(5, 5).manhattan(Cell::new(5, 5)), 0);
        assert_eq!(Cell::new(2, 7).manhattan(Cell::new(7, 2)), 10);
    }

    #[test]
    fn chebyshev_distance() {
        assert_eq!(Cell::new(0, 0).chebyshev(Cell::new(3, 4)), 4);
        assert_eq!(Cell::new(1, 1).chebyshev(Cell::new(2, 2)), 1);
    }

    #[test]
    fn within_grid() {
        assert!(Cell::new(0, 0).within(10));
        assert!(Cell::new(9, 9).within(10));
        assert!(!Cell::new(10, 0).within(10));
        assert!(!Cell::new(-1, 3).within(10));
    }
}

#[cfg(test)]
mod time {
    use crate::{HourWindow, SimTime};

    #[test]
    fn next_hour_rolls_over_day() {
        let t = SimTime::new(1, 23).next_hour();
        assert_eq!(t, SimTime::new(2, 0));
        assert_eq!(SimTime::new(3, 5).next_hour(), SimTime::new(3, 6));
    }

    #[test]
    fn hours_since_across_days() {
        let start = SimTime::new(1, 22);
        let end = SimTime::new(2, 3);
        assert_eq!(end.hours_since(start), 5);
        assert_eq!(start.hours_since(end), 0);
    }

    #[test]
    fn night_hours() {
        assert!(SimTime::new(1, 0).is_night());
        assert!(SimTime::new(1, 6).is_night());
        assert!(!SimTime::new(1, 7).is_night());
    }

    #[test]
    fn offset_wraps_into_following_days() {
        let due = SimTime::new(2, 20).offset_hours(30.5);
        assert_eq!(due.day, 4);
        assert!((due.hour - 2.5).abs() < 1e-9);
    }

    #[test]
    fn due_time_reached() {
        let due = SimTime::new(1, 22).offset_hours(3.5); // day 2, 01:30
        assert!(!due.reached_by(SimTime::new(1, 23)));
        assert!(!due.reached_by(SimTime::new(2, 1)));
        assert!(due.reached_by(SimTime::new(2, 2)));
        assert!(due.reached_by(SimTime::new(3, 0)));
        assert!((due.remaining_from(SimTime::new(2, 0)) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn hour_window_is_inclusive() {
        let w = HourWindow::new(7, 9);
        assert!(!w.contains(6));
        assert!(w.contains(7));
        assert!(w.contains(9));
        assert!(!w.contains(10));
    }

    #[test]
    fn display() {
        assert_eq!(SimTime::new(3, 7).to_string(), "day 3 07:00");
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentRng, SimRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = AgentRng::new(12345, 0);
        let mut r2 = AgentRng::new(12345, 0);
        for _ in 0..100 {
            let a: f64 = r1.random();
            let b: f64 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_streams_differ() {
        let mut r0 = AgentRng::new(1, 0);
        let mut r1 = AgentRng::new(1, 1);
        let a: u64 = r0.random();
        let b: u64 = r1.random();
        assert_ne!(a, b, "seeds for adjacent streams should diverge");
    }

    #[test]
    fn uniform_in_bounds_and_degenerate() {
        let mut rng = AgentRng::new(0, 0);
        for _ in 0..1000 {
            let v = rng.uniform(5.0, 15.0);
            assert!((5.0..=15.0).contains(&v));
        }
        assert_eq!(rng.uniform(3.0, 3.0), 3.0);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = SimRng::new(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }

    #[test]
    fn seeded_sim_rng_is_reproducible() {
        let mut a = SimRng::new(8);
        let mut b = SimRng::new(8);
        let xs: Vec<u32> = (0..10).map(|_| a.gen_range(0..100)).collect();
        let ys: Vec<u32> = (0..10).map(|_| b.gen_range(0..100)).collect();
        assert_eq!(xs, ys);
    }
}

#[cfg(test)]
mod config {
    use crate::{Cell, CoreError, SimConfig};

    #[test]
    fn defaults_validate() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = SimConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, SimConfig::default());
        assert_eq!(cfg.total_hours(), 7 * 24);
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let cfg = SimConfig::from_toml_str(
            r#"
            [grid]
            size = 20

            [locations]
            depot = [10, 10]
            fuel_stations = [[0, 0]]

            [agents.counts]
            bins = 12
            trucks = 4

            [agents.truck.fuel]
            capacity = 80.0
            threshold = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(cfg.grid.size, 20);
        assert_eq!(cfg.locations.depot, Cell::new(10, 10));
        assert_eq!(cfg.locations.fuel_stations, vec![Cell::new(0, 0)]);
        assert_eq!(cfg.agents.counts.trucks, 4);
        assert_eq!(cfg.fuel_threshold_level(), 20.0);
        // Untouched fields keep their defaults.
        assert_eq!(cfg.agents.truck.fuel.consumption, 0.5);
        assert_eq!(cfg.agents.bin.capacity, 100.0);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = SimConfig::from_toml_str("[grid]\nsize = 5\nshape = \"hex\"\n").unwrap_err();
        assert!(matches!(err, CoreError::Parse { .. }));
    }

    #[test]
    fn depot_outside_grid_is_rejected() {
        let mut cfg = SimConfig::default();
        cfg.locations.depot = Cell::new(50, 0);
        assert!(matches!(cfg.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn bad_threshold_is_rejected() {
        let mut cfg = SimConfig::default();
        cfg.agents.bin.threshold = 1.5;
        assert!(cfg.validate().is_err());
        cfg.agents.bin.threshold = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn inverted_fill_range_is_rejected() {
        let mut cfg = SimConfig::default();
        cfg.agents.bin.fill_rate.min = 20.0;
        cfg.agents.bin.fill_rate.max = 10.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn infinite_durations_are_rejected() {
        let err = SimConfig::from_toml_str("[time]\nreal_seconds_per_hour = inf\n").err();
        assert!(matches!(err, Some(CoreError::Config(ref m)) if m.contains("real_seconds_per_hour")), "{err:?}");

        let err = SimConfig::from_toml_str("[agents.bin]\nmonitor_period_secs = inf\n").err();
        assert!(matches!(err, Some(CoreError::Config(ref m)) if m.contains("monitor_period_secs")), "{err:?}");

        let mut cfg = SimConfig::default();
        cfg.agents.truck.speed = f64::INFINITY;
        assert!(cfg.validate().is_err());
        cfg = SimConfig::default();
        cfg.agents.truck.waste.capacity = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("city.toml");
        std::fs::write(&path, "[simulation]\ndays = 2\nseed = 99\n").unwrap();
        let cfg = SimConfig::load(&path).unwrap();
        assert_eq!(cfg.simulation.days, 2);
        assert_eq!(cfg.simulation.seed, 99);
        assert_eq!(cfg.total_hours(), 48);
    }
}
