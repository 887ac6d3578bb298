//! Unit tests for wcs-world.

use std::sync::Arc;

use wcs_core::{Cell, SimConfig, SimRng, SimTime};

use crate::{GridMap, TrafficEvent, TrafficEventKind, World, WorldClock, WorldView};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn quiet_config() -> SimConfig {
    let mut cfg = SimConfig::default();
    cfg.random_events.accident_probability = 0.0;
    cfg.random_events.roadwork_probability = 0.0;
    cfg
}

fn view_at(hour: u32, cfg: &SimConfig) -> WorldView {
    let map = Arc::new(GridMap::from_config(cfg));
    WorldView::new(SimTime::new(1, hour), map, cfg)
}

fn event(kind: TrafficEventKind, x: i32, y: i32, multiplier: f64) -> TrafficEvent {
    TrafficEvent { kind, position: Cell::new(x, y), remaining_hours: 3, multiplier }
}

// ── WorldClock ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod clock_tests {
    use super::*;

    #[test]
    fn twenty_four_ticks_make_one_day() {
        let mut clock = WorldClock::new();
        assert_eq!(clock.now(), SimTime::new(1, 0));
        for _ in 0..24 {
            clock.tick();
        }
        assert_eq!(clock.now(), SimTime::new(2, 0));
    }

    #[test]
    fn hour_stays_in_range_and_day_never_decreases() {
        let mut clock = WorldClock::new();
        let mut last_day = clock.now().day;
        for _ in 0..24 * 10 + 7 {
            let before = clock.now();
            let after = clock.tick();
            assert!(after.hour < 24);
            assert!(after.day >= last_day);
            // Exactly one of: hour advanced, or day rolled over with hour 0.
            let advanced = after.day == before.day && after.hour == before.hour + 1;
            let rolled = after.day == before.day + 1 && after.hour == 0;
            assert!(advanced ^ rolled);
            last_day = after.day;
        }
        assert_eq!(clock.now(), SimTime::new(11, 7));
    }
}

// ── Travel cost ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod travel_cost_tests {
    use super::*;

    #[test]
    fn off_peak_cost_is_manhattan_distance() {
        let cfg = quiet_config();
        let view = view_at(12, &cfg);
        assert!(!view.is_rush_hour());
        assert_eq!(view.travel_cost(Cell::new(0, 0), Cell::new(3, 4)), 7.0);
    }

    #[test]
    fn rush_hour_windows_apply_their_multiplier() {
        let mut cfg = quiet_config();
        cfg.time.rush_hours.morning.traffic_multiplier = 1.5;
        cfg.time.rush_hours.evening.traffic_multiplier = 2.0;

        let morning = view_at(8, &cfg);
        assert!(morning.is_rush_hour());
        assert_eq!(morning.travel_cost(Cell::new(0, 0), Cell::new(2, 0)), 3.0);

        let evening = view_at(19, &cfg);
        assert_eq!(evening.rush_hour_multiplier(), 2.0);

        assert_eq!(view_at(10, &cfg).rush_hour_multiplier(), 1.0);
        assert_eq!(view_at(6, &cfg).rush_hour_multiplier(), 1.0);
    }

    #[test]
    fn event_multiplier_uses_radius() {
        let cfg = quiet_config();
        let mut view = view_at(12, &cfg);
        view.events.push(event(TrafficEventKind::Accident, 5, 5, 2.0));

        assert_eq!(view.event_multiplier(Cell::new(5, 7)), 2.0); // distance 2
        assert_eq!(view.event_multiplier(Cell::new(6, 7)), 1.0); // distance 3
        assert_eq!(view.travel_cost(Cell::new(5, 6), Cell::new(0, 6)), 10.0);
    }

    #[test]
    fn overlapping_events_take_the_maximum() {
        let cfg = quiet_config();
        let mut view = view_at(12, &cfg);
        view.events.push(event(TrafficEventKind::Roadwork, 3, 3, 1.5));
        view.events.push(event(TrafficEventKind::Accident, 4, 3, 2.0));
        assert_eq!(view.event_multiplier(Cell::new(3, 4)), 2.0);

        view.events.reverse();
        assert_eq!(view.event_multiplier(Cell::new(3, 4)), 2.0);
    }

    #[test]
    fn worst_of_rush_and_event_wins() {
        let mut cfg = quiet_config();
        cfg.time.rush_hours.morning.traffic_multiplier = 1.5;
        let mut view = view_at(8, &cfg);
        view.events.push(event(TrafficEventKind::Roadwork, 9, 9, 1.2));
        // Event is weaker than rush hour.
        assert_eq!(view.travel_cost(Cell::new(9, 8), Cell::new(9, 4)), 6.0);
        view.events.push(event(TrafficEventKind::Accident, 0, 0, 3.0));
        assert_eq!(view.travel_cost(Cell::new(0, 1), Cell::new(0, 5)), 12.0);
    }

    #[test]
    fn nearest_fuel_station_by_cost() {
        let mut cfg = quiet_config();
        cfg.locations.fuel_stations = vec![Cell::new(0, 0), Cell::new(9, 9)];
        let view = view_at(12, &cfg);
        let (station, cost) = view.nearest_fuel_station(Cell::new(7, 8)).unwrap();
        assert_eq!(station, Cell::new(9, 9));
        assert_eq!(cost, 3.0);

        // Equidistant → first configured station.
        let (station, _) = view.nearest_fuel_station(Cell::new(9, 0)).unwrap();
        assert_eq!(station, Cell::new(0, 0));
    }
}

// ── World stepping ────────────────────────────────────────────────────────────

#[cfg(test)]
mod step_tests {
    use super::*;

    #[test]
    fn events_expire_after_their_duration() {
        let cfg = Arc::new(quiet_config());
        let mut world = World::new(cfg, SimRng::new(1));
        world.add_event(TrafficEvent {
            kind:            TrafficEventKind::Accident,
            position:        Cell::new(1, 1),
            remaining_hours: 2,
            multiplier:      2.0,
        });

        let r1 = world.step_hour();
        assert_eq!(r1.expired, 0);
        assert_eq!(world.active_events()[0].remaining_hours, 1);

        let r2 = world.step_hour();
        assert_eq!(r2.expired, 1);
        assert!(world.active_events().is_empty());
        assert_eq!(world.total_events(), 1);
    }

    #[test]
    fn no_events_at_night() {
        let mut cfg = SimConfig::default();
        cfg.random_events.accident_probability = 1.0;
        cfg.random_events.roadwork_probability = 1.0;
        let mut world = World::new(Arc::new(cfg), SimRng::new(3));
        // Hours 1..=5 are outside the 6–20 window.
        for _ in 0..5 {
            let report = world.step_hour();
            assert!(report.new_events.is_empty());
        }
        // Hour 6 is inside.
        let report = world.step_hour();
        assert_eq!(report.time.hour, 6);
        assert_eq!(report.new_events.len(), 2);
        assert_eq!(world.total_events(), 2);
    }

    #[test]
    fn spawned_events_avoid_facilities_and_respect_config() {
        let mut cfg = SimConfig::default();
        cfg.grid.size = 3;
        cfg.locations.depot = Cell::new(1, 1);
        cfg.locations.fuel_stations = vec![Cell::new(0, 0), Cell::new(2, 2)];
        cfg.random_events.accident_probability = 1.0;
        cfg.random_events.roadwork_probability = 1.0;
        let cfg = Arc::new(cfg);
        let mut world = World::new(cfg.clone(), SimRng::new(11));

        for _ in 0..24 * 3 {
            for e in world.step_hour().new_events {
                assert!(!world.map().is_facility(e.position));
                assert!(e.position.within(3));
                assert!((2..=4).contains(&e.remaining_hours));
                let expected = match e.kind {
                    TrafficEventKind::Accident => cfg.traffic_events.accident.traffic_multiplier,
                    TrafficEventKind::Roadwork => cfg.traffic_events.roadwork.traffic_multiplier,
                };
                assert_eq!(e.multiplier, expected);
            }
            assert!(world.active_events().iter().all(|e| e.remaining_hours > 0));
        }
    }

    #[test]
    fn view_tracks_clock() {
        let mut world = World::new(Arc::new(quiet_config()), SimRng::new(0));
        for _ in 0..30 {
            world.step_hour();
        }
        assert_eq!(world.view().now(), SimTime::new(2, 6));
        assert_eq!(world.now(), SimTime::new(2, 6));
    }
}

// ── Shared channel ────────────────────────────────────────────────────────────

#[cfg(test)]
mod shared_tests {
    use super::*;
    use crate::world_channel;

    #[test]
    fn readers_see_latest_publication() {
        let mut world = World::new(Arc::new(quiet_config()), SimRng::new(0));
        let (publisher, reader) = world_channel(world.view().clone());
        let second = publisher.reader();
        assert_eq!(reader.now(), SimTime::new(1, 0));

        world.step_hour();
        world.step_hour();
        publisher.publish(world.view().clone());

        assert_eq!(reader.now(), SimTime::new(1, 2));
        assert_eq!(second.view().now(), SimTime::new(1, 2));
        assert_eq!(reader.travel_cost(Cell::new(0, 0), Cell::new(1, 1)), 2.0);
    }

    #[test]
    fn full_grid_of_facilities_has_no_free_cell() {
        let mut cfg = SimConfig::default();
        cfg.grid.size = 1;
        cfg.locations.depot = Cell::new(0, 0);
        cfg.locations.fuel_stations = vec![Cell::new(0, 0)];
        let map = GridMap::from_config(&cfg);
        assert_eq!(map.random_free_cell(&mut SimRng::new(0)), None);
    }
}
