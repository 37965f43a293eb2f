//! Unit tests for sc-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EntityId, IdAllocator, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
        assert_eq!(EntityId(3).to_string(), "EntityId(3)");
    }

    #[test]
    fn allocator_is_monotonic_and_unique() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        let c = ids.allocate();
        assert!(a < b && b < c);
        assert_eq!(ids.allocated(), 3);
    }

    #[test]
    fn observed_ids_are_never_reallocated() {
        let mut ids = IdAllocator::new();
        ids.observe(EntityId(4));
        assert_eq!(ids.allocate(), EntityId(5));

        // An id below the cursor leaves it alone.
        ids.observe(EntityId(1));
        assert_eq!(ids.allocate(), EntityId(6));

        ids.observe(EntityId::INVALID);
        assert_eq!(ids.allocate(), EntityId(7));
    }
}

#[cfg(test)]
mod resource {
    use crate::{CoreError, ResourceKind, quantity_from_f64};

    #[test]
    fn whole_floats_convert() {
        assert_eq!(quantity_from_f64(12.0).unwrap(), 12);
        assert_eq!(quantity_from_f64(-3.0).unwrap(), -3);
    }

    #[test]
    fn fractional_floats_are_rejected() {
        assert!(matches!(quantity_from_f64(2.5), Err(CoreError::NonIntegralQuantity(_))));
        assert!(quantity_from_f64(f64::NAN).is_err());
        assert!(!CoreError::NonIntegralQuantity(0.5).is_config());
    }

    #[test]
    fn resource_kind_borrows_as_str() {
        use std::collections::BTreeMap;
        let mut m = BTreeMap::new();
        m.insert(ResourceKind::from("electricity"), 4);
        assert_eq!(m.get("electricity"), Some(&4));
        assert_eq!(ResourceKind::new("solar").to_string(), "solar");
    }
}

#[cfg(test)]
mod geo {
    use crate::GeoPoint;

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(41.74, -92.73);
        assert!(p.distance_m(p) < 0.01);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = GeoPoint::new(30.0, -88.0);
        let b = GeoPoint::new(31.0, -88.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 500.0, "got {d}");
    }
}

#[cfg(test)]
mod time {
    use crate::{Calendar, CoreError, DateTime, Tick, TimeIncrement};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
        assert_eq!(Tick(15).since(Tick(10)), 5);
    }

    #[test]
    fn increments_parse() {
        assert_eq!("daily".parse::<TimeIncrement>().unwrap(), TimeIncrement::Daily);
        assert_eq!("hourly".parse::<TimeIncrement>().unwrap(), TimeIncrement::Hourly);
        assert_eq!("half-hourly".parse::<TimeIncrement>().unwrap(), TimeIncrement::HalfHourly);
        assert!(matches!(
            "weekly".parse::<TimeIncrement>(),
            Err(CoreError::UnsupportedTimeIncrement(s)) if s == "weekly"
        ));
    }

    #[test]
    fn parse_epoch_and_known_date() {
        assert_eq!(DateTime::parse_date("1970-01-01").unwrap().unix_secs(), 0);
        // 2019-01-01T00:00:00Z
        assert_eq!(DateTime::parse_date("2019-01-01").unwrap().unix_secs(), 1_546_300_800);
    }

    #[test]
    fn invalid_dates_rejected() {
        assert!(DateTime::parse_date("2019-02-29").is_err());
        assert!(DateTime::parse_date("2019-13-01").is_err());
        assert!(DateTime::parse_date("yesterday").is_err());
        assert!(DateTime::parse_date("2020-02-29").is_ok());
    }

    #[test]
    fn display_round_trips_civil_date() {
        let dt = DateTime::parse_date("2019-12-31").unwrap();
        assert_eq!(dt.to_string(), "2019-12-31 00:00:00");
        assert_eq!(dt.advanced(TimeIncrement::Daily).to_string(), "2020-01-01 00:00:00");
        assert_eq!(dt.advanced(TimeIncrement::HalfHourly).to_string(), "2019-12-31 00:30:00");
    }

    #[test]
    fn calendar_maps_ticks() {
        let start = DateTime::parse_date("2019-01-01").unwrap();
        let cal = Calendar::new(start, TimeIncrement::Hourly);
        assert_eq!(cal.date_time_at(Tick(0)), start);
        assert_eq!(cal.date_time_at(Tick(25)).to_string(), "2019-01-02 01:00:00");
    }
}

#[cfg(test)]
mod params {
    use crate::{ResourceSelection, RunParameters, TimeIncrement};

    #[test]
    fn defaults() {
        let p = RunParameters::default();
        assert_eq!(p.simulation_seed, 12_345);
        assert_eq!(p.time_horizon, 100);
        assert_eq!(p.increment().unwrap(), TimeIncrement::Daily);
        assert_eq!(p.resource_selection, ResourceSelection::Count(1));
    }

    #[test]
    fn json_with_extra_keys() {
        let p = RunParameters::from_json_str(
            r#"{ "time_horizon": 10, "resource_selection": ["a", "b"], "customer_max_mean": 4 }"#,
        )
        .unwrap();
        assert_eq!(p.time_horizon, 10);
        assert_eq!(p.start_date, "2019-01-01");
        assert_eq!(
            p.resource_selection,
            ResourceSelection::Explicit(vec!["a".into(), "b".into()])
        );
        assert_eq!(p.get_or("customer_max_mean", 10.0).unwrap(), 4.0);
        assert_eq!(p.get_or("missing", 7u32).unwrap(), 7);
    }

    #[test]
    fn wrong_shaped_extra_key_errors() {
        let p = RunParameters::default().with_param("holding_cost", "cheap");
        assert!(p.get_or("holding_cost", 0.5f64).is_err());
    }
}

#[cfg(test)]
mod rng {
    use rand::distributions::Uniform;

    use crate::SimRng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        let xs: Vec<f64> = (0..4).map(|_| a.unit()).collect();
        let ys: Vec<f64> = (0..4).map(|_| b.unit()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| (0.0..1.0).contains(x)));
    }

    #[test]
    fn child_streams_differ_by_offset() {
        let mut one = SimRng::new(7).child(1);
        let mut two = SimRng::new(7).child(2);
        assert_ne!(one.unit(), two.unit());

        let die = Uniform::new_inclusive(1u32, 6);
        let roll = SimRng::new(7).child(1).sample(&die);
        assert!((1..=6).contains(&roll));
    }
}
