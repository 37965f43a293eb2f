//! Unit tests for sc-module.

#[cfg(test)]
impl std::fmt::Debug for crate::LoadedModules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModules").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod fixtures {
    use sc_core::RunParameters;

    use crate::{
        Action, Agent, Context, Metrics, Module, Reward, Service, ServiceRegistry, SimResult,
        SimulationState,
    };

    pub struct Counter {
        pub resets: u32,
        pub base:   u32,
    }

    impl Service for Counter {
        fn name(&self) -> &str {
            "counter"
        }
        fn reset(&mut self, _ctx: &Context) -> SimResult<()> {
            self.resets += 1;
            Ok(())
        }
    }

    #[derive(Debug)]
    pub struct Other;

    impl Service for Other {
        fn name(&self) -> &str {
            "other"
        }
    }

    pub struct Idle;

    impl Module for Idle {
        fn name(&self) -> &str {
            "idle"
        }
        fn as_agent(&mut self) -> Option<&mut dyn Agent> {
            Some(self)
        }
    }

    impl Agent for Idle {
        fn compute_actions(&mut self, _state: &SimulationState) -> SimResult<Vec<Action>> {
            Ok(vec![])
        }
    }

    pub struct Zero;

    impl Module for Zero {
        fn name(&self) -> &str {
            "zero"
        }
        fn as_metrics(&mut self) -> Option<&mut dyn Metrics> {
            Some(self)
        }
    }

    impl Metrics for Zero {
        fn reset(&mut self, _ctx: &Context, _state: &SimulationState) -> SimResult<()> {
            Ok(())
        }
        fn compute_reward(&mut self, _state: &SimulationState, _action: &Action) -> SimResult<Reward> {
            Ok(Reward::zero())
        }
    }

    pub fn idle(_: &RunParameters, _: &mut ServiceRegistry) -> SimResult<Box<dyn Module>> {
        Ok(Box::new(Idle))
    }

    pub fn zero(_: &RunParameters, _: &mut ServiceRegistry) -> SimResult<Box<dyn Module>> {
        Ok(Box::new(Zero))
    }

    /// A module whose construction signs in the `counter` service.
    pub fn uses_counter(p: &RunParameters, s: &mut ServiceRegistry) -> SimResult<Box<dyn Module>> {
        s.load::<Counter>("counter", p)?;
        Ok(Box::new(Idle))
    }
}

#[cfg(test)]
mod action_tests {
    use sc_core::{EntityId, NodeId, Tick};

    use crate::{Action, ActionKind, OrderKind};

    #[test]
    fn kind_classification() {
        assert!(ActionKind::PurchaseOrder.is_order());
        assert!(ActionKind::CustomerOrder.is_order());
        assert!(ActionKind::Transfer.is_shipment());
        assert!(!ActionKind::AdvanceTime.is_order());
        assert!(!ActionKind::AdvanceTime.is_shipment());
        assert_eq!(OrderKind::from_action(ActionKind::CustomerOrder), Some(OrderKind::Customer));
        assert_eq!(OrderKind::from_action(ActionKind::Transfer), None);
    }

    #[test]
    fn constructors_fill_endpoints() {
        let a = Action::outbound_shipment("book", NodeId(1), NodeId(2), 3, Tick(4)).with_id(EntityId(7));
        assert_eq!(a.kind, ActionKind::OutboundShipment);
        assert_eq!(a.origin, Some(NodeId(1)));
        assert_eq!(a.destination, Some(NodeId(2)));
        assert_eq!(a.id, Some(EntityId(7)));
        assert!(!a.is_due(Tick(3)));
        assert!(a.is_due(Tick(4)));

        let po = Action::purchase_order("book", 5, Tick(0));
        assert_eq!(po.origin, None);
        assert_eq!(po.destination, None);
    }

    #[test]
    fn json_shape_uses_snake_case_kinds() {
        let a = Action::customer_order("book", NodeId(2), 1, Tick(0));
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["kind"], "customer_order");
        assert_eq!(v["resource"], "book");
        assert!(v.get("id").is_none());
        let back: Action = serde_json::from_value(v).unwrap();
        assert_eq!(back, a);
    }
}

#[cfg(test)]
mod reward_tests {
    use sc_core::ResourceKind;

    use crate::Reward;

    #[test]
    fn accumulation_merges_breakdowns() {
        let book = ResourceKind::from("book");
        let mut r = Reward::zero_for([&book]);
        r += &Reward::for_resource("book", -5.0);
        r += &Reward::for_resource("pen", 2.0);
        r.credit(&book, 1.5);
        assert_eq!(r.total, -1.5);
        assert_eq!(r.of("book"), -3.5);
        assert_eq!(r.of("pen"), 2.0);
        assert_eq!(r.of("ink"), 0.0);
    }
}

#[cfg(test)]
mod context_tests {
    use serde_json::json;

    use crate::{ContextBuilder, SimError};

    #[test]
    fn resources_and_entries() {
        let mut b = ContextBuilder::new();
        b.set_resources("selection", vec!["a".into(), "b".into()]).unwrap();
        b.insert("prices", json!({ "a": 3 })).unwrap();
        let ctx = b.build();
        assert!(ctx.has_resource("b"));
        assert!(!ctx.has_resource("c"));
        assert_eq!(ctx.get("prices").unwrap()["a"], 3);
        let prices: Option<std::collections::BTreeMap<String, u32>> = ctx.get_as("prices").unwrap();
        assert_eq!(prices.unwrap()["a"], 3);
        assert!(ctx.get_as::<u32>("missing").unwrap().is_none());
    }

    #[test]
    fn second_resource_selection_rejected() {
        let mut b = ContextBuilder::new();
        b.set_resources("first", vec!["a".into()]).unwrap();
        let err = b.set_resources("second", vec!["b".into()]).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
        assert!(err.is_config());
    }
}

#[cfg(test)]
mod state_tests {
    use sc_core::{DateTime, EntityId, Tick};
    use sc_network::Network;

    use crate::{Order, OrderKind, SimulationState};

    fn order(id: u64, kind: OrderKind) -> Order {
        Order {
            id: EntityId(id),
            kind,
            resource: "book".into(),
            quantity: 1,
            origin: None,
            destination: None,
            schedule: Tick(0),
        }
    }

    #[test]
    fn remove_order_searches_both_collections() {
        let mut s = SimulationState::new(DateTime::from_unix_secs(0), Network::empty());
        s.customer_orders.push(order(1, OrderKind::Customer));
        s.purchase_orders.push(order(2, OrderKind::Purchase));

        assert_eq!(s.order(EntityId(2)).unwrap().kind, OrderKind::Purchase);
        assert_eq!(s.remove_order(EntityId(2)).unwrap().id, EntityId(2));
        assert!(s.purchase_orders.is_empty());
        assert!(s.remove_order(EntityId(2)).is_none());
        assert_eq!(s.remove_order(EntityId(1)).unwrap().kind, OrderKind::Customer);
        assert!(s.customer_orders.is_empty());
    }
}

#[cfg(test)]
mod service_tests {
    use std::rc::Rc;

    use sc_core::RunParameters;

    use super::fixtures::{Counter, Other};
    use crate::{ConfigError, ContextBuilder, ServiceRegistry, SimError};

    fn registry() -> ServiceRegistry {
        let mut r = ServiceRegistry::new();
        r.register("counter", "counter.basic", |p: &RunParameters| {
            Ok(Counter { resets: 0, base: p.get_or("counter_base", 1)? })
        });
        r.register("ambiguous", "a", |_: &RunParameters| Ok(Other));
        r.register("ambiguous", "b", |_: &RunParameters| Ok(Other));
        r
    }

    #[test]
    fn first_load_constructs_later_loads_share() {
        let mut r = registry();
        let p = RunParameters::default().with_param("counter_base", 4);
        let a = r.load::<Counter>("counter", &p).unwrap();
        let b = r.load::<Counter>("counter", &RunParameters::default()).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(b.borrow().base, 4);
        assert_eq!(r.signed_in().collect::<Vec<_>>(), vec!["counter"]);
    }

    #[test]
    fn reset_reaches_every_signed_in_service() {
        let mut r = registry();
        let c = r.load::<Counter>("counter", &RunParameters::default()).unwrap();
        let ctx = ContextBuilder::new().build();
        r.reset_signed_in_services(&ctx).unwrap();
        r.reset_signed_in_services(&ctx).unwrap();
        assert_eq!(c.borrow().resets, 2);
    }

    #[test]
    fn namespace_must_hold_exactly_one_implementation() {
        let mut r = registry();
        let p = RunParameters::default();
        assert!(matches!(
            r.load::<Other>("ambiguous", &p),
            Err(SimError::Config(ConfigError::ServiceResolution { found: 2, .. }))
        ));
        assert!(matches!(
            r.load::<Other>("absent", &p),
            Err(SimError::Config(ConfigError::ServiceResolution { found: 0, .. }))
        ));
    }

    #[test]
    fn wrong_type_rejected() {
        let mut r = registry();
        let err = r.load::<Other>("counter", &RunParameters::default()).unwrap_err();
        assert!(matches!(err, SimError::Config(ConfigError::ServiceType { .. })));
    }

    #[test]
    fn clone_keeps_catalog_not_instances() {
        let mut r = registry();
        r.load::<Counter>("counter", &RunParameters::default()).unwrap();
        let copy = r.clone();
        assert_eq!(copy.signed_in().count(), 0);
        assert_eq!(copy.implementations("ambiguous"), vec!["a", "b"]);
    }
}

#[cfg(test)]
mod registry_tests {
    use std::io::Write;

    use sc_core::RunParameters;

    use super::fixtures::{Counter, idle, uses_counter, zero};
    use crate::{ConfigError, ModuleRegistry, Profile, SimError};

    fn registry() -> ModuleRegistry {
        let mut r = ModuleRegistry::new();
        r.register_module("test.idle", idle)
            .register_module("test.zero", zero)
            .register_module("test.uses_counter", uses_counter)
            .register_profile("basic", Profile::new(["test.zero"], ["test.idle"]));
        r.services_mut()
            .register("counter", "counter.basic", |_: &RunParameters| Ok(Counter { resets: 0, base: 0 }));
        r
    }

    #[test]
    fn loads_builtin_profile() {
        let params = RunParameters { profile: "basic".into(), ..Default::default() };
        let loaded = registry().load(&params).unwrap();
        assert_eq!(loaded.metrics.name(), "zero");
        assert_eq!(loaded.modules.len(), 1);
        assert_eq!(loaded.modules[0].name(), "idle");
    }

    #[test]
    fn two_metrics_modules_rejected() {
        let profile = Profile::new(["test.zero", "test.zero"], ["test.idle"]);
        let err = registry().load_profile(&profile, &RunParameters::default()).unwrap_err();
        assert!(matches!(err, SimError::Config(ConfigError::MetricsCount(2))));
        assert!(err.is_config());
    }

    #[test]
    fn zero_metrics_modules_rejected() {
        let profile = Profile::new(Vec::<String>::new(), vec!["test.idle".to_owned()]);
        let err = registry().load_profile(&profile, &RunParameters::default()).unwrap_err();
        assert!(matches!(err, SimError::Config(ConfigError::MetricsCount(0))));
    }

    #[test]
    fn metrics_slot_needs_metrics_capability() {
        let profile = Profile::new(["test.idle"], []);
        let err = registry().load_profile(&profile, &RunParameters::default()).unwrap_err();
        assert!(matches!(err, SimError::Config(ConfigError::NotMetrics(ref id)) if id == "test.idle"));
    }

    #[test]
    fn unknown_module_rejected() {
        let profile = Profile::new(["test.zero"], ["test.missing"]);
        let err = registry().load_profile(&profile, &RunParameters::default()).unwrap_err();
        assert!(matches!(err, SimError::Config(ConfigError::UnknownModule(_))));
    }

    #[test]
    fn each_run_gets_fresh_services() {
        let r = registry();
        let profile = Profile::new(["test.zero"], ["test.uses_counter"]);
        let a = r.load_profile(&profile, &RunParameters::default()).unwrap();
        let b = r.load_profile(&profile, &RunParameters::default()).unwrap();
        assert_eq!(a.services.signed_in().collect::<Vec<_>>(), vec!["counter"]);
        assert_eq!(b.services.signed_in().count(), 1);
    }

    #[test]
    fn profile_from_json_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{ "metrics": ["test.zero"], "modules": ["test.idle", "test.idle"] }}"#).unwrap();
        let params = RunParameters {
            profile: f.path().display().to_string(),
            ..Default::default()
        };
        let loaded = registry().load(&params).unwrap();
        assert_eq!(loaded.modules.len(), 2);
    }

    #[test]
    fn unresolvable_profile_is_config_error() {
        let err = registry().resolve_profile("no_such_profile").unwrap_err();
        assert!(matches!(err, SimError::Config(ConfigError::Profile { .. })));
    }
}
