//! Singleton and prototype scopes, plus eager initialization.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use plugin_bootstrap::{
    ClassIndex, CommandMap, EventBus, HostInstance, HostPlugin, Listener, Managed, Manager,
    ManagerOptions, ManagerRegistry, RegResult,
};

struct NoopBus;

impl EventBus for NoopBus {
    fn register(&self, _listener: Arc<dyn Listener>) {}
}

struct TestPlugin {
    bus: NoopBus,
}

impl HostPlugin for TestPlugin {
    fn name(&self) -> &str {
        "TestPlugin"
    }

    fn command_map(&self) -> Option<&dyn CommandMap> {
        None
    }

    fn event_bus(&self) -> &dyn EventBus {
        &self.bus
    }
}

fn host() -> HostInstance {
    HostInstance::new(Arc::new(TestPlugin { bus: NoopBus }))
}

struct SessionScratch {
    serial: usize,
}

impl Managed for SessionScratch {
    fn construct(_host: &HostInstance) -> RegResult<Self> {
        static SERIAL: AtomicUsize = AtomicUsize::new(0);
        Ok(SessionScratch {
            serial: SERIAL.fetch_add(1, Ordering::SeqCst),
        })
    }
}

impl Manager for SessionScratch {
    const OPTIONS: ManagerOptions = ManagerOptions::DEFAULT.prototype();
}

#[test]
fn prototype_gets_a_fresh_instance_every_time() {
    let mut index = ClassIndex::new();
    index.manager::<SessionScratch>();
    let registry = ManagerRegistry::builder(host()).scanner(&index).build();

    let first = registry.get_or_create::<SessionScratch>().unwrap();
    let second = registry.get_or_create::<SessionScratch>().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_ne!(first.serial, second.serial);
    assert!(!registry.contains::<SessionScratch>());
}

struct EagerManager;

impl Managed for EagerManager {
    fn construct(_host: &HostInstance) -> RegResult<Self> {
        Ok(EagerManager)
    }
}

impl Manager for EagerManager {
    const OPTIONS: ManagerOptions = ManagerOptions::DEFAULT.eager();
}

struct LazyManager;

impl Managed for LazyManager {
    fn construct(_host: &HostInstance) -> RegResult<Self> {
        Ok(LazyManager)
    }
}

impl Manager for LazyManager {}

struct EagerScratch;

impl Managed for EagerScratch {
    fn construct(_host: &HostInstance) -> RegResult<Self> {
        Ok(EagerScratch)
    }
}

impl Manager for EagerScratch {
    // Contradictory marker: eager loading only applies to singletons.
    const OPTIONS: ManagerOptions = ManagerOptions::DEFAULT.eager().prototype();
}

#[test]
fn eager_initialization_builds_only_eager_singletons() {
    let mut index = ClassIndex::new();
    index
        .manager::<EagerManager>()
        .manager::<LazyManager>()
        .manager::<EagerScratch>();
    let registry = ManagerRegistry::builder(host()).scanner(&index).build();

    registry.initialize_eager_managers().unwrap();

    assert!(registry.contains::<EagerManager>());
    assert!(!registry.contains::<LazyManager>());
    assert!(!registry.contains::<EagerScratch>());
}

#[test]
fn eager_manager_pulls_its_lazy_dependency_into_the_cache() {
    struct LazyDep {
        label: &'static str,
    }

    impl Managed for LazyDep {
        fn construct(_host: &HostInstance) -> RegResult<Self> {
            Ok(LazyDep { label: "dep" })
        }
    }

    impl Manager for LazyDep {}

    struct EagerRoot {
        dep: Option<Arc<LazyDep>>,
    }

    impl Managed for EagerRoot {
        fn construct(_host: &HostInstance) -> RegResult<Self> {
            Ok(EagerRoot { dep: None })
        }

        fn wire(&mut self, registry: &ManagerRegistry) -> RegResult<()> {
            self.dep = Some(registry.get_or_create::<LazyDep>()?);
            Ok(())
        }
    }

    impl Manager for EagerRoot {
        const OPTIONS: ManagerOptions = ManagerOptions::DEFAULT.eager();
    }

    let mut index = ClassIndex::new();
    index.manager::<EagerRoot>().manager::<LazyDep>();
    let registry = ManagerRegistry::builder(host()).scanner(&index).build();

    registry.initialize_eager_managers().unwrap();
    assert!(registry.contains::<LazyDep>());

    let root = registry.get_or_create::<EagerRoot>().unwrap();
    let dep = registry.get_or_create::<LazyDep>().unwrap();
    assert!(Arc::ptr_eq(root.dep.as_ref().unwrap(), &dep));
    assert_eq!(dep.label, "dep");
}

#[test]
fn eager_manager_resolves_to_the_prebuilt_instance() {
    let mut index = ClassIndex::new();
    index.manager::<EagerManager>();
    let registry = ManagerRegistry::builder(host()).scanner(&index).build();

    registry.initialize_eager_managers().unwrap();
    let first = registry.get_or_create::<EagerManager>().unwrap();
    let second = registry.get_or_create::<EagerManager>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}
