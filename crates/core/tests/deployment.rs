mod common;

use common::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;
use url::Url;
use wabscope_api::{
    ClassInfo, ClassSet, DescriptorParser, EndpointConfig, ModuleId, ModuleResources, ParseError,
    ServerContext, WebFragmentDescriptor,
};
use wabscope_core::endpoint::{
    ENDPOINT_INITIALIZER, ENDPOINT_TYPE, EndpointInitializer, SERVER_APPLICATION_CONFIG,
    SERVER_ENDPOINT,
};
use wabscope_core::{
    DeployError, Deployer, GraphSnapshot, InMemoryModuleRegistry, SnapshotProvider,
};
use wabscope_plugin::{
    Configurator, Initializer, InitializerContract, InitializerError, ProviderRegistry,
};

type CallLog = Arc<Mutex<Vec<(String, Vec<String>)>>>;

fn recording(names: &[&str], log: &CallLog) -> ProviderRegistry {
    names.iter().fold(ProviderRegistry::new(), |registry, name| {
        registry.with_initializer(
            *name,
            InitializerContract::new(SCI),
            Arc::new(RecordingInitializer::new(name, log.clone())),
        )
    })
}

fn invoked(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().iter().map(|(name, _)| name.clone()).collect()
}

/// Reads `<name>` out of the stored descriptor text.
struct NameParser {
    resources: Arc<InMemoryModuleRegistry>,
    fail: AtomicBool,
}

impl NameParser {
    fn new(resources: Arc<InMemoryModuleRegistry>) -> Self {
        Self {
            resources,
            fail: AtomicBool::new(false),
        }
    }
}

impl DescriptorParser for NameParser {
    fn parse(&self, url: &Url) -> Result<WebFragmentDescriptor, ParseError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ParseError("unexpected end of document".to_string()));
        }
        let text = self
            .resources
            .read_entry(url)
            .map_err(|e| ParseError(e.to_string()))?;
        let name = text
            .split_once("<name>")
            .and_then(|(_, rest)| rest.split_once("</name>"))
            .map(|(name, _)| name.to_string());
        Ok(WebFragmentDescriptor {
            url: url.clone(),
            name,
            metadata_complete: false,
        })
    }
}

#[test]
fn test_unrestricted_initializer_sees_whole_class_space() {
    let registry = simple_chain();
    let log = CallLog::default();
    let deployer = Deployer::builder(registry.clone(), registry.clone())
        .with_registry(recording(&["test.h.Init"], &log))
        .build();

    let record = deployer.deploy(H, &TestContext::new(H)).unwrap();

    let calls = log.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].1,
        vec!["test.h.HClass", "test.f.FClass", "test.m.MClass", "test.g.GClass"]
    );
    assert_eq!(record.classes, 4);
    assert_eq!(record.report.invoked.len(), 1);
    assert_eq!(
        record.report.skipped,
        vec!["test.f.Init", "test.m.Init", "test.g.Init"]
    );
}

#[test]
fn test_complex_wab_initializer_order() {
    let registry = complex_wab();
    let log = CallLog::default();
    let providers = recording(
        &[
            "test.wab.SciFromTheWab1",
            "test.wab.SciFromTheWab2",
            "test.wab.SciFromTheFragment1",
            "test.wab.SciFromTheFragment2",
            "test.cb1.SciFromContainerBundle1",
            "test.cf1.SciFromContainerFragment1",
            "test.cb2.SciFromContainerBundle2",
            "test.cf2.SciFromContainerFragment2",
            "test.cb3.SciFromContainerBundle3",
        ],
        &log,
    );
    let deployer = Deployer::builder(registry.clone(), registry.clone())
        .with_registry(providers)
        .build();

    let record = deployer.deploy(WAB, &TestContext::new(WAB)).unwrap();

    assert_eq!(
        invoked(&log),
        vec![
            "test.wab.SciFromTheWab1",
            "test.wab.SciFromTheWab2",
            "test.wab.SciFromTheFragment1",
            "test.wab.SciFromTheFragment2",
            "test.cb1.SciFromContainerBundle1",
            "test.cb2.SciFromContainerBundle2",
            "test.cf1.SciFromContainerFragment1",
            "test.cf2.SciFromContainerFragment2",
        ]
    );
    assert!(log.lock().unwrap().iter().all(|(_, classes)| classes.len() == 7));
    assert_eq!(record.report.invoked[4].module, CB1);
    assert_eq!(record.report.invoked[6].module, CF1);
    assert!(record.report.skipped.is_empty());
}

#[test]
fn test_descriptors_are_parsed_in_merge_order() {
    let registry = complex_wab();
    let deployer = Deployer::builder(registry.clone(), registry.clone())
        .with_descriptor_parser(Arc::new(NameParser::new(registry.clone())))
        .build();

    let record = deployer.deploy(WAB, &TestContext::new(WAB)).unwrap();

    let names: Vec<_> = record
        .descriptors
        .iter()
        .filter_map(|d| d.name.as_deref())
        .collect();
    assert_eq!(
        names,
        vec![
            "the-wab-fragment",
            "container-bundle-1",
            "container-bundle-2",
            "container-fragment-1",
            "container-fragment-2",
        ]
    );
}

#[test]
fn test_no_registered_initializers_is_a_successful_deploy() {
    let registry = simple_chain();
    let deployer = Deployer::builder(registry.clone(), registry.clone()).build();

    let record = deployer.deploy(H, &TestContext::new(H)).unwrap();
    assert!(record.report.invoked.is_empty());
    assert_eq!(record.class_space.len(), 4);
    assert!(deployer.is_deployed(H));
}

#[test]
fn test_failing_initializer_aborts_deploy() {
    let registry = simple_chain();
    let log = CallLog::default();
    let providers = recording(&["test.h.Init", "test.m.Init"], &log).with_initializer(
        "test.f.Init",
        InitializerContract::new(SCI),
        Arc::new(FailingInitializer),
    );
    let deployer = Deployer::builder(registry.clone(), registry.clone())
        .with_registry(providers)
        .build();

    let err = deployer.deploy(H, &TestContext::new(H)).unwrap_err();
    match err {
        DeployError::Initializer { contract, .. } => assert_eq!(contract, SCI),
        other => panic!("unexpected error: {other}"),
    }
    // Earlier initializers ran; later ones never did
    assert_eq!(invoked(&log), vec!["test.h.Init"]);
    assert!(!deployer.is_deployed(H));
}

#[test]
fn test_descriptor_parse_failure() {
    let registry = simple_chain();
    let parser = Arc::new(NameParser::new(registry.clone()));
    let deployer = Deployer::builder(registry.clone(), registry.clone())
        .with_descriptor_parser(parser.clone())
        .build();

    deployer.deploy(H, &TestContext::new(H)).unwrap();
    assert!(deployer.is_deployed(H));

    parser.fail.store(true, Ordering::SeqCst);
    let err = deployer.deploy(H, &TestContext::new(H)).unwrap_err();
    assert!(matches!(err, DeployError::Descriptor { .. }));
    // A failed redeploy leaves the unit undeployed
    assert!(deployer.deployment(H).is_none());
}

#[test]
fn test_undeploy_and_redeploy() {
    let registry = simple_chain();
    let log = CallLog::default();
    let deployer = Deployer::builder(registry.clone(), registry.clone())
        .with_registry(recording(&["test.m.Init"], &log))
        .build();

    assert!(deployer.undeploy(H).unwrap().is_none());

    let first = deployer.deploy(H, &TestContext::new(H)).unwrap();
    let second = deployer.deploy(H, &TestContext::new(H)).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&deployer.deployment(H).unwrap(), &second));
    assert_eq!(invoked(&log).len(), 2);

    let removed = deployer.undeploy(H).unwrap().unwrap();
    assert!(Arc::ptr_eq(&removed, &second));
    assert!(!deployer.is_deployed(H));
    assert!(deployer.undeploy(H).unwrap().is_none());
}

#[test]
fn test_deploy_unknown_or_fragment_unit() {
    let registry = simple_chain();
    let deployer = Deployer::builder(registry.clone(), registry.clone()).build();

    assert!(matches!(
        deployer.deploy(ModuleId(99), &TestContext::new(ModuleId(99))),
        Err(DeployError::NotFound(_))
    ));
    assert!(matches!(
        deployer.deploy(F, &TestContext::new(F)),
        Err(DeployError::NotAHost(_))
    ));

    registry.uninstall(H);
    assert!(matches!(
        deployer.deploy(H, &TestContext::new(H)),
        Err(DeployError::NotFound(_))
    ));
    assert!(!deployer.is_deployed(H));
}

/// Hands out a consistent view, then removes `unit` from the live runtime.
struct UninstallAfterSnapshot {
    registry: Arc<InMemoryModuleRegistry>,
    unit: ModuleId,
}

impl SnapshotProvider for UninstallAfterSnapshot {
    fn snapshot(&self) -> GraphSnapshot {
        let snapshot = self.registry.snapshot();
        self.registry.uninstall(self.unit);
        snapshot
    }
}

#[test]
fn test_unit_uninstalled_mid_deploy_fails_cleanly() {
    let registry = simple_chain();
    let log = CallLog::default();
    let graph = Arc::new(UninstallAfterSnapshot {
        registry: registry.clone(),
        unit: H,
    });
    let deployer = Deployer::builder(graph, registry.clone())
        .with_registry(recording(&["test.m.Init"], &log))
        .build();

    let result = deployer.deploy(H, &TestContext::new(H));

    assert!(matches!(result, Err(DeployError::NotFound(unit)) if unit == H));
    assert!(invoked(&log).is_empty());
    assert!(!deployer.is_deployed(H));
}

/// Signals when it starts and waits to be released.
struct GatedInitializer {
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl Initializer for GatedInitializer {
    fn on_startup(
        &self,
        _classes: &ClassSet,
        _ctx: &dyn ServerContext,
    ) -> Result<(), InitializerError> {
        let _ = self.entered.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        Ok(())
    }
}

#[test]
fn test_undeploy_waits_for_running_deploy() {
    let registry = simple_chain();
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let gate = GatedInitializer {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let providers = ProviderRegistry::new().with_initializer(
        "test.h.Init",
        InitializerContract::new(SCI),
        Arc::new(gate),
    );
    let deployer = Deployer::builder(registry.clone(), registry.clone())
        .with_registry(providers)
        .build();
    let undeployed = AtomicBool::new(false);

    std::thread::scope(|scope| {
        let deploying = scope.spawn(|| deployer.deploy(H, &TestContext::new(H)).unwrap());
        entered_rx.recv().unwrap();

        let undeploying = scope.spawn(|| {
            let removed = deployer.undeploy(H).unwrap();
            undeployed.store(true, Ordering::SeqCst);
            removed
        });
        std::thread::sleep(Duration::from_millis(50));
        assert!(!undeployed.load(Ordering::SeqCst));

        release_tx.send(()).unwrap();
        let record = deploying.join().unwrap();
        let removed = undeploying.join().unwrap().unwrap();
        assert!(Arc::ptr_eq(&record, &removed));
    });

    assert!(!deployer.is_deployed(H));
}

#[test]
fn test_distinct_units_deploy_concurrently() {
    let registry = Arc::new(InMemoryModuleRegistry::new());
    let units: Vec<ModuleId> = (10..18).map(ModuleId).collect();
    let log = CallLog::default();
    let mut providers = ProviderRegistry::new();
    for unit in &units {
        registry.install(host(*unit, &format!("unit-{}", unit)));
        let initializer = format!("test.u{}.Init", unit);
        registry
            .add_entry(*unit, WAB_SERVICES, format!("{}\n", initializer))
            .unwrap();
        providers = providers.with_initializer(
            initializer.clone(),
            InitializerContract::new(SCI),
            Arc::new(RecordingInitializer::new(&initializer, log.clone())),
        );
    }
    let deployer = Deployer::builder(registry.clone(), registry.clone())
        .with_registry(providers)
        .build();

    std::thread::scope(|scope| {
        for unit in &units {
            let deployer = &deployer;
            scope.spawn(move || deployer.deploy(*unit, &TestContext::new(*unit)).unwrap());
        }
    });

    assert!(units.iter().all(|unit| deployer.is_deployed(*unit)));
    let mut seen = invoked(&log);
    seen.sort();
    let mut expected: Vec<_> = units.iter().map(|u| format!("test.u{}.Init", u)).collect();
    expected.sort();
    assert_eq!(seen, expected);
}

/// Publishes every implementing endpoint class under `/<simple name>`.
struct PathConfigurator;

impl Configurator for PathConfigurator {
    fn endpoint_configs(&self, endpoint_classes: &ClassSet) -> Option<Vec<EndpointConfig>> {
        Some(
            endpoint_classes
                .iter()
                .map(|c| {
                    let simple = c.name.rsplit('.').next().unwrap_or(&c.name);
                    EndpointConfig::new(format!("/{}", simple.to_lowercase()), c.name.clone())
                })
                .collect(),
        )
    }

    fn annotated_endpoint_classes(&self, _annotated: &ClassSet) -> Option<ClassSet> {
        None
    }
}

fn endpoint_unit(with_configurator: bool) -> Arc<InMemoryModuleRegistry> {
    let registry = Arc::new(InMemoryModuleRegistry::new());
    registry.install(host(WAB, "chat"));
    registry
        .add_entry(WAB, WAB_SERVICES, format!("{}\n", ENDPOINT_INITIALIZER))
        .unwrap();
    let classes = [
        ClassInfo::new("chat.Annotated").annotated(SERVER_ENDPOINT),
        ClassInfo::new("chat.Programmatic").implementing(ENDPOINT_TYPE),
        ClassInfo::new("javax.chat.Legacy").annotated(SERVER_ENDPOINT),
        ClassInfo::new("chat.Plain"),
    ];
    for class in classes {
        registry.add_class(WAB, "WEB-INF/classes", class).unwrap();
    }
    if with_configurator {
        registry
            .add_class(
                WAB,
                "WEB-INF/classes",
                ClassInfo::new("chat.AppConfig").implementing(SERVER_APPLICATION_CONFIG),
            )
            .unwrap();
    }
    registry
}

fn endpoint_deployer(registry: &Arc<InMemoryModuleRegistry>) -> Deployer {
    let configurators =
        ProviderRegistry::new().with_configurator("chat.AppConfig", Arc::new(PathConfigurator));
    let providers = ProviderRegistry::new().with_initializer(
        ENDPOINT_INITIALIZER,
        EndpointInitializer::contract(),
        Arc::new(EndpointInitializer::new(
            configurators,
            vec!["javax.".to_string()],
        )),
    );
    Deployer::builder(registry.clone(), registry.clone())
        .with_registry(providers)
        .build()
}

#[test]
fn test_endpoints_without_configurator() {
    let registry = endpoint_unit(false);
    let deployer = endpoint_deployer(&registry);
    let (ctx, container) = TestContext::with_container(WAB);

    let record = deployer.deploy(WAB, &ctx).unwrap();

    assert_eq!(*container.endpoints.lock().unwrap(), vec!["chat.Annotated"]);
    // Only classes matching the endpoint markers were handed over
    assert_eq!(record.report.invoked[0].classes, 3);
}

#[test]
fn test_endpoints_with_configurator() {
    let registry = endpoint_unit(true);
    let deployer = endpoint_deployer(&registry);
    let (ctx, container) = TestContext::with_container(WAB);

    deployer.deploy(WAB, &ctx).unwrap();

    assert_eq!(*container.endpoints.lock().unwrap(), vec!["/programmatic"]);
}

#[test]
fn test_endpoints_without_container() {
    let registry = endpoint_unit(false);
    let deployer = endpoint_deployer(&registry);

    let record = deployer.deploy(WAB, &TestContext::new(WAB)).unwrap();
    assert_eq!(record.report.invoked.len(), 1);
}
