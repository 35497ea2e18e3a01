#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use wabscope_api::{
    ClassInfo, ClassSet, ContentRoot, EndpointConfig, EndpointContainer, ModuleId, ModuleInfo,
    RegistrationError, ServerContext, WiringEdge,
};
use wabscope_core::InMemoryModuleRegistry;
use wabscope_plugin::{Initializer, InitializerError};

pub const SCI: &str = "jakarta.servlet.ServletContainerInitializer";
pub const SERVICES: &str = "META-INF/services/jakarta.servlet.ServletContainerInitializer";
pub const WAB_SERVICES: &str =
    "WEB-INF/classes/META-INF/services/jakarta.servlet.ServletContainerInitializer";

// Complex WAB scenario
pub const WAB: ModuleId = ModuleId(42);
pub const WAB_FRAGMENT: ModuleId = ModuleId(43);
pub const CB1: ModuleId = ModuleId(44);
pub const CF1: ModuleId = ModuleId(45);
pub const CB2: ModuleId = ModuleId(46);
pub const CF2: ModuleId = ModuleId(47);
pub const CB3: ModuleId = ModuleId(48);

// Minimal H/F/M/G scenario
pub const H: ModuleId = ModuleId(1);
pub const F: ModuleId = ModuleId(2);
pub const M: ModuleId = ModuleId(3);
pub const G: ModuleId = ModuleId(4);

pub fn host(id: ModuleId, name: &str) -> ModuleInfo {
    ModuleInfo::host(id, name)
}

pub fn fragment(id: ModuleId, name: &str) -> ModuleInfo {
    ModuleInfo::fragment(id, name)
}

fn descriptor(name: &str) -> String {
    format!("<web-fragment><name>{}</name></web-fragment>", name)
}

/// H has fragment F; H imports a package from M; M has fragment G.
/// Every module contributes a descriptor, one initializer and one class.
pub fn simple_chain() -> Arc<InMemoryModuleRegistry> {
    let registry = Arc::new(InMemoryModuleRegistry::new());
    registry.install(host(H, "h"));
    registry.install(fragment(F, "f"));
    registry.install(host(M, "m"));
    registry.install(fragment(G, "g"));
    assert!(registry.attach_fragment(H, F));
    assert!(registry.attach_fragment(M, G));
    registry.wire(WiringEdge::package(H, M, "m.api"));

    registry
        .add_entry(H, "WEB-INF/classes/META-INF/web-fragment.xml", descriptor("h"))
        .unwrap();
    registry
        .add_entry(F, "META-INF/web-fragment.xml", descriptor("f"))
        .unwrap();
    registry
        .add_entry(M, "META-INF/web-fragment.xml", descriptor("m"))
        .unwrap();
    registry
        .add_entry(G, "META-INF/web-fragment.xml", descriptor("g"))
        .unwrap();

    registry.add_entry(H, WAB_SERVICES, "test.h.Init\n").unwrap();
    registry.add_entry(F, SERVICES, "test.f.Init\n").unwrap();
    registry.add_entry(M, SERVICES, "test.m.Init\n").unwrap();
    registry.add_entry(G, SERVICES, "test.g.Init\n").unwrap();

    registry
        .add_class(H, "WEB-INF/classes", ClassInfo::new("test.h.HClass"))
        .unwrap();
    registry
        .add_class(F, "/", ClassInfo::new("test.f.FClass"))
        .unwrap();
    registry
        .add_class(M, "/", ClassInfo::new("test.m.MClass"))
        .unwrap();
    registry
        .add_class(G, "/", ClassInfo::new("test.g.GClass"))
        .unwrap();
    registry
}

/// The WAB, its fragment, two container bundles wired to it (one by package,
/// one by a fragment-declared module requirement), each with a fragment, and
/// a third container bundle wired only from the first one.
pub fn complex_wab() -> Arc<InMemoryModuleRegistry> {
    let registry = Arc::new(InMemoryModuleRegistry::new());

    registry.install(host(WAB, "the-wab-itself").with_content_roots(vec![
        ContentRoot::Directory("WEB-INF/classes".into()),
        ContentRoot::Archive("WEB-INF/lib/the-wab-jar.jar".into()),
    ]));
    registry.install(fragment(WAB_FRAGMENT, "the-wab-fragment"));
    registry.install(host(CB1, "container-bundle-1"));
    registry.install(fragment(CF1, "container-fragment-1"));
    registry.install(host(CB2, "container-bundle-2"));
    registry.install(fragment(CF2, "container-fragment-2"));
    registry.install(host(CB3, "container-bundle-3"));

    assert!(registry.attach_fragment(WAB, WAB_FRAGMENT));
    assert!(registry.attach_fragment(CB1, CF1));
    assert!(registry.attach_fragment(CB2, CF2));

    registry.wire(WiringEdge::package(WAB, CB1, "test.cb1.utils"));
    // Require-Bundle declared by the WAB fragment, effective on the WAB itself
    registry.wire(WiringEdge::require(WAB, CB2).via(WAB_FRAGMENT));
    registry.wire(WiringEdge::package(CB1, CB3, "test.cb3.utils"));

    registry.add_entry(WAB, "WEB-INF/web.xml", "<web-app/>").unwrap();
    registry
        .add_entry(WAB, WAB_SERVICES, "test.wab.SciFromTheWab1\ntest.wab.SciFromTheWab2\n")
        .unwrap();
    registry
        .add_class(WAB, "WEB-INF/classes", ClassInfo::new("test.wab.Cb1IFace3Impl"))
        .unwrap();
    registry
        .add_class(WAB, "WEB-INF/classes", ClassInfo::new("test.wab.SimplestServlet"))
        .unwrap();
    registry
        .add_class(WAB, "WEB-INF/lib/the-wab-jar.jar", ClassInfo::new("test.jar.SciFromJar"))
        .unwrap();

    registry
        .add_entry(WAB_FRAGMENT, "META-INF/web-fragment.xml", descriptor("the-wab-fragment"))
        .unwrap();
    registry
        .add_entry(
            WAB_FRAGMENT,
            SERVICES,
            "# fragment initializers\ntest.wab.SciFromTheFragment1\ntest.wab.SciFromTheFragment2\n",
        )
        .unwrap();
    for name in ["AnnotatedServlet1", "AnnotatedServlet2", "AnnotatedServlet3"] {
        registry
            .add_class(
                WAB_FRAGMENT,
                "/",
                ClassInfo::new(format!("test.fragment.{}", name)).annotated("servlet.WebServlet"),
            )
            .unwrap();
    }

    for (id, name, sci) in [
        (CB1, "container-bundle-1", "test.cb1.SciFromContainerBundle1"),
        (CF1, "container-fragment-1", "test.cf1.SciFromContainerFragment1"),
        (CB2, "container-bundle-2", "test.cb2.SciFromContainerBundle2"),
        (CF2, "container-fragment-2", "test.cf2.SciFromContainerFragment2"),
        (CB3, "container-bundle-3", "test.cb3.SciFromContainerBundle3"),
    ] {
        registry
            .add_entry(id, "META-INF/web-fragment.xml", descriptor(name))
            .unwrap();
        registry.add_entry(id, SERVICES, format!("{}\n", sci)).unwrap();
    }
    registry
        .add_class(CB1, "/", ClassInfo::new("test.cb1.utils.Cb1IFace3"))
        .unwrap();
    registry
        .add_class(CB3, "/", ClassInfo::new("test.cb3.utils.IFace3"))
        .unwrap();

    registry
}

pub fn names(classes: &ClassSet) -> Vec<String> {
    classes.names().map(str::to_string).collect()
}

/// Initializer recording the classes it was handed.
pub struct RecordingInitializer {
    pub name: String,
    pub log: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl RecordingInitializer {
    pub fn new(name: &str, log: Arc<Mutex<Vec<(String, Vec<String>)>>>) -> Self {
        Self {
            name: name.to_string(),
            log,
        }
    }
}

impl Initializer for RecordingInitializer {
    fn on_startup(
        &self,
        classes: &ClassSet,
        _ctx: &dyn ServerContext,
    ) -> Result<(), InitializerError> {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), names(classes)));
        Ok(())
    }
}

pub struct FailingInitializer;

impl Initializer for FailingInitializer {
    fn on_startup(
        &self,
        _classes: &ClassSet,
        _ctx: &dyn ServerContext,
    ) -> Result<(), InitializerError> {
        Err(InitializerError::Failed("initializer exploded".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingContainer {
    pub endpoints: Mutex<Vec<String>>,
}

impl EndpointContainer for RecordingContainer {
    fn register_endpoint(&self, config: &EndpointConfig) -> Result<(), RegistrationError> {
        self.endpoints.lock().unwrap().push(config.path.clone());
        Ok(())
    }

    fn register_endpoint_class(&self, class: &ClassInfo) -> Result<(), RegistrationError> {
        self.endpoints.lock().unwrap().push(class.name.clone());
        Ok(())
    }
}

pub struct TestContext {
    pub unit: ModuleId,
    pub container: Option<Arc<RecordingContainer>>,
}

impl TestContext {
    pub fn new(unit: ModuleId) -> Self {
        Self {
            unit,
            container: None,
        }
    }

    pub fn with_container(unit: ModuleId) -> (Self, Arc<RecordingContainer>) {
        let container = Arc::new(RecordingContainer::default());
        (
            Self {
                unit,
                container: Some(container.clone()),
            },
            container,
        )
    }
}

impl ServerContext for TestContext {
    fn unit(&self) -> ModuleId {
        self.unit
    }

    fn context_path(&self) -> &str {
        "/wab"
    }

    fn endpoint_container(&self) -> Option<Arc<dyn EndpointContainer>> {
        self.container
            .clone()
            .map(|c| c as Arc<dyn EndpointContainer>)
    }
}
