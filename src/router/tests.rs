use super::*;
use crate::error::ErrorStatus;
use crate::route::{FeatureModule, NoopHandle};
use async_trait::async_trait;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// =========================================================
// Shared Mock Components
// =========================================================

type TestRoot = Rc<RefCell<String>>;

struct TestContext {
    /// Operation log to verify calling order
    log: RefCell<Vec<String>>,
    hash: RefCell<String>,
    root: Option<TestRoot>,
    title: RefCell<String>,
    active_nav: RefCell<Option<String>>,
    fallbacks: RefCell<Vec<FallbackView>>,
    listeners: RefCell<Vec<(LocationEvent, Rc<dyn Fn()>)>>,
    /// Tasks handed to `spawn_local`, driven by `run_pending`
    tasks: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
}

impl TestContext {
    fn new(with_root: bool) -> Self {
        Self {
            log: RefCell::new(Vec::new()),
            hash: RefCell::new(String::new()),
            root: with_root.then(|| Rc::new(RefCell::new(String::new()))),
            title: RefCell::new(String::new()),
            active_nav: RefCell::new(None),
            fallbacks: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            tasks: RefCell::new(Vec::new()),
        }
    }

    fn push_log(&self, msg: String) {
        self.log.borrow_mut().push(msg);
    }

    fn log_count(&self, msg: &str) -> usize {
        self.log.borrow().iter().filter(|m| *m == msg).count()
    }

    fn log_index(&self, msg: &str) -> Option<usize> {
        self.log.borrow().iter().position(|m| m == msg)
    }

    /// Change the hash without firing listeners
    fn set_hash_silently(&self, hash: &str) {
        *self.hash.borrow_mut() = hash.to_string();
    }

    fn root_content(&self) -> String {
        self.root
            .as_ref()
            .map(|r| r.borrow().clone())
            .unwrap_or_default()
    }
}

#[derive(Clone)]
struct TestHost {
    ctx: Rc<TestContext>,
}

impl TestHost {
    /// Drive every spawned task (and whatever those spawn) to completion
    async fn run_pending(&self) {
        loop {
            let tasks: Vec<_> = self.ctx.tasks.borrow_mut().drain(..).collect();
            if tasks.is_empty() {
                break;
            }
            futures::future::join_all(tasks).await;
        }
    }
}

impl Host for TestHost {
    type Container = TestRoot;

    fn root_element(&self) -> Option<TestRoot> {
        self.ctx.root.clone()
    }

    fn location_hash(&self) -> String {
        self.ctx.hash.borrow().clone()
    }

    /// Like a browser: a hash change fires both hashchange and popstate
    fn set_location_hash(&self, hash: &str) {
        self.ctx.push_log(format!("host:hash:{}", hash));
        if *self.ctx.hash.borrow() == hash {
            return;
        }
        self.ctx.set_hash_silently(hash);
        let listeners: Vec<_> = self
            .ctx
            .listeners
            .borrow()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }

    fn set_document_title(&self, title: &str) {
        *self.ctx.title.borrow_mut() = title.to_string();
    }

    fn set_active_nav(&self, hash: &str) {
        *self.ctx.active_nav.borrow_mut() = Some(hash.to_string());
    }

    fn render_fallback(&self, container: &TestRoot, view: &FallbackView) {
        let content = match view {
            FallbackView::NotFound { hash } => format!("404:{}", hash),
            FallbackView::MountError { path, .. } => format!("error:{}", path),
        };
        *container.borrow_mut() = content;
        self.ctx.fallbacks.borrow_mut().push(view.clone());
    }

    fn clear_fallback(&self, container: &TestRoot) {
        self.ctx.push_log("host:clear_fallback".to_string());
        let mut content = container.borrow_mut();
        if content.starts_with("404:") || content.starts_with("error:") {
            content.clear();
        }
    }

    fn add_location_listener(&self, event: LocationEvent, on_change: Rc<dyn Fn()>) {
        self.ctx
            .push_log(format!("host:listen:{}", event.event_name()));
        self.ctx.listeners.borrow_mut().push((event, on_change));
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        self.ctx.tasks.borrow_mut().push(task);
    }
}

#[derive(Default)]
struct ModuleBehavior {
    fail_mount: bool,
    fail_unmount: bool,
    /// Mount waits on this before writing to the container
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    /// Captures the token of the last mount
    token: RefCell<Option<NavigationToken>>,
}

struct RecordingModule {
    name: &'static str,
    ctx: Rc<TestContext>,
    behavior: Rc<ModuleBehavior>,
}

#[async_trait(?Send)]
impl FeatureModule<TestRoot> for RecordingModule {
    async fn mount(&self, ctx: MountContext<TestRoot>) -> AppResult<Box<dyn ModuleHandle>> {
        self.ctx.push_log(format!("mount:{}", self.name));
        *self.behavior.token.borrow_mut() = Some(ctx.token.clone());

        let gate = self.behavior.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if !ctx.token.is_current() {
            self.ctx.push_log(format!("skip:{}", self.name));
            return Ok(Box::new(NoopHandle));
        }

        if self.behavior.fail_mount {
            return Err(AppError::mount(format!("{} exploded", self.name)));
        }
        *ctx.container.borrow_mut() = self.name.to_string();
        Ok(Box::new(RecordingHandle {
            name: self.name,
            ctx: self.ctx.clone(),
            fail: self.behavior.fail_unmount,
        }))
    }
}

struct RecordingHandle {
    name: &'static str,
    ctx: Rc<TestContext>,
    fail: bool,
}

#[async_trait(?Send)]
impl ModuleHandle for RecordingHandle {
    async fn unmount(&mut self) -> AppResult<()> {
        self.ctx.push_log(format!("unmount:{}", self.name));
        if self.fail {
            return Err(AppError::unmount("listener already gone"));
        }
        Ok(())
    }
}

struct Fixture {
    ctx: Rc<TestContext>,
    host: TestHost,
    router: Router<TestHost>,
    behaviors: Vec<(&'static str, Rc<ModuleBehavior>)>,
}

impl Fixture {
    fn behavior(&self, path: &str) -> Rc<ModuleBehavior> {
        self.behaviors
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, b)| b.clone())
            .unwrap()
    }

    async fn go(&self, path: &str) {
        self.router.navigate(path);
        self.host.run_pending().await;
    }
}

const PATHS: [(&str, &str, &str); 4] = [
    ("/", "Home", "home"),
    ("/riego", "Riego", "riego"),
    ("/clima", "Clima", "clima"),
    ("/alertas", "Alertas", "alertas"),
];

fn setup_with(with_root: bool, tweak: impl Fn(&str, &mut ModuleBehavior)) -> Fixture {
    let ctx = Rc::new(TestContext::new(with_root));
    let host = TestHost { ctx: ctx.clone() };
    let mut table = RouteTable::new();
    let mut behaviors = Vec::new();

    for (path, title, name) in PATHS {
        let mut behavior = ModuleBehavior::default();
        tweak(path, &mut behavior);
        let behavior = Rc::new(behavior);
        behaviors.push((path, behavior.clone()));

        let ctx = ctx.clone();
        table
            .register(Route::lazy(path, title, move || {
                ctx.push_log(format!("load:{}", name));
                let module = RecordingModule {
                    name,
                    ctx: ctx.clone(),
                    behavior: behavior.clone(),
                };
                async move { Ok(Rc::new(module) as Rc<dyn FeatureModule<TestRoot>>) }
            }))
            .unwrap();
    }

    let router = Router::new(host.clone(), table, AppConfig::default());
    Fixture {
        ctx,
        host,
        router,
        behaviors,
    }
}

fn setup() -> Fixture {
    setup_with(true, |_, _| {})
}

// =========================================================
// Initialization
// =========================================================

#[tokio::test]
async fn initialize_mounts_default_route() {
    let f = setup();
    f.router.initialize().await.unwrap();

    assert_eq!(f.router.phase(), RouterPhase::Idle);
    assert_eq!(f.router.current_route().unwrap().path, "/");
    assert_eq!(f.ctx.root_content(), "home");
    assert_eq!(*f.ctx.title.borrow(), "SIGPA – Home");
    assert_eq!(f.ctx.active_nav.borrow().as_deref(), Some("#/"));

    let events: Vec<_> = f.ctx.listeners.borrow().iter().map(|(e, _)| *e).collect();
    assert_eq!(events, vec![LocationEvent::HashChange, LocationEvent::PopState]);
}

#[tokio::test]
async fn initialize_twice_is_noop() {
    let f = setup();
    f.router.initialize().await.unwrap();
    f.router.initialize().await.unwrap();

    assert_eq!(f.ctx.listeners.borrow().len(), 2);
    assert_eq!(f.ctx.log_count("mount:home"), 1);
}

#[tokio::test]
async fn dropped_router_ignores_location_events() {
    let f = setup();
    f.router.initialize().await.unwrap();
    let Fixture { ctx, router, .. } = f;
    drop(router);

    let listeners: Vec<_> = ctx.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
    for listener in listeners {
        listener();
    }
    assert!(ctx.tasks.borrow().is_empty());
}

#[tokio::test]
async fn initialize_without_root_fails_softly() {
    let f = setup_with(false, |_, _| {});
    let err = f.router.initialize().await.unwrap_err();

    assert_eq!(err.status, ErrorStatus::NotFound);
    assert!(!f.router.is_initialized());
    assert!(f.ctx.listeners.borrow().is_empty());
    assert!(f.ctx.log_count("mount:home") == 0);
}

#[tokio::test]
async fn route_change_before_initialize_is_ignored() {
    let f = setup();
    let transition = f.router.handle_route_change().await;
    assert_eq!(transition, Transition::Uninitialized);
    assert!(!f.router.has_mounted_module());
}

#[tokio::test]
async fn initial_hash_is_honored() {
    let f = setup();
    f.ctx.set_hash_silently("#/clima");
    f.router.initialize().await.unwrap();

    assert_eq!(f.router.current_route().unwrap().path, "/clima");
    assert_eq!(f.ctx.log_count("load:home"), 0);
}

// =========================================================
// Navigation
// =========================================================

#[tokio::test]
async fn navigate_reaches_every_route() {
    let f = setup();
    f.router.initialize().await.unwrap();

    for (path, title, name) in PATHS.iter().rev() {
        f.go(path).await;
        let current = f.router.current_route().unwrap();
        assert_eq!(current.path, *path);
        assert_eq!(*f.ctx.title.borrow(), format!("SIGPA – {}", title));
        assert_eq!(f.ctx.root_content(), *name);
        assert_eq!(f.router.phase(), RouterPhase::Idle);
    }
}

#[tokio::test]
async fn navigate_accepts_hash_or_path() {
    let f = setup();
    f.router.navigate("/riego");
    f.router.navigate("#/clima");

    let log = f.ctx.log.borrow();
    assert_eq!(log[0], "host:hash:#/riego");
    assert_eq!(log[1], "host:hash:#/clima");
}

#[tokio::test]
async fn previous_module_unmounts_exactly_once_before_next_mount() {
    let f = setup();
    f.router.initialize().await.unwrap();
    f.go("/riego").await;

    assert_eq!(f.ctx.log_count("unmount:home"), 1);
    let unmount = f.ctx.log_index("unmount:home").unwrap();
    let mount = f.ctx.log_index("mount:riego").unwrap();
    assert!(unmount < mount);
    assert_eq!(f.router.current_route().unwrap().path, "/riego");
}

#[tokio::test]
async fn duplicate_events_do_not_remount() {
    let f = setup();
    f.router.initialize().await.unwrap();
    f.go("/riego").await;

    // hashchange and popstate both fired for the same navigation
    assert_eq!(f.ctx.log_count("mount:riego"), 1);
    assert_eq!(f.router.handle_route_change().await, Transition::Unchanged(RouteMeta {
        path: "/riego",
        title: "Riego",
    }));
    assert_eq!(f.ctx.log_count("mount:riego"), 1);
}

#[tokio::test]
async fn module_loads_once_across_visits() {
    let f = setup();
    f.router.initialize().await.unwrap();
    f.go("/riego").await;
    f.go("/").await;
    f.go("/riego").await;

    assert_eq!(f.ctx.log_count("load:home"), 1);
    assert_eq!(f.ctx.log_count("load:riego"), 1);
    assert_eq!(f.ctx.log_count("mount:riego"), 2);
}

#[tokio::test]
async fn unknown_hash_renders_not_found() {
    let f = setup();
    f.router.initialize().await.unwrap();
    f.go("/nope").await;

    assert_eq!(f.router.current_route(), None);
    assert!(!f.router.has_mounted_module());
    assert_eq!(f.ctx.root_content(), "404:#/nope");
    assert_eq!(*f.ctx.title.borrow(), "SIGPA – Página no encontrada");
    assert_eq!(f.ctx.log_count("unmount:home"), 1);

    // 404 之后仍可正常导航
    f.go("/clima").await;
    assert_eq!(f.router.current_route().unwrap().path, "/clima");
    assert_eq!(f.ctx.root_content(), "clima");
}

#[tokio::test]
async fn fallback_is_released_before_next_mount() {
    let f = setup();
    f.router.initialize().await.unwrap();
    f.go("/nope").await;
    f.ctx.log.borrow_mut().clear();

    f.go("/riego").await;
    let cleared = f.ctx.log_index("host:clear_fallback").unwrap();
    let mounted = f.ctx.log_index("mount:riego").unwrap();
    assert!(cleared < mounted);
}

#[tokio::test]
async fn unmount_current_releases_fallback() {
    let f = setup();
    f.router.initialize().await.unwrap();
    f.go("/nope").await;

    assert!(f.router.unmount_current().await.is_none());
    assert_eq!(f.ctx.root_content(), "");
}

#[tokio::test]
async fn trailing_slash_is_not_normalized() {
    let f = setup();
    f.ctx.set_hash_silently("#/riego/");
    f.router.initialize().await.unwrap();

    assert!(matches!(
        f.ctx.fallbacks.borrow().last(),
        Some(FallbackView::NotFound { hash }) if hash == "#/riego/"
    ));
}

// =========================================================
// Failure handling
// =========================================================

#[tokio::test]
async fn mount_failure_clears_state_and_renders_error() {
    let f = setup_with(true, |path, b| b.fail_mount = path == "/clima");
    f.router.initialize().await.unwrap();

    f.router.navigate("/clima");
    f.host.run_pending().await;

    assert_eq!(f.router.current_route(), None);
    assert!(!f.router.has_mounted_module());
    assert_eq!(f.ctx.root_content(), "error:/clima");
    assert!(matches!(
        f.ctx.fallbacks.borrow().last(),
        Some(FallbackView::MountError { path: "/clima", message }) if message == "clima exploded"
    ));

    f.go("/riego").await;
    assert_eq!(f.router.current_route().unwrap().path, "/riego");
    assert_eq!(f.ctx.log_count("unmount:clima"), 0);
}

#[tokio::test]
async fn mount_failure_is_reported_in_transition() {
    let f = setup_with(true, |path, b| b.fail_mount = path == "/");
    f.router.initialize().await.unwrap();
    f.go("/riego").await;

    f.ctx.set_hash_silently("#/");
    match f.router.handle_route_change().await {
        Transition::MountFailed { route, message } => {
            assert_eq!(route.path, "/");
            assert!(message.contains("router.mount(/)"));
        }
        other => panic!("unexpected transition: {:?}", other),
    }
}

#[tokio::test]
async fn unmount_failure_does_not_block_navigation() {
    let f = setup_with(true, |path, b| b.fail_unmount = path == "/");
    f.router.initialize().await.unwrap();
    f.go("/alertas").await;

    assert_eq!(f.ctx.log_count("unmount:home"), 1);
    assert_eq!(f.router.current_route().unwrap().path, "/alertas");
}

// =========================================================
// Concurrency
// =========================================================

#[tokio::test]
async fn rapid_requests_supersede_queued_ones() {
    let (tx, rx) = oneshot::channel();
    let f = setup();
    f.router.initialize().await.unwrap();
    *f.behavior("/riego").gate.borrow_mut() = Some(rx);

    f.ctx.set_hash_silently("#/riego");
    let mut tx = Some(tx);
    let (first, second, third, _) = futures::join!(
        f.router.handle_route_change(),
        f.router.handle_route_change(),
        f.router.handle_route_change(),
        async {
            // first is parked inside the riego mount, the others wait for the lock
            f.ctx.set_hash_silently("#/alertas");
            if let Some(tx) = tx.take() {
                tx.send(()).unwrap();
            }
        }
    );

    assert_eq!(
        first,
        Transition::Mounted(RouteMeta {
            path: "/riego",
            title: "Riego"
        })
    );
    assert_eq!(second, Transition::Superseded);
    assert_eq!(
        third,
        Transition::Mounted(RouteMeta {
            path: "/alertas",
            title: "Alertas"
        })
    );

    let unmount_riego = f.ctx.log_index("unmount:riego").unwrap();
    let mount_alertas = f.ctx.log_index("mount:alertas").unwrap();
    assert!(unmount_riego < mount_alertas);
    assert_eq!(f.router.current_route().unwrap().path, "/alertas");
}

#[tokio::test]
async fn queued_navigation_stales_pending_mount() {
    let (tx, rx) = oneshot::channel();
    let f = setup();
    f.router.initialize().await.unwrap();
    *f.behavior("/riego").gate.borrow_mut() = Some(rx);
    let riego = f.behavior("/riego");

    f.ctx.set_hash_silently("#/riego");
    let mut tx = Some(tx);
    let stale_while_parked = Cell::new(None);
    let (first, (second, _)) = futures::join!(
        f.router.handle_route_change(),
        async {
            f.ctx.set_hash_silently("#/alertas");
            futures::join!(f.router.handle_route_change(), async {
                // riego is parked on its gate, the alertas request waits for the lock
                let token = riego.token.borrow().clone().unwrap();
                stale_while_parked.set(Some(!token.is_current()));
                if let Some(tx) = tx.take() {
                    tx.send(()).unwrap();
                }
            })
        }
    );

    assert_eq!(stale_while_parked.get(), Some(true));
    assert!(matches!(first, Transition::Mounted(_)));
    assert_eq!(
        second,
        Transition::Mounted(RouteMeta {
            path: "/alertas",
            title: "Alertas"
        })
    );
    assert_eq!(f.ctx.log_count("skip:riego"), 1);
    assert_eq!(f.ctx.log_count("unmount:riego"), 0);
    assert_eq!(f.ctx.root_content(), "alertas");
}

#[tokio::test]
async fn duplicate_request_keeps_pending_mount_current() {
    let (tx, rx) = oneshot::channel();
    let f = setup();
    f.router.initialize().await.unwrap();
    *f.behavior("/riego").gate.borrow_mut() = Some(rx);
    let riego = f.behavior("/riego");

    f.ctx.set_hash_silently("#/riego");
    let mut tx = Some(tx);
    let (first, (second, _)) = futures::join!(
        f.router.handle_route_change(),
        async {
            futures::join!(f.router.handle_route_change(), async {
                let token = riego.token.borrow().clone().unwrap();
                assert!(token.is_current());
                if let Some(tx) = tx.take() {
                    tx.send(()).unwrap();
                }
            })
        }
    );

    assert!(matches!(first, Transition::Mounted(_)));
    assert!(matches!(second, Transition::Unchanged(_)));
    assert_eq!(f.ctx.root_content(), "riego");
}

#[tokio::test]
async fn token_goes_stale_after_leaving() {
    let f = setup();
    f.router.initialize().await.unwrap();

    let home_token = f.behavior("/").token.borrow().clone().unwrap();
    assert!(home_token.is_current());

    f.go("/riego").await;
    assert!(!home_token.is_current());

    let riego_token = f.behavior("/riego").token.borrow().clone().unwrap();
    assert!(riego_token.is_current());
}

#[tokio::test]
async fn unmount_current_releases_module() {
    let f = setup();
    f.router.initialize().await.unwrap();

    let released = f.router.unmount_current().await;
    assert_eq!(released.map(|m| m.path), Some("/"));
    assert_eq!(f.ctx.log_count("unmount:home"), 1);
    assert!(!f.router.has_mounted_module());
    assert!(f.router.unmount_current().await.is_none());
}

#[test]
fn find_route_matches_exactly() {
    let f = setup();
    assert_eq!(f.router.find_route("#/riego").unwrap().title, "Riego");
    assert!(f.router.find_route("#/riego/").is_none());
    assert!(f.router.find_route("/riego").is_none());
    assert_eq!(f.router.routes().len(), PATHS.len());
}
