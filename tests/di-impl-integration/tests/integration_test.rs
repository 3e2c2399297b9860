//! Centralized integration tests for di-impl crate
use anyhow::Result;
use di_abstractions::{
    Arguments, CompileMode, ContainerOptions, Definition, FieldBinding, InjectionRequest, InjectionTarget, Reference,
    ServiceProvider, ValidationMode,
};
use di_impl::{global_locator, Container, PropertyInjector, ServiceLocator};
use infrastructure_common::{BoxError, ContainerPhase, DependencyError};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 测试组件
#[derive(Debug, PartialEq)]
struct Connection {
    dsn: String,
    pool: u32,
}

#[derive(Debug)]
struct Repository {
    connection: Arc<Connection>,
    table: String,
}

#[derive(Debug)]
struct Greeter {
    greeting: String,
}

#[derive(Debug)]
struct Logger;

fn register_types(container: &Container) -> Result<()> {
    container.register_fn("Connection", |args: &Arguments| {
        Ok(Connection {
            dsn: args.string(0)?,
            pool: args.parse(1)?,
        })
    })?;
    container.register_fn("Repository", |args: &Arguments| {
        Ok(Repository {
            connection: args.service::<Connection>(0)?,
            table: args.string(1)?,
        })
    })?;
    container.register_fn("Greeter", |args: &Arguments| {
        Ok(Greeter {
            greeting: args.string(0)?,
        })
    })?;
    container.register_fn("Logger", |_: &Arguments| Ok(Logger))?;
    Ok(())
}

fn app_container(options: ContainerOptions) -> Result<Container> {
    let container = Container::with_options(options);
    register_types(&container)?;
    container.set_parameter("db.host", "localhost")?;
    container.set_parameter("db.pool", 4)?;
    container.define(
        Definition::new("connection", "Connection")
            .with_argument(Reference::interpolated("postgres://%db.host%/app"))
            .with_argument(Reference::parameter("db.pool")),
    )?;
    container.define(
        Definition::new("repository", "Repository")
            .with_argument(Reference::service("connection"))
            .with_argument(Reference::literal("users")),
    )?;
    container.define(Definition::new("greeter", "Greeter").with_argument(Reference::literal("hello")))?;
    Ok(container)
}

#[test]
fn test_acyclic_graph_arguments_in_declared_order() -> Result<()> {
    let container = app_container(ContainerOptions::default())?;
    container.compile()?;

    let repository = container.get_typed::<Repository>("repository")?;
    assert_eq!(repository.table, "users");
    assert_eq!(
        *repository.connection,
        Connection {
            dsn: "postgres://localhost/app".to_string(),
            pool: 4,
        }
    );
    Ok(())
}

#[test]
fn test_singleton_identity_and_prototype_distinctness() -> Result<()> {
    let container = app_container(ContainerOptions::default())?;
    container.define(
        Definition::new("session", "Connection")
            .prototype()
            .with_argument(Reference::literal("memory://"))
            .with_argument(Reference::literal(1)),
    )?;
    container.compile()?;

    let first = container.get("connection")?;
    let second = container.get("connection")?;
    assert!(first.ptr_eq(&second));

    let a = container.get_typed::<Connection>("session")?;
    let b = container.get_typed::<Connection>("session")?;
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn test_cycle_fails_and_container_stays_usable() -> Result<()> {
    let container = app_container(ContainerOptions::default())?;
    container.define(Definition::new("A", "Repository").with_argument(Reference::service("B")))?;
    container.define(Definition::new("B", "Repository").with_argument(Reference::service("A")))?;
    container.compile()?;

    let error = container.get("A").unwrap_err();
    let path = error.cycle_path().expect("cycle path");
    assert_eq!(path, ["A", "B", "A"]);
    assert!(error.to_string().contains("A -> B -> A"));

    assert_eq!(container.phase(), ContainerPhase::Compiled);
    assert_eq!(container.get_typed::<Greeter>("greeter")?.greeting, "hello");
    assert!(matches!(container.get("A"), Err(DependencyError::CircularDependency { .. })));
    Ok(())
}

#[test]
fn test_mutation_after_compile_is_frozen() -> Result<()> {
    let container = app_container(ContainerOptions::default())?;
    container.compile()?;
    let before = container.get("greeter")?;

    assert!(matches!(
        container.define(Definition::new("greeter", "Logger")),
        Err(DependencyError::FrozenContainer { .. })
    ));
    assert!(matches!(
        container.set_parameter("db.host", "remote"),
        Err(DependencyError::FrozenContainer { .. })
    ));

    assert_eq!(container.parameter("db.host")?, json!("localhost"));
    assert_eq!(container.definition("greeter").map(|definition| definition.type_ref), Some("Greeter".to_string()));
    assert!(container.get("greeter")?.ptr_eq(&before));
    Ok(())
}

#[test]
fn test_private_service_only_reachable_as_dependency() -> Result<()> {
    let container = app_container(ContainerOptions::default())?;
    container.define(
        Definition::new("connection", "Connection")
            .private()
            .with_argument(Reference::literal("sqlite://"))
            .with_argument(Reference::literal(1)),
    )?;
    container.compile()?;

    assert!(matches!(
        container.get("connection"),
        Err(DependencyError::ServiceNotFound { ref id, .. }) if id == "connection"
    ));
    assert_eq!(container.get_typed::<Repository>("repository")?.connection.dsn, "sqlite://");
    Ok(())
}

#[derive(Default)]
struct Controller {
    greeter: Option<Arc<Greeter>>,
}

impl InjectionTarget for Controller {
    fn injection_requests() -> Vec<InjectionRequest<Self>> {
        vec![InjectionRequest::new(
            FieldBinding::typed("greeter", |target: &mut Controller, greeter: Arc<Greeter>| {
                target.greeter = Some(greeter);
            }),
            "greeter",
        )]
    }
}

#[test]
fn test_property_injection_round_trip() -> Result<()> {
    let container = app_container(ContainerOptions::default())?;
    container.compile()?;

    let mut controller = Controller::default();
    PropertyInjector::new().inject_target(&mut controller, &container)?;

    let injected = controller.greeter.expect("greeter injected");
    let resolved = container.get_typed::<Greeter>("greeter")?;
    assert!(Arc::ptr_eq(&injected, &resolved));
    Ok(())
}

#[test]
fn test_property_injection_type_mismatch() -> Result<()> {
    let container = app_container(ContainerOptions::default())?;
    container.compile()?;

    let mut logger_slot: Option<Arc<Logger>> = None;
    let requests = vec![InjectionRequest::new(
        FieldBinding::typed("greeter", |slot: &mut Option<Arc<Logger>>, logger: Arc<Logger>| {
            *slot = Some(logger);
        }),
        "greeter",
    )];

    let error = PropertyInjector::new()
        .inject(&mut logger_slot, &requests, &container)
        .unwrap_err();
    match error {
        DependencyError::TypeMismatch { field, expected, actual } => {
            assert_eq!(field, "greeter");
            assert_eq!(expected, "Logger");
            assert_eq!(actual, "Greeter");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(logger_slot.is_none());
    Ok(())
}

#[test]
fn test_property_injection_missing_service() -> Result<()> {
    let container = app_container(ContainerOptions::default())?;
    container.compile()?;

    let mut controller = Controller::default();
    let requests = vec![InjectionRequest::new(
        FieldBinding::typed("greeter", |target: &mut Controller, greeter: Arc<Greeter>| {
            target.greeter = Some(greeter);
        }),
        "absent",
    )];

    let error = PropertyInjector::new()
        .inject(&mut controller, &requests, &container)
        .unwrap_err();
    assert!(matches!(error, DependencyError::ServiceNotFound { ref id, .. } if id == "absent"));
    assert!(error.to_string().contains("absent"));
    Ok(())
}

#[test]
fn test_eager_compile_failure_leaves_only_inspection() -> Result<()> {
    let container = Container::with_options(ContainerOptions::default().with_compile_mode(CompileMode::Eager));
    register_types(&container)?;
    container.define(Definition::new("greeter", "Greeter").with_argument(Reference::literal("hi")))?;
    container.define(Definition::new("logger", "Logger").with_argument(Reference::service("undefined")))?;

    let error = container.compile().unwrap_err();
    assert!(matches!(
        error,
        DependencyError::UndefinedReference { ref id, ref referenced_by }
            if id == "undefined" && referenced_by == "logger"
    ));

    assert_eq!(container.phase(), ContainerPhase::Failed);
    assert!(matches!(
        container.compile_error(),
        Some(DependencyError::UndefinedReference { .. })
    ));
    for id in ["greeter", "logger"] {
        match container.get(id) {
            Err(DependencyError::CompileFailed { source }) => {
                assert!(matches!(*source, DependencyError::UndefinedReference { .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
    Ok(())
}

#[test]
fn test_eager_compile_reports_first_failure_in_registration_order() -> Result<()> {
    let container = Container::with_options(ContainerOptions::default().with_compile_mode(CompileMode::Eager));
    register_types(&container)?;
    // a 缺少构造参数，b 引用未定义的服务，两者都会失败
    container.define(Definition::new("a", "Greeter"))?;
    container.define(Definition::new("b", "Logger").with_argument(Reference::service("undefined")))?;

    let error = container.compile().unwrap_err();
    assert!(matches!(error, DependencyError::Instantiation { ref id, .. } if id == "a"));
    assert!(matches!(container.compile_error(), Some(DependencyError::Instantiation { .. })));
    Ok(())
}

fn failing_container(options: ContainerOptions) -> Result<Container> {
    let container = Container::with_options(options);
    register_types(&container)?;
    container.register_fn("Boom", |_: &Arguments| -> std::result::Result<Logger, BoxError> { Err("磁盘已满".into()) })?;
    container.define(Definition::new("boom", "Boom"))?;
    container.define(
        Definition::new("root", "Repository")
            .with_argument(Reference::service("boom"))
            .with_argument(Reference::service("missing")),
    )?;
    Ok(container)
}

#[test]
fn test_constructor_failure_reported_before_later_missing_argument() -> Result<()> {
    let container = failing_container(ContainerOptions::default())?;
    container.compile()?;
    match container.get("root") {
        Err(DependencyError::Instantiation { id, source, .. }) => {
            assert_eq!(id, "boom");
            assert_eq!(source.to_string(), "磁盘已满");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let eager = failing_container(ContainerOptions::default().with_compile_mode(CompileMode::Eager))?;
    assert!(matches!(
        eager.compile(),
        Err(DependencyError::Instantiation { ref id, .. }) if id == "boom"
    ));
    Ok(())
}

#[test]
fn test_first_touch_singletons_created_before_missing_argument() -> Result<()> {
    let container = app_container(ContainerOptions::default())?;
    container.define(
        Definition::new("orphan", "Repository")
            .with_argument(Reference::service("connection"))
            .with_argument(Reference::service("missing")),
    )?;
    container.compile()?;

    assert!(matches!(
        container.get("orphan"),
        Err(DependencyError::UndefinedReference { ref id, ref referenced_by })
            if id == "missing" && referenced_by == "orphan"
    ));
    assert_eq!(container.stats().singletons_created, 1);
    Ok(())
}

#[test]
fn test_global_locator_initialized_once() -> Result<()> {
    let container = Arc::new(app_container(ContainerOptions::default())?);
    container.compile()?;

    let locator = global_locator();
    locator.initialize(Arc::clone(&container))?;
    assert!(locator.is_initialized());
    assert!(matches!(
        global_locator().initialize(Arc::new(Container::new())),
        Err(DependencyError::LocatorAlreadyInitialized)
    ));

    let greeter = global_locator().get_typed::<Greeter>("greeter")?;
    assert_eq!(greeter.greeting, "hello");
    assert!(Arc::ptr_eq(&greeter, &container.get_typed::<Greeter>("greeter")?));
    Ok(())
}

#[test]
fn test_validation_collects_all_failures_without_instantiating() -> Result<()> {
    let container = app_container(ContainerOptions::default())?;
    container.define(Definition::new("orphan", "Repository").with_argument(Reference::service("missing")))?;
    container.define(Definition::new("phantom", "Phantom").with_argument(Reference::interpolated("%nope%")))?;

    let report = container.validate(ValidationMode::CollectAll)?;
    let failures: Vec<_> = report.failures().map(ToString::to_string).collect();
    assert_eq!(failures.len(), 3);
    assert!(failures.iter().any(|failure| failure.contains("missing")));
    assert!(failures.iter().any(|failure| failure.contains("nope")));
    assert!(failures.iter().any(|failure| failure.contains("Phantom")));
    assert!(report.into_result().is_err());

    container.compile()?;
    assert_eq!(container.stats().singletons_created, 0);
    Ok(())
}

#[test]
fn test_service_locator_over_explicit_container() -> Result<()> {
    let container = Arc::new(app_container(ContainerOptions::default())?);
    container.compile()?;

    let locator = ServiceLocator::new();
    assert!(!locator.has("greeter"));
    locator.initialize(Arc::clone(&container))?;

    assert!(locator.has("greeter"));
    assert!(locator.has_parameter("db.pool"));
    assert_eq!(locator.parameter("db.pool")?, json!(4));

    let mut controller = Controller::default();
    assert_eq!(locator.inject(&mut controller)?, 1);
    assert!(ServiceProvider::has(&*container, "greeter"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_get_is_single_flight() -> Result<()> {
    let constructed = Arc::new(AtomicUsize::new(0));
    let container = Container::new();
    let counter = Arc::clone(&constructed);
    container.register_fn("Slow", move |_: &Arguments| {
        counter.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        Ok(Logger)
    })?;
    container.define(Definition::new("slow", "Slow"))?;
    container.compile()?;
    let container = Arc::new(container);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let container = Arc::clone(&container);
        handles.push(tokio::task::spawn_blocking(move || container.get("slow")));
    }

    let mut instances = Vec::new();
    for handle in handles {
        instances.push(handle.await??);
    }

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert!(instances.windows(2).all(|pair| pair[0].ptr_eq(&pair[1])));
    Ok(())
}
