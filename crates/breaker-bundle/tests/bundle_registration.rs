//! Registration behaviour of the stream bundle through a host application

use std::sync::Arc;

use breaker_bundle::{
    Application, BaseConfiguration, BreakerStreamBundle, BundleError, BundleSettings,
    DEFAULT_STREAM_PATH, Environment, RegistryMetricsPublisher, SERVLET_NAME, TargetKind,
};
use breaker_core::{BreakerPlugins, MetricRegistry};

type Bundle = BreakerStreamBundle<BaseConfiguration>;

fn setup(bundle: Bundle) -> (Environment, Arc<BreakerPlugins>) {
    let plugins = Arc::new(BreakerPlugins::new());
    let mut app = Application::new("registration-test")
        .with_plugins(Arc::clone(&plugins))
        .add_bundle(bundle);
    let env = app.setup(&BaseConfiguration::default()).unwrap();
    (env, plugins)
}

fn holds_registry_publisher(plugins: &BreakerPlugins) -> bool {
    plugins
        .installed_metrics_publisher()
        .is_some_and(|p| p.as_any().is::<RegistryMetricsPublisher>())
}

#[test]
fn test_defaults_register_on_admin_not_application() {
    let (env, _) = setup(Bundle::new());

    assert!(env.admin().servlet_registration(SERVLET_NAME).is_some());
    assert!(env.application().servlet_registration(SERVLET_NAME).is_none());
}

#[test]
fn test_application_path_with_admin_disabled_registers_on_application() {
    let config = Bundle::builder()
        .with_application_stream_path(DEFAULT_STREAM_PATH)
        .disable_stream_servlet_in_admin_context()
        .build()
        .unwrap();
    let (env, _) = setup(Bundle::from_configuration(config));

    assert!(env.admin().servlet_registration(SERVLET_NAME).is_none());
    assert!(env.application().servlet_registration(SERVLET_NAME).is_some());
}

#[test]
fn test_admin_uri_becomes_the_mapping() {
    let config = Bundle::builder()
        .with_admin_stream_uri("/admin/circuit.stream")
        .build()
        .unwrap();
    let (env, _) = setup(Bundle::from_configuration(config));

    let registration = env.admin().servlet_registration(SERVLET_NAME).unwrap();
    assert_eq!(registration.mappings(), ["/admin/circuit.stream".to_string()]);
}

#[test]
fn test_disabled_publisher_leaves_slot_empty() {
    let config = Bundle::builder().disable_metrics_publisher().build().unwrap();
    let (_, plugins) = setup(Bundle::from_configuration(config));

    assert!(!holds_registry_publisher(&plugins));
}

#[test]
fn test_predicate_decides_installation() {
    let allow = Bundle::builder()
        .with_metrics_publisher_predicate(|_| true)
        .build()
        .unwrap();
    let (_, plugins) = setup(Bundle::from_configuration(allow));
    assert!(holds_registry_publisher(&plugins));

    let deny = Bundle::builder()
        .with_metrics_publisher_predicate(|_| false)
        .build()
        .unwrap();
    let (_, plugins) = setup(Bundle::from_configuration(deny));
    assert!(!holds_registry_publisher(&plugins));
}

#[test]
fn test_application_only_configuration_from_settings() {
    let settings = BundleSettings {
        stream_path: Some("/app.stream".to_string()),
        target: TargetKind::Application,
        ..Default::default()
    };
    let config = settings.to_builder().build().unwrap();
    let (env, _) = setup(Bundle::from_configuration(config));

    assert!(env.admin().servlet_registration(SERVLET_NAME).is_none());
    assert_eq!(
        env.application()
            .servlet_registration(SERVLET_NAME)
            .unwrap()
            .mappings(),
        ["/app.stream".to_string()]
    );
}

#[test]
fn test_second_publisher_installation_fails_start_up() {
    let plugins = Arc::new(BreakerPlugins::new());
    let registry = Arc::new(MetricRegistry::new());
    plugins
        .register_metrics_publisher(Arc::new(RegistryMetricsPublisher::new(registry)))
        .unwrap();

    let mut app = Application::new("registration-test")
        .with_plugins(plugins)
        .add_bundle(Bundle::new());
    let err = app.setup(&BaseConfiguration::default()).unwrap_err();

    assert!(matches!(err, BundleError::PluginAlreadyInstalled { .. }));
}
