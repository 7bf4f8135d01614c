//! Breaker Stream Bundle
//!
//! Wires circuit-breaker observability into a host application at start-up:
//!
//! - registers a server-sent-events endpoint streaming live breaker
//!   statistics on the admin or the application HTTP context;
//! - installs a metrics publisher into the circuit-breaker plugin slot so
//!   breaker statistics also land in the metric registry.
//!
//! ```
//! use std::sync::Arc;
//!
//! use breaker_bundle::{Application, BaseConfiguration, BreakerStreamBundle, SERVLET_NAME};
//! use breaker_core::BreakerPlugins;
//!
//! let config = BreakerStreamBundle::<BaseConfiguration>::builder()
//!     .with_application_stream_path("/breakers.stream")
//!     .disable_stream_servlet_in_admin_context()
//!     .build()
//!     .unwrap();
//!
//! let mut app = Application::new("orders")
//!     .with_plugins(Arc::new(BreakerPlugins::new()))
//!     .add_bundle(BreakerStreamBundle::from_configuration(config));
//! let env = app.setup(&BaseConfiguration::default()).unwrap();
//!
//! assert!(env.admin().servlet_registration(SERVLET_NAME).is_none());
//! assert!(env.application().servlet_registration(SERVLET_NAME).is_some());
//! ```

pub mod application;
pub mod bundle;
pub mod config;
pub mod environment;
pub mod error;
pub mod logging;
pub mod publisher;
pub mod stream;

pub use application::{Application, RunningApplication};
pub use bundle::{Bootstrap, BreakerStreamBundle, Bundle, BundleState};
pub use config::{
    BaseConfiguration, BundleConfiguration, BundleConfigurationBuilder, BundleSettings,
    Configuration, DEFAULT_STREAM_PATH, MetricsPublisherPredicate, SERVLET_NAME, ServerSettings,
    StreamTarget, TargetKind,
};
pub use environment::{ContextKind, Environment, HttpContext, ServletRegistration};
pub use error::{BundleError, BundleResult};
pub use logging::{LogFormat, LoggingConfig, init_logging};
pub use publisher::RegistryMetricsPublisher;
pub use stream::{BreakerEvent, StreamSettings};
