//! The circuit-breaker metrics stream bundle

use std::sync::Arc;

use super::{Bootstrap, Bundle, BundleState};
use crate::config::{
    BundleConfiguration, BundleConfigurationBuilder, Configuration, SERVLET_NAME,
};
use crate::environment::{ContextKind, Environment};
use crate::error::{BundleError, BundleResult};
use crate::publisher::RegistryMetricsPublisher;
use crate::stream::stream_servlet;

/// Registers the metrics stream servlet on one HTTP context and installs the
/// registry-backed metrics publisher into the circuit-breaker plugin slot.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use breaker_bundle::{
///     BaseConfiguration, Bootstrap, BreakerStreamBundle, Bundle, Environment, SERVLET_NAME,
/// };
/// use breaker_core::BreakerPlugins;
///
/// let mut bundle = BreakerStreamBundle::<BaseConfiguration>::new();
/// let mut env = Environment::with_plugins("demo", Arc::new(BreakerPlugins::new())).unwrap();
///
/// bundle.initialize(&mut Bootstrap::new("demo")).unwrap();
/// bundle.run(&BaseConfiguration::default(), &mut env).unwrap();
///
/// assert!(env.admin().servlet_registration(SERVLET_NAME).is_some());
/// ```
pub struct BreakerStreamBundle<C> {
    configuration: BundleConfiguration<C>,
    state: BundleState,
}

impl<C> BreakerStreamBundle<C> {
    /// Bundle with every default: stream on the admin context at
    /// [`DEFAULT_STREAM_PATH`](crate::DEFAULT_STREAM_PATH), publisher on
    pub fn new() -> Self {
        Self::from_configuration(BundleConfiguration::default())
    }

    /// Same as [`new`](Self::new)
    pub fn with_default_settings() -> Self {
        Self::new()
    }

    /// Start a configuration; finish with `build` and
    /// [`from_configuration`](Self::from_configuration)
    pub fn builder() -> BundleConfigurationBuilder<C> {
        BundleConfigurationBuilder::new()
    }

    /// Bundle using a built configuration
    pub fn from_configuration(configuration: BundleConfiguration<C>) -> Self {
        Self {
            configuration,
            state: BundleState::Uninitialized,
        }
    }

    pub fn configuration(&self) -> &BundleConfiguration<C> {
        &self.configuration
    }

    pub fn state(&self) -> BundleState {
        self.state
    }

    /// Register the stream servlet; returns the context it landed in
    fn register_stream(&self, environment: &mut Environment) -> BundleResult<Option<ContextKind>> {
        let target = self.configuration.target();
        let (Some(kind), Some(path)) = (target.context(), target.path()) else {
            tracing::info!("metrics stream servlet disabled");
            return Ok(None);
        };

        let servlet = stream_servlet(
            Arc::clone(environment.breakers()),
            *self.configuration.stream_settings(),
            environment.shutdown_token().clone(),
        );
        environment
            .context_mut(kind)
            .add_servlet_at(SERVLET_NAME, path, servlet)?;

        tracing::info!(context = %kind, path = %path, "serving circuit breaker metrics stream");
        Ok(Some(kind))
    }
}

impl<C> Default for BreakerStreamBundle<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> From<BundleConfiguration<C>> for BreakerStreamBundle<C> {
    fn from(configuration: BundleConfiguration<C>) -> Self {
        Self::from_configuration(configuration)
    }
}

impl<C> std::fmt::Debug for BreakerStreamBundle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakerStreamBundle")
            .field("configuration", &self.configuration)
            .field("state", &self.state)
            .finish()
    }
}

impl<C: Configuration> Bundle<C> for BreakerStreamBundle<C> {
    fn name(&self) -> &str {
        "breaker-stream"
    }

    fn initialize(&mut self, _bootstrap: &mut Bootstrap) -> BundleResult<()> {
        match self.state {
            BundleState::Active => Err(BundleError::lifecycle(
                "initialize called after the bundle already ran",
            )),
            _ => {
                self.state = BundleState::Initialized;
                Ok(())
            }
        }
    }

    fn run(&mut self, configuration: &C, environment: &mut Environment) -> BundleResult<()> {
        if self.state != BundleState::Initialized {
            return Err(BundleError::lifecycle(format!(
                "run requires an initialized bundle, state is {}",
                self.state
            )));
        }

        let install_publisher = self.configuration.should_install_publisher(configuration);
        if install_publisher {
            environment
                .plugins()
                .ensure_metrics_publisher_vacant(RegistryMetricsPublisher::NAME)?;
        }

        let registered = self.register_stream(environment)?;

        if install_publisher {
            let publisher = RegistryMetricsPublisher::new(Arc::clone(environment.metrics()));
            if let Err(e) = environment
                .plugins()
                .register_metrics_publisher(Arc::new(publisher))
            {
                // slot taken since the vacancy check
                if let Some(kind) = registered {
                    environment.context_mut(kind).remove_servlet(SERVLET_NAME);
                }
                return Err(e.into());
            }
        } else {
            tracing::info!("circuit breaker metrics publisher not installed");
        }

        self.state = BundleState::Active;
        Ok(())
    }
}
