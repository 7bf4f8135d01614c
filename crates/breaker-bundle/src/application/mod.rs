//! Host application: bundles, environment set-up and the two listeners

mod running;

pub use running::RunningApplication;

use std::sync::Arc;

use breaker_core::BreakerPlugins;

use crate::bundle::{Bootstrap, Bundle};
use crate::config::Configuration;
use crate::environment::Environment;
use crate::error::BundleResult;

/// A host application assembled from bundles.
///
/// # Example
///
/// ```no_run
/// use breaker_bundle::{Application, BaseConfiguration, BreakerStreamBundle};
///
/// # async fn run() -> breaker_bundle::BundleResult<()> {
/// let running = Application::new("orders")
///     .add_bundle(BreakerStreamBundle::new())
///     .start(BaseConfiguration::default())
///     .await?;
///
/// println!("admin on {}", running.admin_addr());
/// running.shutdown().await
/// # }
/// ```
pub struct Application<C: Configuration> {
    name: String,
    plugins: Arc<BreakerPlugins>,
    bundles: Vec<Box<dyn Bundle<C>>>,
}

impl<C: Configuration> Application<C> {
    /// Application bound to the process-wide plugin slot
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plugins: BreakerPlugins::global(),
            bundles: Vec::new(),
        }
    }

    /// Bind the environment's breakers to `plugins` instead of the
    /// process-wide slot
    pub fn with_plugins(mut self, plugins: Arc<BreakerPlugins>) -> Self {
        self.plugins = plugins;
        self
    }

    /// Add a bundle; bundles run in the order they were added
    pub fn add_bundle<B>(mut self, bundle: B) -> Self
    where
        B: Bundle<C> + 'static,
    {
        self.bundles.push(Box::new(bundle));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the added bundles, in run order
    pub fn bundle_names(&self) -> Vec<&str> {
        self.bundles.iter().map(|b| b.name()).collect()
    }

    /// Initialize every bundle, then run every bundle against a fresh
    /// environment. The first error aborts set-up.
    pub fn setup(&mut self, configuration: &C) -> BundleResult<Environment> {
        let mut bootstrap = Bootstrap::new(self.name.clone());
        for bundle in &mut self.bundles {
            tracing::debug!(bundle = bundle.name(), "initializing bundle");
            bundle.initialize(&mut bootstrap)?;
        }

        let mut environment = Environment::with_plugins(self.name.clone(), Arc::clone(&self.plugins))?;
        for bundle in &mut self.bundles {
            tracing::debug!(bundle = bundle.name(), "running bundle");
            if let Err(e) = bundle.run(configuration, &mut environment) {
                tracing::error!(
                    bundle = bundle.name(),
                    code = e.error_code(),
                    "bundle failed, aborting start-up: {}",
                    e
                );
                return Err(e);
            }
        }

        tracing::info!(
            application = %self.name,
            bundles = self.bundles.len(),
            "application set up"
        );
        Ok(environment)
    }

    /// Set up and serve both contexts on the configured addresses
    pub async fn start(mut self, configuration: C) -> BundleResult<RunningApplication> {
        let environment = self.setup(&configuration)?;
        RunningApplication::bind(environment, configuration.server()).await
    }
}

impl<C: Configuration> std::fmt::Debug for Application<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.name)
            .field("bundles", &self.bundle_names())
            .finish()
    }
}
