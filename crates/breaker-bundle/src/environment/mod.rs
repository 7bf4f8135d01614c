//! Host environment: HTTP contexts and shared registries

mod context;
#[allow(clippy::module_inception)]
mod environment;

#[cfg(test)]
mod tests;

pub use context::{ContextKind, HttpContext, ServletRegistration};
pub use environment::{Environment, METRICS_SERVLET, PING_SERVLET};
