//! HTTP contexts and their servlet registrations

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::Router;
use axum::routing::MethodRouter;
use parking_lot::Mutex;

use crate::config::validate_stream_path;
use crate::error::{BundleError, BundleResult};

/// The two HTTP surfaces of a host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// Operator-facing port: health, metrics, diagnostics
    Admin,
    /// Port serving the application's own routes
    Application,
}

impl ContextKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Application => "application",
        }
    }
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named handler and the URL paths it is mapped to
pub struct ServletRegistration {
    name: String,
    context: ContextKind,
    handler: MethodRouter,
    mappings: Vec<String>,
    // paths taken by any servlet of the owning context
    mapped_paths: Arc<Mutex<BTreeSet<String>>>,
}

impl ServletRegistration {
    /// Servlet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Paths mapped so far, in insertion order
    pub fn mappings(&self) -> &[String] {
        &self.mappings
    }

    /// Map the servlet to `path`.
    ///
    /// Fails with `ConfigurationConflict` if any servlet of the same context
    /// already owns `path`, and with `InvalidPath` if it cannot be routed.
    pub fn add_mapping(&mut self, path: impl Into<String>) -> BundleResult<&mut Self> {
        let path = path.into();
        validate_stream_path(&path)?;

        if !self.mapped_paths.lock().insert(path.clone()) {
            return Err(BundleError::conflict(
                self.context.as_str(),
                format!("URL mapping '{}'", path),
            ));
        }

        tracing::debug!(
            servlet = %self.name,
            context = %self.context,
            path = %path,
            "mapped servlet"
        );
        self.mappings.push(path);
        Ok(self)
    }
}

impl std::fmt::Debug for ServletRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServletRegistration")
            .field("name", &self.name)
            .field("context", &self.context)
            .field("mappings", &self.mappings)
            .finish_non_exhaustive()
    }
}

/// Servlet map of one HTTP context
pub struct HttpContext {
    kind: ContextKind,
    servlets: BTreeMap<String, ServletRegistration>,
    mapped_paths: Arc<Mutex<BTreeSet<String>>>,
}

impl HttpContext {
    /// Empty context
    pub fn new(kind: ContextKind) -> Self {
        Self {
            kind,
            servlets: BTreeMap::new(),
            mapped_paths: Arc::new(Mutex::new(BTreeSet::new())),
        }
    }

    /// Which context this is
    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    /// Register `handler` under `name`; map it with
    /// [`ServletRegistration::add_mapping`]
    pub fn add_servlet(
        &mut self,
        name: impl Into<String>,
        handler: MethodRouter,
    ) -> BundleResult<&mut ServletRegistration> {
        let name = name.into();
        if self.servlets.contains_key(&name) {
            return Err(BundleError::conflict(
                self.kind.as_str(),
                format!("servlet '{}'", name),
            ));
        }

        tracing::info!(servlet = %name, context = %self.kind, "registered servlet");
        let registration = ServletRegistration {
            name: name.clone(),
            context: self.kind,
            handler,
            mappings: Vec::new(),
            mapped_paths: Arc::clone(&self.mapped_paths),
        };
        Ok(self.servlets.entry(name).or_insert(registration))
    }

    /// Register `handler` under `name`, mapped to `path`.
    ///
    /// Either both the servlet and its mapping are added, or the context is
    /// left untouched.
    pub fn add_servlet_at(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
        handler: MethodRouter,
    ) -> BundleResult<&mut ServletRegistration> {
        let name = name.into();
        let path = path.into();
        validate_stream_path(&path)?;
        if self.servlets.contains_key(&name) {
            return Err(BundleError::conflict(
                self.kind.as_str(),
                format!("servlet '{}'", name),
            ));
        }
        if self.mapped_paths.lock().contains(&path) {
            return Err(BundleError::conflict(
                self.kind.as_str(),
                format!("URL mapping '{}'", path),
            ));
        }

        let registration = self.add_servlet(name, handler)?;
        registration.add_mapping(path)
    }

    /// Unregister the servlet named `name` and free its mappings
    pub fn remove_servlet(&mut self, name: &str) -> Option<ServletRegistration> {
        let registration = self.servlets.remove(name)?;
        let mut mapped = self.mapped_paths.lock();
        for path in &registration.mappings {
            mapped.remove(path);
        }
        tracing::info!(servlet = %name, context = %self.kind, "removed servlet");
        Some(registration)
    }

    /// Registration named `name`, if any
    pub fn servlet_registration(&self, name: &str) -> Option<&ServletRegistration> {
        self.servlets.get(name)
    }

    /// Registered servlet names, sorted
    pub fn servlet_names(&self) -> Vec<String> {
        self.servlets.keys().cloned().collect()
    }

    /// Router serving every mapping of every servlet
    pub fn router(&self) -> Router {
        self.servlets
            .values()
            .flat_map(|servlet| {
                servlet
                    .mappings
                    .iter()
                    .map(move |path| (path.as_str(), servlet.handler.clone()))
            })
            .fold(Router::new(), |router, (path, handler)| router.route(path, handler))
    }
}

impl std::fmt::Debug for HttpContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpContext")
            .field("kind", &self.kind)
            .field("servlets", &self.servlets.values().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn test_duplicate_servlet_name() {
        let mut ctx = HttpContext::new(ContextKind::Admin);
        ctx.add_servlet("ping", get(|| async { "pong" })).unwrap();

        let err = ctx.add_servlet("ping", get(|| async { "pong" })).unwrap_err();
        assert_eq!(err, BundleError::conflict("admin", "servlet 'ping'"));
    }

    #[test]
    fn test_duplicate_mapping_across_servlets() {
        let mut ctx = HttpContext::new(ContextKind::Application);
        ctx.add_servlet("a", get(|| async { "a" }))
            .unwrap()
            .add_mapping("/shared")
            .unwrap();

        let err = ctx
            .add_servlet("b", get(|| async { "b" }))
            .unwrap()
            .add_mapping("/shared")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "URL mapping '/shared' is already registered in the application context"
        );
    }

    #[test]
    fn test_mappings_and_names() {
        let mut ctx = HttpContext::new(ContextKind::Admin);
        ctx.add_servlet("zeta", get(|| async { "z" }))
            .unwrap()
            .add_mapping("/z")
            .unwrap()
            .add_mapping("/z2")
            .unwrap();
        ctx.add_servlet("alpha", get(|| async { "a" })).unwrap();

        assert_eq!(ctx.servlet_names(), vec!["alpha", "zeta"]);
        assert_eq!(
            ctx.servlet_registration("zeta").unwrap().mappings(),
            ["/z".to_string(), "/z2".to_string()]
        );
        assert!(ctx.servlet_registration("alpha").unwrap().mappings().is_empty());
        assert!(ctx.servlet_registration("missing").is_none());
    }

    #[test]
    fn test_add_servlet_at_is_all_or_nothing() {
        let mut ctx = HttpContext::new(ContextKind::Admin);
        ctx.add_servlet_at("metrics", "/metrics", get(|| async { "{}" }))
            .unwrap();

        let err = ctx
            .add_servlet_at("stream", "/metrics", get(|| async { "" }))
            .unwrap_err();
        assert_eq!(err, BundleError::conflict("admin", "URL mapping '/metrics'"));
        assert!(ctx.servlet_registration("stream").is_none());

        let err = ctx
            .add_servlet_at("stream", "no-slash", get(|| async { "" }))
            .unwrap_err();
        assert_eq!(err.error_code(), "BUNDLE_INVALID_PATH");
        assert!(ctx.servlet_registration("stream").is_none());

        let err = ctx
            .add_servlet_at("metrics", "/other", get(|| async { "" }))
            .unwrap_err();
        assert_eq!(err, BundleError::conflict("admin", "servlet 'metrics'"));

        let stream = ctx
            .add_servlet_at("stream", "/stream", get(|| async { "" }))
            .unwrap();
        assert_eq!(stream.mappings(), ["/stream".to_string()]);
    }

    #[test]
    fn test_remove_servlet_frees_mappings() {
        let mut ctx = HttpContext::new(ContextKind::Application);
        ctx.add_servlet_at("a", "/shared", get(|| async { "a" }))
            .unwrap();

        let removed = ctx.remove_servlet("a").unwrap();
        assert_eq!(removed.mappings(), ["/shared".to_string()]);
        assert!(ctx.servlet_names().is_empty());
        assert!(ctx.remove_servlet("a").is_none());

        ctx.add_servlet_at("b", "/shared", get(|| async { "b" }))
            .unwrap();
    }

    #[test]
    fn test_invalid_mapping() {
        let mut ctx = HttpContext::new(ContextKind::Admin);
        let err = ctx
            .add_servlet("bad", get(|| async { "" }))
            .unwrap()
            .add_mapping("relative")
            .unwrap_err();
        assert_eq!(err.error_code(), "BUNDLE_INVALID_PATH");
    }

    #[tokio::test]
    async fn test_router_serves_mappings() {
        let mut ctx = HttpContext::new(ContextKind::Admin);
        ctx.add_servlet("ping", get(|| async { "pong" }))
            .unwrap()
            .add_mapping("/ping")
            .unwrap()
            .add_mapping("/healthcheck")
            .unwrap();
        let router = ctx.router();

        for uri in ["/ping", "/healthcheck"] {
            let response = router
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = router
            .oneshot(Request::builder().uri("/other").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
