//! Serving a set-up environment

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ServerSettings;
use crate::environment::{ContextKind, Environment};
use crate::error::{BundleError, BundleResult};

/// Both contexts being served; stop with [`shutdown`](Self::shutdown)
#[derive(Debug)]
pub struct RunningApplication {
    environment: Environment,
    admin_addr: SocketAddr,
    application_addr: SocketAddr,
    shutdown: CancellationToken,
    listeners: Vec<(ContextKind, JoinHandle<std::io::Result<()>>)>,
}

impl RunningApplication {
    /// Bind the admin and application listeners and serve the
    /// environment's routers until shut down
    pub async fn bind(environment: Environment, server: &ServerSettings) -> BundleResult<Self> {
        let admin = bind_listener(ContextKind::Admin, server.admin_address).await?;
        let application = bind_listener(ContextKind::Application, server.application_address).await?;
        let admin_addr = admin.local_addr()?;
        let application_addr = application.local_addr()?;

        let shutdown = environment.shutdown_token().clone();
        let listeners = vec![
            (
                ContextKind::Admin,
                spawn_server(admin, environment.admin().router(), shutdown.clone()),
            ),
            (
                ContextKind::Application,
                spawn_server(application, environment.application().router(), shutdown.clone()),
            ),
        ];

        tracing::info!(
            application = environment.name(),
            admin = %admin_addr,
            application_addr = %application_addr,
            "application started"
        );

        Ok(Self {
            environment,
            admin_addr,
            application_addr,
            shutdown,
            listeners,
        })
    }

    /// Bound admin address (the real port when configured with port 0)
    pub fn admin_addr(&self) -> SocketAddr {
        self.admin_addr
    }

    /// Bound application address
    pub fn application_addr(&self) -> SocketAddr {
        self.application_addr
    }

    /// Environment being served
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Stop accepting connections, end open streams and wait for both
    /// listeners to finish
    pub async fn shutdown(self) -> BundleResult<()> {
        self.shutdown.cancel();

        let mut first_error = None;
        for (context, listener) in self.listeners {
            let result = match listener.await {
                Ok(served) => served.map_err(|e| {
                    BundleError::server(format!("{} listener failed: {}", context, e))
                }),
                Err(e) => Err(BundleError::server(format!(
                    "{} listener task failed: {}",
                    context, e
                ))),
            };
            if let Err(e) = result {
                tracing::error!(context = %context, "{}", e);
                first_error.get_or_insert(e);
            }
        }

        tracing::info!(application = self.environment.name(), "application stopped");
        first_error.map_or(Ok(()), Err)
    }
}

async fn bind_listener(context: ContextKind, addr: SocketAddr) -> BundleResult<TcpListener> {
    TcpListener::bind(addr).await.map_err(|e| {
        BundleError::server(format!("failed to bind {} listener on {}: {}", context, addr, e))
    })
}

fn spawn_server(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> JoinHandle<std::io::Result<()>> {
    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
    })
}
