//! # Scaffold Server
//!
//! Web API host built on `Axum`: feature modules, a problem-details error
//! pipeline and a per-request `OpenAPI` document.
//!
//! ## Example
//! ```no_run
//! use scaffold_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(8080)
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use scaffold::domain::config::ApiConfig;
use scaffold::domain::environment::HostEnvironment;
use scaffold::kernel::config::ConfigView;
use scaffold::kernel::prelude::{ApiState, ModuleContext};
use scaffold::kernel::server::registry::ModuleRegistry;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
    view: ConfigView,
    environment: HostEnvironment,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Provenance of every configuration key, served redacted by `/info/config`.
    pub fn config_view(mut self, view: ConfigView) -> Self {
        self.view = view;
        self
    }

    pub fn environment(mut self, environment: HostEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Registers every enabled feature module
    /// 2. Constructs application state from the registered services
    /// 3. Builds the Axum router with module endpoints and the request pipeline
    ///
    /// # Errors
    /// Returns an error if a module name is registered twice or a module
    /// rejects the configuration (e.g. invalid identity URLs).
    pub fn build(self) -> Result<Server> {
        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, environment = %self.environment.name, "Initializing server");

        let mut context = ModuleContext::new(self.cfg.clone(), self.environment.clone());
        let modules = ModuleRegistry::from_modules(scaffold::modules())
            .and_then(|registry| registry.register(&mut context))
            .context("Feature module registration failed")?;

        let state = ApiState::builder()
            .config(self.cfg)
            .config_view(self.view)
            .environment(self.environment)
            .modules(modules.infos())
            .services(context.into_services())
            .build()
            .context("Failed to finalize API state")?;

        let router = router::init(state.clone(), &modules);
        Ok(Server { state, router })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
    router: Router,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address.
    pub async fn run(self) -> Result<()> {
        let server = &self.state.config.server;
        let address = SocketAddr::new(server.address, server.port);

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        info!("Starting HTTP server on http://{address}");
        axum_server::bind(address)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await
            .context("HTTP server failed")?;

        info!("Server shutdown complete");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// The fully layered application router.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res?,
        res = terminate => res?,
    }

    Ok(())
}
