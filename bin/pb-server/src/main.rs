//! Policy Bridge Server
//!
//! Serves the pre-login migration connector for the B2C custom policy,
//! Auth0 and Graph user management, the external profile proxy and the
//! canned policy error payloads.
//!
//! ## Configuration
//!
//! Read from `POLICY_BRIDGE_CONFIG` or the first of `config.toml`,
//! `policy-bridge.toml`, `./config/config.toml`,
//! `/etc/policy-bridge/config.toml`. `POLICY_BRIDGE_*` environment variables
//! override file values. Run with `--example-config` to print every key.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `POLICY_BRIDGE_HTTP_PORT` | `8080` | HTTP API port |
//! | `POLICY_BRIDGE_DEV_MODE` | `false` | Permissive CORS |
//! | `LOG_FORMAT` | `text` | `json` for JSON lines |
//! | `RUST_LOG` | `info` | Log level |

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use utoipa_swagger_ui::SwaggerUi;

use pb_config::{AppConfig, ConfigLoader, HttpConfig};
use pb_platform::{build_router, AppServices};

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--example-config") {
        print!("{}", AppConfig::example_toml());
        return Ok(());
    }

    pb_common::logging::init_logging("pb-server");

    info!("Starting Policy Bridge Server");

    let config = ConfigLoader::new().load().context("loading configuration")?;

    let services = AppServices::from_config(&config).context("building HTTP clients")?;
    if !services.auth0.is_configured() {
        warn!("Auth0 is not configured; migration and legacy endpoints will fail");
    }
    if !services.graph.is_configured() {
        warn!("Graph is not configured; migration and directory endpoints will fail");
    }
    if services.test_login.is_some() {
        warn!("Test credential endpoints are enabled");
    }

    let health = services.health.clone();
    let (router, openapi) = build_router(services);

    let app = router
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http, config.dev_mode));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("API server listening on http://{}", addr);

    health.set_ready();
    info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Policy Bridge Server shutdown complete");
    Ok(())
}

fn cors_layer(http: &HttpConfig, dev_mode: bool) -> CorsLayer {
    if dev_mode {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = http
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received...");
}
