use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::info;

use axum::Router;
use clap::Parser;
use http::{HeaderValue, Method, header::CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use anyhow::anyhow;

use rev_voice_gateway::{ServerConfig, routes, state::AppState};

/// Rev voice gateway - real-time voice assistant relay server
#[derive(Parser, Debug)]
#[command(name = "rev-voice-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Bind host override
    #[arg(long, value_name = "HOST")]
    host: Option<String>,

    /// Bind port override
    #[arg(short = 'p', long, value_name = "PORT")]
    port: Option<u16>,

    /// Static file directory override
    #[arg(long = "static-dir", value_name = "DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Initialize crypto provider for the upstream TLS connection
    // This must be done before any TLS connections are attempted
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    // Parse CLI arguments
    let cli = Cli::parse();

    let mut config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(dir) = cli.static_dir {
        config.static_dir = Some(dir);
    }

    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; upstream sessions will fail their handshake");
    }

    let address = config.address();
    let cors_origins = config.cors_allowed_origins.clone();
    let static_dir = config.static_dir.clone();
    let model = config.gemini_model.clone();

    // Create application state
    let app_state = AppState::new(config);

    let cors_layer = build_cors_layer(cors_origins.as_deref());

    // Security headers
    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    // Combine routes: HTTP API + relay WebSocket, with static hosting as the
    // fallback when a directory is configured
    let app = routes::api::create_api_router()
        .merge(routes::relay::create_relay_router())
        .with_state(app_state);

    let app: Router = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    let app = app.layer(cors_layer).layer(security_headers);

    // Parse socket address
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    info!(model = %model, "starting Rev voice gateway");
    println!("Server listening on http://{socket_addr}");
    println!("Health check: http://{socket_addr}/health");

    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Build the CORS layer from configuration.
///
/// `*` allows any origin, a comma-separated list allows those origins, and
/// no configuration leaves the browser's same-origin policy in charge.
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]),
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
        }
        None => {
            info!(
                "CORS not configured, defaulting to same-origin only. \
                 Set CORS_ALLOWED_ORIGINS to enable cross-origin access."
            );
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
        }
    }
}
