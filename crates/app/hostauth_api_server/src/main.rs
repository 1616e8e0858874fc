//! Host auth API server binary.
//!
//! Prints `{"port": N}` to stdout once bound so a parent process can
//! discover the port when started with `--port 0`.

use clap::Parser;
use tracing::info;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "hostauth_api_server", about = "Host auth API server")]
struct Args {
    /// Interface to bind.
    #[arg(long, env = "HOSTAUTH_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 3100)]
    port: u16,

    /// Mark the refresh cookie `Secure`. Enable when served over HTTPS.
    #[arg(long, env = "COOKIE_SECURE", default_value_t = false)]
    cookie_secure: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Write logs to stderr so stdout is reserved for the JSON port message.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,hostauth_api=debug,hostauth_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = hostauth_api::config::ApiConfig::from_env();
    config.bind_addr = format!("{}:{}", args.host, args.port);
    config.cookie_secure = args.cookie_secure;

    info!(
        bind_addr = %config.bind_addr,
        cookie_secure = config.cookie_secure,
        "starting hostauth_api_server"
    );

    let state = hostauth_api::AppState::new(config.clone())?;
    let cleanup = state.refresh_tokens.spawn_cleanup_task();
    let app = hostauth_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    println!("{}", serde_json::json!({ "port": local_addr.port() }));

    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    cleanup.abort();
    Ok(())
}
