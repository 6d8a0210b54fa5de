use optionlab::config::AppConfig;
use optionlab::feeds::market_data::run_quote_feed;
use optionlab::server;
use optionlab::state::AppState;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("optionlab starting");

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    if !cfg.has_live_market_data() {
        tracing::warn!("ALPHA_VANTAGE_API_KEY not set, serving mock quotes only");
    }

    let port = cfg.server_port;
    let app_state = AppState::new(cfg);

    // ── Spawn tasks ──

    // 1. Watched-symbol quote feed
    let feed_state = app_state.clone();
    tokio::spawn(async move {
        run_quote_feed(feed_state).await;
    });

    // 2. Axum HTTP + WS server
    let app = server::router(app_state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
