use eurofx::orchestration::{MarketBoard, Refresher, SimulationService};
use eurofx::{
    api, config::Config, CsvQuoteProvider, InstrumentCatalog, LiveQuoteProvider, ProviderKind,
    QuoteProvider, SyntheticQuoteProvider,
};
use std::net::SocketAddr;
use std::sync::Arc;

fn build_provider(kind: &ProviderKind) -> Arc<dyn QuoteProvider> {
    match kind {
        ProviderKind::Synthetic { seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            tracing::info!("Using synthetic quotes (seed {})", seed);
            Arc::new(SyntheticQuoteProvider::new(seed))
        }
        ProviderKind::Live { api_url } => {
            tracing::info!("Using live quotes from {}", api_url);
            Arc::new(LiveQuoteProvider::new(api_url.clone()))
        }
        ProviderKind::Csv { dir } => {
            tracing::info!("Using quote history files in {}", dir.display());
            Arc::new(CsvQuoteProvider::new(dir.clone()))
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let catalog = Arc::new(InstrumentCatalog::standard());
    let provider = build_provider(&config.provider);
    let board = MarketBoard::new();
    let refresher = Arc::new(Refresher::new(
        provider,
        catalog.clone(),
        board.clone(),
        config.history_days,
    ));

    // A failed first load is not fatal: the dashboard reports it and the user
    // can trigger a manual refresh.
    if let Err(e) = refresher.refresh_all().await {
        tracing::error!("Initial market data load failed: {}", e);
    }
    let _periodic = refresher.clone().spawn_periodic(config.refresh_interval);

    let simulator = SimulationService::new(catalog.clone(), board, config.limits.clone());
    let app = api::create_router(api::AppState::new(catalog, refresher, simulator));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
