//! imgbridge - An image hosting gateway backed by a Git content store.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgbridge::{
    config::Config,
    library::ImageLibrary,
    server::{create_router, RouterConfig},
    store::{ContentStore, GithubStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("imgbridge v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!(
        "  Repository: {}/{}",
        config.github_owner, config.github_repo
    );
    info!("  Contents API: {}", config.api_base);
    info!("  Content root: {}", config.content_root);
    info!("  Public base URL: {}", config.public_base_url);

    // Create the store client
    let store = GithubStore::new(
        &config.api_base,
        &config.github_owner,
        &config.github_repo,
        &config.github_token,
    );

    // Test store connectivity
    info!("");
    info!("Connecting to content store...");
    match store.list_dir(&config.content_root).await {
        Ok(entries) => {
            let folder_count = entries.iter().filter(|e| e.is_dir()).count();
            info!("  Connected successfully");
            info!("  Found {} folder(s) under {}", folder_count, config.content_root);
        }
        Err(e) => {
            error!("  Failed to reach the content store: {}", e);
            error!("");
            error!("  Please check:");
            error!("    - The access token is valid and has repository access");
            error!(
                "    - The repository {}/{} exists and contains '{}'",
                config.github_owner, config.github_repo, config.content_root
            );
            error!("    - The contents API base URL is correct");
            return ExitCode::FAILURE;
        }
    }

    // Create the image library
    let library = ImageLibrary::new(
        store,
        &config.content_root,
        &config.public_base_url,
        config.default_folders.clone(),
    );

    // Build the router
    let router_config = build_router_config(&config);
    let router = create_router(library, router_config);

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/folders", addr);
    info!("    curl http://{}/stats", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "imgbridge=debug,tower_http=debug"
    } else {
        "imgbridge=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}
