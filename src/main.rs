use loopserve::config::Config;
use loopserve::{logger, server, AssetStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| loopserve::config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;

    logger::init(&cfg.logging).map_err(loopserve::Error::Logger)?;

    // One co-located client; a small current-thread runtime is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let settings = server::ServerSettings::from_config(&cfg)?;
    let store = AssetStore::new(&cfg.assets.dist_dir);
    if let Some(bundle_dir) = &cfg.assets.bundle_dir {
        let copied = store.provision(bundle_dir, &cfg.assets.files).await?;
        if copied > 0 {
            logger::log_info(&format!("Provisioned {copied} asset(s) from {}", bundle_dir.display()));
        }
    }

    let handle = server::start(settings, store)?;
    logger::log_server_start(handle.url(), &cfg.assets.dist_dir);

    wait_for_shutdown_signal().await;
    logger::log_info("Shutdown requested, closing listener");
    handle.shutdown().await;
    Ok(())
}

/// Resolve on SIGINT or SIGTERM (Ctrl+C only on non-unix)
#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
