//! Game Binary
//!
//! Runs one game with the config named by `ROBOSET_CONFIG`, or the
//! defaults. Ctrl-C ends the game after the current round drains.

use roboset::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logfile = log("logs", &["roboset", "dealer"])?;
    let config = match std::env::var_os("ROBOSET_CONFIG") {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    log::info!("[main] logging to {}", logfile.display());
    log::info!("[main] {:?}", config);
    let oracle = Arc::new(Features::from(&config));
    let dealer = Dealer::new(config, Arc::new(Console), oracle);
    let arbiter = dealer.arbiter();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::warn!("[main] interrupted, finishing the game");
                arbiter.terminate();
            }
            Err(e) => log::error!("[main] no ctrl-c handler: {}", e),
        }
    });
    let outcome = dealer.run().await;
    log::info!("[main] scores {:?}", outcome.scores);
    log::info!("[main] winners {:?}", outcome.winners);
    Ok(())
}
