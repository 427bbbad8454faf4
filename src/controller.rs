//! Wiring, signal installation, and the main loop.
//!
//! Construction order: parse args, init logger, build the event handler
//! (which performs the permission/accessibility checks itself), resolve
//! the store path and open the store, wire the flush callback, install
//! signal handlers, then loop until `running` goes false, followed by
//! one forced flush.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::error::TypeTraceError;
use crate::input::EventHandler;
use crate::paths::resolve_store_path;
use crate::signals::install_shutdown_handlers;
use crate::store::{KeystrokeStore, Store};

/// Initializes `env_logger` at `debug` or `info` level per `config.debug`,
/// honoring a more verbose `RUST_LOG` if the environment already sets one.
pub fn init_logger(config: &Config) {
    let default_level = if config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();
}

/// Runs the daemon to completion: builds every leaf, drives `tick()` until
/// a shutdown signal is observed, then performs one forced flush before
/// returning.
pub fn run(config: Config) -> Result<(), TypeTraceError> {
    let mut handler = EventHandler::new()?;

    let store_path = resolve_store_path()?;
    let store = Store::open(&store_path)?;

    // Single-threaded and cooperative: the store is owned outright by the
    // flush callback, no locking needed.
    handler.set_flush_callback(move |batch| {
        store
            .write_batch(batch)
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
    });

    let running = Arc::new(AtomicBool::new(true));
    install_shutdown_handlers(Arc::clone(&running))
        .map_err(|e| TypeTraceError::System(format!("failed to install signal handlers: {e}")))?;

    log::info!("typetrace_backend started, writing to {}", store_path.display());

    while running.load(Ordering::SeqCst) {
        if let Err(e) = handler.tick() {
            log::error!("input tick failed: {e}");
        }
    }

    log::info!("shutdown signal observed, flushing and exiting");
    handler.flush();
    Ok(())
}
