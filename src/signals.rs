//! SIGINT/SIGTERM handling for graceful shutdown.
//!
//! Signal handlers must only perform async-signal-safe work. `signal_hook`'s
//! `flag::register` does exactly that: it flips an [`AtomicBool`] and
//! returns. The forced final flush happens in the main loop once `running`
//! is observed false, never inside the handler itself.

use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag::register_conditional_default;

/// Installs idempotent SIGINT/SIGTERM handlers that clear `running`.
///
/// A second SIGINT/SIGTERM simply re-clears an already-false flag, which is
/// a no-op the main loop already handles by exiting promptly.
pub fn install_shutdown_handlers(running: Arc<AtomicBool>) -> io::Result<()> {
    register_conditional_default(SIGTERM, Arc::clone(&running))?;
    register_conditional_default(SIGINT, Arc::clone(&running))?;
    log::info!("installed SIGINT/SIGTERM handlers");
    Ok(())
}
