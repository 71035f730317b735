//! Application state shared across handlers.

use parking_lot::Mutex;

use crate::config::IdentitySettings;
use crate::engine::Engine;

/// Shared application state.
///
/// The engine sits behind one mutex so every handler's read-check-write on
/// the OTP and wallet ledgers runs without interleaving. Handlers never hold
/// the lock across an `.await`.
pub struct AppState {
    pub engine: Mutex<Engine>,
    pub identity: IdentitySettings,
}

impl AppState {
    pub fn new(engine: Engine, identity: IdentitySettings) -> Self {
        Self {
            engine: Mutex::new(engine),
            identity,
        }
    }
}
