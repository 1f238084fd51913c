//! Opt-in structured logging.
//!
//! Emission is off unless `BUCKETFS_LOG` selects a level; library code logs
//! through `emit` unconditionally and this switch decides whether anything
//! reaches stderr.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes log emission from the `BUCKETFS_LOG` environment variable
/// (`off`, `debug`, `info`, `warn`, `error`). Safe to call more than once;
/// only the first call takes effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let level = std::env::var("BUCKETFS_LOG").unwrap_or_else(|_| "off".to_string());
        let min = match level.as_str() {
            "off" => return,
            "debug" => emit::Level::Debug,
            "info" => emit::Level::Info,
            "warn" => emit::Level::Warn,
            "error" => emit::Level::Error,
            other => {
                eprintln!("unknown BUCKETFS_LOG value {other:?}, using \"info\"");
                emit::Level::Info
            }
        };
        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min))
            .init();
        // Keep the emitter alive for the process lifetime.
        std::mem::forget(rt);
    });
}
