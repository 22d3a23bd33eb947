//! Log macros and logger setup
//!
//! Library code only emits through the `log` facade. Binaries call [`init`]
//! once to route it to `env_logger`.

pub use log::{debug, info, trace, warn, LevelFilter};

/// Install `env_logger` at `default_level`; `RUST_LOG` overrides it
///
/// Returns false when a logger is already installed.
pub fn init(default_level: LevelFilter) -> bool {
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init()
        .is_ok()
}
