//! Logging initialization.
//!
//! Filter directives come from the `TRADEBOARD_LOG` environment variable and
//! fall back to `warn`, so a plain run prints only notifications and problems.
//!
//! ```bash
//! TRADEBOARD_LOG=debug tradeboard run -c desk.ini script.txt
//! TRADEBOARD_LOG=tradeboard::domain::layouts=info,warn tradeboard show -c desk.ini
//! ```

use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "TRADEBOARD_LOG";
pub const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber. A second call is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
