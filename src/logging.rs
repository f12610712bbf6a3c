//! Logger bootstrap for the binary and tests.
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// With `verbose` the crate's own modules log at debug level while
/// dependencies stay at info; otherwise everything logs at info and above.
/// `RUST_LOG` takes precedence over both.
pub fn init(verbose: bool) {
    let filter = if verbose {
        format!("{},voxsim={}", LevelFilter::Info, LevelFilter::Debug)
    } else {
        LevelFilter::Info.to_string()
    };

    let env = Env::default().default_filter_or(filter);
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();

    // A logger may already be installed when tests call `init` repeatedly.
    if builder.try_init().is_err() {
        log::debug!("logger already initialised");
    }
}
