use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

const DEFAULT_DIRECTIVES: &str = "heart_deck=info";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
/// Safe to call more than once; later calls are ignored.
pub fn init() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_timer(ChronoLocal::rfc_3339())
		.with_writer(std::io::stderr)
		.try_init();
}
