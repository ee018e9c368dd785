//! Tracing subscriber setup.
//!
//! The library only emits events through the `tracing` facade. Binaries
//! that want to see them call one of the initializers below once at startup.

use std::sync::Once;
use tracing::info;
use tracing_subscriber::{
	EnvFilter,
	fmt::{self, format::FmtSpan},
	layer::SubscriberExt,
	util::SubscriberInitExt,
};

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber with human readable output.
///
/// The filter is read from `RUST_LOG` and defaults to `info`.
/// Subsequent calls (of either initializer) are ignored.
pub fn init_tracing() {
	INIT.call_once(|| {
		let env_filter =
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

		let fmt_layer = fmt::layer()
			.with_span_events(FmtSpan::CLOSE)
			.with_target(true)
			.with_thread_ids(true)
			.with_thread_names(true);

		// try_init: a subscriber installed by the host application wins
		let _ = tracing_subscriber::registry()
			.with(env_filter)
			.with(fmt_layer)
			.try_init();

		info!("rs-lang tracing initialized");
	});
}

/// Initialize tracing with JSON output for structured logging.
pub fn init_tracing_json() {
	INIT.call_once(|| {
		let env_filter =
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

		let fmt_layer = fmt::layer()
			.json()
			.with_span_events(FmtSpan::CLOSE)
			.with_target(true)
			.with_thread_ids(true)
			.with_current_span(true);

		let _ = tracing_subscriber::registry()
			.with(env_filter)
			.with(fmt_layer)
			.try_init();

		info!("rs-lang tracing initialized (JSON mode)");
	});
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_init_tracing_once() {
		init_tracing();
		init_tracing();
		init_tracing_json();
	}
}
