//! Structured logging using **tracing**.
//!
//! Reports go to stdout; everything logged here goes to stderr as JSON so the
//! two streams never mix.

/// Initializes the global tracing subscriber.
///
/// Call *once* at the beginning of the application's runtime.
/// Later calls are ignored instead of panicking.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=bundlecov_core=debug`)
pub fn init_structured_logging() {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
