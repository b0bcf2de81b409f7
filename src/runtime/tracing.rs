/// Initializes the tracing/logging infrastructure for the application.
///
/// Installs a compact `fmt` subscriber filtered by the `RUST_LOG` environment
/// variable:
/// - `RUST_LOG=info` - created, updated, destroyed and linked resources
/// - `RUST_LOG=ad_resource=debug` - every outgoing request (secrets filtered)
///   and every ignored attribute
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// let client = Platform::Facebook.connect(&load_config("ad-resource.toml")?, transport)?;
/// ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_target(false)
        .init();
}

/// Like [`setup_tracing`] but safe to call more than once; later calls are
/// no-ops. Meant for tests.
pub fn try_setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_target(false)
        .with_test_writer()
        .try_init();
}
