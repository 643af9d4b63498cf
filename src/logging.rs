use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Output goes to stderr so it never
/// interleaves with the transcript printed on stdout.
pub fn init_tracing(component: &str) {
    let default_filter = format!("info,ayurbot_chat=debug,{component}=debug");

    let filter = std::env::var("AYURBOT_LOG")
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .try_init();
}
