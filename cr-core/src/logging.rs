use tracing_subscriber::fmt::format::FmtSpan;

// The reloader is a long-running in-cluster process, so we keep file/line info in the output to
// make it easier to track down where a failed pass came from.
pub fn setup(env_filter: &str) {
    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::NEW)
        .with_target(false)
        .with_env_filter(env_filter)
        .compact()
        .init();
}
