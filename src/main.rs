use anyhow::Result;

fn main() -> Result<()> {
    // --debug raises the default log level; RUST_LOG always wins.
    let default_level = if std::env::args().any(|arg| arg == "--debug") {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    metalist::cli::run()
}
