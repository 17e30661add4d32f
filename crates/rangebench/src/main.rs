//! rangebench: randomized comparison of range-count query strategies.

use rangebench_lib::{app, config, errors};

fn main() {
    let config = match config::AppConfig::try_parse_args() {
        Ok(config) => config,
        Err(e) => {
            // Help and version go to stdout and are not failures.
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let level = if config.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = app::run(&config) {
        rangebench_cli::ui::print_error(&format!("{e:#}"));
        std::process::exit(errors::exit_code(&e));
    }
}
