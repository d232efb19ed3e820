//! provider-ci CLI entry point.

// The CLI reports errors on stderr
#![allow(clippy::print_stderr)]

use provider_ci::cli::{self, EXIT_ERROR, exit_code_for};
use provider_ci::tracing::{TracingConfig, init_tracing};

fn main() {
    let cli = cli::parse();

    if let Err(e) = init_tracing(TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
    }) {
        eprintln!("{e:?}");
        std::process::exit(EXIT_ERROR);
    }

    let stdout = std::io::stdout();
    let code = match cli::execute(&cli, &mut stdout.lock()) {
        Ok(code) => code,
        Err(err) => {
            let code = exit_code_for(&err);
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
