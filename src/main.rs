use std::io::{self, BufReader};
use std::process::ExitCode;

use clap::Parser as _;
use tracing::{error, info};

use latin_interpreter::{Cli, Engine, Lang, Repl};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("latin_interpreter=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let lang = if cli.english { Lang::English } else { Lang::Latin };

    if cli.wants_repl() {
        info!("starting REPL");
        let mut repl = Repl::new(lang);
        let stdin = io::stdin();
        let mut reader = BufReader::new(stdin.lock());
        let mut stdout = io::stdout();
        let mut stderr = io::stderr();
        if repl.run(&mut reader, &mut stdout, &mut stderr).is_err() {
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }

    let path = cli.file.expect("file mode requires a file argument");
    let source = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: could not read '{path}': {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(file = %path, "running program");
    let mut engine = Engine::new();
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    match engine.run_program(&source, &mut reader, &mut stdout, &mut stderr) {
        Ok(()) => ExitCode::SUCCESS,
        Err(engine_error) => {
            error!(line = engine_error.line, "fatal error");
            eprintln!("Error on line {}: {}", engine_error.line, engine_error.error.render(lang));
            ExitCode::FAILURE
        }
    }
}
