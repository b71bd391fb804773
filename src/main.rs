use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use fleet::input::DEFAULT_MAX_SCRIPT_DEPTH;
use fleet::logging::{log_filter, log_subscriber};
use fleet::{Config, FleetError, Interpreter};

#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "Manage a fleet of vehicles stored in a CSV file", long_about = None)]
struct Args {
    /// Fleet file to load at startup and write on `save`.
    #[arg(short, long, env = "FILENAME")]
    file: Option<PathBuf>,

    /// Run the commands in this script instead of reading the console.
    #[arg(long)]
    script: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_MAX_SCRIPT_DEPTH)]
    max_script_depth: usize,
}

fn main() -> ExitCode {
    setup_tracing();
    let args = Args::parse();

    let data_file = match args.file {
        Some(file) => file,
        None => match ask_for_data_file() {
            Ok(file) => file,
            Err(e) => {
                eprintln!("fatal: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };
    let config = Config::new(data_file)
        .with_script(args.script)
        .with_max_script_depth(args.max_script_depth);
    info!(?config, "starting fleet session");

    let mut interpreter = match Interpreter::open(&config, io::stdout()) {
        Ok(interpreter) => interpreter,
        Err(e) => {
            eprintln!("fatal: {}", e);
            return ExitCode::FAILURE;
        }
    };
    print_banner(&config);

    match interpreter.run() {
        Ok(()) => ExitCode::SUCCESS,
        // already reported by the interpreter
        Err(_) => ExitCode::FAILURE,
    }
}

fn setup_tracing() {
    let subscriber = log_subscriber(log_filter(), io::stderr, io::stderr().is_terminal());
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("logging disabled: {}", e);
    }
}

fn ask_for_data_file() -> Result<PathBuf, FleetError> {
    println!("No data file given (set FILENAME or pass --file). Enter a path:");
    io::stdout().flush().map_err(|e| FleetError::io("<stdout>", e))?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .map_err(|e| FleetError::io("<stdin>", e))?;
    let path = line.trim();
    if path.is_empty() {
        return Err(FleetError::validation("data file", "no path entered"));
    }
    Ok(PathBuf::from(path))
}

fn print_banner(config: &Config) {
    if config.script.is_some() {
        return;
    }
    println!("Fleet manager, data file {}", config.data_file.display());
    println!("Type 'help' for supported commands or 'exit' to quit.\n");
}
