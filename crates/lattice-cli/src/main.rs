//! MindMaster — command-line front end for the lattice-graph engine.
//!
//! With arguments, runs a single command and exits:
//! ```bash
//! mindmaster stats
//! ```
//! Without arguments, reads one command per line from stdin.

mod commands;
mod config;
mod ident;

use std::io::{self, BufRead, Write};

use lattice_graph::MemoryStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::{execute, CliError, Command};
use crate::config::Config;

fn main() {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with_writer(io::stderr)
        .init();

    let store = MemoryStore::with_capacity(config.capacity);
    info!(capacity = config.capacity, "lattice store ready");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let code = if args.is_empty() {
        repl(&store, &config)
    } else {
        run_line(&store, &config, &args.join(" "))
    };
    std::process::exit(code);
}

/// Run a single command line; returns the process exit code.
fn run_line(store: &MemoryStore, config: &Config, line: &str) -> i32 {
    match Command::parse(line).and_then(|cmd| execute(store, config, cmd)) {
        Ok(out) => {
            println!("{}", out.trim_end());
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

/// Interactive loop: one command per line until EOF or `quit`.
fn repl(store: &MemoryStore, config: &Config) -> i32 {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("lattice> ");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => return 0, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("error: {e}");
                return 1;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            return 0;
        }

        match Command::parse(line).and_then(|cmd| execute(store, config, cmd)) {
            Ok(out) => println!("{}", out.trim_end()),
            Err(e @ CliError::Usage(_)) => println!("{e}"),
            Err(e) => eprintln!("error: {e}"),
        }
    }
}
