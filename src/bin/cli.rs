// CLI binary: panicking on unrecoverable errors is standard for CLI tools.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::unreachable, clippy::indexing_slicing)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use live_console::demo::DemoWorld;
use live_console::paths;
use live_console::settings::{self, ConsoleSettings};
use live_console::Console;

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "live-console", about = "Developer console over a demo world", version)]
struct Cli {
    /// Directory holding console.json
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Run this line and exit (repeatable, runs in order)
    #[arg(long = "exec", value_name = "LINE")]
    exec: Vec<String>,

    /// Print the listed command catalog as JSON and exit
    #[arg(long)]
    json_catalog: bool,
}

// ── Output ───────────────────────────────────────────────────────

fn print_line(text: &str, echo: bool) {
    if echo {
        println!("{text}");
    } else {
        println!("  {text}");
    }
}

// ── REPL ─────────────────────────────────────────────────────────

fn run_repl(console: &mut Console) {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush().unwrap();
        line.clear();
        let read = input.read_line(&mut line).unwrap_or_else(|e| {
            eprintln!("Error: failed to read stdin: {e}");
            process::exit(1);
        });
        if read == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }
        console.submit(trimmed, &mut print_line);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config_dir = cli
        .config_dir
        .unwrap_or_else(|| PathBuf::from(paths::CONFIG_DIR));
    let mut loaded: ConsoleSettings = settings::load_settings(&config_dir).unwrap_or_default();

    let world = DemoWorld::new();

    if cli.json_catalog {
        let console = world.console(loaded);
        let json = console.catalog().read().to_json();
        println!("{}", serde_json::to_string_pretty(&json).unwrap());
        return;
    }

    if !cli.exec.is_empty() {
        let mut console = world.console(loaded);
        for line in &cli.exec {
            console.submit(line, &mut print_line);
        }
        return;
    }

    // The terminal already shows what was typed.
    loaded.echo_input = false;
    let mut console = world.console(loaded);
    console.set_open(true);
    run_repl(&mut console);
}
