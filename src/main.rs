use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::io::{IsTerminal, stdout};
use std::process::ExitCode;

use cisense::facts::CiFacts;
use cisense::resolver::{EnvSnapshot, resolve};

#[derive(Parser)]
#[command(
    name = "cisense",
    about = "CI environment awareness utilities",
    arg_required_else_help = true
)]
struct Cli {
    /// Disable color
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what cisense knows about the current build
    Info(InfoArgs),
    /// Exit 0 when running under CI (or under a PR build with --pr)
    Check(CheckArgs),
}

#[derive(Args, Clone)]
struct InfoArgs {
    /// Output JSON (stable schema)
    #[arg(long)]
    json: bool,

    /// Plain text without colors
    #[arg(long)]
    raw: bool,
}

#[derive(Args, Clone)]
struct CheckArgs {
    /// Require a pull-request build, not just CI
    #[arg(long)]
    pr: bool,

    /// Suppress output (useful in scripts)
    #[arg(short, long)]
    quiet: bool,
}

fn colorize_value(v: &str, color: bool) -> String {
    if !color {
        return v.to_string();
    }
    match v {
        "true" => v.green().to_string(),
        "false" | "none" => v.red().to_string(),
        _ => v.to_string(),
    }
}

fn render_facts(facts: &CiFacts, color: bool) -> String {
    let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "none".to_string());
    let rows = [
        ("is_ci", facts.is_ci.to_string()),
        ("provider", opt(&facts.provider)),
        ("is_pr", facts.is_pr.to_string()),
        ("pull_request", opt(&facts.pull_request)),
        ("repository", opt(&facts.repository)),
        ("commit_sha", opt(&facts.commit_sha)),
    ];
    let mut out = String::new();
    for (key, value) in rows {
        out.push_str(&format!("{}: {}\n", key, colorize_value(&value, color)));
    }
    out
}

fn main() -> Result<ExitCode, anyhow::Error> {
    env_logger::init();
    let cli = Cli::parse();
    let color = !cli.no_color && stdout().is_terminal();

    match cli.command {
        Commands::Info(args) => {
            let snapshot = EnvSnapshot::current();
            let facts = CiFacts::collect(&snapshot)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&facts)?);
            } else {
                print!("{}", render_facts(&facts, color && !args.raw));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check(args) => {
            let snapshot = EnvSnapshot::current();
            let ok = match resolve(&snapshot) {
                Some(provider) if args.pr => matches!(provider.pull_request(), Ok(Some(_))),
                Some(_) => true,
                None => false,
            };
            if !args.quiet {
                println!("{}", colorize_value(if ok { "true" } else { "false" }, color));
            }
            Ok(if ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
