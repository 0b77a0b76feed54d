//! TestRun CLI - Command line interface for the TestRun coordinator.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use testrun_core::{ErrorKind, RunReport};

mod client;
mod error;

use client::{HttpClient, WorkerStatusView};

/// TestRun CLI - Coordinator management tool
#[derive(Parser)]
#[command(name = "testrun")]
#[command(about = "CLI for the TestRun coordinator", long_about = None)]
struct Cli {
    /// Coordinator address
    #[arg(short, long, env = "TESTRUN_ADDR", default_value = "http://127.0.0.1:8080")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a zipped project and print its test report
    Submit {
        /// Path to the zip archive
        archive: PathBuf,

        /// Print the raw JSON report
        #[arg(long)]
        json: bool,
    },

    /// Register a worker with the coordinator
    Register {
        /// Worker base URL, e.g. http://10.0.0.5:8081
        remote: String,
    },

    /// Probe and list registered workers
    Workers,

    /// Check coordinator health
    Health,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let client = HttpClient::new(&cli.addr);

    match cli.command {
        Commands::Submit { archive, json } => {
            let report = client.submit(&archive).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", format_report(&report));
            }
            if !report.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Register { remote } => {
            let workers = client.register_worker(&remote).await?;
            println!("Registered {remote}");
            print_workers(&workers);
        }
        Commands::Workers => {
            let workers = client.workers().await?;
            print_workers(&workers);
        }
        Commands::Health => {
            if !client.health().await? {
                println!("unhealthy");
                return Ok(ExitCode::FAILURE);
            }
            println!("ok");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_workers(workers: &[WorkerStatusView]) {
    println!("Workers ({}):", workers.len());
    println!("{:<32}  {:<6}  {:<25}  {}", "REMOTE", "STATUS", "CHECKED", "ERROR");
    println!("{}", "-".repeat(80));

    for worker in workers {
        println!(
            "{:<32}  {:<6}  {:<25}  {}",
            worker.remote,
            worker.status,
            worker.checked_at,
            worker.error.as_deref().unwrap_or("-")
        );
    }
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Artifact => "ARTIFACT",
        ErrorKind::Build => "BUILD",
        ErrorKind::Dispatch => "DISPATCH",
        ErrorKind::Info => "INFO",
    }
}

/// Render a report for the terminal.
fn format_report(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Run {}: {}\n", report.run_id, report.title));

    for error in &report.errors {
        out.push_str(&format!("  [{}] {}: {}\n", kind_label(error.kind), error.name, error.details));
    }

    for task in &report.tasks {
        let build = if task.passing_build { "ok" } else { "FAILED" };
        out.push_str(&format!("  Build: {build}\n"));
        if !task.passing_build && !task.build_message.is_empty() {
            for line in task.build_message.lines() {
                out.push_str(&format!("    {line}\n"));
            }
        }

        for error in &task.errors {
            out.push_str(&format!("  [{}] {}: {}\n", kind_label(error.kind), error.name, error.details));
        }

        for test in &task.tests {
            let mark = if test.passing { "PASS" } else { "FAIL" };
            out.push_str(&format!("  {mark}  {}\n", test.name));
            if let Some(diagnostic) = &test.diagnostic {
                for line in diagnostic.lines() {
                    out.push_str(&format!("        {line}\n"));
                }
            }
        }

        out.push_str(&format!("  {} passed, {} failed\n", task.passed(), task.failed()));
    }

    out
}
