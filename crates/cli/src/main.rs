// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `numerus`: the CLI front end. Parses arguments, launches jobs, and runs
//! the hidden `worker` subcommand that is what `run`/`start` actually spawn
//! in the background to drive a job to completion.

mod commands;
mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "numerus", about = "Drive a code-generation agent through a planned job")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan an objective and launch it as a background job.
    Run {
        objective: String,
        #[arg(long)]
        max_parallel: Option<usize>,
    },

    /// Same as `run`, but prompts interactively for the objective if omitted.
    Start {
        #[arg(long, short)]
        objective: Option<String>,
        #[arg(long)]
        max_parallel: Option<usize>,
    },

    /// List known jobs and their status.
    Status,

    /// Print or tail a job's stdout log.
    Logs {
        task_id: String,
        #[arg(long)]
        follow: bool,
    },

    /// Send SIGTERM to a job's worker process.
    Kill { task_id: String },

    /// Run a job to completion in the foreground. Spawned by `run`/`start`;
    /// not intended to be invoked directly by a human.
    #[command(hide = true)]
    Worker {
        job_id: String,
        #[arg(long, default_value_t = 1)]
        max_parallel: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Command::Run { objective, max_parallel } => {
            commands::launch::run(&objective, max_parallel.unwrap_or(1))
        }
        Command::Start { objective, max_parallel } => {
            let objective = match objective {
                Some(o) => o,
                None => match commands::launch::prompt_objective() {
                    Ok(o) => o,
                    Err(e) => {
                        eprintln!("error: {e}");
                        std::process::exit(1);
                    }
                },
            };
            commands::launch::run(&objective, max_parallel.unwrap_or(1))
        }
        Command::Status => commands::status::run(),
        Command::Logs { task_id, follow } => commands::logs::run(&task_id, follow),
        Command::Kill { task_id } => commands::kill::run(&task_id),
        Command::Worker { job_id, max_parallel } => commands::worker::run(&job_id, max_parallel),
    };

    std::process::exit(exit_code);
}
