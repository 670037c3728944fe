//! `flow`: command-line front end for the product definition workflow.

mod cli;
mod output;

use clap::Parser;
use cli::{Cli, Command};
use color_eyre::eyre::{Result, WrapErr};
use colored::Colorize;
use pf_core::config::loader::load_config;
use pf_core::init::{generate_product_flow_structure, InitOptions};
use pf_core::{FlowError, FlowManager, FlowResult, OpOutcome};
use pf_protocol::ipc::Op;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Map a subcommand to a protocol operation. `init` has none.
fn to_op(command: Command) -> FlowResult<Option<Op>> {
    let op = match command {
        Command::Init { .. } => return Ok(None),
        Command::Create {
            name,
            requirement,
            version_id,
            project_id,
        } => Op::CreateProcess {
            name,
            requirement,
            version_id,
            project_id,
        },
        Command::Show { id } => Op::GetProcess { process_id: id },
        Command::List => Op::ListProcesses,
        Command::Answer {
            id,
            answers,
            answered_by,
        } => Op::SubmitClarification {
            process_id: id,
            responses: answers.into_iter().collect(),
            answered_by,
        },
        Command::Judge { id } => Op::JudgeMarketResearch { process_id: id },
        Command::Research { id } => Op::RunMarketResearch { process_id: id },
        Command::SkipResearch { id } => Op::SkipMarketResearch { process_id: id },
        Command::Run { id } => Op::RunAgentStep { process_id: id },
        Command::Decide {
            id,
            decision,
            notes,
        } => Op::RecordHumanDecision {
            process_id: id,
            decision: decision.into(),
            notes,
        },
        Command::UpdateStep {
            id,
            step,
            status,
            output,
        } => Op::UpdateStep {
            process_id: id,
            step_id: step.parse().map_err(FlowError::from)?,
            status,
            output,
        },
    };
    Ok(Some(op))
}

fn print_outcome(outcome: &OpOutcome, json: bool) -> Result<()> {
    if json {
        let value = match outcome {
            OpOutcome::Process(process)
            | OpOutcome::Submission { process, .. }
            | OpOutcome::Judgment { process, .. } => serde_json::to_string_pretty(process)?,
            OpOutcome::Processes(processes) => serde_json::to_string_pretty(processes)?,
        };
        println!("{value}");
        return Ok(());
    }

    match outcome {
        OpOutcome::Process(process) => output::print_process(process),
        OpOutcome::Processes(processes) => output::print_process_list(processes),
        OpOutcome::Submission { process, outcome } => {
            output::print_submission(outcome);
            println!();
            output::print_process(process);
        }
        OpOutcome::Judgment { process, decision } => {
            output::print_judgment(*decision);
            println!();
            output::print_process(process);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::Init { force, minimal } = cli.command {
        let written = generate_product_flow_structure(InitOptions {
            target_dir: cli.root.clone(),
            force,
            minimal,
        })
        .await
        .wrap_err("failed to initialize .product-flow")?;
        println!("{}", "Initialized .product-flow".green().bold());
        for path in written {
            println!("  {}", path.dimmed());
        }
        return Ok(());
    }

    let config = load_config(&cli.root)
        .await
        .wrap_err("failed to load .product-flow configuration")?;

    let (events_tx, mut events_rx) = mpsc::channel(256);
    let show_events = !cli.json;
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if show_events {
                output::print_event(&event);
            }
        }
    });

    let manager = FlowManager::from_config(&config, &cli.root, events_tx);
    let result = match to_op(cli.command) {
        Ok(Some(op)) => manager.dispatch(op).await,
        Ok(None) => return Ok(()),
        Err(e) => Err(e),
    };

    drop(manager);
    printer.await?;

    let outcome = result?;
    print_outcome(&outcome, cli.json)
}
