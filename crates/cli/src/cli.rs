//! Command-line arguments for the `flow` binary.

use clap::{Parser, Subcommand, ValueEnum};
use pf_protocol::ipc::HumanDecision;
use pf_protocol::step_models::StepStatus;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flow", version, about = "Product definition workflow")]
pub struct Cli {
    /// Project root containing `.product-flow/`
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Print the full aggregate as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create `.product-flow/` with configuration and agent templates
    Init {
        /// Overwrite an existing `.product-flow/`
        #[arg(long)]
        force: bool,

        /// Only write config.toml
        #[arg(long)]
        minimal: bool,
    },

    /// Start a process for a requirement
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        requirement: String,

        #[arg(long, default_value = "")]
        version_id: String,

        #[arg(long, default_value = "")]
        project_id: String,
    },

    /// Show one process
    Show { id: String },

    /// List all processes
    List,

    /// Answer the open clarification round
    Answer {
        id: String,

        /// Answers as `q1=...`
        #[arg(value_name = "QUESTION=ANSWER", value_parser = parse_answer, required = true)]
        answers: Vec<(String, String)>,

        /// Who is answering
        #[arg(long = "by")]
        answered_by: Option<String>,
    },

    /// Decide whether market research is needed
    Judge { id: String },

    /// Run market research
    Research { id: String },

    /// Skip market research
    SkipResearch { id: String },

    /// Run the current step's agent
    Run { id: String },

    /// Record a decision at the current human gate
    Decide {
        id: String,

        #[arg(value_enum)]
        decision: DecisionArg,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Set a step's status without moving the current step
    UpdateStep {
        id: String,

        /// Step id such as `1.4`
        step: String,

        #[arg(value_parser = parse_status)]
        status: StepStatus,

        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DecisionArg {
    Approve,
    Revise,
}

impl From<DecisionArg> for HumanDecision {
    fn from(arg: DecisionArg) -> Self {
        match arg {
            DecisionArg::Approve => HumanDecision::Approve,
            DecisionArg::Revise => HumanDecision::Revise,
        }
    }
}

fn parse_answer(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION=ANSWER, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing question id in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_status(raw: &str) -> Result<StepStatus, String> {
    serde_json::from_value(serde_json::Value::String(raw.replace('-', "_")))
        .map_err(|_| format!("unknown status '{raw}' (pending, in_progress, completed, skipped)"))
}
