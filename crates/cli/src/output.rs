//! Terminal rendering of processes and events.

use colored::{ColoredString, Colorize};
use pf_core::engine::clarification::{active_round, SubmissionOutcome};
use pf_core::engine::pipeline::MarketResearchDecision;
use pf_core::state::process::progress_percentage;
use pf_protocol::ipc::Event;
use pf_protocol::process_models::{Process, ProcessStatus};
use pf_protocol::step_models::{StepLocation, StepStatus};

fn step_status(status: StepStatus) -> ColoredString {
    match status {
        StepStatus::Pending => "pending".dimmed(),
        StepStatus::InProgress => "in progress".yellow(),
        StepStatus::Completed => "completed".green(),
        StepStatus::Skipped => "skipped".blue(),
    }
}

fn process_status(status: ProcessStatus) -> ColoredString {
    match status {
        ProcessStatus::Pending => "pending".dimmed(),
        ProcessStatus::InProgress => "in progress".yellow(),
        ProcessStatus::Completed => "completed".green().bold(),
    }
}

pub fn print_process(process: &Process) {
    println!("{} {}", process.name.bold().cyan(), format!("({})", process.id).dimmed());
    println!(
        "  status {}  progress {}%  current step {}",
        process_status(process.status),
        progress_percentage(process),
        process.current_step.to_string().bold()
    );
    println!("  requirement: {}", process.requirement);
    println!();

    for step in process.steps.values() {
        let marker = if process.current_step == StepLocation::Step(step.id) {
            "▶".yellow().bold()
        } else {
            " ".normal()
        };
        let owner = step.agent_name.as_deref().unwrap_or("human");
        println!(
            "  {marker} {:<5} {:<28} {:<12} {} {}",
            step.id.as_str(),
            step.name,
            step_status(step.status),
            owner.dimmed(),
            if step.documents.is_empty() {
                String::new()
            } else {
                format!("[{} doc(s)]", step.documents.len())
            }
        );
    }

    if let Some(round) = active_round(process) {
        println!();
        println!("{}", format!("Clarification round {}", round.round_number).bold());
        for question in &round.questions {
            println!("  {} {}", question.id.bold().yellow(), question.category);
            for prompt in &question.prompts {
                println!("      - {prompt}");
            }
        }
        println!(
            "  {}",
            "answer with: flow answer <id> q1=\"...\" q2=\"...\"".dimmed()
        );
    }
}

pub fn print_process_list(processes: &[Process]) {
    if processes.is_empty() {
        println!("{}", "No processes".dimmed());
        return;
    }
    for process in processes {
        println!(
            "{:<28} {:<24} {:<12} {:>3}%  {}",
            process.id,
            process.name,
            process_status(process.status),
            progress_percentage(process),
            process.current_step
        );
    }
}

pub fn print_submission(outcome: &SubmissionOutcome) {
    match outcome {
        SubmissionOutcome::Completed {
            needs_market_research,
            ..
        } => {
            println!("{}", "Clarification complete".green().bold());
            if *needs_market_research {
                println!("  market research looks necessary: run `flow judge <id>`");
            }
        }
        SubmissionOutcome::Reasked {
            next_round,
            unanswered,
        } => {
            println!(
                "{} {}",
                format!("Round {next_round} opened;").yellow(),
                format!("unanswered: {}", unanswered.join(", ")).dimmed()
            );
        }
    }
}

pub fn print_judgment(decision: MarketResearchDecision) {
    match decision {
        MarketResearchDecision::Required => {
            println!("{}", "Market research required".yellow().bold());
        }
        MarketResearchDecision::NotRequired => {
            println!(
                "{} {}",
                "Market research not indicated.".green(),
                "Skip it with `flow skip-research <id>`".dimmed()
            );
        }
    }
}

pub fn print_event(event: &Event) {
    let line = match event {
        Event::ProcessCreated { process_id, name } => format!("created {process_id} ({name})"),
        Event::StepStatusUpdate {
            step_id, status, ..
        } => format!("step {step_id} -> {}", step_status(*status)),
        Event::CurrentStepChanged { current_step, .. } => {
            format!("current step is now {current_step}")
        }
        Event::DocumentCreated {
            document_id,
            step_id,
            version,
            ..
        } => format!("document {document_id} on step {step_id} ({version})"),
        Event::ClarificationRoundOpened {
            round_number,
            question_count,
            ..
        } => format!("clarification round {round_number} opened with {question_count} question(s)"),
        Event::ClarificationRoundClosed {
            round_number,
            all_answered,
            ..
        } => format!(
            "clarification round {round_number} closed{}",
            if *all_answered { "" } else { " with unanswered questions" }
        ),
        Event::ProcessStatusUpdate { .. } => return,
        Event::ProcessCompleted { process_id } => format!("{process_id} completed"),
    };
    eprintln!("{} {}", "•".cyan(), line.dimmed());
}
