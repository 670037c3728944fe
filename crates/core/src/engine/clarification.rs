//! Clarification sub-engine: the round-based question/answer loop of step 1.1.
//!
//! A round is opened with a question document waiting for the user. A
//! submission answers the open round and closes it. If every question got an
//! answer the loop ends with an analysis document; otherwise a fresh round
//! re-asks the full question set.

use crate::engine::documents;
use crate::engine::error::{FlowError, FlowResult};
use crate::engine::heuristics::KeywordRules;
use crate::engine::FlowContext;
use pf_protocol::document_models::{
    ClarificationQuestion, ClarificationRound, DocumentContent, DocumentDraft, DocumentStatus,
    DocumentType, QuestionStatus, RoundStatus,
};
use pf_protocol::ipc::Event;
use pf_protocol::process_models::Process;
use pf_protocol::step_models::{StepId, StepStatus};
use std::collections::BTreeMap;

/// Result of applying one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Every question is answered; the loop is over.
    Completed {
        analysis_document_id: String,
        needs_market_research: bool,
    },
    /// Some questions were left blank; a new round was opened.
    Reasked {
        next_round: u32,
        unanswered: Vec<String>,
    },
}

struct Category {
    id: &'static str,
    name: &'static str,
    prompts: [&'static str; 3],
    purpose: &'static str,
}

const TARGET_USERS: Category = Category {
    id: "q1",
    name: "target users and usage scenario",
    prompts: [
        "Which departments, roles or user groups will mainly use the product?",
        "What are the typical usage scenarios? Describe two or three core ones.",
        "What order of magnitude of concurrent users and usage frequency do you expect?",
    ],
    purpose: "Pin down the audience and scenarios to prioritise features and interaction design.",
};

const FEATURE_BOUNDARY: Category = Category {
    id: "q2",
    name: "core feature boundary",
    prompts: [
        "What is the core problem the product must solve?",
        "Which features are required for the MVP and which can wait for later versions?",
        "Are there features or scenarios that should explicitly be left out?",
    ],
    purpose: "Fix the feature boundary so the MVP ships quickly without scope creep.",
};

const DATA_INTEGRATION: Category = Category {
    id: "q3",
    name: "data and integration",
    prompts: [
        "What kinds of data will be processed, and at what scale?",
        "Does the product need to integrate with existing systems? If so, how?",
        "Are there special data security or privacy requirements?",
    ],
    purpose: "Understand data handling and integration needs as input to the architecture.",
};

const AI_CAPABILITY: Category = Category {
    id: "q4",
    name: "AI capability",
    prompts: [
        "What should the AI do: generate content, analyse, recommend, something else?",
        "What accuracy and response time are required?",
        "Should users be able to review and adjust the AI output?",
    ],
    purpose: "Make the AI requirements and quality bar concrete to check feasibility.",
};

const COLLABORATION: Category = Category {
    id: "q5",
    name: "collaboration mode",
    prompts: [
        "What does a typical team collaboration scenario look like?",
        "What permission model and role split is needed?",
        "How should conflicting edits and versions be handled?",
    ],
    purpose: "Design the collaboration mechanics and permission system.",
};

/// The question set for a requirement: three base categories plus the AI and
/// collaboration categories when the requirement mentions them.
pub fn generate_questions(rules: &KeywordRules, requirement: &str) -> Vec<ClarificationQuestion> {
    let mut categories = vec![&TARGET_USERS, &FEATURE_BOUNDARY, &DATA_INTEGRATION];
    if rules.mentions_ai(requirement) {
        categories.push(&AI_CAPABILITY);
    }
    if rules.mentions_collaboration(requirement) {
        categories.push(&COLLABORATION);
    }

    categories
        .into_iter()
        .map(|c| ClarificationQuestion {
            id: c.id.to_string(),
            category: c.name.to_string(),
            prompts: c.prompts.iter().map(|p| (*p).to_string()).collect(),
            purpose: c.purpose.to_string(),
            status: QuestionStatus::Pending,
            answer: None,
            answered_by: None,
            answered_at: None,
        })
        .collect()
}

pub fn rounds(process: &Process) -> &[ClarificationRound] {
    process
        .step(StepId::Clarification)
        .and_then(|s| s.clarification_rounds())
        .unwrap_or(&[])
}

/// The round currently waiting for answers, if any.
pub fn active_round(process: &Process) -> Option<&ClarificationRound> {
    rounds(process)
        .iter()
        .find(|r| r.status == RoundStatus::InProgress)
}

fn rounds_mut(process: &mut Process) -> FlowResult<&mut Vec<ClarificationRound>> {
    process
        .step_mut(StepId::Clarification)
        .and_then(|s| s.clarification_rounds_mut())
        .ok_or_else(|| {
            FlowError::invalid_transition("step 1.1 carries no clarification rounds")
        })
}

/// Open the next round and its question document. Returns the round number.
pub fn open_round(process: &mut Process, ctx: &mut FlowContext<'_>) -> FlowResult<u32> {
    if let Some(active) = active_round(process) {
        return Err(FlowError::invalid_transition(format!(
            "clarification round {} is still open",
            active.round_number
        )));
    }

    let round_number = rounds(process).last().map_or(1, |r| r.round_number + 1);
    let questions = generate_questions(ctx.rules, &process.requirement);
    let draft = DocumentDraft {
        doc_type: DocumentType::ClarificationQuestions,
        content: DocumentContent::ClarificationQuestions {
            requirement: process.requirement.clone(),
            round_number,
            questions: questions.clone(),
        },
    };
    let document = documents::create_document(
        process,
        ctx,
        StepId::Clarification,
        draft,
        DocumentStatus::WaitingUserResponse,
    )?;

    let question_count = questions.len();
    rounds_mut(process)?.push(ClarificationRound {
        round_number,
        status: RoundStatus::InProgress,
        questions,
        document_id: document.id,
        user_summary: None,
        completed_at: None,
    });

    tracing::info!(process_id = %process.id, round_number, question_count, "clarification round opened");
    ctx.emit(Event::ClarificationRoundOpened {
        process_id: process.id.clone(),
        round_number,
        question_count,
    });
    Ok(round_number)
}

/// Apply answers to the open round.
///
/// Blank answers are ignored, as are ids that are not part of the round.
/// The round is always closed; the caller decides what to do with step 1.1
/// from the returned outcome.
pub fn submit_responses(
    process: &mut Process,
    ctx: &mut FlowContext<'_>,
    responses: &BTreeMap<String, String>,
    answered_by: &str,
) -> FlowResult<SubmissionOutcome> {
    let step_status = process.step(StepId::Clarification).map(|s| s.status);
    if step_status != Some(StepStatus::InProgress) {
        return Err(FlowError::invalid_transition(
            "clarification is not in progress",
        ));
    }
    if active_round(process).is_none() {
        return Err(FlowError::invalid_transition(
            "no clarification round is open",
        ));
    }

    let now = ctx.clock.now();
    let Some(round) = rounds_mut(process)?
        .iter_mut()
        .find(|r| r.status == RoundStatus::InProgress)
    else {
        return Err(FlowError::invalid_transition("no clarification round is open"));
    };

    for question in round.questions.iter_mut() {
        match responses.get(&question.id) {
            Some(answer) if !answer.trim().is_empty() => {
                question.answer = Some(answer.clone());
                question.status = QuestionStatus::Answered;
                question.answered_by = Some(answered_by.to_string());
                question.answered_at = Some(now);
            }
            _ => {}
        }
    }
    for id in responses.keys() {
        if !round.questions.iter().any(|q| &q.id == id) {
            tracing::debug!(question_id = %id, "ignoring response for unknown question");
        }
    }

    let answered = round.questions.iter().filter(|q| q.is_answered()).count();
    let total = round.questions.len();
    let unanswered: Vec<String> = round
        .questions
        .iter()
        .filter(|q| !q.is_answered())
        .map(|q| q.id.clone())
        .collect();
    round.status = RoundStatus::Completed;
    round.completed_at = Some(now);
    round.user_summary = Some(format!("{answered} of {total} questions answered"));

    let round_number = round.round_number;
    let document_id = round.document_id.clone();
    let round_questions = round.questions.clone();

    documents::record_answers(process, &document_id, &round_questions)?;
    documents::mark_completed(process, &document_id)?;

    let all_answered = unanswered.is_empty();
    ctx.emit(Event::ClarificationRoundClosed {
        process_id: process.id.clone(),
        round_number,
        all_answered,
    });

    if !all_answered {
        tracing::info!(
            process_id = %process.id,
            round_number,
            unanswered = unanswered.len(),
            "clarification incomplete, re-asking"
        );
        let next_round = open_round(process, ctx)?;
        return Ok(SubmissionOutcome::Reasked {
            next_round,
            unanswered,
        });
    }

    let needs_market_research = ctx.rules.needs_market_research(
        &process.requirement,
        rounds_answers(process).iter().map(String::as_str),
    );
    tracing::debug!(process_id = %process.id, needs_market_research, "market research predicate evaluated");

    let answers_by_category = round_questions
        .iter()
        .filter_map(|q| q.answer.clone().map(|a| (q.category.clone(), a)))
        .collect();
    let analysis = documents::create_document(
        process,
        ctx,
        StepId::Clarification,
        DocumentDraft {
            doc_type: DocumentType::ClarificationAnalysis,
            content: DocumentContent::ClarificationAnalysis {
                original_requirement: process.requirement.clone(),
                answers_by_category,
                needs_market_research,
            },
        },
        DocumentStatus::Completed,
    )?;

    Ok(SubmissionOutcome::Completed {
        analysis_document_id: analysis.id,
        needs_market_research,
    })
}

/// Every non-blank answer across all rounds.
fn rounds_answers(process: &Process) -> Vec<String> {
    rounds(process)
        .iter()
        .flat_map(|r| r.questions.iter())
        .filter(|q| q.is_answered())
        .filter_map(|q| q.answer.clone())
        .collect()
}

/// The market research verdict recorded by the latest analysis document.
pub fn latest_market_research_verdict(process: &Process) -> Option<bool> {
    process
        .documents
        .iter()
        .rev()
        .find_map(|doc| match &doc.content {
            DocumentContent::ClarificationAnalysis {
                needs_market_research,
                ..
            } => Some(*needs_market_research),
            _ => None,
        })
}
