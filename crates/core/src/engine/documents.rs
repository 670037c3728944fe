//! Document registry.
//!
//! Creates documents with fresh ids and versions, and tracks their
//! completion. Every document lives twice: in its owning step's list and in
//! the process-level flattened list. Both copies are kept identical.

use crate::engine::error::{FlowError, FlowResult};
use crate::engine::FlowContext;
use pf_protocol::document_models::{
    ClarificationQuestion, Document, DocumentContent, DocumentDraft, DocumentStatus,
};
use pf_protocol::ipc::Event;
use pf_protocol::process_models::Process;
use pf_protocol::step_models::StepId;

/// Create a document owned by `owner` and append it to the step and process lists.
pub fn create_document(
    process: &mut Process,
    ctx: &mut FlowContext<'_>,
    owner: StepId,
    draft: DocumentDraft,
    status: DocumentStatus,
) -> FlowResult<Document> {
    let now = ctx.clock.now();
    let ordinal = process.documents.len() + 1;
    let document = Document {
        id: format!("doc_{}_{}", draft.doc_type.slug(), ctx.ids.next_id()),
        doc_type: draft.doc_type,
        step_id: owner,
        version: format!("v{}-{}", now.timestamp_millis(), ordinal),
        created_at: now,
        content: draft.content,
        status,
    };

    let step = process
        .step_mut(owner)
        .ok_or_else(|| FlowError::UnknownStep(owner.to_string()))?;
    step.documents.push(document.clone());
    process.documents.push(document.clone());

    tracing::debug!(
        process_id = %process.id,
        document_id = %document.id,
        version = %document.version,
        "document created"
    );
    ctx.emit(Event::DocumentCreated {
        process_id: process.id.clone(),
        step_id: owner,
        document_id: document.id.clone(),
        doc_type: document.doc_type,
        version: document.version.clone(),
    });

    Ok(document)
}

/// Mark a document completed.
pub fn mark_completed(process: &mut Process, document_id: &str) -> FlowResult<()> {
    update_copies(process, document_id, |doc| {
        doc.status = DocumentStatus::Completed;
    })
}

/// Record answers on the questions embedded in a clarification question document.
///
/// This is the only content mutation the registry allows.
pub fn record_answers(
    process: &mut Process,
    document_id: &str,
    answered: &[ClarificationQuestion],
) -> FlowResult<()> {
    let is_question_doc = process
        .document(document_id)
        .map(|doc| matches!(doc.content, DocumentContent::ClarificationQuestions { .. }))
        .ok_or_else(|| FlowError::document_not_found(document_id))?;
    if !is_question_doc {
        return Err(FlowError::ValidationFailed(format!(
            "document {document_id} does not hold clarification questions"
        )));
    }

    update_copies(process, document_id, |doc| {
        if let DocumentContent::ClarificationQuestions { questions, .. } = &mut doc.content {
            for question in questions.iter_mut() {
                if let Some(source) = answered.iter().find(|a| a.id == question.id) {
                    question.status = source.status;
                    question.answer = source.answer.clone();
                    question.answered_by = source.answered_by.clone();
                    question.answered_at = source.answered_at;
                }
            }
        }
    })
}

fn update_copies<F>(process: &mut Process, document_id: &str, mut apply: F) -> FlowResult<()>
where
    F: FnMut(&mut Document),
{
    let owner = process
        .document(document_id)
        .map(|doc| doc.step_id)
        .ok_or_else(|| FlowError::document_not_found(document_id))?;

    for doc in process.documents.iter_mut().filter(|d| d.id == document_id) {
        apply(doc);
    }
    if let Some(step) = process.step_mut(owner) {
        for doc in step.documents.iter_mut().filter(|d| d.id == document_id) {
            apply(doc);
        }
    }
    Ok(())
}
