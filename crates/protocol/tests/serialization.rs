use chrono::{TimeZone, Utc};
use pf_protocol::*;
use std::collections::BTreeMap;

fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 29, 6, 0, 0).unwrap()
}

fn sample_question(id: &str, answer: Option<&str>) -> ClarificationQuestion {
    ClarificationQuestion {
        id: id.to_string(),
        category: "target users and usage scenario".to_string(),
        prompts: vec!["Who are the main users?".to_string()],
        purpose: "Identify the audience".to_string(),
        status: if answer.is_some() {
            QuestionStatus::Answered
        } else {
            QuestionStatus::Pending
        },
        answer: answer.map(str::to_string),
        answered_by: answer.map(|_| "pm".to_string()),
        answered_at: answer.map(|_| fixed_time()),
    }
}

fn sample_process() -> Process {
    let document = Document {
        id: "doc_clarification_1".to_string(),
        doc_type: DocumentType::ClarificationQuestions,
        step_id: StepId::Clarification,
        version: "v1761717600000-1".to_string(),
        created_at: fixed_time(),
        content: DocumentContent::ClarificationQuestions {
            requirement: "Optimize login".to_string(),
            round_number: 1,
            questions: vec![sample_question("q1", Some("Mobile users"))],
        },
        status: DocumentStatus::Completed,
    };

    let steps = StepId::ALL
        .iter()
        .map(|id| {
            let extension = (*id == StepId::Clarification).then(|| StepExtension::Clarification {
                clarification_rounds: vec![ClarificationRound {
                    round_number: 1,
                    status: RoundStatus::Completed,
                    questions: vec![sample_question("q1", Some("Mobile users"))],
                    document_id: document.id.clone(),
                    user_summary: Some("1 of 1 answered".to_string()),
                    completed_at: Some(fixed_time()),
                }],
            });
            let step = Step {
                id: *id,
                name: id.name().to_string(),
                status: StepStatus::Pending,
                started_at: None,
                completed_at: None,
                input: None,
                output: None,
                agent_name: id.agent().map(str::to_string),
                documents: if *id == StepId::Clarification {
                    vec![document.clone()]
                } else {
                    Vec::new()
                },
                extension,
            };
            (*id, step)
        })
        .collect();

    Process {
        id: "process_1".to_string(),
        name: "Login UX".to_string(),
        requirement: "Optimize login".to_string(),
        version_id: "v1".to_string(),
        project_id: "p1".to_string(),
        status: ProcessStatus::InProgress,
        current_step: StepLocation::Judgment(StepId::MarketResearch),
        steps,
        documents: vec![document],
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

#[test]
fn test_process_round_trip_preserves_everything() {
    let process = sample_process();

    let json = serde_json::to_string(&process).expect("Failed to serialize Process");
    let deserialized: Process = serde_json::from_str(&json).expect("Failed to deserialize Process");

    assert_eq!(deserialized, process);
}

#[test]
fn test_process_wire_shape() {
    let json = serde_json::to_value(sample_process()).expect("Failed to serialize Process");

    assert_eq!(json["currentStep"], "1.2_judgment");
    assert_eq!(json["status"], "in_progress");
    assert_eq!(json["versionId"], "v1");
    assert!(json["steps"]["1.13"].is_object());
    assert!(json["steps"]["1.10"].is_null());
    assert_eq!(json["steps"]["1.6"]["agentName"], serde_json::Value::Null);
    assert_eq!(
        json["steps"]["1.1"]["extension"]["clarificationRounds"][0]["roundNumber"],
        1
    );
    // Only step 1.1 carries the clarification extension
    assert!(json["steps"]["1.3"].get("extension").is_none());
    assert_eq!(json["documents"][0]["type"], "clarification_questions");
    assert_eq!(json["documents"][0]["content"]["kind"], "clarification_questions");
}

#[test]
fn test_unknown_step_location_is_rejected() {
    let mut json = serde_json::to_value(sample_process()).expect("Failed to serialize Process");
    json["currentStep"] = serde_json::Value::String("1.10".to_string());

    let result: Result<Process, _> = serde_json::from_value(json);
    assert!(result.is_err());
}

#[test]
fn test_agent_serialization() {
    let agent = Agent {
        name: "demand-manager".to_string(),
        description: "Owns the requirement".to_string(),
        model: "claude-sonnet-4".to_string(),
        steps: vec![StepId::Clarification, StepId::RequirementDesign],
        system_prompt: "Be precise".to_string(),
    };

    let json = serde_json::to_value(&agent).expect("Failed to serialize Agent");
    assert_eq!(json["steps"][1], "1.3");

    let deserialized: Agent = serde_json::from_value(json).expect("Failed to deserialize Agent");
    assert_eq!(deserialized.name, agent.name);
    // system_prompt is skipped in serialization
    assert_eq!(deserialized.system_prompt, "");
}

#[test]
fn test_global_config_defaults() {
    let config: GlobalConfig = serde_json::from_str("{}").expect("Failed to deserialize GlobalConfig");
    assert_eq!(config, GlobalConfig::default());
    assert!(config.keywords.market_research.is_empty());
}

#[test]
fn test_op_enum_serialization() {
    let mut responses = BTreeMap::new();
    responses.insert("q1".to_string(), "Mobile users".to_string());

    let op = Op::SubmitClarification {
        process_id: "process_1".to_string(),
        responses,
        answered_by: None,
    };

    let json = serde_json::to_value(&op).expect("Failed to serialize Op");
    assert_eq!(json["type"], "submitClarification");
    assert_eq!(json["payload"]["responses"]["q1"], "Mobile users");

    let deserialized: Op = serde_json::from_value(json).expect("Failed to deserialize Op");
    assert!(matches!(deserialized, Op::SubmitClarification { .. }));

    let skip = Op::SkipMarketResearch {
        process_id: "process_1".to_string(),
    };
    let json = serde_json::to_value(&skip).expect("Failed to serialize Op::SkipMarketResearch");
    assert_eq!(json["type"], "skipMarketResearch");
}

#[test]
fn test_event_enum_serialization() {
    let event = Event::CurrentStepChanged {
        process_id: "process_1".to_string(),
        current_step: StepLocation::Judgment(StepId::MarketResearch),
    };

    let json = serde_json::to_value(&event).expect("Failed to serialize Event");
    assert_eq!(json["type"], "currentStepChanged");
    assert_eq!(json["payload"]["current_step"], "1.2_judgment");
    assert_eq!(event.process_id(), "process_1");
}
