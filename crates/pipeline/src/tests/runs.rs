//! Full pipeline runs against scripted and offline clients.

use crate::artifacts::{save_artifacts, BRIEF_FILE, POST_FILE};
use crate::context::StageContext;
use crate::preset::Preset;
use crate::runner::{Pipeline, PipelineState};
use crate::stage::{StageKind, StageSpec};
use chrono::NaiveDate;
use newsdesk_core::AppError;
use newsdesk_llm::{ChatRole, EchoClient, LlmClient, ScriptedClient};
use std::sync::Arc;
use tempfile::TempDir;

const RESEARCH_REPLIES: [&str; 4] = [
    "- Rust adoption grew (Source: survey.txt)",
    "- Rust adoption grew (Source: survey.txt)\n- Unsupported claim removed",
    "Rust adoption grew last year (Source: survey.txt).\n\nKey Takeaways:\n- Adoption is up",
    r##"```json
{"markdown": "# Rust\n\nRust adoption grew last year (Source: survey.txt).\n\nKey Takeaways:\n- Adoption is up", "linkedin_post": "Rust is growing. #Rust"}
```"##,
];

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
}

fn context() -> StageContext {
    StageContext::new(
        "How fast is Rust adoption growing?",
        "Source: survey.txt\nRust adoption grew in 2023.",
        run_date(),
    )
}

fn research_pipeline(client: Arc<dyn LlmClient>) -> Pipeline {
    Pipeline::new(Preset::Research.stages(), client)
        .unwrap()
        .with_model("test-model")
}

#[tokio::test]
async fn test_research_run_is_deterministic() {
    let mut outputs = Vec::new();

    for _ in 0..2 {
        let client = Arc::new(ScriptedClient::new(RESEARCH_REPLIES));
        let run = research_pipeline(client).run(context()).await;

        assert!(run.is_complete());
        assert_eq!(
            run.history,
            vec![
                PipelineState::Pending,
                PipelineState::Running(0),
                PipelineState::Running(1),
                PipelineState::Running(2),
                PipelineState::Running(3),
                PipelineState::Complete,
            ]
        );

        let (artifacts, report) = Preset::Research.assemble(&run.finish().unwrap());
        assert!(!report.used_fallback());
        assert_eq!(artifacts.social_post, "Rust is growing. #Rust");

        let temp = TempDir::new().unwrap();
        save_artifacts(temp.path(), &artifacts).unwrap();
        outputs.push((
            std::fs::read_to_string(temp.path().join(BRIEF_FILE)).unwrap(),
            std::fs::read_to_string(temp.path().join(POST_FILE)).unwrap(),
        ));
    }

    assert_eq!(outputs[0], outputs[1]);
    assert!(outputs[0].0.contains("**Generated:** March 09, 2024"));
    assert!(outputs[0].0.contains("1. **Adoption is up**"));
}

#[tokio::test]
async fn test_upstream_outputs_arrive_as_assistant_messages() {
    let client = Arc::new(ScriptedClient::new(RESEARCH_REPLIES));
    let run = research_pipeline(client.clone()).run(context()).await;
    assert!(run.is_complete());

    let requests = client.requests();
    assert_eq!(requests.len(), 4);

    let researcher = &requests[0];
    assert_eq!(researcher.messages.len(), 1);
    assert_eq!(researcher.messages[0].role, ChatRole::User);
    assert!(researcher.last_content().contains("How fast is Rust adoption growing?"));
    assert!(researcher.last_content().contains("Rust adoption grew in 2023."));
    assert_eq!(researcher.tag.as_deref(), Some("Researcher"));

    let checker = &requests[1];
    assert_eq!(checker.messages.len(), 2);
    assert_eq!(checker.messages[0].role, ChatRole::Assistant);
    assert_eq!(checker.messages[0].content, RESEARCH_REPLIES[0]);
    assert_eq!(checker.messages[1].role, ChatRole::User);
    assert!(checker
        .system
        .as_deref()
        .unwrap()
        .contains("fact-checker"));

    let publisher = &requests[3];
    assert_eq!(publisher.messages[0].content, RESEARCH_REPLIES[2]);
    assert!(publisher.last_content().contains("Date: 2024-03-09"));

    for request in &requests {
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.model, "test-model");
    }
}

#[tokio::test]
async fn test_failing_stage_stops_the_run() {
    let client = Arc::new(ScriptedClient::new(["research notes"]));
    client.push_failure("connection refused");

    let run = research_pipeline(client.clone()).run(context()).await;

    assert_eq!(run.state(), PipelineState::Failed(1));
    assert!(!run.is_complete());
    assert_eq!(run.context.outputs().len(), 1);
    assert_eq!(client.requests().len(), 2);
    assert!(matches!(
        run.failure(),
        Some(AppError::StageFailed { stage, message })
            if stage == "fact_checker" && message.contains("connection refused")
    ));
    assert!(run.finish().is_err());
}

#[test]
fn test_forward_read_is_rejected() {
    let stages = vec![
        StageSpec::new(StageKind::Researcher),
        StageSpec::new(StageKind::Editor).reading([StageKind::Publisher]),
        StageSpec::new(StageKind::Publisher),
    ];
    let err = Pipeline::new(stages, Arc::new(EchoClient)).unwrap_err();
    assert!(matches!(err, AppError::Pipeline(msg) if msg.contains("'publisher'")));
}

#[tokio::test]
async fn test_workspace_prompt_override() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("researcher.yml"),
        "id: researcher\ntitle: Terse Researcher\nrole: You answer in one line.\n\
         template: \"Topic: {{query}}\"\n",
    )
    .unwrap();

    let client = Arc::new(ScriptedClient::new(["only line"]));
    let pipeline = Pipeline::new(vec![StageSpec::new(StageKind::Researcher)], client.clone())
        .unwrap()
        .with_prompts_dir(temp.path());
    let run = pipeline.run(context()).await;

    assert!(run.is_complete());
    let requests = client.requests();
    let request = &requests[0];
    assert_eq!(request.system.as_deref(), Some("You answer in one line."));
    assert_eq!(request.last_content(), "Topic: How fast is Rust adoption growing?");
}

#[tokio::test]
async fn test_newsroom_runs_offline() {
    let pipeline = Pipeline::new(Preset::Newsroom.stages(), Arc::new(EchoClient)).unwrap();
    let run = pipeline.run(context().with_title("Rust adoption")).await;

    assert!(run.is_complete());
    assert_eq!(run.context.outputs().len(), 5);
    assert!(run
        .context
        .output(StageKind::Planner)
        .unwrap()
        .starts_with("[Planner] draft based on:"));

    let (artifacts, report) = Preset::Newsroom.assemble(&run.context);
    assert!(artifacts.brief.starts_with("# Rust adoption\n_Date: 2024-03-09_"));
    assert!(artifacts.image_alt.is_some());
    assert!(artifacts.social_post.starts_with("📰 Rust adoption\n\n"));
    assert_eq!(report.stages.len(), 5);
}
