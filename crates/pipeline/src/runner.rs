//! Runs stages strictly in order against one generation client.

use crate::context::StageContext;
use crate::stage::{StageKind, StageSpec};
use newsdesk_core::{AppError, AppResult};
use newsdesk_llm::{ChatMessage, LlmClient, LlmRequest};
use newsdesk_prompt::{build_prompt, builtin_prompt, resolve_prompt, BuiltPrompt, PromptOrigin};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a run stands. `Complete` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum PipelineState {
    Pending,
    Running(usize),
    Complete,
    Failed(usize),
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running(i) => write!(f, "running({})", i),
            Self::Complete => write!(f, "complete"),
            Self::Failed(i) => write!(f, "failed({})", i),
        }
    }
}

/// Result of one run: the final context and every state it passed through.
#[derive(Debug)]
pub struct PipelineRun {
    pub context: StageContext,
    pub history: Vec<PipelineState>,
    failure: Option<AppError>,
}

impl PipelineRun {
    pub fn state(&self) -> PipelineState {
        self.history
            .last()
            .copied()
            .unwrap_or(PipelineState::Pending)
    }

    pub fn is_complete(&self) -> bool {
        self.state() == PipelineState::Complete
    }

    pub fn failure(&self) -> Option<&AppError> {
        self.failure.as_ref()
    }

    /// The final context, or the error that stopped the run.
    pub fn finish(self) -> AppResult<StageContext> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.context),
        }
    }
}

/// An ordered list of stages bound to a generation client.
pub struct Pipeline {
    stages: Vec<StageSpec>,
    client: Arc<dyn LlmClient>,
    model: String,
    temperature: f32,
    prompts_dir: Option<PathBuf>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages)
            .field("provider", &self.client.provider_name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Pipeline {
    /// Build a pipeline, rejecting wiring that reads itself or a later stage.
    pub fn new(stages: Vec<StageSpec>, client: Arc<dyn LlmClient>) -> AppResult<Self> {
        validate_wiring(&stages)?;
        Ok(Self {
            stages,
            client,
            model: String::new(),
            temperature: 0.0,
            prompts_dir: None,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Directory searched for `<stage>.yml` prompt overrides.
    pub fn with_prompts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompts_dir = Some(dir.into());
        self
    }

    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Run every stage in order. Stops at the first failing stage; no retries.
    pub async fn run(&self, mut context: StageContext) -> PipelineRun {
        let mut history = vec![PipelineState::Pending];

        for (index, spec) in self.stages.iter().enumerate() {
            history.push(PipelineState::Running(index));
            tracing::info!(
                stage = spec.kind.as_str(),
                index,
                total = self.stages.len(),
                "Running stage"
            );

            match self.run_stage(spec, &context).await {
                Ok(output) => {
                    tracing::debug!(
                        stage = spec.kind.as_str(),
                        chars = output.len(),
                        "Stage completed"
                    );
                    context.record(spec.kind, output);
                }
                Err(err) => {
                    tracing::error!(stage = spec.kind.as_str(), "Stage failed: {}", err);
                    history.push(PipelineState::Failed(index));
                    return PipelineRun {
                        context,
                        history,
                        failure: Some(err),
                    };
                }
            }
        }

        history.push(PipelineState::Complete);
        tracing::info!(stages = self.stages.len(), "Pipeline complete");

        PipelineRun {
            context,
            history,
            failure: None,
        }
    }

    async fn run_stage(&self, spec: &StageSpec, context: &StageContext) -> AppResult<String> {
        let prompt = self.build_stage_prompt(spec.kind, context)?;
        let request = self.stage_request(spec, context, prompt);

        let response = self
            .client
            .complete(&request)
            .await
            .map_err(|e| AppError::StageFailed {
                stage: spec.kind.as_str().to_string(),
                message: e.to_string(),
            })?;

        Ok(response.content)
    }

    fn build_stage_prompt(
        &self,
        kind: StageKind,
        context: &StageContext,
    ) -> AppResult<BuiltPrompt> {
        let (definition, origin) = match &self.prompts_dir {
            Some(dir) => resolve_prompt(dir, kind.as_str())?,
            None => builtin_prompt(kind.as_str())
                .map(|def| (def, PromptOrigin::Builtin))
                .ok_or_else(|| {
                    AppError::Prompt(format!("No prompt defined for '{}'", kind.as_str()))
                })?,
        };

        build_prompt(&definition, origin, context.template_variables())
    }

    /// Role as system, wired upstream outputs as assistant turns, then the task.
    fn stage_request(
        &self,
        spec: &StageSpec,
        context: &StageContext,
        prompt: BuiltPrompt,
    ) -> LlmRequest {
        let mut messages: Vec<ChatMessage> = context
            .outputs()
            .iter()
            .filter(|o| spec.reads.contains(&o.stage))
            .map(|o| ChatMessage::assistant(o.content.clone()))
            .collect();
        messages.push(ChatMessage::user(prompt.user));

        LlmRequest::from_messages(messages, self.model.clone())
            .with_system(prompt.system)
            .with_temperature(self.temperature)
            .with_tag(spec.kind.display_name())
    }
}

fn validate_wiring(stages: &[StageSpec]) -> AppResult<()> {
    if stages.is_empty() {
        return Err(AppError::Pipeline("Pipeline has no stages".to_string()));
    }

    for (index, spec) in stages.iter().enumerate() {
        if stages[..index].iter().any(|s| s.kind == spec.kind) {
            return Err(AppError::Pipeline(format!(
                "Stage '{}' appears more than once",
                spec.kind
            )));
        }

        for upstream in &spec.reads {
            if *upstream == spec.kind {
                return Err(AppError::Pipeline(format!(
                    "Stage '{}' cannot read its own output",
                    spec.kind
                )));
            }
            if !stages[..index].iter().any(|s| s.kind == *upstream) {
                return Err(AppError::Pipeline(format!(
                    "Stage '{}' reads '{}', which does not run before it",
                    spec.kind, upstream
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsdesk_llm::EchoClient;

    fn client() -> Arc<dyn LlmClient> {
        Arc::new(EchoClient)
    }

    #[test]
    fn test_rejects_self_read() {
        let stages = vec![StageSpec::new(StageKind::Editor).reading([StageKind::Editor])];
        let err = Pipeline::new(stages, client()).unwrap_err();
        assert!(err.to_string().contains("its own output"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            Pipeline::new(Vec::new(), client()),
            Err(AppError::Pipeline(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_stage() {
        let stages = vec![
            StageSpec::new(StageKind::Researcher),
            StageSpec::new(StageKind::Researcher),
        ];
        assert!(Pipeline::new(stages, client()).is_err());
    }

    #[test]
    fn test_accepts_backward_reads() {
        let stages = vec![
            StageSpec::new(StageKind::Researcher),
            StageSpec::new(StageKind::FactChecker).reading([StageKind::Researcher]),
        ];
        let pipeline = Pipeline::new(stages, client()).unwrap();
        assert_eq!(pipeline.stages().len(), 2);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::Failed(2).to_string(), "failed(2)");
        assert_eq!(PipelineState::Complete.to_string(), "complete");
    }
}
