//! Stage prompt generation through the completion model.

use serde::Deserialize;

use crate::backend::completion::{CompletionClient, MISSING_COMPLETION_KEY_MESSAGE};
use crate::backend::types::ChatMessage;
use crate::config::schema::AppConfig;
use crate::resilience::{CallError, RetryExecutor};
use crate::stages::fallback::generic_progression;
use crate::stages::types::{validate_count, StageError, StagePrompt, StageResult};

#[derive(Debug, Deserialize)]
struct StageList {
    stages: Vec<StagePrompt>,
}

/// Produces stage prompts, falling back to a generic progression.
#[derive(Debug, Clone)]
pub struct PromptGenerator {
    client: Option<CompletionClient>,
    executor: RetryExecutor,
}

impl PromptGenerator {
    pub fn new(config: &AppConfig) -> Self {
        let client = match CompletionClient::new(&config.completion) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::info!(error = %e, "Completion model disabled; stages use generic progression");
                None
            }
        };
        Self {
            client,
            executor: RetryExecutor::new("prompts", config.policies.prompts.clone()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Ask the completion model for `count` stages.
    pub async fn generate(&self, user_prompt: &str, count: u32) -> StageResult<Vec<StagePrompt>> {
        let count = validate_count(count)?;
        let client = self
            .client
            .clone()
            .ok_or_else(|| CallError::authentication(MISSING_COMPLETION_KEY_MESSAGE))?;

        let messages = vec![
            ChatMessage::system(system_prompt(user_prompt, count)),
            ChatMessage::user(format!("Create {count} stages for: \"{user_prompt}\"")),
        ];

        let content = self
            .executor
            .execute(move || {
                let client = client.clone();
                let messages = messages.clone();
                async move { client.complete(messages).await }
            })
            .await?;

        let stages = parse_stages(&content)?;
        tracing::info!(requested = count, generated = stages.len(), "Generated stage prompts");
        Ok(stages)
    }

    /// Like [`generate`](Self::generate), but never fails for a valid count.
    pub async fn generate_or_fallback(
        &self,
        user_prompt: &str,
        count: u32,
    ) -> StageResult<Vec<StagePrompt>> {
        let count = validate_count(count)?;
        match self.generate(user_prompt, count).await {
            Ok(stages) => Ok(stages),
            Err(e) => {
                tracing::warn!(error = %e, "Stage prompt generation failed; using generic progression");
                Ok(generic_progression(user_prompt, count))
            }
        }
    }
}

pub fn system_prompt(user_prompt: &str, count: u32) -> String {
    format!(
        r#"You write image editing prompts for an AI image model.

Turn the user's progression request into {count} stages that move clearly from one to the next.
User request: "{user_prompt}"

For each stage give a short name (2-3 words) and a detailed, visual editing prompt
(appearance, style, setting, lighting). Every stage must look distinctly different.

Respond with JSON only:
{{"stages": [{{"stage": "Stage Name", "prompt": "Detailed prompt", "stageNumber": 1}}]}}"#
    )
}

/// Parse the model's answer, tolerating a surrounding Markdown code fence.
pub fn parse_stages(content: &str) -> StageResult<Vec<StagePrompt>> {
    let body = strip_code_fence(content);
    let list: StageList =
        serde_json::from_str(body).map_err(|e| StageError::InvalidResponse(e.to_string()))?;

    if list.stages.is_empty() {
        return Err(StageError::InvalidResponse("no stages returned".to_string()));
    }

    let mut stages = list.stages;
    stages.sort_by_key(|s| s.stage_number);
    Ok(stages)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
