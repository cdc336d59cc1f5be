//! 出题：优先调用外部服务，失败时退回模板题库

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::categorizer::categorize;
use crate::provider::{ProviderError, QuestionProvider};
use crate::selector;
use crate::structs::generate::{GenerateRequest, GenerateResponse, GenerationMetadata, QuestionSource};
use crate::structs::question::{Question, QuestionType};

pub const MAX_QUESTION_COUNT: u32 = 100;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    InvalidRequest(String),
    /// 额度不足需要让客户端减少题量重试，不能退回模板掩盖
    #[error("provider quota exceeded: {0}")]
    Quota(String),
    #[error("no valid questions could be generated")]
    NoValidQuestions,
}

#[derive(Clone)]
pub struct QuestionGenerator {
    provider: Option<Arc<dyn QuestionProvider>>,
}

impl QuestionGenerator {
    pub fn new(provider: Option<Arc<dyn QuestionProvider>>) -> Self {
        Self { provider }
    }

    pub fn templates_only() -> Self {
        Self { provider: None }
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, GenerationError> {
        validate(request)?;
        let count = request.question_count as usize;
        let kinds: Vec<QuestionType> = request
            .question_types
            .iter()
            .filter_map(|name| match name.parse::<QuestionType>() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    log::warn!("忽略未知题型: {e}");
                    None
                }
            })
            .collect();

        let mut source = QuestionSource::Templates;
        let mut questions = Vec::new();
        if let Some(provider) = &self.provider {
            match provider.generate(&build_prompt(request)).await {
                Ok(text) => {
                    questions = parse_provider_output(&text);
                    if questions.is_empty() {
                        log::warn!("{}返回的内容中没有可用的题目，改用模板出题", provider.name());
                    } else {
                        log::info!("{}生成了{}道题", provider.name(), questions.len());
                        source = QuestionSource::Ai;
                    }
                }
                Err(ProviderError::QuotaExceeded(detail)) => return Err(GenerationError::Quota(detail)),
                Err(e) => log::warn!("调用{}出题失败，改用模板出题: {e}", provider.name()),
            }
        }

        if questions.is_empty() {
            let category = categorize(&request.topic);
            questions = selector::select(&request.topic, category, count, &kinds, &mut rand::thread_rng());
        }

        questions.retain(Question::is_valid);
        if questions.is_empty() {
            return Err(GenerationError::NoValidQuestions);
        }
        questions.truncate(count);

        Ok(GenerateResponse {
            metadata: GenerationMetadata {
                topic: request.topic.clone(),
                difficulty: request.difficulty.clone(),
                question_types: request.question_types.clone(),
                total_questions: questions.len(),
                source,
            },
            questions,
        })
    }
}

fn validate(request: &GenerateRequest) -> Result<(), GenerationError> {
    if request.topic.trim().is_empty() || request.question_types.is_empty() || request.question_count == 0 {
        return Err(GenerationError::InvalidRequest("Missing required parameters".to_string()));
    }
    if request.question_count > MAX_QUESTION_COUNT {
        return Err(GenerationError::InvalidRequest(
            "Question count must be between 1 and 100".to_string(),
        ));
    }
    Ok(())
}

pub fn build_prompt(request: &GenerateRequest) -> String {
    format!(
        "Generate {count} unique quiz questions about \"{topic}\" with difficulty level: {difficulty}.\n\
         Include a mix of: {types} questions.\n\
         Format each question as JSON objects in an array.\n\
         For MCQ: {{\"type\":\"mcq\",\"question\":\"...\",\"options\":[\"A\",\"B\",\"C\",\"D\"],\"correctAnswer\":0,\"explanation\":\"...\"}}\n\
         For Objective: {{\"type\":\"objective\",\"question\":\"...\",\"correctAnswer\":\"...\",\"explanation\":\"...\"}}\n\
         For Long: {{\"type\":\"long\",\"question\":\"...\",\"keyPoints\":[\"...\",\"...\"],\"sampleAnswer\":\"...\"}}\n\
         Return only valid JSON array.",
        count = request.question_count,
        topic = request.topic,
        difficulty = request.difficulty,
        types = request.question_types.join(", "),
    )
}

/// 取回复中最外层的`[...]`，没有则整体解析；不合格的条目直接丢弃
pub fn parse_provider_output(text: &str) -> Vec<Question> {
    let candidate = match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    };
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(items)) => items.into_iter().filter_map(Question::from_value).collect(),
        Ok(_) => Vec::new(),
        Err(e) => {
            log::debug!("解析生成内容失败: {e}");
            Vec::new()
        }
    }
}
