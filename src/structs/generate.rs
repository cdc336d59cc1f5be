use serde::{Deserialize, Serialize};

use crate::structs::question::Question;

fn default_difficulty() -> String {
    "medium".to_string()
}

// 出题请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    // 缺省字段按空值处理，交给出题前的参数校验
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub question_count: u32,
    #[serde(default)]
    pub question_types: Vec<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionSource {
    #[serde(rename = "AI")]
    Ai,
    Templates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub topic: String,
    pub difficulty: String,
    pub question_types: Vec<String>,
    pub total_questions: usize,
    pub source: QuestionSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub questions: Vec<Question>,
    pub metadata: GenerationMetadata,
}
