use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub question_index: usize,
    pub is_correct: bool,
    /// 0-100
    pub score: u32,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub average_score: u32,
    pub percentage: u32,
}
