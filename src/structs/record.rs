use serde::{Deserialize, Serialize};

use crate::structs::alias::{QuizId, UserId};
use crate::structs::answer::AnswerValue;
use crate::structs::evaluation::{EvaluationResult, QuizSummary};
use crate::structs::question::Question;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizMetadata {
    pub topic: String,
    pub difficulty: String,
    pub total_questions: usize,
    pub questions_answered: usize,
    /// 秒
    pub total_time_spent: u64,
    /// 秒，未设置时限时为null
    pub time_limit: Option<u64>,
    pub completed_at: String,
}

/// 题目本身加上作答与评分情况
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<AnswerValue>,
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<EvaluationResult>,
}

// 客户端提交保存的完整测验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    pub results: Vec<EvaluationResult>,
    pub summary: QuizSummary,
    pub quiz_metadata: QuizMetadata,
    pub question_details: Vec<QuestionDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub id: QuizId,
    pub user_id: UserId,
    pub results: Vec<EvaluationResult>,
    pub summary: QuizSummary,
    pub quiz_metadata: QuizMetadata,
    pub question_details: Vec<QuestionDetail>,
    pub created_at: String,
}

/// 列表视图，不含题目详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOverview {
    pub id: QuizId,
    pub user_id: UserId,
    pub results: Vec<EvaluationResult>,
    pub summary: QuizSummary,
    pub quiz_metadata: QuizMetadata,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuiz {
    pub quiz_id: QuizId,
    pub created_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_quizzes: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizPage {
    pub quizzes: Vec<QuizOverview>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStatistics {
    pub total_quizzes: u32,
    pub average_score: u32,
    pub total_questions_answered: u32,
    pub top_topics: Vec<TopicCount>,
}
