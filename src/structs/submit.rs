use serde::{Deserialize, Serialize};

use crate::evaluator::ReferenceAnswer;
use crate::structs::answer::AnswerValue;
use crate::structs::evaluation::{EvaluationResult, QuizSummary};
use crate::structs::question::Question;

// 对于提交的答案进行解析和响应的结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub answers: Vec<AnswerSubmission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// 单题答案连同评分所需的参考字段，题型以字符串传入以便容忍未知题型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub question_index: usize,
    pub question_type: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub user_answer: Option<AnswerValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<AnswerValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_points: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_answer: Option<String>,
}

impl AnswerSubmission {
    pub fn new(question_index: usize, question: &Question, user_answer: Option<AnswerValue>) -> Self {
        let mut submission = AnswerSubmission {
            question_index,
            question_type: question.kind().to_string(),
            question: question.prompt().to_string(),
            user_answer,
            correct_answer: None,
            options: None,
            key_points: None,
            sample_answer: None,
        };
        match question {
            Question::Choice { options, correct_answer, .. } => {
                submission.correct_answer = Some(AnswerValue::Index(*correct_answer));
                submission.options = Some(options.to_vec());
            }
            Question::Short { correct_answer, .. } => {
                submission.correct_answer = Some(AnswerValue::Text(correct_answer.clone()));
            }
            Question::Long { key_points, sample_answer, .. } => {
                submission.key_points = Some(key_points.clone());
                submission.sample_answer = Some(sample_answer.clone());
            }
        }
        submission
    }

    /// 已知题型缺少参考答案时返回None
    pub fn reference(&self) -> Option<ReferenceAnswer> {
        match self.question_type.as_str() {
            "mcq" => {
                let correct = self.correct_answer.as_ref()?.as_index()?;
                Some(ReferenceAnswer::Choice {
                    correct,
                    options: self.options.clone().unwrap_or_default(),
                })
            }
            "objective" => Some(ReferenceAnswer::Short {
                expected: self.correct_answer.as_ref()?.as_text().into_owned(),
            }),
            "long" => Some(ReferenceAnswer::Long {
                key_points: self.key_points.clone().unwrap_or_default(),
            }),
            _ => Some(ReferenceAnswer::Unknown),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub results: Vec<EvaluationResult>,
    pub summary: QuizSummary,
}
