use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 选择题固定的选项数量
pub const CHOICE_OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Objective,
    Long,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::Objective => "objective",
            QuestionType::Long => "long",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown question type: {0}")]
pub struct UnknownQuestionType(pub String);

impl FromStr for QuestionType {
    type Err = UnknownQuestionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcq" => Ok(QuestionType::Mcq),
            "objective" => Ok(QuestionType::Objective),
            "long" => Ok(QuestionType::Long),
            other => Err(UnknownQuestionType(other.to_string())),
        }
    }
}

/// 一道题目，生成后在本次作答中不再改变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Question {
    #[serde(rename = "mcq", rename_all = "camelCase")]
    Choice {
        question: String,
        options: [String; CHOICE_OPTION_COUNT],
        correct_answer: usize,
        explanation: String,
    },
    #[serde(rename = "objective", rename_all = "camelCase")]
    Short {
        question: String,
        correct_answer: String,
        explanation: String,
    },
    #[serde(rename = "long", rename_all = "camelCase")]
    Long {
        question: String,
        key_points: Vec<String>,
        sample_answer: String,
    },
}

impl Question {
    pub fn kind(&self) -> QuestionType {
        match self {
            Question::Choice { .. } => QuestionType::Mcq,
            Question::Short { .. } => QuestionType::Objective,
            Question::Long { .. } => QuestionType::Long,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            Question::Choice { question, .. }
            | Question::Short { question, .. }
            | Question::Long { question, .. } => question,
        }
    }

    /// 返回替换了题干的副本
    pub fn relabeled(&self, prompt: String) -> Question {
        let mut question = self.clone();
        match &mut question {
            Question::Choice { question, .. }
            | Question::Short { question, .. }
            | Question::Long { question, .. } => *question = prompt,
        }
        question
    }

    /// 进入会话前的结构校验
    pub fn is_valid(&self) -> bool {
        if self.prompt().trim().is_empty() {
            return false;
        }
        match self {
            Question::Choice { correct_answer, .. } => *correct_answer < CHOICE_OPTION_COUNT,
            Question::Short { .. } | Question::Long { .. } => true,
        }
    }

    /// 从外部来源的任意json中解析题目，不合格的直接丢弃
    pub fn from_value(value: Value) -> Option<Question> {
        serde_json::from_value::<Question>(value)
            .ok()
            .filter(Question::is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_wire_format_of_every_kind() {
        let choice = Question::from_value(json!({
            "type": "mcq",
            "question": "Which HTTP method is used to retrieve data?",
            "options": ["POST", "PUT", "GET", "DELETE"],
            "correctAnswer": 2,
            "explanation": "GET retrieves data."
        }))
        .unwrap();
        assert_eq!(choice.kind(), QuestionType::Mcq);

        let short = Question::from_value(json!({
            "type": "objective",
            "question": "What does HTML stand for?",
            "correctAnswer": "HyperText Markup Language",
            "explanation": "Markup."
        }))
        .unwrap();
        assert_eq!(short.kind(), QuestionType::Objective);

        let long = Question::from_value(json!({
            "type": "long",
            "question": "Explain OOP.",
            "keyPoints": ["Encapsulation", "Inheritance"],
            "sampleAnswer": "..."
        }))
        .unwrap();
        assert_eq!(long.kind(), QuestionType::Long);
    }

    #[test]
    fn rejects_choice_without_four_options_or_bad_index() {
        assert!(Question::from_value(json!({
            "type": "mcq",
            "question": "Pick one",
            "options": ["a", "b", "c"],
            "correctAnswer": 0,
            "explanation": ""
        }))
        .is_none());
        assert!(Question::from_value(json!({
            "type": "mcq",
            "question": "Pick one",
            "options": ["a", "b", "c", "d"],
            "correctAnswer": 4,
            "explanation": ""
        }))
        .is_none());
    }

    #[test]
    fn rejects_missing_explanation_and_unknown_type() {
        assert!(Question::from_value(json!({
            "type": "objective",
            "question": "What is 2 + 2?",
            "correctAnswer": "4"
        }))
        .is_none());
        assert!(Question::from_value(json!({
            "type": "essay",
            "question": "Write something"
        }))
        .is_none());
    }

    #[test]
    fn serializes_with_type_tag_and_camel_case_fields() {
        let question = Question::Short {
            question: "Who painted the Mona Lisa?".into(),
            correct_answer: "Leonardo da Vinci".into(),
            explanation: "".into(),
        };
        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(value["type"], "objective");
        assert_eq!(value["correctAnswer"], "Leonardo da Vinci");
    }

    #[test]
    fn relabel_keeps_everything_but_prompt() {
        let question = Question::Long {
            question: "Explain OOP.".into(),
            key_points: vec!["Abstraction".into()],
            sample_answer: "sample".into(),
        };
        let relabeled = question.relabeled("[Adapted for Rust] Explain OOP.".into());
        assert_eq!(relabeled.prompt(), "[Adapted for Rust] Explain OOP.");
        assert!(matches!(relabeled, Question::Long { ref key_points, ref sample_answer, .. }
            if key_points == &["Abstraction"] && sample_answer == "sample"));
    }

    #[test]
    fn question_type_round_trips_through_str() {
        assert_eq!("long".parse::<QuestionType>().unwrap(), QuestionType::Long);
        assert!("essay".parse::<QuestionType>().is_err());
        assert_eq!(QuestionType::Objective.to_string(), "objective");
    }
}
