use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// 用户的原始作答：选择题为选项下标，其余为文本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Index(usize),
    Text(String),
}

impl AnswerValue {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            AnswerValue::Index(index) => Some(*index),
            AnswerValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            AnswerValue::Index(index) => Cow::Owned(index.to_string()),
            AnswerValue::Text(text) => Cow::Borrowed(text),
        }
    }
}

/// 单题作答记录，提交前可以被覆盖
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_index: usize,
    pub answer: AnswerValue,
    /// 秒
    pub time_spent: u64,
}
