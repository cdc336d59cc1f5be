//! 客户端答题流程：出题、作答、评分、保存

use async_trait::async_trait;
use thiserror::Error;

use crate::structs::generate::{GenerateRequest, GenerateResponse};
use crate::structs::record::{QuizDraft, SavedQuiz};
use crate::structs::submit::{EvaluateRequest, EvaluateResponse};

pub mod api;
pub mod flow;
pub mod progress;

#[derive(Debug, Error)]
pub enum ClientError {
    /// 429，可以减少题量后重试
    #[error("{0}")]
    Quota(String),
    #[error("{0}")]
    Unauthorized(String),
    /// 5xx
    #[error("{0}")]
    Unavailable(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn is_quota(&self) -> bool {
        matches!(self, ClientError::Quota(_))
    }
}

/// 答题流程依赖的服务端接口
#[async_trait]
pub trait QuizBackend: Send + Sync {
    async fn generate_questions(&self, request: &GenerateRequest) -> Result<GenerateResponse, ClientError>;

    async fn evaluate_answers(&self, request: &EvaluateRequest) -> Result<EvaluateResponse, ClientError>;

    async fn save_quiz(&self, draft: &QuizDraft) -> Result<SavedQuiz, ClientError>;
}
