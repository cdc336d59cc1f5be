use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::{ClientError, QuizBackend};
use crate::service::identity::USER_HEADER;
use crate::structs::alias::UserId;
use crate::structs::generate::{GenerateRequest, GenerateResponse};
use crate::structs::record::{QuizDraft, SavedQuiz};
use crate::structs::submit::{EvaluateRequest, EvaluateResponse};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: Option<String>,
    user_friendly: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveReply {
    quiz_id: String,
    created_at: String,
}

/// 通过HTTP访问quizforge服务
#[derive(Debug, Clone)]
pub struct QuizApiClient {
    base_url: String,
    user_id: Option<UserId>,
    client: reqwest::Client,
}

impl QuizApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: None,
            client: reqwest::Client::new(),
        }
    }

    /// 保存记录需要登录用户
    pub fn with_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        let mut request = self.client.post(format!("{}{}", self.base_url, path)).json(body);
        if let Some(user) = &self.user_id {
            request = request.header(USER_HEADER, user);
        }
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(classify(status, body))
    }
}

// 优先使用服务端给出的userFriendly提示
fn classify(status: StatusCode, body: ErrorBody) -> ClientError {
    let ErrorBody { error, user_friendly } = body;
    match status.as_u16() {
        429 => ClientError::Quota(user_friendly.unwrap_or_else(|| {
            "Question quota exceeded. Please try again later or with fewer questions.".to_string()
        })),
        401 => ClientError::Unauthorized(
            user_friendly
                .or(error)
                .unwrap_or_else(|| "Authentication required".to_string()),
        ),
        500..=599 => ClientError::Unavailable(
            user_friendly.unwrap_or_else(|| "Service temporarily unavailable".to_string()),
        ),
        code => ClientError::Rejected {
            status: code,
            message: user_friendly
                .or(error)
                .unwrap_or_else(|| format!("Request failed with status {code}")),
        },
    }
}

#[async_trait]
impl QuizBackend for QuizApiClient {
    async fn generate_questions(&self, request: &GenerateRequest) -> Result<GenerateResponse, ClientError> {
        self.post("/api/generate-questions", request).await
    }

    async fn evaluate_answers(&self, request: &EvaluateRequest) -> Result<EvaluateResponse, ClientError> {
        self.post("/api/evaluate-answers", request).await
    }

    async fn save_quiz(&self, draft: &QuizDraft) -> Result<SavedQuiz, ClientError> {
        let reply: SaveReply = self.post("/api/quizzes/save", draft).await?;
        Ok(SavedQuiz {
            quiz_id: reply.quiz_id,
            created_at: reply.created_at,
        })
    }
}
