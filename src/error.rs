use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::generator::GenerationError;

/// 数据库actor返回的错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("记录编码错误: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("数据库文件错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("没有找到对应的记录")]
    NoSuchValue,
    #[error("数据库服务已关闭")]
    Closed,
}

/// 接口层错误，直接转换为HTTP响应
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized. Please sign in.")]
    Unauthorized,
    #[error("Quiz not found")]
    NotFound,
    #[error("Question generation quota exceeded")]
    QuotaExceeded { user_friendly: String },
    #[error("Question generation failed")]
    GenerationFailed { message: String, user_friendly: String },
    #[error("Internal server error")]
    Internal(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_friendly: Option<&'a str>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::GenerationFailed { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (message, user_friendly) = match self {
            ApiError::QuotaExceeded { user_friendly } => (None, Some(user_friendly.as_str())),
            ApiError::GenerationFailed { message, user_friendly } => {
                (Some(message.as_str()), Some(user_friendly.as_str()))
            }
            ApiError::Internal(detail) => {
                // 内部细节只写日志
                log::error!("处理请求时出现内部错误: {detail}");
                (None, None)
            }
            _ => (None, None),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            message,
            user_friendly,
        })
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NoSuchValue => ApiError::NotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::InvalidRequest(message) => ApiError::BadRequest(message),
            GenerationError::Quota(detail) => {
                log::warn!("出题服务额度不足: {detail}");
                ApiError::QuotaExceeded {
                    user_friendly: "The question service is busy right now. Try fewer questions or try again in a moment."
                        .to_string(),
                }
            }
            GenerationError::NoValidQuestions => ApiError::GenerationFailed {
                message: "No valid questions could be generated".to_string(),
                user_friendly: "Unable to generate questions for this topic. Please try a different topic or try again later."
                    .to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::{json, Value};

    async fn body_of(error: ApiError) -> (StatusCode, Value) {
        let response = error.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn internal_details_are_not_exposed() {
        let (status, body) = body_of(ApiError::Internal("disk I/O error at /var/db".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    #[actix_web::test]
    async fn generation_failure_carries_friendly_message() {
        let (status, body) = body_of(GenerationError::NoValidQuestions.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Question generation failed");
        assert_eq!(body["message"], "No valid questions could be generated");
        assert!(body["userFriendly"].as_str().unwrap().starts_with("Unable to generate"));
    }

    #[actix_web::test]
    async fn quota_maps_to_429() {
        let (status, body) = body_of(GenerationError::Quota("rate limited".into()).into()).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body.get("userFriendly").is_some());
    }

    #[test]
    fn missing_record_is_not_found() {
        let error: ApiError = StoreError::NoSuchValue.into();
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        let error: ApiError = StoreError::Closed.into();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
