use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::evaluator::summarize;
use crate::service::identity::Identity;
use crate::sql_server::SqlServerHandle;
use crate::structs::record::{ListQuery, QuizDraft};
use crate::CONFIG;

const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub(crate) struct ListParams {
    page: Option<u32>,
    limit: Option<u32>,
    topic: Option<String>,
    difficulty: Option<String>,
}

impl ListParams {
    fn into_query(self, default_limit: u32) -> ListQuery {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        ListQuery {
            page: self.page.unwrap_or(1).max(1),
            limit: self.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_LIMIT),
            topic: non_blank(self.topic),
            difficulty: non_blank(self.difficulty),
        }
    }
}

fn invalid_draft() -> ApiError {
    ApiError::BadRequest("Invalid quiz data format".to_string())
}

/// 每个结果都要对应一道题目，分数不能超过100
fn validate_draft(draft: &QuizDraft) -> Result<(), ApiError> {
    if draft.results.is_empty() || draft.question_details.is_empty() {
        return Err(invalid_draft());
    }
    let detail_count = draft.question_details.len();
    if draft
        .results
        .iter()
        .any(|result| result.question_index >= detail_count || result.score > 100)
    {
        return Err(invalid_draft());
    }
    Ok(())
}

// 校验id格式
fn quiz_id(raw: &str) -> Result<String, ApiError> {
    uuid::Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| ApiError::BadRequest("Invalid quiz ID".to_string()))
}

pub(crate) async fn save_quiz(
    identity: Identity,
    req_body: web::Json<QuizDraft>,
    sql_server: web::Data<SqlServerHandle>,
) -> Result<HttpResponse, ApiError> {
    let mut draft = req_body.into_inner();
    validate_draft(&draft)?;
    // 汇总以服务端重新计算的为准
    draft.summary = summarize(&draft.results).ok_or_else(invalid_draft)?;
    let saved = sql_server.save(identity.into_inner(), draft).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Quiz saved successfully",
        "quizId": saved.quiz_id,
        "createdAt": saved.created_at,
    })))
}

pub(crate) async fn list_quizzes(
    identity: Identity,
    params: web::Query<ListParams>,
    sql_server: web::Data<SqlServerHandle>,
) -> Result<HttpResponse, ApiError> {
    let owner = identity.into_inner();
    let query = params.into_inner().into_query(CONFIG.quiz.default_page_limit);
    let page = sql_server.list(owner.clone(), query).await?;
    let statistics = sql_server.statistics(owner).await?;
    Ok(HttpResponse::Ok().json(json!({
        "quizzes": page.quizzes,
        "pagination": page.pagination,
        "statistics": statistics,
    })))
}

pub(crate) async fn get_quiz(
    identity: Identity,
    path: web::Path<String>,
    sql_server: web::Data<SqlServerHandle>,
) -> Result<HttpResponse, ApiError> {
    let id = quiz_id(&path)?;
    let quiz = sql_server.get(identity.into_inner(), id).await?;
    Ok(HttpResponse::Ok().json(json!({ "quiz": quiz })))
}

pub(crate) async fn delete_quiz(
    identity: Identity,
    path: web::Path<String>,
    sql_server: web::Data<SqlServerHandle>,
) -> Result<HttpResponse, ApiError> {
    let id = quiz_id(&path)?;
    sql_server.delete(identity.into_inner(), id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Quiz deleted successfully" })))
}
