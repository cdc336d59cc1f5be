use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::evaluator::{evaluate, summarize};
use crate::structs::submit::{EvaluateRequest, EvaluateResponse};

/// 逐题评分后汇总，各题互不影响
pub fn evaluate_request(request: &EvaluateRequest) -> Result<EvaluateResponse, ApiError> {
    let mut results = Vec::with_capacity(request.answers.len());
    for submission in &request.answers {
        let reference = submission.reference().ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Question {} is missing its correct answer",
                submission.question_index
            ))
        })?;
        results.push(evaluate(
            submission.question_index,
            &reference,
            submission.user_answer.as_ref(),
        ));
    }
    let summary = summarize(&results).ok_or_else(|| ApiError::BadRequest("No answers provided".to_string()))?;
    Ok(EvaluateResponse { results, summary })
}

// 提交答案并进行打分
pub(crate) async fn evaluate_answers(req_body: web::Json<EvaluateRequest>) -> Result<HttpResponse, ApiError> {
    let response = evaluate_request(&req_body)?;
    log::info!(
        "评分完成，主题{}，{}/{}题正确",
        req_body.topic.as_deref().unwrap_or("未知"),
        response.summary.correct_answers,
        response.summary.total_questions
    );
    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::generator::QuestionGenerator;
    use crate::sql_server::tests::memory_store;
    use crate::webserver::configure;

    #[actix_web::test]
    async fn grades_each_question_type() {
        let store = memory_store().await;
        let generator = QuestionGenerator::templates_only();
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &store, &generator))).await;

        let req = test::TestRequest::post()
            .uri("/api/evaluate-answers")
            .set_json(json!({
                "topic": "Programming",
                "answers": [
                    {
                        "questionIndex": 0,
                        "questionType": "mcq",
                        "question": "Which method adds to the end of an array?",
                        "userAnswer": 1,
                        "correctAnswer": 1,
                        "options": ["append()", "push()", "add()", "insert()"]
                    },
                    {
                        "questionIndex": 1,
                        "questionType": "objective",
                        "question": "Most popular language?",
                        "userAnswer": "python",
                        "correctAnswer": "Python"
                    },
                    {
                        "questionIndex": 2,
                        "questionType": "essay",
                        "question": "?",
                        "userAnswer": "whatever"
                    }
                ]
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["isCorrect"], true);
        assert_eq!(results[0]["score"], 100);
        assert_eq!(results[1]["score"], 100);
        assert_eq!(results[2]["isCorrect"], false);
        assert_eq!(results[2]["score"], 0);
        assert_eq!(body["summary"], json!({
            "totalQuestions": 3,
            "correctAnswers": 2,
            "averageScore": 67,
            "percentage": 67
        }));
    }

    #[actix_web::test]
    async fn empty_answers_are_rejected() {
        let store = memory_store().await;
        let generator = QuestionGenerator::templates_only();
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &store, &generator))).await;

        let req = test::TestRequest::post()
            .uri("/api/evaluate-answers")
            .set_json(json!({"answers": []}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "No answers provided");
    }

    #[actix_web::test]
    async fn choice_without_reference_is_rejected() {
        let store = memory_store().await;
        let generator = QuestionGenerator::templates_only();
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &store, &generator))).await;

        let req = test::TestRequest::post()
            .uri("/api/evaluate-answers")
            .set_json(json!({"answers": [
                {"questionIndex": 0, "questionType": "mcq", "question": "?", "userAnswer": 2}
            ]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
