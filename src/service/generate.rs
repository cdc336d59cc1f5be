use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::generator::QuestionGenerator;
use crate::structs::generate::GenerateRequest;

// 生成一组题目
pub(crate) async fn generate_questions(
    req_body: web::Json<GenerateRequest>,
    generator: web::Data<QuestionGenerator>,
) -> Result<HttpResponse, ApiError> {
    let response = generator.generate(&req_body).await?;
    log::info!(
        "为主题{}生成了{}道题，来源{:?}",
        response.metadata.topic,
        response.metadata.total_questions,
        response.metadata.source
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
    async fn template_questions_for_a_programming_topic() {
        let store = memory_store().await;
        let generator = QuestionGenerator::templates_only();
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &store, &generator))).await;

        let req = test::TestRequest::post()
            .uri("/api/generate-questions")
            .set_json(json!({
                "topic": "JavaScript basics",
                "questionCount": 5,
                "questionTypes": ["mcq"],
                "difficulty": "easy"
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let questions = body["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 5);
        assert!(questions.iter().all(|q| q["type"] == "mcq" && q["options"].as_array().unwrap().len() == 4));
        assert_eq!(body["metadata"]["source"], "Templates");
        assert_eq!(body["metadata"]["totalQuestions"], 5);
        assert_eq!(body["metadata"]["difficulty"], "easy");
    }

    #[actix_web::test]
    async fn missing_parameters_are_rejected() {
        let store = memory_store().await;
        let generator = QuestionGenerator::templates_only();
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &store, &generator))).await;

        let req = test::TestRequest::post()
            .uri("/api/generate-questions")
            .set_json(json!({"topic": "Rust", "questionCount": 3}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing required parameters");

        let req = test::TestRequest::post()
            .uri("/api/generate-questions")
            .set_json(json!({"topic": "Rust", "questionCount": 500, "questionTypes": ["mcq"]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn malformed_body_is_a_bad_request() {
        let store = memory_store().await;
        let generator = QuestionGenerator::templates_only();
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &store, &generator))).await;

        let req = test::TestRequest::post()
            .uri("/api/generate-questions")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
