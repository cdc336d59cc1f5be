use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};

use crate::error::ApiError;
use crate::generator::QuestionGenerator;
use crate::service::{evaluate, generate, quizzes};
use crate::sql_server::SqlServerHandle;
use crate::CONFIG;

const MAX_BODY_BYTES: usize = 1 << 20;

/// 请求体格式错误统一返回400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req| ApiError::BadRequest(format!("Invalid request body: {err}")).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(format!("Invalid query parameters: {err}")).into())
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/generate-questions", web::post().to(generate::generate_questions))
            .route("/evaluate-answers", web::post().to(evaluate::evaluate_answers))
            .service(web::resource("/quizzes").route(web::get().to(quizzes::list_quizzes)))
            .service(web::resource("/quizzes/save").route(web::post().to(quizzes::save_quiz)))
            .service(
                web::resource("/quizzes/{id}")
                    .route(web::get().to(quizzes::get_quiz))
                    .route(web::delete().to(quizzes::delete_quiz)),
            ),
    );
}

/// 注册共享状态和全部路由
pub fn configure(cfg: &mut web::ServiceConfig, sql_handle: &SqlServerHandle, generator: &QuestionGenerator) {
    cfg.app_data(web::Data::new(sql_handle.clone()))
        .app_data(web::Data::new(generator.clone()))
        .app_data(json_config())
        .app_data(query_config());
    routes(cfg);
}

// 启动actix服务
pub async fn new_webserver(sql_handle: SqlServerHandle, generator: QuestionGenerator) -> std::io::Result<()> {
    let sql_handle = Arc::new(sql_handle);
    let generator = Arc::new(generator);
    let server = HttpServer::new(move || {
        let sql_handle = Arc::clone(&sql_handle);
        let generator = Arc::clone(&generator);
        App::new()
            .wrap(middleware::Logger::default())
            .configure(move |cfg| configure(cfg, &sql_handle, &generator))
    })
    .bind((CONFIG.server.host.as_str(), CONFIG.server.port))?
    .run();
    log::info!("HTTP服务启动成功，监听{}:{}", CONFIG.server.host, CONFIG.server.port);
    server.await
}
