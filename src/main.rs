use std::sync::Arc;

use quizforge::generator::QuestionGenerator;
use quizforge::provider::{HuggingFaceProvider, QuestionProvider};
use quizforge::sql_server::SqlServer;
use quizforge::webserver::new_webserver;
use quizforge::CONFIG;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (sql_server, sql_handle) = SqlServer::new(CONFIG.database.file.clone(), CONFIG.database.max_connections)
        .await
        .map_err(|e| {
            log::error!("读取数据库失败: {e}");
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?;
    tokio::spawn(sql_server.run());

    let provider = HuggingFaceProvider::from_config(&CONFIG.provider)
        .map(|provider| Arc::new(provider) as Arc<dyn QuestionProvider>);
    if let Some(provider) = &provider {
        log::info!("使用{}出题，失败时退回模板题库", provider.name());
    }
    let generator = QuestionGenerator::new(provider);

    new_webserver(sql_handle, generator).await
}
