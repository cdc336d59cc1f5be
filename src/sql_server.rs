use std::path::Path;

use sqlx::{pool::Pool, sqlite::{Sqlite, SqlitePoolOptions}};
use tokio::sync::{mpsc, oneshot};

use crate::error::StoreError;
use crate::structs::alias::{QuizId, SqlFile, UserId};
use crate::structs::record::{
    ListQuery, Pagination, QuizDraft, QuizOverview, QuizPage, QuizRecord, QuizStatistics, SavedQuiz,
    TopicCount,
};
use crate::utils::now_rfc3339;

pub const IN_MEMORY: &str = ":memory:";
const TOP_TOPIC_COUNT: i64 = 5;

type Reply<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
enum Command {
    Save {
        owner: UserId,
        draft: Box<QuizDraft>,
        res_tx: Reply<SavedQuiz>,
    },
    List {
        owner: UserId,
        query: ListQuery,
        res_tx: Reply<QuizPage>,
    },
    Statistics {
        owner: UserId,
        res_tx: Reply<QuizStatistics>,
    },
    Get {
        owner: UserId,
        id: QuizId,
        res_tx: Reply<QuizRecord>,
    },
    Delete {
        owner: UserId,
        id: QuizId,
        res_tx: Reply<()>,
    },
}

pub struct SqlServer {
    // sql连接池
    pool: Pool<Sqlite>,

    /// 接收命令的管道
    cmd_rx: mpsc::UnboundedReceiver<Command>,
}

#[derive(sqlx::FromRow)]
struct OverviewRow {
    id: String,
    user_id: String,
    results: String,
    summary: String,
    metadata: String,
    created_at: String,
}

impl OverviewRow {
    fn decode(self) -> Result<QuizOverview, StoreError> {
        Ok(QuizOverview {
            id: self.id,
            user_id: self.user_id,
            results: serde_json::from_str(&self.results)?,
            summary: serde_json::from_str(&self.summary)?,
            quiz_metadata: serde_json::from_str(&self.metadata)?,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: String,
    user_id: String,
    results: String,
    summary: String,
    metadata: String,
    question_details: String,
    created_at: String,
}

impl RecordRow {
    fn decode(self) -> Result<QuizRecord, StoreError> {
        Ok(QuizRecord {
            id: self.id,
            user_id: self.user_id,
            results: serde_json::from_str(&self.results)?,
            summary: serde_json::from_str(&self.summary)?,
            quiz_metadata: serde_json::from_str(&self.metadata)?,
            question_details: serde_json::from_str(&self.question_details)?,
            created_at: self.created_at,
        })
    }
}

/// 命令执行层
impl SqlServer {
    pub async fn new(sql_file: SqlFile, max_connections: u32) -> Result<(SqlServer, SqlServerHandle), StoreError> {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let pool = if sql_file == IN_MEMORY {
            // 内存数据库每个连接各自独立，只能保留一个连接
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await?
        } else {
            // 检测数据库文件是否存在，不存在则新建
            if !Path::new(sql_file.as_str()).exists() {
                log::info!("数据库文件不存在，创建数据库文件: {}", sql_file.as_str());
                let file = std::fs::File::create(sql_file.as_str()).map_err(|e| {
                    log::error!("创建数据库文件失败: {:?}", e);
                    e
                })?;
                file.sync_all()?;
            }
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect(format!("sqlite://{}", sql_file).as_str())
                .await
                .map_err(|e| {
                    log::error!("创建SQL连接池失败: {:?}", e);
                    e
                })?
        };

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS quiz_records (
                seq              INTEGER PRIMARY KEY AUTOINCREMENT,
                id               TEXT NOT NULL UNIQUE,
                user_id          TEXT NOT NULL,
                topic            TEXT NOT NULL,
                difficulty       TEXT NOT NULL,
                total_questions  INTEGER NOT NULL,
                percentage       INTEGER NOT NULL,
                results          TEXT NOT NULL,
                summary          TEXT NOT NULL,
                metadata         TEXT NOT NULL,
                question_details TEXT NOT NULL,
                created_at       TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| {
            log::error!("执行创建表命令失败: {:?}", e);
            e
        })?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_quiz_records_owner ON quiz_records (user_id, seq)")
            .execute(&pool)
            .await?;

        Ok((SqlServer { pool, cmd_rx }, SqlServerHandle { cmd_tx }))
    }

    /// 保存一次测验，返回新记录的id
    async fn save(&mut self, owner: UserId, draft: QuizDraft) -> Result<SavedQuiz, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = now_rfc3339();
        sqlx::query(
            "INSERT INTO quiz_records
                (id, user_id, topic, difficulty, total_questions, percentage,
                 results, summary, metadata, question_details, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&owner)
        .bind(&draft.quiz_metadata.topic)
        .bind(&draft.quiz_metadata.difficulty)
        .bind(draft.summary.total_questions as i64)
        .bind(draft.summary.percentage as i64)
        .bind(serde_json::to_string(&draft.results)?)
        .bind(serde_json::to_string(&draft.summary)?)
        .bind(serde_json::to_string(&draft.quiz_metadata)?)
        .bind(serde_json::to_string(&draft.question_details)?)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        log::info!("用户{owner}保存了测验{id}");
        Ok(SavedQuiz { quiz_id: id, created_at })
    }

    /// 按时间倒序分页，主题不区分大小写的子串匹配，难度精确匹配
    async fn list(&mut self, owner: UserId, query: ListQuery) -> Result<QuizPage, StoreError> {
        let page = query.page.max(1);
        let limit = query.limit.max(1);
        let filter = "user_id = ?
            AND (? IS NULL OR instr(lower(topic), lower(?)) > 0)
            AND (? IS NULL OR difficulty = ?)";

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM quiz_records WHERE {filter}"))
            .bind(&owner)
            .bind(&query.topic)
            .bind(&query.topic)
            .bind(&query.difficulty)
            .bind(&query.difficulty)
            .fetch_one(&self.pool)
            .await?;

        let rows: Vec<OverviewRow> = sqlx::query_as(&format!(
            "SELECT id, user_id, results, summary, metadata, created_at
             FROM quiz_records WHERE {filter}
             ORDER BY seq DESC LIMIT ? OFFSET ?"
        ))
        .bind(&owner)
        .bind(&query.topic)
        .bind(&query.topic)
        .bind(&query.difficulty)
        .bind(&query.difficulty)
        .bind(limit as i64)
        .bind((page as i64 - 1) * limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let quizzes = rows.into_iter().map(OverviewRow::decode).collect::<Result<Vec<_>, _>>()?;
        let total = total as u32;
        Ok(QuizPage {
            quizzes,
            pagination: Pagination {
                current_page: page,
                total_pages: total.div_ceil(limit),
                total_quizzes: total,
                limit,
            },
        })
    }

    /// 统计该用户的全部记录，不受列表筛选条件影响
    async fn statistics(&mut self, owner: UserId) -> Result<QuizStatistics, StoreError> {
        let (total, average, answered): (i64, Option<f64>, Option<i64>) = sqlx::query_as(
            "SELECT COUNT(*), AVG(percentage), SUM(total_questions) FROM quiz_records WHERE user_id = ?",
        )
        .bind(&owner)
        .fetch_one(&self.pool)
        .await?;

        // 次数相同的主题按首次出现的先后排列
        let topics: Vec<(String, i64)> = sqlx::query_as(
            "SELECT topic, COUNT(*) AS times FROM quiz_records WHERE user_id = ?
             GROUP BY topic ORDER BY times DESC, MIN(seq) ASC LIMIT ?",
        )
        .bind(&owner)
        .bind(TOP_TOPIC_COUNT)
        .fetch_all(&self.pool)
        .await?;

        Ok(QuizStatistics {
            total_quizzes: total as u32,
            average_score: average.unwrap_or(0.0).round() as u32,
            total_questions_answered: answered.unwrap_or(0) as u32,
            top_topics: topics
                .into_iter()
                .map(|(topic, count)| TopicCount { topic, count: count as u32 })
                .collect(),
        })
    }

    /// 不属于该用户的记录与不存在的记录一样处理
    async fn get(&mut self, owner: UserId, id: QuizId) -> Result<QuizRecord, StoreError> {
        let row: Option<RecordRow> = sqlx::query_as(
            "SELECT id, user_id, results, summary, metadata, question_details, created_at
             FROM quiz_records WHERE id = ? AND user_id = ?",
        )
        .bind(&id)
        .bind(&owner)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(StoreError::NoSuchValue)?.decode()
    }

    async fn delete(&mut self, owner: UserId, id: QuizId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM quiz_records WHERE id = ? AND user_id = ?")
            .bind(&id)
            .bind(&owner)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NoSuchValue);
        }
        log::info!("用户{owner}删除了测验{id}");
        Ok(())
    }

    /// 所有handle都被丢弃后退出
    pub async fn run(mut self) {
        while let Some(cmd) = self.cmd_rx.recv().await {
            match cmd {
                Command::Save { owner, draft, res_tx } => {
                    let result = self.save(owner, *draft).await;
                    if let Err(e) = &result {
                        log::error!("保存测验记录时出错: {e}");
                    }
                    let _ = res_tx.send(result);
                }
                Command::List { owner, query, res_tx } => {
                    let result = self.list(owner, query).await;
                    let _ = res_tx.send(result);
                }
                Command::Statistics { owner, res_tx } => {
                    let result = self.statistics(owner).await;
                    let _ = res_tx.send(result);
                }
                Command::Get { owner, id, res_tx } => {
                    let result = self.get(owner, id).await;
                    let _ = res_tx.send(result);
                }
                Command::Delete { owner, id, res_tx } => {
                    let result = self.delete(owner, id).await;
                    let _ = res_tx.send(result);
                }
            }
        }
        log::info!("数据库服务已停止");
        self.pool.close().await;
    }
}

/// handler层
#[derive(Debug, Clone)]
pub struct SqlServerHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl SqlServerHandle {
    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T, StoreError> {
        let (res_tx, res_rx) = oneshot::channel();
        self.cmd_tx.send(build(res_tx)).map_err(|_| StoreError::Closed)?;
        res_rx.await.map_err(|_| StoreError::Closed)?
    }

    pub async fn save(&self, owner: UserId, draft: QuizDraft) -> Result<SavedQuiz, StoreError> {
        self.request(|res_tx| Command::Save { owner, draft: Box::new(draft), res_tx }).await
    }

    pub async fn list(&self, owner: UserId, query: ListQuery) -> Result<QuizPage, StoreError> {
        self.request(|res_tx| Command::List { owner, query, res_tx }).await
    }

    pub async fn statistics(&self, owner: UserId) -> Result<QuizStatistics, StoreError> {
        self.request(|res_tx| Command::Statistics { owner, res_tx }).await
    }

    pub async fn get(&self, owner: UserId, id: QuizId) -> Result<QuizRecord, StoreError> {
        self.request(|res_tx| Command::Get { owner, id, res_tx }).await
    }

    pub async fn delete(&self, owner: UserId, id: QuizId) -> Result<(), StoreError> {
        self.request(|res_tx| Command::Delete { owner, id, res_tx }).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::structs::evaluation::{EvaluationResult, QuizSummary};
    use crate::structs::record::{QuestionDetail, QuizMetadata};
    use crate::structs::question::Question;

    pub(crate) async fn memory_store() -> SqlServerHandle {
        let (server, handle) = SqlServer::new(IN_MEMORY.to_string(), 1).await.unwrap();
        tokio::spawn(server.run());
        handle
    }

    pub(crate) fn draft(topic: &str, difficulty: &str, percentage: u32, total_questions: usize) -> QuizDraft {
        QuizDraft {
            results: vec![EvaluationResult {
                question_index: 0,
                is_correct: percentage >= 50,
                score: percentage,
                feedback: "Correct!".to_string(),
                correct_answer: None,
            }],
            summary: QuizSummary {
                total_questions,
                correct_answers: 1,
                average_score: percentage,
                percentage,
            },
            quiz_metadata: QuizMetadata {
                topic: topic.to_string(),
                difficulty: difficulty.to_string(),
                total_questions,
                questions_answered: 1,
                total_time_spent: 42,
                time_limit: None,
                completed_at: "2024-05-01T10:00:00Z".to_string(),
            },
            question_details: vec![QuestionDetail {
                question: Question::Short {
                    question: "What does HTML stand for?".to_string(),
                    correct_answer: "HyperText Markup Language".to_string(),
                    explanation: "HTML is the markup language of the web.".to_string(),
                },
                user_answer: None,
                time_spent: 42,
                result: None,
            }],
        }
    }

    fn query(page: u32, limit: u32) -> ListQuery {
        ListQuery { page, limit, ..ListQuery::default() }
    }

    #[tokio::test]
    async fn saved_quiz_round_trips_for_its_owner() {
        let store = memory_store().await;
        let original = draft("Rust ownership", "hard", 80, 5);
        let saved = store.save("alice".into(), original.clone()).await.unwrap();

        let record = store.get("alice".into(), saved.quiz_id.clone()).await.unwrap();
        assert_eq!(record.id, saved.quiz_id);
        assert_eq!(record.created_at, saved.created_at);
        assert_eq!(record.question_details, original.question_details);
        assert_eq!(record.summary, original.summary);
    }

    #[tokio::test]
    async fn other_owners_see_not_found() {
        let store = memory_store().await;
        let saved = store.save("alice".into(), draft("Rust", "easy", 50, 2)).await.unwrap();

        let err = store.get("bob".into(), saved.quiz_id.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::NoSuchValue));
        let err = store.delete("bob".into(), saved.quiz_id.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::NoSuchValue));
        // 仍然存在
        assert!(store.get("alice".into(), saved.quiz_id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let store = memory_store().await;
        let saved = store.save("alice".into(), draft("Rust", "easy", 50, 2)).await.unwrap();
        store.delete("alice".into(), saved.quiz_id.clone()).await.unwrap();
        assert!(matches!(
            store.get("alice".into(), saved.quiz_id).await,
            Err(StoreError::NoSuchValue)
        ));
    }

    #[tokio::test]
    async fn lists_newest_first_with_pagination() {
        let store = memory_store().await;
        for i in 0..5 {
            store.save("alice".into(), draft(&format!("Topic {i}"), "medium", 60, 3)).await.unwrap();
        }
        store.save("bob".into(), draft("Other", "medium", 60, 3)).await.unwrap();

        let first = store.list("alice".into(), query(1, 2)).await.unwrap();
        assert_eq!(
            first.pagination,
            Pagination { current_page: 1, total_pages: 3, total_quizzes: 5, limit: 2 }
        );
        let topics: Vec<&str> = first.quizzes.iter().map(|q| q.quiz_metadata.topic.as_str()).collect();
        assert_eq!(topics, ["Topic 4", "Topic 3"]);

        let last = store.list("alice".into(), query(3, 2)).await.unwrap();
        assert_eq!(last.quizzes.len(), 1);
        assert_eq!(last.quizzes[0].quiz_metadata.topic, "Topic 0");
    }

    #[tokio::test]
    async fn filters_by_topic_substring_and_exact_difficulty() {
        let store = memory_store().await;
        store.save("alice".into(), draft("JavaScript basics", "easy", 60, 3)).await.unwrap();
        store.save("alice".into(), draft("Advanced javascript", "hard", 60, 3)).await.unwrap();
        store.save("alice".into(), draft("World history", "easy", 60, 3)).await.unwrap();

        let by_topic = ListQuery { topic: Some("JAVASCRIPT".into()), ..query(1, 10) };
        assert_eq!(store.list("alice".into(), by_topic).await.unwrap().pagination.total_quizzes, 2);

        let both = ListQuery {
            topic: Some("script".into()),
            difficulty: Some("easy".into()),
            ..query(1, 10)
        };
        let page = store.list("alice".into(), both).await.unwrap();
        assert_eq!(page.quizzes.len(), 1);
        assert_eq!(page.quizzes[0].quiz_metadata.topic, "JavaScript basics");

        let partial_difficulty = ListQuery { difficulty: Some("eas".into()), ..query(1, 10) };
        assert!(store.list("alice".into(), partial_difficulty).await.unwrap().quizzes.is_empty());
    }

    #[tokio::test]
    async fn statistics_cover_all_records_of_the_owner() {
        let store = memory_store().await;
        store.save("alice".into(), draft("Rust", "easy", 100, 4)).await.unwrap();
        store.save("alice".into(), draft("Python", "easy", 50, 6)).await.unwrap();
        store.save("alice".into(), draft("Rust", "hard", 25, 2)).await.unwrap();
        store.save("bob".into(), draft("Go", "easy", 0, 10)).await.unwrap();

        let stats = store.statistics("alice".into()).await.unwrap();
        assert_eq!(stats.total_quizzes, 3);
        // (100 + 50 + 25) / 3 = 58.33
        assert_eq!(stats.average_score, 58);
        assert_eq!(stats.total_questions_answered, 12);
        assert_eq!(
            stats.top_topics,
            vec![
                TopicCount { topic: "Rust".into(), count: 2 },
                TopicCount { topic: "Python".into(), count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn statistics_for_a_new_user_are_zero() {
        let store = memory_store().await;
        let stats = store.statistics("nobody".into()).await.unwrap();
        assert_eq!(stats.total_quizzes, 0);
        assert_eq!(stats.average_score, 0);
        assert_eq!(stats.total_questions_answered, 0);
        assert!(stats.top_topics.is_empty());
    }

    #[tokio::test]
    async fn top_topics_are_capped_at_five() {
        let store = memory_store().await;
        for topic in ["A", "B", "C", "D", "E", "F", "F"] {
            store.save("alice".into(), draft(topic, "easy", 10, 1)).await.unwrap();
        }
        let stats = store.statistics("alice".into()).await.unwrap();
        let topics: Vec<&str> = stats.top_topics.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(topics, ["F", "A", "B", "C", "D"]);
    }
}
