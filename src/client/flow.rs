use std::collections::{BTreeMap, HashMap};
use std::mem;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::client::progress::{ProgressError, ProgressStore, SavedProgress, SessionKey};
use crate::client::{ClientError, QuizBackend};
use crate::structs::answer::{Answer, AnswerValue};
use crate::structs::generate::GenerateRequest;
use crate::structs::question::Question;
use crate::structs::record::{QuestionDetail, QuizDraft, QuizMetadata, SavedQuiz};
use crate::structs::submit::{AnswerSubmission, EvaluateRequest, EvaluateResponse};
use crate::utils::now_rfc3339;

const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Backend(#[from] ClientError),
    #[error("No questions were generated")]
    NoQuestions,
    #[error("Please answer at least one question before submitting.")]
    NoAnswers,
    #[error("no quiz in progress")]
    NotInQuiz,
    #[error("no quiz results to work with")]
    NotInResults,
    #[error("question {0} does not exist")]
    QuestionOutOfRange(usize),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// 测验设置
#[derive(Debug, Clone, PartialEq)]
pub struct QuizConfig {
    pub topic: String,
    pub question_count: u32,
    pub question_types: Vec<String>,
    pub difficulty: String,
    /// 分钟
    pub time_limit: Option<u32>,
}

impl QuizConfig {
    pub fn to_request(&self) -> GenerateRequest {
        GenerateRequest {
            topic: self.topic.clone(),
            question_count: self.question_count,
            question_types: self.question_types.clone(),
            difficulty: self.difficulty.clone(),
        }
    }
}

/// 额度不足时减半题量重试
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    TimeUp,
}

/// 正在进行的测验
#[derive(Debug)]
pub struct ActiveQuiz {
    config: QuizConfig,
    key: SessionKey,
    questions: Vec<Question>,
    current: usize,
    answers: BTreeMap<usize, Answer>,
    started_at: Instant,
    // 恢复存档前已经用掉的时间
    restored_secs: u64,
    visited_at: HashMap<usize, Instant>,
    time_remaining: Option<u64>,
    last_tick: Instant,
    last_autosave: Instant,
}

impl ActiveQuiz {
    /// 存在同一会话的存档时恢复进度
    pub fn start(
        config: QuizConfig,
        questions: Vec<Question>,
        store: &ProgressStore,
        now: Instant,
    ) -> Result<ActiveQuiz, FlowError> {
        if questions.is_empty() {
            return Err(FlowError::NoQuestions);
        }
        let key = SessionKey::new(config.topic.clone(), questions.len());
        let mut quiz = ActiveQuiz {
            time_remaining: config.time_limit.map(|minutes| u64::from(minutes) * 60),
            config,
            key,
            questions,
            current: 0,
            answers: BTreeMap::new(),
            started_at: now,
            restored_secs: 0,
            visited_at: HashMap::from([(0, now)]),
            last_tick: now,
            last_autosave: now,
        };

        if let Some(saved) = store.load(&quiz.key)? {
            let count = quiz.questions.len();
            quiz.current = saved.current_question_index.min(count - 1);
            quiz.answers = saved
                .answers
                .into_iter()
                .filter(|answer| answer.question_index < count)
                .map(|answer| (answer.question_index, answer))
                .collect();
            quiz.restored_secs = saved.elapsed_secs;
            if quiz.time_remaining.is_some() {
                quiz.time_remaining = saved.time_remaining;
            }
            quiz.visited_at.insert(quiz.current, now);
            log::info!("已恢复主题{}的答题进度", quiz.key.topic);
        }
        Ok(quiz)
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.answers.get(&index)
    }

    pub fn time_remaining(&self) -> Option<u64> {
        self.time_remaining
    }

    /// 离开页面前需要提醒的未提交作答
    pub fn has_unsaved_answers(&self) -> bool {
        !self.answers.is_empty()
    }

    /// 覆盖之前的作答，用时从最近一次进入该题算起
    pub fn record_answer(&mut self, index: usize, value: AnswerValue, now: Instant) -> Result<(), FlowError> {
        if index >= self.questions.len() {
            return Err(FlowError::QuestionOutOfRange(index));
        }
        let time_spent = self
            .visited_at
            .get(&index)
            .map(|entered| now.saturating_duration_since(*entered).as_secs())
            .unwrap_or(0);
        self.answers.insert(
            index,
            Answer {
                question_index: index,
                answer: value,
                time_spent,
            },
        );
        Ok(())
    }

    pub fn next(&mut self, now: Instant) -> bool {
        if self.current + 1 >= self.questions.len() {
            return false;
        }
        self.current += 1;
        self.visited_at.insert(self.current, now);
        true
    }

    pub fn previous(&mut self, now: Instant) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.visited_at.insert(self.current, now);
        true
    }

    fn elapsed_secs(&self, now: Instant) -> u64 {
        self.restored_secs + now.saturating_duration_since(self.started_at).as_secs()
    }

    fn snapshot(&self, now: Instant) -> SavedProgress {
        SavedProgress {
            current_question_index: self.current,
            answers: self.answers.values().cloned().collect(),
            elapsed_secs: self.elapsed_secs(now),
            time_remaining: self.time_remaining,
        }
    }

    /// 推进倒计时；每30秒在有作答时存档一次
    pub fn tick(&mut self, now: Instant, store: &ProgressStore) -> Result<TickOutcome, FlowError> {
        let passed = now.saturating_duration_since(self.last_tick).as_secs();
        if passed > 0 {
            self.last_tick += Duration::from_secs(passed);
            if let Some(remaining) = self.time_remaining.as_mut() {
                *remaining = remaining.saturating_sub(passed);
            }
        }

        if now.saturating_duration_since(self.last_autosave) >= AUTOSAVE_INTERVAL {
            self.last_autosave = now;
            if self.has_unsaved_answers() {
                store.save(&self.key, &self.snapshot(now))?;
            }
        }

        Ok(match self.time_remaining {
            Some(0) => TickOutcome::TimeUp,
            _ => TickOutcome::Running,
        })
    }

    /// 只提交已作答的题目
    pub fn evaluation_request(&self) -> EvaluateRequest {
        EvaluateRequest {
            answers: self
                .answers
                .values()
                .map(|answer| {
                    AnswerSubmission::new(
                        answer.question_index,
                        &self.questions[answer.question_index],
                        Some(answer.answer.clone()),
                    )
                })
                .collect(),
            topic: Some(self.config.topic.clone()),
        }
    }

    pub fn into_draft(self, evaluation: EvaluateResponse, now: Instant) -> QuizDraft {
        let quiz_metadata = QuizMetadata {
            topic: self.config.topic.clone(),
            difficulty: self.config.difficulty.clone(),
            total_questions: self.questions.len(),
            questions_answered: self.answers.len(),
            total_time_spent: self.elapsed_secs(now),
            time_limit: self.config.time_limit.map(|minutes| u64::from(minutes) * 60),
            completed_at: now_rfc3339(),
        };
        let question_details = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, question)| {
                let answer = self.answers.get(&index);
                QuestionDetail {
                    question,
                    user_answer: answer.map(|a| a.answer.clone()),
                    time_spent: answer.map(|a| a.time_spent).unwrap_or(0),
                    result: evaluation
                        .results
                        .iter()
                        .find(|result| result.question_index == index)
                        .cloned(),
                }
            })
            .collect();
        QuizDraft {
            results: evaluation.results,
            summary: evaluation.summary,
            quiz_metadata,
            question_details,
        }
    }
}

#[derive(Debug)]
pub struct QuizOutcome {
    pub config: QuizConfig,
    pub draft: QuizDraft,
    pub saved: Option<SavedQuiz>,
}

#[derive(Debug)]
pub enum FlowState {
    Config,
    Quiz(Box<ActiveQuiz>),
    Results(Box<QuizOutcome>),
}

/// config -> quiz -> results
pub struct QuizFlow<B: QuizBackend> {
    backend: B,
    store: ProgressStore,
    retry: RetryPolicy,
    state: FlowState,
}

impl<B: QuizBackend> QuizFlow<B> {
    pub fn new(backend: B, store: ProgressStore) -> Self {
        Self {
            backend,
            store,
            retry: RetryPolicy::default(),
            state: FlowState::Config,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn quiz(&self) -> Option<&ActiveQuiz> {
        match &self.state {
            FlowState::Quiz(quiz) => Some(quiz.as_ref()),
            _ => None,
        }
    }

    pub fn quiz_mut(&mut self) -> Option<&mut ActiveQuiz> {
        match &mut self.state {
            FlowState::Quiz(quiz) => Some(quiz.as_mut()),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<&QuizOutcome> {
        match &self.state {
            FlowState::Results(outcome) => Some(outcome.as_ref()),
            _ => None,
        }
    }

    /// 出题失败时保持原状态
    pub async fn start_quiz(&mut self, config: QuizConfig) -> Result<(), FlowError> {
        let mut config = config;
        let mut retries = 0;
        let response = loop {
            match self.backend.generate_questions(&config.to_request()).await {
                Ok(response) => break response,
                Err(e) if e.is_quota() && retries < self.retry.max_retries && config.question_count > 1 => {
                    retries += 1;
                    config.question_count = (config.question_count / 2).max(1);
                    log::warn!("{e}，改为{}道题重试", config.question_count);
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        };
        let quiz = ActiveQuiz::start(config, response.questions, &self.store, Instant::now())?;
        log::info!("开始测验，共{}道题", quiz.questions.len());
        self.state = FlowState::Quiz(Box::new(quiz));
        Ok(())
    }

    /// 没有作答或评分失败时留在答题状态
    pub async fn submit(&mut self, now: Instant) -> Result<(), FlowError> {
        let quiz = match mem::replace(&mut self.state, FlowState::Config) {
            FlowState::Quiz(quiz) => quiz,
            other => {
                self.state = other;
                return Err(FlowError::NotInQuiz);
            }
        };
        let request = quiz.evaluation_request();
        if request.answers.is_empty() {
            self.state = FlowState::Quiz(quiz);
            return Err(FlowError::NoAnswers);
        }
        let evaluation = match self.backend.evaluate_answers(&request).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                self.state = FlowState::Quiz(quiz);
                return Err(e.into());
            }
        };

        let key = quiz.key.clone();
        let config = quiz.config.clone();
        let draft = quiz.into_draft(evaluation, now);
        if let Err(e) = self.store.clear(&key) {
            log::warn!("清除答题进度失败: {e}");
        }
        self.state = FlowState::Results(Box::new(QuizOutcome { config, draft, saved: None }));
        Ok(())
    }

    /// 时间耗尽时自动提交
    pub async fn tick(&mut self, now: Instant) -> Result<TickOutcome, FlowError> {
        let outcome = match &mut self.state {
            FlowState::Quiz(quiz) => quiz.tick(now, &self.store)?,
            _ => return Err(FlowError::NotInQuiz),
        };
        if outcome == TickOutcome::TimeUp {
            log::info!("时间到，自动提交");
            self.submit(now).await?;
        }
        Ok(outcome)
    }

    pub async fn save_results(&mut self) -> Result<SavedQuiz, FlowError> {
        let FlowState::Results(outcome) = &mut self.state else {
            return Err(FlowError::NotInResults);
        };
        let saved = self.backend.save_quiz(&outcome.draft).await?;
        outcome.saved = Some(saved.clone());
        Ok(saved)
    }

    /// 用同样的设置重新出题
    pub async fn retake(&mut self) -> Result<(), FlowError> {
        let config = match &self.state {
            FlowState::Results(outcome) => outcome.config.clone(),
            _ => return Err(FlowError::NotInResults),
        };
        self.start_quiz(config).await
    }

    pub fn new_quiz(&mut self) {
        self.state = FlowState::Config;
    }
}
