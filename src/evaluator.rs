//! 按题型评分并汇总

use crate::similarity::similarity;
use crate::structs::answer::AnswerValue;
use crate::structs::evaluation::{EvaluationResult, QuizSummary};

const LONG_ANSWER_MIN_CHARS: usize = 10;
const COVERAGE_WEIGHT: f64 = 70.0;
const LENGTH_WEIGHT: f64 = 30.0;
// 大约每20个字符得1分
const CHARS_PER_LENGTH_POINT: f64 = 20.0;
const LONG_ANSWER_PASS_SCORE: u32 = 60;

/// 评分所需的参考答案，按题型区分
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceAnswer {
    Choice { correct: usize, options: Vec<String> },
    Short { expected: String },
    Long { key_points: Vec<String> },
    Unknown,
}

pub fn evaluate(
    question_index: usize,
    reference: &ReferenceAnswer,
    answer: Option<&AnswerValue>,
) -> EvaluationResult {
    match reference {
        ReferenceAnswer::Choice { correct, options } => {
            evaluate_choice(question_index, *correct, options, answer)
        }
        ReferenceAnswer::Short { expected } => {
            let text = answer.map(|a| a.as_text()).unwrap_or_default();
            evaluate_short(question_index, &text, expected)
        }
        ReferenceAnswer::Long { key_points } => {
            let text = answer.map(|a| a.as_text()).unwrap_or_default();
            evaluate_long(question_index, &text, key_points)
        }
        ReferenceAnswer::Unknown => EvaluationResult {
            question_index,
            is_correct: false,
            score: 0,
            feedback: "Unknown question type".to_string(),
            correct_answer: None,
        },
    }
}

fn evaluate_choice(
    question_index: usize,
    correct: usize,
    options: &[String],
    answer: Option<&AnswerValue>,
) -> EvaluationResult {
    let is_correct = answer.and_then(AnswerValue::as_index) == Some(correct);
    let correct_text = options.get(correct).cloned();
    let feedback = if is_correct {
        "Correct! Well done.".to_string()
    } else {
        format!(
            "Incorrect. The correct answer is: {}",
            correct_text.as_deref().unwrap_or("N/A")
        )
    };
    EvaluationResult {
        question_index,
        is_correct,
        score: if is_correct { 100 } else { 0 },
        feedback,
        correct_answer: correct_text,
    }
}

fn evaluate_short(question_index: usize, answer: &str, expected: &str) -> EvaluationResult {
    let ratio = similarity(answer, expected);
    let (score, is_correct, feedback) = if ratio >= 0.9 {
        (100, true, "Excellent! Your answer is correct.".to_string())
    } else if ratio >= 0.7 {
        (
            85,
            true,
            format!("Good answer! Your response is very close to the expected answer: \"{expected}\""),
        )
    } else if ratio >= 0.5 {
        (
            60,
            false,
            format!("Partially correct. Your answer has some similarity to the correct answer: \"{expected}\""),
        )
    } else {
        (20, false, format!("Incorrect. The correct answer is: \"{expected}\""))
    };
    EvaluationResult {
        question_index,
        is_correct,
        score,
        feedback,
        correct_answer: Some(expected.to_string()),
    }
}

fn evaluate_long(question_index: usize, answer: &str, key_points: &[String]) -> EvaluationResult {
    if answer.trim().chars().count() < LONG_ANSWER_MIN_CHARS {
        return EvaluationResult {
            question_index,
            is_correct: false,
            score: 0,
            feedback: "Your answer is too short. Please provide a more detailed response.".to_string(),
            correct_answer: None,
        };
    }

    let text = answer.to_lowercase();
    let mut covered = 0;
    let mut items = Vec::with_capacity(key_points.len());
    for point in key_points {
        // 要点中任意一个词出现在回答里即视为覆盖
        let hit = point
            .to_lowercase()
            .split_whitespace()
            .any(|word| text.contains(word));
        if hit {
            covered += 1;
            items.push(format!("✓ Addressed: {point}"));
        } else {
            items.push(format!("✗ Missing: {point}"));
        }
    }

    let coverage_score = if key_points.is_empty() {
        0.0
    } else {
        covered as f64 / key_points.len() as f64 * COVERAGE_WEIGHT
    };
    let length_score = (answer.chars().count() as f64 / CHARS_PER_LENGTH_POINT).min(LENGTH_WEIGHT);
    let score = ((coverage_score + length_score).round() as u32).min(100);

    EvaluationResult {
        question_index,
        is_correct: score >= LONG_ANSWER_PASS_SCORE,
        score,
        feedback: format!(
            "Score breakdown: {covered}/{} key points covered. {}",
            key_points.len(),
            items.join(" • ")
        ),
        correct_answer: None,
    }
}

/// 汇总，没有结果时返回None
pub fn summarize(results: &[EvaluationResult]) -> Option<QuizSummary> {
    if results.is_empty() {
        return None;
    }
    let total = results.len();
    let correct = results.iter().filter(|r| r.is_correct).count();
    let score_sum: u64 = results.iter().map(|r| u64::from(r.score)).sum();
    Some(QuizSummary {
        total_questions: total,
        correct_answers: correct,
        average_score: (score_sum as f64 / total as f64).round() as u32,
        percentage: (correct as f64 * 100.0 / total as f64).round() as u32,
    })
}
