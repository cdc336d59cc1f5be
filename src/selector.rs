//! 从模板题库中抽题

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::categorizer::Category;
use crate::structs::question::{Question, QuestionType};
use crate::templates::templates_for;

const DEDUP_PREFIX_CHARS: usize = 50;
const VARIATION_PREFIX_CHARS: usize = 30;

fn prefix(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

/// 去重键：题型加题干前50个字符
fn dedup_key(question: &Question) -> String {
    format!("{}-{}", question.kind(), prefix(question.prompt(), DEDUP_PREFIX_CHARS))
}

/// 抽取至多`count`道不重复的模板题
///
/// 所属分类没有可用模板时依次借用其他分类；去重后仍不足时以"(Related to 主题)"
/// 的变体补足。题库彻底为空时返回空列表。
pub fn select<R: Rng + ?Sized>(
    topic: &str,
    category: Category,
    count: usize,
    requested: &[QuestionType],
    rng: &mut R,
) -> Vec<Question> {
    let mut pool: Vec<Question> = requested
        .iter()
        .flat_map(|kind| templates_for(*kind, category).iter().cloned())
        .collect();

    if pool.is_empty() {
        log::info!("分类{category}下没有可用模板，尝试其他分类");
        for fallback in Category::FALLBACK_ORDER {
            if fallback == category {
                continue;
            }
            for kind in requested {
                pool.extend(templates_for(*kind, fallback).iter().map(|question| {
                    question.relabeled(format!("[Adapted for {topic}] {}", question.prompt()))
                }));
            }
            if pool.len() >= count {
                break;
            }
        }
    }

    pool.shuffle(rng);

    let mut used = HashSet::new();
    let mut selected = Vec::with_capacity(count);
    for question in &pool {
        if selected.len() >= count {
            break;
        }
        if used.insert(dedup_key(question)) {
            selected.push(question.clone());
        }
    }

    // 不足时生成变体补齐
    if selected.len() < count {
        let needed = count - selected.len();
        for (position, base) in pool.iter().take(needed).enumerate() {
            let variation = base.relabeled(format!("{} (Related to {topic})", base.prompt()));
            let variation_key = format!(
                "{}-variation-{}-{}",
                base.kind(),
                position,
                prefix(base.prompt(), VARIATION_PREFIX_CHARS)
            );
            // 题干超过50字符时变体的去重键与原题相同，只能放弃
            let key = dedup_key(&variation);
            if used.contains(&variation_key) || used.contains(&key) {
                continue;
            }
            used.insert(variation_key);
            used.insert(key);
            selected.push(variation);
        }
    }

    selected.truncate(count);
    selected.shuffle(rng);
    log::info!(
        "为主题{topic}从分类{category}选出{}道模板题",
        selected.len()
    );
    selected
}
