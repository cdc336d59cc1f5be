//! 简答题使用的粗略文本相似度

/// 小写、去首尾空白、只保留ascii字母数字和空白
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect()
}

/// 计算`answer`相对`reference`的覆盖率，取值[0, 1]
///
/// 归一化后完全相同直接返回1.0；否则统计`answer`中有多少词与`reference`的某个词
/// 互为子串（任意方向），再除以两边词数的较大者。重复的词会被重复计数。
pub fn similarity(answer: &str, reference: &str) -> f64 {
    let answer = normalize(answer);
    let reference = normalize(reference);
    if answer == reference {
        return 1.0;
    }

    // 只取非空词，去掉标点后留下的空白不会产生能匹配一切的空词
    let answer_words: Vec<&str> = answer.split_whitespace().collect();
    let reference_words: Vec<&str> = reference.split_whitespace().collect();
    if answer_words.is_empty() || reference_words.is_empty() {
        return 0.0;
    }

    let matched = answer_words
        .iter()
        .filter(|word| {
            reference_words
                .iter()
                .any(|other| other.contains(*word) || word.contains(other))
        })
        .count();

    matched as f64 / answer_words.len().max(reference_words.len()) as f64
}
