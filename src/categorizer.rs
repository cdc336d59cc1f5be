use std::fmt;

use serde::{Deserialize, Serialize};

/// 模板题库的学科分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Programming,
    Mathematics,
    History,
    Science,
}

impl Category {
    /// 题库为空时借用其他分类的顺序
    pub const FALLBACK_ORDER: [Category; 4] = [
        Category::Programming,
        Category::Science,
        Category::Mathematics,
        Category::History,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Programming => "programming",
            Category::Mathematics => "mathematics",
            Category::History => "history",
            Category::Science => "science",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PROGRAMMING_KEYWORDS: &[&str] = &[
    "programming", "javascript", "python", "java", "c++", "c#", "php", "ruby", "go", "rust",
    "code", "coding", "html", "css", "react", "angular", "vue", "node", "nodejs",
    "software", "web", "api", "database", "sql", "json", "framework", "library",
    "algorithm", "data structure", "oop", "frontend", "backend", "fullstack",
];

const MATHEMATICS_KEYWORDS: &[&str] = &[
    "math", "mathematics", "algebra", "geometry", "calculus", "trigonometry",
    "statistics", "probability", "arithmetic", "equation", "formula", "theorem",
];

const HISTORY_KEYWORDS: &[&str] = &[
    "history", "historical", "war", "revolution", "ancient", "medieval", "renaissance",
    "industrial", "civilization", "empire", "dynasty", "battle", "treaty", "colonial",
];

const SCIENCE_KEYWORDS: &[&str] = &[
    "science", "biology", "chemistry", "physics", "plant", "evolution", "photosynthesis",
    "atom", "molecule", "element", "compound", "cell", "dna", "genetics", "ecology",
    "thermodynamics", "quantum", "gravity", "energy", "matter", "organism",
];

// 按优先级排列，先命中者胜出
const RULES: [(Category, &[&str]); 4] = [
    (Category::Programming, PROGRAMMING_KEYWORDS),
    (Category::Mathematics, MATHEMATICS_KEYWORDS),
    (Category::History, HISTORY_KEYWORDS),
    (Category::Science, SCIENCE_KEYWORDS),
];

/// 根据关键词判断主题所属分类，全部未命中时归为programming
pub fn categorize(topic: &str) -> Category {
    let topic = topic.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| topic.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Programming)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_topics_to_their_category() {
        assert_eq!(categorize("JavaScript basics"), Category::Programming);
        assert_eq!(categorize("Linear Algebra"), Category::Mathematics);
        assert_eq!(categorize("The French Revolution"), Category::History);
        assert_eq!(categorize("Photosynthesis in plants"), Category::Science);
        assert_eq!(categorize("THERMODYNAMICS"), Category::Science);
    }

    #[test]
    fn earlier_lists_win_ties() {
        // mathematics排在history之前
        assert_eq!(categorize("history of mathematics"), Category::Mathematics);
        // history排在science之前
        assert_eq!(categorize("World War physics"), Category::History);
        assert_eq!(categorize("Algorithm history"), Category::Programming);
    }

    #[test]
    fn unmatched_topics_default_to_programming() {
        assert_eq!(categorize(""), Category::Programming);
        assert_eq!(categorize("cooking"), Category::Programming);
        assert_eq!(categorize("Impressionist painters"), Category::Programming);
    }

    #[test]
    fn keywords_match_as_substrings() {
        // "go"藏在"mongodb"里
        assert_eq!(categorize("MongoDB"), Category::Programming);
        assert_eq!(categorize("cellular respiration"), Category::Science);
    }
}
