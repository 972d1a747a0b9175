//! Follow-up question classification: does answering need fresh lookups?

/// Decides which follow-up role answers a question.
pub trait FollowUpClassifier: Send + Sync + std::fmt::Debug {
    /// `true` routes the question to the search-backed role.
    fn needs_lookup(&self, question: &str) -> bool;
}

/// English keywords that signal a request for new or comparative information.
pub const DEFAULT_KEYWORDS_EN: &[&str] = &[
    "search",
    "find",
    "compare",
    "latest",
    "cheaper",
    "cheap",
    "alternative",
    "nearby",
    "price",
    "review",
    "recommend more",
    "other options",
    "best",
    "better",
];

/// Chinese keywords with the same intent.
pub const DEFAULT_KEYWORDS_ZH: &[&str] = &[
    "搜索", "查找", "推荐更多", "其他选择", "最新", "价格", "评价", "替代", "附近", "比较",
    "更好的", "便宜", "高档", "最佳",
];

/// Case-insensitive substring matcher over a keyword list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    /// Matcher over `keywords`; blank entries are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// The configured list when present, otherwise the built-in lists.
    pub fn from_config(keywords: Option<&[String]>) -> Self {
        match keywords {
            Some(list) => Self::new(list),
            None => Self::default(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS_EN.iter().chain(DEFAULT_KEYWORDS_ZH))
    }
}

impl FollowUpClassifier for KeywordClassifier {
    fn needs_lookup(&self, question: &str) -> bool {
        let question = question.to_lowercase();
        self.keywords.iter().any(|k| question.contains(k.as_str()))
    }
}
