use std::collections::BTreeSet;

/// Technology and skill names looked for in call transcripts.  Terms are lower-case.
pub const SKILL_VOCABULARY: &[&str] = &[
    "python",
    "javascript",
    "typescript",
    "java",
    "c++",
    "rust",
    "go",
    "react",
    "node",
    "angular",
    "vue",
    "html",
    "css",
    "sql",
    "database",
    "machine learning",
    "data science",
    "ai",
    "web development",
    "mobile",
    "ios",
    "android",
    "flutter",
    "cloud",
    "aws",
    "azure",
    "docker",
    "kubernetes",
    "devops",
    "blockchain",
    "ui",
    "ux",
    "design",
    "frontend",
    "backend",
    "full stack",
];

/// Case-insensitive substring scan over a fixed vocabulary.
///
/// Matching is plain containment, without word boundaries: `"go"` is found in `"good"` and
/// `"ai"` in `"said"`.
#[derive(Debug, Clone)]
pub struct SkillExtractor {
    vocabulary: Vec<String>,
}

impl Default for SkillExtractor {
    fn default() -> Self {
        Self::new(SKILL_VOCABULARY.iter().copied())
    }
}

impl SkillExtractor {
    pub fn new<'a>(terms: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            vocabulary: terms.into_iter().map(str::to_lowercase).collect(),
        }
    }

    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let haystack = text.to_lowercase();
        self.vocabulary
            .iter()
            .filter(|term| haystack.contains(term.as_str()))
            .cloned()
            .collect()
    }
}
