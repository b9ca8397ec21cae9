const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "shall", "should", "may", "might", "must", "can",
    "could", "i", "me", "my", "myself", "we", "our", "ours", "you", "your", "yours", "he", "him",
    "his", "she", "her", "hers", "it", "its", "they", "them", "their", "what", "which", "who",
    "whom", "this", "that", "these", "those", "am", "and", "but", "or", "nor", "not", "no", "so",
    "if", "then", "than", "too", "very", "just", "now", "here", "there", "how", "all", "each",
    "every", "both", "few", "more", "most", "some", "any", "such", "only", "own", "same", "also",
    "into", "from", "with", "for", "on", "at", "to", "of", "in", "by", "up", "about", "out",
    "off", "over", "under", "again", "once", "where", "when", "why", "after", "before", "please",
    "want", "need", "help", "like", "make", "let", "get", "know", "think", "tell", "show", "give",
];

/// Lower-cased, de-duplicated search keywords from free text.
///
/// Words shorter than three characters and common stop words are dropped.
/// Hyphens, underscores, and dots stay inside words so identifiers like
/// `OPS-42` or `api.v2` survive.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();
    for word in lower.split(|c: char| !c.is_alphanumeric() && c != '_' && c != '-' && c != '.') {
        let word = word.trim_matches('.');
        if word.chars().count() < 3 || STOP_WORDS.contains(&word) {
            continue;
        }
        if !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_string());
        }
    }
    keywords
}

/// Number of distinct keywords found in `text` (case-insensitive).
pub fn relevance(text: &str, keywords: &[String]) -> usize {
    let lower = text.to_lowercase();
    keywords.iter().filter(|k| lower.contains(k.as_str())).count()
}
