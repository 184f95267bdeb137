// Prefix extraction and history/backend merging

/// The typed text split into the finished words and the one being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typed {
    pub head: Vec<String>,
    pub prefix: String,
}

impl Typed {
    pub fn parse(text: &str) -> Self {
        let mut head: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        let prefix = head.pop().unwrap_or_default();
        Self { head, prefix }
    }

    /// Input text after choosing `word` for the current token.
    pub fn complete_with(&self, word: &str) -> String {
        let mut out = String::new();
        for w in &self.head {
            out.push_str(w);
            out.push(' ');
        }
        out.push_str(word);
        out.push(' ');
        out
    }
}

/// History matches first, then backend words not already present, capped at `limit`.
pub fn merge(history_matches: Vec<String>, backend: &[String], limit: usize) -> Vec<String> {
    let mut out = history_matches;
    for word in backend {
        if !out.contains(word) {
            out.push(word.clone());
        }
    }
    out.truncate(limit);
    out
}
