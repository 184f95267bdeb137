// Word frequency leaderboards split by script
use regex::Regex;
use std::sync::LazyLock;
use tracing::error;

use crate::api_client::{StatItem, WordApi};

static LATIN_START: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[A-Za-z]").expect("static pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Hindi,
    Marathi,
    English,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Hindi, Bucket::Marathi, Bucket::English];

    pub fn title(self) -> &'static str {
        match self {
            Bucket::Hindi => "Hindi",
            Bucket::Marathi => "Marathi",
            Bucket::English => "English",
        }
    }
}

fn is_devanagari(word: &str) -> bool {
    word.chars().next().is_some_and(|c| ('\u{0900}'..='\u{097F}').contains(&c))
}

/// Script bucket for a word, or `None` for anything unrecognised.
///
/// Hindi and Marathi share the Devanagari script, so they are told apart
/// only by word length: three characters or fewer counts as Hindi. This is
/// a rough approximation, not language detection.
pub fn bucket_for(word: &str) -> Option<Bucket> {
    if is_devanagari(word) {
        if word.chars().count() <= 3 {
            Some(Bucket::Hindi)
        } else {
            Some(Bucket::Marathi)
        }
    } else if LATIN_START.is_match(word) {
        Some(Bucket::English)
    } else {
        None
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Leaderboards {
    pub hindi: Vec<StatItem>,
    pub marathi: Vec<StatItem>,
    pub english: Vec<StatItem>,
}

impl Leaderboards {
    pub fn get(&self, bucket: Bucket) -> &[StatItem] {
        match bucket {
            Bucket::Hindi => &self.hindi,
            Bucket::Marathi => &self.marathi,
            Bucket::English => &self.english,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<StatItem> {
        match bucket {
            Bucket::Hindi => &mut self.hindi,
            Bucket::Marathi => &mut self.marathi,
            Bucket::English => &mut self.english,
        }
    }

    pub fn is_empty(&self) -> bool {
        Bucket::ALL.iter().all(|b| self.get(*b).is_empty())
    }
}

/// Buckets every used word and keeps the `top_n` most frequent per bucket.
/// Equal frequencies keep their arrival order.
pub fn classify(items: Vec<StatItem>, top_n: usize) -> Leaderboards {
    let mut boards = Leaderboards::default();
    for item in items {
        if item.freq == 0 {
            continue;
        }
        if let Some(bucket) = bucket_for(&item.word) {
            boards.get_mut(bucket).push(item);
        }
    }
    for bucket in Bucket::ALL {
        let list = boards.get_mut(bucket);
        list.sort_by(|a, b| b.freq.cmp(&a.freq));
        list.truncate(top_n);
    }
    boards
}

/// Fetches and classifies; a failed fetch is logged and yields empty boards.
pub async fn load_leaderboards(api: &dyn WordApi, top_n: usize) -> Leaderboards {
    match api.stats().await {
        Ok(items) => classify(items, top_n),
        Err(e) => {
            error!(error = %e, "error loading stats");
            Leaderboards::default()
        }
    }
}

/// Plain-text rendition of one table.
pub fn format_table(bucket: Bucket, rows: &[StatItem]) -> String {
    let mut out = format!("{}\n", bucket.title());
    for (i, item) in rows.iter().enumerate() {
        out.push_str(&format!("{:>3}  {:<20} {}\n", i + 1, item.word, item.freq));
    }
    out
}
