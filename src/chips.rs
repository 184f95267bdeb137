// Suggestion chips: list model, keyboard selection and span rendering
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

use crate::suggest::Typed;

pub const OFFLINE_TEXT: &str = "⚠️ Server Offline";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chip {
    Word(String),
    Offline,
}

impl Chip {
    pub fn label(&self) -> &str {
        match self {
            Chip::Word(w) => w,
            Chip::Offline => OFFLINE_TEXT,
        }
    }
}

/// Splits `word` after as many characters as `prefix` has.
pub fn highlight<'a>(word: &'a str, prefix: &str) -> (&'a str, &'a str) {
    let n = prefix.chars().count();
    let at = word.char_indices().nth(n).map(|(i, _)| i).unwrap_or(word.len());
    word.split_at(at)
}

#[derive(Default)]
pub struct ChipList {
    chips: Vec<Chip>,
    typed: Option<Typed>,
    selected: Option<usize>,
}

impl ChipList {
    /// Replaces the chips with `words` typed against `typed`. Selection resets.
    pub fn show(&mut self, typed: Typed, words: Vec<String>) {
        self.chips = words.into_iter().map(Chip::Word).collect();
        self.typed = Some(typed);
        self.selected = None;
    }

    pub fn show_offline(&mut self) {
        self.chips = vec![Chip::Offline];
        self.typed = None;
        self.selected = None;
    }

    pub fn clear(&mut self) {
        self.chips.clear();
        self.typed = None;
        self.selected = None;
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn selectable(&self) -> bool {
        self.chips.iter().any(|c| matches!(c, Chip::Word(_)))
    }

    pub fn select_next(&mut self) {
        if !self.selectable() {
            return;
        }
        let len = self.chips.len();
        self.selected = Some(self.selected.map_or(0, |i| (i + 1) % len));
    }

    pub fn select_prev(&mut self) {
        if !self.selectable() {
            return;
        }
        let len = self.chips.len();
        self.selected = Some(self.selected.map_or(len - 1, |i| (i + len - 1) % len));
    }

    /// Takes the chip at `index`: returns the chosen word and the new input
    /// text, and clears the list. Placeholders are not applicable.
    pub fn apply(&mut self, index: usize) -> Option<(String, String)> {
        let Some(Chip::Word(word)) = self.chips.get(index) else { return None };
        let word = word.clone();
        let text = self.typed.as_ref().map(|t| t.complete_with(&word))?;
        self.clear();
        Some((word, text))
    }

    pub fn apply_selected(&mut self) -> Option<(String, String)> {
        self.selected.and_then(|i| self.apply(i))
    }

    /// One line of chips plus the screen area each chip occupies, starting at `area`.
    pub fn render(&self, area: Rect, base: Style, active: Style) -> (Line<'static>, Vec<Rect>) {
        let prefix = self.typed.as_ref().map(|t| t.prefix.as_str()).unwrap_or("");
        let mut spans = Vec::with_capacity(self.chips.len() * 4);
        let mut rects = Vec::with_capacity(self.chips.len());
        let mut x = area.x;
        for (i, chip) in self.chips.iter().enumerate() {
            let style = if self.selected == Some(i) { active } else { base };
            let width = chip.label().width() as u16 + 2;
            spans.push(Span::styled(" ", style));
            match chip {
                Chip::Word(w) => {
                    let (bold, rest) = highlight(w, prefix);
                    spans.push(Span::styled(bold.to_string(), style.add_modifier(Modifier::BOLD)));
                    spans.push(Span::styled(rest.to_string(), style));
                }
                Chip::Offline => spans.push(Span::styled(OFFLINE_TEXT, style)),
            }
            spans.push(Span::styled(" ", style));
            spans.push(Span::raw(" "));
            rects.push(Rect::new(x, area.y, width, 1).intersection(area));
            x = x.saturating_add(width + 1);
        }
        (Line::from(spans), rects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(words: &[&str], text: &str) -> ChipList {
        let mut l = ChipList::default();
        l.show(Typed::parse(text), words.iter().map(|s| s.to_string()).collect());
        l
    }

    #[test]
    fn highlight_counts_characters() {
        assert_eq!(highlight("apple", "ap"), ("ap", "ple"));
        assert_eq!(highlight("नमस्ते", "नम"), ("नम", "स्ते"));
        assert_eq!(highlight("a", "abc"), ("a", ""));
    }

    #[test]
    fn fresh_list_has_no_selection() {
        let l = list(&["apple", "apply"], "ap");
        assert_eq!(l.selected(), None);
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let mut l = list(&["a1", "a2", "a3"], "a");
        l.select_next();
        assert_eq!(l.selected(), Some(0));
        l.select_prev();
        assert_eq!(l.selected(), Some(2));
        l.select_next();
        assert_eq!(l.selected(), Some(0));

        let mut l = list(&["a1", "a2", "a3"], "a");
        l.select_prev();
        assert_eq!(l.selected(), Some(2));
    }

    #[test]
    fn navigation_on_empty_or_offline_is_noop() {
        let mut l = ChipList::default();
        l.select_next();
        assert_eq!(l.selected(), None);

        l.show_offline();
        l.select_prev();
        assert_eq!(l.selected(), None);
        assert_eq!(l.chips(), &[Chip::Offline]);
    }

    #[test]
    fn enter_without_selection_does_nothing() {
        let mut l = list(&["apple"], "ap");
        assert_eq!(l.apply_selected(), None);
        assert_eq!(l.chips().len(), 1);
    }

    #[test]
    fn applying_rewrites_input_and_clears() {
        let mut l = list(&["apple", "apply"], "I ap");
        l.select_next();
        l.select_next();
        let (word, text) = l.apply_selected().unwrap();
        assert_eq!(word, "apply");
        assert_eq!(text, "I apply ");
        assert!(l.chips().is_empty());
        assert_eq!(l.selected(), None);
    }

    #[test]
    fn offline_chip_cannot_be_applied() {
        let mut l = ChipList::default();
        l.show_offline();
        assert_eq!(l.apply(0), None);
    }

    #[test]
    fn render_bolds_prefix_and_reports_rects() {
        let l = list(&["apple", "apply"], "ap");
        let (line, rects) = l.render(Rect::new(2, 5, 80, 1), Style::default(), Style::default());
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0], Rect::new(2, 5, 7, 1));
        assert_eq!(rects[1].x, 10);
        let bold = &line.spans[1];
        assert_eq!(bold.content, "ap");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(line.spans[2].content, "ple");
    }
}
