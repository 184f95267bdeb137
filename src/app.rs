// Autocomplete widget state and event handling
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::api_client::WordApi;
use crate::chips::ChipList;
use crate::fetcher::{fetch_suggestions, Debouncer, FetchOutcome, LoadingIndicator, RequestSeq};
use crate::history::HistoryStore;
use crate::suggest::merge;

pub enum UiEvent {
    Fetched { seq: u64, outcome: FetchOutcome },
}

pub struct AutocompleteApp {
    pub input: String,
    pub chips: ChipList,
    /// Last applied word, shown as a confirmation flash.
    pub glow: Option<String>,
    pub dark: bool,
    pub quit: bool,
    history: HistoryStore,
    api: Arc<dyn WordApi>,
    loading: LoadingIndicator,
    debouncer: Debouncer,
    seq: RequestSeq,
    applied_seq: u64,
    max_chips: usize,
    chip_rects: Vec<Rect>,
    rt: Handle,
    tx: Sender<UiEvent>,
}

impl AutocompleteApp {
    pub fn new(
        api: Arc<dyn WordApi>,
        history: HistoryStore,
        rt: Handle,
        debounce: Duration,
        max_chips: usize,
        tx: Sender<UiEvent>,
    ) -> Self {
        Self {
            input: String::new(),
            chips: ChipList::default(),
            glow: None,
            dark: true,
            quit: false,
            history,
            api,
            loading: LoadingIndicator::default(),
            debouncer: Debouncer::new(debounce, rt.clone()),
            seq: RequestSeq::default(),
            applied_seq: 0,
            max_chips,
            chip_rects: Vec::new(),
            rt,
            tx,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_visible()
    }

    pub fn set_chip_rects(&mut self, rects: Vec<Rect>) {
        self.chip_rects = rects;
    }

    fn input_changed(&mut self) {
        self.glow = None;
        let seq = self.seq.issue();
        let api = self.api.clone();
        let loading = self.loading.clone();
        let tx = self.tx.clone();
        let text = self.input.clone();
        let limit = self.max_chips;
        self.debouncer.schedule(async move {
            let outcome = fetch_suggestions(api.as_ref(), &text, &loading, limit).await;
            let _ = tx.send(UiEvent::Fetched { seq, outcome });
        });
    }

    pub fn handle_event(&mut self, ev: UiEvent) {
        match ev {
            UiEvent::Fetched { seq, outcome } => {
                if seq <= self.applied_seq {
                    debug!(seq, applied = self.applied_seq, "discarding stale suggestions");
                    return;
                }
                self.applied_seq = seq;
                match outcome {
                    FetchOutcome::Cleared => self.chips.clear(),
                    FetchOutcome::Suggestions { typed, words } => {
                        let local = self.history.matches(&typed.prefix);
                        let merged = merge(local, &words, self.max_chips);
                        self.chips.show(typed, merged);
                    }
                    FetchOutcome::Offline => self.chips.show_offline(),
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // AltGr arrives as Ctrl+Alt; those keys are text, not shortcuts
        let shortcut = key.modifiers.contains(KeyModifiers::CONTROL) && !key.modifiers.contains(KeyModifiers::ALT);
        if shortcut {
            match key.code {
                KeyCode::Char('c') => self.quit = true,
                KeyCode::Char('t') => self.dark = !self.dark,
                KeyCode::Char('l') => {
                    if let Err(e) = self.history.clear() {
                        warn!(error = %e, "failed to clear history");
                    }
                }
                _ => {}
            }
            return;
        }
        match key.code {
            KeyCode::Char(c) => {
                self.input.push(c);
                self.input_changed();
            }
            KeyCode::Backspace => {
                if self.input.pop().is_some() {
                    self.input_changed();
                }
            }
            KeyCode::Down => self.chips.select_next(),
            KeyCode::Up => self.chips.select_prev(),
            KeyCode::Enter => {
                if let Some((word, text)) = self.chips.apply_selected() {
                    self.apply(word, text);
                }
            }
            KeyCode::Esc => self.quit = true,
            _ => {}
        }
    }

    pub fn handle_click(&mut self, column: u16, row: u16) {
        let hit = |r: &Rect| column >= r.x && column < r.right() && row >= r.y && row < r.bottom();
        let Some(index) = self.chip_rects.iter().position(hit) else { return };
        if let Some((word, text)) = self.chips.apply(index) {
            self.apply(word, text);
        }
    }

    fn apply(&mut self, word: String, text: String) {
        info!(word = %word, "suggestion applied");
        self.input = text;
        self.chip_rects.clear();
        if let Err(e) = self.history.add(&word) {
            warn!(error = %e, "failed to save history");
        }

        let api = self.api.clone();
        let notified = word.clone();
        self.rt.spawn(async move {
            if let Err(e) = api.select(&notified).await {
                debug!(word = %notified, error = %e, "selection notify failed");
            }
        });
        self.glow = Some(word);
    }
}
