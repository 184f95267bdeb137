use std::sync::mpsc::Receiver;
use std::time::Duration;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::{
    backend::CrosstermBackend, Terminal,
    layout::{Layout, Constraint, Direction},
    widgets::{Block, Borders, Paragraph, Clear},
    style::{Style, Color, Modifier},
    text::{Span, Line},
};

use unicode_width::UnicodeWidthStr;

use crate::app::{AutocompleteApp, UiEvent};

/// Runs `restore` once when dropped, so early `?` returns and panics
/// still undo terminal setup.
pub struct RestoreOnDrop<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> Drop for RestoreOnDrop<F> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

/// Raw mode plus alternate screen (and optionally mouse capture) until the
/// returned guard is dropped.
pub fn enter_terminal(mouse: bool) -> anyhow::Result<RestoreOnDrop<impl FnMut()>> {
    crossterm::terminal::enable_raw_mode()?;
    let guard = RestoreOnDrop {
        restore: move || {
            let mut stdout = std::io::stdout();
            if mouse {
                let _ = crossterm::execute!(stdout, DisableMouseCapture);
            }
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show);
            let _ = crossterm::terminal::disable_raw_mode();
        },
    };
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    if mouse {
        crossterm::execute!(stdout, EnableMouseCapture)?;
    }
    Ok(guard)
}

pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub accent: Color,
    pub chip: Style,
    pub chip_active: Style,
}

pub fn palette(dark: bool) -> Palette {
    let accent = Color::Rgb(178, 76, 255);
    if dark {
        Palette {
            fg: Color::Gray,
            bg: Color::Reset,
            accent,
            chip: Style::default().fg(Color::White).bg(Color::DarkGray),
            chip_active: Style::default().fg(Color::White).bg(accent),
        }
    } else {
        Palette {
            fg: Color::Black,
            bg: Color::White,
            accent,
            chip: Style::default().fg(Color::Black).bg(Color::Gray),
            chip_active: Style::default().fg(Color::White).bg(accent),
        }
    }
}

/// Screen columns the cursor sits after the prompt and the typed text.
fn cursor_offset(prompt: &str, input: &str) -> u16 {
    (prompt.width() + input.width()) as u16
}

pub fn run_loop(mut app: AutocompleteApp, rx: Receiver<UiEvent>) -> anyhow::Result<()> {
    let _terminal_guard = enter_terminal(true)?;
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut frame = 0u64;

    while !app.quit {
        // 1) Apply finished fetches
        while let Ok(ev) = rx.try_recv() {
            app.handle_event(ev);
        }

        // 2) Draw
        let mut chip_rects = Vec::new();
        terminal.draw(|f| {
            let pal = palette(app.dark);
            let base = Style::default().fg(pal.fg).bg(pal.bg);
            let size = f.size();
            f.render_widget(Block::default().style(base), size);
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Length(3), Constraint::Min(1)])
                .split(size);

            // Header
            let mut header_spans = vec![
                Span::styled(" ✦ wordchips ", Style::default().fg(pal.accent).add_modifier(Modifier::BOLD)),
                Span::raw("· type, pick, repeat "),
            ];
            if app.is_loading() {
                let spin = ["◐", "◓", "◑", "◒"][(frame as usize / 4) % 4];
                header_spans.push(Span::styled(format!("{spin} loading"), Style::default().fg(Color::DarkGray)));
            }
            let header = Paragraph::new(Line::from(header_spans))
                .style(base)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(header, chunks[0]);

            // Input
            let prompt = "> ";
            let input = Paragraph::new(format!("{prompt}{}", app.input))
                .style(base)
                .block(Block::default().borders(Borders::ALL).title("typed"));
            f.render_widget(Clear, chunks[1]);
            f.render_widget(input, chunks[1]);

            // Chips
            let block = Block::default().borders(Borders::ALL).title("suggestions");
            let inner = block.inner(chunks[2]);
            let (line, rects) = app.chips.render(inner, pal.chip, pal.chip_active);
            chip_rects = rects;
            f.render_widget(Paragraph::new(line).style(base).block(block), chunks[2]);

            // Status
            let status = match &app.glow {
                Some(word) => Line::from(vec![
                    Span::styled(" ✓ ", Style::default().fg(pal.accent).add_modifier(Modifier::BOLD)),
                    Span::styled(word.clone(), Style::default().fg(pal.accent)),
                ]),
                None => Line::from(Span::styled(
                    " ↑/↓ choose · enter/click apply · ctrl+t theme · ctrl+l forget history · esc quit",
                    Style::default().fg(Color::DarkGray),
                )),
            };
            f.render_widget(Paragraph::new(status).style(base), chunks[3]);

            let x = chunks[1].x + 1 + cursor_offset(prompt, &app.input);
            let y = chunks[1].y + 1;
            f.set_cursor(x, y);
        })?;
        app.set_chip_rects(chip_rects);

        frame += 1;

        // 3) Input
        if crossterm::event::poll(Duration::from_millis(33))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(m) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
                    app.handle_click(m.column, m.row)
                }
                _ => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_chip_uses_accent_in_both_themes() {
        for dark in [true, false] {
            let pal = palette(dark);
            assert_eq!(pal.chip_active.bg, Some(pal.accent));
            assert_ne!(pal.chip, pal.chip_active);
        }
    }

    #[test]
    fn restore_runs_when_loop_panics() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let restored = AtomicUsize::new(0);
        let result = std::panic::catch_unwind(|| {
            let _guard = RestoreOnDrop { restore: || { restored.fetch_add(1, Ordering::SeqCst); } };
            panic!("draw failed");
        });
        assert!(result.is_err());
        assert_eq!(restored.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn restore_runs_on_early_error_return() {
        use std::cell::Cell;
        let restored = Cell::new(false);
        let run = || -> anyhow::Result<()> {
            let _guard = RestoreOnDrop { restore: || restored.set(true) };
            anyhow::bail!("poll failed");
        };
        assert!(run().is_err());
        assert!(restored.get());
    }

    #[test]
    fn devanagari_marks_take_no_cursor_columns() {
        // six chars; the virama and the vowel sign take no column
        assert_eq!(cursor_offset("> ", "नमस्ते"), 6);
        assert_eq!(cursor_offset("> ", "apple"), 7);
    }
}
