// Leaderboard dashboard: three top-N tables, one per script bucket
use std::sync::mpsc::Receiver;
use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::CrosstermBackend, Terminal,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Row, Table},
};

use crate::api_client::StatItem;
use crate::stats::{format_table, Bucket, Leaderboards};
use crate::ui::enter_terminal;

fn table_rows(items: &[StatItem]) -> Vec<Row<'static>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| Row::new(vec![(i + 1).to_string(), item.word.clone(), item.freq.to_string()]))
        .collect()
}

pub fn print_once(boards: &Leaderboards) -> String {
    Bucket::ALL
        .iter()
        .map(|b| format_table(*b, boards.get(*b)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn run_dashboard(rx: Receiver<Leaderboards>) -> anyhow::Result<()> {
    let _terminal_guard = enter_terminal(false)?;
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut boards: Option<Leaderboards> = None;

    loop {
        if let Ok(b) = rx.try_recv() {
            boards = Some(b);
        }

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(5)])
                .split(f.size());

            let title = match &boards {
                None => " word stats · loading…",
                Some(b) if b.is_empty() => " word stats · no data · q to quit",
                Some(_) => " word stats · q to quit",
            };
            f.render_widget(
                Paragraph::new(title).block(Block::default().borders(Borders::ALL)),
                chunks[0],
            );

            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 3); 3])
                .split(chunks[1]);

            for (bucket, area) in Bucket::ALL.iter().zip(columns.iter()) {
                let rows = boards.as_ref().map(|b| table_rows(b.get(*bucket))).unwrap_or_default();
                let table = Table::new(rows, [Constraint::Length(3), Constraint::Min(8), Constraint::Length(6)])
                    .header(
                        Row::new(vec!["#", "word", "freq"])
                            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                    )
                    .block(Block::default().borders(Borders::ALL).title(bucket.title()));
                f.render_widget(table, *area);
            }
        })?;

        if crossterm::event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    break;
                }
            }
        }
    }

    Ok(())
}
