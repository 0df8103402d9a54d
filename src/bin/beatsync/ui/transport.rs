//! Transport bar widget - shows effective BPM, play state, position and counters

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use beatsync::playback::PlaybackClock;

use crate::app::App;

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title(" beatsync ").borders(Borders::ALL);

    let beat = app.engine.beat().max(0.0);
    // Assuming 4/4 time
    let current_bar = (beat / 4.0).floor() as u64 + 1;
    let current_beat = (beat % 4.0).floor() as u64 + 1;

    let playing = app.clock.is_playing();
    let play_symbol = if playing { "▶" } else { "⏸" };
    let play_state_str = if playing { "Playing" } else { "Paused" };

    let container = app.objects.borrow();
    let bpm = container
        .effective_bpm()
        .unwrap_or_else(|| app.engine.effective_bpm());

    let line = Line::from(vec![
        Span::styled(format!(" BPM: {:.1}  ", bpm), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state_str),
            Style::default().fg(if playing { Color::Green } else { Color::Yellow }),
        ),
        Span::styled(
            format!("Bar {} | Beat {}  ", current_bar, current_beat),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:.2}s  ", app.clock.current_seconds()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("{}  ", app.clock_source()), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!(
                "Visible: {}  Notes: {}  Tempo: {}  Resyncs: {}",
                container.active_indices().count(),
                app.stats.notes_passed,
                app.stats.tempo_changes,
                app.stats.resyncs
            ),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
