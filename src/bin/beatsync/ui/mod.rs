//! TUI for beatsync
//!
//! Draws the transport bar and the lanes of currently visible objects.

mod timeline;
mod transport;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::app::App;

use timeline::render_timeline;
use transport::render_transport;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport bar
            Constraint::Min(6),    // Lanes
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_transport(frame, chunks[0], app);

    let title = if app.objects.borrow().propagation_editing() {
        " Lanes (propagation) "
    } else {
        " Lanes "
    };
    let timeline_block = Block::default().title(title).borders(Borders::ALL);
    let timeline_inner = timeline_block.inner(chunks[1]);
    frame.render_widget(timeline_block, chunks[1]);
    render_timeline(frame, timeline_inner, app);

    let help = Paragraph::new(" [Q] Quit  [Space] Play/Pause  [←/→] Seek  [R] Rewind  [P] Propagation  [N] Note")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);
}
