//! Lane widget - visible objects between the despawn and spawn edges

use std::collections::BTreeMap;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use beatsync::timeline::EntryClass;

use crate::app::App;

const LABEL_WIDTH: u16 = 8;

fn class_order(class: EntryClass) -> u8 {
    match class {
        EntryClass::TempoChange => 0,
        EntryClass::Event => 1,
        EntryClass::Note => 2,
    }
}

fn row_label(class: EntryClass, column: i32, propagation: bool) -> String {
    match class {
        EntryClass::Note => format!("lane {}", column),
        EntryClass::Event if propagation => format!("prop {}", column),
        EntryClass::Event => format!("evt {}", column),
        EntryClass::TempoChange => "tempo".to_string(),
    }
}

/// Render one row per occupied grid column, with the playhead underneath
pub fn render_timeline(frame: &mut Frame, area: Rect, app: &App) {
    if area.height < 2 || area.width < 20 {
        return;
    }

    let beat = app.engine.beat();
    let start = beat + app.window.despawn_offset();
    let span = app.window.spawn_offset() - app.window.despawn_offset();
    let width = area.width.saturating_sub(LABEL_WIDTH + 2) as usize;
    let column_of = |time: f64| -> Option<usize> {
        if span <= 0.0 {
            return None;
        }
        let column = ((time - start) / span * width as f64).floor();
        (column >= 0.0 && (column as usize) < width).then_some(column as usize)
    };

    let container = app.objects.borrow();
    let propagation = container.propagation_editing();
    let mut rows: BTreeMap<(u8, i32), Vec<usize>> = BTreeMap::new();
    for (object, entry) in container.objects().iter().zip(app.engine.timeline()) {
        if !object.active || object.alpha == Some(0.0) {
            continue;
        }
        let key = (class_order(entry.class()), object.position.x.floor() as i32);
        if let Some(column) = column_of(entry.time) {
            rows.entry(key).or_default().push(column);
        }
    }

    let mut lines = Vec::new();

    // Beat markers row, bar numbers on downbeats
    let mut markers = vec![' '; width];
    for whole in start.ceil() as i64..=(start + span).floor() as i64 {
        let Some(column) = column_of(whole as f64) else {
            continue;
        };
        markers[column] = '|';
        if whole.rem_euclid(4) == 0 {
            for (offset, digit) in (whole / 4 + 1).to_string().chars().enumerate() {
                if let Some(slot) = markers.get_mut(column + 1 + offset) {
                    *slot = digit;
                }
            }
        }
    }
    lines.push(Line::from(Span::styled(
        format!("{}{}", " ".repeat(LABEL_WIDTH as usize), markers.iter().collect::<String>()),
        Style::default().fg(Color::DarkGray),
    )));

    for ((order, column), hits) in rows.iter().take(area.height.saturating_sub(2) as usize) {
        let class = match order {
            0 => EntryClass::TempoChange,
            1 => EntryClass::Event,
            _ => EntryClass::Note,
        };
        let mut cells = vec!['░'; width];
        for &hit in hits {
            cells[hit] = '▓';
        }
        let color = match class {
            EntryClass::Note => Color::Cyan,
            EntryClass::Event => Color::Magenta,
            EntryClass::TempoChange => Color::Yellow,
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:width$.width$}", row_label(class, *column, propagation), width = LABEL_WIDTH as usize),
                Style::default().fg(Color::White),
            ),
            Span::styled(cells.into_iter().collect::<String>(), Style::default().fg(color)),
        ]));
    }

    // Playhead row
    let mut playhead = vec![' '; width];
    if let Some(column) = column_of(beat) {
        playhead[column] = '▲';
    }
    lines.push(Line::from(Span::styled(
        format!("{}{}", " ".repeat(LABEL_WIDTH as usize), playhead.iter().collect::<String>()),
        Style::default().fg(Color::Yellow),
    )));

    frame.render_widget(Paragraph::new(lines), area);
}
