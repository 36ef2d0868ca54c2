//! Dot-matrix style rendering of the board state.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Row, Table};

use crate::board::{BoardState, RefreshPhase, Section};

/// Row and header text.
pub const AMBER: Color = Color::Rgb(0xFF, 0xD1, 0x00);

/// Column headings and footer.
pub const GREEN: Color = Color::Rgb(0x7C, 0xFC, 0x00);

pub const BACKGROUND: Color = Color::Black;

/// Header line, gap, column headings, three rows, gap.
const SECTION_HEIGHT: u16 = 7;

/// Minimum blank columns between the footer status and the key hints.
const FOOTER_GAP: u16 = 2;

const COLUMN_HEADINGS: [&str; 3] = ["DUE", "TIME", "DESTINATION"];

fn amber() -> Style {
    Style::new().fg(AMBER).bg(BACKGROUND).add_modifier(Modifier::BOLD)
}

fn green() -> Style {
    Style::new().fg(GREEN).bg(BACKGROUND)
}

/// Draw the whole board into `frame`.
pub fn draw(frame: &mut Frame, state: &BoardState) {
    let area = frame.area();
    frame.render_widget(Block::new().style(Style::new().bg(BACKGROUND)), area);

    let [body, footer] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area.inner(Margin::new(2, 1)));

    let sections = state.visible();
    let areas = Layout::vertical(vec![Constraint::Length(SECTION_HEIGHT); sections.len()]).split(body);
    for (section, area) in sections.iter().zip(areas.iter()) {
        draw_section(frame, section, *area);
    }

    draw_footer(frame, state, footer);
}

fn draw_section(frame: &mut Frame, section: &Section, area: Rect) {
    let [header, table] =
        Layout::vertical([Constraint::Length(2), Constraint::Length(4)]).areas(area);

    let route = section.route();
    let mut title = vec![
        Span::styled(route.title.as_str(), amber()),
        Span::styled("   ", amber()),
        Span::styled(route.subtitle.as_str(), amber()),
    ];
    if section.phase() == RefreshPhase::Fetching {
        title.push(Span::styled("  ·", green()));
    }
    frame.render_widget(Paragraph::new(Line::from(title)), header);

    let rows = section.slots().iter().map(|slot| {
        Row::new([
            slot.eta.as_str(),
            slot.time.as_str(),
            slot.destination.as_str(),
        ])
        .style(amber())
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Fill(1),
    ];

    let table_widget = Table::new(rows, widths)
        .header(Row::new(COLUMN_HEADINGS).style(green().add_modifier(Modifier::BOLD)))
        .column_spacing(3);
    frame.render_widget(table_widget, table);
}

fn draw_footer(frame: &mut Frame, state: &BoardState, area: Rect) {
    let status = Line::from(state.footer());

    let mut keys = Vec::new();
    if let Some(hint) = state.toggle_hint() {
        keys.push(hint);
    }
    keys.push("[Q] Quit".to_string());
    let keys = Line::from(keys.join("  "));

    // The status text keeps its full width; the key hints get what is left.
    let status_width = u16::try_from(status.width()).unwrap_or(u16::MAX);
    let keys_width = u16::try_from(keys.width())
        .unwrap_or(u16::MAX)
        .min(area.width.saturating_sub(status_width + FOOTER_GAP));

    let [status_area, keys_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(keys_width)])
            .spacing(FOOTER_GAP)
            .areas(area);

    frame.render_widget(
        Paragraph::new(status).style(green()).alignment(Alignment::Center),
        status_area,
    );
    frame.render_widget(
        Paragraph::new(keys).style(green()).alignment(Alignment::Right),
        keys_area,
    );
}
