use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::session::{Session, WordState};
use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.session {
            None => render_loading(area, buf),
            Some(session) if !session.has_finished() => render_typing(session, area, buf),
            Some(session) => render_results(session, area, buf),
        }
    }
}

/// Shown until a word list arrives. A failed load keeps us here.
fn render_loading(area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let message = Paragraph::new(Span::styled(
        "Loading word list...",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    message.render(chunks[1], buf);
}

fn render_typing(session: &Session, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // language + countdown
            Constraint::Length(1),
            Constraint::Length(2), // active line + lookahead line
            Constraint::Length(1),
            Constraint::Length(1), // input buffer echo
            Constraint::Length(1),
            Constraint::Length(1), // idle hint
            Constraint::Min(0),
        ])
        .split(area);

    let header = Paragraph::new(Span::styled(
        format!("{}   {}s", session.config.language, session.time_remaining),
        dim_bold_style,
    ))
    .alignment(Alignment::Center);
    header.render(chunks[1], buf);

    let words = Paragraph::new(visible_lines(session)).alignment(Alignment::Center);
    words.render(chunks[3], buf);

    let input = Paragraph::new(Line::from(vec![
        Span::styled(echo_buffer(session, chunks[5].width), bold_style),
        Span::styled("█", dim_bold_style),
    ]))
    .alignment(Alignment::Center);
    input.render(chunks[5], buf);

    if !session.has_started() {
        let hint = Paragraph::new(Span::styled(
            "type to start the clock",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        hint.render(chunks[7], buf);
    }
}

/// The line holding the cursor plus one lookahead line, styled per word.
fn visible_lines(session: &Session) -> Vec<Line<'_>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let (start, _) = session.line_bounds();
    let window = session
        .words
        .iter()
        .enumerate()
        .skip(start)
        .take(session.config.words_per_line * 2);

    let mut lines = Vec::with_capacity(2);
    let rows = window.chunks(session.config.words_per_line);
    for chunk in &rows {
        let mut spans: Vec<Span> = vec![];
        for (idx, word) in chunk {
            let style = match session.word_states[idx] {
                WordState::Current => Style::default()
                    .patch(bold_style)
                    .fg(Color::Black)
                    .bg(Color::Yellow),
                WordState::Correct => Style::default().patch(bold_style).fg(Color::Green),
                WordState::Incorrect => Style::default().patch(bold_style).fg(Color::Red),
                WordState::Upcoming => Style::default().add_modifier(Modifier::DIM),
            };
            if !spans.is_empty() {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(word.as_str(), style));
        }
        lines.push(Line::from(spans));
    }
    lines
}

/// The buffer tail that fits the row, so long garbage stays visible.
fn echo_buffer(session: &Session, width: u16) -> String {
    let avail = (width as usize).saturating_sub(2);
    let buffer = session.input_buffer.as_str();
    if buffer.width() <= avail {
        return buffer.to_string();
    }
    let mut tail: String = buffer.chars().rev().take(avail).collect();
    tail = tail.chars().rev().collect();
    tail
}

fn render_results(session: &Session, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // wpm chart
            Constraint::Length(1), // headline figures
            Constraint::Length(1), // word counts
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (overall_duration, highest_wpm) = chart_bounds(session);

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&session.wpm_coords)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([1.0, overall_duration])
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(format!("{overall_duration:.0}"), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(format!("{highest_wpm:.0}"), bold_style),
                ]),
        );

    chart.render(chunks[0], buf);

    let headline = Paragraph::new(Span::styled(
        format!(
            "{} wpm   {:.2}% acc   {:.2} sd",
            session.wpm(),
            session.accuracy(),
            session.std_dev
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    headline.render(chunks[1], buf);

    let counts = Paragraph::new(Span::styled(
        format!(
            "{} words typed   {} mistakes",
            session.typed_count, session.mistake_count
        ),
        Style::default().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center);
    counts.render(chunks[2], buf);

    let legend = Paragraph::new(Span::styled(
        "(r)estart  (l)anguage  (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    legend.render(chunks[4], buf);
}

fn chart_bounds(session: &Session) -> (f64, f64) {
    let overall_duration = session
        .wpm_coords
        .last()
        .map(|(t, _)| *t)
        .unwrap_or(1.0)
        .max(1.0);
    let highest_wpm = session
        .wpm_coords
        .iter()
        .map(|(_, wpm)| *wpm)
        .fold(10.0_f64, f64::max);
    (overall_duration, highest_wpm.ceil())
}
