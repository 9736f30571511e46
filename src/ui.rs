use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use puls::engine::{Phase, Snapshot};
use puls::util::{format_countdown, format_elapsed};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Prepare => Color::Yellow,
        Phase::Warmup => Color::Cyan,
        Phase::Work => Color::Red,
        Phase::Rest => Color::Green,
        Phase::Cooldown => Color::Blue,
        Phase::Complete => Color::Magenta,
    }
}

/// Heading above the countdown, e.g. "WORK · round 3/8"
pub fn phase_heading(snapshot: &Snapshot, rounds: usize, warmup: usize, cooldown: usize) -> String {
    let name = snapshot.phase.to_string().to_uppercase();
    match snapshot.phase {
        Phase::Work | Phase::Rest => {
            format!("{name} · round {}/{}", snapshot.step_index + 1, rounds)
        }
        Phase::Warmup => format!("{name} · {}/{}", snapshot.step_index + 1, warmup),
        Phase::Cooldown => format!("{name} · {}/{}", snapshot.step_index + 1, cooldown),
        Phase::Prepare | Phase::Complete => name,
    }
}

fn status_line(snapshot: &Snapshot, started: bool) -> &'static str {
    match (snapshot.phase, snapshot.is_active, snapshot.is_paused) {
        (Phase::Complete, _, _) => "nice work!",
        (_, true, true) => "PAUSED",
        (_, true, false) => "",
        (_, false, _) if started => "STOPPED - press enter to continue",
        (_, false, _) => "press enter to start",
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Session => render_session(self, area, buf),
            AppState::Summary => render_summary(self, area, buf),
        }
    }
}

fn render_session(app: &App, area: Rect, buf: &mut Buffer) {
    let engine = app.driver.engine();
    let snapshot = engine.snapshot();
    let plan = engine.plan();

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let phase_style = Style::default()
        .patch(bold_style)
        .fg(phase_color(snapshot.phase));
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),    // spacer
            Constraint::Length(1), // phase heading
            Constraint::Length(1), // padding
            Constraint::Length(1), // countdown
            Constraint::Length(1), // padding
            Constraint::Length(2), // label
            Constraint::Length(1), // next up
            Constraint::Length(1), // padding
            Constraint::Length(3), // progress gauge
            Constraint::Length(1), // status
            Constraint::Min(0),    // spacer
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        phase_heading(
            &snapshot,
            plan.main_steps().len(),
            plan.warmup().len(),
            plan.cooldown().len(),
        ),
        phase_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let countdown_style = if (1..=3).contains(&snapshot.remaining_seconds) && snapshot.is_active {
        phase_style.add_modifier(Modifier::SLOW_BLINK)
    } else {
        phase_style
    };
    Paragraph::new(Span::styled(
        format_countdown(snapshot.remaining_seconds),
        countdown_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    Paragraph::new(Span::styled(snapshot.label.clone(), bold_style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[5], buf);

    if let Some(next) = engine.next_label() {
        Paragraph::new(Span::styled(format!("Next: {next}"), dim_style))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);
    }

    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("progress"))
        .gauge_style(Style::default().fg(phase_color(snapshot.phase)))
        .ratio(snapshot.progress.clamp(0.0, 1.0))
        .render(chunks[8], buf);

    Paragraph::new(Span::styled(
        status_line(&snapshot, app.started_at.is_some()),
        Style::default().fg(Color::Yellow).patch(bold_style),
    ))
    .alignment(Alignment::Center)
    .render(chunks[9], buf);

    Paragraph::new(Span::styled(
        "(enter) start / (space) pause / (n)ext / (x) stop / (esc)ape",
        italic_style,
    ))
    .render(chunks[11], buf);
}

fn render_summary(app: &App, area: Rect, buf: &mut Buffer) {
    let plan = app.driver.engine().plan();
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // title
            Constraint::Length(1), // padding
            Constraint::Length(3), // stats
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "Workout Complete",
        bold_style.fg(phase_color(Phase::Complete)),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let lines = vec![
        Line::from(format!("time   {}", format_elapsed(app.elapsed_seconds()))),
        Line::from(format!("rounds {}", plan.main_steps().len())),
        Line::from(format!(
            "warmup {} / cooldown {} exercises",
            plan.warmup().len(),
            plan.cooldown().len()
        )),
    ];
    Paragraph::new(lines)
        .style(bold_style)
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    Paragraph::new(Span::styled("(r) new workout / (esc)ape", italic_style))
        .render(chunks[5], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use puls::config::Config;
    use puls::runtime::FixedTicker;
    use ratatui::{buffer::Buffer, layout::Rect};
    use std::sync::mpsc;
    use std::time::Duration;

    fn create_test_app(config: Config) -> App {
        let (tx, _rx) = mpsc::channel();
        App::new(
            Config {
                sound: false,
                ..config
            },
            FixedTicker::new(Duration::from_millis(1000)),
            tx,
            None,
        )
        .unwrap()
    }

    fn rendered(app: &App, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn snapshot(phase: Phase, step_index: usize, is_active: bool, is_paused: bool) -> Snapshot {
        Snapshot {
            phase,
            step_index,
            remaining_seconds: 10,
            label: String::new(),
            progress: 0.0,
            is_active,
            is_paused,
        }
    }

    #[test]
    fn test_ui_session_shows_countdown_and_prompt() {
        let app = create_test_app(Config {
            warmup_exercises: 0,
            ..Config::default()
        });
        let text = rendered(&app, Rect::new(0, 0, 80, 24));

        assert!(text.contains("PREPARE"));
        assert!(text.contains("00:05"));
        assert!(text.contains("Get Ready"));
        assert!(text.contains("press enter to start"));
    }

    #[test]
    fn test_ui_session_shows_pause_state() {
        let mut app = create_test_app(Config::default());
        app.started_at = Some(std::time::Instant::now());
        app.driver.start();
        app.driver.toggle_pause();

        let text = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(text.contains("WARMUP"));
        assert!(text.contains("PAUSED"));
        assert!(text.contains("Next:"));
    }

    #[test]
    fn test_ui_summary() {
        let mut app = create_test_app(Config::default());
        app.state = AppState::Summary;

        let text = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(text.contains("Workout Complete"));
        assert!(text.contains("rounds 8"));
    }

    #[test]
    fn test_ui_small_area() {
        let app = create_test_app(Config::default());
        let area = Rect::new(0, 0, 10, 5);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        assert!(*buffer.area() == area);
    }

    #[test]
    fn test_phase_heading() {
        assert_eq!(
            phase_heading(&snapshot(Phase::Work, 2, true, false), 8, 3, 3),
            "WORK · round 3/8"
        );
        assert_eq!(
            phase_heading(&snapshot(Phase::Warmup, 0, true, false), 8, 3, 2),
            "WARMUP · 1/3"
        );
        assert_eq!(
            phase_heading(&snapshot(Phase::Cooldown, 1, true, false), 8, 3, 2),
            "COOLDOWN · 2/2"
        );
        assert_eq!(
            phase_heading(&snapshot(Phase::Prepare, 0, false, false), 8, 3, 2),
            "PREPARE"
        );
    }

    #[test]
    fn test_status_line() {
        assert_eq!(
            status_line(&snapshot(Phase::Work, 0, false, false), false),
            "press enter to start"
        );
        assert_eq!(
            status_line(&snapshot(Phase::Work, 0, false, false), true),
            "STOPPED - press enter to continue"
        );
        assert_eq!(status_line(&snapshot(Phase::Rest, 0, true, true), true), "PAUSED");
        assert_eq!(status_line(&snapshot(Phase::Rest, 0, true, false), true), "");
        assert_eq!(
            status_line(&snapshot(Phase::Complete, 0, false, false), true),
            "nice work!"
        );
    }

    #[test]
    fn test_ui_constants() {
        assert_eq!(HORIZONTAL_MARGIN, 5);
        assert_eq!(VERTICAL_MARGIN, 2);
    }
}
