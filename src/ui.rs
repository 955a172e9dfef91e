//! UI rendering for the Séance(s) screens.
//!
//! Render is a function of the loaded data and the view state:
//! - Main: venue sections with film rows for the selected date
//! - DatePicker: the 7-day picker, rendered between header and list
//! - CinemaSelector: full-screen venue selection list

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, FilmKey, ScheduleState, Screen};
use crate::models::{Film, Showtime};

/// Accent color, the PWA's signature lime (#c1ff00)
pub const COLOR_ACCENT: Color = Color::Rgb(0xc1, 0xff, 0x00);

/// Dim text for secondary info
pub const COLOR_DIM: Color = Color::DarkGray;

/// Error text color
pub const COLOR_ERROR: Color = Color::Red;

/// French month names, indexed by `month0`
const MONTHS_FR: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Format a date the way the PWA header does: "15 mars".
pub fn format_date_fr(date: chrono::NaiveDate) -> String {
    use chrono::Datelike;
    format!("{} {}", date.day(), MONTHS_FR[date.month0() as usize])
}

/// Format one screening slot: "18:00 (→ 20:00)".
pub fn format_showtime(showtime: &Showtime) -> String {
    format!("{} (→ {})", showtime.start, showtime.end)
}

/// Render the application to the frame.
pub fn render(f: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::CinemaSelector => render_cinema_selector(f, app),
        Screen::Main | Screen::DatePicker => render_main(f, app),
    }
}

fn header_line(app: &App) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            "Séance(s)",
            Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  ·  "),
        Span::styled(
            format_date_fr(app.selected_date),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])
}

fn render_main(f: &mut Frame, app: &mut App) {
    let picker_height = if app.screen == Screen::DatePicker { 7 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(picker_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(Paragraph::new(header_line(app)), chunks[0]);

    if app.screen == Screen::DatePicker {
        render_date_picker(f, app, chunks[1]);
    }

    render_schedule(f, app, chunks[2]);

    let hints = match app.screen {
        Screen::DatePicker => "↑/↓: naviguer  Entrée: choisir  Échap: fermer",
        _ => "d: date  c: cinémas  ↑/↓: films  Entrée: détails  q: quitter",
    };
    f.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(COLOR_DIM))),
        chunks[3],
    );
}

fn render_date_picker(f: &mut Frame, app: &App, area: Rect) {
    let selected = app.selected_date;
    let lines: Vec<Line> = app
        .pickable_dates()
        .iter()
        .enumerate()
        .map(|(idx, date)| {
            let mut style = Style::default();
            if *date == selected {
                style = style.fg(Color::Black).bg(COLOR_ACCENT);
            }
            if idx == app.date_index {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(format!("  {}", format_date_fr(*date)), style))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn render_schedule(f: &mut Frame, app: &mut App, area: Rect) {
    match &app.schedule {
        ScheduleState::Idle => {}
        ScheduleState::Loading => {
            let lines = vec![
                Line::raw(""),
                Line::from(Span::raw("Chargement des horaires...")),
                Line::from(Span::styled(
                    "Cela peut prendre 20-30 secondes",
                    Style::default().fg(COLOR_DIM),
                )),
            ];
            f.render_widget(
                Paragraph::new(lines).alignment(Alignment::Center),
                area,
            );
        }
        ScheduleState::Failed(message) => {
            let lines = vec![
                Line::raw(""),
                Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(COLOR_ERROR),
                )),
                Line::raw(""),
                Line::from(Span::styled(
                    "Réessayer (r)",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
            ];
            f.render_widget(
                Paragraph::new(lines).alignment(Alignment::Center),
                area,
            );
        }
        ScheduleState::Loaded(_) => {
            let (lines, cursor_line) = schedule_lines(app);

            // Keep the cursor row inside the viewport, then clamp the
            // manual scroll offset to the content height.
            let height = area.height as usize;
            if let Some(cursor_line) = cursor_line {
                if cursor_line < app.scroll as usize {
                    app.scroll = cursor_line as u16;
                } else if height > 0 && cursor_line >= app.scroll as usize + height {
                    app.scroll = (cursor_line + 1 - height) as u16;
                }
            }
            app.max_scroll = lines.len().saturating_sub(height) as u16;
            app.scroll = app.scroll.min(app.max_scroll);

            f.render_widget(Paragraph::new(lines).scroll((app.scroll, 0)), area);
        }
    }
}

/// Build the full film list as lines, returning the line index of the
/// cursor row so the caller can keep it visible.
fn schedule_lines(app: &App) -> (Vec<Line<'static>>, Option<usize>) {
    let ScheduleState::Loaded(schedule) = &app.schedule else {
        return (Vec::new(), None);
    };

    let mut lines = Vec::new();
    let mut cursor_line = None;
    let mut row = 0usize;

    for cinema in app.visible_cinemas() {
        lines.push(Line::from(Span::styled(
            cinema.to_string(),
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )));

        for (index, film) in schedule[cinema].iter().enumerate() {
            let key = FilmKey {
                cinema: cinema.to_string(),
                index,
            };
            let is_cursor = row == app.film_cursor;
            let is_expanded = app.expanded_film.as_ref() == Some(&key);
            if is_cursor {
                cursor_line = Some(lines.len());
            }
            film_lines(&mut lines, film, is_cursor, is_expanded);
            row += 1;
        }
        lines.push(Line::raw(""));
    }

    (lines, cursor_line)
}

/// Append the lines for one film row, compact or expanded.
fn film_lines(lines: &mut Vec<Line<'static>>, film: &Film, is_cursor: bool, is_expanded: bool) {
    let marker = if is_expanded { "- " } else { "+ " };
    let mut title_style = Style::default();
    if is_cursor {
        title_style = title_style.add_modifier(Modifier::REVERSED);
    }
    lines.push(Line::from(Span::styled(
        format!("{}{}", marker, film.title),
        title_style,
    )));

    if !film.director.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", film.director),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }

    if is_expanded {
        for genre in &film.genres {
            lines.push(Line::from(Span::raw(format!("  {}", genre))));
        }
    }

    if !film.duration.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", film.duration),
            Style::default().fg(COLOR_DIM),
        )));
    }

    if is_expanded {
        if let Some(year) = film.release_year() {
            lines.push(Line::from(Span::raw(format!("  {}", year))));
        }
        if !film.actors.is_empty() {
            lines.push(Line::from(Span::raw("  Avec :")));
            for actor in film.actors.iter().take(5) {
                lines.push(Line::from(Span::raw(format!("    {}", actor))));
            }
        }
        if let Some(poster) = &film.poster_url {
            lines.push(Line::from(Span::styled(
                format!("  {}", poster),
                Style::default().fg(COLOR_DIM),
            )));
        }
    }

    for showtime in &film.showtimes {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                showtime.start.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" (→ {})", showtime.end)),
        ]));
    }
}

fn render_cinema_selector(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(Paragraph::new(header_line(app)), chunks[0]);

    // An empty catalog (failed or pending fetch) simply renders no rows.
    let lines: Vec<Line> = app
        .cinemas
        .iter()
        .enumerate()
        .map(|(idx, cinema)| {
            let is_selected = app.selected_cinemas.iter().any(|c| c == cinema);
            let mut style = Style::default();
            if is_selected {
                style = style.fg(Color::Black).bg(COLOR_ACCENT);
            }
            if idx == app.cinema_index {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let mark = if is_selected { "●" } else { "○" };
            Line::from(Span::styled(format!(" {} {}", mark, cinema), style))
        })
        .collect();
    let height = chunks[1].height as usize;
    let offset = app.cinema_index.saturating_sub(height.saturating_sub(1)) as u16;
    f.render_widget(Paragraph::new(lines).scroll((offset, 0)), chunks[1]);

    f.render_widget(
        Paragraph::new(Span::styled(
            "↑/↓: naviguer  Entrée: sélectionner  Échap: retour",
            Style::default().fg(COLOR_DIM),
        )),
        chunks[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_date_fr() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(format_date_fr(date), "15 mars");

        let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        assert_eq!(format_date_fr(date), "1 août");
    }

    #[test]
    fn test_format_showtime() {
        let showtime = Showtime {
            start: "18:00".to_string(),
            end: "20:00".to_string(),
        };
        assert_eq!(format_showtime(&showtime), "18:00 (→ 20:00)");
    }

    #[test]
    fn test_film_lines_compact_hides_extended_metadata() {
        let film: Film = serde_json::from_str(
            r#"{
                "title": "Film X",
                "director": "Director Y",
                "duration": "1h 40min",
                "genres": ["Drame"],
                "release_date": "1999-06-02",
                "actors": ["Actor Z"],
                "poster_url": "https://example.com/x.jpg",
                "showtimes": [{"start": "18:00", "end": "20:00"}]
            }"#,
        )
        .unwrap();

        let mut compact = Vec::new();
        film_lines(&mut compact, &film, false, false);
        let text: Vec<String> = compact.iter().map(|l| l.to_string()).collect();
        assert!(text.iter().any(|l| l.contains("Film X")));
        assert!(text.iter().any(|l| l.contains("18:00 (→ 20:00)")));
        assert!(!text.iter().any(|l| l.contains("Drame")));
        assert!(!text.iter().any(|l| l.contains("1999")));

        let mut expanded = Vec::new();
        film_lines(&mut expanded, &film, false, true);
        let text: Vec<String> = expanded.iter().map(|l| l.to_string()).collect();
        assert!(text.iter().any(|l| l.contains("Drame")));
        assert!(text.iter().any(|l| l.contains("1999")));
        assert!(text.iter().any(|l| l.contains("Avec :")));
        assert!(text.iter().any(|l| l.contains("https://example.com/x.jpg")));
    }

    #[test]
    fn test_film_lines_caps_actors_at_five() {
        let film = Film {
            title: "Film X".to_string(),
            director: String::new(),
            duration: String::new(),
            genres: Vec::new(),
            release_date: None,
            actors: (1..=8).map(|i| format!("Actor {}", i)).collect(),
            poster_url: None,
            showtimes: Vec::new(),
        };

        let mut lines = Vec::new();
        film_lines(&mut lines, &film, false, true);
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert!(text.iter().any(|l| l.contains("Actor 5")));
        assert!(!text.iter().any(|l| l.contains("Actor 6")));
    }
}
