//! Rendering tests against a ratatui TestBackend.

use std::sync::Arc;

use seances::api::ShowtimesClient;
use seances::app::{App, AppMessage, ScheduleState, Screen, SCHEDULE_ERROR};
use seances::models::Schedule;
use seances::ui;

use ratatui::backend::TestBackend;
use ratatui::Terminal;

fn test_app() -> App {
    App::new(Arc::new(ShowtimesClient::new()))
}

fn render_to_text(app: &mut App) -> String {
    let backend = TestBackend::new(60, 24);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|f| {
            ui::render(f, app);
        })
        .unwrap();

    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                out.push_str(cell.symbol());
            }
        }
        out.push('\n');
    }
    out
}

fn le_champo_schedule() -> Schedule {
    serde_json::from_str(
        r#"{
            "Le Champo": [{
                "title": "Film X",
                "showtimes": [{"start": "18:00", "end": "20:00"}]
            }]
        }"#,
    )
    .unwrap()
}

#[test]
fn test_le_champo_scenario_renders_one_section() {
    let mut app = test_app();
    app.handle_message(AppMessage::ShowtimesLoaded {
        date: app.selected_date,
        schedule: le_champo_schedule(),
    });

    let text = render_to_text(&mut app);
    assert!(text.contains("Le Champo"));
    assert!(text.contains("Film X"));
    assert!(text.contains("18:00 (→ 20:00)"));
    // No other venue section appears
    assert!(!text.contains("Le Louxor"));
}

#[test]
fn test_loading_state_renders_message() {
    let mut app = test_app();
    app.schedule = ScheduleState::Loading;

    let text = render_to_text(&mut app);
    assert!(text.contains("Chargement des horaires..."));
}

#[test]
fn test_failed_state_renders_error_and_retry() {
    let mut app = test_app();
    app.schedule = ScheduleState::Failed(SCHEDULE_ERROR.to_string());

    let text = render_to_text(&mut app);
    assert!(text.contains("Impossible de charger les horaires"));
    assert!(text.contains("Réessayer (r)"));
}

#[test]
fn test_date_picker_renders_seven_days() {
    let mut app = test_app();
    app.open_date_picker();
    assert_eq!(app.screen, Screen::DatePicker);

    let text = render_to_text(&mut app);
    for date in app.pickable_dates() {
        assert!(
            text.contains(&ui::format_date_fr(date)),
            "missing picker row for {}",
            date
        );
    }
}

#[test]
fn test_cinema_selector_renders_catalog() {
    let mut app = test_app();
    app.cinemas = vec!["Le Champo".to_string(), "Max Linder Panorama".to_string()];
    app.open_cinema_selector();

    let text = render_to_text(&mut app);
    assert!(text.contains("Le Champo"));
    assert!(text.contains("Max Linder Panorama"));
}

#[test]
fn test_cinema_selector_with_empty_catalog_renders_no_rows() {
    let mut app = test_app();
    app.open_cinema_selector();

    let text = render_to_text(&mut app);
    // Header and hints only; no venue rows and no error message
    assert!(text.contains("Séance(s)"));
    assert!(!text.contains("Impossible"));
    for cinema in &app.selected_cinemas {
        assert!(!text.contains(cinema.as_str()));
    }
}

#[test]
fn test_expanded_film_shows_metadata() {
    let mut app = test_app();
    let schedule: Schedule = serde_json::from_str(
        r#"{
            "Le Champo": [{
                "title": "Film X",
                "director": "Director Y",
                "duration": "1h 40min",
                "genres": ["Drame"],
                "release_date": "1999-06-02",
                "actors": ["Actor Z"],
                "poster_url": "https://example.com/x.jpg",
                "showtimes": [{"start": "18:00", "end": "20:00"}]
            }]
        }"#,
    )
    .unwrap();
    app.handle_message(AppMessage::ShowtimesLoaded {
        date: app.selected_date,
        schedule,
    });

    // Compact view hides extended metadata
    let text = render_to_text(&mut app);
    assert!(!text.contains("Drame"));
    assert!(!text.contains("Avec :"));

    app.toggle_expansion();
    let text = render_to_text(&mut app);
    assert!(text.contains("Drame"));
    assert!(text.contains("1999"));
    assert!(text.contains("Avec :"));
    assert!(text.contains("Actor Z"));
    assert!(text.contains("https://example.com/x.jpg"));
}
