use super::*;
use crossterm::event::{KeyEventKind, KeyEventState};
use ratatui::{backend::TestBackend, Terminal};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

fn line_text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

fn free_status(opt_in: Option<bool>) -> SyncStatus {
    SyncStatus {
        is_free_tier: true,
        data_collection_opt_in: opt_in,
        last_synced_at: Some("2026-01-01T00:00:00+00:00".to_string()),
        ..SyncStatus::default()
    }
}

fn paid_status() -> SyncStatus {
    SyncStatus {
        last_synced_at: Some("2026-01-01T00:00:00+00:00".to_string()),
        ..SyncStatus::default()
    }
}

#[test]
fn test_notice_lists_numbered_links_with_colors() {
    let lines = build_notice_lines();
    let links: Vec<&Line> = lines.iter().rev().take(4).collect();

    for (offset, line) in links.iter().rev().enumerate() {
        let (url, color) = NOTICE_LINKS[offset];
        assert_eq!(line_text(line), format!("[{}] {}", offset + 1, url));
        assert_eq!(line.spans[0].style.fg, Some(color));
    }
    assert_eq!(line_text(&lines[0]), NOTICE_TITLE);
}

#[test]
fn test_notice_body_references_all_markers() {
    let lines = build_notice_lines();
    let body = line_text(&lines[2]);
    for n in 1..=4 {
        assert!(body.contains(&format!("[{}]", n)), "missing marker {}", n);
    }
    assert!(body.contains("Gemini API Additional Terms of Service"));
}

#[test]
fn test_consent_panel_shows_loading() {
    let screen = NoticeScreen::new(SyncStatus {
        is_loading: true,
        ..free_status(Some(true))
    });
    let lines = build_consent_lines(&screen);
    assert_eq!(lines.len(), 1);
    assert_eq!(line_text(&lines[0]), "Loading...");
}

#[test]
fn test_consent_panel_shows_error_in_red() {
    let screen = NoticeScreen::new(SyncStatus {
        error: Some("no current tier".to_string()),
        ..SyncStatus::default()
    });
    let lines = build_consent_lines(&screen);
    assert_eq!(line_text(&lines[0]), "Error: no current tier");
    assert_eq!(lines[0].spans[0].style.fg, Some(Color::Red));
    assert_eq!(lines.len(), 1);
}

#[test]
fn test_consent_panel_not_applicable_for_paid_tier() {
    let screen = NoticeScreen::new(paid_status());
    let text: Vec<String> = build_consent_lines(&screen).iter().map(line_text).collect();
    assert!(text[0].contains("not applicable"));
}

#[test]
fn test_consent_panel_shows_current_choice_and_selector() {
    let screen = NoticeScreen::new(free_status(Some(false)));
    let text: Vec<String> = build_consent_lines(&screen).iter().map(line_text).collect();

    assert!(text[0].ends_with(": No"));
    assert_eq!(text[2], "  Yes    > No <");
    assert!(text[3].starts_with("Last synced: 2026-01-01"));
}

#[test]
fn test_unknown_preference_keeps_selector() {
    let mut screen = NoticeScreen::new(free_status(Some(true)));
    screen.apply_status(free_status(None));
    assert!(screen.selected);
    let text: Vec<String> = build_consent_lines(&screen).iter().map(line_text).collect();
    assert!(text[0].ends_with(": Unknown"));
}

#[test]
fn test_keys_dismiss_and_refresh() {
    let mut screen = NoticeScreen::new(paid_status());
    assert_eq!(screen.handle_key(key(KeyCode::Esc)), NoticeAction::Dismiss);
    assert_eq!(screen.handle_key(key(KeyCode::Char('q'))), NoticeAction::Dismiss);
    assert_eq!(screen.handle_key(key(KeyCode::Char('r'))), NoticeAction::Refresh);

    let ctrl_c = KeyEvent {
        modifiers: KeyModifiers::CONTROL,
        ..key(KeyCode::Char('c'))
    };
    assert_eq!(screen.handle_key(ctrl_c), NoticeAction::Dismiss);
}

#[test]
fn test_update_keys_ignored_for_paid_tier() {
    let mut screen = NoticeScreen::new(paid_status());
    assert_eq!(screen.handle_key(key(KeyCode::Char('y'))), NoticeAction::None);
    assert_eq!(screen.handle_key(key(KeyCode::Enter)), NoticeAction::None);
    assert_eq!(screen.handle_key(key(KeyCode::Left)), NoticeAction::None);
}

#[test]
fn test_update_keys_ignored_while_loading() {
    let mut screen = NoticeScreen::new(SyncStatus {
        is_loading: true,
        ..free_status(Some(true))
    });
    assert_eq!(screen.handle_key(key(KeyCode::Char('n'))), NoticeAction::None);
}

#[test]
fn test_free_tier_yes_no_and_selector() {
    let mut screen = NoticeScreen::new(free_status(Some(true)));

    assert_eq!(
        screen.handle_key(key(KeyCode::Char('n'))),
        NoticeAction::Update(false)
    );
    assert!(!screen.selected);

    assert_eq!(screen.handle_key(key(KeyCode::Right)), NoticeAction::None);
    assert!(screen.selected);
    assert_eq!(
        screen.handle_key(key(KeyCode::Enter)),
        NoticeAction::Update(true)
    );
}

#[test]
fn test_draw_renders_notice_and_panel() {
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend).unwrap();
    let screen = NoticeScreen::new(free_status(Some(true)));

    terminal.draw(|frame| draw_notice(frame, &screen)).unwrap();

    let rendered: String = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect();
    assert!(rendered.contains(NOTICE_TITLE));
    assert!(rendered.contains("Data Collection"));
    assert!(rendered.contains("https://aistudio.google.com/"));
    assert!(rendered.contains("> Yes <"));
}
