use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    TogglePause,
    Step,
    /// Rebuild with the current seed.
    Reset,
    /// Rebuild with a fresh seed.
    NewMap,
    Faster,
    Slower,
    HudToggle,
    Redraw,
}

pub(crate) fn collect_input_nonblocking(max_wait: Duration) -> anyhow::Result<Vec<Action>> {
    let mut out = Vec::new();
    let timeout = std::cmp::min(Duration::from_millis(1), max_wait);
    while event::poll(timeout)? {
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
                if let Some(action) = map_key(k) {
                    out.push(action);
                }
            }
            Event::Resize(_, _) => out.push(Action::Redraw),
            _ => {}
        }
        if out.len() >= 32 {
            break;
        }
    }
    Ok(out)
}

pub(crate) fn map_key(k: KeyEvent) -> Option<Action> {
    if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    match k.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::TogglePause),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Right => Some(Action::Step),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Reset),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Action::NewMap),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Some(Action::Faster),
        KeyCode::Char('-') | KeyCode::Down => Some(Action::Slower),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::HudToggle),
        _ => None,
    }
}
