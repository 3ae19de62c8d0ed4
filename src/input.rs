use nback_core::Judgment;
use winit::keyboard::KeyCode;

/// What a key press asks the application to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Judge(Judgment),
    SelectNext,
    SelectPrev,
    /// Move the selected setting by this many steps.
    Adjust(i64),
    Quit,
}

/// Maps a key to a command. While running only the judgment keys and ESC
/// are live; everything else is dropped.
pub fn map_key(key: KeyCode, running: bool) -> Option<Command> {
    if running {
        return match key {
            KeyCode::ArrowLeft => Some(Command::Judge(Judgment::Same)),
            KeyCode::ArrowRight => Some(Command::Judge(Judgment::Different)),
            KeyCode::Escape => Some(Command::Stop),
            _ => None,
        };
    }
    match key {
        KeyCode::Space | KeyCode::Enter | KeyCode::NumpadEnter => Some(Command::Start),
        KeyCode::ArrowDown | KeyCode::Tab => Some(Command::SelectNext),
        KeyCode::ArrowUp => Some(Command::SelectPrev),
        KeyCode::ArrowLeft | KeyCode::Minus | KeyCode::NumpadSubtract => Some(Command::Adjust(-1)),
        KeyCode::ArrowRight | KeyCode::Equal | KeyCode::NumpadAdd => Some(Command::Adjust(1)),
        KeyCode::PageUp => Some(Command::Adjust(10)),
        KeyCode::PageDown => Some(Command::Adjust(-10)),
        KeyCode::Escape => Some(Command::Quit),
        _ => None,
    }
}
