use crossterm::event::Event as CrossTermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;

use lifegrid::events::EngineEvent;
use lifegrid::events::Event;
use lifegrid::events::PointerEvent;
use lifegrid::render::Screen;

pub enum Command {
    Exit,
    Event(Event),
}

/// Converts a crossterm event into a lifegrid event. Mouse positions are mapped to the cell drawn
/// under the pointer.
pub fn convert_event(event: CrossTermEvent, cell_size: usize) -> Option<Command> {
    let engine = |e| Some(Command::Event(Event::EngineEvent(e)));
    let pointer = |e| Some(Command::Event(Event::PointerEvent(e)));

    match event {
        CrossTermEvent::Key(KeyEvent {
            kind: KeyEventKind::Release,
            ..
        }) => None,
        CrossTermEvent::Key(key_event) => match key_event {
            KeyEvent {
                code: KeyCode::Char('q'),
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => Some(Command::Exit),
            KeyEvent {
                code: KeyCode::Char(' '),
                ..
            } => engine(EngineEvent::ToggleRunning),
            KeyEvent {
                code: KeyCode::Char('n'),
                ..
            } => engine(EngineEvent::Step),
            KeyEvent {
                code: KeyCode::Char('c'),
                ..
            } => engine(EngineEvent::Clear),
            _ => None,
        },
        CrossTermEvent::Mouse(MouseEvent {
            kind, column, row, ..
        }) => {
            let pos = Screen::cell_at(column, row, cell_size);

            match kind {
                MouseEventKind::Down(MouseButton::Left) => pointer(PointerEvent::Press(pos)),
                MouseEventKind::Drag(MouseButton::Left) => pointer(PointerEvent::Drag(pos)),
                MouseEventKind::Up(MouseButton::Left) => pointer(PointerEvent::Release),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::Event as CrossTermEvent;
    use crossterm::event::KeyCode;
    use crossterm::event::KeyEvent;
    use crossterm::event::KeyModifiers;
    use crossterm::event::MouseButton;
    use crossterm::event::MouseEvent;
    use crossterm::event::MouseEventKind;

    use lifegrid::Pos;
    use lifegrid::events::EngineEvent;
    use lifegrid::events::Event;
    use lifegrid::events::PointerEvent;

    use super::Command;
    use super::convert_event;

    fn key(c: char, modifiers: KeyModifiers) -> CrossTermEvent {
        CrossTermEvent::Key(KeyEvent::new(KeyCode::Char(c), modifiers))
    }

    #[test]
    fn ctrl_c_exits_but_c_clears() {
        assert!(matches!(
            convert_event(key('c', KeyModifiers::CONTROL), 2),
            Some(Command::Exit)
        ));
        assert!(matches!(
            convert_event(key('c', KeyModifiers::NONE), 2),
            Some(Command::Event(Event::EngineEvent(EngineEvent::Clear)))
        ));
    }

    #[test]
    fn left_drag_maps_to_a_cell() {
        let drag = CrossTermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Drag(MouseButton::Left),
            column: 5,
            row: 2,
            modifiers: KeyModifiers::NONE,
        });

        let Some(Command::Event(Event::PointerEvent(PointerEvent::Drag(pos)))) =
            convert_event(drag, 2)
        else {
            panic!("expected a drag");
        };

        assert_eq!(pos, Pos::new(4, 5));
    }
}
