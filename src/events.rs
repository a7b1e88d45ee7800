use thiserror::Error;

use crate::error::ConfigError;
use crate::error::GridError;
use crate::grid::Pos;
use crate::world::World;

pub enum Event {
    EngineEvent(EngineEvent),
    PointerEvent(PointerEvent),
}

pub enum EngineEvent {
    /// Start advancing on its own, or stop if already running
    ToggleRunning,

    /// Advance the world state by one generation
    Step,

    /// Kill every cell
    Clear,
}

/// Pointer input, already mapped to grid positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Press(Pos),
    Drag(Pos),
    Release,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Tracks one press-drag-release gesture so that a cell is edited once per visit.
///
/// Moving the pointer around inside a cell keeps reporting that cell; only the first report
/// toggles it. Moving to another cell and back toggles it again.
#[derive(Debug, Default)]
pub struct Stroke {
    pressed: bool,
    last: Option<Pos>,
}

impl Stroke {
    /// Returns the position to edit, if any.
    pub fn press(&mut self, pos: Pos) -> Option<Pos> {
        self.pressed = true;
        self.visit(pos)
    }

    /// Returns the position to edit, if any. Dragging without pressing first edits nothing.
    pub fn drag(&mut self, pos: Pos) -> Option<Pos> {
        if !self.pressed {
            return None;
        }

        self.visit(pos)
    }

    pub fn release(&mut self) {
        self.pressed = false;
        self.last = None;
    }

    fn visit(&mut self, pos: Pos) -> Option<Pos> {
        if self.last == Some(pos) {
            return None;
        }

        self.last = Some(pos);
        Some(pos)
    }
}

/// Turns input events into operations on a [`World`].
#[derive(Debug, Default)]
pub struct Input {
    stroke: Stroke,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, world: &mut World, event: Event) -> Result<(), InputError> {
        match event {
            Event::EngineEvent(EngineEvent::ToggleRunning) => {
                world.toggle_running()?;
            }
            Event::EngineEvent(EngineEvent::Step) => {
                world.step();
            }
            Event::EngineEvent(EngineEvent::Clear) => {
                world.edit(|grid| grid.clear());
            }
            Event::PointerEvent(PointerEvent::Press(pos)) => {
                if let Some(pos) = self.stroke.press(pos) {
                    world.toggle_cell_at(pos.row, pos.col)?;
                }
            }
            Event::PointerEvent(PointerEvent::Drag(pos)) => {
                if let Some(pos) = self.stroke.drag(pos) {
                    world.toggle_cell_at(pos.row, pos.col)?;
                }
            }
            Event::PointerEvent(PointerEvent::Release) => {
                self.stroke.release();
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_cell_is_edited_once_per_visit() {
        let mut stroke = Stroke::default();
        let (a, b) = (Pos::new(0, 0), Pos::new(0, 1));

        assert_eq!(stroke.press(a), Some(a));
        assert_eq!(stroke.drag(a), None);
        assert_eq!(stroke.drag(b), Some(b));
        assert_eq!(stroke.drag(b), None);
        assert_eq!(stroke.drag(a), Some(a));
    }

    #[test]
    fn release_ends_the_gesture() {
        let mut stroke = Stroke::default();
        let a = Pos::new(2, 2);

        stroke.press(a);
        stroke.release();

        assert_eq!(stroke.drag(a), None);
        assert_eq!(stroke.press(a), Some(a));
    }
}
