use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;

/// Binary state of a [`Cell`].
///
/// A cell is either dead (`0`) or alive (`1`), nothing else. Converting any other integer into a
/// `State` fails.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    #[default]
    Dead = 0,
    Alive = 1,
}

impl State {
    pub const fn is_alive(self) -> bool {
        matches!(self, State::Alive)
    }

    pub const fn flipped(self) -> Self {
        match self {
            State::Dead => State::Alive,
            State::Alive => State::Dead,
        }
    }
}

impl TryFrom<u8> for State {
    type Error = ConfigError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            0 => Ok(State::Dead),
            1 => Ok(State::Alive),
            n => Err(ConfigError::InvalidState(n)),
        }
    }
}

impl From<State> for u8 {
    fn from(state: State) -> Self {
        state as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Where and how a cell gets drawn.
///
/// The engine never looks inside a `Placement`, it only hands it back to the [`Renderer`] every
/// time the owning cell changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub top_x: usize,
    pub top_y: usize,
    pub width: usize,
    pub height: usize,
    pub color_active: Rgb,
    pub color_inactive: Rgb,
}

impl Placement {
    pub const COLOR_ACTIVE: Rgb = Rgb(0x00, 0x79, 0x00);
    pub const COLOR_INACTIVE: Rgb = Rgb(0xff, 0xff, 0xff);

    /// Placement of the cell at `(row, col)` on a surface where every cell takes up a
    /// `cell_size` square. One pixel is left on the right and bottom for grid lines, unless the
    /// cell is a single pixel wide.
    pub fn for_cell(row: usize, col: usize, cell_size: usize) -> Self {
        let side = cell_size.saturating_sub(1).max(1);

        Self {
            top_x: col * cell_size,
            top_y: row * cell_size,
            width: side,
            height: side,
            color_active: Self::COLOR_ACTIVE,
            color_inactive: Self::COLOR_INACTIVE,
        }
    }
}

/// Receives a notification every time a cell changes.
///
/// Calls are synchronous and happen after the mutation, so `active` is always the new state. When
/// the cell lives inside a running [`World`](crate::world::World) the call is made while the grid
/// is locked: implementations must not call back into the world.
pub trait Renderer: Send + Sync {
    fn cell_changed(&self, active: bool, placement: &Placement);
}

impl<F> Renderer for F
where
    F: Fn(bool, &Placement) + Send + Sync,
{
    fn cell_changed(&self, active: bool, placement: &Placement) {
        self(active, placement)
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn cell_changed(&self, _active: bool, _placement: &Placement) {}
}

/// A single unit of the grid.
///
/// `state` only changes through [`Cell::toggle`], [`Cell::make_alive`] and [`Cell::kill`], and
/// each of them notifies the renderer once it's done.
pub struct Cell {
    state: State,

    /// Opaque tag carried along with the cell. The rules never read it.
    value: i32,

    placement: Placement,
    renderer: Arc<dyn Renderer>,
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("state", &self.state)
            .field("value", &self.value)
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

impl Cell {
    pub const DEFAULT_VALUE: i32 = 1;

    pub fn builder() -> CellBuilder {
        CellBuilder::default()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_alive()
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn toggle(&mut self) {
        self.state = self.state.flipped();
        self.redraw();
    }

    pub fn make_alive(&mut self) {
        self.state = State::Alive;
        self.redraw();
    }

    pub fn kill(&mut self) {
        self.state = State::Dead;
        self.redraw();
    }

    /// Notify the renderer of the current state without changing it.
    pub fn redraw(&self) {
        self.renderer.cell_changed(self.is_active(), &self.placement);
    }
}

#[derive(Default)]
pub struct CellBuilder {
    state: State,
    value: Option<i32>,
    placement: Option<Placement>,
    renderer: Option<Arc<dyn Renderer>>,
}

impl CellBuilder {
    pub fn state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    pub fn value(mut self, value: i32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Build the cell. Both a placement and a renderer are required.
    pub fn build(self) -> Result<Cell, ConfigError> {
        let placement = self.placement.ok_or(ConfigError::MissingPlacement)?;
        let renderer = self.renderer.ok_or(ConfigError::MissingRenderer)?;

        Ok(Cell {
            state: self.state,
            value: self.value.unwrap_or(Cell::DEFAULT_VALUE),
            placement,
            renderer,
        })
    }
}
