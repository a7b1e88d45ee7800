//! The rules of Conway's Game of Life, B3/S23.
//!
//! Neighbor counts are stored on a bit basis: if bit `i` of [`BIRTHS`] is on, a dead cell with `i`
//! alive neighbors is born, and likewise for [`SURVIVALS`] and alive cells.
//!
//! ```notrust
//! births:    0b0_0000_1000  (3)
//! survivals: 0b0_0000_1100  (2, 3)
//! ```
//!
//! See: https://conwaylife.com/wiki/Rulestring

use crate::cell::State;

pub const BIRTHS: u16 = 0b0_0000_1000;
pub const SURVIVALS: u16 = 0b0_0000_1100;

/// A cell never has more than this many neighbors.
pub const MAX_NEIGHBORS: u8 = 8;

/// What happens to a cell from one generation to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Dead to alive
    Birth,
    /// Alive to dead, through isolation or overcrowding
    Death,
    /// Alive to alive
    Survival,
    /// Dead to dead
    Barren,
}

impl Transition {
    /// Whether the cell flips and so belongs in a change list.
    pub const fn flips(self) -> bool {
        matches!(self, Transition::Birth | Transition::Death)
    }
}

fn in_set(set: u16, neighbors: u8) -> bool {
    debug_assert!(neighbors <= MAX_NEIGHBORS);

    let bit = 1u16 << neighbors;
    set & bit == bit
}

/// Apply the rules to a cell in `state` with `neighbors` alive neighbors.
pub fn transition(state: State, neighbors: u8) -> Transition {
    match state {
        State::Dead if in_set(BIRTHS, neighbors) => Transition::Birth,
        State::Dead => Transition::Barren,
        State::Alive if in_set(SURVIVALS, neighbors) => Transition::Survival,
        State::Alive => Transition::Death,
    }
}

/// Matches a rulestring against B3/S23. Understands `B3/S23` (any case, optional slash) and the
/// survival-first `23/3` notation.
pub fn is_life_rule(rule: &str) -> bool {
    let rule = rule.trim().to_ascii_lowercase();

    matches!(rule.as_str(), "b3/s23" | "b3s23" | "23/3")
}
