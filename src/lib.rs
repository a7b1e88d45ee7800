pub mod cell;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod pattern;
pub mod render;
pub mod rle;
pub mod rules;
pub mod world;

mod parse_util;

pub use cell::Cell;
pub use cell::Placement;
pub use cell::Renderer;
pub use config::WorldSettings;
pub use error::ConfigError;
pub use error::GridError;
pub use grid::Grid;
pub use grid::Pos;
pub use pattern::Pattern;
pub use world::RunState;
pub use world::World;
