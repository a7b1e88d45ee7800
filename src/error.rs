use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("A cell requires a placement descriptor")]
    MissingPlacement,

    #[error("A cell requires a renderer to notify")]
    MissingRenderer,

    #[error("Cell state must be 0 or 1, got {0}")]
    InvalidState(u8),

    #[error("Grid dimensions must be positive, got {rows}x{cols}")]
    ZeroDimension { rows: usize, cols: usize },

    #[error("Cell size must be positive")]
    ZeroCellSize,

    #[error("Generation period must be positive")]
    ZeroPeriod,
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum GridError {
    #[error("Cell ({row}, {col}) is outside of the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}
