use std::time::Duration;

use crate::error::ConfigError;

/// Everything a [`World`](crate::world::World) needs to know up front. Immutable once the world
/// is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldSettings {
    pub rows: usize,
    pub cols: usize,

    /// Side length of a cell on the drawing surface. Only renderers care about it.
    pub cell_size: usize,

    /// Delay between two generations while the world is running
    pub life_speed: Duration,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            rows: 32,
            cols: 64,
            cell_size: 2,
            life_speed: Duration::from_millis(100),
        }
    }
}

impl WorldSettings {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    pub fn with_cell_size(mut self, cell_size: usize) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_life_speed(mut self, life_speed: Duration) -> Self {
        self.life_speed = life_speed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::ZeroDimension {
                rows: self.rows,
                cols: self.cols,
            });
        }

        if self.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }

        if self.life_speed.is_zero() {
            return Err(ConfigError::ZeroPeriod);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(WorldSettings::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_grid() {
        let err = WorldSettings::new(0, 5).validate().unwrap_err();

        assert_eq!(err, ConfigError::ZeroDimension { rows: 0, cols: 5 });
    }

    #[test]
    fn rejects_zero_cell_size_and_period() {
        let s = WorldSettings::new(3, 3).with_cell_size(0);
        assert_eq!(s.validate(), Err(ConfigError::ZeroCellSize));

        let s = WorldSettings::new(3, 3).with_life_speed(Duration::ZERO);
        assert_eq!(s.validate(), Err(ConfigError::ZeroPeriod));
    }
}
