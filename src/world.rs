use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::error;
use tracing::info;
use tracing::trace;

use crate::cell::Renderer;
use crate::config::WorldSettings;
use crate::error::ConfigError;
use crate::error::GridError;
use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

/// The background loop advancing the grid.
struct Runner {
    /// Dropping or sending on this wakes the loop up and ends it
    cancel: mpsc::Sender<()>,
    thread: JoinHandle<()>,
}

impl Runner {
    fn spawn(grid: Arc<Mutex<Grid>>, period: Duration) -> Self {
        let (cancel, cancelled) = mpsc::channel();

        let thread = thread::spawn(move || {
            loop {
                match cancelled.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        let mut grid = lock(&grid);
                        let changed = grid.step();

                        trace!(generation = grid.generation(), changed, "Advanced grid");
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Self { cancel, thread }
    }

    /// Ends the loop and waits for it, so no generation runs once this returns.
    fn cancel(self) {
        let Self { cancel, thread } = self;

        // The loop may already be gone, in which case nobody is left to receive.
        let _ = cancel.send(());

        if thread.join().is_err() {
            error!("Generation loop panicked");
        }
    }
}

fn lock(grid: &Mutex<Grid>) -> MutexGuard<'_, Grid> {
    grid.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A [`Grid`] that can advance on its own.
///
/// While running, a background thread advances the grid by one generation every `life_speed`.
/// Each generation holds the grid's lock from the start of the compute phase to the end of the
/// apply phase, and so do edits: an edit never observes half a generation, and the next
/// generation always starts from the edited grid.
pub struct World {
    grid: Arc<Mutex<Grid>>,
    life_speed: Duration,
    runner: Option<Runner>,
}

impl World {
    pub fn new(settings: &WorldSettings, renderer: Arc<dyn Renderer>) -> Result<Self, ConfigError> {
        settings.validate()?;

        let grid = Grid::new(settings.rows, settings.cols, settings.cell_size, renderer)?;

        Ok(Self::from_grid(grid, settings.life_speed))
    }

    /// Wrap an existing grid. A zero `life_speed` is only refused once the world is started.
    pub fn from_grid(grid: Grid, life_speed: Duration) -> Self {
        Self {
            grid: Arc::new(Mutex::new(grid)),
            life_speed,
            runner: None,
        }
    }

    pub fn life_speed(&self) -> Duration {
        self.life_speed
    }

    /// A loop that died on a panicking renderer counts as stopped.
    pub fn state(&self) -> RunState {
        match &self.runner {
            Some(runner) if !runner.thread.is_finished() => RunState::Running,
            _ => RunState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    /// Start advancing one generation every `life_speed`.
    ///
    /// If the world is already running, the current loop is stopped first: there is never more
    /// than one.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        self.start_with(self.life_speed)
    }

    /// Like [`World::start`], with an explicit period.
    pub fn start_with(&mut self, period: Duration) -> Result<(), ConfigError> {
        if period.is_zero() {
            return Err(ConfigError::ZeroPeriod);
        }

        self.stop();

        info!(?period, "Starting world");
        self.runner = Some(Runner::spawn(Arc::clone(&self.grid), period));

        Ok(())
    }

    /// Stop advancing. Once this returns, no generation will run until the next start.
    ///
    /// Stopping a stopped world does nothing.
    pub fn stop(&mut self) {
        if let Some(runner) = self.runner.take() {
            runner.cancel();

            info!(generation = self.generation(), "Stopped world");
        }
    }

    /// Run the world if it's stopped, stop it otherwise.
    pub fn toggle_running(&mut self) -> Result<RunState, ConfigError> {
        if self.is_running() {
            self.stop();
        } else {
            self.start()?;
        }

        Ok(self.state())
    }

    /// Advance by exactly one generation. Returns the number of cells that flipped.
    pub fn step(&self) -> usize {
        lock(&self.grid).step()
    }

    /// Flip the cell at `(row, col)`, running or not. The change is immediately visible and the
    /// next generation is computed from it.
    pub fn toggle_cell_at(&self, row: usize, col: usize) -> Result<(), GridError> {
        lock(&self.grid).toggle_cell_at(row, col)
    }

    pub fn is_active_at(&self, row: usize, col: usize) -> Result<bool, GridError> {
        lock(&self.grid).is_active_at(row, col)
    }

    pub fn generation(&self) -> u64 {
        lock(&self.grid).generation()
    }

    /// Make several edits without any generation running in between.
    pub fn edit<R>(&self, f: impl FnOnce(&mut Grid) -> R) -> R {
        f(&mut *lock(&self.grid))
    }

    /// Read the grid between two generations.
    pub fn with_grid<R>(&self, f: impl FnOnce(&Grid) -> R) -> R {
        f(&*lock(&self.grid))
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless(rows: usize, cols: usize) -> World {
        World::from_grid(Grid::headless(rows, cols).unwrap(), Duration::from_millis(10))
    }

    #[test]
    fn starts_stopped() {
        let world = headless(3, 3);

        assert_eq!(world.state(), RunState::Stopped);
        assert_eq!(world.generation(), 0);
    }

    #[test]
    fn stop_when_stopped_is_a_no_op() {
        let mut world = headless(3, 3);

        world.stop();
        world.stop();

        assert!(!world.is_running());
    }

    #[test]
    fn refuses_zero_period() {
        let mut world = World::from_grid(Grid::headless(2, 2).unwrap(), Duration::ZERO);

        assert_eq!(world.start(), Err(ConfigError::ZeroPeriod));
        assert!(!world.is_running());
    }

    #[test]
    fn toggle_running() {
        let mut world = headless(3, 3);

        assert_eq!(world.toggle_running(), Ok(RunState::Running));
        assert_eq!(world.toggle_running(), Ok(RunState::Stopped));
    }

    #[test]
    fn stop_is_prompt_with_a_long_period() {
        let mut world = headless(3, 3);
        world.start_with(Duration::from_secs(3600)).unwrap();

        let t = std::time::Instant::now();
        world.stop();

        assert!(t.elapsed() < Duration::from_secs(5));
        assert_eq!(world.generation(), 0);
    }

    #[test]
    fn manual_step() {
        let world = headless(3, 3);
        world.edit(|grid| {
            for col in 0..3 {
                grid.make_alive_at(1, col).unwrap();
            }
        });

        assert_eq!(world.step(), 4);
        assert_eq!(world.generation(), 1);
        assert!(world.is_active_at(0, 1).unwrap());
        assert!(!world.is_active_at(1, 0).unwrap());
    }

    #[test]
    fn new_validates_settings() {
        let settings = WorldSettings::new(4, 4).with_life_speed(Duration::ZERO);
        let renderer: Arc<dyn Renderer> = Arc::new(crate::cell::NullRenderer);

        assert!(matches!(
            World::new(&settings, renderer),
            Err(ConfigError::ZeroPeriod)
        ));
    }
}
