use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use crossterm::cursor;
use crossterm::event;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::execute;
use crossterm::style;
use crossterm::terminal;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use lifegrid::Pattern;
use lifegrid::World;
use lifegrid::WorldSettings;
use lifegrid::events::Input;
use lifegrid::render::Screen;

use crate::io::Command;

mod io;

const FRAMERATE: u32 = 30;
const FRAMETIME: Duration = Duration::from_millis(((1f64 / FRAMERATE as f64) * 1_000f64) as u64);

const USAGE: &str = "usage: lifegrid [pattern-file] [rows] [cols] [life-speed-ms]";

struct Args {
    pattern: Option<PathBuf>,
    settings: WorldSettings,
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut settings = WorldSettings::default();
    let pattern = args.first().filter(|a| *a != "-").map(PathBuf::from);

    let number = |i: usize, what: &str| -> anyhow::Result<Option<usize>> {
        args.get(i)
            .map(|a| a.parse::<usize>())
            .transpose()
            .with_context(|| format!("Invalid {what}. {USAGE}"))
    };

    if let Some(rows) = number(1, "row count")? {
        settings.rows = rows;
    }

    if let Some(cols) = number(2, "column count")? {
        settings.cols = cols;
    }

    if let Some(ms) = number(3, "life speed")? {
        settings.life_speed = Duration::from_millis(ms as u64);
    }

    settings.validate().context(USAGE)?;

    Ok(Args { pattern, settings })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let Args { pattern, settings } = parse_args()?;

    let screen = Arc::new(Screen::for_grid(
        settings.rows,
        settings.cols,
        settings.cell_size,
    ));
    let mut world = World::new(&settings, screen.clone())?;

    if let Some(path) = pattern {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let pattern = Pattern::parse(&text)?;

        let origin = pattern
            .centered_origin(settings.rows, settings.cols)
            .with_context(|| {
                format!(
                    "A {}x{} pattern doesn't fit on a {}x{} grid",
                    pattern.rows(),
                    pattern.cols(),
                    settings.rows,
                    settings.cols
                )
            })?;

        world.edit(|grid| grid.place(&pattern, origin))?;
        info!(name = ?pattern.name(), ?origin, "Placed pattern");
    }

    let term = RawTerminal::enter()?;

    let res = run(&mut world, &screen, settings.cell_size);
    world.stop();

    drop(term);

    res
}

/// Raw mode, alternate screen and mouse capture, undone when dropped.
struct RawTerminal;

impl RawTerminal {
    fn enter() -> anyhow::Result<Self> {
        terminal::enable_raw_mode()?;

        // Dropped on any early return below
        let term = Self;
        let mut stdout = std::io::stdout();

        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        Ok(term)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let mut stdout = std::io::stdout();

        if let Err(e) = execute!(
            stdout,
            cursor::Show,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen
        ) {
            warn!("Failed to leave the alternate screen: {e}");
        }

        if let Err(e) = terminal::disable_raw_mode() {
            warn!("Failed to disable raw mode: {e}");
        }
    }
}

fn run(world: &mut World, screen: &Screen, cell_size: usize) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    let mut input = Input::new();

    loop {
        let t = Instant::now();

        // Poll event for as long as FRAMETIME
        if event::poll(FRAMETIME)? {
            match io::convert_event(event::read()?, cell_size) {
                None => {}
                Some(Command::Exit) => break,
                Some(Command::Event(event)) => {
                    if let Err(e) = input.handle(world, event) {
                        warn!("Ignored input: {e}");
                    }
                }
            }
        }

        let frame = screen.render();
        let status = format!(
            "gen {:<8} {:<8} [space] run/stop  [n] step  [c] clear  [q] quit",
            world.generation(),
            if world.is_running() { "running" } else { "stopped" },
        );

        execute!(stdout, cursor::MoveTo(0, 0))?;

        for line in frame.lines().chain(std::iter::once(status.as_str())) {
            execute!(
                stdout,
                style::Print(line),
                terminal::Clear(terminal::ClearType::UntilNewLine),
                cursor::MoveToNextLine(1)
            )?;
        }

        let time_left = FRAMETIME.saturating_sub(t.elapsed());
        thread::sleep(time_left);
    }

    Ok(())
}
