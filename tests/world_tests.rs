use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use lifegrid::Grid;
use lifegrid::Placement;
use lifegrid::Pos;
use lifegrid::Renderer;
use lifegrid::RunState;
use lifegrid::World;
use lifegrid::WorldSettings;
use lifegrid::events::Event;
use lifegrid::events::Input;
use lifegrid::events::InputError;
use lifegrid::events::PointerEvent;

const PERIOD: Duration = Duration::from_millis(20);

fn counting_world(rows: usize, cols: usize) -> (World, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);

    let renderer: Arc<dyn Renderer> = Arc::new(move |_: bool, _: &Placement| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    let settings = WorldSettings::new(rows, cols).with_life_speed(PERIOD);
    let world = World::new(&settings, renderer).unwrap();
    count.store(0, Ordering::SeqCst);

    (world, count)
}

fn headless(rows: usize, cols: usize) -> World {
    World::from_grid(Grid::headless(rows, cols).unwrap(), PERIOD)
}

#[test]
fn repeated_start_runs_a_single_loop() {
    let mut world = headless(5, 5);

    for _ in 0..5 {
        world.start().unwrap();
    }
    assert_eq!(world.state(), RunState::Running);

    let window = Duration::from_millis(400);
    thread::sleep(window);
    world.stop();

    // One loop gets at most one generation per period. Five loops would get five times as many.
    let limit = (window.as_millis() / PERIOD.as_millis()) as u64 + 1;
    let generations = world.generation();

    assert!(generations >= 1, "the loop never ran");
    assert!(generations <= limit, "{generations} generations, limit {limit}");
}

#[test]
fn nothing_runs_after_stop() {
    let mut world = headless(5, 5);

    world.start().unwrap();
    thread::sleep(PERIOD * 5);
    world.stop();
    world.stop();

    let stopped_at = world.generation();
    thread::sleep(PERIOD * 5);

    assert_eq!(world.generation(), stopped_at);
    assert_eq!(world.state(), RunState::Stopped);
}

#[test]
fn restart_after_stop() {
    let mut world = headless(3, 3);

    world.start().unwrap();
    world.stop();
    let stopped_at = world.generation();

    world.start().unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while world.generation() == stopped_at && Instant::now() < deadline {
        thread::sleep(PERIOD);
    }
    world.stop();

    assert!(world.generation() > stopped_at);
}

#[test]
fn drag_over_one_cell_toggles_it_once() {
    let (mut world, count) = counting_world(4, 4);
    let mut input = Input::new();
    let pos = Pos::new(1, 2);

    input
        .handle(&mut world, Event::PointerEvent(PointerEvent::Press(pos)))
        .unwrap();
    input
        .handle(&mut world, Event::PointerEvent(PointerEvent::Drag(pos)))
        .unwrap();

    assert!(world.is_active_at(1, 2).unwrap());
    assert_eq!(count.load(Ordering::SeqCst), 1);

    input
        .handle(&mut world, Event::PointerEvent(PointerEvent::Release))
        .unwrap();
    input
        .handle(&mut world, Event::PointerEvent(PointerEvent::Press(pos)))
        .unwrap();

    assert!(!world.is_active_at(1, 2).unwrap());
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn pointer_outside_the_grid_is_reported() {
    let mut world = headless(2, 2);
    let mut input = Input::new();

    let err = input
        .handle(&mut world, Event::PointerEvent(PointerEvent::Press(Pos::new(0, 9))))
        .unwrap_err();

    assert!(matches!(err, InputError::Grid(_)));
}

#[test]
fn toggle_while_running_is_immediate() {
    let mut world = headless(5, 5);
    world.start_with(Duration::from_secs(3600)).unwrap();

    world.toggle_cell_at(2, 2).unwrap();
    assert!(world.is_active_at(2, 2).unwrap());
    assert!(world.toggle_cell_at(5, 0).is_err());

    world.stop();
    assert!(world.is_active_at(2, 2).unwrap());
}

#[test]
fn next_generation_starts_from_edits_made_while_running() {
    let mut world = headless(5, 5);
    world.start().unwrap();

    // Edited as one unit: no generation can slip in between the three toggles.
    let edited_at = world.edit(|grid| {
        for col in 1..4 {
            grid.toggle_cell_at(2, col).unwrap();
        }

        grid.generation()
    });

    let deadline = Instant::now() + Duration::from_secs(5);
    while world.generation() == edited_at && Instant::now() < deadline {
        thread::sleep(PERIOD / 2);
    }
    world.stop();

    let elapsed = world.generation() - edited_at;
    assert!(elapsed > 0, "no generation ran");

    let vertical = (1..4).all(|row| world.is_active_at(row, 2).unwrap());
    let horizontal = (1..4).all(|col| world.is_active_at(2, col).unwrap());

    assert_eq!(world.with_grid(Grid::alive_count), 3);
    if elapsed % 2 == 1 {
        assert!(vertical && !horizontal);
    } else {
        assert!(horizontal && !vertical);
    }
}

#[test]
fn a_panicking_renderer_stops_the_world() {
    let broken = Arc::new(AtomicBool::new(false));
    let b = Arc::clone(&broken);

    let renderer: Arc<dyn Renderer> = Arc::new(move |_: bool, _: &Placement| {
        if b.load(Ordering::SeqCst) {
            panic!("renderer is broken");
        }
    });

    let settings = WorldSettings::new(3, 3).with_life_speed(PERIOD);
    let mut world = World::new(&settings, renderer).unwrap();
    world.toggle_cell_at(1, 1).unwrap();

    broken.store(true, Ordering::SeqCst);
    world.start().unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while world.is_running() && Instant::now() < deadline {
        thread::sleep(PERIOD);
    }

    assert_eq!(world.state(), RunState::Stopped);

    // The grid stays usable, and the world can be restarted.
    broken.store(false, Ordering::SeqCst);
    assert!(world.is_active_at(0, 0).is_ok());
    assert_eq!(world.toggle_running(), Ok(RunState::Running));
    world.stop();
}

#[test]
fn dropping_a_running_world_stops_it() {
    let mut world = headless(3, 3);
    world.start().unwrap();

    drop(world);
}
