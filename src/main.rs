//! Blast Grid entry point
//!
//! Headless runner: plays a short scripted session on a fixed layout,
//! printing frames as text, then records the result and prints the
//! leaderboard.

use anyhow::Context;

use blast_grid::audio::{AudioManager, LogSink};
use blast_grid::persistence::{MemoryStore, ProfileStore, SessionStart, record_session};
use blast_grid::renderer::{SpriteCache, TextRenderer};
use blast_grid::sim::{GameState, Grid, Key, LevelPlan};
use blast_grid::{Leaderboard, Session, Settings};

const DEMO_LEVEL: &str = "
    #########
    #.f*+*..#
    #.#.#.#*#
    #...*...#
    #########
";

/// Frame at which each scripted key event is queued
const SCRIPT: &[(u32, Key, bool)] = &[
    (0, Key::PlaceBomb, true),
    (0, Key::Down, true),
    (30, Key::Down, false),
    (100, Key::Up, true),
    (130, Key::Up, false),
    (130, Key::Right, true),
    (140, Key::Right, false),
];

const DEMO_FRAMES: u32 = 150;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Blast Grid (headless) starting...");

    let settings = Settings::default_path()
        .map(|path| Settings::load(&path))
        .unwrap_or_default();

    let mut store = MemoryStore::new();
    store.create_user("demo", "demo", "Demo Player")?;
    store.create_user("rival", "rival", "Rival")?;
    store.add_score("rival", 800)?;
    let start = SessionStart::load(&store, "demo");

    let plan = LevelPlan::Fixed(vec![Grid::from_ascii(DEMO_LEVEL)]);
    let state = GameState::with_plan(plan, settings.seed.unwrap_or(0), 1, settings.tuning.clone());
    let audio = AudioManager::from_settings(Box::new(LogSink), &settings);
    let mut session = Session::new(state, start).with_audio(audio);

    let mut renderer = TextRenderer::new(std::io::stdout().lock());
    let mut sprites = SpriteCache::new();

    for frame in 0..DEMO_FRAMES {
        for &(at, key, down) in SCRIPT {
            if at != frame {
                continue;
            }
            if down {
                session.on_key_down(key);
            } else {
                session.on_key_up(key);
            }
        }

        let events = session.step();
        for event in &events {
            log::debug!("frame {}: {:?}", frame, event);
        }

        if frame % 30 == 0 || frame + 1 == DEMO_FRAMES || session.is_over() {
            session
                .render(&mut renderer, &mut sprites)
                .context("Failed to draw frame")?;
        }
        if session.is_over() {
            break;
        }
    }
    drop(renderer);

    let report = session.report();
    record_session(&mut store, "demo", &report);

    println!("\nLeaderboard");
    let board = Leaderboard::from_scores(store.top_scores()?);
    for (rank, entry) in board.entries.iter().enumerate() {
        println!("{:>2}. {:<12} {}", rank + 1, entry.username, entry.score);
    }
    Ok(())
}
