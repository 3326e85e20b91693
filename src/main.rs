//! River Strike headless runner
//!
//! Plays a session without a display: a simple autopilot flies the river,
//! gold is banked in a file-backed store and a JSON summary is printed.
//! The browser build enters through `river_strike::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use serde::Serialize;

    use river_strike::consts::*;
    use river_strike::leaderboard::{LeaderboardService, LocalLeaderboard};
    use river_strike::platform::{FileStore, KeyValueStore, ManualClock, MemoryStore};
    use river_strike::session::SessionEvent;
    use river_strike::sim::{EnemyKind, GameEvent, World, terrain};
    use river_strike::{Control, ControlState, Session, SessionState, Tuning};

    #[derive(Parser, Debug)]
    #[command(author, version, about)]
    struct Cli {
        /// RNG seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,
        /// Maximum ticks to simulate
        #[arg(long, default_value_t = 6 * FRAMES_PER_MINUTE)]
        frames: u64,
        /// Steer and shoot automatically instead of idling
        #[arg(long)]
        autopilot: bool,
        /// JSON file with balance overrides
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Directory for banked gold and high scores (in-memory when omitted)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Submit the final score under this name
        #[arg(long)]
        name: Option<String>,
    }

    #[derive(Debug, Serialize)]
    struct RunSummary {
        seed: u64,
        run_seed: u64,
        frames: u64,
        state: SessionState,
        score: u64,
        lives: u32,
        run_gold: u64,
        banked_gold: u64,
        bosses_spawned: u32,
        bosses_defeated: u32,
        lives_lost: u32,
        death_cause: Option<&'static str>,
        rank: Option<usize>,
    }

    /// Fuel level below which the autopilot goes looking for a depot
    const REFUEL_THRESHOLD: f32 = 45.0;
    /// Dead zone for horizontal steering
    const STEER_TOLERANCE: f32 = 4.0;

    /// Steer for the river center (or a fuel depot when low), always firing
    fn autopilot(world: &World) -> ControlState {
        let player = world.player.rect();
        let center = player.center();

        let mut target_x = terrain::band_at(&world.bands, center.y)
            .map(|b| b.center_x)
            .unwrap_or(FIELD_WIDTH / 2.0);

        if world.player.fuel < REFUEL_THRESHOLD {
            let depot = world
                .enemies
                .iter()
                .filter(|e| e.kind == EnemyKind::FuelDepot && e.pos.y < player.pos.y)
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
            if let Some(depot) = depot {
                target_x = depot.rect().center().x;
            }
        }

        let mut controls = ControlState::holding(&[Control::Fire]);
        if center.x < target_x - STEER_TOLERANCE {
            controls.set(Control::MoveRight, true);
        } else if center.x > target_x + STEER_TOLERANCE {
            controls.set(Control::MoveLeft, true);
        }
        controls
    }

    fn load_tuning(cli: &Cli, store: &dyn KeyValueStore) -> Result<Tuning> {
        match &cli.tuning {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading tuning file {}", path.display()))?;
                Tuning::from_json(&json)
                    .with_context(|| format!("parsing tuning file {}", path.display()))
            }
            None => Ok(Tuning::load(store)),
        }
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();

        let seed = cli.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

        let store: Box<dyn KeyValueStore> = match &cli.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating data dir {}", dir.display()))?;
                Box::new(FileStore::new(dir))
            }
            None => Box::new(MemoryStore::new()),
        };
        let tuning = load_tuning(&cli, store.as_ref())?;

        log::info!("River Strike (headless) starting, seed {}", seed);
        let mut session = Session::with_tuning(seed, tuning, store);
        session.start_game();

        let clock = ManualClock::new(0.0);
        let mut frames = 0;
        let mut bosses_spawned = 0;
        let mut bosses_defeated = 0;
        let mut lives_lost = 0;
        let mut death_cause = None;

        while frames < cli.frames && session.state() == SessionState::Playing {
            let controls = if cli.autopilot {
                autopilot(session.world())
            } else {
                ControlState::new()
            };
            session.frame(&controls, &clock);
            clock.advance(ManualClock::FRAME_MS);
            frames += 1;

            for event in session.take_events() {
                match event {
                    SessionEvent::Game(GameEvent::BossSpawned(_)) => bosses_spawned += 1,
                    SessionEvent::Game(GameEvent::BossDefeated) => bosses_defeated += 1,
                    SessionEvent::Game(GameEvent::LifeLost { .. }) => lives_lost += 1,
                    SessionEvent::Game(GameEvent::GameOver { cause }) => {
                        death_cause = Some(cause.as_str())
                    }
                    _ => {}
                }
            }
        }

        let world = session.world();
        let score = world.player.score;
        let lives = world.player.lives;
        let run_gold = world.player.gold;

        let mut rank = None;
        if let Some(name) = &cli.name {
            if session.state() == SessionState::GameOver {
                session.set_name_input(name);
                let expected_rank = session.high_scores().potential_rank(score);
                let mut board = LocalLeaderboard::new(session.high_scores().clone());
                match session.submit_score(Some(&mut board as &mut dyn LeaderboardService)) {
                    Ok(()) => rank = expected_rank,
                    Err(e) => log::warn!("Score not submitted: {}", e),
                }
            } else {
                log::warn!("Run still in progress after {} frames, score not submitted", frames);
            }
        }

        let summary = RunSummary {
            seed,
            run_seed: session.world().rng.seed(),
            frames,
            state: session.state(),
            score,
            lives,
            run_gold,
            banked_gold: session.ledger().banked(),
            bosses_spawned,
            bosses_defeated,
            lives_lost,
            death_cause,
            rank,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is river_strike::web, this is just to satisfy the compiler
}
