//! Headless driver: runs the simulation in demo mode and reports the result

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use anyhow::Context;
    use clap::Parser;
    use dino_run::consts::{SIM_DT, TARGET_FPS};
    use dino_run::sim::{GameEvent, GameState, TickInput};
    use dino_run::{App, Difficulty, HighScoreStore, JsonFileStore, Tuning};

    /// Endless runner simulation (autopilot demo)
    #[derive(Parser)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// Tuning file (JSON); defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Difficulty preset: easy, normal or hard
        #[arg(short, long, default_value = "normal", value_parser = parse_difficulty)]
        difficulty: Difficulty,

        /// RNG seed (defaults to the current time)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Simulated seconds to run
        #[arg(long, default_value_t = 60.0)]
        seconds: f32,

        /// Where the high score is stored
        #[arg(long, default_value = "high_score.json")]
        high_score_file: PathBuf,

        /// Sleep between frames to run at the target frame rate
        #[arg(long)]
        realtime: bool,

        /// Clear the stored high score before running
        #[arg(long)]
        reset_high_score: bool,

        /// Enable debug logging (overridden by RUST_LOG)
        #[arg(short, long)]
        verbose: bool,
    }

    fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
        Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty '{s}'"))
    }

    #[derive(Default)]
    struct Summary {
        runs: u32,
        best: u64,
        coins: u64,
        dodged: u32,
        achievements: usize,
    }

    impl Summary {
        fn add_run(&mut self, state: &GameState) {
            self.runs += 1;
            self.best = self.best.max(state.score_points());
            self.coins += state.stats.coins;
            self.dodged += state.stats.obstacles_dodged;

            let achievements = state.stats.achievements;
            self.achievements += achievements.len();
            if !achievements.is_empty() {
                let names: Vec<_> = achievements.iter().map(|a| a.name()).collect();
                log::info!("Run {} achievements: {}", self.runs, names.join(", "));
            }
        }
    }

    pub fn run() -> anyhow::Result<()> {
        let args = Args::parse();
        let level = if args.verbose { "debug" } else { "info" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

        let tuning = match &args.config {
            Some(path) => Tuning::load(path)
                .with_context(|| format!("loading tuning from {}", path.display()))?,
            None => Tuning::default(),
        };
        let tuning = args.difficulty.apply(tuning);
        let seed = args.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default()
        });

        let mut store = JsonFileStore::new(&args.high_score_file);
        if args.reset_high_score {
            store.save(0).context("resetting high score")?;
        }

        let mut app = App::new(tuning, seed, store).context("invalid tuning")?;
        log::info!(
            "Dino Run starting (seed {seed}, {} difficulty, high score {} from {})",
            args.difficulty.as_str(),
            app.high_score(),
            app.store().path().display()
        );

        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let frame = Duration::from_secs_f32(1.0 / TARGET_FPS as f32);
        let frames = (args.seconds.max(0.0) / SIM_DT).round() as u64;
        let mut summary = Summary::default();

        for _ in 0..frames {
            let result = app.advance(SIM_DT, &input);
            for event in &result.events {
                match event {
                    GameEvent::GameOver { .. } => summary.add_run(app.state()),
                    GameEvent::NewHighScore(score) => println!("New high score: {score}"),
                    other => log::debug!("{other:?}"),
                }
            }
            if result.is_game_over {
                app.reset();
            }
            if args.realtime {
                std::thread::sleep(frame);
            }
        }

        // Count an unfinished run too
        if app.state().time_ticks > 0 {
            summary.add_run(app.state());
        }

        println!("Runs:             {}", summary.runs);
        println!("Best score:       {}", summary.best);
        println!("Coins collected:  {}", summary.coins);
        println!("Obstacles dodged: {}", summary.dodged);
        println!("Achievements:     {}", summary.achievements);
        println!("High score:       {}", app.high_score());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a web front end; there is no wasm binary
}
