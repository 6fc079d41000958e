use crate::config::{
    load_settings, save_settings_atomic, settings_source, Args, Settings, MAX_TICK_MS, MIN_TICK_MS,
};
use crate::input::{collect_input_nonblocking, Action};
use crate::render::{draw, fit_dims, Hud, TermGuard};
use anyhow::{Context, Result};
use crossterm::terminal;
use std::time::{Duration, Instant};
use terraspread::{generate_seed, Grid, Terrain};
use tracing::{info, warn};

pub(crate) fn run(args: Args) -> Result<()> {
    let source = settings_source(&args)?;
    let mut settings = load_settings(&source.path)?;
    if let Some(ms) = args.ms {
        settings.tick_ms = ms;
    }

    if let Some(steps) = args.headless {
        return run_headless(&args, &settings, steps);
    }

    let mut app = App::init(&args, settings)?;
    app.run()?;

    if source.persist {
        if let Err(err) = save_settings_atomic(&source.path, &app.settings) {
            warn!(path = %source.path.display(), %err, "could not save settings");
        }
    }
    Ok(())
}

fn build_grid(rows: usize, cols: usize, seed: Option<&str>, settings: &Settings) -> Result<Grid> {
    let grid = Grid::with_policy(rows, cols, seed, settings.policy.clone())
        .with_context(|| format!("could not build a {rows}x{cols} map"))?;
    info!(rows, cols, seed = grid.seed(), "map ready");
    Ok(grid)
}

fn run_headless(args: &Args, settings: &Settings, steps: u64) -> Result<()> {
    let rows = args.rows.unwrap_or(48);
    let cols = args.cols.unwrap_or(80);
    let mut grid = build_grid(rows, cols, args.seed.as_deref(), settings)?;
    for _ in 0..steps {
        if settings.stop_when_stable && grid.is_stable() {
            break;
        }
        grid.step();
    }

    println!("seed       {}", grid.seed());
    println!("generation {}", grid.generation());
    println!("stable     {}", grid.is_stable());
    let census = grid.census();
    for t in Terrain::ALL {
        println!("{:<10} {}", t.name(), census[t.index()]);
    }
    Ok(())
}

struct App {
    settings: Settings,
    grid: Grid,
    rows: usize,
    cols: usize,
    paused: bool,
    show_hud: bool,
    should_quit: bool,
    term: TermGuard,
}

impl App {
    fn init(args: &Args, settings: Settings) -> Result<Self> {
        let (tw, th) = terminal::size().context("could not read terminal size")?;
        let (fit_rows, fit_cols) = fit_dims(tw, th, true);
        let rows = args.rows.unwrap_or(fit_rows);
        let cols = args.cols.unwrap_or(fit_cols);
        let grid = build_grid(rows, cols, args.seed.as_deref(), &settings)?;
        let term = TermGuard::new()?;

        Ok(Self {
            settings,
            grid,
            rows,
            cols,
            paused: args.paused,
            show_hud: true,
            should_quit: false,
            term,
        })
    }

    fn tick(&self) -> Duration {
        Duration::from_millis(self.settings.clamped_tick_ms())
    }

    fn state_label(&self) -> &'static str {
        if self.grid.is_stable() {
            "stable"
        } else if self.paused {
            "paused"
        } else {
            "running"
        }
    }

    fn rebuild(&mut self, seed: Option<String>) -> Result<()> {
        let seed = seed.unwrap_or_else(generate_seed);
        self.grid = build_grid(self.rows, self.cols, Some(seed.as_str()), &self.settings)?;
        Ok(())
    }

    fn advance(&mut self) {
        self.grid.step();
        if self.settings.stop_when_stable && !self.paused && self.grid.is_stable() {
            self.paused = true;
            info!(
                generation = self.grid.generation(),
                seed = self.grid.seed(),
                "map settled"
            );
        }
    }

    fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePause => self.paused = !self.paused,
            Action::Step => {
                self.paused = true;
                self.advance();
            }
            Action::Reset => self.rebuild(Some(self.grid.seed().to_owned()))?,
            Action::NewMap => self.rebuild(None)?,
            Action::Faster => {
                self.settings.tick_ms = (self.settings.clamped_tick_ms() * 4 / 5).max(MIN_TICK_MS)
            }
            Action::Slower => {
                self.settings.tick_ms =
                    (self.settings.clamped_tick_ms() * 5 / 4 + 1).min(MAX_TICK_MS)
            }
            Action::HudToggle => self.show_hud = !self.show_hud,
            Action::Redraw => {}
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let hud = Hud {
            seed: self.grid.seed(),
            generation: self.grid.generation(),
            changes: self.grid.last_step_changes(),
            tick_ms: self.settings.clamped_tick_ms(),
            state: self.state_label(),
        };
        let hud = self.show_hud.then_some(&hud);
        draw(&mut self.term.out, &self.grid, hud)?;
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let mut last_step = Instant::now();
        let mut dirty = true;

        while !self.should_quit {
            for action in collect_input_nonblocking(self.tick())? {
                self.apply(action)?;
                dirty = true;
                if self.should_quit {
                    break;
                }
            }

            if !self.paused && last_step.elapsed() >= self.tick() {
                last_step = Instant::now();
                self.advance();
                dirty = true;
            }

            if dirty {
                self.render()?;
                dirty = false;
            }

            std::thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    }
}
