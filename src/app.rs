use crate::input::{collect_input_nonblocking, map_event_to_command, UiCommand};
use crate::render::{draw_center_box, draw_hud, Hud, Screen, Terminal};
use anyhow::{anyhow, Context};
use petsim::clock::{Clock, MonotonicClock};
use petsim::config::{load_settings, project_paths, save_settings_atomic, Paths, Settings};
use petsim::storage::JsonFileStore;
use petsim::{ActionKind, Game, MeterStore};
use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub(crate) struct App {
    settings: Settings,
    paths: Paths,
    game: Game,
    screen: Screen,
    clock: MonotonicClock,
    term: Terminal,
    should_quit: bool,
    frame: u64,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let paths = project_paths()?;
        init_tracing(&paths)?;

        let settings = load_settings(&paths.settings_path);
        info!(?settings, "settings loaded");

        let store: Option<Box<dyn MeterStore>> = if settings.persist {
            Some(Box::new(JsonFileStore::new(&paths.save_path)))
        } else {
            None
        };
        let mut game = Game::new(settings.rules.clone(), store);
        let mut screen = Screen::new();
        let clock = MonotonicClock::new();
        game.start(clock.now_ms(), &mut screen);

        let term = Terminal::begin()?;

        Ok(Self {
            settings,
            paths,
            game,
            screen,
            clock,
            term,
            should_quit: false,
            frame: 0,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        while !self.should_quit {
            self.term.sync_size()?;

            let events = collect_input_nonblocking(frame_dt)?;
            for ev in events {
                let Some(cmd) = map_event_to_command(self.screen.end_screen.is_some(), &ev) else {
                    continue;
                };
                self.handle(cmd);
                if self.should_quit {
                    break;
                }
            }

            self.game.advance(self.clock.now_ms(), &mut self.screen);

            self.render_frame()?;
            self.frame += 1;

            spin_sleep(frame_dt, Instant::now());
        }
        Ok(())
    }

    fn handle(&mut self, cmd: UiCommand) {
        let now = self.clock.now_ms();
        match cmd {
            UiCommand::Quit => self.should_quit = true,
            UiCommand::Action(kind) => {
                // disabled buttons swallow the click
                if self.screen.inputs_enabled {
                    let _ = self.game.on_action_button_pressed(kind, now, &mut self.screen);
                }
            }
            UiCommand::Retry => {
                self.game.on_retry_pressed(&mut self.screen);
            }
            UiCommand::Continue => {
                self.game.on_continue_pressed(&mut self.screen);
            }
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        self.term.canvas.blank();

        let now = self.clock.now_ms();
        let mut cooldowns_ms = [0u64; 4];
        for (slot, kind) in cooldowns_ms.iter_mut().zip(ActionKind::ALL) {
            *slot = self.game.actions().cooldown_remaining(kind, now);
        }

        // sprite frames tick at roughly 1 Hz like the original sheets
        let anim_frame = (now / 1000) % 2;
        draw_hud(
            &mut self.term.canvas,
            &Hud {
                screen: &self.screen,
                cooldowns_ms,
                zombie: self.game.state().is_zombie,
                frame: anim_frame,
                enable_color: self.settings.enable_color,
            },
        );

        if let Some(reason) = self.screen.end_screen {
            draw_center_box(
                &mut self.term.canvas,
                "Game Over",
                &format!("{reason} reached 0.\n\n[R] Retry with full meters\n[C] Continue?"),
            );
        }

        self.term.present()?;
        Ok(())
    }
}

fn init_tracing(paths: &Paths) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)
        .with_context(|| format!("opening {}", paths.log_path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

pub(crate) fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    let result = app.run();
    app.term.end()?;
    save_settings_atomic(&app.paths.settings_path, &app.settings)?;
    info!(frames = app.frame, "shutdown");
    result
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
