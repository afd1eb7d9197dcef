mod ui;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use knight_quiz::build_info;
use knight_quiz::core::constants::{LOG_FILE_NAME, TICK_INTERVAL_MS};
use knight_quiz::core::{Game, GameConfig, Mode, PlayerInput};
use knight_quiz::save_manager::SaveManager;
use knight_quiz::world::JsonWorldSource;
use rand::Rng;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use ui::UiState;

/// What a key press turns into
enum KeyAction {
    Send(PlayerInput),
    Restart,
    Quit,
    Nothing,
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut world_arg = None;

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" | "-v" => {
                println!("knight-quiz {}", build_info::version_string());
                std::process::exit(0);
            }
            "--help" | "-h" => {
                println!("Knight Quiz - Terminal Quiz Adventure\n");
                println!("Usage: knight-quiz [world-id]\n");
                println!("Arguments:");
                println!("  world-id   Start a new run in this world instead of resuming");
                println!("  --version  Show version information");
                println!("  --help     Show this help message\n");
                println!("Environment:");
                println!("  KNIGHT_DATA_DIR        Directory with maps.json, questions.json, lessons.json");
                println!("  KNIGHT_SAVE_DIR        Where saves and knight.log are written");
                println!("  KNIGHT_START_WORLD     World for a new run (default world_1)");
                println!("  KNIGHT_TURN_TIME_MS    Time to answer each question");
                println!("  KNIGHT_QTE_TIMEOUT_MS  Time to block an attack, 0 = unlimited");
                println!("  KNIGHT_LOG             Log filter (default knight_quiz=info)");
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown option: {}", other);
                eprintln!("Run 'knight-quiz --help' for usage.");
                std::process::exit(1);
            }
            other => world_arg = Some(other.to_string()),
        }
    }

    dotenvy::dotenv().ok();
    let config = match GameConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let saves = match SaveManager::from_override(config.save_dir.as_deref()) {
        Ok(saves) => Some(saves),
        Err(e) => {
            eprintln!("Warning: saving disabled ({})", e);
            None
        }
    };
    if let Some(saves) = saves.as_ref() {
        init_logging(saves.dir());
    }

    let source = JsonWorldSource::new(&config.data_dir);
    let mut game = Game::new(Box::new(source), saves, config.combat, rand::thread_rng());

    let started = match &world_arg {
        Some(world) => game.start_new_run(world),
        None => game.resume_or_start(&config.start_world),
    };
    let start_world = world_arg.unwrap_or_else(|| config.start_world.clone());
    let mut ui_state = UiState::new();
    match started {
        Ok(events) => ui_state.apply(&events),
        Err(e) => {
            eprintln!("Could not load world '{}': {}", start_world, e);
            eprintln!("Data directory: {}", config.data_dir.display());
            std::process::exit(1);
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_game_loop(&mut terminal, &mut game, &mut ui_state, &start_world);

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Sends tracing output to knight.log next to the save file.
fn init_logging(dir: &Path) {
    let file = match fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: logging disabled ({})", e);
            return;
        }
    };

    let filter = EnvFilter::try_from_env("KNIGHT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("knight_quiz=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn run_game_loop<R: Rng>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    game: &mut Game<R>,
    ui_state: &mut UiState,
    start_world: &str,
) -> io::Result<()> {
    let tick_interval = Duration::from_millis(TICK_INTERVAL_MS);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| ui::draw_ui(frame, game, ui_state))?;

        let timeout = tick_interval.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match map_key(key, game, ui_state) {
                        KeyAction::Send(input) => {
                            let events = game.handle_input(input);
                            ui_state.apply(&events);
                        }
                        KeyAction::Restart => match game.start_new_run(start_world) {
                            Ok(events) => {
                                *ui_state = UiState::new();
                                ui_state.apply(&events);
                            }
                            Err(e) => tracing::error!("Could not restart: {}", e),
                        },
                        KeyAction::Quit => return Ok(()),
                        KeyAction::Nothing => {}
                    }
                }
            }
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_interval {
            last_tick = Instant::now();
            let delta_ms = elapsed.as_millis() as u64;
            let events = game.tick(delta_ms);
            ui_state.apply(&events);
            ui_state.tick(delta_ms);
        }
    }
}

fn map_key<R: Rng>(key: KeyEvent, game: &Game<R>, ui_state: &mut UiState) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    match game.mode() {
        Mode::Map => map_screen_key(key.code, game, ui_state),
        Mode::Combat => combat_key(key.code, game, ui_state),
        Mode::Lesson { .. } => match key.code {
            KeyCode::Left => KeyAction::Send(PlayerInput::PreviousPage),
            KeyCode::Right => KeyAction::Send(PlayerInput::NextPage),
            KeyCode::Enter | KeyCode::Esc => KeyAction::Send(PlayerInput::AcknowledgeLesson),
            KeyCode::Char('q') => KeyAction::Quit,
            _ => KeyAction::Nothing,
        },
        Mode::Interlude(_) => match key.code {
            KeyCode::Char('q') => KeyAction::Quit,
            _ => KeyAction::Nothing,
        },
        Mode::GameOver | Mode::RunComplete => match key.code {
            KeyCode::Enter => KeyAction::Restart,
            KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
            _ => KeyAction::Nothing,
        },
    }
}

fn map_screen_key<R: Rng>(code: KeyCode, game: &Game<R>, ui_state: &mut UiState) -> KeyAction {
    let clickable = ui::clickable_nodes(&game.map_view());
    let count = clickable.len();

    match code {
        KeyCode::Left | KeyCode::Up if count > 0 => {
            ui_state.map_cursor = (ui_state.map_cursor + count - 1) % count;
            KeyAction::Nothing
        }
        KeyCode::Right | KeyCode::Down if count > 0 => {
            ui_state.map_cursor = (ui_state.map_cursor + 1) % count;
            KeyAction::Nothing
        }
        KeyCode::Enter => {
            if game.pending_node().is_some() {
                KeyAction::Send(PlayerInput::ConfirmMove)
            } else {
                match clickable.get(ui_state.map_cursor) {
                    Some(id) => KeyAction::Send(PlayerInput::SelectNode(*id)),
                    None => KeyAction::Nothing,
                }
            }
        }
        KeyCode::Esc => KeyAction::Send(PlayerInput::CancelMove),
        KeyCode::Char(c @ '1'..='9') => {
            KeyAction::Send(PlayerInput::UseItem(c as usize - '1' as usize))
        }
        KeyCode::Char('q') => KeyAction::Quit,
        _ => KeyAction::Nothing,
    }
}

fn combat_key<R: Rng>(code: KeyCode, game: &Game<R>, ui_state: &mut UiState) -> KeyAction {
    let Some(combat) = game.state().combat.as_ref() else {
        return KeyAction::Nothing;
    };

    if combat.is_qte_active() {
        return match code {
            KeyCode::Char(' ') | KeyCode::Enter => KeyAction::Send(PlayerInput::ResolveQte),
            KeyCode::Esc => KeyAction::Quit,
            _ => KeyAction::Nothing,
        };
    }

    let free_text = combat
        .current_question
        .as_ref()
        .is_some_and(|q| q.is_free_text());

    if free_text {
        match code {
            KeyCode::Enter => KeyAction::Send(PlayerInput::SubmitText(ui_state.input_buffer.clone())),
            KeyCode::Backspace => {
                ui_state.input_buffer.pop();
                KeyAction::Nothing
            }
            KeyCode::Tab => KeyAction::Send(PlayerInput::UseHint),
            KeyCode::Char(c) => {
                ui_state.input_buffer.push(c);
                KeyAction::Nothing
            }
            KeyCode::Esc => KeyAction::Quit,
            _ => KeyAction::Nothing,
        }
    } else {
        match code {
            KeyCode::Char(c @ '1'..='4') => {
                KeyAction::Send(PlayerInput::Answer(c as usize - '1' as usize))
            }
            KeyCode::Char('h') | KeyCode::Tab => KeyAction::Send(PlayerInput::UseHint),
            KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
            _ => KeyAction::Nothing,
        }
    }
}
