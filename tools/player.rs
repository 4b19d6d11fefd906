/// Player: plays a story in the terminal through the engine's controller.
///
/// Usage: player --story <path> [--config <path>] [--assets <dir>]
///
/// Commands:
///   <enter>, next        advance the story
///   play, credits, exit  menu buttons
///   back                 leave the story for the menu
///   auto                 toggle auto-advance
///   wait <secs>          run frames for a while (drives auto-advance)
///   log                  show the lines seen so far
///   quit                 close the player

use novel_engine::core::assets::AssetResolver;
use novel_engine::core::controller::{Controller, FrameClock, Input, ModeChange};
use novel_engine::core::menu::{find_assets_dir, Menu, MenuAction, MenuAssets};
use novel_engine::core::render::{DrawCommand, Renderer, TextRole};
use novel_engine::core::store::NarrativeStore;
use novel_engine::schema::config::EngineConfig;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Prints the text of each frame; images and shapes are summarized.
#[derive(Default)]
struct TerminalRenderer {
    last: Vec<String>,
    pending: Vec<String>,
}

impl Renderer for TerminalRenderer {
    fn draw(&mut self, commands: &[DrawCommand]) {
        self.pending.clear();
        for command in commands {
            match command {
                DrawCommand::Image { image, rect } if rect.x == 0 && rect.y == 0 => {
                    self.pending.push(format!("[{}]", image.source().display()));
                }
                DrawCommand::Text { text, role, .. } => {
                    let line = match role {
                        TextRole::Name => format!("{}:", text),
                        TextRole::Body => format!("  {}", text),
                        TextRole::Hint => format!("{:>60}", text),
                        TextRole::Button => format!("  < {} >", text),
                    };
                    self.pending.push(line);
                }
                _ => {}
            }
        }
    }

    fn present(&mut self) {
        if self.pending == self.last {
            return;
        }
        println!();
        for line in &self.pending {
            println!("{}", line);
        }
        self.last = std::mem::take(&mut self.pending);
    }
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut story_path = None;
    let mut config_path = None;
    let mut assets_dir = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--story" if i + 1 < args.len() => {
                i += 1;
                story_path = Some(PathBuf::from(&args[i]));
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(PathBuf::from(&args[i]));
            }
            "--assets" if i + 1 < args.len() => {
                i += 1;
                assets_dir = Some(PathBuf::from(&args[i]));
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(story_path) = story_path else {
        eprintln!("ERROR: --story is required");
        print_usage();
        std::process::exit(1);
    };

    let config = config_path
        .as_deref()
        .map(EngineConfig::load_or_default)
        .unwrap_or_default();
    let assets_dir = assets_dir.unwrap_or_else(|| {
        story_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });

    let store = Arc::new(NarrativeStore::open(&story_path));
    println!(
        "Loaded {} scenes, {} lines",
        store.scene_count(),
        store.line_count()
    );

    let assets = AssetResolver::from_config(assets_dir.clone(), &config);
    let menu_assets = MenuAssets::discover(&find_assets_dir(&assets_dir));
    let menu = Menu::new(&menu_assets, assets.viewport());
    let fonts = assets.fonts(&config.fonts, menu_assets.font.as_deref());

    let mut controller = Controller::builder(store, assets)
        .config(&config)
        .menu(menu)
        .body_font(fonts.body)
        .build();

    let mut renderer = TerminalRenderer::default();
    let mut clock = FrameClock::new(&config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("Type 'help' for commands.");
    controller.draw(&mut renderer);

    while controller.is_running() {
        print!("{}> ", controller.mode().name());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                controller.handle_input(Input::CloseRequested);
                break;
            }
            Ok(_) => {}
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts.first().map(|s| s.to_lowercase()).unwrap_or_default();

        let change = match cmd.as_str() {
            "" | "next" => controller.handle_input(Input::KeyPressed(config.keys.advance)),
            "play" => controller.dispatch(MenuAction::Play),
            "credits" => {
                println!("Credits are not available.");
                controller.dispatch(MenuAction::Credits)
            }
            "exit" => controller.dispatch(MenuAction::Exit),
            "back" => controller.handle_input(Input::KeyPressed(config.keys.quit)),
            "auto" => {
                let change = controller.handle_input(Input::KeyPressed(config.keys.toggle_auto));
                println!(
                    "Auto-advance {}",
                    if controller.auto_advance_enabled() { "on" } else { "off" }
                );
                change
            }
            "wait" => {
                let secs: f32 = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(1.0);
                run_frames(&mut controller, &mut clock, &mut renderer, secs)
            }
            "log" => {
                print_backlog(&controller);
                None
            }
            "quit" | "q" => controller.handle_input(Input::CloseRequested),
            "help" | "h" | "?" => {
                print_help();
                None
            }
            _ => {
                println!("Unknown command: {}", cmd);
                None
            }
        };

        report(change);
        controller.draw(&mut renderer);
    }

    println!("Goodbye.");
}

/// Run the frame loop for `secs` seconds of wall time.
fn run_frames(
    controller: &mut Controller,
    clock: &mut FrameClock,
    renderer: &mut TerminalRenderer,
    secs: f32,
) -> Option<ModeChange> {
    let budget = Duration::from_secs_f32(secs.max(0.0));
    let mut elapsed = Duration::ZERO;
    clock.tick();
    while elapsed < budget && controller.mode().is_playing() {
        let dt = clock.tick();
        elapsed += dt;
        if let Some(change) = controller.update(dt) {
            return Some(change);
        }
        controller.draw(renderer);
    }
    None
}

fn report(change: Option<ModeChange>) {
    match change {
        Some(ModeChange::SessionStarted) => println!("--- Story started ---"),
        Some(ModeChange::SessionFinished) => println!("--- The End ---"),
        Some(ModeChange::SessionAbandoned) => println!("--- Back to menu ---"),
        Some(ModeChange::Quitting) | None => {}
    }
}

fn print_backlog(controller: &Controller) {
    let Some(session) = controller.session() else {
        println!("No story is playing.");
        return;
    };
    println!("\n--- Backlog ---");
    for line in session.history_lines() {
        println!("{}: {}", line.character, line.text);
    }
    println!("--- End ---\n");
}

fn print_usage() {
    println!("Usage: player --story <path> [--config <path>] [--assets <dir>]");
}

fn print_help() {
    println!("Commands:");
    println!("  <enter>, next        advance the story");
    println!("  play, credits, exit  menu buttons");
    println!("  back                 leave the story for the menu");
    println!("  auto                 toggle auto-advance");
    println!("  wait <secs>          run frames for a while");
    println!("  log                  show the lines seen so far");
    println!("  quit                 close the player");
}
