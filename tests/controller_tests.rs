/// Controller integration tests: menu, sessions and the draw path.
use novel_engine::core::assets::{AssetResolver, Background, BackgroundProvider};
use novel_engine::core::controller::{ApplicationMode, Controller, Input, ModeChange, PointerButton};
use novel_engine::core::layout::TextMeasure;
use novel_engine::core::menu::{find_assets_dir, MenuAction, MenuAssets};
use novel_engine::core::render::{DialogueBoxLayout, DrawCommand, Renderer, TextRole};
use novel_engine::core::session::SessionState;
use novel_engine::core::store::NarrativeStore;
use novel_engine::schema::config::{EngineConfig, Key};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct NullAssets {
    requests: usize,
}

impl BackgroundProvider for NullAssets {
    fn background(&mut self, _reference: &str) -> Option<Background> {
        self.requests += 1;
        None
    }
}

#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<Vec<DrawCommand>>,
    presented: usize,
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, commands: &[DrawCommand]) {
        self.frames.push(commands.to_vec());
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}

impl RecordingRenderer {
    fn texts(&self, role: TextRole) -> Vec<String> {
        self.frames
            .last()
            .into_iter()
            .flatten()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, role: r, .. } if *r == role => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

fn controller(fixture: &str) -> Controller<NullAssets> {
    controller_with(fixture, &EngineConfig::default())
}

fn controller_with(fixture: &str, config: &EngineConfig) -> Controller<NullAssets> {
    let store = NarrativeStore::open(&Path::new("tests/fixtures").join(fixture));
    Controller::builder(Arc::new(store), NullAssets::default())
        .config(config)
        .build()
}

fn position(ctl: &Controller<NullAssets>) -> Option<SessionState> {
    ctl.session().map(|s| s.state())
}

fn click(x: i32, y: i32) -> Input {
    Input::PointerPressed {
        x,
        y,
        button: PointerButton::Primary,
    }
}

#[test]
fn starts_on_menu() {
    let ctl = controller("two_scenes.yml");
    assert!(ctl.mode().is_menu());
    assert!(ctl.session().is_none());
    assert!(ctl.is_running());
}

#[test]
fn play_button_starts_session() {
    let mut ctl = controller("two_scenes.yml");
    assert_eq!(ctl.handle_input(click(100, 400)), Some(ModeChange::SessionStarted));
    assert_eq!(position(&ctl), Some(SessionState::Active { scene: 0, line: 0 }));
    assert_eq!(ctl.assets().requests, 1);
}

#[test]
fn exit_button_quits() {
    let mut ctl = controller("two_scenes.yml");
    assert_eq!(ctl.handle_input(click(100, 900)), Some(ModeChange::Quitting));
    assert!(ctl.mode().is_quitting());
    assert!(!ctl.is_running());
}

#[test]
fn clicks_outside_buttons_do_nothing() {
    let mut ctl = controller("two_scenes.yml");
    assert_eq!(ctl.handle_input(click(1500, 100)), None);
    assert_eq!(ctl.handle_input(click(100, 582)), None);
    assert!(ctl.mode().is_menu());
}

#[test]
fn credits_is_a_no_op() {
    let mut ctl = controller("two_scenes.yml");
    assert_eq!(ctl.dispatch(MenuAction::Credits), None);
    assert!(ctl.mode().is_menu());
}

#[test]
fn playthrough_returns_to_menu() {
    let mut ctl = controller("two_scenes.yml");
    ctl.dispatch(MenuAction::Play);

    assert_eq!(ctl.handle_input(Input::KeyPressed(Key::Space)), None);
    assert_eq!(position(&ctl), Some(SessionState::Active { scene: 1, line: 0 }));
    assert_eq!(ctl.handle_input(click(10, 10)), None);
    assert_eq!(position(&ctl), Some(SessionState::Active { scene: 1, line: 1 }));

    assert_eq!(
        ctl.handle_input(Input::KeyPressed(Key::Space)),
        Some(ModeChange::SessionFinished)
    );
    assert!(matches!(ctl.mode(), ApplicationMode::Menu));
    assert!(ctl.session().is_none());
}

#[test]
fn replay_after_finishing_starts_fresh() {
    let mut ctl = controller("two_scenes.yml");
    ctl.dispatch(MenuAction::Play);
    while ctl.mode().is_playing() {
        ctl.handle_input(Input::KeyPressed(Key::Enter));
        ctl.handle_input(Input::KeyPressed(Key::Space));
    }

    assert_eq!(ctl.dispatch(MenuAction::Play), Some(ModeChange::SessionStarted));
    assert_eq!(position(&ctl), Some(SessionState::Active { scene: 0, line: 0 }));
    assert_eq!(ctl.session().unwrap().history().len(), 1);
}

#[test]
fn abandoned_session_is_not_resumed() {
    let mut ctl = controller("two_scenes.yml");
    ctl.dispatch(MenuAction::Play);
    ctl.handle_input(Input::KeyPressed(Key::Space));
    ctl.handle_input(Input::KeyPressed(Key::Space));
    assert_eq!(position(&ctl), Some(SessionState::Active { scene: 1, line: 1 }));

    assert_eq!(
        ctl.handle_input(Input::KeyPressed(Key::Escape)),
        Some(ModeChange::SessionAbandoned)
    );
    assert!(ctl.mode().is_menu());

    ctl.dispatch(MenuAction::Play);
    assert_eq!(position(&ctl), Some(SessionState::Active { scene: 0, line: 0 }));
}

#[test]
fn escape_on_menu_quits() {
    let mut ctl = controller("two_scenes.yml");
    assert_eq!(
        ctl.handle_input(Input::KeyPressed(Key::Escape)),
        Some(ModeChange::Quitting)
    );
    assert!(ctl.mode().is_quitting());
}

#[test]
fn close_request_quits_from_any_mode() {
    let mut ctl = controller("two_scenes.yml");
    assert_eq!(ctl.handle_input(Input::CloseRequested), Some(ModeChange::Quitting));

    let mut ctl = controller("two_scenes.yml");
    ctl.dispatch(MenuAction::Play);
    assert_eq!(ctl.handle_input(Input::CloseRequested), Some(ModeChange::Quitting));
    assert!(ctl.session().is_none());

    // already quitting
    assert_eq!(ctl.handle_input(Input::CloseRequested), None);
    assert_eq!(ctl.handle_input(Input::KeyPressed(Key::Space)), None);
    assert_eq!(ctl.dispatch(MenuAction::Play), None);
}

#[test]
fn menu_actions_ignored_while_playing() {
    let mut ctl = controller("two_scenes.yml");
    ctl.dispatch(MenuAction::Play);
    assert_eq!(ctl.dispatch(MenuAction::Exit), None);
    assert!(ctl.mode().is_playing());
}

#[test]
fn empty_story_stays_on_menu() {
    let mut ctl = controller("no_scenes.yml");
    assert_eq!(ctl.dispatch(MenuAction::Play), Some(ModeChange::SessionFinished));
    assert!(ctl.mode().is_menu());

    let mut ctl = controller("malformed.yml");
    assert_eq!(ctl.dispatch(MenuAction::Play), Some(ModeChange::SessionFinished));
    assert!(ctl.mode().is_menu());
}

#[test]
fn auto_advance_follows_frame_time() {
    let mut config = EngineConfig::default();
    config.auto_advance.enabled = true;
    config.auto_advance.delay_ms = 100;
    let mut ctl = controller_with("two_scenes.yml", &config);

    // only runs while playing
    assert_eq!(ctl.update(Duration::from_millis(500)), None);
    ctl.dispatch(MenuAction::Play);

    ctl.update(Duration::from_millis(60));
    assert_eq!(position(&ctl), Some(SessionState::Active { scene: 0, line: 0 }));
    ctl.update(Duration::from_millis(60));
    assert_eq!(position(&ctl), Some(SessionState::Active { scene: 1, line: 0 }));

    // a manual advance restarts the countdown
    ctl.update(Duration::from_millis(90));
    ctl.handle_input(Input::KeyPressed(Key::Space));
    ctl.update(Duration::from_millis(90));
    assert_eq!(position(&ctl), Some(SessionState::Active { scene: 1, line: 1 }));

    assert_eq!(
        ctl.update(Duration::from_millis(100)),
        Some(ModeChange::SessionFinished)
    );
}

#[test]
fn auto_advance_toggle_key() {
    let mut ctl = controller("two_scenes.yml");
    ctl.dispatch(MenuAction::Play);
    assert!(!ctl.auto_advance_enabled());
    ctl.update(Duration::from_secs(10));
    assert_eq!(position(&ctl), Some(SessionState::Active { scene: 0, line: 0 }));

    ctl.handle_input(Input::KeyPressed(Key::Char('a')));
    assert!(ctl.auto_advance_enabled());
    ctl.update(Duration::from_millis(3000));
    assert_eq!(position(&ctl), Some(SessionState::Active { scene: 1, line: 0 }));
}

#[test]
fn draws_menu_then_scene() {
    let mut ctl = controller("two_scenes.yml");
    let mut renderer = RecordingRenderer::default();

    ctl.draw(&mut renderer);
    assert_eq!(renderer.texts(TextRole::Button), ["PLAY", "CREDITS", "EXIT"]);

    ctl.dispatch(MenuAction::Play);
    ctl.draw(&mut renderer);
    assert_eq!(renderer.texts(TextRole::Name), ["DEXTER"]);
    assert_eq!(renderer.texts(TextRole::Body), ["First and only line of A."]);
    assert_eq!(renderer.texts(TextRole::Hint), ["Click to continue..."]);
    assert!(matches!(renderer.frames[1][0], DrawCommand::Fill(_)));
    assert_eq!(renderer.presented, 2);
}

#[test]
fn nothing_drawn_when_quitting() {
    let mut ctl = controller("two_scenes.yml");
    ctl.handle_input(Input::CloseRequested);
    let mut renderer = RecordingRenderer::default();
    ctl.draw(&mut renderer);
    assert!(renderer.frames.is_empty());
    assert_eq!(renderer.presented, 0);
}

#[test]
fn wrap_is_computed_once_per_line() {
    let mut ctl = controller("two_scenes.yml");
    ctl.dispatch(MenuAction::Play);
    let mut renderer = RecordingRenderer::default();
    for _ in 0..5 {
        ctl.draw(&mut renderer);
    }
    assert_eq!(ctl.wrap_cache().computed(), 1);

    ctl.handle_input(Input::KeyPressed(Key::Space));
    ctl.draw(&mut renderer);
    assert_eq!(ctl.wrap_cache().computed(), 2);
}

#[test]
fn long_line_is_wrapped_inside_the_box() {
    let mut config = EngineConfig::default();
    config.screen.width = 400;
    let store = NarrativeStore::open(Path::new("story_data/dialogues.yml"));
    let mut ctl = Controller::builder(Arc::new(store), NullAssets::default())
        .config(&config)
        .build();
    ctl.dispatch(MenuAction::Play);

    let width = ctl.box_layout().wrap_width;
    let text = ctl.wrap_cache().text();
    assert!(text.len() > 1);
    assert!(text.visible().len() <= 3);
    for line in text.lines() {
        // fallback metrics: half the font size per character
        let measured = line.chars().count() as f32 * config.fonts.dialog_size * 0.5;
        assert!(measured <= width || !line.contains(' '), "{:?} overflows", line);
    }
}

#[test]
fn box_layout_follows_config_geometry() {
    let config =
        EngineConfig::parse_ron("(screen: (width: 800), dialogue_box: (margin: 5000))").unwrap();
    let ctl = controller_with("two_scenes.yml", &config);
    assert_eq!(*ctl.box_layout(), DialogueBoxLayout::from_config(&config));
    assert_eq!(ctl.box_layout().wrap_width, 0.0);
}

#[test]
fn discovered_font_drives_dialogue_wrap() {
    let dir = tempfile::tempdir().unwrap();
    let menu_dir = dir.path().join("menu_assets");
    std::fs::create_dir(&menu_dir).unwrap();
    std::fs::copy(
        "tests/fixtures/fonts/DejaVuSans-ExtraLight.ttf",
        menu_dir.join("title.ttf"),
    )
    .unwrap();

    let mut config = EngineConfig::default();
    config.screen.width = 400;
    let assets = AssetResolver::from_config(dir.path(), &config);
    let menu_assets = MenuAssets::discover(&find_assets_dir(dir.path()));
    let fonts = assets.fonts(&config.fonts, menu_assets.font.as_deref());
    assert!(!fonts.body.is_fallback());
    let measure = fonts.body.clone();

    let store = NarrativeStore::open(Path::new("story_data/dialogues.yml"));
    let mut ctl = Controller::builder(Arc::new(store), NullAssets::default())
        .config(&config)
        .body_font(fonts.body)
        .build();
    ctl.dispatch(MenuAction::Play);

    let width = ctl.box_layout().wrap_width;
    let text = ctl.wrap_cache().text();
    assert!(text.len() > 1);
    for line in text.lines() {
        assert!(measure.measure(line) <= width, "{:?} overflows", line);
    }
}
