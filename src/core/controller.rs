/// Top-level application state machine: menu, running session, shutdown.
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::assets::{AssetResolver, BackgroundProvider};
use crate::core::font::FontMetrics;
use crate::core::layout::MonospaceMetrics;
use crate::core::menu::{Menu, MenuAction};
use crate::core::render::{compose, DialogueBoxLayout, Frame, MenuFrame, Renderer, SceneFrame, WrapCache};
use crate::core::session::{AdvanceOutcome, DialogueSession};
use crate::core::store::NarrativeStore;
use crate::schema::config::{AutoAdvanceConfig, EngineConfig, Key, KeyBindings};

/// Which screen the application is on. The running session lives inside
/// `Playing` and is dropped when the mode changes.
pub enum ApplicationMode {
    Menu,
    Playing(DialogueSession),
    Quitting,
}

impl ApplicationMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Playing(_) => "playing",
            Self::Quitting => "quitting",
        }
    }

    pub fn is_menu(&self) -> bool {
        matches!(self, Self::Menu)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing(_))
    }

    pub fn is_quitting(&self) -> bool {
        matches!(self, Self::Quitting)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Input events, already translated from the platform's event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    PointerMoved { x: i32, y: i32 },
    PointerPressed { x: i32, y: i32, button: PointerButton },
    KeyPressed(Key),
    /// The window or the system asked the application to close.
    CloseRequested,
}

/// A change of [`ApplicationMode`] caused by an input, action or update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    /// Menu → Playing with a fresh session.
    SessionStarted,
    /// The session walked past its last line; back to the menu.
    SessionFinished,
    /// The player left the session early; back to the menu.
    SessionAbandoned,
    Quitting,
}

/// Frame-delta accumulator for auto-advance. Evaluated synchronously once
/// per frame; reset whenever the displayed line changes.
#[derive(Debug, Clone)]
pub struct AutoAdvance {
    enabled: bool,
    delay: Duration,
    elapsed: Duration,
}

impl AutoAdvance {
    pub fn new(config: &AutoAdvanceConfig) -> Self {
        Self {
            enabled: config.enabled,
            delay: Duration::from_millis(config.delay_ms),
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        self.elapsed = Duration::ZERO;
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Add a frame's delta; true when the delay has elapsed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.enabled {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.delay {
            self.elapsed = Duration::ZERO;
            return true;
        }
        false
    }
}

/// Caps the loop at the configured frame rate.
#[derive(Debug)]
pub struct FrameClock {
    frame: Duration,
    last: Instant,
}

impl FrameClock {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            frame: config.frame_duration(),
            last: Instant::now(),
        }
    }

    /// Sleep out the rest of the current frame and return the time since
    /// the previous tick.
    pub fn tick(&mut self) -> Duration {
        let spent = self.last.elapsed();
        if spent < self.frame {
            std::thread::sleep(self.frame - spent);
        }
        let now = Instant::now();
        let dt = now - self.last;
        self.last = now;
        dt
    }
}

/// Owns the application mode and routes input to the menu or the session.
pub struct Controller<P = AssetResolver> {
    store: Arc<NarrativeStore>,
    assets: P,
    mode: ApplicationMode,
    menu: Menu,
    keys: KeyBindings,
    box_layout: DialogueBoxLayout,
    body_font: FontMetrics,
    auto: AutoAdvance,
    wrap_cache: WrapCache,
}

/// Builder for constructing a `Controller`.
pub struct ControllerBuilder<P> {
    store: Arc<NarrativeStore>,
    assets: P,
    config: EngineConfig,
    menu: Option<Menu>,
    body_font: Option<FontMetrics>,
}

impl<P: BackgroundProvider> Controller<P> {
    pub fn builder(store: Arc<NarrativeStore>, assets: P) -> ControllerBuilder<P> {
        ControllerBuilder {
            store,
            assets,
            config: EngineConfig::default(),
            menu: None,
            body_font: None,
        }
    }

    pub fn mode(&self) -> &ApplicationMode {
        &self.mode
    }

    pub fn session(&self) -> Option<&DialogueSession> {
        match &self.mode {
            ApplicationMode::Playing(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.mode.is_quitting()
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn assets(&self) -> &P {
        &self.assets
    }

    pub fn box_layout(&self) -> &DialogueBoxLayout {
        &self.box_layout
    }

    pub fn auto_advance_enabled(&self) -> bool {
        self.auto.is_enabled()
    }

    pub fn wrap_cache(&self) -> &WrapCache {
        &self.wrap_cache
    }

    /// Apply a menu action. Actions only mean something on the menu screen.
    pub fn dispatch(&mut self, action: MenuAction) -> Option<ModeChange> {
        if !self.mode.is_menu() {
            log::debug!("ignoring {:?} while {}", action, self.mode.name());
            return None;
        }
        match action {
            MenuAction::Play => self.start_session(),
            MenuAction::Credits => {
                log::debug!("credits selected, nothing to show");
                None
            }
            MenuAction::Exit => self.quit(),
        }
    }

    pub fn handle_input(&mut self, input: Input) -> Option<ModeChange> {
        if input == Input::CloseRequested {
            return self.quit();
        }
        match self.mode {
            ApplicationMode::Menu => self.handle_menu_input(input),
            ApplicationMode::Playing(_) => self.handle_session_input(input),
            ApplicationMode::Quitting => None,
        }
    }

    /// Per-frame update; drives auto-advance.
    pub fn update(&mut self, dt: Duration) -> Option<ModeChange> {
        if !self.mode.is_playing() {
            return None;
        }
        if self.auto.tick(dt) {
            return self.advance();
        }
        None
    }

    /// The view for the current frame.
    pub fn frame(&self) -> Frame<'_> {
        match &self.mode {
            ApplicationMode::Menu => Frame::Menu(MenuFrame {
                background: self.menu.background.as_ref(),
                buttons: &self.menu.buttons,
            }),
            ApplicationMode::Playing(session) => Frame::Scene(SceneFrame {
                background: session.background(),
                dialogue: session.current_dialogue(),
                text: self.wrap_cache.text(),
            }),
            ApplicationMode::Quitting => Frame::Closed,
        }
    }

    /// Compose the current frame and hand it to `renderer`.
    pub fn draw(&self, renderer: &mut dyn Renderer) {
        let commands = compose(&self.frame(), &self.box_layout);
        if commands.is_empty() {
            return;
        }
        renderer.draw(&commands);
        renderer.present();
    }

    fn handle_menu_input(&mut self, input: Input) -> Option<ModeChange> {
        match input {
            Input::PointerMoved { x, y } => {
                self.menu.update_hover(x, y);
                None
            }
            Input::PointerPressed {
                x,
                y,
                button: PointerButton::Primary,
            } => {
                self.menu.update_hover(x, y);
                let action = self.menu.button_at(x, y).map(|b| b.action)?;
                self.dispatch(action)
            }
            Input::KeyPressed(key) if key == self.keys.quit => self.quit(),
            _ => None,
        }
    }

    fn handle_session_input(&mut self, input: Input) -> Option<ModeChange> {
        match input {
            Input::PointerPressed {
                button: PointerButton::Primary,
                ..
            } => self.advance(),
            Input::KeyPressed(key) if key == self.keys.advance => self.advance(),
            Input::KeyPressed(key) if key == self.keys.quit => self.leave_session(),
            Input::KeyPressed(key) if key == self.keys.toggle_auto => {
                self.auto.toggle();
                log::info!(
                    "auto-advance {}",
                    if self.auto.is_enabled() { "on" } else { "off" }
                );
                None
            }
            _ => None,
        }
    }

    fn start_session(&mut self) -> Option<ModeChange> {
        let session = DialogueSession::new(Arc::clone(&self.store), &mut self.assets);
        self.wrap_cache.clear();
        self.auto.reset();

        if session.is_finished() {
            log::info!("story has no scenes, staying on the menu");
            return Some(ModeChange::SessionFinished);
        }

        log::debug!("menu -> playing");
        self.mode = ApplicationMode::Playing(session);
        self.refresh_text();
        Some(ModeChange::SessionStarted)
    }

    fn advance(&mut self) -> Option<ModeChange> {
        let ApplicationMode::Playing(session) = &mut self.mode else {
            return None;
        };
        let outcome = session.advance(&mut self.assets);
        self.auto.reset();

        if outcome == AdvanceOutcome::Finished {
            log::debug!("playing -> menu (finished)");
            self.mode = ApplicationMode::Menu;
            self.wrap_cache.clear();
            return Some(ModeChange::SessionFinished);
        }
        self.refresh_text();
        None
    }

    fn leave_session(&mut self) -> Option<ModeChange> {
        log::debug!("playing -> menu (abandoned)");
        self.mode = ApplicationMode::Menu;
        self.wrap_cache.clear();
        Some(ModeChange::SessionAbandoned)
    }

    fn quit(&mut self) -> Option<ModeChange> {
        if self.mode.is_quitting() {
            return None;
        }
        log::debug!("{} -> quitting", self.mode.name());
        self.mode = ApplicationMode::Quitting;
        self.wrap_cache.clear();
        Some(ModeChange::Quitting)
    }

    fn refresh_text(&mut self) {
        let ApplicationMode::Playing(session) = &self.mode else {
            return;
        };
        let position = (!session.is_finished())
            .then(|| (session.current_scene_index(), session.current_line_index()));
        self.wrap_cache.layout(
            position,
            session.current_dialogue(),
            &self.body_font,
            self.box_layout.wrap_width,
            self.box_layout.max_lines,
        );
    }
}

impl<P: BackgroundProvider> ControllerBuilder<P> {
    pub fn config(mut self, config: &EngineConfig) -> Self {
        self.config = config.clone();
        self
    }

    pub fn menu(mut self, menu: Menu) -> Self {
        self.menu = Some(menu);
        self
    }

    /// Metrics used to wrap dialogue text. Defaults to fixed-width metrics
    /// at the configured dialogue font size.
    pub fn body_font(mut self, font: FontMetrics) -> Self {
        self.body_font = Some(font);
        self
    }

    pub fn build(self) -> Controller<P> {
        let viewport = (self.config.screen.width, self.config.screen.height);
        let body_font = self.body_font.unwrap_or_else(|| {
            FontMetrics::Fallback(MonospaceMetrics::for_size(self.config.fonts.dialog_size))
        });

        Controller {
            store: self.store,
            assets: self.assets,
            mode: ApplicationMode::Menu,
            menu: self.menu.unwrap_or_else(|| Menu::plain(viewport)),
            keys: self.config.keys.clone(),
            box_layout: DialogueBoxLayout::from_config(&self.config),
            body_font,
            auto: AutoAdvance::new(&self.config.auto_advance),
            wrap_cache: WrapCache::new(),
        }
    }
}
