/// Dialogue session: one playthrough's walk through the narrative store.
///
/// The walk is monotonic over the flattened (scene, line) sequence: lines
/// advance within a scene, the last line of a scene moves to the first
/// line of the next, and the last line of the last scene finishes the
/// session. There is no way back and no branching.
use std::sync::Arc;

use crate::core::assets::{Background, BackgroundProvider};
use crate::core::store::NarrativeStore;
use crate::schema::scene::{DialogueLine, Scene};

/// Position of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active { scene: usize, line: usize },
    Finished,
}

/// What a call to [`DialogueSession::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the next line of the same scene.
    NextLine,
    /// Entered the scene at this index; its background was requested.
    NextScene(usize),
    /// Walked past the last line of the last scene.
    Finished,
    /// The session was already finished; nothing changed.
    Ignored,
}

pub struct DialogueSession {
    store: Arc<NarrativeStore>,
    state: SessionState,
    background: Option<Background>,
    history: Vec<(usize, usize)>,
}

impl DialogueSession {
    /// Start a session at the first line of the first scene, or finished
    /// straight away when the store holds no scenes.
    pub fn new(store: Arc<NarrativeStore>, assets: &mut dyn BackgroundProvider) -> Self {
        let mut session = Self {
            store,
            state: SessionState::Finished,
            background: None,
            history: Vec::new(),
        };
        session.load_scene(0, assets);
        session
    }

    /// Jump to the first line of scene `index`. An index past the last
    /// scene finishes the session.
    pub fn load_scene(&mut self, index: usize, assets: &mut dyn BackgroundProvider) {
        let Some(scene) = self.store.scene_at(index) else {
            if self.state != SessionState::Finished {
                log::info!("story finished");
            }
            self.state = SessionState::Finished;
            self.background = None;
            return;
        };

        self.state = SessionState::Active {
            scene: index,
            line: 0,
        };
        self.background = scene
            .background
            .as_deref()
            .and_then(|reference| assets.background(reference));
        log::info!("loaded scene {} '{}'", index, scene.identifier);
        self.record_position();
    }

    /// Move to the next line of the flattened walk.
    pub fn advance(&mut self, assets: &mut dyn BackgroundProvider) -> AdvanceOutcome {
        let SessionState::Active { scene, line } = self.state else {
            return AdvanceOutcome::Ignored;
        };

        let lines = self.store.scene_at(scene).map_or(0, Scene::line_count);
        if line + 1 < lines {
            self.state = SessionState::Active {
                scene,
                line: line + 1,
            };
            self.record_position();
            return AdvanceOutcome::NextLine;
        }

        let next = scene + 1;
        self.load_scene(next, assets);
        match self.state {
            SessionState::Active { .. } => AdvanceOutcome::NextScene(next),
            SessionState::Finished => AdvanceOutcome::Finished,
        }
    }

    /// The line to display, if any. A finished session or a scene without
    /// dialogue has none.
    pub fn current_dialogue(&self) -> Option<&DialogueLine> {
        match self.state {
            SessionState::Active { scene, line } => self.store.line_at(scene, line),
            SessionState::Finished => None,
        }
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        match self.state {
            SessionState::Active { scene, .. } => self.store.scene_at(scene),
            SessionState::Finished => None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    /// Current scene index; equal to the scene count once finished.
    pub fn current_scene_index(&self) -> usize {
        match self.state {
            SessionState::Active { scene, .. } => scene,
            SessionState::Finished => self.store.scene_count(),
        }
    }

    /// Current line index within the scene; zero once finished.
    pub fn current_line_index(&self) -> usize {
        match self.state {
            SessionState::Active { line, .. } => line,
            SessionState::Finished => 0,
        }
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub fn store(&self) -> &NarrativeStore {
        &self.store
    }

    /// Every displayed (scene, line) position, oldest first.
    pub fn history(&self) -> &[(usize, usize)] {
        &self.history
    }

    /// The displayed lines, oldest first, for a backlog view.
    pub fn history_lines(&self) -> impl Iterator<Item = &DialogueLine> + '_ {
        self.history
            .iter()
            .filter_map(|&(scene, line)| self.store.line_at(scene, line))
    }

    fn record_position(&mut self) {
        if let SessionState::Active { scene, line } = self.state {
            if self.store.line_at(scene, line).is_some() {
                self.history.push((scene, line));
            }
        }
    }
}
