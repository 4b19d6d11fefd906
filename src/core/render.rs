/// Renderer boundary: per-frame views, dialogue box geometry, and the
/// display list handed to the platform layer.
///
/// The core never touches pixels. It composes [`DrawCommand`]s from a
/// frame view and a [`Renderer`] implementation turns them into output.
use crate::core::assets::Background;
use crate::core::layout::{wrap, LaidOutText, TextMeasure};
use crate::core::menu::{Button, Rect};
use crate::schema::config::EngineConfig;
use crate::schema::scene::DialogueLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

pub const SCENE_FILL: Color = Color::rgb(20, 20, 20);
pub const MENU_FILL: Color = Color::rgb(10, 10, 10);
pub const BOX_FILL: Color = Color::rgba(0, 0, 0, 200);
pub const ACCENT: Color = Color::rgb(220, 20, 20);
pub const TEXT: Color = Color::rgb(255, 255, 255);
pub const HINT: Color = Color::rgb(150, 150, 150);
pub const BUTTON_FILL: Color = Color::rgb(180, 20, 20);
pub const BUTTON_HOVER: Color = Color::rgb(220, 40, 40);
pub const BUTTON_BORDER: Color = Color::rgb(30, 10, 10);

const BUTTON_BORDER_WIDTH: u32 = 4;

/// Which font a text command is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Name,
    Body,
    Hint,
    Button,
}

/// Which point of the text's bounding box sits at the given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    Center,
    BottomRight,
}

#[derive(Debug, Clone)]
pub enum DrawCommand {
    Fill(Color),
    Image {
        image: Background,
        rect: Rect,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: u32,
    },
    Text {
        text: String,
        x: i32,
        y: i32,
        color: Color,
        role: TextRole,
        anchor: Anchor,
    },
}

/// A platform drawing backend.
pub trait Renderer {
    fn draw(&mut self, commands: &[DrawCommand]);
    /// Flip the finished frame to the screen.
    fn present(&mut self);
}

/// Dialogue box geometry for one viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueBoxLayout {
    pub viewport: (u32, u32),
    pub box_rect: Rect,
    pub border: u32,
    pub name_origin: (i32, i32),
    pub text_origin: (i32, i32),
    pub line_height: i32,
    pub max_lines: usize,
    /// Widest a wrapped line may measure.
    pub wrap_width: f32,
    /// Bottom-right corner of the continue hint.
    pub hint_anchor: (i32, i32),
    pub hint: String,
}

impl DialogueBoxLayout {
    /// Derive the geometry from `config`. Sizes past `i32::MAX` are
    /// clamped, and the margin never takes more than half the width.
    pub fn from_config(config: &EngineConfig) -> Self {
        let (width, height) = (to_i32(config.screen.width), to_i32(config.screen.height));
        let dialogue = &config.dialogue_box;
        let margin = to_i32(dialogue.margin).min(width / 2);
        let box_height = to_i32(dialogue.height).min(height);
        let box_top = height - box_height;

        Self {
            viewport: (config.screen.width, config.screen.height),
            box_rect: Rect::new(0, box_top, width, box_height),
            border: dialogue.border,
            name_origin: (margin, box_top.saturating_add(to_i32(dialogue.name_offset))),
            text_origin: (margin, box_top.saturating_add(to_i32(dialogue.text_offset))),
            line_height: to_i32(dialogue.line_height),
            max_lines: dialogue.max_lines,
            wrap_width: (width - 2 * margin) as f32,
            hint_anchor: (width - margin, height - to_i32(dialogue.hint_bottom).min(height)),
            hint: dialogue.hint.clone(),
        }
    }

    fn full_screen(&self) -> Rect {
        screen_rect(self.viewport)
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn screen_rect(viewport: (u32, u32)) -> Rect {
    Rect::new(0, 0, to_i32(viewport.0), to_i32(viewport.1))
}

/// What the scene renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct SceneFrame<'a> {
    pub background: Option<&'a Background>,
    pub dialogue: Option<&'a DialogueLine>,
    pub text: &'a LaidOutText,
}

#[derive(Debug, Clone, Copy)]
pub struct MenuFrame<'a> {
    pub background: Option<&'a Background>,
    pub buttons: &'a [Button],
}

#[derive(Debug, Clone, Copy)]
pub enum Frame<'a> {
    Menu(MenuFrame<'a>),
    Scene(SceneFrame<'a>),
    /// The application is shutting down; nothing is drawn.
    Closed,
}

pub fn compose(frame: &Frame<'_>, layout: &DialogueBoxLayout) -> Vec<DrawCommand> {
    match frame {
        Frame::Menu(menu) => compose_menu(menu, layout.viewport),
        Frame::Scene(scene) => compose_scene(scene, layout),
        Frame::Closed => Vec::new(),
    }
}

pub fn compose_scene(frame: &SceneFrame<'_>, layout: &DialogueBoxLayout) -> Vec<DrawCommand> {
    let mut commands = vec![background_command(frame.background, layout.full_screen(), SCENE_FILL)];

    let Some(dialogue) = frame.dialogue else {
        return commands;
    };

    commands.push(DrawCommand::FillRect {
        rect: layout.box_rect,
        color: BOX_FILL,
    });
    commands.push(DrawCommand::StrokeRect {
        rect: layout.box_rect,
        color: ACCENT,
        width: layout.border,
    });
    commands.push(DrawCommand::Text {
        text: dialogue.character.to_uppercase(),
        x: layout.name_origin.0,
        y: layout.name_origin.1,
        color: ACCENT,
        role: TextRole::Name,
        anchor: Anchor::TopLeft,
    });

    let (x, y) = layout.text_origin;
    for (i, line) in frame.text.visible().iter().take(layout.max_lines).enumerate() {
        commands.push(DrawCommand::Text {
            text: line.clone(),
            x,
            y: y.saturating_add((i as i32).saturating_mul(layout.line_height)),
            color: TEXT,
            role: TextRole::Body,
            anchor: Anchor::TopLeft,
        });
    }

    commands.push(DrawCommand::Text {
        text: layout.hint.clone(),
        x: layout.hint_anchor.0,
        y: layout.hint_anchor.1,
        color: HINT,
        role: TextRole::Hint,
        anchor: Anchor::BottomRight,
    });
    commands
}

pub fn compose_menu(frame: &MenuFrame<'_>, viewport: (u32, u32)) -> Vec<DrawCommand> {
    let screen = screen_rect(viewport);
    let mut commands = vec![background_command(frame.background, screen, MENU_FILL)];

    for button in frame.buttons {
        if let Some(image) = &button.image {
            commands.push(DrawCommand::Image {
                image: image.clone(),
                rect: fit_centered(image.size(), button.rect),
            });
            continue;
        }

        commands.push(DrawCommand::FillRect {
            rect: button.rect,
            color: if button.hover { BUTTON_HOVER } else { BUTTON_FILL },
        });
        commands.push(DrawCommand::StrokeRect {
            rect: button.rect,
            color: BUTTON_BORDER,
            width: BUTTON_BORDER_WIDTH,
        });
        let (cx, cy) = button.rect.center();
        commands.push(DrawCommand::Text {
            text: button.label.clone(),
            x: cx,
            y: cy,
            color: TEXT,
            role: TextRole::Button,
            anchor: Anchor::Center,
        });
    }
    commands
}

fn background_command(background: Option<&Background>, screen: Rect, fallback: Color) -> DrawCommand {
    match background {
        Some(image) => DrawCommand::Image {
            image: image.clone(),
            rect: screen,
        },
        None => DrawCommand::Fill(fallback),
    }
}

/// Scale `size` to fit inside `bounds` preserving aspect ratio, centered.
pub fn fit_centered(size: (u32, u32), bounds: Rect) -> Rect {
    let (iw, ih) = (size.0.max(1) as f32, size.1.max(1) as f32);
    let scale = (bounds.w as f32 / iw).min(bounds.h as f32 / ih);
    let w = (iw * scale) as i32;
    let h = (ih * scale) as i32;
    Rect::new(
        bounds.x + (bounds.w - w) / 2,
        bounds.y + (bounds.h - h) / 2,
        w,
        h,
    )
}

/// Wrapped text for the current line, recomputed only when the
/// (scene, line) position changes.
#[derive(Debug, Clone, Default)]
pub struct WrapCache {
    key: Option<(usize, usize)>,
    text: LaidOutText,
    computed: usize,
}

impl WrapCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout<M>(
        &mut self,
        position: Option<(usize, usize)>,
        dialogue: Option<&DialogueLine>,
        measure: &M,
        max_width: f32,
        max_lines: usize,
    ) -> &LaidOutText
    where
        M: TextMeasure + ?Sized,
    {
        let (Some(position), Some(dialogue)) = (position, dialogue) else {
            self.clear();
            return &self.text;
        };
        if self.key == Some(position) {
            return &self.text;
        }

        self.text = wrap(&dialogue.text, measure, max_width, max_lines);
        self.key = Some(position);
        self.computed += 1;
        if self.text.is_truncated() {
            log::warn!(
                "line {:?} wraps to {} lines, only {} are shown",
                position,
                self.text.len(),
                max_lines
            );
        }
        &self.text
    }

    pub fn text(&self) -> &LaidOutText {
        &self.text
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.text = LaidOutText::default();
    }

    /// How many times a layout has actually been computed.
    pub fn computed(&self) -> usize {
        self.computed
    }
}
