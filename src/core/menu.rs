/// Main menu: asset discovery, button layout and hit testing.
use std::path::{Path, PathBuf};

use crate::core::assets::{load_native, load_scaled, Background};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

const MENU_BACKGROUND: &str = "menu_bg.png";
const PLAY_BUTTON: &str = "playbutton.png";
const CREDITS_BUTTON: &str = "titlebutton.png";
const EXIT_BUTTON: &str = "exitbutton.png";

const BUTTON_WIDTH: i32 = 900;
const BUTTON_HEIGHT: i32 = 220;
const BUTTON_LEFT: i32 = -90;
const BUTTON_TOP: i32 = 360;
const BUTTON_GAP: i32 = 5;

/// A discrete menu command, produced by activating a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Play,
    Credits,
    Exit,
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }
}

#[derive(Debug, Clone)]
pub struct Button {
    pub label: String,
    pub rect: Rect,
    pub image: Option<Background>,
    pub action: MenuAction,
    pub hover: bool,
}

impl Button {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.rect.contains(x, y)
    }
}

/// Files found in the menu asset directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuAssets {
    pub background: Option<PathBuf>,
    pub play_button: Option<PathBuf>,
    pub credits_button: Option<PathBuf>,
    pub exit_button: Option<PathBuf>,
    pub font: Option<PathBuf>,
}

impl MenuAssets {
    /// Scan `dir` for menu art. The background is `menu_bg.png` when present,
    /// otherwise the first image found; the font is the first font file.
    /// An unreadable directory yields no assets.
    pub fn discover(dir: &Path) -> MenuAssets {
        let mut images = files_with_extensions(dir, IMAGE_EXTENSIONS);
        let mut fonts = files_with_extensions(dir, FONT_EXTENSIONS);
        images.sort();
        fonts.sort();

        let named = |name: &str| {
            images
                .iter()
                .find(|path| file_name_lower(path).as_deref() == Some(name))
                .cloned()
        };

        MenuAssets {
            background: named(MENU_BACKGROUND).or_else(|| images.first().cloned()),
            play_button: named(PLAY_BUTTON),
            credits_button: named(CREDITS_BUTTON),
            exit_button: named(EXIT_BUTTON),
            font: fonts.first().cloned(),
        }
    }
}

/// The menu asset directory: `base/menu_assets` when it exists, else `base`.
pub fn find_assets_dir(base: &Path) -> PathBuf {
    let candidate = base.join("menu_assets");
    if candidate.is_dir() {
        candidate
    } else {
        base.to_path_buf()
    }
}

fn file_name_lower(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
}

fn files_with_extensions(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        log::warn!("menu asset directory {} is not readable", dir.display());
        return Vec::new();
    };
    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|s| s.to_str())
                .map(|ext| extensions.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect()
}

/// The menu screen: background and three stacked buttons.
#[derive(Debug, Clone)]
pub struct Menu {
    pub background: Option<Background>,
    pub buttons: Vec<Button>,
}

impl Menu {
    /// Build the menu, loading whatever art was discovered. Missing or
    /// broken images leave the plain-drawn button in place.
    pub fn new(assets: &MenuAssets, viewport: (u32, u32)) -> Self {
        let background = assets.background.as_deref().and_then(|path| {
            load_scaled(path, viewport.0, viewport.1)
                .map_err(|e| log::warn!("menu background unavailable: {}", e))
                .ok()
        });
        let button_art = |path: &Option<PathBuf>| {
            path.as_deref().and_then(|path| {
                load_native(path)
                    .map_err(|e| log::warn!("button image unavailable: {}", e))
                    .ok()
            })
        };

        let entries = [
            ("PLAY", MenuAction::Play, button_art(&assets.play_button)),
            ("CREDITS", MenuAction::Credits, button_art(&assets.credits_button)),
            ("EXIT", MenuAction::Exit, button_art(&assets.exit_button)),
        ];

        let buttons = entries
            .into_iter()
            .enumerate()
            .map(|(i, (label, action, image))| Button {
                label: label.to_string(),
                rect: Rect::new(
                    BUTTON_LEFT,
                    BUTTON_TOP + i as i32 * (BUTTON_HEIGHT + BUTTON_GAP),
                    BUTTON_WIDTH,
                    BUTTON_HEIGHT,
                ),
                image,
                action,
                hover: false,
            })
            .collect();

        Self {
            background,
            buttons,
        }
    }

    /// A menu with plain buttons and no art.
    pub fn plain(viewport: (u32, u32)) -> Self {
        Self::new(&MenuAssets::default(), viewport)
    }

    pub fn button_at(&self, x: i32, y: i32) -> Option<&Button> {
        self.buttons.iter().find(|b| b.contains(x, y))
    }

    pub fn update_hover(&mut self, x: i32, y: i32) {
        for button in &mut self.buttons {
            button.hover = button.contains(x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn rect_contains_is_half_open() {
        let rect = Rect::new(10, 10, 5, 5);
        assert!(rect.contains(10, 10));
        assert!(rect.contains(14, 14));
        assert!(!rect.contains(15, 10));
        assert!(!rect.contains(9, 12));
        assert_eq!(rect.center(), (12, 12));
    }

    #[test]
    fn plain_menu_layout() {
        let menu = Menu::plain((1920, 1080));
        let actions: Vec<MenuAction> = menu.buttons.iter().map(|b| b.action).collect();
        assert_eq!(actions, [MenuAction::Play, MenuAction::Credits, MenuAction::Exit]);
        assert_eq!(menu.buttons[0].rect, Rect::new(-90, 360, 900, 220));
        assert_eq!(menu.buttons[1].rect.y, 585);
        assert_eq!(menu.buttons[2].rect.y, 810);
        assert!(menu.background.is_none());
    }

    #[test]
    fn hit_testing_and_hover() {
        let mut menu = Menu::plain((1920, 1080));
        assert_eq!(menu.button_at(100, 400).map(|b| b.action), Some(MenuAction::Play));
        assert_eq!(menu.button_at(100, 900).map(|b| b.action), Some(MenuAction::Exit));
        assert!(menu.button_at(1500, 400).is_none());
        // the gap between buttons is dead space
        assert!(menu.button_at(100, 582).is_none());

        menu.update_hover(100, 600);
        assert!(!menu.buttons[0].hover);
        assert!(menu.buttons[1].hover);
    }

    #[test]
    fn discover_prefers_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        for name in ["a_first.png", "menu_bg.png", "playbutton.png", "exitbutton.png"] {
            img.save(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("title.ttf"), b"font").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

        let assets = MenuAssets::discover(dir.path());
        assert_eq!(assets.background, Some(dir.path().join("menu_bg.png")));
        assert_eq!(assets.play_button, Some(dir.path().join("playbutton.png")));
        assert_eq!(assets.credits_button, None);
        assert_eq!(assets.exit_button, Some(dir.path().join("exitbutton.png")));
        assert_eq!(assets.font, Some(dir.path().join("title.ttf")));

        let menu = Menu::new(&assets, (16, 9));
        assert_eq!(menu.background.as_ref().map(Background::size), Some((16, 9)));
        assert!(menu.buttons[0].image.is_some());
        assert!(menu.buttons[1].image.is_none());
    }

    #[test]
    fn discover_falls_back_to_first_image() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        img.save(dir.path().join("b.png")).unwrap();
        img.save(dir.path().join("a.jpg")).unwrap();

        let assets = MenuAssets::discover(dir.path());
        assert_eq!(assets.background, Some(dir.path().join("a.jpg")));
        assert_eq!(assets.font, None);
    }

    #[test]
    fn discover_missing_directory() {
        let assets = MenuAssets::discover(Path::new("tests/fixtures/no_such_dir"));
        assert_eq!(assets, MenuAssets::default());
    }

    #[test]
    fn assets_dir_prefers_menu_assets() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_assets_dir(dir.path()), dir.path());
        std::fs::create_dir(dir.path().join("menu_assets")).unwrap();
        assert_eq!(find_assets_dir(dir.path()), dir.path().join("menu_assets"));
    }
}
