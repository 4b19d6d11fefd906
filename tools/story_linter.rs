/// Story Linter: checks a story file against its assets and dialogue box.
///
/// Usage: story_linter <story_file> [--config <path>] [--assets <dir>]

use novel_engine::core::assets::AssetResolver;
use novel_engine::core::font::StoryFonts;
use novel_engine::core::layout::{wrap, TextMeasure};
use novel_engine::core::menu::{find_assets_dir, MenuAssets};
use novel_engine::core::render::DialogueBoxLayout;
use novel_engine::core::store::{self, NarrativeStore};
use novel_engine::schema::config::EngineConfig;
use novel_engine::schema::scene::UNKNOWN_LABEL;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: story_linter <story_file> [--config <path>] [--assets <dir>]");
        process::exit(0);
    }

    let story_path = PathBuf::from(&args[1]);
    let mut config_path = None;
    let mut assets_dir = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--config" && i + 1 < args.len() {
            i += 1;
            config_path = Some(PathBuf::from(&args[i]));
        } else if args[i] == "--assets" && i + 1 < args.len() {
            i += 1;
            assets_dir = Some(PathBuf::from(&args[i]));
        }
        i += 1;
    }

    // The linter reports load failures instead of degrading to an empty store
    let document = match store::load(&story_path) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("ERROR: Failed to load story: {}", e);
            process::exit(1);
        }
    };
    let store = NarrativeStore::from_document(document);

    let config = match config_path {
        Some(ref path) => match EngineConfig::load_from_ron(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("ERROR: Failed to load config: {}", e);
                process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let assets_dir = assets_dir.unwrap_or_else(|| {
        story_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });
    let assets = AssetResolver::from_config(assets_dir.clone(), &config);
    let menu_assets = MenuAssets::discover(&find_assets_dir(&assets_dir));
    let fonts = assets.fonts(&config.fonts, menu_assets.font.as_deref());

    println!(
        "Loaded {} scenes, {} lines",
        store.scene_count(),
        store.line_count()
    );

    let (errors, warnings) = lint_story(&store, &assets, &fonts, &config);

    println!("\n=== Story Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_story(
    store: &NarrativeStore,
    assets: &AssetResolver,
    fonts: &StoryFonts,
    config: &EngineConfig,
) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if store.is_empty() {
        errors.push("story has no scenes".to_string());
        return (errors, warnings);
    }

    if fonts.body.is_fallback() {
        warnings.push("no font configured, discovered or loadable, line fit uses fallback metrics".to_string());
    }
    let layout = DialogueBoxLayout::from_config(config);
    let (wrap_width, max_lines) = (layout.wrap_width, layout.max_lines);

    for (index, scene) in store.scenes().iter().enumerate() {
        let label = format!("scene {} '{}'", index, scene.identifier);

        match scene.background.as_deref() {
            Some(reference) => {
                let path = assets.resolve_path(reference);
                if !path.is_file() {
                    errors.push(format!("{}: background '{}' not found", label, path.display()));
                }
            }
            None => warnings.push(format!("{}: no background, a plain fill is shown", label)),
        }

        if scene.dialogues.is_empty() {
            warnings.push(format!("{}: has no dialogue lines", label));
        }

        for (line_index, line) in scene.dialogues.iter().enumerate() {
            let at = format!("{} line {}", label, line_index);
            if line.character == UNKNOWN_LABEL {
                warnings.push(format!("{}: speaker is missing", at));
            }
            let name = line.character.to_uppercase();
            if fonts.name.measure(&name) > wrap_width {
                warnings.push(format!("{}: speaker name '{}' is wider than the dialogue box", at, name));
            }
            if line.text.trim().is_empty() {
                warnings.push(format!("{}: text is empty", at));
                continue;
            }
            check_fit(&line.text, &fonts.body, wrap_width, max_lines, &at, &mut errors, &mut warnings);
        }
    }

    (errors, warnings)
}

fn check_fit(
    text: &str,
    font: &dyn TextMeasure,
    wrap_width: f32,
    max_lines: usize,
    at: &str,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let laid_out = wrap(text, font, wrap_width, max_lines);
    if laid_out.is_truncated() {
        errors.push(format!(
            "{}: wraps to {} lines, only {} fit in the dialogue box",
            at,
            laid_out.len(),
            max_lines
        ));
    }
    for row in laid_out.lines() {
        if font.measure(row) > wrap_width {
            warnings.push(format!("{}: word '{}' is wider than the dialogue box", at, row));
        }
    }
}
