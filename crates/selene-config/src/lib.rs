use selene::settings::EngineSettings;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit engine config file.
pub const CONFIG_ENV: &str = "SELENE_CONFIG";

const CANDIDATES: [&str; 2] = ["configs/engine.toml", "../../configs/engine.toml"];

/// Locate and read `configs/engine.toml`.
///
/// `SELENE_CONFIG` wins when set and must point at a readable file. Otherwise
/// the common relative locations are tried; `None` means no file was found.
pub fn read_engine_toml_text() -> anyhow::Result<Option<(PathBuf, String)>> {
    if let Ok(explicit) = env::var(CONFIG_ENV) {
        let path = PathBuf::from(explicit);
        let text = fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("{} points at {}: {e}", CONFIG_ENV, path.display()))?;
        return Ok(Some((path, text)));
    }
    for p in &CANDIDATES {
        if let Ok(text) = fs::read_to_string(p) {
            return Ok(Some((PathBuf::from(p), text)));
        }
    }
    Ok(None)
}

/// Parse engine settings, resolving relative file paths against `base_dir`.
pub fn parse_engine_settings(text: &str, base_dir: &Path) -> anyhow::Result<EngineSettings> {
    let mut settings: EngineSettings =
        toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse engine.toml: {e}"))?;
    settings.validate()?;

    let templates = &mut settings.templates;
    for path in [
        &mut templates.transit_templates,
        &mut templates.lunar_catalog,
        &mut templates.retrograde_guides,
        &mut settings.ephemeris.path,
    ] {
        if let Some(p) = path.take() {
            *path = Some(resolve_relative(base_dir, p));
        }
    }
    Ok(settings)
}

fn resolve_relative(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Read settings from a specific file.
pub fn load_engine_settings_from(path: &Path) -> anyhow::Result<EngineSettings> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Could not read {}: {e}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_engine_settings(&text, base_dir)
}

/// Discover and load engine settings, falling back to defaults.
pub fn load_engine_settings() -> anyhow::Result<EngineSettings> {
    match read_engine_toml_text()? {
        Some((path, text)) => {
            log::info!("Loading engine settings from {}", path.display());
            let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
            parse_engine_settings(&text, base_dir)
        }
        None => {
            log::info!("No engine.toml found in {:?}; using defaults", CANDIDATES);
            Ok(EngineSettings::default())
        }
    }
}

/// Check that a Swiss Ephemeris directory exists and holds `.se1` files.
pub fn validate_ephemeris_dir(dir: &Path) -> anyhow::Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("ephemeris.path does not exist: {}", dir.display());
    }
    let has_data = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .any(|entry| entry.path().extension().map_or(false, |ext| ext == "se1"));
    if !has_data {
        anyhow::bail!("No .se1 ephemeris files in {}", dir.display());
    }
    Ok(())
}
