use std::path::Path;

use crate::ui::Theme;

/// Load a theme from a RON file. Logs a warning and returns the default
/// theme if the file is missing or malformed.
pub fn load_theme(path: impl AsRef<Path>) -> Theme {
    let path = path.as_ref();
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("failed to read {}: {}, using default theme", path.display(), e);
            return Theme::default();
        }
    };
    match ron::from_str::<Theme>(&content) {
        Ok(theme) => {
            log::debug!("loaded theme from {}", path.display());
            theme
        }
        Err(e) => {
            log::warn!("failed to parse RON {}: {}, using default theme", path.display(), e);
            Theme::default()
        }
    }
}
