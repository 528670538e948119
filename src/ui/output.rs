use std::path::Path;

use scd::config::ConfigWarning;

pub fn print_config_warnings(path: &Path, warnings: &[ConfigWarning]) {
    for w in warnings {
        if let Some(line) = w.line {
            eprintln!("⚠ Unknown config key '{}' in {}:{}", w.key, path.display(), line);
        } else {
            eprintln!("⚠ Unknown config key '{}' in {}", w.key, path.display());
        }

        if let Some(suggestion) = &w.suggestion {
            eprintln!("   Did you mean '{}'?\n", suggestion);
        }
    }
}

/// Print a process-fatal error the way the rest of the output looks.
pub fn print_error(message: &str, supports_color: bool) {
    use crate::ui::primitives::text::ColoredText;

    eprintln!("{}", ColoredText::error(format!("Error: {}", message)).render(supports_color));
}
