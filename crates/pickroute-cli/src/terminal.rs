//! ANSI styling for route, path and grid output.
//!
//! Colors are resolved once per invocation into a [`ColorPalette`] whose
//! fields are empty strings when the terminal should not receive escapes.

/// ANSI escape sequences, named by what they mark in pickroute output.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";

    /// Badge for the tour origin line.
    pub const TAG_START: &str = "\x1b[1;7;32m";
    /// Badge for each stop.
    pub const TAG_PICK: &str = "\x1b[1;7;36m";
    /// Badge for sites left out of the tour.
    pub const TAG_SKIP: &str = "\x1b[1;7;31m";

    pub const SITE: &str = "\x1b[1;97m";
    pub const MUTED: &str = "\x1b[90m";
    pub const METERS: &str = "\x1b[36m";
    pub const TIME: &str = "\x1b[32m";
    /// 256-color orange, shared by zone cells and calibration warnings.
    pub const WARNING: &str = "\x1b[38;5;208m";
    pub const ERROR: &str = "\x1b[31m";
}

/// Resolved escape sequences for every output role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub tag_start: &'static str,
    pub tag_pick: &'static str,
    pub tag_skip: &'static str,
    /// Site names and the start label.
    pub site: &'static str,
    /// Ids, raster distances and open cells.
    pub muted: &'static str,
    pub meters: &'static str,
    pub time: &'static str,
    pub warning: &'static str,
    /// Unreachable sites, missing paths and wall cells.
    pub error: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            tag_start: colors::TAG_START,
            tag_pick: colors::TAG_PICK,
            tag_skip: colors::TAG_SKIP,
            site: colors::SITE,
            muted: colors::MUTED,
            meters: colors::METERS,
            time: colors::TIME,
            warning: colors::WARNING,
            error: colors::ERROR,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            tag_start: "",
            tag_pick: "",
            tag_skip: "",
            site: "",
            muted: "",
            meters: "",
            time: "",
            warning: "",
            error: "",
        }
    }

    /// Colored unless the environment asks for plain output.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    /// Color for one symbol of the ASCII grid map.
    #[must_use]
    pub fn cell(&self, symbol: char) -> &'static str {
        match symbol {
            '#' => self.error,
            '~' => self.warning,
            'S' => self.site,
            '@' => self.time,
            _ => self.muted,
        }
    }

    /// Wrap `text` in `color`, appending a reset when colors are on.
    pub fn paint(&self, color: &'static str, text: impl std::fmt::Display) -> String {
        format!("{color}{text}{}", self.reset)
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Whether ANSI escapes should be written.
///
/// `NO_COLOR` (any value) and `TERM=dumb` turn colors off.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    !std::env::var("TERM").is_ok_and(|term| term.eq_ignore_ascii_case("dumb"))
}

/// Group the digits of a cell count by thousands.
///
/// ```
/// # use pickroute_cli::terminal::group_thousands;
/// assert_eq!(group_thousands(96), "96");
/// assert_eq!(group_thousands(24_000), "24,000");
/// ```
#[must_use]
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let lead = digits.len() % 3;
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.char_indices() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    /// Guards tests that touch process-wide environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn with_env<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var_os(k))).collect();
        for (key, value) in vars {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
        let result = f();
        for (key, value) in saved {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
        result
    }

    #[test]
    fn groups_digits_by_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(96_000), "96,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn plain_palette_paints_nothing() {
        let plain = ColorPalette::plain();
        assert_eq!(plain.paint(plain.site, "A-01"), "A-01");
        assert_eq!(plain.cell('#'), "");

        let colored = ColorPalette::colored();
        assert_eq!(colored.cell('#'), colors::ERROR);
        assert_eq!(colored.cell('.'), colors::MUTED);
        assert_eq!(colored.paint(colored.time, "4s"), "\x1b[32m4s\x1b[0m");
    }

    #[test]
    fn no_color_disables_escapes() {
        with_env(&[("NO_COLOR", Some("1")), ("TERM", None)], || {
            assert!(!supports_color());
            assert_eq!(ColorPalette::detect(), ColorPalette::plain());
        });
    }

    #[test]
    fn dumb_terminal_disables_escapes() {
        with_env(&[("NO_COLOR", None), ("TERM", Some("dumb"))], || {
            assert!(!supports_color());
        });
    }

    #[test]
    fn regular_terminal_gets_colors() {
        with_env(&[("NO_COLOR", None), ("TERM", Some("xterm-256color"))], || {
            assert!(supports_color());
        });
    }
}
