use ratatui::style::Color;

/// All themeable colors in the application
#[derive(Clone, Debug)]
pub struct Theme {
    // Title bar
    pub title: Color,
    pub title_info: Color,
    pub title_bg: Color,

    // Table header
    pub header_fg: Color,
    pub header_bg: Color,
    pub header_focused: Color,
    pub sort_indicator: Color,
    pub resize_handle: Color,

    // Table body
    pub row_selected_bg: Color,
    pub row_alt_bg: Color,
    pub column_focused_fg: Color,

    // Status bar
    pub status_mode_bg: Color,
    pub status_mode_fg: Color,
    pub status_help: Color,
    pub status_bg: Color,

    // Editor overlay
    pub editor_border: Color,
    pub editor_placeholder: Color,

    // Filter bar
    pub filter_prefix: Color,

    // Empty states / messages
    pub empty_state: Color,
    pub warning_message: Color,

    // Help overlay
    pub help_border: Color,
    pub help_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            title: Color::Green,
            title_info: Color::Cyan,
            title_bg: Color::DarkGray,

            header_fg: Color::White,
            header_bg: Color::Rgb(48, 48, 48),
            header_focused: Color::Yellow,
            sort_indicator: Color::Cyan,
            resize_handle: Color::LightBlue,

            row_selected_bg: Color::Rgb(40, 60, 90),
            row_alt_bg: Color::Rgb(24, 24, 24),
            column_focused_fg: Color::Yellow,

            status_mode_bg: Color::Blue,
            status_mode_fg: Color::White,
            status_help: Color::DarkGray,
            status_bg: Color::Black,

            editor_border: Color::Cyan,
            editor_placeholder: Color::DarkGray,

            filter_prefix: Color::Yellow,

            empty_state: Color::DarkGray,
            warning_message: Color::Yellow,

            help_border: Color::Cyan,
            help_bg: Color::Black,
        }
    }

    /// Dracula theme - popular dark theme
    pub fn dracula() -> Self {
        Self {
            title: Color::Rgb(255, 121, 198),      // Pink
            title_info: Color::Rgb(139, 233, 253), // Cyan
            title_bg: Color::Rgb(40, 42, 54),      // Background

            header_fg: Color::Rgb(248, 248, 242),      // Foreground
            header_bg: Color::Rgb(68, 71, 90),         // Current line
            header_focused: Color::Rgb(241, 250, 140), // Yellow
            sort_indicator: Color::Rgb(80, 250, 123),  // Green
            resize_handle: Color::Rgb(189, 147, 249),  // Purple

            row_selected_bg: Color::Rgb(68, 71, 90),
            row_alt_bg: Color::Rgb(33, 34, 44),
            column_focused_fg: Color::Rgb(241, 250, 140),

            status_mode_bg: Color::Rgb(189, 147, 249), // Purple
            status_mode_fg: Color::Rgb(40, 42, 54),
            status_help: Color::Rgb(98, 114, 164), // Comment
            status_bg: Color::Rgb(33, 34, 44),

            editor_border: Color::Rgb(189, 147, 249),
            editor_placeholder: Color::Rgb(98, 114, 164),

            filter_prefix: Color::Rgb(255, 184, 108), // Orange

            empty_state: Color::Rgb(98, 114, 164),
            warning_message: Color::Rgb(255, 184, 108),

            help_border: Color::Rgb(189, 147, 249),
            help_bg: Color::Rgb(40, 42, 54),
        }
    }

    /// Monochrome theme - grayscale only
    pub fn monochrome() -> Self {
        Self {
            title: Color::Rgb(255, 255, 255),
            title_info: Color::Rgb(180, 180, 180),
            title_bg: Color::Rgb(50, 50, 50),

            header_fg: Color::Rgb(255, 255, 255),
            header_bg: Color::Rgb(60, 60, 60),
            header_focused: Color::Rgb(255, 255, 255),
            sort_indicator: Color::Rgb(200, 200, 200),
            resize_handle: Color::Rgb(140, 140, 140),

            row_selected_bg: Color::Rgb(80, 80, 80),
            row_alt_bg: Color::Rgb(25, 25, 25),
            column_focused_fg: Color::Rgb(255, 255, 255),

            status_mode_bg: Color::Rgb(200, 200, 200),
            status_mode_fg: Color::Rgb(0, 0, 0),
            status_help: Color::Rgb(120, 120, 120),
            status_bg: Color::Rgb(30, 30, 30),

            editor_border: Color::Rgb(200, 200, 200),
            editor_placeholder: Color::Rgb(120, 120, 120),

            filter_prefix: Color::Rgb(180, 180, 180),

            empty_state: Color::Rgb(120, 120, 120),
            warning_message: Color::Rgb(200, 200, 200),

            help_border: Color::Rgb(180, 180, 180),
            help_bg: Color::Rgb(20, 20, 20),
        }
    }

    /// Get a theme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dracula" => Self::dracula(),
            "monochrome" | "mono" => Self::monochrome(),
            _ => Self::default_theme(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_is_case_insensitive() {
        assert_eq!(Theme::by_name("Dracula").title, Theme::dracula().title);
        assert_eq!(Theme::by_name("MONO").header_bg, Theme::monochrome().header_bg);
    }

    #[test]
    fn test_unknown_name_uses_default() {
        assert_eq!(Theme::by_name("neon").title, Theme::default_theme().title);
    }
}
