use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub header: Color,
    pub focused: Color,
    pub dimmed: Color,
    pub weekend: Color,
    pub today: Color,
    pub selected_bg: Color,
    pub focused_week_bg: Color,
    pub chart_line: Color,
    pub help_text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            colors: ThemeColors {
                header: Color::Cyan,
                focused: Color::White,
                dimmed: Color::DarkGray,
                weekend: Color::Rgb(150, 150, 150),
                today: Color::Yellow,
                selected_bg: Color::Rgb(40, 40, 40),
                focused_week_bg: Color::Rgb(28, 28, 28),
                chart_line: Color::Green,
                help_text: Color::Cyan,
            },
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            colors: ThemeColors {
                header: Color::Blue,
                focused: Color::Black,
                dimmed: Color::Gray,
                weekend: Color::DarkGray,
                today: Color::Yellow,
                selected_bg: Color::Rgb(220, 220, 220),
                focused_week_bg: Color::Rgb(240, 240, 240),
                chart_line: Color::Green,
                help_text: Color::Blue,
            },
        }
    }

    pub fn minimal() -> Self {
        Self {
            name: "Minimal".to_string(),
            colors: ThemeColors {
                header: Color::White,
                focused: Color::White,
                dimmed: Color::DarkGray,
                weekend: Color::DarkGray,
                today: Color::White,
                selected_bg: Color::Rgb(40, 40, 40),
                focused_week_bg: Color::Rgb(28, 28, 28),
                chart_line: Color::White,
                help_text: Color::Gray,
            },
        }
    }

    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            "minimal" => Self::minimal(),
            _ => Self::dark(), // default
        }
    }

    pub fn available_themes() -> Vec<String> {
        vec![
            "dark".to_string(),
            "light".to_string(),
            "minimal".to_string(),
        ]
    }
}
