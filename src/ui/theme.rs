use ratatui::style::Color;

use crate::config::{ColorsConfig, DEFAULT_PALETTE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    Auto,
    Truecolor,
    Color256,
    Mono,
}

impl ColorSupport {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "truecolor" | "24bit" => ColorSupport::Truecolor,
            "256" | "256color" => ColorSupport::Color256,
            "mono" | "monochrome" => ColorSupport::Mono,
            _ => ColorSupport::Auto,
        }
    }
}

pub fn detect_color_support() -> ColorSupport {
    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorSupport::Truecolor;
    }

    let term = std::env::var("TERM").unwrap_or_default().to_lowercase();
    if term.contains("256color") {
        return ColorSupport::Color256;
    }
    ColorSupport::Color256
}

pub fn resolve_color_support(config: &str) -> ColorSupport {
    let parsed = ColorSupport::from_config_str(config);
    if parsed == ColorSupport::Auto {
        detect_color_support()
    } else {
        parsed
    }
}

/// Chrome colors plus the series palette, adapted once at startup to the
/// terminal's color support.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub chart_border: Color,
    pub selected_border: Color,
    pub grid_line: Color,
    pub axis_label: Color,
    pub statusbar_bg: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub gauge_filled: Color,
    pub gauge_unfilled: Color,
    pub sparkline_color: Color,
    pub status_paused: Color,
    /// Series colors in palette order; entities index into this modulo its
    /// length.
    pub palette: Vec<Color>,
}

impl Theme {
    pub fn from_config(colors: &ColorsConfig, support: ColorSupport) -> Self {
        let mut theme = Self::dark();
        theme.palette = resolve_palette(&colors.palette);
        theme.apply_color_support(support);
        theme
    }

    pub fn series_color(&self, color_index: usize) -> Color {
        self.palette[color_index % self.palette.len()]
    }

    fn dark() -> Self {
        Theme {
            header_accent_bg: Color::Green,
            header_accent_fg: Color::Black,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            chart_border: Color::DarkGray,
            selected_border: Color::White,
            grid_line: Color::Rgb(60, 60, 60),
            axis_label: Color::Gray,
            statusbar_bg: Color::DarkGray,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            gauge_filled: Color::Rgb(103, 232, 249),
            gauge_unfilled: Color::DarkGray,
            sparkline_color: Color::Rgb(251, 146, 60),
            status_paused: Color::Yellow,
            palette: resolve_palette(&DEFAULT_PALETTE),
        }
    }

    fn apply_color_support(&mut self, support: ColorSupport) {
        let map = |c: Color| adapt_color(c, support);

        self.header_accent_bg = map(self.header_accent_bg);
        self.header_accent_fg = map(self.header_accent_fg);
        self.text_primary = map(self.text_primary);
        self.text_secondary = map(self.text_secondary);
        self.chart_border = map(self.chart_border);
        self.selected_border = map(self.selected_border);
        self.grid_line = map(self.grid_line);
        self.axis_label = map(self.axis_label);
        self.statusbar_bg = map(self.statusbar_bg);
        self.pill_key_bg = map(self.pill_key_bg);
        self.pill_key_fg = map(self.pill_key_fg);
        self.pill_desc_fg = map(self.pill_desc_fg);
        self.gauge_filled = map(self.gauge_filled);
        self.gauge_unfilled = map(self.gauge_unfilled);
        self.sparkline_color = map(self.sparkline_color);
        self.status_paused = map(self.status_paused);

        for color in &mut self.palette {
            *color = map(*color);
        }
    }
}

/// Parse configured hex entries, falling back per-slot to the reference
/// palette so one typo cannot blank a series color.
fn resolve_palette<S: AsRef<str>>(configured: &[S]) -> Vec<Color> {
    if configured.is_empty() {
        return DEFAULT_PALETTE
            .iter()
            .map(|hex| parse_hex_color(hex).expect("reference palette entries parse"))
            .collect();
    }
    configured
        .iter()
        .enumerate()
        .map(|(i, hex)| {
            parse_hex_color(hex.as_ref()).unwrap_or_else(|| {
                parse_hex_color(DEFAULT_PALETTE[i % DEFAULT_PALETTE.len()])
                    .expect("reference palette entries parse")
            })
        })
        .collect()
}

fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn adapt_color(color: Color, support: ColorSupport) -> Color {
    match support {
        ColorSupport::Truecolor | ColorSupport::Auto => color,
        ColorSupport::Color256 => match color {
            Color::Rgb(r, g, b) => Color::Indexed(rgb_to_ansi256(r, g, b)),
            _ => color,
        },
        ColorSupport::Mono => match color {
            Color::Rgb(r, g, b) => {
                let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
                if luminance > 128.0 {
                    Color::White
                } else {
                    Color::Black
                }
            }
            Color::White | Color::Black | Color::Gray | Color::DarkGray => color,
            _ => Color::White,
        },
    }
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let r = (r as f32 / 255.0 * 5.0).round() as u8;
    let g = (g as f32 / 255.0 * 5.0).round() as u8;
    let b = (b as f32 / 255.0 * 5.0).round() as u8;
    16 + 36 * r + 6 * g + b
}
