use eframe::egui;
use egui::{Color32, CornerRadius, Margin, Stroke};
use serde::{Deserialize, Serialize};

// Spacing constants
pub const SPACING_SMALL: f32 = 8.0;
pub const SPACING_MEDIUM: f32 = 12.0;

pub const MARGIN_CARD: f32 = 15.0;

/// An sRGB colour, independent of any renderer.
pub type Rgb = [u8; 3];

/// Converts a palette colour for egui.
pub fn color32([r, g, b]: Rgb) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Presentation mode. Only rendering parameters depend on it, never the data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

const LIGHT_PALETTE: [Rgb; 10] = [
    [120, 194, 173],
    [243, 150, 154],
    [108, 195, 213],
    [255, 206, 103],
    [255, 120, 81],
    [86, 204, 157],
    [153, 122, 205],
    [90, 90, 90],
    [237, 161, 92],
    [74, 150, 190],
];

const DARK_PALETTE: [Rgb; 10] = [
    [55, 90, 127],
    [0, 188, 140],
    [52, 152, 219],
    [243, 156, 18],
    [231, 76, 60],
    [155, 89, 182],
    [26, 188, 156],
    [236, 240, 241],
    [211, 84, 0],
    [127, 140, 141],
];

impl Theme {
    /// Maps the on/off state of the theme switch (on = light).
    pub fn from_flag(light: bool) -> Self {
        if light { Self::Light } else { Self::Dark }
    }

    pub fn is_light(self) -> bool {
        self == Self::Light
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }

    pub fn palette(self) -> &'static [Rgb] {
        match self {
            Self::Light => &LIGHT_PALETTE,
            Self::Dark => &DARK_PALETTE,
        }
    }

    /// Colour of the `index`-th series, cycling through the palette.
    pub fn series_color(self, index: usize) -> Rgb {
        let palette = self.palette();
        palette
            .get(index % palette.len())
            .copied()
            .unwrap_or([128, 128, 128])
    }

    pub fn accent(self) -> Color32 {
        color32(self.series_color(0))
    }

    pub fn header_fill(self) -> Rgb {
        match self {
            Self::Light => [230, 230, 230],
            Self::Dark => [48, 48, 48],
        }
    }

    pub fn visuals(self) -> egui::Visuals {
        let mut visuals = match self {
            Self::Light => egui::Visuals::light(),
            Self::Dark => egui::Visuals::dark(),
        };

        visuals.widgets.active.bg_fill = self.accent();
        visuals.widgets.hovered.corner_radius = CornerRadius::same(6);
        visuals.widgets.inactive.corner_radius = CornerRadius::same(6);
        visuals.widgets.noninteractive.corner_radius = CornerRadius::same(6);
        visuals.selection.bg_fill = self.accent().linear_multiply(0.6);
        visuals.window_corner_radius = CornerRadius::same(12);

        if self == Self::Dark {
            visuals.faint_bg_color = Color32::from_rgb(40, 40, 40);
            visuals.extreme_bg_color = Color32::from_rgb(24, 24, 24);
        }
        visuals
    }
}

pub fn apply_theme(ctx: &egui::Context, theme: Theme) {
    ctx.set_visuals(theme.visuals());
}

pub fn card_frame(ui: &egui::Ui) -> egui::Frame {
    egui::Frame::new()
        .fill(ui.visuals().faint_bg_color)
        .corner_radius(CornerRadius::same(10))
        .inner_margin(Margin::same(MARGIN_CARD as i8))
        .stroke(Stroke::new(
            1.0,
            ui.visuals().widgets.noninteractive.bg_stroke.color,
        ))
}
