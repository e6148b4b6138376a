use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color32,
    pub panel: Color32,
    pub input_background: Color32,
    pub text: Color32,
    pub text_muted: Color32,
    pub speaker_label: Color32,
    pub code: Color32,
    pub link: Color32,
    pub badge_on: Color32,
    pub badge_off: Color32,
    pub modal_dim: Color32,
    pub panel_radius: u8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(30, 30, 30),
            panel: Color32::from_rgb(40, 40, 40),
            input_background: Color32::from_rgb(25, 25, 25),
            text: Color32::from_rgb(230, 230, 230),
            text_muted: Color32::from_rgb(180, 180, 180),
            speaker_label: Color32::from_rgb(200, 200, 200),
            code: Color32::from_rgb(200, 220, 200),
            link: Color32::from_rgb(100, 180, 240),
            badge_on: Color32::from_rgb(30, 180, 30),
            badge_off: Color32::from_rgb(180, 30, 30),
            modal_dim: Color32::from_rgba_premultiplied(0, 0, 0, 160),
            panel_radius: 8,
        }
    }
}

impl Theme {
    pub const PROSE_FONT: f32 = 14.0;
    pub const LABEL_FONT: f32 = 18.0;
    pub const MONO_FONT: f32 = 13.0;

    pub fn prose_font(&self) -> FontId {
        FontId::proportional(Self::PROSE_FONT)
    }

    pub fn label_font(&self) -> FontId {
        FontId::proportional(Self::LABEL_FONT)
    }

    pub fn mono_font(&self) -> FontId {
        FontId::monospace(Self::MONO_FONT)
    }

    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.background;
        visuals.override_text_color = Some(self.text);
        visuals.extreme_bg_color = self.input_background;
        visuals.hyperlink_color = self.link;
        visuals.window_fill = self.panel;
        visuals.window_stroke = Stroke::NONE;
        visuals.window_corner_radius = CornerRadius::same(self.panel_radius);

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        style.spacing.button_padding = egui::vec2(10.0, 6.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(20.0));
        style.text_styles.insert(TextStyle::Body, self.prose_font());
        style.text_styles.insert(TextStyle::Monospace, self.mono_font());
        style.text_styles.insert(TextStyle::Small, FontId::proportional(12.0));
        ctx.set_style(style);
    }

    pub fn input_frame(&self) -> Frame {
        Frame::new()
            .fill(self.input_background)
            .inner_margin(Margin::same(12))
            .corner_radius(CornerRadius::same(self.panel_radius))
            .stroke(Stroke::NONE)
    }
}
