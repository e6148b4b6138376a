use crate::config::Config;
use crate::dispatch::{Dispatcher, ResultChannel};
use crate::history::{ChatHistory, ChatTurn, VISIBLE_TURNS};
use crate::interact::{route_click, ClickAction, SIGN_IN_URL};
use crate::layout::{self, DrawableElement, ElementKind, Metrics, TextRole};
use crate::responder::{system_browser, BrowserOpen};
use crate::speech;
use crate::theme::Theme;
use eframe::egui::{
    self, Align2, Color32, ColorImage, CornerRadius, FontId, Rect, RichText, Sense,
    TextureHandle, TextureOptions, Vec2,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::warn;

const INPUT_AREA_HEIGHT: f32 = 110.0;
const BACKGROUND_FILE: &str = "chatjam.png";

pub struct ChatJamApp {
    channel: ResultChannel,
    dispatcher: Dispatcher,
    runtime: Handle,
    theme: Theme,
    history: ChatHistory,

    input_buffer: String,
    ai_mode: bool,
    signed_in: bool,
    image_modal: Option<PathBuf>,

    /// Hit-test list for the frame being drawn; replaced wholesale each
    /// frame so stale geometry is never consulted.
    frame_elements: Vec<DrawableElement>,
    textures: HashMap<PathBuf, Option<TextureHandle>>,
    background: Option<TextureHandle>,
    background_tried: bool,

    diagnostics: Vec<String>,
    channel_down_logged: bool,
    open_browser: BrowserOpen,
    openai_configured: bool,
    asset_dir: PathBuf,
}

impl ChatJamApp {
    pub fn new(
        channel: ResultChannel,
        dispatcher: Dispatcher,
        runtime: Handle,
        config: &Config,
    ) -> Self {
        let mut history = ChatHistory::new();
        history.append(ChatTurn::bot("hello i'm chatjam how can i help you today"));

        let openai_configured = config.openai_api_key.is_some();
        Self {
            channel,
            dispatcher,
            runtime,
            theme: Theme::default(),
            history,
            input_buffer: String::new(),
            ai_mode: openai_configured,
            signed_in: false,
            image_modal: None,
            frame_elements: Vec::new(),
            textures: HashMap::new(),
            background: None,
            background_tried: false,
            diagnostics: Vec::new(),
            channel_down_logged: false,
            open_browser: system_browser(),
            openai_configured,
            asset_dir: config.asset_dir.clone(),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn drain_results(&mut self, ctx: &egui::Context) {
        let envelopes = self.channel.drain();
        if envelopes.is_empty() {
            if self.channel.is_disconnected() && !self.channel_down_logged {
                self.channel_down_logged = true;
                self.diagnostics.push("result channel disconnected".to_string());
            }
            return;
        }

        for envelope in envelopes {
            if let Some(text) = envelope.spoken_text() {
                speech::speak(&self.runtime, text.to_string());
            }
            self.history.append(ChatTurn::from_envelope(envelope));
        }
        ctx.request_repaint();
    }

    fn submit_prompt(&mut self, ctx: &egui::Context) {
        let prompt = self.input_buffer.trim().to_string();
        if prompt.is_empty() {
            return;
        }

        self.history.append(ChatTurn::user(prompt.clone()));
        self.dispatcher.submit(prompt, self.ai_mode);
        self.input_buffer.clear();
        ctx.request_repaint();
    }

    fn toggle_ai_mode(&mut self) {
        self.ai_mode = !self.ai_mode;
        if self.ai_mode && !self.openai_configured {
            self.history.append(ChatTurn::bot(
                "OpenAI enabled but not configured: set OPENAI_API_KEY to use it.",
            ));
        } else {
            self.history
                .append(ChatTurn::bot(format!("OpenAI usage set to {}", self.ai_mode)));
        }
    }

    fn apply_action(&mut self, action: ClickAction) {
        match action {
            ClickAction::DismissModal => self.image_modal = None,
            ClickAction::SignIn => {
                (self.open_browser)(SIGN_IN_URL);
                self.signed_in = true;
            }
            ClickAction::OpenLink(url) => (self.open_browser)(&url),
            ClickAction::OpenImage(path) => self.image_modal = Some(path),
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context, path: &Path) {
        if self.textures.contains_key(path) {
            return;
        }
        let loaded = match load_color_image(path) {
            Ok(color_image) => Some(ctx.load_texture(
                path.display().to_string(),
                color_image,
                TextureOptions::LINEAR,
            )),
            Err(err) => {
                warn!(path = %path.display(), %err, "could not load image");
                None
            }
        };
        self.textures.insert(path.to_path_buf(), loaded);
    }

    fn ensure_background(&mut self, ctx: &egui::Context) {
        if self.background_tried {
            return;
        }
        self.background_tried = true;
        let path = self.asset_dir.join(BACKGROUND_FILE);
        if let Ok(color_image) = load_color_image(&path) {
            self.background =
                Some(ctx.load_texture("window_background", color_image, TextureOptions::LINEAR));
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("ChatJam");
                ui.separator();

                let sign_label = if self.signed_in { "Signed in" } else { "Sign in" };
                let mut clicked_sign_in = false;
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let badge = if self.ai_mode {
                        RichText::new("AI: ON").color(Color32::WHITE).background_color(self.theme.badge_on)
                    } else {
                        RichText::new("AI: OFF").color(Color32::WHITE).background_color(self.theme.badge_off)
                    };
                    if ui.button(badge).clicked() {
                        self.toggle_ai_mode();
                    }
                    clicked_sign_in = ui.button(sign_label).clicked();
                });
                if clicked_sign_in {
                    self.apply_action(ClickAction::SignIn);
                }
            });
        });
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(background) = &self.background {
                ui.painter().image(
                    background.id(),
                    ctx.screen_rect(),
                    Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }

            let avail = ui.available_rect_before_wrap();
            let panel_rect = Rect::from_min_max(
                avail.min,
                egui::pos2(avail.max.x, (avail.max.y - INPUT_AREA_HEIGHT).max(avail.min.y)),
            );
            self.render_chat_panel(ctx, ui, panel_rect);

            ui.advance_cursor_after_rect(panel_rect);
            self.render_input_area(ctx, ui);
        });
    }

    fn render_chat_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, panel_rect: Rect) {
        ui.painter().rect_filled(
            panel_rect,
            CornerRadius::same(self.theme.panel_radius),
            self.theme.panel,
        );

        // Textures must exist before layout so image sizes are measurable.
        let image_paths: Vec<PathBuf> = self
            .history
            .suffix(VISIBLE_TURNS)
            .iter()
            .filter_map(|turn| match &turn.content {
                crate::history::TurnContent::Image { path, .. } => Some(path.clone()),
                crate::history::TurnContent::Text(_) => None,
            })
            .collect();
        for path in image_paths {
            self.ensure_texture(ctx, &path);
        }

        let metrics = FrameMetrics {
            ctx,
            textures: &self.textures,
            theme: &self.theme,
        };
        let output = layout::layout(self.history.suffix(VISIBLE_TURNS), panel_rect, &metrics);
        self.frame_elements = output.elements;

        self.paint_elements(ui, panel_rect);

        let response = ui.allocate_rect(panel_rect, Sense::click());
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let action =
                    route_click(pos, self.image_modal.is_some(), None, &self.frame_elements);
                if let Some(action) = action {
                    self.apply_action(action);
                }
            }
        }
    }

    fn paint_elements(&self, ui: &egui::Ui, panel_rect: Rect) {
        let painter = ui.painter_at(panel_rect);
        for element in &self.frame_elements {
            match &element.kind {
                ElementKind::TextLine { text, role } => {
                    let (font, color) = self.text_style(*role);
                    painter.text(element.rect.min, Align2::LEFT_TOP, text, font, color);
                }
                ElementKind::CodeLine(text) => {
                    painter.text(
                        element.rect.min,
                        Align2::LEFT_TOP,
                        text,
                        self.theme.mono_font(),
                        self.theme.code,
                    );
                }
                ElementKind::LinkSpan { url } => {
                    painter.text(
                        element.rect.min,
                        Align2::LEFT_TOP,
                        url,
                        self.theme.prose_font(),
                        self.theme.link,
                    );
                }
                ElementKind::Image { path } => {
                    if let Some(Some(texture)) = self.textures.get(path) {
                        painter.image(
                            texture.id(),
                            element.rect,
                            Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            Color32::WHITE,
                        );
                    }
                }
            }
        }
    }

    fn text_style(&self, role: TextRole) -> (FontId, Color32) {
        match role {
            TextRole::Speaker => (self.theme.label_font(), self.theme.speaker_label),
            TextRole::Body => (self.theme.prose_font(), self.theme.text),
            TextRole::Caption => (self.theme.prose_font(), self.theme.text_muted),
        }
    }

    fn render_input_area(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        self.theme.input_frame().show(ui, |ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.input_buffer)
                    .desired_width(f32::INFINITY)
                    .hint_text("Type a message..."),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.submit_prompt(ctx);
                response.request_focus();
            }

            ui.label(
                RichText::new(format!(
                    "Press Enter to send. OpenAI enabled: {}",
                    self.ai_mode
                ))
                .color(self.theme.text_muted)
                .size(12.0),
            );
        });

        if !self.diagnostics.is_empty() {
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    for entry in &self.diagnostics {
                        ui.label(entry);
                    }
                });
        }
    }

    fn render_image_modal(&mut self, ctx: &egui::Context) {
        let Some(path) = self.image_modal.clone() else {
            return;
        };

        self.ensure_texture(ctx, &path);
        let screen = ctx.screen_rect();
        egui::Area::new(egui::Id::new("image_modal"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                let painter = ui.painter();
                painter.rect_filled(screen, CornerRadius::ZERO, self.theme.modal_dim);

                if let Some(Some(texture)) = self.textures.get(&path) {
                    let mut size = texture.size_vec2();
                    let max = screen.size() * 0.8;
                    let scale = (max.x / size.x).min(max.y / size.y).min(1.0);
                    size *= scale;
                    let image_rect = Rect::from_center_size(screen.center(), size);
                    painter.image(
                        texture.id(),
                        image_rect,
                        Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                } else {
                    painter.text(
                        screen.center(),
                        Align2::CENTER_CENTER,
                        format!("[image unavailable: {}]", path.display()),
                        self.theme.prose_font(),
                        self.theme.text,
                    );
                }

                // Any click while the modal is up dismisses it.
                let response = ui.allocate_rect(screen, Sense::click());
                if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        if let Some(action) = route_click(pos, true, None, &self.frame_elements) {
                            self.apply_action(action);
                        }
                    }
                }
            });
    }
}

impl eframe::App for ChatJamApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_results(ctx);
        self.ensure_background(ctx);
        self.render_top_bar(ctx);
        self.render_center_panel(ctx);
        self.render_image_modal(ctx);

        // Background tasks may still be in flight; keep the drain timely
        // without spinning.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

struct FrameMetrics<'a> {
    ctx: &'a egui::Context,
    textures: &'a HashMap<PathBuf, Option<TextureHandle>>,
    theme: &'a Theme,
}

impl FrameMetrics<'_> {
    fn measure(&self, text: &str, font: FontId) -> Vec2 {
        self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(text.to_string(), font, Color32::WHITE)
                .size()
        })
    }
}

impl Metrics for FrameMetrics<'_> {
    fn prose(&self, text: &str) -> Vec2 {
        self.measure(text, self.theme.prose_font())
    }

    fn mono(&self, text: &str) -> Vec2 {
        self.measure(text, self.theme.mono_font())
    }

    fn label(&self, text: &str) -> Vec2 {
        self.measure(text, self.theme.label_font())
    }

    fn image_size(&self, path: &Path) -> Option<Vec2> {
        self.textures
            .get(path)
            .and_then(|texture| texture.as_ref())
            .map(|texture| texture.size_vec2())
    }
}

fn load_color_image(path: &Path) -> anyhow::Result<ColorImage> {
    let bytes = std::fs::read(path)?;
    let decoded = image::load_from_memory(&bytes)?.to_rgba8();
    let size = [decoded.width() as usize, decoded.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(
        size,
        decoded.as_flat_samples().as_slice(),
    ))
}
