use eframe::egui;
use egui::{Color32, CornerRadius, RichText, ScrollArea, Stroke, Ui};
use std::time::Duration;
use tracing::{info, warn};

use crate::controller::StoryListController;
use crate::db::TermStore;
use crate::models::Story;
use crate::stories::filter_by_title;

pub const THEME_STORAGE_KEY: &str = "is_dark_mode";

pub struct AppTheme {
    background: Color32,
    card_background: Color32,
    text: Color32,
    secondary_text: Color32,
    highlight: Color32,
    separator: Color32,
    error: Color32,
    score_high: Color32,
    score_medium: Color32,
    score_low: Color32,
    button_background: Color32,
    button_foreground: Color32,
    button_active_background: Color32,
    button_hover_background: Color32,
}

impl AppTheme {
    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(18, 18, 18),
            card_background: Color32::from_rgb(30, 30, 30),
            text: Color32::from_rgb(240, 240, 240),
            secondary_text: Color32::from_rgb(180, 180, 180),
            highlight: Color32::from_rgb(255, 102, 0), // HN orange
            separator: Color32::from_rgb(60, 60, 60),
            error: Color32::from_rgb(239, 83, 80),
            score_high: Color32::from_rgb(76, 175, 80),
            score_medium: Color32::from_rgb(255, 193, 7),
            score_low: Color32::from_rgb(158, 158, 158),
            button_background: Color32::from_rgb(66, 66, 66),
            button_foreground: Color32::from_rgb(240, 240, 240),
            button_active_background: Color32::from_rgb(255, 102, 0),
            button_hover_background: Color32::from_rgb(80, 80, 80),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color32::from_rgb(245, 245, 245),
            card_background: Color32::from_rgb(255, 255, 255),
            text: Color32::from_rgb(20, 20, 20),
            secondary_text: Color32::from_rgb(90, 90, 90),
            highlight: Color32::from_rgb(235, 92, 0),
            separator: Color32::from_rgb(200, 200, 200),
            error: Color32::from_rgb(198, 40, 40),
            score_high: Color32::from_rgb(30, 110, 40),
            score_medium: Color32::from_rgb(190, 130, 0),
            score_low: Color32::from_rgb(80, 80, 80),
            button_background: Color32::from_rgb(235, 235, 235),
            button_foreground: Color32::from_rgb(20, 20, 20),
            button_active_background: Color32::from_rgb(235, 92, 0),
            button_hover_background: Color32::from_rgb(210, 210, 210),
        }
    }

    pub fn for_mode(is_dark_mode: bool) -> Self {
        if is_dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.card_background;
        style.visuals.window_stroke = Stroke::new(1.0, self.separator);
        style.visuals.widgets.noninteractive.bg_fill = self.card_background;
        style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text);

        style.visuals.widgets.inactive.bg_fill = self.button_background;
        style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.active.bg_fill = self.button_active_background;
        style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.hovered.bg_fill = self.button_hover_background;
        style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.button_foreground);

        style.visuals.selection.bg_fill = self.highlight;
        style.visuals.selection.stroke = Stroke::new(1.0, self.highlight);

        style.visuals.window_corner_radius = CornerRadius::same(8);
        style.visuals.widgets.noninteractive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.inactive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.hovered.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.active.corner_radius = CornerRadius::same(4);

        ctx.set_style(style);
    }

    fn points_color(&self, points: i64) -> Color32 {
        if points >= 300 {
            self.score_high
        } else if points >= 100 {
            self.score_medium
        } else {
            self.score_low
        }
    }
}

pub struct HackerStoriesApp<S: TermStore> {
    controller: StoryListController<S>,
    // Mirror of the controller's draft term, egui edits a String in place
    search_input: String,
    filter_query: String,
    theme: AppTheme,
    is_dark_mode: bool,
    focus_requested: bool,
}

impl<S: TermStore> HackerStoriesApp<S> {
    /// Builds the app and kicks off the initial search for the loaded term.
    pub fn new(mut controller: StoryListController<S>, is_dark_mode: bool) -> Self {
        let search_input = controller.search_term().to_string();
        controller.fetch_stories();

        Self {
            controller,
            search_input,
            filter_query: String::new(),
            theme: AppTheme::for_mode(is_dark_mode),
            is_dark_mode,
            focus_requested: false,
        }
    }

    fn toggle_theme(&mut self) {
        self.is_dark_mode = !self.is_dark_mode;
        self.theme = AppTheme::for_mode(self.is_dark_mode);
    }

    fn open_link(&self, url: &str) {
        if let Err(e) = open::that(url) {
            warn!("Failed to open URL {}: {}", url, e);
        }
    }

    fn submit(&mut self) {
        if !self.controller.can_submit() {
            return;
        }
        self.filter_query.clear();
        self.controller.submit_search();
    }

    fn render_header(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!(
                    "My Hacker Stories with {} comments.",
                    self.controller.comment_total()
                ))
                .color(self.theme.highlight)
                .size(26.0)
                .strong(),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if self.is_dark_mode { "☀" } else { "🌙" };
                let theme_btn = ui.add(
                    egui::Button::new(RichText::new(label).size(18.0).color(self.theme.button_foreground))
                        .min_size(egui::Vec2::new(32.0, 32.0))
                        .corner_radius(CornerRadius::same(6))
                        .fill(self.theme.button_background),
                );
                if theme_btn.clicked() {
                    self.toggle_theme();
                }
            });
        });
    }

    fn render_search_form(&mut self, ui: &mut Ui) {
        let mut submitted = false;

        ui.horizontal(|ui| {
            ui.label(RichText::new("Search:").color(self.theme.text).size(16.0).strong());
            ui.add_space(8.0);

            let text_edit = ui.add_sized(
                [ui.available_width() - 100.0, 32.0],
                egui::TextEdit::singleline(&mut self.search_input)
                    .hint_text("Search Hacker News...")
                    .text_color(self.theme.text)
                    .id(egui::Id::new("search")),
            );

            if !self.focus_requested {
                text_edit.request_focus();
                self.focus_requested = true;
            }

            if text_edit.changed() {
                self.controller.update_draft_term(&self.search_input);
            }

            if text_edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submitted = true;
            }

            ui.add_space(8.0);
            let submit_btn = ui.add_enabled(
                self.controller.can_submit(),
                egui::Button::new(
                    RichText::new("Submit")
                        .color(self.theme.button_foreground)
                        .size(15.0),
                )
                .min_size(egui::Vec2::new(80.0, 32.0))
                .fill(self.theme.button_background),
            );
            if submit_btn.clicked() {
                submitted = true;
            }
        });

        if submitted {
            self.submit();
        }

        ui.label(
            RichText::new(self.controller.submitted_url())
                .color(self.theme.secondary_text)
                .size(12.0)
                .monospace(),
        );
    }

    fn render_filter(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Filter loaded:").color(self.theme.secondary_text).size(14.0));
            ui.add_space(8.0);
            ui.add_sized(
                [240.0, 24.0],
                egui::TextEdit::singleline(&mut self.filter_query)
                    .hint_text("title contains...")
                    .text_color(self.theme.text),
            );
            if !self.filter_query.is_empty() && ui.small_button("Clear").clicked() {
                self.filter_query.clear();
            }
        });
    }

    fn render_stories(&mut self, ui: &mut Ui) {
        let mut story_to_remove: Option<String> = None;
        let mut link_to_open: Option<String> = None;

        let all = &self.controller.stories().data;
        let visible = filter_by_title(all, &self.filter_query);

        if visible.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                let message = if all.is_empty() {
                    "No stories.".to_string()
                } else {
                    format!("No loaded story matches '{}'", self.filter_query)
                };
                ui.label(
                    RichText::new(message)
                        .color(self.theme.secondary_text)
                        .size(16.0)
                        .italics(),
                );
            });
            return;
        }

        ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            for story in visible {
                self.render_story(ui, story, &mut story_to_remove, &mut link_to_open);
            }
        });

        if let Some(url) = link_to_open {
            self.open_link(&url);
        }
        if let Some(id) = story_to_remove {
            info!(id = %id, "Removing story");
            self.controller.remove_story(&id);
        }
    }

    fn render_story(
        &self,
        ui: &mut Ui,
        story: &Story,
        story_to_remove: &mut Option<String>,
        link_to_open: &mut Option<String>,
    ) {
        egui::Frame::new()
            .fill(self.theme.card_background)
            .corner_radius(CornerRadius::same(8))
            .stroke(Stroke::new(1.0, self.theme.separator))
            .inner_margin(12.0)
            .outer_margin(egui::vec2(8.0, 6.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let title_label = ui.add(
                        egui::Label::new(
                            RichText::new(&story.title)
                                .color(self.theme.text)
                                .size(16.0)
                                .strong(),
                        )
                        .sense(egui::Sense::click()),
                    );

                    if title_label.clicked() && !story.url.is_empty() {
                        *link_to_open = Some(story.url.clone());
                    }
                    if title_label.hovered() && !story.url.is_empty() {
                        ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let remove_btn = ui.add(
                            egui::Button::new(RichText::new("✔").color(self.theme.button_foreground))
                                .min_size(egui::Vec2::new(28.0, 28.0))
                                .fill(self.theme.button_background),
                        );
                        if remove_btn.on_hover_text("Dismiss").clicked() {
                            *story_to_remove = Some(story.id.clone());
                        }

                        ui.add_space(8.0);
                        ui.label(
                            RichText::new(format!("{} pts", story.points))
                                .color(self.theme.points_color(story.points))
                                .strong(),
                        );
                    });
                });

                ui.horizontal(|ui| {
                    ui.label(RichText::new("by").color(self.theme.secondary_text).size(14.0));
                    ui.label(RichText::new(&story.author).color(self.theme.text).size(14.0));
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new(format!("{} comments", story.comment_count))
                            .color(self.theme.secondary_text)
                            .size(14.0),
                    );
                });
            });
    }
}

impl<S: TermStore> eframe::App for HackerStoriesApp<S> {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string(THEME_STORAGE_KEY, self.is_dark_mode.to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);

        if self.controller.poll_fetches() {
            ctx.request_repaint();
        }
        if self.controller.is_fetching() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui);
            ui.add(egui::Separator::default().spacing(12.0));
            self.render_search_form(ui);
            ui.add_space(8.0);

            if self.controller.stories().is_error {
                ui.label(
                    RichText::new("Something went wrong.")
                        .color(self.theme.error)
                        .size(16.0),
                );
            }

            if self.controller.stories().is_loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new("Loading ...").color(self.theme.secondary_text));
                });
            } else {
                self.render_filter(ui);
                ui.add_space(4.0);
                self.render_stories(ui);
            }
        });
    }
}
