//! egui rendering of the quick-pick selector

use flock_core::{ItemVisual, Notice, OptionSetStore, SelectorEvent, SelectorWidget};

const ACCENT: egui::Color32 = egui::Color32::from_rgb(24, 144, 255);

/// One option set together with the widget that edits it
pub struct SelectorPanel {
    id: &'static str,
    store: OptionSetStore,
    widget: SelectorWidget,
}

impl SelectorPanel {
    pub fn new(id: &'static str, title: &str, store: OptionSetStore) -> Self {
        let widget = SelectorWidget::new(title, &store);
        Self { id, store, widget }
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.widget.take_notice()
    }

    /// Draws the title row, the buttons and any open dialog. Returns the
    /// events produced this frame.
    pub fn show(&mut self, ui: &mut egui::Ui, selected: &str) -> Vec<SelectorEvent> {
        self.widget.sync(&self.store);

        let mut events = Vec::new();

        ui.horizontal(|ui| {
            ui.strong(self.widget.title());
            let toggle = egui::RichText::new(self.widget.toggle_label()).small();
            if ui.button(toggle).clicked() {
                self.widget.toggle_mode();
            }
        });

        // Item under the pointer while a drag is in progress
        let mut hovered = None;

        ui.horizontal_wrapped(|ui| {
            for idx in 0..self.widget.options().len() {
                let visual = self.widget.item_visual(idx, Some(selected));
                events.extend(self.show_item(ui, idx, visual, &mut hovered));
            }

            if self.widget.shows_new_button() && ui.button("➕ 新增").clicked() {
                self.widget.open_new();
            }
        });

        // Release is handled after every item had a chance to claim the pointer
        // The drag session decides whether the recorded target yields a move
        if self.widget.drag_session().is_active() && ui.input(|i| i.pointer.primary_released()) {
            if hovered.is_some() {
                events.extend(self.widget.drop(&mut self.store));
            } else {
                self.widget.drag_end();
            }
        }

        events.extend(self.show_editor(ui.ctx()));
        events.extend(self.show_delete_confirmation(ui.ctx()));

        events
    }

    fn show_item(
        &mut self,
        ui: &mut egui::Ui,
        idx: usize,
        visual: ItemVisual,
        hovered: &mut Option<usize>,
    ) -> Option<SelectorEvent> {
        let option = &self.widget.options()[idx];
        let text = match option.icon.as_deref() {
            Some(icon) => format!("{} {}", icon_glyph(icon), option.label),
            None => option.label.clone(),
        };

        let sense = if visual.draggable {
            egui::Sense::click_and_drag()
        } else {
            egui::Sense::click()
        };

        let galley = egui::WidgetText::from(text).into_galley(
            ui,
            Some(egui::TextWrapMode::Extend),
            f32::INFINITY,
            egui::TextStyle::Button,
        );
        let desired_size = galley.size() + egui::vec2(16.0, 8.0);
        let (rect, response) = ui.allocate_exact_size(desired_size, sense);

        let style = ui.style().interact_selectable(&response, visual.highlighted);
        let (mut fill, mut text_color) = if visual.highlighted {
            (ACCENT, egui::Color32::WHITE)
        } else {
            (style.weak_bg_fill, style.text_color())
        };
        if visual.lifted {
            fill = fill.gamma_multiply(0.5);
            text_color = text_color.gamma_multiply(0.5);
        }

        ui.painter().rect(rect, style.rounding, fill, style.bg_stroke);
        ui.painter()
            .galley(rect.min + egui::vec2(8.0, 4.0), galley, text_color);

        if visual.drop_indicator {
            let r = rect.expand(2.0);
            let outline = [
                r.left_top(),
                r.right_top(),
                r.right_bottom(),
                r.left_bottom(),
                r.left_top(),
            ];
            ui.painter().extend(egui::Shape::dashed_line(
                &outline,
                egui::Stroke::new(1.5, ACCENT),
                4.0,
                3.0,
            ));
        }

        let mut event = None;

        if response.clicked() {
            event = self.widget.click(idx);
        }

        if visual.draggable {
            if response.drag_started() {
                self.widget.drag_start(idx);
            }

            // Pointer position is more reliable than hovered() while dragging
            if self.widget.drag_session().is_active() {
                if let Some(pointer_pos) = ui.input(|i| i.pointer.hover_pos()) {
                    if rect.contains(pointer_pos) {
                        *hovered = Some(idx);
                        if self.widget.drag_over(idx) {
                            ui.ctx().request_repaint();
                        }
                    }
                }
            }
        }

        if visual.deletable && ui.small_button("🗑").on_hover_text("刪除").clicked() {
            self.widget.request_delete(idx);
        }

        event
    }

    fn show_editor(&mut self, ctx: &egui::Context) -> Option<SelectorEvent> {
        let id = self.id;
        let mut submit = false;
        let mut cancel = false;

        if let Some(editor) = self.widget.editor_mut() {
            egui::Window::new(editor.title())
                .id(egui::Id::new((id, "editor")))
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    egui::Grid::new((id, "editor_grid"))
                        .num_columns(2)
                        .spacing([12.0, 8.0])
                        .show(ui, |ui| {
                            ui.label("按鈕文字");
                            ui.text_edit_singleline(&mut editor.label);
                            ui.end_row();

                            ui.label("按鈕值");
                            ui.text_edit_singleline(&mut editor.value);
                            ui.end_row();
                        });

                    if let Some(err) = editor.error() {
                        ui.colored_label(egui::Color32::RED, err.to_string());
                    }

                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("確定").clicked() {
                            submit = true;
                        }
                        if ui.button("取消").clicked() {
                            cancel = true;
                        }
                    });
                });
        }

        if submit {
            self.widget.submit_editor(&mut self.store)
        } else {
            if cancel {
                self.widget.cancel_editor();
            }
            None
        }
    }

    fn show_delete_confirmation(&mut self, ctx: &egui::Context) -> Option<SelectorEvent> {
        let label = self.widget.pending_delete()?.label.clone();
        let mut confirm = false;
        let mut cancel = false;

        egui::Window::new("⚠ 刪除按鈕")
            .id(egui::Id::new((self.id, "delete")))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("確定要刪除「{}」這個按鈕嗎？", label));
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.button("確定").clicked() {
                        confirm = true;
                    }
                    if ui.button("取消").clicked() {
                        cancel = true;
                    }
                });
            });

        if confirm {
            self.widget.confirm_delete(&mut self.store)
        } else {
            if cancel {
                self.widget.cancel_delete();
            }
            None
        }
    }
}

/// Maps stored icon tags to glyphs the default fonts can draw
fn icon_glyph(tag: &str) -> &'static str {
    match tag {
        "sun" => "☀",
        "cloud" => "☁",
        "cloud-download" => "🌧",
        "thunderbolt" => "⚡",
        "check-circle" => "✔",
        "warning" => "⚠",
        "close-circle" => "✖",
        _ => "•",
    }
}
