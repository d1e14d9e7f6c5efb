use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::path::PathBuf;
use std::sync::Arc;

use flock_core::categories::{
    CHICKEN_RECORDS, CULLING_RECORDS, DAILY_RECORDS, DEATH_RECORDS, SALES_RECORDS,
};
use flock_core::records::birds_on_hand;
use flock_core::{
    create_backend, determine_data_path, get_config_path, ChickenIntake, Config, ContactBook,
    ContactList, CullingForm, CullingRecord, DailyForm, DailyRecord, DeathForm, DeathRecord,
    IntakeForm, Journal, MemoryBacking, Notice, NoticeKind, OptionCategory, OptionItem,
    OptionSetStore, SaleForm, SaleRecord, SelectorConsumer, SelectorEvent, SharedBacking,
};

use crate::selector_view::SelectorPanel;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const UNSAVED_WARNING: &str = "記錄未能保存，重新載入後可能遺失";

/// System fonts tried in order for CJK glyphs
const CJK_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Light.ttc",
    "C:\\Windows\\Fonts\\msjh.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Daily,
    Intake,
    Death,
    Sales,
}

/// Writes selector events into one text field of a form
struct FieldBinding<'a> {
    field: &'a mut String,
}

impl SelectorConsumer for FieldBinding<'_> {
    fn on_select(&mut self, value: &str) {
        *self.field = value.to_string();
    }

    fn on_change(&mut self, options: &[OptionItem]) {
        log::debug!("Selector now offers {} options", options.len());
    }
}

/// Routes selector events into a contact book: picks are remembered and
/// list edits are written back with the contact details preserved
struct ContactBinding<'a> {
    book: &'a mut ContactBook,
    field: &'a mut String,
}

impl SelectorConsumer for ContactBinding<'_> {
    fn on_select(&mut self, value: &str) {
        *self.field = value.to_string();
        let picked = self.book.find_by_name(value).map(|c| c.id);
        if let Some(id) = picked {
            self.book.select(id);
        }
    }

    fn on_change(&mut self, options: &[OptionItem]) {
        self.book.apply_options(options);
    }
}

pub struct FlockApp {
    data_location: String,
    page: Page,

    weather: SelectorPanel,
    health: SelectorPanel,
    environment: SelectorPanel,
    customer_panel: SelectorPanel,
    breeds: SelectorPanel,
    suppliers: SelectorPanel,
    death_reasons: SelectorPanel,
    sales_customers: SelectorPanel,
    culling_reasons: SelectorPanel,

    customers: ContactBook,

    dailies: Journal<DailyRecord>,
    intakes: Journal<ChickenIntake>,
    deaths: Journal<DeathRecord>,
    sales: Journal<SaleRecord>,
    cullings: Journal<CullingRecord>,

    daily_form: DailyForm,
    daily_date: String,
    daily_time: String,
    intake_form: IntakeForm,
    intake_date: String,
    death_form: DeathForm,
    death_date: String,
    sale_form: SaleForm,
    sale_date: String,
    cull_form: CullingForm,
    cull_date: String,

    message: Option<(String, bool)>, // (message, is_error)
}

impl FlockApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::configure_fonts(&cc.egui_ctx);

        let (backing, data_location, message) = match open_backing() {
            Ok((backing, path)) => (backing, path.display().to_string(), None),
            Err(e) => {
                log::error!("Falling back to in-memory storage: {:#}", e);
                let backing: SharedBacking = Arc::new(MemoryBacking::new());
                (
                    backing,
                    "(memory)".to_string(),
                    Some((format!("無法開啟資料檔，變更不會保存: {:#}", e), true)),
                )
            }
        };

        let panel = |id: &'static str, category: OptionCategory| {
            SelectorPanel::new(
                id,
                category.title(),
                OptionSetStore::for_category(backing.clone(), category),
            )
        };
        let weather = panel("weather", OptionCategory::Weather);
        let health = panel("health", OptionCategory::Health);
        let environment = panel("environment", OptionCategory::Environment);
        let breeds = panel("breeds", OptionCategory::ChickenBreeds);
        let suppliers = panel("suppliers", OptionCategory::Suppliers);
        let death_reasons = panel("death_reasons", OptionCategory::DeathReasons);
        let sales_customers = panel("sales_customers", OptionCategory::SalesCustomers);
        let culling_reasons = panel("culling_reasons", OptionCategory::CullingReasons);

        let customers = ContactBook::load(backing.clone(), ContactList::Customers);
        let customer_panel =
            SelectorPanel::new("customers", ContactList::Customers.title(), customers.option_store());

        let dailies: Journal<DailyRecord> = Journal::load(backing.clone(), DAILY_RECORDS);
        let intakes: Journal<ChickenIntake> = Journal::load(backing.clone(), CHICKEN_RECORDS);
        let deaths: Journal<DeathRecord> = Journal::load(backing.clone(), DEATH_RECORDS);
        let sales: Journal<SaleRecord> = Journal::load(backing.clone(), SALES_RECORDS);
        let cullings: Journal<CullingRecord> = Journal::load(backing.clone(), CULLING_RECORDS);

        let now = now();
        let today = now.date();

        Self {
            data_location,
            page: Page::Daily,
            weather,
            health,
            environment,
            customer_panel,
            breeds,
            suppliers,
            death_reasons,
            sales_customers,
            culling_reasons,
            daily_form: DailyForm::new(now, &customers),
            daily_date: today.format(DATE_FORMAT).to_string(),
            daily_time: now.format(TIME_FORMAT).to_string(),
            intake_form: IntakeForm::new(today),
            intake_date: today.format(DATE_FORMAT).to_string(),
            death_form: DeathForm::new(today, &intakes),
            death_date: today.format(DATE_FORMAT).to_string(),
            sale_form: SaleForm::new(today, &intakes),
            sale_date: today.format(DATE_FORMAT).to_string(),
            cull_form: CullingForm::new(today, &intakes),
            cull_date: today.format(DATE_FORMAT).to_string(),
            customers,
            dailies,
            intakes,
            deaths,
            sales,
            cullings,
            message,
        }
    }

    fn configure_fonts(ctx: &egui::Context) {
        let Some(font) = CJK_FONT_CANDIDATES
            .iter()
            .find_map(|path| std::fs::read(path).ok())
        else {
            log::warn!("No CJK font found; Chinese text may not render");
            return;
        };

        let mut fonts = egui::FontDefinitions::default();
        fonts
            .font_data
            .insert("cjk".to_owned(), egui::FontData::from_owned(font).into());

        // Fallback after the default fonts so Latin text keeps its look
        for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
            fonts
                .families
                .entry(family)
                .or_default()
                .push("cjk".to_owned());
        }

        ctx.set_fonts(fonts);
    }

    fn apply_notice(&mut self, notice: Option<Notice>) {
        if let Some(notice) = notice {
            let is_error = notice.kind == NoticeKind::Warning;
            self.message = Some((notice.text, is_error));
        }
    }

    fn show_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("🐔 雞場管理");
                ui.separator();
                ui.selectable_value(&mut self.page, Page::Daily, "每日記錄");
                ui.selectable_value(&mut self.page, Page::Intake, "雞苗入場");
                ui.selectable_value(&mut self.page, Page::Death, "死亡記錄");
                ui.selectable_value(&mut self.page, Page::Sales, "出售與淘汰");

                ui.separator();
                ui.label(format!(
                    "在場數量: {}",
                    birds_on_hand(&self.intakes, &self.deaths, &self.sales, &self.cullings)
                ));

                if let Some((msg, is_error)) = &self.message {
                    ui.separator();
                    let color = if *is_error {
                        egui::Color32::RED
                    } else {
                        egui::Color32::GREEN
                    };
                    ui.colored_label(color, msg);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(&self.data_location);
                    if self.message.is_some() && ui.small_button("✖").clicked() {
                        self.message = None;
                    }
                });
            });
        });
    }

    fn show_intake_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("雞苗入場");
        ui.add_space(8.0);

        let notice = show_selector(&mut self.breeds, ui, &mut self.intake_form.breed);
        self.apply_notice(notice);
        ui.add_space(6.0);
        let notice = show_selector(&mut self.suppliers, ui, &mut self.intake_form.supplier);
        self.apply_notice(notice);
        ui.add_space(10.0);

        egui::Grid::new("intake_form_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("入場日期");
                ui.add(egui::TextEdit::singleline(&mut self.intake_date).hint_text("YYYY-MM-DD"));
                ui.end_row();

                ui.label("批次編號");
                ui.text_edit_singleline(&mut self.intake_form.batch_number);
                ui.end_row();

                ui.label("品種");
                ui.text_edit_singleline(&mut self.intake_form.breed);
                ui.end_row();

                ui.label("供應商");
                ui.text_edit_singleline(&mut self.intake_form.supplier);
                ui.end_row();

                ui.label("數量");
                ui.add(egui::DragValue::new(&mut self.intake_form.quantity).range(1..=1_000_000));
                ui.end_row();

                ui.label("單價");
                ui.add(
                    egui::DragValue::new(&mut self.intake_form.unit_price)
                        .speed(0.5)
                        .range(0.0..=1_000_000.0)
                        .prefix("$"),
                );
                ui.end_row();

                ui.label("總金額");
                ui.strong(format!("${:.2}", self.intake_form.total_amount()));
                ui.end_row();

                ui.label("備註");
                ui.text_edit_multiline(&mut self.intake_form.notes);
                ui.end_row();
            });

        ui.add_space(8.0);
        if ui.button("💾 新增記錄").clicked() {
            self.submit_intake();
        }

        ui.separator();
        self.show_intake_table(ui);
    }

    fn submit_intake(&mut self) {
        let Some(date) = self.parse_date(&self.intake_date.clone()) else {
            return;
        };
        self.intake_form.entry_date = date;

        match self.intake_form.submit() {
            Ok(record) => {
                let batch = record.batch_number.clone();
                self.intakes.record(record);
                self.message = Some(if self.intakes.last_write_succeeded() {
                    (format!("批次 {} 已新增", batch), false)
                } else {
                    (UNSAVED_WARNING.to_string(), true)
                });

                let today = today();
                self.intake_form = IntakeForm::new(today);
                self.intake_date = today.format(DATE_FORMAT).to_string();
                if self.death_form.batch_number.is_empty() {
                    self.death_form.batch_number = batch.clone();
                }
                if self.sale_form.chicken_batch.is_empty() {
                    self.sale_form.chicken_batch = batch.clone();
                }
                if self.cull_form.chicken_batch.is_empty() {
                    self.cull_form.chicken_batch = batch;
                }
            }
            Err(e) => self.message = Some((e.to_string(), true)),
        }
    }

    fn show_intake_table(&mut self, ui: &mut egui::Ui) {
        if self.intakes.is_empty() {
            ui.weak("尚無入場記錄");
            return;
        }

        let mut remove = None;
        egui::Grid::new("intake_table")
            .striped(true)
            .num_columns(8)
            .spacing([16.0, 4.0])
            .show(ui, |ui| {
                for header in ["日期", "批次", "品種", "數量", "供應商", "單價", "總金額", ""] {
                    ui.strong(header);
                }
                ui.end_row();

                for entry in self.intakes.entries() {
                    let r = &entry.data;
                    ui.label(r.entry_date.to_string());
                    ui.label(&r.batch_number);
                    ui.label(&r.breed);
                    ui.label(r.quantity.to_string());
                    ui.label(&r.supplier);
                    ui.label(format!("{:.2}", r.unit_price));
                    ui.label(format!("{:.2}", r.total_amount));
                    if ui.small_button("🗑").on_hover_text("刪除記錄").clicked() {
                        remove = Some(entry.id);
                    }
                    ui.end_row();
                }
            });

        if let Some(id) = remove {
            self.intakes.remove(id);
            if !self.intakes.last_write_succeeded() {
                self.message = Some((UNSAVED_WARNING.to_string(), true));
            }
        }
    }

    fn show_death_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("死亡記錄");
        ui.add_space(8.0);

        let notice = show_selector(&mut self.death_reasons, ui, &mut self.death_form.reason);
        self.apply_notice(notice);
        ui.add_space(10.0);

        egui::Grid::new("death_form_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("死亡日期");
                ui.add(egui::TextEdit::singleline(&mut self.death_date).hint_text("YYYY-MM-DD"));
                ui.end_row();

                ui.label("批次編號");
                batch_combo(ui, "death_batch", &self.intakes, &mut self.death_form.batch_number);
                ui.end_row();

                ui.label("死亡原因");
                ui.text_edit_singleline(&mut self.death_form.reason);
                ui.end_row();

                ui.label("數量");
                ui.add(egui::DragValue::new(&mut self.death_form.quantity).range(1..=1_000_000));
                ui.end_row();

                ui.label("備註");
                ui.text_edit_multiline(&mut self.death_form.notes);
                ui.end_row();
            });

        ui.add_space(8.0);
        if ui.button("💾 新增記錄").clicked() {
            self.submit_death();
        }

        ui.separator();
        self.show_death_table(ui);
    }

    fn submit_death(&mut self) {
        let Some(date) = self.parse_date(&self.death_date.clone()) else {
            return;
        };
        self.death_form.death_date = date;

        match self.death_form.submit() {
            Ok(record) => {
                let quantity = record.quantity;
                self.deaths.record(record);
                self.message = Some(if self.deaths.last_write_succeeded() {
                    (format!("已記錄死亡 {} 隻", quantity), false)
                } else {
                    (UNSAVED_WARNING.to_string(), true)
                });

                let today = today();
                self.death_form = DeathForm::new(today, &self.intakes);
                self.death_date = today.format(DATE_FORMAT).to_string();
            }
            Err(e) => self.message = Some((e.to_string(), true)),
        }
    }

    fn show_death_table(&mut self, ui: &mut egui::Ui) {
        if self.deaths.is_empty() {
            ui.weak("尚無死亡記錄");
            return;
        }

        let mut remove = None;
        egui::Grid::new("death_table")
            .striped(true)
            .num_columns(6)
            .spacing([16.0, 4.0])
            .show(ui, |ui| {
                for header in ["日期", "批次", "數量", "原因", "備註", ""] {
                    ui.strong(header);
                }
                ui.end_row();

                for entry in self.deaths.entries() {
                    let r = &entry.data;
                    ui.label(r.death_date.to_string());
                    ui.label(&r.batch_number);
                    ui.label(r.quantity.to_string());
                    ui.label(&r.reason);
                    ui.label(r.notes.as_deref().unwrap_or(""));
                    if ui.small_button("🗑").on_hover_text("刪除記錄").clicked() {
                        remove = Some(entry.id);
                    }
                    ui.end_row();
                }
            });

        if let Some(id) = remove {
            self.deaths.remove(id);
            if !self.deaths.last_write_succeeded() {
                self.message = Some((UNSAVED_WARNING.to_string(), true));
            }
        }
    }

    fn show_daily_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("每日記錄");
        ui.add_space(8.0);

        let events = self.customer_panel.show(ui, self.daily_form.customer.as_str());
        let handled = !events.is_empty();
        let mut binding = ContactBinding {
            book: &mut self.customers,
            field: &mut self.daily_form.customer,
        };
        for event in events {
            event.dispatch(&mut binding);
        }
        let notice = self.customer_panel.take_notice();
        self.apply_notice(notice);
        // The panel edits an in-memory mirror; the book holds the real write
        if handled && !self.customers.last_write_succeeded() {
            self.message = Some((UNSAVED_WARNING.to_string(), true));
        }
        ui.add_space(6.0);

        let notice = show_selector(&mut self.weather, ui, &mut self.daily_form.weather);
        self.apply_notice(notice);
        ui.add_space(6.0);
        let notice = show_selector(&mut self.health, ui, &mut self.daily_form.health_status);
        self.apply_notice(notice);
        ui.add_space(6.0);
        let notice = show_selector(&mut self.environment, ui, &mut self.daily_form.environment_status);
        self.apply_notice(notice);
        ui.add_space(10.0);

        egui::Grid::new("daily_form_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("日期");
                ui.add(egui::TextEdit::singleline(&mut self.daily_date).hint_text("YYYY-MM-DD"));
                ui.end_row();

                ui.label("時間");
                ui.add(egui::TextEdit::singleline(&mut self.daily_time).hint_text("HH:MM"));
                ui.end_row();

                ui.label("客戶");
                ui.text_edit_singleline(&mut self.daily_form.customer);
                ui.end_row();

                ui.label("天氣");
                ui.text_edit_singleline(&mut self.daily_form.weather);
                ui.end_row();

                ui.label("溫度");
                ui.add(
                    egui::DragValue::new(&mut self.daily_form.temperature)
                        .speed(0.5)
                        .range(-20.0..=50.0)
                        .suffix(" °C"),
                );
                ui.end_row();

                ui.label("濕度");
                ui.add(
                    egui::DragValue::new(&mut self.daily_form.humidity)
                        .range(0.0..=100.0)
                        .suffix(" %"),
                );
                ui.end_row();

                ui.label("健康狀況");
                ui.text_edit_singleline(&mut self.daily_form.health_status);
                ui.end_row();

                ui.label("健康備註");
                ui.text_edit_multiline(&mut self.daily_form.health_notes);
                ui.end_row();

                ui.label("環境狀況");
                ui.text_edit_singleline(&mut self.daily_form.environment_status);
                ui.end_row();

                ui.label("環境備註");
                ui.text_edit_multiline(&mut self.daily_form.environment_notes);
                ui.end_row();
            });

        ui.add_space(8.0);
        if ui.button("💾 保存記錄").clicked() {
            self.submit_daily();
        }

        ui.separator();
        self.show_daily_table(ui);
    }

    fn submit_daily(&mut self) {
        let Some(date) = self.parse_date(&self.daily_date.clone()) else {
            return;
        };
        let time = match NaiveTime::parse_from_str(self.daily_time.trim(), TIME_FORMAT) {
            Ok(time) => time,
            Err(_) => {
                self.message = Some((format!("時間格式錯誤: {}（應為 HH:MM）", self.daily_time), true));
                return;
            }
        };
        self.daily_form.record_date = date;
        self.daily_form.record_time = time;

        match self.daily_form.submit() {
            Ok(record) => {
                self.dailies.record(record);
                self.message = Some(if self.dailies.last_write_succeeded() {
                    ("記錄已保存".to_string(), false)
                } else {
                    (UNSAVED_WARNING.to_string(), true)
                });

                let now = now();
                self.daily_form = DailyForm::new(now, &self.customers);
                self.daily_date = now.format(DATE_FORMAT).to_string();
                self.daily_time = now.format(TIME_FORMAT).to_string();
            }
            Err(e) => self.message = Some((e.to_string(), true)),
        }
    }

    fn show_daily_table(&mut self, ui: &mut egui::Ui) {
        if self.dailies.is_empty() {
            ui.weak("尚無每日記錄");
            return;
        }

        let mut remove = None;
        egui::Grid::new("daily_table")
            .striped(true)
            .num_columns(8)
            .spacing([16.0, 4.0])
            .show(ui, |ui| {
                for header in ["日期", "時間", "客戶", "天氣", "溫度", "濕度", "健康", ""] {
                    ui.strong(header);
                }
                ui.end_row();

                for entry in self.dailies.entries() {
                    let r = &entry.data;
                    ui.label(r.record_date.to_string());
                    ui.label(r.record_time.format(TIME_FORMAT).to_string());
                    ui.label(&r.customer);
                    ui.label(&r.weather);
                    ui.label(format!("{:.1}°C", r.temperature));
                    ui.label(format!("{:.0}%", r.humidity));
                    ui.label(&r.health_status);
                    if ui.small_button("🗑").on_hover_text("刪除記錄").clicked() {
                        remove = Some(entry.id);
                    }
                    ui.end_row();
                }
            });

        if let Some(id) = remove {
            self.dailies.remove(id);
            if !self.dailies.last_write_succeeded() {
                self.message = Some((UNSAVED_WARNING.to_string(), true));
            }
        }
    }

    fn show_sales_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("出售記錄");
        ui.add_space(8.0);

        let notice = show_selector(&mut self.sales_customers, ui, &mut self.sale_form.customer);
        self.apply_notice(notice);
        ui.add_space(10.0);

        egui::Grid::new("sale_form_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("出售日期");
                ui.add(egui::TextEdit::singleline(&mut self.sale_date).hint_text("YYYY-MM-DD"));
                ui.end_row();

                ui.label("雞隻批次");
                batch_combo(ui, "sale_batch", &self.intakes, &mut self.sale_form.chicken_batch);
                ui.end_row();

                ui.label("客戶");
                ui.text_edit_singleline(&mut self.sale_form.customer);
                ui.end_row();

                ui.label("數量");
                ui.add(egui::DragValue::new(&mut self.sale_form.quantity).range(1..=1_000_000));
                ui.end_row();

                ui.label("單價");
                ui.add(
                    egui::DragValue::new(&mut self.sale_form.unit_price)
                        .speed(1.0)
                        .range(0.0..=1_000_000.0)
                        .prefix("NT$ "),
                );
                ui.end_row();

                ui.label("總金額");
                ui.strong(format!("NT$ {:.2}", self.sale_form.total_amount()));
                ui.end_row();

                ui.label("備註");
                ui.text_edit_multiline(&mut self.sale_form.notes);
                ui.end_row();
            });

        ui.add_space(8.0);
        if ui.button("💾 新增出售").clicked() {
            self.submit_sale();
        }

        ui.separator();
        ui.heading("淘汰記錄");
        ui.add_space(8.0);

        let notice = show_selector(&mut self.culling_reasons, ui, &mut self.cull_form.reason);
        self.apply_notice(notice);
        ui.add_space(10.0);

        egui::Grid::new("cull_form_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("淘汰日期");
                ui.add(egui::TextEdit::singleline(&mut self.cull_date).hint_text("YYYY-MM-DD"));
                ui.end_row();

                ui.label("雞隻批次");
                batch_combo(ui, "cull_batch", &self.intakes, &mut self.cull_form.chicken_batch);
                ui.end_row();

                ui.label("淘汰原因");
                ui.text_edit_singleline(&mut self.cull_form.reason);
                ui.end_row();

                ui.label("數量");
                ui.add(egui::DragValue::new(&mut self.cull_form.quantity).range(1..=1_000_000));
                ui.end_row();

                ui.label("備註");
                ui.text_edit_multiline(&mut self.cull_form.notes);
                ui.end_row();
            });

        ui.add_space(8.0);
        if ui.button("💾 新增淘汰").clicked() {
            self.submit_cull();
        }

        ui.separator();
        self.show_sales_tables(ui);
    }

    fn submit_sale(&mut self) {
        let Some(date) = self.parse_date(&self.sale_date.clone()) else {
            return;
        };
        self.sale_form.sale_date = date;

        match self.sale_form.submit() {
            Ok(record) => {
                let total = record.total_amount;
                self.sales.record(record);
                self.message = Some(if self.sales.last_write_succeeded() {
                    (format!("出售記錄已保存 NT$ {:.0}", total), false)
                } else {
                    (UNSAVED_WARNING.to_string(), true)
                });

                let today = today();
                self.sale_form = SaleForm::new(today, &self.intakes);
                self.sale_date = today.format(DATE_FORMAT).to_string();
            }
            Err(e) => self.message = Some((e.to_string(), true)),
        }
    }

    fn submit_cull(&mut self) {
        let Some(date) = self.parse_date(&self.cull_date.clone()) else {
            return;
        };
        self.cull_form.culling_date = date;

        match self.cull_form.submit() {
            Ok(record) => {
                self.cullings.record(record);
                self.message = Some(if self.cullings.last_write_succeeded() {
                    ("淘汰記錄已保存".to_string(), false)
                } else {
                    (UNSAVED_WARNING.to_string(), true)
                });

                let today = today();
                self.cull_form = CullingForm::new(today, &self.intakes);
                self.cull_date = today.format(DATE_FORMAT).to_string();
            }
            Err(e) => self.message = Some((e.to_string(), true)),
        }
    }

    fn show_sales_tables(&mut self, ui: &mut egui::Ui) {
        let mut remove_sale = None;
        let mut remove_cull = None;

        if self.sales.is_empty() {
            ui.weak("尚無出售記錄");
        } else {
            egui::Grid::new("sale_table")
                .striped(true)
                .num_columns(7)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    for header in ["日期", "批次", "數量", "單價", "總金額", "客戶", ""] {
                        ui.strong(header);
                    }
                    ui.end_row();

                    for entry in self.sales.entries() {
                        let r = &entry.data;
                        ui.label(r.sale_date.to_string());
                        ui.label(&r.chicken_batch);
                        ui.label(r.quantity.to_string());
                        ui.label(format!("{:.2}", r.unit_price));
                        ui.label(format!("{:.2}", r.total_amount));
                        ui.label(&r.customer);
                        if ui.small_button("🗑").on_hover_text("刪除記錄").clicked() {
                            remove_sale = Some(entry.id);
                        }
                        ui.end_row();
                    }
                });
        }

        ui.add_space(10.0);

        if self.cullings.is_empty() {
            ui.weak("尚無淘汰記錄");
        } else {
            egui::Grid::new("cull_table")
                .striped(true)
                .num_columns(5)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    for header in ["日期", "批次", "數量", "原因", ""] {
                        ui.strong(header);
                    }
                    ui.end_row();

                    for entry in self.cullings.entries() {
                        let r = &entry.data;
                        ui.label(r.culling_date.to_string());
                        ui.label(&r.chicken_batch);
                        ui.label(r.quantity.to_string());
                        ui.label(&r.reason);
                        if ui.small_button("🗑").on_hover_text("刪除記錄").clicked() {
                            remove_cull = Some(entry.id);
                        }
                        ui.end_row();
                    }
                });
        }

        if let Some(id) = remove_sale {
            self.sales.remove(id);
            if !self.sales.last_write_succeeded() {
                self.message = Some((UNSAVED_WARNING.to_string(), true));
            }
        }
        if let Some(id) = remove_cull {
            self.cullings.remove(id);
            if !self.cullings.last_write_succeeded() {
                self.message = Some((UNSAVED_WARNING.to_string(), true));
            }
        }
    }

    fn parse_date(&mut self, text: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(text.trim(), DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                self.message = Some((format!("日期格式錯誤: {}（應為 YYYY-MM-DD）", text), true));
                None
            }
        }
    }
}

impl eframe::App for FlockApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show_top_panel(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.page {
                Page::Daily => self.show_daily_page(ui),
                Page::Intake => self.show_intake_page(ui),
                Page::Death => self.show_death_page(ui),
                Page::Sales => self.show_sales_page(ui),
            });
        });
    }
}

/// Draws a selector and routes its events into `field`
fn show_selector(panel: &mut SelectorPanel, ui: &mut egui::Ui, field: &mut String) -> Option<Notice> {
    let events: Vec<SelectorEvent> = panel.show(ui, field.as_str());

    let mut binding = FieldBinding { field };
    for event in events {
        event.dispatch(&mut binding);
    }

    panel.take_notice()
}

/// Drop-down of the intake batches
fn batch_combo(ui: &mut egui::Ui, id: &str, intakes: &Journal<ChickenIntake>, batch: &mut String) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(batch.clone())
        .show_ui(ui, |ui| {
            for entry in intakes.entries() {
                let option = &entry.data.batch_number;
                ui.selectable_value(batch, option.clone(), option.as_str());
            }
        });
}

fn open_backing() -> Result<(SharedBacking, PathBuf)> {
    let config = Config::load_or_default(get_config_path()?)?;
    let path = determine_data_path(None, &config)?;
    let backing = create_backend(&path, config.backend_type()?)?;
    log::info!("Using {} storage at {:?}", backing.backend_type(), path);
    Ok((backing, path))
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
