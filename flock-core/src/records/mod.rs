//! Farm record pages
//!
//! Each page pairs a form struct, holding in-progress input with the page
//! defaults, and the record type kept in the page's journal. `submit`
//! validates presence and produces the record. The forms are the consumers
//! of the quick-pick selectors: every option set category fills one field
//! of one of these forms.

mod chicken;
mod daily;
mod feed;
mod health;
mod sales;

pub use chicken::{
    latest_batch, live_count, ChickenIntake, DeathForm, DeathRecord, IntakeForm, DEFAULT_BREED,
    DEFAULT_DEATH_REASON, DEFAULT_SUPPLIER,
};
pub use daily::{DailyForm, DailyRecord, DEFAULT_ENVIRONMENT, DEFAULT_HEALTH, DEFAULT_WEATHER};
pub use feed::{
    feed_batch_number_for, feed_stock, FeedPurchase, FeedPurchaseForm, FeedUsage, FeedUsageForm,
    DEFAULT_FEED_SUPPLIER, DEFAULT_FEED_TYPE,
};
pub use health::{
    MedicineForm, MedicineRecord, VaccineForm, VaccineRecord, DEFAULT_MEDICINE_SUPPLIER,
    DEFAULT_MEDICINE_TYPE, DEFAULT_MEDICINE_USAGE, DEFAULT_VACCINE_TYPE, DEFAULT_VACCINE_USAGE,
};
pub use sales::{
    birds_on_hand, CullingForm, CullingRecord, SaleForm, SaleRecord, DEFAULT_CULLING_REASON,
    DEFAULT_SALES_CUSTOMER,
};

use chrono::NaiveDate;

use crate::error::ValidationError;

/// Batch number for chicks arriving on `date`, e.g. `B20240315`
pub fn batch_number_for(date: NaiveDate) -> String {
    format!("B{}", date.format("%Y%m%d"))
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(())
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_nan() || value <= 0.0 {
        Err(ValidationError::NotPositive(field))
    } else {
        Ok(())
    }
}

fn optional_text(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
