//! Chick intake and death records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{batch_number_for, optional_text, require, require_positive};
use crate::error::ValidationError;
use crate::journal::Journal;

/// Default breed preselected on the intake form
pub const DEFAULT_BREED: &str = "黑羽土雞";
/// Default supplier preselected on the intake form
pub const DEFAULT_SUPPLIER: &str = "農友畜牧場";
/// Default reason preselected on the death form
pub const DEFAULT_DEATH_REASON: &str = "疾病";

/// A batch of chicks brought onto the farm
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChickenIntake {
    pub entry_date: NaiveDate,
    pub batch_number: String,
    pub breed: String,
    pub quantity: u32,
    pub supplier: String,
    pub unit_price: f64,
    pub total_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Chicks lost from a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeathRecord {
    pub death_date: NaiveDate,
    pub batch_number: String,
    pub quantity: u32,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// In-progress input of the intake form
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeForm {
    pub entry_date: NaiveDate,
    pub batch_number: String,
    pub breed: String,
    pub quantity: u32,
    pub supplier: String,
    pub unit_price: f64,
    pub notes: String,
}

impl IntakeForm {
    /// Fresh form for `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            entry_date: today,
            batch_number: batch_number_for(today),
            breed: DEFAULT_BREED.to_string(),
            quantity: 100,
            supplier: DEFAULT_SUPPLIER.to_string(),
            unit_price: 20.0,
            notes: String::new(),
        }
    }

    /// Quantity times unit price
    pub fn total_amount(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Batch number", &self.batch_number)?;
        require("Breed", &self.breed)?;
        require("Supplier", &self.supplier)?;
        if self.quantity == 0 {
            return Err(ValidationError::NotPositive("Quantity"));
        }
        require_positive("Unit price", self.unit_price)
    }

    /// Builds the record to journal
    pub fn submit(&self) -> Result<ChickenIntake, ValidationError> {
        self.validate()?;
        Ok(ChickenIntake {
            entry_date: self.entry_date,
            batch_number: self.batch_number.trim().to_string(),
            breed: self.breed.clone(),
            quantity: self.quantity,
            supplier: self.supplier.clone(),
            unit_price: self.unit_price,
            total_amount: self.total_amount(),
            notes: optional_text(&self.notes),
        })
    }
}

/// In-progress input of the death form
#[derive(Debug, Clone, PartialEq)]
pub struct DeathForm {
    pub death_date: NaiveDate,
    pub batch_number: String,
    pub quantity: u32,
    pub reason: String,
    pub notes: String,
}

impl DeathForm {
    /// Fresh form for `today`, pointing at the most recent intake batch
    pub fn new(today: NaiveDate, intakes: &Journal<ChickenIntake>) -> Self {
        Self {
            death_date: today,
            batch_number: latest_batch(intakes),
            quantity: 1,
            reason: DEFAULT_DEATH_REASON.to_string(),
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Batch number", &self.batch_number)?;
        require("Reason", &self.reason)?;
        if self.quantity == 0 {
            return Err(ValidationError::NotPositive("Quantity"));
        }
        Ok(())
    }

    pub fn submit(&self) -> Result<DeathRecord, ValidationError> {
        self.validate()?;
        Ok(DeathRecord {
            death_date: self.death_date,
            batch_number: self.batch_number.trim().to_string(),
            quantity: self.quantity,
            reason: self.reason.clone(),
            notes: optional_text(&self.notes),
        })
    }
}

/// Chicks still alive across all batches: intakes minus deaths
pub fn live_count(intakes: &Journal<ChickenIntake>, deaths: &Journal<DeathRecord>) -> i64 {
    let arrived: i64 = intakes.entries().iter().map(|e| i64::from(e.data.quantity)).sum();
    let lost: i64 = deaths.entries().iter().map(|e| i64::from(e.data.quantity)).sum();
    arrived - lost
}

/// Batch of the most recent intake, or empty when nothing arrived yet
pub fn latest_batch(intakes: &Journal<ChickenIntake>) -> String {
    intakes
        .latest()
        .map(|e| e.data.batch_number.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{CHICKEN_RECORDS, DEATH_RECORDS};
    use crate::storage::{KeyValueBacking, MemoryBacking};
    use std::sync::Arc;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_intake_form_defaults() {
        let form = IntakeForm::new(day());
        assert_eq!(form.batch_number, "B20240315");
        assert_eq!(form.breed, "黑羽土雞");
        assert_eq!(form.supplier, "農友畜牧場");
        assert_eq!(form.total_amount(), 2000.0);
    }

    #[test]
    fn test_intake_submit_computes_total() {
        let mut form = IntakeForm::new(day());
        form.quantity = 250;
        form.unit_price = 18.5;
        form.notes = "  ".to_string();

        let record = form.submit().unwrap();
        assert_eq!(record.total_amount, 4625.0);
        assert_eq!(record.notes, None);
    }

    #[test]
    fn test_intake_requires_fields() {
        let mut form = IntakeForm::new(day());
        form.breed.clear();
        assert_eq!(form.submit(), Err(ValidationError::EmptyField("Breed")));

        let mut form = IntakeForm::new(day());
        form.quantity = 0;
        assert_eq!(form.submit(), Err(ValidationError::NotPositive("Quantity")));
    }

    #[test]
    fn test_death_form_uses_latest_batch() {
        let backing = Arc::new(MemoryBacking::new());
        let mut intakes: Journal<ChickenIntake> = Journal::load(backing.clone(), CHICKEN_RECORDS);

        let empty = DeathForm::new(day(), &intakes);
        assert_eq!(empty.batch_number, "");
        assert!(empty.submit().is_err());

        intakes.record(IntakeForm::new(day()).submit().unwrap());
        let form = DeathForm::new(day(), &intakes);
        assert_eq!(form.batch_number, "B20240315");
        assert_eq!(form.reason, "疾病");

        let mut deaths: Journal<DeathRecord> = Journal::load(backing, DEATH_RECORDS);
        deaths.record(form.submit().unwrap());
        assert_eq!(live_count(&intakes, &deaths), 99);
    }

    #[test]
    fn test_records_use_original_field_names() {
        let backing = Arc::new(MemoryBacking::new());
        let mut intakes: Journal<ChickenIntake> = Journal::load(backing.clone(), CHICKEN_RECORDS);
        intakes.record(IntakeForm::new(day()).submit().unwrap());

        let raw = backing.load(CHICKEN_RECORDS).unwrap().unwrap();
        assert!(raw.contains("\"entryDate\":\"2024-03-15\""));
        assert!(raw.contains("\"unitPrice\":20.0"));
        assert!(raw.contains("\"totalAmount\":2000.0"));
    }
}
