//! Medicine and vaccination records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{latest_batch, optional_text, require, require_positive, ChickenIntake};
use crate::error::ValidationError;
use crate::journal::Journal;

pub const DEFAULT_MEDICINE_TYPE: &str = "抗生素";
pub const DEFAULT_MEDICINE_USAGE: &str = "飲水添加";
pub const DEFAULT_VACCINE_TYPE: &str = "新城疫";
pub const DEFAULT_VACCINE_USAGE: &str = "注射";
/// Shared by both forms
pub const DEFAULT_MEDICINE_SUPPLIER: &str = "農友獸醫診所";

/// Medicine given to a chicken batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRecord {
    pub use_date: NaiveDate,
    pub chicken_batch: String,
    pub medicine_type: String,
    pub medicine_name: String,
    pub usage_method: String,
    pub quantity: f64,
    pub supplier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A vaccination of a chicken batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VaccineRecord {
    pub vaccination_date: NaiveDate,
    pub chicken_batch: String,
    pub vaccine_type: String,
    pub vaccine_name: String,
    pub usage_method: String,
    pub quantity: f64,
    pub supplier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MedicineForm {
    pub use_date: NaiveDate,
    pub chicken_batch: String,
    pub medicine_type: String,
    pub medicine_name: String,
    pub usage_method: String,
    pub quantity: f64,
    pub supplier: String,
    pub notes: String,
}

impl MedicineForm {
    pub fn new(today: NaiveDate, intakes: &Journal<ChickenIntake>) -> Self {
        Self {
            use_date: today,
            chicken_batch: latest_batch(intakes),
            medicine_type: DEFAULT_MEDICINE_TYPE.to_string(),
            medicine_name: String::new(),
            usage_method: DEFAULT_MEDICINE_USAGE.to_string(),
            quantity: 1.0,
            supplier: DEFAULT_MEDICINE_SUPPLIER.to_string(),
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Chicken batch", &self.chicken_batch)?;
        require("Medicine type", &self.medicine_type)?;
        require("Medicine name", &self.medicine_name)?;
        require("Usage method", &self.usage_method)?;
        require("Supplier", &self.supplier)?;
        require_positive("Quantity", self.quantity)
    }

    pub fn submit(&self) -> Result<MedicineRecord, ValidationError> {
        self.validate()?;
        Ok(MedicineRecord {
            use_date: self.use_date,
            chicken_batch: self.chicken_batch.trim().to_string(),
            medicine_type: self.medicine_type.clone(),
            medicine_name: self.medicine_name.trim().to_string(),
            usage_method: self.usage_method.clone(),
            quantity: self.quantity,
            supplier: self.supplier.clone(),
            notes: optional_text(&self.notes),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VaccineForm {
    pub vaccination_date: NaiveDate,
    pub chicken_batch: String,
    pub vaccine_type: String,
    pub vaccine_name: String,
    pub usage_method: String,
    pub quantity: f64,
    pub supplier: String,
    pub notes: String,
}

impl VaccineForm {
    pub fn new(today: NaiveDate, intakes: &Journal<ChickenIntake>) -> Self {
        Self {
            vaccination_date: today,
            chicken_batch: latest_batch(intakes),
            vaccine_type: DEFAULT_VACCINE_TYPE.to_string(),
            vaccine_name: String::new(),
            usage_method: DEFAULT_VACCINE_USAGE.to_string(),
            quantity: 1.0,
            supplier: DEFAULT_MEDICINE_SUPPLIER.to_string(),
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Chicken batch", &self.chicken_batch)?;
        require("Vaccine type", &self.vaccine_type)?;
        require("Vaccine name", &self.vaccine_name)?;
        require("Usage method", &self.usage_method)?;
        require("Supplier", &self.supplier)?;
        require_positive("Quantity", self.quantity)
    }

    pub fn submit(&self) -> Result<VaccineRecord, ValidationError> {
        self.validate()?;
        Ok(VaccineRecord {
            vaccination_date: self.vaccination_date,
            chicken_batch: self.chicken_batch.trim().to_string(),
            vaccine_type: self.vaccine_type.clone(),
            vaccine_name: self.vaccine_name.trim().to_string(),
            usage_method: self.usage_method.clone(),
            quantity: self.quantity,
            supplier: self.supplier.clone(),
            notes: optional_text(&self.notes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{CHICKEN_RECORDS, MEDICINE_RECORDS, VACCINE_RECORDS};
    use crate::records::IntakeForm;
    use crate::storage::{KeyValueBacking, MemoryBacking};
    use std::sync::Arc;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn intakes_with_batch() -> (Arc<MemoryBacking>, Journal<ChickenIntake>) {
        let backing = Arc::new(MemoryBacking::new());
        let mut intakes: Journal<ChickenIntake> = Journal::load(backing.clone(), CHICKEN_RECORDS);
        intakes.record(IntakeForm::new(day()).submit().unwrap());
        (backing, intakes)
    }

    #[test]
    fn test_medicine_form_defaults_and_name_required() {
        let (_, intakes) = intakes_with_batch();
        let form = MedicineForm::new(day(), &intakes);

        assert_eq!(form.chicken_batch, "B20240315");
        assert_eq!(form.medicine_type, "抗生素");
        assert_eq!(form.usage_method, "飲水添加");
        assert_eq!(form.supplier, "農友獸醫診所");
        assert_eq!(form.submit(), Err(ValidationError::EmptyField("Medicine name")));
    }

    #[test]
    fn test_medicine_journal_shape() {
        let (backing, intakes) = intakes_with_batch();
        let mut form = MedicineForm::new(day(), &intakes);
        form.medicine_name = " 安莫西林 ".to_string();

        let mut journal: Journal<MedicineRecord> = Journal::load(backing.clone(), MEDICINE_RECORDS);
        journal.record(form.submit().unwrap());
        assert_eq!(journal.latest().unwrap().data.medicine_name, "安莫西林");

        let raw = backing.load(MEDICINE_RECORDS).unwrap().unwrap();
        assert!(raw.contains("\"useDate\":\"2024-03-15\""));
        assert!(raw.contains("\"usageMethod\":\"飲水添加\""));
    }

    #[test]
    fn test_vaccine_form_defaults() {
        let (backing, intakes) = intakes_with_batch();
        let mut form = VaccineForm::new(day(), &intakes);
        assert_eq!(form.vaccine_type, "新城疫");
        assert_eq!(form.usage_method, "注射");

        form.vaccine_name = "新城疫活毒疫苗".to_string();
        let mut journal: Journal<VaccineRecord> = Journal::load(backing.clone(), VACCINE_RECORDS);
        journal.record(form.submit().unwrap());

        let raw = backing.load(VACCINE_RECORDS).unwrap().unwrap();
        assert!(raw.contains("\"vaccinationDate\":\"2024-03-15\""));
    }

    #[test]
    fn test_vaccine_requires_batch() {
        let backing = Arc::new(MemoryBacking::new());
        let intakes: Journal<ChickenIntake> = Journal::load(backing, CHICKEN_RECORDS);
        let mut form = VaccineForm::new(day(), &intakes);
        form.vaccine_name = "禽流感疫苗".to_string();

        assert_eq!(form.submit(), Err(ValidationError::EmptyField("Chicken batch")));
    }
}
