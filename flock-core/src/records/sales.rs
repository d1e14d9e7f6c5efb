//! Sales and culling records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{latest_batch, live_count, optional_text, require, require_positive};
use super::{ChickenIntake, DeathRecord};
use crate::error::ValidationError;
use crate::journal::Journal;

pub const DEFAULT_SALES_CUSTOMER: &str = "農友市場";
pub const DEFAULT_CULLING_REASON: &str = "生長不良";

/// Birds sold from a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub sale_date: NaiveDate,
    pub chicken_batch: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_amount: f64,
    pub customer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Birds removed from a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CullingRecord {
    pub culling_date: NaiveDate,
    pub chicken_batch: String,
    pub quantity: u32,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleForm {
    pub sale_date: NaiveDate,
    pub chicken_batch: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub customer: String,
    pub notes: String,
}

impl SaleForm {
    pub fn new(today: NaiveDate, intakes: &Journal<ChickenIntake>) -> Self {
        Self {
            sale_date: today,
            chicken_batch: latest_batch(intakes),
            quantity: 10,
            unit_price: 200.0,
            customer: DEFAULT_SALES_CUSTOMER.to_string(),
            notes: String::new(),
        }
    }

    pub fn total_amount(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Chicken batch", &self.chicken_batch)?;
        require("Customer", &self.customer)?;
        if self.quantity == 0 {
            return Err(ValidationError::NotPositive("Quantity"));
        }
        require_positive("Unit price", self.unit_price)
    }

    pub fn submit(&self) -> Result<SaleRecord, ValidationError> {
        self.validate()?;
        Ok(SaleRecord {
            sale_date: self.sale_date,
            chicken_batch: self.chicken_batch.trim().to_string(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_amount: self.total_amount(),
            customer: self.customer.clone(),
            notes: optional_text(&self.notes),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CullingForm {
    pub culling_date: NaiveDate,
    pub chicken_batch: String,
    pub quantity: u32,
    pub reason: String,
    pub notes: String,
}

impl CullingForm {
    pub fn new(today: NaiveDate, intakes: &Journal<ChickenIntake>) -> Self {
        Self {
            culling_date: today,
            chicken_batch: latest_batch(intakes),
            quantity: 5,
            reason: DEFAULT_CULLING_REASON.to_string(),
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Chicken batch", &self.chicken_batch)?;
        require("Reason", &self.reason)?;
        if self.quantity == 0 {
            return Err(ValidationError::NotPositive("Quantity"));
        }
        Ok(())
    }

    pub fn submit(&self) -> Result<CullingRecord, ValidationError> {
        self.validate()?;
        Ok(CullingRecord {
            culling_date: self.culling_date,
            chicken_batch: self.chicken_batch.trim().to_string(),
            quantity: self.quantity,
            reason: self.reason.clone(),
            notes: optional_text(&self.notes),
        })
    }
}

/// Birds still on the farm: live count minus everything sold or culled
pub fn birds_on_hand(
    intakes: &Journal<ChickenIntake>,
    deaths: &Journal<DeathRecord>,
    sales: &Journal<SaleRecord>,
    cullings: &Journal<CullingRecord>,
) -> i64 {
    let sold: i64 = sales.entries().iter().map(|e| i64::from(e.data.quantity)).sum();
    let culled: i64 = cullings.entries().iter().map(|e| i64::from(e.data.quantity)).sum();
    live_count(intakes, deaths) - sold - culled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{
        CHICKEN_RECORDS, CULLING_RECORDS, DEATH_RECORDS, SALES_RECORDS,
    };
    use crate::records::IntakeForm;
    use crate::storage::{KeyValueBacking, MemoryBacking};
    use std::sync::Arc;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_sale_form_defaults_and_total() {
        let backing = Arc::new(MemoryBacking::new());
        let mut intakes: Journal<ChickenIntake> = Journal::load(backing, CHICKEN_RECORDS);
        intakes.record(IntakeForm::new(day()).submit().unwrap());

        let mut form = SaleForm::new(day(), &intakes);
        assert_eq!(form.chicken_batch, "B20240315");
        assert_eq!(form.customer, "農友市場");
        assert_eq!(form.total_amount(), 2000.0);

        form.quantity = 0;
        assert_eq!(form.submit(), Err(ValidationError::NotPositive("Quantity")));
    }

    #[test]
    fn test_culling_form_defaults() {
        let backing = Arc::new(MemoryBacking::new());
        let intakes: Journal<ChickenIntake> = Journal::load(backing, CHICKEN_RECORDS);
        let form = CullingForm::new(day(), &intakes);

        assert_eq!(form.quantity, 5);
        assert_eq!(form.reason, "生長不良");
        assert_eq!(form.submit(), Err(ValidationError::EmptyField("Chicken batch")));
    }

    #[test]
    fn test_birds_on_hand_subtracts_every_outflow() {
        let backing = Arc::new(MemoryBacking::new());
        let mut intakes: Journal<ChickenIntake> = Journal::load(backing.clone(), CHICKEN_RECORDS);
        intakes.record(IntakeForm::new(day()).submit().unwrap());

        let deaths: Journal<DeathRecord> = Journal::load(backing.clone(), DEATH_RECORDS);
        let mut sales: Journal<SaleRecord> = Journal::load(backing.clone(), SALES_RECORDS);
        let mut cullings: Journal<CullingRecord> = Journal::load(backing.clone(), CULLING_RECORDS);

        sales.record(SaleForm::new(day(), &intakes).submit().unwrap());
        cullings.record(CullingForm::new(day(), &intakes).submit().unwrap());
        assert_eq!(birds_on_hand(&intakes, &deaths, &sales, &cullings), 85);

        let raw = backing.load(SALES_RECORDS).unwrap().unwrap();
        assert!(raw.contains("\"saleDate\":\"2024-03-15\""));
        assert!(raw.contains("\"totalAmount\":2000.0"));
    }
}
