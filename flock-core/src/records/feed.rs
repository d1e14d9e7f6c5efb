//! Feed purchases and feed usage

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{latest_batch, optional_text, require, require_positive, ChickenIntake};
use crate::error::ValidationError;
use crate::journal::Journal;

pub const DEFAULT_FEED_TYPE: &str = "成長期飼料";
pub const DEFAULT_FEED_SUPPLIER: &str = "農友飼料行";

/// Batch number for feed bought on `date`, e.g. `F20240315`
pub fn feed_batch_number_for(date: NaiveDate) -> String {
    format!("F{}", date.format("%Y%m%d"))
}

/// Feed bought from a supplier; quantities in kilograms
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedPurchase {
    pub purchase_date: NaiveDate,
    pub batch_number: String,
    pub feed_type: String,
    pub quantity: f64,
    pub supplier: String,
    pub unit_price: f64,
    pub total_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Feed given to a chicken batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedUsage {
    pub usage_date: NaiveDate,
    /// Feed batch the feed came from
    pub batch_number: String,
    pub chicken_batch: String,
    pub feed_type: String,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedPurchaseForm {
    pub purchase_date: NaiveDate,
    pub batch_number: String,
    pub feed_type: String,
    pub quantity: f64,
    pub supplier: String,
    pub unit_price: f64,
    pub notes: String,
}

impl FeedPurchaseForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            purchase_date: today,
            batch_number: feed_batch_number_for(today),
            feed_type: DEFAULT_FEED_TYPE.to_string(),
            quantity: 500.0,
            supplier: DEFAULT_FEED_SUPPLIER.to_string(),
            unit_price: 15.0,
            notes: String::new(),
        }
    }

    pub fn total_amount(&self) -> f64 {
        self.quantity * self.unit_price
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Batch number", &self.batch_number)?;
        require("Feed type", &self.feed_type)?;
        require("Supplier", &self.supplier)?;
        require_positive("Quantity", self.quantity)?;
        require_positive("Unit price", self.unit_price)
    }

    pub fn submit(&self) -> Result<FeedPurchase, ValidationError> {
        self.validate()?;
        Ok(FeedPurchase {
            purchase_date: self.purchase_date,
            batch_number: self.batch_number.trim().to_string(),
            feed_type: self.feed_type.clone(),
            quantity: self.quantity,
            supplier: self.supplier.clone(),
            unit_price: self.unit_price,
            total_amount: self.total_amount(),
            notes: optional_text(&self.notes),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedUsageForm {
    pub usage_date: NaiveDate,
    pub batch_number: String,
    pub chicken_batch: String,
    pub feed_type: String,
    pub quantity: f64,
    pub notes: String,
}

impl FeedUsageForm {
    /// Fresh form drawing from the newest feed batch for the newest chickens
    pub fn new(
        today: NaiveDate,
        purchases: &Journal<FeedPurchase>,
        intakes: &Journal<ChickenIntake>,
    ) -> Self {
        let latest = purchases.latest().map(|e| &e.data);
        Self {
            usage_date: today,
            batch_number: latest.map(|p| p.batch_number.clone()).unwrap_or_default(),
            chicken_batch: latest_batch(intakes),
            feed_type: latest
                .map(|p| p.feed_type.clone())
                .unwrap_or_else(|| DEFAULT_FEED_TYPE.to_string()),
            quantity: 50.0,
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Feed batch", &self.batch_number)?;
        require("Chicken batch", &self.chicken_batch)?;
        require("Feed type", &self.feed_type)?;
        require_positive("Quantity", self.quantity)
    }

    pub fn submit(&self) -> Result<FeedUsage, ValidationError> {
        self.validate()?;
        Ok(FeedUsage {
            usage_date: self.usage_date,
            batch_number: self.batch_number.trim().to_string(),
            chicken_batch: self.chicken_batch.trim().to_string(),
            feed_type: self.feed_type.clone(),
            quantity: self.quantity,
            notes: optional_text(&self.notes),
        })
    }
}

/// Kilograms bought minus kilograms used
pub fn feed_stock(purchases: &Journal<FeedPurchase>, usages: &Journal<FeedUsage>) -> f64 {
    let bought: f64 = purchases.entries().iter().map(|e| e.data.quantity).sum();
    let used: f64 = usages.entries().iter().map(|e| e.data.quantity).sum();
    bought - used
}
