//! Daily farm log: weather, flock health and housing conditions

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{optional_text, require};
use crate::contacts::ContactBook;
use crate::error::ValidationError;

pub const DEFAULT_WEATHER: &str = "晴天";
pub const DEFAULT_HEALTH: &str = "良好";
pub const DEFAULT_ENVIRONMENT: &str = "正常";

const TIME_FORMAT: &str = "%H:%M";

/// One day's observations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub record_date: NaiveDate,
    #[serde(serialize_with = "serialize_time", deserialize_with = "deserialize_time")]
    pub record_time: NaiveTime,
    pub customer: String,
    pub weather: String,
    /// Degrees Celsius
    #[serde(deserialize_with = "deserialize_reading")]
    pub temperature: f64,
    /// Relative humidity in percent
    #[serde(deserialize_with = "deserialize_reading")]
    pub humidity: f64,
    pub health_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_notes: Option<String>,
    pub environment_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_notes: Option<String>,
}

fn serialize_time<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
}

fn deserialize_time<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
        .map_err(|_| serde::de::Error::custom(format!("Invalid time: {}", s)))
}

/// Readings were typed into text fields and may be stored as strings
fn deserialize_reading<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reading {
        Number(f64),
        Text(String),
    }

    match Reading::deserialize(deserializer)? {
        Reading::Number(n) => Ok(n),
        Reading::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("Invalid reading: {}", s))),
    }
}

/// In-progress input of the daily form
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForm {
    pub record_date: NaiveDate,
    pub record_time: NaiveTime,
    pub customer: String,
    pub weather: String,
    pub temperature: f64,
    pub humidity: f64,
    pub health_status: String,
    pub health_notes: String,
    pub environment_status: String,
    pub environment_notes: String,
}

impl DailyForm {
    /// Fresh form stamped with `now`, preselecting the remembered customer
    pub fn new(now: NaiveDateTime, customers: &ContactBook) -> Self {
        Self {
            record_date: now.date(),
            // Minutes only, matching the stored format
            record_time: NaiveTime::from_hms_opt(now.hour(), now.minute(), 0)
                .unwrap_or_else(|| now.time()),
            customer: customers
                .selected()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            weather: DEFAULT_WEATHER.to_string(),
            temperature: 25.0,
            humidity: 60.0,
            health_status: DEFAULT_HEALTH.to_string(),
            health_notes: String::new(),
            environment_status: DEFAULT_ENVIRONMENT.to_string(),
            environment_notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Customer", &self.customer)?;
        require("Weather", &self.weather)?;
        require("Health status", &self.health_status)?;
        require("Environment status", &self.environment_status)?;
        if !self.temperature.is_finite() {
            return Err(ValidationError::OutOfRange("Temperature"));
        }
        if !(0.0..=100.0).contains(&self.humidity) {
            return Err(ValidationError::OutOfRange("Humidity"));
        }
        Ok(())
    }

    pub fn submit(&self) -> Result<DailyRecord, ValidationError> {
        self.validate()?;
        Ok(DailyRecord {
            record_date: self.record_date,
            record_time: self.record_time,
            customer: self.customer.trim().to_string(),
            weather: self.weather.clone(),
            temperature: self.temperature,
            humidity: self.humidity,
            health_status: self.health_status.clone(),
            health_notes: optional_text(&self.health_notes),
            environment_status: self.environment_status.clone(),
            environment_notes: optional_text(&self.environment_notes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::DAILY_RECORDS;
    use crate::contacts::ContactList;
    use crate::journal::Journal;
    use crate::models::OptionId;
    use crate::storage::{KeyValueBacking, MemoryBacking};
    use std::sync::Arc;

    fn morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(7, 30, 42)
            .unwrap()
    }

    #[test]
    fn test_daily_form_defaults() {
        let backing = Arc::new(MemoryBacking::new());
        let customers = ContactBook::load(backing, ContactList::Customers);
        let form = DailyForm::new(morning(), &customers);

        assert_eq!(form.record_time, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
        assert_eq!(form.weather, "晴天");
        assert_eq!(form.health_status, "良好");
        assert_eq!(form.environment_status, "正常");
        assert_eq!(form.customer, "");
        assert_eq!(form.submit(), Err(ValidationError::EmptyField("Customer")));
    }

    #[test]
    fn test_daily_form_preselects_remembered_customer() {
        let backing = Arc::new(MemoryBacking::new());
        let mut customers = ContactBook::load(backing, ContactList::Customers);
        customers.select(OptionId(2));

        let form = DailyForm::new(morning(), &customers);
        assert_eq!(form.customer, "吉祥超市");
        assert!(form.submit().is_ok());
    }

    #[test]
    fn test_humidity_must_be_a_percentage() {
        let backing = Arc::new(MemoryBacking::new());
        let customers = ContactBook::load(backing, ContactList::Customers);
        let mut form = DailyForm::new(morning(), &customers);
        form.customer = "農友市場".to_string();
        form.humidity = 140.0;

        assert_eq!(form.submit(), Err(ValidationError::OutOfRange("Humidity")));
    }

    #[test]
    fn test_daily_record_storage_shape() {
        let backing = Arc::new(MemoryBacking::new());
        let customers = ContactBook::load(backing.clone(), ContactList::Customers);
        let mut form = DailyForm::new(morning(), &customers);
        form.customer = "農友市場".to_string();
        form.weather = "雨天".to_string();
        form.health_notes = "精神不錯".to_string();

        let mut journal: Journal<DailyRecord> = Journal::load(backing.clone(), DAILY_RECORDS);
        journal.record(form.submit().unwrap());

        let raw = backing.load(DAILY_RECORDS).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["recordTime"], "07:30");
        assert_eq!(value[0]["healthNotes"], "精神不錯");
        assert!(value[0].get("environmentNotes").is_none());
    }

    #[test]
    fn test_reads_readings_stored_as_text() {
        let backing = Arc::new(MemoryBacking::new());
        backing
            .store(
                DAILY_RECORDS,
                r#"[{"id":1,"recordDate":"2024-03-15","recordTime":"08:05","customer":"其他",
                    "weather":"多雲","temperature":"25","humidity":"60",
                    "healthStatus":"一般","environmentStatus":"需要清潔"}]"#,
            )
            .unwrap();

        let journal: Journal<DailyRecord> = Journal::load(backing, DAILY_RECORDS);
        let record = &journal.entries()[0].data;
        assert_eq!(record.temperature, 25.0);
        assert_eq!(record.humidity, 60.0);
        assert_eq!(record.record_time, NaiveTime::from_hms_opt(8, 5, 0).unwrap());
    }
}
