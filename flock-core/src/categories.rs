//! Storage keys and the built-in option set categories

use std::fmt;

use crate::models::OptionItem;

// Daily records
pub const DAILY_RECORDS: &str = "chicken_farm_daily_records";
pub const WEATHER_OPTIONS: &str = "chicken_farm_weather_options";
pub const HEALTH_OPTIONS: &str = "chicken_farm_health_options";
pub const ENVIRONMENT_OPTIONS: &str = "chicken_farm_environment_options";

// Customers picked on the daily record
pub const CUSTOMERS: &str = "chicken_farm_customers";
pub const SELECTED_CUSTOMER: &str = "chicken_farm_selected_customer";

// Chicken management
pub const CHICKEN_RECORDS: &str = "chicken_farm_chicken_records";
pub const DEATH_RECORDS: &str = "chicken_farm_death_records";
pub const CHICKEN_BREEDS: &str = "chicken_farm_chicken_breeds";
pub const SUPPLIERS: &str = "chicken_farm_suppliers";
pub const DEATH_REASONS: &str = "chicken_farm_death_reasons";

// Feed management
pub const FEED_SUPPLIERS: &str = "chicken_farm_feed_suppliers";
pub const FEED_PURCHASE_RECORDS: &str = "chicken_farm_feed_purchase_records";
pub const FEED_USAGE_RECORDS: &str = "chicken_farm_feed_usage_records";
pub const FEED_TYPES: &str = "chicken_farm_feed_types";
pub const SUPPLIER_TYPES: &str = "chicken_farm_supplier_types";

// Sales and culling
pub const SALES_CUSTOMERS: &str = "chicken_farm_sales_customers";
pub const CULLING_REASONS: &str = "chicken_farm_culling_reasons";
pub const SALES_RECORDS: &str = "chicken_farm_sales_records";
pub const CULLING_RECORDS: &str = "chicken_farm_culling_records";

// Medicine and vaccines
pub const MEDICINE_RECORDS: &str = "chicken_farm_medicine_records";
pub const VACCINE_RECORDS: &str = "chicken_farm_vaccine_records";
pub const MEDICINE_TYPES: &str = "chicken_farm_medicine_types";
pub const VACCINE_TYPES: &str = "chicken_farm_vaccine_types";
pub const MEDICINE_SUPPLIERS: &str = "chicken_farm_medicine_suppliers";
pub const USAGE_METHODS: &str = "chicken_farm_usage_methods";

/// Every quick-pick option set used by the record pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionCategory {
    Weather,
    Health,
    Environment,
    ChickenBreeds,
    Suppliers,
    DeathReasons,
    FeedTypes,
    SupplierTypes,
    SalesCustomers,
    CullingReasons,
    MedicineTypes,
    VaccineTypes,
    MedicineSuppliers,
    UsageMethods,
}

impl OptionCategory {
    pub const ALL: [OptionCategory; 14] = [
        OptionCategory::Weather,
        OptionCategory::Health,
        OptionCategory::Environment,
        OptionCategory::ChickenBreeds,
        OptionCategory::Suppliers,
        OptionCategory::DeathReasons,
        OptionCategory::FeedTypes,
        OptionCategory::SupplierTypes,
        OptionCategory::SalesCustomers,
        OptionCategory::CullingReasons,
        OptionCategory::MedicineTypes,
        OptionCategory::VaccineTypes,
        OptionCategory::MedicineSuppliers,
        OptionCategory::UsageMethods,
    ];

    /// Storage key holding this category's option set
    pub fn storage_key(&self) -> &'static str {
        match self {
            OptionCategory::Weather => WEATHER_OPTIONS,
            OptionCategory::Health => HEALTH_OPTIONS,
            OptionCategory::Environment => ENVIRONMENT_OPTIONS,
            OptionCategory::ChickenBreeds => CHICKEN_BREEDS,
            OptionCategory::Suppliers => SUPPLIERS,
            OptionCategory::DeathReasons => DEATH_REASONS,
            OptionCategory::FeedTypes => FEED_TYPES,
            OptionCategory::SupplierTypes => SUPPLIER_TYPES,
            OptionCategory::SalesCustomers => SALES_CUSTOMERS,
            OptionCategory::CullingReasons => CULLING_REASONS,
            OptionCategory::MedicineTypes => MEDICINE_TYPES,
            OptionCategory::VaccineTypes => VACCINE_TYPES,
            OptionCategory::MedicineSuppliers => MEDICINE_SUPPLIERS,
            OptionCategory::UsageMethods => USAGE_METHODS,
        }
    }

    /// Short kebab-case name used on the command line
    pub fn slug(&self) -> &'static str {
        match self {
            OptionCategory::Weather => "weather",
            OptionCategory::Health => "health",
            OptionCategory::Environment => "environment",
            OptionCategory::ChickenBreeds => "breeds",
            OptionCategory::Suppliers => "suppliers",
            OptionCategory::DeathReasons => "death-reasons",
            OptionCategory::FeedTypes => "feed-types",
            OptionCategory::SupplierTypes => "supplier-types",
            OptionCategory::SalesCustomers => "sales-customers",
            OptionCategory::CullingReasons => "culling-reasons",
            OptionCategory::MedicineTypes => "medicine-types",
            OptionCategory::VaccineTypes => "vaccine-types",
            OptionCategory::MedicineSuppliers => "medicine-suppliers",
            OptionCategory::UsageMethods => "usage-methods",
        }
    }

    /// Heading shown above the selector
    pub fn title(&self) -> &'static str {
        match self {
            OptionCategory::Weather => "天氣",
            OptionCategory::Health => "雞群健康狀況",
            OptionCategory::Environment => "環境狀況",
            OptionCategory::ChickenBreeds => "雞種",
            OptionCategory::Suppliers => "供應商",
            OptionCategory::DeathReasons => "死亡原因",
            OptionCategory::FeedTypes => "飼料類型",
            OptionCategory::SupplierTypes => "供應商類型",
            OptionCategory::SalesCustomers => "客戶",
            OptionCategory::CullingReasons => "淘汰原因",
            OptionCategory::MedicineTypes => "藥品類型",
            OptionCategory::VaccineTypes => "疫苗類型",
            OptionCategory::MedicineSuppliers => "藥品供應商",
            OptionCategory::UsageMethods => "使用方式",
        }
    }

    /// Looks up a category by slug or storage key
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == name || c.storage_key() == name)
    }

    /// Built-in sequence used when nothing is stored yet
    pub fn defaults(&self) -> Vec<OptionItem> {
        match self {
            OptionCategory::Weather => vec![
                OptionItem::labelled(1, "晴天").with_icon("sun"),
                OptionItem::labelled(2, "多雲").with_icon("cloud"),
                OptionItem::labelled(3, "雨天").with_icon("cloud-download"),
                OptionItem::labelled(4, "雷雨").with_icon("thunderbolt"),
            ],
            OptionCategory::Health => vec![
                OptionItem::labelled(1, "良好").with_icon("check-circle"),
                OptionItem::labelled(2, "一般").with_icon("warning"),
                OptionItem::labelled(3, "不佳").with_icon("close-circle"),
            ],
            OptionCategory::Environment => {
                labelled_list(&["正常", "需要清潔", "需要消毒", "需要修繕"])
            }
            OptionCategory::ChickenBreeds => {
                labelled_list(&["黑羽土雞", "白羽土雞", "紅羽土雞", "花羽土雞", "其他"])
            }
            OptionCategory::Suppliers => {
                labelled_list(&["農友畜牧場", "吉祥雞苗場", "永豐畜牧", "其他"])
            }
            OptionCategory::DeathReasons => {
                labelled_list(&["疾病", "意外", "自然死亡", "捕食者攻擊", "其他"])
            }
            OptionCategory::FeedTypes => {
                labelled_list(&["幼雞飼料", "成長期飼料", "成雞飼料", "有機飼料", "其他"])
            }
            OptionCategory::SupplierTypes => labelled_list(&["飼料行", "飼料廠", "農場", "其他"]),
            OptionCategory::SalesCustomers => {
                labelled_list(&["農友市場", "吉祥超市", "永豐餐廳", "個人客戶", "其他"])
            }
            OptionCategory::CullingReasons => {
                labelled_list(&["生長不良", "疾病", "年齡", "產能下降", "其他"])
            }
            OptionCategory::MedicineTypes => {
                labelled_list(&["抗生素", "驅蟲藥", "維他命", "消毒劑", "其他"])
            }
            OptionCategory::VaccineTypes => labelled_list(&[
                "新城疫",
                "禽流感",
                "傳染性支氣管炎",
                "傳染性法氏囊病",
                "其他",
            ]),
            OptionCategory::MedicineSuppliers => {
                labelled_list(&["農友獸醫診所", "吉祥動物醫院", "永豐藥品", "其他"])
            }
            OptionCategory::UsageMethods => {
                labelled_list(&["飲水添加", "飼料添加", "注射", "噴霧", "其他"])
            }
        }
    }
}

impl fmt::Display for OptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

fn labelled_list(texts: &[&str]) -> Vec<OptionItem> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| OptionItem::labelled(i as u64 + 1, text))
        .collect()
}
