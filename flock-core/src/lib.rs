pub mod categories;
pub mod config;
pub mod contacts;
pub mod error;
pub mod journal;
pub mod models;
pub mod option_set;
pub mod records;
pub mod selector;
pub mod storage;

// Re-export commonly used types
pub use categories::OptionCategory;
pub use config::{determine_data_path, get_config_path, Config};
pub use contacts::{Contact, ContactBook, ContactDraft, ContactList};
pub use error::{OptionSetError, StorageError, ValidationError};
pub use journal::{Journal, JournalEntry};
pub use models::{OptionDraft, OptionFields, OptionId, OptionItem};
pub use option_set::OptionSetStore;
pub use records::{
    ChickenIntake, CullingForm, CullingRecord, DailyForm, DailyRecord, DeathForm, DeathRecord,
    FeedPurchase, FeedPurchaseForm, FeedUsage, FeedUsageForm, IntakeForm, MedicineForm,
    MedicineRecord, SaleForm, SaleRecord, VaccineForm, VaccineRecord,
};
pub use selector::{
    DragSession, ItemVisual, Mode, Notice, NoticeKind, OptionEditor, SelectorConsumer,
    SelectorEvent, SelectorWidget,
};
pub use storage::{
    create_backend, BackendType, JsonFileBacking, KeyValueBacking, MemoryBacking, SharedBacking,
    SqliteBacking,
};
