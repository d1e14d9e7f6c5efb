use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Farm record keeping: quick-pick option sets and flock journals")]
pub struct Cli {
    /// Path to the data file (.json or .db); overrides FLOCK_DATA_PATH and the config file
    #[clap(long, global = true)]
    pub data: Option<PathBuf>,

    /// Storage backend (json, sqlite); inferred from the data file extension by default
    #[clap(long, global = true)]
    pub backend: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum OptionsCommand {
    /// List the options of a category in display order
    List {
        /// Category name (e.g. breeds, suppliers, death-reasons)
        category: String,
    },

    /// Add an option at the end of a category
    Add {
        /// Category name
        category: String,

        /// Text shown on the button
        #[clap(long)]
        label: Option<String>,

        /// Value filled into the form (defaults to the label)
        #[clap(long)]
        value: Option<String>,

        /// Optional icon tag
        #[clap(long)]
        icon: Option<String>,

        /// Use interactive mode (prompts)
        #[clap(long)]
        interactive: bool,
    },

    /// Edit the label and value of an option
    Edit {
        /// Category name
        category: String,

        /// Option id
        id: String,

        /// New label
        #[clap(long)]
        label: Option<String>,

        /// New value
        #[clap(long)]
        value: Option<String>,
    },

    /// Remove an option
    Remove {
        /// Category name
        category: String,

        /// Option id
        id: String,

        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Move an option; the target position counts after the option is taken out
    Move {
        /// Category name
        category: String,

        /// Current position (1-based)
        from: usize,

        /// New position (1-based)
        to: usize,
    },

    /// Discard stored options and go back to the built-in defaults
    Reset {
        /// Category name
        category: String,

        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum IntakeCommand {
    /// Record a batch of chicks
    Add {
        /// Breed (defaults to the page default)
        #[clap(long)]
        breed: Option<String>,

        /// Supplier (defaults to the page default)
        #[clap(long)]
        supplier: Option<String>,

        /// Number of chicks
        #[clap(long)]
        quantity: Option<u32>,

        /// Price per chick
        #[clap(long)]
        unit_price: Option<f64>,

        /// Batch number (defaults to BYYYYMMDD)
        #[clap(long)]
        batch: Option<String>,

        /// Entry date (YYYY-MM-DD, defaults to today)
        #[clap(long)]
        date: Option<String>,

        /// Free-form notes
        #[clap(long)]
        notes: Option<String>,

        /// Pick breed and supplier from the quick-pick lists
        #[clap(long)]
        interactive: bool,
    },

    /// List recorded intakes, newest first
    List,
}

#[derive(Subcommand, Debug)]
pub enum DeathCommand {
    /// Record chick deaths
    Add {
        /// Reason (defaults to the page default)
        #[clap(long)]
        reason: Option<String>,

        /// Number of chicks lost
        #[clap(long)]
        quantity: Option<u32>,

        /// Batch number (defaults to the latest intake)
        #[clap(long)]
        batch: Option<String>,

        /// Date (YYYY-MM-DD, defaults to today)
        #[clap(long)]
        date: Option<String>,

        /// Free-form notes
        #[clap(long)]
        notes: Option<String>,

        /// Pick the reason from the quick-pick list
        #[clap(long)]
        interactive: bool,
    },

    /// List recorded deaths, newest first
    List,
}

#[derive(Subcommand, Debug)]
pub enum ContactsCommand {
    /// List contacts with their details
    List {
        /// Contact list (customers, feed-suppliers)
        list: String,
    },

    /// Add a contact at the end of a list
    Add {
        /// Contact list
        list: String,

        /// Contact name
        #[clap(long)]
        name: Option<String>,

        /// Contact type (e.g. 市場, 飼料行); defaults to 其他
        #[clap(long = "type")]
        kind: Option<String>,

        /// Phone number
        #[clap(long)]
        contact: Option<String>,

        /// Address
        #[clap(long)]
        address: Option<String>,

        /// Use interactive mode (prompts)
        #[clap(long)]
        interactive: bool,
    },

    /// Change the details of a contact
    Edit {
        /// Contact list
        list: String,

        /// Contact id
        id: String,

        /// New name
        #[clap(long)]
        name: Option<String>,

        /// New type
        #[clap(long = "type")]
        kind: Option<String>,

        /// New phone number
        #[clap(long)]
        contact: Option<String>,

        /// New address
        #[clap(long)]
        address: Option<String>,
    },

    /// Remove a contact
    Remove {
        /// Contact list
        list: String,

        /// Contact id
        id: String,

        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Move a contact; the target position counts after the contact is taken out
    Move {
        /// Contact list
        list: String,

        /// Current position (1-based)
        from: usize,

        /// New position (1-based)
        to: usize,
    },

    /// Remember a customer as the default for daily records
    Select {
        /// Customer id
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DailyCommand {
    /// Record the day's observations
    Add {
        /// Customer (defaults to the remembered customer)
        #[clap(long)]
        customer: Option<String>,

        /// Weather (defaults to 晴天)
        #[clap(long)]
        weather: Option<String>,

        /// Temperature in degrees Celsius
        #[clap(long, allow_negative_numbers = true)]
        temperature: Option<f64>,

        /// Relative humidity in percent
        #[clap(long)]
        humidity: Option<f64>,

        /// Flock health (defaults to 良好)
        #[clap(long)]
        health: Option<String>,

        /// Notes on flock health
        #[clap(long)]
        health_notes: Option<String>,

        /// Housing condition (defaults to 正常)
        #[clap(long)]
        environment: Option<String>,

        /// Notes on housing
        #[clap(long)]
        environment_notes: Option<String>,

        /// Date (YYYY-MM-DD, defaults to today)
        #[clap(long)]
        date: Option<String>,

        /// Time (HH:MM, defaults to now)
        #[clap(long)]
        time: Option<String>,

        /// Pick customer, weather, health and housing from the quick-pick lists
        #[clap(long)]
        interactive: bool,
    },

    /// List daily records, newest first
    List,
}

#[derive(Subcommand, Debug)]
pub enum FeedCommand {
    /// Record a feed purchase
    Buy {
        /// Feed type (defaults to 成長期飼料)
        #[clap(long)]
        feed_type: Option<String>,

        /// Supplier (defaults to 農友飼料行)
        #[clap(long)]
        supplier: Option<String>,

        /// Kilograms bought
        #[clap(long)]
        quantity: Option<f64>,

        /// Price per kilogram
        #[clap(long)]
        unit_price: Option<f64>,

        /// Feed batch number (defaults to FYYYYMMDD)
        #[clap(long)]
        batch: Option<String>,

        /// Purchase date (YYYY-MM-DD, defaults to today)
        #[clap(long)]
        date: Option<String>,

        /// Free-form notes
        #[clap(long)]
        notes: Option<String>,

        /// Pick feed type and supplier from the quick-pick lists
        #[clap(long)]
        interactive: bool,
    },

    /// Record feed given to a chicken batch
    Use {
        /// Feed batch (defaults to the latest purchase)
        #[clap(long)]
        batch: Option<String>,

        /// Chicken batch (defaults to the latest intake)
        #[clap(long)]
        chicken_batch: Option<String>,

        /// Feed type (defaults to that of the latest purchase)
        #[clap(long)]
        feed_type: Option<String>,

        /// Kilograms used
        #[clap(long)]
        quantity: Option<f64>,

        /// Usage date (YYYY-MM-DD, defaults to today)
        #[clap(long)]
        date: Option<String>,

        /// Free-form notes
        #[clap(long)]
        notes: Option<String>,

        /// Pick the feed type from the quick-pick list
        #[clap(long)]
        interactive: bool,
    },

    /// List purchases and usage with the remaining stock
    List,
}

/// Fields shared by the medicine and vaccine forms
#[derive(Args, Debug)]
pub struct TreatmentArgs {
    /// Product name
    #[clap(long)]
    pub name: Option<String>,

    /// Medicine or vaccine type
    #[clap(long = "type")]
    pub kind: Option<String>,

    /// How it was given
    #[clap(long)]
    pub method: Option<String>,

    /// Amount used
    #[clap(long)]
    pub quantity: Option<f64>,

    /// Supplier
    #[clap(long)]
    pub supplier: Option<String>,

    /// Chicken batch (defaults to the latest intake)
    #[clap(long)]
    pub batch: Option<String>,

    /// Date (YYYY-MM-DD, defaults to today)
    #[clap(long)]
    pub date: Option<String>,

    /// Free-form notes
    #[clap(long)]
    pub notes: Option<String>,

    /// Pick type, method and supplier from the quick-pick lists
    #[clap(long)]
    pub interactive: bool,
}

#[derive(Subcommand, Debug)]
pub enum TreatmentCommand {
    /// Record a treatment
    Add(TreatmentArgs),

    /// List treatments, newest first
    List,
}

#[derive(Subcommand, Debug)]
pub enum SaleCommand {
    /// Record birds sold
    Add {
        /// Customer (defaults to 農友市場)
        #[clap(long)]
        customer: Option<String>,

        /// Number of birds
        #[clap(long)]
        quantity: Option<u32>,

        /// Price per bird
        #[clap(long)]
        unit_price: Option<f64>,

        /// Chicken batch (defaults to the latest intake)
        #[clap(long)]
        batch: Option<String>,

        /// Sale date (YYYY-MM-DD, defaults to today)
        #[clap(long)]
        date: Option<String>,

        /// Free-form notes
        #[clap(long)]
        notes: Option<String>,

        /// Pick the customer from the quick-pick list
        #[clap(long)]
        interactive: bool,
    },

    /// List sales, newest first
    List,
}

#[derive(Subcommand, Debug)]
pub enum CullCommand {
    /// Record birds culled
    Add {
        /// Reason (defaults to 生長不良)
        #[clap(long)]
        reason: Option<String>,

        /// Number of birds
        #[clap(long)]
        quantity: Option<u32>,

        /// Chicken batch (defaults to the latest intake)
        #[clap(long)]
        batch: Option<String>,

        /// Culling date (YYYY-MM-DD, defaults to today)
        #[clap(long)]
        date: Option<String>,

        /// Free-form notes
        #[clap(long)]
        notes: Option<String>,

        /// Pick the reason from the quick-pick list
        #[clap(long)]
        interactive: bool,
    },

    /// List culled birds, newest first
    List,
}

#[derive(Subcommand, Debug)]
pub enum StorageCommand {
    /// Print the data file in use
    Path,

    /// List stored keys
    Keys,

    /// Delete one stored key
    Delete {
        /// Storage key
        key: String,
    },

    /// Delete every stored key
    Clear {
        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Export every key to a JSON snapshot
    Export {
        /// Output file path
        output: PathBuf,
    },

    /// Import a JSON snapshot
    Import {
        /// Snapshot file path
        input: PathBuf,
    },

    /// Copy every key into another data file
    Migrate {
        /// Target data file (.json or .db)
        #[clap(long)]
        to: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the option set categories
    Categories,

    /// Quick-pick option management
    #[clap(subcommand)]
    Options(OptionsCommand),

    /// Customer and feed supplier contacts
    #[clap(subcommand)]
    Contacts(ContactsCommand),

    /// Daily weather, health and housing log
    #[clap(subcommand)]
    Daily(DailyCommand),

    /// Chick intake journal
    #[clap(subcommand)]
    Intake(IntakeCommand),

    /// Death journal
    #[clap(subcommand)]
    Death(DeathCommand),

    /// Feed purchases and usage
    #[clap(subcommand)]
    Feed(FeedCommand),

    /// Medicine journal
    #[clap(subcommand)]
    Medicine(TreatmentCommand),

    /// Vaccination journal
    #[clap(subcommand)]
    Vaccine(TreatmentCommand),

    /// Sales journal
    #[clap(subcommand)]
    Sale(SaleCommand),

    /// Culling journal
    #[clap(subcommand)]
    Cull(CullCommand),

    /// Storage maintenance
    #[clap(subcommand)]
    Storage(StorageCommand),
}
