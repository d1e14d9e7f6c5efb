mod cli;
mod prompts;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Parser;
use colored::Colorize;
use std::path::Path;

use flock_core::categories::{
    CHICKEN_RECORDS, CULLING_RECORDS, DAILY_RECORDS, DEATH_RECORDS, FEED_PURCHASE_RECORDS,
    FEED_USAGE_RECORDS, MEDICINE_RECORDS, SALES_RECORDS, VACCINE_RECORDS,
};
use flock_core::records::{birds_on_hand, feed_stock, live_count};
use flock_core::storage::{self, BackendType, SharedBacking};
use flock_core::{
    create_backend, determine_data_path, get_config_path, ChickenIntake, ContactBook,
    ContactDraft, ContactList, Config, CullingForm, CullingRecord, DailyForm, DailyRecord,
    DeathForm, DeathRecord, FeedPurchase, FeedPurchaseForm, FeedUsage, FeedUsageForm, IntakeForm,
    Journal, MedicineForm, MedicineRecord, OptionCategory, OptionDraft, OptionFields, OptionId,
    OptionItem, OptionSetStore, SaleForm, SaleRecord, VaccineForm, VaccineRecord,
};

use crate::cli::{
    Cli, Command, ContactsCommand, CullCommand, DailyCommand, DeathCommand, FeedCommand,
    IntakeCommand, OptionsCommand, SaleCommand, StorageCommand, TreatmentArgs, TreatmentCommand,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = Config::load_or_default(get_config_path()?)?;
    let data_path = determine_data_path(cli.data.as_deref(), &config)?;
    let backend_type = match cli.backend.as_deref() {
        Some(name) => Some(name.parse::<BackendType>().map_err(anyhow::Error::msg)?),
        None => config.backend_type()?,
    };
    let backing = create_backend(&data_path, backend_type)?;
    log::debug!("Using {} storage at {:?}", backing.backend_type(), data_path);

    match &cli.command {
        Command::Categories => list_categories(&backing)?,
        Command::Options(cmd) => handle_options_command(cmd, &backing)?,
        Command::Contacts(cmd) => handle_contacts_command(cmd, &backing)?,
        Command::Daily(cmd) => handle_daily_command(cmd, &backing)?,
        Command::Intake(cmd) => handle_intake_command(cmd, &backing)?,
        Command::Death(cmd) => handle_death_command(cmd, &backing)?,
        Command::Feed(cmd) => handle_feed_command(cmd, &backing)?,
        Command::Medicine(cmd) => handle_medicine_command(cmd, &backing)?,
        Command::Vaccine(cmd) => handle_vaccine_command(cmd, &backing)?,
        Command::Sale(cmd) => handle_sale_command(cmd, &backing)?,
        Command::Cull(cmd) => handle_cull_command(cmd, &backing)?,
        Command::Storage(cmd) => handle_storage_command(cmd, &backing, &data_path)?,
    }

    Ok(())
}

fn parse_category(name: &str) -> Result<OptionCategory> {
    OptionCategory::from_name(name).with_context(|| {
        let known: Vec<&str> = OptionCategory::ALL.iter().map(|c| c.slug()).collect();
        format!("Unknown category '{}'. Known categories: {}", name, known.join(", "))
    })
}

fn parse_option_id(id_str: &str) -> Result<OptionId> {
    id_str
        .parse::<OptionId>()
        .with_context(|| format!("Invalid option id: {}", id_str))
}

fn parse_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s)),
        None => Ok(Local::now().date_naive()),
    }
}

fn parse_time(time: Option<&str>) -> Result<NaiveDateTime> {
    let now = Local::now().naive_local();
    match time {
        Some(s) => NaiveTime::parse_from_str(s, "%H:%M")
            .map(|t| now.date().and_time(t))
            .with_context(|| format!("Invalid time '{}', expected HH:MM", s)),
        None => Ok(now),
    }
}

fn parse_contact_list(name: &str) -> Result<ContactList> {
    ContactList::from_name(name).with_context(|| {
        let known: Vec<&str> = ContactList::ALL.iter().map(|l| l.slug()).collect();
        format!("Unknown contact list '{}'. Known lists: {}", name, known.join(", "))
    })
}

/// Picks from a category's option set when `interactive`; an explicit
/// command-line value always wins
fn pick_field(
    backing: &SharedBacking,
    interactive: bool,
    category: OptionCategory,
    explicit: &Option<String>,
    field: &mut String,
) -> Result<()> {
    if interactive && explicit.is_none() {
        let store = OptionSetStore::for_category(backing.clone(), category);
        *field = prompts::prompt_pick(category.title(), store.options(), field)?;
    }
    if let Some(value) = explicit {
        *field = value.clone();
    }
    Ok(())
}

fn warn_if_unsaved(saved: bool) {
    if !saved {
        println!(
            "{}",
            "Warning: the change could not be saved and may be lost.".yellow()
        );
    }
}

// =========================================================================
// Option sets
// =========================================================================

fn list_categories(backing: &SharedBacking) -> Result<()> {
    println!("{}", "Option set categories:".blue().bold());
    for category in OptionCategory::ALL {
        let stored = backing.contains(category.storage_key()).unwrap_or(false);
        let marker = if stored { "stored".green() } else { "defaults".dimmed() };
        println!(
            "  {:<20} {:<10} {} ({})",
            category.slug(),
            category.title(),
            marker,
            category.storage_key()
        );
    }
    Ok(())
}

fn print_options(store: &OptionSetStore, title: &str) {
    println!("{} {}", title.blue().bold(), format!("[{}]", store.key()).dimmed());
    if store.is_empty() {
        println!("  {}", "(no options)".dimmed());
        return;
    }
    for (idx, option) in store.options().iter().enumerate() {
        let icon = option
            .icon
            .as_deref()
            .map(|i| format!(" <{}>", i))
            .unwrap_or_default();
        if option.label == option.value {
            println!("  {:>2}. {}{}  {}", idx + 1, option.label, icon, format!("#{}", option.id).dimmed());
        } else {
            println!(
                "  {:>2}. {} -> {}{}  {}",
                idx + 1,
                option.label,
                option.value.cyan(),
                icon,
                format!("#{}", option.id).dimmed()
            );
        }
    }
}

fn handle_options_command(cmd: &OptionsCommand, backing: &SharedBacking) -> Result<()> {
    match cmd {
        OptionsCommand::List { category } => {
            let category = parse_category(category)?;
            let store = OptionSetStore::for_category(backing.clone(), category);
            print_options(&store, category.title());
        }
        OptionsCommand::Add {
            category,
            label,
            value,
            icon,
            interactive,
        } => {
            let category = parse_category(category)?;
            let mut store = OptionSetStore::for_category(backing.clone(), category);

            let draft = if *interactive || label.is_none() {
                prompts::prompt_new_option()?
            } else {
                let label = label.clone().unwrap_or_default();
                let value = value.clone().unwrap_or_else(|| label.clone());
                OptionDraft {
                    label,
                    value,
                    icon: icon.clone(),
                }
            };

            let added = store
                .add(draft)?
                .last()
                .map(|o| o.id)
                .context("Option list unexpectedly empty")?;
            println!("{} #{}", "Option added".green(), added);
            warn_if_unsaved(store.last_write_succeeded());
            print_options(&store, category.title());
        }
        OptionsCommand::Edit {
            category,
            id,
            label,
            value,
        } => {
            let category = parse_category(category)?;
            let id = parse_option_id(id)?;
            let mut store = OptionSetStore::for_category(backing.clone(), category);

            let Some(current) = store.get(id).cloned() else {
                println!("{}", format!("Option #{} not found; nothing changed.", id).yellow());
                return Ok(());
            };
            let fields = OptionFields::new(
                label.clone().unwrap_or(current.label),
                value.clone().unwrap_or(current.value),
            );

            store.edit(id, fields)?;
            println!("{}", "Option updated".green());
            warn_if_unsaved(store.last_write_succeeded());
            print_options(&store, category.title());
        }
        OptionsCommand::Remove { category, id, yes } => {
            let category = parse_category(category)?;
            let id = parse_option_id(id)?;
            let mut store = OptionSetStore::for_category(backing.clone(), category);

            let Some(option) = store.get(id).cloned() else {
                println!("{}", format!("Option #{} not found; nothing removed.", id).yellow());
                return Ok(());
            };

            if !*yes {
                let confirm = inquire::Confirm::new(&format!(
                    "Are you sure you want to delete '{}'?",
                    option.label
                ))
                .with_default(false)
                .prompt()?;

                if !confirm {
                    println!("{}", "Deletion cancelled.".yellow());
                    return Ok(());
                }
            }

            store.remove(id);
            println!("{}", "Option deleted".green());
            warn_if_unsaved(store.last_write_succeeded());
            print_options(&store, category.title());
        }
        OptionsCommand::Move { category, from, to } => {
            let category = parse_category(category)?;
            let mut store = OptionSetStore::for_category(backing.clone(), category);

            if *from == 0 || *to == 0 {
                anyhow::bail!("Positions start at 1");
            }
            store.reorder(from - 1, to - 1)?;
            println!("{}", "Order updated".green());
            warn_if_unsaved(store.last_write_succeeded());
            print_options(&store, category.title());
        }
        OptionsCommand::Reset { category, yes } => {
            let category = parse_category(category)?;
            let mut store = OptionSetStore::for_category(backing.clone(), category);

            if !*yes {
                let confirm = inquire::Confirm::new(&format!(
                    "Discard all changes to {} and restore the defaults?",
                    category
                ))
                .with_default(false)
                .prompt()?;

                if !confirm {
                    println!("{}", "Reset cancelled.".yellow());
                    return Ok(());
                }
            }

            store.reset();
            println!("{}", "Defaults restored".green());
            print_options(&store, category.title());
        }
    }
    Ok(())
}

// =========================================================================
// Journals
// =========================================================================

fn handle_intake_command(cmd: &IntakeCommand, backing: &SharedBacking) -> Result<()> {
    let mut intakes: Journal<ChickenIntake> = Journal::load(backing.clone(), CHICKEN_RECORDS);

    match cmd {
        IntakeCommand::Add {
            breed,
            supplier,
            quantity,
            unit_price,
            batch,
            date,
            notes,
            interactive,
        } => {
            let mut form = IntakeForm::new(parse_date(date.as_deref())?);
            if let Some(batch) = batch {
                form.batch_number = batch.clone();
            }
            if let Some(quantity) = quantity {
                form.quantity = *quantity;
            }
            if let Some(unit_price) = unit_price {
                form.unit_price = *unit_price;
            }
            if let Some(notes) = notes {
                form.notes = notes.clone();
            }

            let breeds = OptionSetStore::for_category(backing.clone(), OptionCategory::ChickenBreeds);
            let suppliers = OptionSetStore::for_category(backing.clone(), OptionCategory::Suppliers);

            if *interactive {
                form.breed = prompts::prompt_pick("Breed", breeds.options(), &form.breed)?;
                form.supplier =
                    prompts::prompt_pick("Supplier", suppliers.options(), &form.supplier)?;
            }
            if let Some(breed) = breed {
                form.breed = breed.clone();
            }
            if let Some(supplier) = supplier {
                form.supplier = supplier.clone();
            }

            let record = form.submit()?;
            let entry = intakes.record(record);
            println!(
                "{} {} x {} = {:.2}",
                "Intake recorded:".green(),
                entry.data.breed,
                entry.data.quantity,
                entry.data.total_amount
            );
            warn_if_unsaved(intakes.last_write_succeeded());
        }
        IntakeCommand::List => {
            if intakes.is_empty() {
                println!("{}", "No intake records.".dimmed());
                return Ok(());
            }
            println!(
                "{}",
                format!(
                    "{:<11} {:<10} {:<10} {:>6} {:<12} {:>8} {:>10}",
                    "Date", "Batch", "Breed", "Qty", "Supplier", "Price", "Total"
                )
                .bold()
            );
            for entry in intakes.entries() {
                let r = &entry.data;
                println!(
                    "{:<11} {:<10} {:<10} {:>6} {:<12} {:>8.2} {:>10.2}",
                    r.entry_date.to_string(), r.batch_number, r.breed, r.quantity, r.supplier, r.unit_price, r.total_amount
                );
            }
            let total: f64 = intakes.entries().iter().map(|e| e.data.total_amount).sum();
            println!("{} {:.2}", "Total spent:".blue(), total);
        }
    }
    Ok(())
}

fn handle_death_command(cmd: &DeathCommand, backing: &SharedBacking) -> Result<()> {
    let intakes: Journal<ChickenIntake> = Journal::load(backing.clone(), CHICKEN_RECORDS);
    let mut deaths: Journal<DeathRecord> = Journal::load(backing.clone(), DEATH_RECORDS);

    match cmd {
        DeathCommand::Add {
            reason,
            quantity,
            batch,
            date,
            notes,
            interactive,
        } => {
            let mut form = DeathForm::new(parse_date(date.as_deref())?, &intakes);
            if let Some(batch) = batch {
                form.batch_number = batch.clone();
            }
            if let Some(quantity) = quantity {
                form.quantity = *quantity;
            }
            if let Some(notes) = notes {
                form.notes = notes.clone();
            }

            if *interactive {
                let reasons =
                    OptionSetStore::for_category(backing.clone(), OptionCategory::DeathReasons);
                form.reason = prompts::prompt_pick("Reason", reasons.options(), &form.reason)?;
            }
            if let Some(reason) = reason {
                form.reason = reason.clone();
            }

            let record = form.submit()?;
            let entry = deaths.record(record);
            println!(
                "{} {} lost from {} ({})",
                "Death recorded:".green(),
                entry.data.quantity,
                entry.data.batch_number,
                entry.data.reason
            );
            warn_if_unsaved(deaths.last_write_succeeded());
        }
        DeathCommand::List => {
            if deaths.is_empty() {
                println!("{}", "No death records.".dimmed());
            } else {
                println!(
                    "{}",
                    format!("{:<11} {:<10} {:>6} {:<12} Notes", "Date", "Batch", "Qty", "Reason").bold()
                );
                for entry in deaths.entries() {
                    let r = &entry.data;
                    println!(
                        "{:<11} {:<10} {:>6} {:<12} {}",
                        r.death_date.to_string(),
                        r.batch_number,
                        r.quantity,
                        r.reason,
                        r.notes.as_deref().unwrap_or("")
                    );
                }
            }
            println!("{} {}", "Live birds:".blue(), live_count(&intakes, &deaths));
        }
    }
    Ok(())
}

// =========================================================================
// Contacts
// =========================================================================

fn print_contacts(book: &ContactBook) {
    let list = book.list();
    println!("{} {}", list.title().blue().bold(), format!("[{}]", list.storage_key()).dimmed());
    if book.is_empty() {
        println!("  {}", "(no contacts)".dimmed());
        return;
    }
    let selected = book.selected().map(|c| c.id);
    for (idx, c) in book.contacts().iter().enumerate() {
        let marker = if selected == Some(c.id) { "*" } else { " " };
        println!(
            " {}{:>2}. {:<10} {:<6} {:<14} {}  {}",
            marker,
            idx + 1,
            c.name,
            c.kind,
            c.contact,
            c.address,
            format!("#{}", c.id).dimmed()
        );
    }
}

fn handle_contacts_command(cmd: &ContactsCommand, backing: &SharedBacking) -> Result<()> {
    match cmd {
        ContactsCommand::List { list } => {
            let book = ContactBook::load(backing.clone(), parse_contact_list(list)?);
            print_contacts(&book);
        }
        ContactsCommand::Add {
            list,
            name,
            kind,
            contact,
            address,
            interactive,
        } => {
            let list = parse_contact_list(list)?;
            let mut book = ContactBook::load(backing.clone(), list);

            let mut draft = ContactDraft {
                name: name.clone().unwrap_or_default(),
                kind: kind.clone().unwrap_or_default(),
                contact: contact.clone().unwrap_or_default(),
                address: address.clone().unwrap_or_default(),
            };
            if *interactive || name.is_none() {
                let kinds = contact_kinds(backing, list);
                draft = prompts::prompt_new_contact(&kinds, draft)?;
            }

            let added = book.add(draft)?.id;
            println!("{} #{}", "Contact added".green(), added);
            warn_if_unsaved(book.last_write_succeeded());
            print_contacts(&book);
        }
        ContactsCommand::Edit {
            list,
            id,
            name,
            kind,
            contact,
            address,
        } => {
            let list = parse_contact_list(list)?;
            let id = parse_option_id(id)?;
            let mut book = ContactBook::load(backing.clone(), list);

            let Some(current) = book.get(id).cloned() else {
                println!("{}", format!("Contact #{} not found; nothing changed.", id).yellow());
                return Ok(());
            };
            let draft = ContactDraft {
                name: name.clone().unwrap_or(current.name),
                kind: kind.clone().unwrap_or(current.kind),
                contact: contact.clone().unwrap_or(current.contact),
                address: address.clone().unwrap_or(current.address),
            };

            book.update(id, draft)?;
            println!("{}", "Contact updated".green());
            warn_if_unsaved(book.last_write_succeeded());
            print_contacts(&book);
        }
        ContactsCommand::Remove { list, id, yes } => {
            let list = parse_contact_list(list)?;
            let id = parse_option_id(id)?;
            let mut book = ContactBook::load(backing.clone(), list);

            let Some(contact) = book.get(id).cloned() else {
                println!("{}", format!("Contact #{} not found; nothing removed.", id).yellow());
                return Ok(());
            };

            if !*yes {
                let confirm = inquire::Confirm::new(&format!(
                    "Are you sure you want to delete '{}'?",
                    contact.name
                ))
                .with_default(false)
                .prompt()?;

                if !confirm {
                    println!("{}", "Deletion cancelled.".yellow());
                    return Ok(());
                }
            }

            book.remove(id);
            println!("{}", "Contact deleted".green());
            warn_if_unsaved(book.last_write_succeeded());
            print_contacts(&book);
        }
        ContactsCommand::Move { list, from, to } => {
            let mut book = ContactBook::load(backing.clone(), parse_contact_list(list)?);

            if *from == 0 || *to == 0 {
                anyhow::bail!("Positions start at 1");
            }
            book.reorder(from - 1, to - 1)?;
            println!("{}", "Order updated".green());
            warn_if_unsaved(book.last_write_succeeded());
            print_contacts(&book);
        }
        ContactsCommand::Select { id } => {
            let id = parse_option_id(id)?;
            let mut book = ContactBook::load(backing.clone(), ContactList::Customers);

            match book.select(id).map(|c| c.name.clone()) {
                Some(name) => {
                    println!("{} {}", "Default customer:".green(), name);
                    warn_if_unsaved(book.last_write_succeeded());
                }
                None => println!("{}", format!("Customer #{} not found; nothing changed.", id).yellow()),
            }
        }
    }
    Ok(())
}

/// Types offered when adding a contact. Feed supplier types are an
/// editable option set of their own.
fn contact_kinds(backing: &SharedBacking, list: ContactList) -> Vec<OptionItem> {
    match list {
        ContactList::FeedSuppliers => {
            OptionSetStore::for_category(backing.clone(), OptionCategory::SupplierTypes)
                .options()
                .to_vec()
        }
        ContactList::Customers => list
            .kinds()
            .iter()
            .enumerate()
            .map(|(i, kind)| OptionItem::labelled(i as u64 + 1, kind))
            .collect(),
    }
}

// =========================================================================
// Daily records
// =========================================================================

fn handle_daily_command(cmd: &DailyCommand, backing: &SharedBacking) -> Result<()> {
    let mut journal: Journal<DailyRecord> = Journal::load(backing.clone(), DAILY_RECORDS);

    match cmd {
        DailyCommand::Add {
            customer,
            weather,
            temperature,
            humidity,
            health,
            health_notes,
            environment,
            environment_notes,
            date,
            time,
            interactive,
        } => {
            let mut customers = ContactBook::load(backing.clone(), ContactList::Customers);
            let stamp = parse_time(time.as_deref())?;
            let stamp = parse_date(date.as_deref())?.and_time(stamp.time());
            let mut form = DailyForm::new(stamp, &customers);

            if *interactive && customer.is_none() {
                form.customer =
                    prompts::prompt_pick("客戶", &customers.as_options(), &form.customer)?;
                // Remember the pick for the next record
                let picked = customers.find_by_name(&form.customer).map(|c| c.id);
                if let Some(id) = picked {
                    customers.select(id);
                }
            }
            if let Some(customer) = customer {
                form.customer = customer.clone();
            }

            pick_field(backing, *interactive, OptionCategory::Weather, weather, &mut form.weather)?;
            pick_field(
                backing,
                *interactive,
                OptionCategory::Health,
                health,
                &mut form.health_status,
            )?;
            pick_field(
                backing,
                *interactive,
                OptionCategory::Environment,
                environment,
                &mut form.environment_status,
            )?;
            if let Some(temperature) = temperature {
                form.temperature = *temperature;
            }
            if let Some(humidity) = humidity {
                form.humidity = *humidity;
            }
            if let Some(notes) = health_notes {
                form.health_notes = notes.clone();
            }
            if let Some(notes) = environment_notes {
                form.environment_notes = notes.clone();
            }

            let record = form.submit()?;
            let entry = journal.record(record);
            println!(
                "{} {} {} {}°C {}%",
                "Daily record saved:".green(),
                entry.data.record_date,
                entry.data.weather,
                entry.data.temperature,
                entry.data.humidity
            );
            warn_if_unsaved(journal.last_write_succeeded());
        }
        DailyCommand::List => {
            if journal.is_empty() {
                println!("{}", "No daily records.".dimmed());
                return Ok(());
            }
            println!(
                "{}",
                format!(
                    "{:<11} {:<6} {:<10} {:<6} {:>6} {:>5} {:<6} {:<8}",
                    "Date", "Time", "Customer", "Weather", "Temp", "Hum%", "Health", "Housing"
                )
                .bold()
            );
            for entry in journal.entries() {
                let r = &entry.data;
                println!(
                    "{:<11} {:<6} {:<10} {:<6} {:>6.1} {:>5.0} {:<6} {:<8}",
                    r.record_date.to_string(),
                    r.record_time.format("%H:%M").to_string(),
                    r.customer,
                    r.weather,
                    r.temperature,
                    r.humidity,
                    r.health_status,
                    r.environment_status
                );
            }
        }
    }
    Ok(())
}

// =========================================================================
// Feed
// =========================================================================

fn handle_feed_command(cmd: &FeedCommand, backing: &SharedBacking) -> Result<()> {
    let mut purchases: Journal<FeedPurchase> = Journal::load(backing.clone(), FEED_PURCHASE_RECORDS);
    let mut usages: Journal<FeedUsage> = Journal::load(backing.clone(), FEED_USAGE_RECORDS);

    match cmd {
        FeedCommand::Buy {
            feed_type,
            supplier,
            quantity,
            unit_price,
            batch,
            date,
            notes,
            interactive,
        } => {
            let mut form = FeedPurchaseForm::new(parse_date(date.as_deref())?);
            if let Some(batch) = batch {
                form.batch_number = batch.clone();
            }
            if let Some(quantity) = quantity {
                form.quantity = *quantity;
            }
            if let Some(unit_price) = unit_price {
                form.unit_price = *unit_price;
            }
            if let Some(notes) = notes {
                form.notes = notes.clone();
            }

            pick_field(
                backing,
                *interactive,
                OptionCategory::FeedTypes,
                feed_type,
                &mut form.feed_type,
            )?;
            if *interactive && supplier.is_none() {
                let suppliers = ContactBook::load(backing.clone(), ContactList::FeedSuppliers);
                form.supplier =
                    prompts::prompt_pick("飼料供應商", &suppliers.as_options(), &form.supplier)?;
            }
            if let Some(supplier) = supplier {
                form.supplier = supplier.clone();
            }

            let record = form.submit()?;
            let entry = purchases.record(record);
            println!(
                "{} {} {} kg x {:.2} = {:.2}",
                "Feed purchase recorded:".green(),
                entry.data.feed_type,
                entry.data.quantity,
                entry.data.unit_price,
                entry.data.total_amount
            );
            warn_if_unsaved(purchases.last_write_succeeded());
        }
        FeedCommand::Use {
            batch,
            chicken_batch,
            feed_type,
            quantity,
            date,
            notes,
            interactive,
        } => {
            let intakes: Journal<ChickenIntake> = Journal::load(backing.clone(), CHICKEN_RECORDS);
            let mut form = FeedUsageForm::new(parse_date(date.as_deref())?, &purchases, &intakes);
            if let Some(batch) = batch {
                form.batch_number = batch.clone();
            }
            if let Some(chicken_batch) = chicken_batch {
                form.chicken_batch = chicken_batch.clone();
            }
            if let Some(quantity) = quantity {
                form.quantity = *quantity;
            }
            if let Some(notes) = notes {
                form.notes = notes.clone();
            }
            pick_field(
                backing,
                *interactive,
                OptionCategory::FeedTypes,
                feed_type,
                &mut form.feed_type,
            )?;

            let record = form.submit()?;
            let entry = usages.record(record);
            println!(
                "{} {} kg of {} to {}",
                "Feed usage recorded:".green(),
                entry.data.quantity,
                entry.data.batch_number,
                entry.data.chicken_batch
            );
            warn_if_unsaved(usages.last_write_succeeded());
        }
        FeedCommand::List => {
            if purchases.is_empty() {
                println!("{}", "No feed purchases.".dimmed());
            } else {
                println!("{}", "Purchases".blue().bold());
                for entry in purchases.entries() {
                    let r = &entry.data;
                    println!(
                        "  {:<11} {:<10} {:<10} {:>8.1} kg {:<10} {:>10.2}",
                        r.purchase_date.to_string(),
                        r.batch_number,
                        r.feed_type,
                        r.quantity,
                        r.supplier,
                        r.total_amount
                    );
                }
            }
            if !usages.is_empty() {
                println!("{}", "Usage".blue().bold());
                for entry in usages.entries() {
                    let r = &entry.data;
                    println!(
                        "  {:<11} {:<10} {:<10} {:<10} {:>8.1} kg",
                        r.usage_date.to_string(),
                        r.batch_number,
                        r.chicken_batch,
                        r.feed_type,
                        r.quantity
                    );
                }
            }
            println!("{} {:.1} kg", "Feed in stock:".blue(), feed_stock(&purchases, &usages));
        }
    }
    Ok(())
}

// =========================================================================
// Medicine and vaccines
// =========================================================================

fn handle_medicine_command(cmd: &TreatmentCommand, backing: &SharedBacking) -> Result<()> {
    let mut journal: Journal<MedicineRecord> = Journal::load(backing.clone(), MEDICINE_RECORDS);

    match cmd {
        TreatmentCommand::Add(args) => {
            let intakes: Journal<ChickenIntake> = Journal::load(backing.clone(), CHICKEN_RECORDS);
            let mut form = MedicineForm::new(parse_date(args.date.as_deref())?, &intakes);
            apply_treatment_args(args, &mut form.chicken_batch, &mut form.quantity, &mut form.notes);

            pick_field(
                backing,
                args.interactive,
                OptionCategory::MedicineTypes,
                &args.kind,
                &mut form.medicine_type,
            )?;
            pick_field(
                backing,
                args.interactive,
                OptionCategory::UsageMethods,
                &args.method,
                &mut form.usage_method,
            )?;
            pick_field(
                backing,
                args.interactive,
                OptionCategory::MedicineSuppliers,
                &args.supplier,
                &mut form.supplier,
            )?;
            form.medicine_name = treatment_name(args, "藥品名稱")?;

            let record = form.submit()?;
            let entry = journal.record(record);
            println!(
                "{} {} ({}) for {}",
                "Medicine recorded:".green(),
                entry.data.medicine_name,
                entry.data.medicine_type,
                entry.data.chicken_batch
            );
            warn_if_unsaved(journal.last_write_succeeded());
        }
        TreatmentCommand::List => {
            if journal.is_empty() {
                println!("{}", "No medicine records.".dimmed());
                return Ok(());
            }
            for entry in journal.entries() {
                let r = &entry.data;
                println!(
                    "{:<11} {:<10} {:<8} {:<12} {:<8} {:>6} {}",
                    r.use_date.to_string(),
                    r.chicken_batch,
                    r.medicine_type,
                    r.medicine_name,
                    r.usage_method,
                    r.quantity,
                    r.supplier
                );
            }
        }
    }
    Ok(())
}

fn handle_vaccine_command(cmd: &TreatmentCommand, backing: &SharedBacking) -> Result<()> {
    let mut journal: Journal<VaccineRecord> = Journal::load(backing.clone(), VACCINE_RECORDS);

    match cmd {
        TreatmentCommand::Add(args) => {
            let intakes: Journal<ChickenIntake> = Journal::load(backing.clone(), CHICKEN_RECORDS);
            let mut form = VaccineForm::new(parse_date(args.date.as_deref())?, &intakes);
            apply_treatment_args(args, &mut form.chicken_batch, &mut form.quantity, &mut form.notes);

            pick_field(
                backing,
                args.interactive,
                OptionCategory::VaccineTypes,
                &args.kind,
                &mut form.vaccine_type,
            )?;
            pick_field(
                backing,
                args.interactive,
                OptionCategory::UsageMethods,
                &args.method,
                &mut form.usage_method,
            )?;
            pick_field(
                backing,
                args.interactive,
                OptionCategory::MedicineSuppliers,
                &args.supplier,
                &mut form.supplier,
            )?;
            form.vaccine_name = treatment_name(args, "疫苗名稱")?;

            let record = form.submit()?;
            let entry = journal.record(record);
            println!(
                "{} {} ({}) for {}",
                "Vaccination recorded:".green(),
                entry.data.vaccine_name,
                entry.data.vaccine_type,
                entry.data.chicken_batch
            );
            warn_if_unsaved(journal.last_write_succeeded());
        }
        TreatmentCommand::List => {
            if journal.is_empty() {
                println!("{}", "No vaccination records.".dimmed());
                return Ok(());
            }
            for entry in journal.entries() {
                let r = &entry.data;
                println!(
                    "{:<11} {:<10} {:<10} {:<12} {:<8} {:>6} {}",
                    r.vaccination_date.to_string(),
                    r.chicken_batch,
                    r.vaccine_type,
                    r.vaccine_name,
                    r.usage_method,
                    r.quantity,
                    r.supplier
                );
            }
        }
    }
    Ok(())
}

fn apply_treatment_args(args: &TreatmentArgs, batch: &mut String, quantity: &mut f64, notes: &mut String) {
    if let Some(b) = &args.batch {
        *batch = b.clone();
    }
    if let Some(q) = args.quantity {
        *quantity = q;
    }
    if let Some(n) = &args.notes {
        *notes = n.clone();
    }
}

/// Product name from the command line, asked for in interactive mode
fn treatment_name(args: &TreatmentArgs, prompt: &str) -> Result<String> {
    match &args.name {
        Some(name) => Ok(name.clone()),
        None if args.interactive => prompts::prompt_text(prompt),
        None => Ok(String::new()),
    }
}

// =========================================================================
// Sales and culling
// =========================================================================

fn handle_sale_command(cmd: &SaleCommand, backing: &SharedBacking) -> Result<()> {
    let mut sales: Journal<SaleRecord> = Journal::load(backing.clone(), SALES_RECORDS);

    match cmd {
        SaleCommand::Add {
            customer,
            quantity,
            unit_price,
            batch,
            date,
            notes,
            interactive,
        } => {
            let intakes: Journal<ChickenIntake> = Journal::load(backing.clone(), CHICKEN_RECORDS);
            let mut form = SaleForm::new(parse_date(date.as_deref())?, &intakes);
            if let Some(batch) = batch {
                form.chicken_batch = batch.clone();
            }
            if let Some(quantity) = quantity {
                form.quantity = *quantity;
            }
            if let Some(unit_price) = unit_price {
                form.unit_price = *unit_price;
            }
            if let Some(notes) = notes {
                form.notes = notes.clone();
            }
            pick_field(
                backing,
                *interactive,
                OptionCategory::SalesCustomers,
                customer,
                &mut form.customer,
            )?;

            let record = form.submit()?;
            let entry = sales.record(record);
            println!(
                "{} {} birds to {} = {:.2}",
                "Sale recorded:".green(),
                entry.data.quantity,
                entry.data.customer,
                entry.data.total_amount
            );
            warn_if_unsaved(sales.last_write_succeeded());
        }
        SaleCommand::List => {
            if sales.is_empty() {
                println!("{}", "No sales.".dimmed());
                return Ok(());
            }
            for entry in sales.entries() {
                let r = &entry.data;
                println!(
                    "{:<11} {:<10} {:>6} {:>8.2} {:>10.2} {}",
                    r.sale_date.to_string(),
                    r.chicken_batch,
                    r.quantity,
                    r.unit_price,
                    r.total_amount,
                    r.customer
                );
            }
            let revenue: f64 = sales.entries().iter().map(|e| e.data.total_amount).sum();
            println!("{} {:.2}", "Total revenue:".blue(), revenue);
        }
    }
    Ok(())
}

fn handle_cull_command(cmd: &CullCommand, backing: &SharedBacking) -> Result<()> {
    let intakes: Journal<ChickenIntake> = Journal::load(backing.clone(), CHICKEN_RECORDS);
    let mut cullings: Journal<CullingRecord> = Journal::load(backing.clone(), CULLING_RECORDS);

    match cmd {
        CullCommand::Add {
            reason,
            quantity,
            batch,
            date,
            notes,
            interactive,
        } => {
            let mut form = CullingForm::new(parse_date(date.as_deref())?, &intakes);
            if let Some(batch) = batch {
                form.chicken_batch = batch.clone();
            }
            if let Some(quantity) = quantity {
                form.quantity = *quantity;
            }
            if let Some(notes) = notes {
                form.notes = notes.clone();
            }
            pick_field(
                backing,
                *interactive,
                OptionCategory::CullingReasons,
                reason,
                &mut form.reason,
            )?;

            let record = form.submit()?;
            let entry = cullings.record(record);
            println!(
                "{} {} from {} ({})",
                "Culling recorded:".green(),
                entry.data.quantity,
                entry.data.chicken_batch,
                entry.data.reason
            );
            warn_if_unsaved(cullings.last_write_succeeded());
        }
        CullCommand::List => {
            if cullings.is_empty() {
                println!("{}", "No culling records.".dimmed());
            } else {
                for entry in cullings.entries() {
                    let r = &entry.data;
                    println!(
                        "{:<11} {:<10} {:>6} {:<10} {}",
                        r.culling_date.to_string(),
                        r.chicken_batch,
                        r.quantity,
                        r.reason,
                        r.notes.as_deref().unwrap_or("")
                    );
                }
            }
            let deaths: Journal<DeathRecord> = Journal::load(backing.clone(), DEATH_RECORDS);
            let sales: Journal<SaleRecord> = Journal::load(backing.clone(), SALES_RECORDS);
            println!(
                "{} {}",
                "Birds on hand:".blue(),
                birds_on_hand(&intakes, &deaths, &sales, &cullings)
            );
        }
    }
    Ok(())
}

// =========================================================================
// Storage maintenance
// =========================================================================

fn handle_storage_command(cmd: &StorageCommand, backing: &SharedBacking, data_path: &Path) -> Result<()> {
    match cmd {
        StorageCommand::Path => {
            println!("{} ({})", data_path.display(), backing.backend_type());
        }
        StorageCommand::Keys => {
            let keys = backing.keys().context("Failed to list keys")?;
            if keys.is_empty() {
                println!("{}", "Storage is empty.".dimmed());
            }
            for key in keys {
                println!("  {}", key);
            }
        }
        StorageCommand::Delete { key } => {
            if storage::remove(backing.as_ref(), key) {
                println!("{} {}", "Deleted".green(), key);
            } else {
                anyhow::bail!("Failed to delete '{}'", key);
            }
        }
        StorageCommand::Clear { yes } => {
            if !*yes {
                let confirm = inquire::Confirm::new("Delete ALL stored option sets and records?")
                    .with_default(false)
                    .prompt()?;
                if !confirm {
                    println!("{}", "Clear cancelled.".yellow());
                    return Ok(());
                }
            }
            if storage::clear(backing.as_ref()) {
                println!("{}", "Storage cleared".green());
            } else {
                anyhow::bail!("Failed to clear storage");
            }
        }
        StorageCommand::Export { output } => {
            let count = storage::export_snapshot(backing.as_ref(), output)?;
            println!("{} {} keys to {}", "Exported".green(), count, output.display());
        }
        StorageCommand::Import { input } => {
            let count = storage::import_snapshot(input, backing.as_ref())?;
            println!("{} {} keys from {}", "Imported".green(), count, input.display());
        }
        StorageCommand::Migrate { to } => {
            let target = create_backend(to, None)?;
            let count = storage::copy_all(backing.as_ref(), target.as_ref())?;
            println!(
                "{} {} keys to {} ({})",
                "Migrated".green(),
                count,
                to.display(),
                target.backend_type()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_core::categories::{CHICKEN_BREEDS, CUSTOMERS};
    use flock_core::MemoryBacking;
    use std::sync::Arc;

    fn memory() -> SharedBacking {
        Arc::new(MemoryBacking::new())
    }

    #[test]
    fn test_edit_unknown_option_leaves_set_alone() {
        let backing = memory();
        let cmd = OptionsCommand::Edit {
            category: "breeds".to_string(),
            id: "999".to_string(),
            label: Some("新雞種".to_string()),
            value: None,
        };

        assert!(handle_options_command(&cmd, &backing).is_ok());
        assert!(!backing.contains(CHICKEN_BREEDS).unwrap());
    }

    #[test]
    fn test_edit_known_option_keeps_unset_fields() {
        let backing = memory();
        let cmd = OptionsCommand::Edit {
            category: "breeds".to_string(),
            id: "2".to_string(),
            label: Some("白羽雞".to_string()),
            value: None,
        };

        handle_options_command(&cmd, &backing).unwrap();
        let store = OptionSetStore::for_category(backing, OptionCategory::ChickenBreeds);
        let edited = store.get(OptionId(2)).unwrap();
        assert_eq!(edited.label, "白羽雞");
        assert_eq!(edited.value, "白羽土雞");
    }

    #[test]
    fn test_edit_unknown_contact_leaves_list_alone() {
        let backing = memory();
        let cmd = ContactsCommand::Edit {
            list: "customers".to_string(),
            id: "999".to_string(),
            name: Some("新客戶".to_string()),
            kind: None,
            contact: None,
            address: None,
        };

        assert!(handle_contacts_command(&cmd, &backing).is_ok());
        assert!(!backing.contains(CUSTOMERS).unwrap());
    }

    #[test]
    fn test_sale_then_cull_updates_journals() {
        let backing = memory();
        let intake = IntakeCommand::Add {
            breed: None,
            supplier: None,
            quantity: Some(50),
            unit_price: None,
            batch: Some("B20240301".to_string()),
            date: Some("2024-03-01".to_string()),
            notes: None,
            interactive: false,
        };
        handle_intake_command(&intake, &backing).unwrap();

        let sale = SaleCommand::Add {
            customer: Some("吉祥超市".to_string()),
            quantity: Some(20),
            unit_price: None,
            batch: None,
            date: Some("2024-04-01".to_string()),
            notes: None,
            interactive: false,
        };
        handle_sale_command(&sale, &backing).unwrap();

        let cull = CullCommand::Add {
            reason: None,
            quantity: None,
            batch: None,
            date: None,
            notes: None,
            interactive: false,
        };
        handle_cull_command(&cull, &backing).unwrap();

        let sales: Journal<SaleRecord> = Journal::load(backing.clone(), SALES_RECORDS);
        assert_eq!(sales.latest().unwrap().data.chicken_batch, "B20240301");
        assert_eq!(sales.latest().unwrap().data.total_amount, 4000.0);
        let cullings: Journal<CullingRecord> = Journal::load(backing, CULLING_RECORDS);
        assert_eq!(cullings.latest().unwrap().data.quantity, 5);
    }

    #[test]
    fn test_daily_add_without_customer_is_rejected() {
        let backing = memory();
        let cmd = DailyCommand::Add {
            customer: None,
            weather: None,
            temperature: None,
            humidity: None,
            health: None,
            health_notes: None,
            environment: None,
            environment_notes: None,
            date: None,
            time: Some("08:15".to_string()),
            interactive: false,
        };

        assert!(handle_daily_command(&cmd, &backing).is_err());
        assert!(!backing.contains(DAILY_RECORDS).unwrap());
    }

    #[test]
    fn test_medicine_add_with_name() {
        let backing = memory();
        let args = TreatmentArgs {
            name: Some("維他命B群".to_string()),
            kind: Some("維他命".to_string()),
            method: None,
            quantity: Some(2.0),
            supplier: None,
            batch: Some("B20240301".to_string()),
            date: Some("2024-03-10".to_string()),
            notes: None,
            interactive: false,
        };

        handle_medicine_command(&TreatmentCommand::Add(args), &backing).unwrap();
        let journal: Journal<MedicineRecord> = Journal::load(backing, MEDICINE_RECORDS);
        let record = &journal.latest().unwrap().data;
        assert_eq!(record.medicine_type, "維他命");
        assert_eq!(record.usage_method, "飲水添加");
    }
}
