//! Contact books for customers and feed suppliers
//!
//! A contact carries more than a label: a type, a phone number and an
//! address. Selectors still edit contacts as plain options, with the name as
//! both label and value. Converting an edited option sequence back keeps the
//! extra fields of every contact whose id survived.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::categories::{CUSTOMERS, FEED_SUPPLIERS, SELECTED_CUSTOMER};
use crate::error::{OptionSetError, ValidationError};
use crate::models::{self, next_time_id, OptionId, OptionItem};
use crate::option_set::OptionSetStore;
use crate::storage::{self, MemoryBacking, SharedBacking};

/// Type given to contacts that were created without one
pub const OTHER_KIND: &str = "其他";

/// A customer or supplier with contact details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub id: OptionId,
    pub name: String,
    #[serde(rename = "type", default = "other_kind")]
    pub kind: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub address: String,
}

fn other_kind() -> String {
    OTHER_KIND.to_string()
}

impl Contact {
    fn new(id: u64, name: &str, kind: &str, contact: &str, address: &str) -> Self {
        Self {
            id: OptionId(id),
            name: name.to_string(),
            kind: kind.to_string(),
            contact: contact.to_string(),
            address: address.to_string(),
        }
    }

    /// Selector view of this contact
    pub fn as_option(&self) -> OptionItem {
        OptionItem::new(self.id.0, self.name.clone(), self.name.clone())
    }
}

/// Input for adding or updating a contact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub kind: String,
    pub contact: String,
    pub address: String,
}

impl ContactDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("Name"));
        }
        Ok(())
    }

    fn into_contact(self, id: OptionId) -> Contact {
        let kind = self.kind.trim();
        Contact {
            id,
            name: self.name.trim().to_string(),
            kind: if kind.is_empty() { other_kind() } else { kind.to_string() },
            contact: self.contact.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

/// The two contact lists kept by the farm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactList {
    Customers,
    FeedSuppliers,
}

impl ContactList {
    pub const ALL: [ContactList; 2] = [ContactList::Customers, ContactList::FeedSuppliers];

    pub fn storage_key(&self) -> &'static str {
        match self {
            ContactList::Customers => CUSTOMERS,
            ContactList::FeedSuppliers => FEED_SUPPLIERS,
        }
    }

    /// Key remembering the last picked contact, if this list keeps one
    pub fn selection_key(&self) -> Option<&'static str> {
        match self {
            ContactList::Customers => Some(SELECTED_CUSTOMER),
            ContactList::FeedSuppliers => None,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ContactList::Customers => "customers",
            ContactList::FeedSuppliers => "feed-suppliers",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ContactList::Customers => "客戶",
            ContactList::FeedSuppliers => "飼料供應商",
        }
    }

    /// Types offered when adding a contact
    pub fn kinds(&self) -> &'static [&'static str] {
        match self {
            ContactList::Customers => &["市場", "超市", "餐廳", "個人", OTHER_KIND],
            ContactList::FeedSuppliers => &["飼料行", "飼料廠", "農場", OTHER_KIND],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.slug() == name || l.storage_key() == name)
    }

    pub fn defaults(&self) -> Vec<Contact> {
        match self {
            ContactList::Customers => vec![
                Contact::new(1, "農友市場", "市場", "0912-345-678", "台北市中正區"),
                Contact::new(2, "吉祥超市", "超市", "0923-456-789", "新北市板橋區"),
                Contact::new(3, "永豐餐廳", "餐廳", "0934-567-890", "台北市信義區"),
                Contact::new(4, "個人客戶", "個人", "0945-678-901", "台北市大安區"),
                Contact::new(5, "其他", OTHER_KIND, "", ""),
            ],
            ContactList::FeedSuppliers => vec![
                Contact::new(1, "農友飼料行", "飼料行", "0912-345-678", "台北市中正區"),
                Contact::new(2, "吉祥飼料廠", "飼料廠", "0923-456-789", "新北市板橋區"),
                Contact::new(3, "永豐飼料", "飼料行", "0934-567-890", "台北市信義區"),
                Contact::new(4, "其他", OTHER_KIND, "", ""),
            ],
        }
    }
}

impl fmt::Display for ContactList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Persisted, ordered contact list
pub struct ContactBook {
    list: ContactList,
    backing: SharedBacking,
    contacts: Vec<Contact>,
    last_write_ok: bool,
}

impl ContactBook {
    /// Reads the list from storage, falling back to the built-in contacts
    pub fn load(backing: SharedBacking, list: ContactList) -> Self {
        let contacts = storage::load_or(backing.as_ref(), list.storage_key(), list.defaults());
        Self {
            list,
            backing,
            contacts,
            last_write_ok: true,
        }
    }

    pub fn list(&self) -> ContactList {
        self.list
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn last_write_succeeded(&self) -> bool {
        self.last_write_ok
    }

    pub fn get(&self, id: OptionId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.name == name)
    }

    /// Contacts as selector options, in display order
    pub fn as_options(&self) -> Vec<OptionItem> {
        self.contacts.iter().map(Contact::as_option).collect()
    }

    /// In-memory option set mirroring this book, for driving a selector.
    /// Changes made through it come back via [`ContactBook::apply_options`].
    pub fn option_store(&self) -> OptionSetStore {
        let mirror: SharedBacking = Arc::new(MemoryBacking::new());
        OptionSetStore::load(mirror, self.list.storage_key(), self.as_options())
    }

    /// Rebuilds the book from an edited option sequence. Contacts whose id
    /// survived keep their type and details; new ids get the default type.
    pub fn apply_options(&mut self, options: &[OptionItem]) -> &[Contact] {
        let next = options
            .iter()
            .map(|option| match self.get(option.id) {
                Some(existing) => Contact {
                    name: option.label.clone(),
                    ..existing.clone()
                },
                None => Contact {
                    id: option.id,
                    name: option.label.clone(),
                    kind: other_kind(),
                    contact: String::new(),
                    address: String::new(),
                },
            })
            .collect();
        self.commit(next);
        &self.contacts
    }

    /// Appends a contact with a fresh id
    pub fn add(&mut self, draft: ContactDraft) -> Result<&Contact, ValidationError> {
        draft.validate()?;
        let taken: Vec<u64> = self.contacts.iter().map(|c| c.id.0).collect();
        let contact = draft.into_contact(OptionId(next_time_id(&taken)));

        let mut next = self.contacts.clone();
        next.push(contact);
        self.commit(next);

        let added = self.contacts.len() - 1;
        Ok(&self.contacts[added])
    }

    /// Replaces every field of the contact with `id`, keeping its position.
    /// Returns false, without writing, when no contact has that id.
    pub fn update(&mut self, id: OptionId, draft: ContactDraft) -> Result<bool, ValidationError> {
        draft.validate()?;
        let Some(index) = self.contacts.iter().position(|c| c.id == id) else {
            return Ok(false);
        };

        let mut next = self.contacts.clone();
        next[index] = draft.into_contact(id);
        self.commit(next);
        Ok(true)
    }

    /// Removes the contact with `id`, returning whether one was found.
    /// The list is written either way.
    pub fn remove(&mut self, id: OptionId) -> bool {
        let before = self.contacts.len();
        let next: Vec<Contact> = self.contacts.iter().filter(|c| c.id != id).cloned().collect();
        let found = next.len() != before;
        self.commit(next);
        found
    }

    /// Moves a contact with the same index rules as option reordering
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<&[Contact], OptionSetError> {
        let options = models::reordered(&self.as_options(), from, to)?;
        if from != to {
            self.apply_options(&options);
        }
        Ok(&self.contacts)
    }

    /// The remembered pick of this list, if it still exists
    pub fn selected(&self) -> Option<&Contact> {
        let key = self.list.selection_key()?;
        let remembered: Option<Contact> = storage::load_or(self.backing.as_ref(), key, None);
        let remembered = remembered?;
        self.get(remembered.id)
    }

    /// Remembers the contact with `id` as this list's pick
    pub fn select(&mut self, id: OptionId) -> Option<&Contact> {
        let contact = self.get(id)?.clone();
        if let Some(key) = self.list.selection_key() {
            self.last_write_ok = storage::save(self.backing.as_ref(), key, &contact);
        }
        self.get(id)
    }

    fn commit(&mut self, next: Vec<Contact>) {
        self.contacts = next;
        self.last_write_ok =
            storage::save(self.backing.as_ref(), self.list.storage_key(), &self.contacts);
        if !self.last_write_ok {
            log::warn!(
                "Contact list '{}' updated in memory only; change may be lost on reload",
                self.list
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OptionDraft, OptionFields};
    use crate::storage::test_support::RecordingBacking;
    use crate::storage::KeyValueBacking;

    fn names(book: &ContactBook) -> Vec<&str> {
        book.contacts().iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_defaults_until_written() {
        let backing = Arc::new(RecordingBacking::new());
        let book = ContactBook::load(backing.clone(), ContactList::Customers);

        assert_eq!(book.len(), 5);
        assert_eq!(book.contacts()[0].kind, "市場");
        assert_eq!(backing.write_count(), 0);
    }

    #[test]
    fn test_stored_shape_uses_type_field() {
        let backing = Arc::new(MemoryBacking::new());
        let mut book = ContactBook::load(backing.clone(), ContactList::FeedSuppliers);
        let mut draft = ContactDraft::new("新飼料行");
        draft.contact = "02-1234-5678".to_string();
        book.add(draft).unwrap();

        let raw = backing.load(FEED_SUPPLIERS).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[4]["name"], "新飼料行");
        assert_eq!(value[4]["type"], "其他");
        assert_eq!(value[4]["contact"], "02-1234-5678");
    }

    #[test]
    fn test_reads_contacts_missing_details() {
        let backing = Arc::new(MemoryBacking::new());
        backing
            .store(CUSTOMERS, r#"[{"id":7,"name":"老客戶"}]"#)
            .unwrap();

        let book = ContactBook::load(backing, ContactList::Customers);
        assert_eq!(book.contacts()[0].kind, OTHER_KIND);
        assert_eq!(book.contacts()[0].address, "");
    }

    #[test]
    fn test_selector_edits_keep_contact_details() {
        let backing = Arc::new(MemoryBacking::new());
        let mut book = ContactBook::load(backing.clone(), ContactList::Customers);
        let mut store = book.option_store();

        store
            .edit(OptionId(3), OptionFields::new("永豐小館", "永豐小館"))
            .unwrap();
        store.remove(OptionId(5));
        store.add(OptionDraft::new("新客戶", "新客戶")).unwrap();
        book.apply_options(store.options());

        assert_eq!(names(&book), vec!["農友市場", "吉祥超市", "永豐小館", "個人客戶", "新客戶"]);
        let renamed = book.get(OptionId(3)).unwrap();
        assert_eq!(renamed.kind, "餐廳");
        assert_eq!(renamed.contact, "0934-567-890");
        assert_eq!(book.contacts()[4].kind, OTHER_KIND);

        let reloaded = ContactBook::load(backing, ContactList::Customers);
        assert_eq!(reloaded.contacts(), book.contacts());
    }

    #[test]
    fn test_update_and_remove() {
        let backing = Arc::new(RecordingBacking::new());
        let mut book = ContactBook::load(backing.clone(), ContactList::Customers);

        let mut draft = ContactDraft::new("吉祥量販");
        draft.kind = "超市".to_string();
        assert_eq!(book.update(OptionId(2), draft.clone()), Ok(true));
        assert_eq!(book.contacts()[1].name, "吉祥量販");
        assert_eq!(book.contacts()[1].contact, "");

        assert_eq!(book.update(OptionId(99), draft), Ok(false));
        assert_eq!(
            book.update(OptionId(2), ContactDraft::new(" ")),
            Err(ValidationError::EmptyField("Name"))
        );
        assert_eq!(backing.write_count(), 1);

        assert!(book.remove(OptionId(1)));
        assert!(!book.remove(OptionId(1)));
        assert_eq!(book.len(), 4);
    }

    #[test]
    fn test_reorder_moves_whole_contact() {
        let backing = Arc::new(MemoryBacking::new());
        let mut book = ContactBook::load(backing, ContactList::FeedSuppliers);

        book.reorder(0, 2).unwrap();
        assert_eq!(names(&book), vec!["吉祥飼料廠", "永豐飼料", "農友飼料行", "其他"]);
        assert_eq!(book.contacts()[2].kind, "飼料行");
        assert_eq!(
            book.reorder(0, 9).unwrap_err(),
            OptionSetError::IndexOutOfRange { index: 9, len: 4 }
        );
    }

    #[test]
    fn test_selected_customer_is_remembered() {
        let backing = Arc::new(MemoryBacking::new());
        let mut book = ContactBook::load(backing.clone(), ContactList::Customers);
        assert!(book.selected().is_none());

        assert_eq!(book.select(OptionId(3)).unwrap().name, "永豐餐廳");
        assert!(book.select(OptionId(42)).is_none());

        let reloaded = ContactBook::load(backing.clone(), ContactList::Customers);
        assert_eq!(reloaded.selected().unwrap().id, OptionId(3));
        assert!(backing.contains(SELECTED_CUSTOMER).unwrap());

        let mut book = reloaded;
        book.remove(OptionId(3));
        assert!(book.selected().is_none());
    }

    #[test]
    fn test_supplier_list_keeps_no_selection() {
        let backing = Arc::new(MemoryBacking::new());
        let mut book = ContactBook::load(backing.clone(), ContactList::FeedSuppliers);

        assert!(book.select(OptionId(1)).is_some());
        assert!(book.selected().is_none());
        assert_eq!(backing.keys().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ContactList::from_name("customers"), Some(ContactList::Customers));
        assert_eq!(
            ContactList::from_name("chicken_farm_feed_suppliers"),
            Some(ContactList::FeedSuppliers)
        );
        assert_eq!(ContactList::from_name("breeds"), None);
    }
}
