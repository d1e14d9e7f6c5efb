use anyhow::Result;
use inquire::{Select, Text};

use flock_core::{ContactDraft, OptionDraft, OptionItem};

/// Prompts the user for a new option
pub fn prompt_new_option() -> Result<OptionDraft> {
    let label = Text::new("Label:")
        .with_validator(inquire::required!("Label is required"))
        .prompt()?;

    // The value usually matches the label
    let value = Text::new("Value:")
        .with_default(&label)
        .with_validator(inquire::required!("Value is required"))
        .prompt()?;

    Ok(OptionDraft::new(label, value))
}

/// Lets the user pick one option, returning its value. The cursor starts on
/// `current` when it is in the list.
pub fn prompt_pick(title: &str, options: &[OptionItem], current: &str) -> Result<String> {
    if options.is_empty() {
        return Ok(Text::new(&format!("{}:", title)).with_default(current).prompt()?);
    }

    let labels: Vec<String> = options.iter().map(|o| o.label.clone()).collect();
    let start = options.iter().position(|o| o.value == current).unwrap_or(0);

    let picked = Select::new(&format!("{}:", title), labels)
        .with_starting_cursor(start)
        .raw_prompt()?;

    Ok(options[picked.index].value.clone())
}

/// Asks for one required line of text
pub fn prompt_text(title: &str) -> Result<String> {
    Ok(Text::new(&format!("{}:", title))
        .with_validator(inquire::required!("This field is required"))
        .prompt()?)
}

/// Prompts for a new contact, starting from whatever was given on the
/// command line
pub fn prompt_new_contact(kinds: &[OptionItem], draft: ContactDraft) -> Result<ContactDraft> {
    let name = Text::new("Name:")
        .with_default(&draft.name)
        .with_validator(inquire::required!("Name is required"))
        .prompt()?;

    let kind = if draft.kind.is_empty() {
        prompt_pick("Type", kinds, "")?
    } else {
        draft.kind
    };

    let contact = Text::new("Phone:").with_default(&draft.contact).prompt()?;
    let address = Text::new("Address:").with_default(&draft.address).prompt()?;

    Ok(ContactDraft {
        name,
        kind,
        contact,
        address,
    })
}
