use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::conversations::matches_query;
use crate::error::CoreError;
use crate::models::{Contact, PermissionStatus};

/// Device address book.
pub trait ContactSource {
    fn request_permission(&self) -> Result<PermissionStatus, CoreError>;
    fn fetch_contacts(&self) -> Result<Vec<Contact>, CoreError>;
}

/// Keeps digits and a leading `+`, dropping spaces, dashes and brackets.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        out.push('+');
    }
    out.extend(trimmed.chars().filter(|c| c.is_ascii_digit()));
    out
}

/// Stable identifier for a contact derived from its primary phone number.
pub fn contact_key(contact: &Contact) -> Option<String> {
    let phone = normalize_phone(contact.primary_phone()?);
    if phone.trim_start_matches('+').is_empty() {
        return None;
    }
    let mut hasher = Sha256::new();
    hasher.update(phone.as_bytes());
    Some(format!("ph:{}", hex::encode(hasher.finalize())))
}

/// Collapses contacts sharing a primary phone number.
///
/// Contacts without a number are dropped. For duplicates the last contact wins,
/// while the list keeps the position of the number's first occurrence.
pub fn dedupe_by_phone(contacts: Vec<Contact>) -> Vec<Contact> {
    let mut order: Vec<String> = Vec::new();
    let mut by_phone: HashMap<String, Contact> = HashMap::new();
    for contact in contacts {
        let Some(phone) = contact.primary_phone().map(normalize_phone) else {
            continue;
        };
        if phone.trim_start_matches('+').is_empty() {
            continue;
        }
        if !by_phone.contains_key(&phone) {
            order.push(phone.clone());
        }
        by_phone.insert(phone, contact);
    }
    order
        .into_iter()
        .filter_map(|phone| by_phone.remove(&phone))
        .collect()
}

/// Reads the address book for the new-chat picker.
pub fn load_contacts<S: ContactSource + ?Sized>(source: &S) -> Result<Vec<Contact>, CoreError> {
    if source.request_permission()? != PermissionStatus::Granted {
        return Err(CoreError::PermissionDenied("We need access to your contacts.".to_string()));
    }
    let contacts = source.fetch_contacts()?;
    if contacts.is_empty() {
        return Err(CoreError::NoContacts);
    }
    debug!(count = contacts.len(), "contacts loaded");
    Ok(contacts)
}

/// Contacts that can be called: one entry per phone number.
pub fn load_callable_contacts<S: ContactSource + ?Sized>(source: &S) -> Result<Vec<Contact>, CoreError> {
    let contacts = dedupe_by_phone(load_contacts(source)?);
    debug!(count = contacts.len(), "callable contacts");
    Ok(contacts)
}

/// Contacts offered for a new chat: not already a conversation, matching `search`.
pub fn pickable_contacts<'a>(contacts: &'a [Contact], existing_names: &[&str], search: &str) -> Vec<&'a Contact> {
    contacts
        .iter()
        .filter(|c| {
            let name = c.display_name();
            matches_query(name, search) && !existing_names.contains(&name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: &str, name: &str, phones: &[&str]) -> Contact {
        Contact {
            id: id.to_string(),
            name: Some(name.to_string()),
            phone_numbers: phones.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn normalize_strips_formatting() {
        assert_eq!(normalize_phone(" +92 (300) 123-4567 "), "+923001234567");
        assert_eq!(normalize_phone("0300-1234567"), "03001234567");
    }

    #[test]
    fn dedupe_keeps_last_contact_at_first_position() {
        let contacts = vec![
            contact("1", "Ali", &["+92 300 1111111"]),
            contact("2", "Sara", &["+92 300 2222222"]),
            contact("3", "Ali (work)", &["+923001111111"]),
            contact("4", "Nobody", &[]),
        ];
        let unique = dedupe_by_phone(contacts);
        let ids: Vec<&str> = unique.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[test]
    fn contact_key_ignores_formatting() {
        let a = contact("1", "Ali", &["+92 300 1111111"]);
        let b = contact("2", "Ali", &["+923001111111"]);
        assert_eq!(contact_key(&a), contact_key(&b));
        assert!(contact_key(&contact("3", "x", &[])).is_none());
    }

    #[test]
    fn picker_hides_existing_chats() {
        let contacts = vec![
            contact("1", "Ayesha", &["1"]),
            contact("2", "Zara", &["2"]),
            contact("3", "Zainab", &["3"]),
        ];
        let names: Vec<&str> = pickable_contacts(&contacts, &["Ayesha", "Zara"], "z")
            .iter()
            .map(|c| c.display_name())
            .collect();
        assert_eq!(names, vec!["Zainab"]);
    }

    struct Book {
        permission: PermissionStatus,
        contacts: Vec<Contact>,
    }

    impl ContactSource for Book {
        fn request_permission(&self) -> Result<PermissionStatus, CoreError> {
            Ok(self.permission)
        }

        fn fetch_contacts(&self) -> Result<Vec<Contact>, CoreError> {
            Ok(self.contacts.clone())
        }
    }

    #[test]
    fn loading_reports_denial_and_empty_book() {
        let denied = Book {
            permission: PermissionStatus::Denied,
            contacts: vec![contact("1", "Ali", &["1"])],
        };
        let err = load_contacts(&denied).unwrap_err();
        assert_eq!(err.to_string(), "We need access to your contacts.");

        let empty = Book {
            permission: PermissionStatus::Granted,
            contacts: vec![],
        };
        assert!(matches!(load_contacts(&empty), Err(CoreError::NoContacts)));
    }

    #[test]
    fn callable_contacts_need_a_number() {
        let book = Book {
            permission: PermissionStatus::Granted,
            contacts: vec![contact("1", "Ali", &["0300 1"]), contact("2", "Sara", &[])],
        };
        assert_eq!(load_contacts(&book).expect("load").len(), 2);
        assert_eq!(load_callable_contacts(&book).expect("load").len(), 1);
    }
}
