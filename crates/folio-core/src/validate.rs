//! Contact-form validation.
//!
//! Which fields are mandatory, and how long they must be, differs between
//! deployments, so the rules are plain configuration rather than constants.
//! Validation always accumulates every violation before returning.

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::submission::NewSubmission;

// ─── Input ───────────────────────────────────────────────────────────────────

/// The raw JSON body of `POST /api/contact`.
///
/// Every field is optional at the type level so that a missing field is
/// reported as a validation error rather than a deserialisation failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
  #[serde(default)]
  pub name:    Option<String>,
  #[serde(default)]
  pub email:   Option<String>,
  #[serde(default)]
  pub subject: Option<String>,
  #[serde(default)]
  pub message: Option<String>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A single field-level violation. Serialises to the
/// `{msg, param, value, location}` shape the web client expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub msg:      String,
  pub param:    &'static str,
  pub value:    String,
  pub location: &'static str,
}

impl FieldError {
  fn body(param: &'static str, value: Option<&str>, msg: impl Into<String>) -> Self {
    Self {
      msg: msg.into(),
      param,
      value: value.unwrap_or_default().to_owned(),
      location: "body",
    }
  }
}

/// Every violation found in one form, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
  pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.0.iter().map(|e| e.param)
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// Field requirements for contact submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
  /// Reject submissions without a non-blank `subject`.
  pub require_subject: bool,
  /// Minimum trimmed length of `name`, in characters.
  pub min_name_len:    usize,
  /// Minimum trimmed length of `message`, in characters.
  pub min_message_len: usize,
}

impl Default for ValidationRules {
  fn default() -> Self {
    Self {
      require_subject: false,
      min_name_len:    1,
      min_message_len: 1,
    }
  }
}

impl ValidationRules {
  /// Validate `form`, returning the trimmed [`NewSubmission`] or every
  /// violation found.
  pub fn validate(&self, form: ContactForm) -> Result<NewSubmission, ValidationErrors> {
    let mut errors = Vec::new();

    let name = trimmed(&form.name);
    match name {
      None => errors.push(FieldError::body("name", form.name.as_deref(), "Name is required")),
      Some(n) if n.chars().count() < self.min_name_len => errors.push(FieldError::body(
        "name",
        form.name.as_deref(),
        format!("Name must be at least {} characters", self.min_name_len),
      )),
      Some(_) => {}
    }

    let email = trimmed(&form.email);
    if !email.is_some_and(is_email) {
      errors.push(FieldError::body(
        "email",
        form.email.as_deref(),
        "Please provide a valid email",
      ));
    }

    let subject = trimmed(&form.subject);
    if self.require_subject && subject.is_none() {
      errors.push(FieldError::body(
        "subject",
        form.subject.as_deref(),
        "Subject is required",
      ));
    }

    let message = trimmed(&form.message);
    match message {
      None => errors.push(FieldError::body(
        "message",
        form.message.as_deref(),
        "Message is required",
      )),
      Some(m) if m.chars().count() < self.min_message_len => errors.push(FieldError::body(
        "message",
        form.message.as_deref(),
        format!("Message must be at least {} characters", self.min_message_len),
      )),
      Some(_) => {}
    }

    match (name, email, message) {
      (Some(name), Some(email), Some(message)) if errors.is_empty() => Ok(NewSubmission {
        name:    name.to_owned(),
        email:   email.to_owned(),
        subject: subject.map(str::to_owned),
        message: message.to_owned(),
      }),
      _ => Err(ValidationErrors(errors)),
    }
  }
}

/// A bare `local@domain.tld` address that mail transports accept as-is.
///
/// RFC 5322 also allows display-name forms (`Ada <a@b.c>`), quoted local
/// parts (`"a b"@c.d`), domain literals (`a@[1.2.3.4]`) and single-label
/// domains. All of those are rejected: the local part must be a dot-atom
/// and the domain an ASCII hostname.
fn is_email(s: &str) -> bool {
  let Some((local, domain)) = s.rsplit_once('@') else {
    return false;
  };
  local.chars().all(is_atext_or_dot)
    && domain.contains('.')
    && domain
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    && EmailAddress::is_valid(s)
}

fn is_atext_or_dot(c: char) -> bool {
  c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~.".contains(c)
}

/// `Some(trimmed)` when the field is present and not blank.
fn trimmed(field: &Option<String>) -> Option<&str> {
  field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form(name: &str, email: &str, subject: Option<&str>, message: &str) -> ContactForm {
    ContactForm {
      name:    Some(name.into()),
      email:   Some(email.into()),
      subject: subject.map(Into::into),
      message: Some(message.into()),
    }
  }

  #[test]
  fn valid_form_is_trimmed() {
    let rules = ValidationRules::default();
    let new = rules
      .validate(form("  Ada Lovelace ", " ada@example.com", Some(" Hi "), "Hello!\n"))
      .unwrap();
    assert_eq!(new.name, "Ada Lovelace");
    assert_eq!(new.email, "ada@example.com");
    assert_eq!(new.subject.as_deref(), Some("Hi"));
    assert_eq!(new.message, "Hello!");
  }

  #[test]
  fn blank_subject_becomes_none_when_optional() {
    let rules = ValidationRules::default();
    let new = rules
      .validate(form("Ada", "ada@example.com", Some("   "), "Hello"))
      .unwrap();
    assert_eq!(new.subject, None);
  }

  #[test]
  fn all_violations_are_accumulated() {
    let rules = ValidationRules::default();
    let err = rules.validate(form("", "bad", None, "")).unwrap_err();
    let fields: Vec<_> = err.fields().collect();
    assert_eq!(fields, vec!["name", "email", "message"]);
    assert!(err.0.iter().all(|e| e.location == "body"));
    assert_eq!(err.0[1].value, "bad");
  }

  #[test]
  fn missing_fields_are_reported() {
    let rules = ValidationRules {
      require_subject: true,
      ..Default::default()
    };
    let err = rules.validate(ContactForm::default()).unwrap_err();
    let fields: Vec<_> = err.fields().collect();
    assert_eq!(fields, vec!["name", "email", "subject", "message"]);
    assert_eq!(err.0[0].msg, "Name is required");
  }

  #[test]
  fn required_subject_rejects_blank() {
    let rules = ValidationRules {
      require_subject: true,
      ..Default::default()
    };
    let err = rules
      .validate(form("Ada", "ada@example.com", Some(" "), "Hello"))
      .unwrap_err();
    assert_eq!(err.fields().collect::<Vec<_>>(), vec!["subject"]);
  }

  #[test]
  fn minimum_lengths_count_characters() {
    let rules = ValidationRules {
      require_subject: false,
      min_name_len:    2,
      min_message_len: 10,
    };
    let err = rules
      .validate(form("A", "ada@example.com", None, "too short"))
      .unwrap_err();
    assert_eq!(err.fields().collect::<Vec<_>>(), vec!["name", "message"]);
    assert_eq!(err.0[1].msg, "Message must be at least 10 characters");

    // Multi-byte characters count once each.
    assert!(rules
      .validate(form("Zoë", "zoe@example.com", None, "ééééééééééé"))
      .is_ok());
  }

  #[test]
  fn malformed_emails_are_rejected() {
    let rules = ValidationRules::default();
    for bad in [
      "plainaddress",
      "@example.com",
      "ada@",
      "ada@localhost",
      "Ada <ada@example.com>",
      "\"a b\"@example.com",
      "a@[1.2.3.4]",
      "ada@exa_mple.com",
    ] {
      let err = rules.validate(form("Ada", bad, None, "Hello")).unwrap_err();
      assert_eq!(err.fields().collect::<Vec<_>>(), vec!["email"], "{bad}");
    }
  }

  #[test]
  fn dot_atom_addresses_are_accepted() {
    let rules = ValidationRules::default();
    for good in ["ada.lovelace@example.com", "ada+folio@mail.example.co.uk", "o'neil@example.com"] {
      assert!(rules.validate(form("Ada", good, None, "Hello")).is_ok(), "{good}");
    }
  }
}
