//! Conversion from [`OutgoingEmail`] to an RFC 5322 [`Message`].

use folio_core::mail::OutgoingEmail;
use lettre::{
  Message,
  message::{Mailbox, MultiPart, header::ContentType},
};

use crate::{Error, Result};

pub fn parse_mailbox(address: &str) -> Result<Mailbox> {
  address.trim().parse().map_err(|source| Error::Address {
    address: address.to_owned(),
    source,
  })
}

/// A mailbox with a display name, e.g. `"Portfolio" <me@example.com>`.
pub fn named_mailbox(name: &str, address: &str) -> Result<Mailbox> {
  let address = address.trim().parse().map_err(|source| Error::Address {
    address: address.to_owned(),
    source,
  })?;
  Ok(Mailbox::new(Some(name.to_owned()), address))
}

/// Build the message for `email`, sent from `from`.
///
/// `keep_bcc` retains the `Bcc` header in the serialised message. SMTP needs
/// it stripped (recipients travel in the envelope); the Gmail API reads
/// recipients from the headers, so it needs it kept.
pub fn build_message(from: &Mailbox, email: &OutgoingEmail, keep_bcc: bool) -> Result<Message> {
  let mut builder = Message::builder()
    .from(from.clone())
    .subject(email.subject.as_str())
    .date_now();

  for to in email.recipients() {
    builder = builder.to(parse_mailbox(to)?);
  }
  for cc in &email.cc {
    builder = builder.cc(parse_mailbox(cc)?);
  }
  for bcc in &email.bcc {
    builder = builder.bcc(parse_mailbox(bcc)?);
  }
  if let Some(reply_to) = &email.reply_to {
    builder = builder.reply_to(parse_mailbox(reply_to)?);
  }
  if keep_bcc {
    builder = builder.keep_bcc();
  }

  let message = match &email.text {
    Some(text) => builder.multipart(MultiPart::alternative_plain_html(
      text.clone(),
      email.html.clone(),
    ))?,
    None => builder
      .header(ContentType::TEXT_HTML)
      .body(email.html.clone())?,
  };
  Ok(message)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn formatted(message: &Message) -> String {
    String::from_utf8(message.formatted()).unwrap()
  }

  #[test]
  fn headers_are_set() {
    let from = named_mailbox("Portfolio", "me@example.com").unwrap();
    let mut email = OutgoingEmail::new("ada@example.com", "Hello", "<p>Hi</p>")
      .with_reply_to("grace@example.com");
    email.cc.push("cc@example.com".into());

    let raw = formatted(&build_message(&from, &email, false).unwrap());
    assert!(raw.contains("Portfolio") && raw.contains("<me@example.com>"), "{raw}");
    assert!(raw.contains("To: ada@example.com"), "{raw}");
    assert!(raw.contains("Cc: cc@example.com"), "{raw}");
    assert!(raw.contains("Reply-To: grace@example.com"), "{raw}");
    assert!(raw.contains("Subject: Hello"), "{raw}");
    assert!(raw.contains("text/html"), "{raw}");
  }

  #[test]
  fn comma_separated_recipients() {
    let from = parse_mailbox("me@example.com").unwrap();
    let email = OutgoingEmail::new("a@example.com, b@example.com", "Hi", "<p>x</p>");
    let message = build_message(&from, &email, false).unwrap();
    assert_eq!(message.envelope().to().len(), 2);
  }

  #[test]
  fn bcc_is_kept_only_on_request() {
    let from = parse_mailbox("me@example.com").unwrap();
    let mut email = OutgoingEmail::new("a@example.com", "Hi", "<p>x</p>");
    email.bcc.push("hidden@example.com".into());

    let stripped = formatted(&build_message(&from, &email, false).unwrap());
    assert!(!stripped.contains("hidden@example.com"));

    let kept = formatted(&build_message(&from, &email, true).unwrap());
    assert!(kept.contains("Bcc: hidden@example.com"), "{kept}");
  }

  #[test]
  fn text_alternative_makes_multipart() {
    let from = parse_mailbox("me@example.com").unwrap();
    let email = OutgoingEmail::new("a@example.com", "Hi", "<p>x</p>").with_text("x");
    let raw = formatted(&build_message(&from, &email, false).unwrap());
    assert!(raw.contains("multipart/alternative"), "{raw}");
    assert!(raw.contains("text/plain"), "{raw}");
  }

  #[test]
  fn invalid_address_is_reported() {
    let from = parse_mailbox("me@example.com").unwrap();
    let email = OutgoingEmail::new("not an address", "Hi", "<p>x</p>");
    assert!(matches!(
      build_message(&from, &email, false),
      Err(Error::Address { .. })
    ));
  }

  #[test]
  fn every_accepted_submitter_address_builds() {
    use folio_core::validate::{ContactForm, ValidationRules};

    let from = parse_mailbox("me@example.com").unwrap();
    let rules = ValidationRules::default();
    for address in [
      "ada@example.com",
      "o'neil+tag@mail.example.co.uk",
      "\"a b\"@example.com",
      "a@[1.2.3.4]",
      "Ada <ada@example.com>",
    ] {
      let form = ContactForm {
        name:    Some("Ada".into()),
        email:   Some(address.into()),
        subject: None,
        message: Some("Hello".into()),
      };
      let Ok(input) = rules.validate(form) else { continue };

      let notification = OutgoingEmail::new("owner@example.com", "New", "<p>x</p>")
        .with_reply_to(input.email.clone());
      let confirmation = OutgoingEmail::new(input.email, "Thanks", "<p>x</p>");
      assert!(build_message(&from, &notification, false).is_ok(), "{address}");
      assert!(build_message(&from, &confirmation, false).is_ok(), "{address}");
    }
  }
}
