//! Email copy for contact submissions.
//!
//! Every user-supplied value is HTML-escaped before it is placed in an HTML
//! body. Plain-text bodies carry the raw values.

use std::borrow::Cow;

use folio_core::{mail::OutgoingEmail, submission::ContactSubmission};

/// Site details used in email copy.
#[derive(Debug, Clone)]
pub struct SiteInfo {
  /// Display name of the site owner, used in signatures and footers.
  pub owner_name:  String,
  /// Recipient of admin notifications.
  pub admin_email: String,
  /// Linked from the confirmation email when set.
  pub site_url:    Option<String>,
}

const HEADER_STYLE: &str = "background:#4f46e5;padding:28px 24px;text-align:center;color:#fff";
const CARD_STYLE: &str =
  "background:#f8fafc;border:1px solid #e2e8f0;border-radius:8px;padding:20px;margin-bottom:24px";
const FOOTER_STYLE: &str =
  "background:#f8fafc;padding:16px;text-align:center;border-top:1px solid #e2e8f0;font-size:12px;color:#94a3b8";

// ─── Admin notification ──────────────────────────────────────────────────────

/// The email telling the site owner about a new submission. `Reply-To` is
/// the submitter, so replying from a mail client answers them directly.
pub fn admin_notification(site: &SiteInfo, submission: &ContactSubmission) -> OutgoingEmail {
  let subject = match &submission.subject {
    Some(s) => format!("📬 New Contact: {s}"),
    None => format!("📬 New Contact from {}", submission.name),
  };
  let received = submission.created_at.format("%Y-%m-%d %H:%M UTC");
  let topic = submission.subject.as_deref().unwrap_or("(no subject)");

  let text = format!(
    "You have a new contact form submission:\n\n\
     Name: {name}\n\
     Email: {email}\n\
     Subject: {topic}\n\
     Received: {received}\n\n\
     Message:\n{message}\n\n\
     ---\n\
     Reply to: {email}\n",
    name = submission.name,
    email = submission.email,
    message = submission.message,
  );

  let name = html_escape(&submission.name);
  let email = html_escape(&submission.email);
  let html = page(
    "New Contact Form Submission",
    &format!(
      "<div style=\"{HEADER_STYLE}\">\
         <h1 style=\"margin:0;font-size:24px\">New Contact Form Submission</h1>\
         <p style=\"margin:8px 0 0;font-size:14px\">{received}</p>\
       </div>\
       <div style=\"padding:32px 24px\">\
         <div style=\"{CARD_STYLE}\">\
           <h3 style=\"margin:0 0 4px\">{name}</h3>\
           <p style=\"margin:0 0 16px;color:#64748b\">{email}</p>\
           <h4 style=\"margin:0 0 12px\">{topic}</h4>\
           <p style=\"margin:0;line-height:1.6;white-space:pre-line\">{message}</p>\
         </div>\
         <p style=\"text-align:center\">\
           <a href=\"mailto:{email}\" style=\"background:#4f46e5;color:#fff;padding:12px 24px;border-radius:6px;text-decoration:none\">\
             Reply to {first}</a>\
         </p>\
       </div>\
       <div style=\"{FOOTER_STYLE}\">Sent via the {owner} contact form</div>",
      topic = html_escape(topic),
      message = html_escape(&submission.message),
      first = html_escape(submission.first_name()),
      owner = html_escape(&site.owner_name),
    ),
  );

  OutgoingEmail::new(site.admin_email.clone(), subject, html)
    .with_text(text)
    .with_reply_to(submission.email.clone())
}

// ─── Confirmation ────────────────────────────────────────────────────────────

/// The acknowledgement sent to the submitter.
pub fn confirmation(site: &SiteInfo, submission: &ContactSubmission) -> OutgoingEmail {
  let subject = match &submission.subject {
    Some(s) => format!("✅ Message Received - {s}"),
    None => "✅ Message Received".to_owned(),
  };
  let received = submission.created_at.format("%Y-%m-%d %H:%M UTC");
  let topic = submission.subject.as_deref().unwrap_or("(no subject)");

  let mut text = format!(
    "Hi {first},\n\n\
     Thank you for reaching out! I've received your message and will get back to you as soon as possible.\n\n\
     --- Message Details ---\n\
     Subject: {topic}\n\
     Date: {received}\n\n\
     Your Message:\n{message}\n\n",
    first = submission.first_name(),
    message = submission.message,
  );
  if let Some(url) = &site.site_url {
    text.push_str(&format!("In the meantime, feel free to explore my portfolio: {url}\n\n"));
  }
  text.push_str(&format!(
    "Warm regards,\n{owner}\n\n--\nThis is an automated message. Please do not reply to this email.\n",
    owner = site.owner_name,
  ));

  let link = site
    .site_url
    .as_deref()
    .map(|url| {
      format!(
        "<p style=\"text-align:center\">In the meantime, feel free to explore my portfolio:<br>\
           <a href=\"{url}\" style=\"color:#4f46e5;text-decoration:none\">Visit My Portfolio →</a></p>",
        url = html_escape(url),
      )
    })
    .unwrap_or_default();

  let html = page(
    "Thank You for Contacting Me",
    &format!(
      "<div style=\"{HEADER_STYLE}\">\
         <h1 style=\"margin:0;font-size:28px\">Message Received!</h1>\
         <p style=\"margin:8px 0 0;font-size:15px\">Thank you for reaching out, {first}!</p>\
       </div>\
       <div style=\"padding:32px 24px\">\
         <div style=\"{CARD_STYLE}\">\
           <p style=\"margin:0 0 8px;font-weight:500\">{topic}</p>\
           <p style=\"margin:0;line-height:1.6;white-space:pre-line\">{message}</p>\
           <p style=\"margin:16px 0 0;font-size:14px;color:#64748b\">{received}</p>\
         </div>\
         <p style=\"text-align:center;line-height:1.6\">\
           I've received your message and will get back to you as soon as possible.\
         </p>\
         {link}\
       </div>\
       <div style=\"{FOOTER_STYLE}\">\
         This is an automated message. Please do not reply to this email.<br>{owner}\
       </div>",
      first = html_escape(submission.first_name()),
      topic = html_escape(topic),
      message = html_escape(&submission.message),
      owner = html_escape(&site.owner_name),
    ),
  );

  OutgoingEmail::new(submission.email.clone(), subject, html).with_text(text)
}

/// A short message for checking provider configuration.
pub fn test_message(owner_name: &str, to: &str) -> OutgoingEmail {
  let owner = html_escape(owner_name);
  OutgoingEmail::new(
    to,
    format!("Test email from {owner_name}"),
    page(
      "Test email",
      &format!("<div style=\"padding:24px\"><p>Mail delivery for {owner} is working.</p></div>"),
    ),
  )
  .with_text(format!("Mail delivery for {owner_name} is working.\n"))
}

fn page(title: &str, body: &str) -> String {
  format!(
    "<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><title>{title}</title></head>\
     <body style=\"font-family:'Segoe UI',Tahoma,sans-serif;margin:0;background:#f5f7ff;color:#333\">\
     <div style=\"max-width:600px;margin:20px auto;background:#fff;border-radius:12px;overflow:hidden\">\
     {body}</div></body></html>"
  )
}

/// Escape the five HTML-significant characters. Borrows when there is
/// nothing to escape.
pub fn html_escape(input: &str) -> Cow<'_, str> {
  if !input.contains(['&', '<', '>', '"', '\'']) {
    return Cow::Borrowed(input);
  }
  let mut out = String::with_capacity(input.len() + 16);
  for c in input.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#x27;"),
      c => out.push(c),
    }
  }
  Cow::Owned(out)
}
