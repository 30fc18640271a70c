//! folio-server binary.
//!
//! Reads `folio.toml` (or the path given with `--config`) overlaid with
//! `FOLIO_*` environment variables, opens the SQLite store, and serves the
//! contact API over HTTP.
//!
//! # Helper commands
//!
//! ```text
//! folio-server hash-password          # argon2 hash for admin_auth.password_hash
//! folio-server send-test --to ADDR    # check the mail provider
//! folio-server gmail-authorize        # obtain a Gmail refresh token
//! ```
//!
//! Environment keys use `__` between nested tables, e.g.
//! `FOLIO_MAIL__PROVIDER=smtp`, and `,` between list items, e.g.
//! `FOLIO_CORS_ORIGINS=https://a.example,https://b.example`.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Parser, Subcommand};
use folio_api::{AppState, ServerConfig};
use folio_core::mail::Mailer as _;
use folio_mail::{MailBackend, MailConfig, oauth, templates};
use folio_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Folio contact API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, global = true, default_value = "folio.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Run the HTTP API (the default).
  Serve,
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
  /// Send a test email through the configured provider.
  SendTest {
    /// Recipient address.
    #[arg(long)]
    to: String,
  },
  /// Run the Gmail OAuth consent flow and write the token file.
  GmailAuthorize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command.unwrap_or(Command::Serve) {
    Command::HashPassword => hash_password(),
    Command::Serve => serve(load_config(&cli.config)?).await,
    Command::SendTest { to } => send_test(load_config(&cli.config)?, &to).await,
    Command::GmailAuthorize => gmail_authorize(load_config(&cli.config)?).await,
  }
}

fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  load_config_with_env(path, None)
}

/// File first, then environment; later sources win. `env` replaces the
/// process environment when given.
fn load_config_with_env(
  path: &Path,
  env: Option<config::Map<String, String>>,
) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(
      config::Environment::with_prefix("FOLIO")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("cors_origins")
        .try_parsing(true)
        .source(env),
    )
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

// ─── serve ───────────────────────────────────────────────────────────────────

async fn serve(server_cfg: ServerConfig) -> anyhow::Result<()> {
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let mailer = build_mailer(&server_cfg)?;
  match mailer.verify().await {
    Ok(()) => tracing::info!(provider = mailer.kind(), "mail provider ready"),
    Err(e) => tracing::warn!(
      provider = mailer.kind(),
      error = %e,
      "mail provider check failed; submissions will still be recorded"
    ),
  }

  let sender = mailer.sender_address();
  if server_cfg.admin_email.is_none() && sender.is_none() {
    tracing::warn!("no admin_email configured; admin notifications have no recipient");
  }
  if server_cfg.admin_auth.is_none() {
    tracing::warn!("admin_auth not configured; /api/contacts is readable by anyone");
  }

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = folio_api::router(AppState::new(store, mailer, server_cfg, sender));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

fn build_mailer(server_cfg: &ServerConfig) -> anyhow::Result<MailBackend> {
  let mut mail = server_cfg.mail.clone();
  if let MailConfig::Gmail(gmail) = &mut mail {
    gmail.token_path = expand_tilde(&gmail.token_path);
  }
  MailBackend::from_config(&mail, &server_cfg.owner_name).context("invalid mail configuration")
}

// ─── helpers ─────────────────────────────────────────────────────────────────

fn hash_password() -> anyhow::Result<()> {
  let password = prompt("Password: ")?;
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
    .to_string();
  println!("{hash}");
  Ok(())
}

async fn send_test(server_cfg: ServerConfig, to: &str) -> anyhow::Result<()> {
  let mailer = build_mailer(&server_cfg)?;
  if matches!(mailer, MailBackend::Disabled) {
    bail!("no mail provider configured; set mail.provider to \"smtp\" or \"gmail\"");
  }

  let email = templates::test_message(&server_cfg.owner_name, to);
  mailer
    .send(&email)
    .await
    .with_context(|| format!("failed to send test email via {}", mailer.kind()))?;
  println!("Test email sent to {to} via {}", mailer.kind());
  Ok(())
}

async fn gmail_authorize(server_cfg: ServerConfig) -> anyhow::Result<()> {
  let MailConfig::Gmail(gmail) = &server_cfg.mail else {
    bail!("mail.provider must be \"gmail\" to run gmail-authorize");
  };

  let http = reqwest::Client::new();
  let client = gmail.oauth_client();
  let url = client.authorize_url(&http)?;
  println!("Authorize this app by visiting this url:\n\n{url}\n");

  let code = prompt("Enter the code from that page here: ")?;
  let token = client
    .exchange_code(&http, code.trim())
    .await
    .context("failed to exchange authorization code")?;

  let path = expand_tilde(&gmail.token_path);
  oauth::save_token(&path, &token)
    .await
    .with_context(|| format!("failed to write {}", path.display()))?;
  println!("Token stored to {}", path.display());

  if token.refresh_token.is_none() {
    eprintln!(
      "warning: no refresh token was returned; revoke the app's access in your Google account and run this again"
    );
  }
  Ok(())
}

/// Print `label` and read one line from stdin (no echo suppression).
fn prompt(label: &str) -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("{label}");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.owner_name, "Portfolio");
    assert!(matches!(cfg.mail, MailConfig::Disabled));
  }

  #[test]
  fn file_values_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folio.toml");
    std::fs::write(
      &path,
      r#"
        port = 8080
        owner_name = "Jane Doe"
        cors_origins = ["https://jane.example.com"]

        [validation]
        min_message_len = 10

        [mail]
        provider = "smtp"
        host = "smtp.example.com"
        username = "jane@example.com"
        security = "tls"
      "#,
    )
    .unwrap();

    let cfg = load_config(&path).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.owner_name, "Jane Doe");
    assert_eq!(cfg.cors_origins, ["https://jane.example.com"]);
    assert_eq!(cfg.validation.min_message_len, 10);
    let MailConfig::Smtp(smtp) = &cfg.mail else { panic!("expected smtp") };
    assert_eq!(smtp.port, 587);
    assert_eq!(build_mailer(&cfg).unwrap().kind(), "smtp");
  }

  #[test]
  fn numeric_env_values_fill_string_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folio.toml");
    std::fs::write(
      &path,
      r#"
        [mail]
        provider = "smtp"
        host = "smtp.example.com"
        username = "jane@example.com"
      "#,
    )
    .unwrap();

    let env = config::Map::from([
      ("FOLIO_MAIL__PASSWORD".to_owned(), "123456".to_owned()),
      ("FOLIO_PORT".to_owned(), "8081".to_owned()),
      (
        "FOLIO_CORS_ORIGINS".to_owned(),
        "https://a.example,https://b.example".to_owned(),
      ),
    ]);
    let cfg = load_config_with_env(&path, Some(env)).unwrap();
    assert_eq!(cfg.port, 8081);
    assert_eq!(cfg.cors_origins, ["https://a.example", "https://b.example"]);
    let MailConfig::Smtp(smtp) = &cfg.mail else { panic!("expected smtp") };
    assert_eq!(smtp.password, "123456");
    assert_eq!(smtp.username, "jane@example.com");
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/folio.sqlite3")),
      PathBuf::from(home).join("folio.sqlite3")
    );
    assert_eq!(expand_tilde(Path::new("/tmp/x")), PathBuf::from("/tmp/x"));
  }
}
