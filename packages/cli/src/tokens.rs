// ABOUTME: `flagpost tokens` subcommands for managing API tokens
// ABOUTME: Output is a table for people or JSON for scripts

use std::collections::HashSet;
use std::io::Write;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use flagpost_security::{ApiToken, ApiTokenCreate, ApiTokenStore, ApiTokenType, TokenScope};

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum TokensCommands {
    /// Issue a new token with a caller-supplied secret
    Create {
        #[arg(long)]
        secret: String,
        #[arg(long)]
        username: String,
        #[arg(long = "type", value_parser = parse_token_type)]
        token_type: ApiTokenType,
        /// Project name, or * for every project
        #[arg(long, default_value = "*")]
        project: String,
        /// Environment name, or * for every environment
        #[arg(long, default_value = "*")]
        environment: String,
        /// RFC 3339 timestamp; omit for a token that never expires
        #[arg(long, value_parser = parse_timestamp)]
        expires_at: Option<DateTime<Utc>>,
    },
    /// List tokens
    List {
        /// Only tokens that have not expired
        #[arg(long)]
        active: bool,
    },
    /// Show a single token
    Get { secret: String },
    /// Check whether a secret is known
    Exists { secret: String },
    /// Number of stored tokens, expired ones included
    Count,
    /// Set a token's expiry (defaults to now, which revokes it)
    Expire {
        secret: String,
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<DateTime<Utc>>,
    },
    /// Delete a token
    Delete { secret: String },
    /// Delete every token
    Purge {
        #[arg(long)]
        yes: bool,
    },
    /// Record that the given secrets were just used
    Touch {
        #[arg(required = true)]
        secrets: Vec<String>,
    },
}

impl TokensCommands {
    pub async fn execute(
        &self,
        store: &dyn ApiTokenStore,
        json: bool,
        out: &mut dyn Write,
    ) -> Result<()> {
        match self {
            TokensCommands::Create {
                secret,
                username,
                token_type,
                project,
                environment,
                expires_at,
            } => {
                let mut draft = ApiTokenCreate::new(secret.as_str(), username.as_str(), *token_type)
                    .with_project(TokenScope::from(project.as_str()))
                    .with_environment(TokenScope::from(environment.as_str()));
                draft.expires_at = *expires_at;

                let token = store
                    .create(draft)
                    .await
                    .context("Failed to create api token")?;
                write_tokens(out, json, &[token])
            }
            TokensCommands::List { active } => {
                let tokens = if *active {
                    store.get_active().await
                } else {
                    store.get_all().await
                };
                let tokens = tokens.context("Failed to list api tokens")?;
                write_tokens(out, json, &tokens)
            }
            TokensCommands::Get { secret } => {
                let token = store
                    .get(secret)
                    .await
                    .with_context(|| format!("Failed to load api token {secret}"))?;
                write_tokens(out, json, &[token])
            }
            TokensCommands::Exists { secret } => {
                let exists = store.exists(secret).await?;
                writeln!(out, "{exists}")?;
                Ok(())
            }
            TokensCommands::Count => {
                let count = store.count().await?;
                writeln!(out, "{count}")?;
                Ok(())
            }
            TokensCommands::Expire { secret, at } => {
                let expires_at = at.unwrap_or_else(Utc::now);
                let token = store
                    .set_expiry(secret, expires_at)
                    .await
                    .with_context(|| format!("Failed to expire api token {secret}"))?;
                write_tokens(out, json, &[token])
            }
            TokensCommands::Delete { secret } => {
                store.delete(secret).await?;
                if !json {
                    writeln!(out, "{} Deleted {}", "✓".green().bold(), secret)?;
                }
                Ok(())
            }
            TokensCommands::Purge { yes } => {
                if !yes {
                    bail!("Refusing to delete every api token without --yes");
                }
                let count = store.count().await?;
                store.delete_all().await?;
                if !json {
                    writeln!(out, "{} Deleted {} tokens", "✓".green().bold(), count)?;
                }
                Ok(())
            }
            TokensCommands::Touch { secrets } => {
                let secrets: HashSet<String> = secrets.iter().cloned().collect();
                store.mark_seen_at(&secrets).await;
                Ok(())
            }
        }
    }
}

fn write_tokens(out: &mut dyn Write, json: bool, tokens: &[ApiToken]) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, tokens)?;
        writeln!(out)?;
        return Ok(());
    }

    if tokens.is_empty() {
        writeln!(out, "{}", "No api tokens found".yellow())?;
        return Ok(());
    }

    writeln!(out, "{}", token_table(tokens, Utc::now()))?;
    writeln!(out, "Total: {} tokens", tokens.len().to_string().cyan())?;
    Ok(())
}

pub fn token_table(tokens: &[ApiToken], now: DateTime<Utc>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        "Secret",
        "Username",
        "Type",
        "Project",
        "Environment",
        "Created",
        "Expires",
        "Last seen",
        "Status",
    ]);

    for token in tokens {
        let status = if token.is_active_at(now) {
            "active"
        } else {
            "expired"
        };

        table.add_row(vec![
            token.secret.clone(),
            token.username.clone(),
            token.token_type.to_string(),
            token.project.to_string(),
            token.environment.to_string(),
            format_timestamp(Some(token.created_at)),
            format_timestamp(token.expires_at),
            format_timestamp(token.seen_at),
            status.to_string(),
        ]);
    }

    table
}

fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(timestamp) => timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}

fn parse_token_type(value: &str) -> Result<ApiTokenType, String> {
    value.parse::<ApiTokenType>().map_err(|e| e.to_string())
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}
