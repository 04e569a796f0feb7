//! Command line and environment configuration.

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cookbook-server", about = "REST API server for Cookbook recipes")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub config: ServerConfig,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Serve the recipes API (the default)
    Serve,
    /// Apply the database schema and exit
    Migrate,
}

#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "BIND_HOST", global = true)]
    pub bind_host: String,

    /// HTTP port for the recipes API
    #[arg(long, default_value = "8000", env = "PORT", global = true)]
    pub port: u16,

    /// PostgreSQL connection URL. Recipes are kept in memory when unset.
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections
    #[arg(long, default_value = "5", env = "DB_MAX_CONNECTIONS", global = true)]
    pub max_connections: u32,

    /// Do not apply the schema on startup
    #[arg(long, env = "SKIP_MIGRATIONS", global = true)]
    pub skip_migrations: bool,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    /// The database URL with any password masked, safe to log.
    pub fn redacted_database_url(&self) -> Option<String> {
        let raw = self.database_url.as_deref()?;
        match url::Url::parse(raw) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    // only fails for URLs that cannot carry credentials
                    let _ = parsed.set_password(Some("****"));
                }
                Some(parsed.to_string())
            }
            Err(_) => Some("<unparseable database url>".to_string()),
        }
    }
}
