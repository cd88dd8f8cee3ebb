use account_service::store::{DatabaseSettings, PgAccountStore, StoreError};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use common_auth::Role;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(about = "Change the role of an existing account", long_about = None)]
struct Options {
    /// Email of the account to update
    #[arg(long = "email", value_name = "EMAIL")]
    email: String,

    /// Role to assign (user or admin)
    #[arg(long = "role", value_name = "ROLE", default_value = "admin")]
    role: Role,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Options::parse();
    let email = opts.email.trim();
    if email.is_empty() {
        return Err(anyhow!("--email must not be empty"));
    }

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set for set-role")?;
    let settings = DatabaseSettings {
        url: database_url,
        max_connections: 1,
        min_connections: 0,
        max_lifetime: Duration::from_secs(60),
    };

    let store = PgAccountStore::connect(&settings)
        .await
        .context("Failed to connect to Postgres")?;

    match store.set_role(email, opts.role).await {
        Ok(()) => {
            println!("{email} now has role {}", opts.role);
            Ok(())
        }
        Err(StoreError::NotFound) => Err(anyhow!("no account registered for {email}")),
        Err(err) => Err(err).context("Failed to update role"),
    }
}
