//! Command-line interface for idp-populate
//!
//! # Usage Examples
//!
//! ## Trigger server
//! ```bash
//! # Serve the HTTP trigger endpoint on the in-memory backend
//! idp-populate serve --listen 127.0.0.1:8180
//!
//! # Trigger a run
//! curl 'http://127.0.0.1:8180/create-realms?count=2&users-per-realm=500'
//! ```
//!
//! ## One-shot run
//! ```bash
//! # Populate 1 realm with defaults (25 roles, 30 clients, 200 users)
//! idp-populate populate --count 1
//!
//! # A heavier, chunk-tuned run
//! idp-populate populate --count 5 \
//!   --users-per-realm 10000 --users-per-transaction 500 \
//!   --clients-per-realm 100 --clients-per-transaction 20
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dataset_core::config::{
    DEFAULT_CLIENTS_PER_REALM, DEFAULT_CLIENTS_PER_TRANSACTION, DEFAULT_CLIENT_PREFIX,
    DEFAULT_CLIENT_ROLES_PER_CLIENT, DEFAULT_CLIENT_ROLES_PER_USER, DEFAULT_CLIENT_ROLE_PREFIX,
    DEFAULT_GROUPS_PER_REALM, DEFAULT_GROUPS_PER_USER, DEFAULT_GROUP_PREFIX,
    DEFAULT_PASSWORD_HASH_ITERATIONS, DEFAULT_REALM_PREFIX, DEFAULT_REALM_ROLES_PER_REALM,
    DEFAULT_REALM_ROLES_PER_USER, DEFAULT_REALM_ROLE_PREFIX, DEFAULT_TRANSACTION_TIMEOUT_SECS,
    DEFAULT_USERS_PER_REALM, DEFAULT_USERS_PER_TRANSACTION, DEFAULT_USER_PREFIX,
};
use dataset_core::GenerationConfig;
use identity_store::{MemoryStore, RealmCache};
use idp_populate::{DatasetPopulator, TriggerServer};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "idp-populate")]
#[command(about = "Populate an identity-management backend with synthetic datasets for load testing")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP trigger server (in-memory backend)
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8180")]
        listen: String,
    },

    /// Run one populate pass in-process (in-memory backend)
    Populate {
        #[command(flatten)]
        args: PopulateArgs,
    },
}

/// One flag per generation parameter, defaults matching the HTTP
/// query parameters.
#[derive(Args, Clone, Debug)]
struct PopulateArgs {
    /// Number of realms to create
    #[arg(long)]
    count: u64,

    /// Prefix for realm names
    #[arg(long, default_value = DEFAULT_REALM_PREFIX)]
    realm_prefix: String,

    /// Prefix for realm role names
    #[arg(long, default_value = DEFAULT_REALM_ROLE_PREFIX)]
    realm_role_prefix: String,

    /// Realm roles created in every realm
    #[arg(long, default_value_t = DEFAULT_REALM_ROLES_PER_REALM)]
    realm_roles_per_realm: u64,

    /// Prefix for client ids
    #[arg(long, default_value = DEFAULT_CLIENT_PREFIX)]
    client_prefix: String,

    /// Clients created in every realm
    #[arg(long, default_value_t = DEFAULT_CLIENTS_PER_REALM)]
    clients_per_realm: u64,

    /// Prefix for client role names (namespaced by client)
    #[arg(long, default_value = DEFAULT_CLIENT_ROLE_PREFIX)]
    client_role_prefix: String,

    /// Client roles created for every client
    #[arg(long, default_value_t = DEFAULT_CLIENT_ROLES_PER_CLIENT)]
    client_roles_per_client: u64,

    /// Prefix for group names
    #[arg(long, default_value = DEFAULT_GROUP_PREFIX)]
    group_prefix: String,

    /// Groups created in every realm
    #[arg(long, default_value_t = DEFAULT_GROUPS_PER_REALM)]
    groups_per_realm: u64,

    /// Prefix for usernames
    #[arg(long, default_value = DEFAULT_USER_PREFIX)]
    user_prefix: String,

    /// Users created in every realm
    #[arg(long, default_value_t = DEFAULT_USERS_PER_REALM)]
    users_per_realm: u64,

    /// Realm roles assigned to every user
    #[arg(long, default_value_t = DEFAULT_REALM_ROLES_PER_USER)]
    realm_roles_per_user: u64,

    /// Client roles assigned to every user
    #[arg(long, default_value_t = DEFAULT_CLIENT_ROLES_PER_USER)]
    client_roles_per_user: u64,

    /// Groups joined by every user
    #[arg(long, default_value_t = DEFAULT_GROUPS_PER_USER)]
    groups_per_user: u64,

    /// Password hash iterations in the realm's password policy
    #[arg(long, default_value_t = DEFAULT_PASSWORD_HASH_ITERATIONS)]
    password_hash_iterations: u64,

    /// Clients created per unit of work
    #[arg(long, default_value_t = DEFAULT_CLIENTS_PER_TRANSACTION)]
    clients_per_transaction: u64,

    /// Users created per unit of work
    #[arg(long, default_value_t = DEFAULT_USERS_PER_TRANSACTION)]
    users_per_transaction: u64,

    /// Budget in seconds for a single unit of work
    #[arg(long, default_value_t = DEFAULT_TRANSACTION_TIMEOUT_SECS)]
    transaction_timeout: u64,
}

impl PopulateArgs {
    fn into_config(self) -> GenerationConfig {
        GenerationConfig {
            realm_prefix: self.realm_prefix,
            count: self.count,
            realm_role_prefix: self.realm_role_prefix,
            realm_roles_per_realm: self.realm_roles_per_realm,
            client_prefix: self.client_prefix,
            clients_per_realm: self.clients_per_realm,
            client_role_prefix: self.client_role_prefix,
            client_roles_per_client: self.client_roles_per_client,
            group_prefix: self.group_prefix,
            groups_per_realm: self.groups_per_realm,
            user_prefix: self.user_prefix,
            users_per_realm: self.users_per_realm,
            realm_roles_per_user: self.realm_roles_per_user,
            client_roles_per_user: self.client_roles_per_user,
            groups_per_user: self.groups_per_user,
            password_hash_iterations: self.password_hash_iterations,
            clients_per_transaction: self.clients_per_transaction,
            users_per_transaction: self.users_per_transaction,
            transaction_timeout_secs: self.transaction_timeout,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { listen } => {
            let store = Arc::new(MemoryStore::new());
            let cache = Arc::clone(&store) as Arc<dyn RealmCache>;
            let server = TriggerServer::bind(&listen, store, Some(cache))?;
            server.serve().await
        }
        Commands::Populate { args } => {
            let config = args.into_config();
            let store = Arc::new(MemoryStore::new());
            let populator = DatasetPopulator::new(Arc::clone(&store), config)
                .with_cache(Arc::clone(&store) as Arc<dyn RealmCache>);

            let summary = populator.run().await?;
            info!(
                realms = summary.realms_created,
                users = summary.users_created,
                "Populate run complete"
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
    }
}
