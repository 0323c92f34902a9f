use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;

use taskgate::db::{self, SqliteRoleStore};
use taskgate::{AppConfig, AppError, DefaultPolicyEvaluator, PolicyEvaluator, RoleSync, TaskSubject};

#[derive(Parser, Debug)]
#[command(author, version, about = "taskgate task access tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations
    Migrate,
    /// Create the default roles and task permissions, after `migrate`
    Seed,
    /// Replace a user's roles with those mapped from their identity-provider groups
    SyncRoles {
        user_id: String,
        /// Group name, repeat for each group
        #[arg(long = "group")]
        groups: Vec<String>,
    },
    /// Print a user's resolved roles and permissions
    Permissions { user_id: String },
    /// Print the access decision for a user on a task
    CheckAccess {
        #[arg(long)]
        user: String,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        private: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<AppError>() {
            Some(app_err) if app_err.is_client_error() => {
                tracing::warn!(kind = app_err.kind(), "{err:#}");
                ExitCode::from(2)
            }
            Some(app_err) => {
                tracing::error!(kind = app_err.kind(), "{err:#}");
                ExitCode::FAILURE
            }
            None => {
                tracing::error!("{err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let pool = db::init(&config.database_url).await?;
    let store = Arc::new(SqliteRoleStore::new(pool.clone()));

    match cli.command {
        Commands::Migrate => {
            db::migrate(&pool).await?;
            println!("Migrations applied");
        }
        Commands::Seed => {
            db::seed_default_rbac(&pool).await?;
            println!("Default roles and permissions seeded");
        }
        Commands::SyncRoles { user_id, groups } => {
            let sync = RoleSync::new(store, config.group_role_mapping);
            let outcome = sync
                .sync_user_roles(&user_id, groups.as_slice())
                .await
                .with_context(|| format!("failed to sync roles for {user_id}"))?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Permissions { user_id } => {
            let evaluator = DefaultPolicyEvaluator::new(store);
            let principal = evaluator.resolve_user_roles_and_permissions(&user_id).await?;
            let (roles, permissions) = principal.sorted();
            let body = json!({
                "user_id": principal.user_id,
                "roles": roles,
                "permissions": permissions,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Commands::CheckAccess { user, owner, private } => {
            let evaluator = DefaultPolicyEvaluator::new(store);
            let task = if private {
                TaskSubject::private(owner)
            } else {
                TaskSubject::public(owner)
            };
            let decision = evaluator.evaluate_task_access(&user, &task).await?;
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
    }

    Ok(())
}

fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
