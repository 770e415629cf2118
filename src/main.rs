use anyhow::Result;
use clap::{Parser, Subcommand};

use custodian::cli::{handle_user_command, UserCommands};
use custodian::config::{CustodianPaths, RuntimeConfig, Settings};
use custodian::models::UserId;
use custodian::storage::{initialize_storage, seed_user, FileDatabase, SeedOutcome};

#[derive(Parser)]
#[command(
    name = "custodian",
    version,
    about = "User record store with field-level change auditing",
    long_about = "Custodian keeps user records and applies attribute changes \
                  transactionally, writing an audit row for every change to a \
                  sensitive field."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the record store and seed the test user
    Init {
        /// ID to give the seeded test user
        #[arg(long, default_value_t = UserId::first())]
        user_id: UserId,
    },

    /// User commands
    #[command(subcommand)]
    User(UserCommands),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "custodian=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = CustodianPaths::new()?;
    let settings = Settings::load_or_default(&paths)?;

    match cli.command {
        Some(Commands::Init { user_id }) => {
            let config = RuntimeConfig::from_env(settings)?;
            let db = FileDatabase::open(&config.database_dir);

            println!("Initializing Custodian at: {}", db.dir().display());
            initialize_storage(&db)?;

            match seed_user(&db, user_id)? {
                SeedOutcome::Created => println!("Created test user {}.", user_id),
                SeedOutcome::AlreadyExists => println!("User {} already exists.", user_id),
            }
            println!("Initialization complete!");
        }
        Some(Commands::User(cmd)) => {
            let config = RuntimeConfig::from_env(settings)?;
            let db = FileDatabase::open(&config.database_dir);
            handle_user_command(&db, &config, cmd)?;
        }
        Some(Commands::Config) => {
            println!("Custodian Configuration");
            println!("=======================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();

            let fields: Vec<String> = settings.attributes.field_names().map(String::from).collect();
            match RuntimeConfig::from_env(settings) {
                Ok(config) => {
                    println!("Database:         {}", config.database_dir.display());
                    println!("Sensitive fields: {}", config.sensitive_fields);
                }
                Err(e) => {
                    println!("Database:         not configured ({})", e);
                    println!(
                        "                  e.g. DATABASE_URL=file://{}",
                        paths.default_database_dir().display()
                    );
                }
            }
            println!("Attributes:       {}", fields.join(", "));
        }
        None => {
            println!("Custodian - user records with field-level change auditing");
            println!();
            println!("Run 'custodian --help' for usage information.");
        }
    }

    Ok(())
}
