use bioloop_hub::{
    cli::{
        auth,
        db::{db_generate, db_list, db_migrate, db_revert},
        seed::seed,
    },
    core::db::init_pool,
    settings::get_config,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database related command
    Db(DbArgs),
    /// Authentication related command
    Auth(AuthArgs),
    /// Insert the waste type and reward catalogs
    Seed,
}

#[derive(Debug, Args)]
struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommands,
}

#[derive(Debug, Subcommand)]
enum AuthCommands {
    /// Create new verified user
    CreateUser {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
}

#[derive(Debug, Args)]
struct DbArgs {
    #[command(subcommand)]
    command: DbCommands,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Generate new migration file
    Generate { migration_name: String },
    /// List all migration
    List,
    /// Run all pending migration
    Migrate,
    /// Revert latest migration
    Revert,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();
    match &cli.command {
        Commands::Db(db_args) => match &db_args.command {
            DbCommands::Generate { migration_name } => {
                println!("generate migration: {migration_name:?}");
                db_generate(migration_name).await?;
            }
            DbCommands::List => {
                println!("list migration");
                let config = get_config();
                db_list(&config).await?;
            }
            DbCommands::Migrate => {
                println!("run all pending migration");
                let config = get_config();
                println!("run migration on {}", config.database_url);
                db_migrate(&config).await?;
            }
            DbCommands::Revert => {
                println!("revert latest migration");
                let config = get_config();
                println!("{}", config.database_url);
                db_revert(&config).await?;
            }
        },
        Commands::Auth(auth_args) => match &auth_args.command {
            AuthCommands::CreateUser {
                email,
                password,
                admin,
            } => {
                println!("create user: {email:?}");
                let config = get_config();
                let pool = init_pool(&config).await?;
                let user = auth::create_user(&pool, email, password, *admin).await?;
                println!("created {} with role {}", user.id, user.role);
            }
        },
        Commands::Seed => {
            let config = get_config();
            let pool = init_pool(&config).await?;
            let (waste_types, rewards) = seed(&pool).await?;
            println!("inserted {waste_types} waste types and {rewards} rewards");
        }
    }
    Ok(())
}
