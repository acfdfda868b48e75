//! FacilityDesk CLI - facilities maintenance ticketing
//!
//! Main entry point for the facilitydesk command-line tool.

use clap::{Parser, Subcommand};
use facilitydesk::cli::{self, ticket::CreateArgs};
use facilitydesk::{version_info, LoggingConfig, VersionInfo};

#[derive(Parser)]
#[command(name = "facilitydesk")]
#[command(about = "FacilityDesk - facilities maintenance ticketing", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Acting user id
    #[arg(long = "as", global = true, env = "FACILITYDESK_USER")]
    as_user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize facilitydesk configuration
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Show version, build and schema information
    Version {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Ticket commands
    #[command(subcommand)]
    Ticket(TicketCommands),

    /// Show your most recent notifications
    Notifications {
        /// Number of notifications to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show dashboard statistics (admins only)
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Add a user
    Add {
        /// Display name
        name: String,
        /// Role: faculty, worker, admin
        #[arg(short, long)]
        role: String,
        /// Fixed user id (random if omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// List all users
    List,
}

#[derive(Subcommand)]
enum TicketCommands {
    /// Report an issue
    Create {
        /// Short title
        title: String,
        /// What is wrong
        #[arg(short, long)]
        description: String,
        /// Category: Electrical, Plumbing, Cleaning, Furniture, Infrastructure, IT
        #[arg(short, long)]
        category: String,
        /// Priority: Urgent, High, Normal (default), Low
        #[arg(short, long)]
        priority: Option<String>,
        /// Building block
        #[arg(short, long)]
        block: String,
        /// Floor
        #[arg(short, long)]
        floor: String,
        /// Room or spot
        #[arg(short, long)]
        location: Option<String>,
        /// Reference to a photo of the problem
        #[arg(long)]
        before_image: Option<String>,
        /// Reference to a second photo
        #[arg(long)]
        after_image: Option<String>,
    },
    /// List tickets visible to you
    List {
        /// Status: Reported, Assigned, In Progress, Completed, Verified, Closed
        #[arg(short, long)]
        status: Option<String>,
        /// Category filter
        #[arg(short, long)]
        category: Option<String>,
        /// Priority filter
        #[arg(short, long)]
        priority: Option<String>,
    },
    /// Show ticket details, history and audit trail
    Show {
        /// Ticket ID
        id: String,
    },
    /// Claim a reported ticket (workers)
    Claim {
        /// Ticket ID
        id: String,
    },
    /// Complete a ticket assigned to you (workers)
    Complete {
        /// Ticket ID
        id: String,
        /// Reference to a completion photo
        #[arg(long)]
        proof: Option<String>,
    },
    /// Set status and/or assignee directly
    Update {
        /// Ticket ID
        id: String,
        /// New status
        #[arg(short, long)]
        status: Option<String>,
        /// New assignee user id
        #[arg(short, long)]
        assign: Option<String>,
    },
    /// Rate a finished ticket you reported (1-5)
    Rate {
        /// Ticket ID
        id: String,
        /// Rating from 1 to 5
        rating: u8,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let level = logging
        .level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(logging.colored)
        .with_writer(std::io::stderr);

    match (logging.format.as_str(), logging.timestamps) {
        ("pretty", true) => builder.pretty().init(),
        ("pretty", false) => builder.pretty().without_time().init(),
        (_, true) => builder.compact().init(),
        (_, false) => builder.compact().without_time().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = facilitydesk::load_config().await?;
    init_tracing(&config.logging);

    let command = match cli.command {
        Some(Commands::Init { force }) => {
            println!("Initializing FacilityDesk...");
            return match facilitydesk::init::initialize(force) {
                Ok(config_path) => {
                    println!("✓ FacilityDesk initialized successfully");
                    println!("  Configuration: {}", config_path.display());
                    println!("  Database: {}", config.database_path()?.display());
                    println!("\nAdd users with 'facilitydesk user add <name> --role <role>'.");
                    Ok(())
                }
                Err(e) => {
                    eprintln!("✗ Initialization failed: {}", e);
                    Err(e.into())
                }
            };
        }
        Some(Commands::Version { json }) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&VersionInfo::current())?);
            } else {
                println!("{}", version_info());
            }
            return Ok(());
        }
        Some(command) => command,
        None => {
            println!("{}", version_info());
            println!("\nUse --help to see available commands");
            return Ok(());
        }
    };

    if !cli::is_initialized() {
        eprintln!("{}", cli::init_instructions());
        return Err(anyhow::anyhow!("FacilityDesk not initialized"));
    }

    let desk = cli::open_desk(config).await?;
    let as_user = cli.as_user.as_deref();

    match command {
        Commands::User(UserCommands::Add { name, role, id }) => {
            cli::user::handle_add(&desk, name, role, id).await?;
        }
        Commands::User(UserCommands::List) => {
            cli::user::handle_list(&desk).await?;
        }
        Commands::Ticket(ticket_cmd) => {
            let actor = cli::resolve_actor(&desk, as_user).await?;
            match ticket_cmd {
                TicketCommands::Create {
                    title,
                    description,
                    category,
                    priority,
                    block,
                    floor,
                    location,
                    before_image,
                    after_image,
                } => {
                    let args = CreateArgs {
                        title,
                        description,
                        category,
                        priority,
                        block,
                        floor,
                        location,
                        before_image,
                        after_image,
                    };
                    cli::ticket::handle_create(&desk, &actor, args).await?;
                }
                TicketCommands::List { status, category, priority } => {
                    cli::ticket::handle_list(&desk, &actor, status, category, priority).await?;
                }
                TicketCommands::Show { id } => {
                    cli::ticket::handle_show(&desk, id).await?;
                }
                TicketCommands::Claim { id } => {
                    cli::ticket::handle_claim(&desk, &actor, id).await?;
                }
                TicketCommands::Complete { id, proof } => {
                    cli::ticket::handle_complete(&desk, &actor, id, proof).await?;
                }
                TicketCommands::Update { id, status, assign } => {
                    cli::ticket::handle_update(&desk, &actor, id, status, assign).await?;
                }
                TicketCommands::Rate { id, rating } => {
                    cli::ticket::handle_rate(&desk, &actor, id, rating).await?;
                }
            }
        }
        Commands::Notifications { limit } => {
            let actor = cli::resolve_actor(&desk, as_user).await?;
            cli::notifications::handle_list(&desk, &actor, limit).await?;
        }
        Commands::Stats { json } => {
            let actor = cli::resolve_actor(&desk, as_user).await?;
            cli::stats::handle_stats(&desk, &actor, json).await?;
        }
        Commands::Init { .. } | Commands::Version { .. } => {}
    }

    desk.database.close().await;
    Ok(())
}
