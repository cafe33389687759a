mod commands;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use lb_core::api::ReportKind;
use lb_core::filter::LeadFilter;

use commands::GlobalOpts;

/// leadboard CLI -- inspect and update WhatsApp sales leads from the shell.
#[derive(Parser)]
#[command(name = "lb", version, about)]
struct Cli {
    /// Config file (default: ~/.leadboard/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (default: config file or LEADBOARD_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Username to sign in with (default: config file or LEADBOARD_USERNAME).
    #[arg(long, global = true)]
    username: Option<String>,

    /// Password (default: LEADBOARD_PASSWORD).
    #[arg(long, global = true)]
    password: Option<String>,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Log at the configured level instead of warnings only.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dashboard statistics (default when no subcommand is given).
    Stats,

    /// List leads, optionally filtered.
    Leads {
        /// all, hot, warm, cold, today, contacted, not_contacted, sales_closed, no_sale
        #[arg(long, short, default_value = "all")]
        filter: LeadFilter,
    },

    /// Print the WhatsApp conversation of a lead.
    Conversation {
        /// Lead ID.
        lead: String,
    },

    /// Mark a lead as contacted by a human (or undo it).
    Contact {
        lead: String,
        /// Mark as not contacted instead.
        #[arg(long)]
        undo: bool,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Mark a lead's sale as closed (or reopen it).
    Sale {
        lead: String,
        /// Mark the sale as not closed instead.
        #[arg(long)]
        undo: bool,
        /// Sale amount in BRL. Ignored with --undo.
        #[arg(long, value_parser = commands::money_arg)]
        amount: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Manage health/dental plans.
    #[command(subcommand)]
    Plans(PlansCmd),

    /// Manage appointments.
    #[command(subcommand)]
    Appointments(AppointmentsCmd),

    /// Download an Excel report.
    Report {
        kind: ReportArg,
        /// Output file; defaults to the server's filename in the reports dir.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Manage dashboard users.
    #[command(subcommand)]
    Users(UsersCmd),

    /// Check credentials against the backend.
    Login {
        /// Remember the username in ~/.leadboard/config.toml.
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum PlansCmd {
    /// List plans.
    List,
    /// Update a plan. Unset fields keep their current value.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = commands::money_arg)]
        price: Option<f64>,
        /// Comma separated coverage items.
        #[arg(long)]
        coverage: Option<String>,
        #[arg(long, value_parser = commands::flag_arg)]
        active: Option<bool>,
    },
}

#[derive(Subcommand)]
enum AppointmentsCmd {
    /// List appointments in time order.
    List,
    /// Show free slots for a day.
    Slots {
        /// YYYY-MM-DD; the backend picks a default when omitted.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Book an appointment for a lead.
    Book {
        #[arg(long)]
        lead: String,
        /// Slot as returned by `slots` (`2024-05-02T09:00:00` or `09:00` with --date).
        #[arg(long)]
        slot: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Set an appointment's status.
    Status {
        id: String,
        /// scheduled, confirmed, completed, cancelled, no_show
        status: String,
    },
}

#[derive(Subcommand)]
enum UsersCmd {
    /// List users.
    List,
    /// Create a user.
    Create(UserCreateArgs),
    /// Update a user. Unset fields are left alone.
    Update {
        id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long, value_parser = commands::flag_arg)]
        active: Option<bool>,
        /// New password for the user.
        #[arg(long = "new-password")]
        new_password: Option<String>,
    },
    /// Delete a user.
    Delete { id: String },
}

#[derive(Args)]
struct UserCreateArgs {
    #[arg(long = "name")]
    name: String,
    /// Password for the new user.
    #[arg(long = "user-password")]
    user_password: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long, default_value = "agent")]
    role: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportArg {
    Leads,
    Appointments,
}

impl From<ReportArg> for ReportKind {
    fn from(arg: ReportArg) -> Self {
        match arg {
            ReportArg::Leads => ReportKind::Leads,
            ReportArg::Appointments => ReportKind::Appointments,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let opts = GlobalOpts {
        config: cli.config,
        api_url: cli.api_url,
        username: cli.username,
        password: cli.password,
        json: cli.json,
    };
    let config = commands::load_config(&opts)?;
    let level = if cli.verbose { config.logging.level.as_str() } else { "warn" };
    lb_telemetry::logging::init("lb", level, config.logging.json);

    if let Some(Commands::Login { save }) = &cli.command {
        return commands::login::run(&config, &opts, *save).await;
    }

    let client = commands::connect(&config, &opts).await?;

    match cli.command {
        None | Some(Commands::Stats) => commands::leads::stats(&client, &opts).await?,
        Some(Commands::Leads { filter }) => commands::leads::list(&client, &opts, filter).await?,
        Some(Commands::Conversation { lead }) => {
            commands::leads::conversation(&client, &opts, &lead).await?
        }
        Some(Commands::Contact { lead, undo, notes }) => {
            commands::leads::contact(&client, &opts, &lead, !undo, notes).await?
        }
        Some(Commands::Sale { lead, undo, amount, notes }) => {
            commands::leads::sale(&client, &opts, &lead, !undo, amount, notes).await?
        }
        Some(Commands::Plans(PlansCmd::List)) => commands::plans::list(&client, &opts).await?,
        Some(Commands::Plans(PlansCmd::Update { id, name, description, price, coverage, active })) => {
            let changes = commands::plans::PlanChanges { name, description, price, coverage, active };
            commands::plans::update(&client, &id, changes).await?
        }
        Some(Commands::Appointments(AppointmentsCmd::List)) => {
            commands::appointments::list(&client, &opts).await?
        }
        Some(Commands::Appointments(AppointmentsCmd::Slots { date })) => {
            commands::appointments::slots(&client, &opts, date).await?
        }
        Some(Commands::Appointments(AppointmentsCmd::Book { lead, slot, date, notes })) => {
            commands::appointments::book(&client, &lead, &slot, date, notes).await?
        }
        Some(Commands::Appointments(AppointmentsCmd::Status { id, status })) => {
            commands::appointments::set_status(&client, &id, &status).await?
        }
        Some(Commands::Report { kind, output }) => {
            commands::report::run(&client, kind.into(), output, &config.reports.dir()).await?
        }
        Some(Commands::Users(UsersCmd::List)) => commands::users::list(&client, &opts).await?,
        Some(Commands::Users(UsersCmd::Create(args))) => {
            let input = commands::users::NewUser {
                username: args.name,
                password: args.user_password,
                email: args.email,
                full_name: args.full_name,
                role: args.role,
            };
            commands::users::create(&client, input).await?
        }
        Some(Commands::Users(UsersCmd::Update { id, email, full_name, role, active, new_password })) => {
            let changes = commands::users::UserChanges { email, full_name, role, active, password: new_password };
            commands::users::update(&client, &id, changes).await?
        }
        Some(Commands::Users(UsersCmd::Delete { id })) => {
            commands::users::delete(&client, &id).await?
        }
        Some(Commands::Login { .. }) => {}
    }

    Ok(())
}
