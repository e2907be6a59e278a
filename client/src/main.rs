//! `ticketdesk`: command-line view of the shared ticket board.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use ticketdesk_client::board::{self, StatusFilter, TicketDetail, TicketFilter, TicketSummary};
use ticketdesk_client::config::{ApiConfig, Config};
use ticketdesk_client::model::{TicketId, UserId};
use ticketdesk_client::TicketDesk;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ticketdesk: work with the shared ticket board",
    long_about = None
)]
struct Cli {
    /// Ticket service base URL, including `/api` (overrides `TICKETDESK_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List tickets
    List {
        /// all, completed or incomplete
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// Only tickets whose description contains this text
        #[arg(long, default_value = "")]
        search: String,
        /// Only tickets assigned to this user id
        #[arg(long)]
        assignee: Option<UserId>,
    },

    /// Show one ticket
    Show {
        /// Ticket id
        id: TicketId,
    },

    /// Create a ticket
    Create {
        /// What needs doing
        description: String,
    },

    /// Assign a user to a ticket; the user must exist
    Assign {
        /// Ticket id
        ticket: TicketId,
        /// User id
        user: String,
    },

    /// Remove the assignee of a ticket
    Unassign {
        /// Ticket id
        ticket: TicketId,
    },

    /// Mark a ticket complete
    Complete {
        /// Ticket id
        id: TicketId,
    },

    /// Mark a ticket incomplete
    Reopen {
        /// Ticket id
        id: TicketId,
    },

    /// List users
    Users,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let mut config = Config::from_env();

    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(config.log_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Some(url) = cli.api_url {
        config.api.base_url = ApiConfig::new(url).base_url;
    }

    let desk = TicketDesk::from_config(&config).context("Failed to build ticket service client")?;

    let outcome = run(&desk, cli.command).await;

    if let Err(error) = desk.shutdown().await {
        tracing::warn!(%error, "Stores did not shut down cleanly");
    }

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(error) => {
            eprintln!("error: {error:#}");
            Ok(ExitCode::FAILURE)
        },
    }
}

async fn run(desk: &TicketDesk, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List {
            status,
            search,
            assignee,
        } => {
            let load = desk.load().await;
            let tickets = load.tickets?;
            let users = load.users.unwrap_or_else(|error| {
                tracing::warn!(%error, "Users unavailable, assignees shown as Unknown");
                Vec::new()
            });

            let filter = TicketFilter::new()
                .with_status(status)
                .with_description(search)
                .with_assignee(assignee);

            let rows = board::summaries(&tickets, &users, &filter);
            if rows.is_empty() {
                println!("No tickets");
            }
            for row in rows {
                println!("{row}");
            }
        },

        Commands::Show { id } => {
            let (ticket, users) = tokio::join!(desk.tickets.fetch_one(id), desk.users.fetch_all());
            ticket?;
            let users = users.unwrap_or_default();

            let state = desk.tickets.snapshot().await;
            if let Some(detail) = TicketDetail::from_state(&state, &users) {
                print_detail(&detail);
            }
        },

        Commands::Create { description } => {
            let ticket = desk.tickets.create(description).await?;
            info!(ticket_id = %ticket.id, "Ticket created");
            println!("Created ticket #{}", ticket.id);
        },

        Commands::Assign { ticket, user } => {
            let assignment = desk.tickets.assign_user(ticket, &user).await?;
            let name = desk
                .users
                .get_by_id(assignment.user_id)
                .await
                .map(|user| user.name)
                .unwrap_or_else(|_| assignment.user_id.to_string());
            println!("Assigned ticket #{} to {name}", assignment.ticket_id);
        },

        Commands::Unassign { ticket } => {
            let unassignment = desk.tickets.unassign(ticket).await?;
            println!("Ticket #{} is now {}", unassignment.ticket_id, board::UNASSIGNED);
        },

        Commands::Complete { id } => {
            let change = desk.tickets.set_ticket_status(id, true).await?;
            println!("Ticket #{} marked {}", change.id, board::TicketStatus::of(change.completed).label());
        },

        Commands::Reopen { id } => {
            let change = desk.tickets.set_ticket_status(id, false).await?;
            println!("Ticket #{} marked {}", change.id, board::TicketStatus::of(change.completed).label());
        },

        Commands::Users => {
            for user in desk.users.fetch_all().await? {
                println!("#{:<4} {}", user.id, user.name);
            }
        },
    }

    Ok(())
}

fn print_detail(detail: &TicketDetail) {
    let TicketSummary {
        id,
        description,
        status,
        assignee,
    } = &detail.summary;

    println!("Ticket #{id}");
    println!("  Description: {description}");
    println!("  Status:      {}", status.label());
    println!("  Assignee:    {assignee}");
}
