use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "taskclock-ctl")]
#[command(about = "taskclock coordinator CLI control tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a lifecycle message to the coordinator
    Send {
        #[command(subcommand)]
        message: SendAction,
    },

    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Read or write raw store entries
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },

    /// Show today's and this week's totals
    Status,

    /// Print calendar updates as the coordinator broadcasts them
    Watch,
}

#[derive(Subcommand)]
enum SendAction {
    Cancel,
    Submit,
    Refresh {
        #[arg(help = "Countdown length in seconds")]
        time: i64,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Record a task as started now
    Begin {
        id: String,
        #[arg(short, long, help = "Allotted minutes for the task")]
        minutes: f64,
    },
    Show,
}

#[derive(Subcommand)]
enum StoreAction {
    Get {
        #[arg(help = "Store partition: sync or local")]
        area: String,
        keys: Vec<String>,
    },
    Set {
        area: String,
        key: String,
        #[arg(help = "JSON value; bare words are stored as strings")]
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Send { message } => match message {
            SendAction::Cancel => commands::message::cancel().await?,
            SendAction::Submit => commands::message::submit().await?,
            SendAction::Refresh { time } => commands::message::refresh(time).await?,
        },
        Commands::Task { action } => match action {
            TaskAction::Begin { id, minutes } => commands::task::begin(&id, minutes).await?,
            TaskAction::Show => commands::task::show().await?,
        },
        Commands::Store { action } => match action {
            StoreAction::Get { area, keys } => commands::store::get(&area, &keys).await?,
            StoreAction::Set { area, key, value } => {
                commands::store::set(&area, &key, &value).await?
            }
        },
        Commands::Status => commands::status::show().await?,
        Commands::Watch => commands::status::watch().await?,
    }

    Ok(())
}
