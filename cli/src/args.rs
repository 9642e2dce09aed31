use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "user-admin")]
#[command(about = "Manage user records through the user API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the user API
    #[arg(long, global = true, env = "USER_API_BASE_URL")]
    pub base_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all users
    #[command(alias = "ls")]
    List,

    /// Show a single user
    Show { user_id: String },

    /// Create a user
    Add {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        username: String,

        /// Kept as text so validation can report a bad value
        #[arg(long)]
        age: String,
    },

    /// Update a user's name and/or age
    #[command(alias = "edit")]
    Update {
        user_id: String,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        age: Option<String>,
    },

    /// Delete a user
    #[command(alias = "rm")]
    Delete {
        user_id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
