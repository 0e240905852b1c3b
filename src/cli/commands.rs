use clap::Subcommand;

use crate::types::SpaceRole;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Initialize the server (create the data directory and database)
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage organizations
    Org {
        #[command(subcommand)]
        command: OrgCommands,
    },

    /// Manage spaces
    Space {
        #[command(subcommand)]
        command: SpaceCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user; pending email invitations are claimed
    Create {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
pub enum OrgCommands {
    /// Create an organization owned by an existing user
    Create {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        slug: String,

        /// Email of the owning user
        #[arg(long)]
        owner: String,
    },
}

#[derive(Subcommand)]
pub enum SpaceCommands {
    /// Create a space inside an organization
    Create {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        #[arg(long)]
        org_id: i64,

        #[arg(long)]
        name: String,

        #[arg(long)]
        slug: String,

        /// Email of the owning user; must be an organization owner or admin
        #[arg(long)]
        owner: String,
    },

    /// Add a user to a space or change their space role
    AddMember {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        #[arg(long)]
        space_id: i64,

        #[arg(long)]
        email: String,

        /// owner, member or guest
        #[arg(long, default_value = "member")]
        role: SpaceRole,
    },
}
