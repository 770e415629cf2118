//! User CLI commands
//!
//! Implements CLI commands for inspecting and updating users.

use clap::Subcommand;

use crate::config::RuntimeConfig;
use crate::display::{format_audit_trail, format_user};
use crate::error::CustodianResult;
use crate::models::ProposedChange;
use crate::services::{UpdateOutcome, UserService};
use crate::storage::ConnectionProvider;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Show a user's current attributes
    Show {
        /// User ID
        id: String,
    },
    /// Apply a change to a user's attributes
    Update {
        /// User ID
        id: String,
        /// JSON object of attribute names to new values
        changes: String,
        /// ID of the user making the change
        actor_id: String,
    },
    /// Show the audit trail of a user
    Audit {
        /// User ID
        id: String,
    },
}

/// Handle a user command
pub fn handle_user_command(
    provider: &dyn ConnectionProvider,
    config: &RuntimeConfig,
    cmd: UserCommands,
) -> CustodianResult<()> {
    let service = UserService::new(provider, config);

    match cmd {
        UserCommands::Show { id } => {
            let user = service.get_user(&id)?;
            print!("{}", format_user(&user));
        }

        UserCommands::Update {
            id,
            changes,
            actor_id,
        } => {
            let change = ProposedChange::from_json_str(&changes)?;

            match service.apply_update(&id, &change, &actor_id)? {
                UpdateOutcome::Updated {
                    user_id,
                    audited_fields,
                    summary,
                    ..
                } => {
                    println!("User {} updated: {}", user_id, summary);
                    if !audited_fields.is_empty() {
                        println!("  Audited: {}", audited_fields.join(", "));
                    }
                }
                UpdateOutcome::NoChanges { user_id } => {
                    println!("No changes detected for user {}.", user_id);
                }
            }
        }

        UserCommands::Audit { id } => {
            let entries = service.audit_history(&id)?;
            println!("{}", format_audit_trail(&entries));
        }
    }

    Ok(())
}
