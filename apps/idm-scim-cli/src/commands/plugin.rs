//! Plugin commands
//!
//! Hosts the plugin in-process: loads a configuration file, configures the
//! plugin with it and runs one resolution operation.

use crate::error::{CliError, CliResult};
use clap::{Args, Subcommand};
use idm_scim_plugin::messages::{
    AuthContext, ConfigService, ConfigureRequest, GetAllGroupsRequest, GetGroupRequest,
    GetGroupsForUserRequest, GetUsersForGroupRequest, Group, IdentityManagementService, User,
};
use idm_scim_plugin::plugin::ScimPlugin;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info_span;

#[derive(Args, Debug)]
pub struct PluginArgs {
    /// Plugin YAML configuration file
    #[arg(long, env = "IDM_SCIM_PLUGIN_CONFIG")]
    pub config: PathBuf,

    /// Auth context entry passed with the request (repeatable)
    #[arg(long = "auth-context", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub auth_context: Vec<(String, String)>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: PluginCommands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PluginCommands {
    /// Look up a group by name
    GetGroup {
        /// Group name
        name: String,
    },

    /// List every group
    AllGroups,

    /// List the members of a group
    UsersForGroup {
        /// Group ID
        group_id: String,
    },

    /// List the groups a user belongs to
    GroupsForUser {
        /// User ID
        user_id: String,
    },
}

/// Result of a plugin operation.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PluginOutput {
    Group(Group),
    Groups(Vec<Group>),
    Users(Vec<User>),
}

/// Parse a `KEY=VALUE` pair.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Configure a plugin from `args.config` and run the requested operation.
pub async fn run_command(args: &PluginArgs) -> CliResult<PluginOutput> {
    let yaml = std::fs::read_to_string(&args.config).map_err(|e| {
        CliError::Config(format!("cannot read {}: {e}", args.config.display()))
    })?;

    let plugin = ScimPlugin::with_span(info_span!("scim_plugin"));
    plugin
        .configure(ConfigureRequest {
            yaml_configuration: yaml,
        })
        .await?;

    let auth_context: AuthContext = args.auth_context.iter().cloned().collect();

    let output = match &args.command {
        PluginCommands::GetGroup { name } => {
            let response = plugin
                .get_group(GetGroupRequest {
                    group_name: name.clone(),
                    auth_context,
                })
                .await?;
            PluginOutput::Group(response.group)
        }
        PluginCommands::AllGroups => {
            let response = plugin
                .get_all_groups(GetAllGroupsRequest { auth_context })
                .await?;
            PluginOutput::Groups(response.groups)
        }
        PluginCommands::UsersForGroup { group_id } => {
            let response = plugin
                .get_users_for_group(GetUsersForGroupRequest {
                    group_id: group_id.clone(),
                    auth_context,
                })
                .await?;
            PluginOutput::Users(response.users)
        }
        PluginCommands::GroupsForUser { user_id } => {
            let response = plugin
                .get_groups_for_user(GetGroupsForUserRequest {
                    user_id: user_id.clone(),
                    auth_context,
                })
                .await?;
            PluginOutput::Groups(response.groups)
        }
    };
    Ok(output)
}

/// Execute a plugin command
pub async fn execute(args: PluginArgs) -> CliResult<()> {
    let output = run_command(&args).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match &output {
        PluginOutput::Group(group) => print_group_table(std::slice::from_ref(group)),
        PluginOutput::Groups(groups) if groups.is_empty() => println!("No groups found."),
        PluginOutput::Groups(groups) => print_group_table(groups),
        PluginOutput::Users(users) if users.is_empty() => println!("No users found."),
        PluginOutput::Users(users) => print_user_table(users),
    }
    Ok(())
}

fn print_group_table(groups: &[Group]) {
    println!("{:<38} {:<30}", "ID", "NAME");
    println!("{}", "-".repeat(69));
    for group in groups {
        println!("{:<38} {:<30}", group.id, group.name);
    }
}

fn print_user_table(users: &[User]) {
    println!("{:<38} {:<25} {:<30}", "ID", "NAME", "EMAIL");
    println!("{}", "-".repeat(95));
    for user in users {
        println!("{:<38} {:<25} {:<30}", user.id, user.name, user.email);
    }
}
