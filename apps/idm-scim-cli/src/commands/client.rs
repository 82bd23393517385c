//! Raw SCIM client commands
//!
//! Talks to a SCIM service provider directly, without the plugin layer, to
//! check credentials, filters and the list method a server supports.

use crate::error::{CliError, CliResult};
use clap::{Args, ValueEnum};
use idm_scim_client::auth::{ClientCertificate, ScimCredentials};
use idm_scim_client::client::{ScimClient, ScimClientConfig};
use idm_scim_client::filter::FilterExpression;
use idm_scim_client::models::{Group, GroupList, User, UserList};
use idm_scim_client::request::{ListMethod, Page};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Page size sent when `--count` is not given.
pub const DEFAULT_COUNT: u32 = 100;

/// Attribute matched by `--display-name`.
const DISPLAY_NAME_ATTRIBUTE: &str = "displayName";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    GetUser,
    ListUsers,
    GetGroup,
    ListGroups,
}

#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Lookup to perform
    #[arg(long, value_enum)]
    pub action: Action,

    /// Base URL of the SCIM service provider
    #[arg(long, env = "IDM_SCIM_HOST")]
    pub host: String,

    /// Client ID for authentication
    #[arg(long, env = "IDM_SCIM_CLIENT_ID")]
    pub client_id: String,

    /// Client secret (basic auth)
    #[arg(long, env = "IDM_SCIM_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// PEM client certificate (mutual TLS)
    #[arg(long, requires = "key_path")]
    pub cert_path: Option<PathBuf>,

    /// PEM private key for the client certificate
    #[arg(long, requires = "cert_path")]
    pub key_path: Option<PathBuf>,

    /// List through `POST .search` instead of `GET`
    #[arg(long)]
    pub use_http_post: bool,

    /// ID of the user or group to retrieve
    #[arg(long)]
    pub id: Option<String>,

    /// Pagination cursor
    #[arg(long)]
    pub cursor: Option<String>,

    /// Maximum number of resources to list
    #[arg(long, default_value_t = DEFAULT_COUNT)]
    pub count: u32,

    /// Only list resources whose displayName equals this value
    #[arg(long)]
    pub display_name: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single client action.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ActionOutput {
    User(User),
    Users(UserList),
    Group(Group),
    Groups(GroupList),
}

impl ClientArgs {
    /// Build the client from the connection flags.
    pub fn build_client(&self) -> CliResult<ScimClient> {
        let certificate = match (&self.cert_path, &self.key_path) {
            (Some(cert), Some(key)) => Some(ClientCertificate::from_files(cert, key)?),
            _ => None,
        };
        let credentials =
            ScimCredentials::from_parts(&self.client_id, self.client_secret.clone(), certificate)?;

        let config = ScimClientConfig::new(&self.host, credentials)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        Ok(ScimClient::new(config)?)
    }

    fn filter(&self) -> FilterExpression {
        match self.display_name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => FilterExpression::eq(DISPLAY_NAME_ATTRIBUTE, name),
            None => FilterExpression::Null,
        }
    }

    fn page(&self) -> Page {
        let page = Page::unbounded().with_count(self.count);
        match self.cursor.as_deref().filter(|cursor| !cursor.is_empty()) {
            Some(cursor) => page.with_cursor(cursor),
            None => page,
        }
    }

    fn required_id(&self) -> CliResult<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| CliError::Validation("--id is required for this action".to_string()))
    }
}

/// Run the requested action and return what the server answered.
pub async fn run_action(args: &ClientArgs) -> CliResult<ActionOutput> {
    let client = args.build_client()?;
    let method = ListMethod::from_post_flag(args.use_http_post);

    let output = match args.action {
        Action::GetUser => ActionOutput::User(client.get_user(args.required_id()?).await?),
        Action::ListUsers => ActionOutput::Users(
            client
                .list_users(method, &args.filter(), &args.page())
                .await?,
        ),
        Action::GetGroup => ActionOutput::Group(client.get_group(args.required_id()?).await?),
        Action::ListGroups => ActionOutput::Groups(
            client
                .list_groups(method, &args.filter(), &args.page())
                .await?,
        ),
    };
    Ok(output)
}

/// Execute a client command
pub async fn execute(args: ClientArgs) -> CliResult<()> {
    let output = run_action(&args).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_output(&output);
    }
    Ok(())
}

fn print_output(output: &ActionOutput) {
    match output {
        ActionOutput::User(user) => println!("Found User: {}", user.user_name),
        ActionOutput::Users(users) => {
            println!("Found Users:");
            for user in &users.resources {
                println!("{}", user.user_name);
            }
        }
        ActionOutput::Group(group) => {
            println!("Found Group: {}", group.display_name.as_deref().unwrap_or(""));
        }
        ActionOutput::Groups(groups) => {
            println!("Found Groups:");
            for group in &groups.resources {
                println!("{}", group.display_name.as_deref().unwrap_or(""));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ClientArgs,
    }

    fn parse(extra: &[&str]) -> Result<ClientArgs, clap::Error> {
        let mut argv = vec![
            "idm-scim",
            "--host",
            "https://idp.example.com/scim",
            "--client-id",
            "test-client",
        ];
        argv.extend_from_slice(extra);
        TestCli::try_parse_from(argv).map(|cli| cli.args)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--action", "list-users"]).unwrap();
        assert_eq!(args.action, Action::ListUsers);
        assert_eq!(args.count, DEFAULT_COUNT);
        assert!(!args.use_http_post);
        assert!(args.filter().is_null());
        assert_eq!(args.page(), Page::unbounded().with_count(DEFAULT_COUNT));
    }

    #[test]
    fn test_display_name_builds_eq_filter() {
        let args = parse(&["--action", "list-groups", "--display-name", "KeyAdmin"]).unwrap();
        assert_eq!(args.filter().to_string(), r#"displayName eq "KeyAdmin""#);
    }

    #[test]
    fn test_cursor_is_passed_through() {
        let args = parse(&["--action", "list-groups", "--cursor", "abc", "--count", "5"]).unwrap();
        assert_eq!(
            args.page(),
            Page::unbounded().with_count(5).with_cursor("abc")
        );
    }

    #[test]
    fn test_cert_requires_key() {
        assert!(parse(&["--action", "get-user", "--cert-path", "cert.pem"]).is_err());
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(parse(&["--action", "delete-user"]).is_err());
    }

    #[test]
    fn test_missing_id_is_validation_error() {
        let args = parse(&["--action", "get-group"]).unwrap();
        assert!(matches!(args.required_id(), Err(CliError::Validation(_))));
    }

    #[test]
    fn test_no_secret_or_certificate_rejected() {
        let args = parse(&["--action", "get-user", "--id", "u1"]).unwrap();
        let error = args.build_client().unwrap_err();
        assert_eq!(error.exit_code(), 1);
    }
}
