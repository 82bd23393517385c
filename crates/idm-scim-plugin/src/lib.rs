//! Identity-management plugin resolving users and groups through a SCIM 2.0
//! service provider.
//!
//! The host configures the plugin with a YAML document and then asks it for
//! groups by name, all groups, the members of a group and the groups of a
//! user. Answers are projected into the small [`messages::Group`] and
//! [`messages::User`] shapes the host understands.

pub mod config;
pub mod error;
pub mod messages;
pub mod plugin;
pub mod strategy;

pub use config::{ConfigError, PluginConfig, ResolutionParams};
pub use error::{PluginError, PluginOperation, PluginResult};
pub use messages::{ConfigService, IdentityManagementService};
pub use plugin::ScimPlugin;
pub use strategy::{DirectSearch, MembershipResolver, MembershipTraversal};
