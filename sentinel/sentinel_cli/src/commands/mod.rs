//! CLI commands
//!
//! Every command reads permission records from JSON files: an array of
//! `{"name", "isAllowed"}` objects for global rules and an array of
//! `{"name", "roleId", "isAllowed"}` objects for role rules.

pub mod check;
pub mod validate;

use clap::Args;
use std::path::PathBuf;

/// Where permission records and settings come from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// JSON file with global permissions
    #[clap(long)]
    pub global: Option<PathBuf>,

    /// JSON file with role permissions
    #[clap(long)]
    pub roles: Option<PathBuf>,

    /// TOML file with a [permissions] table
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Override the configured answer when no rule matches
    #[clap(long)]
    pub open_by_default: Option<bool>,
}
