//! Access decision commands

use anyhow::Result;
use clap::Args;
use sentinel_core::Identity;

use super::SourceArgs;
use crate::integration;

/// Arguments for the check and explain commands
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Resource identifier, e.g. Sales.Invoice.Read; omit for the empty resource
    #[clap(long)]
    pub resource: Option<String>,

    /// Name of the identity asking for access
    #[clap(long)]
    pub identity: String,

    /// Print the result as JSON
    #[clap(long)]
    pub json: bool,

    #[clap(flatten)]
    pub sources: SourceArgs,
}

/// Implementation of the check command
pub fn execute_check(args: &CheckArgs) -> Result<()> {
    let manager = integration::build_manager(&args.sources)?;
    let identity = Identity::new(args.identity.as_str());
    let allowed = manager.can_access(args.resource.as_deref(), &identity)?;

    if args.json {
        let output = serde_json::json!({
            "resource": args.resource.as_deref().unwrap_or_default(),
            "identity": identity.name,
            "allowed": allowed,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", if allowed { "allow" } else { "deny" });
    }
    Ok(())
}

/// Implementation of the explain command
pub fn execute_explain(args: &CheckArgs) -> Result<()> {
    let manager = integration::build_manager(&args.sources)?;
    let identity = Identity::new(args.identity.as_str());
    let resolution = manager.explain(args.resource.as_deref(), &identity)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("{}", resolution);
    }
    Ok(())
}
