//! Record validation command

use anyhow::Result;
use clap::Args;

use super::SourceArgs;
use crate::integration;

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[clap(flatten)]
    pub sources: SourceArgs,
}

/// Implementation of the validate command
///
/// Prints record counts and every rule that can never take effect. Finding
/// such rules is not a failure; unreadable files are.
pub fn execute_validate(args: &ValidateArgs) -> Result<()> {
    let records = integration::load_sources(&args.sources)?;
    let report = integration::lint(&records);

    println!("global rules: {}", records.global.len());
    println!("role rules: {}", records.roles.len());

    for warning in &report {
        println!("warning: {}", warning);
    }
    if report.is_empty() {
        println!("ok");
    }
    Ok(())
}
