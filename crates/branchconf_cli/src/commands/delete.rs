//! Delete command - Remove configuration of a branch instance.

use anyhow::Result;
use clap::Args;

use branchconf_core::{InstanceLifecycle, LifecycleOptions};

use super::InstanceArgs;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,

    /// Ignore files that are already gone
    #[arg(short, long)]
    pub force: bool,
}

pub async fn execute(args: DeleteArgs) -> Result<()> {
    let lifecycle = args.instance.lifecycle()?;
    let branch = &args.instance.branch;

    let options = LifecycleOptions::new().force(args.force);
    lifecycle.delete(branch, &options).await?;

    println!("🗑️  Configuration removed for {} ({})", branch, lifecycle.repo());
    Ok(())
}
