//! Create command - Write configuration for a branch instance.

use anyhow::Result;
use clap::Args;
use tracing::info;

use branchconf_core::{InstanceLifecycle, LifecycleOptions};

use super::InstanceArgs;

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,
}

pub async fn execute(args: CreateArgs) -> Result<()> {
    let lifecycle = args.instance.lifecycle()?;
    let branch = &args.instance.branch;

    let targets = lifecycle.targets()?;
    info!("Creating {} file(s) for {}/{}", targets.len(), lifecycle.repo(), branch);

    lifecycle.create(branch, &LifecycleOptions::new()).await?;

    println!("✅ Configuration written for {} ({})", branch, lifecycle.repo());
    for target in &targets {
        let destination = lifecycle.paths().compute_destination(target, branch)?;
        println!("   📄 {}", destination.display());
    }
    Ok(())
}
