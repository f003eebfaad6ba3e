//! `edgeplan diff <bundle>`: show unified diffs for what `plan` would write.

use anyhow::{Context, Result};
use clap::Args;

use edgeplan_sync::diff_run;

use crate::InputArgs;

/// Arguments for `edgeplan diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let options = self.input.options(true)?;
        let diffs = diff_run(&options)
            .with_context(|| format!("diff failed for bundle {}", options.bundle.display()))?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
