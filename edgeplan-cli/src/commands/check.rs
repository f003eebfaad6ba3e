//! `edgeplan check <theirs> <ours>`: matcher debugging aid.

use anyhow::Result;
use clap::Args;

use edgeplan_core::matcher::classify;
use edgeplan_core::RoutePattern;

/// Arguments for `edgeplan check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Pattern of the existing worker.
    pub theirs: String,

    /// Pattern the new worker wants.
    pub ours: String,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let relation = classify(
            &RoutePattern::from(self.theirs.as_str()),
            &RoutePattern::from(self.ours.as_str()),
        );
        println!("{}", relation.as_str());
        Ok(())
    }
}
