//! Offline reconciliation of captured `docker compose` stderr.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

use super::project::{INTERNAL_BUG, UiSink, fail_if_failed, print_outcome};
use crate::Context as AppContext;
use crate::cli::ParseArgs;
use composekit::{Outcome, Warning, warning::Tee};

#[derive(Serialize)]
struct ParseReport {
    #[serde(flatten)]
    outcome: Outcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<Warning>,
}

pub fn run(ctx: &AppContext, args: ParseArgs) -> Result<()> {
    let stderr = read_input(args.file.as_deref())?;

    let mut ui_sink = UiSink { quiet: ctx.quiet };
    let mut warnings: Vec<Warning> = Vec::new();
    let outcome = composekit::reconcile_stderr(
        &stderr,
        args.dry_run,
        &mut Tee(&mut ui_sink, &mut warnings),
    )
    .map_err(|err| {
        if err.is_contract_violation() {
            anyhow::Error::new(err).context(INTERNAL_BUG)
        } else {
            err.into()
        }
    })?;

    if args.json {
        let report = ParseReport {
            outcome: outcome.clone(),
            warnings,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_outcome(&outcome, args.dry_run);
    }

    fail_if_failed(&outcome)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Could not read stdin")?;
            Ok(buf)
        }
    }
}
