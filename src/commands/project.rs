//! Lifecycle commands (up/stop/restart/down) using composekit.

use anyhow::{Context, Result, bail};
use colored::Colorize;
use composekit::{
    DockerCli, Outcome, ProjectManager, ProjectOptions, ProjectResult, ProjectState, Warning,
    WarningSink,
};

use crate::Context as AppContext;
use crate::cli::{DownArgs, ProjectArgs, RestartArgs, UpArgs};
use crate::config::Config;
use crate::paths;
use crate::ui;

/// Context attached to errors that indicate a bug rather than a bad setup.
pub const INTERNAL_BUG: &str = "composectl hit an internal error; please report it as a bug";

/// Prints warnings as they arrive, unless quiet.
pub struct UiSink {
    pub quiet: bool,
}

impl WarningSink for UiSink {
    fn warn(&mut self, warning: Warning) {
        log::debug!("compose warning: {warning:?}");
        if !self.quiet {
            ui::warn(&warning.to_string());
        }
    }
}

pub fn up(ctx: &AppContext, args: UpArgs) -> Result<()> {
    let UpArgs {
        project,
        recreate,
        no_deps,
        remove_orphans,
    } = args;
    run(ctx, ProjectState::Present, project, |options| {
        if let Some(recreate) = recreate {
            options.recreate = recreate.into();
        }
        if no_deps {
            options.dependencies = false;
        }
        options.remove_orphans |= remove_orphans;
    })
}

pub fn stop(ctx: &AppContext, args: ProjectArgs) -> Result<()> {
    run(ctx, ProjectState::Stopped, args, |_| {})
}

pub fn restart(ctx: &AppContext, args: RestartArgs) -> Result<()> {
    let no_deps = args.no_deps;
    run(ctx, ProjectState::Restarted, args.project, |options| {
        if no_deps {
            options.dependencies = false;
        }
    })
}

pub fn down(ctx: &AppContext, args: DownArgs) -> Result<()> {
    let DownArgs {
        project,
        rmi,
        volumes,
        remove_orphans,
    } = args;
    run(ctx, ProjectState::Absent, project, |options| {
        options.remove_images = rmi.map(Into::into);
        options.remove_volumes = volumes;
        options.remove_orphans |= remove_orphans;
    })
}

/// Build options from config and flags, then drive the project.
fn run(
    ctx: &AppContext,
    state: ProjectState,
    args: ProjectArgs,
    customize: impl FnOnce(&mut ProjectOptions),
) -> Result<()> {
    let config = Config::load(ctx.config_dir.as_deref())?;
    let options = project_options(&config, state, &args, customize);

    let src = options.project_src.display().to_string();
    let backend = match config.docker_path() {
        Some(path) => DockerCli::with_path(&path)
            .with_context(|| format!("Configured docker CLI {} is unusable", path.display()))?,
        None => DockerCli::new().map_err(|err| explain(err, &src))?,
    };

    let manager = ProjectManager::new(backend, options).map_err(|err| explain(err, &src))?;
    log::info!(
        "Bringing {} to state {}{} (compose {})",
        src,
        manager.options().state,
        if manager.options().check_mode { " in check mode" } else { "" },
        manager.version()
    );

    let mut sink = UiSink { quiet: ctx.quiet };
    let result = manager.run(&mut sink).map_err(|err| explain(err, &src))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result, args.check);
    }

    fail_if_failed(&result.outcome)
}

fn project_options(
    config: &Config,
    state: ProjectState,
    args: &ProjectArgs,
    customize: impl FnOnce(&mut ProjectOptions),
) -> ProjectOptions {
    let mut options = config
        .project_options(paths::expand_path(&args.project_src))
        .with_state(state)
        .with_check_mode(args.check);
    if args.project_name.is_some() {
        options.project_name.clone_from(&args.project_name);
    }
    options.env_files.extend(args.env_files.iter().cloned());
    options.profiles.extend(args.profiles.iter().cloned());
    if args.timeout.is_some() {
        options.timeout = args.timeout;
    }
    customize(&mut options);
    options
}

/// Wrap a library error with context matching where it came from.
fn explain(err: composekit::Error, src: &str) -> anyhow::Error {
    let context = if err.is_contract_violation() {
        INTERNAL_BUG.to_string()
    } else if err.is_precondition() {
        format!("Cannot manage project at {src}")
    } else {
        format!("docker compose failed for {src}")
    };
    anyhow::Error::new(err).context(context)
}

/// Turn a failed outcome into a non-zero exit.
pub fn fail_if_failed(outcome: &Outcome) -> Result<()> {
    if outcome.failed {
        bail!(
            "{}",
            outcome
                .msg
                .as_deref()
                .unwrap_or("docker compose reported a failure")
        );
    }
    Ok(())
}

/// Print the changed flag and action list.
pub fn print_outcome(outcome: &Outcome, check: bool) {
    let verb = if check { "would change" } else { "changed" };
    if outcome.changed {
        let count = outcome.action_count();
        ui::success(&format!(
            "{} ({} action{})",
            verb,
            count,
            if count == 1 { "" } else { "s" }
        ));
    } else {
        ui::info("unchanged");
    }

    for action in &outcome.actions {
        println!(
            "  {} {:<9} {}",
            "•".cyan(),
            action.what.to_string().dimmed(),
            format!("{} {}", action.id, action.status.to_string().yellow())
        );
    }

    if let Some(msg) = &outcome.msg {
        for line in msg.lines() {
            ui::error(line);
        }
    }
}

fn print_result(result: &ProjectResult, check: bool) {
    print_outcome(&result.outcome, check);

    if !result.containers.is_empty() {
        ui::section("Containers");
        for container in &result.containers {
            let state = if container.is_running() {
                container.state.green()
            } else {
                container.state.yellow()
            };
            println!(
                "  {:<30} {:<10} {}",
                container.name,
                state,
                ui::short_id(&container.id).dimmed()
            );
            if !container.status.is_empty() {
                ui::dim(&container.status);
            }
        }
    }

    if !result.images.is_empty() {
        ui::section("Images");
        for image in &result.images {
            let size = image.size.map(ui::format_size).unwrap_or_default();
            ui::kv(
                &format!("{}:{}", image.repository, image.tag),
                &format!("{} {}", ui::short_id(&image.id), size),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> ProjectArgs {
        ProjectArgs {
            project_src: "/srv/flask".to_string(),
            project_name: None,
            env_files: vec![PathBuf::from(".env.local")],
            profiles: vec!["tools".to_string()],
            timeout: None,
            check: true,
            json: false,
        }
    }

    #[test]
    fn test_flags_extend_config_defaults() {
        let mut config = Config::default();
        config.defaults.timeout = Some(10);
        config.defaults.profiles = vec!["debug".to_string()];

        let options = project_options(&config, ProjectState::Stopped, &args(), |_| {});
        assert_eq!(options.project_src, PathBuf::from("/srv/flask"));
        assert_eq!(options.state, ProjectState::Stopped);
        assert!(options.check_mode);
        assert_eq!(options.timeout, Some(10));
        assert_eq!(options.profiles, vec!["debug", "tools"]);
        assert_eq!(options.env_files, vec![PathBuf::from(".env.local")]);
    }

    #[test]
    fn test_flags_override_config_values() {
        let mut config = Config::default();
        config.defaults.timeout = Some(10);
        let mut flags = args();
        flags.timeout = Some(3);
        flags.project_name = Some("demo".to_string());

        let options = project_options(&config, ProjectState::Absent, &flags, |o| {
            o.remove_volumes = true;
        });
        assert_eq!(options.timeout, Some(3));
        assert_eq!(options.project_name.as_deref(), Some("demo"));
        assert!(options.remove_volumes);
    }

    #[test]
    fn test_explain_labels_error_origin() {
        let bug = explain(
            composekit::Error::UnrecognizedResourceKind("Secret".to_string()),
            "/srv/flask",
        );
        assert_eq!(bug.to_string(), INTERNAL_BUG);
        assert!(bug.root_cause().to_string().contains("Secret"));

        let setup = explain(
            composekit::Error::NotADirectory(PathBuf::from("/srv/flask")),
            "/srv/flask",
        );
        assert_eq!(setup.to_string(), "Cannot manage project at /srv/flask");

        let run = explain(
            composekit::Error::CommandFailed {
                args: vec!["compose".to_string(), "up".to_string()],
                code: 1,
                stderr: "no such service".to_string(),
            },
            "/srv/flask",
        );
        assert_eq!(run.to_string(), "docker compose failed for /srv/flask");
    }

    #[test]
    fn test_fail_if_failed() {
        assert!(fail_if_failed(&Outcome::default()).is_ok());
        let failed = Outcome {
            failed: true,
            msg: Some("Error when processing container web: Error".to_string()),
            ..Outcome::default()
        };
        let err = fail_if_failed(&failed).unwrap_err();
        assert_eq!(err.to_string(), "Error when processing container web: Error");
    }
}
