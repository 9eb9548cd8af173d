//! Drive a Compose project to a desired state and report what happened.

use crate::backend::Backend;
use crate::command::CommandBuilder;
use crate::error::{Error, Result};
use crate::events::parse_events;
use crate::inventory::{self, Container, Image};
use crate::reconcile::emit_warnings;
use crate::types::{Outcome, ProjectOptions, ProjectState};
use crate::version::{self, ComposeVersion};
use crate::warning::{Tee, Warning, WarningSink};
use serde::Serialize;

/// File names Compose looks for in the project directory.
pub const COMPOSE_FILES: [&str; 4] = [
    "compose.yaml",
    "compose.yml",
    "docker-compose.yml",
    "docker-compose.yaml",
];

/// Final result of [`ProjectManager::run`].
#[derive(Debug, Clone, Serialize)]
pub struct ProjectResult {
    /// Reconciled outcome of the lifecycle operation
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Containers after the operation
    pub containers: Vec<Container>,
    /// Images used by the project after the operation
    pub images: Vec<Image>,
    /// Warnings raised while parsing Compose output
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

/// Runs lifecycle operations for one project against a backend.
pub struct ProjectManager<B: Backend> {
    backend: B,
    options: ProjectOptions,
    version: ComposeVersion,
}

impl<B: Backend> ProjectManager<B> {
    /// Validate the environment and project before anything is invoked.
    pub fn new(backend: B, options: ProjectOptions) -> Result<Self> {
        let raw = backend
            .compose_version()?
            .ok_or_else(|| Error::ComposePluginMissing { cli: backend.cli() })?;
        let version = ComposeVersion::parse(&raw)?;
        if !version.at_least(&version::MINIMUM) {
            return Err(Error::UnsupportedVersion {
                cli: backend.cli(),
                version: version.to_string(),
                minimum: version::MINIMUM.to_string(),
            });
        }
        log::debug!("compose plugin version {version}");

        let src = &options.project_src;
        if !src.is_dir() {
            return Err(Error::NotADirectory(src.clone()));
        }
        if !COMPOSE_FILES.iter().any(|name| src.join(name).is_file()) {
            return Err(Error::ComposeFileNotFound {
                path: src.clone(),
                expected: COMPOSE_FILES.join(" or "),
            });
        }

        Ok(Self {
            backend,
            options,
            version,
        })
    }

    /// Detected compose plugin version.
    pub fn version(&self) -> &ComposeVersion {
        &self.version
    }

    /// Options the manager was built with.
    pub fn options(&self) -> &ProjectOptions {
        &self.options
    }

    fn commands(&self) -> CommandBuilder<'_> {
        CommandBuilder::new(&self.options, &self.version)
    }

    /// Bring the project to `options.state`, then list containers and images.
    ///
    /// Warnings go to `sink` as they happen and are also attached to the result.
    pub fn run(&self, sink: &mut dyn WarningSink) -> Result<ProjectResult> {
        let mut warnings: Vec<Warning> = Vec::new();
        let outcome = {
            let mut tee = Tee(sink, &mut warnings);
            match self.options.state {
                ProjectState::Present => self.up(&mut tee)?,
                ProjectState::Stopped => self.stop(&mut tee)?,
                ProjectState::Restarted => self.restart(&mut tee)?,
                ProjectState::Absent => self.down(&mut tee)?,
            }
        };

        Ok(ProjectResult {
            outcome,
            containers: self.list_containers()?,
            images: self.list_images()?,
            warnings,
        })
    }

    /// `docker compose up --detach`.
    pub fn up(&self, sink: &mut dyn WarningSink) -> Result<Outcome> {
        let check = self.options.check_mode;
        self.invoke(&self.commands().up(check, false), sink)
    }

    /// `docker compose stop`, skipped when nothing is running.
    ///
    /// `stop` claims to stop every container even when they are all stopped
    /// already, so containers are first created without starting them, then
    /// the live states decide whether the real stop runs at all.
    pub fn stop(&self, sink: &mut dyn WarningSink) -> Result<Outcome> {
        let check = self.options.check_mode;
        let created = self.invoke(&self.commands().up(check, true), sink)?;

        let containers = self.list_containers()?;
        if inventory::all_stopped(&containers) {
            log::info!("All containers already stopped; skipping stop");
            return Ok(created);
        }

        let stopped = self.invoke(&self.commands().stop(check), sink)?;
        Ok(created.merge(stopped))
    }

    /// `docker compose restart`.
    pub fn restart(&self, sink: &mut dyn WarningSink) -> Result<Outcome> {
        let check = self.options.check_mode;
        self.invoke(&self.commands().restart(check), sink)
    }

    /// `docker compose down`.
    pub fn down(&self, sink: &mut dyn WarningSink) -> Result<Outcome> {
        let check = self.options.check_mode;
        self.invoke(&self.commands().down(check), sink)
    }

    /// Every container of the project, stopped ones included.
    pub fn list_containers(&self) -> Result<Vec<Container>> {
        let commands = self.commands();
        let output = self
            .backend
            .run_checked(&commands.ps(), &self.options.project_src)?;
        inventory::parse_containers(&output.stdout, commands.ps_emits_json_lines())
    }

    /// Images used by the project.
    pub fn list_images(&self) -> Result<Vec<Image>> {
        let output = self
            .backend
            .run_checked(&self.commands().images(), &self.options.project_src)?;
        inventory::parse_images(&output.stdout)
    }

    /// Run one mutating invocation and reconcile its stderr.
    fn invoke(&self, args: &[String], sink: &mut dyn WarningSink) -> Result<Outcome> {
        let output = self.backend.run_checked(args, &self.options.project_src)?;
        let events = parse_events(&output.stderr, self.options.check_mode)?.into_events(sink);
        emit_warnings(&events, sink);
        Ok(Outcome::from_events(&events))
    }
}
