//! Argument construction for `docker compose` invocations.

use crate::types::{ProjectOptions, Recreate};
use crate::version::{self, ComposeVersion};

/// Builds argument vectors for one project and plugin version.
#[derive(Debug, Clone)]
pub struct CommandBuilder<'a> {
    options: &'a ProjectOptions,
    version: &'a ComposeVersion,
}

impl<'a> CommandBuilder<'a> {
    /// Builder for `options` against the detected plugin version.
    pub fn new(options: &'a ProjectOptions, version: &'a ComposeVersion) -> Self {
        Self { options, version }
    }

    /// Arguments shared by every invocation, up to and including the profiles.
    pub fn base_args(&self) -> Vec<String> {
        let mut args = strings(&["compose", "--ansi", "never"]);
        if self.version.at_least(&version::PROGRESS_PLAIN) {
            args.extend(strings(&["--progress", "plain"]));
        }
        args.push("--project-directory".to_string());
        args.push(self.options.project_src.display().to_string());
        if let Some(name) = &self.options.project_name {
            args.push("--project-name".to_string());
            args.push(name.clone());
        }
        for env_file in &self.options.env_files {
            args.push("--env-file".to_string());
            args.push(env_file.display().to_string());
        }
        for profile in &self.options.profiles {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
        args
    }

    /// `up --detach`, optionally creating containers without starting them.
    pub fn up(&self, dry_run: bool, no_start: bool) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(strings(&["up", "--detach", "--no-color"]));
        if self.options.remove_orphans {
            args.push("--remove-orphans".to_string());
        }
        match self.options.recreate {
            Recreate::Always => args.push("--force-recreate".to_string()),
            Recreate::Never => args.push("--no-recreate".to_string()),
            Recreate::Auto => {}
        }
        if !self.options.dependencies {
            args.push("--no-deps".to_string());
        }
        self.push_timeout(&mut args);
        if no_start {
            args.push("--no-start".to_string());
        }
        finish(args, dry_run)
    }

    /// `stop`, with the configured timeout.
    pub fn stop(&self, dry_run: bool) -> Vec<String> {
        let mut args = self.base_args();
        args.push("stop".to_string());
        self.push_timeout(&mut args);
        finish(args, dry_run)
    }

    /// `restart`, honoring `dependencies` and the timeout.
    pub fn restart(&self, dry_run: bool) -> Vec<String> {
        let mut args = self.base_args();
        args.push("restart".to_string());
        if !self.options.dependencies {
            args.push("--no-deps".to_string());
        }
        self.push_timeout(&mut args);
        finish(args, dry_run)
    }

    /// `down`, with orphan, image and volume removal as configured.
    pub fn down(&self, dry_run: bool) -> Vec<String> {
        let mut args = self.base_args();
        args.push("down".to_string());
        if self.options.remove_orphans {
            args.push("--remove-orphans".to_string());
        }
        if let Some(images) = self.options.remove_images {
            args.push("--rmi".to_string());
            args.push(images.as_str().to_string());
        }
        if self.options.remove_volumes {
            args.push("--volumes".to_string());
        }
        self.push_timeout(&mut args);
        finish(args, dry_run)
    }

    /// `ps` listing every container of the project as JSON.
    pub fn ps(&self) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(strings(&["ps", "--format", "json", "--all"]));
        if self.version.at_least(&version::PS_NO_TRUNC) {
            args.push("--no-trunc".to_string());
        }
        args
    }

    /// `images` as JSON.
    pub fn images(&self) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(strings(&["images", "--format", "json"]));
        args
    }

    /// Whether `ps --format json` prints one object per line.
    pub fn ps_emits_json_lines(&self) -> bool {
        self.version.at_least(&version::PS_JSON_LINES)
    }

    fn push_timeout(&self, args: &mut Vec<String>) {
        if let Some(timeout) = self.options.timeout {
            args.push("--timeout".to_string());
            args.push(timeout.to_string());
        }
    }
}

fn finish(mut args: Vec<String>, dry_run: bool) -> Vec<String> {
    if dry_run {
        args.push("--dry-run".to_string());
    }
    args.push("--".to_string());
    args
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RemoveImages;
    use std::path::PathBuf;

    fn options() -> ProjectOptions {
        ProjectOptions::new("/srv/flask")
    }

    #[test]
    fn test_base_args_before_progress_plain() {
        let opts = options();
        let version = ComposeVersion::new(2, 18, 1);
        let args = CommandBuilder::new(&opts, &version).base_args();
        assert_eq!(
            args,
            vec!["compose", "--ansi", "never", "--project-directory", "/srv/flask"]
        );
    }

    #[test]
    fn test_base_args_with_everything() {
        let mut opts = options();
        opts.project_name = Some("flask".to_string());
        opts.env_files = vec![PathBuf::from(".env.prod")];
        opts.profiles = vec!["debug".to_string(), "tools".to_string()];
        let version = ComposeVersion::new(2, 23, 3);
        let args = CommandBuilder::new(&opts, &version).base_args();
        assert_eq!(
            args,
            vec![
                "compose",
                "--ansi",
                "never",
                "--progress",
                "plain",
                "--project-directory",
                "/srv/flask",
                "--project-name",
                "flask",
                "--env-file",
                ".env.prod",
                "--profile",
                "debug",
                "--profile",
                "tools",
            ]
        );
    }

    #[test]
    fn test_up_flags() {
        let mut opts = options();
        opts.remove_orphans = true;
        opts.recreate = Recreate::Always;
        opts.dependencies = false;
        opts.timeout = Some(30);
        let version = ComposeVersion::new(2, 18, 0);
        let args = CommandBuilder::new(&opts, &version).up(true, true);
        let tail: Vec<_> = args.iter().skip(5).map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "up",
                "--detach",
                "--no-color",
                "--remove-orphans",
                "--force-recreate",
                "--no-deps",
                "--timeout",
                "30",
                "--no-start",
                "--dry-run",
                "--",
            ]
        );
    }

    #[test]
    fn test_up_never_recreate() {
        let mut opts = options();
        opts.recreate = Recreate::Never;
        let version = ComposeVersion::new(2, 18, 0);
        let args = CommandBuilder::new(&opts, &version).up(false, false);
        assert!(args.contains(&"--no-recreate".to_string()));
        assert!(!args.contains(&"--dry-run".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("--"));
    }

    #[test]
    fn test_stop_restart_down() {
        let mut opts = options();
        opts.timeout = Some(5);
        opts.dependencies = false;
        opts.remove_images = Some(RemoveImages::Local);
        opts.remove_volumes = true;
        let version = ComposeVersion::new(2, 18, 0);
        let builder = CommandBuilder::new(&opts, &version);

        let stop: Vec<_> = builder.stop(false).into_iter().skip(5).collect();
        assert_eq!(stop, vec!["stop", "--timeout", "5", "--"]);

        let restart: Vec<_> = builder.restart(true).into_iter().skip(5).collect();
        assert_eq!(
            restart,
            vec!["restart", "--no-deps", "--timeout", "5", "--dry-run", "--"]
        );

        let down: Vec<_> = builder.down(false).into_iter().skip(5).collect();
        assert_eq!(
            down,
            vec!["down", "--rmi", "local", "--volumes", "--timeout", "5", "--"]
        );
    }

    #[test]
    fn test_ps_version_gates() {
        let opts = options();

        let old = ComposeVersion::new(2, 20, 3);
        let builder = CommandBuilder::new(&opts, &old);
        assert!(!builder.ps().contains(&"--no-trunc".to_string()));
        assert!(!builder.ps_emits_json_lines());

        let mid = ComposeVersion::new(2, 21, 0);
        let builder = CommandBuilder::new(&opts, &mid);
        assert!(!builder.ps().contains(&"--no-trunc".to_string()));
        assert!(builder.ps_emits_json_lines());

        let new = ComposeVersion::new(2, 23, 0);
        let builder = CommandBuilder::new(&opts, &new);
        assert!(builder.ps().ends_with(&["--all".to_string(), "--no-trunc".to_string()]));
    }
}
