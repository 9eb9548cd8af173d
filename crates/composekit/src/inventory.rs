//! Container and image listings from `docker compose ps` / `images`.
//!
//! `ps --format json` printed a JSON array before 2.21.0 and one object per
//! line after; both are accepted. Several fields come back as comma-joined
//! strings and are split here so callers get real lists and maps.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Container states in which `stop` has nothing left to do.
pub const STOPPED_STATES: [&str; 4] = ["created", "exited", "stopped", "killed"];

/// Container record as printed by `ps --format json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawContainer {
    /// Container ID
    #[serde(rename = "ID", default)]
    pub id: String,
    /// Container name
    #[serde(default)]
    pub name: String,
    /// Names, comma-separated when raw
    pub names: Option<String>,
    /// Labels
    pub labels: Option<String>,
    /// Attached networks
    pub networks: Option<String>,
    /// Published ports
    pub publishers: Option<Vec<Publisher>>,
    /// Lifecycle state such as `running` or `exited`
    #[serde(default)]
    pub state: String,
    /// Human-readable status
    #[serde(default)]
    pub status: String,
    /// Compose service
    #[serde(default)]
    pub service: String,
    /// Image reference
    #[serde(default)]
    pub image: String,
    /// Entrypoint command
    #[serde(default)]
    pub command: serde_json::Value,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Exit code of the last run
    pub exit_code: Option<i64>,
    /// Health check state
    #[serde(default)]
    pub health: serde_json::Value,
    /// Number of local volumes
    #[serde(default)]
    pub local_volumes: serde_json::Value,
    /// Mounted volumes
    #[serde(default)]
    pub mounts: serde_json::Value,
    /// Port summary
    #[serde(default)]
    pub ports: serde_json::Value,
    /// Uptime
    #[serde(default)]
    pub running_for: String,
    /// Disk usage
    #[serde(default)]
    pub size: serde_json::Value,
}

/// A published port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Publisher {
    /// Host address
    #[serde(rename = "URL", default)]
    pub url: String,
    /// Port inside the container
    #[serde(default)]
    pub target_port: u16,
    /// Port on the host, 0 when unpublished
    #[serde(default)]
    pub published_port: u16,
    /// `tcp` or `udp`
    #[serde(default)]
    pub protocol: String,
}

/// Normalized container record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Container {
    /// Container ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Container name
    pub name: String,
    /// Every name of the container
    pub names: Vec<String>,
    /// Labels split into key/value pairs
    pub labels: BTreeMap<String, String>,
    /// Attached networks
    pub networks: Vec<String>,
    /// Published ports
    pub publishers: Vec<Publisher>,
    /// Lifecycle state such as `running` or `exited`
    pub state: String,
    /// Human-readable status
    pub status: String,
    /// Compose service
    pub service: String,
    /// Image reference
    pub image: String,
    /// Entrypoint command
    pub command: serde_json::Value,
    /// Creation timestamp
    pub created_at: String,
    /// Exit code of the last run
    pub exit_code: Option<i64>,
    /// Health check state
    pub health: serde_json::Value,
    /// Number of local volumes
    pub local_volumes: serde_json::Value,
    /// Mounted volumes
    pub mounts: serde_json::Value,
    /// Port summary
    pub ports: serde_json::Value,
    /// Uptime
    pub running_for: String,
    /// Disk usage
    pub size: serde_json::Value,
}

impl Container {
    /// Whether `stop` would be a no-op for this container.
    pub fn is_stopped(&self) -> bool {
        STOPPED_STATES.contains(&self.state.as_str())
    }

    /// Whether the container is up.
    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

impl From<RawContainer> for Container {
    fn from(raw: RawContainer) -> Self {
        let names = match raw.names.as_deref() {
            Some(names) => split_list(names),
            None => vec![raw.name.clone()],
        };
        Self {
            id: raw.id,
            name: raw.name,
            names,
            labels: raw.labels.as_deref().map(parse_labels).unwrap_or_default(),
            networks: split_list(raw.networks.as_deref().unwrap_or_default()),
            publishers: raw.publishers.unwrap_or_default(),
            state: raw.state,
            status: raw.status,
            service: raw.service,
            image: raw.image,
            command: raw.command,
            created_at: raw.created_at,
            exit_code: raw.exit_code,
            health: raw.health,
            local_volumes: raw.local_volumes,
            mounts: raw.mounts,
            ports: raw.ports,
            running_for: raw.running_for,
            size: raw.size,
        }
    }
}

/// Image record as printed by `images --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Image {
    /// Image ID
    #[serde(rename = "ID", default)]
    pub id: String,
    /// Container using the image
    #[serde(default)]
    pub container_name: String,
    /// Repository name
    #[serde(default)]
    pub repository: String,
    /// Tag
    #[serde(default)]
    pub tag: String,
    /// Size in bytes
    pub size: Option<u64>,
}

/// Parse a JSON document. Empty output counts as an empty list.
pub fn parse_json<T: DeserializeOwned>(stdout: &str) -> Result<Vec<T>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(stdout)?)
}

/// Parse one JSON object per non-blank line.
pub fn parse_json_lines<T: DeserializeOwned>(stdout: &str) -> Result<Vec<T>> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).map_err(Into::into))
        .collect()
}

/// Parse `ps` output in whichever shape the plugin version prints.
pub fn parse_containers(stdout: &str, json_lines: bool) -> Result<Vec<Container>> {
    let raw: Vec<RawContainer> = if json_lines {
        parse_json_lines(stdout)?
    } else {
        parse_json(stdout)?
    };
    Ok(raw.into_iter().map(Container::from).collect())
}

/// Parse `images` output.
pub fn parse_images(stdout: &str) -> Result<Vec<Image>> {
    parse_json(stdout)
}

/// True when no container would be affected by `stop`.
pub fn all_stopped(containers: &[Container]) -> bool {
    containers.iter().all(Container::is_stopped)
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

fn parse_labels(value: &str) -> BTreeMap<String, String> {
    value
        .split(',')
        .map(|part| match part.split_once('=') {
            Some((key, val)) => (key.to_string(), val.to_string()),
            None => (part.to_string(), String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PS_LINE: &str = r#"{"Command":"\"flask run\"","CreatedAt":"2024-01-02 12:20:41 +0100 CET","ExitCode":0,"Health":"","ID":"44a7d607219a","Image":"flask-web","Labels":"com.docker.compose.project=flask,com.docker.compose.service=web,flag","LocalVolumes":"0","Mounts":"","Name":"flask_web_1","Names":"flask_web_1","Networks":"flask_default,bridge","Ports":"","Publishers":null,"RunningFor":"About a minute ago","Service":"web","Size":"0B","State":"running","Status":"Up About a minute"}"#;

    #[test]
    fn test_container_normalization() {
        let containers = parse_containers(PS_LINE, true).unwrap();
        assert_eq!(containers.len(), 1);
        let c = &containers[0];
        assert_eq!(c.id, "44a7d607219a");
        assert_eq!(c.names, vec!["flask_web_1"]);
        assert_eq!(c.networks, vec!["flask_default", "bridge"]);
        assert_eq!(c.labels["com.docker.compose.service"], "web");
        assert_eq!(c.labels["flag"], "");
        assert!(c.publishers.is_empty());
        assert_eq!(c.exit_code, Some(0));
        assert!(c.is_running());
        assert!(!c.is_stopped());
    }

    #[test]
    fn test_missing_names_falls_back_to_name() {
        let containers = parse_containers(r#"[{"Name":"db","State":"exited"}]"#, false).unwrap();
        assert_eq!(containers[0].names, vec!["db"]);
        assert!(containers[0].labels.is_empty());
        assert_eq!(containers[0].networks, vec![""]);
        assert!(containers[0].is_stopped());
    }

    #[test]
    fn test_publishers_are_parsed() {
        let line = r#"{"Name":"web","State":"running","Publishers":[{"URL":"0.0.0.0","TargetPort":5000,"PublishedPort":8000,"Protocol":"tcp"}]}"#;
        let containers = parse_containers(line, true).unwrap();
        assert_eq!(
            containers[0].publishers,
            vec![Publisher {
                url: "0.0.0.0".to_string(),
                target_port: 5000,
                published_port: 8000,
                protocol: "tcp".to_string(),
            }]
        );
    }

    #[test]
    fn test_json_lines_skip_blank_lines() {
        let stdout = "{\"Name\":\"a\",\"State\":\"created\"}\n\n{\"Name\":\"b\",\"State\":\"killed\"}\n";
        let containers = parse_containers(stdout, true).unwrap();
        assert_eq!(containers.len(), 2);
        assert!(all_stopped(&containers));
    }

    #[test]
    fn test_empty_output_is_empty_list() {
        assert!(parse_containers("", false).unwrap().is_empty());
        assert!(parse_containers("\n", true).unwrap().is_empty());
        assert!(parse_images("  ").unwrap().is_empty());
        assert!(all_stopped(&[]));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(parse_containers("{not json", true).is_err());
        assert!(parse_images("[{]").is_err());
    }

    #[test]
    fn test_parse_images() {
        let stdout = r#"[{"ContainerName":"flask_web_1","Repository":"flask-web","Tag":"latest","ID":"sha256:c8bccc0af957","Size":54000000}]"#;
        let images = parse_images(stdout).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].container_name, "flask_web_1");
        assert_eq!(images[0].size, Some(54_000_000));
    }

    #[test]
    fn test_container_serializes_with_compose_field_names() {
        let containers = parse_containers(PS_LINE, true).unwrap();
        let json = serde_json::to_value(&containers[0]).unwrap();
        assert_eq!(json["ID"], "44a7d607219a");
        assert_eq!(json["Names"], serde_json::json!(["flask_web_1"]));
        assert_eq!(json["State"], "running");
    }
}
