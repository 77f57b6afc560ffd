use std::process::{Command, Output, Stdio};

use log::debug;

use super::types::{ContainerState, InspectError, InspectRecord};

pub const DEFAULT_RUNTIME: &str = "docker";

/// Read-only view of a container runtime.
pub trait Runtime {
    /// Verify that the runtime daemon is reachable.
    fn ping(&self) -> Result<(), InspectError>;

    /// Look up the running state and address of a container by name.
    fn inspect(&self, container: &str) -> Result<ContainerState, InspectError>;
}

/// Talks to the runtime through its CLI (`docker`, or anything
/// argument-compatible such as `podman`).
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn output(&self, args: &[&str]) -> Result<Output, InspectError> {
        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                InspectError::RuntimeUnreachable(format!(
                    "failed to invoke `{}` ({e}) - is it installed and on PATH?",
                    self.binary
                ))
            })
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME)
    }
}

impl Runtime for DockerCli {
    fn ping(&self) -> Result<(), InspectError> {
        let output = self.output(&["version", "--format", "{{.Server.Version}}"])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InspectError::RuntimeUnreachable(format!(
                "{} daemon is not running ({}): {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn inspect(&self, container: &str) -> Result<ContainerState, InspectError> {
        let output = self.output(&["inspect", "--type", "container", container])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("`{} inspect {container}` exited with {}", self.binary, output.status);
            return Err(classify_failure(&stderr));
        }
        parse_inspect(container, &output.stdout)
    }
}

/// Map the runtime's error text onto an [`InspectError`] kind.
pub(crate) fn classify_failure(stderr: &str) -> InspectError {
    let msg = stderr.trim().to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("no such container") || lower.contains("no such object") {
        InspectError::NotFound(msg)
    } else if lower.contains("cannot connect to the docker daemon")
        || lower.contains("is the docker daemon running")
    {
        InspectError::RuntimeUnreachable(msg)
    } else {
        InspectError::Transient(msg)
    }
}

/// Decode the JSON array printed by `docker inspect`.
pub(crate) fn parse_inspect(container: &str, raw: &[u8]) -> Result<ContainerState, InspectError> {
    let records: Vec<InspectRecord> = serde_json::from_slice(raw)
        .map_err(|e| InspectError::Transient(format!("unexpected inspect output: {e}")))?;

    records
        .into_iter()
        .next()
        .map(ContainerState::from)
        .ok_or_else(|| InspectError::NotFound(container.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_does_not_panic() {
        // CI may or may not have Docker.
        let _ = DockerCli::default().ping();
    }

    #[test]
    fn missing_binary_is_unreachable() {
        let cli = DockerCli::new("wait-for-port-no-such-runtime");
        assert!(matches!(cli.ping(), Err(InspectError::RuntimeUnreachable(_))));
        assert!(matches!(
            cli.inspect("db"),
            Err(InspectError::RuntimeUnreachable(_))
        ));
    }

    #[test]
    fn classifies_missing_container() {
        let err = classify_failure("Error: No such container: db\n");
        assert_eq!(err, InspectError::NotFound("Error: No such container: db".into()));

        let err = classify_failure("Error response from daemon: no such object: db");
        assert!(matches!(err, InspectError::NotFound(_)));
    }

    #[test]
    fn classifies_daemon_down() {
        let err = classify_failure(
            "Cannot connect to the Docker daemon at unix:///var/run/docker.sock. Is the docker daemon running?",
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn other_failures_are_transient() {
        let err = classify_failure("context deadline exceeded");
        assert!(matches!(err, InspectError::Transient(_)));
    }

    #[test]
    fn parses_first_record() {
        let raw = br#"[{"State": {"Running": true}, "NetworkSettings": {"IPAddress": "172.17.0.3"}}]"#;
        let state = parse_inspect("db", raw).unwrap();
        assert!(state.running);
        assert_eq!(state.ip_address, Some("172.17.0.3".parse().unwrap()));
    }

    #[test]
    fn empty_array_is_not_found() {
        assert_eq!(
            parse_inspect("db", b"[]"),
            Err(InspectError::NotFound("db".into()))
        );
    }

    #[test]
    fn malformed_output_is_transient() {
        assert!(matches!(
            parse_inspect("db", b"{oops"),
            Err(InspectError::Transient(_))
        ));
    }
}
