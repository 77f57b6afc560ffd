// Container runtime access — daemon reachability and container inspection.

pub mod engine;
pub mod types;

pub use engine::{DEFAULT_RUNTIME, DockerCli, Runtime};
pub use types::{ContainerState, InspectError};
