// ABOUTME: Type-safe identifiers and canonical inventory records.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;
mod record;

pub use id::{ContainerId, EngineId, Id, ImageId, PodId};
pub use record::{ContainerRecord, ContainerState, PodRef, PortMapping, Protocol};
