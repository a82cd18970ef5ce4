//! Device layer: endpoint, registry, control surface
//!
//! Konsumen dari channel layer. Mengatur wiring endpoint ke channel,
//! limit reader/writer per endpoint, dan query/resize buffer.

mod control;
mod endpoint;
mod registry;

pub use control::{
    Control, CMD_BUFFER_SIZE, CMD_FREE_SPACE, CMD_MAX_READERS, CMD_SET_BUFFER_SIZE,
    CMD_SET_MAX_READERS, CMD_USED_SPACE,
};
pub use endpoint::Endpoint;
pub use registry::{Access, EndpointHandle, PipeRegistry};
