//! Agent definitions: records, the registry that owns them, and the
//! transfer relations derived between them

pub mod profile;
pub mod registry;
pub mod relations;

pub use profile::{AgentRecord, DEFAULT_MODEL};
pub use registry::AgentRegistry;
