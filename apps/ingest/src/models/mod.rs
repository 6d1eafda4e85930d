pub mod provenance;
pub mod resume;

pub use provenance::{FallbackReason, Provenance};
pub use resume::{Contact, Education, Experience, StructuredResume};
