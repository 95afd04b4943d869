pub mod error;
pub mod features;
pub mod insights;
pub mod profile;
pub mod scoring;

pub use error::AssessmentError;
pub use features::*;
pub use insights::*;
pub use profile::*;
pub use scoring::*;
