//! Feature modules storing their settings as application data subsets.

pub mod fastdeploy;
pub mod sources;

pub use fastdeploy::{FastDeployApplicationData, ValidationError};
pub use sources::SourcesData;
