//! Library entry for textrec-cli used by integration tests and embedding.

pub mod commands;

use textrec_core::ContainerProfile;

/// Container profile selectable on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Profile {
    /// Variant tag only
    Small,
    /// Variant tag, category and record id
    Medium,
    /// Container name, variant tag, size, category and record id
    Large,
}

impl From<Profile> for ContainerProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Small => ContainerProfile::Small,
            Profile::Medium => ContainerProfile::Medium,
            Profile::Large => ContainerProfile::Large,
        }
    }
}
