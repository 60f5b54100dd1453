// Application layer - Use case interactors

pub mod artifacts;
pub mod clip_interactor;
pub mod container;

// Re-export interactors
pub use artifacts::ArtifactSet;
pub use clip_interactor::{ClipInteractor, ClipOutput, ClipPorts, ClipSettings};
pub use container::{AppContainer, DefaultAppContainer, ToolReport};
