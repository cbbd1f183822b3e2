//! Error types for the engine binary.

/// Errors that can occur during engine startup or the simulation loop.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: outpost_core::ConfigError,
    },

    /// The starting world could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: outpost_world::WorldError,
    },
}
