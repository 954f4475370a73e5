//! Speech synthesis backends and the registry that names them.

/// Local synthesis through the Coqui `tts` command.
pub mod coqui;
/// Remote synthesis through an OpenAI-compatible speech endpoint.
#[cfg(feature = "openai")]
pub mod openai;
/// Provider capability trait and shared voice handle.
pub mod provider;
/// Explicit name → voice registry.
pub mod registry;
