/// Where the frames left over after splitting a range's free time evenly across its auto frames
/// end up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPlacement {
    /// On the last frame of the range, whether or not it is an auto frame.
    #[default]
    LastFrame,
    /// On the last auto frame, so explicit durations are never stretched.
    LastAutoFrame,
}

/// Knobs for [`crate::compile::pipeline::compile_project`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompileOpts {
    /// Coalesce consecutive speech of the same voice into one synthesis unit.
    pub merge_speech: bool,
    pub remainder: RemainderPlacement,
}
