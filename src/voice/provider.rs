use std::{fmt, path::Path, sync::Arc};

/// Capability set every speech backend offers to the sample cache.
///
/// `synthesize` must leave exactly one audio file in `scratch_dir`; the cache moves it into the
/// store afterwards. Providers own their retry policy (e.g. for rate limiting).
pub trait VoiceProvider: Send + Sync {
    /// Synthesize `text` into a single audio file inside `scratch_dir`.
    fn synthesize(&self, text: &str, scratch_dir: &Path) -> anyhow::Result<()>;

    /// Stable identifier; also the sample cache sub-directory for this voice.
    fn id(&self) -> &str;

    /// Optional provider metadata persisted next to the cached samples.
    fn metadata(&self) -> Option<String> {
        None
    }
}

/// Shared handle to a [`VoiceProvider`].
///
/// Two voices are equal when their provider ids are equal.
#[derive(Clone)]
pub struct Voice(Arc<dyn VoiceProvider>);

impl Voice {
    /// Wrap a provider.
    pub fn new(provider: impl VoiceProvider + 'static) -> Self {
        Self(Arc::new(provider))
    }

    /// Wrap an already shared provider.
    pub fn from_arc(provider: Arc<dyn VoiceProvider>) -> Self {
        Self(provider)
    }

    /// Provider id.
    pub fn id(&self) -> &str {
        self.0.id()
    }

    /// Borrow the provider.
    pub fn provider(&self) -> &dyn VoiceProvider {
        self.0.as_ref()
    }
}

impl PartialEq for Voice {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Voice {}

impl fmt::Debug for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Voice").field(&self.id()).finish()
    }
}

/// Shorten `text` to at most `width` characters for log lines, on a word boundary when possible.
pub(crate) fn preview(text: &str, width: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }
    let budget = width.saturating_sub(6);
    let mut out = String::new();
    for word in collapsed.split(' ') {
        let extra = if out.is_empty() { 0 } else { 1 } + word.chars().count();
        if out.chars().count() + extra > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out.push_str(" [...]");
    out
}

#[cfg(test)]
#[path = "../../tests/unit/voice/provider.rs"]
mod tests;
