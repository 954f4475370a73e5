use super::*;

struct Named(&'static str);

impl VoiceProvider for Named {
    fn synthesize(&self, _text: &str, _scratch_dir: &Path) -> anyhow::Result<()> {
        Ok(())
    }

    fn id(&self) -> &str {
        self.0
    }
}

#[test]
fn voices_compare_by_provider_id() {
    let a = Voice::new(Named("local/a"));
    let a2 = Voice::new(Named("local/a"));
    let b = Voice::new(Named("local/b"));
    assert_eq!(a, a2);
    assert_ne!(a, b);
    assert_eq!(format!("{a:?}"), "Voice(\"local/a\")");
}

#[test]
fn metadata_defaults_to_none() {
    assert!(Named("x").metadata().is_none());
}

#[test]
fn preview_keeps_short_text_and_shortens_long_text() {
    assert_eq!(preview("  hello\n world ", 40), "hello world");
    let long = "the quick brown fox jumps over the lazy dog and keeps running far away";
    let p = preview(long, 40);
    assert!(p.ends_with("[...]"));
    assert!(p.chars().count() <= 40);
}
