use super::*;
use crate::{
    timeline::event::TimelineEvent,
    voice::{provider::VoiceProvider, registry::VoiceRegistry},
};

struct Silent;

impl VoiceProvider for Silent {
    fn synthesize(&self, _text: &str, _scratch_dir: &Path) -> anyhow::Result<()> {
        Ok(())
    }

    fn id(&self) -> &str {
        "local/silent"
    }
}

fn registry() -> VoiceRegistry {
    let mut reg = VoiceRegistry::new();
    reg.register_provider("silent", Voice::new(Silent)).unwrap();
    reg.register_alias("default", "silent").unwrap();
    reg
}

#[test]
fn parses_every_command_shape() {
    let cmds = parse_script(
        r#"[
            {"set_pdf": "talk.pdf"},
            {"show_slide": 2},
            "show_next_slide",
            {"show_slide_range": [3, 5]},
            {"set_voice": "silent"},
            {"speak": "hello"},
            {"delay": 0.25},
            {"play_audio": "a.wav"},
            {"set_resolution": [1280, 720]},
            {"register_voice": {"name": "local", "voice": {"coqui": "tts_models/x"}}},
            {"register_voice": {"name": "nick", "voice": {"alias": "local"}}},
            {"deregister_voice": "nick"}
        ]"#,
    )
    .unwrap();

    assert_eq!(cmds.len(), 12);
    assert_eq!(cmds[0], ScriptCommand::SetPdf("talk.pdf".into()));
    assert_eq!(cmds[2], ScriptCommand::ShowNextSlide);
    assert_eq!(cmds[3], ScriptCommand::ShowSlideRange(3, 5));
    assert_eq!(cmds[8], ScriptCommand::SetResolution(1280, 720));
    assert_eq!(
        cmds[9],
        ScriptCommand::RegisterVoice {
            name: "local".into(),
            voice: VoiceSpec::Coqui("tts_models/x".into())
        }
    );
}

#[test]
fn unknown_commands_are_configuration_errors() {
    let err = parse_script(r#"[{"dance": true}]"#).unwrap_err();
    assert!(matches!(err, TavoxError::Configuration(_)));
}

#[test]
fn run_script_resolves_paths_against_the_script_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("talk");
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(dir.join("slides.pdf"), b"%PDF").unwrap();
    std::fs::write(
        dir.join("script.json"),
        r#"[{"set_pdf": "slides.pdf"}, {"show_slide": 1}, {"speak": "hi"}]"#,
    )
    .unwrap();

    let mut b = ProjectBuilder::new(registry(), tmp.path()).unwrap();
    run_script(&dir.join("script.json"), &mut b).unwrap();

    assert_eq!(b.base_dir(), tmp.path());
    let project = b.finish();
    assert_eq!(
        project.timeline[0],
        TimelineEvent::ShowSlide {
            pdf: dir.join("slides.pdf"),
            slide: 1
        }
    );
    assert!(matches!(&project.timeline[1], TimelineEvent::Speak { text, .. } if text == "hi"));
}

#[test]
fn failing_command_is_reported_with_its_index() {
    let tmp = tempfile::tempdir().unwrap();
    let script = tmp.path().join("s.json");
    std::fs::write(&script, r#"[{"delay": 1}, {"show_slide": 1}]"#).unwrap();

    let mut b = ProjectBuilder::new(registry(), tmp.path()).unwrap();
    let err = run_script(&script, &mut b).unwrap_err();
    let TavoxError::Configuration(msg) = err else {
        panic!("expected a configuration error");
    };
    assert!(msg.contains("command #1 (show_slide)"), "{msg}");
    assert!(msg.contains("s.json"), "{msg}");
    assert_eq!(b.base_dir(), tmp.path());
}

#[test]
fn voices_registered_by_a_script_are_usable() {
    let tmp = tempfile::tempdir().unwrap();
    let script = tmp.path().join("voices.json");
    std::fs::write(
        &script,
        r#"[
            {"register_voice": {"name": "narrator", "voice": {"coqui": "tts_models/en/vctk/vits"}}},
            {"set_voice": "narrator"},
            {"speak": "hi"}
        ]"#,
    )
    .unwrap();

    let mut b = ProjectBuilder::new(registry(), tmp.path()).unwrap();
    run_script(&script, &mut b).unwrap();
    assert!(matches!(
        &b.timeline()[0],
        TimelineEvent::Speak { voice, .. } if voice.id() == "coquiTTS/tts_models/en/vctk/vits"
    ));
}
