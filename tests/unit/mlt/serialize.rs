use std::path::PathBuf;

use super::*;
use crate::timeline::event::TimelineEvent;

fn sample() -> (ProducerTable, Tracks) {
    let timeline = vec![
        TimelineEvent::ShowImage {
            path: PathBuf::from("/p/talk.pdf/slide-1.png"),
        },
        TimelineEvent::PlayAudio {
            path: PathBuf::from("/cache/v/abc.wav"),
        },
    ];
    let producers = ProducerTable::from_timeline(&timeline).unwrap();
    let tracks = Tracks {
        video: vec![PlaylistEntry {
            producer: "producer0_slide-1.png".into(),
            frames: 60,
        }],
        audio: vec![
            AudioItem::Blank { frames: 10 },
            AudioItem::Entry(PlaylistEntry {
                producer: "producer1_abc.wav".into(),
                frames: 50,
            }),
        ],
        total_frames: 60,
    };
    (producers, tracks)
}

fn render(resolution: Resolution) -> String {
    let (producers, tracks) = sample();
    MltDocument {
        resolution,
        fps: Fps::PROJECT,
        producers: &producers,
        tracks: &tracks,
    }
    .to_string()
}

#[test]
fn escapes_markup() {
    assert_eq!(escape_xml("a&b<c>\"d'"), "a&amp;b&lt;c&gt;&quot;d&apos;");
}

#[test]
fn profile_carries_resolution_rate_and_aspect() {
    let doc = render(Resolution::new(1920, 1080).unwrap());
    assert!(doc.contains(
        "width=\"1920\" height=\"1080\" progressive=\"1\" sample_aspect_num=\"1\" \
         sample_aspect_den=\"1\" display_aspect_num=\"16\" display_aspect_den=\"9\" \
         frame_rate_num=\"25\" frame_rate_den=\"1\""
    ));

    let doc = render(Resolution::new(1280, 800).unwrap());
    assert!(doc.contains("display_aspect_num=\"16\" display_aspect_den=\"10\""));
}

#[test]
fn playlist_entries_use_inclusive_second_frame_bounds() {
    let doc = render(Resolution::default());
    assert!(doc.contains("<entry producer=\"producer0_slide-1.png\" out=\"2:9\"/>"));
    assert!(doc.contains("<entry producer=\"producer1_abc.wav\" out=\"1:24\"/>"));
    assert!(doc.contains("<blank length=\"10\"/>"));
}

#[test]
fn background_spans_the_whole_project() {
    let doc = render(Resolution::default());
    assert!(doc.contains("<producer id=\"black\" in=\"00:00:00.000\" out=\"59\">"));
    assert!(doc.contains("<property name=\"length\">60</property>"));
    assert!(doc.contains("<entry producer=\"black\" in=\"00:00:00.000\" out=\"59\"/>"));
}

#[test]
fn producers_and_tracks_are_declared() {
    let doc = render(Resolution::default());
    assert!(doc.contains(
        "<producer id=\"producer0_slide-1.png\" in=\"00:00:00.000\" out=\"03:59:59.960\">"
    ));
    assert!(doc.contains("<property name=\"resource\">/p/talk.pdf/slide-1.png</property>"));
    assert!(doc.contains("<producer id=\"producer1_abc.wav\">"));

    let background = doc.find("<track producer=\"background\"/>").unwrap();
    let video = doc.find("<track producer=\"playlist0\"/>").unwrap();
    let audio = doc.find("<track producer=\"playlist1\" hide=\"video\"/>").unwrap();
    assert!(background < video && video < audio);
    assert!(doc.starts_with("<?xml"));
    assert!(doc.trim_end().ends_with("</mlt>"));
}

#[test]
fn write_never_overwrites() {
    let tmp = tempfile::tempdir().unwrap();
    let (producers, tracks) = sample();
    let doc = MltDocument {
        resolution: Resolution::default(),
        fps: Fps::PROJECT,
        producers: &producers,
        tracks: &tracks,
    };

    let path = tmp.path().join("talk.mlt");
    write_project(&path, &doc).unwrap();
    assert!(std::fs::read_to_string(&path).unwrap().contains("tractor0"));

    assert!(matches!(
        write_project(&path, &doc),
        Err(TavoxError::Configuration(_))
    ));
    assert!(matches!(
        write_project(&tmp.path().join("missing/talk.mlt"), &doc),
        Err(TavoxError::Configuration(_))
    ));
    assert!(!tmp.path().join("missing").exists());
}

#[test]
fn bare_file_names_live_in_the_current_directory() {
    assert_eq!(parent_dir(Path::new("talk.mlt")), Path::new("."));
    assert_eq!(parent_dir(Path::new("/a/talk.mlt")), Path::new("/a"));
}
