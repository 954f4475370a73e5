use std::{collections::HashMap, time::Duration};

use super::*;

struct TableProbe(HashMap<PathBuf, f64>);

impl TableProbe {
    fn new(entries: &[(&str, f64)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(p, s)| (PathBuf::from(p), *s))
                .collect(),
        )
    }
}

impl AudioProbe for TableProbe {
    fn duration_secs(&self, path: &Path) -> TavoxResult<f64> {
        self.0
            .get(path)
            .copied()
            .ok_or_else(|| TavoxError::tool(format!("unknown file {}", path.display())))
    }
}

fn image(p: &str) -> TimelineEvent {
    TimelineEvent::ShowImage { path: p.into() }
}

fn audio(p: &str) -> TimelineEvent {
    TimelineEvent::PlayAudio { path: p.into() }
}

fn delay_ms(ms: u64) -> TimelineEvent {
    TimelineEvent::Delay {
        duration: Duration::from_millis(ms),
    }
}

fn synth(timeline: &[TimelineEvent], probe: &TableProbe) -> TavoxResult<Tracks> {
    let producers = ProducerTable::from_timeline(timeline)?;
    synthesize_tracks(
        timeline,
        &producers,
        probe,
        Fps::PROJECT,
        RemainderPlacement::LastFrame,
    )
}

#[test]
fn remainder_goes_to_the_last_frame_by_default() {
    let out = distribute_frames(&[0, 0, 5], 20, RemainderPlacement::LastFrame).unwrap();
    assert_eq!(out, vec![7, 7, 6]);
    assert_eq!(out.iter().sum::<u64>(), 20);
}

#[test]
fn remainder_can_go_to_the_last_auto_frame() {
    let out = distribute_frames(&[0, 0, 5], 20, RemainderPlacement::LastAutoFrame).unwrap();
    assert_eq!(out, vec![7, 8, 5]);
}

#[test]
fn explicit_frames_keep_their_length_when_auto_is_last() {
    for placement in [RemainderPlacement::LastFrame, RemainderPlacement::LastAutoFrame] {
        let out = distribute_frames(&[3, 0, 0], 10, placement).unwrap();
        assert_eq!(out, vec![3, 3, 4]);
    }
}

#[test]
fn distribution_always_sums_to_target() {
    let cases: [&[u64]; 5] = [&[0], &[0, 0, 0], &[2, 0, 9, 0], &[0, 1, 0, 1, 0], &[5, 0]];
    for explicit in cases {
        let claimed: u64 = explicit.iter().sum();
        for target in claimed + 1..claimed + 40 {
            for placement in [RemainderPlacement::LastFrame, RemainderPlacement::LastAutoFrame] {
                let out = distribute_frames(explicit, target, placement).unwrap();
                assert_eq!(out.iter().sum::<u64>(), target, "{explicit:?} -> {target}");
                if placement == RemainderPlacement::LastAutoFrame {
                    for (e, o) in explicit.iter().zip(&out) {
                        if *e != 0 {
                            assert_eq!(e, o);
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn all_explicit_must_match_exactly() {
    assert_eq!(
        distribute_frames(&[4, 6], 10, RemainderPlacement::LastFrame).unwrap(),
        vec![4, 6]
    );
    let err = distribute_frames(&[4, 6], 12, RemainderPlacement::LastFrame).unwrap_err();
    assert!(matches!(&err, TavoxError::Timing(m) if m.contains("explicit durations do not match target")));
}

#[test]
fn auto_frames_need_room() {
    for target in [5, 4] {
        let err = distribute_frames(&[0, 5], target, RemainderPlacement::LastFrame).unwrap_err();
        assert!(matches!(&err, TavoxError::Timing(m) if m.contains("no room left for auto frames")));
    }
}

#[test]
fn producers_are_declared_once_per_resource() {
    let timeline = vec![
        image("/s/a.png"),
        audio("/c/x.wav"),
        TimelineEvent::ShowImageRange {
            frames: vec![StillFrame::auto("/s/b.png"), StillFrame::auto("/s/a.png")],
        },
        audio("/c/x.wav"),
        image("/s/a.png"),
    ];
    let table = ProducerTable::from_timeline(&timeline).unwrap();
    let ids: Vec<_> = table.producers().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["producer0_a.png", "producer1_x.wav", "producer2_b.png"]);
    assert_eq!(table.id_of(Path::new("/s/a.png")).unwrap(), "producer0_a.png");
    assert_eq!(table.producers()[1].kind, ProducerKind::Audio);
}

#[test]
fn producer_ids_stay_unique() {
    let timeline = vec![TimelineEvent::ShowImageRange {
        frames: vec![StillFrame::auto("/a/p.png"), StillFrame::auto("/b/p.png")],
    }];
    let table = ProducerTable::from_timeline(&timeline).unwrap();
    let ids: Vec<_> = table.producers().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["producer0_p.png", "producer0_p.png_1"]);
}

#[test]
fn unresolved_speech_is_structural() {
    struct Mute;
    impl crate::voice::provider::VoiceProvider for Mute {
        fn synthesize(&self, _: &str, _: &Path) -> anyhow::Result<()> {
            Ok(())
        }
        fn id(&self) -> &str {
            "mute"
        }
    }
    let timeline = vec![
        image("/s/a.png"),
        TimelineEvent::Speak {
            text: "hi".into(),
            voice: crate::voice::provider::Voice::new(Mute),
        },
    ];
    assert!(matches!(
        ProducerTable::from_timeline(&timeline),
        Err(TavoxError::Structural(_))
    ));
}

#[test]
fn images_are_held_for_the_following_audio() {
    let probe = TableProbe::new(&[("/c/x.wav", 2.0), ("/c/y.wav", 1.23)]);
    let timeline = vec![
        image("/s/a.png"),
        audio("/c/x.wav"),
        delay_ms(500),
        image("/s/b.png"),
        audio("/c/y.wav"),
    ];
    let tracks = synth(&timeline, &probe).unwrap();

    assert_eq!(
        tracks.video,
        vec![
            PlaylistEntry {
                producer: "producer0_a.png".into(),
                frames: 62
            },
            PlaylistEntry {
                producer: "producer3_b.png".into(),
                frames: 30
            },
        ]
    );
    assert_eq!(
        tracks.audio,
        vec![
            AudioItem::Entry(PlaylistEntry {
                producer: "producer1_x.wav".into(),
                frames: 50
            }),
            AudioItem::Blank { frames: 12 },
            AudioItem::Entry(PlaylistEntry {
                producer: "producer4_y.wav".into(),
                frames: 30
            }),
        ]
    );
    assert_eq!(tracks.total_frames, 92);
}

#[test]
fn ranges_split_the_audio_time() {
    let probe = TableProbe::new(&[("/c/x.wav", 0.8)]);
    let timeline = vec![
        TimelineEvent::ShowImageRange {
            frames: vec![
                StillFrame::auto("/s/1.png"),
                StillFrame::auto("/s/2.png"),
                StillFrame::timed("/s/3.png", Duration::from_millis(200)),
            ],
        },
        audio("/c/x.wav"),
    ];
    let tracks = synth(&timeline, &probe).unwrap();
    let lengths: Vec<_> = tracks.video.iter().map(|e| e.frames).collect();
    assert_eq!(lengths, vec![7, 7, 6]);
    assert_eq!(tracks.total_frames, 20);
}

#[test]
fn leading_non_visual_event_is_structural() {
    let probe = TableProbe::new(&[("/c/x.wav", 1.0)]);
    for first in [delay_ms(1000), audio("/c/x.wav")] {
        let timeline = vec![first, image("/s/a.png"), audio("/c/x.wav")];
        assert!(matches!(
            synth(&timeline, &probe),
            Err(TavoxError::Structural(_))
        ));
    }
}

#[test]
fn empty_project_is_structural() {
    let probe = TableProbe::new(&[]);
    assert!(matches!(synth(&[], &probe), Err(TavoxError::Structural(_))));
    assert!(matches!(
        synth(&[image("/s/a.png")], &probe),
        Err(TavoxError::Structural(_))
    ));
}

#[test]
fn images_without_audio_are_left_out() {
    let probe = TableProbe::new(&[("/c/x.wav", 1.0)]);
    let timeline = vec![image("/s/a.png"), image("/s/b.png"), audio("/c/x.wav")];
    let tracks = synth(&timeline, &probe).unwrap();
    assert_eq!(
        tracks.video,
        vec![PlaylistEntry {
            producer: "producer1_b.png".into(),
            frames: 25
        }]
    );
    assert_eq!(tracks.total_frames, 25);
}

#[test]
fn total_is_the_sum_of_visual_durations() {
    let probe = TableProbe::new(&[("/c/x.wav", 1.5), ("/c/y.wav", 0.52)]);
    let timeline = vec![
        image("/s/a.png"),
        audio("/c/x.wav"),
        audio("/c/y.wav"),
        TimelineEvent::ShowImageRange {
            frames: vec![StillFrame::auto("/s/b.png"), StillFrame::auto("/s/c.png")],
        },
        delay_ms(1000),
        audio("/c/x.wav"),
    ];
    let tracks = synth(&timeline, &probe).unwrap();
    let video: u64 = tracks.video.iter().map(|e| e.frames).sum();
    assert_eq!(tracks.total_frames, video);
    assert_eq!(tracks.total_frames, (37 + 13) + (25 + 37));
}
