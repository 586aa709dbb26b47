use std::{
    env, fs,
    path::PathBuf,
    time::{Duration, Instant},
};

use approx::assert_abs_diff_eq;
use posematch::{
    angle::{compute_angle, joint_angles, KneeAngles},
    body::{Joint, DEFAULT_TRIPLES, NUM_LANDMARKS},
    config::Config,
    engine::{ComparisonEngine, FormEngine},
    hold::{HoldTimer, KneeCriteria, Label, Phase},
    landmark::{Landmark, Landmarks, Snapshot},
    session::{Session, Summary},
    similarity::{cosine_similarity, FrameScore, Scorer},
    stream::LandmarkReader,
};

/// A pose with every landmark at a random position, all of them clearly visible.
fn random_pose(rng: &mut fastrand::Rng) -> Landmarks {
    (0..NUM_LANDMARKS)
        .map(|_| {
            Landmark::new([rng.f32(), rng.f32(), rng.f32() * 0.5 - 0.25]).with_visibility(0.9)
        })
        .collect()
}

/// A random upper body with the knees bent to the given angles.
fn lunge(rng: &mut fastrand::Rng, left_knee: f32, right_knee: f32) -> Snapshot {
    let mut pose = random_pose(rng);
    let legs = [
        (Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle, 0.55, left_knee),
        (Joint::RightHip, Joint::RightKnee, Joint::RightAnkle, 0.45, right_knee),
    ];
    for (hip, knee, ankle, x, degrees) in legs {
        let rad = f32::to_radians(degrees);
        pose.set(hip.index(), Landmark::new([x, 0.5, 0.0]).with_visibility(0.9));
        pose.set(knee.index(), Landmark::new([x, 0.7, 0.0]).with_visibility(0.9));
        pose.set(
            ankle.index(),
            Landmark::new([x + 0.2 * rad.sin(), 0.7 - 0.2 * rad.cos(), 0.0]).with_visibility(0.9),
        );
    }
    Snapshot::detected(pose).unwrap()
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("posematch-{}-{name}", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

fn to_json_line(snapshot: &Snapshot) -> String {
    match snapshot.landmarks() {
        None => "null".to_string(),
        Some(landmarks) => {
            let values = landmarks
                .iter()
                .map(|lm| [lm.x(), lm.y(), lm.z(), lm.visibility()])
                .collect::<Vec<_>>();
            serde_json::to_string(&values).unwrap()
        }
    }
}

#[test]
fn angle_range_symmetry_and_translation() {
    let mut rng = fastrand::Rng::with_seed(0xa4_61e5);
    for _ in 0..1000 {
        let mut point = || [rng.f32(), rng.f32()];
        let (p1, p2, p3) = (point(), point(), point());

        let angle = compute_angle(p1, p2, p3);
        assert!((0.0..=180.0).contains(&angle), "{angle}");
        assert_eq!(angle, compute_angle(p3, p2, p1));

        let near = |a: [f32; 2], b: [f32; 2]| (a[0] - b[0]).hypot(a[1] - b[1]) < 0.05;
        if near(p1, p2) || near(p3, p2) {
            continue;
        }
        let (dx, dy) = (rng.f32() - 0.5, rng.f32() - 0.5);
        let shift = |[x, y]: [f32; 2]| [x + dx, y + dy];
        assert_abs_diff_eq!(
            angle,
            compute_angle(shift(p1), shift(p2), shift(p3)),
            epsilon = 0.05
        );
    }
}

#[test]
fn pose_compared_with_itself() {
    let mut rng = fastrand::Rng::with_seed(0x5e1f);
    let scorer = Scorer::default();
    for _ in 0..100 {
        let pose = random_pose(&mut rng);
        let score = scorer.score(&pose, &pose);
        assert_eq!(score.angle_similarity, 100.0);
        assert_eq!(score.position_similarity, 100.0);
        assert_eq!(score.average_similarity, 100.0);
    }
}

#[test]
fn uniform_angle_vectors() {
    let angles = [90.0; 23];
    assert_eq!(cosine_similarity(&angles, &angles) * 100.0, 100.0);
    assert_eq!(DEFAULT_TRIPLES.len(), angles.len());
}

#[test]
fn session_means() {
    let mut session = Session::new();
    for average in [80.0, 90.0, 100.0] {
        session.record(FrameScore::new(average, average));
    }
    let report = *session.finalize().report().unwrap();
    assert_eq!(report.frame_count, 3);
    assert_eq!(report.average_similarity, 90.0);
}

#[test]
fn empty_session() {
    let summary = Session::new().finalize();
    assert_eq!(summary, Summary::InsufficientData { frames_seen: 0 });

    let mut engine = ComparisonEngine::new(&Config::default()).unwrap();
    let summary = engine.run(Vec::new(), vec![Snapshot::missing(); 4]);
    assert_eq!(summary, Summary::InsufficientData { frames_seen: 0 });
}

#[test]
fn knee_classification() {
    let criteria = KneeCriteria::default();
    assert_eq!(criteria.classify(KneeAngles::new(120.0, 170.0)), Label::Good);
    assert_eq!(criteria.classify(KneeAngles::new(150.0, 150.0)), Label::Adjust);

    let mut rng = fastrand::Rng::with_seed(7);
    let mut engine = FormEngine::new(&Config::default()).unwrap();
    let now = Instant::now();
    assert_eq!(engine.process(&lunge(&mut rng, 120.0, 170.0), now).label, Label::Good);
    assert_eq!(engine.process(&lunge(&mut rng, 150.0, 150.0), now).label, Label::Adjust);
}

#[test]
fn sustained_hold() {
    let mut rng = fastrand::Rng::with_seed(30);
    let mut engine = FormEngine::new(&Config::default()).unwrap();
    let start = Instant::now();

    let mut complete_at = None;
    for frame in 0..35 * 30 {
        let now = start + Duration::from_secs_f64(frame as f64 / 30.0);
        let feedback = engine.process(&lunge(&mut rng, 130.0, 175.0), now);
        if feedback.is_complete() {
            assert_eq!(feedback.state.remaining_seconds, 0);
            complete_at.get_or_insert(now - start);
        }
    }

    let complete_at = complete_at.expect("hold never completed");
    assert!(complete_at >= Duration::from_secs(30), "{complete_at:?}");
    assert!(complete_at < Duration::from_millis(30_050), "{complete_at:?}");
}

#[test]
fn interrupted_hold() {
    let start = Instant::now();
    let at = |s: u64| start + Duration::from_secs(s);

    let mut timer = HoldTimer::default();
    for s in 0..=20 {
        timer.update(true, at(s));
    }
    assert_eq!(timer.state().remaining_seconds, 10);

    timer.update(false, at(21));
    let state = timer.update(true, at(22));
    assert_eq!(state.phase, Phase::Holding);
    assert_eq!(state.remaining_seconds, 30);
}

#[test]
fn recorded_streams() {
    let mut rng = fastrand::Rng::with_seed(0x11fe);
    let reference = (0..10)
        .map(|i| lunge(&mut rng, 120.0 + i as f32, 170.0))
        .collect::<Vec<_>>();
    let mut live = reference.clone();
    live[3] = Snapshot::missing();

    let write = |name: &str, frames: &[Snapshot]| {
        let text = frames.iter().map(to_json_line).collect::<Vec<_>>().join("\n");
        temp_file(name, &text)
    };
    let reference_path = write("reference.jsonl", &reference);
    let live_path = write("live.jsonl", &live);
    let config_path = temp_file("config.toml", "visibility_threshold = 0.5\n");

    let config = Config::load(&config_path).unwrap();
    let reference = LandmarkReader::open(&reference_path)
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>()
        .unwrap();
    let live = LandmarkReader::open(&live_path)
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>()
        .unwrap();

    let mut engine = ComparisonEngine::new(&config).unwrap();
    let summary = engine.run(reference, live);
    let report = summary.report().unwrap();
    assert_eq!(report.frames_seen, 10);
    assert_eq!(report.frame_count, 9);
    assert_abs_diff_eq!(report.angle_similarity, 100.0, epsilon = 0.001);
    assert_abs_diff_eq!(report.position_similarity, 100.0, epsilon = 0.001);

    for path in [reference_path, live_path, config_path] {
        fs::remove_file(path).ok();
    }
}

#[test]
fn custom_triples_change_the_angle_vector() {
    let mut rng = fastrand::Rng::with_seed(3);
    let pose = random_pose(&mut rng);
    let config = Config::default().triples(&DEFAULT_TRIPLES[..2]);
    assert_eq!(joint_angles(&pose, &config.triples).len(), 2);
    assert_eq!(config.scorer().score(&pose, &pose).angle_similarity, 100.0);
}
