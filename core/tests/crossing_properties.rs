use magcross::{
    CrossingDetector, DetectionConfig, LineId, MagData, PairGrouping, SamplePoint, SurveyMeta,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Straight, slightly noisy flight lines at random headings over a small block.
fn random_survey(seed: u64, lines: usize, samples: usize) -> MagData {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(lines * samples);
    for line in 0..lines {
        let (mut e, mut n) = (rng.gen_range(0.0..300.0), rng.gen_range(0.0..300.0));
        let heading: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
        for fid in 0..samples {
            e += 4.0 * heading.cos() + rng.gen_range(-0.5..0.5);
            n += 4.0 * heading.sin() + rng.gen_range(-0.5..0.5);
            points.push(
                SamplePoint::new(format!("L{line:03}"), fid as i64, e, n).with_readings(
                    rng.gen_range(55.0..65.0),
                    rng.gen_range(51_900.0..52_100.0),
                    rng.gen_range(51_900.0..52_100.0),
                ),
            );
        }
    }
    MagData::new(points, SurveyMeta::default())
}

/// Closest cross-line distance per unordered line pair, by exhaustive search.
fn brute_force(points: &[SamplePoint], max_dist: f64) -> BTreeMap<(LineId, LineId), f64> {
    let mut best: BTreeMap<(LineId, LineId), f64> = BTreeMap::new();
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            let (a, b) = (&points[i], &points[j]);
            if a.line == b.line || a.distance_2(b) > max_dist * max_dist {
                continue;
            }
            let key = if a.line < b.line {
                (a.line.clone(), b.line.clone())
            } else {
                (b.line.clone(), a.line.clone())
            };
            let d = a.distance(b);
            best.entry(key)
                .and_modify(|current| *current = current.min(d))
                .or_insert(d);
        }
    }
    best
}

#[test]
fn detector_matches_exhaustive_search() {
    for seed in 0..8 {
        let data = random_survey(seed, 8, 80);
        let max_dist = 6.0;
        let expected = brute_force(data.points(), max_dist);

        let found = CrossingDetector::new(DetectionConfig::with_max_dist(max_dist))
            .detect(&data)
            .unwrap();

        assert_eq!(found.len(), expected.len(), "seed {seed}");
        for record in found.crossings() {
            let key = (record.first.line.clone(), record.second.line.clone());
            assert!(key.0 < key.1, "seed {seed}: record not oriented by line");
            assert_eq!(expected.get(&key), Some(&record.distance), "seed {seed}");
        }
    }
}

#[test]
fn records_respect_radius_and_are_non_negative() {
    let data = random_survey(42, 10, 100);
    let found = data.find_line_crossings(8.0).unwrap();
    assert!(!found.is_empty());
    for record in &found {
        assert_ne!(record.first.line, record.second.line);
        assert!(record.distance <= 8.0);
        assert!(record.distance >= 0.0);
        assert!(record.gpsalt_diff >= 0.0);
        assert!(record.magcom_diff >= 0.0);
        assert!(record.maguncom_diff >= 0.0);
    }
}

#[test]
fn repeated_and_parallel_runs_agree() {
    let data = random_survey(7, 12, 120);
    let run = |parallel: bool, grouping: PairGrouping| {
        CrossingDetector::new(DetectionConfig {
            max_dist: 10.0,
            grouping,
            parallel,
        })
        .detect(&data)
        .unwrap()
        .into_records()
    };

    for grouping in [PairGrouping::LinePair, PairGrouping::Directed] {
        let first = run(true, grouping);
        assert_eq!(first, run(true, grouping));
        assert_eq!(first, run(false, grouping));
    }
}

#[test]
fn directed_grouping_never_has_fewer_records() {
    for seed in 0..4 {
        let data = random_survey(100 + seed, 8, 80);
        let detect = |grouping| {
            CrossingDetector::new(DetectionConfig {
                max_dist: 6.0,
                grouping,
                parallel: true,
            })
            .detect(&data)
            .unwrap()
            .len()
        };
        assert!(detect(PairGrouping::Directed) >= detect(PairGrouping::LinePair));
    }
}

#[test]
fn single_line_survey_never_crosses() {
    let data = random_survey(3, 1, 300);
    for max_dist in [1.0, 10.0, 1.0e6] {
        assert!(data.find_line_crossings(max_dist).unwrap().is_empty());
    }
}
