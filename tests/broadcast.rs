use std::sync::{Arc, Mutex};

use surveyscope::data::{Respondent, ValueRange};
use surveyscope::filter::FilterUpdate;
use surveyscope::geo::CountryNames;
use surveyscope::synthetic::{SyntheticSurvey, generate};
use surveyscope::views::{BarChartFrame, ChoroplethFrame, ScatterFrame};
use surveyscope::{
    BarChartModel, CallbackView, ChoroplethModel, CyclePhase, FilterController, PipelineConfig,
    RadiusScale, RecordStore, ScatterplotModel,
};

fn controller() -> FilterController {
    let store = RecordStore::new(generate(&SyntheticSurvey {
        respondents: 250,
        ..SyntheticSurvey::default()
    }))
    .unwrap();
    FilterController::new(store)
}

#[test]
fn every_view_sees_fresh_data_once_per_change() {
    let mut controller = controller();
    let bar_frames: Arc<Mutex<Vec<BarChartFrame>>> = Arc::default();
    let scatter_frames: Arc<Mutex<Vec<ScatterFrame>>> = Arc::default();
    let map_frames: Arc<Mutex<Vec<ChoroplethFrame>>> = Arc::default();

    let sink = Arc::clone(&bar_frames);
    controller
        .register_view(Box::new(
            BarChartModel::new(PipelineConfig::default())
                .with_sink(move |frame| sink.lock().unwrap().push(frame.clone())),
        ))
        .unwrap();
    let sink = Arc::clone(&scatter_frames);
    controller
        .register_view(Box::new(
            ScatterplotModel::new(PipelineConfig::default())
                .with_sink(move |frame| sink.lock().unwrap().push(frame.clone())),
        ))
        .unwrap();
    let sink = Arc::clone(&map_frames);
    let names = CountryNames::from_pairs([("276", "Germany"), ("356", "India")]);
    controller
        .register_view(Box::new(
            ChoroplethModel::new(
                PipelineConfig::default(),
                vec!["276".to_string(), "356".to_string()],
                names,
            )
            .with_sink(move |frame| sink.lock().unwrap().push(frame.clone())),
        ))
        .unwrap();

    controller.refresh();
    controller
        .apply_filter(FilterUpdate::Age(ValueRange::new(30.0, 45.0)))
        .unwrap();
    controller.apply_filter(FilterUpdate::MinResponses(25)).unwrap();

    assert_eq!(controller.broadcasts(), 3);
    assert_eq!(controller.phase(), CyclePhase::Idle);
    let bars = bar_frames.lock().unwrap();
    assert_eq!(bars.len(), 3);
    assert_eq!(scatter_frames.lock().unwrap().len(), 3);
    assert_eq!(map_frames.lock().unwrap().len(), 3);

    let expected_total = controller.store().filtered_records().len();
    assert_eq!(bars[1].total, expected_total);
    assert_eq!(bars[2].total, expected_total);
    assert!(bars[1].total < bars[0].total);
    assert_eq!(bars[2].min_responses, 25);

    // Layout stays stable across threshold changes.
    let labels = |frame: &BarChartFrame| -> Vec<String> {
        frame.bars.iter().map(|bar| bar.label.clone()).collect()
    };
    assert_eq!(labels(&bars[0]), labels(&bars[2]));
    assert!(
        bars[2]
            .bars
            .iter()
            .filter(|bar| bar.visible)
            .all(|bar| bar.count >= 25)
    );

    let hovered = &bars[0].bars[0];
    let hover = bars[0].divergence(&hovered.label).unwrap();
    assert_eq!(hover.len(), bars[0].bars.len());
    assert_eq!(hover[0], (hovered.label.clone(), hovered.text.clone()));
    assert!(hover[1..].iter().all(|(_, text)| text.ends_with('%')));

    let maps = map_frames.lock().unwrap();
    assert_eq!(maps[2].regions.len(), 2);
    assert!(maps[2].regions.iter().all(|r| r.visible || r.responses == 0));
}

#[test]
fn log_radius_scatter_never_sees_zero_counts() {
    let mut controller = controller();
    let config = PipelineConfig {
        radius_scale: RadiusScale::Log,
        ..PipelineConfig::default()
    };
    let frames: Arc<Mutex<Vec<ScatterFrame>>> = Arc::default();
    let sink = Arc::clone(&frames);
    controller
        .register_view(Box::new(
            ScatterplotModel::new(config.clone())
                .with_sink(move |frame| sink.lock().unwrap().push(frame.clone())),
        ))
        .unwrap();
    controller
        .apply_filter(FilterUpdate::Age(ValueRange::new(60.0, 70.0)))
        .unwrap();
    let frames = frames.lock().unwrap();
    for point in &frames[0].points {
        match point.radius {
            Some(radius) => {
                assert!(point.respondent_count > 0);
                assert!(radius >= config.radius_px_min - 1e-9);
                assert!(radius <= config.radius_px_max + 1e-9);
            }
            None => assert!(!point.visible || point.respondent_count == 0),
        }
    }
}

#[test]
fn requests_from_views_are_serialized_after_the_broadcast() {
    let mut controller = controller();
    let requests = controller.requests();
    let seen: Arc<Mutex<Vec<(usize, u64)>>> = Arc::default();
    let log = Arc::clone(&seen);
    controller
        .register_view(Box::new(CallbackView::new(
            "threshold_follower",
            move |records: &[&Respondent], min_responses: u64| {
                log.lock().unwrap().push((records.len(), min_responses));
                if min_responses == 0 {
                    requests.submit(FilterUpdate::MinResponses(5));
                }
            },
        )))
        .unwrap();

    controller.refresh();
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].1, 0);
    assert_eq!(seen[1].1, 5);
    assert_eq!(seen[0].0, seen[1].0);
    assert_eq!(controller.filter_state().min_responses, 5);
}
