mod common;

use std::{sync::Arc, time::Duration};

use common::{MockOracle, TestRelay};
use rain_relay::{
    poller::{HttpBackend, Poller},
    telemetry::Channel::{Detail, Presence},
};

async fn monitor_for(relay: &TestRelay) -> Poller {
    let backend = HttpBackend::new(&relay.base_url(), Duration::from_secs(2)).unwrap();
    Poller::new(Arc::new(backend), Duration::from_secs(5))
}

#[tokio::test]
async fn monitor_tracks_rain_event_against_live_relay() {
    let oracle = MockOracle::start().await;
    let relay = TestRelay::start(oracle.url.clone()).await;
    let mut poller = monitor_for(&relay).await;
    let view = poller.view();

    poller.tick().await;
    {
        let view = view.lock().await;
        assert!(!view.loading);
        assert!(!view.status.as_ref().unwrap().is_raining);
    }
    assert!(!poller.prediction_active());

    relay
        .publish(&[
            (Presence, "Raining"),
            (Detail, "Intensity: 40%, Duration: 5s"),
            (Detail, "Intensity: 60%, Duration: 10s"),
        ])
        .await;

    poller.tick().await;
    assert!(poller.prediction_active());

    // The first prediction is fetched without waiting for the cadence
    tokio::time::sleep(Duration::from_millis(300)).await;
    {
        let view = view.lock().await;
        let status = view.status.as_ref().unwrap();
        assert!(status.is_raining);
        assert_eq!(status.intensity, 60.0);
        assert_eq!(status.duration, "10s");
        assert_eq!(status.average_intensity, 50.0);
        let prediction = view.prediction.as_ref().expect("prediction fetched");
        assert_eq!(prediction.predicted_remaining_minutes, 12.5);
        assert_eq!(prediction.confidence, "high");
    }
    assert_eq!(oracle.requests().len(), 1);

    relay.publish(&[(Presence, "Dry")]).await;
    poller.tick().await;
    assert!(!poller.prediction_active());
    {
        let view = view.lock().await;
        let status = view.status.as_ref().unwrap();
        assert!(!status.is_raining);
        assert_eq!(status.intensity, 0.0);
        assert_eq!(status.duration, "0s");
        assert!(status.readings.is_empty());
        assert_eq!(view.prediction, None);
    }
}

#[tokio::test]
async fn monitor_keeps_polling_when_relay_is_unreachable() {
    let unused = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = unused.local_addr().unwrap();
    drop(unused);

    let url = url::Url::parse(&format!("http://{}/", addr)).unwrap();
    let backend = HttpBackend::new(&url, Duration::from_millis(500)).unwrap();
    let mut poller = Poller::new(Arc::new(backend), Duration::from_secs(5));
    let view = poller.view();

    poller.tick().await;
    poller.tick().await;

    let view = view.lock().await;
    assert!(!view.loading);
    assert_eq!(view.status, None);
    assert!(!poller.prediction_active());
}
