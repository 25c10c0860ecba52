// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the dual-capture sequence
//!
//! All tests run on a paused tokio clock, so delays are exact and instant.

use async_trait::async_trait;
use dual_camera::app::{
    CaptureCallbacks, DualCaptureModel, Message, Mount, Phase, SequenceState, View,
};
use dual_camera::backends::camera::{
    BackendError, BackendResult, CameraBackend, CameraDevice, CameraHandle, Facing, Photo,
    VirtualCameraBackend, VirtualCameraSettings,
};
use dual_camera::backends::permission::{PermissionProvider, PermissionState, VirtualPermission};
use dual_camera::errors::CaptureStage;
use dual_camera::telemetry::{TelemetryError, TelemetryEvent, TelemetrySink};
use dual_camera::Config;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
enum Event {
    Back(Photo, Instant),
    Front(Photo, Instant),
    Error(CaptureStage, BackendError),
    Complete,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Event>>>);

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    fn callbacks(&self) -> CaptureCallbacks {
        let back = self.clone();
        let front = self.clone();
        let error = self.clone();
        let complete = self.clone();
        CaptureCallbacks::new(
            move |photo| back.push(Event::Back(photo.clone(), Instant::now())),
            move |photo| front.push(Event::Front(photo.clone(), Instant::now())),
        )
        .with_capture_error(move |err| error.push(Event::Error(err.stage, err.source.clone())))
        .with_sequence_complete(move || complete.push(Event::Complete))
    }

    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }
}

#[derive(Default)]
struct RecordingSink(Mutex<Vec<TelemetryEvent>>);

impl TelemetrySink for RecordingSink {
    fn track(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        self.0.lock().unwrap().push(event.clone());
        Ok(())
    }
}

struct FailingSink;

impl TelemetrySink for FailingSink {
    fn track(&self, _event: &TelemetryEvent) -> Result<(), TelemetryError> {
        Err(TelemetryError("collector unreachable".into()))
    }
}

struct PanickingSink;

impl TelemetrySink for PanickingSink {
    fn track(&self, _event: &TelemetryEvent) -> Result<(), TelemetryError> {
        panic!("telemetry sink blew up");
    }
}

struct Harness {
    mount: Mount,
    backend: VirtualCameraBackend,
    permissions: Arc<VirtualPermission>,
    recorder: Recorder,
}

impl Harness {
    fn session(&self) -> &dual_camera::app::CaptureSession {
        self.mount.model().session()
    }
}

fn camera_settings() -> VirtualCameraSettings {
    VirtualCameraSettings {
        warmup: Duration::from_millis(200),
        capture_latency: Duration::from_millis(50),
        ..VirtualCameraSettings::default()
    }
}

fn build(
    config: Config,
    backend: VirtualCameraBackend,
    permissions: VirtualPermission,
    telemetry: Option<Arc<dyn TelemetrySink>>,
) -> Harness {
    let recorder = Recorder::default();
    let permissions = Arc::new(permissions);
    let mut model = DualCaptureModel::new(
        config,
        Arc::new(backend.clone()),
        permissions.clone(),
        recorder.callbacks(),
    );
    if let Some(sink) = telemetry {
        model = model.with_telemetry(sink);
    }
    Harness {
        mount: Mount::new(model),
        backend,
        permissions,
        recorder,
    }
}

fn granted() -> Harness {
    build(
        Config::default(),
        VirtualCameraBackend::new(camera_settings()),
        VirtualPermission::granted(),
        None,
    )
}

#[tokio::test(start_paused = true)]
async fn test_example_scenario() {
    let sink = Arc::new(RecordingSink::default());
    let mut h = build(
        Config::default(),
        VirtualCameraBackend::new(camera_settings()),
        VirtualPermission::granted(),
        Some(sink.clone()),
    );

    h.mount.settle().await;
    assert_eq!(
        h.mount.view(),
        View::PrimaryCapture {
            facing: Facing::Back,
            ready: true
        }
    );
    assert_eq!(h.session().capture_count, 0);

    h.mount.dispatch(Message::Shutter);
    assert_eq!(h.session().capture_count, 1);
    assert_eq!(
        sink.0.lock().unwrap().as_slice(),
        &[TelemetryEvent::new("increment", "takePhotoCount", 0)]
    );

    h.mount.settle().await;

    let events = h.recorder.events();
    assert_eq!(events.len(), 3, "unexpected events: {:?}", events);
    let (Event::Back(first, first_at), Event::Front(second, second_at), Event::Complete) =
        (&events[0], &events[1], &events[2])
    else {
        panic!("unexpected event order: {:?}", events);
    };

    assert_eq!(first.facing, Facing::Back);
    assert!(first.uri.starts_with("virtual://back/"));
    assert_eq!(second.facing, Facing::Front);
    assert!(second.uri.starts_with("virtual://front/"));
    assert!(*second_at - *first_at >= Duration::from_millis(1000));

    match h.mount.view() {
        View::SecondaryCapture {
            facing,
            overlay,
            busy,
        } => {
            assert_eq!(facing, Facing::Front);
            assert_eq!(&overlay, first);
            assert!(!busy);
        }
        other => panic!("expected secondary view, got {:?}", other),
    }
    assert_eq!(h.session().sequence, SequenceState::Complete);
    assert_eq!(h.mount.model().phase(), Phase::Complete);
}

#[tokio::test(start_paused = true)]
async fn test_permission_gate_blocks_everything_until_granted() {
    let mut h = build(
        Config::default(),
        VirtualCameraBackend::new(camera_settings()),
        VirtualPermission::new(PermissionState::Unknown, false),
        None,
    );
    h.mount.settle().await;

    assert!(h.mount.view().is_permission_gate());
    assert_eq!(h.mount.model().phase(), Phase::AwaitingPermission);
    h.mount.dispatch(Message::Shutter);
    h.mount.dispatch(Message::Flip);
    h.mount.settle().await;
    assert!(h.mount.view().is_permission_gate());
    assert_eq!(h.session().facing, Facing::Back);

    h.mount.dispatch(Message::RequestPermission);
    h.mount.settle().await;
    assert_eq!(
        h.mount.view(),
        View::PermissionGate {
            permission: PermissionState::Denied,
            request_in_flight: false
        }
    );

    // No retries on our own; a second request only happens when asked
    assert_eq!(h.permissions.requests(), 1);
    h.mount.dispatch(Message::RequestPermission);
    h.mount.settle().await;
    assert_eq!(h.permissions.requests(), 2);

    assert!(h.recorder.events().is_empty());
    assert_eq!(h.backend.binds(), 0);
    assert_eq!(h.session().capture_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_granting_permission_mounts_primary_view() {
    let mut h = build(
        Config::default(),
        VirtualCameraBackend::new(camera_settings()),
        VirtualPermission::new(PermissionState::Unknown, true)
            .with_prompt_delay(Duration::from_millis(500)),
        None,
    );
    h.mount.settle().await;

    h.mount.dispatch(Message::RequestPermission);
    assert_eq!(
        h.mount.view(),
        View::PermissionGate {
            permission: PermissionState::Unknown,
            request_in_flight: true
        }
    );
    // Repeated presses while the prompt is open are ignored
    h.mount.dispatch(Message::RequestPermission);

    h.mount.settle().await;
    assert_eq!(h.permissions.requests(), 1);
    assert_eq!(
        h.mount.view(),
        View::PrimaryCapture {
            facing: Facing::Back,
            ready: true
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_shutter_before_ready_is_dropped() {
    let mut h = build(
        Config::default(),
        VirtualCameraBackend::new(VirtualCameraSettings {
            warmup: Duration::from_millis(500),
            ..camera_settings()
        }),
        VirtualPermission::granted(),
        None,
    );

    // Apply the permission query; the stream is still warming up
    assert!(h.mount.step().await);
    assert_eq!(
        h.mount.view(),
        View::PrimaryCapture {
            facing: Facing::Back,
            ready: false
        }
    );

    h.mount.dispatch(Message::Shutter);
    assert_eq!(h.session().capture_count, 0);
    assert_eq!(h.session().sequence, SequenceState::Idle);

    h.mount.settle().await;
    assert!(h.recorder.events().is_empty());
    assert_eq!(h.backend.captures_taken(Facing::Back), 0);
    assert!(h.session().primary_ready);
}

#[tokio::test(start_paused = true)]
async fn test_view_swaps_when_primary_resolves_and_never_reverts() {
    let mut h = granted();
    h.mount.settle().await;

    h.mount.dispatch(Message::Shutter);
    assert!(h.mount.view().is_primary());

    // Next finished task is the primary capture
    assert!(h.mount.step().await);
    assert_eq!(h.recorder.events().len(), 1);
    match h.mount.view() {
        View::SecondaryCapture { facing, busy, .. } => {
            assert_eq!(facing, Facing::Front);
            assert!(busy);
        }
        other => panic!("expected secondary view, got {:?}", other),
    }
    assert!(h.mount.view().actions().is_empty());

    // User input has no effect while the second capture is pending
    h.mount.dispatch(Message::Shutter);
    h.mount.dispatch(Message::Flip);
    assert_eq!(h.session().capture_count, 1);

    h.mount.settle().await;
    assert!(h.mount.view().is_secondary());

    // Nor after it completed
    h.mount.dispatch(Message::Shutter);
    h.mount.settle().await;
    assert!(h.mount.view().is_secondary());
    assert_eq!(h.session().capture_count, 1);
    assert_eq!(h.backend.captures_taken(Facing::Back), 1);
    assert_eq!(h.backend.captures_taken(Facing::Front), 1);
}

#[tokio::test(start_paused = true)]
async fn test_flip_parity() {
    let mut h = granted();
    h.mount.settle().await;

    for flips in 1..=5 {
        h.mount.dispatch(Message::Flip);
        let expected = if flips % 2 == 0 {
            Facing::Back
        } else {
            Facing::Front
        };
        assert_eq!(h.session().facing, expected);
    }

    h.mount.dispatch(Message::Flip);
    h.mount.settle().await;
    assert_eq!(
        h.mount.view(),
        View::PrimaryCapture {
            facing: Facing::Back,
            ready: true
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_flipped_camera_takes_first_photo() {
    let mut h = granted();
    h.mount.settle().await;

    h.mount.dispatch(Message::Flip);
    // The flipped stream has to warm up again
    h.mount.dispatch(Message::Shutter);
    assert_eq!(h.session().capture_count, 0);

    h.mount.settle().await;
    h.mount.dispatch(Message::Shutter);
    h.mount.settle().await;

    let events = h.recorder.events();
    match (&events[0], &events[1]) {
        (Event::Back(first, _), Event::Front(second, _)) => {
            assert_eq!(first.facing, Facing::Front);
            assert_eq!(second.facing, Facing::Back);
        }
        _ => panic!("unexpected events: {:?}", events),
    }
}

#[tokio::test(start_paused = true)]
async fn test_failing_telemetry_does_not_affect_capture() {
    let sinks: [Arc<dyn TelemetrySink>; 2] = [Arc::new(FailingSink), Arc::new(PanickingSink)];

    for sink in sinks {
        let mut h = build(
            Config::default(),
            VirtualCameraBackend::new(camera_settings()),
            VirtualPermission::granted(),
            Some(sink),
        );
        h.mount.settle().await;
        h.mount.dispatch(Message::Shutter);
        h.mount.settle().await;

        let events = h.recorder.events();
        assert!(matches!(
            events.as_slice(),
            [Event::Back(..), Event::Front(..), Event::Complete]
        ));
        assert_eq!(h.session().capture_count, 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_teardown_cancels_pending_second_capture() {
    let mut h = granted();
    h.mount.settle().await;
    h.mount.dispatch(Message::Shutter);
    assert!(h.mount.step().await);
    assert_eq!(h.session().sequence, SequenceState::SecondaryPending);
    assert_eq!(h.mount.model().phase(), Phase::AwaitingSecondCapture);
    assert_eq!(h.mount.pending_tasks(), 1);

    h.mount.teardown();
    assert!(h.mount.is_torn_down());
    tokio::time::sleep(Duration::from_secs(5)).await;
    h.mount.settle().await;

    assert_eq!(h.recorder.events().len(), 1);
    assert_eq!(h.backend.captures_taken(Facing::Front), 0);
    assert!(h.mount.model().camera_handle().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_mount_cancels_pending_second_capture() {
    let h = granted();
    let Harness {
        mut mount,
        backend,
        recorder,
        ..
    } = h;
    mount.settle().await;
    mount.dispatch(Message::Shutter);
    assert!(mount.step().await);

    drop(mount);
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(recorder.events().len(), 1);
    assert_eq!(backend.captures_taken(Facing::Front), 0);
}

#[tokio::test(start_paused = true)]
async fn test_primary_failure_reports_error_and_allows_retry() {
    let sink = Arc::new(RecordingSink::default());
    let backend = VirtualCameraBackend::new(camera_settings());
    backend.fail_next_capture(Facing::Back, BackendError::CaptureFailed("shutter jammed".into()));
    let mut h = build(
        Config::default(),
        backend,
        VirtualPermission::granted(),
        Some(sink.clone()),
    );
    h.mount.settle().await;

    h.mount.dispatch(Message::Shutter);
    h.mount.settle().await;

    let events = h.recorder.events();
    assert!(matches!(
        events.as_slice(),
        [Event::Error(CaptureStage::Primary, BackendError::CaptureFailed(_))]
    ));
    assert!(h.mount.view().is_primary());
    assert_eq!(h.session().sequence, SequenceState::Idle);

    h.mount.dispatch(Message::Shutter);
    h.mount.settle().await;

    assert_eq!(h.recorder.events().len(), 4);
    assert_eq!(h.session().capture_count, 2);
    let values: Vec<u64> = sink.0.lock().unwrap().iter().map(|e| e.value).collect();
    assert_eq!(values, vec![0, 1]);
}

#[tokio::test(start_paused = true)]
async fn test_secondary_failure_is_terminal() {
    let backend = VirtualCameraBackend::new(camera_settings());
    backend.fail_next_capture(Facing::Front, BackendError::CaptureFailed("lens covered".into()));
    let mut h = build(Config::default(), backend, VirtualPermission::granted(), None);
    h.mount.settle().await;

    h.mount.dispatch(Message::Shutter);
    h.mount.settle().await;

    let events = h.recorder.events();
    assert!(matches!(
        events.as_slice(),
        [Event::Back(..), Event::Error(CaptureStage::Secondary, _)]
    ));
    assert_eq!(h.session().sequence, SequenceState::Failed);
    match h.mount.view() {
        View::SecondaryCapture { busy, .. } => assert!(!busy),
        other => panic!("expected secondary view, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_missing_secondary_camera_reports_error() {
    let backend = VirtualCameraBackend::with_facings(camera_settings(), &[Facing::Back]);
    let mut h = build(Config::default(), backend, VirtualPermission::granted(), None);
    h.mount.settle().await;

    h.mount.dispatch(Message::Shutter);
    h.mount.settle().await;

    let events = h.recorder.events();
    assert!(matches!(
        events.as_slice(),
        [
            Event::Back(..),
            Event::Error(CaptureStage::Secondary, BackendError::DeviceNotFound(_))
        ]
    ));
}

#[tokio::test(start_paused = true)]
async fn test_fixed_delay_does_not_wait_for_slow_secondary_stream() {
    let slow = VirtualCameraSettings {
        warmup: Duration::from_millis(1500),
        capture_latency: Duration::ZERO,
        ..VirtualCameraSettings::default()
    };
    let mut h = build(
        Config::default(),
        VirtualCameraBackend::new(slow),
        VirtualPermission::granted(),
        None,
    );
    h.mount.settle().await;
    h.mount.dispatch(Message::Shutter);
    h.mount.settle().await;

    let events = h.recorder.events();
    assert!(matches!(
        events.as_slice(),
        [Event::Back(..), Event::Error(CaptureStage::Secondary, BackendError::NotReady)]
    ));
}

#[tokio::test(start_paused = true)]
async fn test_ready_wait_uses_delay_as_floor() {
    let slow = VirtualCameraSettings {
        warmup: Duration::from_millis(1500),
        capture_latency: Duration::ZERO,
        ..VirtualCameraSettings::default()
    };
    let config = Config {
        wait_for_secondary_ready: true,
        ..Config::default()
    };
    let mut h = build(
        config,
        VirtualCameraBackend::new(slow),
        VirtualPermission::granted(),
        None,
    );
    h.mount.settle().await;
    h.mount.dispatch(Message::Shutter);
    h.mount.settle().await;

    let events = h.recorder.events();
    let (Event::Back(_, first_at), Event::Front(_, second_at)) = (&events[0], &events[1]) else {
        panic!("unexpected events: {:?}", events);
    };
    assert!(*second_at - *first_at >= Duration::from_millis(1500));

    // A fast stream still waits out the full delay
    let config = Config {
        wait_for_secondary_ready: true,
        ..Config::default()
    };
    let mut h = build(
        config,
        VirtualCameraBackend::new(VirtualCameraSettings::instant()),
        VirtualPermission::granted(),
        None,
    );
    h.mount.settle().await;
    h.mount.dispatch(Message::Shutter);
    h.mount.settle().await;

    let events = h.recorder.events();
    let (Event::Back(_, first_at), Event::Front(_, second_at)) = (&events[0], &events[1]) else {
        panic!("unexpected events: {:?}", events);
    };
    assert!(*second_at - *first_at >= Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_configurable_delay() {
    let config = Config {
        second_capture_delay_ms: 250,
        ..Config::default()
    };
    let mut h = build(
        config,
        VirtualCameraBackend::new(VirtualCameraSettings {
            warmup: Duration::from_millis(100),
            capture_latency: Duration::ZERO,
            ..VirtualCameraSettings::default()
        }),
        VirtualPermission::granted(),
        None,
    );
    h.mount.settle().await;
    h.mount.dispatch(Message::Shutter);
    h.mount.settle().await;

    let events = h.recorder.events();
    let (Event::Back(_, first_at), Event::Front(_, second_at)) = (&events[0], &events[1]) else {
        panic!("unexpected events: {:?}", events);
    };
    let gap = *second_at - *first_at;
    assert!(gap >= Duration::from_millis(250));
    assert!(gap < Duration::from_millis(1000));
}

/// Answers the mount-time query late and denies every prompt at once
struct SlowQueryPermission;

#[async_trait]
impl PermissionProvider for SlowQueryPermission {
    async fn query(&self) -> PermissionState {
        tokio::time::sleep(Duration::from_millis(500)).await;
        PermissionState::Unknown
    }

    async fn request(&self) -> PermissionState {
        PermissionState::Denied
    }
}

#[tokio::test(start_paused = true)]
async fn test_late_permission_query_does_not_override_prompt_answer() {
    let mut mount = Mount::new(DualCaptureModel::new(
        Config::default(),
        Arc::new(VirtualCameraBackend::new(camera_settings())),
        Arc::new(SlowQueryPermission),
        CaptureCallbacks::noop(),
    ));
    let denied = View::PermissionGate {
        permission: PermissionState::Denied,
        request_in_flight: false,
    };

    mount.dispatch(Message::RequestPermission);
    // The prompt answers before the query
    assert!(mount.step().await);
    assert_eq!(mount.view(), denied);

    mount.settle().await;
    assert_eq!(mount.view(), denied);
}

/// Camera whose handles keep streaming after `close()`
#[derive(Clone, Default)]
struct UnclosableBackend {
    /// One entry per capture: whether the stream was live at the time
    captures: Arc<Mutex<Vec<bool>>>,
}

struct UnclosableHandle {
    facing: Facing,
    ready_at: Instant,
    captures: Arc<Mutex<Vec<bool>>>,
}

impl CameraBackend for UnclosableBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        Facing::ALL
            .iter()
            .map(|facing| CameraDevice {
                name: format!("Unclosable {} camera", facing),
                facing: *facing,
                path: format!("test://{}", facing),
            })
            .collect()
    }

    fn bind(&self, facing: Facing) -> BackendResult<Arc<dyn CameraHandle>> {
        Ok(Arc::new(UnclosableHandle {
            facing,
            ready_at: Instant::now() + Duration::from_millis(300),
            captures: Arc::clone(&self.captures),
        }))
    }
}

#[async_trait]
impl CameraHandle for UnclosableHandle {
    fn facing(&self) -> Facing {
        self.facing
    }

    async fn wait_ready(&self) -> BackendResult<()> {
        tokio::time::sleep_until(self.ready_at).await;
        Ok(())
    }

    async fn capture_photo(&self) -> BackendResult<Photo> {
        let live = Instant::now() >= self.ready_at;
        self.captures.lock().unwrap().push(live);
        Ok(Photo::from_uri(format!("test://{}/photo.png", self.facing), self.facing))
    }
}

#[tokio::test(start_paused = true)]
async fn test_ready_signal_from_replaced_stream_is_ignored() {
    let backend = UnclosableBackend::default();
    let mut mount = Mount::new(DualCaptureModel::new(
        Config::default(),
        Arc::new(backend.clone()),
        Arc::new(VirtualPermission::granted()),
        CaptureCallbacks::noop(),
    ));

    // Permission query binds the first back stream at t=0
    assert!(mount.step().await);
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Back -> Front -> Back; the new back stream is live at t=500
    mount.dispatch(Message::Flip);
    mount.dispatch(Message::Flip);

    // t=300: the first back stream reports ready
    assert!(mount.step().await);
    assert_eq!(
        mount.view(),
        View::PrimaryCapture {
            facing: Facing::Back,
            ready: false
        }
    );
    mount.dispatch(Message::Shutter);
    assert_eq!(mount.model().session().capture_count, 0);

    mount.settle().await;
    assert!(mount.model().session().primary_ready);
    mount.dispatch(Message::Shutter);
    mount.settle().await;

    let captures = backend.captures.lock().unwrap().clone();
    assert_eq!(captures, vec![true, true]);
}
