use std::path::PathBuf;

use scanlens::core::error::ClientError;
use scanlens::core::events::Event;
use scanlens::core::orchestrator::{Command, ErrorKind, Orchestrator, ScanPhase};
use scanlens::models::report::{ReportStatus, ScanOutcome, ScanReport, ScanStats};
use scanlens::models::scan::{ProgressEvent, ScanId, SelectedFile};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sample_file() -> SelectedFile {
    SelectedFile::new(PathBuf::from("/samples/invoice.exe"), "invoice.exe", 48_128)
}

fn report(status: ReportStatus) -> ScanReport {
    ScanReport {
        status,
        threats: vec![],
        stats: ScanStats::default(),
        logs: vec![],
        file_info: None,
        static_analysis: None,
    }
}

/// Begin a scan and get it accepted as job `id`.
fn accepted(scan: &mut Orchestrator, id: &str) -> ScanId {
    let generation = scan.begin(sample_file()).expect("begin from idle");
    let command = scan.apply(Event::UploadAccepted {
        generation,
        id: ScanId::from(id),
    });
    assert_eq!(command, Some(Command::OpenStream(ScanId::from(id))));
    ScanId::from(id)
}

fn progress(id: &ScanId, fraction: f64, message: &str) -> Event {
    Event::Progress {
        id: id.clone(),
        event: ProgressEvent::new(fraction, message),
    }
}

// ---------------------------------------------------------------------------
// Upload phase
// ---------------------------------------------------------------------------

#[test]
fn test_begin_is_single_flight() {
    let mut scan = Orchestrator::new();
    scan.begin(sample_file()).expect("first begin");
    assert_eq!(scan.phase(), ScanPhase::Uploading);
    assert_eq!(scan.file().map(|f| f.name.as_str()), Some("invoice.exe"));

    let second = scan.begin(sample_file());
    assert!(matches!(second, Err(ClientError::ScanInFlight)));
    assert_eq!(scan.phase(), ScanPhase::Uploading);
}

#[test]
fn test_upload_progress_never_shows_complete() {
    let mut scan = Orchestrator::new();
    let generation = scan.begin(sample_file()).unwrap();

    scan.apply(Event::UploadProgress { generation, fraction: 42 });
    assert_eq!(scan.progress().percent(), 42);

    scan.apply(Event::UploadProgress { generation, fraction: 100 });
    assert_eq!(scan.progress().percent(), 99);
    assert_eq!(scan.phase(), ScanPhase::Uploading);
}

#[test]
fn test_upload_rejected_keeps_reason_and_file() {
    let mut scan = Orchestrator::new();
    let generation = scan.begin(sample_file()).unwrap();

    let command = scan.apply(Event::UploadRejected {
        generation,
        reason: "quota exceeded".into(),
    });

    assert_eq!(command, None, "a rejected upload never opens a stream");
    assert_eq!(scan.phase(), ScanPhase::UploadRejected);
    assert!(scan.job().is_none());
    assert!(!scan.is_stream_open());

    let notice = scan.error().expect("error notice");
    assert_eq!(notice.kind, ErrorKind::Upload);
    assert_eq!(notice.cause, "quota exceeded");
    let file = notice.file.as_ref().expect("file metadata retained");
    assert_eq!(file.name, "invoice.exe");
    assert_eq!(file.size, 48_128);
}

// ---------------------------------------------------------------------------
// Streaming and completion
// ---------------------------------------------------------------------------

#[test]
fn test_full_scan_reaches_completed() {
    let mut scan = Orchestrator::new();
    let id = accepted(&mut scan, "scan-1");
    assert_eq!(scan.phase(), ScanPhase::AwaitingEvents);

    assert_eq!(scan.apply(progress(&id, 10.0, "starting")), None);
    assert_eq!(scan.phase(), ScanPhase::Scanning);
    assert_eq!(scan.apply(progress(&id, 55.0, "scanning")), None);
    assert_eq!(
        scan.apply(progress(&id, 100.0, "done")),
        Some(Command::FetchResult(id.clone()))
    );
    assert!(scan.is_fetch_pending());
    assert!(!scan.is_stream_open());

    scan.apply(Event::FetchCompleted {
        id: id.clone(),
        outcome: ScanOutcome::Safe(report(ReportStatus::Safe)),
    });

    assert_eq!(scan.phase(), ScanPhase::Completed);
    assert!(matches!(scan.outcome(), Some(ScanOutcome::Safe(_))));
    assert_eq!(scan.log().len(), 3);
    assert_eq!(scan.progress().fraction, 100.0);
    assert!(scan.is_settled());

    let texts: Vec<&str> = scan.log().snapshot().iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["starting", "scanning", "done"]);
}

#[test]
fn test_progress_shows_last_value_even_when_it_regresses() {
    let mut scan = Orchestrator::new();
    let id = accepted(&mut scan, "scan-1");

    for fraction in [30.0, 70.0, 20.0] {
        scan.apply(progress(&id, fraction, "step"));
    }

    assert_eq!(scan.progress().fraction, 20.0);
    assert_eq!(scan.log().len(), 3);
    assert!(scan.outcome().is_none());
}

#[test]
fn test_outcome_requires_observed_completion() {
    let mut scan = Orchestrator::new();
    let id = accepted(&mut scan, "scan-1");
    scan.apply(progress(&id, 60.0, "halfway"));

    // A result that nobody asked for is not applied
    scan.apply(Event::FetchCompleted {
        id: id.clone(),
        outcome: ScanOutcome::Safe(report(ReportStatus::Safe)),
    });
    assert!(scan.outcome().is_none());
    assert_eq!(scan.phase(), ScanPhase::Scanning);
}

#[test]
fn test_stream_lost_before_completion_is_stalled() {
    let mut scan = Orchestrator::new();
    let id = accepted(&mut scan, "scan-1");
    scan.apply(progress(&id, 40.0, "reading headers"));

    scan.apply(Event::StreamClosed {
        id: id.clone(),
        error: Some("progress stream disconnected".into()),
    });

    assert_eq!(scan.phase(), ScanPhase::Scanning);
    assert!(scan.is_stalled());
    assert!(scan.is_settled());
    assert_eq!(scan.progress().fraction, 40.0);
    assert!(scan.outcome().is_none());
    assert!(!scan.is_fetch_pending());
    assert_eq!(scan.error().map(|e| e.kind), Some(ErrorKind::Stream));

    scan.dismiss_error();
    assert!(scan.error().is_none());
    assert_eq!(scan.phase(), ScanPhase::Scanning);
}

#[test]
fn test_stream_error_after_completion_is_a_normal_close() {
    let mut scan = Orchestrator::new();
    let id = accepted(&mut scan, "scan-1");
    scan.apply(progress(&id, 100.0, "done"));

    scan.apply(Event::StreamClosed {
        id: id.clone(),
        error: Some("connection reset".into()),
    });

    assert!(scan.error().is_none());
    assert!(!scan.is_stalled());
    assert!(scan.is_fetch_pending());
}

#[test]
fn test_fetch_failure_ends_in_fetch_failed() {
    let mut scan = Orchestrator::new();
    let id = accepted(&mut scan, "scan-1");
    scan.apply(progress(&id, 100.0, "done"));

    scan.apply(Event::FetchFailed {
        id: id.clone(),
        cause: "result unavailable after 3 attempts".into(),
    });

    assert_eq!(scan.phase(), ScanPhase::FetchFailed);
    assert!(matches!(
        scan.outcome(),
        Some(ScanOutcome::ErrorInfo { cause }) if cause.contains("3 attempts")
    ));
    assert_eq!(scan.error().map(|e| e.kind), Some(ErrorKind::Fetch));
}

#[test]
fn test_still_scanning_is_not_terminal() {
    let mut scan = Orchestrator::new();
    let id = accepted(&mut scan, "scan-1");
    scan.apply(progress(&id, 100.0, "done"));

    scan.apply(Event::FetchCompleted {
        id: id.clone(),
        outcome: ScanOutcome::StillScanning(report(ReportStatus::Scanning)),
    });
    assert_eq!(scan.phase(), ScanPhase::Scanning);
    assert!(matches!(scan.outcome(), Some(ScanOutcome::StillScanning(_))));
    assert!(scan.is_settled(), "no automatic re-poll");

    assert_eq!(scan.refetch(), Some(Command::FetchResult(id.clone())));
    assert_eq!(scan.refetch(), None, "only one fetch in flight");

    scan.apply(Event::FetchCompleted {
        id,
        outcome: ScanOutcome::Unsafe(report(ReportStatus::Unsafe)),
    });
    assert_eq!(scan.phase(), ScanPhase::Completed);
    assert!(matches!(scan.outcome(), Some(ScanOutcome::Unsafe(_))));
}

// ---------------------------------------------------------------------------
// Reset and liveness
// ---------------------------------------------------------------------------

#[test]
fn test_reset_from_idle_is_a_no_op() {
    let mut scan = Orchestrator::new();
    assert!(!scan.reset());
    assert_eq!(scan, Orchestrator::new());
}

#[test]
fn test_reset_is_idempotent() {
    let mut scan = Orchestrator::new();
    let id = accepted(&mut scan, "scan-1");
    scan.apply(progress(&id, 35.0, "scanning"));

    assert!(scan.reset());
    let once = scan.clone();
    assert!(!scan.reset());
    assert_eq!(scan, once);

    assert_eq!(scan.phase(), ScanPhase::Idle);
    assert!(scan.job().is_none());
    assert!(scan.log().is_empty());
    assert!(scan.outcome().is_none());
    assert!(scan.error().is_none());
    assert_eq!(scan.progress().fraction, 0.0);
}

#[test]
fn test_late_events_after_reset_are_ignored() {
    let mut scan = Orchestrator::new();
    let id = accepted(&mut scan, "scan-1");
    scan.apply(progress(&id, 10.0, "starting"));
    scan.reset();
    let after_reset = scan.clone();

    assert_eq!(scan.apply(progress(&id, 55.0, "scanning")), None);
    assert_eq!(scan.apply(progress(&id, 100.0, "done")), None);
    scan.apply(Event::StreamClosed { id: id.clone(), error: Some("gone".into()) });
    scan.apply(Event::FetchFailed { id, cause: "late".into() });

    assert_eq!(scan, after_reset);
}

#[test]
fn test_stale_upload_result_is_ignored() {
    let mut scan = Orchestrator::new();
    let stale = scan.begin(sample_file()).unwrap();
    scan.reset();
    let current = scan.begin(sample_file()).unwrap();
    assert_ne!(stale, current);

    let command = scan.apply(Event::UploadAccepted {
        generation: stale,
        id: ScanId::from("scan-old"),
    });
    assert_eq!(command, None);
    assert_eq!(scan.phase(), ScanPhase::Uploading);

    scan.apply(Event::UploadProgress { generation: stale, fraction: 80 });
    assert_eq!(scan.progress().percent(), 0);
}

#[test]
fn test_events_for_another_job_are_ignored() {
    let mut scan = Orchestrator::new();
    accepted(&mut scan, "scan-1");

    let other = ScanId::from("scan-2");
    assert_eq!(scan.apply(progress(&other, 100.0, "done")), None);
    assert!(scan.log().is_empty());
    assert_eq!(scan.phase(), ScanPhase::AwaitingEvents);
}

// ---------------------------------------------------------------------------
// Report decoding
// ---------------------------------------------------------------------------

#[test]
fn test_report_status_maps_to_outcome() {
    let body = r#"{
        "status": "unsafe",
        "threats": [{"type": "Process Injection API", "details": "Contains process injection function calls", "severity": "malicious", "threatId": "S002"}],
        "stats": {"threatsFound": 1, "malicious": 1, "suspicious": 0, "neutral": 0},
        "logs": ["[0%] Initializing scan..."],
        "file_info": {"filename": "invoice.exe", "size": 48128, "sha256": "ab12"}
    }"#;
    let report: ScanReport = serde_json::from_str(body).expect("decode report");
    let outcome = ScanOutcome::from(report);

    let ScanOutcome::Unsafe(report) = outcome else {
        panic!("expected unsafe outcome");
    };
    assert_eq!(report.stats.malicious, 1);
    assert_eq!(report.threats[0].threat_id, "S002");
    assert_eq!(report.file_info.unwrap().filename, "invoice.exe");

    let errored: ScanReport =
        serde_json::from_str(r#"{"status": "error", "logs": ["Error reading file: denied"]}"#).unwrap();
    assert_eq!(
        ScanOutcome::from(errored),
        ScanOutcome::ErrorInfo { cause: "Error reading file: denied".into() }
    );

    let odd: ScanReport = serde_json::from_str(r#"{"status": "quarantined"}"#).unwrap();
    assert!(matches!(ScanOutcome::from(odd), ScanOutcome::ErrorInfo { .. }));
}
