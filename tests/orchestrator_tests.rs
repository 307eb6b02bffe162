mod common;

use bountyforge_rs::core::report::Report;
use bountyforge_rs::{Phase, ScanError, ScanOptions, ScanState, Severity, ValidationError};
use chrono::{Local, TimeZone};
use bountyforge_rs::core::knowledge_base::CandidateSet;
use common::{Fixture, ScriptedProbe, small_candidates};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::{Notify, mpsc};

#[tokio::test]
async fn open_web_ports_are_listed_without_raising_issues() {
    let fixture = Fixture::new(
        ScriptedProbe::new(Phase::Subdomains),
        ScriptedProbe::new(Phase::Ports).found("Port 80 (HTTP)").found("Port 443 (HTTPS)"),
        ScriptedProbe::new(Phase::Directories),
        ScriptedProbe::new(Phase::Vulnerabilities),
    );
    let orchestrator = fixture.orchestrator(small_candidates(), 4);

    let run = orchestrator.start("example.com", ScanOptions::only(&[Phase::Ports])).await.unwrap();

    assert_eq!(run.state(), ScanState::Completed);
    assert_eq!(run.store().count_by(Phase::Ports), 2);
    assert_eq!(run.store().critical_count(), 0);
    assert_eq!(run.store().warning_count(), 0);
    assert!(fixture.calls(Phase::Subdomains).is_empty());
    assert!(fixture.calls(Phase::Directories).is_empty());
    assert!(fixture.calls(Phase::Vulnerabilities).is_empty());

    let text = Report::generate(&run).render_text();
    assert!(text.contains("OPEN PORTS\n"));
    assert!(text.contains("• Port 80: HTTP [SUCCESS]\n• Port 443: HTTPS [SUCCESS]\n"));
    assert!(text.contains("Critical Issues: 0"));
    assert!(!text.contains("SUBDOMAINS\n"));
    assert!(!text.contains("ACCESSIBLE PATHS\n"));
}

#[tokio::test]
async fn exposed_env_file_counts_as_critical() {
    let fixture = Fixture::new(
        ScriptedProbe::new(Phase::Subdomains),
        ScriptedProbe::new(Phase::Ports),
        ScriptedProbe::new(Phase::Directories).found("/admin").found("/.env"),
        ScriptedProbe::new(Phase::Vulnerabilities),
    );
    let orchestrator = fixture.orchestrator(small_candidates(), 2);

    let run = orchestrator.start("example.com", ScanOptions::only(&[Phase::Directories])).await.unwrap();

    let findings = run.store().findings(Phase::Directories);
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].severity(), Severity::Warning);
    assert_eq!(findings[1].severity(), Severity::Critical);
    assert_eq!(run.store().critical_count(), 1);
    assert_eq!(run.store().warning_count(), 1);
}

#[tokio::test]
async fn phases_run_in_fixed_order_and_findings_keep_candidate_order() {
    let fixture = Fixture::new(
        ScriptedProbe::new(Phase::Subdomains).found("dev").found("www"),
        ScriptedProbe::new(Phase::Ports).found("Port 8080 (HTTP-Alt)").found("Port 22 (SSH)"),
        ScriptedProbe::new(Phase::Directories).found("/backup"),
        ScriptedProbe::new(Phase::Vulnerabilities).found("SQL Injection"),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    let orchestrator = fixture.orchestrator(small_candidates(), 3).with_events(tx);

    let run = orchestrator.start("Example.COM", ScanOptions::all()).await.unwrap();
    drop(orchestrator);

    let names: Vec<String> = run.store().findings(Phase::Subdomains).iter().map(|f| f.summary()).collect();
    assert_eq!(names, vec!["www.example.com", "dev.example.com"]);
    let ports: Vec<String> = run.store().findings(Phase::Ports).iter().map(|f| f.summary()).collect();
    assert_eq!(ports, vec!["Port 22: SSH", "Port 8080: HTTP-Alt"]);
    assert_eq!(run.store().findings(Phase::Ports)[0].severity(), Severity::Warning);
    // Port findings never feed the rollup, even when risky.
    assert_eq!(run.store().warning_count(), 1);
    assert_eq!(run.store().critical_count(), 1);

    let mut overview = Vec::new();
    let mut announced = 0;
    while let Some(event) = rx.recv().await {
        announced += usize::from(event.finding);
        if event.phase.is_none() {
            overview.push(event.text);
        }
    }
    assert_eq!(announced, run.store().total());
    let scanning: Vec<&String> = overview.iter().filter(|t| t.contains("Scanning")).collect();
    assert_eq!(scanning.len(), 4);
    assert!(scanning[0].contains("Subdomains"));
    assert!(scanning[1].contains("Open Ports"));
    assert!(scanning[2].contains("Accessible Paths"));
    assert!(scanning[3].contains("Vulnerabilities"));
    assert_eq!(overview.first().unwrap(), "🎯 Starting scan for: example.com");
    assert!(overview.last().unwrap().starts_with("✅ Scan completed in"));
}

#[tokio::test]
async fn invalid_target_is_rejected_before_any_probe_runs() {
    let fixture = Fixture::quiet();
    let orchestrator = fixture.orchestrator(small_candidates(), 1);

    let err = orchestrator.start("   ", ScanOptions::all()).await.unwrap_err();
    assert!(matches!(err, ScanError::Validation(ValidationError::Empty)));

    let err = orchestrator.start("not a domain", ScanOptions::all()).await.unwrap_err();
    assert!(matches!(err, ScanError::Validation(ValidationError::Malformed { .. })));

    assert_eq!(orchestrator.state(), ScanState::Idle);
    for phase in Phase::in_order() {
        assert!(fixture.calls(phase).is_empty());
    }
}

#[tokio::test]
async fn stop_while_idle_is_a_no_op() {
    let fixture = Fixture::quiet();
    let orchestrator = fixture.orchestrator(small_candidates(), 1);

    orchestrator.stop();
    orchestrator.stop();
    assert_eq!(orchestrator.state(), ScanState::Idle);

    let run = orchestrator.start("example.com", ScanOptions::all()).await.unwrap();
    assert_eq!(run.state(), ScanState::Completed);
}

#[tokio::test]
async fn stop_halts_dispatch_and_skips_later_phases() {
    let handle = Arc::new(OnceLock::new());
    let fixture = Fixture::new(
        ScriptedProbe::new(Phase::Subdomains),
        ScriptedProbe::new(Phase::Ports)
            .found("Port 22 (SSH)")
            .found("Port 80 (HTTP)")
            .found("Port 443 (HTTPS)")
            .stop_on("Port 80 (HTTP)", Arc::clone(&handle)),
        ScriptedProbe::new(Phase::Directories).found("/admin"),
        ScriptedProbe::new(Phase::Vulnerabilities),
    );
    let orchestrator = fixture.orchestrator(small_candidates(), 1);
    handle.set(orchestrator.stop_handle()).unwrap();

    let run = orchestrator.start("example.com", ScanOptions::all()).await.unwrap();

    assert_eq!(run.state(), ScanState::Stopped);
    assert_eq!(orchestrator.state(), ScanState::Stopped);
    assert_eq!(fixture.calls(Phase::Ports), vec!["Port 22 (SSH)", "Port 80 (HTTP)"]);
    assert!(run.store().count_by(Phase::Ports) <= 2);
    assert!(fixture.calls(Phase::Directories).is_empty());
    assert!(fixture.calls(Phase::Vulnerabilities).is_empty());

    let text = Report::generate(&run).render_text();
    assert!(text.contains("Status: STOPPED"));

    // A new run gets a fresh cancellation flag.
    let rerun = orchestrator.start("example.com", ScanOptions::only(&[Phase::Directories])).await.unwrap();
    assert_eq!(rerun.state(), ScanState::Completed);
    assert_eq!(rerun.store().count_by(Phase::Directories), 1);
}

#[tokio::test]
async fn overlapping_start_is_rejected() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let fixture = Fixture::new(
        ScriptedProbe::new(Phase::Subdomains).gated(Arc::clone(&entered), Arc::clone(&release)),
        ScriptedProbe::new(Phase::Ports),
        ScriptedProbe::new(Phase::Directories),
        ScriptedProbe::new(Phase::Vulnerabilities),
    );
    let mut candidates = small_candidates();
    candidates.subdomains.truncate(1);
    let orchestrator = Arc::new(fixture.orchestrator(candidates, 1));

    let first = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.start("example.com", ScanOptions::only(&[Phase::Subdomains])).await }
    });
    entered.notified().await;

    assert_eq!(orchestrator.state(), ScanState::Running);
    let err = orchestrator.start("example.org", ScanOptions::all()).await.unwrap_err();
    assert!(matches!(err, ScanError::AlreadyRunning));

    release.notify_one();
    let run = first.await.unwrap().unwrap();
    assert_eq!(run.state(), ScanState::Completed);
    assert_eq!(run.target().as_str(), "example.com");
}

#[tokio::test]
async fn failing_probe_is_recorded_and_the_phase_continues() {
    let fixture = Fixture::new(
        ScriptedProbe::new(Phase::Subdomains).failing("mail").found("dev"),
        ScriptedProbe::new(Phase::Ports),
        ScriptedProbe::new(Phase::Directories),
        ScriptedProbe::new(Phase::Vulnerabilities),
    );
    let orchestrator = fixture.orchestrator(small_candidates(), 2);

    let run = orchestrator.start("example.com", ScanOptions::only(&[Phase::Subdomains])).await.unwrap();

    assert_eq!(run.state(), ScanState::Completed);
    assert_eq!(fixture.calls(Phase::Subdomains).len(), 3);
    assert_eq!(run.store().count_by(Phase::Subdomains), 1);
    assert_eq!(run.failures().len(), 1);
    assert_eq!(run.failures()[0].candidate, "mail");

    let text = Report::generate(&run).render_text();
    assert!(text.contains("INDETERMINATE CHECKS"));
    assert!(text.contains("• [Subdomains] mail: "));
}

#[tokio::test]
async fn invalid_candidates_fail_the_start() {
    let fixture = Fixture::quiet();
    let mut candidates = small_candidates();
    candidates.paths.push("no-slash".to_string());
    let orchestrator = fixture.orchestrator(candidates, 1);

    let err = orchestrator.start("example.com", ScanOptions::all()).await.unwrap_err();
    assert!(matches!(err, ScanError::Candidates(_)));
    assert_eq!(orchestrator.state(), ScanState::Idle);
}

#[tokio::test]
async fn identical_runs_render_identical_reports() {
    let build = || {
        Fixture::new(
            ScriptedProbe::new(Phase::Subdomains).found("www"),
            ScriptedProbe::new(Phase::Ports).found("Port 443 (HTTPS)"),
            ScriptedProbe::new(Phase::Directories).found("/.env"),
            ScriptedProbe::new(Phase::Vulnerabilities).found("SQL Injection"),
        )
    };
    let at = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

    let first_fixture = build();
    let first = first_fixture.orchestrator(small_candidates(), 4).start("example.com", ScanOptions::all()).await.unwrap();
    let second_fixture = build();
    let second = second_fixture.orchestrator(small_candidates(), 1).start("example.com", ScanOptions::all()).await.unwrap();

    let first_text = Report::generate_at(&first, at).render_text();
    assert_eq!(first_text, Report::generate_at(&second, at).render_text());
    assert!(first_text.contains("Date: 2026-01-02 03:04:05"));
    assert!(first_text.contains("VULNERABILITIES\n"));
    assert!(first_text.contains("Critical Issues: 1"));
    assert!(first_text.contains("Warnings: 1"));
}

#[tokio::test]
async fn findings_keep_candidate_order_when_probes_answer_out_of_order() {
    let fixture = Fixture::new(
        ScriptedProbe::new(Phase::Subdomains)
            .found("www")
            .found("mail")
            .found("dev")
            .delayed("www", Duration::from_millis(120))
            .delayed("mail", Duration::from_millis(60)),
        ScriptedProbe::new(Phase::Ports),
        ScriptedProbe::new(Phase::Directories),
        ScriptedProbe::new(Phase::Vulnerabilities),
    );
    let orchestrator = fixture.orchestrator(small_candidates(), 3);

    let run = orchestrator.start("example.com", ScanOptions::only(&[Phase::Subdomains])).await.unwrap();

    assert_eq!(fixture.completions(Phase::Subdomains), vec!["dev", "mail", "www"]);
    let names: Vec<String> = run.store().findings(Phase::Subdomains).iter().map(|f| f.summary()).collect();
    assert_eq!(names, vec!["www.example.com", "mail.example.com", "dev.example.com"]);
}

#[tokio::test]
async fn stop_with_a_wide_window_bounds_dispatch() {
    let window = 3;
    let labels = ["a", "b", "c", "d", "e", "f", "g", "h"];
    let handle = Arc::new(OnceLock::new());
    let mut subdomains = ScriptedProbe::new(Phase::Subdomains).stop_on("b", Arc::clone(&handle));
    for label in labels {
        subdomains = subdomains.found(label);
    }
    let fixture = Fixture::new(
        subdomains,
        ScriptedProbe::new(Phase::Ports),
        ScriptedProbe::new(Phase::Directories),
        ScriptedProbe::new(Phase::Vulnerabilities),
    );
    let candidates = CandidateSet {
        subdomains: labels.iter().map(|l| l.to_string()).collect(),
        ..small_candidates()
    };
    let orchestrator = fixture.orchestrator(candidates, window);
    handle.set(orchestrator.stop_handle()).unwrap();

    let run = orchestrator.start("example.com", ScanOptions::all()).await.unwrap();

    // Stopped while probing candidate 2: at most the rest of that window was dispatched.
    let calls = fixture.calls(Phase::Subdomains);
    assert!(calls.len() <= 2 + window - 1, "dispatched {calls:?}");
    assert!(!calls.iter().any(|c| c == "h"));
    assert!(run.store().count_by(Phase::Subdomains) <= calls.len());
    assert_eq!(run.state(), ScanState::Stopped);
    assert!(fixture.calls(Phase::Ports).is_empty());
}

#[tokio::test]
async fn stop_after_the_last_candidate_still_completes() {
    let handle = Arc::new(OnceLock::new());
    let fixture = Fixture::new(
        ScriptedProbe::new(Phase::Subdomains).found("www").found("dev").stop_on("dev", Arc::clone(&handle)),
        ScriptedProbe::new(Phase::Ports),
        ScriptedProbe::new(Phase::Directories),
        ScriptedProbe::new(Phase::Vulnerabilities),
    );
    let orchestrator = fixture.orchestrator(small_candidates(), 1);
    handle.set(orchestrator.stop_handle()).unwrap();

    let run = orchestrator.start("example.com", ScanOptions::only(&[Phase::Subdomains])).await.unwrap();

    assert_eq!(fixture.calls(Phase::Subdomains), vec!["www", "mail", "dev"]);
    assert_eq!(run.state(), ScanState::Completed);
    assert_eq!(run.store().count_by(Phase::Subdomains), 2);
}

#[tokio::test]
async fn stop_after_completion_is_a_no_op() {
    let fixture = Fixture::quiet();
    let orchestrator = fixture.orchestrator(small_candidates(), 2);

    let run = orchestrator.start("example.com", ScanOptions::only(&[Phase::Ports])).await.unwrap();
    assert_eq!(run.state(), ScanState::Completed);

    orchestrator.stop();
    orchestrator.stop_handle().stop();
    assert_eq!(orchestrator.state(), ScanState::Completed);
}

#[tokio::test]
async fn abandoned_start_releases_the_orchestrator() {
    let entered = Arc::new(Notify::new());
    let never_released = Arc::new(Notify::new());
    let fixture = Fixture::new(
        ScriptedProbe::new(Phase::Subdomains).gated(entered, never_released),
        ScriptedProbe::new(Phase::Ports).found("Port 443 (HTTPS)"),
        ScriptedProbe::new(Phase::Directories),
        ScriptedProbe::new(Phase::Vulnerabilities),
    );
    let orchestrator = fixture.orchestrator(small_candidates(), 1);

    let abandoned =
        tokio::time::timeout(Duration::from_millis(50), orchestrator.start("example.com", ScanOptions::all())).await;
    assert!(abandoned.is_err());
    assert_eq!(orchestrator.state(), ScanState::Stopped);

    let run = orchestrator.start("example.com", ScanOptions::only(&[Phase::Ports])).await.unwrap();
    assert_eq!(run.state(), ScanState::Completed);
    assert_eq!(run.store().count_by(Phase::Ports), 1);
}
