//! Load/save controller behavior against a recording fake backend.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use cpv_client::{ClientError, SaveReceipt};
use cpv_core::{BestCandidate, Checkplot, MethodTag, Variability};
use cpv_review::{
    Backend, Controller, ControllerError, ControllerOptions, NoticeLevel, Outcome, Phase,
    QueueNavigator, ReviewQueue, UpdateLog,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

// ── Fake backend ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Fetch(String),
    Save(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveMode {
    Accept,
    Reject,
    Hang,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    Serve,
    Hang,
}

struct FakeBackend {
    bundles: HashMap<String, Value>,
    calls: RefCell<Vec<Call>>,
    payloads: RefCell<Vec<Value>>,
    save_mode: Cell<SaveMode>,
    fetch_mode: Cell<FetchMode>,
}

impl FakeBackend {
    fn new() -> Self {
        let mut bundles = HashMap::new();
        for (identifier, objectid) in [
            ("obj001.pkl", "obj001"),
            ("obj002.pkl", "obj002"),
            ("obj003.pkl", "obj003"),
        ] {
            bundles.insert(identifier.to_string(), bundle(objectid));
        }
        Self {
            bundles,
            calls: RefCell::new(Vec::new()),
            payloads: RefCell::new(Vec::new()),
            save_mode: Cell::new(SaveMode::Accept),
            fetch_mode: Cell::new(FetchMode::Serve),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn last_payload(&self) -> Value {
        self.payloads.borrow().last().cloned().expect("a save was sent")
    }
}

impl Backend for FakeBackend {
    async fn fetch(&self, identifier: &str) -> Result<Checkplot, ClientError> {
        self.calls
            .borrow_mut()
            .push(Call::Fetch(identifier.to_string()));
        if self.fetch_mode.get() == FetchMode::Hang {
            return std::future::pending().await;
        }
        match self.bundles.get(identifier) {
            Some(value) => Ok(Checkplot::from_value(value.clone())?),
            None => Err(ClientError::Api {
                status: 404,
                message: format!("{identifier} not found"),
            }),
        }
    }

    async fn save(&self, identifier: &str, checkplot: &Checkplot) -> Result<SaveReceipt, ClientError> {
        self.calls
            .borrow_mut()
            .push(Call::Save(identifier.to_string()));
        let payload = serde_json::to_value(checkplot.save_contents()).expect("payload serializes");
        self.payloads.borrow_mut().push(payload.clone());
        match self.save_mode.get() {
            SaveMode::Accept => Ok(SaveReceipt {
                message: "checkplot updated".to_string(),
                changes: json!({"varinfo": payload["varinfo"]}),
                unixtime: Some(1_700_000_000.0 + self.payloads.borrow().len() as f64),
                checkplot: Some(json!(identifier)),
            }),
            SaveMode::Reject => Err(ClientError::Rejected {
                status: "failed".to_string(),
                message: "checkplot is read-only".to_string(),
            }),
            SaveMode::Hang => std::future::pending().await,
        }
    }
}

fn bundle(objectid: &str) -> Value {
    json!({
        "objectid": objectid,
        "objectinfo": {"ra": 10.0, "decl": -5.0, "objecttags": ""},
        "varinfo": {"objectisvar": null, "varperiod": null, "varepoch": null, "vartags": ""},
        "objectcomments": "",
        "pdm": {
            "periodogram": "PDM",
            "0": {"period": 1.5, "epoch": 100.0, "plot": "p0"},
            "1": {"period": 3.0, "epoch": 100.5, "plot": "p1"}
        },
        "gls": {
            "periodogram": "GLS",
            "0": {"period": 1.49, "epoch": 100.1, "plot": "g0"},
            "1": {"period": 0.75, "epoch": 100.2, "plot": "g1"},
            "2": {"period": 2.98, "epoch": 100.3, "plot": "g2"}
        }
    })
}

fn controller() -> Controller<FakeBackend> {
    let queue = ReviewQueue::new(vec![
        "obj001.pkl".to_string(),
        "obj002.pkl".to_string(),
        "obj003.pkl".to_string(),
    ]);
    Controller::new(
        FakeBackend::new(),
        queue,
        UpdateLog::new(),
        ControllerOptions {
            timeout: Duration::from_millis(200),
            ..ControllerOptions::default()
        },
    )
}

fn current_objectid<B: Backend, Q: QueueNavigator>(ctl: &Controller<B, Q>) -> Option<String> {
    ctl.store().checkplot().map(|cp| cp.objectid.clone())
}

// ── Scenarios ──────────────────────────────────────────────────────

#[tokio::test]
async fn flag_edit_is_saved_and_logged() {
    let mut ctl = controller();

    let outcome = ctl.request("obj001.pkl").await;
    assert!(matches!(outcome, Outcome::Loaded { index: Some(0), .. }));
    assert_eq!(ctl.form().variability, Variability::Unknown);
    assert_eq!(ctl.form().variability.as_str(), "unknown");

    ctl.set_variability(Variability::Variable);
    let outcome = ctl.save().await;
    assert!(matches!(outcome, Outcome::Saved { ref identifier } if identifier == "obj001.pkl"));

    let payload = ctl.backend().last_payload();
    assert_eq!(payload["varinfo"]["objectisvar"], json!(true));
    assert_eq!(ctl.updates().len(), 1);
    assert_eq!(ctl.updates().for_object("obj001.pkl").len(), 1);
    assert_eq!(ctl.phase(), Phase::Loaded);
}

#[tokio::test]
async fn save_happens_before_next_fetch() {
    let mut ctl = controller();
    ctl.request("obj001.pkl").await;
    ctl.set_comments("looks like an EB");

    let outcome = ctl.next().await;
    assert!(matches!(outcome, Outcome::Loaded { ref identifier, index: Some(1) } if identifier == "obj002.pkl"));

    assert_eq!(
        ctl.backend().calls(),
        vec![
            Call::Fetch("obj001.pkl".to_string()),
            Call::Save("obj001.pkl".to_string()),
            Call::Fetch("obj002.pkl".to_string()),
        ]
    );
    assert_eq!(ctl.backend().last_payload()["comments"], "looks like an EB");
    assert_eq!(ctl.queue().highlighted(), Some(1));
    assert_eq!(ctl.form().comments, "");
}

#[tokio::test]
async fn save_captures_latest_form_fields() {
    let mut ctl = controller();
    ctl.request("obj002.pkl").await;
    ctl.set_vartags("rr-lyrae");
    ctl.set_objecttags("crowded");
    ctl.set_comments("first draft");
    ctl.set_comments("second draft");

    ctl.save().await;

    let payload = ctl.backend().last_payload();
    assert_eq!(payload["varinfo"]["vartags"], "rr-lyrae");
    assert_eq!(payload["objectinfo"]["objecttags"], "crowded");
    assert_eq!(payload["comments"], "second draft");
    let cp = ctl.store().checkplot().expect("still loaded");
    assert_eq!(cp.objectcomments, "second draft");
}

#[tokio::test]
async fn rejected_save_cancels_navigation_and_keeps_edits() {
    let mut ctl = controller();
    ctl.request("obj001.pkl").await;
    ctl.set_variability(Variability::NotVariable);
    ctl.set_comments("not variable");
    ctl.take_notices();
    ctl.backend().save_mode.set(SaveMode::Reject);

    let outcome = ctl.request("obj003.pkl").await;
    assert!(matches!(
        outcome,
        Outcome::Failed(ControllerError::SaveRejected { ref identifier, .. }) if identifier == "obj001.pkl"
    ));
    assert_eq!(
        ctl.backend().calls(),
        vec![
            Call::Fetch("obj001.pkl".to_string()),
            Call::Save("obj001.pkl".to_string()),
        ]
    );
    assert_eq!(ctl.phase(), Phase::Loaded);
    assert_eq!(current_objectid(&ctl).as_deref(), Some("obj001"));
    let cp = ctl.store().checkplot().expect("still loaded");
    assert_eq!(cp.varinfo.objectisvar, Variability::NotVariable);
    assert_eq!(cp.objectcomments, "not variable");
    assert!(ctl.updates().is_empty());

    let notices = ctl.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.contains("obj003.pkl"));

    // Manual retry once the server accepts again.
    ctl.backend().save_mode.set(SaveMode::Accept);
    let outcome = ctl.request("obj003.pkl").await;
    assert!(matches!(outcome, Outcome::Loaded { .. }));
    assert_eq!(current_objectid(&ctl).as_deref(), Some("obj003"));
}

#[tokio::test]
async fn failed_fetch_leaves_current_checkplot() {
    let mut ctl = controller();
    ctl.request("obj001.pkl").await;
    ctl.select_candidate(MethodTag::Gls, 2);
    let before = ctl.store().checkplot().cloned();

    let outcome = ctl.request("missing.pkl").await;
    assert!(matches!(
        outcome,
        Outcome::Failed(ControllerError::FetchFailure { ref identifier, .. }) if identifier == "missing.pkl"
    ));
    assert_eq!(ctl.phase(), Phase::Loaded);
    assert_eq!(ctl.store().checkplot().cloned(), before);
    assert_eq!(ctl.store().identifier(), Some("obj001.pkl"));
    assert_eq!(ctl.queue().highlighted(), Some(0));
    assert!(
        ctl.take_notices()
            .iter()
            .any(|n| n.level == NoticeLevel::Error && n.message.contains("missing.pkl"))
    );
}

#[tokio::test]
async fn failed_first_fetch_returns_to_idle() {
    let mut ctl = controller();
    let outcome = ctl.request("missing.pkl").await;
    assert!(outcome.is_failure());
    assert_eq!(ctl.phase(), Phase::Idle);
    assert!(!ctl.store().is_loaded());
    assert!(ctl.panels().is_empty());
}

#[tokio::test]
async fn candidate_selection_is_exclusive_across_methods() {
    let mut ctl = controller();
    ctl.request("obj001.pkl").await;

    ctl.select_candidate(MethodTag::Pdm, 1);
    ctl.select_candidate(MethodTag::Gls, 0);

    let marked: Vec<_> = ctl
        .panels()
        .candidates()
        .filter(|c| c.is_current_best)
        .map(|c| (c.method, c.candidate_index))
        .collect();
    assert_eq!(marked, vec![(MethodTag::Gls, 0)]);
    assert_eq!(
        ctl.store().best(),
        Some(BestCandidate {
            method: MethodTag::Gls,
            slot: 0
        })
    );
    assert_eq!(ctl.form().period, Some(1.49));
    assert_eq!(ctl.form().epoch, Some(100.1));

    ctl.save().await;
    let payload = ctl.backend().last_payload();
    assert_eq!(payload["varinfo"]["varperiod"], json!(1.49));
    assert_eq!(payload["varinfo"]["varepoch"], json!(100.1));
}

#[tokio::test]
async fn selecting_missing_candidate_warns() {
    let mut ctl = controller();
    ctl.request("obj001.pkl").await;
    ctl.select_candidate(MethodTag::Pdm, 0);

    let outcome = ctl.select_candidate(MethodTag::Bls, 0);
    assert!(matches!(outcome, Outcome::Skipped(ControllerError::NoSuchCandidate { .. })));
    assert_eq!(ctl.panels().current_best().map(|c| c.method), Some(MethodTag::Pdm));
    assert!(
        ctl.take_notices()
            .iter()
            .any(|n| n.level == NoticeLevel::Warning)
    );
}

#[tokio::test]
async fn manual_period_clears_best_mark() {
    let mut ctl = controller();
    ctl.request("obj001.pkl").await;
    ctl.select_candidate(MethodTag::Pdm, 0);

    ctl.set_period(Some(1.5001));
    assert!(ctl.panels().current_best().is_none());
    assert_eq!(ctl.form().period, Some(1.5001));
    assert_eq!(
        ctl.store().checkplot().and_then(|cp| cp.varinfo.varperiod),
        Some(1.5001)
    );
}

#[tokio::test]
async fn panels_follow_loaded_checkplot() {
    let mut ctl = controller();
    assert!(ctl.panels().is_empty());
    ctl.request("obj001.pkl").await;

    let methods: Vec<_> = ctl.panels().groups.iter().map(|g| g.method).collect();
    assert_eq!(methods, vec![MethodTag::Pdm, MethodTag::Gls]);
    assert!((ctl.panels().column_width - 6.0).abs() < f64::EPSILON);
    assert_eq!(ctl.panels().groups[1].candidates.len(), 3);
}

#[tokio::test]
async fn queue_boundaries_are_silent_noops() {
    let mut ctl = controller();
    ctl.request("obj001.pkl").await;
    ctl.take_notices();

    let outcome = ctl.previous().await;
    assert!(matches!(
        outcome,
        Outcome::Skipped(ControllerError::QueueBoundary { requested: -1, len: 3 })
    ));

    ctl.request("obj003.pkl").await;
    let calls_before = ctl.backend().calls().len();
    let outcome = ctl.next().await;
    assert!(matches!(
        outcome,
        Outcome::Skipped(ControllerError::QueueBoundary { requested: 3, len: 3 })
    ));
    assert_eq!(ctl.backend().calls().len(), calls_before);
    assert!(ctl.take_notices().iter().all(|n| n.level == NoticeLevel::Info));
    assert_eq!(current_objectid(&ctl).as_deref(), Some("obj003"));
}

#[tokio::test]
async fn next_with_nothing_loaded_starts_at_front() {
    let mut ctl = controller();
    let outcome = ctl.next().await;
    assert!(matches!(outcome, Outcome::Loaded { index: Some(0), .. }));
    assert_eq!(ctl.backend().calls(), vec![Call::Fetch("obj001.pkl".to_string())]);

    let outcome = ctl.previous().await;
    assert!(matches!(outcome, Outcome::Skipped(ControllerError::QueueBoundary { .. })));
}

#[tokio::test]
async fn edits_without_checkplot_are_absorbed() {
    let mut ctl = controller();

    assert!(matches!(
        ctl.save().await,
        Outcome::Skipped(ControllerError::NoCurrentCheckplot)
    ));
    assert!(matches!(
        ctl.set_variability(Variability::Variable),
        Outcome::Skipped(ControllerError::NoCurrentCheckplot)
    ));
    assert!(matches!(
        ctl.set_comments("hello"),
        Outcome::Skipped(ControllerError::NoCurrentCheckplot)
    ));
    assert!(matches!(ctl.previous().await, Outcome::Skipped(ControllerError::NoCurrentCheckplot)));
    assert!(ctl.backend().calls().is_empty());
    assert!(ctl.take_notices().is_empty());
    assert_eq!(ctl.phase(), Phase::Idle);
}

#[tokio::test]
async fn identifier_outside_queue_loads_without_index() {
    let mut ctl = controller();
    ctl.request("obj001.pkl").await;
    ctl.request("obj002.pkl").await;
    assert_eq!(ctl.store().index(), Some(1));

    let mut backend = FakeBackend::new();
    backend
        .bundles
        .insert("adhoc.pkl".to_string(), bundle("adhoc"));
    let mut ctl = Controller::new(
        backend,
        ReviewQueue::default(),
        UpdateLog::new(),
        ControllerOptions::default(),
    );
    let outcome = ctl.request("adhoc.pkl").await;
    assert!(matches!(outcome, Outcome::Loaded { index: None, .. }));
    assert!(matches!(
        ctl.next().await,
        Outcome::Skipped(ControllerError::NotInQueue(_))
    ));
}

#[tokio::test]
async fn hung_save_times_out_as_rejection() {
    let mut ctl = controller();
    ctl.request("obj001.pkl").await;
    ctl.backend().save_mode.set(SaveMode::Hang);

    let outcome = ctl.next().await;
    match outcome {
        Outcome::Failed(ControllerError::SaveRejected { reason, .. }) => {
            assert!(reason.contains("timed out"), "unexpected reason: {reason}");
        }
        other => panic!("expected save rejection, got {other:?}"),
    }
    assert_eq!(ctl.phase(), Phase::Loaded);
    assert_eq!(current_objectid(&ctl).as_deref(), Some("obj001"));
}

#[tokio::test]
async fn hung_fetch_times_out_and_keeps_current_checkplot() {
    let mut ctl = controller();
    ctl.request("obj001.pkl").await;
    ctl.select_candidate(MethodTag::Pdm, 1);
    let before = ctl.store().checkplot().cloned();
    ctl.take_notices();
    ctl.backend().fetch_mode.set(FetchMode::Hang);

    let outcome = ctl.next().await;
    match outcome {
        Outcome::Failed(ControllerError::FetchFailure { identifier, reason }) => {
            assert_eq!(identifier, "obj002.pkl");
            assert!(reason.contains("timed out"), "unexpected reason: {reason}");
        }
        other => panic!("expected fetch failure, got {other:?}"),
    }
    assert_eq!(ctl.phase(), Phase::Loaded);
    assert_eq!(ctl.store().checkplot().cloned(), before);
    assert_eq!(ctl.store().identifier(), Some("obj001.pkl"));
    assert_eq!(ctl.store().best().map(|b| b.slot), Some(1));
    assert_eq!(ctl.queue().highlighted(), Some(0));
    assert!(
        ctl.take_notices()
            .iter()
            .any(|n| n.level == NoticeLevel::Error && n.message.contains("obj002.pkl"))
    );
}

#[tokio::test]
async fn hung_first_fetch_returns_to_idle() {
    let mut ctl = controller();
    ctl.backend().fetch_mode.set(FetchMode::Hang);

    let outcome = ctl.next().await;
    match outcome {
        Outcome::Failed(ControllerError::FetchFailure { reason, .. }) => {
            assert!(reason.contains("timed out"), "unexpected reason: {reason}");
        }
        other => panic!("expected fetch failure, got {other:?}"),
    }
    assert_eq!(ctl.phase(), Phase::Idle);
    assert!(!ctl.store().is_loaded());
    assert!(ctl.panels().is_empty());

    // Navigation works again once the server answers.
    ctl.backend().fetch_mode.set(FetchMode::Serve);
    assert!(matches!(ctl.next().await, Outcome::Loaded { index: Some(0), .. }));
}

#[tokio::test]
async fn close_saves_pending_edits() {
    let mut ctl = controller();
    ctl.request("obj001.pkl").await;
    ctl.set_objecttags("reviewed");

    let outcome = ctl.close().await;
    assert!(matches!(outcome, Outcome::Saved { .. }));
    assert_eq!(ctl.backend().last_payload()["objectinfo"]["objecttags"], "reviewed");
}

#[tokio::test]
async fn every_accepted_save_is_logged_under_its_identifier() {
    let mut ctl = controller();
    ctl.next().await;
    ctl.next().await;
    ctl.next().await;
    ctl.save().await;

    assert_eq!(ctl.updates().len(), 3);
    assert_eq!(ctl.updates().for_object("obj001.pkl").len(), 1);
    assert_eq!(ctl.updates().for_object("obj002.pkl").len(), 1);
    assert_eq!(ctl.updates().for_object("obj003.pkl").len(), 1);
}
