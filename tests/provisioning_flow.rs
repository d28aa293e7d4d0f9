//! End-to-end boot scenarios: each test runs the orchestrator against a
//! tempdir-backed store, a scripted portal, and a recorded restart.

use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use heatmon_provision::config::{ConfigRecord, FIELD_CAPACITY};
use heatmon_provision::provisioning::{
    BootOutcome, Orchestrator, PortalOutcome, PortalSession, PortalSubmission,
    ProvisioningPortal, RESTART_BACKOFF,
};
use heatmon_provision::reset_intent::{DoubleResetDetector, DEFAULT_WINDOW};
use heatmon_provision::store::{ConfigStore, LoadedConfig};
use heatmon_provision::system::reset::RecordedRestart;

/// Portal double scripted with one outcome; records the session it was
/// handed and whether cached credentials were cleared.
struct ScriptedPortal {
    outcome: Option<PortalOutcome>,
    seen_session: Option<PortalSession>,
    credentials_cleared: bool,
}

impl ScriptedPortal {
    fn returning(outcome: PortalOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            seen_session: None,
            credentials_cleared: false,
        }
    }
}

impl ProvisioningPortal for ScriptedPortal {
    fn run(&mut self, session: PortalSession) -> PortalOutcome {
        self.seen_session = Some(session);
        self.outcome.take().expect("portal run twice in one boot")
    }

    fn clear_cached_credentials(&mut self) {
        self.credentials_cleared = true;
    }
}

fn operator_submission() -> PortalSubmission {
    PortalSubmission {
        wifi_hostname: "heat01".into(),
        ota_password: "secret".into(),
        remote_host: "10.0.0.5".into(),
        remote_port: "1883".into(),
        remote_username: "u".into(),
        remote_password: "p".into(),
    }
}

fn arm_double_reset(dir: &std::path::Path) {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    fs::write(
        dir.join("boot_marker.json"),
        format!(r#"{{"boot_unix_ms":{now_ms}}}"#),
    )
    .unwrap();
}

#[test]
fn fresh_device_provisions_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    let detector = DoubleResetDetector::new(dir.path(), DEFAULT_WINDOW);
    let restart = RecordedRestart::new();
    let mut portal = ScriptedPortal::returning(PortalOutcome::Connected {
        submission: operator_submission(),
        save_requested: true,
    });

    let outcome = Orchestrator::new(&store, &detector, &mut portal, &restart).run();

    let expected = operator_submission().into_record();
    assert_eq!(outcome, BootOutcome::Ready(expected.clone()));
    assert_eq!(store.load(), LoadedConfig::Present(expected));
    assert!(!restart.requested());
}

#[test]
fn existing_record_seeds_the_portal() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    store.save(&operator_submission().into_record()).unwrap();
    let detector = DoubleResetDetector::new(dir.path(), DEFAULT_WINDOW);
    let restart = RecordedRestart::new();
    let mut portal = ScriptedPortal::returning(PortalOutcome::Connected {
        submission: operator_submission(),
        save_requested: false,
    });

    Orchestrator::new(&store, &detector, &mut portal, &restart).run();

    let session = portal.seen_session.expect("portal was not entered");
    let seed_of = |id: &str| {
        session
            .fields
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.value.clone())
            .unwrap()
    };
    assert_eq!(seed_of("wifi_hostname"), "heat01");
    assert_eq!(seed_of("remote_port"), "1883");
}

#[test]
fn double_reset_wipes_store_and_enters_portal_blank() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    store.save(&operator_submission().into_record()).unwrap();
    arm_double_reset(dir.path());

    let detector = DoubleResetDetector::new(dir.path(), DEFAULT_WINDOW);
    let restart = RecordedRestart::new();
    let mut portal = ScriptedPortal::returning(PortalOutcome::Connected {
        submission: PortalSubmission::default(),
        save_requested: false,
    });

    let outcome = Orchestrator::new(&store, &detector, &mut portal, &restart).run();

    assert_eq!(store.load(), LoadedConfig::Absent);
    assert!(portal.credentials_cleared);
    let session = portal.seen_session.expect("portal was not entered");
    assert!(session.fields.iter().all(|f| f.value.is_empty()));
    assert_eq!(outcome, BootOutcome::Ready(ConfigRecord::default()));
}

#[test]
fn silent_reconnect_leaves_stored_bytes_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    store.save(&operator_submission().into_record()).unwrap();
    let before = fs::read(store.config_path()).unwrap();

    let detector = DoubleResetDetector::new(dir.path(), DEFAULT_WINDOW);
    let restart = RecordedRestart::new();
    let mut portal = ScriptedPortal::returning(PortalOutcome::Connected {
        submission: operator_submission(),
        save_requested: false,
    });

    Orchestrator::new(&store, &detector, &mut portal, &restart).run();

    let after = fs::read(store.config_path()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn portal_timeout_schedules_restart_and_preserves_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    store.save(&operator_submission().into_record()).unwrap();
    let before = fs::read(store.config_path()).unwrap();

    let detector = DoubleResetDetector::new(dir.path(), DEFAULT_WINDOW);
    let restart = RecordedRestart::new();
    let mut portal = ScriptedPortal::returning(PortalOutcome::TimedOut);

    let outcome = Orchestrator::new(&store, &detector, &mut portal, &restart).run();

    assert_eq!(outcome, BootOutcome::RestartScheduled);
    assert_eq!(restart.delays(), vec![RESTART_BACKOFF]);
    assert_eq!(fs::read(store.config_path()).unwrap(), before);

    // Next simulated boot: the sequence starts over with the prior record
    // intact. The restart backoff outlives the detection window on real
    // hardware; simulate that by clearing the armed marker.
    fs::remove_file(dir.path().join("boot_marker.json")).unwrap();
    let detector = DoubleResetDetector::new(dir.path(), DEFAULT_WINDOW);
    let restart = RecordedRestart::new();
    let mut portal = ScriptedPortal::returning(PortalOutcome::Connected {
        submission: operator_submission(),
        save_requested: false,
    });
    let outcome = Orchestrator::new(&store, &detector, &mut portal, &restart).run();
    assert_eq!(
        outcome,
        BootOutcome::Ready(operator_submission().into_record())
    );
}

#[test]
fn operator_edit_of_a_seeded_record_is_committed() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    store.save(&operator_submission().into_record()).unwrap();

    let mut edited = operator_submission();
    edited.remote_host = "mqtt.internal".into();

    let detector = DoubleResetDetector::new(dir.path(), DEFAULT_WINDOW);
    let restart = RecordedRestart::new();
    let mut portal = ScriptedPortal::returning(PortalOutcome::Connected {
        submission: edited.clone(),
        save_requested: true,
    });

    let outcome = Orchestrator::new(&store, &detector, &mut portal, &restart).run();

    assert_eq!(outcome, BootOutcome::Ready(edited.clone().into_record()));
    assert_eq!(store.load(), LoadedConfig::Present(edited.into_record()));
}

#[test]
fn corrupt_record_forces_blank_reprovisioning() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    fs::write(store.config_path(), b"{\"wifi_hostname\":").unwrap();

    let detector = DoubleResetDetector::new(dir.path(), DEFAULT_WINDOW);
    let restart = RecordedRestart::new();
    let mut portal = ScriptedPortal::returning(PortalOutcome::Connected {
        submission: PortalSubmission::default(),
        save_requested: false,
    });

    Orchestrator::new(&store, &detector, &mut portal, &restart).run();

    let session = portal.seen_session.expect("portal was not entered");
    assert!(session.fields.iter().all(|f| f.value.is_empty()));
}

#[test]
fn oversize_operator_values_are_clamped_before_commit() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());

    let mut submission = operator_submission();
    submission.remote_username = "x".repeat(FIELD_CAPACITY + 64);

    let detector = DoubleResetDetector::new(dir.path(), DEFAULT_WINDOW);
    let restart = RecordedRestart::new();
    let mut portal = ScriptedPortal::returning(PortalOutcome::Connected {
        submission,
        save_requested: true,
    });

    Orchestrator::new(&store, &detector, &mut portal, &restart).run();

    match store.load() {
        LoadedConfig::Present(record) => {
            assert_eq!(record.remote_username.as_str().len(), 40);
        }
        LoadedConfig::Absent => panic!("record should have been committed"),
    }
}
