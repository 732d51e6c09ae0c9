//! Roster deployment against a live registry.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::sync::Arc;

use registry::RegistryServices;
use registry::deployment::{DeploymentError, EntryOutcome, deploy_roster};
use registry::domain::{Identity, RegistrationError, Role};
use registry::outbound::audit::RecordingAuditLog;
use roster::Roster;
use rstest::{fixture, rstest};

const MANAGER: &str = "0x32aF180b7F075E4a000041c392aEf5E27B27F910";
const CUSTOMER: &str = "0xaD3115B2247b22ce685Fc8711194fE317F2974ce";

fn identity(raw: &str) -> Identity {
    Identity::new(raw).expect("valid identity")
}

fn roster(users: &str) -> Roster {
    Roster::from_json(&format!(
        r#"{{"version": 1, "deployer": "{MANAGER}", "users": [{users}]}}"#
    ))
    .expect("valid roster")
}

fn standard_roster() -> Roster {
    roster(&format!(
        r#"{{"address": "{MANAGER}", "displayName": "Roni Manager", "role": 1}},
           {{"address": "{CUSTOMER}", "displayName": "Bob Customer", "role": 2}}"#
    ))
}

#[fixture]
fn services() -> RegistryServices {
    RegistryServices::in_memory_with_audit(
        identity(MANAGER),
        Arc::new(RecordingAuditLog::default()),
    )
}

#[rstest]
fn first_deployment_seeds_and_registers(services: RegistryServices) {
    let report = deploy_roster(&services, &standard_roster()).expect("deploy");

    assert_eq!(report.registered().count(), 2);
    assert_eq!(report.users, vec![identity(MANAGER), identity(CUSTOMER)]);
    let manager = services
        .queries()
        .lookup(&identity(MANAGER))
        .expect("manager registered");
    assert_eq!(manager.role(), Role::Manager);
    assert_eq!(manager.registered_at().sequence, 1);
}

#[rstest]
fn rerunning_a_deployment_only_warns(services: RegistryServices) {
    deploy_roster(&services, &standard_roster()).expect("first deploy");

    let report = deploy_roster(&services, &standard_roster()).expect("second deploy");

    assert!(
        report
            .entries
            .iter()
            .all(|entry| entry.outcome == EntryOutcome::AlreadyPresent)
    );
    assert_eq!(report.users, vec![identity(MANAGER), identity(CUSTOMER)]);
    assert_eq!(
        report.summary_lines().last().map(String::as_str),
        Some(format!("User Addresses: [{MANAGER}, {CUSTOMER}]").as_str())
    );
}

#[rstest]
fn duplicate_roster_entries_keep_the_first_record(services: RegistryServices) {
    let roster = roster(&format!(
        r#"{{"address": "{MANAGER}", "displayName": "Roni Manager", "role": 1}},
           {{"address": "{CUSTOMER}", "displayName": "Bob Customer", "role": 2}},
           {{"address": "{CUSTOMER}", "displayName": "Bob Again", "role": 1}}"#
    ));

    let report = deploy_roster(&services, &roster).expect("deploy");

    assert_eq!(report.entries[2].outcome, EntryOutcome::AlreadyPresent);
    let bob = services
        .queries()
        .lookup(&identity(CUSTOMER))
        .expect("bob registered");
    assert_eq!(bob.display_name().as_ref(), "Bob Customer");
    assert_eq!(bob.role(), Role::Customer);
}

#[rstest]
fn invalid_entries_are_rejected_and_skipped(services: RegistryServices) {
    let roster = roster(&format!(
        r#"{{"address": "{MANAGER}", "displayName": "Roni Manager", "role": 1}},
           {{"address": "not-an-address", "displayName": "Nobody", "role": 2}},
           {{"address": "{CUSTOMER}", "displayName": "Bob Customer", "role": "auditor"}},
           {{"address": "0xC3", "displayName": "Carol", "role": "customer"}}"#
    ));

    let report = deploy_roster(&services, &roster).expect("deploy");

    assert!(matches!(report.entries[1].outcome, EntryOutcome::Rejected { .. }));
    assert!(matches!(report.entries[2].outcome, EntryOutcome::Rejected { .. }));
    assert!(matches!(report.entries[3].outcome, EntryOutcome::Registered(_)));
    assert_eq!(report.users, vec![identity(MANAGER), identity("0xC3")]);
}

#[rstest]
fn unknown_role_codes_abort_the_deployment(services: RegistryServices) {
    let roster = roster(&format!(
        r#"{{"address": "{MANAGER}", "displayName": "Roni Manager", "role": 1}},
           {{"address": "{CUSTOMER}", "displayName": "Bob Customer", "role": 9}},
           {{"address": "0xC3", "displayName": "Carol", "role": 2}}"#
    ));

    let error = deploy_roster(&services, &roster).expect_err("invalid role aborts");

    assert!(matches!(
        error,
        DeploymentError::Registration {
            index: 1,
            source: RegistrationError::InvalidRole { .. },
            ..
        }
    ));
    assert_eq!(services.queries().all(), vec![identity(MANAGER)]);
}

#[rstest]
fn a_foreign_deployer_is_refused(services: RegistryServices) {
    let foreign = Roster::from_json(&format!(
        r#"{{"version": 1, "deployer": "{CUSTOMER}", "users": [{{"address": "{CUSTOMER}", "displayName": "Bob Customer", "role": 1}}]}}"#
    ))
    .expect("valid roster");

    let error = deploy_roster(&services, &foreign).expect_err("not the owner");

    assert!(matches!(error, DeploymentError::DeployerMismatch { .. }));
    assert!(services.queries().all().is_empty());
}

#[rstest]
fn an_empty_registry_needs_a_manager_first(services: RegistryServices) {
    let roster = roster(&format!(
        r#"{{"address": "{CUSTOMER}", "displayName": "Bob Customer", "role": 2}}"#
    ));

    let error = deploy_roster(&services, &roster).expect_err("customer cannot seed");

    assert!(matches!(error, DeploymentError::InvalidGenesisEntry { .. }));
    assert!(services.queries().all().is_empty());
}
