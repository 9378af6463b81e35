mod common;

use serde_json::json;
use uuid::Uuid;

use prmcms_rls::auth::{PrincipalContext, RoleFlags};
use prmcms_rls::policy::{
    Authorizer, Guard, OwnerIndex, PolicyError, PolicyPredicate, PolicyRegistry, ProtectedRow, Table,
};
use prmcms_rls::types::{Operation, PolicyCommand};

fn row(value: serde_json::Value) -> ProtectedRow {
    ProtectedRow::from_value(value).unwrap()
}

fn user(flags: RoleFlags) -> PrincipalContext {
    PrincipalContext::from_flags(Uuid::new_v4(), flags, false)
}

fn staff() -> PrincipalContext {
    user(RoleFlags { staff: true, ..Default::default() })
}

fn manager() -> PrincipalContext {
    user(RoleFlags { manager: true, ..Default::default() })
}

fn plain_user() -> PrincipalContext {
    user(RoleFlags::default())
}

/// A spread of rows: owned by nobody in particular, some public, some malformed
fn sample_rows() -> Vec<ProtectedRow> {
    vec![
        row(json!({ "id": Uuid::new_v4().to_string(), "user_id": Uuid::new_v4().to_string() })),
        row(json!({ "customer_id": Uuid::new_v4().to_string(), "is_available": false })),
        row(json!({ "is_available": true, "show_on_leaderboard": true })),
        row(json!({ "user_id": 42, "customer_id": null })),
        row(json!({})),
    ]
}

const READ_TABLES: [Table; 5] = [
    Table::Customers,
    Table::Mailboxes,
    Table::Packages,
    Table::Notifications,
    Table::LoyaltyPoints,
];

#[test]
fn registry_rejects_second_policy_for_same_pair() {
    let mut registry = PolicyRegistry::standard().unwrap();
    let err = registry
        .register(
            Table::Customers,
            PolicyPredicate::new("customers_extra", PolicyCommand::Select).admit_if(Guard::Staff),
        )
        .unwrap_err();
    assert!(matches!(err, PolicyError::DuplicatePolicy { .. }));
}

#[test]
fn registry_rejects_overlap_with_for_all_policy() {
    let mut registry = PolicyRegistry::standard().unwrap();
    let err = registry
        .register(
            Table::WebhookEventLog,
            PolicyPredicate::new("webhook_reads", PolicyCommand::Select).admit_if(Guard::Staff),
        )
        .unwrap_err();
    assert!(matches!(err, PolicyError::OverlappingPolicy { .. }));
}

#[test]
fn every_required_pair_resolves_to_exactly_one_policy() {
    let registry = PolicyRegistry::standard().unwrap();
    for (table, operation) in PolicyRegistry::required_pairs() {
        let matching = registry
            .iter()
            .filter(|(t, p)| *t == table && p.command.covers(operation))
            .count();
        assert_eq!(matching, 1, "{} {}", table, operation);
    }
}

#[test]
fn dev_override_admits_everything_except_webhook_logs() {
    let authorizer = Authorizer::standard().unwrap();
    let dev_anonymous = PrincipalContext::anonymous(true);
    let owners = OwnerIndex::new();

    for (table, operation) in PolicyRegistry::required_pairs() {
        for candidate in sample_rows() {
            let allowed = authorizer.is_authorized_with(table, operation, &dev_anonymous, &candidate, &owners);
            if table == Table::WebhookEventLog {
                assert!(!allowed, "dev override leaked into webhook logs");
            } else {
                assert!(allowed, "{} {} denied in dev", table, operation);
            }
        }
    }
}

#[test]
fn staff_read_every_business_table() {
    let authorizer = Authorizer::standard().unwrap();
    let staff = staff();
    for table in READ_TABLES {
        for candidate in sample_rows() {
            assert!(authorizer.is_authorized(table, Operation::Select, &staff, &candidate));
        }
    }
}

#[test]
fn webhook_logs_follow_admin_or_manager_only() {
    let authorizer = Authorizer::standard().unwrap();
    let admin = user(RoleFlags { admin: true, ..Default::default() });
    let owner = plain_user();
    let owned = row(json!({ "user_id": owner.user_id().unwrap().to_string(), "is_available": true }));

    for operation in Operation::ALL {
        assert!(authorizer.is_authorized(Table::WebhookEventLog, operation, &admin, &owned));
        assert!(authorizer.is_authorized(Table::WebhookEventLog, operation, &manager(), &owned));
        // Staff without admin or manager, owners and public flags do not count here
        assert!(!authorizer.is_authorized(Table::WebhookEventLog, operation, &staff(), &owned));
        assert!(!authorizer.is_authorized(Table::WebhookEventLog, operation, &owner, &owned));
    }
}

#[test]
fn evaluation_is_idempotent() {
    let authorizer = Authorizer::standard().unwrap();
    let principal = plain_user();
    for table in READ_TABLES {
        for candidate in sample_rows() {
            let first = authorizer.is_authorized(table, Operation::Select, &principal, &candidate);
            let second = authorizer.is_authorized(table, Operation::Select, &principal, &candidate);
            assert_eq!(first, second);
        }
    }
}

#[test]
fn promotion_to_staff_never_removes_rows() {
    let authorizer = Authorizer::standard().unwrap();
    let user_id = Uuid::new_v4();
    let before = PrincipalContext::from_flags(user_id, RoleFlags::default(), false);
    let after = PrincipalContext::from_flags(user_id, RoleFlags { staff: true, ..Default::default() }, false);

    let mut rows = sample_rows();
    rows.push(row(json!({ "user_id": user_id.to_string(), "customer_id": user_id.to_string() })));

    for (table, operation) in PolicyRegistry::required_pairs() {
        for candidate in &rows {
            if authorizer.is_authorized(table, operation, &before, candidate) {
                assert!(authorizer.is_authorized(table, operation, &after, candidate));
            }
        }
    }
}

#[test]
fn anonymous_sees_available_mailboxes() {
    let authorizer = Authorizer::standard().unwrap();
    let anonymous = PrincipalContext::anonymous(false);

    assert!(authorizer.is_authorized(
        Table::Mailboxes,
        Operation::Select,
        &anonymous,
        &row(json!({ "is_available": true }))
    ));
    assert!(!authorizer.is_authorized(
        Table::Mailboxes,
        Operation::Select,
        &anonymous,
        &row(json!({ "is_available": false }))
    ));
}

#[test]
fn customers_are_visible_to_their_owner_only() {
    let authorizer = Authorizer::standard().unwrap();
    let principal = plain_user();
    let me = principal.user_id().unwrap().to_string();

    let mine = row(json!({ "id": Uuid::new_v4().to_string(), "user_id": me }));
    let theirs = row(json!({ "id": Uuid::new_v4().to_string(), "user_id": Uuid::new_v4().to_string() }));

    assert!(authorizer.is_authorized(Table::Customers, Operation::Select, &principal, &mine));
    assert!(!authorizer.is_authorized(Table::Customers, Operation::Select, &principal, &theirs));
}

#[test]
fn managers_read_and_write_webhook_logs() {
    let authorizer = Authorizer::standard().unwrap();
    let anything = row(json!({ "payload": { "event": "package.delivered" } }));
    for operation in [Operation::Select, Operation::Insert, Operation::Update, Operation::Delete] {
        assert!(authorizer.is_authorized(Table::WebhookEventLog, operation, &manager(), &anything));
    }
}

#[test]
fn packages_follow_customer_ownership() {
    let authorizer = Authorizer::standard().unwrap();
    let principal = plain_user();
    let customer_id = Uuid::new_v4();
    let mut owners = OwnerIndex::new();
    owners.insert(customer_id, principal.user_id().unwrap());

    let rows = vec![
        row(json!({ "id": 1, "customer_id": customer_id.to_string() })),
        row(json!({ "id": 2, "customer_id": Uuid::new_v4().to_string() })),
    ];
    let admitted = authorizer.filter_rows(Table::Packages, Operation::Select, &principal, rows, &owners);

    assert_eq!(admitted.len(), 1);
    assert_eq!(admitted[0].get("id"), Some(&json!(1)));
}

#[test]
fn unregistered_pair_is_denied() {
    let authorizer = Authorizer::standard().unwrap();
    // Customers only carries a SELECT policy
    assert!(!authorizer.is_authorized(Table::Customers, Operation::Delete, &staff(), &row(json!({}))));
}

#[test]
fn customers_also_match_on_their_own_id() {
    let authorizer = Authorizer::standard().unwrap();
    let principal = plain_user();
    let me = principal.user_id().unwrap().to_string();

    // Legacy rows keyed by the auth user id, with user_id pointing elsewhere
    let legacy = row(json!({ "id": me, "user_id": Uuid::new_v4().to_string() }));
    let foreign = row(json!({ "id": Uuid::new_v4().to_string(), "user_id": null }));

    assert!(authorizer.is_authorized(Table::Customers, Operation::Select, &principal, &legacy));
    assert!(!authorizer.is_authorized(Table::Customers, Operation::Select, &principal, &foreign));
    assert!(!authorizer.is_authorized(Table::Customers, Operation::Select, &PrincipalContext::anonymous(false), &legacy));
}

#[test]
fn loyalty_points_are_visible_to_their_owner() {
    let authorizer = Authorizer::standard().unwrap();
    let principal = plain_user();
    let me = principal.user_id().unwrap().to_string();

    let mine = row(json!({ "user_id": me, "points": 120, "show_on_leaderboard": false }));
    let theirs = row(json!({ "user_id": Uuid::new_v4().to_string(), "points": 80, "show_on_leaderboard": false }));

    assert!(authorizer.is_authorized(Table::LoyaltyPoints, Operation::Select, &principal, &mine));
    assert!(!authorizer.is_authorized(Table::LoyaltyPoints, Operation::Select, &principal, &theirs));
}

#[test]
fn leaderboard_rows_are_public() {
    let authorizer = Authorizer::standard().unwrap();
    let other = Uuid::new_v4().to_string();
    let listed = row(json!({ "user_id": other, "points": 500, "show_on_leaderboard": true }));
    let hidden = row(json!({ "user_id": other, "points": 500, "show_on_leaderboard": false }));
    let unflagged = row(json!({ "user_id": other, "points": 500 }));

    for principal in [plain_user(), PrincipalContext::anonymous(false)] {
        assert!(authorizer.is_authorized(Table::LoyaltyPoints, Operation::Select, &principal, &listed));
        assert!(!authorizer.is_authorized(Table::LoyaltyPoints, Operation::Select, &principal, &hidden));
        assert!(!authorizer.is_authorized(Table::LoyaltyPoints, Operation::Select, &principal, &unflagged));
    }
}

#[test]
fn notifications_follow_customer_id() {
    let authorizer = Authorizer::standard().unwrap();
    let principal = plain_user();
    let me = principal.user_id().unwrap().to_string();

    let mine = row(json!({ "customer_id": me, "message": "Package arrived" }));
    let theirs = row(json!({ "customer_id": Uuid::new_v4().to_string(), "message": "Package arrived" }));
    // user_id is not an owner field on notifications
    let misfiled = row(json!({ "user_id": me, "customer_id": Uuid::new_v4().to_string() }));

    assert!(authorizer.is_authorized(Table::Notifications, Operation::Select, &principal, &mine));
    assert!(!authorizer.is_authorized(Table::Notifications, Operation::Select, &principal, &theirs));
    assert!(!authorizer.is_authorized(Table::Notifications, Operation::Select, &principal, &misfiled));
    assert!(!authorizer.is_authorized(Table::Notifications, Operation::Select, &PrincipalContext::anonymous(false), &mine));
}

#[test]
fn redemptions_can_only_be_inserted_for_yourself() {
    let authorizer = Authorizer::standard().unwrap();
    let principal = plain_user();
    let me = principal.user_id().unwrap().to_string();

    let own = row(json!({ "user_id": me, "reward_id": 7 }));
    let someone_else = row(json!({ "user_id": Uuid::new_v4().to_string(), "reward_id": 7 }));

    assert!(authorizer.is_authorized(Table::RewardRedemptions, Operation::Insert, &principal, &own));
    assert!(!authorizer.is_authorized(Table::RewardRedemptions, Operation::Insert, &principal, &someone_else));
    assert!(!authorizer.is_authorized(Table::RewardRedemptions, Operation::Insert, &PrincipalContext::anonymous(false), &own));
    assert!(authorizer.is_authorized(Table::RewardRedemptions, Operation::Insert, &staff(), &someone_else));
}
