#![allow(clippy::unwrap_used, clippy::expect_used)]

use sleepr_security::{
    ContextError, PolicyDecision, RequestContext, RequiredRoles, ResolvedIdentity, RoleName,
    RoleSet, evaluate,
};

fn identity(id: i64, roles: &[&str]) -> ResolvedIdentity {
    ResolvedIdentity::new(
        id,
        format!("user{id}@sleepr.dev"),
        roles.iter().copied().collect::<RoleSet>(),
    )
}

#[test]
fn admin_identity_is_admitted_and_attached() {
    let required = RequiredRoles::all_of(["Admin"]);
    let resolved = identity(1, &["Admin"]);

    assert_eq!(evaluate(&resolved.roles, &required), PolicyDecision::Admit);

    let ctx = RequestContext::new();
    ctx.attach(resolved).expect("first attach succeeds");
    assert_eq!(ctx.identity().expect("identity attached").id, 1);
}

#[test]
fn member_identity_is_denied_and_nothing_is_attached() {
    let required = RequiredRoles::all_of(["Admin"]);
    let resolved = identity(2, &["Member"]);

    let decision = evaluate(&resolved.roles, &required);
    assert_eq!(
        decision,
        PolicyDecision::Deny {
            missing: vec![RoleName::from("Admin")]
        }
    );

    let ctx = RequestContext::new();
    assert_eq!(ctx.identity().unwrap_err(), ContextError::NoIdentity);
}

#[test]
fn identity_serializes_with_role_names() {
    let resolved = identity(5, &["Member", "Admin"]);
    let json = serde_json::to_value(&resolved).unwrap();

    assert_eq!(json["id"], 5);
    assert_eq!(json["roles"], serde_json::json!(["Admin", "Member"]));
}
