use docshare::{
    auth::{Access, SessionIdentity},
    user::Role,
};

use crate::helpers::TestContext;

#[tokio::test]
async fn test_session_gate_without_identity() {
    let ctx = TestContext::new().await;
    let access = ctx.instance.check_session(None).await.unwrap();
    assert_eq!(access, Access::Unauthenticated);
}

#[tokio::test]
async fn test_session_gate_unknown_user() {
    let ctx = TestContext::new().await;
    let identity = SessionIdentity {
        username: "ghost".to_string(),
        credential_stamp: "whatever".to_string(),
    };
    let access = ctx.instance.check_session(Some(&identity)).await.unwrap();
    assert_eq!(access, Access::Unauthenticated);
}

#[tokio::test]
async fn test_session_gate_stale_stamp() {
    let ctx = TestContext::new().await;
    let (_, mut identity) = ctx.user_with_session("alice", "pw", Role::Client).await;
    identity.credential_stamp.push('x');

    let access = ctx.instance.check_session(Some(&identity)).await.unwrap();
    assert_eq!(access, Access::Unauthenticated);
}

#[tokio::test]
async fn test_session_gate_grants_current_account() {
    let ctx = TestContext::new().await;
    let (user, identity) = ctx.user_with_session("alice", "pw", Role::Client).await;

    let access = ctx.instance.check_session(Some(&identity)).await.unwrap();
    assert_eq!(access, Access::Granted(user));
}

#[tokio::test]
async fn test_role_gate_both_directions() {
    let ctx = TestContext::new().await;
    let (_, ops) = ctx.user_with_session("ops", "pw", Role::Operation).await;
    let (_, client) = ctx.user_with_session("carol", "pw", Role::Client).await;

    let access = ctx
        .instance
        .check_role(Some(&client), Role::Operation)
        .await
        .unwrap();
    assert_eq!(
        access,
        Access::Forbidden {
            required: Role::Operation,
            actual: Role::Client
        }
    );

    let access = ctx
        .instance
        .check_role(Some(&ops), Role::Client)
        .await
        .unwrap();
    assert_eq!(
        access,
        Access::Forbidden {
            required: Role::Client,
            actual: Role::Operation
        }
    );

    assert!(
        ctx.instance
            .check_role(Some(&ops), Role::Operation)
            .await
            .unwrap()
            .is_granted()
    );
    assert!(
        ctx.instance
            .check_role(Some(&client), Role::Client)
            .await
            .unwrap()
            .is_granted()
    );
}

#[tokio::test]
async fn test_role_gate_checks_session_first() {
    let ctx = TestContext::new().await;
    for role in [Role::Operation, Role::Client] {
        let access = ctx.instance.check_role(None, role).await.unwrap();
        assert_eq!(access, Access::Unauthenticated);
        assert!(
            access
                .into_result()
                .unwrap_err()
                .is_authentication_error()
        );
    }
}
