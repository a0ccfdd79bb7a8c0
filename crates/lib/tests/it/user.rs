use docshare::{backend::CredentialStore, user::Role};

use crate::helpers::TestContext;

#[tokio::test]
async fn test_signup_creates_client_accounts() {
    let ctx = TestContext::new().await;

    let user = ctx.instance.signup("alice", "pw1").await.unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.role, Role::Client);

    let stored = ctx.instance.backend().find_user("alice").await.unwrap().unwrap();
    assert_eq!(stored, user);
}

#[tokio::test]
async fn test_duplicate_signup_keeps_existing_account() {
    let ctx = TestContext::new().await;
    let original = ctx.instance.signup("alice", "pw1").await.unwrap();

    let err = ctx.instance.signup("alice", "pw2").await.unwrap_err();
    assert!(err.is_conflict());

    let stored = ctx.instance.backend().find_user("alice").await.unwrap().unwrap();
    assert_eq!(stored.password_hash, original.password_hash);
    assert_eq!(stored.role, Role::Client);
    assert_eq!(ctx.instance.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_across_roles_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.instance
        .create_user("ops", "secret", Role::Operation)
        .await
        .unwrap();

    let err = ctx.instance.signup("ops", "other").await.unwrap_err();
    assert!(err.is_conflict());

    let stored = ctx.instance.backend().find_user("ops").await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Operation);
}

#[tokio::test]
async fn test_authenticate_unknown_pairs_are_false() {
    let ctx = TestContext::new().await;
    ctx.instance.signup("alice", "pw1").await.unwrap();

    let pairs = [
        ("alice", "pw2"),
        ("alice", ""),
        ("alice", "PW1"),
        ("Alice", "pw1"),
        ("bob", "pw1"),
        ("", ""),
    ];
    for (username, password) in pairs {
        assert!(
            !ctx.instance.authenticate(username, password).await.unwrap(),
            "{username}/{password} should not authenticate"
        );
    }
    assert!(ctx.instance.authenticate("alice", "pw1").await.unwrap());
}

#[tokio::test]
async fn test_login_returns_account() {
    let ctx = TestContext::new().await;
    ctx.instance
        .create_user("ops", "secret", Role::Operation)
        .await
        .unwrap();

    let user = ctx.instance.login("ops", "secret").await.unwrap();
    assert_eq!(user.role, Role::Operation);

    let err = ctx.instance.login("ops", "wrong").await.unwrap_err();
    assert!(err.is_authentication_error());
    let err = ctx.instance.login("nobody", "secret").await.unwrap_err();
    assert!(err.is_authentication_error());
}

#[tokio::test]
async fn test_list_users_in_creation_order() {
    let ctx = TestContext::new().await;
    ctx.instance.signup("carol", "x").await.unwrap();
    ctx.instance
        .create_user("ops", "y", Role::Operation)
        .await
        .unwrap();
    ctx.instance.signup("alice", "z").await.unwrap();

    let names: Vec<String> = ctx
        .instance
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, ["carol", "ops", "alice"]);
}
