//! Integration tests for the credential-grant adapter.

#![allow(clippy::unwrap_used)]

use gatepass::mocks::{MockAccountRepository, MockMailer, MockNotifier};
use gatepass::{
    AccountProvisioner, Credential, CredentialGrantAdapter, GatepassError, GrantTokenKind,
    GrantVerifier, TicketConfig, TicketIssuer, TicketKey, TicketRedeemer, TicketVerifier,
};
use std::time::Duration;

struct TestEnv {
    issuer: TicketIssuer<MockMailer>,
    adapter: CredentialGrantAdapter<MockAccountRepository, MockNotifier>,
    repo: MockAccountRepository,
}

fn create_test_env() -> TestEnv {
    let config = TicketConfig::new(TicketKey::generate());
    let repo = MockAccountRepository::new();
    let issuer = TicketIssuer::new(&config, MockMailer::new()).unwrap();
    let redeemer = TicketRedeemer::new(
        TicketVerifier::new(&config).unwrap(),
        AccountProvisioner::new(repo.clone()),
        MockNotifier::new(),
    );
    let adapter = CredentialGrantAdapter::new(repo.clone(), redeemer);
    TestEnv {
        issuer,
        adapter,
        repo,
    }
}

#[tokio::test]
async fn code_exchange_provisions_and_returns_the_email() {
    let env = create_test_env();
    let ticket = env.issuer.issue_signup("alice@example.com", "pw1").unwrap();

    let credential = env
        .adapter
        .validate_code("web", &ticket, "", "", "203.0.113.1")
        .await
        .unwrap();
    assert_eq!(credential, "alice@example.com");
    assert_eq!(env.repo.account_count(), 1);
}

#[tokio::test]
async fn code_exchange_reads_the_ticket_from_the_client_secret() {
    let env = create_test_env();
    let ticket = env.issuer.issue_signup("fay@example.com", "pw").unwrap();

    // A host following the hook contract passes the ticket as the
    // client secret; the code parameter carries no ticket.
    let err = env
        .adapter
        .validate_code("web", "", &ticket, "", "203.0.113.9")
        .await
        .unwrap_err();
    assert_eq!(err, GatepassError::AuthenticationFailed);
    assert_eq!(env.repo.account_count(), 0);

    let credential = env
        .adapter
        .validate_code("web", &ticket, "unused-code", "", "203.0.113.9")
        .await
        .unwrap();
    assert_eq!(credential, "fay@example.com");
}

#[tokio::test]
async fn password_login_works_after_code_exchange() {
    let env = create_test_env();
    let ticket = env.issuer.issue_signup("bob@example.com", "s3cret").unwrap();
    env.adapter
        .validate_code("web", &ticket, "", "", "203.0.113.2")
        .await
        .unwrap();

    env.adapter
        .validate_user("bob@example.com", "s3cret", "")
        .await
        .unwrap();

    // Last-login bookkeeping happens off the grant path.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let stored = env.repo.account("bob@example.com").unwrap();
    assert!(stored.last_login_at.is_some());
}

#[tokio::test]
async fn wrong_password_is_an_opaque_authentication_failure() {
    let env = create_test_env();
    let ticket = env.issuer.issue_signup("carol@example.com", "right").unwrap();
    env.adapter
        .validate_code("web", &ticket, "", "", "203.0.113.3")
        .await
        .unwrap();

    let err = env
        .adapter
        .validate_user("carol@example.com", "wrong", "")
        .await
        .unwrap_err();
    assert_eq!(err, GatepassError::AuthenticationFailed);
}

#[tokio::test]
async fn unknown_user_and_blank_credentials_are_rejected() {
    let env = create_test_env();
    for (user, password) in [
        ("nobody@example.com", "pw"),
        ("", "pw"),
        ("someone@example.com", ""),
    ] {
        let err = env.adapter.validate_user(user, password, "").await.unwrap_err();
        assert_eq!(err, GatepassError::AuthenticationFailed);
    }
}

#[tokio::test]
async fn client_grant_accepts_a_valid_ticket_as_the_secret() {
    let env = create_test_env();
    let ticket = env
        .issuer
        .issue_invite("dave@example.com", Credential::Randomize, None, None)
        .unwrap();
    env.adapter.validate_client("device-7", &ticket, "").await.unwrap();
    assert_eq!(env.repo.account_count(), 1);
}

#[tokio::test]
async fn client_grant_rejects_garbage_secrets_opaquely() {
    let env = create_test_env();
    let err = env
        .adapter
        .validate_client("device-7", "not-a-ticket", "")
        .await
        .unwrap_err();
    assert_eq!(err, GatepassError::AuthenticationFailed);
    assert_eq!(env.repo.account_count(), 0);
}

#[tokio::test]
async fn token_properties_identify_the_account() {
    let env = create_test_env();
    let ticket = env.issuer.issue_signup("erin@example.com", "pw").unwrap();
    env.adapter
        .validate_code("web", &ticket, "", "", "203.0.113.4")
        .await
        .unwrap();
    let account = env.repo.account("erin@example.com").unwrap();

    let props = env
        .adapter
        .add_properties(GrantTokenKind::AuthCode, "erin@example.com", "tok-1", "")
        .await
        .unwrap();
    assert_eq!(props.get("uid").map(String::as_str), Some("erin@example.com"));
    assert_eq!(props.get("id"), Some(&account.id.to_string()));
    assert!(props.contains_key("ts"));
}

#[tokio::test]
async fn token_properties_for_unknown_accounts_fail() {
    let env = create_test_env();
    let err = env
        .adapter
        .add_properties(GrantTokenKind::User, "ghost@example.com", "tok-2", "")
        .await
        .unwrap_err();
    assert_eq!(err, GatepassError::AuthenticationFailed);
}

#[tokio::test]
async fn stateless_token_hooks_are_no_ops() {
    let env = create_test_env();
    let claims = env
        .adapter
        .add_claims(GrantTokenKind::User, "x@example.com", "tok", "")
        .await
        .unwrap();
    assert!(claims.is_empty());
    env.adapter
        .store_token_id(GrantTokenKind::User, "x@example.com", "tok", "refresh")
        .unwrap();
    env.adapter
        .validate_token_id(GrantTokenKind::User, "x@example.com", "tok", "refresh")
        .unwrap();
}
