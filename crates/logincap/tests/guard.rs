//! Integration tests for `LoginGuard`: auth → enforcement per request.

use std::sync::Arc;

use logincap::prelude::*;
use logincap::store::StoreError;

// =========================================================================
// Mock authenticator and stores
// =========================================================================

/// Accepts `"<account>:<token>"` credentials.
struct ColonAuth;

impl Authenticator for ColonAuth {
    async fn authenticate(
        &self,
        credential: &str,
    ) -> Result<AuthenticatedSession, SessionError> {
        let (account, token) = credential
            .split_once(':')
            .ok_or_else(|| SessionError::AuthFailed("malformed".into()))?;
        let account = account
            .parse()
            .map_err(|_| SessionError::AuthFailed("bad account".into()))?;
        Ok(AuthenticatedSession {
            account: AccountId(account),
            token: SessionToken::parse(token)?,
        })
    }
}

/// A store that is always down.
struct OfflineStore;

impl SessionStore for OfflineStore {
    async fn get(
        &self,
        _account: AccountId,
    ) -> Result<Option<AccountSessionSet>, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }

    async fn put(
        &self,
        _account: AccountId,
        _sessions: &AccountSessionSet,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }

    async fn delete(&self, _account: AccountId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }
}

/// Reads from a real store but refuses every write.
struct ReadOnlyStore(MemoryStore);

impl SessionStore for ReadOnlyStore {
    async fn get(
        &self,
        account: AccountId,
    ) -> Result<Option<AccountSessionSet>, StoreError> {
        self.0.get(account).await
    }

    async fn put(
        &self,
        _account: AccountId,
        _sessions: &AccountSessionSet,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only".into()))
    }

    async fn delete(&self, _account: AccountId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only".into()))
    }
}

// =========================================================================
// Helpers
// =========================================================================

const ACCOUNT: AccountId = AccountId(5);

fn limited(raw: &str) -> LimitSettings {
    LimitSettings {
        global_limit: Some(raw.to_string()),
        ..LimitSettings::default()
    }
}

fn credential(token: &SessionToken) -> String {
    format!("{}:{}", ACCOUNT.0, token.as_str())
}

fn enforced(outcome: RequestOutcome) -> EnforceOutcome {
    match outcome {
        RequestOutcome::Enforced { outcome, .. } => outcome,
        other => panic!("expected enforcement, got {other:?}"),
    }
}

// =========================================================================
// Request handling
// =========================================================================

#[tokio::test]
async fn test_handle_request_without_credential_is_unauthenticated() {
    let guard = LoginGuard::builder().build(MemoryStore::new(), ColonAuth);

    let outcome = guard.handle_request(None, Timestamp(1)).await;

    assert_eq!(outcome, RequestOutcome::Unauthenticated);
}

#[tokio::test]
async fn test_handle_request_bad_credential_is_rejected() {
    let guard = LoginGuard::builder().build(MemoryStore::new(), ColonAuth);

    assert_eq!(
        guard.handle_request(Some("garbage"), Timestamp(1)).await,
        RequestOutcome::Rejected
    );
    assert_eq!(
        guard.handle_request(Some("5:   "), Timestamp(1)).await,
        RequestOutcome::Rejected,
        "empty token"
    );
}

#[tokio::test]
async fn test_handle_request_evicts_least_recently_active() {
    let store = MemoryStore::new();
    let guard = LoginGuard::builder()
        .settings(limited("2"))
        .build(store.clone(), ColonAuth);

    let a = guard.login(ACCOUNT, Timestamp(100)).await.unwrap();
    let b = guard.login(ACCOUNT, Timestamp(200)).await.unwrap();
    let c = guard.login(ACCOUNT, Timestamp(150)).await.unwrap();

    let outcome = enforced(
        guard
            .handle_request(Some(credential(&c).as_str()), Timestamp(300))
            .await,
    );

    assert_eq!(outcome.evicted, Some(a.clone()));
    assert!(outcome.activity_refreshed);

    let sessions = guard.sessions(ACCOUNT).await;
    assert!(!sessions.contains(&a));
    assert_eq!(sessions.get(&b).unwrap().last_activity, Some(Timestamp(200)));
    assert_eq!(sessions.get(&c).unwrap().last_activity, Some(Timestamp(300)));
}

#[tokio::test]
async fn test_evicted_session_requests_become_noops() {
    let guard = LoginGuard::builder()
        .settings(limited("1"))
        .build(MemoryStore::new(), ColonAuth);
    let old = guard.login(ACCOUNT, Timestamp(10)).await.unwrap();
    let new = guard.login(ACCOUNT, Timestamp(20)).await.unwrap();

    let first = enforced(
        guard.handle_request(Some(credential(&new).as_str()), Timestamp(21)).await,
    );
    assert_eq!(first.evicted, Some(old.clone()));

    // The evicted device comes back: nothing to enforce, nothing written.
    let second = enforced(
        guard.handle_request(Some(credential(&old).as_str()), Timestamp(200)).await,
    );
    assert!(second.is_noop());
    assert_eq!(guard.sessions(ACCOUNT).await.len(), 1);
}

#[tokio::test]
async fn test_admin_changes_apply_to_next_request() {
    let guard = LoginGuard::builder().build(MemoryStore::new(), ColonAuth);
    let a = guard.login(ACCOUNT, Timestamp(1)).await.unwrap();
    let b = guard.login(ACCOUNT, Timestamp(2)).await.unwrap();

    let before = enforced(
        guard.handle_request(Some(credential(&b).as_str()), Timestamp(3)).await,
    );
    assert_eq!(before.evicted, None, "unlimited by default");

    let admin = guard.admin();
    admin.set_global_limit("5");
    admin.set_personalized(true);
    admin.set_account_override(ACCOUNT, "1");

    let after = enforced(
        guard.handle_request(Some(credential(&b).as_str()), Timestamp(4)).await,
    );
    assert_eq!(after.limit, Some(SessionLimit::new(1)));
    assert_eq!(after.evicted, Some(a));
}

// =========================================================================
// Login / logout
// =========================================================================

#[tokio::test]
async fn test_logout_last_session_deletes_account_entry() {
    let store = MemoryStore::new();
    let guard = LoginGuard::builder().build(store.clone(), ColonAuth);
    let token = guard.login(ACCOUNT, Timestamp(1)).await.unwrap();
    assert!(store.contains(ACCOUNT).await);

    guard.logout(ACCOUNT, &token).await.unwrap();

    assert!(!store.contains(ACCOUNT).await);
}

#[tokio::test]
async fn test_logout_unknown_session_is_an_error() {
    let guard = LoginGuard::builder().build(MemoryStore::new(), ColonAuth);

    let result = guard.logout(ACCOUNT, &SessionToken::new("nope")).await;

    assert!(matches!(
        result,
        Err(LogincapError::Session(SessionError::NotFound { .. }))
    ));
}

// =========================================================================
// Store failures
// =========================================================================

#[tokio::test]
async fn test_offline_store_never_fails_the_request() {
    let guard = LoginGuard::builder()
        .settings(limited("1"))
        .build(OfflineStore, ColonAuth);

    let outcome = enforced(
        guard.handle_request(Some("5:abc"), Timestamp(10)).await,
    );

    assert_eq!(outcome.store_errors, 1);
    assert!(outcome.is_noop());
}

#[tokio::test]
async fn test_offline_store_login_reports_error() {
    let guard = LoginGuard::builder().build(OfflineStore, ColonAuth);

    let result = guard.login(ACCOUNT, Timestamp(1)).await;

    assert!(matches!(
        result,
        Err(LogincapError::Session(SessionError::Store(_)))
    ));
}

#[tokio::test]
async fn test_failed_eviction_write_is_counted_and_not_reported() {
    let inner = MemoryStore::new();
    let seed = LoginGuard::builder().build(inner.clone(), ColonAuth);
    let old = seed.login(ACCOUNT, Timestamp(10)).await.unwrap();
    let new = seed.login(ACCOUNT, Timestamp(20)).await.unwrap();

    let guard = LoginGuard::builder()
        .settings(limited("1"))
        .build(ReadOnlyStore(inner.clone()), ColonAuth);

    let outcome = enforced(
        guard.handle_request(Some(credential(&new).as_str()), Timestamp(500)).await,
    );

    // Both the eviction write and the activity write failed.
    assert_eq!(outcome.evicted, None);
    assert!(!outcome.activity_refreshed);
    assert_eq!(outcome.store_errors, 2);
    assert!(inner.get(ACCOUNT).await.unwrap().unwrap().contains(&old));
}

// =========================================================================
// Sharing across tasks
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_guard_shared_across_tasks() {
    let guard = Arc::new(
        LoginGuard::builder()
            .settings(limited("2"))
            .build(MemoryStore::new(), ColonAuth),
    );

    let mut tokens = Vec::new();
    for at in 1..=5 {
        tokens.push(guard.login(ACCOUNT, Timestamp(at)).await.unwrap());
    }

    let newest = credential(tokens.last().unwrap());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let guard = Arc::clone(&guard);
        let newest = newest.clone();
        handles.push(tokio::spawn(async move {
            guard.handle_request(Some(newest.as_str()), Timestamp(6)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let remaining = guard.sessions(ACCOUNT).await;
    assert_eq!(remaining.len(), 2);
    assert!(remaining.contains(&tokens[3]));
    assert!(remaining.contains(&tokens[4]));
}
