//! Login storm: several devices sign into one account that allows two
//! concurrent sessions.
//!
//! Run with `RUST_LOG=debug cargo run -p login-storm` to see every
//! throttled refresh as well as the evictions.

use logincap::prelude::*;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Treats the credential as `"<account>:<token>"`. Development only.
struct DevAuthenticator;

impl Authenticator for DevAuthenticator {
    async fn authenticate(
        &self,
        credential: &str,
    ) -> Result<AuthenticatedSession, SessionError> {
        let (account, token) = credential
            .split_once(':')
            .ok_or_else(|| SessionError::AuthFailed("expected <account>:<token>".into()))?;
        let account: u64 = account
            .parse()
            .map_err(|_| SessionError::AuthFailed("account id must be numeric".into()))?;
        Ok(AuthenticatedSession {
            account: AccountId(account),
            token: SessionToken::parse(token)?,
        })
    }
}

fn credential(account: AccountId, token: &SessionToken) -> String {
    format!("{}:{}", account.0, token.as_str())
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

const DEVICES: [&str; 4] = ["laptop", "phone", "tablet", "kiosk"];

#[tokio::main]
async fn main() -> Result<(), LogincapError> {
    logincap::init_tracing();

    let account = AccountId(1);
    let guard = LoginGuard::builder()
        .settings(LimitSettings {
            global_limit: Some("2".into()),
            ..LimitSettings::default()
        })
        .build(MemoryStore::new(), DevAuthenticator);

    // Simulated clock: one device signs in every two minutes, and every
    // signed-in device except the phone keeps browsing.
    let start = Timestamp::now();
    let mut signed_in: Vec<(&str, SessionToken)> = Vec::new();

    for (step, &device) in DEVICES.iter().enumerate() {
        let now = start.plus_secs(step as u64 * 120);
        let token = guard.login(account, now).await?;
        tracing::info!(device, %token, "device signed in");
        signed_in.push((device, token));

        for (name, token) in &signed_in {
            if *name == "phone" && step > 1 {
                continue;
            }
            let outcome = guard
                .handle_request(Some(credential(account, token).as_str()), now.plus_secs(1))
                .await;
            if let RequestOutcome::Enforced { outcome, .. } = outcome {
                if let Some(evicted) = outcome.evicted {
                    let victim = signed_in
                        .iter()
                        .find(|(_, t)| *t == evicted)
                        .map(|(n, _)| *n)
                        .unwrap_or("unknown");
                    tracing::info!(device = victim, "device was signed out");
                }
            }
        }
    }

    let remaining = guard.sessions(account).await;
    for (name, token) in &signed_in {
        let state = if remaining.contains(token) { "active" } else { "evicted" };
        println!("{name:>8}: {state}");
    }

    Ok(())
}
