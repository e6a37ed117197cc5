//! Authentication hook: who is making this request, with which session.
//!
//! logincap doesn't validate credentials itself. Cookie parsing, signature
//! checks, and password verification belong to your auth layer. The
//! [`Authenticator`] trait is the seam: it turns whatever the client
//! presented into an account id and a session token, and enforcement runs
//! against those.

use std::future::Future;

use logincap_protocol::{AccountId, SessionToken};

use crate::SessionError;

/// The identity behind an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    /// The account the request acts as.
    pub account: AccountId,
    /// The session the request belongs to.
    pub token: SessionToken,
}

/// Validates a request credential and returns the session behind it.
///
/// `Send + Sync + 'static` because the authenticator is shared by every
/// request handler for the life of the process.
///
/// # Example
///
/// ```rust
/// use logincap_protocol::{AccountId, SessionToken};
/// use logincap_session::{AuthenticatedSession, Authenticator, SessionError};
///
/// /// Accepts `"<account>:<token>"` without checking anything.
/// /// Only for development, never use this in production!
/// struct DevAuthenticator;
///
/// impl Authenticator for DevAuthenticator {
///     async fn authenticate(
///         &self,
///         credential: &str,
///     ) -> Result<AuthenticatedSession, SessionError> {
///         let (account, token) = credential.split_once(':').ok_or_else(|| {
///             SessionError::AuthFailed("expected <account>:<token>".into())
///         })?;
///         let account: u64 = account.parse().map_err(|_| {
///             SessionError::AuthFailed("account id must be numeric".into())
///         })?;
///         Ok(AuthenticatedSession {
///             account: AccountId(account),
///             token: SessionToken::parse(token)?,
///         })
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Validates `credential` and returns the authenticated session.
    ///
    /// # Errors
    /// [`SessionError::AuthFailed`] (or [`SessionError::InvalidToken`])
    /// when the credential is not acceptable.
    fn authenticate(
        &self,
        credential: &str,
    ) -> impl Future<Output = Result<AuthenticatedSession, SessionError>> + Send;
}
