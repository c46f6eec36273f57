use folio_catalog::{AuthError, CatalogClientError};
use indoc::formatdoc;
use itertools::Itertools;

/// A user facing explanation for catalog errors that need more than the error chain.
pub fn format_catalog_error(err: &CatalogClientError) -> Option<String> {
    match err {
        CatalogClientError::Unauthorized => Some(formatdoc! {"
            The catalog did not accept your session.

            Sign in again by repeating the command with '--login'."}),
        CatalogClientError::Offline(_) => Some(formatdoc! {"
            Could not reach the catalog.

            Check your network connection and try again."}),
        CatalogClientError::InvalidUrl { url, .. } => {
            Some(format!("'{url}' is not a valid catalog URL."))
        },
        _ => None,
    }
}

/// A user facing explanation for sign-in errors that need more than the error chain.
pub fn format_auth_error(err: &AuthError) -> Option<String> {
    match err {
        err if err.is_invalid_grant() => Some(formatdoc! {"
            Your username or password was not accepted.

            The password is read from 'FOLIO_PASSWORD'."}),
        AuthError::Offline(_) => Some("Could not reach the sign-in service.".to_string()),
        _ => None,
    }
}

/// Render an error and its causes as `error: cause: cause`.
pub fn format_chain(err: &anyhow::Error) -> String {
    err.chain().join(": ")
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use folio_catalog::{ErrorCode, ProtocolError};
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn chain_lists_every_cause() {
        let err = Err::<(), _>(CatalogClientError::Unauthorized)
            .context("Could not load catalog")
            .unwrap_err();
        assert_eq!(
            format_chain(&err),
            "Could not load catalog: catalog rejected the access token"
        );
        // the catalog error is still reachable through the context
        assert!(
            err.downcast_ref::<CatalogClientError>()
                .and_then(format_catalog_error)
                .is_some_and(|message| message.contains("--login"))
        );
    }

    #[test]
    fn invalid_grant_is_explained() {
        let err = AuthError::Rejected {
            status: StatusCode::BAD_REQUEST,
            error: ProtocolError {
                code: ErrorCode::InvalidGrant,
                description: None,
            },
        };
        assert!(
            format_auth_error(&err).is_some_and(|message| message.contains("not accepted"))
        );

        let err = AuthError::Rejected {
            status: StatusCode::BAD_REQUEST,
            error: ProtocolError {
                code: ErrorCode::InvalidScope,
                description: None,
            },
        };
        assert_eq!(format_auth_error(&err), None);
    }
}
