//! Process exit codes
use portal_api::error::PortalError;

/// Generic failure
const EXIT_FAILURE: i32 = 1;
/// Bad arguments or parameters
const EXIT_USAGE: i32 = 2;
/// Dataset or document does not exist
const EXIT_NOT_FOUND: i32 = 3;
/// Backend could not be reached
const EXIT_UNAVAILABLE: i32 = 4;
/// Backend answered with an error status or an unreadable body
const EXIT_BACKEND: i32 = 5;

/// Maps an error to a process exit code, looking for a [`PortalError`] anywhere in the chain.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let Some(portal) = err.chain().find_map(|e| e.downcast_ref::<PortalError>()) else {
        return EXIT_FAILURE;
    };
    match portal {
        PortalError::Validation { .. } => EXIT_USAGE,
        PortalError::NotFound { .. } => EXIT_NOT_FOUND,
        PortalError::Http { .. } | PortalError::TooManyRetries { .. } => EXIT_UNAVAILABLE,
        PortalError::ApiError { .. } | PortalError::Deserialization { .. } => EXIT_BACKEND,
        PortalError::Other { .. } => EXIT_FAILURE,
    }
}
