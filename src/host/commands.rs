//! The `lookup` chat command.

use crate::errors::CommandRejection;
use crate::models::request::{PendingRequest, RequesterIdentity};
use crate::models::session::{IdentityToken, SessionRef};

use super::directory::SessionDirectory;

/// Name the command is registered under.
pub const LOOKUP_COMMAND: &str = "lookup";

/// Turn a `lookup` invocation into a query request.
///
/// The permission check runs before the argument check, and neither
/// rejection touches any queue. The argument is sent verbatim; whitespace
/// only matters for deciding whether it is empty. The requester's identity
/// is captured now so replies can later be revalidated against the slot.
///
/// # Errors
///
/// - [`CommandRejection::PermissionDenied`] if `session` is unknown or lacks
///   `permission`.
/// - [`CommandRejection::EmptyArgument`] if `argument` is blank.
pub fn lookup_request(
    directory: &SessionDirectory,
    permission: &str,
    session: SessionRef,
    argument: &str,
) -> Result<PendingRequest, CommandRejection> {
    let record = directory
        .get(session)
        .filter(|record| record.has_permission(permission))
        .ok_or(CommandRejection::PermissionDenied)?;

    if argument.trim().is_empty() {
        return Err(CommandRejection::EmptyArgument);
    }

    let requester = RequesterIdentity::new(session, IdentityToken::new(record.bzid.clone()));
    Ok(PendingRequest::query(argument, requester))
}
