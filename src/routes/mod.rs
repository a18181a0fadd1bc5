/// Router Module Index
///
/// Routing split by access level, so access control is applied explicitly per module.

/// Routes open to anonymous clients (Approved resources only).
pub mod public;

/// Routes behind the `AuthUser` middleware.
pub mod authenticated;

/// Routes restricted to the 'admin' role.
pub mod admin;
