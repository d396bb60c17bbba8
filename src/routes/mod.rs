/// Router Module Index
///
/// Routes are split by who may call them. Session checks are applied as
/// layers in `create_router`; role checks live in the handlers.

/// Sign-in flow and navigation. No session required.
pub mod public;

/// Any signed-in role (401 otherwise).
pub mod authenticated;

/// Faculty-only endpoints under `/faculty`.
pub mod faculty;

/// Admin-only endpoints under `/admin`.
pub mod admin;
