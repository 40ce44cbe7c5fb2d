// Per-service schema descriptors and their render functions
//
// Each module contributes exactly three things: the static field table, the
// dependency/primary configuration on its SCHEMA, and a render function for
// its template id. Everything else is generic.

pub mod apache;
pub mod compose;
pub mod dockerfile;
pub mod nginx;
pub mod postgresql;
pub mod redis;
pub mod sshd;
pub mod systemd;
