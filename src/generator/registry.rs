//! Table of supported services
//!
//! Adding a service means adding its schema module and one entry here; the
//! metadata and generation endpoints pick it up automatically.

use super::metadata::ServiceSchema;
use super::schemas;

/// Every supported service, in the order the UI lists them
pub static SERVICES: &[&ServiceSchema] = &[
    &schemas::nginx::SCHEMA,
    &schemas::dockerfile::SCHEMA,
    &schemas::compose::SCHEMA,
    &schemas::systemd::SCHEMA,
    &schemas::apache::SCHEMA,
    &schemas::postgresql::SCHEMA,
    &schemas::sshd::SCHEMA,
    &schemas::redis::SCHEMA,
];

/// Look up a service schema by its route identifier
pub fn lookup(service: &str) -> Option<&'static ServiceSchema> {
    SERVICES
        .iter()
        .copied()
        .find(|schema| schema.service == service)
}
