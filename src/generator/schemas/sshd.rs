//! OpenSSH daemon schema and template

use serde_json::{Map, Value};

use crate::generator::metadata::{
    DefaultValue, FieldKind, FieldSpec, FieldType, Presence, ServiceSchema,
};
use crate::services::render::{
    ctx_opt_bool, ctx_opt_i64, ctx_opt_str, ctx_str_list, TemplateError,
};

pub static SCHEMA: ServiceSchema = ServiceSchema {
    service: "sshd",
    display_name: "SSHD",
    description: "Daemon configuration for the OpenSSH server",
    file_extension: "",
    template: "sshd_config",
    fields: &[
        FieldSpec {
            name: "port",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::Int(22)),
            description: "Port the SSH server listens on. 22 by default, often changed for hardening",
            example: Some("22"),
        },
        FieldSpec {
            name: "protocol",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::Int(2)),
            description: "SSH protocol version. Version 2 is the secure, recommended one",
            example: Some("2"),
        },
        FieldSpec {
            name: "permit_root_login",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("prohibit-password")),
            description: "Whether root may log in: 'yes', 'no', 'without-password' or 'prohibit-password'",
            example: Some("prohibit-password"),
        },
        FieldSpec {
            name: "max_auth_tries",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::Int(6)),
            description: "Authentication attempts allowed before the connection is dropped",
            example: Some("6"),
        },
        FieldSpec {
            name: "max_sessions",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::Int(10)),
            description: "Maximum concurrent SSH sessions on the server",
            example: Some("10"),
        },
        FieldSpec {
            name: "allow_users",
            ty: FieldType::Primitive(FieldKind::List),
            presence: Presence::Optional(DefaultValue::None),
            description: "Users allowed to log in over SSH (everyone when unset)",
            example: None,
        },
        FieldSpec {
            name: "deny_users",
            ty: FieldType::Primitive(FieldKind::List),
            presence: Presence::Optional(DefaultValue::None),
            description: "Users denied SSH access",
            example: None,
        },
        FieldSpec {
            name: "allow_groups",
            ty: FieldType::Primitive(FieldKind::List),
            presence: Presence::Optional(DefaultValue::None),
            description: "Groups whose members may log in over SSH",
            example: None,
        },
        FieldSpec {
            name: "deny_groups",
            ty: FieldType::Primitive(FieldKind::List),
            presence: Presence::Optional(DefaultValue::None),
            description: "Groups whose members are denied SSH access",
            example: None,
        },
        FieldSpec {
            name: "password_authentication",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::None),
            description: "Allow password logins (off means key-based only)",
            example: None,
        },
        FieldSpec {
            name: "permit_empty_passwords",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::None),
            description: "Allow logins with empty passwords (not recommended)",
            example: None,
        },
        FieldSpec {
            name: "pubkey_authentication",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::None),
            description: "Allow public key authentication",
            example: None,
        },
        FieldSpec {
            name: "authorized_keys_file",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "File holding authorized keys, usually '~/.ssh/authorized_keys'",
            example: Some("~/.ssh/authorized_keys"),
        },
        FieldSpec {
            name: "client_alive_interval",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::None),
            description: "Seconds between keepalive probes sent to the client",
            example: Some("300"),
        },
        FieldSpec {
            name: "client_alive_count_max",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::None),
            description: "Unanswered keepalive probes tolerated before disconnecting the client",
            example: Some("3"),
        },
        FieldSpec {
            name: "x11_forwarding",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::None),
            description: "Allow X11 forwarding through SSH",
            example: None,
        },
        FieldSpec {
            name: "banner",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Path of a banner file shown before login",
            example: Some("/etc/issue.net"),
        },
        FieldSpec {
            name: "subsystem_sftp",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Path of the SFTP subsystem, usually '/usr/lib/openssh/sftp-server'",
            example: Some("/usr/lib/openssh/sftp-server"),
        },
    ],
    primary: &["port", "protocol", "permit_root_login"],
    dependencies: &[
        ("password_authentication", &["permit_empty_passwords"]),
        ("pubkey_authentication", &["authorized_keys_file"]),
    ],
};

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub(crate) fn render(ctx: &Map<String, Value>) -> Result<String, TemplateError> {
    let mut out = String::new();

    if let Some(port) = ctx_opt_i64(ctx, "port") {
        out.push_str(&format!("Port {port}\n"));
    }
    if let Some(protocol) = ctx_opt_i64(ctx, "protocol") {
        out.push_str(&format!("Protocol {protocol}\n"));
    }
    if let Some(policy) = ctx_opt_str(ctx, "permit_root_login") {
        out.push_str(&format!("PermitRootLogin {policy}\n"));
    }
    if let Some(tries) = ctx_opt_i64(ctx, "max_auth_tries") {
        out.push_str(&format!("MaxAuthTries {tries}\n"));
    }
    if let Some(sessions) = ctx_opt_i64(ctx, "max_sessions") {
        out.push_str(&format!("MaxSessions {sessions}\n"));
    }

    let allow_users = ctx_str_list(ctx, "allow_users");
    if !allow_users.is_empty() {
        out.push_str(&format!("AllowUsers {}\n", allow_users.join(" ")));
    }
    let deny_users = ctx_str_list(ctx, "deny_users");
    if !deny_users.is_empty() {
        out.push_str(&format!("DenyUsers {}\n", deny_users.join(" ")));
    }
    let allow_groups = ctx_str_list(ctx, "allow_groups");
    if !allow_groups.is_empty() {
        out.push_str(&format!("AllowGroups {}\n", allow_groups.join(" ")));
    }
    let deny_groups = ctx_str_list(ctx, "deny_groups");
    if !deny_groups.is_empty() {
        out.push_str(&format!("DenyGroups {}\n", deny_groups.join(" ")));
    }

    if let Some(enabled) = ctx_opt_bool(ctx, "password_authentication") {
        out.push_str(&format!("PasswordAuthentication {}\n", yes_no(enabled)));
    }
    if let Some(enabled) = ctx_opt_bool(ctx, "permit_empty_passwords") {
        out.push_str(&format!("PermitEmptyPasswords {}\n", yes_no(enabled)));
    }
    if let Some(enabled) = ctx_opt_bool(ctx, "pubkey_authentication") {
        out.push_str(&format!("PubkeyAuthentication {}\n", yes_no(enabled)));
    }
    if let Some(file) = ctx_opt_str(ctx, "authorized_keys_file") {
        out.push_str(&format!("AuthorizedKeysFile {file}\n"));
    }

    if let Some(interval) = ctx_opt_i64(ctx, "client_alive_interval") {
        out.push_str(&format!("ClientAliveInterval {interval}\n"));
    }
    if let Some(count) = ctx_opt_i64(ctx, "client_alive_count_max") {
        out.push_str(&format!("ClientAliveCountMax {count}\n"));
    }

    if let Some(enabled) = ctx_opt_bool(ctx, "x11_forwarding") {
        out.push_str(&format!("X11Forwarding {}\n", yes_no(enabled)));
    }
    if let Some(banner) = ctx_opt_str(ctx, "banner") {
        out.push_str(&format!("Banner {banner}\n"));
    }
    if let Some(sftp) = ctx_opt_str(ctx, "subsystem_sftp") {
        out.push_str(&format!("Subsystem sftp {sftp}\n"));
    }

    Ok(out)
}
