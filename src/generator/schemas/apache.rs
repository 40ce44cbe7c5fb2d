//! Apache virtual host schema and template

use serde_json::{Map, Value};

use crate::generator::metadata::{
    DefaultValue, FieldKind, FieldSpec, FieldType, Presence, ServiceSchema,
};
use crate::services::render::{ctx_bool, ctx_i64, ctx_opt_str, ctx_str, TemplateError};

pub static SCHEMA: ServiceSchema = ServiceSchema {
    service: "apache",
    display_name: "Apache",
    description: "Virtual host configuration for the Apache HTTP server",
    file_extension: ".conf",
    template: "apache.conf",
    fields: &[
        FieldSpec {
            name: "port",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::Int(80)),
            description: "Port Apache listens on. Usually 80 for HTTP or 443 for HTTPS",
            example: Some("80"),
        },
        FieldSpec {
            name: "server_admin",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("webmaster@localhost")),
            description: "Administrator email shown in server error pages",
            example: Some("webmaster@localhost"),
        },
        FieldSpec {
            name: "server_name",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Required,
            description: "Primary domain this virtual host serves, e.g. example.com",
            example: Some("example.com"),
        },
        FieldSpec {
            name: "server_alias",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Additional domains pointing at the same site, e.g. www.example.com",
            example: Some("www.example.com"),
        },
        FieldSpec {
            name: "document_root",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Required,
            description: "Root directory of the site files, e.g. /var/www/html",
            example: Some("/var/www/html"),
        },
        FieldSpec {
            name: "directory_options",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Options for the <Directory> block, e.g. Indexes FollowSymLinks",
            example: Some("Indexes FollowSymLinks"),
        },
        FieldSpec {
            name: "allow_override",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Directives allowed in .htaccess, e.g. All, None or AuthConfig",
            example: Some("All"),
        },
        FieldSpec {
            name: "directory_index",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Default file served for directories, e.g. index.html or index.php",
            example: Some("index.html"),
        },
        FieldSpec {
            name: "directory_allow",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Access policy for the directory, usually 'Require all granted'",
            example: Some("Require all granted"),
        },
        FieldSpec {
            name: "log_enabled",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(true)),
            description: "Write access and error logs for this virtual host",
            example: None,
        },
        FieldSpec {
            name: "ssl_enabled",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Enable SSL/TLS. Requires ssl_certificate_file and ssl_certificate_key_file",
            example: None,
        },
        FieldSpec {
            name: "ssl_certificate_file",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Path to the SSL certificate, e.g. /etc/apache2/ssl/cert.pem",
            example: Some("/etc/apache2/ssl/cert.pem"),
        },
        FieldSpec {
            name: "ssl_certificate_key_file",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Path to the SSL private key, e.g. /etc/apache2/ssl/key.pem",
            example: Some("/etc/apache2/ssl/key.pem"),
        },
        FieldSpec {
            name: "ssl_chain_file",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Path to the certificate chain file, if one is needed",
            example: Some("/etc/apache2/ssl/chain.pem"),
        },
        FieldSpec {
            name: "ssl_protocols",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Accepted SSL/TLS protocol versions, e.g. TLSv1.2 TLSv1.3",
            example: Some("TLSv1.2 TLSv1.3"),
        },
        FieldSpec {
            name: "ssl_ciphers",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Accepted SSL/TLS cipher list, e.g. HIGH:!aNULL:!MD5",
            example: Some("HIGH:!aNULL:!MD5"),
        },
        FieldSpec {
            name: "ssl_session_cache",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "SSL session cache settings, e.g. 'shmcb:/var/run/apache2/ssl_scache(512000)'",
            example: None,
        },
        FieldSpec {
            name: "proxy_pass",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Reverse proxy target URL, e.g. http://127.0.0.1:3000",
            example: Some("http://127.0.0.1:3000"),
        },
        FieldSpec {
            name: "proxy_path",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Path prefix to proxy, e.g. /api",
            example: Some("/api"),
        },
        FieldSpec {
            name: "compression_enabled",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Compress responses with mod_deflate",
            example: None,
        },
        FieldSpec {
            name: "security_headers",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Emit standard security headers (Content-Security-Policy, X-Frame-Options, ...)",
            example: None,
        },
        FieldSpec {
            name: "rewrite_rules",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "mod_rewrite rules inserted verbatim, e.g. 'RewriteEngine On'",
            example: None,
        },
        FieldSpec {
            name: "additional_config",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Extra Apache directives appended to the virtual host",
            example: None,
        },
    ],
    primary: &[
        "port",
        "server_name",
        "document_root",
        "log_enabled",
        "ssl_enabled",
        "compression_enabled",
        "security_headers",
    ],
    dependencies: &[
        (
            "ssl_enabled",
            &[
                "ssl_certificate_file",
                "ssl_certificate_key_file",
                "ssl_chain_file",
                "ssl_protocols",
                "ssl_ciphers",
                "ssl_session_cache",
            ],
        ),
        ("proxy_pass", &["proxy_path"]),
    ],
};

pub(crate) fn render(ctx: &Map<String, Value>) -> Result<String, TemplateError> {
    let port = ctx_i64(ctx, "port")?;
    let server_name = ctx_str(ctx, "server_name")?;
    let document_root = ctx_str(ctx, "document_root")?;
    let server_admin = ctx_str(ctx, "server_admin")?;

    let mut out = String::new();

    out.push_str(&format!("<VirtualHost *:{port}>\n"));
    out.push_str(&format!("    ServerAdmin {server_admin}\n"));
    out.push_str(&format!("    ServerName {server_name}\n"));
    if let Some(alias) = ctx_opt_str(ctx, "server_alias") {
        out.push_str(&format!("    ServerAlias {alias}\n"));
    }
    out.push_str(&format!("    DocumentRoot {document_root}\n"));

    let directory_options = ctx_opt_str(ctx, "directory_options");
    let allow_override = ctx_opt_str(ctx, "allow_override");
    let directory_index = ctx_opt_str(ctx, "directory_index");
    let directory_allow = ctx_opt_str(ctx, "directory_allow");
    if directory_options.is_some()
        || allow_override.is_some()
        || directory_index.is_some()
        || directory_allow.is_some()
    {
        out.push_str(&format!("\n    <Directory {document_root}>\n"));
        if let Some(options) = directory_options {
            out.push_str(&format!("        Options {options}\n"));
        }
        if let Some(allow_override) = allow_override {
            out.push_str(&format!("        AllowOverride {allow_override}\n"));
        }
        if let Some(index) = directory_index {
            out.push_str(&format!("        DirectoryIndex {index}\n"));
        }
        if let Some(allow) = directory_allow {
            out.push_str(&format!("        {allow}\n"));
        }
        out.push_str("    </Directory>\n");
    }

    if ctx_bool(ctx, "log_enabled") {
        out.push_str("\n    ErrorLog ${APACHE_LOG_DIR}/error.log\n");
        out.push_str("    CustomLog ${APACHE_LOG_DIR}/access.log combined\n");
    }

    if ctx_bool(ctx, "ssl_enabled") {
        out.push_str("\n    SSLEngine on\n");
        if let Some(certificate) = ctx_opt_str(ctx, "ssl_certificate_file") {
            out.push_str(&format!("    SSLCertificateFile {certificate}\n"));
        }
        if let Some(key) = ctx_opt_str(ctx, "ssl_certificate_key_file") {
            out.push_str(&format!("    SSLCertificateKeyFile {key}\n"));
        }
        if let Some(chain) = ctx_opt_str(ctx, "ssl_chain_file") {
            out.push_str(&format!("    SSLCertificateChainFile {chain}\n"));
        }
        if let Some(protocols) = ctx_opt_str(ctx, "ssl_protocols") {
            out.push_str(&format!("    SSLProtocol {protocols}\n"));
        }
        if let Some(ciphers) = ctx_opt_str(ctx, "ssl_ciphers") {
            out.push_str(&format!("    SSLCipherSuite {ciphers}\n"));
        }
        if let Some(cache) = ctx_opt_str(ctx, "ssl_session_cache") {
            out.push_str(&format!("    SSLSessionCache {cache}\n"));
        }
    }

    if let Some(proxy_pass) = ctx_opt_str(ctx, "proxy_pass") {
        let path = ctx_opt_str(ctx, "proxy_path").unwrap_or("/");
        out.push_str(&format!("\n    ProxyPass {path} {proxy_pass}\n"));
        out.push_str(&format!("    ProxyPassReverse {path} {proxy_pass}\n"));
    }

    if ctx_bool(ctx, "compression_enabled") {
        out.push_str("\n    AddOutputFilterByType DEFLATE text/html text/plain text/css application/json application/javascript\n");
    }

    if ctx_bool(ctx, "security_headers") {
        out.push_str("\n    Header always set X-Frame-Options \"SAMEORIGIN\"\n");
        out.push_str("    Header always set X-Content-Type-Options \"nosniff\"\n");
        out.push_str("    Header always set Content-Security-Policy \"default-src 'self'\"\n");
    }

    if let Some(rules) = ctx_opt_str(ctx, "rewrite_rules") {
        out.push('\n');
        for line in rules.lines() {
            out.push_str(&format!("    {line}\n"));
        }
    }

    if let Some(extra) = ctx_opt_str(ctx, "additional_config") {
        out.push('\n');
        for line in extra.lines() {
            out.push_str(&format!("    {line}\n"));
        }
    }

    out.push_str("</VirtualHost>\n");

    Ok(out)
}
