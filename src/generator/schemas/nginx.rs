//! nginx virtual host schema and template

use serde_json::{Map, Value};

use crate::generator::metadata::{
    DefaultValue, FieldKind, FieldSpec, FieldType, Presence, ServiceSchema,
};
use crate::services::render::{
    ctx_bool, ctx_i64, ctx_opt_str, ctx_str, ctx_str_list, TemplateError,
};

pub static SCHEMA: ServiceSchema = ServiceSchema {
    service: "nginx",
    display_name: "Nginx",
    description: "Virtual host configuration for the nginx web server",
    file_extension: ".conf",
    template: "nginx.conf",
    fields: &[
        FieldSpec {
            name: "server_name",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Required,
            description: "Domain name or IP address the server responds to, e.g. example.com or 192.168.1.1",
            example: Some("example.com"),
        },
        FieldSpec {
            name: "listen",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Required,
            description: "Port nginx listens on. 80 for HTTP, 443 for HTTPS",
            example: Some("80"),
        },
        FieldSpec {
            name: "root",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Required,
            description: "Directory containing the site files, e.g. /var/www/html",
            example: Some("/var/www/html"),
        },
        FieldSpec {
            name: "index",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Required,
            description: "Default page served for the site root, e.g. index.html or index.php",
            example: Some("index.html"),
        },
        FieldSpec {
            name: "enable_ssl",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Enable HTTPS. Requires ssl_certificate and ssl_certificate_key",
            example: None,
        },
        FieldSpec {
            name: "ssl_certificate",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("/etc/nginx/ssl/cert.pem")),
            description: "Path to the SSL certificate used for HTTPS",
            example: Some("/etc/nginx/ssl/cert.pem"),
        },
        FieldSpec {
            name: "ssl_certificate_key",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("/etc/nginx/ssl/key.pem")),
            description: "Path to the SSL certificate's private key",
            example: Some("/etc/nginx/ssl/key.pem"),
        },
        FieldSpec {
            name: "force_https",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Redirect HTTP requests to HTTPS (needs SSL enabled)",
            example: None,
        },
        FieldSpec {
            name: "enable_gzip",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Enable gzip compression of responses",
            example: None,
        },
        FieldSpec {
            name: "enable_logging",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Enable access and error logs",
            example: None,
        },
        FieldSpec {
            name: "access_log",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("/var/log/nginx/access.log")),
            description: "Path of the access log file",
            example: Some("/var/log/nginx/access.log"),
        },
        FieldSpec {
            name: "error_log",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("/var/log/nginx/error.log")),
            description: "Path of the error log file",
            example: Some("/var/log/nginx/error.log"),
        },
        FieldSpec {
            name: "enable_proxy",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Proxy requests to another server (reverse proxy)",
            example: None,
        },
        FieldSpec {
            name: "proxy_pass",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("http://127.0.0.1:3000")),
            description: "Target address requests are proxied to, e.g. a backend service",
            example: Some("http://127.0.0.1:3000"),
        },
        FieldSpec {
            name: "limit_rate",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("100k")),
            description: "Download rate limit per client, e.g. 100k for 100 kilobytes per second",
            example: Some("100k"),
        },
        FieldSpec {
            name: "limit_conn",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("10")),
            description: "Maximum simultaneous connections per client IP",
            example: Some("10"),
        },
        FieldSpec {
            name: "enable_basic_auth",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Protect the site with HTTP basic authentication",
            example: None,
        },
        FieldSpec {
            name: "auth_user_file",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("/etc/nginx/.htpasswd")),
            description: "Path to the .htpasswd file holding user credentials",
            example: Some("/etc/nginx/.htpasswd"),
        },
        FieldSpec {
            name: "enable_cors",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Allow cross-origin requests (CORS)",
            example: None,
        },
        FieldSpec {
            name: "cors_allowed_origins",
            ty: FieldType::Primitive(FieldKind::List),
            presence: Presence::Optional(DefaultValue::StrList(&[
                "https://example.com",
                "https://api.example.com",
            ])),
            description: "Origins allowed to make cross-origin requests",
            example: None,
        },
        FieldSpec {
            name: "enable_websockets",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Enable WebSocket upgrade handling",
            example: None,
        },
    ],
    primary: &[
        "server_name",
        "listen",
        "root",
        "index",
        "enable_ssl",
        "force_https",
        "enable_gzip",
        "enable_logging",
        "enable_proxy",
        "enable_basic_auth",
        "enable_cors",
        "enable_websockets",
    ],
    dependencies: &[
        ("enable_ssl", &["ssl_certificate", "ssl_certificate_key"]),
        ("enable_logging", &["access_log", "error_log"]),
        ("enable_proxy", &["proxy_pass"]),
        ("enable_basic_auth", &["auth_user_file"]),
        ("enable_cors", &["cors_allowed_origins"]),
    ],
};

pub(crate) fn render(ctx: &Map<String, Value>) -> Result<String, TemplateError> {
    let server_name = ctx_str(ctx, "server_name")?;
    let listen = ctx_i64(ctx, "listen")?;
    let root = ctx_str(ctx, "root")?;
    let index = ctx_str(ctx, "index")?;

    let enable_ssl = ctx_bool(ctx, "enable_ssl");
    let force_https = ctx_bool(ctx, "force_https");

    let mut out = String::new();

    if enable_ssl && force_https {
        out.push_str(&format!(
            "server {{\n    listen 80;\n    server_name {server_name};\n\n    return 301 https://$host$request_uri;\n}}\n\n"
        ));
    }

    out.push_str("server {\n");
    if enable_ssl {
        out.push_str(&format!("    listen {listen} ssl;\n"));
    } else {
        out.push_str(&format!("    listen {listen};\n"));
    }
    out.push_str(&format!("    server_name {server_name};\n\n"));
    out.push_str(&format!("    root {root};\n"));
    out.push_str(&format!("    index {index};\n"));

    if enable_ssl {
        let certificate = ctx_str(ctx, "ssl_certificate")?;
        let certificate_key = ctx_str(ctx, "ssl_certificate_key")?;
        out.push_str(&format!(
            "\n    ssl_certificate {certificate};\n    ssl_certificate_key {certificate_key};\n"
        ));
    }

    if ctx_bool(ctx, "enable_gzip") {
        out.push_str(
            "\n    gzip on;\n    gzip_types text/plain text/css application/json application/javascript;\n",
        );
    }

    if ctx_bool(ctx, "enable_logging") {
        let access_log = ctx_str(ctx, "access_log")?;
        let error_log = ctx_str(ctx, "error_log")?;
        out.push_str(&format!(
            "\n    access_log {access_log};\n    error_log {error_log};\n"
        ));
    }

    if let Some(rate) = ctx_opt_str(ctx, "limit_rate") {
        out.push_str(&format!("\n    limit_rate {rate};\n"));
    }
    if let Some(connections) = ctx_opt_str(ctx, "limit_conn") {
        out.push_str(&format!("    limit_conn addr {connections};\n"));
    }

    if ctx_bool(ctx, "enable_cors") {
        out.push('\n');
        for origin in ctx_str_list(ctx, "cors_allowed_origins") {
            out.push_str(&format!(
                "    add_header Access-Control-Allow-Origin {origin};\n"
            ));
        }
    }

    out.push_str("\n    location / {\n");
    if ctx_bool(ctx, "enable_proxy") {
        let proxy_pass = ctx_str(ctx, "proxy_pass")?;
        out.push_str(&format!("        proxy_pass {proxy_pass};\n"));
        out.push_str("        proxy_set_header Host $host;\n");
        out.push_str("        proxy_set_header X-Real-IP $remote_addr;\n");
    } else {
        out.push_str("        try_files $uri $uri/ =404;\n");
    }
    if ctx_bool(ctx, "enable_websockets") {
        out.push_str("        proxy_http_version 1.1;\n");
        out.push_str("        proxy_set_header Upgrade $http_upgrade;\n");
        out.push_str("        proxy_set_header Connection \"upgrade\";\n");
    }
    if ctx_bool(ctx, "enable_basic_auth") {
        let auth_user_file = ctx_str(ctx, "auth_user_file")?;
        out.push_str("        auth_basic \"Restricted\";\n");
        out.push_str(&format!(
            "        auth_basic_user_file {auth_user_file};\n"
        ));
    }
    out.push_str("    }\n");

    out.push_str("}\n");

    Ok(out)
}
