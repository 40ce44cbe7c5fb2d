//! Tests for the generator module
//!
//! These tests verify:
//! - Form-metadata derivation (ordering, widgets, nesting, dependencies)
//! - The generic required-field validation and default filling
//! - Template rendering for each supported service

#[cfg(test)]
mod tests {
    use super::super::metadata::{
        apply_defaults, derive_form_metadata, validate_required,
    };
    use super::super::registry;
    use crate::services::render::render_template;
    use serde_json::{json, Map, Value};

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected a JSON object, got {other}"),
        }
    }

    // ---- Registry ----

    #[test]
    fn test_registry_knows_all_services() {
        let ids: Vec<&str> = registry::SERVICES.iter().map(|s| s.service).collect();
        assert_eq!(
            ids,
            vec![
                "nginx",
                "dockerfile",
                "docker-compose",
                "systemd",
                "apache",
                "postgresql",
                "sshd",
                "redis"
            ]
        );

        assert!(registry::lookup("nginx").is_some());
        assert!(registry::lookup("minecraft").is_none());
    }

    // ---- Metadata derivation ----

    #[test]
    fn test_nginx_metadata_order_and_widgets() {
        let schema = registry::lookup("nginx").unwrap();
        let metadata = derive_form_metadata(schema);

        // Declaration order is preserved
        assert_eq!(metadata.fields[0].name, "server_name");
        assert_eq!(metadata.fields[1].name, "listen");
        assert_eq!(metadata.fields[2].name, "root");
        assert_eq!(metadata.fields[3].name, "index");

        let by_name = |name: &str| {
            metadata
                .fields
                .iter()
                .find(|f| f.name == name)
                .unwrap_or_else(|| panic!("missing field {name}"))
        };

        // Widget mapping
        assert_eq!(by_name("server_name").widget, "text");
        assert_eq!(by_name("listen").widget, "number");
        assert_eq!(by_name("enable_ssl").widget, "checkbox");
        assert_eq!(by_name("cors_allowed_origins").widget, "array");

        // Labels are humanized field names
        assert_eq!(by_name("server_name").label, "Server name");
        assert_eq!(by_name("enable_ssl").label, "Enable ssl");

        // Examples surface as placeholders
        assert_eq!(
            by_name("server_name").placeholder.as_deref(),
            Some("example.com")
        );

        // Required flags come from the descriptor, defaults only on optionals
        assert!(by_name("server_name").required);
        assert_eq!(by_name("server_name").default_value, None);
        assert!(!by_name("enable_ssl").required);
        assert_eq!(by_name("enable_ssl").default_value, Some(json!(false)));
    }

    #[test]
    fn test_nginx_advanced_flags_and_dependencies() {
        let schema = registry::lookup("nginx").unwrap();
        let metadata = derive_form_metadata(schema);

        let by_name = |name: &str| metadata.fields.iter().find(|f| f.name == name).unwrap();

        // Required and allowlisted fields are not advanced
        assert!(!by_name("server_name").is_advanced);
        assert!(!by_name("enable_gzip").is_advanced);
        // Optional non-primary fields are
        assert!(by_name("ssl_certificate").is_advanced);
        assert!(by_name("access_log").is_advanced);

        assert_eq!(
            metadata.dependencies.get("enable_ssl").unwrap(),
            &vec![
                "ssl_certificate".to_string(),
                "ssl_certificate_key".to_string()
            ]
        );
        assert!(metadata.dependencies.contains_key("enable_cors"));
    }

    #[test]
    fn test_metadata_derivation_is_deterministic() {
        for schema in registry::SERVICES {
            let first = derive_form_metadata(schema);
            let second = derive_form_metadata(schema);
            assert_eq!(first, second, "{} metadata is not stable", schema.service);
        }
    }

    #[test]
    fn test_dockerfile_nested_fields_are_flattened() {
        let schema = registry::lookup("dockerfile").unwrap();
        let metadata = derive_form_metadata(schema);

        let names: Vec<&str> = metadata.fields.iter().map(|f| f.name.as_str()).collect();

        // Composite fields are replaced in place by their dotted sub-fields
        assert!(names.contains(&"copy_files.source"));
        assert!(names.contains(&"copy_files.destination"));
        assert!(names.contains(&"healthcheck.test"));
        assert!(names.contains(&"healthcheck.retries"));
        assert!(!names.contains(&"copy_files"));
        assert!(!names.contains(&"healthcheck"));

        // Sub-field requiredness follows the sub-schema's own required set
        let source = metadata
            .fields
            .iter()
            .find(|f| f.name == "copy_files.source")
            .unwrap();
        assert!(source.required);

        // Dependency keys may name a composite parent
        assert!(metadata.dependencies.contains_key("healthcheck"));
        assert_eq!(
            metadata.dependencies.get("healthcheck").unwrap().len(),
            4
        );
    }

    #[test]
    fn test_compose_metadata_nested_service_fields() {
        let schema = registry::lookup("docker-compose").unwrap();
        let metadata = derive_form_metadata(schema);

        let by_name = |name: &str| metadata.fields.iter().find(|f| f.name == name).unwrap();

        assert!(by_name("services.image").required);
        assert!(!by_name("services.image").is_advanced);
        assert!(by_name("services.container_name").is_advanced);

        // Dependency keys that name no declared field are dropped
        assert!(metadata.dependencies.is_empty());
    }

    #[test]
    fn test_redis_dependency_filtering() {
        let schema = registry::lookup("redis").unwrap();
        let metadata = derive_form_metadata(schema);

        assert!(metadata.dependencies.contains_key("enable_logging"));
        assert!(metadata.dependencies.contains_key("enable_replication"));
        // No enable_ssl field is declared for redis
        assert!(!metadata.dependencies.contains_key("enable_ssl"));
    }

    // ---- Validation and defaults ----

    #[test]
    fn test_validate_required_reports_missing_fields() {
        let schema = registry::lookup("nginx").unwrap();

        let fields = object(json!({ "listen": 80, "root": "/var/www", "index": "index.html" }));
        let result = validate_required(schema, &fields);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "server_name");

        let fields = object(json!({
            "server_name": "a.com", "listen": 80, "root": "   ", "index": "index.html"
        }));
        let result = validate_required(schema, &fields);
        assert!(!result.is_valid, "blank required string must be rejected");
    }

    #[test]
    fn test_validate_required_rejects_empty_services_map() {
        let schema = registry::lookup("docker-compose").unwrap();

        let fields = object(json!({ "version": "3.9", "services": {} }));
        let result = validate_required(schema, &fields);
        assert!(!result.is_valid);

        let fields = object(json!({
            "version": "3.9",
            "services": { "web": { "image": "nginx:latest" } }
        }));
        assert!(validate_required(schema, &fields).is_valid);
    }

    #[test]
    fn test_apply_defaults_fills_omitted_and_null_fields() {
        let schema = registry::lookup("nginx").unwrap();
        let mut fields = object(json!({
            "server_name": "a.com", "listen": 80, "root": "/var/www", "index": "index.html",
            "ssl_certificate": null
        }));

        apply_defaults(schema, &mut fields);

        assert_eq!(fields.get("enable_ssl"), Some(&json!(false)));
        assert_eq!(
            fields.get("ssl_certificate"),
            Some(&json!("/etc/nginx/ssl/cert.pem"))
        );
        assert_eq!(fields.get("limit_rate"), Some(&json!("100k")));
        // Supplied values are untouched
        assert_eq!(fields.get("server_name"), Some(&json!("a.com")));
    }

    // ---- Rendering ----

    fn render_for(service: &str, payload: Value) -> String {
        let schema = registry::lookup(service).unwrap();
        let mut fields = object(payload);
        assert!(
            validate_required(schema, &fields).is_valid,
            "test payload for {service} failed validation"
        );
        apply_defaults(schema, &mut fields);
        render_template(schema.template, &fields).unwrap()
    }

    #[test]
    fn test_nginx_render_without_ssl() {
        let rendered = render_for(
            "nginx",
            json!({
                "server_name": "a.com",
                "listen": 80,
                "root": "/var/www",
                "index": "index.html",
                "enable_ssl": false
            }),
        );

        assert!(rendered.contains("server_name a.com;"));
        assert!(rendered.contains("listen 80;"));
        assert!(rendered.contains("root /var/www;"));
        assert!(!rendered.contains("ssl_certificate"));
        assert!(!rendered.contains("listen 80 ssl"));
    }

    #[test]
    fn test_nginx_render_with_ssl_and_redirect() {
        let rendered = render_for(
            "nginx",
            json!({
                "server_name": "secure.example.com",
                "listen": 443,
                "root": "/var/www",
                "index": "index.html",
                "enable_ssl": true,
                "force_https": true
            }),
        );

        assert!(rendered.contains("listen 443 ssl;"));
        assert!(rendered.contains("ssl_certificate /etc/nginx/ssl/cert.pem;"));
        assert!(rendered.contains("ssl_certificate_key /etc/nginx/ssl/key.pem;"));
        assert!(rendered.contains("return 301 https://$host$request_uri;"));
    }

    #[test]
    fn test_apache_render() {
        let rendered = render_for(
            "apache",
            json!({
                "server_name": "example.com",
                "document_root": "/var/www/html",
                "ssl_enabled": true,
                "ssl_certificate_file": "/etc/apache2/ssl/cert.pem",
                "proxy_pass": "http://127.0.0.1:3000",
                "proxy_path": "/api"
            }),
        );

        assert!(rendered.contains("<VirtualHost *:80>"));
        assert!(rendered.contains("ServerName example.com"));
        assert!(rendered.contains("DocumentRoot /var/www/html"));
        assert!(rendered.contains("SSLEngine on"));
        assert!(rendered.contains("SSLCertificateFile /etc/apache2/ssl/cert.pem"));
        assert!(rendered.contains("ProxyPass /api http://127.0.0.1:3000"));
        assert!(rendered.contains("</VirtualHost>"));
    }

    #[test]
    fn test_systemd_render() {
        let rendered = render_for(
            "systemd",
            json!({
                "description": "My app",
                "after": "network.target",
                "exec_start": "/usr/bin/app",
                "restart_policy": "on-failure",
                "restart_sec": 5,
                "environment": {"PORT": "8080"}
            }),
        );

        assert!(rendered.contains("[Unit]\nDescription=My app\nAfter=network.target"));
        assert!(rendered.contains("ExecStart=/usr/bin/app"));
        assert!(rendered.contains("Restart=on-failure"));
        assert!(rendered.contains("RestartSec=5"));
        assert!(rendered.contains("Environment=\"PORT=8080\""));
        assert!(rendered.contains("WantedBy=multi-user.target"));
    }

    #[test]
    fn test_sshd_render_uses_defaults() {
        let rendered = render_for("sshd", json!({}));

        assert!(rendered.contains("Port 22"));
        assert!(rendered.contains("Protocol 2"));
        assert!(rendered.contains("PermitRootLogin prohibit-password"));
        assert!(rendered.contains("MaxAuthTries 6"));
        // Unset toggles emit nothing
        assert!(!rendered.contains("PasswordAuthentication"));
    }

    #[test]
    fn test_sshd_render_boolean_directives() {
        let rendered = render_for(
            "sshd",
            json!({
                "password_authentication": false,
                "pubkey_authentication": true,
                "allow_users": ["deploy", "admin"]
            }),
        );

        assert!(rendered.contains("PasswordAuthentication no"));
        assert!(rendered.contains("PubkeyAuthentication yes"));
        assert!(rendered.contains("AllowUsers deploy admin"));
    }

    #[test]
    fn test_postgresql_render() {
        let rendered = render_for(
            "postgresql",
            json!({
                "listen_addresses": "*",
                "port": 5432,
                "enable_logging": true,
                "include_comments": true
            }),
        );

        assert!(rendered.contains("listen_addresses = '*'"));
        assert!(rendered.contains("port = 5432"));
        assert!(rendered.contains("logging_collector = on"));
        assert!(rendered.contains("log_directory = 'pg_log'"));
        assert!(rendered.contains("# Connection settings"));
        assert!(rendered.contains("autovacuum = on"));
        assert!(rendered.contains("shared_preload_libraries = 'pg_stat_statements'"));
    }

    #[test]
    fn test_redis_render() {
        let rendered = render_for(
            "redis",
            json!({
                "bind": "127.0.0.1",
                "port": 6379,
                "requirepass": "hunter2"
            }),
        );

        assert!(rendered.contains("bind 127.0.0.1"));
        assert!(rendered.contains("port 6379"));
        // Default persistence intervals
        assert!(rendered.contains("save 900 1"));
        assert!(rendered.contains("save 60 10000"));
        assert!(rendered.contains("requirepass hunter2"));
        assert!(rendered.contains("maxmemory 256mb"));
    }

    #[test]
    fn test_dockerfile_render() {
        let rendered = render_for(
            "dockerfile",
            json!({
                "base_image": "python:3.9",
                "workdir": "/app",
                "copy_files": [{"source": "./app", "destination": "/app"}],
                "run_commands": ["pip install -r requirements.txt"],
                "expose_ports": [8000],
                "entrypoint": "python app.py",
                "healthcheck": {
                    "test": ["CMD", "curl", "-f", "http://localhost"],
                    "interval": "30s",
                    "timeout": "10s",
                    "retries": 3
                }
            }),
        );

        assert!(rendered.starts_with("FROM python:3.9\n"));
        assert!(rendered.contains("WORKDIR /app"));
        assert!(rendered.contains("COPY ./app /app"));
        assert!(rendered.contains("RUN pip install -r requirements.txt"));
        assert!(rendered.contains("EXPOSE 8000"));
        assert!(rendered.contains(
            "HEALTHCHECK --interval=30s --timeout=10s --retries=3 CMD curl -f http://localhost"
        ));
        assert!(rendered.contains("ENTRYPOINT python app.py"));
    }

    #[test]
    fn test_compose_render() {
        let rendered = render_for(
            "docker-compose",
            json!({
                "version": "3.9",
                "services": {
                    "web": {
                        "image": "nginx:latest",
                        "ports": ["80:80"],
                        "networks": ["frontend"]
                    }
                },
                "networks": {"frontend": {}}
            }),
        );

        assert!(rendered.starts_with("version: '3.9'\n"));
        assert!(rendered.contains("services:\n  web:\n"));
        assert!(rendered.contains("    image: nginx:latest"));
        assert!(rendered.contains("    ports:\n      - 80:80"));
        assert!(rendered.contains("\nnetworks:\n  frontend:"));
    }
}
