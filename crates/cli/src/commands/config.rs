use std::fs;
use std::path::Path;

use catalog_core::config::{read_env, resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

struct ConfigField {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<ConfigField> {
    vec![
        ConfigField {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["CATALOG_SERVER_BIND_ADDRESS"],
        },
        ConfigField {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["CATALOG_SERVER_PORT"],
        },
        ConfigField {
            key: "cors.allowed_origins",
            value: config.cors.allowed_origins.join(","),
            env_keys: &["CATALOG_CORS_ALLOWED_ORIGINS"],
        },
        ConfigField {
            key: "assets.images_dir",
            value: config.assets.images_dir.display().to_string(),
            env_keys: &["CATALOG_ASSETS_IMAGES_DIR"],
        },
        ConfigField {
            key: "assets.mount_path",
            value: config.assets.mount_path.clone(),
            env_keys: &["CATALOG_ASSETS_MOUNT_PATH"],
        },
        ConfigField {
            key: "catalog.seed_demo_data",
            value: config.catalog.seed_demo_data.to_string(),
            env_keys: &["CATALOG_SEED_DEMO_DATA"],
        },
        ConfigField {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["CATALOG_LOGGING_LEVEL", "CATALOG_LOG_LEVEL"],
        },
        ConfigField {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["CATALOG_LOGGING_FORMAT", "CATALOG_LOG_FORMAT"],
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| read_env(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
