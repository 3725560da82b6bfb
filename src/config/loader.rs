// src/config/loader.rs
//! Layered configuration loader with validation and hot reload

use crate::config::{
    constants::paths,
    schema_validator::{SchemaValidator, ValidationError},
    SystemConfig,
};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};

#[cfg(feature = "hot-reload")]
use crossbeam::channel::{self, Receiver, Sender};
#[cfg(feature = "hot-reload")]
use parking_lot::Mutex;
#[cfg(feature = "hot-reload")]
use tracing::warn;

/// Configuration loader with hot reload capabilities
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    schema_validator: SchemaValidator,
    current_config: Arc<RwLock<SystemConfig>>,
    #[cfg(feature = "hot-reload")]
    subscribers: Arc<Mutex<Vec<Sender<SystemConfig>>>>,
    #[cfg(feature = "hot-reload")]
    _file_watcher: Option<notify::RecommendedWatcher>,
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    Parse(String),

    #[error("Configuration validation errors:{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File watcher error: {0}")]
    Watcher(String),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(|error| format!("\n  {}", error)).collect()
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl ConfigLoader {
    /// Loader over the standard search path
    pub fn new() -> Self {
        Self::with_paths(Self::discover_config_paths())
    }

    /// Create loader with custom paths, lowest precedence first
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            schema_validator: SchemaValidator::new(),
            current_config: Arc::new(RwLock::new(SystemConfig::default())),
            #[cfg(feature = "hot-reload")]
            subscribers: Arc::new(Mutex::new(Vec::new())),
            #[cfg(feature = "hot-reload")]
            _file_watcher: None,
        }
    }

    /// Standard search path plus an explicit file with the highest precedence
    pub fn with_override_file<P: Into<PathBuf>>(path: P) -> Self {
        let mut paths = Self::discover_config_paths();
        paths.push(path.into());
        Self::with_paths(paths)
    }

    /// Load system configuration with validation
    pub fn load_system_config(&mut self) -> Result<SystemConfig, ConfigError> {
        let config = load_and_merge_configs(&self.config_paths, &self.schema_validator)?;
        *self.current_config.write() = config.clone();

        info!(
            sources = self.config_paths.iter().filter(|p| p.exists()).count(),
            reps_per_set = config.session.reps_per_set,
            exercise = config.session.default_exercise.key(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Get current configuration
    pub fn get_current_config(&self) -> SystemConfig {
        self.current_config.read().clone()
    }

    /// Shared handle to the configuration kept current by hot reload
    pub fn shared_config(&self) -> Arc<RwLock<SystemConfig>> {
        Arc::clone(&self.current_config)
    }

    /// Reload configuration manually and notify subscribers
    pub fn reload(&mut self) -> Result<SystemConfig, ConfigError> {
        let config = load_and_merge_configs(&self.config_paths, &self.schema_validator)?;
        *self.current_config.write() = config.clone();

        #[cfg(feature = "hot-reload")]
        broadcast(&self.subscribers, &config);

        Ok(config)
    }

    /// Receive every configuration produced by a reload
    #[cfg(feature = "hot-reload")]
    pub fn subscribe(&self) -> Receiver<SystemConfig> {
        let (tx, rx) = channel::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Watch every config file's directory and reload on change
    #[cfg(feature = "hot-reload")]
    pub fn enable_hot_reload(&mut self) -> Result<(), ConfigError> {
        use crate::config::constants::reload;
        use notify::{DebouncedEvent, RecursiveMode, Watcher};
        use std::collections::HashSet;
        use std::sync::mpsc;
        use std::time::Duration;

        let (watch_tx, watch_rx) = mpsc::channel();
        let mut watcher = notify::watcher(watch_tx, Duration::from_millis(reload::WATCH_DEBOUNCE_MS))
            .map_err(|e| ConfigError::Watcher(e.to_string()))?;

        let mut watched_dirs = HashSet::new();
        for path in &self.config_paths {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            if !dir.exists() || !watched_dirs.insert(dir.clone()) {
                continue;
            }
            if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
                debug!(dir = %dir.display(), error = %e, "Config directory not watched");
            }
        }

        let config_paths = self.config_paths.clone();
        let schema_validator = self.schema_validator.clone();
        let current = Arc::clone(&self.current_config);
        let subscribers = Arc::clone(&self.subscribers);

        std::thread::Builder::new()
            .name("config-watcher".to_string())
            .spawn(move || {
                while let Ok(event) = watch_rx.recv() {
                    let changed = match event {
                        DebouncedEvent::Write(path)
                        | DebouncedEvent::Create(path)
                        | DebouncedEvent::Rename(_, path) => path,
                        _ => continue,
                    };
                    if !is_config_path(&changed, &config_paths) {
                        continue;
                    }

                    match load_and_merge_configs(&config_paths, &schema_validator) {
                        Ok(new_config) => {
                            info!(path = %changed.display(), "Configuration reloaded");
                            *current.write() = new_config.clone();
                            broadcast(&subscribers, &new_config);
                        }
                        Err(e) => {
                            warn!(path = %changed.display(), error = %e, "Failed to reload config, keeping previous");
                        }
                    }
                }
            })
            .map_err(|e| ConfigError::Watcher(e.to_string()))?;

        self._file_watcher = Some(watcher);
        Ok(())
    }

    /// Validate configuration without loading
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let toml_value: toml::Value = toml::from_str(&content)?;

        self.schema_validator
            .validate_config(&toml_value)
            .map_err(ConfigError::Validation)?;

        self.schema_validator
            .validate_dependencies(&toml_value)
            .map_err(ConfigError::Validation)?;

        Ok(())
    }

    /// Export current configuration to file
    pub fn export_config<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let config = self.get_current_config();
        let toml_content = toml::to_string_pretty(&config).map_err(|e| ConfigError::Parse(e.to_string()))?;

        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Get configuration file modification times
    pub fn get_config_timestamps(&self) -> Vec<(PathBuf, Option<SystemTime>)> {
        self.config_paths
            .iter()
            .map(|path| {
                let timestamp = std::fs::metadata(path).and_then(|meta| meta.modified()).ok();
                (path.clone(), timestamp)
            })
            .collect()
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(paths::SYSTEM_CONFIG_PATH)];

        if let Some(home_dir) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            paths.push(PathBuf::from(home_dir).join(paths::USER_CONFIG_DIR).join("config.toml"));
        }

        paths.push(PathBuf::from(paths::DEFAULT_CONFIG_FILE));
        paths.push(PathBuf::from(paths::LOCAL_CONFIG_FILE));
        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "hot-reload")]
fn broadcast(subscribers: &Mutex<Vec<Sender<SystemConfig>>>, config: &SystemConfig) {
    // Dropped receivers unsubscribe
    subscribers.lock().retain(|tx| tx.send(config.clone()).is_ok());
}

#[cfg(feature = "hot-reload")]
fn is_config_path(changed: &Path, config_paths: &[PathBuf]) -> bool {
    let changed_canonical = std::fs::canonicalize(changed).ok();
    config_paths.iter().any(|path| {
        path == changed || (changed_canonical.is_some() && std::fs::canonicalize(path).ok() == changed_canonical)
    })
}

fn load_and_merge_configs(config_paths: &[PathBuf], validator: &SchemaValidator) -> Result<SystemConfig, ConfigError> {
    let mut merged_config = toml::Value::try_from(SystemConfig::default()).map_err(|e| ConfigError::Parse(e.to_string()))?;

    for config_path in config_paths {
        match load_config_file(config_path) {
            Ok(file_config) => {
                debug!(path = %config_path.display(), "Merging config file");
                merge_toml_values(&mut merged_config, file_config);
            }
            Err(ConfigError::FileNotFound(_)) => continue,
            Err(e) => return Err(e),
        }
    }

    apply_environment_overrides(&mut merged_config, std::env::vars());

    validator.validate_config(&merged_config).map_err(ConfigError::Validation)?;
    validator.validate_dependencies(&merged_config).map_err(ConfigError::Validation)?;

    let config: SystemConfig = merged_config
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse(format!("Failed to deserialize config: {}", e)))?;

    config.validate_consistency().map_err(|reasons| {
        ConfigError::Validation(
            reasons
                .into_iter()
                .map(|message| ValidationError {
                    field: "config".to_string(),
                    message,
                    value: String::new(),
                })
                .collect(),
        )
    })?;

    Ok(config)
}

fn load_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml_values(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

/// `REPCOUNT_EXERCISES__BICEP_CURL__UP_ANGLE=35` sets `exercises.bicep_curl.up_angle`
fn apply_environment_overrides(config: &mut toml::Value, vars: impl Iterator<Item = (String, String)>) {
    for (key, value) in vars {
        let Some(stripped) = key.strip_prefix(paths::ENV_PREFIX) else {
            continue;
        };
        let path: Vec<String> = stripped
            .split(paths::ENV_PATH_SEPARATOR)
            .map(|segment| segment.to_lowercase())
            .collect();
        if path.iter().any(|segment| segment.is_empty()) {
            continue;
        }

        debug!(key = %key, "Applying environment override");
        set_nested_value(config, &path, parse_env_value(&value));
    }
}

fn parse_env_value(value: &str) -> toml::Value {
    if let Ok(int_val) = value.parse::<i64>() {
        toml::Value::Integer(int_val)
    } else if let Ok(float_val) = value.parse::<f64>() {
        toml::Value::Float(float_val)
    } else if let Ok(bool_val) = value.parse::<bool>() {
        toml::Value::Boolean(bool_val)
    } else {
        toml::Value::String(value.to_string())
    }
}

fn set_nested_value(config: &mut toml::Value, path: &[String], value: toml::Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = config;
    for part in parents {
        let toml::Value::Table(table) = current else {
            return;
        };
        current = table
            .entry(part.clone())
            .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
    }

    if let toml::Value::Table(table) = current {
        table.insert(last.clone(), value);
    }
}
