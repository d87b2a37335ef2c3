//! # dhlconfig - Configuration du client DHL Geschäftskundenversand
//!
//! La configuration est un arbre YAML construit en trois couches :
//!
//! 1. la configuration par défaut embarquée dans le binaire (`dhlbusiness.yaml`)
//! 2. le fichier `config.yaml` du répertoire de configuration, s'il existe
//! 3. les variables d'environnement `DHLBUSINESS_CONFIG__SECTION__CLE`
//!
//! Les clés sont insensibles à la casse. Toute modification est réécrite
//! immédiatement dans `config.yaml`. Les surcharges d'environnement ne sont
//! jamais écrites : elles restent une couche en mémoire, prioritaire en
//! lecture, qui disparaît avec la variable.
//!
//! Les accesseurs propres à l'expédition sont fournis par `dhlbusiness` sous
//! forme de trait d'extension sur [`Config`] ; cette crate ne connaît que les
//! valeurs génériques, la section `logger` et le chiffrement des secrets
//! ([`encryption`]).
//!
//! ## Usage
//!
//! ```no_run
//! use dhlconfig::get_config;
//!
//! let config = get_config();
//! let level = config.get_log_min_level()?;
//! config.set_value(&["dhl", "mode"], serde_yaml::Value::String("live".into()))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result, anyhow, bail};
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{debug, info};

pub mod encryption;
mod logging;
mod tree;

pub use logging::init_logging;

const EMBEDDED_DEFAULTS: &str = include_str!("dhlbusiness.yaml");

const CONFIG_DIR_VAR: &str = "DHLBUSINESS_CONFIG";
const OVERRIDE_PREFIX: &str = "DHLBUSINESS_CONFIG__";
const CONFIG_DIR_NAME: &str = ".dhlbusiness";
const CONFIG_FILE_NAME: &str = "config.yaml";

const LOG_MIN_LEVEL: [&str; 2] = ["logger", "min_level"];
const LOG_ENABLE_CONSOLE: [&str; 2] = ["logger", "enable_console"];

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load DHL business configuration"));
}

/// Renvoie la configuration globale, chargée au premier accès
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Configuration persistée dans `config.yaml`
#[derive(Debug)]
pub struct Config {
    dir: PathBuf,
    file: PathBuf,
    data: Mutex<Value>,
    overrides: Value,
}

impl Config {
    /// Charge la configuration depuis `directory`
    ///
    /// Une chaîne vide laisse [`Config::config_dir`] choisir le répertoire.
    /// Le résultat de la fusion est réécrit aussitôt, si bien que
    /// `config.yaml` contient toujours toutes les clés connues.
    pub fn load_config(directory: &str) -> Result<Self> {
        let dir = PathBuf::from(Self::config_dir(directory)?);
        let file = dir.join(CONFIG_FILE_NAME);
        info!(config_dir = %dir.display(), "Using config directory");

        let mut data: Value = serde_yaml::from_str(EMBEDDED_DEFAULTS)
            .context("embedded default configuration is not valid YAML")?;

        match fs::read(&file) {
            Ok(bytes) => {
                let user: Value = serde_yaml::from_slice(&bytes)
                    .with_context(|| format!("cannot parse {}", file.display()))?;
                tree::merge(&mut data, tree::lowercase_keys(user));
                info!(config_file = %file.display(), "Loaded config file");
            }
            Err(_) => {
                info!(config_file = %file.display(), "No config file, using embedded defaults");
            }
        }

        let config = Self {
            dir,
            file,
            data: Mutex::new(tree::lowercase_keys(data)),
            overrides: env_overrides(),
        };
        config.save()?;
        Ok(config)
    }

    /// Détermine le répertoire de configuration et vérifie qu'il est inscriptible
    ///
    /// Ordre de recherche :
    /// 1. `directory` s'il n'est pas vide
    /// 2. la variable d'environnement `DHLBUSINESS_CONFIG`
    /// 3. `.dhlbusiness` dans le répertoire courant
    /// 4. `.dhlbusiness` dans le répertoire personnel
    ///
    /// À défaut, `.dhlbusiness` est créé dans le répertoire courant.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir = locate_config_dir(directory);
        ensure_writable_dir(&dir)?;
        Ok(dir.to_string_lossy().into_owned())
    }

    /// Répertoire contenant `config.yaml`
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Réécrit `config.yaml` avec l'état courant, sans les surcharges
    /// d'environnement
    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&*self.lock()?)?;
        fs::write(&self.file, yaml)
            .with_context(|| format!("cannot write {}", self.file.display()))?;
        Ok(())
    }

    /// Lit la valeur située à `path` (ex. `&["dhl", "mode"]`)
    ///
    /// Un chemin absent est une erreur. Une surcharge d'environnement
    /// l'emporte sur la valeur du fichier.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let stored = tree::lookup(&*self.lock()?, path).cloned();
        let Ok(overridden) = tree::lookup(&self.overrides, path) else {
            return stored;
        };
        match stored {
            Ok(mut value) => {
                tree::merge(&mut value, overridden.clone());
                Ok(value)
            }
            Err(_) => Ok(overridden.clone()),
        }
    }

    /// Écrit `value` à `path` puis sauvegarde
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        tree::store(&mut *self.lock()?, path, value)?;
        debug!(path = %path.join("."), "Configuration value updated");
        self.save()
    }

    /// Lit une chaîne non vide
    ///
    /// Renvoie `None` pour un chemin absent, `null` ou une chaîne blanche.
    /// Un nombre est rendu sous forme texte : un EKP saisi sans guillemets
    /// reste utilisable.
    pub fn get_string(&self, path: &[&str]) -> Result<Option<String>> {
        let Ok(value) = self.get_value(path) else {
            return Ok(None);
        };
        match value {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => bail!("{} is not a string: {:?}", path.join("."), other),
        }
    }

    /// Niveau de log minimum (`INFO` par défaut)
    pub fn get_log_min_level(&self) -> Result<String> {
        Ok(self
            .get_string(&LOG_MIN_LEVEL)
            .ok()
            .flatten()
            .unwrap_or_else(|| "INFO".to_string()))
    }

    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&LOG_MIN_LEVEL, Value::String(level))
    }

    /// Sortie console active (`true` par défaut)
    pub fn get_log_enable_console(&self) -> Result<bool> {
        match self.get_value(&LOG_ENABLE_CONSOLE) {
            Ok(Value::Bool(enabled)) => Ok(enabled),
            _ => Ok(true),
        }
    }

    pub fn set_log_enable_console(&self, enabled: bool) -> Result<()> {
        self.set_value(&LOG_ENABLE_CONSOLE, Value::Bool(enabled))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("configuration lock poisoned"))
    }
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let data = match self.data.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        Self {
            dir: self.dir.clone(),
            file: self.file.clone(),
            data: Mutex::new(data),
            overrides: self.overrides.clone(),
        }
    }
}

fn locate_config_dir(directory: &str) -> PathBuf {
    if !directory.is_empty() {
        return PathBuf::from(directory);
    }

    if let Ok(from_env) = env::var(CONFIG_DIR_VAR) {
        info!(env_var = CONFIG_DIR_VAR, path = %from_env, "Config directory taken from environment");
        return PathBuf::from(from_env);
    }

    let local = PathBuf::from(CONFIG_DIR_NAME);
    if local.exists() {
        return local;
    }

    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .filter(|candidate| candidate.exists())
        .unwrap_or(local)
}

fn ensure_writable_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let marker = dir.join(".write_test");
    fs::write(&marker, b"")
        .and_then(|_| fs::remove_file(&marker))
        .with_context(|| format!("{} is not writable", dir.display()))
}

/// `DHLBUSINESS_CONFIG__DHL__MODE=live` devient `dhl.mode: live`
fn env_overrides() -> Value {
    let mut overrides = Value::Mapping(Mapping::new());
    for (name, raw) in env::vars() {
        let Some(suffix) = name.strip_prefix(OVERRIDE_PREFIX) else {
            continue;
        };
        let path: Vec<&str> = suffix.split("__").collect();
        match tree::store(&mut overrides, &path, tree::scalar_from_env(&raw)) {
            Ok(()) => debug!(variable = %name, "Applied environment override"),
            Err(e) => debug!(variable = %name, error = %e, "Ignored environment override"),
        }
    }
    overrides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_parse() {
        let value: Value = serde_yaml::from_str(EMBEDDED_DEFAULTS).unwrap();
        assert_eq!(
            tree::lookup(&value, &["dhl", "version"]).unwrap(),
            &Value::String("3.2.2".to_string())
        );
        assert_eq!(
            tree::lookup(&value, &LOG_ENABLE_CONSOLE).unwrap(),
            &Value::Bool(true)
        );
    }

    #[test]
    fn test_explicit_directory_wins() {
        assert_eq!(locate_config_dir("/tmp/dhl"), PathBuf::from("/tmp/dhl"));
    }
}
