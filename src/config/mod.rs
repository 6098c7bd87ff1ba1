#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::{Affiliation, RegistrySchema};
use crate::utils::error::{DmpError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url, Validate};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub const DMPONLINE_API_URL: &str = "DMPONLINE_API_URL";
pub const DMPONLINE_API_URL_V0: &str = "DMPONLINE_API_URL_V0";
pub const DMPONLINE_USER: &str = "DMPONLINE_USER";
pub const DMPONLINE_PW: &str = "DMPONLINE_PW";
pub const DMPONLINE_AUTH_CODE: &str = "DMPONLINE_AUTH_CODE";
pub const DMP_ID_PREFIX: &str = "DMP_ID_PREFIX";
pub const LOGFILE: &str = "LOGFILE";
pub const SWECRIS_URL: &str = "SWECRIS_URL";
pub const SWECRIS_API_KEY: &str = "SWECRIS_API_KEY";
pub const SWECRIS_SCHEMA: &str = "SWECRIS_SCHEMA";
pub const DEFAULT_AFF: &str = "DEFAULT_AFF";
pub const DEFAULT_AFF_ABBREV: &str = "DEFAULT_AFF_ABBREV";
pub const DMP_OUTPUT_DIR: &str = "DMP_OUTPUT_DIR";

/// Read from the working directory when present.
pub const DOTENV_FILE: &str = ".env";

/// Environment-sourced settings, read once at start-up and handed to each
/// collaborator. Keys are optional here; commands `require` what they use.
#[derive(Clone, Default)]
pub struct Settings {
    pub dmponline_api_url: Option<String>,
    pub dmponline_api_url_v0: Option<String>,
    pub dmponline_user: Option<String>,
    pub dmponline_password: Option<String>,
    pub dmponline_auth_code: Option<String>,
    pub dmp_id_prefix: Option<String>,
    pub logfile: Option<String>,
    pub swecris_url: Option<String>,
    pub swecris_api_key: Option<String>,
    pub registry_schema: RegistrySchema,
    pub default_affiliation: Option<String>,
    pub default_affiliation_abbrev: Option<String>,
    pub output_dir: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_env_and_file(Path::new(DOTENV_FILE))
    }

    /// Process environment first, then the `KEY=value` lines of a dotenv
    /// file. A missing file is the same as an empty one.
    pub fn from_env_and_file(path: &Path) -> Result<Self> {
        let file = read_dotenv(path)?;
        if !file.is_empty() {
            tracing::debug!("Loaded {} keys from {}", file.len(), path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Builds settings from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let registry_schema = match get(SWECRIS_SCHEMA) {
            Some(value) => value.parse()?,
            None => RegistrySchema::default(),
        };

        Ok(Self {
            dmponline_api_url: get(DMPONLINE_API_URL),
            dmponline_api_url_v0: get(DMPONLINE_API_URL_V0),
            dmponline_user: get(DMPONLINE_USER),
            dmponline_password: get(DMPONLINE_PW),
            dmponline_auth_code: get(DMPONLINE_AUTH_CODE),
            dmp_id_prefix: get(DMP_ID_PREFIX),
            logfile: get(LOGFILE),
            swecris_url: get(SWECRIS_URL),
            swecris_api_key: get(SWECRIS_API_KEY),
            registry_schema,
            default_affiliation: get(DEFAULT_AFF),
            default_affiliation_abbrev: get(DEFAULT_AFF_ABBREV),
            output_dir: get(DMP_OUTPUT_DIR).unwrap_or_else(|| ".".to_string()),
        })
    }

    fn lookup(&self, key: &str) -> Option<&String> {
        match key {
            DMPONLINE_API_URL => self.dmponline_api_url.as_ref(),
            DMPONLINE_API_URL_V0 => self.dmponline_api_url_v0.as_ref(),
            DMPONLINE_USER => self.dmponline_user.as_ref(),
            DMPONLINE_PW => self.dmponline_password.as_ref(),
            DMPONLINE_AUTH_CODE => self.dmponline_auth_code.as_ref(),
            DMP_ID_PREFIX => self.dmp_id_prefix.as_ref(),
            LOGFILE => self.logfile.as_ref(),
            SWECRIS_URL => self.swecris_url.as_ref(),
            SWECRIS_API_KEY => self.swecris_api_key.as_ref(),
            DEFAULT_AFF => self.default_affiliation.as_ref(),
            DEFAULT_AFF_ABBREV => self.default_affiliation_abbrev.as_ref(),
            DMP_OUTPUT_DIR => Some(&self.output_dir),
            _ => None,
        }
    }

    /// Value of a setting a command cannot run without.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.lookup(key)
            .map(String::as_str)
            .ok_or_else(|| DmpError::MissingConfig {
                field: key.to_string(),
            })
    }

    pub fn affiliation(&self) -> Option<Affiliation> {
        self.default_affiliation.as_ref().map(|name| Affiliation {
            name: name.clone(),
            abbreviation: self.default_affiliation_abbrev.clone(),
        })
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            (DMPONLINE_API_URL, &self.dmponline_api_url),
            (DMPONLINE_API_URL_V0, &self.dmponline_api_url_v0),
            (SWECRIS_URL, &self.swecris_url),
        ] {
            if let Some(url) = value {
                validate_url(field, url)?;
            }
        }

        validate_path(DMP_OUTPUT_DIR, &self.output_dir)?;
        if let Some(logfile) = &self.logfile {
            validate_path(LOGFILE, logfile)?;
        }

        if let Some(prefix) = &self.dmp_id_prefix {
            validate_non_empty_string(DMP_ID_PREFIX, prefix)?;
            if prefix.ends_with(':') {
                return Err(DmpError::InvalidConfigValue {
                    field: DMP_ID_PREFIX.to_string(),
                    value: prefix.clone(),
                    reason: "the ':' separator is added automatically".to_string(),
                });
            }
        }

        tracing::debug!("✅ Settings validation passed");
        Ok(())
    }
}

fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let invalid = |e: dotenvy::Error| DmpError::InvalidConfigValue {
        field: DOTENV_FILE.to_string(),
        value: path.display().to_string(),
        reason: e.to_string(),
    };

    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(HashMap::new())
        }
        Err(e) => return Err(invalid(e)),
    };

    entries
        .map(|entry| entry.map_err(invalid))
        .collect()
}

fn redact(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "Some(***)"
    } else {
        "None"
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("dmponline_api_url", &self.dmponline_api_url)
            .field("dmponline_api_url_v0", &self.dmponline_api_url_v0)
            .field("dmponline_user", &self.dmponline_user)
            .field("dmponline_password", &redact(&self.dmponline_password))
            .field("dmponline_auth_code", &redact(&self.dmponline_auth_code))
            .field("dmp_id_prefix", &self.dmp_id_prefix)
            .field("logfile", &self.logfile)
            .field("swecris_url", &self.swecris_url)
            .field("swecris_api_key", &redact(&self.swecris_api_key))
            .field("registry_schema", &self.registry_schema)
            .field("default_affiliation", &self.default_affiliation)
            .field("default_affiliation_abbrev", &self.default_affiliation_abbrev)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}
