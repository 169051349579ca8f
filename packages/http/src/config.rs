//! Command line and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use schemacafe_json_store::{SchemaLocalStore, DEFAULT_MAX_BODY_BYTES};
use schemacafe_raw_store::RawLocalStore;
use schemacafe_store::PathStore;

use crate::error::Error;

pub const DEFAULT_PORT: u16 = 2069;

/// Which store serves the data directory.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// JSON schema documents with JSON or HTML directory listings
    Schema,
    /// Opaque bytes with HTML directory listings
    Raw,
}

/// schemacafe - serve a directory tree of documents over HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "schemacafe")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to listen on
    #[arg(long, env = "SCHEMACAFE_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Directory the URL path space is mapped onto, created if missing
    #[arg(long, env = "SCHEMACAFE_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Store variant
    #[arg(long, env = "SCHEMACAFE_VARIANT", value_enum, default_value_t = Variant::Schema)]
    pub variant: Variant,

    /// Reject malformed schema documents instead of treating them as empty
    #[arg(long, env = "SCHEMACAFE_STRICT_DECODE")]
    pub strict_decode: bool,

    /// Largest schema document accepted by PUT, in bytes
    #[arg(long, env = "SCHEMACAFE_MAX_SCHEMA_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_schema_bytes: u64,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Opens the configured store, creating the data directory first if needed.
    pub fn open_store(&self) -> Result<Arc<dyn PathStore>, Error> {
        if !self.data_dir.exists() {
            tracing::info!("Creating data directory {}", self.data_dir.display());
            std::fs::create_dir_all(&self.data_dir).map_err(|source| Error::DataDir {
                path: self.data_dir.clone(),
                source,
            })?;
        }

        let store: Arc<dyn PathStore> = match self.variant {
            Variant::Schema => Arc::new(
                SchemaLocalStore::new(self.data_dir.clone())?
                    .with_strict_decode(self.strict_decode)
                    .with_max_body_bytes(self.max_schema_bytes),
            ),
            Variant::Raw => {
                if self.strict_decode {
                    tracing::warn!("--strict-decode has no effect on the raw store");
                }
                Arc::new(RawLocalStore::new(self.data_dir.clone())?)
            }
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemacafe_store::StoreKind;
    use std::sync::{Mutex, MutexGuard};

    const ENV_VARS: [&str; 5] = [
        "SCHEMACAFE_HOST",
        "SCHEMACAFE_DATA_DIR",
        "SCHEMACAFE_VARIANT",
        "SCHEMACAFE_STRICT_DECODE",
        "SCHEMACAFE_MAX_SCHEMA_BYTES",
    ];

    /// Serializes the tests that parse from the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn defaults() {
        let _env = env_lock();
        let config = Config::try_parse_from(["schemacafe"]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.variant, Variant::Schema);
        assert!(!config.strict_decode);
        assert_eq!(config.max_schema_bytes, DEFAULT_MAX_BODY_BYTES);
        // PORT may legitimately be set in the environment running the tests.
        if std::env::var_os("PORT").is_none() {
            assert_eq!(config.socket_addr().to_string(), "0.0.0.0:2069");
        }
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "schemacafe",
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
            "--data-dir",
            "/tmp/cafe",
            "--variant",
            "raw",
            "--strict-decode",
            "--max-schema-bytes",
            "4096",
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cafe"));
        assert_eq!(config.variant, Variant::Raw);
        assert!(config.strict_decode);
        assert_eq!(config.max_schema_bytes, 4096);
    }

    #[test]
    fn environment_supplies_settings() {
        let _env = env_lock();
        let values = [
            "127.0.0.2",
            "/srv/schemas",
            "raw",
            "true",
            "2048",
        ];
        for (name, value) in ENV_VARS.iter().zip(values) {
            std::env::set_var(name, value);
        }

        let parsed = Config::try_parse_from(["schemacafe"]);
        let overridden = Config::try_parse_from(["schemacafe", "--variant", "schema"]);
        for name in ENV_VARS {
            std::env::remove_var(name);
        }

        let config = parsed.unwrap();
        assert_eq!(config.host.to_string(), "127.0.0.2");
        assert_eq!(config.data_dir, PathBuf::from("/srv/schemas"));
        assert_eq!(config.variant, Variant::Raw);
        assert!(config.strict_decode);
        assert_eq!(config.max_schema_bytes, 2048);

        assert_eq!(overridden.unwrap().variant, Variant::Schema);
    }

    #[test]
    fn bad_variant_is_rejected() {
        assert!(Config::try_parse_from(["schemacafe", "--variant", "xml"]).is_err());
    }

    #[test]
    fn open_store_creates_data_dir_and_selects_variant() {
        let _env = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested/data");

        let mut config = Config::try_parse_from(["schemacafe"]).unwrap();
        config.data_dir = data_dir.clone();

        let store = config.open_store().unwrap();
        assert!(data_dir.is_dir());
        assert_eq!(store.kind(), StoreKind::Schema);

        config.variant = Variant::Raw;
        assert_eq!(config.open_store().unwrap().kind(), StoreKind::Raw);
    }

    #[test]
    fn open_store_rejects_file_data_dir() {
        let _env = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();

        let mut config = Config::try_parse_from(["schemacafe"]).unwrap();
        config.data_dir = file;
        assert!(matches!(config.open_store(), Err(Error::Store(_))));
    }
}
