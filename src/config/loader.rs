//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{ResolverSettings, RouterConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::RouteTable;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// A handler could not be found verbatim nor under the base directory.
    #[error("handler `{handler}` for `{reference}` not found (base directory {})", base_dir.display())]
    MissingHandler {
        reference: String,
        handler: String,
        base_dir: PathBuf,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RouterConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load a configuration file into `table`.
///
/// Handler paths are resolved against `base_dir`, or the directory holding
/// the configuration file when none is given. With `append` the file's
/// entries are merged into the existing table, otherwise they replace it.
pub fn load_routes(
    table: &mut RouteTable,
    path: &Path,
    base_dir: Option<&Path>,
    append: bool,
) -> Result<ResolverSettings, ConfigError> {
    let config = load_config(path)?;
    let base_dir = match base_dir {
        Some(dir) => dir.to_path_buf(),
        None => path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    table.load(&config, &base_dir, append)?;

    tracing::info!(
        path = %path.display(),
        routes = table.len(),
        append,
        "Route table loaded"
    );

    Ok(config.resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_load_routes_resolves_relative_to_config_dir() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("edit.cgi")).unwrap();
        File::create(dir.path().join("home.cgi")).unwrap();
        let config_path = dir.path().join("routes.toml");
        fs::write(
            &config_path,
            r#"
            [general]
            default = "home.cgi"

            [uri]
            "projects/edit/?app" = "edit.cgi"

            [resolver]
            base_dir = "/app/"
            "#,
        )
        .unwrap();

        let mut table = RouteTable::new();
        let settings = load_routes(&mut table, &config_path, None, false).unwrap();

        assert_eq!(settings.base_dir, "/app/");
        assert_eq!(table.len(), 1);
        assert_eq!(table.default_handler(), Some(dir.path().join("home.cgi").as_path()));
        assert_eq!(table.routes()[0].handler, dir.path().join("edit.cgi"));
    }

    #[test]
    fn test_missing_handler_is_fatal() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("routes.toml");
        fs::write(&config_path, "[uri]\n\"about\" = \"nowhere.cgi\"\n").unwrap();

        let mut table = RouteTable::new();
        let err = load_routes(&mut table, &config_path, None, false).unwrap_err();
        assert!(matches!(err, ConfigError::MissingHandler { ref reference, .. } if reference == "about"));
        assert!(err.to_string().contains("nowhere.cgi"));
    }

    #[test]
    fn test_validation_errors_are_reported_together() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("routes.toml");
        fs::write(&config_path, "[uri]\n\"a/?\" = \"a.cgi\"\n\"b\" = \"\"\n").unwrap();

        let err = load_config(&config_path).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unreadable_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
