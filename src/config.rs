//! Reads the split fraction out of the project's `params.yaml`.
//!
//! ```yaml
//! data_ingestion:
//!   test_size: 0.2
//! ```

use std::io::ErrorKind;
use std::path::Path;

use log::Log;
use serde_yaml::Value as YamlValue;

use crate::error::{IngestError, Result};

/// Default location of the parameters file.
pub const DEFAULT_PARAMS_PATH: &str = "params.yaml";

/// Nested key path holding the test fraction.
pub const TEST_SIZE_KEY: [&str; 2] = ["data_ingestion", "test_size"];

/// Load `data_ingestion.test_size` from a YAML file.
///
/// The value is returned as-is; range checking belongs to the splitter,
/// which requires a fraction in the open interval (0, 1).
pub fn load_test_fraction(path: &Path, logger: &dyn Log) -> Result<f64> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            log::error!(logger: logger, "File {} not found.", path.display());
            IngestError::ConfigNotFound {
                path: path.to_path_buf(),
                source: e,
            }
        } else {
            log::error!(logger: logger, "Failed to read {}: {e}", path.display());
            IngestError::UnexpectedStageFailure {
                stage: format!("reading {}", path.display()),
                reason: e.to_string(),
            }
        }
    })?;

    let root: YamlValue = serde_yaml::from_str(&content).map_err(|e| {
        log::error!(logger: logger, "YAML error in {}: {e}", path.display());
        IngestError::ConfigMalformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let key = TEST_SIZE_KEY.join(".");
    let value = lookup(&root, &TEST_SIZE_KEY).ok_or_else(|| {
        log::error!(
            logger: logger,
            "Invalid structure in {}. '{key}' is missing.",
            path.display()
        );
        IngestError::ConfigKeyMissing {
            path: path.to_path_buf(),
            key: key.clone(),
        }
    })?;

    let test_size = value.as_f64().ok_or_else(|| {
        log::error!(
            logger: logger,
            "'{key}' in {} is not a number: {value:?}",
            path.display()
        );
        IngestError::ConfigMalformed {
            path: path.to_path_buf(),
            reason: format!("'{key}' is not a number"),
        }
    })?;

    log::info!(logger: logger, "Loaded test_size: {test_size} from {}", path.display());
    Ok(test_size)
}

/// Walk a mapping along `keys`. A null leaf counts as missing.
fn lookup<'a>(root: &'a YamlValue, keys: &[&str]) -> Option<&'a YamlValue> {
    keys.iter()
        .try_fold(root, |node, key| node.get(*key))
        .filter(|v| !v.is_null())
}
