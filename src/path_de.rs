use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::ConfigError;

/// Deserialize a JSON file, naming the offending JSON path on type errors.
pub fn from_str_with_path<T: DeserializeOwned>(file: &Path, src: &str) -> Result<T, ConfigError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        let message = match path.as_str() {
            "." => err.into_inner().to_string(),
            _ => format!("at JSON path {path} → {}", err.into_inner()),
        };
        ConfigError::Invalid { path: file.to_path_buf(), message }
    })
}
