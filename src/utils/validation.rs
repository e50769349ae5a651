use validator::Validate;

use crate::config::ConfigError;

pub fn validate_settings<T: Validate>(key: &'static str, settings: &T) -> Result<(), ConfigError> {
    settings.validate().map_err(|err| ConfigError::Invalid {
        key,
        reason: err.to_string(),
    })
}
