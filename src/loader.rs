use crate::config::FilterConfig;
use crate::error::FilterError;

/// Load a [`FilterConfig`] from JSON text and validate it.
///
/// Missing fields take their defaults. Parse errors map to
/// `FilterError::InvalidConfig`, bad patterns to `FilterError::InvalidPattern`.
///
/// Example:
/// ```rust
/// use namespace_filter_core::load_config;
/// let config = load_config(r#"{ "classification_attribute": "businessCategory" }"#).unwrap();
/// assert_eq!(config.classification_attribute, "businessCategory");
/// assert_eq!(config.name_attribute, "cn");
/// ```
pub fn load_config(text: &str) -> Result<FilterConfig, FilterError> {
    let config: FilterConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}
