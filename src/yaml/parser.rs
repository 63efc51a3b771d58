//! YAML parsing with error handling

use serde::de::DeserializeOwned;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content into a typed value with located error messages
pub fn parse_yaml<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content).map_err(|e| {
        YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename))
    })
}

/// Parse YAML from a file path
pub fn parse_yaml_file<T: DeserializeOwned>(path: &std::path::Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();
    parse_yaml(&content, &filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SampleMeasurement;

    #[test]
    fn test_parse_sample() {
        let yaml = "id: SAMP20250124001\nbatch: LOT20250124001\ntest_stage: drying\nresidual_humidity: 0.6\ncreated: 2025-01-24T08:00:00Z\nauthor: lab\n";
        let sample: SampleMeasurement = parse_yaml(yaml, "sample.yaml").unwrap();
        assert_eq!(sample.residual_humidity, Some(0.6));
    }

    #[test]
    fn test_unknown_stage_is_an_error() {
        let yaml = "id: SAMP20250124001\nbatch: LOT20250124001\ntest_stage: enamelling\ncreated: 2025-01-24T08:00:00Z\nauthor: lab\n";
        let err = parse_yaml::<SampleMeasurement>(yaml, "sample.yaml").unwrap_err();
        assert!(matches!(err, YamlError::Syntax(_)));
    }

    #[test]
    fn test_quoted_reading_is_an_error() {
        let yaml = "id: SAMP20250124001\nbatch: LOT20250124001\ntest_stage: drying\nresidual_humidity: high\ncreated: 2025-01-24T08:00:00Z\nauthor: lab\n";
        assert!(parse_yaml::<SampleMeasurement>(yaml, "sample.yaml").is_err());
    }
}
