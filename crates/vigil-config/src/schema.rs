use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::VigilConfig;

/// JSON schema for `vigil.toml`, for editor tooling and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    schema_for!(VigilConfig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn schema_lists_the_tables_and_severity_levels() {
        let value = serde_json::to_value(json_schema()).unwrap();
        let properties = value["properties"].as_object().unwrap();
        let mut keys: Vec<&str> = properties.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["checks", "logging"]);
        assert_eq!(value["additionalProperties"], serde_json::json!(false));

        let levels = &value["definitions"]["SeverityLevel"]["enum"];
        assert_eq!(levels, &serde_json::json!(["off", "default", "warn", "error"]));
    }
}
