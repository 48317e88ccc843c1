//! Extraction run configuration
//!
//! The core receives an already-validated [`ExtractorConfig`]; it never
//! reads configuration storage itself. The CLI resolves a config from a
//! YAML file, the process environment, or both (environment wins).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Base service address, e.g. `https://myNNNNNN.businessbydesign.cloud.sap`
    #[serde(default)]
    pub base_url: String,

    /// OData service sub-path under the base address
    #[serde(default = "default_service_path")]
    pub service_path: String,

    /// Query entity for the main extraction
    #[serde(default)]
    pub query_entity: String,

    /// Query entity for partition discovery; defaults to `query_entity`
    #[serde(default)]
    pub discovery_entity: Option<String>,

    /// Fields requested via `$select`, in output order
    #[serde(default = "default_select_fields")]
    pub select_fields: Vec<String>,

    /// Partition-key candidates, tried in priority order
    #[serde(default = "default_partition_candidates")]
    pub partition_key_candidates: Vec<String>,

    /// Column rename map applied by the output layer
    #[serde(default = "default_rename_map")]
    pub rename: HashMap<String, String>,

    /// Destination path for the CSV output
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Basic-auth username; absent credentials mean unauthenticated calls
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password
    #[serde(default)]
    pub password: Option<String>,

    /// Inter-request pause in milliseconds, applied between every two
    /// consecutive outbound requests
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// `$top` ceiling for the partition-value listing request
    #[serde(default = "default_discovery_top")]
    pub discovery_top: u32,

    /// `$top` page-size hint for extraction pages
    #[serde(default = "default_page_top")]
    pub page_top: u32,

    /// Optional `$format` query parameter (e.g. `json`)
    #[serde(default)]
    pub format: Option<String>,
}

fn default_service_path() -> String {
    "sap/byd/odata/ana_businessanalytics_analytics.svc".to_string()
}

fn default_select_fields() -> Vec<String> {
    [
        "FCABSENCE_TIME",
        "UCABSENCE_TIME",
        "C0DATEFROM",
        "C0DATETO",
        "CEMPLOYEE_UUID",
        "TEMPLOYEE_UUID",
        "RCHEADCOUNT",
        "FCHEADCOUNT",
        "UCHEADCOUNT",
        "FCPLANNED_TIME",
        "UCPLANNED_TIME",
        "CPROJECT_UUID",
        "TPROJECT_UUID",
        "FCRECORDED_TIME",
        "UCRECORDED_TIME",
        "RCCOMPLIANCE_RATE",
        "FCCOMPLIANCE_RATE",
        "UCCOMPLIANCE_RATE",
        "KCABSENCE_TIME",
        "KCHEADCOUNT",
        "KCPLANNED_TIME",
        "KCRECORDED_TIME",
        "KCCOMPLIANCE_RATE",
        "C0CHAR_STRUCTURE",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_partition_candidates() -> Vec<String> {
    vec!["C0CHAR_STRUCTURE".to_string()]
}

fn default_rename_map() -> HashMap<String, String> {
    [
        ("TEMPLOYEE_UUID", "Employee"),
        ("UCRECORDED_TIME", "Recorded Time"),
        ("C0DATEFROM", "Date From"),
        ("C0DATETO", "Date To"),
        ("TPROJECT_UUID", "Project ID"),
        ("KCPLANNED_TIME", "Planned Time"),
        ("KCRECORDED_TIME", "KC_Recorded Time"),
    ]
    .iter()
    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
    .collect()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/employee_data.csv")
}

fn default_pause_ms() -> u64 {
    200
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_discovery_top() -> u32 {
    10000
}

fn default_page_top() -> u32 {
    5000
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        serde_yaml::from_str("{}").expect("empty config is deserializable")
    }
}

impl ExtractorConfig {
    /// Load a config from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Build a config from the process environment only
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Overlay environment values onto this config.
    ///
    /// Variable names match the original deployment so existing setups
    /// keep working: `SAP_BASE_URL`, `SAP_ODATA_PATH`, `SAP_QUERY`,
    /// `SAP_DISCOVERY_QUERY`, `OUTPUT_CSV`, `SAP_USERNAME`,
    /// `SAP_PASSWORD`, `REQUEST_PAUSE` (seconds, fractional allowed).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SAP_BASE_URL") {
            self.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("SAP_ODATA_PATH") {
            self.service_path = v.trim_matches('/').to_string();
        }
        if let Some(v) = lookup("SAP_QUERY") {
            self.query_entity = v.trim_matches('/').to_string();
        }
        if let Some(v) = lookup("SAP_DISCOVERY_QUERY") {
            self.discovery_entity = Some(v.trim_matches('/').to_string());
        }
        if let Some(v) = lookup("OUTPUT_CSV") {
            self.output_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("SAP_USERNAME") {
            self.username = Some(v);
        }
        if let Some(v) = lookup("SAP_PASSWORD") {
            self.password = Some(v);
        }
        if let Some(v) = lookup("REQUEST_PAUSE") {
            if let Ok(seconds) = v.parse::<f64>() {
                if seconds >= 0.0 {
                    self.pause_ms = (seconds * 1000.0) as u64;
                }
            }
        }
    }

    /// Validate that the config is usable for a run
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        url::Url::parse(&self.base_url)?;
        if self.query_entity.is_empty() {
            return Err(Error::missing_field("query_entity"));
        }
        if self.select_fields.is_empty() {
            return Err(Error::invalid_value(
                "select_fields",
                "at least one field must be requested",
            ));
        }
        if self.partition_key_candidates.is_empty() {
            return Err(Error::invalid_value(
                "partition_key_candidates",
                "at least one candidate is required",
            ));
        }
        if self.page_top == 0 {
            return Err(Error::invalid_value("page_top", "must be positive"));
        }
        Ok(())
    }

    /// Root URL of the OData service
    pub fn root_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.service_path.trim_matches('/')
        )
    }

    /// URL of a query entity under the service root
    pub fn entity_url(&self, entity: &str) -> String {
        format!("{}/{}", self.root_url(), entity.trim_matches('/'))
    }

    /// Entity used for partition discovery (falls back to the main entity)
    pub fn discovery_entity(&self) -> &str {
        self.discovery_entity.as_deref().unwrap_or(&self.query_entity)
    }

    /// Inter-request pause
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Credential pair, present only when both halves are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ExtractorConfig {
        let mut config = ExtractorConfig::default();
        config.base_url = "https://example.test".to_string();
        config.query_entity = "EmployeeTimeQueryResults".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = base_config();
        assert_eq!(
            config.service_path,
            "sap/byd/odata/ana_businessanalytics_analytics.svc"
        );
        assert_eq!(config.select_fields.len(), 24);
        assert_eq!(config.partition_key_candidates, vec!["C0CHAR_STRUCTURE"]);
        assert_eq!(config.pause_ms, 200);
        assert_eq!(config.timeout_seconds, 60);
        assert_eq!(config.discovery_top, 10000);
        assert_eq!(config.page_top, 5000);
        assert_eq!(config.rename.get("TEMPLOYEE_UUID").unwrap(), "Employee");
        assert!(config.format.is_none());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
base_url: "https://analytics.example.com"
query_entity: "ProjectTimeQueryResults"
discovery_entity: "ProjectCodesQueryResults"
select_fields: [A, B]
pause_ms: 50
format: json
"#;
        let config: ExtractorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.base_url, "https://analytics.example.com");
        assert_eq!(config.query_entity, "ProjectTimeQueryResults");
        assert_eq!(config.discovery_entity(), "ProjectCodesQueryResults");
        assert_eq!(config.select_fields, vec!["A", "B"]);
        assert_eq!(config.pause_ms, 50);
        assert_eq!(config.format.as_deref(), Some("json"));
        config.validate().unwrap();
    }

    #[test]
    fn test_entity_url_joining() {
        let mut config = base_config();
        config.base_url = "https://example.test/".to_string();
        config.service_path = "/svc/path/".to_string();
        assert_eq!(
            config.entity_url("Query"),
            "https://example.test/svc/path/Query"
        );
    }

    #[test]
    fn test_discovery_entity_fallback() {
        let mut config = base_config();
        assert_eq!(config.discovery_entity(), "EmployeeTimeQueryResults");
        config.discovery_entity = Some("Codes".to_string());
        assert_eq!(config.discovery_entity(), "Codes");
    }

    #[test]
    fn test_apply_env() {
        let mut config = base_config();
        let env: HashMap<&str, &str> = [
            ("SAP_BASE_URL", "https://tenant.example.com/"),
            ("SAP_ODATA_PATH", "/svc/analytics/"),
            ("SAP_QUERY", "TimesheetQueryResults"),
            ("OUTPUT_CSV", "out/data.csv"),
            ("SAP_USERNAME", "reporter"),
            ("SAP_PASSWORD", "hunter2"),
            ("REQUEST_PAUSE", "0.5"),
        ]
        .into_iter()
        .collect();

        config.apply_env(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.base_url, "https://tenant.example.com");
        assert_eq!(config.service_path, "svc/analytics");
        assert_eq!(config.query_entity, "TimesheetQueryResults");
        assert_eq!(config.output_path, PathBuf::from("out/data.csv"));
        assert_eq!(config.credentials(), Some(("reporter", "hunter2")));
        assert_eq!(config.pause_ms, 500);
    }

    #[test]
    fn test_apply_env_ignores_bad_pause() {
        let mut config = base_config();
        config.apply_env(|key| (key == "REQUEST_PAUSE").then(|| "not-a-number".to_string()));
        assert_eq!(config.pause_ms, 200);
    }

    #[test]
    fn test_validate_requires_base_url_and_entity() {
        let mut config = base_config();
        config.base_url = String::new();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfigField { field }) if field == "base_url"
        ));

        let mut config = base_config();
        config.query_entity = String::new();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfigField { field }) if field == "query_entity"
        ));
    }

    #[test]
    fn test_validate_rejects_unparseable_base_url() {
        let mut config = base_config();
        config.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_validate_rejects_empty_lists() {
        let mut config = base_config();
        config.select_fields.clear();
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.partition_key_candidates.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_require_both_halves() {
        let mut config = base_config();
        config.username = Some("user".to_string());
        assert!(config.credentials().is_none());
        config.password = Some("pass".to_string());
        assert_eq!(config.credentials(), Some(("user", "pass")));
    }
}
