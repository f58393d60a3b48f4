//! Axioms: ceilings, content rules and provenance defaults.
//!
//! The interpreter never hard-codes its limits. Recursion and population
//! ceilings, banned absolutist phrasings, the required blind spots and the
//! FAIR+CARE export fields all come from an [`Axioms`] value, built from
//! defaults or from a TOML file:
//!
//! ```toml
//! [limits]
//! max_recursion_depth = 64
//! max_entities = 10000
//! max_parse_depth = 256
//!
//! [absolutism]
//! patterns = ["\\babsolute truth\\b"]
//!
//! [blind_spots]
//! chaos = "Fundamentally undecidable"
//! ```
//!
//! Every section is optional; missing fields fall back to the defaults.

use std::collections::BTreeMap;
use std::path::Path;

use miette::Diagnostic;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::LimitError;

/// Errors from loading an axioms file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read axioms file: {path}")]
    #[diagnostic(
        code(logos::config::read),
        help("Ensure the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse axioms file {path}: {message}")]
    #[diagnostic(
        code(logos::config::parse),
        help("Check the TOML syntax. Known sections: [limits], [absolutism], [blind_spots], [provenance].")
    )]
    Parse { path: String, message: String },

    #[error("invalid absolutism pattern {pattern}: {message}")]
    #[diagnostic(
        code(logos::config::pattern),
        help("Patterns use the `regex` crate syntax and are matched case-insensitively.")
    )]
    Pattern { pattern: String, message: String },

    #[error("limit `{field}` must be greater than zero")]
    #[diagnostic(
        code(logos::config::zero_limit),
        help("A zero ceiling would reject every evaluation. Remove the field to use the default.")
    )]
    ZeroLimit { field: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Serialized configuration
// ---------------------------------------------------------------------------

/// The TOML shape of an axioms file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxiomsConfig {
    pub limits: LimitsConfig,
    pub absolutism: AbsolutismConfig,
    /// Required blind spots: key → description.
    pub blind_spots: BTreeMap<String, String>,
    /// Fixed provenance fields merged into FAIR+CARE metadata.
    pub provenance: BTreeMap<String, String>,
}

impl Default for AxiomsConfig {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            absolutism: AbsolutismConfig::default(),
            blind_spots: default_blind_spots(),
            provenance: default_provenance(),
        }
    }
}

/// Ceilings enforced by the evaluator and the context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_recursion_depth")]
    pub max_recursion_depth: usize,
    #[serde(default = "default_max_entities")]
    pub max_entities: usize,
    /// Deepest list nesting the parser accepts.
    #[serde(default = "default_max_parse_depth")]
    pub max_parse_depth: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: default_max_recursion_depth(),
            max_entities: default_max_entities(),
            max_parse_depth: default_max_parse_depth(),
        }
    }
}

/// Banned absolutist phrasings, as case-insensitive regular expressions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsolutismConfig {
    #[serde(default = "default_absolutism_patterns")]
    pub patterns: Vec<String>,
}

impl Default for AbsolutismConfig {
    fn default() -> Self {
        Self {
            patterns: default_absolutism_patterns(),
        }
    }
}

fn default_max_recursion_depth() -> usize {
    64
}

fn default_max_entities() -> usize {
    10_000
}

fn default_max_parse_depth() -> usize {
    256
}

fn default_absolutism_patterns() -> Vec<String> {
    vec![
        r"\babsolute(ly)? truth\b".into(),
        r"\bbeyond (all|any) doubt\b".into(),
        r"\b(always|never) (wrong|mistaken)\b".into(),
        r"\bfinal truth\b".into(),
        r"абсолютн\w* истин\w*".into(),
    ]
}

fn default_blind_spots() -> BTreeMap<String, String> {
    [
        ("chaos", "Fundamentally undecidable; acknowledged, not computed"),
        ("consciousness", "The inner side of experience is not modeled"),
        ("meaning", "Meaning arises in dialogue and is never stored whole"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_provenance() -> BTreeMap<String, String> {
    [
        ("protocol", "Λ-Protocol 6.0"),
        ("standard", "FAIR+CARE"),
        ("license", "CC-BY-4.0"),
        ("access_rights", "open"),
        ("collective_benefit", "knowledge returned to the participating community"),
        ("authority_to_control", "operator"),
        ("responsibility", "operator and context share attribution"),
        ("ethics", "blind spots are recorded, never resolved by force"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

// ---------------------------------------------------------------------------
// Axioms
// ---------------------------------------------------------------------------

/// Validated axioms with compiled content rules.
#[derive(Debug, Clone)]
pub struct Axioms {
    config: AxiomsConfig,
    banned: Vec<Regex>,
}

impl Axioms {
    /// Validate a configuration and compile its patterns.
    pub fn from_config(config: AxiomsConfig) -> ConfigResult<Self> {
        if config.limits.max_recursion_depth == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_recursion_depth".into(),
            });
        }
        if config.limits.max_entities == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_entities".into(),
            });
        }
        if config.limits.max_parse_depth == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_parse_depth".into(),
            });
        }

        let banned = config
            .absolutism
            .patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ConfigError::Pattern {
                        pattern: p.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self { config, banned })
    }

    /// Parse axioms from TOML text. `origin` names the source in errors.
    pub fn from_toml_str(text: &str, origin: &str) -> ConfigResult<Self> {
        let config: AxiomsConfig = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        Self::from_config(config)
    }

    /// Load axioms from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let axioms = Self::from_toml_str(&text, &path.display().to_string())?;
        tracing::info!(
            path = %path.display(),
            max_depth = axioms.max_recursion_depth(),
            max_entities = axioms.max_entities(),
            "loaded axioms"
        );
        Ok(axioms)
    }

    /// Builder-style override of the recursion ceiling.
    pub fn with_max_recursion_depth(mut self, max: usize) -> Self {
        self.config.limits.max_recursion_depth = max.max(1);
        self
    }

    /// Builder-style override of the population ceiling.
    pub fn with_max_entities(mut self, max: usize) -> Self {
        self.config.limits.max_entities = max.max(1);
        self
    }

    /// Builder-style override of the parser's nesting bound.
    pub fn with_max_parse_depth(mut self, max: usize) -> Self {
        self.config.limits.max_parse_depth = max.max(1);
        self
    }

    pub fn config(&self) -> &AxiomsConfig {
        &self.config
    }

    pub fn max_recursion_depth(&self) -> usize {
        self.config.limits.max_recursion_depth
    }

    pub fn max_entities(&self) -> usize {
        self.config.limits.max_entities
    }

    pub fn max_parse_depth(&self) -> usize {
        self.config.limits.max_parse_depth
    }

    /// Fail when `depth` exceeds the recursion ceiling.
    pub fn check_recursion_depth(&self, depth: usize) -> Result<(), LimitError> {
        let max = self.max_recursion_depth();
        if depth > max {
            return Err(LimitError::RecursionDepth { depth, max });
        }
        Ok(())
    }

    /// Fail when `count` exceeds the population ceiling.
    pub fn check_entity_count(&self, count: usize) -> Result<(), LimitError> {
        let max = self.max_entities();
        if count > max {
            return Err(LimitError::EntityCount { count, max });
        }
        Ok(())
    }

    /// Fail on the first banned phrase found in `text`.
    pub fn validate_no_absolutism(&self, text: &str) -> Result<(), LimitError> {
        for re in &self.banned {
            if let Some(m) = re.find(text) {
                return Err(LimitError::Absolutism {
                    phrase: m.as_str().to_string(),
                    pattern: re.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Blind spots every context registers at construction.
    pub fn required_blind_spots(&self) -> &BTreeMap<String, String> {
        &self.config.blind_spots
    }

    /// Fixed provenance fields for FAIR+CARE export metadata.
    pub fn default_fair_care_metadata(&self) -> BTreeMap<String, String> {
        self.config.provenance.clone()
    }
}

impl Default for Axioms {
    fn default() -> Self {
        Self::from_config(AxiomsConfig::default()).expect("built-in axioms are valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_populated() {
        let axioms = Axioms::default();
        assert_eq!(axioms.max_recursion_depth(), 64);
        assert_eq!(axioms.max_entities(), 10_000);
        assert_eq!(axioms.max_parse_depth(), 256);
        assert!(axioms.required_blind_spots().contains_key("chaos"));
        assert_eq!(
            axioms.default_fair_care_metadata().get("standard").map(String::as_str),
            Some("FAIR+CARE")
        );
    }

    #[test]
    fn ceilings_allow_equal_and_reject_above() {
        let axioms = Axioms::default().with_max_recursion_depth(3).with_max_entities(5);
        assert!(axioms.check_recursion_depth(3).is_ok());
        assert_eq!(
            axioms.check_recursion_depth(4),
            Err(LimitError::RecursionDepth { depth: 4, max: 3 })
        );
        assert!(axioms.check_entity_count(5).is_ok());
        assert!(matches!(
            axioms.check_entity_count(6),
            Err(LimitError::EntityCount { count: 6, max: 5 })
        ));
    }

    #[test]
    fn absolutism_is_case_insensitive() {
        let axioms = Axioms::default();
        assert!(axioms.validate_no_absolutism("(Α \"a modest claim\")").is_ok());
        let err = axioms
            .validate_no_absolutism("this is the Absolute Truth")
            .unwrap_err();
        match err {
            LimitError::Absolutism { phrase, .. } => assert_eq!(phrase, "Absolute Truth"),
            other => panic!("expected Absolutism, got {other:?}"),
        }
        assert!(axioms.validate_no_absolutism("это абсолютная истина").is_err());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let axioms = Axioms::from_toml_str("[limits]\nmax_entities = 12\n", "inline").unwrap();
        assert_eq!(axioms.max_entities(), 12);
        assert_eq!(axioms.max_recursion_depth(), 64);
        assert!(!axioms.required_blind_spots().is_empty());
    }

    #[test]
    fn custom_patterns_replace_defaults() {
        let text = "[absolutism]\npatterns = [\"\\\\bforever\\\\b\"]\n";
        let axioms = Axioms::from_toml_str(text, "inline").unwrap();
        assert!(axioms.validate_no_absolutism("absolute truth").is_ok());
        assert!(axioms.validate_no_absolutism("Forever").is_err());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let text = "[absolutism]\npatterns = [\"(unclosed\"]\n";
        let err = Axioms::from_toml_str(text, "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { .. }));
    }

    #[test]
    fn zero_ceiling_rejected() {
        let err = Axioms::from_toml_str("[limits]\nmax_recursion_depth = 0\n", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroLimit { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Axioms::from_toml_str("[limits\n", "broken.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == "broken.toml"));
    }
}
