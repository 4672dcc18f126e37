use serde::{Deserialize, Serialize};

/// Run settings read from a `--config` file.
///
/// Every field is optional; command-line flags override the file and
/// built-in defaults fill whatever neither provides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub target: Option<String>,
    pub charset: Option<String>,
    pub population_size: Option<usize>,
    pub mutation_rate: Option<f32>,
    pub elitism: Option<usize>,
    pub max_generations: Option<usize>,
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config: RunConfig =
            serde_json::from_str(r#"{"target": "ABAB", "elitism": 2}"#).unwrap();
        assert_eq!(config.target.as_deref(), Some("ABAB"));
        assert_eq!(config.elitism, Some(2));
        assert_eq!(config.population_size, None);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = serde_json::from_str::<RunConfig>(r#"{"popsize": 10}"#);
        assert!(result.is_err());
    }
}
