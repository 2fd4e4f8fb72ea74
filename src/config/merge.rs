//! Layering of environment and command-line overrides on top of file config.

use crate::domain::{Config, GeneratorKind};
use anyhow::{Context, Result};
use figment::providers::{Env, Serialized};
use figment::Figment;
use std::path::PathBuf;

/// Prefix of environment overrides, e.g. `REPO_DOCS_MODEL=codellama`.
pub const ENV_PREFIX: &str = "REPO_DOCS_";

/// Values given on the command line. `None` leaves the lower layer untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub graph_path: Option<PathBuf>,
    pub generator: Option<GeneratorKind>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub dedupe_context: Option<bool>,
    pub max_context_tokens: Option<usize>,
    pub flush_every: Option<usize>,
    pub save_debug: Option<bool>,
    pub fail_fast: Option<bool>,
    pub exclude_globs: Option<Vec<String>>,
}

/// Apply `REPO_DOCS_*` environment variables over `config`.
pub fn apply_env_overrides(config: Config) -> Result<Config> {
    layer_env(config, Env::prefixed(ENV_PREFIX))
}

fn layer_env(config: Config, env: Env) -> Result<Config> {
    Figment::from(Serialized::defaults(config))
        .merge(env)
        .extract()
        .with_context(|| format!("Invalid {ENV_PREFIX}* environment override"))
}

pub fn merge_cli_with_config(mut config: Config, cli: CliOverrides) -> Config {
    if let Some(root) = cli.root_folder {
        config.root_folder = Some(root);
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(graph_path) = cli.graph_path {
        config.graph_path = Some(graph_path);
    }
    if let Some(generator) = cli.generator {
        config.generator = generator;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(dedupe) = cli.dedupe_context {
        config.dedupe_context = dedupe;
    }
    if let Some(max_tokens) = cli.max_context_tokens {
        config.max_context_tokens = max_tokens;
    }
    if let Some(flush_every) = cli.flush_every {
        config.flush_every = flush_every;
    }
    if let Some(save_debug) = cli.save_debug {
        config.save_debug = save_debug;
    }
    if let Some(fail_fast) = cli.fail_fast {
        config.fail_fast = fail_fast;
    }
    if let Some(globs) = cli.exclude_globs {
        config.exclude_globs = globs;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_values_override_config() {
        let file = Config { model: "from-file".to_string(), flush_every: 4, ..Config::default() };
        let merged = merge_cli_with_config(
            file,
            CliOverrides {
                model: Some("from-cli".to_string()),
                generator: Some(GeneratorKind::Offline),
                dedupe_context: Some(false),
                ..CliOverrides::default()
            },
        );
        assert_eq!(merged.model, "from-cli");
        assert_eq!(merged.generator, GeneratorKind::Offline);
        assert!(!merged.dedupe_context);
        assert_eq!(merged.flush_every, 4, "unset overrides keep the file value");
    }

    #[test]
    fn empty_overrides_are_identity() {
        let file = Config { fail_fast: true, ..Config::default() };
        assert_eq!(merge_cli_with_config(file.clone(), CliOverrides::default()), file);
    }

    #[test]
    fn environment_layer_sits_over_file_values() {
        // Own prefix so parallel tests never see these variables.
        std::env::set_var("RDOCS_LAYER_TEST_MODEL", "mistral");
        std::env::set_var("RDOCS_LAYER_TEST_FLUSH_EVERY", "7");
        let file = Config { model: "from-file".to_string(), save_debug: true, ..Config::default() };

        let layered = layer_env(file, Env::prefixed("RDOCS_LAYER_TEST_")).expect("layered");
        assert_eq!(layered.model, "mistral");
        assert_eq!(layered.flush_every, 7);
        assert!(layered.save_debug);
        assert_eq!(layered.graph_path, None);
    }

    #[test]
    fn invalid_environment_value_is_an_error() {
        std::env::set_var("RDOCS_BAD_TEST_GENERATOR", "gpt");
        let err = layer_env(Config::default(), Env::prefixed("RDOCS_BAD_TEST_")).expect_err("bad");
        assert!(err.to_string().contains("environment override"));
    }
}
