//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use turbo_client::{Client, ClientBuilder, ClientConfig};
use turbo_fake::FakeProvider;

use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["turbo.toml", ".turbo.toml", "turbo.json"];

/// Execution context for CLI commands.
pub struct Context {
    pub config: ClientConfig,
    pub output: Output,
    /// Where the config came from, if anywhere.
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Load context from an explicit config file, or the nearest one found
    /// walking up from the working directory.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let (config, config_path) = match config_path {
            Some(path) => {
                let config = ClientConfig::load(path)
                    .with_context(|| format!("Failed to load config {}", path))?;
                (config, Some(PathBuf::from(path)))
            }
            None => {
                let cwd = std::env::current_dir().context("Failed to get current directory")?;
                match find_config(&cwd) {
                    Some(path) => (ClientConfig::load(&path)?, Some(path)),
                    None => (ClientConfig::default(), None),
                }
            }
        };

        if let Some(path) = &config_path {
            output.debug(&format!("Using config {}", path.display()));
        }

        Ok(Self {
            config,
            output,
            config_path,
        })
    }

    /// Build a client over the fake provider.
    ///
    /// `force_cache` enables the in-memory cache even if the config leaves it off.
    pub fn client(&self, force_cache: bool) -> Result<Client> {
        let mut cache = self.config.cache.clone();
        cache.enabled |= force_cache;

        let provider = FakeProvider::from_config(&self.config.provider(FakeProvider::DEFAULT_NAME))?;
        let client = ClientBuilder::from_config(&self.config)
            .with_cache_config(&cache)
            .with_provider(provider)
            .build()?;
        Ok(client)
    }
}

/// Find a config file in the directory tree above `start`.
fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = std::env::temp_dir().join(format!("turbo-cli-{}", std::process::id()));
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join("turbo.toml"), "[cache]\nenabled = true\n").unwrap();

        assert_eq!(find_config(&nested), Some(root.join("turbo.toml")));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_client_from_default_config() {
        let ctx = Context {
            config: ClientConfig::default(),
            output: Output::new(false, true),
            config_path: None,
        };
        let client = ctx.client(false).unwrap();
        assert_eq!(client.capabilities().count(), 5);
    }

    #[test]
    fn test_invalid_provider_section_fails() {
        let config = ClientConfig::from_toml_str("[providers.fake]\ncatalog_size = 0\n").unwrap();
        let ctx = Context {
            config,
            output: Output::new(false, true),
            config_path: None,
        };
        assert!(ctx.client(false).is_err());
    }
}
