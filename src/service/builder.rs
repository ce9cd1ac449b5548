// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fluent construction of a [`Config`] from specs and sources.

use crate::domain::errors::{ConfigError, SourceError};
use crate::domain::spec::ConfigSpec;
use crate::ports::Source;
use crate::service::config::Config;

/// Builder for a [`Config`] fed from an ordered list of sources.
///
/// Every source becomes its own layer on top of the previous one, so later
/// sources override earlier ones.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::FlatMapSource;
/// use layercfg::domain::spec::ConfigSpec;
/// use layercfg::service::ConfigBuilder;
///
/// # fn main() -> layercfg::domain::Result<()> {
/// let mut spec = ConfigSpec::new("server");
/// let port = spec.optional::<u16>("port", 80, "listen port")?;
///
/// let config = ConfigBuilder::new()
///     .with_spec(spec)
///     .with_source(FlatMapSource::new([("server.port", "8080")]))
///     .with_source(FlatMapSource::new([("server.port", "9090")]))
///     .build()?;
///
/// assert_eq!(config.get(&port)?, 9090);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigBuilder {
    name: String,
    specs: Vec<ConfigSpec>,
    sources: Vec<Box<dyn Source>>,
}

impl ConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            name: "config".to_string(),
            specs: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Sets the name of the root layer.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a spec in the root layer.
    pub fn with_spec(mut self, spec: ConfigSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Adds a source on top of the previous ones.
    pub fn with_source(self, source: impl Source + 'static) -> Self {
        self.with_boxed_source(Box::new(source))
    }

    /// Adds a boxed source on top of the previous ones.
    pub fn with_boxed_source(mut self, source: Box<dyn Source>) -> Self {
        self.sources.push(source);
        self
    }

    /// Adds environment variables as a source.
    ///
    /// `NETWORK_BUFFER_SIZE` is read as `network.buffer.size`.
    #[cfg(feature = "env")]
    pub fn with_env_vars(self) -> Self {
        use crate::adapters::EnvVarAdapter;
        self.with_source(EnvVarAdapter::new().lowercase_keys(true).source())
    }

    /// Adds the environment variables starting with `prefix` as a source.
    ///
    /// The prefix is stripped: with `MYAPP_`, `MYAPP_SERVER_PORT` is read as
    /// `server.port`.
    #[cfg(feature = "env")]
    pub fn with_env_prefix(self, prefix: impl Into<String>) -> Self {
        use crate::adapters::EnvVarAdapter;
        self.with_source(EnvVarAdapter::with_prefix(prefix).source())
    }

    /// Adds command-line arguments as a source.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use layercfg::service::ConfigBuilder;
    ///
    /// # fn main() -> layercfg::domain::Result<()> {
    /// let config = ConfigBuilder::new()
    ///     .with_cli_args(vec!["--key", "value"])
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "cli")]
    pub fn with_cli_args<S: AsRef<str>>(self, args: Vec<S>) -> Self {
        use crate::adapters::CommandLineAdapter;
        self.with_source(CommandLineAdapter::from_args(args).source())
    }

    /// Adds a YAML file as a source.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[cfg(feature = "yaml")]
    pub fn with_yaml_file(self, path: impl AsRef<std::path::Path>) -> Result<Self, SourceError> {
        use crate::adapters::YamlProvider;
        use crate::ports::SourceProvider;
        let source = YamlProvider::new().parse_file(path.as_ref())?;
        Ok(self.with_boxed_source(source))
    }

    /// Adds a YAML document as a source.
    #[cfg(feature = "yaml")]
    pub fn with_yaml_str(self, content: &str) -> Result<Self, SourceError> {
        use crate::adapters::YamlProvider;
        use crate::ports::SourceProvider;
        let source = YamlProvider::new().parse_str(content)?;
        Ok(self.with_boxed_source(source))
    }

    /// Adds the default sources for an application.
    ///
    /// This is `config.yaml` from the OS-appropriate configuration directory
    /// if that file exists, then environment variables on top of it.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use layercfg::service::ConfigBuilder;
    ///
    /// # fn main() -> layercfg::domain::Result<()> {
    /// let config = ConfigBuilder::new()
    ///     .with_default_sources("myapp", "com.example")?
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[allow(unused_mut, unused_variables)]
    pub fn with_default_sources(self, app_name: &str, qualifier: &str) -> Result<Self, SourceError> {
        let mut builder = self;

        #[cfg(feature = "yaml")]
        {
            use crate::adapters::YamlProvider;
            if let Some(path) = YamlProvider::default_location(app_name, qualifier) {
                if path.is_file() {
                    builder = builder.with_yaml_file(path)?;
                } else {
                    tracing::debug!("No configuration file at {}", path.display());
                }
            }
        }

        #[cfg(feature = "env")]
        {
            builder = builder.with_env_vars();
        }

        Ok(builder)
    }

    /// Builds the config.
    ///
    /// The specs are registered in a root layer named after the builder.
    /// Each source is then loaded into a new layer on top.
    ///
    /// # Errors
    ///
    /// Returns an error if a spec cannot be registered or a source fails
    /// to load.
    pub fn build(self) -> Result<Config, ConfigError> {
        let mut config = Config::named(self.name);
        for spec in &self.specs {
            config.add_spec(spec)?;
        }
        for source in &self.sources {
            config = config.with_source(source.as_ref())?;
        }
        tracing::debug!(
            "Built config with {} specs and {} sources",
            self.specs.len(),
            self.sources.len()
        );
        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FlatMapSource, KvSource};
    use crate::domain::errors::RegistrationError;
    use crate::domain::item::Item;

    fn spec() -> (ConfigSpec, Item<String>, Item<u16>) {
        let mut spec = ConfigSpec::new("server");
        let host = spec.optional("host", "localhost".to_string(), "").unwrap();
        let port = spec.optional::<u16>("port", 80, "").unwrap();
        (spec, host, port)
    }

    #[test]
    fn test_builder_without_sources() {
        let (spec, host, _) = spec();
        let config = ConfigBuilder::new().named("app").with_spec(spec).build().unwrap();
        assert_eq!(config.name(), "app");
        assert_eq!(config.get(&host).unwrap(), "localhost");
    }

    #[test]
    fn test_later_sources_override_earlier() {
        let (spec, host, port) = spec();
        let config = ConfigBuilder::new()
            .with_spec(spec)
            .with_source(FlatMapSource::new([("server.port", "8080"), ("server.host", "a")]))
            .with_source(KvSource::new([("server.port", 9090)]))
            .build()
            .unwrap();
        assert_eq!(config.get(&port).unwrap(), 9090);
        assert_eq!(config.get(&host).unwrap(), "a");
        assert_eq!(config.parent().and_then(Config::parent).map(Config::name), Some("config"));
    }

    #[test]
    fn test_repeated_spec_fails() {
        let (spec, _, _) = spec();
        let error = ConfigBuilder::new()
            .with_spec(spec.clone())
            .with_spec(spec)
            .build()
            .unwrap_err();
        assert!(matches!(
            error,
            ConfigError::Registration(RegistrationError::RepeatedItem { .. })
        ));
    }

    #[test]
    fn test_failing_source_fails_build() {
        let (spec, _, _) = spec();
        let error = ConfigBuilder::new()
            .with_spec(spec)
            .with_source(FlatMapSource::new([("server.port", "http")]))
            .build()
            .unwrap_err();
        assert!(matches!(error, ConfigError::Source(SourceError::LoadError { .. })));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_str_source() {
        let (spec, host, port) = spec();
        let config = ConfigBuilder::new()
            .with_spec(spec)
            .with_yaml_str("server:\n  host: example.com\n  port: 443\n")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.get(&host).unwrap(), "example.com");
        assert_eq!(config.get(&port).unwrap(), 443);
    }

    #[cfg(all(feature = "cli", feature = "yaml"))]
    #[test]
    fn test_cli_overrides_yaml() {
        let (spec, _, port) = spec();
        let config = ConfigBuilder::new()
            .with_spec(spec)
            .with_yaml_str("server:\n  port: 443\n")
            .unwrap()
            .with_cli_args(vec!["--server.port=8443"])
            .build()
            .unwrap();
        assert_eq!(config.get(&port).unwrap(), 8443);
    }
}
