// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading sources into a config.

use crate::domain::errors::SourceError;
use crate::domain::item::AnyItem;
use crate::ports::Source;
use crate::service::coerce::coerce;
use crate::service::config::Config;

/// The outcome of [`Config::try_load`].
///
/// Loading is best effort: items listed in `loaded` keep their new values
/// even when other items failed.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Items whose values were read from the source
    pub loaded: Vec<AnyItem>,
    /// One `LoadError` per item that the source holds but could not be
    /// stored
    pub failures: Vec<SourceError>,
}

impl LoadReport {
    /// Returns `true` if no item failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the first failure, if any.
    pub fn into_result(self) -> Result<(), SourceError> {
        match self.failures.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Config {
    /// Reads every registered item found in `source` into the config.
    ///
    /// Items are visited in [`Config::iter`] order. Items missing from the
    /// source are skipped. A failing item is reported and does not stop
    /// the rest from loading.
    pub fn try_load(&self, source: &dyn Source) -> LoadReport {
        let mut report = LoadReport::default();
        for item in self.iter() {
            let path = item.path().segments();
            if !source.contains(path) {
                continue;
            }
            match self.load_item(source, &item) {
                Ok(()) => report.loaded.push(item),
                Err(error) => {
                    let error = error.into_load_error(item.name());
                    tracing::warn!("{}", error);
                    report.failures.push(error);
                }
            }
        }
        tracing::debug!(
            "Loaded {} items from {} into layer '{}' ({} failed)",
            report.loaded.len(),
            source.description(),
            self.name(),
            report.failures.len()
        );
        report
    }

    fn load_item(&self, source: &dyn Source, item: &AnyItem) -> Result<(), SourceError> {
        let value = source.get(item.path().segments())?;
        let value = coerce(value.as_ref(), item.descriptor())?;
        self.raw_set(item, value)?;
        Ok(())
    }

    /// Reads every registered item found in `source` into the config.
    ///
    /// Everything that can be loaded is loaded before an error is returned.
    ///
    /// # Errors
    ///
    /// The first `LoadError`, naming the item and the underlying failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use layercfg::adapters::FlatMapSource;
    /// use layercfg::domain::spec::ConfigSpec;
    /// use layercfg::service::Config;
    ///
    /// let mut spec = ConfigSpec::new("server");
    /// let port = spec.optional::<u16>("port", 80, "listen port").unwrap();
    /// let config = Config::new();
    /// config.add_spec(&spec).unwrap();
    ///
    /// config.load(&FlatMapSource::new([("server.port", "8080")])).unwrap();
    /// assert_eq!(config.get(&port).unwrap(), 8080);
    /// ```
    pub fn load(&self, source: &dyn Source) -> Result<(), SourceError> {
        self.try_load(source).into_result()
    }

    /// Creates a child layer named after `source` and loads `source` into
    /// it.
    pub fn with_source(&self, source: &dyn Source) -> Result<Config, SourceError> {
        let layer = self.with_layer(format!("source: {}", source.description()));
        layer.load(source)?;
        Ok(layer)
    }
}
