//! Layer class registry.
//!
//! Maps class names to constructors so graphs can be built from
//! [`GraphConfig`] files and layers can be restored from archives.

use crate::archive::{ArchiveError, ArchiveReader, ArchiveWriter};
use crate::gather::{gather_factory, GATHER_CLASS_NAME};
use crate::layer::Layer;
use blobnet_core::config::{GraphConfig, LayerConfig};
use blobnet_core::error::ConfigError;
use blobnet_kernels::MathEngine;
use indexmap::IndexMap;

/// Constructor of a boxed layer from its configuration entry.
pub type LayerFactory<E> = fn(&LayerConfig) -> Box<dyn Layer<E>>;

/// Class-name keyed layer constructors, in registration order.
pub struct LayerRegistry<E: MathEngine + 'static> {
    factories: IndexMap<&'static str, LayerFactory<E>>,
}

impl<E: MathEngine + 'static> LayerRegistry<E> {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Registry with every layer class shipped by this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(GATHER_CLASS_NAME, gather_factory::<E>);
        registry
    }

    /// Register `factory` under `class_name`, replacing a previous entry.
    pub fn register(&mut self, class_name: &'static str, factory: LayerFactory<E>) {
        if self.factories.insert(class_name, factory).is_some() {
            log::warn!("layer class '{}' registered twice", class_name);
        }
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.factories.contains_key(class_name)
    }

    pub fn class_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Build a single layer from its configuration entry.
    pub fn create(&self, config: &LayerConfig) -> Result<Box<dyn Layer<E>>, ConfigError> {
        let factory = self
            .factories
            .get(config.kind.as_str())
            .ok_or_else(|| ConfigError::UnknownLayerKind(config.kind.clone()))?;
        log::debug!("creating {} layer '{}'", config.kind, config.name);
        Ok(factory(config))
    }

    /// Build every layer of `graph`, keyed by layer name in file order.
    pub fn build_graph(
        &self,
        graph: &GraphConfig,
    ) -> Result<IndexMap<String, Box<dyn Layer<E>>>, ConfigError> {
        let mut layers = IndexMap::with_capacity(graph.layers.len());
        for config in &graph.layers {
            let layer = self.create(config)?;
            if layers.insert(config.name.clone(), layer).is_some() {
                return Err(ConfigError::DuplicateLayerName(config.name.clone()));
            }
        }
        Ok(layers)
    }

    /// Write the layer's class name followed by its own section.
    pub fn save_layer(
        &self,
        layer: &dyn Layer<E>,
        archive: &mut ArchiveWriter<'_>,
    ) -> Result<(), ArchiveError> {
        archive.write(layer.class_name())?;
        layer.save(archive)
    }

    /// Read a layer written by [`save_layer`](Self::save_layer).
    pub fn load_layer(
        &self,
        archive: &mut ArchiveReader<'_>,
    ) -> Result<Box<dyn Layer<E>>, ArchiveError> {
        let class_name: String = archive.read()?;
        let factory = self
            .factories
            .get(class_name.as_str())
            .ok_or_else(|| ArchiveError::UnknownClass(class_name.clone()))?;

        // Name and settings are overwritten by the archived section
        let mut layer = factory(&LayerConfig::new("", class_name.as_str()));
        layer.load(archive)?;
        log::debug!("loaded {} layer '{}'", class_name, layer.name());
        Ok(layer)
    }
}

impl<E: MathEngine + 'static> Default for LayerRegistry<E> {
    fn default() -> Self {
        Self::with_builtin()
    }
}
