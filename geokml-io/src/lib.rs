use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub mod base;
pub mod codec;
pub mod errors;
pub mod features;
pub mod geometry;
pub mod kml;
pub mod links;
pub mod overlays;
pub mod validation;
pub mod views;
pub mod xml;

pub use base::{KmlContext, KmlObject, ObjectIds, WriteOptions};
pub use errors::KmlError;
pub use kml::{Kml, OverlayFeature, load_document};
pub use validation::ValidationError;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Kml(#[from] KmlError),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Kml, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, document: &Kml, path: &Path) -> Result<(), IoError>;
}

/// 文件级读写入口，持有命名空间上下文、解析模式与输出参数。
#[derive(Debug, Clone)]
pub struct KmlFacade {
    pub context: KmlContext,
    pub strict: bool,
    pub options: WriteOptions,
}

impl Default for KmlFacade {
    fn default() -> Self {
        Self {
            context: KmlContext::default(),
            strict: true,
            options: WriteOptions::default(),
        }
    }
}

impl KmlFacade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: KmlContext) -> Self {
        self.context = context;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parse_str(&self, text: &str) -> Result<Kml, KmlError> {
        load_document(text, &self.context, self.strict)
    }

    pub fn render(&self, document: &Kml) -> Result<String, KmlError> {
        document.to_text(&self.options)
    }
}

impl DocumentLoader for KmlFacade {
    fn load(&self, path: &Path) -> Result<Kml, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let document = self.parse_str(&data)?;
        info!(path = %path.display(), features = document.len(), "KML 文档已加载");
        Ok(document)
    }
}

impl DocumentSaver for KmlFacade {
    fn save(&self, document: &Kml, path: &Path) -> Result<(), IoError> {
        let text = self.render(document)?;
        fs::write(path, text).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}
