use std::fmt::Display;

use thiserror::Error;
use tracing::debug;

use crate::base::KmlContext;
use crate::xml::{Element, XmlError};

#[derive(Debug, Error)]
pub enum KmlError {
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("invalid <{node}> in '{element}': {reason}")]
    Parse {
        node: String,
        element: String,
        reason: String,
    },
    #[error("no <{tag}> element found")]
    MissingElement { tag: String },
}

impl KmlError {
    /// 构造结构化解析错误，附带出错元素的序列化文本。
    pub(crate) fn parse(
        node: &str,
        element: &Element,
        context: &KmlContext,
        reason: impl Display,
    ) -> Self {
        let rendered = element
            .render(&context.name_spaces, false)
            .unwrap_or_else(|err| {
                debug!(error = %err, "无法序列化出错元素，改用元素名");
                element.name().to_string()
            });
        Self::Parse {
            node: node.to_string(),
            element: rendered,
            reason: reason.to_string(),
        }
    }

    /// 解析错误涉及的字段名。
    pub fn node(&self) -> Option<&str> {
        match self {
            Self::Parse { node, .. } => Some(node),
            _ => None,
        }
    }
}
