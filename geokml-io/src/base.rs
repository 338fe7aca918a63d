use std::collections::BTreeMap;

use geokml_core::enums::Verbosity;

use crate::codec::{read_text_attribute, write_text_attribute};
use crate::errors::KmlError;
use crate::xml::Element;

pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
pub const GX_NAMESPACE: &str = "http://www.google.com/kml/ext/2.2";
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// 实体的命名空间上下文：`ns` 为 `{uri}` 形式的限定前缀（可为空串），
/// `name_spaces` 为别名到 URI 的映射，仅在输出时用于生成前缀。
#[derive(Debug, Clone, PartialEq)]
pub struct KmlContext {
    pub ns: String,
    pub name_spaces: BTreeMap<String, String>,
}

impl KmlContext {
    pub fn new(ns: impl Into<String>) -> Self {
        Self {
            ns: ns.into(),
            name_spaces: default_name_spaces(),
        }
    }

    pub fn with_name_spaces(mut self, name_spaces: BTreeMap<String, String>) -> Self {
        self.name_spaces = name_spaces;
        self
    }

    /// 生成限定标签名。
    #[inline]
    pub fn tag(&self, local: &str) -> String {
        format!("{}{local}", self.ns)
    }
}

impl Default for KmlContext {
    fn default() -> Self {
        Self::new(default_ns())
    }
}

pub fn default_ns() -> String {
    format!("{{{KML_NAMESPACE}}}")
}

pub fn default_name_spaces() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("kml".to_string(), KML_NAMESPACE.to_string()),
        ("gx".to_string(), GX_NAMESPACE.to_string()),
        ("atom".to_string(), ATOM_NAMESPACE.to_string()),
    ])
}

/// 输出参数：浮点精度、详略程度与是否缩进。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub precision: Option<usize>,
    pub verbosity: Verbosity,
    pub pretty: bool,
}

impl WriteOptions {
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

/// 所有实体种类共享的映射契约。
///
/// 实现方只需提供 [`KmlObject::write_fields`]（按方言规定的固定顺序写出子元素）
/// 与 [`KmlObject::from_element`]，其余操作由默认方法组合完成。
pub trait KmlObject: Sized {
    /// 方言固定的非限定标签名。
    const TAG_NAME: &'static str;

    fn context(&self) -> &KmlContext;

    fn write_fields(&self, element: &mut Element, options: &WriteOptions);

    fn from_element(element: &Element, context: &KmlContext, strict: bool)
    -> Result<Self, KmlError>;

    /// 复合记录覆盖此方法以实现“全有或全无”规则。
    fn is_present(&self) -> bool {
        true
    }

    fn tag_name(&self) -> &'static str {
        Self::TAG_NAME
    }

    fn to_element(&self, options: &WriteOptions) -> Element {
        let mut element = Element::new(self.context().tag(Self::TAG_NAME));
        self.write_fields(&mut element, options);
        element
    }

    /// `ns` 为 `None` 时使用 KML 默认命名空间。
    fn from_text(text: &str, ns: Option<&str>, strict: bool) -> Result<Self, KmlError> {
        let context = ns.map(KmlContext::new).unwrap_or_default();
        Self::from_text_with_context(text, &context, strict)
    }

    /// 根元素标签不匹配时，退而查找第一个匹配的后代元素。
    fn from_text_with_context(
        text: &str,
        context: &KmlContext,
        strict: bool,
    ) -> Result<Self, KmlError> {
        let root = Element::parse(text)?;
        let tag = context.tag(Self::TAG_NAME);
        let element = if root.name() == tag {
            &root
        } else {
            root.find_descendant(&tag)
                .ok_or_else(|| KmlError::MissingElement { tag: tag.clone() })?
        };
        Self::from_element(element, context, strict)
    }

    fn to_text(&self, options: &WriteOptions) -> Result<String, KmlError> {
        Ok(self
            .to_element(options)
            .render(&self.context().name_spaces, options.pretty)?)
    }
}

/// 对象标识属性 `id` 与 `targetId`，以 XML 属性而非子元素表示。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectIds {
    pub id: Option<String>,
    pub target_id: Option<String>,
}

impl ObjectIds {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            target_id: None,
        }
    }

    pub fn write(&self, element: &mut Element) {
        write_text_attribute(element, "id", self.id.as_deref());
        write_text_attribute(element, "targetId", self.target_id.as_deref());
    }

    pub fn read(element: &Element) -> Self {
        Self {
            id: read_text_attribute(element, "id"),
            target_id: read_text_attribute(element, "targetId"),
        }
    }
}
