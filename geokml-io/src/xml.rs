use std::collections::BTreeMap;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Writer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed markup: {0}")]
    Syntax(#[from] quick_xml::Error),
    #[error("markup is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("markup contains no root element")]
    Empty,
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("closing tag without a matching opening tag")]
    UnexpectedEnd,
    #[error("content found outside the root element")]
    OutsideRoot,
}

/// 标记树节点。名称采用 Clark 记法：`{uri}local`，无命名空间时即为本地名。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 去掉 `{uri}` 前缀后的本地名。
    pub fn local_name(&self) -> &str {
        match self.name.split_once('}') {
            Some((_, local)) if self.name.starts_with('{') => local,
            _ => &self.name,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        let rest = self.name.strip_prefix('{')?;
        rest.split_once('}').map(|(uri, _)| uri)
    }

    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(name, _)| *name == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    #[inline]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// 查找第一个名称完全匹配的直接子元素。
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// 深度优先（先序）查找后代元素，不包含自身。
    pub fn find_descendant(&self, name: &str) -> Option<&Element> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn append(&mut self, child: Element) {
        self.children.push(child);
    }

    /// 追加一个新的空子元素并返回其可变引用。
    pub fn sub_element(&mut self, name: impl Into<String>) -> &mut Element {
        let index = self.children.len();
        self.children.push(Element::new(name));
        &mut self.children[index]
    }

    fn push_text(&mut self, fragment: &str) {
        match &mut self.text {
            Some(text) => text.push_str(fragment),
            None => self.text = Some(fragment.to_string()),
        }
    }

    /// 解析标记文本，返回根元素。
    pub fn parse(source: &str) -> Result<Element, XmlError> {
        let mut reader = NsReader::from_str(source);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (resolved, event) = reader.read_resolved_event()?;
            match event {
                Event::Start(start) => {
                    stack.push(open_element(&resolved, &start)?);
                }
                Event::Empty(start) => {
                    let element = open_element(&resolved, &start)?;
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or(XmlError::UnexpectedEnd)?;
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    match stack.last_mut() {
                        Some(current) => current.push_text(&text),
                        None if text.trim().is_empty() => {}
                        None => return Err(XmlError::OutsideRoot),
                    }
                }
                Event::CData(data) => {
                    let text = std::str::from_utf8(&data)?;
                    match stack.last_mut() {
                        Some(current) => current.push_text(text),
                        None => return Err(XmlError::OutsideRoot),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed(open.name));
        }
        root.ok_or(XmlError::Empty)
    }

    /// 输出标记文本。命名空间按 `name_spaces`（前缀 → URI）映射为前缀，
    /// 声明统一放在根元素上。
    pub fn render(
        &self,
        name_spaces: &BTreeMap<String, String>,
        pretty: bool,
    ) -> Result<String, XmlError> {
        let prefixes = PrefixMap::collect(self, name_spaces);
        let mut writer = if pretty {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        self.write_into(&mut writer, &prefixes, true)?;
        String::from_utf8(writer.into_inner()).map_err(|err| XmlError::Utf8(err.utf8_error()))
    }

    fn write_into(
        &self,
        writer: &mut Writer<Vec<u8>>,
        prefixes: &PrefixMap,
        is_root: bool,
    ) -> Result<(), XmlError> {
        let name = prefixes.display_name(&self.name);
        let mut start = BytesStart::new(name.as_str());
        if is_root {
            for (uri, prefix) in &prefixes.entries {
                let key = format!("xmlns:{prefix}");
                start.push_attribute((key.as_str(), uri.as_str()));
            }
        }
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        let text = self.text.as_deref().filter(|text| !text.is_empty());
        if self.children.is_empty() && text.is_none() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_into(writer, prefixes, false)?;
        }
        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        Ok(())
    }
}

fn open_element(resolved: &ResolveResult<'_>, start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let local_name = start.local_name();
    let local = std::str::from_utf8(local_name.as_ref())?;
    let name = match resolved {
        ResolveResult::Bound(ns) => format!("{{{}}}{local}", std::str::from_utf8(ns.0)?),
        ResolveResult::Unbound => local.to_string(),
        // 未声明的前缀原样保留。
        ResolveResult::Unknown(_) => std::str::from_utf8(start.name().as_ref())?.to_string(),
    };

    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr.unescape_value()?;
        element
            .attributes
            .push((key.to_string(), value.into_owned()));
    }
    Ok(element)
}

fn close_element(
    mut element: Element,
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
) -> Result<(), XmlError> {
    if !element.children.is_empty()
        && element
            .text
            .as_deref()
            .is_some_and(|text| text.trim().is_empty())
    {
        element.text = None;
    }
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(XmlError::OutsideRoot),
    }
    Ok(())
}

/// URI → 前缀映射，按首次出现顺序声明。
struct PrefixMap {
    entries: Vec<(String, String)>,
}

impl PrefixMap {
    fn collect(root: &Element, name_spaces: &BTreeMap<String, String>) -> Self {
        let mut map = Self {
            entries: Vec::new(),
        };
        map.visit(root, name_spaces);
        map
    }

    fn visit(&mut self, element: &Element, name_spaces: &BTreeMap<String, String>) {
        if let Some(uri) = element.namespace() {
            if self.prefix_for(uri).is_none() {
                let prefix = name_spaces
                    .iter()
                    .find(|(prefix, bound)| bound.as_str() == uri && !prefix.is_empty())
                    .map(|(prefix, _)| prefix.clone())
                    .unwrap_or_else(|| self.generated_prefix(name_spaces));
                self.entries.push((uri.to_string(), prefix));
            }
        }
        for child in &element.children {
            self.visit(child, name_spaces);
        }
    }

    fn generated_prefix(&self, name_spaces: &BTreeMap<String, String>) -> String {
        (0..)
            .map(|index| format!("ns{index}"))
            .find(|candidate| {
                !name_spaces.contains_key(candidate)
                    && !self.entries.iter().any(|(_, prefix)| prefix == candidate)
            })
            .unwrap_or_default()
    }

    fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(bound, _)| bound == uri)
            .map(|(_, prefix)| prefix.as_str())
    }

    fn display_name(&self, name: &str) -> String {
        let Some(rest) = name.strip_prefix('{') else {
            return name.to_string();
        };
        match rest.split_once('}') {
            Some((uri, local)) => match self.prefix_for(uri) {
                Some(prefix) => format!("{prefix}:{local}"),
                None => local.to_string(),
            },
            None => name.to_string(),
        }
    }
}
