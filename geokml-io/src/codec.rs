//! 字段编解码函数：每种基本类型一对写出/读取函数。
//!
//! 写出函数遵循统一的“空值省略”规则：值缺失（或文本为空）时不创建子元素。
//! 读取函数在子元素缺失或文本为空白时返回 `Ok(None)`，严格模式下亦然。

use std::fmt::Display;
use std::str::FromStr;

use geokml_core::enums::{KmlEnum, Verbosity};
use tracing::debug;

use crate::base::{KmlContext, KmlObject, WriteOptions};
use crate::errors::KmlError;
use crate::xml::Element;

pub fn write_text_node(element: &mut Element, context: &KmlContext, node: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        element.sub_element(context.tag(node)).set_text(value);
    }
}

pub fn write_bool_node(element: &mut Element, context: &KmlContext, node: &str, value: Option<bool>) {
    if let Some(value) = value {
        let text = if value { "1" } else { "0" };
        element.sub_element(context.tag(node)).set_text(text);
    }
}

pub fn write_int_node<T: Display>(
    element: &mut Element,
    context: &KmlContext,
    node: &str,
    value: Option<T>,
) {
    if let Some(value) = value {
        element.sub_element(context.tag(node)).set_text(value.to_string());
    }
}

pub fn write_float_node(
    element: &mut Element,
    context: &KmlContext,
    node: &str,
    value: Option<f64>,
    options: &WriteOptions,
) {
    if let Some(value) = value {
        element
            .sub_element(context.tag(node))
            .set_text(format_float(value, options.precision));
    }
}

/// 未指定精度时采用最短可往返表示（`100.0` 输出为 `100`）。
pub fn format_float(value: f64, precision: Option<usize>) -> String {
    match precision {
        Some(precision) => format!("{value:.precision$}"),
        None => value.to_string(),
    }
}

/// 枚举字段：`Verbose` 时为缺失字段补写方言缺省值，`Terse` 时省略等于缺省值的字段。
pub fn write_enum_node<E: KmlEnum>(
    element: &mut Element,
    context: &KmlContext,
    node: &str,
    value: Option<E>,
    options: &WriteOptions,
) {
    let value = match (value, options.verbosity) {
        (Some(value), Verbosity::Terse) if Some(value) == E::DEFAULT => None,
        (None, Verbosity::Verbose) => E::DEFAULT,
        (value, _) => value,
    };
    if let Some(value) = value {
        element.sub_element(context.tag(node)).set_text(value.token());
    }
}

/// 嵌套实体：仅在子实体“存在”时追加其子树。
pub fn write_object<T: KmlObject>(element: &mut Element, value: Option<&T>, options: &WriteOptions) {
    if let Some(value) = value.filter(|value| value.is_present()) {
        element.append(value.to_element(options));
    }
}

pub fn write_text_attribute(element: &mut Element, name: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        element.set_attribute(name, value);
    }
}

/// 返回第一个匹配子元素及其去除首尾空白后的非空文本。
pub(crate) fn node_text<'a>(
    element: &'a Element,
    context: &KmlContext,
    node: &str,
) -> Option<(&'a Element, &'a str)> {
    let child = element.find(&context.tag(node))?;
    let text = child.text()?.trim();
    if text.is_empty() { None } else { Some((child, text)) }
}

pub fn read_text_node(element: &Element, context: &KmlContext, node: &str) -> Option<String> {
    node_text(element, context, node).map(|(_, text)| text.to_string())
}

/// 严格模式要求整数字面量（非零即真）；宽松模式接受 `1/0/true/false`（忽略大小写），
/// 其他文本视为缺失。
pub fn read_bool_node(
    element: &Element,
    context: &KmlContext,
    node: &str,
    strict: bool,
) -> Result<Option<bool>, KmlError> {
    let Some((child, text)) = node_text(element, context, node) else {
        return Ok(None);
    };
    if strict {
        return integer_truth(text)
            .map(Some)
            .ok_or_else(|| KmlError::parse(node, child, context, "not an integer literal"));
    }
    match text.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(Some(true)),
        "0" | "false" => Ok(Some(false)),
        _ => {
            debug!(node, text, "宽松模式下忽略无法识别的布尔值");
            Ok(None)
        }
    }
}

/// 可选正负号后跟至少一位数字；不限位数，任一位非零即为真。
fn integer_truth(text: &str) -> Option<bool> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.bytes().any(|b| b != b'0'))
}

/// 数值字段在两种模式下都不会被静默丢弃。
pub fn read_int_node<T>(
    element: &Element,
    context: &KmlContext,
    node: &str,
) -> Result<Option<T>, KmlError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some((child, text)) = node_text(element, context, node) else {
        return Ok(None);
    };
    text.parse::<T>()
        .map(Some)
        .map_err(|err| KmlError::parse(node, child, context, err))
}

pub fn read_float_node(
    element: &Element,
    context: &KmlContext,
    node: &str,
) -> Result<Option<f64>, KmlError> {
    let Some((child, text)) = node_text(element, context, node) else {
        return Ok(None);
    };
    text.parse::<f64>()
        .map(Some)
        .map_err(|err| KmlError::parse(node, child, context, err))
}

/// 严格模式精确匹配并对未知标记报错；宽松模式忽略大小写，无法识别时视为缺失。
pub fn read_enum_node<E: KmlEnum>(
    element: &Element,
    context: &KmlContext,
    node: &str,
    strict: bool,
) -> Result<Option<E>, KmlError> {
    let Some((child, text)) = node_text(element, context, node) else {
        return Ok(None);
    };
    if strict {
        return E::from_token(text)
            .map(Some)
            .map_err(|err| KmlError::parse(node, child, context, err));
    }
    match E::from_token_relaxed(text) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            debug!(node, error = %err, "宽松模式下忽略无效枚举值");
            Ok(None)
        }
    }
}

pub fn read_object<T: KmlObject>(
    element: &Element,
    context: &KmlContext,
    strict: bool,
) -> Result<Option<T>, KmlError> {
    match element.find(&context.tag(T::TAG_NAME)) {
        Some(child) => T::from_element(child, context, strict).map(Some),
        None => Ok(None),
    }
}

pub fn read_text_attribute(element: &Element, name: &str) -> Option<String> {
    element
        .attribute(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// 按限定标签名登记的构造函数，用于多选一字段与异构子元素列表。
pub struct Registration<T> {
    pub tag: &'static str,
    pub build: fn(&Element, &KmlContext, bool) -> Result<T, KmlError>,
}

/// 多选一（联合类型）字段，例如 Feature 的视角槽位可容纳 Camera 或 LookAt。
pub trait ObjectChoice: Sized + 'static {
    const REGISTRY: &'static [Registration<Self>];

    fn to_element(&self, options: &WriteOptions) -> Element;

    fn is_present(&self) -> bool {
        true
    }

    fn registration_for(element: &Element, context: &KmlContext) -> Option<&'static Registration<Self>> {
        Self::REGISTRY
            .iter()
            .find(|registration| element.name() == context.tag(registration.tag))
    }
}

pub fn write_choice<U: ObjectChoice>(element: &mut Element, value: Option<&U>, options: &WriteOptions) {
    if let Some(value) = value.filter(|value| value.is_present()) {
        element.append(value.to_element(options));
    }
}

/// 取第一个能在注册表中找到构造函数的子元素。
pub fn read_choice<U: ObjectChoice>(
    element: &Element,
    context: &KmlContext,
    strict: bool,
) -> Result<Option<U>, KmlError> {
    for child in element.children() {
        if let Some(registration) = U::registration_for(child, context) {
            return (registration.build)(child, context, strict).map(Some);
        }
    }
    Ok(None)
}

/// 依次构造所有已登记种类的子元素，未登记的标签被跳过。
pub fn read_choices<U: ObjectChoice>(
    element: &Element,
    context: &KmlContext,
    strict: bool,
) -> Result<Vec<U>, KmlError> {
    let mut values = Vec::new();
    for child in element.children() {
        match U::registration_for(child, context) {
            Some(registration) => values.push((registration.build)(child, context, strict)?),
            None => debug!(tag = child.name(), "跳过未登记的子元素"),
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geokml_core::enums::{AltitudeMode, Shape};

    fn context() -> KmlContext {
        KmlContext::new("")
    }

    fn parse(text: &str) -> Element {
        Element::parse(text).expect("测试标记应当合法")
    }

    #[test]
    fn writers_omit_absent_values() {
        let ctx = context();
        let options = WriteOptions::default();
        let mut element = Element::new("x");
        write_text_node(&mut element, &ctx, "name", None);
        write_text_node(&mut element, &ctx, "name", Some(""));
        write_bool_node(&mut element, &ctx, "open", None);
        write_int_node::<i32>(&mut element, &ctx, "drawOrder", None);
        write_float_node(&mut element, &ctx, "altitude", None, &options);
        write_enum_node::<Shape>(&mut element, &ctx, "shape", None, &options);
        assert!(element.children().is_empty());
    }

    #[test]
    fn writers_emit_canonical_text() {
        let ctx = context();
        let options = WriteOptions::default();
        let mut element = Element::new("x");
        write_bool_node(&mut element, &ctx, "visibility", Some(false));
        write_int_node(&mut element, &ctx, "drawOrder", Some(3));
        write_float_node(&mut element, &ctx, "altitude", Some(100.0), &options);
        write_float_node(&mut element, &ctx, "rotation", Some(1.5), &options.with_precision(3));
        write_enum_node(&mut element, &ctx, "altitudeMode", Some(AltitudeMode::Absolute), &options);
        let texts: Vec<(&str, &str)> = element
            .children()
            .iter()
            .map(|child| (child.name(), child.text().unwrap_or_default()))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("visibility", "0"),
                ("drawOrder", "3"),
                ("altitude", "100"),
                ("rotation", "1.500"),
                ("altitudeMode", "absolute"),
            ]
        );
    }

    #[test]
    fn enum_writer_honours_verbosity() {
        let ctx = context();
        let mut element = Element::new("x");
        let verbose = WriteOptions::default().with_verbosity(Verbosity::Verbose);
        let terse = WriteOptions::default().with_verbosity(Verbosity::Terse);
        write_enum_node::<Shape>(&mut element, &ctx, "shape", None, &verbose);
        write_enum_node(&mut element, &ctx, "shape", Some(Shape::Rectangle), &terse);
        write_enum_node(&mut element, &ctx, "shape", Some(Shape::Sphere), &terse);
        let texts: Vec<&str> = element.children().iter().filter_map(Element::text).collect();
        assert_eq!(texts, vec!["rectangle", "sphere"]);
    }

    #[test]
    fn missing_or_blank_nodes_are_absent_even_when_strict() {
        let ctx = context();
        let element = parse("<x><drawOrder>  </drawOrder><shape/></x>");
        assert_eq!(read_int_node::<i32>(&element, &ctx, "drawOrder").unwrap(), None);
        assert_eq!(read_float_node(&element, &ctx, "altitude").unwrap(), None);
        assert_eq!(read_enum_node::<Shape>(&element, &ctx, "shape", true).unwrap(), None);
        assert_eq!(read_bool_node(&element, &ctx, "open", true).unwrap(), None);
        assert_eq!(read_text_node(&element, &ctx, "name"), None);
    }

    #[test]
    fn bool_reader_strict_and_lenient() {
        let ctx = context();
        let element = parse("<x><a>2</a><b>TRUE</b><c>false</c><d>maybe</d></x>");
        assert_eq!(read_bool_node(&element, &ctx, "a", true).unwrap(), Some(true));
        assert!(read_bool_node(&element, &ctx, "b", true).is_err());
        assert_eq!(read_bool_node(&element, &ctx, "b", false).unwrap(), Some(true));
        assert_eq!(read_bool_node(&element, &ctx, "c", false).unwrap(), Some(false));
        assert_eq!(read_bool_node(&element, &ctx, "d", false).unwrap(), None);
        assert_eq!(read_bool_node(&element, &ctx, "a", false).unwrap(), None);
    }

    #[test]
    fn strict_bool_accepts_integer_literals_of_any_length() {
        let ctx = context();
        let element = parse(
            "<x><a>0000000000000000000000001</a><b>-0000000000000000000000000</b>\
             <c>123456789012345678901234567890</c><d>+0</d><e>-</e><f>1.0</f><g>0x1</g></x>",
        );
        assert_eq!(read_bool_node(&element, &ctx, "a", true).unwrap(), Some(true));
        assert_eq!(read_bool_node(&element, &ctx, "b", true).unwrap(), Some(false));
        assert_eq!(read_bool_node(&element, &ctx, "c", true).unwrap(), Some(true));
        assert_eq!(read_bool_node(&element, &ctx, "d", true).unwrap(), Some(false));
        for node in ["e", "f", "g"] {
            let err = read_bool_node(&element, &ctx, node, true).unwrap_err();
            assert_eq!(err.node(), Some(node));
        }
    }

    #[test]
    fn numeric_failures_are_errors_in_both_modes() {
        let ctx = context();
        let element = parse("<x><drawOrder>three</drawOrder><altitude>high</altitude></x>");
        let err = read_int_node::<i32>(&element, &ctx, "drawOrder").unwrap_err();
        assert_eq!(err.node(), Some("drawOrder"));
        match err {
            KmlError::Parse { element, .. } => assert_eq!(element, "<drawOrder>three</drawOrder>"),
            other => panic!("意外的错误类型: {other:?}"),
        }
        assert!(read_float_node(&element, &ctx, "altitude").is_err());
    }

    #[test]
    fn enum_reader_strict_and_lenient() {
        let ctx = context();
        let element = parse("<x><shape>invalid</shape><mode>ABSOLUTE</mode></x>");
        let err = read_enum_node::<Shape>(&element, &ctx, "shape", true).unwrap_err();
        assert_eq!(err.node(), Some("shape"));
        assert!(err.to_string().contains("invalid"));
        assert_eq!(read_enum_node::<Shape>(&element, &ctx, "shape", false).unwrap(), None);
        assert!(read_enum_node::<AltitudeMode>(&element, &ctx, "mode", true).is_err());
        assert_eq!(
            read_enum_node::<AltitudeMode>(&element, &ctx, "mode", false).unwrap(),
            Some(AltitudeMode::Absolute)
        );
    }

    #[test]
    fn readers_respect_namespace() {
        let ctx = KmlContext::default();
        let element = parse(
            r#"<x xmlns="http://www.opengis.net/kml/2.2"><name> Alpha </name></x>"#,
        );
        assert_eq!(read_text_node(&element, &ctx, "name").as_deref(), Some("Alpha"));
        assert_eq!(read_text_node(&element, &context(), "name"), None);
    }
}
