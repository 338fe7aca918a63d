use geokml_core::enums::{RefreshMode, ViewRefreshMode};

use crate::base::{KmlContext, KmlObject, ObjectIds, WriteOptions};
use crate::codec::{
    read_enum_node, read_float_node, read_text_node, write_enum_node, write_float_node,
    write_text_node,
};
use crate::errors::KmlError;
use crate::xml::Element;

/// 覆盖层所用图像的链接。`href` 缺失时客户端按颜色与范围绘制矩形。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Icon {
    pub context: KmlContext,
    pub ids: ObjectIds,
    pub href: Option<String>,
    pub refresh_mode: Option<RefreshMode>,
    /// 刷新间隔（秒），配合 `onInterval` 使用。
    pub refresh_interval: Option<f64>,
    pub view_refresh_mode: Option<ViewRefreshMode>,
    pub view_refresh_time: Option<f64>,
    pub view_bound_scale: Option<f64>,
    pub view_format: Option<String>,
    pub http_query: Option<String>,
}

impl Icon {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::default()
        }
    }
}

impl KmlObject for Icon {
    const TAG_NAME: &'static str = "Icon";

    fn context(&self) -> &KmlContext {
        &self.context
    }

    fn write_fields(&self, element: &mut Element, options: &WriteOptions) {
        let ctx = &self.context;
        self.ids.write(element);
        write_text_node(element, ctx, "href", self.href.as_deref());
        write_enum_node(element, ctx, "refreshMode", self.refresh_mode, options);
        write_float_node(element, ctx, "refreshInterval", self.refresh_interval, options);
        write_enum_node(element, ctx, "viewRefreshMode", self.view_refresh_mode, options);
        write_float_node(element, ctx, "viewRefreshTime", self.view_refresh_time, options);
        write_float_node(element, ctx, "viewBoundScale", self.view_bound_scale, options);
        write_text_node(element, ctx, "viewFormat", self.view_format.as_deref());
        write_text_node(element, ctx, "httpQuery", self.http_query.as_deref());
    }

    fn from_element(
        element: &Element,
        context: &KmlContext,
        strict: bool,
    ) -> Result<Self, KmlError> {
        Ok(Self {
            context: context.clone(),
            ids: ObjectIds::read(element),
            href: read_text_node(element, context, "href"),
            refresh_mode: read_enum_node(element, context, "refreshMode", strict)?,
            refresh_interval: read_float_node(element, context, "refreshInterval")?,
            view_refresh_mode: read_enum_node(element, context, "viewRefreshMode", strict)?,
            view_refresh_time: read_float_node(element, context, "viewRefreshTime")?,
            view_bound_scale: read_float_node(element, context, "viewBoundScale")?,
            view_format: read_text_node(element, context, "viewFormat"),
            http_query: read_text_node(element, context, "httpQuery"),
        })
    }
}
