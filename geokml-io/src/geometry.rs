use geokml_core::enums::AltitudeMode;
use geokml_core::geometry::{Coordinate, Coordinates, DEFAULT_COORDINATE_PRECISION};
use tracing::debug;

use crate::base::{KmlContext, KmlObject, ObjectIds, WriteOptions};
use crate::codec::{read_bool_node, read_enum_node, write_bool_node, write_enum_node};
use crate::errors::KmlError;
use crate::xml::Element;

/// 点几何。坐标为必需内容：严格模式下缺失或无效即报错，宽松模式下记为缺失。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub context: KmlContext,
    pub ids: ObjectIds,
    pub extrude: Option<bool>,
    pub altitude_mode: Option<AltitudeMode>,
    pub coordinate: Option<Coordinate>,
}

impl Point {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
            ..Self::default()
        }
    }
}

impl KmlObject for Point {
    const TAG_NAME: &'static str = "Point";

    fn context(&self) -> &KmlContext {
        &self.context
    }

    /// 没有坐标的点不输出。
    fn is_present(&self) -> bool {
        self.coordinate.is_some()
    }

    fn write_fields(&self, element: &mut Element, options: &WriteOptions) {
        let ctx = &self.context;
        self.ids.write(element);
        write_bool_node(element, ctx, "extrude", self.extrude);
        write_enum_node(element, ctx, "altitudeMode", self.altitude_mode, options);
        if let Some(coordinate) = self.coordinate {
            let precision = options.precision.unwrap_or(DEFAULT_COORDINATE_PRECISION);
            element
                .sub_element(ctx.tag("coordinates"))
                .set_text(coordinate.to_text(precision));
        }
    }

    fn from_element(
        element: &Element,
        context: &KmlContext,
        strict: bool,
    ) -> Result<Self, KmlError> {
        let text = element
            .find(&context.tag("coordinates"))
            .and_then(Element::text)
            .unwrap_or_default();
        let coordinate = match Coordinates::parse_single(text) {
            Ok(coordinate) => Some(coordinate),
            Err(err) if strict => {
                return Err(KmlError::parse("coordinates", element, context, err));
            }
            Err(err) => {
                debug!(error = %err, "宽松模式下忽略无效坐标");
                None
            }
        };
        Ok(Self {
            context: context.clone(),
            ids: ObjectIds::read(element),
            extrude: read_bool_node(element, context, "extrude", strict)?,
            altitude_mode: read_enum_node(element, context, "altitudeMode", strict)?,
            coordinate,
        })
    }
}
