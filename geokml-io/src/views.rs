use geokml_core::enums::AltitudeMode;

use crate::base::{KmlContext, KmlObject, ObjectIds, WriteOptions};
use crate::codec::{
    ObjectChoice, Registration, read_enum_node, read_float_node, write_enum_node,
    write_float_node,
};
use crate::errors::KmlError;
use crate::validation::{
    HEADING_RANGE, LATITUDE_RANGE, LONGITUDE_RANGE, ROTATION_RANGE, ValidationError,
    validate_non_negative, validate_range,
};
use crate::xml::Element;

/// Camera 与 LookAt 共享的视点字段，角度单位为度。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Viewpoint {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub altitude: Option<f64>,
    pub heading: Option<f64>,
    pub tilt: Option<f64>,
}

impl Viewpoint {
    pub fn set_longitude(&mut self, value: f64) -> Result<(), ValidationError> {
        self.longitude = Some(validate_range("longitude", value, LONGITUDE_RANGE)?);
        Ok(())
    }

    pub fn set_latitude(&mut self, value: f64) -> Result<(), ValidationError> {
        self.latitude = Some(validate_range("latitude", value, LATITUDE_RANGE)?);
        Ok(())
    }

    pub fn set_heading(&mut self, value: f64) -> Result<(), ValidationError> {
        self.heading = Some(validate_range("heading", value, HEADING_RANGE)?);
        Ok(())
    }

    fn write(&self, element: &mut Element, context: &KmlContext, options: &WriteOptions) {
        write_float_node(element, context, "longitude", self.longitude, options);
        write_float_node(element, context, "latitude", self.latitude, options);
        write_float_node(element, context, "altitude", self.altitude, options);
        write_float_node(element, context, "heading", self.heading, options);
        write_float_node(element, context, "tilt", self.tilt, options);
    }

    fn read(element: &Element, context: &KmlContext) -> Result<Self, KmlError> {
        Ok(Self {
            longitude: read_float_node(element, context, "longitude")?,
            latitude: read_float_node(element, context, "latitude")?,
            altitude: read_float_node(element, context, "altitude")?,
            heading: read_float_node(element, context, "heading")?,
            tilt: read_float_node(element, context, "tilt")?,
        })
    }
}

/// 相机视角：描述观察者所在位置与朝向。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Camera {
    pub context: KmlContext,
    pub ids: ObjectIds,
    pub viewpoint: Viewpoint,
    pub roll: Option<f64>,
    pub altitude_mode: Option<AltitudeMode>,
}

impl Camera {
    /// 相机俯仰角范围 0–180 度。
    pub fn set_tilt(&mut self, value: f64) -> Result<(), ValidationError> {
        self.viewpoint.tilt = Some(validate_range("tilt", value, (0.0, 180.0))?);
        Ok(())
    }

    pub fn set_roll(&mut self, value: f64) -> Result<(), ValidationError> {
        self.roll = Some(validate_range("roll", value, ROTATION_RANGE)?);
        Ok(())
    }
}

impl KmlObject for Camera {
    const TAG_NAME: &'static str = "Camera";

    fn context(&self) -> &KmlContext {
        &self.context
    }

    fn write_fields(&self, element: &mut Element, options: &WriteOptions) {
        self.ids.write(element);
        self.viewpoint.write(element, &self.context, options);
        write_float_node(element, &self.context, "roll", self.roll, options);
        write_enum_node(element, &self.context, "altitudeMode", self.altitude_mode, options);
    }

    fn from_element(
        element: &Element,
        context: &KmlContext,
        strict: bool,
    ) -> Result<Self, KmlError> {
        Ok(Self {
            context: context.clone(),
            ids: ObjectIds::read(element),
            viewpoint: Viewpoint::read(element, context)?,
            roll: read_float_node(element, context, "roll")?,
            altitude_mode: read_enum_node(element, context, "altitudeMode", strict)?,
        })
    }
}

/// 注视视角：以目标点为中心，按距离与方位描述观察者。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookAt {
    pub context: KmlContext,
    pub ids: ObjectIds,
    pub viewpoint: Viewpoint,
    /// 与目标点的距离（米）。
    pub range: Option<f64>,
    pub altitude_mode: Option<AltitudeMode>,
}

impl LookAt {
    /// LookAt 俯仰角范围 0–90 度。
    pub fn set_tilt(&mut self, value: f64) -> Result<(), ValidationError> {
        self.viewpoint.tilt = Some(validate_range("tilt", value, (0.0, 90.0))?);
        Ok(())
    }

    pub fn set_range(&mut self, value: f64) -> Result<(), ValidationError> {
        self.range = Some(validate_non_negative("range", value)?);
        Ok(())
    }
}

impl KmlObject for LookAt {
    const TAG_NAME: &'static str = "LookAt";

    fn context(&self) -> &KmlContext {
        &self.context
    }

    fn write_fields(&self, element: &mut Element, options: &WriteOptions) {
        self.ids.write(element);
        self.viewpoint.write(element, &self.context, options);
        write_float_node(element, &self.context, "range", self.range, options);
        write_enum_node(element, &self.context, "altitudeMode", self.altitude_mode, options);
    }

    fn from_element(
        element: &Element,
        context: &KmlContext,
        strict: bool,
    ) -> Result<Self, KmlError> {
        Ok(Self {
            context: context.clone(),
            ids: ObjectIds::read(element),
            viewpoint: Viewpoint::read(element, context)?,
            range: read_float_node(element, context, "range")?,
            altitude_mode: read_enum_node(element, context, "altitudeMode", strict)?,
        })
    }
}

/// Feature 的视角槽位：Camera 或 LookAt 二选一。
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Camera(Camera),
    LookAt(LookAt),
}

fn build_camera(element: &Element, context: &KmlContext, strict: bool) -> Result<View, KmlError> {
    Camera::from_element(element, context, strict).map(View::Camera)
}

fn build_look_at(element: &Element, context: &KmlContext, strict: bool) -> Result<View, KmlError> {
    LookAt::from_element(element, context, strict).map(View::LookAt)
}

impl ObjectChoice for View {
    const REGISTRY: &'static [Registration<Self>] = &[
        Registration {
            tag: Camera::TAG_NAME,
            build: build_camera,
        },
        Registration {
            tag: LookAt::TAG_NAME,
            build: build_look_at,
        },
    ];

    fn to_element(&self, options: &WriteOptions) -> Element {
        match self {
            View::Camera(camera) => camera.to_element(options),
            View::LookAt(look_at) => look_at.to_element(options),
        }
    }
}
