//! Overlay 实体族：PhotoOverlay、GroundOverlay 及其复合子记录。

use geokml_core::enums::{AltitudeMode, GridOrigin, InvalidEnumValue, KmlEnum, Shape};
use geokml_core::geometry::Bounds2D;
use glam::DVec2;
use tracing::debug;

use crate::base::{KmlContext, KmlObject, ObjectIds, WriteOptions};
use crate::codec::{
    node_text, read_enum_node, read_float_node, read_int_node, read_object, read_text_node, write_enum_node,
    write_float_node, write_int_node, write_object, write_text_node,
};
use crate::errors::KmlError;
use crate::features::Feature;
use crate::geometry::Point;
use crate::links::Icon;
use crate::validation::{
    LATITUDE_RANGE, LONGITUDE_RANGE, ROTATION_RANGE, ValidationError, validate_color,
    validate_non_negative, validate_power_of_two, validate_range,
};
use crate::xml::Element;

/// Overlay 公共字段：在 Feature 字段之后依次输出 color、drawOrder、Icon。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub feature: Feature,
    /// aabbggrr 十六进制颜色。
    pub color: Option<String>,
    pub draw_order: Option<i32>,
    pub icon: Option<Icon>,
}

impl Overlay {
    pub fn set_color(&mut self, color: &str) -> Result<(), ValidationError> {
        validate_color(color)?;
        self.color = Some(color.to_string());
        Ok(())
    }

    pub fn write_fields(&self, element: &mut Element, context: &KmlContext, options: &WriteOptions) {
        self.feature.write_fields(element, context, options);
        write_text_node(element, context, "color", self.color.as_deref());
        write_int_node(element, context, "drawOrder", self.draw_order);
        write_object(element, self.icon.as_ref(), options);
    }

    pub fn read_fields(element: &Element, context: &KmlContext, strict: bool) -> Result<Self, KmlError> {
        Ok(Self {
            feature: Feature::read_fields(element, context, strict)?,
            color: read_text_node(element, context, "color"),
            draw_order: read_int_node(element, context, "drawOrder")?,
            icon: read_object(element, context, strict)?,
        })
    }
}

/// 照片视锥。五个字段全部设置时才视为存在。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewVolume {
    pub context: KmlContext,
    pub ids: ObjectIds,
    pub left_fov: Option<f64>,
    pub right_fov: Option<f64>,
    pub bottom_fov: Option<f64>,
    pub top_fov: Option<f64>,
    pub near: Option<f64>,
}

impl ViewVolume {
    /// 水平视场角范围 [-180, 180]，垂直视场角范围 [-90, 90]，near 不得为负。
    pub fn new(
        left_fov: f64,
        right_fov: f64,
        bottom_fov: f64,
        top_fov: f64,
        near: f64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            left_fov: Some(validate_range("leftFov", left_fov, ROTATION_RANGE)?),
            right_fov: Some(validate_range("rightFov", right_fov, ROTATION_RANGE)?),
            bottom_fov: Some(validate_range("bottomFov", bottom_fov, LATITUDE_RANGE)?),
            top_fov: Some(validate_range("topFov", top_fov, LATITUDE_RANGE)?),
            near: Some(validate_non_negative("near", near)?),
            ..Self::default()
        })
    }
}

impl KmlObject for ViewVolume {
    const TAG_NAME: &'static str = "ViewVolume";

    fn context(&self) -> &KmlContext {
        &self.context
    }

    fn is_present(&self) -> bool {
        [self.left_fov, self.right_fov, self.bottom_fov, self.top_fov, self.near]
            .iter()
            .all(Option::is_some)
    }

    fn write_fields(&self, element: &mut Element, options: &WriteOptions) {
        let ctx = &self.context;
        self.ids.write(element);
        write_float_node(element, ctx, "leftFov", self.left_fov, options);
        write_float_node(element, ctx, "rightFov", self.right_fov, options);
        write_float_node(element, ctx, "bottomFov", self.bottom_fov, options);
        write_float_node(element, ctx, "topFov", self.top_fov, options);
        write_float_node(element, ctx, "near", self.near, options);
    }

    fn from_element(element: &Element, context: &KmlContext, _strict: bool) -> Result<Self, KmlError> {
        Ok(Self {
            context: context.clone(),
            ids: ObjectIds::read(element),
            left_fov: read_float_node(element, context, "leftFov")?,
            right_fov: read_float_node(element, context, "rightFov")?,
            bottom_fov: read_float_node(element, context, "bottomFov")?,
            top_fov: read_float_node(element, context, "topFov")?,
            near: read_float_node(element, context, "near")?,
        })
    }
}

/// 超大照片的分层瓦片描述。四个字段全部设置时才视为存在。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagePyramid {
    pub context: KmlContext,
    pub ids: ObjectIds,
    pub tile_size: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub grid_origin: Option<GridOrigin>,
}

impl ImagePyramid {
    pub fn new(
        tile_size: u32,
        max_width: u32,
        max_height: u32,
        grid_origin: GridOrigin,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            tile_size: Some(validate_power_of_two("tileSize", tile_size)?),
            max_width: Some(max_width),
            max_height: Some(max_height),
            grid_origin: Some(grid_origin),
            ..Self::default()
        })
    }
}

impl KmlObject for ImagePyramid {
    const TAG_NAME: &'static str = "ImagePyramid";

    fn context(&self) -> &KmlContext {
        &self.context
    }

    fn is_present(&self) -> bool {
        self.tile_size.is_some()
            && self.max_width.is_some()
            && self.max_height.is_some()
            && self.grid_origin.is_some()
    }

    fn write_fields(&self, element: &mut Element, options: &WriteOptions) {
        let ctx = &self.context;
        self.ids.write(element);
        write_int_node(element, ctx, "tileSize", self.tile_size);
        write_int_node(element, ctx, "maxWidth", self.max_width);
        write_int_node(element, ctx, "maxHeight", self.max_height);
        write_enum_node(element, ctx, "gridOrigin", self.grid_origin, options);
    }

    fn from_element(element: &Element, context: &KmlContext, strict: bool) -> Result<Self, KmlError> {
        Ok(Self {
            context: context.clone(),
            ids: ObjectIds::read(element),
            tile_size: read_int_node(element, context, "tileSize")?,
            max_width: read_int_node(element, context, "maxWidth")?,
            max_height: read_int_node(element, context, "maxHeight")?,
            grid_origin: read_enum_node(element, context, "gridOrigin", strict)?,
        })
    }
}

/// 照片叠加层。
///
/// 输出顺序：Overlay 字段、rotation、ViewVolume、ImagePyramid、Point、shape。
/// 读取时 shape 缺失按方言缺省值 `rectangle` 处理。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoOverlay {
    pub context: KmlContext,
    pub overlay: Overlay,
    pub rotation: Option<f64>,
    pub view_volume: Option<ViewVolume>,
    pub image_pyramid: Option<ImagePyramid>,
    pub point: Option<Point>,
    pub shape: Option<Shape>,
}

impl PhotoOverlay {
    pub fn new(context: KmlContext) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }

    pub fn set_rotation(&mut self, rotation: f64) -> Result<(), ValidationError> {
        self.rotation = Some(validate_range("rotation", rotation, ROTATION_RANGE)?);
        Ok(())
    }

    pub fn set_view_volume(
        &mut self,
        left_fov: f64,
        right_fov: f64,
        bottom_fov: f64,
        top_fov: f64,
        near: f64,
    ) -> Result<(), ValidationError> {
        let view_volume = ViewVolume::new(left_fov, right_fov, bottom_fov, top_fov, near)?;
        self.view_volume = Some(ViewVolume {
            context: self.context.clone(),
            ..view_volume
        });
        Ok(())
    }

    pub fn set_image_pyramid(
        &mut self,
        tile_size: u32,
        max_width: u32,
        max_height: u32,
        grid_origin: GridOrigin,
    ) -> Result<(), ValidationError> {
        let image_pyramid = ImagePyramid::new(tile_size, max_width, max_height, grid_origin)?;
        self.image_pyramid = Some(ImagePyramid {
            context: self.context.clone(),
            ..image_pyramid
        });
        Ok(())
    }
}

impl KmlObject for PhotoOverlay {
    const TAG_NAME: &'static str = "PhotoOverlay";

    fn context(&self) -> &KmlContext {
        &self.context
    }

    fn write_fields(&self, element: &mut Element, options: &WriteOptions) {
        let ctx = &self.context;
        self.overlay.write_fields(element, ctx, options);
        write_float_node(element, ctx, "rotation", self.rotation, options);
        write_object(element, self.view_volume.as_ref(), options);
        write_object(element, self.image_pyramid.as_ref(), options);
        write_object(element, self.point.as_ref(), options);
        write_enum_node(element, ctx, "shape", self.shape, options);
    }

    fn from_element(element: &Element, context: &KmlContext, strict: bool) -> Result<Self, KmlError> {
        let shape = read_enum_node(element, context, "shape", strict)?.or_else(|| {
            debug!("PhotoOverlay 未指定有效 shape，采用缺省值");
            Shape::DEFAULT
        });
        Ok(Self {
            context: context.clone(),
            overlay: Overlay::read_fields(element, context, strict)?,
            rotation: read_float_node(element, context, "rotation")?,
            view_volume: read_object(element, context, strict)?,
            image_pyramid: read_object(element, context, strict)?,
            point: read_object(element, context, strict)?,
            shape,
        })
    }
}

/// 地面叠加层的经纬度边界。north、south、east、west 全部设置时才视为存在；
/// rotation 可选。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatLonBox {
    pub context: KmlContext,
    pub ids: ObjectIds,
    pub north: Option<f64>,
    pub south: Option<f64>,
    pub east: Option<f64>,
    pub west: Option<f64>,
    pub rotation: Option<f64>,
}

impl LatLonBox {
    /// 以 (west, south)–(east, north) 表示的平面包围盒。
    pub fn bounds(&self) -> Option<Bounds2D> {
        match (self.west, self.south, self.east, self.north) {
            (Some(west), Some(south), Some(east), Some(north)) => {
                Some(Bounds2D::new(DVec2::new(west, south), DVec2::new(east, north)))
            }
            _ => None,
        }
    }
}

impl KmlObject for LatLonBox {
    const TAG_NAME: &'static str = "LatLonBox";

    fn context(&self) -> &KmlContext {
        &self.context
    }

    fn is_present(&self) -> bool {
        self.bounds().is_some()
    }

    fn write_fields(&self, element: &mut Element, options: &WriteOptions) {
        let ctx = &self.context;
        self.ids.write(element);
        write_float_node(element, ctx, "north", self.north, options);
        write_float_node(element, ctx, "south", self.south, options);
        write_float_node(element, ctx, "east", self.east, options);
        write_float_node(element, ctx, "west", self.west, options);
        write_float_node(element, ctx, "rotation", self.rotation, options);
    }

    fn from_element(element: &Element, context: &KmlContext, _strict: bool) -> Result<Self, KmlError> {
        Ok(Self {
            context: context.clone(),
            ids: ObjectIds::read(element),
            north: read_float_node(element, context, "north")?,
            south: read_float_node(element, context, "south")?,
            east: read_float_node(element, context, "east")?,
            west: read_float_node(element, context, "west")?,
            rotation: read_float_node(element, context, "rotation")?,
        })
    }
}

/// 地面叠加层。
///
/// 输出顺序：Overlay 字段、altitude、altitudeMode、LatLonBox。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundOverlay {
    pub context: KmlContext,
    pub overlay: Overlay,
    pub altitude: Option<f64>,
    pub altitude_mode: Option<AltitudeMode>,
    pub lat_lon_box: Option<LatLonBox>,
}

impl GroundOverlay {
    pub fn new(context: KmlContext) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }

    /// 先校验全部边界再赋值；任一越界则保持原值不变。
    pub fn set_lat_lon_box(
        &mut self,
        north: f64,
        south: f64,
        east: f64,
        west: f64,
        rotation: f64,
    ) -> Result<(), ValidationError> {
        let north = validate_range("north", north, LATITUDE_RANGE)?;
        let south = validate_range("south", south, LATITUDE_RANGE)?;
        let east = validate_range("east", east, LONGITUDE_RANGE)?;
        let west = validate_range("west", west, LONGITUDE_RANGE)?;
        let rotation = validate_range("rotation", rotation, ROTATION_RANGE)?;

        let lat_lon_box = self.lat_lon_box.get_or_insert_with(|| LatLonBox {
            context: self.context.clone(),
            ..LatLonBox::default()
        });
        lat_lon_box.north = Some(north);
        lat_lon_box.south = Some(south);
        lat_lon_box.east = Some(east);
        lat_lon_box.west = Some(west);
        lat_lon_box.rotation = Some(rotation);
        Ok(())
    }

    /// 便捷设置：只接受 `clampToGround` 与 `absolute`，其他输入一律替换为 `clampToGround`。
    pub fn set_altitude_mode(&mut self, token: &str) {
        let mode = match AltitudeMode::from_token(token) {
            Ok(mode) if GROUND_ALTITUDE_MODES.contains(&mode) => mode,
            _ => {
                debug!(token, "GroundOverlay 不支持的海拔模式，改用 clampToGround");
                AltitudeMode::ClampToGround
            }
        };
        self.altitude_mode = Some(mode);
    }

    /// 未设置时按方言缺省值解释。
    pub fn effective_altitude_mode(&self) -> AltitudeMode {
        self.altitude_mode.unwrap_or(AltitudeMode::ClampToGround)
    }
}

impl KmlObject for GroundOverlay {
    const TAG_NAME: &'static str = "GroundOverlay";

    fn context(&self) -> &KmlContext {
        &self.context
    }

    fn write_fields(&self, element: &mut Element, options: &WriteOptions) {
        let ctx = &self.context;
        self.overlay.write_fields(element, ctx, options);
        write_float_node(element, ctx, "altitude", self.altitude, options);
        write_enum_node(element, ctx, "altitudeMode", self.altitude_mode, options);
        write_object(element, self.lat_lon_box.as_ref(), options);
    }

    fn from_element(element: &Element, context: &KmlContext, strict: bool) -> Result<Self, KmlError> {
        Ok(Self {
            context: context.clone(),
            overlay: Overlay::read_fields(element, context, strict)?,
            altitude: read_float_node(element, context, "altitude")?,
            altitude_mode: read_ground_altitude_mode(element, context, strict)?,
            lat_lon_box: read_object(element, context, strict)?,
        })
    }
}

/// GroundOverlay 的海拔模式只取这两个值。
const GROUND_ALTITUDE_MODES: [AltitudeMode; 2] =
    [AltitudeMode::ClampToGround, AltitudeMode::Absolute];

/// 严格模式下取值域外的标记报错；宽松模式下无效或域外的标记替换为 `clampToGround`。
fn read_ground_altitude_mode(
    element: &Element,
    context: &KmlContext,
    strict: bool,
) -> Result<Option<AltitudeMode>, KmlError> {
    const NODE: &str = "altitudeMode";
    let Some((child, text)) = node_text(element, context, NODE) else {
        return Ok(None);
    };
    let parsed = if strict {
        AltitudeMode::from_token(text)
    } else {
        AltitudeMode::from_token_relaxed(text)
    };
    match parsed {
        Ok(mode) if GROUND_ALTITUDE_MODES.contains(&mode) => Ok(Some(mode)),
        _ if strict => Err(KmlError::parse(
            NODE,
            child,
            context,
            InvalidEnumValue::new("ground overlay altitude mode", text),
        )),
        _ => {
            debug!(token = text, "GroundOverlay 海拔模式超出取值域，改用 clampToGround");
            Ok(Some(AltitudeMode::ClampToGround))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geokml_core::enums::Verbosity;
    use geokml_core::geometry::Coordinate;

    const SCENARIO: &str = "<GroundOverlay><color>ff0000ff</color><drawOrder>3</drawOrder>\
        <altitude>100</altitude><altitudeMode>absolute</altitudeMode>\
        <LatLonBox><north>10</north><south>0</south><east>10</east><west>0</west>\
        <rotation>5</rotation></LatLonBox></GroundOverlay>";

    fn bare() -> KmlContext {
        KmlContext::new("")
    }

    fn child_names(element: &Element) -> Vec<&str> {
        element.children().iter().map(Element::local_name).collect()
    }

    #[test]
    fn ground_overlay_scenario_round_trips() {
        let overlay = GroundOverlay::from_text(SCENARIO, Some(""), true).unwrap();
        assert_eq!(overlay.overlay.color.as_deref(), Some("ff0000ff"));
        assert_eq!(overlay.overlay.draw_order, Some(3));
        assert_eq!(overlay.altitude, Some(100.0));
        assert_eq!(overlay.altitude_mode, Some(AltitudeMode::Absolute));
        let lat_lon_box = overlay.lat_lon_box.as_ref().unwrap();
        assert!(lat_lon_box.is_present());
        assert_eq!(
            (lat_lon_box.north, lat_lon_box.south, lat_lon_box.east, lat_lon_box.west),
            (Some(10.0), Some(0.0), Some(10.0), Some(0.0))
        );
        assert_eq!(lat_lon_box.rotation, Some(5.0));

        let text = overlay.to_text(&WriteOptions::default()).unwrap();
        assert_eq!(text, SCENARIO);
        assert_eq!(GroundOverlay::from_text(&text, Some(""), true).unwrap(), overlay);
    }

    #[test]
    fn set_lat_lon_box_is_all_or_nothing() {
        let mut overlay = GroundOverlay::new(bare());
        overlay.set_lat_lon_box(10.0, 0.0, 10.0, 0.0, 0.0).unwrap();
        let before = overlay.lat_lon_box.clone();

        let err = overlay.set_lat_lon_box(91.0, 0.0, 0.0, 0.0, 0.0).unwrap_err();
        assert_eq!(err.field(), "north");
        let err = overlay.set_lat_lon_box(0.0, 0.0, 0.0, -181.0, 0.0).unwrap_err();
        assert_eq!(err.field(), "west");
        let err = overlay.set_lat_lon_box(0.0, 0.0, 0.0, 0.0, 200.0).unwrap_err();
        assert_eq!(err.field(), "rotation");
        assert_eq!(overlay.lat_lon_box, before);

        let mut fresh = GroundOverlay::new(bare());
        assert!(fresh.set_lat_lon_box(91.0, 0.0, 0.0, 0.0, 0.0).is_err());
        assert!(fresh.lat_lon_box.is_none());
    }

    #[test]
    fn lat_lon_box_bounds_use_geometry_library() {
        let mut overlay = GroundOverlay::new(bare());
        overlay.set_lat_lon_box(10.0, -5.0, 20.0, 2.0, 0.0).unwrap();
        let bounds = overlay.lat_lon_box.as_ref().and_then(LatLonBox::bounds).unwrap();
        assert_eq!(bounds.west(), 2.0);
        assert_eq!(bounds.north(), 10.0);
        assert!(bounds.contains(DVec2::new(5.0, 0.0)));

        let partial = LatLonBox {
            north: Some(1.0),
            ..LatLonBox::default()
        };
        assert!(partial.bounds().is_none());
        assert!(!partial.is_present());
    }

    #[test]
    fn ground_overlay_altitude_mode_setter_substitutes_default() {
        let mut overlay = GroundOverlay::new(bare());
        assert_eq!(overlay.effective_altitude_mode(), AltitudeMode::ClampToGround);
        overlay.set_altitude_mode("absolute");
        assert_eq!(overlay.altitude_mode, Some(AltitudeMode::Absolute));
        overlay.set_altitude_mode("relativeToGround");
        assert_eq!(overlay.altitude_mode, Some(AltitudeMode::ClampToGround));
        overlay.set_altitude_mode("nonsense");
        assert_eq!(overlay.effective_altitude_mode(), AltitudeMode::ClampToGround);
    }

    #[test]
    fn ground_altitude_mode_outside_domain_fails_strict() {
        for token in ["relativeToGround", "clampToSeaFloor", "bogus", "ABSOLUTE"] {
            let markup = format!("<GroundOverlay><altitudeMode>{token}</altitudeMode></GroundOverlay>");
            let err = GroundOverlay::from_text(&markup, Some(""), true).unwrap_err();
            assert_eq!(err.node(), Some("altitudeMode"), "token {token}");
            assert!(err.to_string().contains(token));
        }
    }

    #[test]
    fn ground_altitude_mode_outside_domain_falls_back_lenient() {
        let read = |token: &str| {
            let markup = format!("<GroundOverlay><altitudeMode>{token}</altitudeMode></GroundOverlay>");
            GroundOverlay::from_text(&markup, Some(""), false).unwrap().altitude_mode
        };
        assert_eq!(read("relativeToGround"), Some(AltitudeMode::ClampToGround));
        assert_eq!(read("relativeToSeaFloor"), Some(AltitudeMode::ClampToGround));
        assert_eq!(read("bogus"), Some(AltitudeMode::ClampToGround));
        assert_eq!(read("ABSOLUTE"), Some(AltitudeMode::Absolute));
        assert_eq!(read("absolute"), Some(AltitudeMode::Absolute));

        let absent = GroundOverlay::from_text("<GroundOverlay/>", Some(""), false).unwrap();
        assert_eq!(absent.altitude_mode, None);
        assert_eq!(absent.effective_altitude_mode(), AltitudeMode::ClampToGround);
    }

    #[test]
    fn partial_image_pyramid_is_not_emitted() {
        let mut photo = PhotoOverlay::new(bare());
        photo.image_pyramid = Some(ImagePyramid {
            context: bare(),
            tile_size: Some(256),
            max_width: Some(4096),
            max_height: Some(2048),
            ..ImagePyramid::default()
        });
        let element = photo.to_element(&WriteOptions::default());
        assert!(element.find("ImagePyramid").is_none());

        photo.set_image_pyramid(256, 4096, 2048, GridOrigin::UpperLeft).unwrap();
        let element = photo.to_element(&WriteOptions::default());
        let pyramids: Vec<&Element> = element.find_all("ImagePyramid").collect();
        assert_eq!(pyramids.len(), 1);
        assert_eq!(
            child_names(pyramids[0]),
            vec!["tileSize", "maxWidth", "maxHeight", "gridOrigin"]
        );
        let texts: Vec<Option<&str>> = pyramids[0].children().iter().map(Element::text).collect();
        assert_eq!(
            texts,
            vec![Some("256"), Some("4096"), Some("2048"), Some("upperLeft")]
        );
    }

    #[test]
    fn partial_lat_lon_box_is_not_emitted() {
        let mut overlay = GroundOverlay::new(bare());
        overlay.lat_lon_box = Some(LatLonBox {
            context: bare(),
            north: Some(10.0),
            south: Some(0.0),
            east: Some(10.0),
            rotation: Some(5.0),
            ..LatLonBox::default()
        });
        let element = overlay.to_element(&WriteOptions::default());
        assert!(element.find("LatLonBox").is_none());

        overlay.set_lat_lon_box(10.0, 0.0, 10.0, 0.0, 5.0).unwrap();
        let element = overlay.to_element(&WriteOptions::default());
        assert_eq!(element.find_all("LatLonBox").count(), 1);
    }

    #[test]
    fn partial_view_volume_is_not_emitted() {
        let mut photo = PhotoOverlay::new(bare());
        photo.view_volume = Some(ViewVolume {
            context: bare(),
            left_fov: Some(-25.0),
            right_fov: Some(25.0),
            bottom_fov: Some(-16.0),
            top_fov: Some(16.0),
            ..ViewVolume::default()
        });
        let element = photo.to_element(&WriteOptions::default());
        assert!(element.find("ViewVolume").is_none());

        photo.set_view_volume(-25.0, 25.0, -16.0, 16.0, 10.0).unwrap();
        let element = photo.to_element(&WriteOptions::default());
        let volumes: Vec<&Element> = element.find_all("ViewVolume").collect();
        assert_eq!(volumes.len(), 1);
        assert_eq!(
            child_names(volumes[0]),
            vec!["leftFov", "rightFov", "bottomFov", "topFov", "near"]
        );
    }

    #[test]
    fn photo_overlay_children_follow_schema_order() {
        let mut photo = PhotoOverlay::new(bare());
        photo.overlay.feature.name = Some("Tower".to_string());
        photo.overlay.set_color("7fffffff").unwrap();
        photo.overlay.draw_order = Some(1);
        photo.overlay.icon = Some(Icon {
            context: bare(),
            ..Icon::new("tower.jpg")
        });
        photo.set_rotation(12.5).unwrap();
        photo.set_view_volume(-60.0, 60.0, -45.0, 45.0, 100.0).unwrap();
        photo.set_image_pyramid(256, 4096, 2048, GridOrigin::UpperLeft).unwrap();
        photo.point = Some(Point {
            context: bare(),
            ..Point::new(Coordinate::with_altitude(7.5, 46.0, 30.0))
        });
        photo.shape = Some(Shape::Cylinder);

        let element = photo.to_element(&WriteOptions::default().with_precision(1));
        assert_eq!(
            child_names(&element),
            vec![
                "name",
                "color",
                "drawOrder",
                "Icon",
                "rotation",
                "ViewVolume",
                "ImagePyramid",
                "Point",
                "shape",
            ]
        );
        let text = photo.to_text(&WriteOptions::default()).unwrap();
        assert_eq!(PhotoOverlay::from_text(&text, Some(""), true).unwrap(), photo);
    }

    #[test]
    fn photo_overlay_setters_validate() {
        let mut photo = PhotoOverlay::new(bare());
        assert!(photo.set_rotation(181.0).is_err());
        assert!(photo.set_view_volume(-25.0, 25.0, -100.0, 16.0, 10.0).is_err());
        let err = photo
            .set_image_pyramid(300, 1000, 1000, GridOrigin::LowerLeft)
            .unwrap_err();
        assert_eq!(err, ValidationError::NotPowerOfTwo { field: "tileSize", value: 300 });
        assert!(photo.overlay.set_color("red").is_err());
        assert_eq!(photo, PhotoOverlay::new(bare()));
    }

    #[test]
    fn shape_defaults_to_rectangle_when_absent() {
        let photo = PhotoOverlay::from_text("<PhotoOverlay/>", Some(""), true).unwrap();
        assert_eq!(photo.shape, Some(Shape::Rectangle));

        let unset = PhotoOverlay::new(bare());
        let text = unset.to_text(&WriteOptions::default()).unwrap();
        assert!(!text.contains("shape"));
        let reparsed = PhotoOverlay::from_text(&text, Some(""), true).unwrap();
        assert_eq!(reparsed.shape, Some(Shape::Rectangle));
    }

    #[test]
    fn invalid_shape_strict_and_lenient() {
        let markup = "<PhotoOverlay><shape>invalid</shape></PhotoOverlay>";
        let err = PhotoOverlay::from_text(markup, Some(""), true).unwrap_err();
        assert_eq!(err.node(), Some("shape"));
        assert!(err.to_string().contains("invalid"));

        let photo = PhotoOverlay::from_text(markup, Some(""), false).unwrap();
        assert_eq!(photo.shape, Shape::DEFAULT);
    }

    #[test]
    fn numeric_failure_aborts_overlay() {
        let err = GroundOverlay::from_text(
            "<GroundOverlay><drawOrder>top</drawOrder></GroundOverlay>",
            Some(""),
            false,
        )
        .unwrap_err();
        assert_eq!(err.node(), Some("drawOrder"));
    }

    #[test]
    fn verbosity_controls_default_enums() {
        let mut photo = PhotoOverlay::new(bare());
        let verbose = photo
            .to_text(&WriteOptions::default().with_verbosity(Verbosity::Verbose))
            .unwrap();
        assert!(verbose.contains("<shape>rectangle</shape>"));

        photo.shape = Some(Shape::Rectangle);
        let terse = photo
            .to_text(&WriteOptions::default().with_verbosity(Verbosity::Terse))
            .unwrap();
        assert_eq!(terse, "<PhotoOverlay/>");
    }

    #[test]
    fn default_namespace_is_kml() {
        let text = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><GroundOverlay id="g1"><name>Base</name><Icon><href>map.png</href></Icon></GroundOverlay></kml>"#;
        let overlay = GroundOverlay::from_text(text, None, true).unwrap();
        assert_eq!(overlay.overlay.feature.ids.id.as_deref(), Some("g1"));
        assert_eq!(overlay.overlay.feature.name.as_deref(), Some("Base"));
        assert_eq!(
            overlay.overlay.icon.as_ref().and_then(|icon| icon.href.as_deref()),
            Some("map.png")
        );
        let rendered = overlay.to_text(&WriteOptions::default()).unwrap();
        assert!(rendered.starts_with(r#"<kml:GroundOverlay xmlns:kml="http://www.opengis.net/kml/2.2" id="g1">"#));
    }
}
