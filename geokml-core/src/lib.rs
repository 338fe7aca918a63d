pub mod geometry {
    use glam::DVec2;
    use thiserror::Error;

    /// 坐标文本默认保留的小数位数。
    pub const DEFAULT_COORDINATE_PRECISION: usize = 6;

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum CoordinateError {
        #[error("coordinate text is empty")]
        Empty,
        #[error("coordinate tuple '{0}' must have 2 or 3 components")]
        InvalidDimensions(String),
        #[error("'{0}' is not a finite number")]
        InvalidNumber(String),
        #[error("expected exactly one coordinate tuple, found {0}")]
        UnexpectedCount(usize),
    }

    /// 单个坐标元组，顺序为经度、纬度，可选海拔（米）。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Coordinate {
        pub position: DVec2,
        pub altitude: Option<f64>,
    }

    impl Coordinate {
        #[inline]
        pub fn new(longitude: f64, latitude: f64) -> Self {
            Self {
                position: DVec2::new(longitude, latitude),
                altitude: None,
            }
        }

        #[inline]
        pub fn with_altitude(longitude: f64, latitude: f64, altitude: f64) -> Self {
            Self {
                position: DVec2::new(longitude, latitude),
                altitude: Some(altitude),
            }
        }

        #[inline]
        pub fn longitude(self) -> f64 {
            self.position.x
        }

        #[inline]
        pub fn latitude(self) -> f64 {
            self.position.y
        }

        #[inline]
        pub fn altitude(self) -> Option<f64> {
            self.altitude
        }

        /// 解析形如 `lon,lat[,alt]` 的单个元组。
        pub fn parse_tuple(tuple: &str) -> Result<Self, CoordinateError> {
            let parts: Vec<&str> = tuple.split(',').map(str::trim).collect();
            if !(2..=3).contains(&parts.len()) {
                return Err(CoordinateError::InvalidDimensions(tuple.to_string()));
            }
            let mut values = [0.0_f64; 3];
            for (slot, part) in values.iter_mut().zip(&parts) {
                *slot = parse_component(part)?;
            }
            Ok(if parts.len() == 3 {
                Self::with_altitude(values[0], values[1], values[2])
            } else {
                Self::new(values[0], values[1])
            })
        }

        pub fn to_text(self, precision: usize) -> String {
            match self.altitude {
                Some(z) => format!(
                    "{:.prec$},{:.prec$},{:.prec$}",
                    self.longitude(),
                    self.latitude(),
                    z,
                    prec = precision
                ),
                None => format!(
                    "{:.prec$},{:.prec$}",
                    self.longitude(),
                    self.latitude(),
                    prec = precision
                ),
            }
        }
    }

    fn parse_component(text: &str) -> Result<f64, CoordinateError> {
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(CoordinateError::InvalidNumber(text.to_string())),
        }
    }

    /// 坐标序列，文本形式以空白分隔元组、逗号分隔分量。
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Coordinates(pub Vec<Coordinate>);

    impl Coordinates {
        pub fn parse(text: &str) -> Result<Self, CoordinateError> {
            let tuples: Vec<&str> = text.split_whitespace().collect();
            if tuples.is_empty() {
                return Err(CoordinateError::Empty);
            }
            tuples
                .into_iter()
                .map(Coordinate::parse_tuple)
                .collect::<Result<Vec<_>, _>>()
                .map(Self)
        }

        /// 仅接受一个元组，供点几何使用。
        pub fn parse_single(text: &str) -> Result<Coordinate, CoordinateError> {
            let coords = Self::parse(text)?;
            match coords.0.as_slice() {
                [only] => Ok(*only),
                other => Err(CoordinateError::UnexpectedCount(other.len())),
            }
        }
    }

    /// 经纬度平面上的轴对齐范围，x 为经度、y 为纬度。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Bounds2D {
        min: DVec2,
        max: DVec2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: DVec2, max: DVec2) -> Self {
            Self { min, max }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x > self.max.x || self.min.y > self.max.y
        }

        #[inline]
        pub fn west(&self) -> f64 {
            self.min.x
        }

        #[inline]
        pub fn east(&self) -> f64 {
            self.max.x
        }

        #[inline]
        pub fn south(&self) -> f64 {
            self.min.y
        }

        #[inline]
        pub fn north(&self) -> f64 {
            self.max.y
        }

        pub fn contains(&self, point: DVec2) -> bool {
            !self.is_empty()
                && point.x >= self.min.x
                && point.x <= self.max.x
                && point.y >= self.min.y
                && point.y <= self.max.y
        }
    }
}

/// 方言中封闭取值集合的枚举类型。
pub mod enums {
    use std::fmt;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    #[error("'{token}' is not a valid {domain} value")]
    pub struct InvalidEnumValue {
        pub domain: &'static str,
        pub token: String,
    }

    impl InvalidEnumValue {
        pub fn new(domain: &'static str, token: impl Into<String>) -> Self {
            Self {
                domain,
                token: token.into(),
            }
        }
    }

    /// 枚举值与规范标记之间的双向映射。
    pub trait KmlEnum: Copy + Eq + fmt::Debug + Sized + 'static {
        /// 取值域名称，用于错误信息。
        const DOMAIN: &'static str;
        const VARIANTS: &'static [Self];
        /// 方言规定的缺省值（若有）。
        const DEFAULT: Option<Self>;

        fn token(self) -> &'static str;

        /// 精确匹配（区分大小写）。
        fn from_token(token: &str) -> Result<Self, InvalidEnumValue> {
            Self::VARIANTS
                .iter()
                .copied()
                .find(|variant| variant.token() == token)
                .ok_or_else(|| InvalidEnumValue::new(Self::DOMAIN, token))
        }

        /// 宽松匹配：忽略大小写。
        fn from_token_relaxed(token: &str) -> Result<Self, InvalidEnumValue> {
            Self::VARIANTS
                .iter()
                .copied()
                .find(|variant| variant.token().eq_ignore_ascii_case(token))
                .ok_or_else(|| InvalidEnumValue::new(Self::DOMAIN, token))
        }
    }

    macro_rules! kml_enum {
        (
            $(#[$meta:meta])*
            $name:ident($domain:literal, default = $default:expr) {
                $($(#[$vmeta:meta])* $variant:ident => $token:literal),+ $(,)?
            }
        ) => {
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum $name {
                $($(#[$vmeta])* $variant,)+
            }

            impl KmlEnum for $name {
                const DOMAIN: &'static str = $domain;
                const VARIANTS: &'static [Self] = &[$(Self::$variant),+];
                const DEFAULT: Option<Self> = $default;

                fn token(self) -> &'static str {
                    match self {
                        $(Self::$variant => $token,)+
                    }
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.token())
                }
            }

            impl FromStr for $name {
                type Err = InvalidEnumValue;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::from_token(s)
                }
            }

            impl Serialize for $name {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.token())
                }
            }

            impl<'de> Deserialize<'de> for $name {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let token = String::deserialize(deserializer)?;
                    Self::from_token(&token).map_err(serde::de::Error::custom)
                }
            }
        };
    }

    kml_enum! {
        /// 海拔解释方式。后两个取值来自 gx 扩展。
        AltitudeMode("altitude mode", default = Some(AltitudeMode::ClampToGround)) {
            ClampToGround => "clampToGround",
            RelativeToGround => "relativeToGround",
            Absolute => "absolute",
            ClampToSeaFloor => "clampToSeaFloor",
            RelativeToSeaFloor => "relativeToSeaFloor",
        }
    }

    kml_enum! {
        /// 影像金字塔瓦片编号的起始角。
        GridOrigin("grid origin", default = Some(GridOrigin::LowerLeft)) {
            LowerLeft => "lowerLeft",
            UpperLeft => "upperLeft",
        }
    }

    kml_enum! {
        /// PhotoOverlay 的投影形状。
        Shape("shape", default = Some(Shape::Rectangle)) {
            Rectangle => "rectangle",
            Cylinder => "cylinder",
            Sphere => "sphere",
        }
    }

    kml_enum! {
        RefreshMode("refresh mode", default = Some(RefreshMode::OnChange)) {
            OnChange => "onChange",
            OnInterval => "onInterval",
            OnExpire => "onExpire",
        }
    }

    kml_enum! {
        ViewRefreshMode("view refresh mode", default = Some(ViewRefreshMode::Never)) {
            Never => "never",
            OnStop => "onStop",
            OnRequest => "onRequest",
            OnRegion => "onRegion",
        }
    }

    /// 输出详略程度：`Terse` 省略等于缺省值的字段，`Verbose` 补齐未设置字段的缺省值。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Verbosity {
        Terse,
        #[default]
        Normal,
        Verbose,
    }
}
