use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} = {value} is not a power of two")]
    NotPowerOfTwo { field: &'static str, value: u32 },
    #[error("'{value}' is not an aabbggrr hex color")]
    InvalidColor { value: String },
}

impl ValidationError {
    /// 出错的字段名。
    pub fn field(&self) -> &'static str {
        match self {
            Self::OutOfRange { field, .. } | Self::NotPowerOfTwo { field, .. } => *field,
            Self::InvalidColor { .. } => "color",
        }
    }
}

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);
pub const ROTATION_RANGE: (f64, f64) = (-180.0, 180.0);
pub const HEADING_RANGE: (f64, f64) = (0.0, 360.0);

/// 闭区间检查，NaN 一律视为越界。
pub fn validate_range(
    field: &'static str,
    value: f64,
    (min, max): (f64, f64),
) -> Result<f64, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

pub fn validate_non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    validate_range(field, value, (0.0, f64::MAX))
}

pub fn validate_power_of_two(field: &'static str, value: u32) -> Result<u32, ValidationError> {
    if value.is_power_of_two() {
        Ok(value)
    } else {
        Err(ValidationError::NotPowerOfTwo { field, value })
    }
}

/// 颜色为 8 位十六进制，顺序 aabbggrr。
pub fn validate_color(value: &str) -> Result<(), ValidationError> {
    if value.len() == 8 && value.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor {
            value: value.to_string(),
        })
    }
}
