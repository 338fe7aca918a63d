use tracing::debug;

use crate::base::{KmlContext, KmlObject, WriteOptions};
use crate::codec::{ObjectChoice, Registration, read_choices};
use crate::errors::KmlError;
use crate::overlays::{GroundOverlay, PhotoOverlay};
use crate::xml::Element;

/// 可出现在 `<kml>` 根元素下的叠加层。
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayFeature {
    Ground(GroundOverlay),
    Photo(PhotoOverlay),
}

impl OverlayFeature {
    pub fn tag_name(&self) -> &'static str {
        match self {
            OverlayFeature::Ground(overlay) => overlay.tag_name(),
            OverlayFeature::Photo(overlay) => overlay.tag_name(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            OverlayFeature::Ground(overlay) => overlay.overlay.feature.name.as_deref(),
            OverlayFeature::Photo(overlay) => overlay.overlay.feature.name.as_deref(),
        }
    }
}

fn build_ground(element: &Element, context: &KmlContext, strict: bool) -> Result<OverlayFeature, KmlError> {
    GroundOverlay::from_element(element, context, strict).map(OverlayFeature::Ground)
}

fn build_photo(element: &Element, context: &KmlContext, strict: bool) -> Result<OverlayFeature, KmlError> {
    PhotoOverlay::from_element(element, context, strict).map(OverlayFeature::Photo)
}

impl ObjectChoice for OverlayFeature {
    const REGISTRY: &'static [Registration<Self>] = &[
        Registration {
            tag: GroundOverlay::TAG_NAME,
            build: build_ground,
        },
        Registration {
            tag: PhotoOverlay::TAG_NAME,
            build: build_photo,
        },
    ];

    fn to_element(&self, options: &WriteOptions) -> Element {
        match self {
            OverlayFeature::Ground(overlay) => overlay.to_element(options),
            OverlayFeature::Photo(overlay) => overlay.to_element(options),
        }
    }
}

/// `<kml>` 根文档，按出现顺序保存叠加层。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kml {
    pub context: KmlContext,
    pub features: Vec<OverlayFeature>,
}

impl Kml {
    pub fn new(context: KmlContext) -> Self {
        Self {
            context,
            features: Vec::new(),
        }
    }

    pub fn push(&mut self, feature: OverlayFeature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn ground_overlays(&self) -> impl Iterator<Item = &GroundOverlay> {
        self.features.iter().filter_map(|feature| match feature {
            OverlayFeature::Ground(overlay) => Some(overlay),
            OverlayFeature::Photo(_) => None,
        })
    }

    pub fn photo_overlays(&self) -> impl Iterator<Item = &PhotoOverlay> {
        self.features.iter().filter_map(|feature| match feature {
            OverlayFeature::Photo(overlay) => Some(overlay),
            OverlayFeature::Ground(_) => None,
        })
    }
}

impl KmlObject for Kml {
    const TAG_NAME: &'static str = "kml";

    fn context(&self) -> &KmlContext {
        &self.context
    }

    fn write_fields(&self, element: &mut Element, options: &WriteOptions) {
        for feature in &self.features {
            element.append(feature.to_element(options));
        }
    }

    fn from_element(element: &Element, context: &KmlContext, strict: bool) -> Result<Self, KmlError> {
        Ok(Self {
            context: context.clone(),
            features: read_choices(element, context, strict)?,
        })
    }
}

/// 解析整份文档：根元素为 `<kml>` 时读取其全部叠加层；根元素本身是叠加层时
/// 将其包装为只含一个要素的文档。
pub fn load_document(text: &str, context: &KmlContext, strict: bool) -> Result<Kml, KmlError> {
    let root = Element::parse(text)?;
    if root.name() == context.tag(Kml::TAG_NAME) {
        return Kml::from_element(&root, context, strict);
    }
    match OverlayFeature::registration_for(&root, context) {
        Some(registration) => {
            debug!(tag = root.name(), "根元素为单个叠加层");
            let feature = (registration.build)(&root, context, strict)?;
            Ok(Kml {
                context: context.clone(),
                features: vec![feature],
            })
        }
        None => Err(KmlError::MissingElement {
            tag: context.tag(Kml::TAG_NAME),
        }),
    }
}
