use crate::base::{KmlContext, ObjectIds, WriteOptions};
use crate::codec::{read_bool_node, read_choice, read_text_node, write_bool_node, write_choice, write_text_node};
use crate::errors::KmlError;
use crate::views::View;
use crate::xml::Element;

/// Feature 公共字段，由 Overlay 等实体种类内嵌。
///
/// 输出顺序：name、visibility、open、address、phoneNumber、description、视角、styleUrl。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub ids: ObjectIds,
    pub name: Option<String>,
    pub visibility: Option<bool>,
    pub isopen: Option<bool>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub description: Option<String>,
    pub view: Option<View>,
    pub style_url: Option<String>,
}

impl Feature {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn write_fields(&self, element: &mut Element, context: &KmlContext, options: &WriteOptions) {
        self.ids.write(element);
        write_text_node(element, context, "name", self.name.as_deref());
        write_bool_node(element, context, "visibility", self.visibility);
        write_bool_node(element, context, "open", self.isopen);
        write_text_node(element, context, "address", self.address.as_deref());
        write_text_node(element, context, "phoneNumber", self.phone_number.as_deref());
        write_text_node(element, context, "description", self.description.as_deref());
        write_choice(element, self.view.as_ref(), options);
        write_text_node(element, context, "styleUrl", self.style_url.as_deref());
    }

    pub fn read_fields(element: &Element, context: &KmlContext, strict: bool) -> Result<Self, KmlError> {
        Ok(Self {
            ids: ObjectIds::read(element),
            name: read_text_node(element, context, "name"),
            visibility: read_bool_node(element, context, "visibility", strict)?,
            isopen: read_bool_node(element, context, "open", strict)?,
            address: read_text_node(element, context, "address"),
            phone_number: read_text_node(element, context, "phoneNumber"),
            description: read_text_node(element, context, "description"),
            view: read_choice(element, context, strict)?,
            style_url: read_text_node(element, context, "styleUrl"),
        })
    }
}
