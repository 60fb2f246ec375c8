//! Layer extraction from draw.io pages.
//!
//! A draw.io page keeps its content under `mxGraphModel/root`. The cell with
//! id `"0"` is the invisible root of the containment hierarchy and every
//! direct child of it is a layer. Layers are either plain `mxCell`s, named by
//! their `value`, or `object`/`UserObject` wrappers around an `mxCell`, named
//! by their `label`.
//!
//! ```xml
//! <diagram name="Flow">
//!   <mxGraphModel>
//!     <root>
//!       <mxCell id="0"/>
//!       <mxCell id="1" parent="0"/>                        <!-- layer "1" -->
//!       <mxCell id="2" value="Background" parent="0"/>     <!-- layer "Background" -->
//!       <object id="3" label="Notes"><mxCell parent="0"/></object>
//!       <mxCell id="4" value="box" vertex="1" parent="1"/> <!-- content -->
//!     </root>
//!   </mxGraphModel>
//! </diagram>
//! ```

use indexmap::IndexMap;
use log::trace;
use thiserror::Error;

use crate::xml::Element;

/// Identifier of the root cell every layer is parented to.
pub const ROOT_ID: &str = "0";

/// Errors raised while reading layers from a page or applying them to an
/// exported image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    #[error("unexpected document shape: {0}")]
    UnexpectedShape(String),

    #[error("unknown layer identifier `{0}`")]
    UnknownLayer(String),
}

impl LayerError {
    pub(crate) fn shape(reason: impl Into<String>) -> Self {
        Self::UnexpectedShape(reason.into())
    }
}

/// Mapping from layer cell identifier to layer display name.
///
/// Entries keep the order in which the layers appear in the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerMap(IndexMap<String, String>);

impl LayerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a layer, replacing the name of an identifier seen before.
    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.0.insert(id.into(), name.into());
    }

    /// Display name of a layer, if the identifier is known.
    pub fn name(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    /// Display name of a layer.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::UnknownLayer`] if the identifier is not a layer
    /// of this page.
    pub fn resolve(&self, id: &str) -> Result<&str, LayerError> {
        self.name(id)
            .ok_or_else(|| LayerError::UnknownLayer(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(id, name)` pairs in page order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LayerMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(id, name)| (id.into(), name.into()))
                .collect(),
        )
    }
}

/// Builds the layer map of one page.
///
/// `page` is the page's `diagram` element. Only direct children of the
/// `mxGraphModel/root` container whose parent is [`ROOT_ID`] are layers;
/// everything else is diagram content and is ignored.
///
/// # Errors
///
/// Returns [`LayerError::UnexpectedShape`] if the page has no
/// `mxGraphModel/root` container (a compressed page, for instance), if a
/// layer cell has no `id`, or if an `object` wraps no `mxCell`.
pub fn get_layers(page: &Element) -> Result<LayerMap, LayerError> {
    let graph_model = page.child_named("mxGraphModel").ok_or_else(|| {
        LayerError::shape("page has no <mxGraphModel>; was the document exported uncompressed?")
    })?;
    let container = graph_model
        .child_named("root")
        .ok_or_else(|| LayerError::shape("<mxGraphModel> has no <root> container"))?;

    let mut layers = LayerMap::new();
    for child in container.child_elements() {
        match child.name() {
            "mxCell" => {
                if child.attribute("parent") != Some(ROOT_ID) {
                    continue;
                }
                let id = layer_id(child)?;
                layers.insert(id, child.attribute("value").unwrap_or(id));
            }
            "object" | "UserObject" => {
                let cell = child
                    .child_elements()
                    .next()
                    .filter(|cell| cell.name() == "mxCell")
                    .ok_or_else(|| {
                        LayerError::shape(format!(
                            "<{}> does not wrap an <mxCell>",
                            child.name()
                        ))
                    })?;
                if cell.attribute("parent") != Some(ROOT_ID) {
                    continue;
                }
                let id = layer_id(child)?;
                layers.insert(id, child.attribute("label").unwrap_or(id));
            }
            _ => {}
        }
    }

    trace!(layers:?; "Layers extracted");
    Ok(layers)
}

fn layer_id(node: &Element) -> Result<&str, LayerError> {
    node.attribute("id")
        .ok_or_else(|| LayerError::shape(format!("layer <{}> has no id", node.name())))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn page(cells: &str) -> Element {
        Element::parse(&format!(
            r#"<diagram name="Page-1"><mxGraphModel dx="800"><root><mxCell id="0"/>{cells}</root></mxGraphModel></diagram>"#
        ))
        .unwrap()
    }

    #[test]
    fn test_plain_cell_named_by_value() {
        let layers = get_layers(&page(r#"<mxCell id="2" value="Background" parent="0"/>"#)).unwrap();

        assert_eq!(layers.len(), 1);
        assert_eq!(layers.name("2"), Some("Background"));
    }

    #[test]
    fn test_plain_cell_without_value_named_by_id() {
        let layers = get_layers(&page(r#"<mxCell id="1" parent="0"/>"#)).unwrap();
        assert_eq!(layers.name("1"), Some("1"));
    }

    #[test]
    fn test_empty_value_is_kept() {
        let layers = get_layers(&page(r#"<mxCell id="1" value="" parent="0"/>"#)).unwrap();
        assert_eq!(layers.name("1"), Some(""));
    }

    #[test]
    fn test_object_named_by_label() {
        let cells = r#"
            <object id="5" label="Annotations"><mxCell parent="0"/></object>
            <UserObject id="6" label="Links"><mxCell parent="0"/></UserObject>
        "#;
        let layers = get_layers(&page(cells)).unwrap();

        assert_eq!(layers.name("5"), Some("Annotations"));
        assert_eq!(layers.name("6"), Some("Links"));
    }

    #[test]
    fn test_object_without_label_named_by_id() {
        let layers =
            get_layers(&page(r#"<object id="5" tooltip="x"><mxCell parent="0"/></object>"#)).unwrap();
        assert_eq!(layers.name("5"), Some("5"));
    }

    #[test]
    fn test_content_cells_are_not_layers() {
        let cells = r#"
            <mxCell id="1" parent="0"/>
            <mxCell id="2" value="box" vertex="1" parent="1"/>
            <object id="3" label="wrapped box"><mxCell vertex="1" parent="1"/></object>
            <mxCell id="4" value="orphan"/>
        "#;
        let layers = get_layers(&page(cells)).unwrap();

        let ids: Vec<_> = layers.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["1"]);
    }

    #[test]
    fn test_layers_keep_page_order() {
        let cells = r#"
            <mxCell id="b" value="Top" parent="0"/>
            <mxCell id="a" value="Bottom" parent="0"/>
        "#;
        let layers = get_layers(&page(cells)).unwrap();

        let names: Vec<_> = layers.iter().map(|(_, name)| name).collect();
        assert_eq!(names, ["Top", "Bottom"]);
    }

    #[test]
    fn test_missing_graph_model_is_unexpected_shape() {
        let compressed = Element::parse(r#"<diagram name="x">7ZdNb5swGMc/</diagram>"#).unwrap();
        let err = get_layers(&compressed).unwrap_err();
        assert!(matches!(err, LayerError::UnexpectedShape(_)));
    }

    #[test]
    fn test_missing_root_container_is_unexpected_shape() {
        let page = Element::parse("<diagram><mxGraphModel/></diagram>").unwrap();
        let err = get_layers(&page).unwrap_err();
        assert_eq!(
            err,
            LayerError::UnexpectedShape("<mxGraphModel> has no <root> container".to_string())
        );
    }

    #[test]
    fn test_object_without_cell_is_unexpected_shape() {
        let err = get_layers(&page(r#"<object id="5" label="x"/>"#)).unwrap_err();
        assert!(matches!(err, LayerError::UnexpectedShape(_)));
    }

    #[test]
    fn test_resolve_unknown_identifier() {
        let layers: LayerMap = [("1", "Base")].into_iter().collect();

        assert_eq!(layers.resolve("1"), Ok("Base"));
        assert_eq!(
            layers.resolve("9"),
            Err(LayerError::UnknownLayer("9".to_string()))
        );
    }

    fn build_page(values: &[Option<String>]) -> Element {
        let mut root = Element::new("root");
        let mut zero = Element::new("mxCell");
        zero.set_attribute("id", "0");
        root.push_child(zero);

        for (index, value) in values.iter().enumerate() {
            let id = format!("L{index}");
            let mut layer = Element::new("mxCell");
            layer.set_attribute("id", id.as_str());
            if let Some(value) = value {
                layer.set_attribute("value", value.as_str());
            }
            layer.set_attribute("parent", ROOT_ID);
            root.push_child(layer);

            let mut content = Element::new("mxCell");
            content.set_attribute("id", format!("C{index}"));
            content.set_attribute("value", "content");
            content.set_attribute("parent", id);
            root.push_child(content);
        }

        let mut model = Element::new("mxGraphModel");
        model.push_child(root);
        let mut diagram = Element::new("diagram");
        diagram.push_child(model);

        // Go through the serializer so escaping is part of the property.
        Element::parse(&diagram.to_document_string().unwrap()).unwrap()
    }

    proptest! {
        #[test]
        fn prop_layer_names_follow_value_or_id(
            values in prop::collection::vec(
                prop::option::of("[a-zA-Z0-9 <>&\"'-]{0,12}"),
                0..6,
            )
        ) {
            let extracted = get_layers(&build_page(&values)).unwrap();

            prop_assert_eq!(extracted.len(), values.len());
            for (index, value) in values.iter().enumerate() {
                let id = format!("L{index}");
                let expected = value.clone().unwrap_or_else(|| id.clone());
                prop_assert_eq!(extracted.name(&id), Some(expected.as_str()));
                prop_assert_eq!(extracted.name(&format!("C{index}")), None);
            }
        }
    }
}
