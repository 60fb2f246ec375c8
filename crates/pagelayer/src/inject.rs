//! Layer injection into exported SVG images.
//!
//! draw.io exports a page as
//!
//! ```xml
//! <svg xmlns="http://www.w3.org/2000/svg">
//!   <g>                              <!-- wrapper group -->
//!     <g data-cell-id="0">           <!-- root cell -->
//!       <g data-cell-id="1">...</g>  <!-- one group per layer -->
//!       <g data-cell-id="2">...</g>
//!     </g>
//!   </g>
//!   <switch>...</switch>             <!-- "text is not SVG" fallback -->
//! </svg>
//! ```
//!
//! Injection lifts every layer group to the top level, marks it as an
//! Inkscape layer labeled with the layer's name, and drops the wrapper and
//! the fallback `switch`.

use std::{fs, path::Path};

use log::{debug, info};

use crate::{
    PagelayerError,
    layers::{LayerError, LayerMap, ROOT_ID},
    xml::{Element, Node, SVG_NS},
};

/// Namespace URI of Inkscape's extension attributes.
pub const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";

/// Attribute draw.io tags every exported cell group with.
const CELL_ID_ATTRIBUTE: &str = "data-cell-id";

/// Rewrites the SVG file at `path` in place so that its layer groups become
/// named Inkscape layers.
///
/// The file is only written once the whole rewrite succeeded. The document
/// type declaration of the original file is not preserved.
///
/// Returns the injected layer names in document order.
///
/// # Errors
///
/// Returns [`PagelayerError::Layer`] if the image does not have the shape
/// draw.io produces or references a layer missing from `layers`, and
/// [`PagelayerError::Io`]/[`PagelayerError::Xml`] for read, parse and write
/// failures.
pub fn inject_layers(path: &Path, layers: &LayerMap) -> Result<Vec<String>, PagelayerError> {
    debug!(path = path.display().to_string(); "Injecting layers");

    let text = fs::read_to_string(path)?;
    let xml_error = |source| PagelayerError::Xml {
        path: path.to_path_buf(),
        source,
    };

    let mut root = Element::parse(&text).map_err(xml_error)?;
    let injected = inject_into(&mut root, layers).map_err(|source| PagelayerError::Layer {
        path: path.to_path_buf(),
        source,
    })?;
    for name in &injected {
        info!(layer = name.as_str(); "Layer injected");
    }

    let output = root.to_document_string().map_err(xml_error)?;
    fs::write(path, output)?;

    Ok(injected)
}

/// Applies the layer rewrite to a parsed SVG root element.
///
/// Returns the injected layer names in document order. On error `root` may
/// be partially rewritten and should be discarded.
///
/// # Errors
///
/// Returns [`LayerError::UnexpectedShape`] if the wrapper group or the root
/// cell group is missing or a layer group has no cell identifier, and
/// [`LayerError::UnknownLayer`] if a group's identifier is not in `layers`.
pub fn inject_into(root: &mut Element, layers: &LayerMap) -> Result<Vec<String>, LayerError> {
    let mut wrapper = root
        .take_child(|element| element.is(SVG_NS, "g"))
        .ok_or_else(|| LayerError::shape("no top-level <g> wrapper group"))?;
    let cell_root = wrapper
        .take_child(|_| true)
        .filter(|element| element.attribute(CELL_ID_ATTRIBUTE) == Some(ROOT_ID))
        .ok_or_else(|| {
            LayerError::shape(format!(
                "first child of the wrapper group is not <g {CELL_ID_ATTRIBUTE}=\"{ROOT_ID}\">"
            ))
        })?;

    let mut injected = Vec::new();
    for node in cell_root.into_children() {
        let Node::Element(mut group) = node else {
            continue;
        };
        if group.local_name() != "g" {
            continue;
        }

        let id = group.attribute(CELL_ID_ATTRIBUTE).ok_or_else(|| {
            LayerError::shape(format!("layer group without a {CELL_ID_ATTRIBUTE} attribute"))
        })?;
        let name = layers.resolve(id)?.to_string();

        group.set_attribute("inkscape:groupmode", "layer");
        group.set_attribute("inkscape:label", name.as_str());
        root.push_child(group);
        injected.push(name);
    }

    // draw.io's fallback for viewers without foreignObject support.
    let _ = root.take_child(|element| element.is(SVG_NS, "switch"));

    if root.attribute("xmlns:inkscape").is_none() {
        root.set_attribute("xmlns:inkscape", INKSCAPE_NS);
    }

    Ok(injected)
}
