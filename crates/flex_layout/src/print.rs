//! Debug rendering of a laid out subtree as nested `<div>` elements.

use crate::{
    LayoutTree, NodeId,
    error::LayoutResult,
    node::NodeData,
    style::{Edge, EdgeValues, Length, Style},
};
use bitflags::bitflags;
use std::fmt::Write as _;

bitflags! {
    /// Selects what [`LayoutTree::print_tree`] includes.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PrintOptions: u8 {
        /// The computed rectangle of each node.
        const LAYOUT = 1 << 0;
        /// Style attributes that differ from the default style.
        const STYLE = 1 << 1;
        /// Descend into children.
        const CHILDREN = 1 << 2;
    }
}

impl LayoutTree {
    /// Renders `id` and, with [`PrintOptions::CHILDREN`], its descendants.
    ///
    /// The output is meant for humans and tests; its exact format is not stable.
    pub fn print_tree(&self, id: NodeId, options: PrintOptions) -> LayoutResult<String> {
        self.data(id)?;
        let mut output = String::new();
        self.print_node(&mut output, id, options, 0);
        Ok(output)
    }

    fn print_node(&self, output: &mut String, id: NodeId, options: PrintOptions, level: usize) {
        let node = &self.nodes[id];
        let indent = "  ".repeat(level);
        output.push_str(&indent);
        output.push_str("<div ");

        if options.contains(PrintOptions::LAYOUT) {
            let layout = &node.layout;
            let _ = write!(
                output,
                "layout=\"width: {}; height: {}; top: {}; left: {};\" ",
                layout.width(),
                layout.height(),
                layout.top(),
                layout.left()
            );
        }

        if options.contains(PrintOptions::STYLE) {
            output.push_str("style=\"");
            output.push_str(&style_attributes(node));
            output.push_str("\" ");
        }

        if node.measure.is_some() {
            output.push_str("has-custom-measure=\"true\"");
        }
        output.push('>');

        let print_children = options.contains(PrintOptions::CHILDREN) && !node.children.is_empty();
        if print_children {
            for child in &node.children {
                output.push('\n');
                self.print_node(output, *child, options, level + 1);
            }
            output.push('\n');
            output.push_str(&indent);
        }
        output.push_str("</div>");
    }
}

fn style_attributes(node: &NodeData) -> String {
    let style = &node.style;
    let defaults = node.config.default_style();
    let mut output = String::new();

    fn property(output: &mut String, name: &str, value: impl std::fmt::Display) {
        let _ = write!(output, "{name}: {value}; ");
    }

    macro_rules! enum_property {
        ($field:ident, $name:literal) => {
            if style.$field != defaults.$field {
                property(&mut output, $name, style.$field);
            }
        };
    }

    enum_property!(flex_direction, "flex-direction");
    enum_property!(justify_content, "justify-content");
    enum_property!(align_items, "align-items");
    enum_property!(align_content, "align-content");
    enum_property!(align_self, "align-self");
    enum_property!(flex_wrap, "flex-wrap");
    enum_property!(overflow, "overflow");
    enum_property!(display, "display");
    enum_property!(position_type, "position");
    enum_property!(direction, "direction");

    for (value, name) in [
        (style.flex_grow, "flex-grow"),
        (style.flex_shrink, "flex-shrink"),
        (style.flex, "flex"),
        (style.aspect_ratio, "aspect-ratio"),
    ] {
        if let Some(value) = value {
            property(&mut output, name, value);
        }
    }
    if style.flex_basis != defaults.flex_basis {
        property(&mut output, "flex-basis", LengthDisplay(style.flex_basis));
    }

    edge_properties(&mut output, "margin", &style.margin);
    edge_properties(&mut output, "padding", &style.padding);
    edge_properties(&mut output, "border", &style.border);
    edge_properties(&mut output, "", &style.position);

    size_properties(&mut output, style, &defaults);

    if output.ends_with(' ') {
        output.pop();
    }
    output
}

fn edge_properties(output: &mut String, prefix: &str, values: &EdgeValues) {
    if values.is_empty() {
        return;
    }
    let all = values.get(Edge::All);
    let uniform = [
        Edge::Left,
        Edge::Top,
        Edge::Right,
        Edge::Bottom,
        Edge::Start,
        Edge::End,
        Edge::Horizontal,
        Edge::Vertical,
    ]
    .iter()
    .all(|edge| values.get(*edge).is_undefined());
    if uniform && !prefix.is_empty() {
        let _ = write!(output, "{prefix}: {}; ", LengthDisplay(all));
        return;
    }

    for edge in [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom, Edge::Start, Edge::End] {
        let value = values.computed(edge, Length::Undefined);
        if value.is_undefined() {
            continue;
        }
        if prefix.is_empty() {
            let _ = write!(output, "{edge}: {}; ", LengthDisplay(value));
        } else {
            let _ = write!(output, "{prefix}-{edge}: {}; ", LengthDisplay(value));
        }
    }
}

fn size_properties(output: &mut String, style: &Style, defaults: &Style) {
    for (value, default, name) in [
        (style.size.width, defaults.size.width, "width"),
        (style.size.height, defaults.size.height, "height"),
        (style.min_size.width, defaults.min_size.width, "min-width"),
        (style.min_size.height, defaults.min_size.height, "min-height"),
        (style.max_size.width, defaults.max_size.width, "max-width"),
        (style.max_size.height, defaults.max_size.height, "max-height"),
    ] {
        if value != default {
            let _ = write!(output, "{name}: {}; ", LengthDisplay(value));
        }
    }
}

struct LengthDisplay(Length);

impl std::fmt::Display for LengthDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Length::Undefined => write!(f, "undefined"),
            Length::Points(value) => write!(f, "{value}px"),
            Length::Percent(value) => write!(f, "{value}%"),
            Length::Auto => write!(f, "auto"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::size,
        style::{Direction, FlexDirection},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prints_layout_and_non_default_style() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        tree.node_mut(root)
            .unwrap()
            .flex_direction(FlexDirection::Row)
            .width(100.0)
            .height(50.0)
            .padding(Edge::All, 5.0);
        let child = tree.new_node();
        tree.node_mut(child).unwrap().flex_grow(1.0);
        tree.push_child(root, child).unwrap();
        tree.calculate_layout(root, size(None, None), Direction::Ltr)
            .unwrap();

        let printed = tree
            .print_tree(root, PrintOptions::all())
            .unwrap();
        assert_eq!(
            printed,
            concat!(
                "<div layout=\"width: 100; height: 50; top: 0; left: 0;\" ",
                "style=\"flex-direction: row; padding: 5px; width: 100px; height: 50px;\" >\n",
                "  <div layout=\"width: 90; height: 40; top: 5; left: 5;\" ",
                "style=\"flex-grow: 1;\" ></div>\n",
                "</div>"
            )
        );
    }

    #[test]
    fn test_children_are_optional() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let child = tree.new_node();
        tree.push_child(root, child).unwrap();

        let printed = tree.print_tree(root, PrintOptions::STYLE).unwrap();
        assert_eq!(printed, "<div style=\"\" ></div>");
    }
}
