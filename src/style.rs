//! `<style>` sheets, presentation attributes and inheritance.
//!
//! Only `#id` and `.class` selectors are understood. For one element the
//! sources merge in this order, later ones winning: class rules, id rules,
//! presentation attributes, the inline `style` attribute.

use std::collections::HashMap;

use crate::xml::SourceNode;

/// Property name to value.
pub type Properties = HashMap<String, String>;

/// Attributes that may also be given as CSS properties.
const PRESENTATION_ATTRIBUTES: &[&str] = &[
    "fill",
    "fill-opacity",
    "fill-rule",
    "stroke",
    "stroke-width",
    "stroke-opacity",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-dasharray",
    "stroke-dashoffset",
    "opacity",
    "display",
    "clip-path",
    "stop-color",
    "stop-opacity",
];

/// Properties that flow from a container to its descendants.
const INHERITED_PROPERTIES: &[&str] = &[
    "fill",
    "fill-opacity",
    "fill-rule",
    "stroke",
    "stroke-width",
    "stroke-opacity",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-dasharray",
    "stroke-dashoffset",
];

#[derive(Debug, Default)]
pub struct Stylesheet {
    ids: HashMap<String, Properties>,
    classes: HashMap<String, Properties>,
}

impl Stylesheet {
    /// Add the rules of one `<style>` block.
    pub fn add(&mut self, css: &str) {
        let css = strip_comments(css);

        for rule in css.split('}') {
            let Some((selectors, body)) = rule.split_once('{') else {
                continue;
            };
            let declarations = parse_declarations(body);
            if declarations.is_empty() {
                continue;
            }

            for selector in selectors.split(',').map(str::trim) {
                let target = match selector.split_at_checked(1) {
                    Some(("#", id)) if is_simple_name(id) => self.ids.entry(id.to_string()),
                    Some((".", class)) if is_simple_name(class) => {
                        self.classes.entry(class.to_string())
                    }
                    _ => continue,
                };
                target
                    .or_default()
                    .extend(declarations.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
    }

    /// The element's own properties after the cascade.
    pub fn cascade<N: SourceNode>(&self, node: &N) -> Properties {
        let mut props = Properties::new();

        if let Some(classes) = node.attr("class") {
            for class in classes.split_whitespace() {
                if let Some(rule) = self.classes.get(class) {
                    props.extend(rule.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }
        if let Some(rule) = node.attr("id").and_then(|id| self.ids.get(id)) {
            props.extend(rule.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        for name in PRESENTATION_ATTRIBUTES {
            if let Some(value) = node.attr(name) {
                props.insert(name.to_string(), value.trim().to_string());
            }
        }

        if let Some(style) = node.attr("style") {
            props.extend(parse_declarations(style));
        }

        props
    }
}

/// Combine inherited properties from the parent with an element's own.
pub fn computed(parent: &Properties, own: Properties) -> Properties {
    let mut out: Properties = parent
        .iter()
        .filter(|(k, _)| INHERITED_PROPERTIES.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    for (k, v) in own {
        if v != "inherit" {
            out.insert(k, v);
        }
    }
    out
}

/// Parse `prop: value; prop: value` declarations.
pub fn parse_declarations(style: &str) -> Properties {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(prop, value)| {
            let value = value.trim();
            let value = value.strip_suffix("!important").unwrap_or(value).trim();
            (prop.trim().to_string(), value.to_string())
        })
        .filter(|(prop, value)| !prop.is_empty() && !value.is_empty())
        .collect()
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn is_simple_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}
