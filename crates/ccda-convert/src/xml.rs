//! Minimal owned element tree built with `quick-xml`.
//!
//! CCDA documents are small enough to hold in memory, and the converter
//! navigates them by local name, so namespaces and prefixes are dropped.

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};

/// An XML element with local-name keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value, treating an empty string as absent.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|value| !value.trim().is_empty())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Follows a chain of first-child lookups.
    pub fn find_path(&self, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |element, name| element.child(name))
    }

    /// All descendants named `name`, outermost first, without descending into
    /// a match.
    pub fn find_outermost<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                out.push(child);
            } else {
                child.find_outermost(name, out);
            }
        }
    }

    /// Concatenated text of this element and its descendants, whitespace collapsed.
    pub fn deep_text(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        out.push(' ');
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

/// Parses a whole document into its root element.
///
/// Returns a human-readable message on failure; callers attach the document
/// name.
pub fn parse_document(text: &str) -> Result<Element, String> {
    let mut reader = Reader::from_str(text);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|err| format!("{err} at byte {}", reader.error_position()))?;
        match event {
            Event::Start(start) => {
                stack.push(open_element(&start)?);
            }
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let raw = std::str::from_utf8(&text).map_err(|err| err.to_string())?;
                let value = unescape(raw).map_err(|err| err.to_string())?;
                push_text(&mut stack, &value);
            }
            Event::CData(data) => {
                let value = std::str::from_utf8(&data).map_err(|err| err.to_string())?;
                push_text(&mut stack, value);
            }
            Event::GeneralRef(reference) => {
                let name = std::str::from_utf8(&reference).map_err(|err| err.to_string())?;
                let value = resolve_reference(name)
                    .ok_or_else(|| format!("unknown entity reference '&{name};'"))?;
                push_text(&mut stack, &value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element '{}'", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, String> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| err.to_string())?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let raw = std::str::from_utf8(&attribute.value).map_err(|err| err.to_string())?;
        let value = unescape(raw).map_err(|err| err.to_string())?;
        attributes.push((key, value.into_owned()));
    }
    Ok(Element {
        name,
        attributes,
        ..Element::default()
    })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(format!("second root element '{}'", element.name)),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], value: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.push_str(value);
    }
}

fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse().ok(),
        };
        return parsed.and_then(char::from_u32).map(String::from);
    }
    resolve_predefined_entity(name).map(str::to_string)
}
