//! Request body and query decoding
//!
//! Bodies are decoded by media type:
//!
//! | Content-Type                          | Result                           |
//! |---------------------------------------|----------------------------------|
//! | `application/json`, `*+json`          | JSON value                       |
//! | `application/x-www-form-urlencoded`   | mapping of field to string       |
//! | `application/xml`, `text/xml`, `*+xml`| root [`Element`]                 |
//!
//! Any other (or no) content type contributes no body. An empty body is
//! treated the same way.

use crate::error::{HttpError, Result};
use crate::request::Request;
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use sieve_core::{Element, Map, Value};
use tracing::trace;

/// How a body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Form,
    Xml,
}

impl BodyFormat {
    /// Format for a lowercased media type.
    pub fn from_media_type(media: &str) -> Option<Self> {
        match media {
            "application/json" => Some(BodyFormat::Json),
            "application/x-www-form-urlencoded" => Some(BodyFormat::Form),
            "application/xml" | "text/xml" => Some(BodyFormat::Xml),
            other if other.ends_with("+json") => Some(BodyFormat::Json),
            other if other.ends_with("+xml") => Some(BodyFormat::Xml),
            _ => None,
        }
    }
}

/// Decode the body of `req`; `None` when it has no decodable body.
pub fn decode_body(req: &Request) -> Result<Option<Value>> {
    let Some(format) = req.content_type().as_deref().and_then(BodyFormat::from_media_type) else {
        return Ok(None);
    };
    if req.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    trace!(format = ?format, bytes = req.body.len(), "Decoding request body");
    let value = match format {
        BodyFormat::Json => parse_json(&req.body)?,
        BodyFormat::Form => Value::Map(parse_form(&req.body)?),
        BodyFormat::Xml => Value::Element(parse_xml(&req.body)?),
    };
    Ok(Some(value))
}

pub fn parse_json(body: &[u8]) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| HttpError::BadRequest(format!("Failed to parse JSON body: {}", e)))?;
    Ok(Value::from(json))
}

/// Parse URL-encoded fields into a mapping. Repeated keys keep the last
/// value.
pub fn parse_form(body: &[u8]) -> Result<Map> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|e| HttpError::BadRequest(format!("Failed to parse form data: {}", e)))?;
    Ok(pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect())
}

/// Parse a raw query string (without `?`).
pub fn parse_query(query: &str) -> Result<Map> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
        .map_err(|e| HttpError::BadRequest(format!("Failed to parse query string: {}", e)))?;
    Ok(pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect())
}

fn xml_error(e: impl std::fmt::Display) -> HttpError {
    HttpError::BadRequest(format!("Failed to parse XML body: {}", e))
}

fn open_element(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Element> {
    let decoder = reader.decoder();
    let qname = start.name();
    let name = decoder.decode(qname.as_ref()).map_err(xml_error)?;
    let mut element = Element::new(name.into_owned());

    for attribute in start.attributes() {
        let attribute = attribute.map_err(xml_error)?;
        let key = decoder.decode(attribute.key.as_ref()).map_err(xml_error)?;
        let raw = decoder.decode(&attribute.value).map_err(xml_error)?;
        let value = unescape(&raw).map_err(xml_error)?;
        element
            .attributes
            .insert(key.into_owned(), value.into_owned());
    }
    Ok(element)
}

/// Parse a markup document into its root element.
///
/// Text content is trimmed. Children fold into the element's mapping view:
/// see [`Element::push_child`].
pub fn parse_xml(body: &[u8]) -> Result<Element> {
    let mut reader = Reader::from_reader(body);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(xml_error("more than one root element"));
                }
                let element = open_element(&reader, &start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&reader, &start)?;
                match stack.last_mut() {
                    Some(parent) => parent.push_child(element),
                    None if root.is_none() => root = Some(element),
                    None => return Err(xml_error("more than one root element")),
                }
            }
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| xml_error("unexpected closing tag"))?;
                element.text = element.text.trim().to_string();
                match stack.last_mut() {
                    Some(parent) => parent.push_child(element),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let raw = reader.decoder().decode(&text).map_err(xml_error)?;
                    current.text.push_str(&unescape(&raw).map_err(xml_error)?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    let raw = reader.decoder().decode(&data).map_err(xml_error)?;
                    current.text.push_str(&raw);
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(current) = stack.last_mut() {
                    if let Some(ch) = reference.resolve_char_ref().map_err(xml_error)? {
                        current.text.push(ch);
                    } else {
                        let name = reader.decoder().decode(&reference).map_err(xml_error)?;
                        let resolved = resolve_predefined_entity(&name)
                            .ok_or_else(|| xml_error(format!("unknown entity &{};", name)))?;
                        current.text.push_str(resolved);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(xml_error("unclosed element"));
    }
    root.ok_or_else(|| xml_error("document has no root element"))
}
