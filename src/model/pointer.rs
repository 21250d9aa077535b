//! JSON-pointer navigation over raw values and over the document model.

use percent_encoding::percent_decode_str;
use serde_json::Value;

use super::arena::Id;
use super::document::Document;
use super::operation::{HttpMethod, Parameter, PathItem, Response};
use super::schema::{AdditionalProperties, Schema};

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent escapes)
pub fn decode_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded).decode_utf8_lossy().into_owned()
}

/// Escapes a map key for use as a pointer segment
pub fn encode_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Decoded segments of a fragment such as `/definitions/Pet` or `#/definitions/Pet`
pub fn segments(fragment: &str) -> Vec<String> {
    let fragment = fragment.trim_start_matches('#');
    if fragment.is_empty() || fragment == "/" {
        return Vec::new();
    }
    fragment
        .trim_start_matches('/')
        .split('/')
        .map(decode_segment)
        .collect()
}

/// Looks up `fragment` inside a raw value
pub fn value_at<'a>(root: &'a Value, fragment: &str) -> Option<&'a Value> {
    segments(fragment)
        .iter()
        .try_fold(root, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

impl Document {
    /// Schema node addressed by a local fragment, walking the model the way
    /// the fragment would walk the wire text of either format
    pub fn schema_at(&self, fragment: &str) -> Option<Id<Schema>> {
        let segments = segments(fragment);
        match segments.as_slice() {
            [first, name, tail @ ..] if first == "definitions" => {
                self.descend_schema(*self.definitions.get(name)?, tail)
            }
            [first, second, name, tail @ ..] if first == "components" && second == "schemas" => {
                self.descend_schema(*self.definitions.get(name)?, tail)
            }
            [first, name, tail @ ..] if first == "parameters" => {
                let parameter = &self.parameter_nodes[*self.parameters.get(name)?];
                self.descend_parameter(parameter, tail)
            }
            [first, second, name, tail @ ..]
                if first == "components" && second == "parameters" =>
            {
                let parameter = &self.parameter_nodes[*self.parameters.get(name)?];
                self.descend_parameter(parameter, tail)
            }
            [first, name, tail @ ..] if first == "responses" => {
                let response = &self.response_nodes[*self.responses.get(name)?];
                self.descend_response(response, tail)
            }
            [first, second, name, tail @ ..]
                if first == "components" && second == "responses" =>
            {
                let response = &self.response_nodes[*self.responses.get(name)?];
                self.descend_response(response, tail)
            }
            [first, path, method, tail @ ..] if first == "paths" => {
                let item = self.paths.get(path)?;
                let operation = item.operations.get(&HttpMethod::parse(method)?)?;
                match tail {
                    [section, index, tail @ ..] if section == "parameters" => {
                        let parameter = operation.parameters.get(index.parse::<usize>().ok()?)?;
                        self.descend_parameter(parameter, tail)
                    }
                    [section, code, tail @ ..] if section == "responses" => {
                        self.descend_response(operation.responses.get(code)?, tail)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn descend_parameter(&self, parameter: &Parameter, rest: &[String]) -> Option<Id<Schema>> {
        match rest {
            [schema, tail @ ..] if schema == "schema" => self.descend_schema(parameter.schema?, tail),
            _ => None,
        }
    }

    fn descend_response(&self, response: &Response, rest: &[String]) -> Option<Id<Schema>> {
        match rest {
            [schema, tail @ ..] if schema == "schema" => self.descend_schema(response.schema()?, tail),
            [content, media, schema, tail @ ..] if content == "content" && schema == "schema" => {
                self.descend_schema(response.content.get(media)?.schema?, tail)
            }
            _ => None,
        }
    }

    fn descend_schema(&self, start: Id<Schema>, rest: &[String]) -> Option<Id<Schema>> {
        let mut current = start;
        let mut rest = rest;
        while !rest.is_empty() {
            let node = &self.schemas[current];
            let (next, tail) = match rest {
                [key, name, tail @ ..] if key == "properties" => {
                    (*node.properties.get(name)?, tail)
                }
                [key, tail @ ..] if key == "items" => (node.items?, tail),
                [key, tail @ ..] if key == "additionalProperties" => {
                    match node.additional_properties? {
                        AdditionalProperties::Schema(id) => (id, tail),
                        AdditionalProperties::Allowed(_) => return None,
                    }
                }
                [key, tail @ ..] if key == "not" => (node.not?, tail),
                [key, index, tail @ ..] if key == "allOf" || key == "oneOf" || key == "anyOf" => {
                    let list = match key.as_str() {
                        "allOf" => &node.all_of,
                        "oneOf" => &node.one_of,
                        _ => &node.any_of,
                    };
                    (*list.get(index.parse::<usize>().ok()?)?, tail)
                }
                _ => return None,
            };
            current = next;
            rest = tail;
        }
        Some(current)
    }

    /// Shared parameter addressed by a local fragment
    pub fn parameter_at(&self, fragment: &str) -> Option<Id<Parameter>> {
        match segments(fragment).as_slice() {
            [first, name] if first == "parameters" => self.parameters.get(name).copied(),
            [first, second, name] if first == "components" && second == "parameters" => {
                self.parameters.get(name).copied()
            }
            _ => None,
        }
    }

    /// Shared response addressed by a local fragment
    pub fn response_at(&self, fragment: &str) -> Option<Id<Response>> {
        match segments(fragment).as_slice() {
            [first, name] if first == "responses" => self.responses.get(name).copied(),
            [first, second, name] if first == "components" && second == "responses" => {
                self.responses.get(name).copied()
            }
            _ => None,
        }
    }

    /// Path item addressed by a local fragment, cloned for linking
    pub fn path_item_at(&self, fragment: &str) -> Option<PathItem> {
        match segments(fragment).as_slice() {
            [first, path] if first == "paths" => self.paths.get(path).cloned(),
            _ => None,
        }
    }
}
