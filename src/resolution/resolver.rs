//! Links `$ref` slots to their target nodes.
//!
//! Resolution runs in passes. Each pass collects every slot that is still
//! unlinked, fetches the external documents those slots name (concurrently,
//! once per canonical url) and then links the slots one by one. Nodes read
//! out of external documents can carry new slots, which the next pass picks
//! up. The link is assigned as soon as the target node exists, so cyclic
//! references settle on the same node instead of being expanded again.

use futures::future::try_join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::source::{SourceLoader, canonical_location, join, working_directory};
use crate::core::error::{Error, Result};
use crate::model::pointer::value_at;
use crate::model::{
    Document, ExternalDocument, HttpMethod, Id, Parameter, PathItem, Reference, Response, Schema,
    ScopeId,
};
use crate::serialization::{Reader, detect_format};

/// Resolves the references of whole documents
pub struct Resolver {
    loader: Arc<dyn SourceLoader>,
}

impl Resolver {
    pub fn new(loader: Arc<dyn SourceLoader>) -> Self {
        Self { loader }
    }

    /// Loads the document at `location` and resolves it
    pub async fn load(&self, location: &str) -> Result<Document> {
        let url = canonical_location(location)?;
        debug!("Loading document from {url}");
        let value = self.loader.load(&fetch_location(&url)).await?;
        let mut document = Document::from_value(&value)?;
        document.source = Some(url.to_string());
        self.resolve(document).await
    }

    /// Links every reference slot of `document`.
    ///
    /// The document is consumed; on failure nothing partially linked is
    /// handed back.
    pub async fn resolve(&self, document: Document) -> Result<Document> {
        let mut linker = Linker::new(document)?;
        let mut pass = 0;
        loop {
            let slots = linker.pending();
            if slots.is_empty() {
                break;
            }
            pass += 1;
            self.fetch_missing(&mut linker, &slots).await?;

            let mut linked = 0;
            for slot in &slots {
                if linker.link(slot)? {
                    linked += 1;
                }
            }
            debug!("Resolution pass {pass} linked {linked} references");
        }
        Ok(linker.document)
    }

    async fn fetch_missing(&self, linker: &mut Linker, slots: &[Slot]) -> Result<()> {
        let mut missing: Vec<Url> = Vec::new();
        for slot in slots {
            let Some((scope, pointer)) = linker.reference_of(slot) else {
                continue;
            };
            if let Target::Unloaded(url) = linker.target(scope, &pointer)? {
                if !missing.contains(&url) {
                    missing.push(url);
                }
            }
        }
        if missing.is_empty() {
            return Ok(());
        }

        debug!("Fetching {} external documents", missing.len());
        let loads = missing.iter().map(|url| {
            let location = fetch_location(url);
            async move {
                debug!("Fetching external document {location}");
                self.loader.load(&location).await
            }
        });
        let values = try_join_all(loads).await?;
        for (url, value) in missing.into_iter().zip(values) {
            linker.add_external(url, value);
        }
        Ok(())
    }
}

/// Path item that holds a slot
#[derive(Debug, Clone)]
enum Owner {
    Path(String),
    Node(Id<PathItem>),
}

/// One unlinked reference slot
#[derive(Debug, Clone)]
enum Slot {
    Schema(Id<Schema>),
    SharedParameter(Id<Parameter>),
    SharedResponse(Id<Response>),
    PathItem(Owner),
    /// Parameter of a path item (`None`) or of one of its operations
    Parameter(Owner, Option<HttpMethod>, usize),
    Response(Owner, HttpMethod, String),
}

/// Which loaded document a pointer lands in
#[derive(Debug)]
enum Target {
    Root,
    External(usize),
    Unloaded(Url),
}

struct Linker {
    document: Document,
    /// Base for relative references of the root document
    base: Url,
    /// Canonical url of the root document, when it has one
    source: Option<Url>,
    /// Canonical urls of `document.externals`, by index
    externals: Vec<Url>,
    /// Path items copied out of the root document for local path references
    local_path_items: HashMap<String, Id<PathItem>>,
}

impl Linker {
    fn new(document: Document) -> Result<Self> {
        let source = document
            .source
            .as_deref()
            .map(canonical_location)
            .transpose()?;
        let base = match &source {
            Some(url) => url.clone(),
            None => working_directory()?,
        };
        let externals = document
            .externals
            .iter()
            .map(|external| canonical_location(&external.location))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            document,
            base,
            source,
            externals,
            local_path_items: HashMap::new(),
        })
    }

    fn pending(&self) -> Vec<Slot> {
        let document = &self.document;
        let mut slots = Vec::new();
        slots.extend(
            document
                .schemas
                .iter()
                .filter(|(_, schema)| unlinked(&schema.reference))
                .map(|(id, _)| Slot::Schema(id)),
        );
        slots.extend(
            document
                .parameter_nodes
                .iter()
                .filter(|(_, parameter)| unlinked(&parameter.reference))
                .map(|(id, _)| Slot::SharedParameter(id)),
        );
        slots.extend(
            document
                .response_nodes
                .iter()
                .filter(|(_, response)| unlinked(&response.reference))
                .map(|(id, _)| Slot::SharedResponse(id)),
        );
        for (path, item) in &document.paths {
            collect_path_item(Owner::Path(path.clone()), item, &mut slots);
        }
        for (id, item) in document.path_item_nodes.iter() {
            collect_path_item(Owner::Node(id), item, &mut slots);
        }
        slots
    }

    fn add_external(&mut self, url: Url, value: Value) {
        let format = detect_format(&value).unwrap_or(self.document.format);
        self.document
            .externals
            .push(ExternalDocument::new(url.as_str(), format, value));
        self.externals.push(url);
    }

    /// Scope and pointer text of the slot, if it is still unlinked
    fn reference_of(&self, slot: &Slot) -> Option<(ScopeId, String)> {
        fn parts<T>(reference: Option<&Reference<T>>) -> Option<(ScopeId, String)> {
            reference
                .filter(|reference| !reference.is_resolved())
                .map(|reference| (reference.scope, reference.pointer.clone()))
        }

        let document = &self.document;
        match slot {
            Slot::Schema(id) => parts(document.schemas.get(*id)?.reference.as_ref()),
            Slot::SharedParameter(id) => {
                parts(document.parameter_nodes.get(*id)?.reference.as_ref())
            }
            Slot::SharedResponse(id) => parts(document.response_nodes.get(*id)?.reference.as_ref()),
            Slot::PathItem(owner) => parts(self.path_item(owner)?.reference.as_ref()),
            Slot::Parameter(owner, method, index) => {
                let item = self.path_item(owner)?;
                let parameters = match method {
                    None => &item.parameters,
                    Some(method) => &item.operations.get(method)?.parameters,
                };
                parts(parameters.get(*index)?.reference.as_ref())
            }
            Slot::Response(owner, method, status) => {
                let operation = self.path_item(owner)?.operations.get(method)?;
                parts(operation.responses.get(status)?.reference.as_ref())
            }
        }
    }

    fn path_item(&self, owner: &Owner) -> Option<&PathItem> {
        match owner {
            Owner::Path(path) => self.document.paths.get(path),
            Owner::Node(id) => self.document.path_item_nodes.get(*id),
        }
    }

    fn path_item_mut(&mut self, owner: &Owner) -> Option<&mut PathItem> {
        match owner {
            Owner::Path(path) => self.document.paths.get_mut(path),
            Owner::Node(id) => self.document.path_item_nodes.get_mut(*id),
        }
    }

    /// Links one slot; false when there was nothing left to link
    fn link(&mut self, slot: &Slot) -> Result<bool> {
        match slot {
            Slot::Schema(id) => self.link_slot(
                |linker| linker.document.schemas.get_mut(*id)?.reference.as_mut(),
                Self::locate_schema,
            ),
            Slot::SharedParameter(id) => self.link_slot(
                |linker| linker.document.parameter_nodes.get_mut(*id)?.reference.as_mut(),
                Self::locate_parameter,
            ),
            Slot::SharedResponse(id) => self.link_slot(
                |linker| linker.document.response_nodes.get_mut(*id)?.reference.as_mut(),
                Self::locate_response,
            ),
            Slot::PathItem(owner) => self.link_slot(
                |linker| linker.path_item_mut(owner)?.reference.as_mut(),
                Self::locate_path_item,
            ),
            Slot::Parameter(owner, method, index) => self.link_slot(
                |linker| {
                    let item = linker.path_item_mut(owner)?;
                    let parameters = match method {
                        None => &mut item.parameters,
                        Some(method) => &mut item.operations.get_mut(method)?.parameters,
                    };
                    parameters.get_mut(*index)?.reference.as_mut()
                },
                Self::locate_parameter,
            ),
            Slot::Response(owner, method, status) => self.link_slot(
                |linker| {
                    let operation = linker.path_item_mut(owner)?.operations.get_mut(method)?;
                    operation.responses.get_mut(status)?.reference.as_mut()
                },
                Self::locate_response,
            ),
        }
    }

    fn link_slot<T>(
        &mut self,
        slot: impl Fn(&mut Linker) -> Option<&mut Reference<T>>,
        locate: fn(&mut Linker, ScopeId, &str) -> Result<Id<T>>,
    ) -> Result<bool> {
        let (scope, pointer) = match slot(&mut *self) {
            Some(reference) if !reference.is_resolved() => {
                (reference.scope, reference.pointer.clone())
            }
            _ => return Ok(false),
        };
        let target = locate(&mut *self, scope, &pointer)?;
        if let Some(reference) = slot(&mut *self) {
            reference.target = Some(target);
        }
        Ok(true)
    }

    fn target(&self, scope: ScopeId, pointer: &str) -> Result<Target> {
        let (location, _) = split(pointer);
        if location.is_empty() {
            return Ok(match scope {
                ScopeId::Root => Target::Root,
                ScopeId::External(index) => Target::External(index),
            });
        }
        let base = match scope {
            ScopeId::Root => &self.base,
            ScopeId::External(index) => self.externals.get(index).ok_or_else(|| {
                Error::reference_not_found(pointer, format!("external document #{index}"))
            })?,
        };
        let url = join(base, location)?;
        if self.source.as_ref() == Some(&url) {
            return Ok(Target::Root);
        }
        Ok(match self.externals.iter().position(|known| *known == url) {
            Some(index) => Target::External(index),
            None => Target::Unloaded(url),
        })
    }

    /// Target of a pointer whose document must already be loaded
    fn loaded_target(&self, scope: ScopeId, pointer: &str) -> Result<ScopeId> {
        match self.target(scope, pointer)? {
            Target::Root => Ok(ScopeId::Root),
            Target::External(index) => Ok(ScopeId::External(index)),
            Target::Unloaded(url) => Err(Error::load(url.as_str(), "document was not fetched")),
        }
    }

    fn root_not_found(&self, pointer: &str) -> Error {
        let document = self
            .document
            .source
            .clone()
            .unwrap_or_else(|| "the root document".to_string());
        Error::reference_not_found(pointer, document)
    }

    fn locate_schema(&mut self, scope: ScopeId, pointer: &str) -> Result<Id<Schema>> {
        let (_, fragment) = split(pointer);
        match self.loaded_target(scope, pointer)? {
            ScopeId::Root => self
                .document
                .schema_at(fragment)
                .ok_or_else(|| self.root_not_found(pointer)),
            ScopeId::External(index) => {
                if let Some(id) = self.document.externals[index].schemas.get(fragment) {
                    return Ok(*id);
                }
                let id = self.read_external(index, pointer, |reader, value| {
                    reader.read_named_schema(value)
                })?;
                self.document.externals[index]
                    .schemas
                    .insert(fragment.to_string(), id);
                Ok(id)
            }
        }
    }

    fn locate_parameter(&mut self, scope: ScopeId, pointer: &str) -> Result<Id<Parameter>> {
        let (_, fragment) = split(pointer);
        match self.loaded_target(scope, pointer)? {
            ScopeId::Root => self
                .document
                .parameter_at(fragment)
                .ok_or_else(|| self.root_not_found(pointer)),
            ScopeId::External(index) => {
                if let Some(id) = self.document.externals[index].parameters.get(fragment) {
                    return Ok(*id);
                }
                let parameter =
                    self.read_external(index, pointer, |reader, value| reader.read_parameter(value))?;
                let id = self.document.parameter_nodes.alloc(parameter);
                self.document.externals[index]
                    .parameters
                    .insert(fragment.to_string(), id);
                Ok(id)
            }
        }
    }

    fn locate_response(&mut self, scope: ScopeId, pointer: &str) -> Result<Id<Response>> {
        let (_, fragment) = split(pointer);
        match self.loaded_target(scope, pointer)? {
            ScopeId::Root => self
                .document
                .response_at(fragment)
                .ok_or_else(|| self.root_not_found(pointer)),
            ScopeId::External(index) => {
                if let Some(id) = self.document.externals[index].responses.get(fragment) {
                    return Ok(*id);
                }
                let produces: Vec<String> = self.document.externals[index]
                    .root
                    .get("produces")
                    .and_then(Value::as_array)
                    .map(|media| media.iter().filter_map(Value::as_str).map(String::from).collect())
                    .unwrap_or_default();
                let response = self.read_external(index, pointer, |reader, value| {
                    reader.read_response(value, &produces)
                })?;
                let id = self.document.response_nodes.alloc(response);
                self.document.externals[index]
                    .responses
                    .insert(fragment.to_string(), id);
                Ok(id)
            }
        }
    }

    fn locate_path_item(&mut self, scope: ScopeId, pointer: &str) -> Result<Id<PathItem>> {
        let (_, fragment) = split(pointer);
        match self.loaded_target(scope, pointer)? {
            ScopeId::Root => {
                if let Some(id) = self.local_path_items.get(fragment) {
                    return Ok(*id);
                }
                let item = self
                    .document
                    .path_item_at(fragment)
                    .ok_or_else(|| self.root_not_found(pointer))?;
                let id = self.document.path_item_nodes.alloc(item);
                self.local_path_items.insert(fragment.to_string(), id);
                Ok(id)
            }
            ScopeId::External(index) => {
                if let Some(id) = self.document.externals[index].path_items.get(fragment) {
                    return Ok(*id);
                }
                let item = self.read_external(index, pointer, |reader, value| {
                    reader.read_path_item(value, fragment)
                })?;
                let id = self.document.path_item_nodes.alloc(item);
                self.document.externals[index]
                    .path_items
                    .insert(fragment.to_string(), id);
                Ok(id)
            }
        }
    }

    /// Reads the value at the pointer's fragment out of an external document
    /// into the root document's arenas
    fn read_external<T>(
        &mut self,
        index: usize,
        pointer: &str,
        read: impl FnOnce(&mut Reader<'_>, &Value) -> Result<T>,
    ) -> Result<T> {
        let (_, fragment) = split(pointer);
        let external = &mut self.document.externals[index];
        let format = external.format;
        let location = external.location.clone();
        // the reader borrows the whole document, so the raw value is moved out meanwhile
        let root = std::mem::take(&mut external.root);
        let result = match value_at(&root, fragment) {
            Some(value) => {
                let mut reader =
                    Reader::new(&mut self.document, format, ScopeId::External(index), &root);
                read(&mut reader, value)
            }
            None => Err(Error::reference_not_found(pointer, location)),
        };
        self.document.externals[index].root = root;
        result
    }
}

fn unlinked<T>(reference: &Option<Reference<T>>) -> bool {
    reference
        .as_ref()
        .is_some_and(|reference| !reference.is_resolved())
}

fn collect_path_item(owner: Owner, item: &PathItem, slots: &mut Vec<Slot>) {
    if unlinked(&item.reference) {
        slots.push(Slot::PathItem(owner.clone()));
    }
    for (index, parameter) in item.parameters.iter().enumerate() {
        if unlinked(&parameter.reference) {
            slots.push(Slot::Parameter(owner.clone(), None, index));
        }
    }
    for (method, operation) in &item.operations {
        for (index, parameter) in operation.parameters.iter().enumerate() {
            if unlinked(&parameter.reference) {
                slots.push(Slot::Parameter(owner.clone(), Some(*method), index));
            }
        }
        for (status, response) in &operation.responses {
            if unlinked(&response.reference) {
                slots.push(Slot::Response(owner.clone(), *method, status.clone()));
            }
        }
    }
}

/// `other.json#/definitions/A` into `("other.json", "/definitions/A")`
fn split(pointer: &str) -> (&str, &str) {
    pointer.split_once('#').unwrap_or((pointer, ""))
}

/// What a loader is handed: a plain path for files, the url otherwise
fn fetch_location(url: &Url) -> String {
    if url.scheme() == "file" {
        if let Ok(path) = url.to_file_path() {
            return path.display().to_string();
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves fixed documents and records every fetch
    struct MapLoader {
        documents: HashMap<String, Value>,
        fetched: Mutex<Vec<String>>,
    }

    impl MapLoader {
        fn new(documents: Vec<(&str, Value)>) -> Arc<Self> {
            Arc::new(Self {
                documents: documents
                    .into_iter()
                    .map(|(location, value)| (location.to_string(), value))
                    .collect(),
                fetched: Mutex::new(Vec::new()),
            })
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SourceLoader for MapLoader {
        async fn load(&self, location: &str) -> Result<Value> {
            self.fetched.lock().unwrap().push(location.to_string());
            self.documents
                .get(location)
                .cloned()
                .ok_or_else(|| Error::load(location, "HTTP 404"))
        }
    }

    const ROOT: &str = "https://example.com/api/root.json";

    #[tokio::test]
    async fn test_self_reference_links_to_the_same_node() {
        let document = Document::from_value(&json!({
            "swagger": "2.0",
            "info": {"title": "Tree", "version": "1"},
            "paths": {},
            "definitions": {
                "Node": {
                    "type": "object",
                    "properties": {
                        "children": {"type": "array", "items": {"$ref": "#/definitions/Node"}}
                    }
                }
            }
        }))
        .unwrap();

        let resolver = Resolver::new(MapLoader::new(vec![]));
        let document = resolver.resolve(document).await.unwrap();

        let node = document.definitions["Node"];
        let children = document.schemas[node].properties["children"];
        let item = document.schemas[children].items.unwrap();
        let link = document.schemas[item].reference.as_ref().unwrap();
        assert_eq!(link.target, Some(node));
        assert_eq!(document.schemas.actual(item).unwrap(), node);
    }

    #[tokio::test]
    async fn test_shared_parameter_and_response_are_linked() {
        let document = Document::from_value(&json!({
            "openapi": "3.0.0",
            "info": {"title": "Shared", "version": "1"},
            "paths": {
                "/pets": {
                    "get": {
                        "parameters": [{"$ref": "#/components/parameters/Limit"}],
                        "responses": {"default": {"$ref": "#/components/responses/Error"}}
                    }
                }
            },
            "components": {
                "parameters": {
                    "Limit": {"name": "limit", "in": "query", "schema": {"type": "integer"}}
                },
                "responses": {"Error": {"description": "failure"}}
            }
        }))
        .unwrap();

        let resolver = Resolver::new(MapLoader::new(vec![]));
        let document = resolver.resolve(document).await.unwrap();

        let operation = &document.paths["/pets"].operations[&HttpMethod::Get];
        let parameter = document.actual_parameter(&operation.parameters[0]).unwrap();
        assert_eq!(parameter.name, "limit");
        let response = document
            .actual_response(&operation.responses["default"])
            .unwrap();
        assert_eq!(response.description, "failure");
    }

    #[tokio::test]
    async fn test_dangling_local_pointer_fails() {
        let document = Document::from_value(&json!({
            "swagger": "2.0",
            "info": {"title": "Broken", "version": "1"},
            "paths": {},
            "definitions": {"A": {"$ref": "#/definitions/Missing"}}
        }))
        .unwrap();

        let resolver = Resolver::new(MapLoader::new(vec![]));
        let error = resolver.resolve(document).await.unwrap_err();
        assert!(
            matches!(error, Error::ReferenceNotFound { reference, .. } if reference == "#/definitions/Missing")
        );
    }

    #[tokio::test]
    async fn test_external_document_is_fetched_once() {
        let loader = MapLoader::new(vec![
            (
                ROOT,
                json!({
                    "swagger": "2.0",
                    "info": {"title": "Pets", "version": "1"},
                    "paths": {},
                    "definitions": {
                        "Pet": {"$ref": "types.json#/definitions/Pet"},
                        "Owner": {"$ref": "types.json#/definitions/Owner"}
                    }
                }),
            ),
            (
                "https://example.com/api/types.json",
                json!({
                    "definitions": {
                        "Pet": {"type": "object", "properties": {"owner": {"$ref": "#/definitions/Owner"}}},
                        "Owner": {"type": "object", "properties": {"name": {"type": "string"}}}
                    }
                }),
            ),
        ]);

        let resolver = Resolver::new(loader.clone());
        let document = resolver.load(ROOT).await.unwrap();

        assert_eq!(
            loader.fetched(),
            vec![ROOT.to_string(), "https://example.com/api/types.json".to_string()]
        );
        let owner = document.actual_schema_id(document.definitions["Owner"]).unwrap();
        let pet = document.actual_schema(document.definitions["Pet"]).unwrap();
        // the nested pointer lands on the node the root definition links to
        assert_eq!(document.actual_schema_id(pet.properties["owner"]).unwrap(), owner);
        assert_eq!(document.externals.len(), 1);
    }

    #[tokio::test]
    async fn test_cross_file_cycle_terminates() {
        let loader = MapLoader::new(vec![
            (
                ROOT,
                json!({
                    "swagger": "2.0",
                    "info": {"title": "Cycle", "version": "1"},
                    "paths": {},
                    "definitions": {"A": {"$ref": "a.json#/A"}}
                }),
            ),
            (
                "https://example.com/api/a.json",
                json!({"A": {"type": "object", "properties": {"b": {"$ref": "b.json#/B"}}}}),
            ),
            (
                "https://example.com/api/b.json",
                json!({"B": {"type": "object", "properties": {"a": {"$ref": "a.json#/A"}}}}),
            ),
        ]);

        let resolver = Resolver::new(loader.clone());
        let document = resolver.load(ROOT).await.unwrap();

        let a = document.actual_schema_id(document.definitions["A"]).unwrap();
        let b = document.actual_schema_id(document.schemas[a].properties["b"]).unwrap();
        let back = document.actual_schema_id(document.schemas[b].properties["a"]).unwrap();
        assert_eq!(back, a);
        assert_eq!(loader.fetched().len(), 3);
    }

    #[tokio::test]
    async fn test_reference_back_into_root_uses_root_nodes() {
        let loader = MapLoader::new(vec![
            (
                ROOT,
                json!({
                    "swagger": "2.0",
                    "info": {"title": "Back", "version": "1"},
                    "paths": {},
                    "definitions": {
                        "Error": {"type": "object"},
                        "Wrapper": {"$ref": "wrapper.json#/Wrapper"}
                    }
                }),
            ),
            (
                "https://example.com/api/wrapper.json",
                json!({"Wrapper": {"type": "object", "properties": {"error": {"$ref": "root.json#/definitions/Error"}}}}),
            ),
        ]);

        let resolver = Resolver::new(loader.clone());
        let document = resolver.load(ROOT).await.unwrap();

        let wrapper = document.actual_schema(document.definitions["Wrapper"]).unwrap();
        assert_eq!(
            document.actual_schema_id(wrapper.properties["error"]).unwrap(),
            document.definitions["Error"]
        );
        assert_eq!(loader.fetched().len(), 2);
    }

    #[tokio::test]
    async fn test_external_path_item() {
        let loader = MapLoader::new(vec![
            (
                ROOT,
                json!({
                    "openapi": "3.0.0",
                    "info": {"title": "Paths", "version": "1"},
                    "paths": {"/pets": {"$ref": "paths.json#/pets"}}
                }),
            ),
            (
                "https://example.com/api/paths.json",
                json!({
                    "pets": {
                        "description": "Pet collection",
                        "get": {"operationId": "listPets", "responses": {"200": {"description": "ok"}}}
                    }
                }),
            ),
        ]);

        let resolver = Resolver::new(loader);
        let document = resolver.load(ROOT).await.unwrap();

        let item = document.actual_path_item(&document.paths["/pets"]).unwrap();
        assert_eq!(item.description.as_deref(), Some("Pet collection"));
        assert_eq!(
            item.operations[&HttpMethod::Get].operation_id.as_deref(),
            Some("listPets")
        );
    }

    #[tokio::test]
    async fn test_unreachable_external_document_fails_to_load() {
        let loader = MapLoader::new(vec![(
            ROOT,
            json!({
                "swagger": "2.0",
                "info": {"title": "Missing", "version": "1"},
                "paths": {},
                "definitions": {"A": {"$ref": "gone.json#/A"}}
            }),
        )]);

        let resolver = Resolver::new(loader);
        let error = resolver.load(ROOT).await.unwrap_err();
        assert!(
            matches!(error, Error::Load { location, .. } if location == "https://example.com/api/gone.json")
        );
    }
}
