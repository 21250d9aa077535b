//! Security schemes on the wire.
//!
//! | model | Swagger 2.0 | OpenAPI 3 |
//! |---|---|---|
//! | `Basic` | `type: basic` | `type: http, scheme: basic` |
//! | `OAuth2` grants | one `flow` + top-level urls | `flows` keyed by grant |
//!
//! A grant is read for any scheme type that carries one, so a Swagger `basic`
//! scheme with an `authorizationUrl` keeps its url in both formats.

use serde_json::{Map, Value};

use super::reader::Reader;
use super::writer::Writer;
use super::{as_object, extensions_of, put_extensions, put_str, str_of};
use crate::core::error::{Error, Result};
use crate::model::{
    ApiKeyLocation, OAuth2Flow, OAuthFlow, OAuthFlows, SecurityScheme, SecuritySchemeType,
    WireFormat,
};

const SCHEME_KEYS: &[&str] = &[
    "type",
    "description",
    "name",
    "in",
    "scheme",
    "bearerFormat",
    "openIdConnectUrl",
    "flow",
    "flows",
    "authorizationUrl",
    "tokenUrl",
    "refreshUrl",
    "scopes",
];

const FLOW_KEYS: &[&str] = &["authorizationUrl", "tokenUrl", "refreshUrl", "scopes"];

impl Reader<'_> {
    pub(super) fn read_security_scheme(&mut self, value: &Value) -> Result<SecurityScheme> {
        let map = as_object(value, "security scheme")?;
        let type_name = str_of(map, "type").ok_or_else(|| Error::parse("security scheme without a type"))?;
        let scheme_type = match type_name.as_str() {
            "basic" => SecuritySchemeType::Basic,
            "apiKey" => SecuritySchemeType::ApiKey,
            "http" => SecuritySchemeType::Http,
            "oauth2" => SecuritySchemeType::OAuth2,
            "openIdConnect" => SecuritySchemeType::OpenIdConnect,
            other => {
                return Err(Error::parse(format!("unknown security scheme type '{other}'")));
            }
        };

        let mut scheme = SecurityScheme::new(scheme_type);
        scheme.description = str_of(map, "description");
        scheme.name = str_of(map, "name");
        scheme.location = map.get("in").and_then(Value::as_str).and_then(ApiKeyLocation::parse);
        scheme.scheme = str_of(map, "scheme");
        scheme.bearer_format = str_of(map, "bearerFormat");
        scheme.open_id_connect_url = str_of(map, "openIdConnectUrl");
        scheme.extensions = extensions_of(map, SCHEME_KEYS);

        if let Some(flows) = map.get("flows") {
            scheme.flows = read_flows(flows)?;
        }
        let flow = read_flow(map);
        let named = map.get("flow").and_then(Value::as_str);
        if named.is_some() || !flow.is_empty() {
            let grant = match named {
                Some(name) => OAuth2Flow::from_swagger_name(name)
                    .or_else(|| OAuth2Flow::from_openapi_name(name))
                    .ok_or_else(|| Error::parse(format!("unknown OAuth2 flow '{name}'")))?,
                None => OAuth2Flow::infer(
                    flow.authorization_url.is_some(),
                    flow.token_url.is_some(),
                ),
            };
            *scheme.flows.slot_mut(grant) = Some(flow);
        }
        Ok(scheme)
    }
}

fn read_flow(map: &Map<String, Value>) -> OAuthFlow {
    OAuthFlow {
        authorization_url: str_of(map, "authorizationUrl"),
        token_url: str_of(map, "tokenUrl"),
        refresh_url: str_of(map, "refreshUrl"),
        scopes: map
            .get("scopes")
            .and_then(Value::as_object)
            .map(|scopes| {
                scopes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.as_str().unwrap_or_default().to_string()))
                    .collect()
            })
            .unwrap_or_default(),
        extensions: Default::default(),
    }
}

fn read_flows(value: &Value) -> Result<OAuthFlows> {
    let map = as_object(value, "flows")?;
    let mut flows = OAuthFlows::default();
    for (key, value) in map {
        match OAuth2Flow::from_openapi_name(key) {
            Some(grant) => {
                let flow_map = as_object(value, &format!("flow '{key}'"))?;
                let mut flow = read_flow(flow_map);
                flow.extensions = extensions_of(flow_map, FLOW_KEYS);
                *flows.slot_mut(grant) = Some(flow);
            }
            None => {
                flows.extensions.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(flows)
}

fn write_flow(map: &mut Map<String, Value>, flow: &OAuthFlow, with_scopes: bool) {
    put_str(map, "authorizationUrl", &flow.authorization_url);
    put_str(map, "tokenUrl", &flow.token_url);
    put_str(map, "refreshUrl", &flow.refresh_url);
    if with_scopes || !flow.scopes.is_empty() {
        let scopes = flow
            .scopes
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        map.insert("scopes".to_string(), Value::Object(scopes));
    }
}

impl Writer<'_> {
    pub(super) fn write_security_scheme(&self, name: &str, scheme: &SecurityScheme) -> Result<Value> {
        let mut map = Map::new();
        match self.format {
            WireFormat::Swagger2 => self.write_swagger_scheme(&mut map, name, scheme)?,
            WireFormat::OpenApi3 => self.write_openapi_scheme(&mut map, scheme),
        }
        put_extensions(&mut map, &scheme.extensions);
        Ok(Value::Object(map))
    }

    fn write_swagger_scheme(
        &self,
        map: &mut Map<String, Value>,
        name: &str,
        scheme: &SecurityScheme,
    ) -> Result<()> {
        let type_name = match scheme.scheme_type {
            SecuritySchemeType::Basic => "basic",
            SecuritySchemeType::Http if scheme.is_basic() => "basic",
            SecuritySchemeType::Http => {
                tracing::warn!(
                    "Security scheme '{name}' uses http/{} which Swagger 2.0 lacks, written as an Authorization header api key",
                    scheme.scheme.as_deref().unwrap_or("?")
                );
                "apiKey"
            }
            SecuritySchemeType::ApiKey => "apiKey",
            SecuritySchemeType::OAuth2 => "oauth2",
            SecuritySchemeType::OpenIdConnect => {
                return Err(Error::FormatMismatch {
                    feature: format!("openIdConnect security scheme '{name}'"),
                    format: WireFormat::Swagger2.to_string(),
                });
            }
        };
        map.insert("type".to_string(), Value::from(type_name));
        put_str(map, "description", &scheme.description);

        if type_name == "apiKey" {
            let (key_name, location) = match scheme.scheme_type {
                SecuritySchemeType::Http => (Some("Authorization".to_string()), ApiKeyLocation::Header),
                _ => (
                    scheme.name.clone(),
                    scheme.location.unwrap_or(ApiKeyLocation::Header),
                ),
            };
            let location = if location == ApiKeyLocation::Cookie {
                tracing::warn!("Cookie api key '{name}' written as a header for Swagger 2.0");
                ApiKeyLocation::Header
            } else {
                location
            };
            put_str(map, "name", &key_name);
            map.insert("in".to_string(), Value::from(location.as_str()));
        }

        if let Some((grant, flow)) = scheme.flows.primary() {
            if scheme.flows.iter().count() > 1 {
                tracing::warn!(
                    "Security scheme '{name}' declares several OAuth2 grants, Swagger 2.0 keeps only '{}'",
                    grant.swagger_name()
                );
            }
            map.insert("flow".to_string(), Value::from(grant.swagger_name()));
            write_flow(map, flow, scheme.scheme_type == SecuritySchemeType::OAuth2);
        }
        Ok(())
    }

    fn write_openapi_scheme(&self, map: &mut Map<String, Value>, scheme: &SecurityScheme) {
        let type_name = match scheme.scheme_type {
            SecuritySchemeType::Basic | SecuritySchemeType::Http => "http",
            SecuritySchemeType::ApiKey => "apiKey",
            SecuritySchemeType::OAuth2 => "oauth2",
            SecuritySchemeType::OpenIdConnect => "openIdConnect",
        };
        map.insert("type".to_string(), Value::from(type_name));
        put_str(map, "description", &scheme.description);
        match scheme.scheme_type {
            SecuritySchemeType::Basic => {
                map.insert("scheme".to_string(), Value::from("basic"));
            }
            SecuritySchemeType::Http => {
                put_str(map, "scheme", &scheme.scheme);
                put_str(map, "bearerFormat", &scheme.bearer_format);
            }
            SecuritySchemeType::ApiKey => {
                put_str(map, "name", &scheme.name);
                if let Some(location) = scheme.location {
                    map.insert("in".to_string(), Value::from(location.as_str()));
                }
            }
            SecuritySchemeType::OpenIdConnect => {
                put_str(map, "openIdConnectUrl", &scheme.open_id_connect_url);
            }
            SecuritySchemeType::OAuth2 => {}
        }

        if !scheme.flows.is_empty() {
            let mut flows = Map::new();
            for (grant, flow) in scheme.flows.iter() {
                let mut object = Map::new();
                write_flow(&mut object, flow, true);
                put_extensions(&mut object, &flow.extensions);
                flows.insert(grant.openapi_name().to_string(), Value::Object(object));
            }
            put_extensions(&mut flows, &scheme.flows.extensions);
            map.insert("flows".to_string(), Value::Object(flows));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::error::Error;
    use crate::model::{Document, OAuth2Flow, SecuritySchemeType, WireFormat};
    use serde_json::json;

    fn swagger_with(schemes: serde_json::Value) -> Document {
        Document::from_value(&json!({
            "swagger": "2.0",
            "info": { "title": "T", "version": "1" },
            "paths": {},
            "securityDefinitions": schemes
        }))
        .unwrap()
    }

    #[test]
    fn test_basic_with_flow_projects_to_http_basic() {
        let document = swagger_with(json!({
            "Foo": { "type": "basic", "flow": "application", "authorizationUrl": "AuthUrl" }
        }));

        let openapi = document.to_value(WireFormat::OpenApi3).unwrap();
        let scheme = &openapi["components"]["securitySchemes"]["Foo"];
        assert_eq!(scheme["type"], json!("http"));
        assert_eq!(scheme["scheme"], json!("basic"));
        assert!(scheme.get("flow").is_none());
        assert_eq!(
            scheme["flows"]["clientCredentials"]["authorizationUrl"],
            json!("AuthUrl")
        );
    }

    #[test]
    fn test_http_basic_with_flows_projects_to_swagger_basic() {
        let document = Document::from_value(&json!({
            "openapi": "3.0.0",
            "info": { "title": "T", "version": "1" },
            "paths": {},
            "components": { "securitySchemes": { "Foo": {
                "type": "http",
                "scheme": "basic",
                "flows": { "authorizationCode": { "authorizationUrl": "AuthUrl", "scopes": {} } }
            } } }
        }))
        .unwrap();

        let swagger = document.to_value(WireFormat::Swagger2).unwrap();
        let scheme = &swagger["securityDefinitions"]["Foo"];
        assert_eq!(scheme["type"], json!("basic"));
        assert_eq!(scheme["authorizationUrl"], json!("AuthUrl"));
        assert_eq!(scheme["flow"], json!("accessCode"));
        assert!(scheme.get("flows").is_none());
    }

    #[test]
    fn test_oauth2_grant_inferred_from_urls() {
        let document = swagger_with(json!({
            "oauth": { "type": "oauth2", "authorizationUrl": "https://auth", "scopes": { "read": "Read" } }
        }));
        let scheme = &document.security_schemes["oauth"];
        assert_eq!(scheme.scheme_type, SecuritySchemeType::OAuth2);
        let (grant, flow) = scheme.flows.primary().unwrap();
        assert_eq!(grant, OAuth2Flow::Implicit);
        assert_eq!(flow.scopes["read"], "Read");
    }

    #[test]
    fn test_open_id_connect_has_no_swagger_form() {
        let document = Document::from_value(&json!({
            "openapi": "3.0.0",
            "info": { "title": "T", "version": "1" },
            "paths": {},
            "components": { "securitySchemes": {
                "oidc": { "type": "openIdConnect", "openIdConnectUrl": "https://id" }
            } }
        }))
        .unwrap();

        let error = document.to_value(WireFormat::Swagger2).unwrap_err();
        assert!(matches!(error, Error::FormatMismatch { .. }));
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_bearer_downgrade_is_logged() {
        let document = Document::from_value(&json!({
            "openapi": "3.0.0",
            "info": { "title": "T", "version": "1" },
            "paths": {},
            "components": { "securitySchemes": {
                "jwt": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }
            } }
        }))
        .unwrap();

        let swagger = document.to_value(WireFormat::Swagger2).unwrap();
        let scheme = &swagger["securityDefinitions"]["jwt"];
        assert_eq!(scheme["type"], json!("apiKey"));
        assert_eq!(scheme["name"], json!("Authorization"));
        assert_eq!(scheme["in"], json!("header"));
        assert!(logs_contain("Authorization header api key"));
    }
}
