//! Security schemes.
//!
//! One superset shape is stored for both wire formats. OAuth2 grants always
//! live in [`OAuthFlows`]; a Swagger 2.0 `flow` plus its top-level urls is
//! read into the matching grant slot and projected back when writing.

use indexmap::IndexMap;
use std::fmt;

use super::Extensions;

/// Kind of a security scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecuritySchemeType {
    /// Swagger 2.0 `basic`; written as `http`/`basic` under OpenAPI 3
    Basic,
    ApiKey,
    /// OpenAPI 3 `http` with an explicit `scheme`
    Http,
    OAuth2,
    OpenIdConnect,
}

impl fmt::Display for SecuritySchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SecuritySchemeType::Basic => "basic",
            SecuritySchemeType::ApiKey => "apiKey",
            SecuritySchemeType::Http => "http",
            SecuritySchemeType::OAuth2 => "oauth2",
            SecuritySchemeType::OpenIdConnect => "openIdConnect",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

impl ApiKeyLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyLocation::Query => "query",
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Cookie => "cookie",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "query" => Some(ApiKeyLocation::Query),
            "header" => Some(ApiKeyLocation::Header),
            "cookie" => Some(ApiKeyLocation::Cookie),
            _ => None,
        }
    }
}

/// OAuth2 grant, named the Swagger 2.0 way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuth2Flow {
    Implicit,
    Password,
    /// `clientCredentials` under OpenAPI 3
    Application,
    /// `authorizationCode` under OpenAPI 3
    AccessCode,
}

impl OAuth2Flow {
    pub const ALL: [OAuth2Flow; 4] = [
        OAuth2Flow::Implicit,
        OAuth2Flow::Password,
        OAuth2Flow::Application,
        OAuth2Flow::AccessCode,
    ];

    /// Swagger 2.0 `flow` value
    pub fn swagger_name(&self) -> &'static str {
        match self {
            OAuth2Flow::Implicit => "implicit",
            OAuth2Flow::Password => "password",
            OAuth2Flow::Application => "application",
            OAuth2Flow::AccessCode => "accessCode",
        }
    }

    /// Key in the OpenAPI 3 `flows` object
    pub fn openapi_name(&self) -> &'static str {
        match self {
            OAuth2Flow::Implicit => "implicit",
            OAuth2Flow::Password => "password",
            OAuth2Flow::Application => "clientCredentials",
            OAuth2Flow::AccessCode => "authorizationCode",
        }
    }

    pub fn from_swagger_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.swagger_name() == s)
    }

    pub fn from_openapi_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.openapi_name() == s)
    }

    /// Grant implied by which urls are present, for Swagger input without `flow`
    pub fn infer(authorization_url: bool, token_url: bool) -> Self {
        match (authorization_url, token_url) {
            (true, true) => OAuth2Flow::AccessCode,
            (true, false) => OAuth2Flow::Implicit,
            (false, true) => OAuth2Flow::Application,
            (false, false) => OAuth2Flow::Implicit,
        }
    }
}

/// Urls and scopes of one grant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuthFlow {
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    pub refresh_url: Option<String>,
    pub scopes: IndexMap<String, String>,
    pub extensions: Extensions,
}

impl OAuthFlow {
    pub fn is_empty(&self) -> bool {
        self.authorization_url.is_none()
            && self.token_url.is_none()
            && self.refresh_url.is_none()
            && self.scopes.is_empty()
    }
}

/// Grant slots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuthFlows {
    pub implicit: Option<OAuthFlow>,
    pub password: Option<OAuthFlow>,
    pub client_credentials: Option<OAuthFlow>,
    pub authorization_code: Option<OAuthFlow>,
    pub extensions: Extensions,
}

impl OAuthFlows {
    pub fn get(&self, flow: OAuth2Flow) -> Option<&OAuthFlow> {
        match flow {
            OAuth2Flow::Implicit => self.implicit.as_ref(),
            OAuth2Flow::Password => self.password.as_ref(),
            OAuth2Flow::Application => self.client_credentials.as_ref(),
            OAuth2Flow::AccessCode => self.authorization_code.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, flow: OAuth2Flow) -> &mut Option<OAuthFlow> {
        match flow {
            OAuth2Flow::Implicit => &mut self.implicit,
            OAuth2Flow::Password => &mut self.password,
            OAuth2Flow::Application => &mut self.client_credentials,
            OAuth2Flow::AccessCode => &mut self.authorization_code,
        }
    }

    /// Populated grants in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (OAuth2Flow, &OAuthFlow)> {
        OAuth2Flow::ALL
            .into_iter()
            .filter_map(|grant| self.get(grant).map(|flow| (grant, flow)))
    }

    /// First populated grant, the one a single Swagger `flow` can carry
    pub fn primary(&self) -> Option<(OAuth2Flow, &OAuthFlow)> {
        self.iter().next()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// One entry of the security-scheme registry
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityScheme {
    pub scheme_type: SecuritySchemeType,
    pub description: Option<String>,
    /// Header/query/cookie name of an api key
    pub name: Option<String>,
    pub location: Option<ApiKeyLocation>,
    /// HTTP auth scheme, e.g. `basic` or `bearer`
    pub scheme: Option<String>,
    pub bearer_format: Option<String>,
    pub open_id_connect_url: Option<String>,
    pub flows: OAuthFlows,
    pub extensions: Extensions,
}

impl SecurityScheme {
    pub fn new(scheme_type: SecuritySchemeType) -> Self {
        Self {
            scheme_type,
            description: None,
            name: None,
            location: None,
            scheme: None,
            bearer_format: None,
            open_id_connect_url: None,
            flows: OAuthFlows::default(),
            extensions: Extensions::new(),
        }
    }

    pub fn api_key(name: impl Into<String>, location: ApiKeyLocation) -> Self {
        Self {
            name: Some(name.into()),
            location: Some(location),
            ..Self::new(SecuritySchemeType::ApiKey)
        }
    }

    /// OAuth2 scheme carrying a single grant
    pub fn oauth2(grant: OAuth2Flow, flow: OAuthFlow) -> Self {
        let mut scheme = Self::new(SecuritySchemeType::OAuth2);
        *scheme.flows.slot_mut(grant) = Some(flow);
        scheme
    }

    /// Basic auth, however it was spelled on input
    pub fn is_basic(&self) -> bool {
        match self.scheme_type {
            SecuritySchemeType::Basic => true,
            SecuritySchemeType::Http => self
                .scheme
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("basic")),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_names_per_format() {
        assert_eq!(OAuth2Flow::Application.openapi_name(), "clientCredentials");
        assert_eq!(OAuth2Flow::AccessCode.swagger_name(), "accessCode");
        assert_eq!(
            OAuth2Flow::from_openapi_name("authorizationCode"),
            Some(OAuth2Flow::AccessCode)
        );
        assert_eq!(OAuth2Flow::from_swagger_name("authorizationCode"), None);
    }

    #[test]
    fn test_infer_grant_from_urls() {
        assert_eq!(OAuth2Flow::infer(true, false), OAuth2Flow::Implicit);
        assert_eq!(OAuth2Flow::infer(true, true), OAuth2Flow::AccessCode);
        assert_eq!(OAuth2Flow::infer(false, true), OAuth2Flow::Application);
    }

    #[test]
    fn test_primary_flow_is_first_populated() {
        let mut flows = OAuthFlows::default();
        assert!(flows.is_empty());
        *flows.slot_mut(OAuth2Flow::AccessCode) = Some(OAuthFlow {
            authorization_url: Some("AuthUrl".to_string()),
            ..Default::default()
        });
        let (grant, flow) = flows.primary().unwrap();
        assert_eq!(grant, OAuth2Flow::AccessCode);
        assert_eq!(flow.authorization_url.as_deref(), Some("AuthUrl"));
    }

    #[test]
    fn test_is_basic_accepts_both_spellings() {
        assert!(SecurityScheme::new(SecuritySchemeType::Basic).is_basic());
        let mut http = SecurityScheme::new(SecuritySchemeType::Http);
        http.scheme = Some("Basic".to_string());
        assert!(http.is_basic());
        http.scheme = Some("bearer".to_string());
        assert!(!http.is_basic());
    }
}
