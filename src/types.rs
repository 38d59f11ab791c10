//! Core enumerations shared by the document model.
//!
//! Every enum here round-trips through the exact text OpenAPI uses for it,
//! via serde renames, `as_str`, `Display` and `FromStr`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::Error;

/// HTTP method of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    /// All methods in editor order
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Trace,
    ];

    /// Returns the upper-case display form (e.g. "GET")
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Returns the lower-case key used inside an OpenAPI path item
    pub fn path_item_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
        }
    }

    /// Parses a path item key. Keys are case-sensitive, so `GET` is not a method.
    pub fn from_path_item_key(key: &str) -> Option<HttpMethod> {
        HttpMethod::ALL.into_iter().find(|m| m.path_item_key() == key)
    }

    /// Whether a request body is meaningful for this method
    pub fn accepts_request_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::unknown_variant("HTTP method", s))
    }
}

/// Primitive or structural schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl DataType {
    /// All types in editor order
    pub const ALL: [DataType; 6] = [
        DataType::String,
        DataType::Number,
        DataType::Integer,
        DataType::Boolean,
        DataType::Array,
        DataType::Object,
    ];

    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Integer => "integer",
            DataType::Boolean => "boolean",
            DataType::Array => "array",
            DataType::Object => "object",
        }
    }

    /// Array and object types carry nested structure
    pub fn is_structural(&self) -> bool {
        matches!(self, DataType::Array | DataType::Object)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::unknown_variant("data type", s))
    }
}

/// Format hint for primitive schema types.
///
/// The editor's `none` choice is modelled as the absence of a format, so
/// fields of this type are always `Option<DataFormat>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFormat {
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "date-time")]
    DateTime,
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "byte")]
    Byte,
    #[serde(rename = "binary")]
    Binary,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "uuid")]
    Uuid,
    #[serde(rename = "uri")]
    Uri,
    #[serde(rename = "hostname")]
    Hostname,
    #[serde(rename = "ipv4")]
    Ipv4,
    #[serde(rename = "ipv6")]
    Ipv6,
}

impl DataFormat {
    /// All formats in editor order
    pub const ALL: [DataFormat; 11] = [
        DataFormat::Date,
        DataFormat::DateTime,
        DataFormat::Password,
        DataFormat::Byte,
        DataFormat::Binary,
        DataFormat::Email,
        DataFormat::Uuid,
        DataFormat::Uri,
        DataFormat::Hostname,
        DataFormat::Ipv4,
        DataFormat::Ipv6,
    ];

    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Date => "date",
            DataFormat::DateTime => "date-time",
            DataFormat::Password => "password",
            DataFormat::Byte => "byte",
            DataFormat::Binary => "binary",
            DataFormat::Email => "email",
            DataFormat::Uuid => "uuid",
            DataFormat::Uri => "uri",
            DataFormat::Hostname => "hostname",
            DataFormat::Ipv4 => "ipv4",
            DataFormat::Ipv6 => "ipv6",
        }
    }

    /// Parses editor text where `"none"` means no format
    pub fn parse_optional(s: &str) -> Result<Option<DataFormat>, Error> {
        if s == "none" {
            return Ok(None);
        }
        s.parse().map(Some)
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::unknown_variant("data format", s))
    }
}

/// Where a parameter is carried in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParameterLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(ParameterLocation::Path),
            "query" => Ok(ParameterLocation::Query),
            "header" => Ok(ParameterLocation::Header),
            "cookie" => Ok(ParameterLocation::Cookie),
            other => Err(Error::unknown_variant("parameter location", other)),
        }
    }
}

/// Kind of credential scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecuritySchemeType {
    #[serde(rename = "apiKey")]
    ApiKey,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "oauth2")]
    OAuth2,
    #[serde(rename = "openIdConnect")]
    OpenIdConnect,
}

impl SecuritySchemeType {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SecuritySchemeType::ApiKey => "apiKey",
            SecuritySchemeType::Http => "http",
            SecuritySchemeType::OAuth2 => "oauth2",
            SecuritySchemeType::OpenIdConnect => "openIdConnect",
        }
    }

    /// Human readable label shown next to a scheme
    pub fn label(&self) -> &'static str {
        match self {
            SecuritySchemeType::ApiKey => "API Key",
            SecuritySchemeType::Http => "HTTP Auth",
            SecuritySchemeType::OAuth2 => "OAuth 2.0",
            SecuritySchemeType::OpenIdConnect => "OpenID Connect",
        }
    }
}

impl std::fmt::Display for SecuritySchemeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SecuritySchemeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apiKey" => Ok(SecuritySchemeType::ApiKey),
            "http" => Ok(SecuritySchemeType::Http),
            "oauth2" => Ok(SecuritySchemeType::OAuth2),
            "openIdConnect" => Ok(SecuritySchemeType::OpenIdConnect),
            other => Err(Error::unknown_variant("security scheme type", other)),
        }
    }
}

/// Where an API key is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

impl ApiKeyLocation {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyLocation::Query => "query",
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Cookie => "cookie",
        }
    }
}

impl std::fmt::Display for ApiKeyLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApiKeyLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(ApiKeyLocation::Query),
            "header" => Ok(ApiKeyLocation::Header),
            "cookie" => Ok(ApiKeyLocation::Cookie),
            other => Err(Error::unknown_variant("API key location", other)),
        }
    }
}

/// Textual representation of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    Json,
    Yaml,
}

impl TextFormat {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TextFormat::Json => "json",
            TextFormat::Yaml => "yaml",
        }
    }

    /// File extension used for downloads
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for TextFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TextFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(TextFormat::Json),
            "yaml" | "yml" => Ok(TextFormat::Yaml),
            _ => Err(Error::unknown_variant("text format", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_round_trip() {
        for method in HttpMethod::ALL {
            assert_eq!(method.as_str().parse::<HttpMethod>().unwrap(), method);
            assert_eq!(
                method.path_item_key().parse::<HttpMethod>().unwrap(),
                method
            );
        }
        assert!("FETCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_http_method_path_item_key() {
        for method in HttpMethod::ALL {
            assert_eq!(HttpMethod::from_path_item_key(method.path_item_key()), Some(method));
        }
        assert_eq!(HttpMethod::from_path_item_key("GET"), None);
        assert_eq!(HttpMethod::from_path_item_key("Post"), None);
        assert_eq!(HttpMethod::from_path_item_key("parameters"), None);
    }

    #[test]
    fn test_request_body_methods() {
        let accepting: Vec<_> = HttpMethod::ALL
            .into_iter()
            .filter(HttpMethod::accepts_request_body)
            .collect();
        assert_eq!(
            accepting,
            vec![HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch]
        );
    }

    #[test]
    fn test_data_format_none() {
        assert_eq!(DataFormat::parse_optional("none").unwrap(), None);
        assert_eq!(
            DataFormat::parse_optional("date-time").unwrap(),
            Some(DataFormat::DateTime)
        );
        assert!(DataFormat::parse_optional("int64").is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_value(SecuritySchemeType::OpenIdConnect).unwrap(),
            serde_json::json!("openIdConnect")
        );
        assert_eq!(
            serde_json::to_value(DataFormat::DateTime).unwrap(),
            serde_json::json!("date-time")
        );
        assert_eq!(
            serde_json::to_value(HttpMethod::Patch).unwrap(),
            serde_json::json!("PATCH")
        );
    }

    #[test]
    fn test_text_format_parse() {
        assert_eq!("YAML".parse::<TextFormat>().unwrap(), TextFormat::Yaml);
        assert_eq!("yml".parse::<TextFormat>().unwrap(), TextFormat::Yaml);
        assert_eq!(TextFormat::Json.extension(), "json");
        assert!("toml".parse::<TextFormat>().is_err());
    }
}
