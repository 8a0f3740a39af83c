/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Store role of a tenant's availability/reliability database
pub const AR_STORE: &str = "ar";

/// Store role of a tenant's status database
pub const STATUS_STORE: &str = "status";

/// Response representation negotiated from the `Accept` header
/// (or the legacy `format` query parameter on v1 routes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    #[default]
    Xml,
    Json,
}

impl Representation {
    pub fn content_type(&self) -> &'static str {
        match self {
            Representation::Xml => "application/xml; charset=utf-8",
            Representation::Json => "application/json; charset=utf-8",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Representation::Xml => "xml",
            Representation::Json => "json",
        }
    }

    /// Map a single media range to a representation, ignoring parameters
    /// such as `;charset=utf-8` or `;q=0.9`
    pub fn from_media_type(media: &str) -> Option<Self> {
        let essence = media.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "application/json" => Some(Representation::Json),
            "application/xml" | "text/xml" => Some(Representation::Xml),
            "*/*" | "application/*" | "" => Some(Representation::Xml),
            _ => None,
        }
    }

    /// Negotiate from an `Accept` header. A missing header means XML;
    /// `None` means none of the listed media ranges are supported.
    pub fn from_accept(accept: Option<&str>) -> Option<Self> {
        let accept = match accept {
            Some(value) if !value.trim().is_empty() => value,
            _ => return Some(Representation::Xml),
        };

        accept
            .split(',')
            .find_map(Representation::from_media_type)
    }

    /// Legacy `format=json|xml` query parameter
    pub fn from_format(format: &str) -> Option<Self> {
        match format.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Representation::Json),
            "xml" => Some(Representation::Xml),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_accept_defaults_to_xml() {
        assert_eq!(Representation::from_accept(None), Some(Representation::Xml));
        assert_eq!(Representation::from_accept(Some("  ")), Some(Representation::Xml));
    }

    #[test]
    fn accept_with_parameters_is_recognised() {
        assert_eq!(
            Representation::from_accept(Some("application/json;")),
            Some(Representation::Json)
        );
        assert_eq!(
            Representation::from_accept(Some("text/html, application/xml;q=0.9")),
            Some(Representation::Xml)
        );
    }

    #[test]
    fn unsupported_accept_is_rejected() {
        assert_eq!(Representation::from_accept(Some("text/html")), None);
        assert_eq!(Representation::from_accept(Some("image/png, text/plain")), None);
    }
}
