//! Route annotation dispatch table and attribute resolution.

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::parser::{Annotation, AnnotationArgs};

/// Path used when a route annotation carries no extractable path.
pub const DEFAULT_PATH: &str = "/";

/// HTTP verb of an endpoint. `Request` is the sentinel for a generic mapping
/// without an explicit method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Request,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Request => "REQUEST",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a recognized route annotation determines its verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// The annotation name implies the verb.
    Verb(HttpMethod),
    /// Generic mapping: `Request` unless a `method` attribute names a verb.
    Generic,
}

/// Recognized route annotations keyed by their exact name.
static ROUTE_ANNOTATIONS: phf::Map<&'static str, RouteKind> = phf_map! {
    "GetMapping" => RouteKind::Verb(HttpMethod::Get),
    "PostMapping" => RouteKind::Verb(HttpMethod::Post),
    "PutMapping" => RouteKind::Verb(HttpMethod::Put),
    "DeleteMapping" => RouteKind::Verb(HttpMethod::Delete),
    "PatchMapping" => RouteKind::Verb(HttpMethod::Patch),
    "RequestMapping" => RouteKind::Generic,
};

/// Verb tokens checked against a generic mapping's `method` attribute, in order.
const VERB_TOKENS: &[(&str, HttpMethod)] = &[
    ("GET", HttpMethod::Get),
    ("POST", HttpMethod::Post),
    ("PUT", HttpMethod::Put),
    ("DELETE", HttpMethod::Delete),
    ("PATCH", HttpMethod::Patch),
];

/// Look up an annotation name in the dispatch table.
pub fn route_kind(name: &str) -> Option<RouteKind> {
    ROUTE_ANNOTATIONS.get(name).copied()
}

/// A route resolved from a single annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
}

/// Resolve verb and path for an annotation, or None if it is not a route annotation.
pub fn resolve(annotation: &Annotation) -> Option<Route> {
    let kind = route_kind(&annotation.name)?;

    let mut method = match kind {
        RouteKind::Verb(m) => m,
        RouteKind::Generic => HttpMethod::Request,
    };
    let mut path = None;

    match &annotation.args {
        AnnotationArgs::None => {}
        AnnotationArgs::Single(value) => path = Some(strip_quotes(value)),
        AnnotationArgs::Named(pairs) => {
            for (key, value) in pairs {
                match key.as_str() {
                    "value" | "path" => path = Some(strip_quotes(value)),
                    "method" if kind == RouteKind::Generic => {
                        if let Some(m) = verb_from_text(value) {
                            method = m;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    Some(Route {
        method,
        path: path.unwrap_or_else(|| DEFAULT_PATH.to_string()),
    })
}

/// First verb token (in fixed check order) contained in the attribute text.
pub fn verb_from_text(text: &str) -> Option<HttpMethod> {
    VERB_TOKENS
        .iter()
        .find(|(token, _)| text.contains(token))
        .map(|(_, m)| *m)
}

/// Strip one pair of surrounding double quotes, if present.
pub fn strip_quotes(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_kind_lookup() {
        assert_eq!(route_kind("GetMapping"), Some(RouteKind::Verb(HttpMethod::Get)));
        assert_eq!(route_kind("PatchMapping"), Some(RouteKind::Verb(HttpMethod::Patch)));
        assert_eq!(route_kind("RequestMapping"), Some(RouteKind::Generic));
        assert_eq!(route_kind("getMapping"), None);
        assert_eq!(route_kind("Autowired"), None);
    }

    #[test]
    fn test_single_value_path() {
        let route = resolve(&Annotation::single("GetMapping", "\"/hello\"")).unwrap();
        assert_eq!(route.method, HttpMethod::Get);
        assert_eq!(route.path, "/hello");
    }

    #[test]
    fn test_marker_defaults_to_root() {
        let route = resolve(&Annotation::marker("PostMapping")).unwrap();
        assert_eq!(route.method, HttpMethod::Post);
        assert_eq!(route.path, DEFAULT_PATH);

        let route = resolve(&Annotation::named("PutMapping", &[])).unwrap();
        assert_eq!(route.path, DEFAULT_PATH);
    }

    #[test]
    fn test_named_value_and_path_keys() {
        let route = resolve(&Annotation::named("DeleteMapping", &[("path", "\"/items\"")])).unwrap();
        assert_eq!(route.path, "/items");

        let route = resolve(&Annotation::named(
            "GetMapping",
            &[("produces", "\"application/json\""), ("value", "\"/v\"")],
        ))
        .unwrap();
        assert_eq!(route.path, "/v");

        // Unknown keys only: fall back to the default
        let route = resolve(&Annotation::named("GetMapping", &[("produces", "\"text/plain\"")])).unwrap();
        assert_eq!(route.path, DEFAULT_PATH);
    }

    #[test]
    fn test_last_path_key_wins() {
        let route = resolve(&Annotation::named(
            "GetMapping",
            &[("value", "\"/first\""), ("path", "\"/second\"")],
        ))
        .unwrap();
        assert_eq!(route.path, "/second");
    }

    #[test]
    fn test_generic_mapping_verb_resolution() {
        let route = resolve(&Annotation::single("RequestMapping", "\"/any\"")).unwrap();
        assert_eq!(route.method, HttpMethod::Request);

        let route = resolve(&Annotation::named(
            "RequestMapping",
            &[("value", "\"/users\""), ("method", "RequestMethod.POST")],
        ))
        .unwrap();
        assert_eq!(route.method, HttpMethod::Post);
        assert_eq!(route.path, "/users");

        let route = resolve(&Annotation::named("RequestMapping", &[("method", "someConstant")])).unwrap();
        assert_eq!(route.method, HttpMethod::Request);
    }

    #[test]
    fn test_generic_mapping_first_token_wins() {
        let route = resolve(&Annotation::named(
            "RequestMapping",
            &[("method", "{RequestMethod.POST, RequestMethod.GET}")],
        ))
        .unwrap();
        // GET is checked before POST regardless of position in the text
        assert_eq!(route.method, HttpMethod::Get);
    }

    #[test]
    fn test_method_attribute_ignored_on_verb_specific_mapping() {
        let route = resolve(&Annotation::named("GetMapping", &[("method", "RequestMethod.POST")])).unwrap();
        assert_eq!(route.method, HttpMethod::Get);
    }

    #[test]
    fn test_unrecognized_annotation() {
        assert!(resolve(&Annotation::single("Cacheable", "\"users\"")).is_none());
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"/a\""), "/a");
        assert_eq!(strip_quotes("\"\""), "");
        assert_eq!(strip_quotes("Routes.BASE"), "Routes.BASE");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn test_http_method_serializes_uppercase() {
        let json = serde_json::to_string(&HttpMethod::Delete).unwrap();
        assert_eq!(json, "\"DELETE\"");
        assert_eq!(HttpMethod::Request.to_string(), "REQUEST");
    }
}
