//! HTTP verbs for described resources.

use strum::{Display, EnumIter, EnumString};

/// HTTP methods a described resource may declare.
///
/// Parsing is case-insensitive so descriptions may use either `get` or `GET`.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use apitree_define::RestMethod;
///
/// assert_eq!(RestMethod::from_str("post").unwrap(), RestMethod::Post);
/// assert_eq!(RestMethod::Post.to_string(), "POST");
/// assert_eq!(RestMethod::Post.call_name(), "post");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RestMethod {
    /// HTTP GET
    Get,
    /// HTTP HEAD
    Head,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP PATCH
    Patch,
    /// HTTP DELETE
    Delete,
    /// HTTP OPTIONS
    Options,
}

impl RestMethod {
    /// The verbs every root-level invocation exposes, in calling-convention order.
    pub const CALLABLE: [RestMethod; 6] = [
        RestMethod::Get,
        RestMethod::Head,
        RestMethod::Post,
        RestMethod::Put,
        RestMethod::Patch,
        RestMethod::Delete,
    ];

    /// Returns `true` when the first positional argument of this verb is a body.
    ///
    /// `post`, `put`, `patch` and `delete` take `(body, options)`; the rest take
    /// `(query, options)`.
    pub fn accepts_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch | Self::Delete)
    }

    /// Lower-case name used for completion listings.
    pub fn call_name(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Head => "head",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Options => "options",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn rest_method_display_uppercase() {
        assert_eq!(RestMethod::Get.to_string(), "GET");
        assert_eq!(RestMethod::Delete.to_string(), "DELETE");
        assert_eq!(RestMethod::Options.to_string(), "OPTIONS");
    }

    #[test]
    fn rest_method_from_str_any_case() {
        assert_eq!(RestMethod::from_str("GET").unwrap(), RestMethod::Get);
        assert_eq!(RestMethod::from_str("get").unwrap(), RestMethod::Get);
        assert_eq!(RestMethod::from_str("Patch").unwrap(), RestMethod::Patch);
    }

    #[test]
    fn rest_method_from_str_invalid() {
        assert!(RestMethod::from_str("FETCH").is_err());
        assert!(RestMethod::from_str("").is_err());
    }

    #[test]
    fn body_calling_convention() {
        assert!(!RestMethod::Get.accepts_body());
        assert!(!RestMethod::Head.accepts_body());
        assert!(RestMethod::Post.accepts_body());
        assert!(RestMethod::Put.accepts_body());
        assert!(RestMethod::Patch.accepts_body());
        assert!(RestMethod::Delete.accepts_body());
    }

    #[test]
    fn call_names_are_lowercase() {
        for method in RestMethod::iter() {
            assert_eq!(method.call_name(), method.to_string().to_lowercase());
        }
    }
}
