// Hyperlinks between resources
// Every representation names itself and its relations by absolute URL

use thiserror::Error;

/// The collections exposed under `/api/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Questions,
    Choices,
    Users,
    Groups,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Users,
        Resource::Groups,
        Resource::Choices,
        Resource::Questions,
    ];

    /// Path segment of the collection
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Questions => "questions",
            Resource::Choices => "choices",
            Resource::Users => "users",
            Resource::Groups => "groups",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == segment)
    }
}

/// Why an inbound hyperlink could not be resolved
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    #[error("Invalid hyperlink - No URL match.")]
    NoMatch,

    #[error("Invalid hyperlink - Incorrect URL match.")]
    IncorrectMatch,

    #[error("Invalid hyperlink - Object does not exist.")]
    DoesNotExist,
}

/// Builds absolute resource URLs from the public base URL
#[derive(Debug, Clone)]
pub struct Links {
    base: String,
}

impl Links {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn collection(&self, resource: Resource) -> String {
        format!("{}/api/{}/", self.base, resource.as_str())
    }

    pub fn detail(&self, resource: Resource, id: i64) -> String {
        format!("{}/api/{}/{}/", self.base, resource.as_str(), id)
    }

    /// Link to one page of a collection; page 1 carries no query string
    pub fn page(&self, resource: Resource, page: u32) -> String {
        if page <= 1 {
            self.collection(resource)
        } else {
            format!("{}?page={}", self.collection(resource), page)
        }
    }
}

/// Extracts the record ID from a hyperlink to `expected`
///
/// Accepts absolute URLs on any host as well as bare paths, e.g.
/// `https://host/api/questions/7/` or `/api/questions/7`.
///
/// # Example
/// ```
/// use polls_api::api::links::{resolve, Resource};
///
/// assert_eq!(resolve("/api/questions/7/", Resource::Questions), Ok(7));
/// assert!(resolve("/api/choices/7/", Resource::Questions).is_err());
/// ```
pub fn resolve(url: &str, expected: Resource) -> Result<i64, LinkError> {
    let url = url.trim();
    let path = match url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
    {
        Some(rest) => rest.find('/').map(|i| &rest[i..]).ok_or(LinkError::NoMatch)?,
        None if url.starts_with('/') => url,
        None => return Err(LinkError::NoMatch),
    };

    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.strip_suffix('/').unwrap_or(path);
    let rest = path.strip_prefix("/api/").ok_or(LinkError::NoMatch)?;

    let mut segments = rest.split('/');
    let (Some(collection), Some(id), None) = (segments.next(), segments.next(), segments.next())
    else {
        return Err(LinkError::NoMatch);
    };

    let resource = Resource::from_segment(collection).ok_or(LinkError::NoMatch)?;
    let id: i64 = id.parse().map_err(|_| LinkError::NoMatch)?;
    if id <= 0 {
        return Err(LinkError::NoMatch);
    }
    if resource != expected {
        return Err(LinkError::IncorrectMatch);
    }

    Ok(id)
}
