use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::links::{Links, Resource};
use crate::domain::repositories::{Page, PageRequest};

/// `?page=N` query parameter of list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

impl PageParams {
    /// Turns the raw parameter into a page request of `size` records
    pub fn request(&self, size: u32) -> Result<PageRequest, ApiError> {
        let number = match self.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(invalid_page)?,
        };
        Ok(PageRequest::new(number, size))
    }
}

fn invalid_page() -> ApiError {
    ApiError::not_found("Invalid page.")
}

/// Paginated list body: `{count, next, previous, results}`
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wraps a page of `resource`, rejecting pages past the last one
    pub fn from_page(page: Page<T>, links: &Links, resource: Resource) -> Result<Self, ApiError> {
        if page.is_out_of_range() {
            return Err(invalid_page());
        }

        let number = page.request.number;
        Ok(Self {
            count: page.total,
            next: page
                .has_next()
                .then(|| links.page(resource, number + 1)),
            previous: page
                .has_previous()
                .then(|| links.page(resource, number - 1)),
            results: page.items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn params(page: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(str::to_string),
        }
    }

    fn page_of(total: i64, number: u32) -> Page<i64> {
        Page {
            items: vec![1, 2],
            total,
            request: PageRequest::new(number, 2),
        }
    }

    #[test]
    fn missing_page_is_first() {
        assert_eq!(params(None).request(10).unwrap(), PageRequest::new(1, 10));
        assert_eq!(params(Some("3")).request(10).unwrap().number, 3);
    }

    #[test]
    fn invalid_page_numbers_are_not_found() {
        for raw in ["0", "-1", "two", "1.5"] {
            let err = params(Some(raw)).request(10).unwrap_err();
            assert_eq!(err.status, StatusCode::NOT_FOUND, "{raw}");
        }
    }

    #[test]
    fn middle_page_links_both_ways() {
        let links = Links::new("http://testserver");
        let body = Paginated::from_page(page_of(6, 2), &links, Resource::Questions).unwrap();

        assert_eq!(body.count, 6);
        assert_eq!(body.next.as_deref(), Some("http://testserver/api/questions/?page=3"));
        assert_eq!(body.previous.as_deref(), Some("http://testserver/api/questions/"));
        assert_eq!(body.results, vec![1, 2]);
    }

    #[test]
    fn single_page_has_no_links() {
        let links = Links::new("http://testserver");
        let body = Paginated::from_page(page_of(2, 1), &links, Resource::Choices).unwrap();

        assert!(body.next.is_none());
        assert!(body.previous.is_none());
    }

    #[test]
    fn page_past_the_end_rejected() {
        let links = Links::new("http://testserver");
        let err = Paginated::from_page(page_of(2, 2), &links, Resource::Choices).unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
