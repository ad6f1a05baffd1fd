// Pagination, filtering, and grouping metadata
//
// The VSD carries list metadata in `X-Nuage-*` headers rather than in the
// body. `FetchingInfo` is filled by the caller before a children fetch and
// overwritten from the response headers afterwards.

use reqwest::header::{HeaderMap, HeaderValue};

use crate::error::Error;

pub const HEADER_FILTER: &str = "X-Nuage-Filter";
pub const HEADER_FILTER_TYPE: &str = "X-Nuage-FilterType";
pub const HEADER_ORDER_BY: &str = "X-Nuage-OrderBy";
pub const HEADER_PAGE: &str = "X-Nuage-Page";
pub const HEADER_PAGE_SIZE: &str = "X-Nuage-PageSize";
pub const HEADER_GROUP_BY: &str = "X-Nuage-GroupBy";
pub const HEADER_ATTRIBUTES: &str = "X-Nuage-Attributes";
pub const HEADER_COUNT: &str = "X-Nuage-Count";

/// Request/response metadata for children listings.
///
/// Empty strings and `None` mean "unset" and are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchingInfo {
    pub filter: String,
    pub filter_type: String,
    pub order_by: String,
    /// Zero-based page index. `None` disables pagination.
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub group_by: Vec<String>,
    /// Total number of matching objects, as reported by the server.
    pub total_count: u64,
}

impl FetchingInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = order_by.into();
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_group_by<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Write the set fields onto outgoing request headers.
    ///
    /// Fails on values that aren't valid header text, such as control
    /// characters, so a listing is never silently sent unfiltered.
    pub(crate) fn apply_to(&self, headers: &mut HeaderMap) -> Result<(), Error> {
        if !self.filter.is_empty() {
            insert(headers, HEADER_FILTER, &self.filter)?;
        }

        if !self.order_by.is_empty() {
            insert(headers, HEADER_ORDER_BY, &self.order_by)?;
        }

        if let Some(page) = self.page {
            headers.insert(HEADER_PAGE, HeaderValue::from(page));
        }

        if let Some(size) = self.page_size.filter(|s| *s > 0) {
            headers.insert(HEADER_PAGE_SIZE, HeaderValue::from(size));
        }

        if !self.group_by.is_empty() {
            headers.insert(HEADER_GROUP_BY, HeaderValue::from_static("true"));
            insert(headers, HEADER_ATTRIBUTES, &self.group_by.join(", "))?;
        }

        Ok(())
    }

    /// Overwrite fields from the mirrored response headers.
    ///
    /// Missing or unparsable numbers read as 0. `group_by` is not echoed
    /// by the server and stays as it was.
    pub(crate) fn update_from(&mut self, headers: &HeaderMap) {
        self.filter = header_text(headers, HEADER_FILTER);
        self.filter_type = header_text(headers, HEADER_FILTER_TYPE);
        self.order_by = header_text(headers, HEADER_ORDER_BY);
        self.page = Some(header_number(headers, HEADER_PAGE));
        self.page_size = Some(header_number(headers, HEADER_PAGE_SIZE));
        self.total_count = header_number(headers, HEADER_COUNT);
    }
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<(), Error> {
    let value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
        header: name.into(),
        reason: e.to_string(),
    })?;
    headers.insert(name, value);
    Ok(())
}

fn header_text(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

fn header_number<T: std::str::FromStr + Default>(headers: &HeaderMap, name: &str) -> T {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_info_sends_nothing() {
        let mut headers = HeaderMap::new();
        FetchingInfo::new().apply_to(&mut headers).unwrap();
        assert!(headers.is_empty());
    }

    #[test]
    fn unset_page_is_absent() {
        let mut headers = HeaderMap::new();
        FetchingInfo::new().with_filter("name == 'x'").apply_to(&mut headers).unwrap();

        assert!(headers.get(HEADER_PAGE).is_none());
        assert_eq!(headers[HEADER_FILTER], "name == 'x'");
    }

    #[test]
    fn page_zero_is_sent() {
        let mut headers = HeaderMap::new();
        FetchingInfo::new().with_page(0).apply_to(&mut headers).unwrap();
        assert_eq!(headers[HEADER_PAGE], "0");

        let mut headers = HeaderMap::new();
        FetchingInfo::new().with_page(17).apply_to(&mut headers).unwrap();
        assert_eq!(headers[HEADER_PAGE], "17");
    }

    #[test]
    fn zero_page_size_is_ignored() {
        let mut headers = HeaderMap::new();
        FetchingInfo::new().with_page_size(0).apply_to(&mut headers).unwrap();
        assert!(headers.get(HEADER_PAGE_SIZE).is_none());

        FetchingInfo::new().with_page_size(200).apply_to(&mut headers).unwrap();
        assert_eq!(headers[HEADER_PAGE_SIZE], "200");
    }

    #[test]
    fn group_by_sets_flag_and_attribute_list() {
        let mut headers = HeaderMap::new();
        FetchingInfo::new()
            .with_group_by(["name", "type"])
            .with_order_by("name ASC")
            .apply_to(&mut headers)
            .unwrap();

        assert_eq!(headers[HEADER_GROUP_BY], "true");
        assert_eq!(headers[HEADER_ATTRIBUTES], "name, type");
        assert_eq!(headers[HEADER_ORDER_BY], "name ASC");
    }

    #[test]
    fn control_characters_are_rejected() {
        let mut headers = HeaderMap::new();
        let err = FetchingInfo::new()
            .with_filter("name == 'a'\nb")
            .apply_to(&mut headers)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidHeader { ref header, .. } if header == HEADER_FILTER));
        assert!(headers.get(HEADER_FILTER).is_none());
    }

    #[test]
    fn non_ascii_filter_is_sent() {
        let mut headers = HeaderMap::new();
        FetchingInfo::new().with_filter("name == 'café'").apply_to(&mut headers).unwrap();
        assert!(headers.get(HEADER_FILTER).is_some());
    }

    #[test]
    fn update_reads_mirrored_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_FILTER, HeaderValue::from_static("name == 'x'"));
        headers.insert(HEADER_FILTER_TYPE, HeaderValue::from_static("predicate"));
        headers.insert(HEADER_PAGE, HeaderValue::from_static("2"));
        headers.insert(HEADER_PAGE_SIZE, HeaderValue::from_static("25"));
        headers.insert(HEADER_COUNT, HeaderValue::from_static("73"));

        let mut info = FetchingInfo::new().with_group_by(["name"]);
        info.update_from(&headers);

        assert_eq!(info.filter, "name == 'x'");
        assert_eq!(info.filter_type, "predicate");
        assert_eq!(info.order_by, "");
        assert_eq!(info.page, Some(2));
        assert_eq!(info.page_size, Some(25));
        assert_eq!(info.total_count, 73);
        assert_eq!(info.group_by, vec!["name".to_string()]);
    }

    #[test]
    fn unparsable_numbers_fall_back_to_zero() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_PAGE, HeaderValue::from_static("n/a"));

        let mut info = FetchingInfo::new().with_page(4);
        info.update_from(&headers);

        assert_eq!(info.page, Some(0));
        assert_eq!(info.page_size, Some(0));
        assert_eq!(info.total_count, 0);
    }
}
