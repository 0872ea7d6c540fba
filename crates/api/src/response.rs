//! API response types and limit/offset pagination.

use axum::http::Uri;
use serde::Serialize;
use url::Url;
use yatube_common::config::PaginationConfig;

use crate::extractors::PageParams;

/// Largest offset that still binds as a signed 64-bit SQL parameter.
const MAX_OFFSET: u64 = i64::MAX as u64;

/// A window into a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    /// Resolve query parameters against the pagination settings.
    ///
    /// Returns `None` when the client asked for no window and no default
    /// limit is configured, meaning the whole list is returned.
    #[must_use]
    pub fn resolve(params: &PageParams, config: &PaginationConfig) -> Option<Self> {
        let requested = params
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|&limit| limit > 0);

        let limit = match requested {
            Some(limit) => limit.min(config.max_limit),
            None => config.default_limit?,
        };

        let offset = params
            .offset
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map_or(0, |offset| offset.min(MAX_OFFSET));

        Some(Self { limit, offset })
    }
}

/// Paginated list body.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> Paginated<T> {
    /// Build a page body with absolute navigation links.
    pub fn new(results: Vec<T>, count: u64, page: Page, base: &Url, uri: &Uri) -> Self {
        let next = page
            .offset
            .checked_add(page.limit)
            .filter(|&offset| offset < count)
            .map(|offset| page_url(base, uri, page.limit, Some(offset)));

        let previous = (page.offset > 0).then(|| {
            let offset = page.offset.saturating_sub(page.limit);
            page_url(base, uri, page.limit, (offset > 0).then_some(offset))
        });

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// List body: paginated, or the whole list when no window applies.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing<T: Serialize> {
    Page(Paginated<T>),
    All(Vec<T>),
}

fn page_url(base: &Url, uri: &Uri, limit: u64, offset: Option<u64>) -> String {
    let mut url = base.clone();
    url.set_path(uri.path());

    let kept: Vec<(String, String)> = url::form_urlencoded::parse(
        uri.query().unwrap_or_default().as_bytes(),
    )
    .filter(|(key, _)| key != "limit" && key != "offset")
    .map(|(key, value)| (key.into_owned(), value.into_owned()))
    .collect();

    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        query.extend_pairs(kept);
        query.append_pair("limit", &limit.to_string());
        if let Some(offset) = offset {
            query.append_pair("offset", &offset.to_string());
        }
    }
    url.into()
}
