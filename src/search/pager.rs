//! Lazy page iteration over search results

use crate::error::{Error, Result};
use crate::models::{Hit, Pagination, PostInputsSearchesRequest, SearchBody, SearchResponse};
use crate::network::ApiClient;
use futures::stream::{self, Stream};
use tracing::debug;

/// How pages are requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PagePlan {
    /// Fetch at most `top_k` hits in pages of `min(page_size, top_k)`
    TopK { top_k: usize, page_size: u32 },
    /// Fetch `per_page` hits per page; `single` stops after the first page
    Paginated { per_page: u32, single: bool },
}

/// Pages of a search, fetched on demand.
///
/// Iteration ends at the first page without hits. In top-k mode it also ends
/// once `top_k` hits were returned or a page comes back short.
pub struct QueryPages {
    client: ApiClient,
    path: String,
    search: SearchBody,
    plan: PagePlan,
    page: u32,
    returned: usize,
    done: bool,
}

impl QueryPages {
    pub(crate) fn new(
        client: ApiClient,
        path: String,
        search: SearchBody,
        plan: PagePlan,
        first_page: u32,
    ) -> Self {
        Self {
            client,
            path,
            search,
            plan,
            page: first_page.max(1),
            returned: 0,
            done: false,
        }
    }

    /// The search sent with every page request
    pub fn search(&self) -> &SearchBody {
        &self.search
    }

    /// Fetch the next page, or `None` once the results are exhausted
    pub async fn next_page(&mut self) -> Result<Option<SearchResponse>> {
        if self.done {
            return Ok(None);
        }

        // per_page is fixed for the whole query; the server derives page
        // offsets from it.
        let per_page = match self.plan {
            PagePlan::TopK { top_k, page_size } => {
                if self.returned >= top_k {
                    self.done = true;
                    return Ok(None);
                }
                page_size.min(u32::try_from(top_k).unwrap_or(u32::MAX))
            }
            PagePlan::Paginated { per_page, .. } => per_page,
        };

        let request = PostInputsSearchesRequest {
            searches: vec![self.search.clone()],
            pagination: Pagination {
                page: self.page,
                per_page,
            },
        };

        debug!("Requesting search page {} ({} per page)", self.page, per_page);

        let mut response: SearchResponse = self
            .client
            .post(&self.path, &request)
            .await
            .map_err(pagination_error)?;

        if response.hits.is_empty() {
            debug!("Page {} returned no hits", self.page);
            self.done = true;
            return Ok(None);
        }

        debug!("Page {} returned {} hits", self.page, response.hits.len());

        self.page += 1;
        match self.plan {
            PagePlan::TopK { top_k, .. } => {
                if response.hits.len() < per_page as usize {
                    self.done = true;
                }
                response.hits.truncate(top_k - self.returned);
                self.returned += response.hits.len();
            }
            PagePlan::Paginated { single, .. } => {
                self.returned += response.hits.len();
                if single {
                    self.done = true;
                }
            }
        }

        Ok(Some(response))
    }

    /// Drain all remaining pages into a flat list of hits
    pub async fn collect_hits(mut self) -> Result<Vec<Hit>> {
        let mut hits = Vec::new();
        while let Some(page) = self.next_page().await? {
            hits.extend(page.hits);
        }
        Ok(hits)
    }

    /// Turn the remaining pages into a stream
    pub fn into_stream(self) -> impl Stream<Item = Result<SearchResponse>> {
        stream::try_unfold(self, |mut pages| async move {
            Ok::<_, Error>(pages.next_page().await?.map(|page| (page, pages)))
        })
    }
}

/// The API rejects pages past its result window with a terse status; surface
/// that as a caller mistake.
fn pagination_error(err: Error) -> Error {
    match err {
        Error::Api {
            ref description,
            ref details,
            ..
        } if description.contains("page * perPage cannot exceed")
            || details.contains("page * perPage cannot exceed") =>
        {
            Error::user(format!(
                "Your pagination is set to page * per_page past the maximum result window: {}",
                if details.is_empty() { description } else { details }
            ))
        }
        other => other,
    }
}
