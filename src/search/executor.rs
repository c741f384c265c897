//! Search client: builds rank/filter queries and hands out result pages

use super::pager::{PagePlan, QueryPages};
use crate::config::SearchSettings;
use crate::error::{Error, Result};
use crate::models::{Algorithm, Metric, Query, SearchBody};
use crate::network::{ApiClient, UserAppId};
use crate::schema::{self, Clause};
use serde_json::Value;
use tracing::{debug, info};

/// Builder for [`Search`]; option conflicts are reported by [`build`](Self::build)
pub struct SearchBuilder {
    client: ApiClient,
    user_app: UserAppId,
    top_k: Option<usize>,
    metric: String,
    algorithm: String,
    pagination: bool,
    page_size: u32,
}

impl SearchBuilder {
    /// Maximum number of hits per query
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// "euclidean" or "cosine"
    pub fn metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = metric.into();
        self
    }

    /// "nearest_neighbor" or "brute_force"
    pub fn algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Page through all results instead of stopping at `top_k`
    pub fn pagination(mut self, enabled: bool) -> Self {
        self.pagination = enabled;
        self
    }

    /// Hits requested per page
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Apply defaults from settings; explicit builder calls made afterwards win
    pub fn settings(mut self, settings: &SearchSettings) -> Self {
        self.top_k = settings.top_k;
        self.metric = settings.metric.clone();
        self.algorithm = settings.algorithm.clone();
        self.page_size = settings.page_size;
        self
    }

    /// Check option conflicts and create the search
    pub fn build(self) -> Result<Search> {
        let metric: Metric = self.metric.parse()?;
        let algorithm: Algorithm = self.algorithm.parse()?;

        if self.pagination && self.top_k.is_some() {
            return Err(Error::user("top_k and pagination cannot be used together"));
        }
        if self.top_k == Some(0) {
            return Err(Error::user("top_k must be greater than zero"));
        }
        if self.page_size == 0 {
            return Err(Error::user("page_size must be greater than zero"));
        }

        let top_k = if self.pagination {
            None
        } else {
            Some(self.top_k.unwrap_or(crate::DEFAULT_TOP_K))
        };

        Ok(Search {
            client: self.client,
            user_app: self.user_app,
            top_k,
            metric,
            algorithm,
            page_size: self.page_size,
        })
    }
}

/// Searches over the inputs of one app
#[derive(Clone)]
pub struct Search {
    client: ApiClient,
    user_app: UserAppId,
    /// `None` means pagination mode
    top_k: Option<usize>,
    metric: Metric,
    algorithm: Algorithm,
    page_size: u32,
}

impl Search {
    /// Start building a search over `user_id/app_id`
    pub fn builder(
        client: ApiClient,
        user_id: impl Into<String>,
        app_id: impl Into<String>,
    ) -> SearchBuilder {
        SearchBuilder {
            client,
            user_app: UserAppId::new(user_id, app_id),
            top_k: None,
            metric: "euclidean".to_string(),
            algorithm: "nearest_neighbor".to_string(),
            pagination: false,
            page_size: crate::DEFAULT_PAGE_SIZE,
        }
    }

    /// Search with default options (top 10, euclidean, nearest neighbor)
    pub fn new(client: ApiClient, user_id: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            client,
            user_app: UserAppId::new(user_id, app_id),
            top_k: Some(crate::DEFAULT_TOP_K),
            metric: Metric::default(),
            algorithm: Algorithm::default(),
            page_size: crate::DEFAULT_PAGE_SIZE,
        }
    }

    /// Owner and app this search runs against
    pub fn user_app(&self) -> &UserAppId {
        &self.user_app
    }

    /// Hit limit, `None` in pagination mode
    pub fn top_k(&self) -> Option<usize> {
        self.top_k
    }

    /// Distance metric sent with every search
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Search algorithm sent with every search
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Whether results are paged instead of capped at `top_k`
    pub fn is_paginated(&self) -> bool {
        self.top_k.is_none()
    }

    /// Validate JSON ranks and filters and prepare the result pages.
    ///
    /// Fails with [`Error::User`] before any request is sent if a clause does
    /// not match the schema.
    pub fn query(&self, ranks: &[Value], filters: &[Value]) -> Result<QueryPages> {
        let ranks = schema::validate_ranks(ranks)?;
        let filters = schema::validate_filters(filters)?;
        Ok(self.pages(&ranks, &filters, self.default_plan(), 1))
    }

    /// Typed counterpart of [`query`](Self::query)
    pub fn query_clauses(&self, ranks: &[Clause], filters: &[Clause]) -> Result<QueryPages> {
        for rank in ranks {
            rank.validate_rank()?;
        }
        for filter in filters {
            filter.validate()?;
        }
        Ok(self.pages(ranks, filters, self.default_plan(), 1))
    }

    fn default_plan(&self) -> PagePlan {
        match self.top_k {
            Some(top_k) => PagePlan::TopK {
                top_k,
                page_size: self.page_size,
            },
            None => PagePlan::Paginated {
                per_page: self.page_size,
                single: false,
            },
        }
    }

    /// Fetch one explicit page; only available in pagination mode
    pub fn query_page(
        &self,
        ranks: &[Value],
        filters: &[Value],
        page_no: u32,
        per_page: Option<u32>,
    ) -> Result<QueryPages> {
        if !self.is_paginated() {
            return Err(Error::user(
                "page_no and per_page can only be used with pagination enabled",
            ));
        }
        if page_no == 0 || per_page == Some(0) {
            return Err(Error::user("page_no and per_page must be greater than zero"));
        }
        let ranks = schema::validate_ranks(ranks)?;
        let filters = schema::validate_filters(filters)?;
        let plan = PagePlan::Paginated {
            per_page: per_page.unwrap_or(self.page_size),
            single: true,
        };
        Ok(self.pages(&ranks, &filters, plan, page_no))
    }

    /// Build the wire query from already validated clauses
    fn pages(
        &self,
        ranks: &[Clause],
        filters: &[Clause],
        plan: PagePlan,
        first_page: u32,
    ) -> QueryPages {
        let query = Query {
            ranks: ranks.iter().filter_map(Clause::to_rank).collect(),
            filters: filters.iter().filter_map(Clause::to_filter).collect(),
        };

        info!(
            "Searching {}/{} with {} ranks and {} filters",
            self.user_app.user_id,
            self.user_app.app_id,
            query.ranks.len(),
            query.filters.len()
        );
        debug!("Page plan: {:?}", plan);

        let search = SearchBody {
            query,
            metric: self.metric,
            algorithm: self.algorithm,
        };

        QueryPages::new(
            self.client.clone(),
            self.user_app.path("inputs/searches"),
            search,
            plan,
            first_page,
        )
    }
}
