use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use turbo_cache::{CachePolicy, VaryRule};
use turbo_client::Procedure;
use turbo_commerce::schemas;
use turbo_commerce::search::{SearchHit, SearchQueryByTerm, SearchResult};
use turbo_core::{ProcedureResult, RequestContext, SchemaResult};

use super::Backend;

/// Backend search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitRecord {
    pub pid: String,
    pub handle: String,
    pub title: String,
    pub image_url: String,
}

/// `search.byTerm`
pub struct SearchByTerm {
    pub(crate) backend: Arc<Backend>,
}

#[async_trait]
impl Procedure for SearchByTerm {
    type Input = SearchQueryByTerm;
    type Output = SearchResult;
    type Data = Vec<HitRecord>;

    fn input_schema(&self) -> SchemaResult<SearchQueryByTerm> {
        Ok(schemas::search_query_by_term())
    }

    fn output_schema(&self) -> SchemaResult<SearchResult> {
        schemas::search_result()
    }

    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::cached().vary_on(VaryRule::Locale)
    }

    async fn fetch(&self, input: &SearchQueryByTerm, _ctx: &RequestContext) -> ProcedureResult<Vec<HitRecord>> {
        Ok(self
            .backend
            .catalog
            .search(&input.term)
            .into_iter()
            .map(|p| HitRecord {
                pid: p.pid.clone(),
                handle: p.handle.clone(),
                title: p.title.clone(),
                image_url: p.image_url.clone(),
            })
            .collect())
    }

    async fn transform(
        &self,
        input: &SearchQueryByTerm,
        _ctx: &mut RequestContext,
        data: Vec<HitRecord>,
    ) -> ProcedureResult<SearchResult> {
        let hits = data
            .into_iter()
            .map(|hit| SearchHit {
                product: hit.pid.into(),
                slug: hit.handle,
                name: hit.title,
                image: Some(hit.image_url),
            })
            .collect();
        Ok(SearchResult::paginate(hits, input))
    }
}
