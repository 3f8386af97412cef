//! Reference data browsing use cases.
//!
//! Page-number pagination, search and lookups over the seeded reference
//! tables, as served to the journal screens.

use std::sync::Arc;

use serde::Serialize;

use crate::infrastructure::ports::{
    ReferenceRepo, Relation, RepoError, Row, DEFAULT_RELATED_LIMIT, DEFAULT_SEARCH_LIMIT,
};

/// Largest page (and search result) size a caller can ask for.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Errors that can occur while browsing reference data.
#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("Search term must not be empty")]
    EmptySearchTerm,
    #[error("No row with id {id} in {table}")]
    NotFound { table: String, id: String },
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// One page of a reference table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferencePage {
    pub items: Vec<Row>,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

pub struct BrowseReference {
    repo: Arc<dyn ReferenceRepo>,
}

impl BrowseReference {
    pub fn new(repo: Arc<dyn ReferenceRepo>) -> Self {
        Self { repo }
    }

    pub async fn tables(&self) -> Result<Vec<String>, BrowseError> {
        Ok(self.repo.list_tables().await?)
    }

    /// Fetch page `page` (1-based; 0 is treated as 1).
    ///
    /// Page size is clamped to `1..=MAX_PAGE_SIZE`. Pages past the end come
    /// back empty without querying rows.
    pub async fn page(
        &self,
        table: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ReferencePage, BrowseError> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

        let total = self.repo.count(table, None).await?;
        let offset = u64::from(page - 1) * u64::from(page_size);
        let items = if offset >= total {
            Vec::new()
        } else {
            self.repo.get_all(table, page_size, offset).await?
        };

        Ok(ReferencePage {
            items,
            page,
            page_size,
            total,
            total_pages: total.div_ceil(u64::from(page_size)),
        })
    }

    pub async fn search(
        &self,
        table: &str,
        column: &str,
        term: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Row>, BrowseError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(BrowseError::EmptySearchTerm);
        }
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_PAGE_SIZE);
        Ok(self.repo.search(table, column, term, limit).await?)
    }

    /// Look a row up by its `id` column.
    pub async fn find(&self, table: &str, id: &str) -> Result<Row, BrowseError> {
        self.repo
            .get_by_id(table, "id", id)
            .await?
            .ok_or_else(|| BrowseError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            })
    }

    pub async fn related(
        &self,
        relation: Relation,
        id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Row>, BrowseError> {
        let limit = limit.unwrap_or(DEFAULT_RELATED_LIMIT).clamp(1, MAX_PAGE_SIZE);
        Ok(self.repo.get_related(relation, id, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockReferenceRepo;
    use serde_json::json;

    fn row(id: i64, name: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), json!(id));
        row.insert("name".into(), json!(name));
        row
    }

    #[tokio::test]
    async fn page_computes_offset_and_totals() {
        let mut repo = MockReferenceRepo::new();
        repo.expect_count()
            .withf(|table, filter| table == "weapons" && filter.is_none())
            .returning(|_, _| Ok(25));
        repo.expect_get_all()
            .withf(|table, limit, offset| table == "weapons" && *limit == 10 && *offset == 10)
            .times(1)
            .returning(|_, _, _| Ok(vec![row(11, "AK-74")]));

        let browse = BrowseReference::new(Arc::new(repo));
        let page = browse.page("weapons", 2, 10).await.expect("page");

        assert_eq!(page.page, 2);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, vec![row(11, "AK-74")]);
    }

    #[tokio::test]
    async fn page_zero_and_oversized_page_size_are_clamped() {
        let mut repo = MockReferenceRepo::new();
        repo.expect_count().returning(|_, _| Ok(3));
        repo.expect_get_all()
            .withf(|table, limit, offset| {
                table == "armor" && *limit == MAX_PAGE_SIZE && *offset == 0
            })
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));

        let browse = BrowseReference::new(Arc::new(repo));
        let page = browse.page("armor", 0, 50_000).await.expect("page");
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn page_past_the_end_skips_row_query() {
        let mut repo = MockReferenceRepo::new();
        repo.expect_count().returning(|_, _| Ok(5));
        repo.expect_get_all().never();

        let browse = BrowseReference::new(Arc::new(repo));
        let page = browse.page("artifacts", 4, 5).await.expect("page");
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn search_rejects_blank_terms() {
        let mut repo = MockReferenceRepo::new();
        repo.expect_search().never();

        let browse = BrowseReference::new(Arc::new(repo));
        let result = browse.search("weapons", "name", "   ", None).await;
        assert!(matches!(result, Err(BrowseError::EmptySearchTerm)));
    }

    #[tokio::test]
    async fn search_trims_and_uses_default_limit() {
        let mut repo = MockReferenceRepo::new();
        repo.expect_search()
            .withf(|table, column, term, limit| {
                table == "weapons" && column == "name" && term == "AK" && *limit == DEFAULT_SEARCH_LIMIT
            })
            .times(1)
            .returning(|_, _, _, _| Ok(vec![row(1, "AK-74")]));

        let browse = BrowseReference::new(Arc::new(repo));
        let rows = browse.search("weapons", "name", " AK ", None).await.expect("search");
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn find_maps_missing_row_to_not_found() {
        let mut repo = MockReferenceRepo::new();
        repo.expect_get_by_id()
            .withf(|table, column, id| table == "artifacts" && column == "id" && id == "42")
            .returning(|_, _, _| Ok(None));

        let browse = BrowseReference::new(Arc::new(repo));
        let result = browse.find("artifacts", "42").await;
        assert!(matches!(result, Err(BrowseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn repo_errors_propagate() {
        let mut repo = MockReferenceRepo::new();
        repo.expect_list_tables()
            .returning(|| Err(RepoError::database("list_tables", "gone")));

        let browse = BrowseReference::new(Arc::new(repo));
        assert!(matches!(browse.tables().await, Err(BrowseError::Repo(_))));
    }

    #[tokio::test]
    async fn related_uses_default_limit() {
        let mut repo = MockReferenceRepo::new();
        repo.expect_get_related()
            .withf(|relation, id, limit| {
                relation.foreign_table == "artifact_effects"
                    && id == "7"
                    && *limit == DEFAULT_RELATED_LIMIT
            })
            .returning(|_, _, _| Ok(Vec::new()));

        let browse = BrowseReference::new(Arc::new(repo));
        let relation = Relation {
            table: "artifacts".into(),
            foreign_table: "artifact_effects".into(),
            foreign_key: "artifact_id".into(),
        };
        assert!(browse.related(relation, "7", None).await.expect("related").is_empty());
    }
}
