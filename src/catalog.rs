//! Catalog index: mapping, structured queries, execution, response shaping.

pub mod index;
pub mod memory;
pub mod query;
pub mod response;
pub mod schema;

pub use index::CatalogIndex;
pub use memory::InMemoryCatalogIndex;
pub use query::{CatalogQuery, FilterClause, FilterSpec, QueryBuilder, SortOrder, TermValue};
pub use response::{BookRecord, Hit, SearchResponse, normalize_hit, normalize_response};
pub use schema::{FieldType, IndexSchema};
