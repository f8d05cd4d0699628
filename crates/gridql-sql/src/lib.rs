#[macro_use]
pub mod serializer;
pub use serializer::{CompiledExpression, Params, Placeholder, Serializer};

pub mod filter;
pub use filter::FilterCompiler;

pub mod group;
pub use group::{GroupColumn, GroupCompiler, GroupExpr};

pub mod index;
pub use index::{IndexDescriptor, IndexDrift, IndexPlanner};

pub mod search;
pub use search::{SearchCompiler, SearchQuery};

pub mod sort;
pub use sort::SortCompiler;
