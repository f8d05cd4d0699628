mod date;
pub use date::{DateFilterValue, DateMode};

mod filter;
pub use filter::{Conjunction, FieldRef, FilterGroup, FilterNode, FilterValue, Literal, Predicate, Scalar};

mod group;
pub use group::GroupSpec;

mod operator;
pub use operator::Operator;

mod search;
pub use search::{SearchScope, SearchSpec};

mod sort;
pub use sort::{Direction, SortItem, SortSpec};

mod value;
pub use value::Value;
