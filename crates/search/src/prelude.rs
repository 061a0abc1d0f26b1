pub use crate::classes::{GRID_ELEMENT, GRID_SEARCH, register};
pub use crate::error::{SearchError, SearchErrorExt};
pub use crate::expander::GridExpander;
pub use crate::space::{Concat, Files, Grid, Point, Product, SearchSpace, Space};
