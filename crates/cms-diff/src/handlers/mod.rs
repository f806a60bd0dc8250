//! Array and polymorphic combinators

mod array;
mod ordering;
mod positional;
mod union;
mod whole;

pub use array::KeyedArray;
pub use ordering::{Ordered, reorder_moves};
pub use positional::Positional;
pub use union::Union;
pub use whole::Whole;
