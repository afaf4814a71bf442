//! Recursive shadowcasting field-of-view computation.

mod shadowcast;
pub use shadowcast::{field_of_view, FovSource};
