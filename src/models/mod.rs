pub mod recommendation;

pub use recommendation::{parse_body, DataValidationError, Recommendation, PRODUCT_NAME_MAX_LEN};
