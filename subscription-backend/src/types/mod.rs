pub mod datetime;
pub mod response;

pub use datetime::{flexible_date, optional_flexible_date};
pub use response::ApiResponse;
