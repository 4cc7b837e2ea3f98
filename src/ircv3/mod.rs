pub mod batch;
pub mod server_time;

pub use self::batch::BatchKind;
pub use self::server_time::{format_bound, format_timestamp, parse_bound, parse_server_time};
