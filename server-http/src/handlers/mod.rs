pub mod admin_ops;
pub mod cache_ops;
pub mod health;

pub use admin_ops::clear_all;
pub use cache_ops::{
    delete_clear_key, delete_value, get_clear_key, get_value, put_clear_key, put_value,
};
pub use health::health_check;
