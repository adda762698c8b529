//! Postgres access for orderfeed: pool setup, migrations and the line item
//! detail document table.

mod error;
pub mod line_item_details;
mod pool;

pub use error::DbError;
pub use line_item_details::{
    find_line_item_details, get_line_item_detail, upsert_line_item_detail, LineItemDetailRow,
};
pub use pool::{
    connect_pool, connect_pool_from_env, health_check, ping, run_migrations, PoolConfig,
};
