pub mod comparison;
pub mod events;
pub mod ports;
pub mod row;
pub mod schema;
pub mod snapshot;
pub mod table_diff;
pub mod value_objects;
