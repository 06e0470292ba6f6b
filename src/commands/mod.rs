pub mod fix;
pub mod list;
