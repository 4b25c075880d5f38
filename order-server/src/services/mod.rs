//! Collaborator services
//!
//! 订单核心只依赖这里的 trait：菜品/套餐目录与地址簿。
//! SQLite 实现直接查本地表，测试可替换为内存桩。

pub mod address;
pub mod catalog;

pub use address::{AddressBook, SqliteAddressBook};
pub use catalog::{Catalog, SqliteCatalog};
