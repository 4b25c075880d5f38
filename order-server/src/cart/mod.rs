//! Shopping cart (购物车)
//!
//! 同一 (用户, 商品, 口味) 只保留一行，重复加入只累加数量。

mod service;

pub use service::CartService;
