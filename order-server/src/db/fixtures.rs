//! Seed helpers for unit tests

use shared::models::{Order, OrderDetail, OrderStatus, PayMethod, PayStatus};
use sqlx::SqlitePool;

pub async fn seed_user(pool: &SqlitePool, id: i64, created_at: i64) {
    sqlx::query("INSERT INTO users (id, name, created_at) VALUES (?, ?, ?)")
        .bind(id)
        .bind(format!("user {id}"))
        .bind(created_at)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn seed_dish(pool: &SqlitePool, id: i64, name: &str, price: f64) {
    sqlx::query("INSERT INTO dish (id, name, image, price) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(format!("https://img.example/{id}.png"))
        .bind(price)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn seed_combo(pool: &SqlitePool, id: i64, name: &str, price: f64) {
    sqlx::query("INSERT INTO combo (id, name, price) VALUES (?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(price)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn seed_address(pool: &SqlitePool, id: i64, user_id: i64) {
    sqlx::query(
        "INSERT INTO address_book (id, user_id, consignee, phone, province_name, city_name, district_name, detail) VALUES (?, ?, 'Li Lei', '13800000000', 'Zhejiang', 'Hangzhou', 'Xihu', ' No.1 Wensan Rd')",
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await
    .unwrap();
}

/// Minimal order row; callers tweak the returned value before inserting
pub fn order(id: i64, status: OrderStatus, order_time: i64, amount: f64) -> Order {
    Order {
        id,
        number: format!("N{id}"),
        status,
        user_id: 1,
        address_book_id: 1,
        order_time,
        checkout_time: None,
        pay_method: PayMethod::Wechat,
        pay_status: PayStatus::Unpaid,
        amount,
        remark: None,
        phone: "13800000000".into(),
        consignee: "Li Lei".into(),
        address: "Hangzhou".into(),
        estimated_delivery_time: None,
        delivery_status: true,
        pack_amount: 0,
        tableware_number: 0,
        tableware_status: true,
        cancel_reason: None,
        cancel_time: None,
        dispatched_at: None,
        delivery_time: None,
        created_at: order_time,
        updated_at: order_time,
        updated_by: None,
    }
}

pub async fn seed_order(pool: &SqlitePool, order: &Order) {
    super::repository::order::insert_order(pool, order).await.unwrap();
}

pub async fn seed_detail(pool: &SqlitePool, id: i64, order_id: i64, name: &str, quantity: i64) {
    let detail = OrderDetail {
        id,
        order_id,
        dish_id: Some(id),
        combo_id: None,
        flavor: None,
        name: name.to_string(),
        image: None,
        price: 1.0,
        quantity,
    };
    super::repository::order::insert_details(pool, &[detail]).await.unwrap();
}
