//! Shopping Cart Models (购物车)

use crate::error::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};

/// Catalog item a cart line points at. Exactly one kind per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ItemRef {
    Dish(i64),
    Combo(i64),
}

impl ItemRef {
    pub fn dish_id(&self) -> Option<i64> {
        match self {
            Self::Dish(id) => Some(*id),
            Self::Combo(_) => None,
        }
    }

    pub fn combo_id(&self) -> Option<i64> {
        match self {
            Self::Combo(id) => Some(*id),
            Self::Dish(_) => None,
        }
    }

    /// Stable key for the (item, variant) pair; backs the cart's unique index.
    ///
    /// `dish:12`, `dish:12#no ice`, `combo:7`
    pub fn line_key(&self, flavor: Option<&str>) -> String {
        let base = match self {
            Self::Dish(id) => format!("dish:{id}"),
            Self::Combo(id) => format!("combo:{id}"),
        };
        match flavor {
            Some(f) => format!("{base}#{f}"),
            None => base,
        }
    }
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.line_key(None))
    }
}

/// Add / subtract payload as sent by clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartItemInput {
    pub dish_id: Option<i64>,
    pub combo_id: Option<i64>,
    /// Flavor / variant descriptor, e.g. "less spicy"
    pub flavor: Option<String>,
}

impl CartItemInput {
    /// Resolve into a typed reference plus normalized variant.
    ///
    /// Blank flavors count as "no variant" so that `""` and `null` merge.
    pub fn resolve(&self) -> AppResult<(ItemRef, Option<String>)> {
        let item = match (self.dish_id, self.combo_id) {
            (Some(id), None) => ItemRef::Dish(id),
            (None, Some(id)) => ItemRef::Combo(id),
            _ => return Err(AppError::new(ErrorCode::InvalidItemRef)),
        };
        let flavor = self
            .flavor
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        Ok((item, flavor))
    }
}

/// One pending selection in a user's cart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartLine {
    pub id: i64,
    pub user_id: i64,
    pub dish_id: Option<i64>,
    pub combo_id: Option<i64>,
    pub flavor: Option<String>,
    #[serde(skip)]
    pub item_key: String,
    pub name: String,
    pub image: Option<String>,
    /// Unit price captured when the line was first added
    pub price: f64,
    pub quantity: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CartLine {
    pub fn item_ref(&self) -> Option<ItemRef> {
        match (self.dish_id, self.combo_id) {
            (Some(id), None) => Some(ItemRef::Dish(id)),
            (None, Some(id)) => Some(ItemRef::Combo(id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_requires_exactly_one_ref() {
        let both = CartItemInput {
            dish_id: Some(1),
            combo_id: Some(2),
            flavor: None,
        };
        assert_eq!(both.resolve().unwrap_err().code, ErrorCode::InvalidItemRef);
        assert_eq!(
            CartItemInput::default().resolve().unwrap_err().code,
            ErrorCode::InvalidItemRef
        );

        let combo = CartItemInput {
            combo_id: Some(9),
            ..Default::default()
        };
        assert_eq!(combo.resolve().unwrap(), (ItemRef::Combo(9), None));
    }

    #[test]
    fn test_blank_flavor_is_no_variant() {
        let input = CartItemInput {
            dish_id: Some(3),
            combo_id: None,
            flavor: Some("   ".into()),
        };
        let (item, flavor) = input.resolve().unwrap();
        assert_eq!(item.line_key(flavor.as_deref()), "dish:3");

        let input = CartItemInput {
            flavor: Some(" no ice ".into()),
            ..input
        };
        let (item, flavor) = input.resolve().unwrap();
        assert_eq!(item.line_key(flavor.as_deref()), "dish:3#no ice");
    }
}
