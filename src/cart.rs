//! The cart as a plain value: a mapping from item id to a positive quantity,
//! rebuilt from the persisted per-user entries on every request and threaded
//! through checkout as data rather than ambient session state.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Item;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Cart {
    entries: BTreeMap<Uuid, i32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Uuid, i32)>) -> Self {
        let mut cart = Self::new();
        for (item_id, quantity) in entries {
            cart.add(item_id, quantity);
        }
        cart
    }

    /// Increment the quantity for `item_id`, creating the entry when absent.
    /// Non-positive quantities are ignored.
    pub fn add(&mut self, item_id: Uuid, quantity: i32) {
        if quantity <= 0 {
            return;
        }
        *self.entries.entry(item_id).or_insert(0) += quantity;
    }

    /// Drop the entry for `item_id`. Removing an absent key is a no-op.
    pub fn remove(&mut self, item_id: Uuid) {
        self.entries.remove(&item_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn quantity(&self, item_id: Uuid) -> Option<i32> {
        self.entries.get(&item_id).copied()
    }

    /// Resolve the cart against the live catalog. Entries whose item is no
    /// longer present are skipped rather than failing the whole operation;
    /// each surviving entry captures the item's current unit price.
    pub fn snapshot(&self, items: &[Item]) -> Vec<CartLine> {
        self.entries
            .iter()
            .filter_map(|(item_id, &quantity)| {
                let item = items.iter().find(|item| item.id == *item_id)?;
                Some(CartLine {
                    item: item.clone(),
                    quantity,
                    subtotal: item.price * Decimal::from(quantity),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    pub item: Item,
    pub quantity: i32,
    pub subtotal: Decimal,
}

pub fn total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(|line| line.subtotal).sum()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::{Cart, total};
    use crate::models::Item;

    fn item(id: Uuid, price: rust_decimal::Decimal) -> Item {
        Item {
            id,
            category_id: None,
            name: "Chapati".into(),
            description: None,
            price,
            available: true,
            image: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn add_increments_existing_entries() {
        let id = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(id, 2);
        cart.add(id, 3);
        assert_eq!(cart.quantity(id), Some(5));
    }

    #[test]
    fn add_ignores_non_positive_quantities() {
        let id = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(id, 0);
        cart.add(id, -4);
        assert!(cart.is_empty());
    }

    #[test]
    fn remove_absent_key_is_a_noop() {
        let id = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(id, 1);
        cart.remove(Uuid::new_v4());
        assert_eq!(cart.quantity(id), Some(1));
    }

    #[test]
    fn snapshot_skips_entries_without_a_live_item() {
        let kept = Uuid::new_v4();
        let gone = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(kept, 2);
        cart.add(gone, 1);

        let lines = cart.snapshot(&[item(kept, dec!(1000.00))]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item.id, kept);
        assert_eq!(lines[0].subtotal, dec!(2000.00));
    }

    #[test]
    fn total_sums_line_subtotals() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(a, 2);
        cart.add(b, 1);

        let lines = cart.snapshot(&[item(a, dec!(1000.00)), item(b, dec!(500.00))]);
        assert_eq!(total(&lines), dec!(2500.00));
    }

    #[test]
    fn empty_cart_snapshot_is_empty() {
        let cart = Cart::new();
        assert!(cart.snapshot(&[]).is_empty());
        assert_eq!(total(&[]), rust_decimal::Decimal::ZERO);
    }
}
