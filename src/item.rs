//! Consumable items that restore health.
use serde::{Deserialize, Serialize};

/// Definition of a consumable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Stable key used in inventories.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Hit points restored when consumed.
    pub heal: i32,
}

impl ItemDef {
    /// Creates an item definition.
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>, heal: i32) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            heal,
        }
    }
}

/// Lookup table of consumable items.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    items: Vec<ItemDef>,
}

impl ItemRegistry {
    /// Registry with the medkit and the built-in foods.
    #[must_use]
    pub fn with_defaults() -> Self {
        let items = [
            ("medkit", "Medkit", 25),
            ("food_apple", "Apple", 12),
            ("food_apricot", "Apricot", 12),
            ("food_banana", "Banana", 12),
            ("food_beef_jerky", "Beef Jerky", 20),
            ("food_bone", "Bone", 10),
            ("food_bread_ration", "Bread Ration", 20),
            ("food_cheese", "Cheese", 20),
            ("food_choko", "Choko", 12),
            ("food_chunk", "Chunk", 8),
            ("food_chunk_rotten", "Chunk Rotten", 2),
            ("food_fruit", "Fruit", 12),
            ("food_grape", "Grape", 12),
            ("food_honeycomb", "Honeycomb", 20),
            ("food_lemon", "Lemon", 12),
            ("food_lump_of_royal_jelly", "Lump Of Royal Jelly", 35),
            ("food_lychee", "Lychee", 12),
            ("food_meat_ration", "Meat Ration", 20),
            ("food_orange", "Orange", 12),
            ("food_pear", "Pear", 12),
            ("food_piece_of_ambrosia", "Piece Of Ambrosia", 35),
            ("food_pizza", "Pizza", 20),
            ("food_rambutan", "Rambutan", 12),
            ("food_sausage", "Sausage", 20),
            ("food_snozzcumber", "Snozzcumber", 12),
            ("food_strawberry", "Strawberry", 12),
            ("food_sultana", "Sultana", 12),
        ];
        Self {
            items: items
                .into_iter()
                .map(|(key, name, heal)| ItemDef::new(key, name, heal))
                .collect(),
        }
    }

    /// Adds or replaces a definition keyed by [`ItemDef::key`].
    pub fn insert(&mut self, item: ItemDef) {
        match self.items.iter_mut().find(|i| i.key == item.key) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
    }

    /// Looks up an item by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ItemDef> {
        self.items.iter().find(|i| i.key == key)
    }

    /// Heal value for `key`, or zero for unknown keys.
    #[must_use]
    pub fn heal_value(&self, key: &str) -> i32 {
        self.get(key).map_or(0, |i| i.heal)
    }
}
