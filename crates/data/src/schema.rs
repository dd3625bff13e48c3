use serde::{Deserialize, Serialize};

pub use deepdig_core::{
    AiChoiceRule, AiRule, AiShopRule, CardKind, CardTemplate, GameConfig, PickaxeGrade,
    PickaxePrice, RoundRule, ShopRule,
};

/// On-disk shape of `cards.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardTable {
    pub cards: Vec<CardTemplate>,
}
