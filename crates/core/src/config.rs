use crate::{CardKind, CardTemplate, PickaxeGrade};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRule {
    pub max_rounds: u8,
    pub sequence_length: usize,
    pub starting_health: u8,
    pub starting_camp_gems: u32,
    #[serde(default = "default_max_players")]
    pub max_players: usize,
}

fn default_max_players() -> usize {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickaxePrice {
    pub grade: PickaxeGrade,
    pub price: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopRule {
    pub prices: Vec<PickaxePrice>,
}

impl ShopRule {
    pub fn price(&self, grade: PickaxeGrade) -> Option<u32> {
        if grade == PickaxeGrade::Bronze {
            return None;
        }
        self.prices
            .iter()
            .find(|entry| entry.grade == grade)
            .map(|entry| entry.price)
    }

    pub fn cheapest(&self) -> Option<u32> {
        self.prices
            .iter()
            .filter(|entry| entry.grade != PickaxeGrade::Bronze)
            .map(|entry| entry.price)
            .min()
    }
}

/// Retreat-threshold weights for the AI dig/retreat decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiChoiceRule {
    pub base_threshold: f64,
    pub health_weight: f64,
    pub depth_weight: f64,
    pub gem_weight: f64,
    pub depth_horizon: usize,
    pub cautious_gems: u32,
    pub cautious_pressure: f64,
    pub relaxed_pressure: f64,
}

impl Default for AiChoiceRule {
    fn default() -> Self {
        Self {
            base_threshold: 0.15,
            health_weight: 0.3,
            depth_weight: 0.2,
            gem_weight: 0.15,
            depth_horizon: 20,
            cautious_gems: 5,
            cautious_pressure: 0.7,
            relaxed_pressure: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiShopRule {
    pub max_held: usize,
    pub stop_chance: f64,
    pub gold_chance: f64,
    pub silver_chance: f64,
    pub max_attempts: u32,
}

impl Default for AiShopRule {
    fn default() -> Self {
        Self {
            max_held: 4,
            stop_chance: 0.2,
            gold_chance: 0.4,
            silver_chance: 0.6,
            max_attempts: 64,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiRule {
    #[serde(default)]
    pub choice: AiChoiceRule,
    #[serde(default)]
    pub shopping: AiShopRule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub rounds: RoundRule,
    pub cards: Vec<CardTemplate>,
    pub shop: ShopRule,
    #[serde(default)]
    pub ai: AiRule,
}

impl GameConfig {
    /// The stock rules: three rounds of twelve cards drawn from a fifty-card pool.
    pub fn standard() -> Self {
        let card = |damage, gems, count, kind| CardTemplate {
            damage,
            gems,
            count,
            kind,
        };
        Self {
            rounds: RoundRule {
                max_rounds: 3,
                sequence_length: 12,
                starting_health: 3,
                starting_camp_gems: 10,
                max_players: default_max_players(),
            },
            cards: vec![
                card(1, 0, 10, CardKind::Fixed),
                card(2, 20, 10, CardKind::Fixed),
                card(3, 30, 5, CardKind::Fixed),
                card(0, 10, 10, CardKind::Fixed),
                card(0, 15, 5, CardKind::Fixed),
                card(0, 30, 5, CardKind::Fixed),
                card(0, 0, 5, CardKind::Dice),
            ],
            shop: ShopRule {
                prices: vec![
                    PickaxePrice {
                        grade: PickaxeGrade::Silver,
                        price: 5,
                    },
                    PickaxePrice {
                        grade: PickaxeGrade::Gold,
                        price: 10,
                    },
                ],
            },
            ai: AiRule::default(),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.cards.iter().map(|card| card.count as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pool_has_fifty_cards() {
        let config = GameConfig::standard();
        assert_eq!(config.pool_size(), 50);
        assert!(config.pool_size() >= config.rounds.sequence_length);
    }

    #[test]
    fn bronze_is_never_priced() {
        let mut shop = GameConfig::standard().shop;
        shop.prices.push(PickaxePrice {
            grade: PickaxeGrade::Bronze,
            price: 1,
        });
        assert_eq!(shop.price(PickaxeGrade::Bronze), None);
        assert_eq!(shop.price(PickaxeGrade::Gold), Some(10));
        assert_eq!(shop.cheapest(), Some(5));
    }
}
