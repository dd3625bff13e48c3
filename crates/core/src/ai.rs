//! Randomized policies for computer-controlled players.

use crate::{AiChoiceRule, AiShopRule, Choice, PickaxeGrade, Player, RngState, ShopRule};

/// Probability mass below which the AI retreats. Rises as health drops, as
/// the expedition goes deeper and once the player carries a meaningful haul.
pub fn retreat_threshold(
    player: &Player,
    max_health: u8,
    card_index: usize,
    rule: &AiChoiceRule,
) -> f64 {
    let health_ratio = if max_health == 0 {
        0.0
    } else {
        f64::from(player.health.min(max_health)) / f64::from(max_health)
    };
    let horizon = rule.depth_horizon.max(1);
    let depth_ratio = (card_index + 1).min(horizon) as f64 / horizon as f64;
    let gem_pressure = if player.mine_gems > rule.cautious_gems {
        rule.cautious_pressure
    } else {
        rule.relaxed_pressure
    };
    rule.base_threshold
        + (1.0 - health_ratio) * rule.health_weight
        + depth_ratio * rule.depth_weight
        + gem_pressure * rule.gem_weight
}

pub fn ai_choice(
    player: &Player,
    max_health: u8,
    card_index: usize,
    rule: &AiChoiceRule,
    rng: &mut RngState,
) -> Choice {
    let risk = rng.unit();
    if risk < retreat_threshold(player, max_health, card_index, rule) {
        Choice::retreat()
    } else {
        Choice::mine(player.pickaxes.best())
    }
}

/// Greedy purchase plan for one AI player, bounded by its balance.
pub fn ai_shopping_list(
    player: &Player,
    shop: &ShopRule,
    rule: &AiShopRule,
    rng: &mut RngState,
) -> Vec<PickaxeGrade> {
    let Some(cheapest) = shop.cheapest() else {
        return Vec::new();
    };
    let mut gems = player.camp_gems;
    let mut held = player.pickaxes.held() as usize;
    let mut plan = Vec::new();
    let mut attempts = 0;
    while gems >= cheapest && attempts < rule.max_attempts {
        attempts += 1;
        if held >= rule.max_held || rng.chance(rule.stop_chance) {
            break;
        }
        let pick = [
            (PickaxeGrade::Gold, rule.gold_chance),
            (PickaxeGrade::Silver, rule.silver_chance),
        ]
        .into_iter()
        .find_map(|(grade, chance)| {
            let price = shop.price(grade)?;
            (gems >= price && rng.chance(chance)).then_some((grade, price))
        });
        if let Some((grade, price)) = pick {
            gems -= price;
            held += 1;
            plan.push(grade);
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, GameConfig, PlayerId};

    fn player(health: u8, mine_gems: u32) -> Player {
        let mut player = Player::new(PlayerId(1), "ai".to_string(), false, health, 10);
        player.mine_gems = mine_gems;
        player
    }

    #[test]
    fn threshold_rises_with_risk_factors() {
        let rule = GameConfig::standard().ai.choice;
        let calm = retreat_threshold(&player(3, 0), 3, 0, &rule);
        assert!((calm - (0.15 + 0.01 + 0.045)).abs() < 1e-9);
        assert!(retreat_threshold(&player(1, 0), 3, 0, &rule) > calm);
        assert!(retreat_threshold(&player(3, 0), 3, 9, &rule) > calm);
        assert!(retreat_threshold(&player(3, 6), 3, 0, &rule) > calm);
    }

    #[test]
    fn miners_swing_their_best_pickaxe() {
        let mut rule = GameConfig::standard().ai.choice;
        rule.base_threshold = -10.0;
        let mut rng = RngState::from_seed(1);
        let mut digger = player(3, 0);
        digger.pickaxes.add(PickaxeGrade::Silver);
        digger.pickaxes.add(PickaxeGrade::Gold);
        let choice = ai_choice(&digger, 3, 0, &rule, &mut rng);
        assert_eq!(choice, Choice::mine(PickaxeGrade::Gold));

        rule.base_threshold = 10.0;
        assert_eq!(ai_choice(&digger, 3, 0, &rule, &mut rng).action, Action::Retreat);
    }

    #[test]
    fn shopping_never_overspends_or_overfills() {
        let config = GameConfig::standard();
        let mut rng = RngState::from_seed(42);
        for gems in [0, 4, 5, 10, 23, 60] {
            let mut shopper = player(3, 0);
            shopper.camp_gems = gems;
            let plan = ai_shopping_list(&shopper, &config.shop, &config.ai.shopping, &mut rng);
            let spent: u32 = plan
                .iter()
                .filter_map(|grade| config.shop.price(*grade))
                .sum();
            assert!(spent <= gems);
            assert!(plan.len() <= config.ai.shopping.max_held);
            assert!(!plan.contains(&PickaxeGrade::Bronze));
        }
    }
}
