use crate::schema::{AiRule, CardTable, GameConfig, PickaxeGrade, RoundRule, ShopRule};
use anyhow::{bail, Context};
use deepdig_core::MineCard;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

const RULES_FILE: &str = "rules.json";
const CARDS_FILE: &str = "cards.json";
const SHOP_FILE: &str = "shop.json";
const AI_FILE: &str = "ai.json";

/// Reads and validates the rule set stored in an assets directory.
/// `ai.json` is optional; the built-in AI constants apply without it.
pub fn load_game_config(dir: &Path) -> anyhow::Result<GameConfig> {
    let rounds: RoundRule = load_json(dir.join(RULES_FILE))?;
    let table: CardTable = load_json(dir.join(CARDS_FILE))?;
    let shop: ShopRule = load_json(dir.join(SHOP_FILE))?;
    let ai_path = dir.join(AI_FILE);
    let ai: AiRule = if ai_path.exists() {
        load_json(ai_path)?
    } else {
        AiRule::default()
    };

    let config = GameConfig {
        rounds,
        cards: table.cards,
        shop,
        ai,
    };
    validate(&config).with_context(|| format!("validate rules in {}", dir.display()))?;
    debug!(
        dir = %dir.display(),
        pool = config.pool_size(),
        "game config loaded"
    );
    Ok(config)
}

pub fn validate(config: &GameConfig) -> anyhow::Result<()> {
    let rules = &config.rounds;
    if rules.max_rounds == 0 {
        bail!("max_rounds must be at least 1");
    }
    if rules.starting_health == 0 {
        bail!("starting_health must be at least 1");
    }
    if rules.sequence_length == 0 {
        bail!("sequence_length must be at least 1");
    }
    if rules.max_players == 0 {
        bail!("max_players must be at least 1");
    }
    let pool = config.pool_size();
    if pool < rules.sequence_length {
        bail!(
            "card pool holds {pool} cards but each round draws {}",
            rules.sequence_length
        );
    }
    for (index, template) in config.cards.iter().enumerate() {
        if template.damage > MineCard::MAX_DAMAGE {
            bail!(
                "card template {index} deals {} damage (max {})",
                template.damage,
                MineCard::MAX_DAMAGE
            );
        }
    }
    for grade in [PickaxeGrade::Silver, PickaxeGrade::Gold] {
        if config.shop.price(grade).is_none() {
            bail!("shop has no price for {grade} pickaxes");
        }
    }
    if config
        .shop
        .prices
        .iter()
        .any(|entry| entry.grade == PickaxeGrade::Bronze)
    {
        bail!("bronze pickaxes are free and cannot be priced");
    }
    let shopping = &config.ai.shopping;
    for (name, value) in [
        ("stop_chance", shopping.stop_chance),
        ("gold_chance", shopping.gold_chance),
        ("silver_chance", shopping.silver_chance),
    ] {
        if !(0.0..=1.0).contains(&value) {
            bail!("ai shopping {name} must be a probability, got {value}");
        }
    }
    Ok(())
}

pub fn normalize_locale(locale: Option<&str>) -> String {
    let raw = locale.unwrap_or("en_US").trim();
    if raw.is_empty() {
        return "en_US".to_string();
    }
    match raw.replace('-', "_").to_ascii_lowercase().as_str() {
        "zh" | "zh_cn" | "zh_hans" | "zh_hans_cn" => "zh_CN".to_string(),
        "en" | "en_us" => "en_US".to_string(),
        _ => raw.replace('-', "_"),
    }
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rules_pass_validation() {
        validate(&GameConfig::standard()).expect("standard rules");
    }

    #[test]
    fn rejects_pool_smaller_than_sequence() {
        let mut config = GameConfig::standard();
        config.rounds.sequence_length = config.pool_size() + 1;
        let err = validate(&config).expect_err("pool too small");
        assert!(err.to_string().contains("card pool"));
    }

    #[test]
    fn locale_aliases() {
        assert_eq!(normalize_locale(None), "en_US");
        assert_eq!(normalize_locale(Some("zh-Hans")), "zh_CN");
        assert_eq!(normalize_locale(Some(" ")), "en_US");
        assert_eq!(normalize_locale(Some("fr-FR")), "fr_FR");
    }

    #[test]
    fn rejects_missing_gold_price() {
        let mut config = GameConfig::standard();
        config
            .shop
            .prices
            .retain(|entry| entry.grade != PickaxeGrade::Gold);
        assert!(validate(&config).is_err());
    }
}
