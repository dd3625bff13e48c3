use super::*;
use crate::*;
use tracing::{debug, warn};

impl Game {
    /// Buys one pickaxe out of the player's camp gems. Returns the price paid.
    pub fn purchase_item(
        &mut self,
        player: PlayerId,
        grade: PickaxeGrade,
        events: &mut EventBus,
    ) -> Result<u32, GameError> {
        self.require_phase(Phase::Shopping)?;
        let price = self
            .config
            .shop
            .price(grade)
            .ok_or(GameError::NotForSale(grade))?;
        if let Err(err) = self.registry.credit(player, -i64::from(price), 0) {
            if matches!(err, RegistryError::InsufficientGems(_)) {
                warn!(%player, %grade, price, "purchase rejected");
                events.push(Event::PurchaseRejected { player, grade });
            }
            return Err(err.into());
        }
        self.registry.add_pickaxe(player, grade)?;
        let camp_gems = self.registry.player(player)?.camp_gems;
        events.push(Event::PickaxeBought {
            player,
            grade,
            cost: price,
            camp_gems,
        });
        debug!(%player, %grade, price, camp_gems, "pickaxe bought");
        Ok(price)
    }

    /// Lets the computer players shop, then sends everyone into the mine.
    pub fn finish_shopping(&mut self, events: &mut EventBus) -> Result<Progress, GameError> {
        self.require_phase(Phase::Shopping)?;
        let shoppers: Vec<PlayerId> = self
            .registry
            .iter()
            .filter(|player| !player.is_human && player.is_alive)
            .map(|player| player.id)
            .collect();
        for id in shoppers {
            let plan = ai_shopping_list(
                self.registry.player(id)?,
                &self.config.shop,
                &self.config.ai.shopping,
                &mut self.rng,
            );
            for grade in plan {
                self.purchase_item(id, grade, events)?;
            }
        }
        self.begin_expedition(events)
    }
}
