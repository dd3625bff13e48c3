use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PickaxeGrade {
    Bronze,
    Silver,
    Gold,
}

impl PickaxeGrade {
    pub const ALL: [PickaxeGrade; 3] = [Self::Bronze, Self::Silver, Self::Gold];

    /// Share weight used when splitting a card's gems between miners.
    pub const fn share_weight(self) -> u32 {
        match self {
            Self::Bronze => 1,
            Self::Silver => 2,
            Self::Gold => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bronze" | "b" => Some(Self::Bronze),
            "silver" | "s" => Some(Self::Silver),
            "gold" | "g" => Some(Self::Gold),
            _ => None,
        }
    }
}

impl fmt::Display for PickaxeGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pickaxe multiset. Bronze is unlimited and never stored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pickaxes {
    silver: u32,
    gold: u32,
}

impl Pickaxes {
    pub fn count(&self, grade: PickaxeGrade) -> Option<u32> {
        match grade {
            PickaxeGrade::Bronze => None,
            PickaxeGrade::Silver => Some(self.silver),
            PickaxeGrade::Gold => Some(self.gold),
        }
    }

    pub fn has(&self, grade: PickaxeGrade) -> bool {
        self.count(grade).map_or(true, |count| count > 0)
    }

    /// Stored (non-bronze) pickaxes.
    pub fn held(&self) -> u32 {
        self.silver + self.gold
    }

    pub fn is_empty(&self) -> bool {
        self.held() == 0
    }

    pub fn add(&mut self, grade: PickaxeGrade) {
        match grade {
            PickaxeGrade::Bronze => {}
            PickaxeGrade::Silver => self.silver += 1,
            PickaxeGrade::Gold => self.gold += 1,
        }
    }

    /// Removes one instance. Bronze always succeeds and removes nothing.
    pub fn consume(&mut self, grade: PickaxeGrade) -> bool {
        let slot = match grade {
            PickaxeGrade::Bronze => return true,
            PickaxeGrade::Silver => &mut self.silver,
            PickaxeGrade::Gold => &mut self.gold,
        };
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn best(&self) -> PickaxeGrade {
        if self.gold > 0 {
            PickaxeGrade::Gold
        } else if self.silver > 0 {
            PickaxeGrade::Silver
        } else {
            PickaxeGrade::Bronze
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bronze_is_always_available() {
        let mut pickaxes = Pickaxes::default();
        assert!(pickaxes.has(PickaxeGrade::Bronze));
        assert!(pickaxes.consume(PickaxeGrade::Bronze));
        pickaxes.add(PickaxeGrade::Bronze);
        assert!(pickaxes.is_empty());
        assert_eq!(pickaxes.best(), PickaxeGrade::Bronze);
    }

    #[test]
    fn consume_removes_one_instance() {
        let mut pickaxes = Pickaxes::default();
        pickaxes.add(PickaxeGrade::Gold);
        pickaxes.add(PickaxeGrade::Gold);
        pickaxes.add(PickaxeGrade::Silver);
        assert_eq!(pickaxes.best(), PickaxeGrade::Gold);
        assert!(pickaxes.consume(PickaxeGrade::Gold));
        assert_eq!(pickaxes.count(PickaxeGrade::Gold), Some(1));
        assert!(pickaxes.consume(PickaxeGrade::Gold));
        assert!(!pickaxes.consume(PickaxeGrade::Gold));
        assert_eq!(pickaxes.best(), PickaxeGrade::Silver);
        assert_eq!(pickaxes.held(), 1);
    }

    #[test]
    fn grades_parse_from_short_names() {
        assert_eq!(PickaxeGrade::parse(" G "), Some(PickaxeGrade::Gold));
        assert_eq!(PickaxeGrade::parse("silver"), Some(PickaxeGrade::Silver));
        assert_eq!(PickaxeGrade::parse("iron"), None);
    }
}
