//! Flavor lines for hazards, keyed by damage value.

use crate::UiLocale;

struct Hazard {
    evade_en: &'static str,
    evade_zh: &'static str,
    hit_en: &'static str,
    hit_zh: &'static str,
}

const fn hazard(
    evade_en: &'static str,
    evade_zh: &'static str,
    hit_en: &'static str,
    hit_zh: &'static str,
) -> Hazard {
    Hazard {
        evade_en,
        evade_zh,
        hit_en,
        hit_zh,
    }
}

static LIGHT: [Hazard; 4] = [
    hazard(
        "dodges a diving bat",
        "机敏地躲开了蝙蝠的攻击",
        "is bitten by a bat",
        "在矿洞中被蝙蝠咬到",
    ),
    hazard(
        "steps around a jagged rock",
        "小心避开了尖锐的石头",
        "is cut by a jagged rock",
        "被尖锐的石头划伤",
    ),
    hazard(
        "spots a trap and walks around it",
        "及时发现了陷阱并绕过",
        "steps into a trap",
        "踩到了陷阱",
    ),
    hazard(
        "waves off a swarm of poison bugs",
        "用衣物驱赶了毒虫",
        "is stung by poison bugs",
        "被毒虫叮咬",
    ),
];

static HEAVY: [Hazard; 4] = [
    hazard(
        "drives off a cave spider",
        "成功驱赶了矿洞蜘蛛",
        "is attacked by a cave spider",
        "遭遇矿洞蜘蛛攻击",
    ),
    hazard(
        "ducks under falling rubble",
        "及时躲避了坍塌的碎石",
        "is struck by falling rubble",
        "被坍塌的碎石砸中",
    ),
    hazard(
        "skirts an acid pool",
        "绕过了危险的酸性水坑",
        "wades into an acid pool",
        "踏入了酸性水坑",
    ),
    hazard(
        "slips past a skeleton guard",
        "与骷髅守卫擦肩而过",
        "is struck by a skeleton guard",
        "被矿洞守卫骷髅攻击",
    ),
];

static DEADLY: [Hazard; 4] = [
    hazard(
        "stares down a cave demon and walks away",
        "勇敢地与恶魔对峙后全身而退",
        "is mauled by a cave demon",
        "遭遇矿洞恶魔攻击",
    ),
    hazard(
        "escapes a falling boulder",
        "在巨石落下前及时逃脱",
        "is pinned by a boulder",
        "被巨石压伤",
    ),
    hazard(
        "grabs the ledge above the abyss",
        "抓住岩壁边缘避免坠入深渊",
        "falls into the abyss",
        "掉入了深渊",
    ),
    hazard(
        "sees through a cursed chest",
        "识破了诅咒宝箱的陷阱",
        "is cursed by a treasure chest",
        "被诅咒的宝箱反噬",
    ),
];

fn pick(damage: u8, variant: usize) -> Option<&'static Hazard> {
    let table = match damage {
        1 => &LIGHT,
        2 => &HEAVY,
        3 => &DEADLY,
        _ => return None,
    };
    table.get(variant % table.len())
}

/// `variant` picks among the flavors; any number works.
pub fn evade_line(locale: UiLocale, name: &str, damage: u8, variant: usize) -> String {
    match (pick(damage, variant), locale) {
        (Some(hazard), UiLocale::ZhCn) => format!("{name}{}", hazard.evade_zh),
        (Some(hazard), UiLocale::EnUs) => format!("{name} {}", hazard.evade_en),
        (None, UiLocale::ZhCn) => format!("{name}成功避开了危险"),
        (None, UiLocale::EnUs) => format!("{name} avoids the danger"),
    }
}

pub fn hit_line(locale: UiLocale, name: &str, damage: u8, variant: usize) -> String {
    match (pick(damage, variant), locale) {
        (Some(hazard), UiLocale::ZhCn) => format!("{name}{}受到{damage}点伤害", hazard.hit_zh),
        (Some(hazard), UiLocale::EnUs) => {
            format!("{name} {} and takes {damage} damage", hazard.hit_en)
        }
        (None, UiLocale::ZhCn) => format!("{name}受到{damage}点伤害"),
        (None, UiLocale::EnUs) => format!("{name} takes {damage} damage"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_follow_damage_value() {
        assert_eq!(
            hit_line(UiLocale::EnUs, "Ada", 2, 1),
            "Ada is struck by falling rubble and takes 2 damage"
        );
        assert_eq!(
            evade_line(UiLocale::ZhCn, "Ada", 1, 4),
            "Ada机敏地躲开了蝙蝠的攻击"
        );
        assert_eq!(hit_line(UiLocale::EnUs, "Ada", 7, 0), "Ada takes 7 damage");
    }
}
