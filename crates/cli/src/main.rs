mod narrative;

use anyhow::{bail, Context};
use deepdig_autoplay::{simulate_many, write_json, write_text, AutoplayConfig};
use deepdig_core::{
    dispatch_cues, AudioSink, Choice, Cue, Event, EventBus, Game, GameConfig, GameSnapshot, Phase,
    PickaxeGrade, PlayerId, Position,
};
use deepdig_data::{load_game_config, normalize_locale};
use deepdig_lobby::{LobbyError, LobbySession, MemoryRoomStore, Seat, SystemClock};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UiLocale {
    EnUs,
    ZhCn,
}

impl UiLocale {
    fn code(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::ZhCn => "zh_CN",
        }
    }

    fn from_opt(value: Option<&str>) -> Self {
        if normalize_locale(value) == "zh_CN" {
            Self::ZhCn
        } else {
            Self::EnUs
        }
    }

    fn text<'a>(self, en: &'a str, zh: &'a str) -> &'a str {
        if matches!(self, Self::ZhCn) {
            zh
        } else {
            en
        }
    }
}

/// `format!` with one template per locale. Both templates take the same
/// positional arguments.
macro_rules! say {
    ($locale:expr, $en:literal, $zh:literal $(, $arg:expr)* $(,)?) => {
        match $locale {
            UiLocale::ZhCn => format!($zh $(, $arg)*),
            UiLocale::EnUs => format!($en $(, $arg)*),
        }
    };
}

#[derive(Debug, Clone)]
struct CliOptions {
    assets: PathBuf,
    seed: Option<u64>,
    ai: Option<usize>,
    auto_games: Option<u32>,
    out: Option<PathBuf>,
    name: Option<String>,
    bell: bool,
    locale: UiLocale,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        assets: PathBuf::from("assets"),
        seed: None,
        ai: None,
        auto_games: None,
        out: None,
        name: None,
        bell: false,
        locale: UiLocale::EnUs,
    };
    let mut locale_arg: Option<String> = std::env::var("DEEPDIG_LANG").ok();
    let mut idx = 0usize;
    while idx < args.len() {
        let value = args.get(idx + 1);
        let mut consumed = true;
        match (args[idx].as_str(), value) {
            ("--assets", Some(value)) => options.assets = PathBuf::from(value),
            ("--seed", Some(value)) => options.seed = value.parse().ok(),
            ("--ai", Some(value)) => options.ai = value.parse().ok(),
            ("--auto", Some(value)) => options.auto_games = value.parse().ok(),
            ("--out", Some(value)) => options.out = Some(PathBuf::from(value)),
            ("--name", Some(value)) => options.name = Some(value.clone()),
            ("--locale" | "--lang" | "-l", Some(value)) => locale_arg = Some(value.clone()),
            ("--bell", _) => {
                options.bell = true;
                consumed = false;
            }
            _ => consumed = false,
        }
        idx += if consumed { 2 } else { 1 };
    }
    options.locale = UiLocale::from_opt(locale_arg.as_deref());
    options
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    let result = match options.auto_games {
        Some(games) => run_auto(&options, games),
        None => run_session(&options),
    };
    if let Err(err) = result {
        eprintln!("{}: {err:#}", options.locale.text("error", "错误"));
        std::process::exit(1);
    }
}

fn load_config(options: &CliOptions) -> anyhow::Result<GameConfig> {
    load_game_config(&options.assets)
        .with_context(|| format!("load rules from {}", options.assets.display()))
}

fn run_auto(options: &CliOptions, games: u32) -> anyhow::Result<()> {
    let config = load_config(options)?;
    let defaults = AutoplayConfig::default();
    let autoplay = AutoplayConfig {
        seed: options.seed.unwrap_or(defaults.seed),
        games,
        players: options.ai.map(|count| count + 1).unwrap_or(defaults.players),
        keep_games: options.out.is_some(),
        ..defaults
    };
    let result = simulate_many(&config, &autoplay)?;
    println!("{}", result.to_text_report());
    if let Some(path) = &options.out {
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if is_json {
            write_json(path, &result)?;
        } else {
            write_text(path, &result)?;
        }
        println!(
            "{}: {}",
            options.locale.text("trace written", "记录已写入"),
            path.display()
        );
    }
    Ok(())
}

/// Rings the terminal bell for the cues that matter most.
struct TerminalBell {
    enabled: bool,
}

impl AudioSink for TerminalBell {
    fn play(&mut self, cue: Cue) {
        if self.enabled && matches!(cue, Cue::Damage | Cue::Death) {
            print!("\x07");
            let _ = io::stdout().flush();
        }
    }
}

fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn run_session(options: &CliOptions) -> anyhow::Result<()> {
    let locale = options.locale;
    let config = load_config(options)?;
    let mut game = match options.seed {
        Some(seed) => Game::new(config, seed),
        None => Game::with_entropy(config),
    };
    info!(seed = game.seed(), locale = locale.code(), "session starting");
    println!(
        "{}",
        locale.text(
            "== Deep Dig: three trips into the mine ==",
            "== 深矿探险：三次下矿 =="
        )
    );

    let seats = match options.ai {
        Some(count) => quick_seats(locale, options.name.as_deref(), count),
        None => select_characters(locale)?,
    };
    let Some(seats) = seats else {
        return Ok(());
    };

    let mut events = EventBus::default();
    let mut bell = TerminalBell {
        enabled: options.bell,
    };
    for seat in &seats {
        game.register_player(&seat.name, seat.is_human, &mut events)?;
    }
    game.start_game(&mut events)?;
    flush_events(locale, &game, &mut events, &mut bell);

    loop {
        let keep_going = match game.phase() {
            Phase::Preparation => {
                game.advance_phase(&mut events)?;
                true
            }
            Phase::Shopping => shopping_turn(locale, &mut game, &mut events)?,
            Phase::Expedition => expedition_turn(locale, &mut game, &mut events)?,
            Phase::Results => {
                print_standings(locale, &game);
                return Ok(());
            }
        };
        flush_events(locale, &game, &mut events, &mut bell);
        if !keep_going {
            println!("{}", locale.text("Bye.", "再见。"));
            return Ok(());
        }
    }
}

fn quick_seats(locale: UiLocale, name: Option<&str>, ai: usize) -> Option<Vec<Seat>> {
    let name = match name {
        Some(name) => name.to_string(),
        None => read_line(locale.text("Your name: ", "你的名字："))?,
    };
    let name = if name.trim().is_empty() {
        locale.text("Player", "玩家").to_string()
    } else {
        name
    };
    let mut seats = vec![Seat {
        slot: 1,
        name,
        is_human: true,
    }];
    for index in 0..ai {
        seats.push(Seat {
            slot: (index + 2) as u8,
            name: format!("AI {}", index + 1),
            is_human: false,
        });
    }
    Some(seats)
}

/// Hot-seat character selection over an in-process lobby room. Each
/// confirmed slot is its own participant; the first ready slot is played by
/// the person at the keyboard and the rest by the computer.
fn select_characters(locale: UiLocale) -> anyhow::Result<Option<Vec<Seat>>> {
    let mut store = MemoryRoomStore::with_ttl(Arc::new(SystemClock), u64::MAX);
    let mut host = LobbySession::with_entropy("host");
    let code = host.create_room(&mut store)?;
    host.start_selection(&mut store)?;
    let mut guests: Vec<LobbySession> = Vec::new();
    print_selection_help(locale);

    loop {
        let record = host.poll(&mut store)?;
        for (slot, state) in &record.character_states {
            let label = if state.ready {
                state.player_name.clone()
            } else {
                locale.text("(empty)", "（空）").to_string()
            };
            println!("  [{slot}] {label}");
        }
        let Some(line) = read_line(locale.text("select> ", "选择> ")) else {
            return Ok(None);
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        let outcome = match words.as_slice() {
            ["pick" | "p", slot, name @ ..] => match slot.parse::<u8>() {
                Ok(slot) => {
                    let name = name.join(" ");
                    claim_slot(&mut host, &mut guests, &mut store, &code, slot, &name)
                }
                Err(_) => {
                    print_selection_help(locale);
                    Ok(())
                }
            },
            ["drop" | "d", slot] => match slot.parse::<u8>() {
                Ok(slot) => release_slot(&mut host, &mut guests, &mut store, slot),
                Err(_) => {
                    print_selection_help(locale);
                    Ok(())
                }
            },
            ["reset"] => host.reset_selections(&mut store).map(drop),
            ["start" | "s"] => match host.begin_game(&mut store) {
                Ok(seats) => return Ok(Some(seats)),
                Err(err) => Err(err),
            },
            ["quit" | "q"] => return Ok(None),
            _ => {
                print_selection_help(locale);
                Ok(())
            }
        };
        if let Err(err) = outcome {
            println!("  ! {}", lobby_error_text(locale, &err));
        }
    }
}

/// A participant holding no slot yet, joining a new one when needed.
fn free_session<'a>(
    host: &'a mut LobbySession,
    guests: &'a mut Vec<LobbySession>,
    store: &mut MemoryRoomStore,
    code: &str,
) -> Result<&'a mut LobbySession, LobbyError> {
    let record = host.poll(store)?;
    if record.held_by(host.id()).is_none() {
        return Ok(host);
    }
    if let Some(index) = guests
        .iter()
        .position(|guest| record.held_by(guest.id()).is_none())
    {
        return Ok(&mut guests[index]);
    }
    let mut guest = LobbySession::with_entropy(&format!("seat {}", guests.len() + 2));
    guest.join_room(store, code)?;
    guests.push(guest);
    let index = guests.len() - 1;
    Ok(&mut guests[index])
}

fn claim_slot(
    host: &mut LobbySession,
    guests: &mut Vec<LobbySession>,
    store: &mut MemoryRoomStore,
    code: &str,
    slot: u8,
    name: &str,
) -> Result<(), LobbyError> {
    let session = free_session(host, guests, store, code)?;
    session.select_slot(store, slot)?;
    if let Err(err) = session.confirm_slot(store, slot, name) {
        session.cancel_slot(store, slot)?;
        return Err(err);
    }
    Ok(())
}

fn release_slot(
    host: &mut LobbySession,
    guests: &mut [LobbySession],
    store: &mut MemoryRoomStore,
    slot: u8,
) -> Result<(), LobbyError> {
    let record = host.poll(store)?;
    let holder = record
        .slot(slot)
        .ok_or(LobbyError::NoSuchSlot(slot))?
        .claimed_by
        .clone();
    let session = std::iter::once(host)
        .chain(guests.iter_mut())
        .find(|session| holder.as_deref() == Some(session.id()))
        .ok_or(LobbyError::SlotNotHeld(slot))?;
    session.cancel_slot(store, slot).map(drop)
}

fn print_selection_help(locale: UiLocale) {
    println!(
        "{}",
        locale.text(
            "Commands: pick <slot> <name> | drop <slot> | reset | start | quit\nThe first ready slot is yours; the others are played by the computer.",
            "命令：pick <槽位> <名字> | drop <槽位> | reset | start | quit\n第一个就绪的槽位由你操作，其余由电脑操作。"
        )
    );
}

fn lobby_error_text(locale: UiLocale, err: &LobbyError) -> String {
    match err {
        LobbyError::SlotTaken(slot) => say!(locale, "slot {} is taken", "槽位{}已被占用", slot),
        LobbyError::NoSuchSlot(slot) => say!(locale, "there is no slot {}", "没有槽位{}", slot),
        LobbyError::EmptyName => locale.text("enter a name", "请输入名字").to_string(),
        LobbyError::NoSeats => locale
            .text("confirm at least one slot first", "请先确认至少一个角色")
            .to_string(),
        LobbyError::RoomFull => locale.text("the table is full", "人数已满").to_string(),
        other => other.to_string(),
    }
}

fn shopping_turn(
    locale: UiLocale,
    game: &mut Game,
    events: &mut EventBus,
) -> anyhow::Result<bool> {
    let shoppers: Vec<PlayerId> = game
        .players()
        .iter()
        .filter(|player| player.is_human && player.is_alive)
        .map(|player| player.id)
        .collect();
    let silver = game.config().shop.price(PickaxeGrade::Silver).unwrap_or(0);
    let gold = game.config().shop.price(PickaxeGrade::Gold).unwrap_or(0);
    for id in shoppers {
        loop {
            let Some(player) = game.players().get(id) else {
                break;
            };
            println!(
                "{}",
                say!(
                    locale,
                    "[{}] camp gems {} | silver x{} gold x{} | buy s ({}) / g ({}), or done",
                    "[{}] 营地宝石 {} | 银镐 x{} 金镐 x{} | 购买 s（{}）/ g（{}），或 done",
                    player.name,
                    player.camp_gems,
                    player.pickaxes.count(PickaxeGrade::Silver).unwrap_or(0),
                    player.pickaxes.count(PickaxeGrade::Gold).unwrap_or(0),
                    silver,
                    gold,
                )
            );
            let Some(line) = read_line(locale.text("shop> ", "商店> ")) else {
                return Ok(false);
            };
            let command = line.to_ascii_lowercase();
            match command.as_str() {
                "done" | "d" | "" => break,
                "quit" | "q" => return Ok(false),
                other => {
                    let Some(grade) = PickaxeGrade::parse(other.trim_start_matches("buy ")) else {
                        println!("  ? buy s | buy g | done");
                        continue;
                    };
                    if let Err(err) = game.purchase_item(id, grade, events) {
                        println!("  ! {err}");
                    }
                }
            }
        }
    }
    game.finish_shopping(events)?;
    Ok(true)
}

fn parse_choice(line: &str) -> Option<Choice> {
    let mut words = line.split_whitespace();
    match words.next()?.to_ascii_lowercase().as_str() {
        "r" | "retreat" => Some(Choice::retreat()),
        "m" | "mine" => {
            let grade = match words.next() {
                Some(word) => PickaxeGrade::parse(word)?,
                None => PickaxeGrade::Bronze,
            };
            Some(Choice::mine(grade))
        }
        _ => None,
    }
}

fn expedition_turn(
    locale: UiLocale,
    game: &mut Game,
    events: &mut EventBus,
) -> anyhow::Result<bool> {
    let snapshot = game.snapshot();
    let chooser = snapshot
        .waiting_on
        .iter()
        .copied()
        .find(|id| snapshot.player(*id).is_some_and(|view| view.is_human));
    let Some(chooser) = chooser else {
        bail!("the expedition is waiting on nobody");
    };
    print_expedition(locale, &snapshot);
    let name = snapshot
        .player(chooser)
        .map(|view| view.name.clone())
        .unwrap_or_default();
    let prompt = say!(
        locale,
        "[{}] m [b|s|g] = mine, r = retreat > ",
        "[{}] m [b|s|g] = 挖矿，r = 撤退 > ",
        name
    );
    let Some(line) = read_line(&prompt) else {
        return Ok(false);
    };
    if matches!(line.as_str(), "q" | "quit") {
        return Ok(false);
    }
    let Some(choice) = parse_choice(&line) else {
        println!("  ? {}", locale.text("m, m s, m g or r", "m、m s、m g 或 r"));
        return Ok(true);
    };
    if let Err(err) = game.submit_choice(chooser, choice, events) {
        println!("  ! {err}");
    }
    Ok(true)
}

fn print_expedition(locale: UiLocale, snapshot: &GameSnapshot) {
    println!(
        "{}",
        say!(
            locale,
            "-- round {}/{}, card {}/{} --",
            "-- 第{}/{}轮，第{}/{}张卡 --",
            snapshot.round,
            snapshot.max_rounds,
            snapshot.card_index + 1,
            snapshot.cards.len()
        )
    );
    let path: Vec<String> = snapshot
        .revealed()
        .map(|card| match card.face {
            Some(face) if face.is_dice() => {
                format!("[d{} dice={}]", face.damage, card.payout.unwrap_or(0))
            }
            Some(face) => format!("[d{} g{}]", face.damage, face.gems),
            None => "[?]".to_string(),
        })
        .collect();
    if !path.is_empty() {
        println!("  {}", path.join(" "));
    }
    for view in &snapshot.players {
        let place = match (view.is_alive, view.position) {
            (false, _) => locale.text("dead", "阵亡").to_string(),
            (true, Position::Camp) => locale.text("camp", "营地").to_string(),
            (true, Position::Mine(index)) => say!(locale, "card {}", "第{}张", index + 1),
        };
        let mark = if view.has_chosen { "*" } else { " " };
        println!(
            "  {mark} {:<10} hp {} | mine {:>3} | camp {:>3} | S{} G{} | {place}",
            view.name, view.health, view.mine_gems, view.camp_gems, view.silver, view.gold
        );
    }
}

fn print_standings(locale: UiLocale, game: &Game) {
    println!("{}", locale.text("== Final standings ==", "== 最终排名 =="));
    for standing in game.standings() {
        println!(
            "  {}. {:<10} {}",
            standing.rank, standing.name, standing.camp_gems
        );
    }
    if let Some(winner) = game.winner() {
        println!(
            "{}",
            say!(
                locale,
                "{} wins with {} gems!",
                "{}以{}颗宝石获胜！",
                winner.name,
                winner.camp_gems
            )
        );
    }
}

fn flush_events(locale: UiLocale, game: &Game, events: &mut EventBus, bell: &mut TerminalBell) {
    dispatch_cues(events.pending(), bell);
    for event in events.drain() {
        if let Some(line) = describe_event(locale, game, &event) {
            println!("  {line}");
        }
    }
}

fn name_of(game: &Game, id: PlayerId) -> String {
    game.players()
        .get(id)
        .map(|player| player.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn describe_event(locale: UiLocale, game: &Game, event: &Event) -> Option<String> {
    let name = |id: PlayerId| name_of(game, id);
    let line = match event {
        Event::PlayerRegistered { name, human, .. } => {
            let role = if *human {
                locale.text("you", "玩家")
            } else {
                locale.text("computer", "电脑")
            };
            say!(locale, "{} joins ({})", "{}加入（{}）", name, role)
        }
        Event::GameStarted {
            players,
            max_rounds,
        } => say!(
            locale,
            "{} diggers set out for {} rounds",
            "{}名矿工出发，共{}轮",
            players,
            max_rounds
        ),
        Event::RoundStarted { round, max_rounds } => say!(
            locale,
            "=== Round {}/{} ===",
            "=== 第{}/{}轮 ===",
            round,
            max_rounds
        ),
        Event::PickaxeBought {
            player,
            grade,
            cost,
            camp_gems,
        } => say!(
            locale,
            "{} buys a {} pickaxe for {} ({} left)",
            "{}花费{}购买了{}镐（剩余{}）",
            name(*player),
            grade,
            cost,
            camp_gems
        ),
        Event::PurchaseRejected { player, grade } => say!(
            locale,
            "{} cannot afford a {} pickaxe",
            "{}买不起{}镐",
            name(*player),
            grade
        ),
        Event::ExpeditionStarted {
            cards, explorers, ..
        } => say!(
            locale,
            "{} enter the mine; {} cards lie ahead",
            "{}人进入矿洞，前方有{}张卡",
            explorers,
            cards
        ),
        Event::ChoicesRevealed { choices, .. } => {
            let parts: Vec<String> = choices
                .iter()
                .map(|(id, choice)| match choice.grade() {
                    Some(grade) => say!(locale, "{} mines ({})", "{}挖矿（{}）", name(*id), grade),
                    None => say!(locale, "{} retreats", "{}撤退", name(*id)),
                })
                .collect();
            parts.join(", ")
        }
        Event::CardRevealed {
            card_index,
            damage,
            gems,
        } => match gems {
            Some(gems) => say!(
                locale,
                "Card {}: damage {}, {} gems",
                "第{}张卡：伤害{}，宝石{}",
                card_index + 1,
                damage,
                gems
            ),
            None => say!(
                locale,
                "Card {}: damage {}, dice gems",
                "第{}张卡：伤害{}，骰子宝石",
                card_index + 1,
                damage
            ),
        },
        Event::DiceRolled {
            player,
            first,
            second,
        } => say!(
            locale,
            "{} rolls {} + {}",
            "{}掷出{} + {}",
            name(*player),
            first,
            second
        ),
        Event::DamageEvaded { player, damage } => {
            narrative::evade_line(locale, &name(*player), *damage, variant(game, *player))
        }
        Event::DamageTaken {
            player,
            amount,
            health,
        } => {
            let hit = narrative::hit_line(locale, &name(*player), *amount, variant(game, *player));
            say!(locale, "{} ({} hp left)", "{}（剩余{}点生命）", hit, health)
        }
        Event::PlayerDied { player, mine_gems } => say!(
            locale,
            "{} has fallen, dropping {} gems",
            "{}倒下了，掉落了{}颗宝石",
            name(*player),
            mine_gems
        ),
        Event::GemsRedistributed {
            to,
            each,
            discarded,
            ..
        } => {
            let heirs: Vec<String> = to.iter().map(|id| name(*id)).collect();
            say!(
                locale,
                "{} each pick up {} gems ({} lost)",
                "{}各拾取{}颗宝石（{}颗遗失）",
                heirs.join(", "),
                each,
                discarded
            )
        }
        Event::PlayerRetreated {
            player,
            banked,
            camp_gems,
        } => say!(
            locale,
            "{} heads back to camp with {} gems (total {})",
            "{}带着{}颗宝石返回营地（共{}）",
            name(*player),
            banked,
            camp_gems
        ),
        Event::GemsAwarded {
            player,
            grade,
            gems,
            mine_gems,
        } => say!(
            locale,
            "{} digs {} gems with {} ({} carried)",
            "{}用{}镐挖到{}颗宝石（携带{}）",
            name(*player),
            gems,
            grade,
            mine_gems
        ),
        Event::PickaxeConsumed { player, grade } => say!(
            locale,
            "{}'s {} pickaxe breaks",
            "{}的{}镐损坏了",
            name(*player),
            grade
        ),
        Event::ExpeditionAdvanced {
            card_index,
            explorers,
        } => say!(
            locale,
            "{} press on to card {}",
            "{}人继续前往第{}张卡",
            explorers,
            card_index + 1
        ),
        Event::GemsBanked {
            player,
            gems,
            camp_gems,
        } => say!(
            locale,
            "{} climbs out with {} gems (total {})",
            "{}带着{}颗宝石爬出矿洞（共{}）",
            name(*player),
            gems,
            camp_gems
        ),
        Event::RoundEnded { round } => {
            say!(locale, "Round {} is over", "第{}轮结束", round)
        }
        Event::ChoiceWindowOpened { .. }
        | Event::ChoiceSubmitted { .. }
        | Event::GameFinished { .. } => return None,
    };
    Some(line)
}

fn variant(game: &Game, player: PlayerId) -> usize {
    player.0 as usize + game.round().current_card_index
}
