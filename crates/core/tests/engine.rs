use deepdig_core::{
    CardKind, CardTemplate, Choice, DeckError, Event, EventBus, Game, GameConfig, GameError,
    Phase, PickaxeGrade, PlayerId, Position,
};

fn config_with(damage: u8, gems: u32, length: usize, rounds: u8) -> GameConfig {
    let mut config = GameConfig::standard();
    config.cards = vec![CardTemplate {
        damage,
        gems,
        count: length as u32,
        kind: CardKind::Fixed,
    }];
    config.rounds.sequence_length = length;
    config.rounds.max_rounds = rounds;
    config
}

fn humans(config: GameConfig, names: &[&str]) -> (Game, Vec<PlayerId>, EventBus) {
    let mut game = Game::new(config, 7);
    let mut events = EventBus::default();
    let ids = names
        .iter()
        .map(|name| {
            game.register_player(name, true, &mut events)
                .expect("register")
        })
        .collect();
    game.start_game(&mut events).expect("start");
    (game, ids, events)
}

fn health(game: &Game, id: PlayerId) -> u8 {
    game.players().get(id).expect("player").health
}

#[test]
fn first_hit_of_a_damage_value_is_evaded() {
    let (mut game, ids, mut events) = humans(config_with(1, 0, 3, 3), &["ada"]);
    let ada = ids[0];
    game.finish_shopping(&mut events).expect("shop");
    assert_eq!(game.pending_choices(), vec![ada]);

    game.submit_choice(ada, Choice::mine(PickaxeGrade::Bronze), &mut events)
        .expect("first card");
    assert_eq!(health(&game, ada), 3);
    game.submit_choice(ada, Choice::mine(PickaxeGrade::Bronze), &mut events)
        .expect("second card");
    assert_eq!(health(&game, ada), 2);
    assert_eq!(game.tracker().history(ada), &[1, 1]);

    let drained: Vec<Event> = events.drain().collect();
    assert!(drained
        .iter()
        .any(|event| matches!(event, Event::DamageEvaded { damage: 1, .. })));
    assert!(drained
        .iter()
        .any(|event| matches!(event, Event::DamageTaken { amount: 1, health: 2, .. })));
}

#[test]
fn gems_split_by_pickaxe_weight() {
    let (mut game, ids, mut events) = humans(config_with(0, 40, 12, 3), &["ada", "bo"]);
    let (ada, bo) = (ids[0], ids[1]);
    assert_eq!(
        game.purchase_item(ada, PickaxeGrade::Gold, &mut events),
        Ok(10)
    );
    game.finish_shopping(&mut events).expect("shop");

    let progress = game
        .submit_choice(ada, Choice::mine(PickaxeGrade::Gold), &mut events)
        .expect("ada");
    assert!(progress.resolved.is_empty());
    assert_eq!(progress.waiting_on, vec![bo]);

    let progress = game
        .submit_choice(bo, Choice::mine(PickaxeGrade::Bronze), &mut events)
        .expect("bo");
    let resolution = &progress.resolved[0];
    assert_eq!(resolution.award_for(ada), Some(30));
    assert_eq!(resolution.award_for(bo), Some(10));

    let ada_state = game.players().get(ada).expect("ada");
    assert_eq!(ada_state.mine_gems, 30);
    assert_eq!(ada_state.pickaxes.count(PickaxeGrade::Gold), Some(0));
    assert_eq!(ada_state.position, Position::Mine(1));
}

#[test]
fn dead_miner_gems_go_to_players_in_the_same_spot() {
    let (mut game, ids, mut events) =
        humans(config_with(3, 21, 12, 3), &["ada", "bo", "cy"]);
    game.finish_shopping(&mut events).expect("shop");
    for id in &ids {
        game.submit_choice(*id, Choice::mine(PickaxeGrade::Bronze), &mut events)
            .expect("card 0");
    }
    for id in &ids {
        assert_eq!(game.players().get(*id).expect("player").mine_gems, 7);
        assert_eq!(health(&game, *id), 3);
    }

    let (ada, bo, cy) = (ids[0], ids[1], ids[2]);
    game.submit_choice(ada, Choice::mine(PickaxeGrade::Bronze), &mut events)
        .expect("ada");
    game.submit_choice(bo, Choice::retreat(), &mut events)
        .expect("bo");
    let progress = game
        .submit_choice(cy, Choice::retreat(), &mut events)
        .expect("cy");

    let resolution = &progress.resolved[0];
    assert!(resolution.died(ada));
    let death = &resolution.deaths[0];
    assert_eq!(death.mine_gems, 7);
    assert_eq!(death.each, 3);
    assert_eq!(death.discarded, 1);

    assert_eq!(death.heirs, vec![bo, cy]);
    assert!(resolution.awards.is_empty());
    for id in [bo, cy] {
        assert_eq!(game.players().get(id).expect("heir").camp_gems, 20);
    }

    // Nobody left underground, so the round is over and the dead walk again.
    assert_eq!(game.phase(), Phase::Shopping);
    assert_eq!(game.round().current_round, 2);
    let revived = game.players().get(ada).expect("ada");
    assert!(revived.is_alive);
    assert_eq!(revived.camp_gems, 10);
    assert_eq!(revived.mine_gems, 0);
    assert_eq!(revived.position, Position::Camp);
}

#[test]
fn exhausting_the_sequence_starts_the_next_round() {
    let (mut game, ids, mut events) = humans(config_with(2, 5, 12, 3), &["ada"]);
    let ada = ids[0];
    game.finish_shopping(&mut events).expect("shop");
    for _ in 0..12 {
        game.submit_choice(ada, Choice::mine(PickaxeGrade::Bronze), &mut events)
            .expect("card");
        if game.phase() != Phase::Expedition {
            break;
        }
    }
    // Damage 2 is evaded once, then lands twice.
    assert_eq!(game.phase(), Phase::Shopping);
    assert_eq!(game.round().current_round, 2);
    let player = game.players().get(ada).expect("ada");
    assert_eq!(player.health, 3);
    assert!(player.is_alive);
    assert_eq!(player.position, Position::Camp);
    assert!(game.tracker().is_empty());
}

#[test]
fn full_sequence_banks_remaining_miners() {
    let (mut game, ids, mut events) = humans(config_with(0, 5, 12, 3), &["ada"]);
    let ada = ids[0];
    game.finish_shopping(&mut events).expect("shop");
    let mut resolved = 0;
    while game.phase() == Phase::Expedition {
        let progress = game
            .submit_choice(ada, Choice::mine(PickaxeGrade::Bronze), &mut events)
            .expect("card");
        resolved += progress.resolved.len();
    }
    assert_eq!(resolved, 12);
    assert_eq!(game.round().current_round, 2);
    assert_eq!(game.players().get(ada).expect("ada").camp_gems, 70);
    assert!(events
        .drain()
        .any(|event| matches!(event, Event::GemsBanked { gems: 60, .. })));
}

#[test]
fn ending_a_round_twice_is_a_no_op() {
    let (mut game, ids, mut events) = humans(config_with(0, 5, 12, 3), &["ada"]);
    game.finish_shopping(&mut events).expect("shop");
    game.submit_choice(ids[0], Choice::mine(PickaxeGrade::Bronze), &mut events)
        .expect("card");

    assert_eq!(game.end_round(&mut events), Ok(true));
    assert_eq!(game.players().get(ids[0]).expect("ada").camp_gems, 15);
    events.drain().for_each(drop);

    assert_eq!(game.end_round(&mut events), Ok(false));
    assert_eq!(game.close_window(&mut events), Ok(None));
    assert!(events.is_empty());
    assert_eq!(game.round().current_round, 2);
}

#[test]
fn final_round_ranks_players_by_camp_gems() {
    let (mut game, ids, mut events) = humans(config_with(0, 10, 12, 1), &["ada", "bo"]);
    let (ada, bo) = (ids[0], ids[1]);
    game.finish_shopping(&mut events).expect("shop");
    game.submit_choice(ada, Choice::retreat(), &mut events)
        .expect("ada");
    game.submit_choice(bo, Choice::mine(PickaxeGrade::Bronze), &mut events)
        .expect("bo");
    game.submit_choice(bo, Choice::retreat(), &mut events)
        .expect("bo home");

    assert_eq!(game.phase(), Phase::Results);
    let standings = game.standings();
    assert_eq!(standings[0].player, bo);
    assert_eq!(standings[0].camp_gems, 20);
    assert_eq!(standings[1].rank, 2);
    assert_eq!(game.winner().map(|s| s.player), Some(bo));
    assert!(matches!(
        events.drain().last(),
        Some(Event::GameFinished { .. })
    ));
    assert_eq!(
        game.advance_phase(&mut events),
        Err(GameError::InvalidPhase(Phase::Results))
    );
}

#[test]
fn choices_stay_hidden_until_everyone_commits() {
    let (mut game, ids, mut events) = humans(config_with(0, 10, 12, 3), &["ada", "bo"]);
    game.finish_shopping(&mut events).expect("shop");
    game.submit_choice(ids[0], Choice::retreat(), &mut events)
        .expect("ada");

    let snapshot = game.snapshot();
    assert!(snapshot.player(ids[0]).expect("ada").has_chosen);
    assert!(!snapshot.player(ids[1]).expect("bo").has_chosen);
    assert_eq!(snapshot.waiting_on, vec![ids[1]]);
    assert_eq!(snapshot.revealed().count(), 0);
    assert!(!events
        .pending()
        .iter()
        .any(|event| matches!(event, Event::ChoicesRevealed { .. })));

    game.submit_choice(ids[1], Choice::mine(PickaxeGrade::Bronze), &mut events)
        .expect("bo");
    let snapshot = game.snapshot();
    let revealed: Vec<_> = snapshot.revealed().collect();
    assert_eq!(revealed.len(), 1);
    assert_eq!(revealed[0].payout, Some(10));
}

#[test]
fn rejects_out_of_turn_actions() {
    let (mut game, ids, mut events) = humans(config_with(0, 10, 12, 3), &["ada"]);
    let ada = ids[0];
    assert_eq!(
        game.submit_choice(ada, Choice::retreat(), &mut events),
        Err(GameError::InvalidPhase(Phase::Shopping))
    );
    assert_eq!(
        game.purchase_item(ada, PickaxeGrade::Bronze, &mut events),
        Err(GameError::NotForSale(PickaxeGrade::Bronze))
    );
    game.purchase_item(ada, PickaxeGrade::Gold, &mut events)
        .expect("gold");
    assert!(game
        .purchase_item(ada, PickaxeGrade::Silver, &mut events)
        .is_err());
    assert!(events
        .drain()
        .any(|event| matches!(event, Event::PurchaseRejected { .. })));

    game.finish_shopping(&mut events).expect("shop");
    assert!(matches!(
        game.submit_choice(ada, Choice::mine(PickaxeGrade::Silver), &mut events),
        Err(GameError::Choice(_))
    ));
    assert!(matches!(
        game.register_player("late", true, &mut events),
        Err(GameError::InvalidPhase(Phase::Expedition))
    ));
}

#[test]
fn unplayable_rules_keep_the_game_in_preparation() {
    let mut events = EventBus::default();
    let mut game = Game::new(config_with(0, 10, 0, 3), 7);
    game.register_player("ada", true, &mut events)
        .expect("register");
    assert!(matches!(
        game.start_game(&mut events),
        Err(GameError::InvalidRules(_))
    ));
    assert_eq!(game.phase(), Phase::Preparation);
    assert!(events
        .drain()
        .all(|event| matches!(event, Event::PlayerRegistered { .. })));

    let mut short = config_with(0, 10, 12, 3);
    short.cards[0].count = 5;
    let mut game = Game::new(short, 7);
    game.register_player("ada", true, &mut events)
        .expect("register");
    assert!(matches!(
        game.start_game(&mut events),
        Err(GameError::Deck(DeckError::PoolTooSmall { pool: 5, wanted: 12 }))
    ));
    assert_eq!(game.phase(), Phase::Preparation);
}

#[test]
fn computer_players_finish_a_game_alone() {
    let mut game = Game::new(GameConfig::standard(), 99);
    let mut events = EventBus::default();
    for name in ["a", "b", "c", "d"] {
        game.register_player(name, false, &mut events)
            .expect("register");
    }
    assert!(matches!(
        game.register_player("e", false, &mut events),
        Err(GameError::TableFull(4))
    ));
    for _ in 0..8 {
        if game.phase() == Phase::Results {
            break;
        }
        game.advance_phase(&mut events).expect("advance");
    }
    assert_eq!(game.phase(), Phase::Results);
    assert_eq!(game.round().current_round, 3);
    let standings = game.standings();
    assert_eq!(standings.len(), 4);
    assert!(standings
        .windows(2)
        .all(|pair| pair[0].camp_gems >= pair[1].camp_gems));
}

#[test]
fn same_seed_replays_the_same_game() {
    let play = |seed| {
        let mut game = Game::new(GameConfig::standard(), seed);
        let mut events = EventBus::default();
        for name in ["a", "b", "c"] {
            game.register_player(name, false, &mut events)
                .expect("register");
        }
        while game.phase() != Phase::Results {
            game.advance_phase(&mut events).expect("advance");
        }
        game.standings()
    };
    assert_eq!(play(5), play(5));
}
