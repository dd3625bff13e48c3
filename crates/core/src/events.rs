use crate::{Choice, PickaxeGrade, PlayerId, Standing};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    PlayerRegistered {
        player: PlayerId,
        name: String,
        human: bool,
    },
    GameStarted {
        players: usize,
        max_rounds: u8,
    },
    RoundStarted {
        round: u8,
        max_rounds: u8,
    },
    PickaxeBought {
        player: PlayerId,
        grade: PickaxeGrade,
        cost: u32,
        camp_gems: u32,
    },
    PurchaseRejected {
        player: PlayerId,
        grade: PickaxeGrade,
    },
    ExpeditionStarted {
        round: u8,
        cards: usize,
        explorers: usize,
    },
    ChoiceWindowOpened {
        card_index: usize,
        players: Vec<PlayerId>,
    },
    ChoiceSubmitted {
        player: PlayerId,
        card_index: usize,
    },
    ChoicesRevealed {
        card_index: usize,
        choices: Vec<(PlayerId, Choice)>,
    },
    CardRevealed {
        card_index: usize,
        damage: u8,
        gems: Option<u32>,
    },
    DiceRolled {
        player: PlayerId,
        first: u8,
        second: u8,
    },
    DamageEvaded {
        player: PlayerId,
        damage: u8,
    },
    DamageTaken {
        player: PlayerId,
        amount: u8,
        health: u8,
    },
    PlayerDied {
        player: PlayerId,
        mine_gems: u32,
    },
    GemsRedistributed {
        from: PlayerId,
        to: Vec<PlayerId>,
        each: u32,
        discarded: u32,
    },
    PlayerRetreated {
        player: PlayerId,
        banked: u32,
        camp_gems: u32,
    },
    GemsAwarded {
        player: PlayerId,
        grade: PickaxeGrade,
        gems: u32,
        mine_gems: u32,
    },
    PickaxeConsumed {
        player: PlayerId,
        grade: PickaxeGrade,
    },
    ExpeditionAdvanced {
        card_index: usize,
        explorers: usize,
    },
    GemsBanked {
        player: PlayerId,
        gems: u32,
        camp_gems: u32,
    },
    RoundEnded {
        round: u8,
    },
    GameFinished {
        standings: Vec<Standing>,
    },
}

/// Closed set of audio cues. The audio collaborator maps these to sounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Cue {
    Click,
    Purchase,
    Reveal,
    Footsteps,
    Damage,
    Evade,
    Death,
    GemGained,
    Retreat,
    Strike(PickaxeGrade),
}

impl Event {
    /// Cues for this event, in play order. A dig always strikes with its
    /// grade and chimes on top when it pays.
    pub fn cues(&self) -> Vec<Cue> {
        if let Event::GemsAwarded { gems, grade, .. } = self {
            let mut cues = vec![Cue::Strike(*grade)];
            if *gems > 0 {
                cues.push(Cue::GemGained);
            }
            return cues;
        }
        self.cue().into_iter().collect()
    }

    fn cue(&self) -> Option<Cue> {
        match self {
            Event::GameStarted { .. } | Event::CardRevealed { .. } => Some(Cue::Reveal),
            Event::PickaxeBought { .. } => Some(Cue::Purchase),
            Event::PurchaseRejected { .. } => Some(Cue::Click),
            Event::ExpeditionStarted { .. } | Event::ExpeditionAdvanced { .. } => {
                Some(Cue::Footsteps)
            }
            Event::DamageEvaded { .. } => Some(Cue::Evade),
            Event::DamageTaken { .. } => Some(Cue::Damage),
            Event::PlayerDied { .. } => Some(Cue::Death),
            Event::PlayerRetreated { .. } => Some(Cue::Retreat),
            _ => None,
        }
    }
}

/// Fire-and-forget audio collaborator.
pub trait AudioSink {
    fn play(&mut self, cue: Cue);
}

pub fn dispatch_cues<'a, I>(events: I, sink: &mut dyn AudioSink)
where
    I: IntoIterator<Item = &'a Event>,
{
    for cue in events.into_iter().flat_map(Event::cues) {
        sink.play(cue);
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn pending(&self) -> &[Event] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<Cue>);

    impl AudioSink for Recorder {
        fn play(&mut self, cue: Cue) {
            self.0.push(cue);
        }
    }

    #[test]
    fn cues_follow_event_order_and_skip_silent_events() {
        let events = vec![
            Event::RoundStarted {
                round: 1,
                max_rounds: 3,
            },
            Event::CardRevealed {
                card_index: 0,
                damage: 1,
                gems: Some(0),
            },
            Event::GemsAwarded {
                player: PlayerId(1),
                grade: PickaxeGrade::Silver,
                gems: 0,
                mine_gems: 0,
            },
            Event::GemsAwarded {
                player: PlayerId(3),
                grade: PickaxeGrade::Gold,
                gems: 12,
                mine_gems: 12,
            },
            Event::PlayerDied {
                player: PlayerId(2),
                mine_gems: 4,
            },
        ];
        let mut recorder = Recorder::default();
        dispatch_cues(&events, &mut recorder);
        assert_eq!(
            recorder.0,
            vec![
                Cue::Reveal,
                Cue::Strike(PickaxeGrade::Silver),
                Cue::Strike(PickaxeGrade::Gold),
                Cue::GemGained,
                Cue::Death
            ]
        );
    }

    #[test]
    fn drain_empties_the_queue() {
        let mut bus = EventBus::default();
        bus.push(Event::RoundEnded { round: 1 });
        assert_eq!(bus.len(), 1);
        assert_eq!(bus.drain().count(), 1);
        assert!(bus.is_empty());
    }
}
