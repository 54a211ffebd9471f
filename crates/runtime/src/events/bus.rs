//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{ActionEvent, BattleEvent, GridEvent, TurnEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Rounds, queue and active unit
    Turn,
    /// Action lifecycle, damage and effects
    Action,
    /// Highlights and slot occupancy
    Grid,
    /// Start, flee and result
    Battle,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Turn(TurnEvent),
    Action(ActionEvent),
    Grid(GridEvent),
    Battle(BattleEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Turn(_) => Topic::Turn,
            Event::Action(_) => Topic::Action,
            Event::Grid(_) => Topic::Grid,
            Event::Battle(_) => Topic::Battle,
        }
    }
}

impl From<TurnEvent> for Event {
    fn from(event: TurnEvent) -> Self {
        Event::Turn(event)
    }
}

impl From<ActionEvent> for Event {
    fn from(event: ActionEvent) -> Self {
        Event::Action(event)
    }
}

impl From<GridEvent> for Event {
    fn from(event: GridEvent) -> Self {
        Event::Grid(event)
    }
}

impl From<BattleEvent> for Event {
    fn from(event: BattleEvent) -> Self {
        Event::Battle(event)
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks; events published while a
/// topic has no subscriber are dropped.
#[derive(Clone)]
pub struct EventBus {
    turn: broadcast::Sender<Event>,
    action: broadcast::Sender<Event>,
    grid: broadcast::Sender<Event>,
    battle: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turn: broadcast::channel(capacity).0,
            action: broadcast::channel(capacity).0,
            grid: broadcast::channel(capacity).0,
            battle: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Turn => &self.turn,
            Topic::Action => &self.action,
            Topic::Grid => &self.grid,
            Topic::Battle => &self.battle,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::SquadId;

    #[test]
    fn subscribers_only_see_their_topic() {
        let bus = EventBus::new();
        let mut turns = bus.subscribe(Topic::Turn);
        let mut grid = bus.subscribe(Topic::Grid);

        bus.publish(TurnEvent::RoundStarted { round: 1 });
        bus.publish(GridEvent::HighlightsReset);

        assert_eq!(
            turns.try_recv().unwrap(),
            Event::Turn(TurnEvent::RoundStarted { round: 1 })
        );
        assert!(turns.try_recv().is_err());
        assert_eq!(grid.try_recv().unwrap(), Event::Grid(GridEvent::HighlightsReset));
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::with_capacity(0);
        bus.publish(ActionEvent::Cancelled { actor: SquadId(1) });
    }
}
