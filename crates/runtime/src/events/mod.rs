//! Topic-based event bus for battle events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. Listeners that live as long as one battle register
//! through a [`SubscriptionScope`].

mod bus;
mod scope;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use scope::SubscriptionScope;
pub use types::{ActionEvent, BattleEvent, GridEvent, SkipReason, TurnEvent};
