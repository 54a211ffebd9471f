//! The battle aggregate and its builder.
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use battle_core::{
    BattleResult, BattleRng, BattleState, ContentSource, RosterEntry, SetupError, Side, SquadId,
};
use tracing::info;

use crate::api::{ActionController, BattleAction, ControllerRegistry, Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, SkipReason, SubscriptionScope, Topic};
use crate::machine::BattlePhase;
use crate::managers::{AbilitiesManager, EffectsManager};
use crate::presentation::{NullPresentation, PresentationSink};

/// Cloneable request to end the battle by fleeing.
///
/// The machine honours it at the next turn boundary.
#[derive(Debug, Clone, Default)]
pub struct FleeSignal(Arc<AtomicBool>);

impl FleeSignal {
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything one battle owns.
///
/// The state machine in [`crate::machine`] is the only writer; other systems
/// observe through the event bus or act through controllers.
pub struct BattleContext {
    pub(crate) config: RuntimeConfig,
    pub(crate) state: BattleState,
    pub(crate) rng: BattleRng,
    pub(crate) controllers: ControllerRegistry,
    pub(crate) effects: EffectsManager,
    pub(crate) abilities: AbilitiesManager,
    pub(crate) presentation: Arc<dyn PresentationSink>,
    pub(crate) bus: EventBus,
    pub(crate) scope: SubscriptionScope,
    pub(crate) flee: FleeSignal,
    pub(crate) phase: BattlePhase,
    pub(crate) current_action: Option<BattleAction>,
    pub(crate) target_validity: BTreeMap<SquadId, bool>,
    pub(crate) pending_skip: Option<(SquadId, SkipReason)>,
    pub(crate) result: Option<BattleResult>,
}

impl BattleContext {
    pub fn builder() -> BattleContextBuilder {
        BattleContextBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe(&self, topic: Topic) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    /// Registers a listener that lives until the battle finishes.
    pub fn listen<F, Fut>(&mut self, topic: Topic, handler: F)
    where
        F: FnMut(Event) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.scope.listen(&self.bus, topic, handler);
    }

    pub fn flee_signal(&self) -> FleeSignal {
        self.flee.clone()
    }

    pub fn abilities(&self) -> &AbilitiesManager {
        &self.abilities
    }

    /// Target validity of the attached action, empty when none is attached.
    pub fn target_validity(&self) -> &BTreeMap<SquadId, bool> {
        &self.target_validity
    }

    pub fn has_attached_action(&self) -> bool {
        self.current_action.is_some()
    }

    /// The result, once the battle reached [`BattlePhase::Finished`].
    pub fn result(&self) -> Option<&BattleResult> {
        self.result.as_ref()
    }
}

/// Builder for [`BattleContext`].
///
/// `build` fails fast on anything that would otherwise surface mid-battle:
/// missing content, unknown squad keys, sides without a controller and
/// initial placement that does not fit the grid.
#[derive(Default)]
pub struct BattleContextBuilder {
    config: RuntimeConfig,
    content: Option<Arc<dyn ContentSource>>,
    roster: Vec<RosterEntry>,
    state: Option<BattleState>,
    controllers: ControllerRegistry,
    presentation: Option<Arc<dyn PresentationSink>>,
    bus: Option<EventBus>,
}

impl BattleContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn content(mut self, content: impl ContentSource + 'static) -> Self {
        self.content = Some(Arc::new(content));
        self
    }

    pub fn shared_content(mut self, content: Arc<dyn ContentSource>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn roster(mut self, roster: Vec<RosterEntry>) -> Self {
        self.roster = roster;
        self
    }

    pub fn squad(mut self, key: impl Into<String>, side: Side, count: u32) -> Self {
        self.roster.push(RosterEntry::new(key, side, count));
        self
    }

    /// Starts from an assembled state instead of a roster. Unplaced squads
    /// are still placed by `build`.
    pub fn initial_state(mut self, state: BattleState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn controller(mut self, side: Side, controller: impl ActionController + 'static) -> Self {
        self.controllers.bind(side, Arc::new(controller));
        self
    }

    /// Controller for hero and ally squads.
    pub fn friendly_controller(mut self, controller: impl ActionController + 'static) -> Self {
        self.controllers.bind_friendly(Arc::new(controller));
        self
    }

    /// Controller for enemy and neutral squads.
    pub fn hostile_controller(mut self, controller: impl ActionController + 'static) -> Self {
        self.controllers.bind_hostile(Arc::new(controller));
        self
    }

    pub fn presentation(mut self, presentation: impl PresentationSink + 'static) -> Self {
        self.presentation = Some(Arc::new(presentation));
        self
    }

    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn build(self) -> Result<BattleContext> {
        let config = self.config;
        let mut state = match self.state {
            Some(state) => state,
            None => {
                let content = self.content.ok_or(RuntimeError::MissingCollaborator {
                    name: "content source",
                })?;
                BattleState::from_roster(config.battle.clone(), &self.roster, content.as_ref())?
            }
        };

        for squad in state.roster() {
            self.controllers.get(squad.side())?;
        }

        let mut rng = BattleRng::new(config.seed);
        state
            .place_roster(&mut rng)
            .map_err(SetupError::Placement)?;

        let bus = self
            .bus
            .unwrap_or_else(|| EventBus::with_capacity(config.event_buffer_size));
        let presentation = self
            .presentation
            .unwrap_or_else(|| Arc::new(NullPresentation));

        info!(
            target: "battle::context",
            squads = state.roster().len(),
            seed = config.seed,
            columns = config.battle.columns_per_row,
            "Battle context built"
        );

        Ok(BattleContext {
            effects: EffectsManager::new(bus.clone(), Arc::clone(&presentation)),
            abilities: AbilitiesManager::new(),
            config,
            state,
            rng,
            controllers: self.controllers,
            presentation,
            bus,
            scope: SubscriptionScope::new(),
            flee: FleeSignal::default(),
            phase: BattlePhase::RoundInit,
            current_action: None,
            target_validity: BTreeMap::new(),
            pending_skip: None,
            result: None,
        })
    }
}
