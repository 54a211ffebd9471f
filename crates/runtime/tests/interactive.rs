mod common;

use std::sync::Arc;

use battle_core::{ActionIntent, AlliedResolver, BattleStatus, Side, SquadId};
use battle_runtime::{
    ActionEvent, BattleAction, BattleContext, Event, InteractiveController, SkipController, Topic,
};
use common::{config, content, drain};

/// A human cancelling their first choice is asked again for the same squad,
/// and the second, completed choice wins the battle.
#[tokio::test]
async fn cancelled_human_action_is_requested_again() {
    let hero = SquadId(1);
    let dummies = SquadId(2);
    let (controller, mut handle) = InteractiveController::channel(4);
    let mut ctx = BattleContext::builder()
        .config(config(4))
        .content(content())
        .squad("marksmen", Side::Hero, 1)
        .squad("dummies", Side::Enemy, 2)
        .friendly_controller(controller)
        .hostile_controller(SkipController)
        .build()
        .expect("battle should build");
    let mut actions = ctx.subscribe(Topic::Action);

    let player = async move {
        let mut prompted = Vec::new();

        let first = handle.next_prompt().await.expect("first prompt");
        prompted.push(first.actor);
        let (action, picker) = BattleAction::pending(first.actor, ActionIntent::Attack);
        assert!(first.respond(action));
        picker.cancel();

        let second = handle.next_prompt().await.expect("second prompt");
        prompted.push(second.actor);
        let (action, picker) = BattleAction::pending(second.actor, ActionIntent::Attack);
        assert!(second.respond(action));
        picker.pick(dummies);

        prompted
    };
    let (result, prompted) = tokio::join!(ctx.run(), player);

    assert_eq!(prompted, vec![hero, hero]);
    assert_eq!(result.status, BattleStatus::Victory);
    assert_eq!(result.rounds, 1);

    let events = drain(&mut actions);
    let attached = events
        .iter()
        .filter(|e| matches!(e, Event::Action(ActionEvent::Attached { actor, .. }) if *actor == hero))
        .count();
    assert_eq!(attached, 2);
    assert!(events.contains(&Event::Action(ActionEvent::Cancelled { actor: hero })));
}

/// Picking a target the attached action marked invalid fails the action and
/// skips the turn instead of aborting the battle.
#[tokio::test]
async fn picking_an_invalid_target_skips_the_turn() {
    let hero = SquadId(1);
    let (controller, mut handle) = InteractiveController::channel(4);
    let mut ctx = BattleContext::builder()
        .config(config(4).with_max_rounds(1))
        .content(content())
        .squad("marksmen", Side::Hero, 1)
        .squad("dummies", Side::Enemy, 2)
        .friendly_controller(controller)
        .hostile_controller(SkipController)
        .build()
        .expect("battle should build");
    let mut actions = ctx.subscribe(Topic::Action);

    let player = async move {
        let prompt = handle.next_prompt().await.expect("prompt");
        let (action, picker) = BattleAction::pending(prompt.actor, ActionIntent::Attack);
        prompt.respond(action);
        picker.pick(hero);
    };
    let (result, ()) = tokio::join!(ctx.run(), player);

    assert_eq!(result.status, BattleStatus::Defeat);
    assert!(drain(&mut actions).iter().any(|e| matches!(
        e,
        Event::Action(ActionEvent::Failed { actor, .. }) if *actor == hero
    )));
    assert_eq!(ctx.state().squad(hero).map(|s| s.count()), Some(1));
}

/// An action carrying its own resolver is validated and executed against
/// that resolver, not the default opposing rule.
#[tokio::test]
async fn attached_resolver_overrides_the_default_targeting() {
    let hero = SquadId(1);
    let ally = SquadId(2);
    let (controller, mut handle) = InteractiveController::channel(4);
    let mut ctx = BattleContext::builder()
        .config(config(6).with_max_rounds(1))
        .content(content())
        .squad("marksmen", Side::Hero, 1)
        .squad("dummies", Side::Ally, 2)
        .squad("ogres", Side::Enemy, 1)
        .friendly_controller(controller)
        .hostile_controller(SkipController)
        .build()
        .expect("battle should build");
    let mut actions = ctx.subscribe(Topic::Action);

    let player = async move {
        let prompt = handle.next_prompt().await.expect("prompt");
        let action = BattleAction::attack(prompt.actor, ally).with_resolver(Arc::new(AlliedResolver));
        assert!(prompt.respond(action));
    };
    tokio::join!(ctx.run(), player);

    let events = drain(&mut actions);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Action(ActionEvent::Resolved { actor, .. }) if *actor == hero
    )));
    assert!(!events.iter().any(|e| matches!(e, Event::Action(ActionEvent::Failed { .. }))));
    assert!(ctx.state().is_fallen(ally));
}
