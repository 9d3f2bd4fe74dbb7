//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn context_with(n: usize) -> ConvContext {
    let objectives = ObjectiveList::new((0..n).map(|i| format!("step {i}")).collect()).unwrap();
    let script = Script::new("Reach the goal", objectives).unwrap();
    ConvContext::new("prop-session", Arc::new(script))
}

fn reply_json(flag: Flag) -> String {
    serde_json::json!({ "res": "ok", "flag": flag.as_str() }).to_string()
}

/// Run one scripted turn, applying log effects the way the runtime does
fn run_turn(
    state: &ConvState,
    ctx: &ConvContext,
    log: &mut ConversationLog,
    user_text: &str,
    completion: Event,
) -> (ConvState, TurnResult) {
    let mut current = state.clone();
    let mut pending = vec![Event::UserMessage {
        text: user_text.to_string(),
        mode: TurnMode::Scripted,
    }];
    let mut outcome = None;

    while let Some(event) = pending.pop() {
        let result = transition(&current, ctx, event).unwrap();
        current = result.new_state;
        for effect in result.effects {
            match effect {
                Effect::AppendUtterance { speaker, text } => log.append(speaker, text),
                Effect::RequestCompletion { .. } => pending.push(completion.clone()),
                Effect::Respond(r) => outcome = Some(r),
            }
        }
    }

    (current, outcome.expect("turn produced no result"))
}

fn advanced(ctx: &ConvContext, steps: usize) -> ObjectiveCursor {
    (0..steps).fold(ObjectiveCursor::start(), |c, _| {
        c.advance(Flag::Shift, ctx.objectives())
    })
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_flag() -> impl Strategy<Value = Flag> {
    prop_oneof![Just(Flag::Continue), Just(Flag::Shift), Just(Flag::Conclude)]
}

fn arb_completion() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => arb_flag().prop_map(|f| Event::CompletionReceived { raw: reply_json(f) }),
        1 => "[a-zA-Z{}\": ]{0,40}".prop_map(|raw| Event::CompletionReceived { raw }),
        1 => "[a-z ]{1,20}".prop_map(|message| Event::CompletionFailed { message }),
    ]
}

/// Strings that can never decode into a `{ res, flag }` object
fn arb_malformed() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ,.!?]{0,60}",
        "\\{ \"res\": \"[a-z ]{0,20}\" \\}",
        "\\{ \"res\": \"[a-z]{1,10}\", \"flag\": \"(pause|stop|next|CONTINUE)\" \\}",
        "\\{ 'res': '[a-z]{1,10}', 'flag': 'shift' \\}",
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn shift_advances_exactly_one_and_never_overflows(n in 1usize..12, shifts in 0usize..20) {
        let ctx = context_with(n);
        let mut log = ConversationLog::new();
        let mut state = ConvState::default();

        for _ in 0..shifts {
            let before = state.cursor.position();
            let (next, _) = run_turn(
                &state,
                &ctx,
                &mut log,
                "hi",
                Event::CompletionReceived { raw: reply_json(Flag::Shift) },
            );
            let expected = if before < n { before + 1 } else { n };
            prop_assert_eq!(next.cursor.position(), expected);
            prop_assert!(next.cursor.position() <= n);
            state = next;
        }
    }

    #[test]
    fn conclude_always_reaches_terminal(n in 1usize..12, offset in 0usize..12) {
        let ctx = context_with(n);
        let start = offset % n;
        let mut log = ConversationLog::new();

        let (next, result) = run_turn(
            &ConvState::idle(advanced(&ctx, start)),
            &ctx,
            &mut log,
            "bye",
            Event::CompletionReceived { raw: reply_json(Flag::Conclude) },
        );
        prop_assert_eq!(next.cursor.position(), n);
        prop_assert_eq!(result.flag(), Some(Flag::Conclude));
    }

    #[test]
    fn cursor_is_monotonic_and_bounded(
        n in 1usize..8,
        completions in proptest::collection::vec(arb_completion(), 1..30),
    ) {
        let ctx = context_with(n);
        let mut log = ConversationLog::new();
        let mut state = ConvState::default();

        for completion in completions {
            let (next, _) = run_turn(&state, &ctx, &mut log, "msg", completion);
            prop_assert!(next.cursor >= state.cursor);
            prop_assert!(next.cursor.position() <= n);
            prop_assert_eq!(&next.phase, &Phase::Idle);
            state = next;
        }
    }

    #[test]
    fn terminal_turns_are_idempotent(n in 1usize..8, texts in proptest::collection::vec("[a-z ]{0,20}", 1..10)) {
        let ctx = context_with(n);
        let terminal = ConvState::idle(advanced(&ctx, n));

        for text in texts {
            let result = transition(
                &terminal,
                &ctx,
                Event::UserMessage { text, mode: TurnMode::Scripted },
            ).unwrap();
            prop_assert_eq!(&result.new_state, &terminal);
            prop_assert_eq!(result.effects, vec![Effect::Respond(TurnResult::terminal())]);
        }
    }

    #[test]
    fn decode_failure_keeps_only_user_line(n in 1usize..8, steps in 0usize..8, raw in arb_malformed()) {
        let ctx = context_with(n);
        let cursor = advanced(&ctx, steps % n);
        let mut log = ConversationLog::new();

        let (next, result) = run_turn(
            &ConvState::idle(cursor),
            &ctx,
            &mut log,
            "question",
            Event::CompletionReceived { raw: raw.clone() },
        );

        prop_assert_eq!(next, ConvState::idle(cursor));
        prop_assert_eq!(result, TurnResult::decode_failed(raw));
        prop_assert_eq!(log.len(), 1);
        prop_assert_eq!(log.utterances()[0].speaker, Speaker::User);
        prop_assert_eq!(&log.utterances()[0].text, "question");
    }

    #[test]
    fn user_line_precedes_agent_line_each_turn(
        n in 1usize..6,
        completions in proptest::collection::vec(arb_completion(), 1..20),
    ) {
        let ctx = context_with(n);
        let mut log = ConversationLog::new();
        let mut state = ConvState::default();

        for (i, completion) in completions.into_iter().enumerate() {
            let before = log.len();
            let text = format!("user turn {i}");
            let was_terminal = state.cursor.is_complete(ctx.objectives());
            let (next, result) = run_turn(&state, &ctx, &mut log, &text, completion);
            let added = &log.utterances()[before..];

            if was_terminal {
                prop_assert!(added.is_empty());
            } else {
                prop_assert_eq!(added[0].speaker, Speaker::User);
                prop_assert_eq!(&added[0].text, &text);
                match result {
                    TurnResult::DecodeFailed { .. } => prop_assert_eq!(added.len(), 1),
                    _ => {
                        prop_assert_eq!(added.len(), 2);
                        prop_assert_eq!(added[1].speaker, Speaker::Agent);
                    }
                }
            }
            state = next;
        }
    }
}
