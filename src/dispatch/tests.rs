use super::*;
use crate::catalog::DEFAULT_CATALOG;
use rstest::rstest;
use std::time::Instant;

const USER: &str = "5492615997309@s.whatsapp.net";

fn dispatcher() -> Dispatcher {
    Dispatcher::new(
        DEFAULT_CATALOG.clone(),
        "https://wanderlust.turisuite.com".to_string(),
    )
}

fn session(mode: Mode, step: Step) -> Session {
    Session {
        mode,
        step,
        last_seen: Instant::now(),
    }
}

fn dispatch(text: &str, session: &mut Session) -> Outcome {
    dispatcher().dispatch(USER, &normalize(text), session)
}

#[rstest]
#[case("  HOLA  ", "hola")]
#[case("Bot ON", "bot on")]
#[case("\t!PING\n", "!ping")]
fn normalize_trims_and_lowercases(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(normalize(raw), expected);
}

#[test]
fn ping_replies_without_touching_state() {
    let mut s = session(Mode::Bot, Step::SelectCategory);
    let out = dispatch("!ping", &mut s);
    assert!(out.reply.unwrap().starts_with("🏓 Pong!"));
    assert_eq!(s.step, Step::SelectCategory);
    assert_eq!(s.mode, Mode::Bot);
}

#[test]
fn ping_is_answered_even_in_human_mode() {
    // ping sits before the human gate in the rule order
    let mut s = session(Mode::Human, Step::MainMenu);
    let out = dispatch("!ping", &mut s);
    assert!(out.reply.is_some());
    assert_eq!(s.mode, Mode::Human);
}

#[test]
fn bot_on_resets_from_human_mode() {
    let mut s = session(Mode::Human, Step::SelectCategory);
    let out = dispatch("bot on", &mut s);
    assert_eq!(out.reply.as_deref(), Some(MSG_REACTIVATED));
    assert_eq!(s.mode, Mode::Bot);
    assert_eq!(s.step, Step::MainMenu);
}

#[rstest]
#[case("hola")]
#[case("1")]
#[case("4")]
#[case("menu")]
#[case("volver")]
fn human_mode_swallows_everything_else(#[case] text: &str) {
    let mut s = session(Mode::Human, Step::MainMenu);
    let out = dispatch(text, &mut s);
    assert_eq!(out, Outcome::silent());
    assert_eq!(s.mode, Mode::Human);
}

#[rstest]
#[case("volver", Step::MainMenu)]
#[case("menu", Step::SelectCategory)]
#[case("inicio", Step::SelectCategory)]
#[case("0", Step::SelectCategory)]
fn nav_keywords_reset_to_main_menu(#[case] text: &str, #[case] from: Step) {
    let mut s = session(Mode::Bot, from);
    let out = dispatch(text, &mut s);
    assert!(out.reply.unwrap().contains("Menú Principal"));
    assert_eq!(s.step, Step::MainMenu);
}

#[test]
fn repeated_zero_is_idempotent() {
    let mut s = session(Mode::Bot, Step::SelectCategory);
    let first = dispatch("0", &mut s);
    let second = dispatch("0", &mut s);
    let third = dispatch("0", &mut s);
    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(s.step, Step::MainMenu);
}

#[test]
fn valid_category_index_returns_detail() {
    let mut s = session(Mode::Bot, Step::SelectCategory);
    let out = dispatch("2", &mut s);
    let reply = out.reply.unwrap();
    assert!(reply.contains(&DEFAULT_CATALOG[1].label));
    assert!(reply.contains(&DEFAULT_CATALOG[1].description));
    assert!(reply.contains("https://wanderlust.turisuite.com/?category=potrerillos"));
    // selection does not leave the category step
    assert_eq!(s.step, Step::SelectCategory);
}

#[rstest]
#[case("9")]
#[case("abc")]
#[case("-1")]
#[case("2.5")]
#[case("2abc")]
fn bad_category_input_gets_one_invalid_message(#[case] text: &str) {
    let mut s = session(Mode::Bot, Step::SelectCategory);
    let out = dispatch(text, &mut s);
    assert_eq!(out.reply.as_deref(), Some(MSG_INVALID_OPTION));
    assert_eq!(s.step, Step::SelectCategory);
}

#[rstest]
#[case("hola")]
#[case("buenas tardes")]
#[case("que tal turibot")]
fn greetings_get_the_welcome_menu(#[case] text: &str) {
    let mut s = session(Mode::Bot, Step::MainMenu);
    let out = dispatch(text, &mut s);
    assert!(out.reply.unwrap().contains("Wanderlust Turismo"));
    assert_eq!(s.step, Step::MainMenu);
}

#[rstest]
#[case("1")]
#[case("quiero excursiones")]
fn option_one_lists_every_category(#[case] text: &str) {
    let mut s = session(Mode::Bot, Step::MainMenu);
    let out = dispatch(text, &mut s);
    assert_eq!(s.step, Step::SelectCategory);

    let reply = out.reply.unwrap();
    let numbered = reply
        .lines()
        .filter(|l| l.starts_with(|c: char| c.is_ascii_digit()))
        .count();
    assert_eq!(numbered, DEFAULT_CATALOG.len());
}

#[test]
fn options_two_and_three_are_fixed_texts() {
    let mut s = session(Mode::Bot, Step::MainMenu);
    assert_eq!(dispatch("2", &mut s).reply.as_deref(), Some(MSG_LOCATION));
    assert_eq!(dispatch("3", &mut s).reply.as_deref(), Some(MSG_TIPS));
    assert_eq!(s.step, Step::MainMenu);
}

#[test]
fn option_four_hands_off_and_alerts_the_operator() {
    let mut s = session(Mode::Bot, Step::MainMenu);
    let out = dispatch("4", &mut s);
    assert_eq!(out.reply.as_deref(), Some(MSG_HANDOFF));
    assert_eq!(
        out.operator_alert.as_deref(),
        Some("🔔 Alerta: https://wa.me/5492615997309")
    );
    assert_eq!(s.mode, Mode::Human);
}

#[test]
fn unrecognized_main_menu_input_is_silent() {
    let mut s = session(Mode::Bot, Step::MainMenu);
    let out = dispatch("asdfgh", &mut s);
    assert_eq!(out, Outcome::silent());
    assert_eq!(s.step, Step::MainMenu);
    assert_eq!(s.mode, Mode::Bot);
}

#[test]
fn phone_of_strips_the_server_part() {
    assert_eq!(phone_of(USER), "5492615997309");
    assert_eq!(phone_of("no-at-sign"), "no-at-sign");
}
