//! Menu Dispatcher
//!
//! Pure decision logic: given a normalized inbound text and the user's
//! session, produce the reply (and, on human handoff, an operator alert) and
//! mutate the session in place. The original fallthrough `if`/`return` chain
//! is expressed as an explicit ordered rule list so first-match-wins is a
//! stated property rather than incidental code order.

use crate::catalog::Category;
use crate::session::{Mode, Session, Step};

#[cfg(test)]
mod tests;

/// Chat reserved for status updates; messages addressed to it are ignored.
pub const STATUS_BROADCAST: &str = "status@broadcast";

const MSG_REACTIVATED: &str = "🤖 Reactivado.";
const MSG_MENU_BODY: &str = "1️⃣ Excursiones\n2️⃣ Ubicación\n3️⃣ Tips\n4️⃣ Asesor";
const MSG_INVALID_OPTION: &str = "⚠️ Opción inválida. Usa números o \"0\".";
const MSG_LOCATION: &str = "📍 Av. San Martín 123, Mendoza.";
const MSG_TIPS: &str = "🎒 Tips: Agua, gorra y abrigo.";
const MSG_HANDOFF: &str = "👨‍💻 Asesor notificado.";

/// Exact-match navigation resets.
const NAV_KEYWORDS: [&str; 4] = ["volver", "menu", "inicio", "0"];
/// Substring greetings answered with the welcome menu.
const GREETING_KEYWORDS: [&str; 4] = ["hola", "buenas", "turibot", "menu"];

/// Trim and lowercase inbound text. Every rule sees this form only.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// What one dispatch pass decided: at most one reply to the user and at most
/// one alert to the operator. Both `None` means the message was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub reply: Option<String>,
    pub operator_alert: Option<String>,
}

impl Outcome {
    fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            operator_alert: None,
        }
    }

    fn silent() -> Self {
        Self {
            reply: None,
            operator_alert: None,
        }
    }
}

struct RuleInput<'a> {
    user: &'a str,
    text: &'a str,
}

type Rule = fn(&Dispatcher, &RuleInput<'_>, &mut Session) -> Option<Outcome>;

/// Evaluation order is the contract: the first rule returning `Some` wins.
/// `ping` sits before the human gate, so a handed-off user still gets pong;
/// `nav-reset` sits before `category-select`, so `0` always navigates.
const RULES: &[(&str, Rule)] = &[
    ("ping", Dispatcher::rule_ping),
    ("bot-on", Dispatcher::rule_bot_on),
    ("human-gate", Dispatcher::rule_human_gate),
    ("nav-reset", Dispatcher::rule_nav_reset),
    ("category-select", Dispatcher::rule_category_select),
    ("main-menu", Dispatcher::rule_main_menu),
];

pub struct Dispatcher {
    catalog: Vec<Category>,
    web_url: String,
}

impl Dispatcher {
    pub fn new(catalog: Vec<Category>, web_url: String) -> Self {
        Self { catalog, web_url }
    }

    /// Run the rule list over one normalized inbound text. The session has
    /// already been refreshed by the host; rules mutate it further.
    pub fn dispatch(&self, user: &str, text: &str, session: &mut Session) -> Outcome {
        let input = RuleInput { user, text };
        for (name, rule) in RULES {
            if let Some(outcome) = rule(self, &input, session) {
                tracing::debug!("Dispatch: rule '{}' matched", name);
                return outcome;
            }
        }
        Outcome::silent()
    }

    fn rule_ping(&self, input: &RuleInput<'_>, _session: &mut Session) -> Option<Outcome> {
        if input.text != "!ping" {
            return None;
        }
        Some(Outcome::reply(format!("🏓 Pong! RAM: {:.2} MB", rss_mb())))
    }

    fn rule_bot_on(&self, input: &RuleInput<'_>, session: &mut Session) -> Option<Outcome> {
        if input.text != "bot on" {
            return None;
        }
        session.mode = Mode::Bot;
        session.step = Step::MainMenu;
        Some(Outcome::reply(MSG_REACTIVATED))
    }

    fn rule_human_gate(&self, _input: &RuleInput<'_>, session: &mut Session) -> Option<Outcome> {
        if session.mode != Mode::Human {
            return None;
        }
        // handed off to a person: the bot stays out of the conversation
        Some(Outcome::silent())
    }

    fn rule_nav_reset(&self, input: &RuleInput<'_>, session: &mut Session) -> Option<Outcome> {
        if !NAV_KEYWORDS.contains(&input.text) {
            return None;
        }
        session.step = Step::MainMenu;
        Some(Outcome::reply(format!(
            "🔙 *Menú Principal*\n\n{MSG_MENU_BODY}"
        )))
    }

    fn rule_category_select(&self, input: &RuleInput<'_>, session: &mut Session) -> Option<Outcome> {
        if session.step != Step::SelectCategory {
            return None;
        }
        // 1-based index; non-numeric and out-of-range fail identically
        let outcome = match input.text.parse::<usize>() {
            Ok(n) if (1..=self.catalog.len()).contains(&n) => {
                let cat = &self.catalog[n - 1];
                Outcome::reply(format!(
                    "✅ *{}*\n📝 {}\n🔗 {}/?category={}\n\n_0 para volver._",
                    cat.label, cat.description, self.web_url, cat.id
                ))
            }
            _ => Outcome::reply(MSG_INVALID_OPTION),
        };
        Some(outcome)
    }

    fn rule_main_menu(&self, input: &RuleInput<'_>, session: &mut Session) -> Option<Outcome> {
        if session.step != Step::MainMenu {
            return None;
        }

        if GREETING_KEYWORDS.iter().any(|w| input.text.contains(w)) {
            return Some(Outcome::reply(format!(
                "👋 ¡Hola! *Wanderlust Turismo*.\n\n{MSG_MENU_BODY}"
            )));
        }

        if input.text == "1" || input.text.contains("excursiones") {
            session.step = Step::SelectCategory;
            return Some(Outcome::reply(self.category_list()));
        }

        if input.text == "2" {
            return Some(Outcome::reply(MSG_LOCATION));
        }

        if input.text == "3" {
            return Some(Outcome::reply(MSG_TIPS));
        }

        if input.text == "4" {
            session.mode = Mode::Human;
            return Some(Outcome {
                reply: Some(MSG_HANDOFF.to_string()),
                operator_alert: Some(format!(
                    "🔔 Alerta: https://wa.me/{}",
                    phone_of(input.user)
                )),
            });
        }

        Some(Outcome::silent())
    }

    fn category_list(&self) -> String {
        let mut menu = String::from("🏔️ *Categorías:*\n");
        for (i, cat) in self.catalog.iter().enumerate() {
            menu.push_str(&format!("{}. {}\n", i + 1, cat.label));
        }
        menu.push_str("\nEnvía número o *0*.");
        menu
    }
}

/// Phone portion of a JID like `5492615997309@s.whatsapp.net`.
pub(crate) fn phone_of(user: &str) -> &str {
    user.split('@').next().unwrap_or(user)
}

/// Resident set size in MB, for the `!ping` diagnostic.
///
/// Safety: `getrusage(RUSAGE_SELF, ..)` only writes the pointed-to struct and
/// accepts any writable `rusage`; the zeroed buffer is read back only after
/// the return code confirms it was filled in.
#[cfg(unix)]
fn rss_mb() -> f64 {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return 0.0;
    }
    let usage = unsafe { usage.assume_init() };
    // ru_maxrss is KB on Linux, bytes on macOS
    if cfg!(target_os = "macos") {
        usage.ru_maxrss as f64 / 1024.0 / 1024.0
    } else {
        usage.ru_maxrss as f64 / 1024.0
    }
}

#[cfg(not(unix))]
fn rss_mb() -> f64 {
    0.0
}
