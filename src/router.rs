//! Conversation router module
//!
//! Dispatches inbound events (commands, text, photos, button presses) to
//! the per-user voting session and produces transport-free outbound
//! effects. The transport layer under `bot/` translates Telegram updates
//! into [`InboundEvent`]s and interprets the returned effects.

use tracing::{debug, error, info, warn};

use crate::config::{FallbackMode, RouterConfig};
use crate::localization::{t_args_lang, t_lang};
use crate::phone::{self, PhoneError};
use crate::session::{SessionStore, VotingStage};

/// A single inline keyboard button, free of transport types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonSpec {
    /// Button that fires a callback payload back at the bot
    Callback { label: String, data: String },
    /// Button that opens an external link
    Link { label: String, url: String },
}

/// Inline keyboard rows
pub type ButtonRows = Vec<Vec<ButtonSpec>>;

/// What kind of update arrived from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Command { name: String, args: Vec<String> },
    Text { text: String },
    Photo,
    ButtonPress { data: String },
}

/// An inbound event, tagged with the identity the transport resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub user_id: i64,
    pub display_name: String,
    pub username: Option<String>,
    pub language_code: Option<String>,
    pub kind: EventKind,
}

/// Outbound effects produced by the router and interpreted by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEffect {
    SendText {
        user_id: i64,
        text: String,
        buttons: Option<ButtonRows>,
    },
    SendPhoto {
        user_id: i64,
        photo_ref: String,
        caption: String,
    },
    /// Replace the text of the message the user interacted with
    EditMessage { text: String },
    /// Notify the fixed admin destination
    NotifyAdmin { text: String },
}

/// Routes inbound events through the session store and emits effects
pub struct ConversationRouter {
    config: RouterConfig,
    sessions: SessionStore,
}

impl ConversationRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            sessions: SessionStore::new(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one inbound event. Infallible: every user-visible failure is
    /// expressed as an effect, and delivery problems are the transport's
    /// concern.
    pub fn handle_event(&self, event: InboundEvent) -> Vec<OutboundEffect> {
        match event.kind.clone() {
            EventKind::Command { name, args } => self.handle_command(&event, &name, &args),
            EventKind::Text { text } => self.handle_text(&event, &text),
            EventKind::Photo => self.handle_photo(&event),
            EventKind::ButtonPress { data } => self.handle_button(&event, &data),
        }
    }

    fn handle_command(
        &self,
        event: &InboundEvent,
        name: &str,
        args: &[String],
    ) -> Vec<OutboundEffect> {
        let lang = event.language_code.as_deref();
        debug!(user_id = event.user_id, command = name, "Handling command");

        match name {
            "start" => {
                // A start parameter with the campaign prefix is a voting
                // redirect; anything else is a plain start.
                let tag = args
                    .first()
                    .filter(|arg| arg.starts_with(&self.config.campaign_tag_prefix));
                match tag {
                    Some(tag) => self.begin_voting(event, Some(tag.clone())),
                    None => vec![OutboundEffect::SendText {
                        user_id: event.user_id,
                        text: format!(
                            "{}\n\n{}\n\n{}",
                            t_args_lang("welcome-title", &[("name", &event.display_name)], lang),
                            t_lang("welcome-description", lang),
                            t_lang("welcome-commands", lang)
                        ),
                        buttons: Some(vec![
                            vec![ButtonSpec::Callback {
                                label: t_lang("btn-help", lang),
                                data: "help".to_string(),
                            }],
                            vec![ButtonSpec::Callback {
                                label: t_lang("btn-info", lang),
                                data: "info".to_string(),
                            }],
                            vec![ButtonSpec::Link {
                                label: t_lang("btn-github", lang),
                                url: self.config.github_url.clone(),
                            }],
                        ]),
                    }],
                }
            }
            "ovoz_berish" => self.begin_voting(event, None),
            "help" => vec![self.send_text(event, self.help_text(lang))],
            "info" => vec![self.send_text(event, self.info_text(lang))],
            "echo" => {
                let text = if args.is_empty() {
                    t_lang("echo-usage", lang)
                } else {
                    t_args_lang("echo-response", &[("text", &args.join(" "))], lang)
                };
                vec![self.send_text(event, text)]
            }
            "weather" => vec![self.send_text(event, t_lang("weather-stub", lang))],
            "translate" => {
                let text = if args.is_empty() {
                    t_lang("translate-usage", lang)
                } else {
                    t_args_lang("translate-stub", &[("text", &args.join(" "))], lang)
                };
                vec![self.send_text(event, text)]
            }
            _ => {
                debug!(user_id = event.user_id, command = name, "Ignoring unknown command");
                Vec::new()
            }
        }
    }

    /// Enter the voting flow and emit the instructions message, with the
    /// illustrative image when one is configured.
    fn begin_voting(&self, event: &InboundEvent, tag: Option<String>) -> Vec<OutboundEffect> {
        let lang = event.language_code.as_deref();
        info!(
            user_id = event.user_id,
            tag = tag.as_deref().unwrap_or(""),
            "Starting voting flow"
        );

        self.sessions
            .with_session(event.user_id, |session| session.begin(tag));

        let instructions = format!(
            "{}\n\n{}\n\n{}",
            t_lang("voting-warning", lang),
            t_lang("voting-send-phone", lang),
            t_lang("voting-phone-example", lang)
        );

        match &self.config.instructions_image {
            Some(image) => vec![OutboundEffect::SendPhoto {
                user_id: event.user_id,
                photo_ref: image.clone(),
                caption: instructions,
            }],
            None => vec![self.send_text(event, instructions)],
        }
    }

    fn handle_text(&self, event: &InboundEvent, text: &str) -> Vec<OutboundEffect> {
        let stage = self.sessions.stage_of(event.user_id);

        if stage == VotingStage::AwaitingPhone || phone::looks_like_phone(text) {
            return self.handle_phone_submission(event, text);
        }

        match self.config.fallback {
            FallbackMode::Silent => {
                debug!(user_id = event.user_id, "Dropping unrelated text");
                Vec::new()
            }
            FallbackMode::Faq => self.faq_reply(event, text),
        }
    }

    fn handle_phone_submission(&self, event: &InboundEvent, text: &str) -> Vec<OutboundEffect> {
        let lang = event.language_code.as_deref();

        let normalized = match phone::normalize(text) {
            Ok(normalized) => normalized,
            Err(PhoneError::InvalidFormat(cleaned)) => {
                debug!(
                    user_id = event.user_id,
                    cleaned = %cleaned,
                    "Rejected phone number input"
                );
                // Stage unchanged, the user can try again
                return vec![self.send_text(
                    event,
                    format!(
                        "{}\n\n{}",
                        t_lang("phone-invalid", lang),
                        t_lang("voting-phone-example", lang)
                    ),
                )];
            }
        };

        // A phone-shaped message is accepted from any stage, the way the
        // original deployments behaved; entering the flow first keeps the
        // session preconditions honest.
        let accepted = self.sessions.with_session(event.user_id, |session| {
            if session.stage() != VotingStage::AwaitingPhone {
                session.begin(None);
            }
            session.accept_phone()
        });

        let tag = match accepted {
            Ok(tag) => tag,
            Err(e) => {
                error!(user_id = event.user_id, error = %e, "Session transition failed");
                self.sessions.with_session(event.user_id, |session| session.reset());
                return vec![self.send_text(event, t_lang("error-generic", lang))];
            }
        };

        info!(
            user_id = event.user_id,
            phone = %normalized,
            tag = tag.as_deref().unwrap_or(""),
            "Phone number accepted, notifying admin"
        );

        let username = event
            .username
            .clone()
            .unwrap_or_else(|| t_lang("no-username", lang));
        let admin_text = t_args_lang(
            "admin-notification",
            &[
                ("name", &event.display_name),
                ("phone", normalized.as_str()),
                ("user_id", &event.user_id.to_string()),
                ("username", &username),
            ],
            lang,
        );

        vec![
            OutboundEffect::NotifyAdmin { text: admin_text },
            OutboundEffect::SendText {
                user_id: event.user_id,
                text: t_lang("phone-saved", lang),
                buttons: Some(vec![
                    vec![ButtonSpec::Link {
                        label: t_lang("btn-vote-telegram", lang),
                        url: self.config.vote_bot_url.clone(),
                    }],
                    vec![ButtonSpec::Link {
                        label: t_lang("btn-vote-web", lang),
                        url: self.config.vote_web_url.clone(),
                    }],
                    vec![ButtonSpec::Callback {
                        label: t_lang("btn-voted", lang),
                        data: "voted".to_string(),
                    }],
                ]),
            },
        ]
    }

    fn handle_photo(&self, event: &InboundEvent) -> Vec<OutboundEffect> {
        let lang = event.language_code.as_deref();
        let advanced = self
            .sessions
            .with_session(event.user_id, |session| session.accept_screenshot());

        if advanced {
            info!(user_id = event.user_id, "Confirmation screenshot received");
        }

        if advanced || !self.config.gate_screenshot {
            vec![self.send_text(event, t_lang("screenshot-received", lang))]
        } else {
            debug!(user_id = event.user_id, "Screenshot outside voting flow");
            vec![self.send_text(event, t_lang("screenshot-unexpected", lang))]
        }
    }

    fn handle_button(&self, event: &InboundEvent, data: &str) -> Vec<OutboundEffect> {
        let lang = event.language_code.as_deref();
        match data {
            "voted" => vec![OutboundEffect::EditMessage {
                text: t_lang("voted-ack", lang),
            }],
            "help" => vec![self.send_text(event, self.help_text(lang))],
            "info" => vec![self.send_text(event, self.info_text(lang))],
            _ => {
                warn!(
                    user_id = event.user_id,
                    data = %data,
                    "Unrecognized callback payload"
                );
                vec![OutboundEffect::EditMessage {
                    text: t_lang("unknown-action", lang),
                }]
            }
        }
    }

    fn faq_reply(&self, event: &InboundEvent, text: &str) -> Vec<OutboundEffect> {
        let lang = event.language_code.as_deref();
        let lower = text.to_lowercase();

        let contains_any =
            |words: &[&str]| words.iter().any(|word| lower.contains(word));

        let reply = if matches!(lower.as_str(), "salom" | "hello" | "hi" | "hey") {
            t_args_lang("fallback-greeting", &[("name", &event.display_name)], lang)
        } else if matches!(lower.as_str(), "qalaysiz" | "how are you") {
            t_lang("fallback-how-are-you", lang)
        } else if matches!(lower.as_str(), "rahmat" | "tashakkur" | "thanks" | "thank you") {
            t_lang("fallback-thanks", lang)
        } else if matches!(lower.as_str(), "xayr" | "bye" | "goodbye") {
            t_args_lang("fallback-bye", &[("name", &event.display_name)], lang)
        } else if text.contains('?') {
            t_lang("fallback-question", lang)
        } else if contains_any(&["ob-havo", "weather", "harorat"]) {
            t_lang("fallback-weather-hint", lang)
        } else if contains_any(&["tarjima", "translate"]) {
            t_lang("fallback-translate-hint", lang)
        } else if contains_any(&["ovoz", "vote", "saylov"]) {
            t_lang("fallback-vote-hint", lang)
        } else {
            t_args_lang("fallback-default", &[("text", text)], lang)
        };

        vec![self.send_text(event, reply)]
    }

    fn help_text(&self, lang: Option<&str>) -> String {
        format!(
            "{}\n\n{}\n\n{}",
            t_lang("help-title", lang),
            t_lang("help-commands", lang),
            t_lang("help-final", lang)
        )
    }

    fn info_text(&self, lang: Option<&str>) -> String {
        format!(
            "{}\n\n{}",
            t_lang("info-title", lang),
            t_lang("info-details", lang)
        )
    }

    fn send_text(&self, event: &InboundEvent, text: String) -> OutboundEffect {
        OutboundEffect::SendText {
            user_id: event.user_id,
            text,
            buttons: None,
        }
    }
}
