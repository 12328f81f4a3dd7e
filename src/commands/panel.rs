use std::time::Duration;

use poise::serenity_prelude::{
    self as serenity, ComponentInteraction, ComponentInteractionCollector,
    ComponentInteractionDataKind, CreateActionRow, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseMessage, ModalInteraction, ModalInteractionCollector, UserId,
};

use crate::utils::{component_id, parse_component_id};

/// An interaction aimed at one ephemeral panel (composer or feed).
pub enum PanelEvent {
    Press(ComponentInteraction),
    Modal(ModalInteraction),
}

impl PanelEvent {
    pub fn custom_id(&self) -> &str {
        match self {
            PanelEvent::Press(press) => &press.data.custom_id,
            PanelEvent::Modal(modal) => &modal.data.custom_id,
        }
    }

    /// The action part of the custom ID, without the session prefix.
    pub fn action(&self) -> &str {
        parse_component_id(self.custom_id()).map_or("", |(_, action)| action)
    }
}

/// Waits for the next button press, select or modal submit belonging to `session`.
/// Returns `None` once the panel has been idle for `timeout`.
pub async fn next_event(
    ctx: &serenity::Context,
    session: u64,
    author: UserId,
    timeout: Duration,
) -> Option<PanelEvent> {
    let press_prefix = component_id(session, "");
    let modal_prefix = press_prefix.clone();

    let presses = ComponentInteractionCollector::new(ctx)
        .author_id(author)
        .filter(move |press| press.data.custom_id.starts_with(&press_prefix))
        .timeout(timeout);
    let modals = ModalInteractionCollector::new(ctx)
        .author_id(author)
        .filter(move |modal| modal.data.custom_id.starts_with(&modal_prefix))
        .timeout(timeout);

    tokio::select! {
        press = presses.into_future() => press.map(PanelEvent::Press),
        modal = modals.into_future() => modal.map(PanelEvent::Modal),
    }
}

/// First value of a string select menu.
pub fn selected_value(press: &ComponentInteraction) -> Option<&str> {
    match &press.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => {
            values.first().map(String::as_str)
        }
        _ => None,
    }
}

/// Replaces the panel message in place.
pub fn update_message(
    content: Option<String>,
    embeds: Vec<CreateEmbed>,
    components: Vec<CreateActionRow>,
) -> CreateInteractionResponse {
    CreateInteractionResponse::UpdateMessage(
        CreateInteractionResponseMessage::new()
            .content(content.unwrap_or_default())
            .embeds(embeds)
            .components(components),
    )
}
