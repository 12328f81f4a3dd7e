use poise::{
    CreateReply,
    serenity_prelude::{
        ButtonStyle, Color, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter,
        CreateMessage,
    },
};

use crate::{Context, Error, models::Category, utils::CONFESS_BUTTON_ID};

/// Pins a "Whisper a Secret" board in the current channel.
///
/// Its button opens the same composer as `/confess`.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_MESSAGES",
    description_localized("en-US", "Posts the Whisper board with its confession button here.")
)]
pub async fn confessembed(ctx: Context<'_>) -> Result<(), Error> {
    let board = CreateMessage::default()
        .embed(board_embed())
        .components(vec![board_buttons()]);

    ctx.channel_id().send_message(ctx.http(), board).await?;
    log::info!("Whisper board posted in channel {}", ctx.channel_id());

    ctx.send(
        CreateReply::default()
            .content("Whisper board posted. Members can now press **Whisper a Secret**.")
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

fn vibe_list() -> String {
    Category::ALL
        .into_iter()
        .map(|c| format!("{} {}", c.icon(), c))
        .collect::<Vec<_>>()
        .join(" · ")
}

fn board_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title("🤫 Whisper Board")
        .description(
            "Got something on your mind? Press the button, write it down and pick a vibe. \
             Words starting with # become tags.",
        )
        .field("Vibes", vibe_list(), false)
        .color(Color::ORANGE)
        .footer(CreateEmbedFooter::new(
            "Nobody sees who posted. Read the latest whispers with /feed.",
        ))
}

fn board_buttons() -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(CONFESS_BUTTON_ID)
            .label("Whisper a Secret")
            .emoji('🤫')
            .style(ButtonStyle::Primary),
    ])
}
