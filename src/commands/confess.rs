use std::time::Duration;

use poise::{
    CreateReply, Modal,
    serenity_prelude::{
        self as serenity, ButtonStyle, CacheHttp, Color, ComponentInteraction, CreateActionRow,
        CreateButton, CreateEmbed, CreateEmbedFooter, CreateInteractionResponse,
        CreateInteractionResponseMessage, CreateSelectMenu, CreateSelectMenuKind,
        CreateSelectMenuOption, EditInteractionResponse, UserId,
    },
};

use crate::{
    Context, Data, Error,
    commands::panel::{PanelEvent, next_event, selected_value, update_message},
    composer::{ComposeError, Composer, MAX_CONTENT_CHARS, QUICK_EMOJIS, extract_hashtags},
    logging::{author_hash, log_confession},
    models::{Category, ConfessionRecord},
    utils::{ComposeModal, MAX_TAG_FIELD_CHARS, component_id, preview, tag_field},
};

const PRIVACY_NOTE: &str = "Your identity remains 100% anonymous.";

/// Write and post an anonymous confession.
#[poise::command(
    slash_command,
    guild_only,
    description_localized(
        "en-US",
        "Whisper an anonymous confession (all submissions are anonymous)."
    )
)]
pub async fn confess(ctx: Context<'_>) -> Result<(), Error> {
    let session = ctx.id();
    let composer = Composer::new();

    ctx.send(
        CreateReply::default()
            .embed(render_embed(&composer))
            .components(render_components(session, &composer))
            .ephemeral(true),
    )
    .await?;

    run_session(ctx.serenity_context(), ctx.data(), session, ctx.author().id, composer).await
}

/// Opens a composer panel in response to the persistent confess button.
pub async fn open_from_button(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &ComponentInteraction,
) -> Result<(), Error> {
    let session = interaction.id.get();
    let composer = Composer::new();

    interaction
        .create_response(
            ctx.http(),
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(render_embed(&composer))
                    .components(render_components(session, &composer))
                    .ephemeral(true),
            ),
        )
        .await?;

    run_session(ctx, data, session, interaction.user.id, composer).await
}

/// Drives one composer panel until it is posted, cancelled or left idle.
/// Events are handled one at a time, so a panel never has two submissions in flight.
async fn run_session(
    ctx: &serenity::Context,
    data: &Data,
    session: u64,
    author: UserId,
    mut composer: Composer,
) -> Result<(), Error> {
    let timeout = Duration::from_secs(data.config.session_timeout_secs);

    while let Some(event) = next_event(ctx, session, author, timeout).await {
        let action = event.action().to_string();

        let press = match event {
            PanelEvent::Modal(modal) => {
                match ComposeModal::parse(modal.data.clone()) {
                    Ok(values) => {
                        composer.set_content(&values.content);
                        composer.set_secret_code(&values.secret_code);
                    }
                    Err(e) => log::error!("Failed to parse composer modal: {}", e),
                }
                modal
                    .create_response(ctx.http(), redraw(session, &composer))
                    .await?;
                continue;
            }
            PanelEvent::Press(press) => press,
        };

        match action.as_str() {
            "write" => {
                let defaults = (!composer.content().is_empty()
                    || !composer.secret_code().is_empty())
                .then(|| ComposeModal {
                    content: composer.content().to_string(),
                    secret_code: composer.secret_code().to_string(),
                });
                press
                    .create_response(
                        ctx.http(),
                        ComposeModal::create(defaults, component_id(session, "compose")),
                    )
                    .await?;
                continue;
            }
            "vibe" => composer.toggle_vibe_menu(),
            "category" => {
                if let Some(category) = selected_value(&press).and_then(|v| v.parse().ok()) {
                    composer.select_category(category);
                }
            }
            "emoji" => {
                if let Some(emoji) = selected_value(&press) {
                    composer.append_emoji(emoji);
                }
            }
            "dismiss" => composer.dismiss_error(),
            "cancel" => {
                press
                    .create_response(
                        ctx.http(),
                        update_message(None, vec![closed_embed()], vec![]),
                    )
                    .await?;
                return Ok(());
            }
            "post" => {
                if post(ctx, data, session, author, &press, &mut composer).await? {
                    return Ok(());
                }
                continue;
            }
            other => log::warn!("Unknown composer action `{}`", other),
        }

        press
            .create_response(ctx.http(), redraw(session, &composer))
            .await?;
    }

    log::debug!("Composer session {} timed out", session);
    Ok(())
}

/// Submits the draft. Returns `true` once the confession is stored and the panel closed.
async fn post(
    ctx: &serenity::Context,
    data: &Data,
    session: u64,
    author: UserId,
    press: &ComponentInteraction,
    composer: &mut Composer,
) -> Result<bool, Error> {
    let started = composer.begin_submit();

    // Either the validation error or the in-flight state is shown before the service is called.
    press
        .create_response(ctx.http(), redraw(session, composer))
        .await?;

    let request = match started {
        Ok(request) => request,
        Err(e) => {
            log::debug!("Composer session {} refused to submit: {}", session, e);
            return Ok(false);
        }
    };

    let outcome = data.service.submit(request).await;

    match composer.finish_submit(outcome) {
        Ok(record) => {
            log_confession(
                &author_hash(author.get()),
                &record.id,
                record.category,
                &record.content,
            );
            press
                .edit_response(
                    ctx.http(),
                    EditInteractionResponse::new()
                        .embed(posted_embed(&record))
                        .components(vec![]),
                )
                .await?;
            Ok(true)
        }
        Err(ComposeError::Rejected(e)) => {
            log::warn!("Confession rejected in session {}: {:?}", session, e);
            press
                .edit_response(
                    ctx.http(),
                    EditInteractionResponse::new()
                        .embed(render_embed(composer))
                        .components(render_components(session, composer)),
                )
                .await?;
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn redraw(session: u64, composer: &Composer) -> CreateInteractionResponse {
    update_message(
        None,
        vec![render_embed(composer)],
        render_components(session, composer),
    )
}

fn masked_code(code: &str) -> String {
    if code.is_empty() {
        return "*not set*".to_string();
    }
    "•".repeat(code.chars().count())
}

fn char_counter(composer: &Composer) -> String {
    let count = format!("{}/{}", composer.char_count(), MAX_CONTENT_CHARS);
    if composer.content_warning() {
        format!("{} ⚠️ min 10", count)
    } else {
        count
    }
}

fn tag_line(content: &str) -> String {
    if content.trim().is_empty() {
        return tag_field::<String>(&[]);
    }
    tag_field(&extract_hashtags(content))
}

fn render_embed(composer: &Composer) -> CreateEmbed {
    let category = composer.category();
    let description = if composer.content().is_empty() {
        "*Nothing written yet. Press ✏️ Write to start. Type # to add tags.*".to_string()
    } else {
        composer.content().to_string()
    };

    let mut code = masked_code(composer.secret_code());
    if composer.code_warning() {
        code.push_str(" ⚠️ min 4");
    }

    let embed = CreateEmbed::new()
        .title("Whisper Your Secret")
        .description(description)
        .field("Category Vibe", format!("{} {}", category.icon(), category), true)
        .field("Secret Code", code, true)
        .field("Characters", char_counter(composer), true)
        .field("Tags", tag_line(composer.content()), false)
        .footer(CreateEmbedFooter::new(PRIVACY_NOTE));

    match composer.error() {
        Some(error) => embed.field("⚠️ Error", error, false).color(Color::RED),
        None => embed.color(Color::from_rgb(255, 165, 0)),
    }
}

fn render_components(session: u64, composer: &Composer) -> Vec<CreateActionRow> {
    let category = composer.category();
    let busy = composer.is_submitting();

    let mut buttons = vec![
        CreateButton::new(component_id(session, "write"))
            .label("✏️ Write")
            .style(ButtonStyle::Secondary)
            .disabled(busy),
        CreateButton::new(component_id(session, "vibe"))
            .label(format!(
                "{} {} {}",
                category.icon(),
                category,
                if composer.is_vibe_menu_open() { "▴" } else { "▾" }
            ))
            .style(ButtonStyle::Secondary)
            .disabled(busy),
        CreateButton::new(component_id(session, "post"))
            .label(if busy { "Publishing..." } else { "Post Anonymously" })
            .style(ButtonStyle::Success)
            .disabled(!composer.can_submit()),
        CreateButton::new(component_id(session, "cancel"))
            .label("Cancel")
            .style(ButtonStyle::Danger)
            .disabled(busy),
    ];
    if composer.error().is_some() && !busy {
        buttons.push(
            CreateButton::new(component_id(session, "dismiss"))
                .label("Dismiss")
                .style(ButtonStyle::Secondary),
        );
    }

    let mut rows = vec![CreateActionRow::Buttons(buttons)];
    if busy {
        return rows;
    }

    if composer.is_vibe_menu_open() {
        let options = Category::ALL
            .into_iter()
            .map(|c| {
                CreateSelectMenuOption::new(format!("{} {}", c.icon(), c), c.label())
                    .default_selection(c == category)
            })
            .collect();
        rows.push(CreateActionRow::SelectMenu(
            CreateSelectMenu::new(
                component_id(session, "category"),
                CreateSelectMenuKind::String { options },
            )
            .placeholder("Pick a vibe"),
        ));
    }

    let emojis = QUICK_EMOJIS
        .into_iter()
        .map(|e| CreateSelectMenuOption::new(e, e))
        .collect();
    rows.push(CreateActionRow::SelectMenu(
        CreateSelectMenu::new(
            component_id(session, "emoji"),
            CreateSelectMenuKind::String { options: emojis },
        )
        .placeholder("Add an emoji"),
    ));

    rows
}

fn posted_embed(record: &ConfessionRecord) -> CreateEmbed {
    CreateEmbed::new()
        .title("Your confession is out there ✨")
        .description(preview(&record.content, 200))
        .field(
            "Category Vibe",
            format!("{} {}", record.category.icon(), record.category),
            true,
        )
        .field("Tags", tag_line(&record.content), true)
        .color(Color::DARK_GREEN)
        .footer(CreateEmbedFooter::new("Find it with /feed."))
}

fn closed_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title("Composer closed")
        .description("Nothing was posted.")
        .color(Color::LIGHT_GREY)
}
