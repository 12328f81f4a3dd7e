use std::time::Duration;

use poise::{
    CreateReply, Modal,
    serenity_prelude::{
        ButtonStyle, CacheHttp, Color, CreateActionRow, CreateButton, CreateEmbed,
        CreateEmbedFooter, CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption,
    },
};

use crate::{
    Context, Data, Error,
    commands::panel::{PanelEvent, next_event, selected_value, update_message},
    feed::{EmptyState, FeedQuery, SelectorState, filter_feed, paginate, search_summary},
    models::{Category, CategoryFilter, ConfessionRecord, ReactionKind, SortOption},
    utils::{SearchModal, component_id, preview, tag_field},
};

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum VibeChoice {
    All,
    General,
    Study,
    Crush,
    Funny,
    Rant,
}

impl From<VibeChoice> for CategoryFilter {
    fn from(choice: VibeChoice) -> Self {
        match choice {
            VibeChoice::All => CategoryFilter::All,
            VibeChoice::General => CategoryFilter::Only(Category::General),
            VibeChoice::Study => CategoryFilter::Only(Category::Study),
            VibeChoice::Crush => CategoryFilter::Only(Category::Crush),
            VibeChoice::Funny => CategoryFilter::Only(Category::Funny),
            VibeChoice::Rant => CategoryFilter::Only(Category::Rant),
        }
    }
}

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum SortChoice {
    #[name = "Newest First"]
    Newest,
    #[name = "Oldest First"]
    Oldest,
}

impl From<SortChoice> for SortOption {
    fn from(choice: SortChoice) -> Self {
        match choice {
            SortChoice::Newest => SortOption::Newest,
            SortChoice::Oldest => SortOption::Oldest,
        }
    }
}

const REPLACED_NOTICE: &str = "This feed was replaced by a newer one. Use the latest /feed panel.";

/// Everything one open feed panel remembers between interactions.
#[derive(Debug, Clone, Default)]
struct FeedState {
    query: FeedQuery,
    selector: SelectorState,
    page: usize,
}

/// Browse confessions by vibe, newest or oldest first.
#[poise::command(
    slash_command,
    guild_only,
    description_localized("en-US", "Browse anonymous confessions by vibe.")
)]
pub async fn feed(
    ctx: Context<'_>,
    #[description = "Only show one category vibe"] category: Option<VibeChoice>,
    #[description = "Sort order (default: newest first)"] sort: Option<SortChoice>,
    #[description = "Show vibes starting with this text"]
    #[max_length = 50]
    search: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();
    let author = ctx.author().id;

    let view = data.views.acquire(author);
    if view.replaced_previous() {
        log::debug!("Feed for {} replaced an older one", author);
    }

    let session = ctx.id();
    let mut state = FeedState {
        query: FeedQuery {
            category: category.map(CategoryFilter::from).unwrap_or_default(),
            search: search.unwrap_or_default(),
            sort: sort.map(SortOption::from).unwrap_or_default(),
        },
        ..Default::default()
    };

    let (content, embeds, components) = render(data, session, &mut state).await;
    let mut reply = CreateReply::default()
        .content(content)
        .components(components)
        .ephemeral(true);
    for embed in embeds {
        reply = reply.embed(embed);
    }
    ctx.send(reply).await?;

    let serenity_ctx = ctx.serenity_context();
    let timeout = Duration::from_secs(data.config.session_timeout_secs);

    while let Some(event) = next_event(serenity_ctx, session, author, timeout).await {
        let action = event.action().to_string();

        if !view.is_current() {
            let closed = update_message(Some(REPLACED_NOTICE.to_string()), vec![], vec![]);
            match event {
                PanelEvent::Press(press) => {
                    press.create_response(serenity_ctx.http(), closed).await?
                }
                PanelEvent::Modal(modal) => {
                    modal.create_response(serenity_ctx.http(), closed).await?
                }
            }
            log::debug!("Feed session {} closed after takeover", session);
            return Ok(());
        }

        let press = match event {
            PanelEvent::Modal(modal) => {
                match SearchModal::parse(modal.data.clone()) {
                    Ok(values) => {
                        state.query.search = values.query.unwrap_or_default();
                        state.page = 0;
                    }
                    Err(e) => log::error!("Failed to parse search modal: {}", e),
                }
                let (content, embeds, components) = render(data, session, &mut state).await;
                modal
                    .create_response(
                        serenity_ctx.http(),
                        update_message(Some(content), embeds, components),
                    )
                    .await?;
                continue;
            }
            PanelEvent::Press(press) => press,
        };

        match action.split(':').collect::<Vec<_>>().as_slice() {
            ["vibe"] => state.selector.toggle_category(),
            ["sort"] => state.selector.toggle_sort(),
            ["category"] => {
                if let Some(filter) = selected_value(&press).and_then(|v| v.parse().ok()) {
                    state.selector.select_category(&mut state.query, filter);
                    state.page = 0;
                }
            }
            ["order"] => {
                if let Some(sort) = selected_value(&press).and_then(SortOption::from_value) {
                    state.selector.select_sort(&mut state.query, sort);
                    state.page = 0;
                }
            }
            ["prev"] => state.page = state.page.saturating_sub(1),
            ["next"] => state.page += 1,
            ["search"] => {
                let defaults = state.query.is_searching().then(|| SearchModal {
                    query: Some(state.query.search.clone()),
                });
                press
                    .create_response(
                        serenity_ctx.http(),
                        SearchModal::create(defaults, component_id(session, "query")),
                    )
                    .await?;
                continue;
            }
            ["react", confession_id, kind] => match ReactionKind::from_key(kind) {
                Some(kind) => data.reactions.react(confession_id, kind).await,
                None => log::warn!("Unknown reaction `{}`", kind),
            },
            _ => log::warn!("Unknown feed action `{}`", action),
        }

        let (content, embeds, components) = render(data, session, &mut state).await;
        press
            .create_response(
                serenity_ctx.http(),
                update_message(Some(content), embeds, components),
            )
            .await?;
    }

    log::debug!("Feed session {} timed out", session);
    Ok(())
}

/// Re-reads the store and re-runs the pipeline. Clamps `state.page` into range.
async fn render(
    data: &Data,
    session: u64,
    state: &mut FeedState,
) -> (String, Vec<CreateEmbed>, Vec<CreateActionRow>) {
    let records = data.source.confessions().await;
    let view = filter_feed(&records, &state.query);
    let page = paginate(&view, data.config.page_size(), state.page);
    state.page = page.index;

    let mut header = format!(
        "**Vibe:** {} · **Sort:** {} · Page {}/{}",
        state.query.category.label(),
        state.query.sort.label(),
        page.index + 1,
        page.total_pages
    );
    if let Some(summary) = search_summary(&state.query, view.len()) {
        header.push('\n');
        header.push_str(&summary);
    }

    let embeds = if page.items.is_empty() {
        vec![empty_embed(&EmptyState::for_query(&state.query))]
    } else {
        page.items.iter().map(|r| card_embed(r)).collect()
    };

    let mut rows = vec![CreateActionRow::Buttons(vec![
        CreateButton::new(component_id(session, "vibe"))
            .label(format!(
                "Vibe: {} {}",
                state.query.category.label(),
                if state.selector.is_category_open() { "▴" } else { "▾" }
            ))
            .style(ButtonStyle::Secondary),
        CreateButton::new(component_id(session, "sort"))
            .label(format!(
                "🕒 {} {}",
                state.query.sort.label(),
                if state.selector.is_sort_open() { "▴" } else { "▾" }
            ))
            .style(ButtonStyle::Secondary),
        CreateButton::new(component_id(session, "search"))
            .label("🔍 Search")
            .style(ButtonStyle::Primary),
        CreateButton::new(component_id(session, "prev"))
            .label("◀")
            .style(ButtonStyle::Secondary)
            .disabled(!page.has_previous()),
        CreateButton::new(component_id(session, "next"))
            .label("▶")
            .style(ButtonStyle::Secondary)
            .disabled(!page.has_next()),
    ])];

    if state.selector.is_category_open() {
        let options = data
            .source
            .categories()
            .iter()
            .filter_map(|label| label.parse::<CategoryFilter>().ok())
            .map(|filter| {
                let label = match filter {
                    CategoryFilter::All => filter.label().to_string(),
                    CategoryFilter::Only(c) => format!("{} {}", c.icon(), c),
                };
                CreateSelectMenuOption::new(label, filter.label())
                    .default_selection(filter == state.query.category)
            })
            .collect();
        rows.push(CreateActionRow::SelectMenu(
            CreateSelectMenu::new(
                component_id(session, "category"),
                CreateSelectMenuKind::String { options },
            )
            .placeholder("Filter by vibe"),
        ));
    } else if state.selector.is_sort_open() {
        let options = SortOption::ALL
            .into_iter()
            .map(|sort| {
                CreateSelectMenuOption::new(format!("{} {}", sort.icon(), sort.label()), sort.value())
                    .default_selection(sort == state.query.sort)
            })
            .collect();
        rows.push(CreateActionRow::SelectMenu(
            CreateSelectMenu::new(
                component_id(session, "order"),
                CreateSelectMenuKind::String { options },
            )
            .placeholder("Sort confessions"),
        ));
    }

    for record in page.items {
        rows.push(reaction_row(session, record));
    }

    (header, embeds, rows)
}

fn category_color(category: Category) -> Color {
    match category {
        Category::General => Color::BLURPLE,
        Category::Study => Color::from_rgb(52, 152, 219),
        Category::Crush => Color::from_rgb(233, 30, 99),
        Category::Funny => Color::from_rgb(241, 196, 15),
        Category::Rant => Color::from_rgb(231, 76, 60),
    }
}

fn reaction_summary(record: &ConfessionRecord) -> String {
    ReactionKind::ALL
        .into_iter()
        .map(|kind| format!("{} {}", kind.emoji(), record.reaction_count(kind)))
        .collect::<Vec<_>>()
        .join(" · ")
}

fn card_embed(record: &ConfessionRecord) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("{} {}", record.category.icon(), record.category))
        .description(&record.content)
        .field("Tags", tag_field(&record.hashtags), true)
        .field("Posted", format!("<t:{}:R>", record.created_at.timestamp()), true)
        .color(category_color(record.category))
        .footer(CreateEmbedFooter::new(format!(
            "{} · #{}",
            reaction_summary(record),
            preview(&record.id, 8)
        )))
}

fn reaction_row(session: u64, record: &ConfessionRecord) -> CreateActionRow {
    let buttons = ReactionKind::ALL
        .into_iter()
        .map(|kind| {
            CreateButton::new(component_id(
                session,
                &format!("react:{}:{}", record.id, kind.key()),
            ))
            .label(format!("{} {}", kind.emoji(), record.reaction_count(kind)))
            .style(ButtonStyle::Secondary)
        })
        .collect();
    CreateActionRow::Buttons(buttons)
}

fn empty_embed(empty: &EmptyState) -> CreateEmbed {
    CreateEmbed::new()
        .title(empty.title)
        .description(&empty.body)
        .color(Color::LIGHT_GREY)
}
