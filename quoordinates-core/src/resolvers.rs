// ABOUTME: Resolvers for the illustrate, expand-quotes, and summarize button actions
// ABOUTME: Each turns the source message into new content and possibly a new button row

use crate::actions::{follow_up_row, ButtonAction};
use crate::quotes::{filter_quotes, render_quote, ExclusionSet};
use crate::reply::Responder;
use crate::traits::{
    ArtGenerator, BookLookup, Completer, GeneratedArt, Interaction, QuoteCandidate, QuoteSearch,
    ReplyPayload,
};
use anyhow::Result;
use std::sync::Arc;

/// Reply when every candidate quote is already visible
pub const NO_MORE_QUOTES: &str = "No more quotes found!";

const SUMMARY_INSTRUCTION: &str = "Summarize the following tldr in one or two sentences:";

/// External services the resolvers call
#[derive(Clone)]
pub struct Collaborators {
    pub art: Arc<dyn ArtGenerator>,
    pub completer: Arc<dyn Completer>,
    pub quotes: Arc<dyn QuoteSearch>,
    pub books: Arc<dyn BookLookup>,
}

/// Instruction sent to the completion service for a summary
pub fn summary_instruction(content: &str) -> String {
    format!("{}\n{}", SUMMARY_INSTRUCTION, content)
}

/// Reply text for a generated image. The image host expires assets, so the
/// user is told to save it.
pub fn art_reply(art: &GeneratedArt) -> String {
    format!(
        "Art Prompt (**save the image it disappears in 24 hours!**): {} \n Image: [(url)]({})",
        art.prompt, art.image_url
    )
}

/// Run the resolver for `action`. The responder must already be acknowledged.
pub async fn resolve(
    action: ButtonAction,
    collaborators: &Collaborators,
    interaction: &Interaction,
    responder: &mut Responder<'_>,
) -> Result<()> {
    match action {
        ButtonAction::Summarize => summarize(collaborators, interaction, responder).await,
        ButtonAction::Illustrate => illustrate(collaborators, interaction, responder).await,
        ButtonAction::ExpandQuotes => expand_quotes(collaborators, interaction, responder).await,
    }
}

/// Terminal: one summary message, no buttons
pub async fn summarize(
    collaborators: &Collaborators,
    interaction: &Interaction,
    responder: &mut Responder<'_>,
) -> Result<()> {
    let summary = collaborators
        .completer
        .complete(&summary_instruction(interaction.source_content()))
        .await?;
    responder.respond(ReplyPayload::text(summary)).await?;
    Ok(())
}

/// Terminal: one art prompt + image link message, no buttons
pub async fn illustrate(
    collaborators: &Collaborators,
    interaction: &Interaction,
    responder: &mut Responder<'_>,
) -> Result<()> {
    let art = collaborators
        .art
        .generate(interaction.source_content())
        .await?;
    tracing::info!(image_url = %art.image_url, "Generated illustration");
    responder.respond(ReplyPayload::text(art_reply(&art))).await?;
    Ok(())
}

/// One follow-up per new quote, each carrying the full button row, or a
/// terminal "no more quotes" message when nothing new survives
pub async fn expand_quotes(
    collaborators: &Collaborators,
    interaction: &Interaction,
    responder: &mut Responder<'_>,
) -> Result<()> {
    let source = interaction.source_content();
    let candidates = collaborators.quotes.search(source).await?;

    let exclusions = ExclusionSet::from_source(source)
        .with_thread(thread_history(interaction, responder).await);

    let quotes = render_new_quotes(collaborators, candidates, &exclusions);
    post_quotes(responder, quotes, NO_MORE_QUOTES).await
}

/// Dedup and render search results against what is already visible
pub fn render_new_quotes(
    collaborators: &Collaborators,
    candidates: Vec<QuoteCandidate>,
    exclusions: &ExclusionSet,
) -> Vec<String> {
    let books = collaborators.books.as_ref();
    filter_quotes(candidates, exclusions, |q| render_quote(q, books))
}

/// Send each quote as its own message with a fresh button row. With no
/// quotes, send `empty_text` without buttons, closing the chain.
pub async fn post_quotes(
    responder: &mut Responder<'_>,
    quotes: Vec<String>,
    empty_text: &str,
) -> Result<()> {
    if quotes.is_empty() {
        responder
            .respond(ReplyPayload::with_buttons(empty_text, Vec::new()))
            .await?;
        return Ok(());
    }

    for quote in quotes {
        responder
            .respond(ReplyPayload::with_buttons(quote, follow_up_row()))
            .await?;
    }
    Ok(())
}

/// Content of every message in the enclosing thread. Outside a thread, or
/// when the fetch fails, this is empty and only the source message excludes.
async fn thread_history(interaction: &Interaction, responder: &Responder<'_>) -> Vec<String> {
    if !interaction.channel.is_thread {
        return Vec::new();
    }

    match responder.surface().thread_messages(&interaction.channel).await {
        Ok(messages) => {
            tracing::debug!(
                thread = %interaction.channel.id,
                count = messages.len(),
                "Fetched thread history"
            );
            messages
        }
        Err(e) => {
            crate::metrics::record_error("thread_fetch");
            tracing::warn!(
                thread = %interaction.channel.id,
                error = %e,
                "Could not read thread history, excluding source message only"
            );
            Vec::new()
        }
    }
}
