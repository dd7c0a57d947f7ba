// ABOUTME: Shared mocks for integration tests: recording surface and canned collaborators
// ABOUTME: Every mock appends to one shared event log so ordering can be asserted

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use quoordinates::books::BookCatalog;
use quoordinates::gateway::SurfaceFactory;
use quoordinates::platform::InteractionEnvelope;
use quoordinates_core::traits::{
    ArtGenerator, ChannelRef, Completer, GeneratedArt, Interaction, QuoteCandidate, QuoteSearch,
    ReplyPayload, ReplySurface,
};
use quoordinates_core::workflow::WorkflowTracker;
use quoordinates_core::Collaborators;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Defer,
    Reply(ReplyPayload),
    FollowUp(ReplyPayload),
    Search(String),
    Generate(String),
    Complete(String),
    Pre,
    Post(String, bool),
}

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn emissions(&self) -> Vec<ReplyPayload> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Reply(p) | Event::FollowUp(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

pub struct RecordingSurface {
    log: EventLog,
}

impl RecordingSurface {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

#[async_trait]
impl ReplySurface for RecordingSurface {
    async fn defer(&self) -> Result<()> {
        self.log.push(Event::Defer);
        Ok(())
    }

    async fn reply(&self, payload: ReplyPayload) -> Result<()> {
        self.log.push(Event::Reply(payload));
        Ok(())
    }

    async fn follow_up(&self, payload: ReplyPayload) -> Result<()> {
        self.log.push(Event::FollowUp(payload));
        Ok(())
    }

    async fn thread_messages(&self, _thread: &ChannelRef) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

pub struct RecordingSurfaces {
    pub log: EventLog,
}

impl SurfaceFactory for RecordingSurfaces {
    fn surface(&self, _envelope: &InteractionEnvelope) -> Box<dyn ReplySurface> {
        Box::new(RecordingSurface::new(&self.log))
    }
}

pub struct CannedSearch {
    pub log: EventLog,
    pub results: Vec<QuoteCandidate>,
}

#[async_trait]
impl QuoteSearch for CannedSearch {
    async fn search(&self, source_text: &str) -> Result<Vec<QuoteCandidate>> {
        self.log.push(Event::Search(source_text.to_string()));
        Ok(self.results.clone())
    }
}

pub struct CannedModel {
    pub log: EventLog,
    /// Simulated model latency
    pub delay: Duration,
}

#[async_trait]
impl Completer for CannedModel {
    async fn complete(&self, instruction: &str) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        self.log.push(Event::Complete(instruction.to_string()));
        Ok("A summary.".to_string())
    }
}

#[async_trait]
impl ArtGenerator for CannedModel {
    async fn generate(&self, source_text: &str) -> Result<GeneratedArt> {
        self.log.push(Event::Generate(source_text.to_string()));
        Ok(GeneratedArt {
            prompt: source_text.to_string(),
            image_url: "https://img.example/x.png".to_string(),
        })
    }
}

pub struct RecordingTracker {
    pub log: EventLog,
}

#[async_trait]
impl WorkflowTracker for RecordingTracker {
    async fn pre_workflow(&self, _interaction: &Interaction) -> Result<()> {
        self.log.push(Event::Pre);
        Ok(())
    }

    async fn invocation_workflow(
        &self,
        _interaction: &Interaction,
        logical_name: &str,
        from_button: bool,
    ) -> Result<()> {
        self.log.push(Event::Post(logical_name.to_string(), from_button));
        Ok(())
    }
}

pub fn collaborators(log: &EventLog, results: &[(&str, &str)]) -> Collaborators {
    slow_collaborators(log, results, Duration::ZERO)
}

pub fn slow_collaborators(
    log: &EventLog,
    results: &[(&str, &str)],
    delay: Duration,
) -> Collaborators {
    let model = Arc::new(CannedModel {
        log: log.clone(),
        delay,
    });
    let mut books = HashMap::new();
    books.insert(
        "Meditations".to_string(),
        "https://books.example/meditations".to_string(),
    );
    Collaborators {
        art: model.clone(),
        completer: model,
        quotes: Arc::new(CannedSearch {
            log: log.clone(),
            results: results
                .iter()
                .map(|(text, title)| QuoteCandidate::new(*text, *title))
                .collect(),
        }),
        books: Arc::new(BookCatalog::new(&books)),
    }
}

pub fn tracker(log: &EventLog) -> Arc<dyn WorkflowTracker> {
    Arc::new(RecordingTracker { log: log.clone() })
}
