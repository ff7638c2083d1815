use crate::source::{FetchError, FetchTicket, FontRequest, FontSource};
use textura_common::{embed_for_family, FieldValue, FontEmbedState, FontFace};
use textura_store::FieldStore;

/// Default stylesheet URL template; `{family}` is replaced by the embed string.
pub const DEFAULT_FONT_PROVIDER: &str = "https://fonts.googleapis.com/css2?family={family}";

/// What happened to one completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The fetch was current and its faces are installed.
    Loaded(FetchTicket),
    /// The fetch was current and failed.
    Failed(FetchTicket),
    /// A newer family superseded the fetch; its result was discarded.
    Stale(FetchTicket),
}

/// Counters for instrumentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontStats {
    pub issued: u64,
    pub loaded: u64,
    pub failed: u64,
    pub stale: u64,
}

/// Drives `fontEmbed` and `fontEmbedState` from the current font family.
///
/// Every fetch carries a ticket. Only the most recent request is outstanding;
/// a completion whose ticket or embed string no longer matches is ignored,
/// so a slow fetch for an old family can never mark the new one loaded.
pub struct FontEmbedMachine<S> {
    source: S,
    provider: String,
    next_ticket: u64,
    outstanding: Option<FontRequest>,
    stats: FontStats,
}

impl<S: FontSource> FontEmbedMachine<S> {
    pub fn new(source: S, provider: impl Into<String>) -> Self {
        Self {
            source,
            provider: provider.into(),
            next_ticket: 1,
            outstanding: None,
            stats: FontStats::default(),
        }
    }

    /// React to the family in `store` becoming `family`.
    ///
    /// The system font is marked loaded at once with no fetch. Any other
    /// family sets the embed string, enters `loading` and begins a fetch.
    /// Always fetches, even for a family that loaded earlier in the session.
    pub fn apply_family(&mut self, family: &str, store: &mut FieldStore) -> Option<FetchTicket> {
        let Some(embed) = embed_for_family(family) else {
            if let Some(old) = self.outstanding.take() {
                tracing::debug!(ticket = old.ticket.0, "system font supersedes outstanding fetch");
            }
            store.write(FieldValue::FontEmbed(None));
            store.write(FieldValue::FontEmbedState(FontEmbedState::Loaded));
            return None;
        };

        let ticket = FetchTicket(self.next_ticket);
        self.next_ticket += 1;
        let request = FontRequest {
            ticket,
            family: family.to_string(),
            url: self.provider.replace("{family}", &embed),
            embed: embed.clone(),
        };

        store.write(FieldValue::FontEmbed(Some(embed)));
        store.write(FieldValue::FontEmbedState(FontEmbedState::Loading));

        tracing::debug!(ticket = ticket.0, family, url = %request.url, "font fetch issued");
        self.source.begin(&request);
        self.outstanding = Some(request);
        self.stats.issued += 1;
        Some(ticket)
    }

    /// Collect finished fetches from the source and settle the state.
    ///
    /// `install` receives the faces of a current, successful fetch; if it
    /// rejects them the fetch counts as a malformed response.
    pub fn pump<I>(&mut self, store: &mut FieldStore, mut install: I) -> Vec<Resolution>
    where
        I: FnMut(&FontRequest, Vec<FontFace>) -> Result<(), FetchError>,
    {
        let completions = self.source.poll();
        if completions.is_empty() {
            return Vec::new();
        }
        let _span = tracing::info_span!("font_pump", completions = completions.len()).entered();

        let mut resolutions = Vec::with_capacity(completions.len());
        for completion in completions {
            let ticket = completion.ticket;
            let current = self
                .outstanding
                .as_ref()
                .is_some_and(|r| r.ticket == ticket && store.font_embed() == Some(r.embed.as_str()));
            if !current {
                tracing::debug!(ticket = ticket.0, "discarding stale font fetch");
                self.stats.stale += 1;
                resolutions.push(Resolution::Stale(ticket));
                continue;
            }
            let Some(request) = self.outstanding.take() else {
                continue;
            };

            match completion.outcome.and_then(|faces| install(&request, faces)) {
                Ok(()) => {
                    tracing::debug!(ticket = ticket.0, family = %request.family, "font loaded");
                    store.write(FieldValue::FontEmbedState(FontEmbedState::Loaded));
                    self.stats.loaded += 1;
                    resolutions.push(Resolution::Loaded(ticket));
                }
                Err(err) => {
                    tracing::warn!(ticket = ticket.0, family = %request.family, %err, "font fetch failed");
                    store.write(FieldValue::FontEmbedState(FontEmbedState::Error));
                    self.stats.failed += 1;
                    resolutions.push(Resolution::Failed(ticket));
                }
            }
        }
        resolutions
    }

    /// The fetch still awaiting completion, if any.
    pub fn outstanding(&self) -> Option<&FontRequest> {
        self.outstanding.as_ref()
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn stats(&self) -> &FontStats {
        &self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
