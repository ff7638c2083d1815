use crate::config::EngineConfig;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use textura_common::{FieldName, FieldValue, FontEmbedState, TextureStats};
use textura_fonts::{FetchError, FontEmbedMachine, FontSource, FontStats, Resolution};
use textura_input::{FieldInput, InputCoordinator};
use textura_render::{PassOutcome, PixelBuffer, TextSurface, TextureRasterizer};
use textura_store::{FieldStore, Storage, SubscriptionId};

/// A record of something the engine did, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A field changed value.
    Committed(FieldName),
    /// A font fetch completed.
    FontResolved(Resolution),
    /// A rasterizer pass ran.
    Pass(PassOutcome),
}

/// Owns the whole pipeline and drives it on a virtual clock.
///
/// Each handler (`input`, `advance`) is one turn: commits land in the store,
/// font completions are applied, then at most one rasterizer pass runs if a
/// raster input changed, and finally queued saves are flushed. The pass sees
/// every write of the turn together.
pub struct Engine<S, F> {
    store: FieldStore,
    inputs: InputCoordinator,
    fonts: FontEmbedMachine<F>,
    raster: TextureRasterizer<S>,
    dirty: Rc<Cell<bool>>,
    subscription: Option<SubscriptionId>,
    now: Duration,
    events: Vec<EngineEvent>,
}

impl<S: TextSurface, F: FontSource> Engine<S, F> {
    /// Open the store from `storage` and apply the restored font family.
    ///
    /// A persisted web-font family issues its fetch here, exactly as if the
    /// user had just chosen it.
    pub fn start(config: &EngineConfig, storage: Box<dyn Storage>, surface: S, source: F) -> Self {
        let _span = tracing::info_span!("engine_start").entered();
        let mut store = FieldStore::open(storage, &config.defaults);

        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        let subscription = store.subscribe(FieldName::RASTER_INPUTS, move |_| flag.set(true));

        let mut engine = Self {
            store,
            inputs: InputCoordinator::new(&config.debounce),
            fonts: FontEmbedMachine::new(source, config.font_provider.clone()),
            raster: TextureRasterizer::new(surface),
            dirty,
            subscription: Some(subscription),
            now: Duration::ZERO,
            events: Vec::new(),
        };

        let family = engine.store.font_family().to_string();
        tracing::debug!(%family, "applying restored font family");
        engine.fonts.apply_family(&family, &mut engine.store);
        engine.settle();
        engine
    }

    /// Feed one raw input at the current time.
    pub fn input(&mut self, input: FieldInput) {
        if self.subscription.is_none() {
            tracing::debug!(?input, "engine shut down; input ignored");
            return;
        }
        if let Some(value) = self.inputs.handle(self.now, input) {
            self.commit(value);
        }
        self.settle();
    }

    /// Move the clock forward by `dt`, firing every debounced commit that
    /// comes due on the way, then collect finished font fetches.
    pub fn advance(&mut self, dt: Duration) {
        self.step(dt);
    }

    /// Advance until no commit is pending and no font fetch completes.
    /// Returns the virtual time that passed.
    ///
    /// Fetches a source has not completed stay outstanding.
    pub fn run_until_idle(&mut self) -> Duration {
        let start = self.now;
        loop {
            let dt = self
                .inputs
                .next_deadline()
                .map_or(Duration::ZERO, |at| at.saturating_sub(self.now));
            let resolved = self.step(dt);
            if self.inputs.pending() == 0 && resolved == 0 {
                break;
            }
        }
        self.now - start
    }

    /// Drop pending commits, flush saves and stop reacting to changes.
    /// Returns the number of pending commits that were dropped.
    pub fn shutdown(&mut self) -> usize {
        let dropped = self.inputs.teardown();
        if let Some(id) = self.subscription.take() {
            self.store.unsubscribe(id);
        }
        self.store.flush();
        tracing::debug!(dropped, "engine shut down");
        dropped
    }

    fn step(&mut self, dt: Duration) -> usize {
        let target = self.now + dt;
        let _span = tracing::info_span!("advance", from = ?self.now, to = ?target).entered();

        while let Some(at) = self.inputs.next_deadline().filter(|at| *at <= target) {
            self.now = self.now.max(at);
            for value in self.inputs.fire_due(self.now) {
                self.commit(value);
            }
            self.settle();
        }
        self.now = target;

        let resolved = self.pump_fonts();
        self.settle();
        resolved
    }

    fn commit(&mut self, value: FieldValue) {
        let field = value.name();
        let family = match &value {
            FieldValue::FontFamily(family) => Some(family.clone()),
            _ => None,
        };
        if !self.store.write(value) {
            return;
        }
        self.events.push(EngineEvent::Committed(field));
        if let Some(family) = family {
            self.fonts.apply_family(&family, &mut self.store);
        }
    }

    fn pump_fonts(&mut self) -> usize {
        let raster = &mut self.raster;
        let resolutions = self.fonts.pump(&mut self.store, |_, faces| {
            raster
                .surface_mut()
                .install_faces(faces)
                .map_err(|err| FetchError::Malformed(err.to_string()))
        });
        let count = resolutions.len();
        self.events
            .extend(resolutions.into_iter().map(EngineEvent::FontResolved));
        count
    }

    fn settle(&mut self) {
        if self.dirty.replace(false) {
            let outcome = self.raster.run(&mut self.store);
            self.events.push(EngineEvent::Pass(outcome));
        }
        self.store.flush();
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    pub fn texture(&self) -> &PixelBuffer {
        self.raster.buffer()
    }

    pub fn texture_stats(&self) -> TextureStats {
        self.store.texture_stats()
    }

    pub fn font_state(&self) -> FontEmbedState {
        self.store.font_embed_state()
    }

    pub fn font_stats(&self) -> &FontStats {
        self.fonts.stats()
    }

    pub fn rasterizer(&self) -> &TextureRasterizer<S> {
        &self.raster
    }

    pub fn font_source(&self) -> &F {
        self.fonts.source()
    }

    pub fn font_source_mut(&mut self) -> &mut F {
        self.fonts.source_mut()
    }

    /// Number of debounced commits still waiting.
    pub fn pending_inputs(&self) -> usize {
        self.inputs.pending()
    }

    /// Events recorded since the last [`Engine::drain_events`].
    ///
    /// The log is append-only and grows by at least one entry per turn that
    /// changes anything; long-running hosts must drain it.
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Take every recorded event, leaving the log empty.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}
