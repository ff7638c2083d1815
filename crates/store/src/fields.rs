use crate::storage::{MemoryStorage, Storage};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use textura_common::{
    embed_for_family, ConfigSnapshot, FieldName, FieldValue, FontEmbedState, FontSize, FontWeight,
    Rgba, TextureStats,
};

/// Initial values for persistent fields that have nothing in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefaults {
    pub text: String,
    pub color: Rgba,
    pub font_weight: FontWeight,
    pub font_family: String,
    pub font_size: FontSize,
    pub texture_marquee: bool,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            text: "Hello, Avatar!".into(),
            color: Rgba::WHITE,
            font_weight: FontWeight::REGULAR,
            font_family: "Iceland".into(),
            font_size: FontSize::clamped(32),
            texture_marquee: false,
        }
    }
}

/// Handle returned by [`FieldStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    fields: BTreeSet<FieldName>,
    callback: Box<dyn FnMut(&FieldValue)>,
}

/// Reactive store holding the current value of every configuration field.
///
/// Writes notify matching subscribers synchronously, in subscription order,
/// before `write` returns. Persistent fields queue a save that is applied on
/// the next [`FieldStore::flush`].
pub struct FieldStore {
    storage: Box<dyn Storage>,
    text: String,
    color: Rgba,
    font_weight: FontWeight,
    font_family: String,
    font_size: FontSize,
    font_embed: Option<String>,
    texture_marquee: bool,
    font_embed_state: FontEmbedState,
    texture_stats: TextureStats,
    subscriptions: Vec<Subscription>,
    next_subscription: u64,
    pending_saves: BTreeMap<FieldName, String>,
}

impl FieldStore {
    /// Create the store, restoring every persistent field from `storage`.
    ///
    /// Missing, unreadable or malformed entries fall back to `defaults`.
    pub fn open(storage: Box<dyn Storage>, defaults: &FieldDefaults) -> Self {
        let font_family: String =
            restore(storage.as_ref(), FieldName::FontFamily, defaults.font_family.clone());
        let font_embed = restore(
            storage.as_ref(),
            FieldName::FontEmbed,
            embed_for_family(&font_family),
        );

        Self {
            text: restore(storage.as_ref(), FieldName::Text, defaults.text.clone()),
            color: restore(storage.as_ref(), FieldName::Color, defaults.color),
            font_weight: restore(storage.as_ref(), FieldName::FontWeight, defaults.font_weight),
            font_size: restore(storage.as_ref(), FieldName::FontSize, defaults.font_size),
            texture_marquee: restore(
                storage.as_ref(),
                FieldName::TextureMarquee,
                defaults.texture_marquee,
            ),
            font_family,
            font_embed,
            font_embed_state: FontEmbedState::None,
            texture_stats: TextureStats::default(),
            storage,
            subscriptions: Vec::new(),
            next_subscription: 0,
            pending_saves: BTreeMap::new(),
        }
    }

    /// Create a store backed by fresh in-memory storage.
    pub fn in_memory(defaults: &FieldDefaults) -> Self {
        Self::open(Box::new(MemoryStorage::new()), defaults)
    }

    /// Read the current value of a field.
    pub fn read(&self, field: FieldName) -> FieldValue {
        match field {
            FieldName::Text => FieldValue::Text(self.text.clone()),
            FieldName::Color => FieldValue::Color(self.color),
            FieldName::FontWeight => FieldValue::FontWeight(self.font_weight),
            FieldName::FontFamily => FieldValue::FontFamily(self.font_family.clone()),
            FieldName::FontSize => FieldValue::FontSize(self.font_size),
            FieldName::FontEmbed => FieldValue::FontEmbed(self.font_embed.clone()),
            FieldName::TextureMarquee => FieldValue::TextureMarquee(self.texture_marquee),
            FieldName::FontEmbedState => FieldValue::FontEmbedState(self.font_embed_state),
            FieldName::TextureStats => FieldValue::TextureStats(self.texture_stats),
        }
    }

    /// Write a field. Returns `false` (and notifies nobody) when the value is unchanged.
    pub fn write(&mut self, value: FieldValue) -> bool {
        let field = value.name();
        if self.read(field) == value {
            return false;
        }

        if field.is_persistent() {
            match encode(&value) {
                Ok(encoded) => {
                    self.pending_saves.insert(field, encoded);
                }
                Err(err) => tracing::warn!(%field, %err, "failed to encode field for storage"),
            }
        }

        match &value {
            FieldValue::Text(v) => self.text = v.clone(),
            FieldValue::Color(v) => self.color = *v,
            FieldValue::FontWeight(v) => self.font_weight = *v,
            FieldValue::FontFamily(v) => self.font_family = v.clone(),
            FieldValue::FontSize(v) => self.font_size = *v,
            FieldValue::FontEmbed(v) => self.font_embed = v.clone(),
            FieldValue::TextureMarquee(v) => self.texture_marquee = *v,
            FieldValue::FontEmbedState(v) => self.font_embed_state = *v,
            FieldValue::TextureStats(v) => self.texture_stats = *v,
        }
        tracing::trace!(%field, ?value, "field written");

        for sub in &mut self.subscriptions {
            if sub.fields.contains(&field) {
                (sub.callback)(&value);
            }
        }
        true
    }

    /// Call `callback` after every change to any field in `fields`.
    pub fn subscribe(
        &mut self,
        fields: impl IntoIterator<Item = FieldName>,
        callback: impl FnMut(&FieldValue) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.push(Subscription {
            id,
            fields: fields.into_iter().collect(),
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        self.subscriptions.len() != before
    }

    /// Apply queued saves to storage. Returns the number of fields saved.
    ///
    /// A failed save is logged and dropped; the in-memory value stays current.
    pub fn flush(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_saves);
        let mut saved = 0;
        for (field, encoded) in pending {
            match self.storage.set(field.key(), &encoded) {
                Ok(()) => saved += 1,
                Err(err) => tracing::warn!(%field, %err, "failed to save field"),
            }
        }
        if saved > 0 {
            tracing::debug!(saved, "flushed persistent fields");
        }
        saved
    }

    /// Number of persistent fields written since the last flush.
    pub fn pending_saves(&self) -> usize {
        self.pending_saves.len()
    }

    /// Read the rasterizer's dependency set in one go.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            text: self.text.clone(),
            color: self.color,
            font_weight: self.font_weight,
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            texture_marquee: self.texture_marquee,
            font_embed_state: self.font_embed_state,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn font_weight(&self) -> FontWeight {
        self.font_weight
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> FontSize {
        self.font_size
    }

    pub fn font_embed(&self) -> Option<&str> {
        self.font_embed.as_deref()
    }

    pub fn texture_marquee(&self) -> bool {
        self.texture_marquee
    }

    pub fn font_embed_state(&self) -> FontEmbedState {
        self.font_embed_state
    }

    pub fn texture_stats(&self) -> TextureStats {
        self.texture_stats
    }
}

impl std::fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldStore")
            .field("snapshot", &self.snapshot())
            .field("font_embed", &self.font_embed)
            .field("texture_stats", &self.texture_stats)
            .field("subscriptions", &self.subscriptions.len())
            .field("pending_saves", &self.pending_saves.len())
            .finish()
    }
}

fn restore<T: DeserializeOwned>(storage: &dyn Storage, field: FieldName, default: T) -> T {
    match storage.get(field.key()) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%field, %err, "malformed stored value, using default");
                default
            }
        },
        Ok(None) => default,
        Err(err) => {
            tracing::warn!(%field, %err, "storage read failed, using default");
            default
        }
    }
}

fn encode(value: &FieldValue) -> Result<String, serde_json::Error> {
    match value {
        FieldValue::Text(v) | FieldValue::FontFamily(v) => serde_json::to_string(v),
        FieldValue::Color(v) => serde_json::to_string(v),
        FieldValue::FontWeight(v) => serde_json::to_string(v),
        FieldValue::FontSize(v) => serde_json::to_string(v),
        FieldValue::FontEmbed(v) => serde_json::to_string(v),
        FieldValue::TextureMarquee(v) => serde_json::to_string(v),
        FieldValue::FontEmbedState(v) => serde_json::to_string(v),
        FieldValue::TextureStats(v) => serde_json::to_string(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStorage, StorageError};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Storage whose every call fails.
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk on fire".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".into()))
        }
    }

    #[test]
    fn fresh_store_uses_defaults() {
        let store = FieldStore::in_memory(&FieldDefaults::default());
        assert_eq!(store.text(), "Hello, Avatar!");
        assert_eq!(store.color(), Rgba::WHITE);
        assert_eq!(store.font_weight().get(), 400);
        assert_eq!(store.font_family(), "Iceland");
        assert_eq!(store.font_size().get(), 32);
        assert_eq!(store.font_embed(), Some("Iceland"));
        assert!(!store.texture_marquee());
        assert_eq!(store.font_embed_state(), FontEmbedState::None);
        assert_eq!(store.texture_stats(), TextureStats::default());
    }

    #[test]
    fn restores_well_formed_values() {
        let storage = MemoryStorage::with_entries([
            ("text", "\"Stored\""),
            ("fontSize", "48"),
            ("fontFamily", "\"Open Sans\""),
            ("color", "\"#FF0000\""),
        ]);
        let store = FieldStore::open(Box::new(storage), &FieldDefaults::default());
        assert_eq!(store.text(), "Stored");
        assert_eq!(store.font_size().get(), 48);
        assert_eq!(store.font_family(), "Open Sans");
        assert_eq!(store.font_embed(), Some("Open+Sans"));
        assert_eq!(store.color(), Rgba::opaque(0xff, 0, 0));
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let storage = MemoryStorage::with_entries([
            ("fontSize", "640"),
            ("fontWeight", "\"heavy\""),
            ("color", "\"#nothex\""),
            ("textureMarquee", "yes"),
        ]);
        let store = FieldStore::open(Box::new(storage), &FieldDefaults::default());
        assert_eq!(store.font_size().get(), 32);
        assert_eq!(store.font_weight().get(), 400);
        assert_eq!(store.color(), Rgba::WHITE);
        assert!(!store.texture_marquee());
    }

    #[test]
    fn unavailable_storage_falls_back_to_defaults() {
        let mut store = FieldStore::open(Box::new(BrokenStorage), &FieldDefaults::default());
        assert_eq!(store.text(), "Hello, Avatar!");

        store.write(FieldValue::Text("still works".into()));
        assert_eq!(store.flush(), 0);
        assert_eq!(store.text(), "still works");
    }

    #[test]
    fn write_notifies_matching_subscribers_synchronously() {
        let mut store = FieldStore::in_memory(&FieldDefaults::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe([FieldName::Text, FieldName::Color], move |v| {
            sink.borrow_mut().push(v.name());
        });

        store.write(FieldValue::Text("a".into()));
        store.write(FieldValue::FontSize(FontSize::clamped(10)));
        store.write(FieldValue::Color(Rgba::BLACK));

        assert_eq!(*seen.borrow(), vec![FieldName::Text, FieldName::Color]);
    }

    #[test]
    fn unchanged_write_is_silent() {
        let mut store = FieldStore::in_memory(&FieldDefaults::default());
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        store.subscribe([FieldName::Text], move |_| *sink.borrow_mut() += 1);

        assert!(!store.write(FieldValue::Text("Hello, Avatar!".into())));
        assert_eq!(*count.borrow(), 0);
        assert_eq!(store.pending_saves(), 0);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut store = FieldStore::in_memory(&FieldDefaults::default());
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = store.subscribe([FieldName::Text], move |_| *sink.borrow_mut() += 1);

        store.write(FieldValue::Text("one".into()));
        assert!(store.unsubscribe(id));
        store.write(FieldValue::Text("two".into()));

        assert_eq!(*count.borrow(), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn transient_fields_are_never_saved() {
        let mut store = FieldStore::in_memory(&FieldDefaults::default());
        store.write(FieldValue::FontEmbedState(FontEmbedState::Loading));
        store.write(FieldValue::TextureStats(TextureStats::new(3, 4)));
        assert_eq!(store.pending_saves(), 0);
        assert_eq!(store.flush(), 0);
    }

    #[test]
    fn flushed_values_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data");
        {
            let storage = JsonFileStorage::open(&dir).unwrap();
            let mut store = FieldStore::open(Box::new(storage), &FieldDefaults::default());
            store.write(FieldValue::FontFamily("Open Sans".into()));
            store.write(FieldValue::FontEmbed(Some("Open+Sans".into())));
            store.write(FieldValue::FontSize(FontSize::clamped(12)));
            store.write(FieldValue::TextureMarquee(true));
            store.write(FieldValue::FontEmbedState(FontEmbedState::Loaded));
            assert_eq!(store.flush(), 4);
        }

        let storage = JsonFileStorage::open(&dir).unwrap();
        assert!(storage.get("fontEmbedState").unwrap().is_none());
        let store = FieldStore::open(Box::new(storage), &FieldDefaults::default());
        assert_eq!(store.font_family(), "Open Sans");
        assert_eq!(store.font_embed(), Some("Open+Sans"));
        assert_eq!(store.font_size().get(), 12);
        assert!(store.texture_marquee());
        assert_eq!(store.font_embed_state(), FontEmbedState::None);
    }

    #[test]
    fn snapshot_reflects_latest_writes() {
        let mut store = FieldStore::in_memory(&FieldDefaults::default());
        store.write(FieldValue::Text("AB".into()));
        store.write(FieldValue::FontEmbedState(FontEmbedState::Loaded));
        let snap = store.snapshot();
        assert_eq!(snap.text, "AB");
        assert_eq!(snap.font_embed_state, FontEmbedState::Loaded);
    }
}
