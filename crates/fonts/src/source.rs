use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use textura_common::{FontFace, FontWeight};

/// Stamp identifying one issued font fetch. Later requests get larger stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchTicket(pub u64);

/// A font fetch issued for one font family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRequest {
    pub ticket: FetchTicket,
    /// Family as the user typed it.
    pub family: String,
    /// Family normalized for the provider query (`Open+Sans`).
    pub embed: String,
    /// Stylesheet URL built from the provider template.
    pub url: String,
}

/// Errors from fetching or decoding a remote font.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("font family not found: {0}")]
    NotFound(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed font response: {0}")]
    Malformed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The outcome of one fetch, delivered by a [`FontSource`].
#[derive(Debug)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub outcome: Result<Vec<FontFace>, FetchError>,
}

/// Something that can resolve font requests asynchronously.
///
/// `begin` starts a fetch and must not block; finished fetches are handed
/// back by `poll`, in completion order, which need not match request order.
pub trait FontSource {
    fn begin(&mut self, request: &FontRequest);
    fn poll(&mut self) -> Vec<FetchCompletion>;
}

/// Source whose completions are delivered by the host.
///
/// Hosts that perform the network call themselves record the result with
/// [`ManualSource::resolve`]; it is picked up on the next poll.
#[derive(Debug, Default)]
pub struct ManualSource {
    issued: Vec<FontRequest>,
    unresolved: Vec<FetchTicket>,
    ready: VecDeque<FetchCompletion>,
}

impl ManualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests begun since the last [`ManualSource::drain_issued`], oldest
    /// first. The log grows with every fetch until drained.
    pub fn issued(&self) -> &[FontRequest] {
        &self.issued
    }

    /// Take the request log, leaving it empty. Unresolved tickets stay
    /// resolvable.
    pub fn drain_issued(&mut self) -> Vec<FontRequest> {
        std::mem::take(&mut self.issued)
    }

    /// Most recently begun request.
    pub fn last_request(&self) -> Option<&FontRequest> {
        self.issued.last()
    }

    /// Tickets begun but not yet resolved.
    pub fn unresolved(&self) -> &[FetchTicket] {
        &self.unresolved
    }

    /// Record the outcome of a fetch. Returns `false` for unknown or
    /// already-resolved tickets.
    pub fn resolve(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<FontFace>, FetchError>,
    ) -> bool {
        let Some(pos) = self.unresolved.iter().position(|t| *t == ticket) else {
            return false;
        };
        self.unresolved.remove(pos);
        self.ready.push_back(FetchCompletion { ticket, outcome });
        true
    }
}

impl FontSource for ManualSource {
    fn begin(&mut self, request: &FontRequest) {
        self.issued.push(request.clone());
        self.unresolved.push(request.ticket);
    }

    fn poll(&mut self) -> Vec<FetchCompletion> {
        self.ready.drain(..).collect()
    }
}

/// Source that serves fonts from a local directory tree.
///
/// A family resolves to `<root>/<Family Name>/`; every `.ttf`, `.otf` and
/// `.ttc` file inside becomes one face, with its weight taken from the file
/// name. Requests complete on the poll after they were begun.
#[derive(Debug)]
pub struct DirectorySource {
    root: PathBuf,
    queue: VecDeque<FontRequest>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            queue: VecDeque::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FontSource for DirectorySource {
    fn begin(&mut self, request: &FontRequest) {
        tracing::debug!(family = %request.family, root = %self.root.display(), "queued directory font fetch");
        self.queue.push_back(request.clone());
    }

    fn poll(&mut self) -> Vec<FetchCompletion> {
        self.queue
            .drain(..)
            .map(|request| FetchCompletion {
                ticket: request.ticket,
                outcome: load_family(&self.root, &request.family),
            })
            .collect()
    }
}

fn load_family(root: &Path, family: &str) -> Result<Vec<FontFace>, FetchError> {
    if !is_plain_family_name(family) {
        tracing::warn!(%family, "family name is not a plain folder name; refusing lookup");
        return Err(FetchError::NotFound(family.to_string()));
    }
    let dir = root.join(family);
    if !dir.is_dir() {
        return Err(FetchError::NotFound(family.to_string()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_font_file(path))
        .collect();
    files.sort();

    let mut faces = Vec::with_capacity(files.len());
    for path in files {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        faces.push(FontFace {
            family: family.to_string(),
            weight: weight_from_file_name(family, stem),
            data: std::fs::read(&path)?,
        });
    }

    if faces.is_empty() {
        return Err(FetchError::Malformed(format!(
            "no font files in {}",
            dir.display()
        )));
    }
    Ok(faces)
}

/// A family must name exactly one folder directly under the root.
fn is_plain_family_name(family: &str) -> bool {
    let trimmed = family.trim();
    !trimmed.is_empty()
        && trimmed != "."
        && trimmed != ".."
        && !family.contains(['/', '\\', '\0'])
        && !Path::new(family).has_root()
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
}

/// Infer a CSS weight from a font file name such as `OpenSans-SemiBold`.
///
/// Only the style part of the name is read: the text after the last `-` or
/// `_`, or else whatever follows the family name. `BlackOpsOne-Regular` is
/// therefore 400, not 900.
pub fn weight_from_file_name(family: &str, stem: &str) -> FontWeight {
    let style = match stem.rfind(['-', '_']) {
        Some(at) => alphanumeric_lower(&stem[at + 1..]),
        None => {
            let name = alphanumeric_lower(stem);
            let family = alphanumeric_lower(family);
            match name.strip_prefix(family.as_str()) {
                Some(rest) => rest.to_string(),
                None => name,
            }
        }
    };
    style_weight(&style)
}

fn alphanumeric_lower(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase()
}

fn style_weight(style: &str) -> FontWeight {

    // Compound names first so "semibold" does not match "bold".
    const NAMED: [(&str, u16); 15] = [
        ("extralight", 200),
        ("ultralight", 200),
        ("semibold", 600),
        ("demibold", 600),
        ("extrabold", 800),
        ("ultrabold", 800),
        ("hairline", 100),
        ("thin", 100),
        ("light", 300),
        ("medium", 500),
        ("bold", 700),
        ("black", 900),
        ("heavy", 900),
        ("regular", 400),
        ("book", 400),
    ];
    if let Some((_, weight)) = NAMED.iter().find(|(word, _)| style.contains(word)) {
        return FontWeight::clamped(i64::from(*weight));
    }

    let digits: String = style
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits
        .parse::<u16>()
        .ok()
        .and_then(|w| FontWeight::try_from(w).ok())
        .unwrap_or_default()
}
