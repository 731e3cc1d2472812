//! Rule packs: every layer of a rules directory, validated together.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::parser::{ParseError, parse_file};
use crate::prefs::LanguageTag;
use crate::rules::{Layer, LayerKind, LoadError, ResolvedRules};

/// The rule pack compiled into the library.
const BUILTIN_SOURCES: &[(&str, &str)] = &[
    ("base.rules", include_str!("../../rules/base.rules")),
    ("en/language.rules", include_str!("../../rules/en/language.rules")),
    ("en/ClearSpeak.rules", include_str!("../../rules/en/ClearSpeak.rules")),
    ("en/SimpleSpeak.rules", include_str!("../../rules/en/SimpleSpeak.rules")),
    ("de/language.rules", include_str!("../../rules/de/language.rules")),
    ("de/ClearSpeak.rules", include_str!("../../rules/de/ClearSpeak.rules")),
    ("de/SimpleSpeak.rules", include_str!("../../rules/de/SimpleSpeak.rules")),
];

const BASE_FILE: &str = "base.rules";
const LANGUAGE_FILE: &str = "language.rules";
const RULES_EXTENSION: &str = "rules";

/// The layers of one language directory.
#[derive(Debug, Default)]
struct LanguageLayers {
    language: Option<Layer>,
    styles: BTreeMap<String, Layer>,
}

/// A fully loaded and validated set of rule layers.
///
/// Packs are immutable once built. Resolution results are memoized per
/// (language, style), so a fresh pack always starts with a fresh cache.
///
/// # Example
///
/// ```
/// use mathspeak::rules::RulePack;
///
/// let pack = RulePack::from_sources([
///     ("base.rules", r#"@version = "1.0.0"; any = * => "{$children}";"#),
///     ("en/language.rules", r#"ident = mi => "{text}";"#),
/// ]).unwrap();
///
/// assert_eq!(pack.version(), "1.0.0");
/// assert_eq!(pack.languages().collect::<Vec<_>>(), vec!["en"]);
/// ```
#[derive(Debug)]
pub struct RulePack {
    root: Option<PathBuf>,
    version: String,
    base: Layer,
    languages: BTreeMap<String, LanguageLayers>,
    resolved: Mutex<HashMap<(String, String), Arc<ResolvedRules>>>,
}

impl RulePack {
    /// Load a pack from a rules directory.
    ///
    /// The directory must contain `base.rules`. Each subdirectory is a
    /// language whose `language.rules` file is the language layer and whose
    /// other `.rules` files are speech-style layers named after the file.
    pub fn load(dir: impl AsRef<Path>) -> Result<RulePack, LoadError> {
        let dir = dir.as_ref();
        let base_path = dir.join(BASE_FILE);
        if !base_path.is_file() {
            return Err(LoadError::MissingPack {
                path: dir.to_path_buf(),
            });
        }

        let mut sources = vec![(PathBuf::from(BASE_FILE), read_source(&base_path)?)];
        for language_dir in sorted_entries(dir)? {
            if !language_dir.is_dir() {
                continue;
            }
            let Some(language) = language_dir.file_name() else {
                continue;
            };
            for file in sorted_entries(&language_dir)? {
                if file.is_file() && file.extension().is_some_and(|ext| ext == RULES_EXTENSION) {
                    let Some(name) = file.file_name() else {
                        continue;
                    };
                    let relative = Path::new(language).join(name);
                    sources.push((relative, read_source(&file)?));
                }
            }
        }

        let pack = Self::assemble(Some(dir), sources)?;
        debug!(
            path = %dir.display(),
            version = %pack.version,
            languages = pack.languages.len(),
            "loaded rule pack"
        );
        Ok(pack)
    }

    /// Build a pack from in-memory files keyed by their path relative to the
    /// pack root, e.g. `base.rules` or `de/ClearSpeak.rules`.
    pub fn from_sources<P, S>(
        sources: impl IntoIterator<Item = (P, S)>,
    ) -> Result<RulePack, LoadError>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let sources = sources
            .into_iter()
            .map(|(path, text)| (path.as_ref().to_path_buf(), text.as_ref().to_string()))
            .collect();
        Self::assemble(None, sources)
    }

    /// The default English and German pack compiled into the library.
    pub fn builtin() -> Result<RulePack, LoadError> {
        Self::from_sources(BUILTIN_SOURCES.iter().copied())
    }

    fn assemble(
        root: Option<&Path>,
        sources: Vec<(PathBuf, String)>,
    ) -> Result<RulePack, LoadError> {
        let mut base = None;
        let mut languages: BTreeMap<String, LanguageLayers> = BTreeMap::new();

        for (relative, text) in sources {
            let origin = root.map_or_else(|| relative.clone(), |root| root.join(&relative));
            let Some(kind) = classify(&relative) else {
                warn!(path = %relative.display(), "ignoring rule file outside the pack layout");
                continue;
            };
            let items = parse_file(&text).map_err(|e| syntax_error(&origin, &e))?;
            let layer = Layer::from_items(kind.clone(), &origin, items)?;
            match kind {
                LayerKind::Base => base = Some(layer),
                LayerKind::Language(language) => {
                    languages.entry(language).or_default().language = Some(layer);
                }
                LayerKind::Style { language, style } => {
                    languages
                        .entry(language)
                        .or_default()
                        .styles
                        .insert(style, layer);
                }
            }
        }

        let missing = || LoadError::MissingPack {
            path: root.map_or_else(|| PathBuf::from("<memory>"), Path::to_path_buf),
        };
        let base = base.ok_or_else(missing)?;
        let Some(version) = base.directive("version").map(str::to_string) else {
            return Err(LoadError::invalid(
                base.origin(),
                1,
                "base.rules must declare '@version'",
            ));
        };

        Ok(RulePack {
            root: root.map(Path::to_path_buf),
            version,
            base,
            languages,
            resolved: Mutex::new(HashMap::new()),
        })
    }

    /// Directory the pack was loaded from, if it came from disk.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// The pack's `@version`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Language directories in the pack, sorted.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// Speech styles defined for a language directory, sorted.
    pub fn styles(&self, language: &str) -> Vec<&str> {
        self.languages
            .get(language)
            .map(|layers| layers.styles.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every layer in the pack: base first, then each language's layers.
    pub fn layers(&self) -> Vec<&Layer> {
        let mut layers = vec![&self.base];
        for language in self.languages.values() {
            layers.extend(language.language.as_ref());
            layers.extend(language.styles.values());
        }
        layers
    }

    /// Whether the pack has rules for this language or its primary subtag.
    pub fn supports_language(&self, language: &LanguageTag) -> bool {
        self.language_dir(language.as_str()).is_some()
    }

    /// Pick the language directory for a code: exact match first, then the
    /// primary subtag.
    fn language_dir(&self, language: &str) -> Option<&str> {
        let exact = self
            .languages
            .keys()
            .find(|dir| dir.eq_ignore_ascii_case(language));
        let primary = || {
            let primary = language.split('-').next().unwrap_or(language);
            self.languages
                .keys()
                .find(|dir| dir.eq_ignore_ascii_case(primary))
        };
        exact.or_else(primary).map(String::as_str)
    }

    /// Rules in effect for a language and speech style.
    ///
    /// Unknown languages fall back to the base layer alone and unknown styles
    /// to the language layer without a style layer.
    pub fn resolve(&self, language: &str, style: &str) -> Arc<ResolvedRules> {
        let key = (language.to_string(), style.to_string());
        let mut cache = self.resolved.lock().expect("resolve cache lock poisoned");
        if let Some(resolved) = cache.get(&key) {
            return Arc::clone(resolved);
        }

        debug!(language, style, "resolving rules");
        let mut layers = vec![&self.base];
        let mut used_language = None;
        let mut used_style = None;
        match self.language_dir(language) {
            Some(dir) => {
                used_language = Some(dir.to_string());
                if let Some(layers_for) = self.languages.get(dir) {
                    layers.extend(layers_for.language.as_ref());
                    match layers_for.styles.get(style) {
                        Some(layer) => {
                            layers.push(layer);
                            used_style = Some(style.to_string());
                        }
                        None => debug!(language = dir, style, "no style layer"),
                    }
                }
            }
            None => warn!(language, "no rules for language, using base rules only"),
        }

        let resolved = Arc::new(ResolvedRules::from_layers(used_language, used_style, &layers));
        cache.insert(key, Arc::clone(&resolved));
        resolved
    }
}

/// Map a pack-relative path to the layer it defines.
fn classify(relative: &Path) -> Option<LayerKind> {
    let components: Vec<&str> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<_>>()?;
    match components.as_slice() {
        [BASE_FILE] => Some(LayerKind::Base),
        [language, LANGUAGE_FILE] => Some(LayerKind::Language((*language).to_string())),
        [language, file] => {
            let style = file.strip_suffix(".rules")?;
            Some(LayerKind::Style {
                language: (*language).to_string(),
                style: style.to_string(),
            })
        }
        _ => None,
    }
}

fn syntax_error(origin: &Path, error: &ParseError) -> LoadError {
    let (line, column, message) = error.location();
    LoadError::Syntax {
        origin: origin.to_path_buf(),
        line,
        column,
        message,
    }
}

fn read_source(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_error = |e: io::Error| LoadError::Io {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        entries.push(entry.map_err(io_error)?.path());
    }
    entries.sort();
    Ok(entries)
}
