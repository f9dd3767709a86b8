//! Alias resolution.
//!
//! Decides which names of a note get inflected, asks the inflector once per
//! name, and folds the answers into the note's final alias list.

use crate::inflectors::{InflectionBatch, Inflector, dedup_forms};
use crate::notes::Frontmatter;
use alinf_types::InflectionOptions;

/// Separator between provider messages in the single error notice
const ERROR_SEPARATOR: &str = "\n\n";

/// Inflected names in the order they were asked for, with the forms returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InflectionGroups {
    entries: Vec<(String, Vec<String>)>,
}

impl InflectionGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the forms of `name`. A repeated name keeps its first position.
    pub fn insert(&mut self, name: String, forms: Vec<String>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = forms,
            None => self.entries.push((name, forms)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, forms)| forms.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, forms)| (name.as_str(), forms.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of one resolution run.
#[derive(Debug, Clone, Default)]
pub struct AliasComputation {
    pub aliases: Vec<String>,
    pub groups: InflectionGroups,
    /// Inflector failures of this run, one message each
    pub errors: Vec<String>,
}

impl AliasComputation {
    /// All failures joined into one notice text, if there were any.
    pub fn error_notice(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join(ERROR_SEPARATOR))
        }
    }
}

/// Names to inflect: the note name (when enabled), then the saved
/// pre-inflection aliases, or the current aliases if nothing was saved yet.
pub fn original_names(
    canonical: &str,
    frontmatter: &Frontmatter,
    options: &InflectionOptions,
) -> Vec<String> {
    let mut names = Vec::new();
    if options.inflect_filename {
        names.push(canonical.to_string());
    }
    match frontmatter.inflectable_aliases() {
        Some(saved) => names.extend(saved),
        None => names.extend(frontmatter.aliases()),
    }
    dedup_forms(names)
}

/// Fold inflection groups into the alias list.
///
/// The first group's own name is left out (it is the entry point, normally
/// the note name), later group names stay as aliases in their base form, and
/// every returned form follows. The note name itself never becomes an alias.
pub fn final_aliases(canonical: &str, groups: &InflectionGroups) -> Vec<String> {
    let base_names = groups.names().skip(1).map(str::to_string);
    let inflected = groups
        .iter()
        .flat_map(|(_, forms)| forms.iter().cloned());

    dedup_forms(
        base_names
            .chain(inflected)
            .filter(|alias| alias != canonical),
    )
}

/// Compute the aliases of a note.
///
/// Inflector calls are made one after another; a name that already showed up
/// as an inflected form of an earlier name is not sent again.
pub async fn compute_aliases(
    canonical: &str,
    frontmatter: &Frontmatter,
    options: &InflectionOptions,
    inflector: &dyn Inflector,
) -> AliasComputation {
    let names = original_names(canonical, frontmatter, options);
    log::debug!("[ALIASES] Names to inflect for {:?}: {:?}", canonical, names);

    let mut batch = InflectionBatch::new(inflector);
    let mut groups = InflectionGroups::new();
    let mut collected: Vec<String> = Vec::new();

    for name in names {
        if collected.contains(&name) {
            log::debug!("[ALIASES] Skipping {:?}, already an inflected form", name);
            continue;
        }
        let forms = batch.get_inflections(&name, options).await;
        collected.extend(forms.iter().cloned());
        groups.insert(name, forms);
    }

    let errors = batch.into_errors();
    let aliases = final_aliases(canonical, &groups);
    log::info!(
        "[ALIASES] {:?}: {} name(s) inflected, {} alias(es), {} failure(s)",
        canonical,
        groups.len(),
        aliases.len(),
        errors.len()
    );

    AliasComputation {
        aliases,
        groups,
        errors,
    }
}
