//! "Add aliases with inflections" for one note.
//!
//! Reads the note, settles the run options (settings, then the note's
//! remembered values, then explicit overrides, then the user's confirmation),
//! computes the aliases and writes the metadata block back only when the
//! text actually changes.

use super::OptionsPrompt;
use crate::aliases::compute_aliases;
use crate::inflectors::Inflector;
use crate::models::Settings;
use crate::notes::file_ops::{note_name, read_note, write_note};
use crate::notes::frontmatter::{
    self, ALIASES_KEY, INCLUDE_PLURAL_KEY, INFLECTABLE_ALIASES_KEY, INFLECT_FILE_NAME_KEY,
};
use crate::notes::Frontmatter;
use alinf_types::{AliasRunReport, InflectionOptions, Notice};
use std::path::Path;

/// Options given explicitly by the caller; `None` keeps the resolved value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub include_plural: Option<bool>,
    pub inflect_filename: Option<bool>,
}

/// Options proposed for a note before confirmation.
pub fn resolve_options(
    settings: &Settings,
    frontmatter: &Frontmatter,
    overrides: OptionOverrides,
) -> InflectionOptions {
    let defaults = settings.default_options();
    InflectionOptions {
        include_plural: overrides
            .include_plural
            .or_else(|| frontmatter.get_bool(INCLUDE_PLURAL_KEY))
            .unwrap_or(defaults.include_plural),
        inflect_filename: overrides
            .inflect_filename
            .or_else(|| frontmatter.get_bool(INFLECT_FILE_NAME_KEY))
            .unwrap_or(defaults.inflect_filename),
    }
}

/// Save the current aliases as the names to inflect, unless a snapshot exists.
///
/// The key is written even when there are no aliases, so it also marks the
/// note as processed: later runs never mistake inflected forms for originals.
fn snapshot_inflectable_aliases(frontmatter: &mut Frontmatter) {
    if frontmatter.contains_key(INFLECTABLE_ALIASES_KEY) {
        return;
    }
    let aliases = frontmatter.aliases();
    log::debug!("[ADD_ALIASES] Saving {} alias(es) as inflectable", aliases.len());
    frontmatter.set_string_list(INFLECTABLE_ALIASES_KEY, &aliases);
}

/// Run the operation on the note at `path`.
///
/// Returns `None` when the user cancels at the confirmation step. Structural
/// failures (unreadable note, failed write) come back as a report holding
/// only `Notice::Failed`; the details go to the error log.
pub async fn run(
    path: &Path,
    settings: &Settings,
    inflector: &dyn Inflector,
    prompt: &dyn OptionsPrompt,
    overrides: OptionOverrides,
) -> Option<AliasRunReport> {
    let name = note_name(path).unwrap_or_default();
    match execute(path, &name, settings, inflector, prompt, overrides).await {
        Ok(report) => report,
        Err(e) => {
            log::error!("[ADD_ALIASES] Error fetching inflections: {}", e);
            Some(AliasRunReport {
                note_name: name,
                options: settings.default_options(),
                aliases: Vec::new(),
                changed: false,
                notices: vec![Notice::Failed],
            })
        }
    }
}

async fn execute(
    path: &Path,
    name: &str,
    settings: &Settings,
    inflector: &dyn Inflector,
    prompt: &dyn OptionsPrompt,
    overrides: OptionOverrides,
) -> Result<Option<AliasRunReport>, String> {
    if name.is_empty() {
        return Err(format!("Invalid note path: {:?}", path));
    }
    let read = || read_note(path).map_err(|e| format!("Failed to read {:?}: {}", path, e));
    // A block we cannot parse is left alone rather than overwritten.
    let parse = |document: &str| {
        frontmatter::try_extract(document).map_err(|e| format!("{:?}: {}", path, e))
    };

    let document = read()?;
    let proposed = resolve_options(settings, &parse(&document)?, overrides);

    let options = if settings.confirm_before_apply {
        match prompt.confirm(name, proposed) {
            Some(options) => options,
            None => {
                log::info!("[ADD_ALIASES] Cancelled for {:?}", name);
                return Ok(None);
            }
        }
    } else {
        proposed
    };

    // The note may have been edited while the user was answering.
    let document = read()?;
    let mut fm = parse(&document)?;
    snapshot_inflectable_aliases(&mut fm);

    let computation = compute_aliases(name, &fm, &options, inflector).await;

    fm.set_string_list(ALIASES_KEY, &computation.aliases);
    fm.set_bool(INCLUDE_PLURAL_KEY, options.include_plural);
    fm.set_bool(INFLECT_FILE_NAME_KEY, options.inflect_filename);

    let (updated, changed) = frontmatter::apply_metadata(&document, &fm)?;
    if changed {
        write_note(path, &updated).map_err(|e| format!("Failed to write {:?}: {}", path, e))?;
        log::info!(
            "[ADD_ALIASES] Updated {:?} with {} alias(es)",
            path,
            computation.aliases.len()
        );
    } else {
        log::info!("[ADD_ALIASES] {:?} already up to date", path);
    }

    let mut notices = Vec::new();
    if let Some(message) = computation.error_notice() {
        notices.push(Notice::InflectorErrors(message));
    }
    notices.push(if changed {
        Notice::AliasesUpdated
    } else {
        Notice::AlreadyInflected
    });

    Ok(Some(AliasRunReport {
        note_name: name.to_string(),
        options,
        aliases: computation.aliases,
        changed,
        notices,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::AcceptDefaults;
    use crate::inflectors::StubInflector;
    use crate::inflectors::tests::ScriptedInflector;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn unconfirmed() -> Settings {
        Settings {
            confirm_before_apply: false,
            ..Settings::default()
        }
    }

    /// Records what it was asked and answers with fixed options (or cancels).
    struct FixedPrompt {
        answer: Option<InflectionOptions>,
        seen: std::sync::Mutex<Option<InflectionOptions>>,
        asked: AtomicUsize,
    }

    impl FixedPrompt {
        fn new(answer: Option<InflectionOptions>) -> Self {
            Self {
                answer,
                seen: std::sync::Mutex::new(None),
                asked: AtomicUsize::new(0),
            }
        }
    }

    impl OptionsPrompt for FixedPrompt {
        fn confirm(&self, _note_name: &str, proposed: InflectionOptions) -> Option<InflectionOptions> {
            self.asked.fetch_add(1, Ordering::SeqCst);
            *self.seen.lock().unwrap() = Some(proposed);
            self.answer
        }
    }

    #[test]
    fn test_resolve_options_layering() {
        let settings = Settings {
            include_plural: false,
            ..Settings::default()
        };
        let mut fm = Frontmatter::new();
        let none = OptionOverrides::default();

        let opts = resolve_options(&settings, &fm, none);
        assert!(!opts.include_plural);
        assert!(opts.inflect_filename);

        fm.set_bool(INCLUDE_PLURAL_KEY, true);
        fm.set_bool(INFLECT_FILE_NAME_KEY, false);
        let opts = resolve_options(&settings, &fm, none);
        assert!(opts.include_plural);
        assert!(!opts.inflect_filename);

        let forced = OptionOverrides {
            include_plural: Some(false),
            inflect_filename: None,
        };
        let opts = resolve_options(&settings, &fm, forced);
        assert!(!opts.include_plural);
        assert!(!opts.inflect_filename);
    }

    #[tokio::test]
    async fn test_note_without_block_gets_one() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("стол.md");
        std::fs::write(&path, "Body text\n").unwrap();

        let report = run(&path, &unconfirmed(), &StubInflector, &AcceptDefaults, OptionOverrides::default())
            .await
            .unwrap();

        assert_eq!(report.note_name, "стол");
        assert_eq!(report.aliases, names(&["стола", "столу"]));
        assert!(report.changed);
        assert_eq!(report.notices, vec![Notice::AliasesUpdated]);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("---\n"));
        assert!(written.ends_with("---\nBody text\n"));

        let fm = frontmatter::extract(&written);
        assert_eq!(fm.aliases(), names(&["стола", "столу"]));
        assert_eq!(fm.get_bool(INCLUDE_PLURAL_KEY), Some(true));
        assert_eq!(fm.get_bool(INFLECT_FILE_NAME_KEY), Some(true));
        assert_eq!(fm.inflectable_aliases(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_note_without_aliases_is_stable_across_runs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("стол.md");
        std::fs::write(&path, "Body text\n").unwrap();
        let settings = unconfirmed();

        let first = run(&path, &settings, &StubInflector, &AcceptDefaults, OptionOverrides::default())
            .await
            .unwrap();
        assert!(first.changed);
        let after_first = std::fs::read_to_string(&path).unwrap();

        let second = run(&path, &settings, &StubInflector, &AcceptDefaults, OptionOverrides::default())
            .await
            .unwrap();
        assert!(!second.changed);
        assert_eq!(second.notices, vec![Notice::AlreadyInflected]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);

        // Without the note name there is nothing left to inflect; the
        // inflected forms are never fed back in as originals.
        let inflector = ScriptedInflector::new(vec![]);
        let names_only = OptionOverrides {
            include_plural: None,
            inflect_filename: Some(false),
        };
        let third = run(&path, &settings, &inflector, &AcceptDefaults, names_only)
            .await
            .unwrap();
        assert!(inflector.calls().is_empty());
        assert!(third.aliases.is_empty());

        let fm = frontmatter::extract(&std::fs::read_to_string(&path).unwrap());
        assert_eq!(fm.inflectable_aliases(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_unparseable_block_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("стол.md");
        let original = "---\ntitle: [unclosed\nimportant: notes here\n---\nBody\n";
        std::fs::write(&path, original).unwrap();

        let inflector = ScriptedInflector::new(vec![]);
        let prompt = FixedPrompt::new(Some(InflectionOptions::default()));
        let report = run(&path, &Settings::default(), &inflector, &prompt, OptionOverrides::default())
            .await
            .unwrap();

        assert_eq!(report.notices, vec![Notice::Failed]);
        assert!(!report.changed);
        assert_eq!(prompt.asked.load(Ordering::SeqCst), 0);
        assert!(inflector.calls().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn test_second_run_is_already_inflected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("стол.md");
        std::fs::write(&path, "---\ntitle: Мебель\naliases:\n- Вася\n---\n# Стол\n").unwrap();
        let settings = unconfirmed();

        let first = run(&path, &settings, &StubInflector, &AcceptDefaults, OptionOverrides::default())
            .await
            .unwrap();
        assert!(first.changed);
        assert_eq!(first.aliases, names(&["Вася", "стола", "столу", "Васи", "Васе"]));
        let after_first = std::fs::read_to_string(&path).unwrap();

        let fm = frontmatter::extract(&after_first);
        assert_eq!(fm.inflectable_aliases(), Some(names(&["Вася"])));
        assert_eq!(fm.get("title").and_then(|v| v.as_str()), Some("Мебель"));
        assert!(after_first.ends_with("---\n# Стол\n"));

        let second = run(&path, &settings, &StubInflector, &AcceptDefaults, OptionOverrides::default())
            .await
            .unwrap();
        assert!(!second.changed);
        assert_eq!(second.aliases, first.aliases);
        assert_eq!(second.notices, vec![Notice::AlreadyInflected]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);
    }

    #[tokio::test]
    async fn test_remembered_options_are_used() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("стол.md");
        std::fs::write(
            &path,
            "---\naliases: [Вася]\nalinf-inflect-file-name: false\n---\n",
        )
        .unwrap();

        let report = run(&path, &unconfirmed(), &StubInflector, &AcceptDefaults, OptionOverrides::default())
            .await
            .unwrap();

        assert!(!report.options.inflect_filename);
        assert!(report.options.include_plural);
        // Only the alias is inflected; as the first group it keeps no base form
        assert_eq!(report.aliases, names(&["Васи", "Васе"]));
    }

    #[tokio::test]
    async fn test_prompt_sees_proposal_and_can_change_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("стол.md");
        std::fs::write(&path, "---\nalinf-include-plural: false\n---\n").unwrap();

        let chosen = InflectionOptions {
            include_plural: true,
            inflect_filename: true,
        };
        let prompt = FixedPrompt::new(Some(chosen));
        let report = run(&path, &Settings::default(), &StubInflector, &prompt, OptionOverrides::default())
            .await
            .unwrap();

        assert_eq!(prompt.asked.load(Ordering::SeqCst), 1);
        let seen = prompt.seen.lock().unwrap().unwrap();
        assert!(!seen.include_plural);
        assert_eq!(report.options, chosen);

        let fm = frontmatter::extract(&std::fs::read_to_string(&path).unwrap());
        assert_eq!(fm.get_bool(INCLUDE_PLURAL_KEY), Some(true));
    }

    #[tokio::test]
    async fn test_cancel_leaves_note_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("стол.md");
        std::fs::write(&path, "Body").unwrap();

        let prompt = FixedPrompt::new(None);
        let inflector = ScriptedInflector::new(vec![]);
        let report = run(&path, &Settings::default(), &inflector, &prompt, OptionOverrides::default()).await;

        assert!(report.is_none());
        assert!(inflector.calls().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Body");
    }

    #[tokio::test]
    async fn test_provider_failures_become_notice() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("стол.md");
        std::fs::write(&path, "---\naliases: [Вася]\n---\n").unwrap();

        let inflector = ScriptedInflector::new(vec![
            ("стол", Err("HTTP 502 Bad Gateway")),
            ("Вася", Ok(vec!["Васи"])),
        ]);
        let report = run(&path, &unconfirmed(), &inflector, &AcceptDefaults, OptionOverrides::default())
            .await
            .unwrap();

        assert_eq!(report.aliases, names(&["Вася", "Васи"]));
        assert_eq!(
            report.notices,
            vec![
                Notice::InflectorErrors(
                    "Could not get inflections for \"стол\": HTTP 502 Bad Gateway".to_string()
                ),
                Notice::AliasesUpdated,
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_note_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("нет.md");
        let inflector = ScriptedInflector::new(vec![]);

        let report = run(&path, &unconfirmed(), &inflector, &AcceptDefaults, OptionOverrides::default())
            .await
            .unwrap();

        assert_eq!(report.note_name, "нет");
        assert_eq!(report.notices, vec![Notice::Failed]);
        assert!(!report.changed);
        assert!(inflector.calls().is_empty());
        assert!(!path.exists());
    }
}
