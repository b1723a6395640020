//! Bulk import of role prompts from CSV
//!
//! The expected file has an `act` column (the role, used as the template
//! name) and a `prompt` column (the template text). Additional columns are
//! ignored. Prompt text must parse as a template; rows that do not are
//! skipped.

use crate::error::{PromptdeckError, Result};
use crate::library::{NewTemplate, TemplateLibrary};
use crate::storage::TemplateStore;
use crate::template::TemplateCompiler;

use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Topic assigned to every imported template
pub const ROLE_PROMPTS_TOPIC: &str = "Role Prompts";

#[derive(Debug, Deserialize)]
struct RolePromptRow {
    act: String,
    prompt: String,
}

/// Counts reported after an import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows stored as new templates
    pub imported: usize,
    /// Rows whose name already existed, that failed validation, or whose
    /// prompt is not a valid template
    pub skipped: Vec<String>,
}

/// Import role prompts from a CSV file
///
/// # Errors
///
/// Returns `Import` if the file cannot be opened or a row cannot be parsed,
/// and `Storage` if a write fails. Rows imported before the error stay
/// stored.
pub fn import_csv_file<S: TemplateStore>(
    library: &TemplateLibrary<S>,
    compiler: &TemplateCompiler,
    path: &Path,
) -> Result<ImportSummary> {
    let file = std::fs::File::open(path).map_err(|e| {
        PromptdeckError::Import(format!("Failed to open {}: {}", path.display(), e))
    })?;
    tracing::info!("Importing role prompts from {}", path.display());
    import_csv(library, compiler, file)
}

/// Import role prompts from any CSV source
///
/// # Errors
///
/// See [`import_csv_file`].
pub fn import_csv<S: TemplateStore, R: Read>(
    library: &TemplateLibrary<S>,
    compiler: &TemplateCompiler,
    reader: R,
) -> Result<ImportSummary> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Fields).from_reader(reader);
    let mut summary = ImportSummary::default();

    for (line, row) in csv_reader.deserialize::<RolePromptRow>().enumerate() {
        let row = row.map_err(|e| PromptdeckError::Import(format!("Row {}: {}", line + 1, e)))?;

        let new = NewTemplate {
            topic: ROLE_PROMPTS_TOPIC.to_string(),
            name: row.act.clone(),
            purpose: format!("Tells the model to act as {}", row.act),
            template: row.prompt,
            use_web_search: false,
        };

        let created = compiler
            .extract_variables(&new.template)
            .and_then(|_| library.create(new));
        match created {
            Ok(_) => summary.imported += 1,
            Err(e) if e.is_validation() => {
                tracing::warn!("Skipping '{}': {}", row.act, e);
                summary.skipped.push(row.act);
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        "Imported {} role prompts, skipped {}",
        summary.imported,
        summary.skipped.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::PlaceholderSyntax;
    use crate::test_utils::{assert_error_contains, temp_store};

    fn compiler() -> TemplateCompiler {
        TemplateCompiler::default()
    }

    const CSV: &str = "act,prompt\n\
Linux Terminal,I want you to act as a linux terminal.\n\
\"Travel Guide\",\"I want you to act as a travel guide, starting in {city}.\"\n";

    #[test]
    fn test_import_creates_role_prompts() {
        let (_dir, store) = temp_store();
        let library = TemplateLibrary::new(store);

        let summary = import_csv(&library, &compiler(), CSV.as_bytes()).unwrap();
        assert_eq!(summary.imported, 2);
        assert!(summary.skipped.is_empty());

        let guide = library.get("Travel Guide").unwrap();
        assert_eq!(guide.topic, ROLE_PROMPTS_TOPIC);
        assert_eq!(guide.purpose, "Tells the model to act as Travel Guide");
        assert_eq!(
            guide.template,
            "I want you to act as a travel guide, starting in {city}."
        );
        assert!(!guide.use_web_search);
        assert_eq!(library.topics().unwrap(), vec![ROLE_PROMPTS_TOPIC]);
    }

    #[test]
    fn test_import_twice_skips_existing_names() {
        let (_dir, store) = temp_store();
        let library = TemplateLibrary::new(store);

        import_csv(&library, &compiler(), CSV.as_bytes()).unwrap();
        let summary = import_csv(&library, &compiler(), CSV.as_bytes()).unwrap();

        assert_eq!(summary.imported, 0);
        assert_eq!(summary.skipped, vec!["Linux Terminal", "Travel Guide"]);
        assert_eq!(library.list(None).unwrap().len(), 2);
    }

    #[test]
    fn test_import_skips_empty_act() {
        let (_dir, store) = temp_store();
        let library = TemplateLibrary::new(store);

        let summary = import_csv(&library, &compiler(), "act,prompt\n,orphan prompt\n".as_bytes()).unwrap();
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.skipped, vec![String::new()]);
    }

    #[test]
    fn test_import_missing_column_fails() {
        let (_dir, store) = temp_store();
        let library = TemplateLibrary::new(store);

        let result = import_csv(&library, &compiler(), "role,text\nA,B\n".as_bytes());
        assert_error_contains(result, "Row 1");
    }

    #[test]
    fn test_import_missing_file_fails() {
        let (dir, store) = temp_store();
        let library = TemplateLibrary::new(store);

        let result = import_csv_file(&library, &compiler(), &dir.path().join("nope.csv"));
        assert_error_contains(result, "Failed to open");
    }

    #[test]
    fn test_import_skips_prompts_that_do_not_parse() {
        let (_dir, store) = temp_store();
        let library = TemplateLibrary::new(store);
        let csv = "act,prompt\n\
JavaScript Console,\"Reply inside curly brackets {like this}.\"\n\
Poet,Write a poem about {subject}.\n";

        let summary = import_csv(&library, &compiler(), csv.as_bytes()).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, vec!["JavaScript Console"]);
        assert!(matches!(
            library.get("JavaScript Console"),
            Err(PromptdeckError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_import_uses_configured_delimiters() {
        let (_dir, store) = temp_store();
        let library = TemplateLibrary::new(store);
        let compiler = TemplateCompiler::new(PlaceholderSyntax::new('<', '>').unwrap());
        let csv = "act,prompt\nJSON Bot,\"Answer with {\"\"ok\"\": true} about <topic>\"\n";

        let summary = import_csv(&library, &compiler, csv.as_bytes()).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(
            compiler
                .extract_variables(&library.get("JSON Bot").unwrap().template)
                .unwrap(),
            vec!["topic"]
        );
    }
}
