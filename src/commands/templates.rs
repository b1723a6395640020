//! Template management commands
//!
//! Thin presentation layer over [`TemplateLibrary`]: every subcommand does
//! its work through the library and prints the outcome.

use crate::cli::TemplateCommand;
use crate::commands::{compiler, open_library};
use crate::config::Config;
use crate::error::{PromptdeckError, Result};
use crate::import::import_csv_file;
use crate::library::{NewTemplate, TemplateChanges, TemplateLibrary};
use crate::storage::{PromptTemplate, TemplateStore};

use colored::Colorize;
use prettytable::{format, row, Table};
use std::path::{Path, PathBuf};

/// Longest purpose shown in the list table
const PURPOSE_WIDTH: usize = 50;

/// Handle `templates` subcommands
pub fn handle_templates(config: &Config, command: TemplateCommand) -> Result<()> {
    let library = open_library(config)?;

    match command {
        TemplateCommand::List { topic } => {
            let templates = library.list(topic.as_deref())?;
            if templates.is_empty() {
                println!("{}", "No templates found.".yellow());
                return Ok(());
            }
            print_template_table(&templates);
        }
        TemplateCommand::Topics => {
            let topics = library.topics()?;
            if topics.is_empty() {
                println!("{}", "No topics yet.".yellow());
            }
            for topic in topics {
                println!("{}", topic);
            }
        }
        TemplateCommand::Show { name } => {
            let template = library.get(&name)?;
            print_template(&template);
        }
        TemplateCommand::Vars { name } => {
            let template = library.get(&name)?;
            let vars = compiler(config)?.extract_variables(&template.template)?;
            if vars.is_empty() {
                println!("{}", "Template has no placeholders.".yellow());
            }
            for var in vars {
                println!("{}", var);
            }
        }
        TemplateCommand::Create {
            name,
            topic,
            purpose,
            template,
            file,
            web_search,
        } => {
            let text = template_text(template, file)?.unwrap_or_default();
            let created = create_checked(
                &library,
                config,
                NewTemplate {
                    topic,
                    name,
                    purpose,
                    template: text,
                    use_web_search: web_search,
                },
            )?;
            println!(
                "{}",
                format!("Template '{}' saved successfully!", created.name).green()
            );
        }
        TemplateCommand::Update {
            name,
            new_name,
            topic,
            purpose,
            template,
            file,
            web_search,
        } => {
            let text = template_text(template, file)?;
            if let Some(text) = &text {
                compiler(config)?.extract_variables(text)?;
            }
            let updated = library.update(
                &name,
                TemplateChanges {
                    topic,
                    name: new_name,
                    purpose,
                    template: text,
                    use_web_search: web_search,
                },
            )?;
            println!(
                "{}",
                format!("Template '{}' updated successfully!", updated.name).green()
            );
        }
        TemplateCommand::Delete { name } => {
            let deleted = library.delete(&name)?;
            println!("{}", format!("Template '{}' deleted.", deleted.name).green());
        }
        TemplateCommand::Import { path } => {
            let summary = import_csv_file(&library, &compiler(config)?, &path)?;
            println!(
                "{}",
                format!("Imported {} templates.", summary.imported).green()
            );
            if !summary.skipped.is_empty() {
                println!(
                    "{}",
                    format!(
                        "Skipped {} existing or invalid: {}",
                        summary.skipped.len(),
                        summary.skipped.join(", ")
                    )
                    .yellow()
                );
            }
        }
    }

    Ok(())
}

/// Create a template after checking its placeholders parse
fn create_checked<S: TemplateStore>(
    library: &TemplateLibrary<S>,
    config: &Config,
    new: NewTemplate,
) -> Result<PromptTemplate> {
    compiler(config)?.extract_variables(&new.template)?;
    library.create(new)
}

/// Resolve template text given inline or as a file
fn template_text(inline: Option<String>, file: Option<PathBuf>) -> Result<Option<String>> {
    match (inline, file) {
        (Some(text), _) => Ok(Some(text)),
        (None, Some(path)) => read_template_file(&path).map(Some),
        (None, None) => Ok(None),
    }
}

fn read_template_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        PromptdeckError::InvalidTemplate(format!(
            "Cannot read template file {}: {}",
            path.display(),
            e
        ))
    })
}

fn print_template_table(templates: &[PromptTemplate]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row![
        "Name".bold(),
        "Topic".bold(),
        "Web".bold(),
        "Purpose".bold()
    ]);

    for template in templates {
        let web = if template.use_web_search { "yes" } else { "no" };
        table.add_row(row![
            template.name.cyan(),
            template.topic,
            web,
            truncate(&template.purpose, PURPOSE_WIDTH)
        ]);
    }

    println!();
    table.printstd();
    println!();
}

fn print_template(template: &PromptTemplate) {
    println!("{} {}", "Name:".bold(), template.name.cyan());
    println!("{} {}", "Topic:".bold(), template.topic);
    println!("{} {}", "Purpose:".bold(), template.purpose);
    println!("{} {}", "Web search:".bold(), template.use_web_search);
    println!("{}", "Template:".bold());
    println!("{}", template.template);
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
