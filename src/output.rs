//! CLI output formatting.
//!
//! Each command has a `format_*` function returning `Vec<String>` for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Pages
//!
//! ```text
//! click
//!     001 click_macro (click:macro)
//! snap
//!     001 snap_longexposure (snap:longexposure)
//!         Title: Long Exposure
//! ```
//!
//! ## Scripts
//!
//! ```text
//! == Feature
//! Congratulations @alice ...
//!
//! == Comment
//! (no template)
//! ```

use crate::catalog::{PageCatalog, TemplatePageEntry};
use crate::naming::parse_template_name;
use crate::placeholders::{PlaceholderFamily, PlaceholderTracker, ScriptSlot};
use crate::session::Scripts;
use crate::validation::{FieldValidation, GatedField, ValidationResult};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn slot_heading(slot: ScriptSlot) -> &'static str {
    match slot {
        ScriptSlot::Feature => "Feature",
        ScriptSlot::Comment => "Comment",
        ScriptSlot::OriginalPost => "Original post",
    }
}

// ============================================================================
// Pages
// ============================================================================

/// Pages grouped by hub, in catalog order. Display fields that differ from
/// the page name are shown as context lines.
pub fn format_pages(catalog: &PageCatalog, hub: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    for name in catalog.hubs() {
        if hub.is_some_and(|h| h != name) {
            continue;
        }
        lines.push(name.to_string());
        for (i, page) in catalog.pages_for_hub(name).enumerate() {
            lines.push(format!(
                "{}{} {} ({})",
                indent(1),
                format_index(i + 1),
                page.display_name(),
                page.id()
            ));
            for (label, value) in [
                ("Page name", page.page_name()),
                ("Title", page.title()),
                ("Hashtag", page.hash_tag()),
            ] {
                if value != page.name() {
                    lines.push(format!("{}{}: {}", indent(2), label, value));
                }
            }
        }
    }
    if lines.is_empty() {
        lines.push("No pages loaded".to_string());
    }
    lines
}

pub fn print_pages(catalog: &PageCatalog, hub: Option<&str>) {
    for line in format_pages(catalog, hub) {
        println!("{}", line);
    }
}

// ============================================================================
// Templates
// ============================================================================

/// Template names for one page, flagging names outside the convention.
pub fn format_templates(page: &TemplatePageEntry) -> Vec<String> {
    let mut lines = vec![page.name.clone()];
    for (i, template) in page.templates.iter().enumerate() {
        let mut line = format!("{}{} {}", indent(1), format_index(i + 1), template.name);
        match parse_template_name(&template.name) {
            None => line.push_str("  [unknown kind]"),
            Some(parsed) if !parsed.unknown.is_empty() => {
                line.push_str(&format!("  [unknown qualifiers: {}]", parsed.unknown.join(", ")));
            }
            Some(_) => {}
        }
        lines.push(line);
    }
    lines
}

pub fn print_templates(page: &TemplatePageEntry) {
    for line in format_templates(page) {
        println!("{}", line);
    }
}

// ============================================================================
// Scripts
// ============================================================================

/// The three scripts under headings, plus any placeholders left without a value.
pub fn format_scripts(scripts: &Scripts, placeholders: &PlaceholderTracker) -> Vec<String> {
    let mut lines = Vec::new();
    for slot in ScriptSlot::ALL {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("== {}", slot_heading(slot)));
        let text = scripts.get(slot);
        if text.is_empty() {
            lines.push("(no template)".to_string());
        } else {
            lines.extend(text.lines().map(str::to_string));
        }
        let missing = format_missing_placeholders(placeholders, slot);
        if !missing.is_empty() {
            lines.push(String::new());
            lines.extend(missing);
        }
    }
    lines
}

/// Placeholders in `slot` whose value is still empty.
pub fn format_missing_placeholders(placeholders: &PlaceholderTracker, slot: ScriptSlot) -> Vec<String> {
    let mut lines = Vec::new();
    for family in PlaceholderFamily::ALL {
        for p in placeholders.map(slot, family).iter() {
            if p.value.trim().is_empty() {
                lines.push(format!("{}Missing: {}", indent(1), family.token(&p.name)));
            }
        }
    }
    lines
}

pub fn print_scripts(scripts: &Scripts, placeholders: &PlaceholderTracker) {
    for line in format_scripts(scripts, placeholders) {
        println!("{}", line);
    }
}

// ============================================================================
// Validation
// ============================================================================

fn result_line(label: &str, result: &ValidationResult) -> String {
    format!("{}{}: {}", indent(1), label, result)
}

/// One line per gated field, plus the two aggregate gates.
pub fn format_validation(validation: &FieldValidation) -> Vec<String> {
    let mut lines = vec!["Fields".to_string()];
    for field in GatedField::ALL {
        lines.push(result_line(field.label(), validation.get(field)));
    }
    lines.push(result_line("New membership", &validation.new_membership));
    lines.push(String::new());
    lines.push(format!(
        "Scripts: {}",
        if validation.can_copy_scripts() { "ready" } else { "blocked" }
    ));
    lines.push(format!(
        "New membership script: {}",
        if validation.can_copy_new_membership_script() { "ready" } else { "blocked" }
    ));
    lines
}

pub fn print_validation(validation: &FieldValidation) {
    for line in format_validation(validation) {
        println!("{}", line);
    }
}
