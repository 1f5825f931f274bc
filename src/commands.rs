//! CLI command bodies.
//!
//! Each function initializes nothing itself; it takes an initialized
//! [`StandardsManager`] and prints either a human-readable table or JSON.

use anyhow::Result;
use serde::Serialize;

use crate::manager::StandardsManager;
use crate::models::DocumentMeta;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_meta_table(standards: &[DocumentMeta]) {
    println!("{:<36} {:<14} TITLE", "ID", "CATEGORY");
    for s in standards {
        println!("{:<36} {:<14} {}", s.id, s.category, s.title);
    }
}

pub fn run_list(manager: &StandardsManager, category: Option<&str>, json: bool) -> Result<()> {
    let standards = match category {
        Some(c) => manager.get_standards_by_category(c),
        None => manager.get_all_standards(),
    };

    if json {
        return print_json(&standards);
    }
    if standards.is_empty() {
        println!("No standards.");
        return Ok(());
    }
    print_meta_table(&standards);
    println!();
    println!("{} standard(s)", standards.len());
    Ok(())
}

pub fn run_categories(manager: &StandardsManager, json: bool) -> Result<()> {
    let categories = manager.get_categories();
    if json {
        return print_json(&categories);
    }
    for c in &categories {
        println!("{}", c);
    }
    Ok(())
}

/// Print a standard. Returns `false` if the id was not found.
pub fn run_get(manager: &StandardsManager, id: &str, json: bool) -> Result<bool> {
    let doc = match manager.find_standard(id) {
        Ok(doc) => doc,
        Err(missing) => {
            eprintln!("Error: {}", missing);
            if !missing.suggestions.is_empty() {
                eprintln!("Did you mean:");
                for s in &missing.suggestions {
                    eprintln!("  {}  ({})", s.id, s.title);
                }
            }
            return Ok(false);
        }
    };

    if json {
        print_json(&doc)?;
        return Ok(true);
    }

    println!("--- Standard ---");
    println!("id:           {}", doc.id);
    println!("title:        {}", doc.title);
    if let Some(ref d) = doc.description {
        println!("description:  {}", d);
    }
    match doc.subcategory {
        Some(ref sub) => println!("category:     {}/{}", doc.category, sub),
        None => println!("category:     {}", doc.category),
    }
    if !doc.tags.is_empty() {
        println!("tags:         {}", doc.tags.join(", "));
    }
    if let Some(ref v) = doc.version {
        println!("version:      {}", v);
    }
    if let Some(ref u) = doc.last_updated {
        println!("last_updated: {}", u);
    }
    println!("origin:       {}", doc.origin);
    println!("source:       {}", doc.source_path);
    println!();
    println!("--- Content ---");
    println!("{}", doc.content);

    Ok(true)
}

pub fn run_search(manager: &StandardsManager, query: &str, json: bool) -> Result<()> {
    let resp = manager.search_standards(query);
    if json {
        return print_json(&resp);
    }
    if resp.results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in resp.results.iter().enumerate() {
        println!(
            "{}. [{}] {}  ({})",
            i + 1,
            hit.relevance,
            hit.standard.title,
            hit.standard.id
        );
        if let Some(ref d) = hit.standard.description {
            println!("   {}", d);
        }
    }
    println!();
    println!("showing {} of {} result(s)", resp.results.len(), resp.total);
    Ok(())
}
