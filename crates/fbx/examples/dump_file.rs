//! Simple dumper to inspect binary FBX files.

use std::collections::BTreeMap;

use fbx::{Document, Property, read_file};

fn format_property(p: &Property) -> String {
    match p {
        Property::String(_) => {
            let value = p.as_str();
            let preview: String = value.chars().take(60).collect();
            if value.chars().count() > 60 {
                format!("\"{}...\"", preview.escape_debug())
            } else {
                format!("\"{}\"", preview.escape_debug())
            }
        }
        Property::Raw(b) => format!("RAW[{}]", b.len()),
        Property::BooleanArray(_)
        | Property::Integer32Array(_)
        | Property::Integer64Array(_)
        | Property::Float32Array(_)
        | Property::Float64Array(_) => format!("{}[{}]", p.property_type(), p.size()),
        _ => p.to_string(),
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "scene.fbx".to_string());
    let max_depth: usize = std::env::args()
        .nth(2)
        .and_then(|d| d.parse().ok())
        .unwrap_or(usize::MAX);

    println!("Reading: {}", path);

    let doc: Document = read_file(&path).expect("Failed to decode");

    println!("\n=== File Info ===");
    println!("Version: {}", doc.version());
    println!("Records: {}", doc.len());
    println!("Top-level records: {}", doc.roots().len());

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, id) in doc.walk() {
        *counts.entry(doc[id].name()).or_default() += 1;
    }
    println!("\n=== Record Names ({}) ===", counts.len());
    for (name, count) in counts.iter().take(30) {
        println!("  {}: {}", name, count);
    }
    if counts.len() > 30 {
        println!("  ... and {} more names", counts.len() - 30);
    }

    println!("\n=== Tree ===");
    for (depth, id) in doc.walk() {
        if depth > max_depth {
            continue;
        }
        let record = &doc[id];
        let props: Vec<String> = record
            .properties()
            .iter()
            .take(6)
            .map(format_property)
            .collect();
        let more = if record.property_count() > 6 { ", ..." } else { "" };
        println!(
            "{}{}: {}{}",
            "  ".repeat(depth),
            record.name(),
            props.join(", "),
            more
        );
    }
}
