use terra_dataaccess::xsd::{self, MaxOccurs, Occurs};

fn main() {
    if let Err(err) = run() {
        eprintln!("read_xsd failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("Usage: read_xsd <path-to-xsd>")?;
    terra_dataaccess::logging::init_logger(false);

    let schema = xsd::read_schema(&path)?;
    println!(
        "schema: target_namespace={}",
        schema.target_namespace.as_deref().unwrap_or("-")
    );
    for (prefix, uri) in &schema.namespaces {
        let prefix = if prefix.is_empty() { "(default)" } else { prefix };
        println!("  xmlns {prefix} = {uri}");
    }
    for include in &schema.includes {
        println!("  include {}", include.schema_location);
    }
    for import in &schema.imports {
        println!(
            "  import {} from {}",
            import.namespace.as_deref().unwrap_or("-"),
            import.schema_location.as_deref().unwrap_or("-")
        );
    }
    for element in &schema.elements {
        let name = element.name.as_deref().unwrap_or("?");
        let type_name = element
            .type_name
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "(anonymous)".to_string());
        println!("  element {name}: {type_name} {}", format_occurs(element.occurs));
    }
    for complex_type in &schema.complex_types {
        println!(
            "  complexType {} ({} attributes)",
            complex_type.name.as_deref().unwrap_or("?"),
            complex_type.attributes.len()
        );
    }
    for simple_type in &schema.simple_types {
        println!("  simpleType {}", simple_type.name.as_deref().unwrap_or("?"));
    }
    for group in &schema.groups {
        println!("  group {}", group.name.as_deref().unwrap_or("?"));
    }
    for group in &schema.attribute_groups {
        println!("  attributeGroup {}", group.name.as_deref().unwrap_or("?"));
    }
    for attribute in &schema.attributes {
        println!("  attribute {}", attribute.name.as_deref().unwrap_or("?"));
    }
    for notation in &schema.notations {
        println!("  notation {}", notation.name);
    }

    Ok(())
}

fn format_occurs(occurs: Occurs) -> String {
    match occurs.max {
        MaxOccurs::Bounded(max) => format!("[{}..{max}]", occurs.min),
        MaxOccurs::Unbounded => format!("[{}..*]", occurs.min),
    }
}
