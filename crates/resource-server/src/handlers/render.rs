//! HTML listing for browsers

use handlebars::{Handlebars, RenderError};
use resource_types::Entity;
use serde::Serialize;

const LISTING_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{{title}}</title></head>
<body>
<h1>{{title}}</h1>
<table>
<thead><tr><th>ID</th><th>Name</th><th>Created</th><th>Updated</th></tr></thead>
<tbody>{{#each rows}}<tr><td>{{id}}</td><td>{{name}}</td><td>{{created_at}}</td><td>{{updated_at}}</td></tr>{{/each}}</tbody>
</table>
</body>
</html>
"#;

#[derive(Serialize)]
struct Row<'a> {
    id: u64,
    name: &'a str,
    created_at: String,
    updated_at: String,
}

#[derive(Serialize)]
struct Listing<'a> {
    title: &'static str,
    rows: Vec<Row<'a>>,
}

/// Render `items` as an HTML table; `{{...}}` output is HTML-escaped
pub fn resource_table<E: Entity>(items: &[E]) -> Result<String, RenderError> {
    let listing = Listing {
        title: E::COLLECTION,
        rows: items
            .iter()
            .map(|item| Row {
                id: item.id(),
                name: item.name(),
                created_at: item.created_at().to_rfc3339(),
                updated_at: item.updated_at().to_rfc3339(),
            })
            .collect(),
    };

    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.render_template(LISTING_TEMPLATE, &listing)
}
