use owo_colors::OwoColorize;
use picker_catalog::CatalogNode;
use picker_catalog::InstanceBinding;
use picker_catalog::ResolvedReference;
use picker_matcher::Span;
use serde_json::Value;
use serde_json::json;

pub(crate) fn use_color() -> bool {
    supports_color::on_cached(supports_color::Stream::Stdout).is_some()
}

/// Indented display name with highlighted runs.
pub(crate) fn tree_line(node: &CatalogNode, spans: &[Span], color: bool) -> String {
    let indent = "  ".repeat(node.depth.max(0) as usize);
    let name = if color {
        highlighted(&node.display_name, spans)
    } else {
        node.display_name.clone()
    };
    if node.is_container() && !node.is_expanded() && !node.all_children().is_empty() {
        let more = format!("(+{})", node.all_children().len());
        if color {
            return format!("{indent}{name} {}", more.dimmed());
        }
        return format!("{indent}{name} {more}");
    }
    format!("{indent}{name}")
}

fn highlighted(text: &str, spans: &[Span]) -> String {
    let mut out = String::new();
    let mut chars = text.chars().enumerate().peekable();
    for span in spans {
        while let Some((_, ch)) = chars.next_if(|(i, _)| *i < span.start) {
            out.push(ch);
        }
        let run: String = std::iter::from_fn(|| chars.next_if(|(i, _)| *i < span.end()))
            .map(|(_, ch)| ch)
            .collect();
        out.push_str(&run.bright_yellow().bold().to_string());
    }
    out.extend(chars.map(|(_, ch)| ch));
    out
}

pub(crate) fn node_json(node: &CatalogNode, spans: &[Span]) -> Value {
    json!({
        "id": node.id.to_string(),
        "depth": node.depth,
        "kind": node.kind.tag(),
        "name": node.display_name,
        "spans": spans
            .iter()
            .map(|span| json!([span.start, span.len]))
            .collect::<Vec<_>>(),
    })
}

pub(crate) fn reference_json(reference: &ResolvedReference) -> Value {
    json!({
        "path": reference.path(),
        "static": reference.is_static,
        "root_type": reference.root_type.as_ref().map(|t| t.display_name()),
        "value_type": reference.value_type.as_ref().map(|t| t.display_name()),
        "segments": reference
            .segments
            .iter()
            .map(|segment| json!({
                "name": segment.name,
                "bound_type": segment.bound_type.as_ref().map(|t| t.display_name()),
                "value_type": segment.value_type.as_ref().map(|t| t.display_name()),
                "static": segment.is_static,
            }))
            .collect::<Vec<_>>(),
        "instance": reference.instance.as_ref().map(instance_label),
    })
}

pub(crate) fn instance_label(instance: &InstanceBinding) -> String {
    match instance {
        InstanceBinding::Input(ty) => format!("input {}", ty.display_name()),
        InstanceBinding::Named { name, .. } => format!("named {name}"),
    }
}
