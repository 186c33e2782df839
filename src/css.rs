use holo_core::layout::StyleInstruction;

/// CSS declarations (property, value) for a style instruction. Properties the
/// instruction leaves unset are not emitted.
pub fn css_declarations(style: &StyleInstruction) -> Vec<(&'static str, String)> {
    let mut out = Vec::with_capacity(4);
    if let Some(s) = style.scale {
        out.push(("transform", format!("scale({})", fmt_num(s))));
    }
    if let Some(o) = style.opacity {
        out.push(("opacity", fmt_num(o)));
    }
    let filters: Vec<String> = [
        ("brightness", style.brightness),
        ("contrast", style.contrast),
        ("saturate", style.saturation),
    ]
    .into_iter()
    .filter_map(|(f, v)| v.map(|v| format!("{}({})", f, fmt_num(v))))
    .collect();
    if !filters.is_empty() {
        out.push(("filter", filters.join(" ")));
    }
    if let Some(ms) = style.transition_ms {
        let ms = ms.max(0.0).round();
        out.push((
            "transition",
            format!("transform {ms}ms ease, opacity {ms}ms ease, filter {ms}ms ease"),
        ));
    }
    out
}

// Short, locale-free numbers: 1, 0.8, 1.05
fn fmt_num(v: f32) -> String {
    let v = (v * 1000.0).round() / 1000.0;
    format!("{}", v)
}
