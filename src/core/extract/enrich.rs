//! Context enrichment: route, sibling texts, section heading, composite shape.

use std::collections::HashMap;

use super::types::{ChildShape, ExtractedString, StringKind};

/// Route file names that say nothing about the route itself.
pub const CONVENTIONAL_STEMS: &[&str] = &[
    "page",
    "layout",
    "index",
    "route",
    "template",
    "loading",
    "error",
    "not-found",
    "default",
];

const GENERIC_DIRS: &[&str] = &[
    "src",
    "app",
    "pages",
    "components",
    "component",
    "ui",
    "common",
    "shared",
    "lib",
    "utils",
    "hooks",
];

const MAX_SIBLINGS: usize = 5;

fn is_route_group_or_dynamic(segment: &str) -> bool {
    (segment.starts_with('[') && segment.ends_with(']'))
        || (segment.starts_with('(') && segment.ends_with(')'))
        || segment.starts_with('@')
        || segment.starts_with('_')
}

fn file_stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Route of a file under `app/` or `pages/`, or the feature directory of a
/// component file.
///
/// `app/[locale]/about/page.tsx` -> `/about`, `pages/blog/post.tsx` ->
/// `/blog/post`, `src/components/marketing/Hero.tsx` -> `marketing`.
pub fn route_path_for(file: &str) -> Option<String> {
    let normalized = file.replace('\\', "/");
    let segments: Vec<&str> = normalized
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    let (file_name, dirs) = segments.split_last()?;

    if let Some(pos) = dirs.iter().position(|s| *s == "app" || *s == "pages") {
        let is_pages = dirs[pos] == "pages";
        let mut route: Vec<&str> = dirs[pos + 1..]
            .iter()
            .copied()
            .filter(|s| !is_route_group_or_dynamic(s))
            .collect();
        let stem = file_stem(file_name);
        if is_pages && !CONVENTIONAL_STEMS.contains(&stem) && !stem.starts_with('_') {
            route.push(stem);
        }
        return Some(format!("/{}", route.join("/")));
    }

    if let Some(pos) = dirs.iter().position(|s| *s == "components")
        && let Some(feature) = dirs[pos + 1..]
            .iter()
            .find(|s| !GENERIC_DIRS.contains(s) && !is_route_group_or_dynamic(s))
    {
        return Some(feature.to_string());
    }

    dirs.last()
        .filter(|dir| !GENERIC_DIRS.contains(dir))
        .map(|dir| dir.to_string())
}

/// `Click <a>{1}</a> to continue`.
pub fn render_composite(shapes: &[ChildShape]) -> String {
    let mut out = String::new();
    let mut element = 0;
    for shape in shapes {
        match shape {
            ChildShape::Text(text) => out.push_str(text),
            ChildShape::Element(tag) => {
                element += 1;
                out.push_str(&format!("<{tag}>{{{element}}}</{tag}>"));
            }
            ChildShape::Expr(Some(name)) => out.push_str(&format!("{{{}}}", name)),
            ChildShape::Expr(None) => out.push_str("{expr}"),
        }
    }
    out.trim().to_string()
}

fn is_heading(tag: Option<&str>) -> bool {
    matches!(tag, Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6"))
}

/// Fills route, siblings, headings and composite context in place.
///
/// `composites[i]` holds the mixed-children shapes of `strings[i]`, if any.
pub fn enrich_file(strings: &mut [ExtractedString], composites: &[Option<&[ChildShape]>]) {
    for (string, composite) in strings.iter_mut().zip(composites) {
        string.route_path = route_path_for(&string.file);
        string.composite_context = composite.map(render_composite);
    }

    let mut order: Vec<usize> = (0..strings.len()).collect();
    order.sort_by_key(|&i| (strings[i].line, strings[i].column));

    let mut by_component: HashMap<String, Vec<usize>> = HashMap::new();
    for &i in &order {
        if let Some(component) = &strings[i].component_name {
            by_component.entry(component.clone()).or_default().push(i);
        }
    }

    for members in by_component.values() {
        let mut heading: Option<String> = None;
        for &i in members {
            let own = strings[i].text.clone();
            let mut siblings: Vec<String> = Vec::new();
            for &j in members {
                let text = &strings[j].text;
                if j == i || *text == own || siblings.contains(text) {
                    continue;
                }
                siblings.push(text.clone());
                if siblings.len() == MAX_SIBLINGS {
                    break;
                }
            }
            strings[i].sibling_texts = siblings;

            if strings[i].kind == StringKind::JsxText && is_heading(strings[i].parent_tag.as_deref())
            {
                heading = Some(own);
            } else {
                strings[i].section_heading = heading.clone();
            }
        }
    }
}
