//! Page rendering by token substitution
//!
//! Templates are plain HTML with `{{ name }}` tokens. Text tokens are
//! HTML-escaped; `ingredients_list`, `instructions_list` and `json_ld` are
//! inserted as pre-rendered fragments. Unknown tokens are left as they are.

use crate::publishing::translator::WebRecipeView;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Page template used when the configured one is missing
pub const DEFAULT_TEMPLATE: &str = include_str!("recipe_page.html");

static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").expect("Invalid token regex"));

static MINUTES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("Invalid duration regex"));

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// "25 mins" -> "PT25M"; the first integer wins, `PT0M` when there is none
pub fn parse_duration(text: &str) -> String {
    match MINUTES_REGEX.captures(text).and_then(|c| c.get(1)) {
        Some(m) => format!("PT{}M", m.as_str()),
        None => "PT0M".to_string(),
    }
}

pub fn render_ingredients(ingredients: &[String]) -> String {
    ingredients
        .iter()
        .map(|text| format!(r#"<li class="border-b border-gray-50 pb-2">{}</li>"#, escape_html(text)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_instructions(instructions: &[String]) -> String {
    instructions
        .iter()
        .enumerate()
        .map(|(i, step)| {
            format!(
                r#"<li class="flex gap-4"><span class="font-serif text-terracotta font-bold italic text-xl">{:02}</span><span>{}</span></li>"#,
                i + 1,
                escape_html(step)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// schema.org `Recipe` structured data wrapped in its script tag
pub fn render_json_ld(view: &WebRecipeView, site_url: &str) -> String {
    let mut data = json!({
        "@context": "https://schema.org/",
        "@type": "Recipe",
        "name": view.title,
        "description": view.description,
        "prepTime": parse_duration(&view.prep),
        "cookTime": parse_duration(&view.cook),
        "recipeYield": view.yields,
        "recipeCategory": view.category,
        "recipeIngredient": view.ingredients,
        "recipeInstructions": view
            .instructions
            .iter()
            .map(|step| json!({"@type": "HowToStep", "text": step}))
            .collect::<Vec<_>>(),
    });

    if !view.image.is_empty() {
        data["image"] = json!(format!(
            "{}/{}",
            site_url.trim_end_matches('/'),
            view.image.trim_start_matches('/')
        ));
    }

    // A literal "</" would end the script element early
    let body = data.to_string().replace("</", "<\\/");
    format!(r#"<script type="application/ld+json">{}</script>"#, body)
}

/// Fill a page template for one recipe
pub fn render_page(template: &str, view: &WebRecipeView, site_url: &str) -> String {
    TOKEN_REGEX
        .replace_all(template, |caps: &regex::Captures| {
            let token = &caps[1];
            match token {
                "slug" => escape_html(&view.slug),
                "title" => escape_html(&view.title),
                "description" => escape_html(&view.description),
                "image_path" => escape_html(&view.image),
                "category" => escape_html(&view.category),
                "prep_time" => escape_html(&view.prep),
                "cook_time" => escape_html(&view.cook),
                "yield" => escape_html(&view.yields),
                "ingredients_list" => render_ingredients(&view.ingredients),
                "instructions_list" => render_instructions(&view.instructions),
                "json_ld" => render_json_ld(view, site_url),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// sitemap.xml listing the home page and one URL per recipe slug
pub fn render_sitemap<'a>(
    site_url: &str,
    slugs: impl IntoIterator<Item = &'a str>,
    lastmod: NaiveDate,
) -> String {
    let base = site_url.trim_end_matches('/');
    let date = lastmod.format("%Y-%m-%d");

    let mut lines = vec![
        r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#.to_string(),
    ];

    let home = format!("{}/", base);
    let recipes = slugs
        .into_iter()
        .filter(|slug| !slug.is_empty())
        .map(|slug| (format!("{}/recipes/{}", base, slug), "0.8"));

    for (loc, priority) in std::iter::once((home, "1.0")).chain(recipes) {
        lines.push("  <url>".to_string());
        lines.push(format!("    <loc>{}</loc>", escape_html(&loc)));
        lines.push(format!("    <lastmod>{}</lastmod>", date));
        lines.push(format!("    <priority>{}</priority>", priority));
        lines.push("  </url>".to_string());
    }

    lines.push("</urlset>".to_string());
    lines.join("\n")
}
