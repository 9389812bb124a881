use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::locales::{LocaleEntry, LocaleTable};

pub const TITLE_PREFIX: &str = "SilverPrice.win - ";
pub const TOGGLE_SCRIPT_MARKER: &str = "// Language dropdown toggle";

const ACTIVE_CLASS: &str = "bg-slate-700";
const INACTIVE_CLASS: &str = "hover:bg-slate-700";

pub fn title_text(entry: &LocaleEntry) -> String {
    format!("{TITLE_PREFIX}{}", encode_text(&entry.title))
}

pub fn description_attr(entry: &LocaleEntry) -> String {
    encode_double_quoted_attribute(&entry.description).into_owned()
}

/// One `<link rel="alternate">` per locale plus `x-default`, four-space
/// indented, newline separated, without a trailing newline.
pub fn hreflang_block(table: &LocaleTable, base_url: &str) -> String {
    let default = table.default_code();
    let mut tags = vec![
        hreflang_tag("x-default", &format!("{base_url}/")),
        hreflang_tag(default, &format!("{base_url}/")),
    ];
    for entry in table.entries() {
        if entry.code != default {
            tags.push(hreflang_tag(
                &entry.code,
                &format!("{base_url}{}", table.page_path(&entry.code)),
            ));
        }
    }
    tags.join("\n")
}

fn hreflang_tag(code: &str, href: &str) -> String {
    format!(r#"    <link rel="alternate" hreflang="{code}" href="{href}" />"#)
}

/// The selector widget: a button showing the current locale and a hidden
/// menu linking every locale, with the current one marked active.
pub fn language_selector(table: &LocaleTable, current: &LocaleEntry) -> String {
    let mut html = format!(
        r#"<div class="lang-dropdown relative">
                    <button id="langBtn" class="bg-slate-800 border border-slate-700 rounded-lg px-2 py-1 text-xs flex items-center gap-1">
                        {} {} <span class="text-xs">▼</span>
                    </button>
                    <div id="langMenu" class="hidden absolute right-0 mt-1 bg-slate-800 border border-slate-700 rounded-lg py-1 z-50 min-w-[80px]">"#,
        encode_text(&current.flag),
        current.code.to_uppercase()
    );

    for entry in table.entries() {
        let class = if entry.code == current.code {
            ACTIVE_CLASS
        } else {
            INACTIVE_CLASS
        };
        html.push_str(&format!(
            "\n                        <a href=\"{}\" class=\"block px-3 py-1 text-xs {class}\">{} {}</a>",
            table.page_path(&entry.code),
            encode_text(&entry.flag),
            entry.code.to_uppercase()
        ));
    }

    html.push_str("\n                    </div>\n                </div>");
    html
}

pub fn page_lang_script(code: &str) -> String {
    format!("<script>window.pageLang = '{code}';</script>")
}

pub fn app_script_src(is_default: bool, cache_bust: i64) -> String {
    let prefix = if is_default { "" } else { "../" };
    format!("{prefix}app.js?v={cache_bust}")
}

/// Dropdown toggle script, led by its own newline and indentation so it can
/// replace the whitespace in front of `</body>`.
pub fn toggle_script() -> String {
    format!(
        r#"
    <script>
        {TOGGLE_SCRIPT_MARKER}
        document.getElementById('langBtn')?.addEventListener('click', function(e) {{
            e.stopPropagation();
            document.getElementById('langMenu').classList.toggle('hidden');
        }});
        document.addEventListener('click', function() {{
            document.getElementById('langMenu')?.classList.add('hidden');
        }});
    </script>"#
    )
}
