use std::fmt;

use regex::{Captures, NoExpand, Regex, Replacer};

use crate::locales::{LocaleEntry, LocaleTable};
use crate::render;

/// Pages that sit next to the root page and need `../` from a locale directory.
const SIBLING_PAGES: &[&str] = &["blog.html"];

/// Anchor a rewrite step looks for. A missing anchor skips the step and
/// leaves the template text untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    HtmlLang,
    Title,
    MetaDescription,
    Viewport,
    LanguageSelector,
    CurrentLang,
    AppScript,
    BodyClose,
}

impl Marker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::HtmlLang => "html-lang",
            Marker::Title => "title",
            Marker::MetaDescription => "meta-description",
            Marker::Viewport => "viewport",
            Marker::LanguageSelector => "language-selector",
            Marker::CurrentLang => "current-lang",
            Marker::AppScript => "app-script",
            Marker::BodyClose => "body-close",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    LangAttribute,
    Title,
    MetaDescription,
    Hreflang,
    LanguageSelector,
    CurrentLang,
    AppScriptPath,
    PageLangScript,
    SiblingLinks,
    ToggleScript,
}

impl Step {
    /// Execution order. Later steps anchor on what earlier ones produce
    /// (the page-language script sits in front of the rewritten app script).
    pub const ALL: [Step; 10] = [
        Step::LangAttribute,
        Step::Title,
        Step::MetaDescription,
        Step::Hreflang,
        Step::LanguageSelector,
        Step::CurrentLang,
        Step::AppScriptPath,
        Step::PageLangScript,
        Step::SiblingLinks,
        Step::ToggleScript,
    ];
}

/// Everything a single locale's rewrite needs.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub table: &'a LocaleTable,
    pub entry: &'a LocaleEntry,
    pub base_url: &'a str,
    pub cache_bust: i64,
}

impl Target<'_> {
    fn is_default(&self) -> bool {
        self.table.is_default(&self.entry.code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Localized {
    pub html: String,
    pub missing: Vec<Marker>,
}

struct Document {
    html: String,
    missing: Vec<Marker>,
}

impl Document {
    fn replace<R: Replacer>(&mut self, re: &Regex, rep: R, marker: Marker) {
        if !re.is_match(&self.html) {
            if !self.missing.contains(&marker) {
                self.missing.push(marker);
            }
            return;
        }
        self.html = re.replace_all(&self.html, rep).into_owned();
    }

    fn strip(&mut self, re: &Regex) {
        if re.is_match(&self.html) {
            self.html = re.replace_all(&self.html, "").into_owned();
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rewriter {
    html_lang: Regex,
    title: Regex,
    meta_description: Regex,
    hreflang_link: Regex,
    viewport: Regex,
    legacy_select: Regex,
    selector_widget: Regex,
    current_lang: Regex,
    app_script: Regex,
    page_lang_script: Regex,
    app_script_tag: Regex,
    toggle_script: Regex,
    body_close: Regex,
}

impl Rewriter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            html_lang: Regex::new(r#"<html lang="[^"]*">"#)?,
            title: Regex::new(&format!(
                "<title>{}[^<]*</title>",
                regex::escape(render::TITLE_PREFIX)
            ))?,
            meta_description: Regex::new(r#"<meta name="description" content="[^"]*">"#)?,
            hreflang_link: Regex::new(
                r#"\s*<link rel="alternate" hreflang="[^"]*" href="[^"]*" />"#,
            )?,
            viewport: Regex::new(r#"(<meta name="viewport"[^>]*>)"#)?,
            legacy_select: Regex::new(r#"(?s)<select id="language"[^>]*>.*?</select>"#)?,
            selector_widget: Regex::new(
                r#"(?s)<div class="lang-dropdown relative">\s*<button id="langBtn"[^>]*>.*?</button>\s*<div id="langMenu"[^>]*>.*?</div>\s*</div>"#,
            )?,
            current_lang: Regex::new(r"let currentLang = '[^']*';")?,
            app_script: Regex::new(r#"<script src="(?:\.\./)?app\.js[^"]*">"#)?,
            page_lang_script: Regex::new(r"<script>window\.pageLang = '[^']*';</script>\s*")?,
            app_script_tag: Regex::new(r#"(<script src="[^"]*app\.js[^"]*">)"#)?,
            toggle_script: Regex::new(&format!(
                r"(?s)\s*<script>\s*{}.*?</script>",
                regex::escape(render::TOGGLE_SCRIPT_MARKER)
            ))?,
            body_close: Regex::new(r"\s*</body>")?,
        })
    }

    /// Rewrites a pristine template for one locale, running every step in
    /// [`Step::ALL`] order.
    pub fn localize(&self, template: &str, target: &Target<'_>) -> Localized {
        let mut doc = Document {
            html: template.to_string(),
            missing: Vec::new(),
        };
        for step in Step::ALL {
            self.apply(step, &mut doc, target);
        }
        Localized {
            html: doc.html,
            missing: doc.missing,
        }
    }

    fn apply(&self, step: Step, doc: &mut Document, target: &Target<'_>) {
        let code = target.entry.code.as_str();
        match step {
            Step::LangAttribute => {
                let tag = format!(r#"<html lang="{code}">"#);
                doc.replace(&self.html_lang, NoExpand(&tag), Marker::HtmlLang);
            }
            Step::Title => {
                let tag = format!("<title>{}</title>", render::title_text(target.entry));
                doc.replace(&self.title, NoExpand(&tag), Marker::Title);
            }
            Step::MetaDescription => {
                let tag = format!(
                    r#"<meta name="description" content="{}">"#,
                    render::description_attr(target.entry)
                );
                doc.replace(&self.meta_description, NoExpand(&tag), Marker::MetaDescription);
            }
            Step::Hreflang => {
                doc.strip(&self.hreflang_link);
                let block = render::hreflang_block(target.table, target.base_url);
                doc.replace(
                    &self.viewport,
                    |caps: &Captures<'_>| format!("{}\n{block}", &caps[1]),
                    Marker::Viewport,
                );
            }
            Step::LanguageSelector => {
                let widget = render::language_selector(target.table, target.entry);
                let legacy = self.legacy_select.is_match(&doc.html);
                if legacy {
                    doc.replace(&self.legacy_select, NoExpand(&widget), Marker::LanguageSelector);
                }
                if !legacy || self.selector_widget.is_match(&doc.html) {
                    doc.replace(&self.selector_widget, NoExpand(&widget), Marker::LanguageSelector);
                }
            }
            Step::CurrentLang => {
                let init = format!("let currentLang = '{code}';");
                doc.replace(&self.current_lang, NoExpand(&init), Marker::CurrentLang);
            }
            Step::AppScriptPath => {
                let tag = format!(
                    r#"<script src="{}">"#,
                    render::app_script_src(target.is_default(), target.cache_bust)
                );
                doc.replace(&self.app_script, NoExpand(&tag), Marker::AppScript);
            }
            Step::PageLangScript => {
                doc.strip(&self.page_lang_script);
                let script = render::page_lang_script(code);
                doc.replace(
                    &self.app_script_tag,
                    |caps: &Captures<'_>| format!("{script}\n    {}", &caps[1]),
                    Marker::AppScript,
                );
            }
            Step::SiblingLinks => {
                if target.is_default() {
                    return;
                }
                for page in SIBLING_PAGES {
                    let local = format!(r#"href="{page}""#);
                    if doc.html.contains(&local) {
                        doc.html = doc.html.replace(&local, &format!(r#"href="../{page}""#));
                    }
                }
            }
            Step::ToggleScript => {
                doc.strip(&self.toggle_script);
                let script = format!("{}\n</body>", render::toggle_script());
                doc.replace(&self.body_close, NoExpand(&script), Marker::BodyClose);
            }
        }
    }
}
