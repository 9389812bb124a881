use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://silverprice.win";
const DEFAULT_TEMPLATE: &str = "index.html";

#[derive(Debug, Parser)]
#[command(
    name = "silverprice-localize",
    version,
    about = "Regenerate the localized copies of the SilverPrice.win landing page."
)]
pub struct Cli {
    /// Canonical page to localize. The default locale's output is written back
    /// under this file name; other locales get `<code>/index.html`.
    #[arg(long, env = "SILVERPRICE_TEMPLATE", default_value = DEFAULT_TEMPLATE)]
    pub template: PathBuf,

    /// Directory receiving the default page and the per-locale directories.
    /// Defaults to the template's directory.
    #[arg(long, env = "SILVERPRICE_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Public site URL used in hreflang links.
    #[arg(long, env = "SILVERPRICE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// TOML locale table replacing the built-in one.
    #[arg(long, env = "SILVERPRICE_LOCALES")]
    pub locales: Option<PathBuf>,

    /// Fixed cache-busting token instead of the current Unix time.
    #[arg(long, env = "SILVERPRICE_CACHE_BUST")]
    pub cache_bust: Option<i64>,

    /// Fail without writing anything when a template marker is missing.
    #[arg(long, env = "SILVERPRICE_STRICT")]
    pub strict: bool,

    /// Render everything but write nothing.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub template: PathBuf,
    pub out_dir: PathBuf,
    pub base_url: String,
    pub locales: Option<PathBuf>,
    pub cache_bust: Option<i64>,
    pub strict: bool,
    pub dry_run: bool,
}

impl Config {
    pub fn from_cli() -> Result<Self> {
        let cli = Cli::parse();
        Config::from_parts(cli)
    }

    pub fn from_parts(cli: Cli) -> Result<Self> {
        if cli.template.as_os_str().is_empty() {
            return Err(anyhow!("template path must not be empty"));
        }

        let base_url = validate_base_url(&cli.base_url)?;

        let out_dir = match cli.out_dir {
            Some(dir) => dir,
            None => template_dir(&cli.template),
        };

        Ok(Self {
            template: cli.template,
            out_dir,
            base_url,
            locales: cli.locales,
            cache_bust: cli.cache_bust,
            strict: cli.strict,
            dry_run: cli.dry_run,
        })
    }
}

fn template_dir(template: &Path) -> PathBuf {
    match template.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn validate_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw).with_context(|| format!("invalid base url: {raw}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("base url must use http or https: {raw}"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(anyhow!("base url must not carry a query or fragment: {raw}"));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config> {
        let mut argv = vec!["silverprice-localize"];
        argv.extend_from_slice(args);
        Config::from_parts(Cli::try_parse_from(argv)?)
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.template, PathBuf::from("index.html"));
        assert_eq!(config.out_dir, PathBuf::from("."));
        assert_eq!(config.base_url, "https://silverprice.win");
        assert!(config.locales.is_none());
        assert!(!config.strict);
    }

    #[test]
    fn out_dir_follows_template() {
        let config = parse(&["--template", "site/public/index.html"]).unwrap();
        assert_eq!(config.out_dir, PathBuf::from("site/public"));

        let config = parse(&["--template", "a/index.html", "--out-dir", "b"]).unwrap();
        assert_eq!(config.out_dir, PathBuf::from("b"));
    }

    #[test]
    fn base_url_is_normalized() {
        let config = parse(&["--base-url", "https://example.org/"]).unwrap();
        assert_eq!(config.base_url, "https://example.org");

        let config = parse(&["--base-url", "https://example.org/prices/"]).unwrap();
        assert_eq!(config.base_url, "https://example.org/prices");
    }

    #[test]
    fn rejects_bad_base_urls() {
        assert!(parse(&["--base-url", "silverprice.win"]).is_err());
        assert!(parse(&["--base-url", "ftp://silverprice.win"]).is_err());
        assert!(parse(&["--base-url", "https://silverprice.win/?a=1"]).is_err());
    }

    #[test]
    fn flags() {
        let config = parse(&["--strict", "--dry-run", "--cache-bust", "99"]).unwrap();
        assert!(config.strict);
        assert!(config.dry_run);
        assert_eq!(config.cache_bust, Some(99));
    }
}
