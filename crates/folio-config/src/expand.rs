//! `${VAR}` expansion for deployment-dependent site fields.
//!
//! Only `site.base` and `site.url` are expanded: they are the two values that
//! change between a preview deploy and production for the same docs tree.

use std::borrow::Cow;

use crate::{ConfigError, SiteConfig};

/// Expand `${VAR}` and `${VAR:-default}` in `site.base` and `site.url` from
/// the process environment. Bare `$VAR` is kept literally.
pub(crate) fn expand_site(site: &mut SiteConfig) -> Result<(), ConfigError> {
    expand_site_with(site, |var| std::env::var(var).ok())
}

/// [`expand_site`] with an explicit variable source.
fn expand_site_with(
    site: &mut SiteConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    site.base = expand_field("site.base", &site.base, &lookup)?;
    if let Some(url) = &site.url {
        site.url = Some(expand_field("site.url", url, &lookup)?);
    }
    Ok(())
}

fn expand_field(
    field: &str,
    value: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }
    // Unset without a default is an error; shellexpand still applies `:-` defaults
    shellexpand::env_with_context(value, |var| lookup(var).map(Some).ok_or(()))
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}
