// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use camino::Utf8Path;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::de::DeserializeOwned;

/// Prefix of the environment variables overriding the configuration files
pub const ENV_PREFIX: &str = "VTAG_";

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Trait implemented by all configuration sections, to load them from a
/// [`Figment`] and check them afterwards.
pub trait ConfigurationSection: Sized + DeserializeOwned {
    /// Where this section lives relative to the root.
    const PATH: Option<&'static str> = None;

    /// Validate the configuration section
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    fn validate(&self, _figment: &Figment) -> Result<(), BoxError> {
        Ok(())
    }

    /// Extract and validate the section.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration could not be loaded or is invalid
    fn extract(figment: &Figment) -> Result<Self, BoxError> {
        let this: Self = if let Some(path) = Self::PATH {
            figment.extract_inner(path)?
        } else {
            figment.extract()?
        };

        this.validate(figment)?;
        Ok(this)
    }
}

/// Extension trait for sections which have sensible defaults, so that they
/// can be left out of the configuration entirely.
pub trait ConfigurationSectionExt: ConfigurationSection + Default {
    /// Extract the section, or use its default value if it is not present.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration section is invalid.
    fn extract_or_default(figment: &Figment) -> Result<Self, BoxError> {
        let this: Self = if let Some(path) = Self::PATH {
            if !figment.contains(path) {
                return Ok(Self::default());
            }

            figment.extract_inner(path)?
        } else {
            figment.extract()?
        };

        this.validate(figment)?;
        Ok(this)
    }
}

impl<T: ConfigurationSection + Default> ConfigurationSectionExt for T {}

/// Build the [`Figment`] from the `VTAG_`-prefixed environment variables and
/// the given YAML files.
///
/// The files are merged in order on top of the environment, so a value set in
/// a file wins over the same value set in a variable.
///
/// Nested keys are separated by a double underscore in variable names, so
/// `VTAG_VITE__ROOT_URL` sets `vite.root_url`.
#[must_use]
pub fn figment<P: AsRef<Utf8Path>>(files: &[P]) -> Figment {
    let base = Figment::new().merge(Env::prefixed(ENV_PREFIX).split("__"));

    files.iter().fold(base, |figment, file| {
        figment.admerge(Yaml::file(file.as_ref()))
    })
}

/// Attach the location of a section field to a validation error
pub(crate) fn field_error(
    figment: &Figment,
    section: &'static str,
    field: &'static str,
    message: &str,
) -> figment::Error {
    let mut error = figment::Error::from(message.to_owned());
    error.metadata = figment.find_metadata(section).cloned();
    error.profile = Some(figment::Profile::Default);
    error.path = vec![section.to_owned(), field.to_owned()];
    error
}
