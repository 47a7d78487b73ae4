use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format::ContainerKind;

pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Character set used to encode entry names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Charset {
    #[default]
    Utf8,
}

impl Charset {
    /// Render a path as an entry name, failing for names the charset cannot
    /// represent.
    pub fn encode(self, path: &Path) -> Result<String> {
        match self {
            Self::Utf8 => path
                .to_str()
                .map(str::to_owned)
                .ok_or_else(|| Error::invalid(format!("path is not valid UTF-8: {}", path.display()))),
        }
    }
}

/// Per-engine settings.
///
/// Each [`crate::Archiver`] owns its own copy, so there is no process-wide
/// state to race on. Changes through [`crate::Archiver::config_mut`] apply to
/// every later call on that archiver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Append the canonical extension when the destination lacks it.
    pub auto_suffix: bool,
    /// Remove output this call created when the call fails.
    pub delete_on_failure: bool,
    /// Refuse to replace an existing destination unless `Overwrite` is given.
    pub overwrite_protect: bool,
    /// 0 (store) through 9 (best).
    pub compression_level: u32,
    pub buffer_size: usize,
    pub charset: Charset,
    /// Kind used by [`crate::Archiver::compress_default`].
    pub default_kind: ContainerKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_suffix: true,
            delete_on_failure: true,
            overwrite_protect: true,
            compression_level: MAX_COMPRESSION_LEVEL,
            buffer_size: DEFAULT_BUFFER_SIZE,
            charset: Charset::Utf8,
            default_kind: ContainerKind::Zip,
        }
    }
}

impl EngineConfig {
    pub fn auto_suffix(mut self, enabled: bool) -> Self {
        self.auto_suffix = enabled;
        self
    }

    pub fn delete_on_failure(mut self, enabled: bool) -> Self {
        self.delete_on_failure = enabled;
        self
    }

    pub fn overwrite_protect(mut self, enabled: bool) -> Self {
        self.overwrite_protect = enabled;
        self
    }

    pub fn compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn default_kind(mut self, kind: ContainerKind) -> Self {
        self.default_kind = kind;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(Error::invalid(format!(
                "compression level {} is outside 0..={MAX_COMPRESSION_LEVEL}",
                self.compression_level
            )));
        }
        if self.buffer_size == 0 {
            return Err(Error::invalid("buffer size must be greater than zero"));
        }
        Ok(())
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| stowage_fs::Error::read(path, e))?;
        tracing::debug!(path = %path.display(), "loading engine config");
        Self::from_toml_str(&source)
    }
}

/// Flags a caller may pass to compress and decompress calls.
///
/// Only `Append` and `Overwrite` mean anything to the engine; the rest belong
/// to the wider file-operation vocabulary and are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modifier {
    Read,
    Write,
    Append,
    Overwrite,
    DeleteSource,
    DeleteRecursive,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum WriteIntent {
    #[default]
    Default,
    Append,
    Overwrite,
}

impl WriteIntent {
    /// The first `Append` or `Overwrite` in `modifiers` wins.
    pub(crate) fn from_modifiers(modifiers: &[Modifier]) -> Self {
        modifiers
            .iter()
            .find_map(|m| match m {
                Modifier::Append => Some(Self::Append),
                Modifier::Overwrite => Some(Self::Overwrite),
                _ => None,
            })
            .unwrap_or_default()
    }
}
