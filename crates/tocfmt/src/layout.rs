use crate::prelude::*;
use tocfmt_core::format::{INDENT_PER_LEVEL_INCHES, TAB_POSITION_INCHES};
use docx::MAX_LENGTH_INCHES;
use tocfmt_core::{IndentLevel, LayoutConfig};

/// Layout flags shared by every subcommand that builds formatting directives.
#[derive(Debug, Clone, clap::Args, serde::Serialize, serde::Deserialize)]
pub struct LayoutArgs {
    /// Position of the right-aligned tab stop, in inches
    #[arg(long, env = "TOCFMT_TAB_POSITION", default_value_t = TAB_POSITION_INCHES)]
    pub tab_position: f64,

    /// Left indent added per TOC nesting level, in inches
    #[arg(long, env = "TOCFMT_INDENT_STEP", default_value_t = INDENT_PER_LEVEL_INCHES)]
    pub indent_step: f64,
}

impl LayoutArgs {
    pub fn to_config(&self) -> Result<LayoutConfig> {
        let config = LayoutConfig {
            tab_position: self.tab_position,
            indent_per_level: self.indent_step,
        };
        config
            .validate()
            .map_err(|err| Error::InvalidLayout(err.to_string()))?;

        if config.tab_position > MAX_LENGTH_INCHES {
            return Err(Error::InvalidLayout(format!(
                "Tab position must not exceed {MAX_LENGTH_INCHES} inches, got {}",
                config.tab_position
            ))
            .into());
        }
        let deepest = config.indent_per_level * f64::from(IndentLevel::MAX.as_u8());
        if deepest > MAX_LENGTH_INCHES {
            return Err(Error::InvalidLayout(format!(
                "Indent step {} puts the deepest level past {MAX_LENGTH_INCHES} inches",
                config.indent_per_level
            ))
            .into());
        }

        Ok(config)
    }
}
