use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use shared::Error;
use std::str::FromStr;

/// Command line interface for cache type administration
#[derive(Parser, Debug)]
#[command(name = "cachectl")]
#[command(about = "Manage application cache types")]
#[command(version)]
#[command(after_help = "<selector>  Comma separated cache type ids; omit for all cache types")]
pub struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show cache types
    List,
    /// Enable caching for cache types
    Enable { selector: Option<String> },
    /// Disable caching for cache types and clean them
    Disable { selector: Option<String> },
    /// Clean cache types
    Refresh { selector: Option<String> },
    /// Mark cache types as invalidated
    Invalidate { selector: Option<String> },
    /// Flush cache storage or the application cache <magento|storage>
    Flush { target: String },
    /// Clean the JS/CSS cache
    #[command(name = "cleanmedia")]
    CleanMedia,
    /// Clean the image cache
    #[command(name = "cleanimages")]
    CleanImages,
    /// Flush all caches
    Purge,
}

impl Command {
    /// Reject malformed arguments before anything is opened or touched.
    pub fn validate(&self) -> Result<(), Error> {
        if let Command::Flush { target } = self {
            target.parse::<FlushTarget>()?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushTarget {
    /// Data tagged with the application tag
    Magento,
    /// Everything in cache storage
    Storage,
}

impl FromStr for FlushTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "magento" => Ok(FlushTarget::Magento),
            "storage" => Ok(FlushTarget::Storage),
            _ => Err(Error::Usage(
                "The flush type must be magento|storage".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector_commands() {
        let cli = Cli::try_parse_from(["cachectl", "enable", "config,layout"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Enable {
                selector: Some("config,layout".to_string())
            }
        );

        let cli = Cli::try_parse_from(["cachectl", "refresh"]).unwrap();
        assert_eq!(cli.command, Command::Refresh { selector: None });
        assert_eq!(cli.format, OutputFormat::Human);
    }

    #[test]
    fn test_parse_aux_commands_and_format() {
        let cli = Cli::try_parse_from(["cachectl", "cleanmedia", "--format", "json"]).unwrap();
        assert_eq!(cli.command, Command::CleanMedia);
        assert_eq!(cli.format, OutputFormat::Json);

        let cli = Cli::try_parse_from(["cachectl", "cleanimages"]).unwrap();
        assert_eq!(cli.command, Command::CleanImages);
    }

    #[test]
    fn test_flush_target() {
        assert_eq!("magento".parse::<FlushTarget>().unwrap(), FlushTarget::Magento);
        assert_eq!("storage".parse::<FlushTarget>().unwrap(), FlushTarget::Storage);
        assert!(matches!("Storage".parse::<FlushTarget>(), Err(Error::Usage(_))));
        assert!(matches!("all".parse::<FlushTarget>(), Err(Error::Usage(_))));
    }

    #[test]
    fn test_validate_rejects_bad_flush_target() {
        let cli = Cli::try_parse_from(["cachectl", "flush", "everything"]).unwrap();
        assert!(matches!(cli.command.validate(), Err(Error::Usage(_))));

        let cli = Cli::try_parse_from(["cachectl", "flush", "storage"]).unwrap();
        assert!(cli.command.validate().is_ok());
        assert!(Command::Purge.validate().is_ok());
    }

    #[test]
    fn test_flush_requires_target() {
        assert!(Cli::try_parse_from(["cachectl", "flush"]).is_err());
    }
}
