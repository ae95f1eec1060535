// Formatting Commands
// The closed set of formatting operations the host engine executes.
// Replaces string-keyed dispatch so every command is matched exhaustively.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Block format applied by `formatBlock`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockFormat {
    Paragraph,
    Heading(u8), // 1-6
}

impl BlockFormat {
    pub fn heading(level: u8) -> Self {
        BlockFormat::Heading(level.clamp(1, 6))
    }

    pub fn tag(&self) -> String {
        match self {
            BlockFormat::Paragraph => "p".to_string(),
            BlockFormat::Heading(level) => format!("h{}", (*level).clamp(1, 6)),
        }
    }
}

impl FromStr for BlockFormat {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().trim_matches(['<', '>']).to_ascii_lowercase();
        match tag.as_str() {
            "p" => Ok(BlockFormat::Paragraph),
            _ => tag
                .strip_prefix('h')
                .and_then(|level| level.parse::<u8>().ok())
                .filter(|level| (1..=6).contains(level))
                .map(BlockFormat::Heading)
                .ok_or_else(|| UnknownCommand(s.to_string())),
        }
    }
}

/// Horizontal alignment for `justify*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Full,
}

impl Alignment {
    pub fn css(&self) -> &'static str {
        match self {
            Alignment::Left => "text-align: left;",
            Alignment::Center => "text-align: center;",
            Alignment::Right => "text-align: right;",
            Alignment::Full => "text-align: justify;",
        }
    }
}

/// A native rich-text command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    FormatBlock(BlockFormat),
    Justify(Alignment),
    CreateLink(String),
}

impl FormatCommand {
    /// The host command name, e.g. `strikeThrough` or `justifyCenter`
    pub fn name(&self) -> &'static str {
        match self {
            FormatCommand::Bold => "bold",
            FormatCommand::Italic => "italic",
            FormatCommand::Underline => "underline",
            FormatCommand::StrikeThrough => "strikeThrough",
            FormatCommand::FormatBlock(_) => "formatBlock",
            FormatCommand::Justify(Alignment::Left) => "justifyLeft",
            FormatCommand::Justify(Alignment::Center) => "justifyCenter",
            FormatCommand::Justify(Alignment::Right) => "justifyRight",
            FormatCommand::Justify(Alignment::Full) => "justifyFull",
            FormatCommand::CreateLink(_) => "createLink",
        }
    }

    /// Whether the command only has an effect on a non-empty selection
    pub fn needs_extent(&self) -> bool {
        !matches!(
            self,
            FormatCommand::FormatBlock(_) | FormatCommand::Justify(_)
        )
    }
}

impl fmt::Display for FormatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatCommand::FormatBlock(format) => write!(f, "formatBlock:{}", format.tag()),
            FormatCommand::CreateLink(url) => write!(f, "createLink:{url}"),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command `{0}`")]
pub struct UnknownCommand(pub String);

/// Parses `name` or `name:value`, using the host command names.
impl FromStr for FormatCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once(':') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (s.trim(), None),
        };
        let unknown = || UnknownCommand(s.to_string());

        match (name, value) {
            ("bold", None) => Ok(FormatCommand::Bold),
            ("italic", None) => Ok(FormatCommand::Italic),
            ("underline", None) => Ok(FormatCommand::Underline),
            ("strikeThrough", None) => Ok(FormatCommand::StrikeThrough),
            ("formatBlock", Some(value)) => Ok(FormatCommand::FormatBlock(value.parse()?)),
            ("justifyLeft", None) => Ok(FormatCommand::Justify(Alignment::Left)),
            ("justifyCenter", None) => Ok(FormatCommand::Justify(Alignment::Center)),
            ("justifyRight", None) => Ok(FormatCommand::Justify(Alignment::Right)),
            ("justifyFull", None) => Ok(FormatCommand::Justify(Alignment::Full)),
            ("createLink", Some(url)) if !url.is_empty() => {
                Ok(FormatCommand::CreateLink(url.to_string()))
            }
            _ => Err(unknown()),
        }
    }
}

/// List flavour for list creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

impl FromStr for ListKind {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ul" | "unordered" => Ok(ListKind::Unordered),
            "ol" | "ordered" => Ok(ListKind::Ordered),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

/// A single attribute for a custom wrap, parsed from an `attr=value` token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapAttribute {
    pub name: String,
    pub value: String,
}

impl WrapAttribute {
    /// Parse `attr=value`, `attr="value"` or `attr='value'`.
    /// A token without `=` is a valueless attribute. Blank tokens yield `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        let (name, value) = token.split_once('=').unwrap_or((token, ""));
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let value = value.trim().trim_matches(['"', '\'']);
        Some(WrapAttribute {
            name: name.to_ascii_lowercase(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_command_names() {
        assert_eq!("bold".parse(), Ok(FormatCommand::Bold));
        assert_eq!("strikeThrough".parse(), Ok(FormatCommand::StrikeThrough));
        assert_eq!(
            "justifyCenter".parse(),
            Ok(FormatCommand::Justify(Alignment::Center))
        );
        assert_eq!(
            "formatBlock:h2".parse(),
            Ok(FormatCommand::FormatBlock(BlockFormat::Heading(2)))
        );
        assert_eq!(
            "formatBlock:<p>".parse(),
            Ok(FormatCommand::FormatBlock(BlockFormat::Paragraph))
        );
        assert_eq!(
            "createLink:https://x.com/a?b=c".parse(),
            Ok(FormatCommand::CreateLink("https://x.com/a?b=c".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("blink".parse::<FormatCommand>().is_err());
        assert!("formatBlock:h9".parse::<FormatCommand>().is_err());
        assert!("createLink:".parse::<FormatCommand>().is_err());
        assert!("bold:yes".parse::<FormatCommand>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let commands = [
            FormatCommand::Italic,
            FormatCommand::FormatBlock(BlockFormat::heading(3)),
            FormatCommand::Justify(Alignment::Right),
            FormatCommand::CreateLink("https://example.com".to_string()),
        ];
        for command in commands {
            assert_eq!(command.to_string().parse(), Ok(command));
        }
    }

    #[test]
    fn test_heading_clamps() {
        assert_eq!(BlockFormat::heading(0).tag(), "h1");
        assert_eq!(BlockFormat::heading(9).tag(), "h6");
    }

    #[test]
    fn test_wrap_attribute_parse() {
        assert_eq!(
            WrapAttribute::parse("class=\"note\""),
            Some(WrapAttribute {
                name: "class".to_string(),
                value: "note".to_string()
            })
        );
        assert_eq!(
            WrapAttribute::parse("title='a=b'"),
            Some(WrapAttribute {
                name: "title".to_string(),
                value: "a=b".to_string()
            })
        );
        assert_eq!(
            WrapAttribute::parse("hidden"),
            Some(WrapAttribute {
                name: "hidden".to_string(),
                value: String::new()
            })
        );
        assert_eq!(WrapAttribute::parse("  "), None);
        assert_eq!(WrapAttribute::parse("=x"), None);
    }
}
