//! Message parser - Parses raw console text into structured messages

use crate::application::errors::CommandError;
use crate::domain::entities::{CommandOption, Content, Message, OptionSpec, OptionType};

/// Parses incoming text into Message objects
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse a text message
    pub fn parse(&self, chat_id: impl Into<String>, text: impl Into<String>) -> Message {
        let text = text.into();
        let chat_id = chat_id.into();

        if !self.command_prefix.is_empty() && text.starts_with(&self.command_prefix) {
            return self.parse_command(chat_id, &text[self.command_prefix.len()..]);
        }

        if text.trim().is_empty() {
            return Message::new(chat_id, Content::Empty);
        }

        Message::from_text(chat_id, text)
    }

    /// Parse a command message; quoted arguments stay together.
    fn parse_command(&self, chat_id: String, cmd_text: &str) -> Message {
        let parts = shlex::split(cmd_text)
            .unwrap_or_else(|| cmd_text.split_whitespace().map(str::to_string).collect());
        let mut parts = parts.into_iter();
        let name = parts.next().unwrap_or_default();

        Message::from_command(chat_id, name, parts.collect())
    }
}

/// Bind command-line style arguments onto an option schema.
///
/// A schema made of sub-commands takes the sub-command name as the first
/// argument. Otherwise `--name value`, `--name=value` and bare `--flag` are
/// accepted, and positional words fill the string options in declaration
/// order, the last one taking the rest of the line. Everything after a bare
/// `--` is positional.
pub fn bind_options(schema: &[OptionSpec], args: &[String]) -> Result<Vec<CommandOption>, CommandError> {
    if schema.iter().any(|o| o.option_type == OptionType::SubCommand) {
        let Some((sub, rest)) = args.split_first() else {
            return Err(CommandError::InvalidArgs(format!(
                "expected one of: {}",
                names(schema)
            )));
        };
        let spec = schema
            .iter()
            .find(|o| o.option_type == OptionType::SubCommand && &o.name == sub)
            .ok_or_else(|| CommandError::InvalidArgs(format!("unknown sub-command '{}'", sub)))?;
        return Ok(vec![CommandOption::sub_command(
            spec.name.clone(),
            bind_options(&spec.options, rest)?,
        )]);
    }

    let mut bound: Vec<CommandOption> = Vec::new();
    let mut positional: Vec<&str> = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            positional.extend(iter.by_ref().map(String::as_str));
            break;
        }
        let Some(flag) = arg.strip_prefix("--") else {
            positional.push(arg);
            continue;
        };
        let (key, inline) = match flag.split_once('=') {
            Some((k, v)) => (k, Some(v.to_string())),
            None => (flag, None),
        };
        let spec = schema
            .iter()
            .find(|o| o.name == key)
            .ok_or_else(|| CommandError::InvalidArgs(format!("unknown option '--{}'", key)))?;

        let option = match spec.option_type {
            OptionType::Boolean => {
                let value = match inline.as_deref() {
                    None | Some("true") | Some("yes") | Some("on") => true,
                    Some("false") | Some("no") | Some("off") => false,
                    Some(other) => {
                        return Err(CommandError::InvalidArgs(format!(
                            "'--{}' expects true or false, got '{}'",
                            key, other
                        )))
                    }
                };
                CommandOption::boolean(key, value)
            }
            OptionType::String => {
                let value = match inline {
                    Some(v) => v,
                    None => iter
                        .next()
                        .cloned()
                        .ok_or_else(|| CommandError::InvalidArgs(format!("'--{}' needs a value", key)))?,
                };
                CommandOption::string(key, value)
            }
            OptionType::SubCommand => {
                return Err(CommandError::InvalidArgs(format!("'{}' is a sub-command", key)));
            }
        };
        bound.retain(|o| o.name != option.name);
        bound.push(option);
    }

    let open: Vec<&OptionSpec> = schema
        .iter()
        .filter(|o| o.option_type == OptionType::String && !bound.iter().any(|b| b.name == o.name))
        .collect();
    if !positional.is_empty() {
        if open.is_empty() {
            return Err(CommandError::InvalidArgs(format!(
                "unexpected argument '{}'",
                positional[0]
            )));
        }
        let last = open.len() - 1;
        for (i, spec) in open.iter().enumerate() {
            if positional.is_empty() {
                break;
            }
            let value = if i == last {
                positional.drain(..).collect::<Vec<_>>().join(" ")
            } else {
                positional.remove(0).to_string()
            };
            bound.push(CommandOption::string(spec.name.clone(), value));
        }
    }

    if let Some(missing) = schema
        .iter()
        .find(|o| o.required && !bound.iter().any(|b| b.name == o.name))
    {
        return Err(CommandError::InvalidArgs(format!(
            "missing required option '{}'",
            missing.name
        )));
    }

    Ok(bound)
}

fn names(schema: &[OptionSpec]) -> String {
    schema.iter().map(|o| o.name.as_str()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::TagCommandService;
    use crate::domain::entities::{find_bool, find_string, OptionValue};

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    fn sub_args(bound: &[CommandOption]) -> (&str, &[CommandOption]) {
        match &bound[0].value {
            OptionValue::SubCommand(opts) => (bound[0].name.as_str(), opts.as_slice()),
            _ => panic!("expected sub-command"),
        }
    }

    #[test]
    fn test_parse_command_with_quotes() {
        let parser = MessageParser::new("/");
        let msg = parser.parse("chat", "/tags create greet \"hello there\"");
        assert_eq!(
            msg.content,
            Content::Command {
                name: "tags".into(),
                args: args(&["create", "greet", "hello there"]),
            }
        );
    }

    #[test]
    fn test_parse_plain_text() {
        let parser = MessageParser::new("/");
        assert_eq!(parser.parse("chat", "just text").content, Content::Text("just text".into()));
        assert_eq!(parser.parse("chat", "   ").content, Content::Empty);
    }

    #[test]
    fn test_unbalanced_quotes_fall_back_to_whitespace() {
        let parser = MessageParser::new("/");
        let msg = parser.parse("chat", "/greet \"oops");
        assert_eq!(
            msg.content,
            Content::Command {
                name: "greet".into(),
                args: args(&["\"oops"]),
            }
        );
    }

    #[test]
    fn test_bind_positional_rest_of_line() {
        let schema = TagCommandService::schema();
        let bound = bind_options(&schema, &args(&["create", "greet", "hello", "big", "world"])).unwrap();
        let (sub, opts) = sub_args(&bound);
        assert_eq!(sub, "create");
        assert_eq!(find_string(opts, "tag-name"), Some("greet"));
        assert_eq!(find_string(opts, "message"), Some("hello big world"));

        let bound = bind_options(&schema, &args(&["create", "flags", "--", "use", "--verbose"])).unwrap();
        assert_eq!(find_string(sub_args(&bound).1, "message"), Some("use --verbose"));
    }

    #[test]
    fn test_bind_named_and_flags() {
        let schema = TagCommandService::schema();
        let bound = bind_options(&schema, &args(&["export", "--export-all"])).unwrap();
        let (_, opts) = sub_args(&bound);
        assert_eq!(find_bool(opts, "export-all"), Some(true));

        let bound = bind_options(&schema, &args(&["export", "--export-one=greet"])).unwrap();
        let (_, opts) = sub_args(&bound);
        assert_eq!(find_string(opts, "export-one"), Some("greet"));

        // export has no required options
        let bound = bind_options(&schema, &args(&["export"])).unwrap();
        assert!(sub_args(&bound).1.is_empty());
    }

    #[test]
    fn test_bind_errors() {
        let schema = TagCommandService::schema();
        assert!(bind_options(&schema, &[]).is_err());
        assert!(bind_options(&schema, &args(&["nope"])).is_err());
        assert!(bind_options(&schema, &args(&["delete"])).is_err());
        assert!(bind_options(&schema, &args(&["list", "extra"])).is_err());
        assert!(bind_options(&schema, &args(&["export", "--bogus"])).is_err());
        assert!(bind_options(&schema, &args(&["export", "--export-all=maybe"])).is_err());
    }
}
