use std::sync::Arc;

use tokio::sync::mpsc;

use super::tag_service::TagService;
use crate::application::errors::{CommandError, TagError};
use crate::application::messaging::format::LIST_COLOR;
use crate::application::messaging::ReplyFormat;
use crate::domain::entities::{
    find_bool, find_string, Command, CommandContext, CommandOption, Embed, InputType, OptionSpec, OptionValue, Reply,
    Tag,
};
use crate::domain::traits::{Clipboard, EditDialog, EditSubmission, EditSubmitter, Messenger};

/// Name of the management command
pub const TAGS_COMMAND: &str = "tags";

/// Owner marker of the management command itself
pub const TAGS_COMMAND_OWNER: &str = "message-tags/manage";

/// Default number of message characters shown by `tags list`
pub const DEFAULT_PREVIEW_LENGTH: usize = 72;

/// Service behind the `tags` command: routes each sub-command to the tag
/// service and answers through ephemeral bot messages.
pub struct TagCommandService {
    service: Arc<TagService>,
    messenger: Arc<dyn Messenger>,
    clipboard: Arc<dyn Clipboard>,
    dialog: Arc<dyn EditDialog>,
    edits: mpsc::UnboundedSender<EditSubmission>,
    format: ReplyFormat,
    preview_length: usize,
}

impl TagCommandService {
    pub fn new(
        service: Arc<TagService>,
        messenger: Arc<dyn Messenger>,
        clipboard: Arc<dyn Clipboard>,
        dialog: Arc<dyn EditDialog>,
        edits: mpsc::UnboundedSender<EditSubmission>,
    ) -> Self {
        Self {
            service,
            messenger,
            clipboard,
            dialog,
            edits,
            format: ReplyFormat::default(),
            preview_length: DEFAULT_PREVIEW_LENGTH,
        }
    }

    pub fn with_format(mut self, format: ReplyFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_preview_length(mut self, preview_length: usize) -> Self {
        self.preview_length = preview_length;
        self
    }

    /// Option schema of the `tags` command.
    pub fn schema() -> Vec<OptionSpec> {
        let tag_name = || OptionSpec::string("tag-name", "The name of the tag to trigger the response", true);
        vec![
            OptionSpec::sub_command(
                "create",
                "Create a new tag",
                vec![
                    tag_name(),
                    OptionSpec::string("message", "The message that you will send when using this tag", true),
                ],
            ),
            OptionSpec::sub_command("list", "List all tags from yourself", vec![]),
            OptionSpec::sub_command("delete", "Remove a tag from yourself", vec![tag_name()]),
            OptionSpec::sub_command("preview", "Preview a tag without sending it publicly", vec![tag_name()]),
            OptionSpec::sub_command(
                "export",
                "Export your tags to your clipboard",
                vec![
                    OptionSpec::string("export-one", "Export a specific tag", false),
                    OptionSpec::boolean("export-all", "Export all tags", false),
                ],
            ),
            OptionSpec::sub_command(
                "import",
                "Import tags from your clipboard",
                vec![OptionSpec::string("string", "Tag data to import", true)],
            ),
            OptionSpec::sub_command(
                "edit",
                "Edit an existing tag",
                vec![OptionSpec::string("tag-name", "The name of the tag to edit", true)],
            ),
        ]
    }

    /// Build the `tags` command for registration with the host.
    pub fn command(self: &Arc<Self>) -> Command {
        // The host holds this command, so hold the service weakly.
        let service = Arc::downgrade(self);
        let command = Command::new(TAGS_COMMAND)
            .with_description("Manage all the tags for yourself")
            .with_usage("/tags <create|list|delete|preview|export|import|edit> ...")
            .with_input_type(InputType::BuiltIn)
            .with_owner(TAGS_COMMAND_OWNER)
            .with_handler(move |ctx, options| match service.upgrade() {
                Some(service) => service.handle(ctx, options),
                None => Err(CommandError::ExecutionFailed("tags service has stopped".to_string())),
            });
        Self::schema().into_iter().fold(command, Command::with_option)
    }

    /// Dispatch one invocation. Failures are reported to the user, never returned.
    pub fn handle(&self, ctx: &CommandContext, options: &[CommandOption]) -> Result<Option<Reply>, CommandError> {
        let Some((sub, args)) = options.first().and_then(|o| match &o.value {
            OptionValue::SubCommand(args) => Some((o.name.as_str(), args.as_slice())),
            _ => None,
        }) else {
            self.messenger.send_bot_message(&ctx.chat_id, Reply::text("Invalid sub-command"));
            return Ok(None);
        };

        tracing::debug!("tags {} invoked in {}", sub, ctx.chat_id);
        let result = match sub {
            "create" => self.create(args),
            "delete" => self.delete(args),
            "list" => Ok(self.list()),
            "preview" => self.preview(args),
            "export" => self.export(args),
            "import" => self.import(args),
            "edit" => self.edit(args),
            _ => Ok(Reply::text("Invalid sub-command")),
        };

        let reply = result.unwrap_or_else(|e| self.error_reply(e));
        self.messenger.send_bot_message(&ctx.chat_id, reply);
        Ok(None)
    }

    fn create(&self, args: &[CommandOption]) -> Result<Reply, TagError> {
        let name = find_string(args, "tag-name").unwrap_or_default();
        let message = find_string(args, "message").unwrap_or_default();
        self.service.create(Tag::new(name, message))?;
        Ok(self.format.reply(format!("Successfully created the tag **{}**!", name)))
    }

    fn delete(&self, args: &[CommandOption]) -> Result<Reply, TagError> {
        let name = find_string(args, "tag-name").unwrap_or_default();
        self.service.delete(name)?;
        Ok(self.format.reply(format!("Successfully deleted the tag **{}**!", name)))
    }

    fn list(&self) -> Reply {
        let tags = self.service.list();
        let description = if tags.is_empty() {
            self.format
                .line("Woops! There are no tags yet, use `/tags create` to create one!")
        } else {
            tags.iter()
                .map(|tag| format!("`{}`: {}", tag.name, tag.preview(self.preview_length)))
                .collect::<Vec<_>>()
                .join("\n")
        };

        Reply::embed(Embed {
            title: "All Tags:".to_string(),
            description,
            color: LIST_COLOR,
        })
    }

    fn preview(&self, args: &[CommandOption]) -> Result<Reply, TagError> {
        let name = find_string(args, "tag-name").unwrap_or_default();
        let tag = self
            .service
            .get(name)
            .ok_or_else(|| TagError::NotFound(name.to_string()))?;
        Ok(Reply::text(tag.expanded()))
    }

    fn export(&self, args: &[CommandOption]) -> Result<Reply, TagError> {
        let one = find_string(args, "export-one").filter(|s| !s.is_empty());
        let all = find_bool(args, "export-all").unwrap_or(false);

        let exported = match (one, all) {
            (Some(name), _) => self.service.export_one(name)?,
            (None, true) => self.service.export_all()?,
            (None, false) => {
                return Err(TagError::MissingArgument(
                    "either export-one or export-all".to_string(),
                ))
            }
        };

        self.clipboard.copy_to_clipboard(&exported);
        Ok(self.format.reply(format!(
            "Successfully copied the tag data to your clipboard!\nYou can also find it below.```json\n{}```",
            exported
        )))
    }

    fn import(&self, args: &[CommandOption]) -> Result<Reply, TagError> {
        let text = find_string(args, "string").unwrap_or_default();
        let count = self.service.import_text(text)?;
        Ok(self.format.reply(format!("Successfully imported {} tag(s)!", count)))
    }

    fn edit(&self, args: &[CommandOption]) -> Result<Reply, TagError> {
        let name = find_string(args, "tag-name").unwrap_or_default();
        let tag = self
            .service
            .get(name)
            .ok_or_else(|| TagError::NotFound(name.to_string()))?;

        self.dialog.open(tag, EditSubmitter::new(name, self.edits.clone()));
        Ok(self.format.reply(format!("Editing the tag **{}**...", name)))
    }

    fn error_reply(&self, error: TagError) -> Reply {
        let text = match &error {
            TagError::AlreadyExists(name) => format!("A Tag with the name **{}** already exists!", name),
            TagError::NotFound(name) => format!("A Tag with the name **{}** does not exist!", name),
            TagError::Parse(_) => "Failed to parse import string! Make sure you copied it all".to_string(),
            TagError::MissingArgument(_) => "Please specify either `export-one` or `export-all`!".to_string(),
            TagError::InvalidName(name) => format!(
                "**{}** is not a valid tag name! Names can't be empty, contain spaces or start with `/`.",
                name
            ),
            TagError::Reserved(name) => format!("The name **{}** is already used by another command!", name),
            TagError::Storage(_) | TagError::Command(_) => {
                tracing::error!("tags command failed: {}", error);
                format!("Something went wrong: {}", error)
            }
        };
        tracing::debug!("tags command rejected: {}", error);
        self.format.reply(text)
    }
}
