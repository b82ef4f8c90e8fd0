//! Slash command registry for the REPL.
//!
//! Provides structured metadata for every `/command`, enabling categorized
//! help and alias resolution.

/// Categories for grouping commands in `/help` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCategory {
    Selection,
    Translation,
    Documents,
    Session,
}

impl CommandCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CommandCategory::Selection => "Selection",
            CommandCategory::Translation => "Translation",
            CommandCategory::Documents => "Documents",
            CommandCategory::Session => "Session",
        }
    }

    pub fn all() -> &'static [CommandCategory] {
        &[
            CommandCategory::Selection,
            CommandCategory::Translation,
            CommandCategory::Documents,
            CommandCategory::Session,
        ]
    }
}

/// Metadata describing a slash command.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    /// Primary name including the slash, e.g., "/use".
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub usage: &'static str,
    pub category: CommandCategory,
}

/// Registry holding all slash commands with their metadata.
pub struct CommandRegistry {
    commands: Vec<CommandInfo>,
}

impl CommandRegistry {
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            commands: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn register(
        &mut self,
        name: &'static str,
        aliases: &'static [&'static str],
        usage: &'static str,
        description: &'static str,
        category: CommandCategory,
    ) {
        self.commands.push(CommandInfo {
            name,
            aliases,
            description,
            usage,
            category,
        });
    }

    fn register_defaults(&mut self) {
        use CommandCategory::*;

        self.register("/use", &["/select"], "/use <document>", "Query a single document", Selection);
        self.register(
            "/toggle",
            &["/t"],
            "/toggle <document>",
            "Add or remove a document from the comparison set",
            Selection,
        );
        self.register("/all", &[], "/all [on|off]", "Search every document", Selection);
        self.register("/clear", &[], "/clear", "Clear the selection", Selection);

        self.register(
            "/translate",
            &["/tr"],
            "/translate [on|off|<text>]",
            "Toggle query translation, or translate text",
            Translation,
        );
        self.register(
            "/lang",
            &[],
            "/lang <from> <to>",
            "Set the translation languages (de, en, es)",
            Translation,
        );

        self.register("/list", &["/ls", "/docs"], "/list", "List documents", Documents);
        self.register("/refresh", &[], "/refresh", "Reload the document list", Documents);
        self.register("/upload", &[], "/upload <path>", "Upload a PDF", Documents);
        self.register(
            "/analyze",
            &["/analyse"],
            "/analyze <document> [summary|word-frequency|statistics|all]",
            "Analyze a document",
            Documents,
        );
        self.register(
            "/view",
            &[],
            "/view <document> [page]",
            "Show the viewer link for a page",
            Documents,
        );

        self.register("/status", &[], "/status", "Show backend and selection status", Session);
        self.register("/help", &["/?"], "/help", "Show this help", Session);
        self.register("/quit", &["/exit", "/q"], "/quit", "Exit the REPL", Session);
    }

    /// Look up a command by name or alias.
    pub fn lookup(&self, input: &str) -> Option<&CommandInfo> {
        self.commands
            .iter()
            .find(|cmd| cmd.name == input || cmd.aliases.contains(&input))
    }

    /// Generate categorized help text.
    pub fn help_text(&self) -> String {
        let mut output = String::from("\nAvailable commands:\n");

        for category in CommandCategory::all() {
            let cmds: Vec<&CommandInfo> = self
                .commands
                .iter()
                .filter(|c| c.category == *category)
                .collect();

            if cmds.is_empty() {
                continue;
            }

            output.push_str(&format!("\n  {}:\n", category.label()));

            for cmd in cmds {
                let aliases = if cmd.aliases.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", cmd.aliases.join(", "))
                };
                output.push_str(&format!(
                    "    {:<28} {}{}\n",
                    cmd.usage, cmd.description, aliases
                ));
            }
        }

        output.push_str("\nInput:\n  Type a question and press Enter to search the selection.\n");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_alias() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(registry.lookup("/use").unwrap().name, "/use");
        assert_eq!(registry.lookup("/q").unwrap().name, "/quit");
        assert_eq!(registry.lookup("/ls").unwrap().name, "/list");
        assert!(registry.lookup("/nonexistent").is_none());
    }

    #[test]
    fn test_help_text_contains_all_categories() {
        let registry = CommandRegistry::with_defaults();
        let help = registry.help_text();
        for category in CommandCategory::all() {
            assert!(
                help.contains(category.label()),
                "Help text missing category: {}",
                category.label()
            );
        }
        assert!(help.contains("/lang <from> <to>"));
    }

    #[test]
    fn test_no_duplicate_names() {
        let registry = CommandRegistry::with_defaults();
        let mut names: Vec<&str> = registry
            .commands
            .iter()
            .flat_map(|c| std::iter::once(c.name).chain(c.aliases.iter().copied()))
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
