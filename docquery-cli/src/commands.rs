//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::GlobalOptions;
use crate::render;
use docquery_core::config::{self, DocQueryConfig};
use docquery_core::{AnalysisKind, ConnectionStatus, DocumentRef, Language, LanguagePair, Session};
use serde::Serialize;
use std::path::Path;

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    options: &GlobalOptions,
) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, workspace),
        Commands::Repl => {
            let session = open_session(workspace, options)?;
            crate::repl::run_interactive(session).await
        }
        Commands::Health => {
            let session = open_session(workspace, options)?;
            let status = session.probe().await;
            let base_url = session.base_url();
            show(
                session.config().ui.json_output,
                &serde_json::json!({ "status": status, "base_url": base_url }),
                || render::connection(status, base_url),
            )?;
            if status != ConnectionStatus::Connected {
                anyhow::bail!("backend is not reachable");
            }
            Ok(())
        }
        Commands::List => {
            let mut session = open_session(workspace, options)?;
            let docs = session.refresh().await?;
            show(session.config().ui.json_output, &docs, || {
                render::documents(&docs)
            })
        }
        Commands::Upload { path } => {
            let mut session = open_session(workspace, options)?;
            let receipt = session.upload(&path).await?;
            show(session.config().ui.json_output, &receipt, || {
                receipt.message.clone()
            })
        }
        Commands::Ask {
            question,
            docs,
            all,
            translate,
            from,
            to,
        } => {
            let mut session = open_session(workspace, options)?;
            if all {
                session.set_search_all(true);
            } else if let [doc] = docs.as_slice() {
                session.select_single(DocumentRef::from(doc.as_str()));
            } else {
                for doc in &docs {
                    session.toggle_multi(DocumentRef::from(doc.as_str()));
                }
            }
            if translate || from.is_some() || to.is_some() {
                session.set_translation_enabled(true);
            }
            apply_languages(&mut session, from.as_deref(), to.as_deref())?;

            let outcome = session.ask(&question).await?;
            let ui = session.config().ui.clone();
            show(ui.json_output, &outcome, || render::outcome(&outcome, &ui))
        }
        Commands::Translate { text, from, to } => {
            let mut session = open_session(workspace, options)?;
            apply_languages(&mut session, from.as_deref(), to.as_deref())?;
            let outcome = session.translate(&text).await?;
            let ui = session.config().ui.clone();
            show(ui.json_output, &outcome, || render::translation(&outcome, &ui))
        }
        Commands::Analyze { document, kind } => {
            let kind: AnalysisKind = kind.parse()?;
            let mut session = open_session(workspace, options)?;
            let document = DocumentRef::from(document);
            let result = session.analyze(&document, kind).await?;
            let ui = session.config().ui.clone();
            show(ui.json_output, &result, || {
                render::analysis(&document, &result, &ui)
            })
        }
        Commands::View {
            document,
            page,
            open,
        } => {
            let session = open_session(workspace, options)?;
            let url = session.view_url(&DocumentRef::from(document), page);
            println!("{}", url);
            if open {
                open::that(&url)?;
            }
            Ok(())
        }
    }
}

fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            match config::write_default_config(workspace)? {
                Some(path) => println!("Created default configuration at: {}", path.display()),
                None => println!(
                    "Configuration file already exists at: {}",
                    workspace.join(".docquery").join("config.toml").display()
                ),
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = config::load_config(Some(workspace), None)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

/// Effective configuration: layered config plus command-line flags.
pub(crate) fn load(workspace: &Path, options: &GlobalOptions) -> anyhow::Result<DocQueryConfig> {
    let mut config = config::load_config(Some(workspace), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    if let Some(url) = &options.backend {
        config.backend.base_url = Some(url.clone());
    }
    if options.json {
        config.ui.json_output = true;
    }
    Ok(config)
}

fn open_session(workspace: &Path, options: &GlobalOptions) -> anyhow::Result<Session> {
    let config = load(workspace, options)?;
    Ok(Session::connect(config)?)
}

/// Override either side of the session's language pair.
pub(crate) fn apply_languages(
    session: &mut Session,
    from: Option<&str>,
    to: Option<&str>,
) -> anyhow::Result<()> {
    let current = session.translation().languages();
    let source = from.map(str::parse::<Language>).transpose()?;
    let target = to.map(str::parse::<Language>).transpose()?;
    session.set_languages(LanguagePair {
        source: source.unwrap_or(current.source),
        target: target.unwrap_or(current.target),
    });
    Ok(())
}

/// Print `value` as JSON, or the text produced by `text`.
pub(crate) fn show<T: Serialize>(
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", render::json(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_init_creates_file() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();

        let command = Commands::Config {
            action: ConfigAction::Init,
        };
        handle_command(command, workspace, &GlobalOptions::default())
            .await
            .unwrap();

        let config_path = workspace.join(".docquery").join("config.toml");
        assert!(config_path.exists());

        // Verify it's valid TOML
        let content = std::fs::read_to_string(&config_path).unwrap();
        let parsed: DocQueryConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed.backend.port, 8000);
        assert!(!parsed.translation.enabled);
    }

    #[tokio::test]
    async fn test_config_init_idempotent() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();
        let config_dir = workspace.join(".docquery");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "[backend]\nport = 9100\n").unwrap();

        let command = Commands::Config {
            action: ConfigAction::Init,
        };
        handle_command(command, workspace, &GlobalOptions::default())
            .await
            .unwrap();

        let content = std::fs::read_to_string(config_dir.join("config.toml")).unwrap();
        assert_eq!(content, "[backend]\nport = 9100\n");
    }

    #[tokio::test]
    async fn test_ask_without_target_fails_before_network() {
        let dir = TempDir::new().unwrap();
        let options = GlobalOptions {
            // Nothing listens here; a network attempt would surface differently.
            backend: Some("http://127.0.0.1:9".into()),
            json: false,
        };
        let command = Commands::Ask {
            question: "cost".into(),
            docs: vec![],
            all: false,
            translate: false,
            from: None,
            to: None,
        };
        let err = handle_command(command, dir.path(), &options)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no target selected"), "{err}");
    }

    #[tokio::test]
    async fn test_analyze_rejects_unknown_kind() {
        let dir = TempDir::new().unwrap();
        let command = Commands::Analyze {
            document: "a.pdf".into(),
            kind: "sentiment".into(),
        };
        let err = handle_command(command, dir.path(), &GlobalOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unsupported analysis type"));
    }

    #[test]
    fn test_load_applies_flags() {
        let dir = TempDir::new().unwrap();
        let options = GlobalOptions {
            backend: Some("http://docs.internal:8000".into()),
            json: true,
        };
        let config = load(dir.path(), &options).unwrap();
        assert_eq!(
            config.backend.base_url.as_deref(),
            Some("http://docs.internal:8000")
        );
        assert!(config.ui.json_output);
    }

    #[test]
    fn test_apply_languages_partial_override() {
        let mock = Arc::new(docquery_core::MockBackend::new());
        let mut session = Session::with_backend(DocQueryConfig::default(), mock);
        apply_languages(&mut session, Some("es"), None).unwrap();
        let pair = session.translation().languages();
        assert_eq!(pair.source, Language::Es);
        assert_eq!(pair.target, Language::En);

        assert!(apply_languages(&mut session, None, Some("fr")).is_err());
    }
}
