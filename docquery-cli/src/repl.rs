//! Interactive REPL.
//!
//! Plain lines are submitted as questions against the current selection.
//! Lines starting with `/` drive the selection, translation toggle and
//! document commands.

use crate::commands::{apply_languages, show};
use crate::render;
use crate::slash::CommandRegistry;
use docquery_core::{AnalysisKind, ConnectionStatus, DocQueryError, DocumentRef, Session};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;

/// What the loop does after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Parse an `on`/`off` style argument. Empty means "toggle".
fn parse_switch(arg: &str) -> Option<Option<bool>> {
    match arg.trim().to_ascii_lowercase().as_str() {
        "" => Some(None),
        "on" | "yes" | "true" | "1" => Some(Some(true)),
        "off" | "no" | "false" | "0" => Some(Some(false)),
        _ => None,
    }
}

fn prompt(session: &Session) -> String {
    let selection = session.selection();
    let target = if selection.search_all() {
        "all".to_string()
    } else if !selection.multi().is_empty() {
        format!("{} docs", selection.multi().len())
    } else if let Some(doc) = selection.single() {
        doc.to_string()
    } else {
        "-".to_string()
    };
    let translate = if session.translation().enabled {
        format!(" {}", session.translation().languages())
    } else {
        String::new()
    };
    format!("[{target}{translate}] > ")
}

pub async fn run_interactive(mut session: Session) -> anyhow::Result<()> {
    println!("\x1b[1;32m  DocQuery\x1b[0m  {}", session.base_url());

    let report = session.start().await;
    println!(
        "  {}",
        render::connection(report.status, session.base_url())
    );
    match &report.documents {
        Ok(count) => println!("  {} document(s) available", count),
        Err(e) => println!("  Could not list documents: {}", e.user_message()),
    }
    if report.status != ConnectionStatus::Connected {
        println!("  Start the backend and run /refresh.");
    }
    println!("  Type /help for commands, /quit to exit\n");

    let registry = CommandRegistry::with_defaults();
    let stdin = io::stdin();
    loop {
        print!("\x1b[1;34m{}\x1b[0m", prompt(&session));
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input).is_err() || input.is_empty() {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match handle_slash(&mut session, &registry, input).await {
                Ok(Flow::Quit) => {
                    println!("Goodbye!");
                    break;
                }
                Ok(Flow::Continue) => {}
                Err(e) => eprintln!("Error: {}", describe(&e)),
            }
            continue;
        }

        let json = session.config().ui.json_output;
        match session.ask(input).await {
            Ok(outcome) => {
                let ui = session.config().ui.clone();
                show(json, &outcome, || render::outcome(&outcome, &ui))?;
            }
            Err(e) => eprintln!("Error: {}", e.user_message()),
        }
    }

    Ok(())
}

fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<DocQueryError>() {
        Some(err) => err.user_message(),
        None => err.to_string(),
    }
}

/// Resolve a document name against the registry, or explain why not.
async fn known_document(session: &Session, name: &str) -> anyhow::Result<DocumentRef> {
    if name.trim().is_empty() {
        anyhow::bail!("a document name is required");
    }
    session
        .find_document(name)
        .await
        .ok_or_else(|| anyhow::anyhow!("unknown document '{}' (see /list)", name.trim()))
}

/// Split `rest` into a known document and an optional trailing argument.
///
/// The whole of `rest` is tried as a document name first, so names ending in
/// a number or a kind keyword are never cut short.
async fn document_with_suffix<T: FromStr>(
    session: &Session,
    rest: &str,
) -> anyhow::Result<(DocumentRef, Option<T>)> {
    if let Some(doc) = session.find_document(rest).await {
        return Ok((doc, None));
    }
    if let Some((name, last)) = rest.rsplit_once(' ')
        && let Ok(value) = last.parse::<T>()
    {
        return Ok((known_document(session, name).await?, Some(value)));
    }
    Ok((known_document(session, rest).await?, None))
}

async fn handle_slash(
    session: &mut Session,
    registry: &CommandRegistry,
    input: &str,
) -> anyhow::Result<Flow> {
    let (cmd, rest) = input.split_once(' ').unwrap_or((input, ""));
    let rest = rest.trim();
    let Some(info) = registry.lookup(cmd) else {
        anyhow::bail!("unknown command '{}' (see /help)", cmd);
    };
    let json = session.config().ui.json_output;
    let ui = session.config().ui.clone();

    match info.name {
        "/quit" => return Ok(Flow::Quit),
        "/help" => println!("{}", registry.help_text()),
        "/use" => {
            let doc = known_document(session, rest).await?;
            println!("Selected {}", doc);
            session.select_single(doc);
        }
        "/toggle" => {
            let doc = known_document(session, rest).await?;
            if session.toggle_multi(doc.clone()) {
                println!("Added {} to the comparison set", doc);
            } else {
                println!("Removed {} from the comparison set", doc);
            }
        }
        "/all" => {
            let Some(switch) = parse_switch(rest) else {
                anyhow::bail!("usage: {}", info.usage);
            };
            let on = switch.unwrap_or(!session.selection().search_all());
            session.set_search_all(on);
            println!("Search all documents: {}", if on { "on" } else { "off" });
        }
        "/clear" => {
            session.clear_selection();
            println!("Selection cleared");
        }
        "/translate" => match parse_switch(rest) {
            Some(switch) => {
                let on = switch.unwrap_or(!session.translation().enabled);
                session.set_translation_enabled(on);
                println!(
                    "Query translation: {}",
                    if on {
                        format!("on ({})", session.translation().languages())
                    } else {
                        "off".to_string()
                    }
                );
            }
            None => {
                let outcome = session.translate(rest).await?;
                show(json, &outcome, || render::translation(&outcome, &ui))?;
            }
        },
        "/lang" => {
            let mut parts = rest.split_whitespace();
            let (Some(from), Some(to)) = (parts.next(), parts.next()) else {
                anyhow::bail!("usage: {}", info.usage);
            };
            apply_languages(session, Some(from), Some(to))?;
            let pair = session.translation().languages();
            println!("Languages: {} -> {}", pair.source.label(), pair.target.label());
        }
        "/list" => {
            let docs = session.registry().documents().await;
            show(json, &docs, || render::documents(&docs))?;
        }
        "/refresh" => {
            let docs = session.refresh().await?;
            show(json, &docs, || render::documents(&docs))?;
        }
        "/upload" => {
            if rest.is_empty() {
                anyhow::bail!("usage: {}", info.usage);
            }
            let receipt = session.upload(Path::new(rest)).await?;
            show(json, &receipt, || receipt.message.clone())?;
        }
        "/analyze" => {
            let (doc, kind) = document_with_suffix::<AnalysisKind>(session, rest).await?;
            let kind = kind.unwrap_or(AnalysisKind::Summary);
            let result = session.analyze(&doc, kind).await?;
            show(json, &result, || render::analysis(&doc, &result, &ui))?;
        }
        "/view" => {
            let (doc, page) = document_with_suffix::<u32>(session, rest).await?;
            println!("{}", session.view_url(&doc, page.unwrap_or(1)));
        }
        "/status" => {
            println!("{}", render::connection(session.status(), session.base_url()));
            println!(
                "{}",
                render::selection(session.selection(), session.translation())
            );
            println!("Operation: {}", session.dispatcher().phase());
            if let Some(err) = session.last_error() {
                println!("Last error: {}", err);
            }
        }
        other => anyhow::bail!("command {} is not available here", other),
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docquery_core::{DocQueryConfig, Language, MockBackend};
    use std::sync::Arc;

    async fn session() -> Session {
        let mock = Arc::new(MockBackend::with_documents(&["a.pdf", "b.pdf", "Q3 report.pdf"]));
        let mut session = Session::with_backend(DocQueryConfig::default(), mock);
        session.start().await;
        session
    }

    #[test]
    fn test_parse_switch() {
        assert_eq!(parse_switch(""), Some(None));
        assert_eq!(parse_switch("ON"), Some(Some(true)));
        assert_eq!(parse_switch("off"), Some(Some(false)));
        assert_eq!(parse_switch("Kosten"), None);
    }

    #[tokio::test]
    async fn test_selection_commands() {
        let mut session = session().await;
        let registry = CommandRegistry::with_defaults();

        handle_slash(&mut session, &registry, "/use a.pdf").await.unwrap();
        assert_eq!(session.selection().single(), Some(&DocumentRef::from("a.pdf")));

        handle_slash(&mut session, &registry, "/t b.pdf").await.unwrap();
        handle_slash(&mut session, &registry, "/toggle Q3 report.pdf")
            .await
            .unwrap();
        assert!(session.selection().single().is_none());
        assert_eq!(session.selection().multi().len(), 2);

        handle_slash(&mut session, &registry, "/all").await.unwrap();
        assert!(session.selection().search_all());
        assert!(session.selection().multi().is_empty());

        handle_slash(&mut session, &registry, "/clear").await.unwrap();
        assert!(session.selection().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_document_is_rejected() {
        let mut session = session().await;
        let registry = CommandRegistry::with_defaults();
        let err = handle_slash(&mut session, &registry, "/use missing.pdf")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unknown document"));
        assert!(session.selection().is_empty());
    }

    #[tokio::test]
    async fn test_translation_commands() {
        let mut session = session().await;
        let registry = CommandRegistry::with_defaults();

        handle_slash(&mut session, &registry, "/translate on").await.unwrap();
        assert!(session.translation().enabled);
        handle_slash(&mut session, &registry, "/lang es de").await.unwrap();
        assert_eq!(session.translation().source_lang, Language::Es);
        assert_eq!(session.translation().target_lang, Language::De);
        assert!(handle_slash(&mut session, &registry, "/lang es").await.is_err());
        handle_slash(&mut session, &registry, "/translate").await.unwrap();
        assert!(!session.translation().enabled);
    }

    #[tokio::test]
    async fn test_quit_and_unknown() {
        let mut session = session().await;
        let registry = CommandRegistry::with_defaults();
        assert_eq!(
            handle_slash(&mut session, &registry, "/exit").await.unwrap(),
            Flow::Quit
        );
        assert!(handle_slash(&mut session, &registry, "/frobnicate").await.is_err());
    }

    #[tokio::test]
    async fn test_trailing_number_is_part_of_document_name_when_listed() {
        let mock = Arc::new(MockBackend::with_documents(&["report 2024", "report"]));
        let mut session = Session::with_backend(DocQueryConfig::default(), mock);
        session.start().await;

        let (doc, page) = document_with_suffix::<u32>(&session, "report 2024")
            .await
            .unwrap();
        assert_eq!(doc, DocumentRef::from("report 2024"));
        assert_eq!(page, None);

        let (doc, page) = document_with_suffix::<u32>(&session, "report 2024 7")
            .await
            .unwrap();
        assert_eq!(doc, DocumentRef::from("report 2024"));
        assert_eq!(page, Some(7));

        let (doc, page) = document_with_suffix::<u32>(&session, "report 3")
            .await
            .unwrap();
        assert_eq!(doc, DocumentRef::from("report"));
        assert_eq!(page, Some(3));
    }

    #[tokio::test]
    async fn test_analysis_kind_suffix() {
        let session = session().await;
        let (doc, kind) = document_with_suffix::<AnalysisKind>(&session, "Q3 report.pdf all")
            .await
            .unwrap();
        assert_eq!(doc, DocumentRef::from("Q3 report.pdf"));
        assert_eq!(kind, Some(AnalysisKind::All));

        assert!(
            document_with_suffix::<AnalysisKind>(&session, "missing.pdf summary")
                .await
                .is_err()
        );
        assert!(document_with_suffix::<u32>(&session, "").await.is_err());
    }

    #[test]
    fn test_prompt_reflects_selection() {
        let mock = Arc::new(MockBackend::new());
        let mut session = Session::with_backend(DocQueryConfig::default(), mock);
        assert_eq!(prompt(&session), "[-] > ");
        session.set_search_all(true);
        session.set_translation_enabled(true);
        assert_eq!(prompt(&session), "[all de -> en] > ");
    }
}
