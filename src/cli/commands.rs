//! Command implementations.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::{OutputFormat, OutputOptions, render};
use crate::agents::{AgentInvoker, AssetFile, CommandClipboard, HttpAgentClient};
use crate::config::Config;
use crate::session::{AppSession, SessionSettings, ShareTarget};

pub(crate) fn load_config(path: Option<&str>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    config.validate()?;
    Ok(config)
}

pub(crate) fn client(config: &Config) -> Result<HttpAgentClient> {
    HttpAgentClient::from_config(&config.agents).context("Failed to create agent client")
}

pub(crate) fn cmd_config(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
            println!("{text}");
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

/// Print a result, then the optional share copy and activity log.
fn emit<T: Serialize>(
    session: &AppSession,
    value: &T,
    text: String,
    target: ShareTarget,
    out: OutputOptions,
) -> Result<()> {
    match out.format {
        OutputFormat::Text => {
            print!("{text}");
            if out.activity {
                print!("{}", render::progress(&session.progress()));
                print!("{}", render::activity(session.log()));
            }
        }
        OutputFormat::Json => {
            let doc = if out.activity {
                serde_json::json!({
                    "result": value,
                    "activity": session.log().iter().collect::<Vec<_>>(),
                })
            } else {
                serde_json::to_value(value)?
            };
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    if out.copy {
        copy_share(session, target);
    }
    Ok(())
}

fn copy_share(session: &AppSession, target: ShareTarget) {
    match CommandClipboard::detect() {
        Some(clipboard) => {
            if session.share(target, &clipboard) {
                eprintln!("Copied to clipboard.");
            } else {
                eprintln!("Nothing copied.");
            }
        }
        None => eprintln!("No clipboard command found (pbcopy, wl-copy, xclip)."),
    }
}

pub(crate) fn cmd_replay(settings: SessionSettings, out: OutputOptions) -> Result<()> {
    let mut session = AppSession::new(settings);
    session.set_replay(true);
    session.begin_report()?;

    let analysis = session.analyst().result().context("replay has no analysis")?;
    let round = session.debate().latest().context("replay has no debate round")?;
    let creation = session.creator().result().context("replay has no creation")?;
    let report = session.report().report().context("replay has no report")?;

    let text = format!(
        "{}\n{}\n{}\n{}",
        render::analysis(analysis),
        render::debate_round(round),
        render::creation(creation),
        render::report(report)
    );
    let value = serde_json::json!({
        "analysis": analysis,
        "debate": round,
        "creation": creation,
        "report": report,
    });
    emit(&session, &value, text, ShareTarget::Report, out)
}

async fn read_stdin() -> Result<String> {
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("Failed to read conversation from stdin")?;
    Ok(text)
}

pub(crate) async fn cmd_analyze(
    settings: SessionSettings,
    client: &HttpAgentClient,
    text: Option<String>,
    files: Vec<PathBuf>,
    out: OutputOptions,
) -> Result<()> {
    let mut session = AppSession::new(settings);

    if files.is_empty() {
        let text = match text {
            Some(text) => text,
            None => read_stdin().await?,
        };
        session.analyze(client, &text).await?;
    } else {
        let mut assets = Vec::with_capacity(files.len());
        for path in &files {
            assets.push(AssetFile::from_path(path).await?);
        }
        session.upload_and_analyze(client, client, &assets).await?;
    }

    let result = session
        .analyst()
        .result()
        .context("Analyst Agent returned no result")?;
    emit(&session, result, render::analysis(result), ShareTarget::Analysis, out)
}

pub(crate) async fn cmd_debate(
    settings: SessionSettings,
    client: &HttpAgentClient,
    topic: &str,
    rounds: Option<u32>,
    out: OutputOptions,
) -> Result<()> {
    let mut session = AppSession::new(settings);
    let rounds = rounds.unwrap_or_else(|| session.max_debate_rounds());

    session.start_debate(client, topic).await?;
    if out.format == OutputFormat::Text
        && let Some(round) = session.debate().latest()
    {
        println!("{}", render::debate_round(round));
    }
    while session.debate().can_continue(rounds) {
        session.continue_debate(client).await?;
        if out.format == OutputFormat::Text
            && let Some(round) = session.debate().latest()
        {
            println!("{}", render::debate_round(round));
        }
    }

    match out.format {
        OutputFormat::Text => emit(&session, &(), String::new(), ShareTarget::Debate, out),
        OutputFormat::Json => {
            let all = session.debate().rounds().to_vec();
            emit(&session, &all, String::new(), ShareTarget::Debate, out)
        }
    }
}

/// Run the interview, reading one answer per line until content arrives.
async fn interview<R, W>(
    session: &mut AppSession,
    invoker: &dyn AgentInvoker,
    input: R,
    mut output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut shown = 0;

    session.start_interview(invoker).await?;
    loop {
        let creator = session.creator();
        let transcript = creator.transcript();
        for turn in &transcript[shown..] {
            output
                .write_all(format!("{}\n", render::turn(turn)).as_bytes())
                .await?;
        }
        if creator.result().is_some() {
            break;
        }
        if transcript.len() > shown
            && let Some(counter) = creator.current_prompt().and_then(render::question_counter)
        {
            output.write_all(format!("{counter}\n").as_bytes()).await?;
        }
        shown = transcript.len();

        output.write_all(b"> ").await?;
        output.flush().await?;
        let Some(line) = lines.next_line().await? else {
            anyhow::bail!("Interview ended before any content was generated");
        };
        if line.trim().is_empty() {
            continue;
        }
        session.answer(invoker, &line).await?;
        // the user's own turn is already on screen
        shown += 1;
    }
    output.flush().await?;
    Ok(())
}

pub(crate) async fn cmd_create(
    settings: SessionSettings,
    client: &HttpAgentClient,
    out: OutputOptions,
) -> Result<()> {
    let mut session = AppSession::new(settings);
    interview(
        &mut session,
        client,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stderr(),
    )
    .await?;

    let content = session
        .creator()
        .result()
        .context("Creator Agent returned no content")?;
    emit(&session, content, render::creation(content), ShareTarget::Creation, out)
}

/// Feed prepared answers in order until the creator produces content.
async fn scripted_interview(
    session: &mut AppSession,
    invoker: &dyn AgentInvoker,
    answers: &[String],
) -> Result<()> {
    session.start_interview(invoker).await?;
    let mut answers = answers.iter();
    while session.creator().result().is_none() {
        let Some(answer) = answers.next() else {
            anyhow::bail!("Ran out of answers before the Creator Agent produced content");
        };
        session.answer(invoker, answer).await?;
    }
    Ok(())
}

async fn full_session(
    session: &mut AppSession,
    invoker: &dyn AgentInvoker,
    chat: &str,
    topic: &str,
    answers: &[String],
) -> Result<()> {
    session.analyze(invoker, chat).await?;
    session.start_debate(invoker, topic).await?;
    scripted_interview(session, invoker, answers).await?;
    session.generate_report(invoker).await?;
    Ok(())
}

pub(crate) async fn cmd_report(
    settings: SessionSettings,
    client: &HttpAgentClient,
    chat: &str,
    topic: &str,
    answers: &[String],
    out: OutputOptions,
) -> Result<()> {
    let mut session = AppSession::new(settings);
    full_session(&mut session, client, chat, topic, answers).await?;

    let report = session
        .report()
        .report()
        .context("Vibe Orchestrator returned no report")?;
    emit(&session, report, render::report(report), ShareTarget::Report, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentKind;
    use crate::error::InteractionError;
    use crate::session::Screen;
    use crate::session::test_helpers::MockInvoker;
    use serde_json::json;

    fn creation() -> serde_json::Value {
        json!({"phase": "generation", "title": "Ode to Sam", "content": "Roses..."})
    }

    #[tokio::test]
    async fn test_interview_reads_answers_until_content() {
        let invoker = MockInvoker::new();
        invoker.reply(AgentKind::Creator, json!({"question": "Who is it for?"}));
        invoker.reply(
            AgentKind::Creator,
            json!({"question": "What style?", "question_number": 2, "total_questions": 3}),
        );
        invoker.reply(AgentKind::Creator, creation());

        let mut session = AppSession::new(SessionSettings::default());
        let input: &[u8] = b"Sam\n\n  \nA sonnet\nunused\n";
        let mut output = Vec::new();
        interview(&mut session, &invoker, input, &mut output)
            .await
            .unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Creator: Who is it for?"));
        assert!(printed.contains("Creator: What style?\n(question 2 of 3)\n"));
        assert!(!printed.contains("You: Sam"));
        assert_eq!(
            session.creator().result().unwrap().title.as_deref(),
            Some("Ode to Sam")
        );
        let sent: Vec<_> = invoker
            .requests()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(sent.len(), 3);
        assert!(sent[1].ends_with("Sam"));
        assert!(sent[2].ends_with("A sonnet"));
    }

    #[tokio::test]
    async fn test_interview_eof_without_content() {
        let invoker = MockInvoker::new();
        invoker.reply(AgentKind::Creator, json!({"question": "Who is it for?"}));

        let mut session = AppSession::new(SessionSettings::default());
        let input: &[u8] = b"";
        let err = interview(&mut session, &invoker, input, Vec::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Interview ended"));
    }

    #[tokio::test]
    async fn test_full_session_unlocks_report() {
        let invoker = MockInvoker::new();
        invoker.reply(AgentKind::Analyst, json!({"overall_score": 77, "verdict": "Cute"}));
        invoker.reply(AgentKind::Debate, json!({"topic": "t", "round": 1}));
        invoker.reply(AgentKind::Creator, json!({"question": "Who?"}));
        invoker.reply(AgentKind::Creator, creation());
        invoker.reply(AgentKind::Orchestrator, json!({"vibe_score": 81}));

        let mut session = AppSession::new(SessionSettings::default());
        let answers = vec!["Sam".to_string(), "extra".to_string()];
        full_session(&mut session, &invoker, "hi", "t", &answers)
            .await
            .unwrap();

        assert_eq!(session.report().report().unwrap().vibe_score, Some(81.0));
        assert_eq!(session.screen(), Screen::Report);
        assert_eq!(invoker.requests().len(), 5);
    }

    #[tokio::test]
    async fn test_scripted_interview_runs_out_of_answers() {
        let invoker = MockInvoker::new();
        invoker.reply(AgentKind::Creator, json!({"question": "Who?"}));
        invoker.reply(AgentKind::Creator, json!({"question": "Why?"}));

        let mut session = AppSession::new(SessionSettings::default());
        let err = scripted_interview(&mut session, &invoker, &["Sam".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Ran out of answers"));
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_message() {
        let invoker = MockInvoker::new();
        let mut session = AppSession::new(SessionSettings::default());
        let err = full_session(&mut session, &invoker, "hi", "t", &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InteractionError>(),
            Some(InteractionError::Transport { .. })
        ));
    }
}
