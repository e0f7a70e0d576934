use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use draftmaster::reference::DataDragon;
use draftmaster::render::{render_bundle, render_patch_overview};
use draftmaster::settings::SETTINGS_FILE_NAME;
use draftmaster::{
    AppError, GenerateInput, OpenAIBackend, Perspective, RosterSelection, Session, Settings,
    SummonerIdentity, Team, logging,
};

const WRAP_WIDTH: usize = 88;

#[derive(Debug, Deserialize)]
struct DraftFile {
    blue: Team,
    red: Team,
    #[serde(default)]
    perspective: Perspective,
    summoner: SummonerIdentity,
}

impl From<DraftFile> for GenerateInput {
    fn from(draft: DraftFile) -> Self {
        GenerateInput::new(
            RosterSelection::from_teams(draft.blue, draft.red),
            draft.perspective,
            draft.summoner,
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let Some(draft_path) = std::env::args().nth(1).map(PathBuf::from) else {
        bail!("usage: draftmaster <draft.json>");
    };

    let data_dir = Settings::data_dir();
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(_) => {
            let settings = Settings::default();
            // First run: leave a file the user can edit.
            if let Err(e) = settings.save() {
                eprintln!(
                    "Could not write {}: {}",
                    data_dir.join(SETTINGS_FILE_NAME).display(),
                    e
                );
            }
            settings
        }
    };

    match logging::init(&data_dir, settings.log_level()) {
        Ok(log_file) => log::info!("Logging to {}", log_file.display()),
        Err(e) => eprintln!("Logging disabled: {}", e),
    }

    let draft: DraftFile = serde_json::from_str(
        &std::fs::read_to_string(&draft_path)
            .with_context(|| format!("reading {}", draft_path.display()))?,
    )
    .with_context(|| format!("parsing {}", draft_path.display()))?;
    let input = GenerateInput::from(draft);
    let perspective = input.perspective;

    match settings.resolved_openai_api_key() {
        Some(key) => {
            if !settings.validate_api_key(&key).await {
                eprintln!("Warning: the OpenAI API key could not be validated; analysis may fall back to samples.");
            }
        }
        None => eprintln!("No OpenAI API key configured: sample analysis will be shown and chat is disabled."),
    }

    let backend = Arc::new(OpenAIBackend::from_settings(&settings));
    let session = Session::from_settings(&settings, Arc::clone(&backend), backend);

    let data_dragon = DataDragon::from_settings(&settings);
    let version = data_dragon.latest_version().await.to_string();
    let (overview, source) = session.client().patch_overview(&version).await;
    println!("{}", render_patch_overview(&overview, source, WRAP_WIDTH));

    println!("Generating analysis...\n");
    let bundle = session
        .generate(input)
        .await
        .context("generating analysis")?;
    println!("{}", render_bundle(&bundle, perspective, WRAP_WIDTH));

    println!("Ask about the analysis (/reset to clear, /quit to exit).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "/quit" => break,
            "/reset" => {
                session.reset();
                println!("Session cleared. Run draftmaster again to analyze a new draft.");
            }
            question => match session.ask(question).await {
                Ok(answer) => println!("\n{}\n", textwrap::fill(&answer, WRAP_WIDTH)),
                Err(AppError::NoAnalysis) => println!("No analysis yet. Restart with a draft file."),
                Err(e) => println!("Error: {}", e),
            },
        }
    }

    Ok(())
}
