/*
[INPUT]:  Interactive user input via CLI + the member's open boards from Trello
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When SyncConfig schema changes
*/

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::{Input, MultiSelect, Password, Select, theme::ColorfulTheme};
use std::path::PathBuf;

use trello_board_adapter::{BoardFilter, ClientConfig, Credentials, TrelloClient};
use trello_board_sync::config::{
    CredentialsConfig, DEFAULT_UPDATE_INTERVAL_SECS, FetchStrategyKind, HttpConfig, SyncConfig,
};

pub async fn run_init(output: PathBuf) -> Result<()> {
    println!("{}", style("Welcome to Trello Board Sync Init").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a new sync configuration.").dim()
    );

    let theme = ColorfulTheme::default();

    println!("\n{}", style("--- Credentials ---").bold());
    let api_key: String = Input::with_theme(&theme)
        .with_prompt("API Key (https://trello.com/power-ups/admin)")
        .interact_text()?;

    let api_token: String = Password::with_theme(&theme)
        .with_prompt("API Token")
        .interact()?;

    let client = TrelloClient::with_config(ClientConfig::default())
        .context("build Trello client")?
        .with_credentials(Credentials::new(api_key.trim(), api_token.trim()));

    let member = client
        .get_member("me")
        .await
        .context("credentials rejected by Trello")?;
    println!(
        "Signed in as {} ({})",
        style(&member.full_name).green(),
        member.username
    );

    let boards = client
        .list_boards(BoardFilter::Open)
        .await
        .context("list open boards")?;
    if boards.is_empty() {
        bail!("no open boards found for {}", member.username);
    }

    println!("\n{}", style("--- Boards ---").bold());
    let items: Vec<String> = boards
        .iter()
        .map(|board| format!("{} ({})", board.name, board.id))
        .collect();
    let selections = MultiSelect::with_theme(&theme)
        .with_prompt("Select boards to sync")
        .items(&items)
        .interact()?;

    if selections.is_empty() {
        println!("{}", style("No boards selected.").yellow());
        return Ok(());
    }
    let board_ids = selections
        .into_iter()
        .map(|index| boards[index].id.clone())
        .collect();

    println!("\n{}", style("--- Polling ---").bold());
    let update_interval_secs: u64 = Input::with_theme(&theme)
        .with_prompt("Update interval (seconds)")
        .default(DEFAULT_UPDATE_INTERVAL_SECS)
        .interact_text()?;

    let strategies = ["batched", "sequential"];
    let strategy_selection = Select::with_theme(&theme)
        .with_prompt("Fetch strategy")
        .items(&strategies)
        .default(0)
        .interact()?;
    let fetch_strategy = if strategy_selection == 0 {
        FetchStrategyKind::Batched
    } else {
        FetchStrategyKind::Sequential
    };

    let config = SyncConfig {
        credentials: CredentialsConfig {
            api_key: api_key.trim().to_string(),
            api_token: api_token.trim().to_string(),
        },
        board_ids,
        update_interval_secs,
        fetch_strategy,
        http: HttpConfig::default(),
    };
    config.validate()?;

    let yaml = config.to_yaml()?;
    std::fs::write(&output, yaml)
        .context(format!("failed to write config to {}", output.display()))?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );

    Ok(())
}
