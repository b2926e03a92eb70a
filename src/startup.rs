//! Wiring for one run: config, logging, session, navigation, screen, output.

use std::io::{BufRead, Write};
use std::process::ExitCode;

use tracing::{error, info, warn};

use crate::cli::{Cli, Command, CompanyCommand, CompanyFields, StockCommand, StockFields};
use crate::config::{config_schema, load_config};
use crate::error::CliError;
use crate::guard::{navigate, View};
use crate::models::{CompanyDraft, StockDraft};
use crate::render::Renderer;
use crate::screens::{
    AdminView, CompaniesScreen, Confirm, HomeView, LoginView, Navbar, ScreenStatus,
    StockMarketsScreen,
};
use crate::session::create_identity_provider;
use crate::state::AppState;
use crate::utils::logger::init_logging;

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    /// The screen ended in an error state, or the guard turned the request away.
    pub failed: bool,
}

/// Asks on the terminal.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = std::io::stderr();
        if write!(stderr, "{} [y/N] ", prompt).and_then(|_| stderr.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"),
            Err(_) => false,
        }
    }
}

fn assume_yes(_prompt: &str) -> bool {
    true
}

/// Parse-independent entry point used by the binary.
pub async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    if let Command::Schema = cli.command {
        println!("{}", config_schema()?);
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli.config)?;
    init_logging(&config.logging)?;
    info!(
        "Starting {} {} against {}",
        config.logging.service_name, config.logging.service_version, config.api.base_url
    );

    let provider = create_identity_provider(&config.identity)?;
    let state = AppState::new(config, provider)?;
    let renderer = Renderer::new(!cli.no_color);

    if let Err(e) = state.session.initialize().await {
        // The session never becomes ready; nothing past this point may run.
        error!("Session could not be initialized: {}", e);
        println!("{}", renderer.status(&ScreenStatus::Loading).unwrap_or_default());
        return Err(e.into());
    }

    let outcome = execute(&state, cli.command, &StdinConfirm, renderer).await?;
    print!("{}", outcome.output);
    Ok(if outcome.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Perform one command against an initialized session.
pub async fn execute(
    state: &AppState,
    command: Command,
    confirm: &dyn Confirm,
    renderer: Renderer,
) -> Result<Outcome, CliError> {
    let mut login_error = None;
    match &command {
        Command::Login if !state.session.is_authenticated() => {
            if let Err(e) = state.session.login().await {
                warn!("Login failed: {}", e);
                login_error = Some(e.to_string());
            }
        }
        Command::Logout => state.session.logout().await,
        Command::Register => {
            let url = state.session.register()?;
            return Ok(Outcome {
                output: format!("Open this link to create an account:\n{}\n", url),
                failed: false,
            });
        }
        Command::Schema => {
            return Ok(Outcome {
                output: format!("{}\n", config_schema()?),
                failed: false,
            })
        }
        _ => {}
    }

    let Some(requested) = command.view() else {
        return Ok(Outcome {
            output: String::new(),
            failed: false,
        });
    };

    let session = state.session.snapshot();
    let view = navigate(requested.path(), &session)?;
    let mut output = renderer.navbar(&Navbar::from_session(&session));
    output.push('\n');

    // Landing somewhere else is a refusal, except login sending a signed-in user home.
    let mut failed = view != requested && requested != View::Login;
    if failed {
        warn!("{} is not available; showing {}", requested, view);
        let message = match view {
            View::Login => format!("Sign in to open {}", requested.title()),
            _ => format!("You are not allowed to open {}", requested.title()),
        };
        output.push_str(&renderer.status(&ScreenStatus::Error(message)).unwrap_or_default());
        output.push('\n');
    }
    if let Some(message) = login_error {
        failed = true;
        output.push_str(&renderer.status(&ScreenStatus::Error(message)).unwrap_or_default());
        output.push('\n');
    }

    match (view, command) {
        (View::Companies, Command::Companies(action)) => {
            let (body, screen_failed) = companies(state, action, confirm, renderer).await;
            output.push_str(&body);
            failed |= screen_failed;
        }
        (View::StockMarkets, Command::StockMarkets(action)) => {
            let (body, screen_failed) = stock_markets(state, action, confirm, renderer).await;
            output.push_str(&body);
            failed |= screen_failed;
        }
        (View::Home, _) => output.push_str(&renderer.home(&HomeView::from_session(&session))),
        (View::Login, _) => output.push_str(&renderer.login(&LoginView::new())),
        (View::Admin, _) => output.push_str(&renderer.admin(&AdminView::from_session(&session))),
        (view, _) => output.push_str(&format!("{}\n", view.title())),
    }

    Ok(Outcome { output, failed })
}

fn has_failed(status: &ScreenStatus) -> bool {
    matches!(status, ScreenStatus::Error(_))
}

async fn companies(
    state: &AppState,
    action: CompanyCommand,
    confirm: &dyn Confirm,
    renderer: Renderer,
) -> (String, bool) {
    let mut screen = CompaniesScreen::mount(state.api.clone()).await;
    match action {
        CompanyCommand::List => {}
        CompanyCommand::Show { id } => {
            if let Some(company) = screen.show(&id).await {
                return (renderer.company(&company), false);
            }
        }
        CompanyCommand::Create(fields) => {
            fill_company(screen.draft_mut(), fields);
            screen.submit().await;
        }
        CompanyCommand::Update { id, fields } => {
            if screen.edit_by_id(id) {
                fill_company(screen.draft_mut(), fields);
                screen.submit().await;
            }
        }
        CompanyCommand::Delete { id, yes } => {
            let confirm: &dyn Confirm = if yes { &assume_yes } else { confirm };
            screen.delete(&id, confirm).await;
        }
    }
    (renderer.companies(&screen), has_failed(&screen.status()))
}

async fn stock_markets(
    state: &AppState,
    action: StockCommand,
    confirm: &dyn Confirm,
    renderer: Renderer,
) -> (String, bool) {
    let mut screen = match &action {
        StockCommand::List {
            company: Some(company_id),
        } => StockMarketsScreen::mount_for_company(state.api.clone(), *company_id).await,
        _ => StockMarketsScreen::mount(state.api.clone()).await,
    };
    match action {
        StockCommand::List { .. } => {}
        StockCommand::Create(fields) => {
            fill_stock(screen.draft_mut(), fields);
            screen.submit().await;
        }
        StockCommand::Update { id, fields } => {
            if screen.edit_by_id(id) {
                fill_stock(screen.draft_mut(), fields);
                screen.submit().await;
            }
        }
        StockCommand::Delete { id, yes } => {
            let confirm: &dyn Confirm = if yes { &assume_yes } else { confirm };
            screen.delete(&id, confirm).await;
        }
    }
    (renderer.stock_markets(&screen), has_failed(&screen.status()))
}

fn fill_company(draft: &mut CompanyDraft, fields: CompanyFields) {
    let CompanyFields {
        name,
        sector,
        country,
    } = fields;
    for (slot, value) in [
        (&mut draft.name, name),
        (&mut draft.sector, sector),
        (&mut draft.country, country),
    ] {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

fn fill_stock(draft: &mut StockDraft, fields: StockFields) {
    let StockFields {
        date,
        open_value,
        close_value,
        volume,
        company_id,
    } = fields;
    for (slot, value) in [
        (&mut draft.date, date),
        (&mut draft.open_value, open_value),
        (&mut draft.close_value, close_value),
        (&mut draft.volume, volume),
        (&mut draft.company_id, company_id),
    ] {
        if let Some(value) = value {
            *slot = value;
        }
    }
}
