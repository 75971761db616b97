use crate::{
    config::AppConfig,
    contract::{
        Approval,
        GameContract,
    },
    errors::ClientError,
    game::{
        self,
        HistoryEntry,
        Move,
    },
    provider::{
        self,
        Connection,
        InjectedWallet,
        KeystoreWallet,
        Unlock,
        WalletEvent,
        WalletWatch,
    },
    ui,
    wallets,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use fuels::types::ContractId;
use std::{
    fmt,
    path::PathBuf,
    pin::pin,
};
use tracing::{
    debug,
    error,
    info,
    warn,
};

const UNKNOWN_ERROR: &str = "Unknown error";

/// The single message shown to the user. Each variant is one outcome of the
/// three operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notice {
    WalletMissing { dir: PathBuf },
    Connected { account: String },
    ConnectionDeclined,
    ConnectionError(String),
    NotConnected,
    Submitting(Move),
    GamePlayed,
    TransactionDeclined,
    TransactionError(String),
    HistoryUpdated,
    HistoryFailed(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tone {
    Info,
    Success,
    Declined,
    Error,
}

impl Notice {
    pub fn tone(&self) -> Tone {
        match self {
            Notice::Submitting(_) => Tone::Info,
            Notice::Connected { .. } | Notice::GamePlayed | Notice::HistoryUpdated => {
                Tone::Success
            }
            Notice::ConnectionDeclined | Notice::TransactionDeclined => Tone::Declined,
            Notice::WalletMissing { .. }
            | Notice::ConnectionError(_)
            | Notice::NotConnected
            | Notice::TransactionError(_)
            | Notice::HistoryFailed(_) => Tone::Error,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::WalletMissing { dir } => write!(
                f,
                "Please install a wallet! No forc-wallet keystore found in {}",
                dir.display()
            ),
            Notice::Connected { account } => write!(f, "Connected: {account}"),
            Notice::ConnectionDeclined => write!(f, "Connection declined"),
            Notice::ConnectionError(message) => {
                write!(f, "Connection error: {message}")
            }
            Notice::NotConnected => write!(f, "Please connect your wallet first!"),
            Notice::Submitting(mv) => write!(f, "Submitting move \"{mv}\"..."),
            Notice::GamePlayed => {
                write!(f, "Game played! The result will show up in your history.")
            }
            Notice::TransactionDeclined => write!(f, "Transaction declined"),
            Notice::TransactionError(message) => {
                write!(f, "Transaction error: {message}")
            }
            Notice::HistoryUpdated => write!(f, "History updated."),
            Notice::HistoryFailed(message) => {
                write!(f, "Failed to load history: {message}")
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub network: String,
    pub contract_id: String,
    pub wallet_label: Option<String>,
    pub account: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub loading: bool,
    pub notice: Option<Notice>,
    pub selected_move: Move,
}

pub struct AppController<W: InjectedWallet> {
    wallet: Option<W>,
    wallet_dir: PathBuf,
    network: String,
    contract_id: ContractId,
    connection: Option<Connection<W::Contract>>,
    history: Vec<HistoryEntry>,
    loading: bool,
    notice: Option<Notice>,
    selected_move: Move,
}

impl<W: InjectedWallet> AppController<W> {
    pub fn new(wallet: Option<W>, contract_id: ContractId, wallet_dir: PathBuf) -> Self {
        Self {
            wallet,
            wallet_dir,
            network: String::new(),
            contract_id,
            connection: None,
            history: Vec::new(),
            loading: false,
            notice: None,
            selected_move: Move::Rock,
        }
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    pub fn wallet(&self) -> Option<&W> {
        self.wallet.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn selected_move(&self) -> Move {
        self.selected_move
    }

    pub fn select_move(&mut self, mv: Move) {
        self.selected_move = mv;
    }

    pub fn select_next_move(&mut self) {
        self.selected_move = self.selected_move.next();
    }

    pub fn select_prev_move(&mut self) {
        self.selected_move = self.selected_move.prev();
    }

    /// Whether it is worth prompting for the wallet password at all.
    pub fn request_connect(&mut self) -> bool {
        if self.wallet.is_none() {
            self.notice = Some(Notice::WalletMissing {
                dir: self.wallet_dir.clone(),
            });
            return false;
        }
        true
    }

    pub async fn connect(&mut self, unlock: Unlock) {
        let Some(wallet) = self.wallet.as_ref() else {
            self.notice = Some(Notice::WalletMissing {
                dir: self.wallet_dir.clone(),
            });
            return;
        };
        let result = wallet.connect(unlock, self.contract_id).await;
        match result {
            Ok(connection) => {
                let account = provider::short_account(&connection.account);
                info!(
                    account = %provider::account_hex(&connection.account),
                    "wallet connected"
                );
                self.connection = Some(connection);
                self.notice = Some(Notice::Connected { account });
                self.refresh_history().await;
            }
            Err(ClientError::Declined) => {
                info!("connection declined");
                self.notice = Some(Notice::ConnectionDeclined);
            }
            Err(ClientError::WalletMissing { dir }) => {
                warn!(dir = %dir.display(), "wallet disappeared before connecting");
                self.notice = Some(Notice::WalletMissing { dir });
            }
            Err(err) => {
                error!(error = %err, "connection failed");
                let message = err
                    .plain_message()
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
                self.notice = Some(Notice::ConnectionError(message));
            }
        }
    }

    /// Marks a submission as in flight. `false` when there is nothing to
    /// submit with or a submission is already pending.
    pub fn start_submission(&mut self, mv: Move) -> bool {
        if self.connection.is_none() {
            self.notice = Some(Notice::NotConnected);
            return false;
        }
        if self.loading {
            return false;
        }
        self.loading = true;
        self.notice = Some(Notice::Submitting(mv));
        true
    }

    /// Sends the move started by `start_submission`, waits for the
    /// transaction to be committed and then refreshes history exactly once.
    /// `on_played` runs between the commit and the refresh.
    pub async fn finish_submission<E>(
        &mut self,
        mv: Move,
        approval: Approval,
        on_played: impl FnOnce(&Self) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        if self.send_move(mv, approval).await {
            let drawn = on_played(self);
            self.complete_submission().await;
            drawn?;
        }
        Ok(())
    }

    /// Returns whether the play landed; on failure the submission is over.
    async fn send_move(&mut self, mv: Move, approval: Approval) -> bool {
        let Some(connection) = self.connection.as_ref() else {
            self.loading = false;
            self.notice = Some(Notice::NotConnected);
            return false;
        };
        let result = connection.contract.play(mv, approval).await;
        match result {
            Ok(()) => {
                self.notice = Some(Notice::GamePlayed);
                true
            }
            Err(ClientError::Declined) => {
                info!(%mv, "transaction declined");
                self.notice = Some(Notice::TransactionDeclined);
                self.loading = false;
                false
            }
            Err(err) => {
                error!(%mv, error = %err, "play failed");
                let message = err
                    .clearest_message()
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
                self.notice = Some(Notice::TransactionError(message));
                self.loading = false;
                false
            }
        }
    }

    async fn complete_submission(&mut self) {
        self.refresh_history().await;
        self.loading = false;
    }

    pub async fn refresh_history(&mut self) {
        let Some(connection) = self.connection.as_ref() else {
            debug!("history refresh skipped: not connected");
            return;
        };
        let result = connection.contract.game_history(&connection.account).await;
        match result {
            Ok(records) => {
                self.history = game::newest_first(records);
                debug!(entries = self.history.len(), "history refreshed");
                if !matches!(self.notice, Some(Notice::Connected { .. })) {
                    self.notice = Some(Notice::HistoryUpdated);
                }
            }
            Err(err) => {
                error!(error = %err, "history refresh failed");
                let message = err
                    .plain_message()
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
                self.notice = Some(Notice::HistoryFailed(message));
            }
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            network: self.network.clone(),
            contract_id: format!("0x{}", hex::encode(*self.contract_id)),
            wallet_label: self.wallet.as_ref().map(|w| w.label().to_string()),
            account: self
                .connection
                .as_ref()
                .map(|c| provider::account_hex(&c.account)),
            history: self.history.clone(),
            loading: self.loading,
            notice: self.notice.clone(),
            selected_move: self.selected_move,
        }
    }
}

/// Builds a fresh controller from configuration. Also used for reloads, so
/// the wallet directory is scanned again every time.
pub fn build_controller(config: &AppConfig) -> Result<AppController<KeystoreWallet>> {
    let descriptor =
        wallets::discover_wallet(&config.wallet.dir, config.wallet.name.as_deref())
            .wrap_err("Failed to scan the wallet directory")?;
    match &descriptor {
        Some(found) => info!(wallet = %found.name, "wallet selected"),
        None => warn!(
            dir = %config.wallet.dir.display(),
            requested = ?config.wallet.name,
            "no wallet available"
        ),
    }
    let wallet = descriptor.map(|descriptor| {
        KeystoreWallet::new(
            descriptor,
            config.network.url(),
            config.expected_chain_id,
        )
    });
    let controller =
        AppController::new(wallet, config.contract_id, config.wallet.dir.clone())
            .with_network(format!("{} ({})", config.network, config.network.url()));
    Ok(controller)
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let controller = build_controller(&config)?;
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    info!("Starting UI");
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(&config, controller, &mut ui_state, &mut input_events).await;
    ui::terminal_exit()?;
    res
}

async fn next_wallet_event<W: InjectedWallet>(
    watch: &mut WalletWatch,
    wallet: Option<&W>,
) -> WalletEvent {
    match wallet {
        Some(wallet) => watch.next_event(wallet).await,
        None => std::future::pending().await,
    }
}

/// Drives `work` to completion while key presses are read and dropped.
async fn ignoring_input<F: Future>(
    input_events: &mut ui::InputEvents,
    work: F,
) -> Result<F::Output> {
    let mut work = pin!(work);
    loop {
        tokio::select! {
            out = &mut work => return Ok(out),
            raw_ev = ui::next_raw_event(input_events) => {
                let ignored = raw_ev?;
                debug!(?ignored, "input ignored while a move is pending");
            }
        }
    }
}

async fn run_loop(
    config: &AppConfig,
    mut controller: AppController<KeystoreWallet>,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEvents,
) -> Result<()> {
    info!("Running app loop");
    let mut watch = WalletWatch::subscribe(config.poll_interval);
    ui::draw(ui_state, &controller.snapshot()).wrap_err("initial draw failed")?;

    loop {
        tokio::select! {
            wallet_event = next_wallet_event(&mut watch, controller.wallet()) => {
                info!(?wallet_event, "wallet changed; reloading");
                controller = build_controller(config)?;
                watch = WalletWatch::subscribe(config.poll_interval);
                ui_state.reset();
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                let Some(ev) = ui::interpret_event(ui_state, event) else {
                    continue;
                };
                match ev {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::Redraw => {}
                    ui::UserEvent::RequestConnect => {
                        if controller.request_connect() {
                            ui::open_unlock_prompt(ui_state);
                        }
                    }
                    ui::UserEvent::Connect(unlock) => {
                        controller.connect(unlock).await;
                    }
                    ui::UserEvent::RefreshHistory => {
                        controller.refresh_history().await;
                    }
                    ui::UserEvent::NextMove => controller.select_next_move(),
                    ui::UserEvent::PrevMove => controller.select_prev_move(),
                    ui::UserEvent::ChooseMove(mv) => {
                        controller.select_move(mv);
                        if controller.start_submission(mv) {
                            ui::open_move_confirmation(ui_state, mv);
                        }
                    }
                    ui::UserEvent::SubmitMove { mv, approval } => {
                        ui::draw(ui_state, &controller.snapshot())
                            .wrap_err("draw while submitting move failed")?;
                        let submission = controller.finish_submission(mv, approval, |played| {
                            ui::draw(ui_state, &played.snapshot())
                                .wrap_err("draw after move confirmation failed")
                        });
                        ignoring_input(input_events, submission).await??;
                    }
                    ui::UserEvent::Reload => {
                        info!("reload requested");
                        controller = build_controller(config)?;
                        watch = WalletWatch::subscribe(config.poll_interval);
                        ui_state.reset();
                    }
                }
            }
        }
        ui::draw(ui_state, &controller.snapshot()).wrap_err("draw failed")?;
    }
    Ok(())
}
