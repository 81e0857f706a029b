use crate::application::dialogue::{AdminDialogue, Dialogue, WizardKind};
use crate::application::menu::{self, MenuAction};
use crate::application::outbox::Outbox;
use crate::application::rate_limiter::RateLimiter;
use crate::application::session::{SessionGuard, SessionStore};
use crate::application::settings_cache::SettingsCache;
use crate::application::workflow::{HistoryPage, TransactionWorkflow};
use crate::config::{AdminConfig, Config};
use crate::domain::asset::{CryptoAsset, GiftCardBrand};
use crate::domain::message::{EventPayload, InboundEvent, Upload};
use crate::domain::ports::{NotifierBox, SettingsStoreBox, TransactionStoreBox, UserStoreBox};
use crate::domain::settings::Settings;
use crate::domain::transaction::{
    Evidence, NewTransaction, Order, Transaction, TransactionId, TransactionKind,
    TransactionStatus,
};
use crate::domain::user::User;
use crate::domain::validation::{
    parse_amount, parse_gift_details, sanitize_text, validate_upload,
};
use crate::error::{BotError, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const CANCEL_HINT: &str = "Type \"cancel\" to cancel.";

/// The store ports the engine is wired to.
#[derive(Clone)]
pub struct Stores {
    pub users: UserStoreBox,
    pub transactions: TransactionStoreBox,
    pub settings: SettingsStoreBox,
}

/// What happened to an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Refused by the rate limiter without any reply.
    Dropped,
    Handled,
}

#[derive(Clone, Copy)]
enum Input<'a> {
    Text(&'a str),
    Upload(&'a Upload),
}

impl<'a> Input<'a> {
    fn is_cancel(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().eq_ignore_ascii_case("cancel"))
    }

    fn text(&self) -> Option<&'a str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Upload(_) => None,
        }
    }
}

/// Drives every session's dialogue.
///
/// Events for one session are serialized through that session's slot in the
/// dialogue stores, while events for different sessions run concurrently. Errors
/// never escape [`handle`](Self::handle): they are logged, reported to the session
/// that caused them, and leave other sessions untouched.
pub struct ConversationEngine {
    admins: AdminConfig,
    users: UserStoreBox,
    settings: SettingsCache,
    workflow: TransactionWorkflow,
    outbox: Outbox,
    limiter: RateLimiter,
    session_capacity: usize,
    dialogues: SessionStore<Dialogue>,
    admin_dialogues: SessionStore<AdminDialogue>,
}

impl ConversationEngine {
    /// Creates a new `ConversationEngine`, loading (or bootstrapping) the settings
    /// record from `stores.settings`.
    ///
    /// # Arguments
    ///
    /// * `config` - Admin ids, default settings and limits.
    /// * `stores` - The store ports for users, transactions and settings.
    /// * `notifier` - The outbound side of the transport.
    pub async fn new(config: &Config, stores: Stores, notifier: NotifierBox) -> Result<Self> {
        let settings = SettingsCache::load(stores.settings, config.defaults.to_settings()).await?;
        let outbox = Outbox::new(notifier, config.admin.notice_chats());
        let limits = &config.limits;
        Ok(Self {
            admins: config.admin.clone(),
            users: stores.users,
            settings,
            workflow: TransactionWorkflow::new(
                stores.transactions,
                outbox.clone(),
                limits.history_page_size,
            ),
            outbox,
            limiter: RateLimiter::new(limits.rate_limit_events, limits.rate_limit_window()),
            session_capacity: limits.session_capacity,
            dialogues: SessionStore::new(limits.session_idle_timeout(), limits.session_capacity),
            admin_dialogues: SessionStore::new(
                limits.session_idle_timeout(),
                limits.session_capacity,
            ),
        })
    }

    /// Processes one inbound event.
    pub async fn handle(&self, event: InboundEvent) -> Dispatch {
        let session_id = event.session_id.as_str();
        if self.limiter.tracked_sessions() > self.session_capacity {
            self.limiter.purge_expired(Instant::now());
        }
        if !self.limiter.admit(session_id) {
            debug!(session_id, "event dropped by rate limiter");
            return Dispatch::Dropped;
        }

        if let Err(e) = self.route(&event).await {
            warn!(session_id, error = %e, "failed to handle event");
            self.outbox
                .text(session_id, "An error occurred. Please try again.")
                .await;
        }
        Dispatch::Handled
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> Arc<Settings> {
        self.settings.current()
    }

    pub fn workflow(&self) -> &TransactionWorkflow {
        &self.workflow
    }

    /// The user dialogue `session_id` is currently in, if any.
    pub async fn dialogue(&self, session_id: &str) -> Option<Dialogue> {
        self.dialogues.lock(session_id).await.dialogue().cloned()
    }

    /// The admin dialogue `session_id` is currently in, if any.
    pub async fn admin_dialogue(&self, session_id: &str) -> Option<AdminDialogue> {
        self.admin_dialogues.lock(session_id).await.dialogue().cloned()
    }

    async fn route(&self, event: &InboundEvent) -> Result<()> {
        let session_id = event.session_id.as_str();
        match &event.payload {
            EventPayload::Button(action) => {
                self.ensure_user(event, false).await?;
                self.on_button(session_id, action).await
            }
            EventPayload::Text(text) if text.trim() == "/start" => {
                self.ensure_user(event, true).await?;
                self.on_start(session_id).await;
                Ok(())
            }
            EventPayload::Text(text) => {
                self.ensure_user(event, false).await?;
                self.on_input(session_id, Input::Text(text)).await;
                Ok(())
            }
            EventPayload::Upload(upload) => {
                self.ensure_user(event, false).await?;
                self.on_input(session_id, Input::Upload(upload)).await;
                Ok(())
            }
        }
    }

    /// Creates the user on first contact. With `refresh` the display name is
    /// brought up to date as well.
    async fn ensure_user(&self, event: &InboundEvent, refresh: bool) -> Result<()> {
        let session_id = event.session_id.as_str();
        let name = event
            .display_name
            .as_deref()
            .map(|name| sanitize_text(name.trim()))
            .filter(|name| !name.is_empty());

        match self.users.find_by_session(session_id).await? {
            None => {
                let name = name.unwrap_or_else(|| session_id.to_string());
                self.users.upsert(User::new(session_id, name)).await?;
                info!(session_id, "user registered");
            }
            Some(mut user) if refresh => {
                if let Some(name) = name
                    && name != user.display_name
                {
                    user.display_name = name;
                    self.users.upsert(user).await?;
                }
            }
            Some(_) => {}
        }
        Ok(())
    }

    async fn on_start(&self, session_id: &str) {
        self.dialogues.lock(session_id).await.clear();
        let is_admin = self.admins.is_admin(session_id);
        if is_admin {
            self.admin_dialogues.lock(session_id).await.clear();
        }
        self.outbox
            .with_keyboard(
                session_id,
                "Welcome to SwapDesk! Choose an option:",
                menu::main_menu(is_admin),
            )
            .await;
    }

    async fn on_input(&self, session_id: &str, input: Input<'_>) {
        if self.admins.is_admin(session_id) {
            let mut guard = self.admin_dialogues.lock(session_id).await;
            if let Some(dialogue) = guard.take() {
                if input.is_cancel() {
                    info!(session_id, "admin dialogue cancelled");
                    self.outbox
                        .with_keyboard(session_id, "Admin action cancelled.", menu::admin_panel())
                        .await;
                    return;
                }
                let outcome = self.advance_admin(session_id, &dialogue, input).await;
                self.settle(session_id, &mut guard, dialogue, outcome).await;
                return;
            }
        }

        let mut guard = self.dialogues.lock(session_id).await;
        let Some(dialogue) = guard.take() else {
            self.outbox
                .with_keyboard(
                    session_id,
                    "Use /start to open the menu.",
                    menu::back_to_menu(),
                )
                .await;
            return;
        };

        if input.is_cancel() {
            info!(session_id, step = dialogue.step(), "dialogue cancelled");
            self.outbox
                .with_keyboard(
                    session_id,
                    "Transaction cancelled. Returning to main menu.",
                    menu::main_menu(self.admins.is_admin(session_id)),
                )
                .await;
            return;
        }

        debug!(session_id, step = dialogue.step(), "advancing dialogue");
        let outcome = self.advance(session_id, &dialogue, input).await;
        self.settle(session_id, &mut guard, dialogue, outcome).await;
    }

    /// Stores the outcome of one dialogue step: the next state, nothing, or the
    /// previous state again when the input was invalid.
    async fn settle<D>(
        &self,
        session_id: &str,
        guard: &mut SessionGuard<D>,
        previous: D,
        outcome: Result<Option<D>>,
    ) {
        match outcome {
            Ok(Some(next)) => guard.set(next),
            Ok(None) => {}
            Err(BotError::Validation(message)) => {
                guard.set(previous);
                self.outbox
                    .text(session_id, format!("{message} {CANCEL_HINT}"))
                    .await;
            }
            Err(BotError::DuplicateSubmission(kind)) => {
                info!(session_id, %kind, "duplicate submission refused");
                let text = match kind {
                    TransactionKind::SellGiftCard => {
                        "You already have a pending gift card sell transaction. Please wait for it to be processed or contact support."
                    }
                    _ => {
                        "You already have a pending transaction of this type. Please wait for it to be processed or contact support."
                    }
                };
                self.outbox.text(session_id, text).await;
            }
            Err(BotError::NotFound(_) | BotError::AlreadyProcessed(_)) => {
                self.outbox
                    .text(session_id, "Transaction not found or already processed.")
                    .await;
            }
            Err(e) => {
                warn!(session_id, error = %e, "dialogue aborted");
                self.outbox
                    .text(
                        session_id,
                        "An error occurred while processing your transaction. Please try again.",
                    )
                    .await;
            }
        }
    }

    async fn advance(
        &self,
        session_id: &str,
        dialogue: &Dialogue,
        input: Input<'_>,
    ) -> Result<Option<Dialogue>> {
        match dialogue {
            Dialogue::BuyAmount { asset } => {
                let amount = parse_amount(input.text().unwrap_or_default())?;
                let rate = self.settings.current().crypto_rate(*asset);
                let fiat_amount = amount * rate;
                self.outbox
                    .text(
                        session_id,
                        format!(
                            "Transaction Details:\nCryptocurrency: {asset}\nAmount: {amount} {asset}\nRate: ${rate} per {asset}\nTotal to Pay: ${total}\n\nPlease upload your payment proof (photo or document). {CANCEL_HINT}",
                            amount = amount.normalize(),
                            rate = rate.normalize(),
                            total = usd(fiat_amount),
                        ),
                    )
                    .await;
                Ok(Some(Dialogue::BuyProof {
                    asset: *asset,
                    amount,
                    rate,
                    fiat_amount,
                }))
            }
            Dialogue::SellAmount { asset } => {
                let amount = parse_amount(input.text().unwrap_or_default())?;
                let settings = self.settings.current();
                let Some(wallet) = settings.wallet(*asset) else {
                    warn!(session_id, %asset, "sell requested without a configured wallet");
                    self.outbox
                        .text(session_id, "Wallet address not configured. Please contact support.")
                        .await;
                    return Ok(None);
                };
                self.outbox
                    .text(
                        session_id,
                        format!(
                            "Please send {amount} {asset} to the following wallet address:\n\n{wallet}\n\nAfter sending, please submit your transaction hash or upload a screenshot of the transaction. {CANCEL_HINT}",
                            amount = amount.normalize(),
                        ),
                    )
                    .await;
                Ok(Some(Dialogue::SellEvidence {
                    asset: *asset,
                    amount,
                }))
            }
            Dialogue::BuyProof {
                asset,
                amount,
                rate,
                fiat_amount,
            } => {
                let evidence = match input {
                    Input::Upload(upload) if validate_upload(upload) => {
                        Evidence::artifact(upload.file_id())
                    }
                    Input::Upload(_) => {
                        return Err(BotError::Validation(
                            "Invalid file. Please upload a valid image (max 10MB) or document."
                                .to_string(),
                        ));
                    }
                    Input::Text(_) => {
                        return Err(BotError::Validation(
                            "Please upload your payment proof (photo or document).".to_string(),
                        ));
                    }
                };
                let new = NewTransaction {
                    user: session_id.to_string(),
                    order: Order::Buy {
                        asset: *asset,
                        amount: *amount,
                    },
                    rate: *rate,
                    fiat_amount: *fiat_amount,
                    evidence,
                };
                self.submit(session_id, new).await
            }
            Dialogue::SellEvidence { asset, amount } => {
                let evidence = evidence_from(
                    input,
                    "Invalid file. Please upload a valid image (max 10MB) or enter transaction hash.",
                    "Please send your transaction hash as text or upload a screenshot.",
                )?;
                let new = NewTransaction {
                    user: session_id.to_string(),
                    order: Order::Sell {
                        asset: *asset,
                        amount: *amount,
                    },
                    rate: self.settings.current().crypto_rate(*asset),
                    fiat_amount: Decimal::ZERO,
                    evidence,
                };
                self.submit(session_id, new).await
            }
            Dialogue::GiftDetails { brand } => {
                let (card_value, country) = parse_gift_details(input.text().unwrap_or_default())?;
                let rate = self.settings.current().gift_card_rate(*brand);
                let payout = card_value * rate;
                self.outbox
                    .text(
                        session_id,
                        format!(
                            "Gift Card Details:\nType: {brand}\nValue: ${card_value} {country}\nPayout Rate: {percent}%\nYou will receive: ${payout}\n\nPlease upload an image of the gift card or enter the card code. {CANCEL_HINT}",
                            percent = (rate * Decimal::ONE_HUNDRED).normalize(),
                            payout = usd(payout),
                        ),
                    )
                    .await;
                Ok(Some(Dialogue::GiftEvidence {
                    brand: *brand,
                    card_value,
                    country,
                    rate,
                    payout,
                }))
            }
            Dialogue::GiftEvidence {
                brand,
                card_value,
                country,
                rate,
                payout,
            } => {
                let evidence = evidence_from(
                    input,
                    "Invalid file. Please upload a valid image (max 10MB) or enter card code.",
                    "Please upload an image of the gift card or enter the card code as text.",
                )?;
                let new = NewTransaction {
                    user: session_id.to_string(),
                    order: Order::SellGiftCard {
                        brand: *brand,
                        card_value: *card_value,
                        country: country.clone(),
                    },
                    rate: *rate,
                    fiat_amount: *payout,
                    evidence,
                };
                self.submit(session_id, new).await
            }
            Dialogue::PaymentDetails { tx_id } => {
                let details = sanitize_text(input.text().unwrap_or_default().trim());
                let details = details.trim();
                if details.is_empty() {
                    return Err(BotError::Validation(
                        "Please provide your bank account details or wallet address for payment."
                            .to_string(),
                    ));
                }
                let tx = self.workflow.complete(*tx_id, details.to_string()).await?;
                self.outbox
                    .text(
                        session_id,
                        format!(
                            "✅ Transaction completed!\n\nTransaction ID: {}\nStatus: {}\n\nYour payment is being processed. You will receive it shortly.",
                            tx.id, tx.status
                        ),
                    )
                    .await;
                Ok(None)
            }
        }
    }

    async fn submit(&self, session_id: &str, new: NewTransaction) -> Result<Option<Dialogue>> {
        let tx = self.workflow.submit(new).await?;
        let header = match tx.kind() {
            TransactionKind::Buy => "✅ Transaction created successfully!",
            TransactionKind::Sell => "✅ Sell transaction submitted successfully!",
            TransactionKind::SellGiftCard => "✅ Gift card sell transaction submitted successfully!",
        };
        self.outbox
            .text(
                session_id,
                format!(
                    "{header}\n\nTransaction ID: {}\nStatus: {}\n\nYour transaction is being reviewed. You will be notified once it's processed.",
                    tx.id, tx.status
                ),
            )
            .await;

        let name = match self.users.find_by_session(session_id).await {
            Ok(Some(user)) => user.display_name,
            _ => session_id.to_string(),
        };
        self.outbox
            .to_admins(
                &admin_notice(&tx, &name),
                Some(menu::review_controls(tx.id)),
            )
            .await;
        Ok(None)
    }

    async fn advance_admin(
        &self,
        admin: &str,
        dialogue: &AdminDialogue,
        input: Input<'_>,
    ) -> Result<Option<AdminDialogue>> {
        match dialogue {
            AdminDialogue::Wizard { kind, values } => {
                let step = values.len();
                let Some(text) = input.text() else {
                    return Err(BotError::Validation(kind.prompt(step)));
                };
                let mut values = values.clone();
                values.push(kind.parse(text)?);
                if values.len() < kind.steps() {
                    self.outbox.text(admin, kind.prompt(values.len())).await;
                    return Ok(Some(AdminDialogue::Wizard { kind: *kind, values }));
                }

                let update = kind.finish(values)?;
                self.settings.apply(update, admin).await?;
                self.outbox
                    .with_keyboard(admin, kind.done_message(), menu::admin_panel())
                    .await;
                Ok(None)
            }
            AdminDialogue::RejectReason { tx_id } => {
                let reason = sanitize_text(input.text().unwrap_or_default().trim());
                let reason = reason.trim();
                if reason.is_empty() {
                    return Err(BotError::Validation(
                        "Please provide the reason for rejection:".to_string(),
                    ));
                }
                let tx = self.workflow.reject(*tx_id, reason.to_string(), admin).await?;
                self.outbox
                    .text(admin, format!("Transaction {} rejected and user notified.", tx.id))
                    .await;
                Ok(None)
            }
        }
    }

    async fn on_button(&self, session_id: &str, raw: &str) -> Result<()> {
        let action = match raw.parse::<MenuAction>() {
            Ok(action) => action,
            Err(e) => {
                debug!(session_id, error = %e, "unknown button action");
                self.outbox
                    .acknowledge(session_id, Some("Unknown action."))
                    .await;
                return Ok(());
            }
        };

        let is_admin = match authorize(&self.admins, session_id, &action) {
            Ok(is_admin) => is_admin,
            Err(e) => {
                warn!(session_id, error = %e, "admin action attempted by non-admin");
                self.outbox
                    .acknowledge(session_id, Some("Unauthorized access."))
                    .await;
                return Ok(());
            }
        };

        let toast = self.on_action(session_id, action, is_admin).await?;
        self.outbox.acknowledge(session_id, toast).await;
        Ok(())
    }

    async fn on_action(
        &self,
        session_id: &str,
        action: MenuAction,
        is_admin: bool,
    ) -> Result<Option<&'static str>> {
        match action {
            MenuAction::MainMenu => {
                self.outbox
                    .with_keyboard(
                        session_id,
                        "Welcome back! Choose an option:",
                        menu::main_menu(is_admin),
                    )
                    .await;
            }
            MenuAction::BuyMenu => {
                self.outbox
                    .with_keyboard(
                        session_id,
                        "Choose cryptocurrency to buy:",
                        menu::asset_picker(MenuAction::Buy),
                    )
                    .await;
            }
            MenuAction::SellMenu => {
                self.outbox
                    .with_keyboard(
                        session_id,
                        "Choose cryptocurrency to sell:",
                        menu::asset_picker(MenuAction::Sell),
                    )
                    .await;
            }
            MenuAction::GiftCardMenu => {
                self.outbox
                    .with_keyboard(
                        session_id,
                        "Choose gift card type to sell:",
                        menu::gift_card_picker(),
                    )
                    .await;
            }
            MenuAction::History { page } => {
                let history = self.workflow.list_page(session_id, page).await?;
                self.show_history(session_id, &history).await;
            }
            MenuAction::Help => {
                self.outbox
                    .with_keyboard(
                        session_id,
                        "Welcome to SwapDesk!\n\nHere you can:\n- Buy and sell cryptocurrencies\n- Sell gift cards\n\nType \"cancel\" at any step to stop.\nContact support for more help.",
                        menu::back_to_menu(),
                    )
                    .await;
            }
            MenuAction::AdminPanel => {
                self.outbox
                    .with_keyboard(
                        session_id,
                        "Admin Panel - Choose an option:",
                        menu::admin_panel(),
                    )
                    .await;
            }
            MenuAction::Buy(asset) => {
                self.start(session_id, Dialogue::BuyAmount { asset }, amount_prompt(asset, "buy"))
                    .await;
            }
            MenuAction::Sell(asset) => {
                self.start(session_id, Dialogue::SellAmount { asset }, amount_prompt(asset, "sell"))
                    .await;
            }
            MenuAction::SellGiftCard(brand) => {
                self.start(session_id, Dialogue::GiftDetails { brand }, gift_prompt(brand))
                    .await;
            }
            MenuAction::SetCryptoRates => self.start_wizard(session_id, WizardKind::CryptoRates).await,
            MenuAction::SetGiftCardRates => {
                self.start_wizard(session_id, WizardKind::GiftCardRates).await
            }
            MenuAction::UpdateWallets => self.start_wizard(session_id, WizardKind::Wallets).await,
            MenuAction::Approve(id) => return self.approve(session_id, id).await,
            MenuAction::Reject(id) => return self.begin_reject(session_id, id).await,
        }
        Ok(None)
    }

    async fn start(&self, session_id: &str, dialogue: Dialogue, prompt: String) {
        debug!(session_id, step = dialogue.step(), "dialogue started");
        self.dialogues.lock(session_id).await.set(dialogue);
        self.outbox.text(session_id, prompt).await;
    }

    async fn start_wizard(&self, admin: &str, kind: WizardKind) {
        debug!(admin, ?kind, "settings wizard started");
        self.admin_dialogues
            .lock(admin)
            .await
            .set(AdminDialogue::wizard(kind));
        self.outbox
            .text(admin, format!("{} {CANCEL_HINT}", kind.prompt(0)))
            .await;
    }

    /// Asks the submitting user for payment details. The transaction stays PENDING
    /// until they answer.
    async fn approve(&self, admin: &str, id: TransactionId) -> Result<Option<&'static str>> {
        let tx = match self.workflow.approve(id, admin).await {
            Ok(tx) => tx,
            Err(BotError::NotFound(_) | BotError::AlreadyProcessed(_)) => {
                return Ok(Some("Transaction not found or already processed."));
            }
            Err(e) => return Err(e),
        };

        self.dialogues
            .lock(&tx.user)
            .await
            .set(Dialogue::PaymentDetails { tx_id: tx.id });
        self.outbox
            .text(
                &tx.user,
                "Your transaction has been approved! Please provide your bank account details or wallet address for payment.",
            )
            .await;
        Ok(Some("Approval initiated. User notified."))
    }

    async fn begin_reject(&self, admin: &str, id: TransactionId) -> Result<Option<&'static str>> {
        match self.workflow.pending(id).await {
            Ok(_) => {}
            Err(BotError::NotFound(_) | BotError::AlreadyProcessed(_)) => {
                return Ok(Some("Transaction not found or already processed."));
            }
            Err(e) => return Err(e),
        }

        self.admin_dialogues
            .lock(admin)
            .await
            .set(AdminDialogue::RejectReason { tx_id: id });
        self.outbox
            .text(admin, "Please provide the reason for rejection:")
            .await;
        Ok(Some("Rejection initiated. Please provide reason."))
    }

    async fn show_history(&self, session_id: &str, history: &HistoryPage) {
        if history.items.is_empty() {
            self.outbox
                .with_keyboard(session_id, "No transactions found.", menu::back_to_menu())
                .await;
            return;
        }

        let mut text = format!("📊 Your Transaction History (Page {})\n\n", history.page);
        for (i, tx) in history.items.iter().enumerate() {
            text.push_str(&history_entry(history.offset + i + 1, tx));
        }
        self.outbox
            .with_keyboard(
                session_id,
                text.trim_end(),
                menu::history_navigation(history.page, history.total_pages),
            )
            .await;
    }
}

fn usd(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn amount_prompt(asset: CryptoAsset, verb: &str) -> String {
    format!(
        "Enter the amount of {} ({}) you want to {verb}: {CANCEL_HINT}",
        asset.name(),
        asset.code()
    )
}

fn gift_prompt(brand: GiftCardBrand) -> String {
    format!(
        "Enter the {brand} gift card value and country (e.g., \"50 USD\" or \"100 EUR\"). {CANCEL_HINT}"
    )
}

fn evidence_from(input: Input<'_>, invalid_upload: &str, missing: &str) -> Result<Evidence> {
    match input {
        Input::Upload(upload) if validate_upload(upload) => Ok(Evidence::artifact(upload.file_id())),
        Input::Upload(_) => Err(BotError::Validation(invalid_upload.to_string())),
        Input::Text(text) => {
            let code = sanitize_text(text.trim());
            let code = code.trim();
            Evidence::new(None, (!code.is_empty()).then(|| code.to_string()))
                .map_err(|_| BotError::Validation(missing.to_string()))
        }
    }
}

fn admin_notice(tx: &Transaction, user_name: &str) -> String {
    let mut text = match &tx.order {
        Order::Buy { asset, amount } => format!(
            "🔔 New Buy Transaction Submitted!\n\nUser: {user_name} ({})\nType: Buy {asset}\nAmount: {} {asset}\nTotal: ${}\n",
            tx.user,
            amount.normalize(),
            usd(tx.fiat_amount)
        ),
        Order::Sell { asset, amount } => format!(
            "🔔 New Sell Transaction Submitted!\n\nUser: {user_name} ({})\nType: Sell {asset}\nAmount: {} {asset}\n",
            tx.user,
            amount.normalize()
        ),
        Order::SellGiftCard {
            brand,
            card_value,
            country,
        } => format!(
            "🔔 New Gift Card Sell Transaction!\n\nUser: {user_name} ({})\nType: {brand} Gift Card\nValue: ${card_value} {country}\nPayout: ${}\n",
            tx.user,
            usd(tx.fiat_amount)
        ),
    };
    text.push_str(&format!("Transaction ID: {}", tx.id));

    let (artifact_label, code_label) = match tx.kind() {
        TransactionKind::Buy => ("Payment Proof", "Reference"),
        TransactionKind::Sell => ("Screenshot", "TX Hash"),
        TransactionKind::SellGiftCard => ("Card Image", "Card Code"),
    };
    if let Some(code) = &tx.evidence.code {
        text.push_str(&format!("\n{code_label}: {code}"));
    }
    if let Some(artifact) = &tx.evidence.artifact {
        text.push_str(&format!("\n{artifact_label}: {artifact}"));
    }
    text
}

fn history_entry(number: usize, tx: &Transaction) -> String {
    let marker = match tx.status {
        TransactionStatus::Completed => "✅",
        TransactionStatus::Rejected | TransactionStatus::Cancelled => "❌",
        TransactionStatus::Pending => "⏳",
    };
    let details = match &tx.order {
        Order::Buy { asset, amount } => format!(
            "Amount: {} {asset}\n   Total: ${}",
            amount.normalize(),
            usd(tx.fiat_amount)
        ),
        Order::Sell { asset, amount } => format!("Amount: {} {asset}", amount.normalize()),
        Order::SellGiftCard {
            card_value,
            country,
            ..
        } => format!(
            "Value: ${card_value} {country}\n   Payout: ${}",
            usd(tx.fiat_amount)
        ),
    };
    format!(
        "{number}. {marker} {}\n   {details}\n   Date: {}\n   ID: {}\n\n",
        tx.order.title(),
        tx.created_at.format("%Y-%m-%d"),
        tx.id
    )
}

/// Whether `session_id` is an admin, or `Unauthorized` when it presses an
/// admin-only button without being one.
fn authorize(admins: &AdminConfig, session_id: &str, action: &MenuAction) -> Result<bool> {
    let is_admin = admins.is_admin(session_id);
    if action.is_admin_only() && !is_admin {
        return Err(BotError::Unauthorized);
    }
    Ok(is_admin)
}
